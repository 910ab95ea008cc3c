/// Bounding boxes and overlap metrics
pub mod bbox;
