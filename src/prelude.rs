use crate::assigner;
use crate::utils;

pub use assigner::batch::{AssignBatchRequest, AssignBatchResult, ClipAssignments};
pub use assigner::batch_api::BatchAssigner;
pub use assigner::costs::ClassCost;
pub use assigner::result::AssignResult;
pub use assigner::{AssignerOptions, ClipAssigner};
pub use utils::bbox::{CenterBox, CornerBox, ImageShape, OverlapMetric};

pub use crate::clip::{Clip, Frame};
