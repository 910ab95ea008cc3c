use thiserror::Error;

/// Clip-level one-to-one assignment of predictions to ground-truth instances
pub mod assigner;

/// Immutable per-clip input aggregates
pub mod clip;

/// Sample generators for demos, benches and tests
pub mod examples;

/// Crate-wide re-exports
pub mod prelude;

/// Geometric primitives
pub mod utils;

#[cfg(feature = "python")]
mod py;

#[derive(Error, Debug, Clone)]
pub enum Errors {
    #[error(
        "Ground truth arrays have mismatched lengths: boxes={boxes}, labels={labels}, ids={ids}."
    )]
    GroundTruthDimensionMismatch {
        boxes: usize,
        labels: usize,
        ids: usize,
    },
    #[error("Score matrix holds {rows} rows for {boxes} predicted boxes.")]
    PredictionDimensionMismatch { rows: usize, boxes: usize },
    #[error("Ground truth label {label} is outside the class range 0..{classes}.")]
    LabelOutOfRange { label: i64, classes: usize },
    #[error("Frame {frame} carries {found} predictions while the clip carries {expected}.")]
    PredictionCountMismatch {
        frame: usize,
        found: usize,
        expected: usize,
    },
    #[error("Frame {frame} scores {found} classes while the clip scores {expected}.")]
    ClassCountMismatch {
        frame: usize,
        found: usize,
        expected: usize,
    },
    #[error("Identity {identity} has zero presence weight across the clip.")]
    ZeroPresenceWeight { identity: i64 },
}

pub(crate) const EPS: f32 = 0.00001;

/// Approximate equality for float-backed geometry
pub trait EstimateClose {
    fn almost_same(&self, other: &Self, eps: f32) -> bool;
}
