use crate::assigner::alignment::ClipAlignment;
use crate::assigner::costs::{cost_matrix, ClassCost};
use crate::assigner::result::AssignResult;
use crate::clip::Clip;
use crate::utils::bbox::OverlapMetric;
use anyhow::Result;
use log::debug;
use rayon::prelude::*;

/// Identity roster and roster-to-frame translation
pub mod alignment;
/// Per-frame pair cost terms
pub mod costs;
/// Cross-frame cost aggregation over the roster
pub mod fuse;
/// Per-frame assignment results
pub mod result;
/// Minimum-cost matching over the fused matrix
pub mod solver;
/// Batch assignment engine
pub mod batch;
/// Multi-threaded batched assigner
pub mod batch_api;

/// Weights and cost variants of the assignment.
#[derive(Clone, Debug)]
pub struct AssignerOptions {
    pub cls_weight: f32,
    pub reg_weight: f32,
    pub iou_weight: f32,
    pub class_cost: ClassCost,
    pub overlap_metric: OverlapMetric,
}

impl Default for AssignerOptions {
    fn default() -> Self {
        Self {
            cls_weight: 1.0,
            reg_weight: 1.0,
            iou_weight: 1.0,
            class_cost: ClassCost::default(),
            overlap_metric: OverlapMetric::default(),
        }
    }
}

/// One-to-one matcher between the fixed prediction set of a clip and the
/// ground-truth instances observed across its frames.
///
/// One physical instance keeps one prediction for the whole clip: per-frame
/// pair costs are fused over the identity roster, a single minimum-cost
/// matching is solved at the clip level, and the matching is then projected
/// back onto every frame. Predictions left unmatched, and matched predictions
/// in frames where their instance does not appear, are background.
///
#[derive(Default)]
pub struct ClipAssigner {
    opts: AssignerOptions,
}

impl ClipAssigner {
    /// Constructor
    ///
    pub fn new(opts: AssignerOptions) -> Self {
        Self { opts }
    }

    pub fn options(&self) -> &AssignerOptions {
        &self.opts
    }

    /// Matches the clip and returns one result per frame.
    ///
    /// Frame cost matrices are computed in parallel; fusion, solving and
    /// projection run on the calling thread. The same clip with the same
    /// options always produces the same results.
    ///
    pub fn assign(&self, clip: &Clip) -> Result<Vec<AssignResult>> {
        let alignment = ClipAlignment::new(clip);
        let preds = clip.num_predictions();

        if alignment.num_identities() == 0 || preds == 0 {
            return Ok(clip
                .frames()
                .iter()
                .map(|f| AssignResult::background(f.num_gts(), preds))
                .collect());
        }

        debug!(
            "Assigning {} predictions to {} identities over {} frames",
            preds,
            alignment.num_identities(),
            clip.len()
        );

        let costs = clip
            .frames()
            .par_iter()
            .map(|f| cost_matrix(f, clip.shape(), &self.opts))
            .collect::<Vec<_>>();

        let fused = fuse::fuse(&costs, &alignment)?;
        let pairs = solver::solve(&fused);
        debug!("Matched (prediction, roster identity) pairs: {:?}", &pairs);

        Ok(clip
            .frames()
            .iter()
            .zip(alignment.frames())
            .map(|(frame, columns)| AssignResult::assemble(frame, columns, &pairs))
            .collect())
    }
}
