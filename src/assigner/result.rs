use crate::assigner::alignment::FrameColumns;
use crate::clip::Frame;

/// Per-frame outcome of a clip assignment.
///
/// `gt_inds[r]` is `0` when prediction `r` is background in the frame, or
/// the 1-based index of the frame ground-truth instance assigned to it.
/// `labels[r]` is the class label of that instance, `-1` for background.
/// `num_gts` counts the instances annotated in the frame itself.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssignResult {
    pub num_gts: usize,
    pub gt_inds: Vec<usize>,
    pub labels: Vec<i64>,
}

impl AssignResult {
    /// Every prediction of the frame marked background
    pub(crate) fn background(num_gts: usize, preds: usize) -> Self {
        Self {
            num_gts,
            gt_inds: vec![0; preds],
            labels: vec![-1; preds],
        }
    }

    /// Projects the clip-level matching onto one frame. A matched roster
    /// identity that is absent from the frame leaves its prediction as
    /// background there.
    ///
    pub fn assemble(frame: &Frame, columns: &FrameColumns, pairs: &[(usize, usize)]) -> Self {
        let mut result = Self::background(frame.num_gts(), frame.num_predictions());
        for &(row, identity) in pairs {
            if let Some(col) = columns.local_col(identity) {
                result.gt_inds[row] = col + 1;
                result.labels[row] = frame.gt_labels()[col];
            }
        }
        result
    }

    /// Rows matched to a ground-truth instance
    pub fn num_assigned(&self) -> usize {
        self.gt_inds.iter().filter(|&&v| v > 0).count()
    }
}
