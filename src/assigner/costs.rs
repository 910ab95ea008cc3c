use crate::assigner::AssignerOptions;
use crate::clip::Frame;
use crate::utils::bbox::ImageShape;
use nalgebra::DMatrix;

const FOCAL_EPS: f32 = 1e-12;

/// Classification term of the pair cost.
#[derive(Clone, Debug, Copy, PartialEq)]
pub enum ClassCost {
    /// Negated softmax probability of the ground-truth class
    Softmax,
    /// Focal-shaped cost over per-class sigmoid scores
    Focal { alpha: f32, gamma: f32 },
}

impl Default for ClassCost {
    fn default() -> Self {
        ClassCost::Softmax
    }
}

impl ClassCost {
    /// Focal cost with the commonly used parameters
    pub fn focal() -> Self {
        ClassCost::Focal {
            alpha: 0.25,
            gamma: 2.0,
        }
    }
}

/// Weighted pair cost between every prediction and every ground-truth
/// instance of a single frame.
///
/// The cost is the weighted sum of three terms:
/// * classification - how poorly the prediction scores the instance's class;
/// * regression - L1 distance between the boxes in normalized corner space;
/// * overlap - negated overlap of the boxes in absolute pixel space.
///
/// Row `r`, column `g` holds the cost of assigning prediction `r` to the
/// frame's instance `g`. Frames without ground truth yield a zero-column
/// matrix.
///
pub fn cost_matrix(frame: &Frame, shape: &ImageShape, opts: &AssignerOptions) -> DMatrix<f32> {
    let preds = frame.num_predictions();
    let gts = frame.num_gts();
    if preds == 0 || gts == 0 {
        return DMatrix::zeros(preds, gts);
    }

    let cls = match opts.class_cost {
        ClassCost::Softmax => softmax_gather(frame.pred_scores(), frame.gt_labels()),
        ClassCost::Focal { alpha, gamma } => {
            focal_gather(frame.pred_scores(), frame.gt_labels(), alpha, gamma)
        }
    };

    let pred_corners = frame
        .pred_boxes()
        .iter()
        .map(|b| b.to_corners())
        .collect::<Vec<_>>();

    let pred_pixels = frame
        .pred_boxes()
        .iter()
        .map(|b| b.denormalize(shape))
        .collect::<Vec<_>>();

    let gt_normalized = frame
        .gt_boxes()
        .iter()
        .map(|b| b.normalize(shape))
        .collect::<Vec<_>>();

    DMatrix::from_fn(preds, gts, |r, g| {
        let reg = pred_corners[r].l1_distance(&gt_normalized[g]);
        let overlap = pred_pixels[r].overlap(&frame.gt_boxes()[g], opts.overlap_metric);
        opts.cls_weight * cls[(r, g)] + opts.reg_weight * reg - opts.iou_weight * overlap
    })
}

fn softmax_gather(scores: &DMatrix<f32>, labels: &[i64]) -> DMatrix<f32> {
    let mut probs = scores.clone_owned();
    for mut row in probs.row_iter_mut() {
        let max = row.iter().fold(f32::NEG_INFINITY, |acc, &v| acc.max(v));
        let mut sum = 0.0;
        for v in row.iter_mut() {
            *v = (*v - max).exp();
            sum += *v;
        }
        for v in row.iter_mut() {
            *v /= sum;
        }
    }
    DMatrix::from_fn(scores.nrows(), labels.len(), |r, g| {
        -probs[(r, labels[g] as usize)]
    })
}

fn focal_gather(scores: &DMatrix<f32>, labels: &[i64], alpha: f32, gamma: f32) -> DMatrix<f32> {
    DMatrix::from_fn(scores.nrows(), labels.len(), |r, g| {
        let p = 1.0 / (1.0 + (-scores[(r, labels[g] as usize)]).exp());
        let pos = -(p + FOCAL_EPS).ln() * alpha * (1.0 - p).powf(gamma);
        let neg = -(1.0 - p + FOCAL_EPS).ln() * (1.0 - alpha) * p.powf(gamma);
        pos - neg
    })
}
