use crate::utils::bbox::{CenterBox, CornerBox, ImageShape};
use crate::Errors;
use anyhow::Result;
use nalgebra::DMatrix;

/// One time step of a clip: the predictions produced by the model for that
/// frame and the ground truth observed in it.
///
/// The prediction set keeps the same size and ordering across all frames of a
/// clip; ground truth varies per frame. Instances carry stable identities in
/// `gt_ids` so one physical object can be followed across frames.
///
#[derive(Clone, Debug)]
pub struct Frame {
    pred_boxes: Vec<CenterBox>,
    pred_scores: DMatrix<f32>,
    gt_boxes: Vec<CornerBox>,
    gt_labels: Vec<i64>,
    gt_ids: Vec<i64>,
}

impl Frame {
    /// Constructor. Validates internal consistency of the frame.
    ///
    /// # Parameters
    /// * `pred_boxes` - predicted boxes, normalized center-size encoding;
    /// * `pred_scores` - raw class scores (logits), one row per predicted box;
    /// * `gt_boxes` - ground-truth boxes, absolute pixel corners;
    /// * `gt_labels` - ground-truth class labels, `0..NumClasses`;
    /// * `gt_ids` - ground-truth instance identities, stable within a clip.
    ///
    pub fn new(
        pred_boxes: Vec<CenterBox>,
        pred_scores: DMatrix<f32>,
        gt_boxes: Vec<CornerBox>,
        gt_labels: Vec<i64>,
        gt_ids: Vec<i64>,
    ) -> Result<Self> {
        if pred_scores.nrows() != pred_boxes.len() {
            return Err(Errors::PredictionDimensionMismatch {
                rows: pred_scores.nrows(),
                boxes: pred_boxes.len(),
            }
            .into());
        }

        if gt_labels.len() != gt_boxes.len() || gt_ids.len() != gt_boxes.len() {
            return Err(Errors::GroundTruthDimensionMismatch {
                boxes: gt_boxes.len(),
                labels: gt_labels.len(),
                ids: gt_ids.len(),
            }
            .into());
        }

        let classes = pred_scores.ncols();
        for &label in &gt_labels {
            if label < 0 || label as usize >= classes {
                return Err(Errors::LabelOutOfRange { label, classes }.into());
            }
        }

        Ok(Self {
            pred_boxes,
            pred_scores,
            gt_boxes,
            gt_labels,
            gt_ids,
        })
    }

    pub fn pred_boxes(&self) -> &[CenterBox] {
        &self.pred_boxes
    }

    pub fn pred_scores(&self) -> &DMatrix<f32> {
        &self.pred_scores
    }

    pub fn gt_boxes(&self) -> &[CornerBox] {
        &self.gt_boxes
    }

    pub fn gt_labels(&self) -> &[i64] {
        &self.gt_labels
    }

    pub fn gt_ids(&self) -> &[i64] {
        &self.gt_ids
    }

    pub fn num_predictions(&self) -> usize {
        self.pred_boxes.len()
    }

    pub fn num_classes(&self) -> usize {
        self.pred_scores.ncols()
    }

    pub fn num_gts(&self) -> usize {
        self.gt_boxes.len()
    }
}

/// An already-segmented, contiguous sequence of frames processed as one
/// assignment unit. Built once per clip and passed immutably through the
/// assignment stages.
///
#[derive(Clone, Debug)]
pub struct Clip {
    frames: Vec<Frame>,
    shape: ImageShape,
}

impl Clip {
    /// Constructor. Validates that every frame agrees on the prediction and
    /// class counts; disagreement aborts before any assignment work starts.
    ///
    pub fn new(frames: Vec<Frame>, shape: ImageShape) -> Result<Self> {
        if let Some(first) = frames.first() {
            let preds = first.num_predictions();
            let classes = first.num_classes();
            for (index, frame) in frames.iter().enumerate().skip(1) {
                if frame.num_predictions() != preds {
                    return Err(Errors::PredictionCountMismatch {
                        frame: index,
                        found: frame.num_predictions(),
                        expected: preds,
                    }
                    .into());
                }
                if frame.num_classes() != classes {
                    return Err(Errors::ClassCountMismatch {
                        frame: index,
                        found: frame.num_classes(),
                        expected: classes,
                    }
                    .into());
                }
            }
        }
        Ok(Self { frames, shape })
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn shape(&self) -> &ImageShape {
        &self.shape
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Size of the prediction set shared by all frames, 0 for an empty clip
    pub fn num_predictions(&self) -> usize {
        self.frames.first().map_or(0, Frame::num_predictions)
    }
}
