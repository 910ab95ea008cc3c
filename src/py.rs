use crate::assigner::batch::{AssignBatchRequest, AssignBatchResult};
use crate::assigner::batch_api::BatchAssigner;
use crate::assigner::costs::ClassCost;
use crate::assigner::result::AssignResult;
use crate::assigner::{AssignerOptions, ClipAssigner};
use crate::clip::{Clip, Frame};
use crate::utils::bbox::{CenterBox, CornerBox, ImageShape, OverlapMetric};
use anyhow::bail;
use nalgebra::DMatrix;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

fn build_frame(
    pred_boxes: Vec<[f32; 4]>,
    pred_scores: Vec<Vec<f32>>,
    gt_boxes: Vec<[f32; 4]>,
    gt_labels: Vec<i64>,
    gt_ids: Vec<i64>,
) -> anyhow::Result<Frame> {
    let rows = pred_scores.len();
    let classes = pred_scores.first().map_or(0, Vec::len);
    for row in &pred_scores {
        if row.len() != classes {
            bail!("Prediction score rows must all have the same number of classes.");
        }
    }
    let scores = DMatrix::from_fn(rows, classes, |r, c| pred_scores[r][c]);

    Frame::new(
        pred_boxes
            .into_iter()
            .map(|[cx, cy, w, h]| CenterBox::new(cx, cy, w, h))
            .collect(),
        scores,
        gt_boxes
            .into_iter()
            .map(|[x1, y1, x2, y2]| CornerBox::new(x1, y1, x2, y2))
            .collect(),
        gt_labels,
        gt_ids,
    )
}

#[pyclass]
#[derive(Clone, Debug)]
#[pyo3(name = "ClassCost")]
pub struct PyClassCost(pub(crate) ClassCost);

#[pymethods]
impl PyClassCost {
    fn __repr__(&self) -> String {
        format!("{:?}", self.0)
    }

    fn __str__(&self) -> String {
        self.__repr__()
    }

    #[staticmethod]
    pub fn softmax() -> Self {
        Self(ClassCost::Softmax)
    }

    #[staticmethod]
    #[pyo3(signature = (alpha = 0.25, gamma = 2.0))]
    pub fn focal(alpha: f32, gamma: f32) -> Self {
        Self(ClassCost::Focal { alpha, gamma })
    }
}

#[pyclass]
#[derive(Clone, Debug)]
#[pyo3(name = "OverlapMetric")]
pub struct PyOverlapMetric(pub(crate) OverlapMetric);

#[pymethods]
impl PyOverlapMetric {
    fn __repr__(&self) -> String {
        format!("{:?}", self.0)
    }

    fn __str__(&self) -> String {
        self.__repr__()
    }

    #[staticmethod]
    pub fn iou() -> Self {
        Self(OverlapMetric::IoU)
    }

    #[staticmethod]
    pub fn iof() -> Self {
        Self(OverlapMetric::IoF)
    }

    #[staticmethod]
    pub fn giou() -> Self {
        Self(OverlapMetric::GIoU)
    }
}

#[pyclass]
#[derive(Clone, Debug)]
#[pyo3(name = "AssignerOptions")]
pub struct PyAssignerOptions(pub(crate) AssignerOptions);

#[pymethods]
impl PyAssignerOptions {
    fn __repr__(&self) -> String {
        format!("{:?}", self.0)
    }

    fn __str__(&self) -> String {
        self.__repr__()
    }

    /// Constructor
    ///
    #[new]
    #[pyo3(signature = (
        cls_weight = 1.0,
        reg_weight = 1.0,
        iou_weight = 1.0,
        class_cost = None,
        overlap_metric = None
    ))]
    pub fn new(
        cls_weight: f32,
        reg_weight: f32,
        iou_weight: f32,
        class_cost: Option<PyClassCost>,
        overlap_metric: Option<PyOverlapMetric>,
    ) -> Self {
        Self(AssignerOptions {
            cls_weight,
            reg_weight,
            iou_weight,
            class_cost: class_cost.map_or_else(ClassCost::default, |c| c.0),
            overlap_metric: overlap_metric.map_or_else(OverlapMetric::default, |m| m.0),
        })
    }
}

#[pyclass]
#[derive(Clone, Debug)]
#[pyo3(name = "AssignResult")]
pub struct PyAssignResult(pub(crate) AssignResult);

#[pymethods]
impl PyAssignResult {
    #[classattr]
    const __hash__: Option<Py<PyAny>> = None;

    fn __repr__(&self) -> String {
        format!("{:?}", self.0)
    }

    fn __str__(&self) -> String {
        self.__repr__()
    }

    #[getter]
    pub fn num_gts(&self) -> usize {
        self.0.num_gts
    }

    #[getter]
    pub fn gt_inds(&self) -> Vec<usize> {
        self.0.gt_inds.clone()
    }

    #[getter]
    pub fn labels(&self) -> Vec<i64> {
        self.0.labels.clone()
    }
}

#[pyclass]
#[derive(Clone)]
#[pyo3(name = "Clip")]
pub struct PyClip {
    frames: Vec<Frame>,
    shape: ImageShape,
}

#[pymethods]
impl PyClip {
    /// Constructor
    ///
    #[new]
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            frames: Vec::default(),
            shape: ImageShape::new(width, height),
        }
    }

    /// Appends a frame.
    ///
    /// # Parameters
    /// * `pred_boxes` - predicted boxes as `(cx, cy, w, h)`, normalized;
    /// * `pred_scores` - per-box class score rows (logits);
    /// * `gt_boxes` - ground-truth boxes as `(x1, y1, x2, y2)`, pixels;
    /// * `gt_labels` - ground-truth class labels;
    /// * `gt_ids` - ground-truth instance identities.
    ///
    #[pyo3(signature = (pred_boxes, pred_scores, gt_boxes, gt_labels, gt_ids))]
    pub fn add_frame(
        &mut self,
        pred_boxes: Vec<[f32; 4]>,
        pred_scores: Vec<Vec<f32>>,
        gt_boxes: Vec<[f32; 4]>,
        gt_labels: Vec<i64>,
        gt_ids: Vec<i64>,
    ) -> PyResult<()> {
        let frame = build_frame(pred_boxes, pred_scores, gt_boxes, gt_labels, gt_ids)
            .map_err(|e| PyValueError::new_err(e.to_string()))?;
        self.frames.push(frame);
        Ok(())
    }

    fn __len__(&self) -> usize {
        self.frames.len()
    }
}

#[pyclass]
#[pyo3(name = "ClipAssigner")]
pub struct PyClipAssigner(pub(crate) ClipAssigner);

#[pymethods]
impl PyClipAssigner {
    /// Constructor
    ///
    #[new]
    #[pyo3(signature = (options = None))]
    pub fn new(options: Option<PyAssignerOptions>) -> Self {
        Self(ClipAssigner::new(
            options.map_or_else(AssignerOptions::default, |o| o.0),
        ))
    }

    /// Matches the clip and returns one result per frame
    ///
    #[pyo3(signature = (clip))]
    pub fn assign(&self, clip: PyClip) -> PyResult<Vec<PyAssignResult>> {
        Python::with_gil(|py| {
            py.allow_threads(|| {
                Clip::new(clip.frames, clip.shape)
                    .and_then(|clip| self.0.assign(&clip))
                    .map(|results| results.into_iter().map(PyAssignResult).collect())
                    .map_err(|e| PyValueError::new_err(e.to_string()))
            })
        })
    }
}

#[pyclass]
#[derive(Clone, Debug)]
#[pyo3(name = "AssignBatchResult")]
pub struct PyAssignBatchResult(pub(crate) AssignBatchResult);

#[pymethods]
impl PyAssignBatchResult {
    pub fn ready(&self) -> bool {
        self.0.ready()
    }

    /// Waits for and returns the next `(clip_id, results)` pair
    ///
    #[pyo3(signature = ())]
    fn get(&self) -> PyResult<(u64, Vec<PyAssignResult>)> {
        Python::with_gil(|py| {
            py.allow_threads(|| {
                let (clip_id, results) = self.0.get();
                match results {
                    Ok(results) => {
                        Ok((clip_id, results.into_iter().map(PyAssignResult).collect()))
                    }
                    Err(e) => Err(PyValueError::new_err(e.to_string())),
                }
            })
        })
    }

    pub fn batch_size(&self) -> usize {
        self.0.batch_size()
    }
}

#[pyclass]
#[derive(Debug, Clone)]
#[pyo3(name = "AssignBatchRequest")]
pub struct PyAssignBatchRequest {
    batch: AssignBatchRequest<Frame>,
    result: Option<AssignBatchResult>,
}

#[pymethods]
impl PyAssignBatchRequest {
    /// Constructor
    ///
    #[new]
    fn new() -> Self {
        let (batch, result) = AssignBatchRequest::new();
        Self {
            batch,
            result: Some(result),
        }
    }

    /// Appends a frame to the clip identified by `clip_id`
    ///
    #[pyo3(signature = (clip_id, pred_boxes, pred_scores, gt_boxes, gt_labels, gt_ids))]
    #[allow(clippy::too_many_arguments)]
    fn add_frame(
        &mut self,
        clip_id: u64,
        pred_boxes: Vec<[f32; 4]>,
        pred_scores: Vec<Vec<f32>>,
        gt_boxes: Vec<[f32; 4]>,
        gt_labels: Vec<i64>,
        gt_ids: Vec<i64>,
    ) -> PyResult<()> {
        let frame = build_frame(pred_boxes, pred_scores, gt_boxes, gt_labels, gt_ids)
            .map_err(|e| PyValueError::new_err(e.to_string()))?;
        self.batch.add(clip_id, frame);
        Ok(())
    }
}

#[pyclass]
#[pyo3(name = "BatchAssigner")]
pub struct PyBatchAssigner(pub(crate) BatchAssigner);

#[pymethods]
impl PyBatchAssigner {
    /// Constructor
    ///
    /// # Parameters
    /// * `width`, `height` - image dimensions shared by the batched clips;
    /// * `workers` - worker thread count, `0` to use all available cores;
    /// * `options` - assignment options shared by the workers.
    ///
    #[new]
    #[pyo3(signature = (width, height, workers = 0, options = None))]
    pub fn new(width: f32, height: f32, workers: i64, options: Option<PyAssignerOptions>) -> Self {
        let opts = options.map_or_else(AssignerOptions::default, |o| o.0);
        let shape = ImageShape::new(width, height);
        Self(if workers <= 0 {
            BatchAssigner::with_default_workers(opts, shape)
        } else {
            BatchAssigner::new(opts, shape, workers as usize)
        })
    }

    /// Dispatches the batch and returns the paired result object
    ///
    #[pyo3(signature = (batch))]
    fn predict(&mut self, mut batch: PyAssignBatchRequest) -> PyAssignBatchResult {
        Python::with_gil(|py| py.allow_threads(|| self.0.predict(batch.batch)));
        PyAssignBatchResult(batch.result.take().unwrap())
    }
}

#[pymodule]
#[pyo3(name = "clipmatch")]
fn clipmatch(m: &Bound<'_, PyModule>) -> PyResult<()> {
    pyo3_log::init();

    m.add_class::<PyClassCost>()?;
    m.add_class::<PyOverlapMetric>()?;
    m.add_class::<PyAssignerOptions>()?;
    m.add_class::<PyAssignResult>()?;
    m.add_class::<PyClip>()?;
    m.add_class::<PyClipAssigner>()?;

    m.add_class::<PyAssignBatchRequest>()?;
    m.add_class::<PyAssignBatchResult>()?;
    m.add_class::<PyBatchAssigner>()?;
    Ok(())
}
