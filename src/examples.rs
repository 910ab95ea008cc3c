use crate::clip::{Clip, Frame};
use crate::utils::bbox::{CenterBox, CornerBox, ImageShape};
use nalgebra::DMatrix;
use rand::distributions::Uniform;
use rand::prelude::ThreadRng;
use rand::Rng;

/// Converts an absolute corner box into the normalized center-size encoding
/// used by predictions.
pub fn to_center(bbox: &CornerBox, shape: &ImageShape) -> CenterBox {
    let n = bbox.normalize(shape);
    CenterBox::new(
        (n.x1 + n.x2) / 2.0,
        (n.y1 + n.y2) / 2.0,
        n.x2 - n.x1,
        n.y2 - n.y1,
    )
}

/// Ground-truth instance with a fixed identity and label, drifting across
/// frames.
pub struct InstanceGen {
    identity: i64,
    label: i64,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    gen: ThreadRng,
    dist_pos: Uniform<f32>,
}

impl InstanceGen {
    pub fn new(identity: i64, label: i64, bbox: CornerBox, pos_drift: f32) -> Self {
        Self {
            identity,
            label,
            x: bbox.x1,
            y: bbox.y1,
            width: bbox.width(),
            height: bbox.height(),
            gen: rand::thread_rng(),
            dist_pos: Uniform::new(-pos_drift, pos_drift),
        }
    }

    pub fn identity(&self) -> i64 {
        self.identity
    }

    pub fn label(&self) -> i64 {
        self.label
    }
}

impl Iterator for InstanceGen {
    type Item = CornerBox;

    fn next(&mut self) -> Option<Self::Item> {
        self.x += self.gen.sample(self.dist_pos);
        self.y += self.gen.sample(self.dist_pos);
        Some(CornerBox::new(
            self.x,
            self.y,
            self.x + self.width,
            self.y + self.height,
        ))
    }
}

/// Generates frames where every instance is echoed by a well-placed,
/// confidently scored prediction, padded with noise predictions elsewhere in
/// the image.
pub struct ClipGen {
    shape: ImageShape,
    classes: usize,
    instances: Vec<InstanceGen>,
    noise_predictions: usize,
    gen: ThreadRng,
    dist_jitter: Uniform<f32>,
    dist_center: Uniform<f32>,
    dist_size: Uniform<f32>,
    dist_score: Uniform<f32>,
}

impl ClipGen {
    pub fn new(shape: ImageShape, classes: usize, noise_predictions: usize) -> Self {
        Self {
            shape,
            classes,
            instances: Vec::default(),
            noise_predictions,
            gen: rand::thread_rng(),
            dist_jitter: Uniform::new(-2.0, 2.0),
            dist_center: Uniform::new(0.1, 0.9),
            dist_size: Uniform::new(0.05, 0.2),
            dist_score: Uniform::new(-0.25, 0.25),
        }
    }

    pub fn add_instance(&mut self, instance: InstanceGen) {
        self.instances.push(instance);
    }

    pub fn num_predictions(&self) -> usize {
        self.instances.len() + self.noise_predictions
    }

    /// Collects the next `frames` generated frames into a clip
    pub fn clip(&mut self, frames: usize) -> Clip {
        let shape = self.shape;
        Clip::new(self.by_ref().take(frames).collect(), shape).unwrap()
    }
}

impl Iterator for ClipGen {
    type Item = Frame;

    fn next(&mut self) -> Option<Self::Item> {
        let preds = self.instances.len() + self.noise_predictions;
        let mut pred_boxes = Vec::with_capacity(preds);
        let mut scores = DMatrix::zeros(preds, self.classes);

        let mut gt_boxes = Vec::with_capacity(self.instances.len());
        let mut gt_labels = Vec::with_capacity(self.instances.len());
        let mut gt_ids = Vec::with_capacity(self.instances.len());

        for (i, instance) in self.instances.iter_mut().enumerate() {
            let bbox = instance.next().unwrap();
            let echo = CornerBox::new(
                bbox.x1 + self.gen.sample(self.dist_jitter),
                bbox.y1 + self.gen.sample(self.dist_jitter),
                bbox.x2 + self.gen.sample(self.dist_jitter),
                bbox.y2 + self.gen.sample(self.dist_jitter),
            );
            pred_boxes.push(to_center(&echo, &self.shape));
            scores[(i, instance.label() as usize)] = 4.0;

            gt_boxes.push(bbox);
            gt_labels.push(instance.label());
            gt_ids.push(instance.identity());
        }

        for _ in 0..self.noise_predictions {
            pred_boxes.push(CenterBox::new(
                self.gen.sample(self.dist_center),
                self.gen.sample(self.dist_center),
                self.gen.sample(self.dist_size),
                self.gen.sample(self.dist_size),
            ));
        }

        for v in scores.iter_mut() {
            *v += self.gen.sample(self.dist_score);
        }

        Some(Frame::new(pred_boxes, scores, gt_boxes, gt_labels, gt_ids).unwrap())
    }
}
