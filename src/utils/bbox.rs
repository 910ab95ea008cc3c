use crate::{EstimateClose, EPS};

/// Image dimensions used to move boxes between normalized and absolute
/// pixel coordinates.
///
#[derive(Clone, Debug, Copy)]
pub struct ImageShape {
    pub width: f32,
    pub height: f32,
}

impl ImageShape {
    /// Constructor
    ///
    pub fn new(width: f32, height: f32) -> Self {
        assert!(width > 0.0 && height > 0.0);
        Self { width, height }
    }
}

/// Overlap metric computed between a predicted and a ground-truth box.
///
/// * `IoU` - intersection over union;
/// * `IoF` - intersection over the predicted (foreground) box;
/// * `GIoU` - generalized intersection over union, negative for disjoint
///   boxes pulled apart by a large enclosing region.
///
#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub enum OverlapMetric {
    IoU,
    IoF,
    GIoU,
}

impl Default for OverlapMetric {
    fn default() -> Self {
        OverlapMetric::GIoU
    }
}

/// Predicted box in center-size encoding (cx, cy, w, h), normalized to [0,1].
///
#[derive(Clone, Default, Debug, Copy)]
pub struct CenterBox {
    pub cx: f32,
    pub cy: f32,
    pub w: f32,
    pub h: f32,
}

impl CenterBox {
    /// Constructor
    ///
    pub fn new(cx: f32, cy: f32, w: f32, h: f32) -> Self {
        Self { cx, cy, w, h }
    }

    /// Corner encoding on the same normalized scale
    ///
    pub fn to_corners(&self) -> CornerBox {
        CornerBox {
            x1: self.cx - self.w / 2.0,
            y1: self.cy - self.h / 2.0,
            x2: self.cx + self.w / 2.0,
            y2: self.cy + self.h / 2.0,
        }
    }

    /// Corner encoding scaled to absolute pixel coordinates
    ///
    pub fn denormalize(&self, shape: &ImageShape) -> CornerBox {
        let c = self.to_corners();
        CornerBox {
            x1: c.x1 * shape.width,
            y1: c.y1 * shape.height,
            x2: c.x2 * shape.width,
            y2: c.y2 * shape.height,
        }
    }
}

impl EstimateClose for CenterBox {
    fn almost_same(&self, other: &Self, eps: f32) -> bool {
        (self.cx - other.cx).abs() < eps
            && (self.cy - other.cy).abs() < eps
            && (self.w - other.w).abs() < eps
            && (self.h - other.h).abs() < eps
    }
}

impl PartialEq<Self> for CenterBox {
    fn eq(&self, other: &Self) -> bool {
        self.almost_same(other, EPS)
    }
}

/// Box in corner encoding (x1, y1, x2, y2).
///
#[derive(Clone, Default, Debug, Copy)]
pub struct CornerBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl CornerBox {
    /// Constructor
    ///
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Corner encoding divided by the image dimensions
    ///
    pub fn normalize(&self, shape: &ImageShape) -> CornerBox {
        CornerBox {
            x1: self.x1 / shape.width,
            y1: self.y1 / shape.height,
            x2: self.x2 / shape.width,
            y2: self.y2 / shape.height,
        }
    }

    /// Sum of absolute coordinate differences
    ///
    pub fn l1_distance(&self, other: &CornerBox) -> f32 {
        (self.x1 - other.x1).abs()
            + (self.y1 - other.y1).abs()
            + (self.x2 - other.x2).abs()
            + (self.y2 - other.y2).abs()
    }

    pub fn intersection(l: &CornerBox, r: &CornerBox) -> f32 {
        let (x1, y1) = (l.x1.max(r.x1), l.y1.max(r.y1));
        let (x2, y2) = (l.x2.min(r.x2), l.y2.min(r.y2));

        let int_width = x2 - x1;
        let int_height = y2 - y1;

        if int_width > 0.0 && int_height > 0.0 {
            int_width * int_height
        } else {
            0.0
        }
    }

    /// Overlap of `self` (the predicted box) with a ground-truth box.
    ///
    /// Degenerate denominators are clamped by `EPS`, so disjoint or
    /// zero-area boxes produce finite values, never NaN.
    ///
    pub fn overlap(&self, other: &CornerBox, metric: OverlapMetric) -> f32 {
        let inter = CornerBox::intersection(self, other);
        let union = match metric {
            OverlapMetric::IoU | OverlapMetric::GIoU => self.area() + other.area() - inter,
            OverlapMetric::IoF => self.area(),
        };
        let union = union.max(EPS);
        let iou = inter / union;

        match metric {
            OverlapMetric::IoU | OverlapMetric::IoF => iou,
            OverlapMetric::GIoU => {
                let enclose_width = (self.x2.max(other.x2) - self.x1.min(other.x1)).max(0.0);
                let enclose_height = (self.y2.max(other.y2) - self.y1.min(other.y1)).max(0.0);
                let enclose_area = (enclose_width * enclose_height).max(EPS);
                iou - (enclose_area - union) / enclose_area
            }
        }
    }
}

impl EstimateClose for CornerBox {
    fn almost_same(&self, other: &Self, eps: f32) -> bool {
        (self.x1 - other.x1).abs() < eps
            && (self.y1 - other.y1).abs() < eps
            && (self.x2 - other.x2).abs() < eps
            && (self.y2 - other.y2).abs() < eps
    }
}

impl PartialEq<Self> for CornerBox {
    fn eq(&self, other: &Self) -> bool {
        self.almost_same(other, EPS)
    }
}

#[cfg(test)]
mod tests {
    use crate::utils::bbox::{CenterBox, CornerBox, ImageShape, OverlapMetric};
    use crate::EPS;

    #[test]
    fn center_to_corners() {
        let cb = CenterBox::new(0.5, 0.5, 0.2, 0.4);
        let corners = cb.to_corners();
        assert_eq!(corners, CornerBox::new(0.4, 0.3, 0.6, 0.7));

        let abs = cb.denormalize(&ImageShape::new(100.0, 200.0));
        assert_eq!(abs, CornerBox::new(40.0, 60.0, 60.0, 140.0));

        let back = abs.normalize(&ImageShape::new(100.0, 200.0));
        assert_eq!(back, corners);
    }

    #[test]
    fn test_iou() {
        let bb1 = CornerBox::new(-1.0, -1.0, 1.0, 1.0);
        let bb2 = CornerBox::new(-0.9, -0.9, 1.1, 1.1);
        let bb3 = CornerBox::new(1.0, 1.0, 4.0, 4.0);

        assert!(bb1.overlap(&bb1, OverlapMetric::IoU) > 0.999);
        assert!(bb2.overlap(&bb2, OverlapMetric::IoU) > 0.999);
        assert!(bb1.overlap(&bb2, OverlapMetric::IoU) > 0.8);
        assert!(bb1.overlap(&bb3, OverlapMetric::IoU) < 0.001);
        assert!(bb2.overlap(&bb3, OverlapMetric::IoU) < 0.001);
    }

    #[test]
    fn test_iof_asymmetry() {
        let pred = CornerBox::new(0.0, 0.0, 2.0, 2.0);
        let gt = CornerBox::new(0.0, 0.0, 4.0, 4.0);

        // intersection is the whole predicted box
        assert!((pred.overlap(&gt, OverlapMetric::IoF) - 1.0).abs() < EPS);
        assert!((gt.overlap(&pred, OverlapMetric::IoF) - 0.25).abs() < EPS);
    }

    #[test]
    fn test_giou() {
        let bb1 = CornerBox::new(0.0, 0.0, 2.0, 2.0);
        assert!((bb1.overlap(&bb1, OverlapMetric::GIoU) - 1.0).abs() < EPS);

        // identical to IoU when the enclosing box equals the union
        let half = CornerBox::new(0.0, 0.0, 1.0, 2.0);
        assert!(
            (bb1.overlap(&half, OverlapMetric::GIoU) - bb1.overlap(&half, OverlapMetric::IoU))
                .abs()
                < EPS
        );

        // disjoint boxes go negative
        let far = CornerBox::new(4.0, 0.0, 6.0, 2.0);
        assert!(bb1.overlap(&far, OverlapMetric::GIoU) < 0.0);

        // further apart is worse
        let farther = CornerBox::new(8.0, 0.0, 10.0, 2.0);
        assert!(
            bb1.overlap(&farther, OverlapMetric::GIoU) < bb1.overlap(&far, OverlapMetric::GIoU)
        );
    }

    #[test]
    fn l1_distance() {
        let a = CornerBox::new(0.0, 0.0, 1.0, 1.0);
        let b = CornerBox::new(0.1, 0.2, 1.0, 0.9);
        assert!((a.l1_distance(&b) - 0.4).abs() < EPS);
        assert!(a.l1_distance(&a).abs() < EPS);
    }
}
