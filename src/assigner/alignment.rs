use crate::clip::Clip;
use itertools::Itertools;

/// Maps the clip-wide identity roster onto the per-frame ground-truth order.
///
/// The roster holds every distinct instance identity seen anywhere in the
/// clip, ascending. Fused cost columns and assignment columns are indexed by
/// position in this roster; each frame then translates a roster position back
/// into its own ground-truth index, or reports the identity absent.
///
#[derive(Debug, Clone)]
pub struct ClipAlignment {
    identities: Vec<i64>,
    frames: Vec<FrameColumns>,
}

/// Roster position to local ground-truth index translation for one frame.
#[derive(Debug, Clone)]
pub struct FrameColumns {
    local_cols: Vec<Option<usize>>,
}

impl ClipAlignment {
    /// Constructor
    ///
    pub fn new(clip: &Clip) -> Self {
        let identities = clip
            .frames()
            .iter()
            .flat_map(|f| f.gt_ids().iter().copied())
            .sorted()
            .dedup()
            .collect::<Vec<_>>();

        let frames = clip
            .frames()
            .iter()
            .map(|f| FrameColumns {
                local_cols: identities
                    .iter()
                    .map(|gid| f.gt_ids().iter().position(|id| id == gid))
                    .collect(),
            })
            .collect();

        Self { identities, frames }
    }

    pub fn identities(&self) -> &[i64] {
        &self.identities
    }

    pub fn num_identities(&self) -> usize {
        self.identities.len()
    }

    pub fn frames(&self) -> &[FrameColumns] {
        &self.frames
    }
}

impl FrameColumns {
    /// Ground-truth index of the roster identity within the frame, `None`
    /// when the identity does not appear in it
    pub fn local_col(&self, identity: usize) -> Option<usize> {
        self.local_cols[identity]
    }

    pub fn local_cols(&self) -> &[Option<usize>] {
        &self.local_cols
    }
}

#[cfg(test)]
mod tests {
    use crate::assigner::alignment::ClipAlignment;
    use crate::clip::{Clip, Frame};
    use crate::utils::bbox::{CenterBox, CornerBox, ImageShape};
    use nalgebra::DMatrix;

    fn frame_with_ids(ids: &[i64]) -> Frame {
        Frame::new(
            vec![CenterBox::new(0.5, 0.5, 0.1, 0.1); 3],
            DMatrix::zeros(3, 2),
            vec![CornerBox::new(0.0, 0.0, 10.0, 10.0); ids.len()],
            vec![0; ids.len()],
            ids.to_vec(),
        )
        .unwrap()
    }

    #[test]
    fn roster_is_sorted_and_unique() {
        let clip = Clip::new(
            vec![frame_with_ids(&[5, 3]), frame_with_ids(&[3, 9])],
            ImageShape::new(100.0, 100.0),
        )
        .unwrap();

        let alignment = ClipAlignment::new(&clip);
        assert_eq!(alignment.identities(), &[3, 5, 9]);
    }

    #[test]
    fn roster_translates_to_frame_order() {
        let clip = Clip::new(
            vec![frame_with_ids(&[5, 3]), frame_with_ids(&[3])],
            ImageShape::new(100.0, 100.0),
        )
        .unwrap();

        let alignment = ClipAlignment::new(&clip);
        let first = &alignment.frames()[0];
        assert_eq!(first.local_col(0), Some(1));
        assert_eq!(first.local_col(1), Some(0));

        let second = &alignment.frames()[1];
        assert_eq!(second.local_col(0), Some(0));
        assert_eq!(second.local_col(1), None);
    }

    #[test]
    fn duplicate_identity_takes_first_position() {
        let clip = Clip::new(
            vec![frame_with_ids(&[4, 4])],
            ImageShape::new(100.0, 100.0),
        )
        .unwrap();

        let alignment = ClipAlignment::new(&clip);
        assert_eq!(alignment.identities(), &[4]);
        assert_eq!(alignment.frames()[0].local_col(0), Some(0));
    }

    #[test]
    fn empty_clip_empty_roster() {
        let clip = Clip::new(vec![], ImageShape::new(100.0, 100.0)).unwrap();
        let alignment = ClipAlignment::new(&clip);
        assert_eq!(alignment.num_identities(), 0);
        assert!(alignment.frames().is_empty());
    }
}
