use crate::assigner::alignment::ClipAlignment;
use crate::Errors;
use anyhow::Result;
use nalgebra::DMatrix;

/// Collapses per-frame cost matrices into one clip-level matrix over the
/// identity roster.
///
/// Column `i` of the result averages the frame cost columns of roster
/// identity `i` over the frames where it appears. Frames missing the identity
/// contribute nothing, so an intermittent instance is scored only on the
/// evidence that exists for it.
///
pub fn fuse(costs: &[DMatrix<f32>], alignment: &ClipAlignment) -> Result<DMatrix<f32>> {
    let preds = costs.first().map_or(0, DMatrix::nrows);
    let identities = alignment.num_identities();

    let mut fused = DMatrix::zeros(preds, identities);
    let mut presence = vec![0.0f32; identities];

    for (cost, columns) in costs.iter().zip(alignment.frames()) {
        for (i, local) in columns.local_cols().iter().enumerate() {
            if let Some(col) = *local {
                let mut acc = fused.column_mut(i);
                acc += cost.column(col);
                presence[i] += 1.0;
            }
        }
    }

    for (i, &weight) in presence.iter().enumerate() {
        if weight == 0.0 {
            return Err(Errors::ZeroPresenceWeight {
                identity: alignment.identities()[i],
            }
            .into());
        }
        let mut column = fused.column_mut(i);
        column /= weight;
    }

    Ok(fused)
}
