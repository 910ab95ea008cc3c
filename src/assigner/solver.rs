use nalgebra::DMatrix;
use pathfinding::kuhn_munkres::kuhn_munkres_min;
use pathfinding::matrix::Matrix;

const F32_I64_MULT: f32 = 1_000_000.0;

/// Minimum-cost one-to-one assignment over the fused cost matrix.
///
/// Costs are scaled to `i64` before solving. The solver expects at most as
/// many rows as columns, so a matrix with more predictions than roster
/// identities is solved transposed; either way the smaller side is matched
/// completely and no row or column is used twice.
///
/// Returns `(prediction, roster identity)` pairs ordered by prediction.
///
pub fn solve(fused: &DMatrix<f32>) -> Vec<(usize, usize)> {
    let rows = fused.nrows();
    let cols = fused.ncols();
    if rows == 0 || cols == 0 {
        return Vec::default();
    }

    let transposed = rows > cols;
    let (height, width) = if transposed { (cols, rows) } else { (rows, cols) };

    let mut weights = Matrix::new(height, width, 0i64);
    for r in 0..rows {
        for c in 0..cols {
            let cell = if transposed { (c, r) } else { (r, c) };
            *weights.get_mut(cell).unwrap() = (fused[(r, c)] * F32_I64_MULT) as i64;
        }
    }

    let (_, assignments) = kuhn_munkres_min(&weights);

    let mut pairs = assignments
        .into_iter()
        .enumerate()
        .map(|(i, j)| if transposed { (j, i) } else { (i, j) })
        .collect::<Vec<_>>();
    pairs.sort_unstable();
    pairs
}

#[cfg(test)]
mod tests {
    use crate::assigner::solver::solve;
    use nalgebra::DMatrix;

    #[test]
    fn square_matrix() {
        let fused = DMatrix::from_row_slice(3, 3, &[1.0, 2.0, 3.0, 2.0, 4.0, 6.0, 3.0, 6.0, 9.0]);
        assert_eq!(solve(&fused), vec![(0, 2), (1, 1), (2, 0)]);
    }

    #[test]
    fn fewer_predictions_than_identities() {
        let fused = DMatrix::from_row_slice(2, 3, &[1.0, 0.2, 5.0, 5.0, 1.0, 0.1]);
        assert_eq!(solve(&fused), vec![(0, 1), (1, 2)]);
    }

    #[test]
    fn more_predictions_than_identities() {
        let fused = DMatrix::from_row_slice(3, 2, &[8.0, 1.0, 2.0, 8.0, 8.0, 8.0]);
        assert_eq!(solve(&fused), vec![(0, 1), (1, 0)]);
    }

    #[test]
    fn single_column_picks_cheapest_row() {
        let fused = DMatrix::from_row_slice(3, 1, &[3.0, 1.0, 2.0]);
        assert_eq!(solve(&fused), vec![(1, 0)]);
    }

    #[test]
    fn negative_costs() {
        let fused = DMatrix::from_row_slice(2, 2, &[-5.0, 0.0, 0.0, -5.0]);
        assert_eq!(solve(&fused), vec![(0, 0), (1, 1)]);
    }
}
