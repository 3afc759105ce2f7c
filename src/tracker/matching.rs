//! Matching utilities: distance costs and gated optimal assignment.

use log::{trace, warn};
use ndarray::Array2;

use crate::tracker::detection::Detection;

/// Cost given to padding cells when the problem is squared up for the solver.
const PADDING_COST: f64 = 1e6;

/// Compute the Euclidean distance matrix between predicted positions and detections.
pub fn euclidean_distance(predictions: &[Detection], detections: &[Detection]) -> Array2<f64> {
    let mut dists = Array2::zeros((predictions.len(), detections.len()));
    for (i, p) in predictions.iter().enumerate() {
        for (j, d) in detections.iter().enumerate() {
            dists[[i, j]] = p.distance(d);
        }
    }
    dists
}

/// Outcome of [`linear_assignment`], in dense row/column indices.
#[derive(Debug, Clone, Default)]
pub struct AssignmentResult {
    pub matches: Vec<(usize, usize)>,
    pub unmatched_tracks: Vec<usize>,
    pub unmatched_detections: Vec<usize>,
    /// Optimal pairs whose cost exceeded the threshold
    pub rejected: Vec<(usize, usize)>,
    /// The solver returned an error and nothing was matched
    pub failed: bool,
}

/// Minimum-cost one-to-one assignment of rows to columns.
///
/// Pairs costing more than `thresh` are rejected after solving and both of
/// their sides are reported unmatched.
pub fn linear_assignment(cost_matrix: &Array2<f64>, thresh: f64) -> AssignmentResult {
    let (num_rows, num_cols) = cost_matrix.dim();

    if num_rows == 0 {
        return AssignmentResult {
            unmatched_detections: (0..num_cols).collect(),
            ..Default::default()
        };
    }

    if num_cols == 0 {
        return AssignmentResult {
            unmatched_tracks: (0..num_rows).collect(),
            ..Default::default()
        };
    }

    let size = num_rows.max(num_cols);
    let mut padded = Array2::<f64>::from_elem((size, size), PADDING_COST);
    padded
        .slice_mut(ndarray::s![..num_rows, ..num_cols])
        .assign(cost_matrix);

    let mut result = AssignmentResult::default();
    let mut unmatched_detections_mask: Vec<bool> = vec![true; num_cols];

    match lapjv::lapjv(&padded) {
        Ok((row_to_col, _)) => {
            for (row_idx, &col_idx) in row_to_col.iter().enumerate().take(num_rows) {
                if col_idx >= num_cols {
                    result.unmatched_tracks.push(row_idx);
                } else if cost_matrix[[row_idx, col_idx]] <= thresh {
                    result.matches.push((row_idx, col_idx));
                    unmatched_detections_mask[col_idx] = false;
                } else {
                    trace!(
                        "Pair ({}, {}) rejected: cost {} > {}",
                        row_idx,
                        col_idx,
                        cost_matrix[[row_idx, col_idx]],
                        thresh
                    );
                    result.rejected.push((row_idx, col_idx));
                    result.unmatched_tracks.push(row_idx);
                }
            }
        }
        Err(e) => {
            warn!("Assignment solver failed on a {}x{} problem: {:?}", num_rows, num_cols, e);
            result.failed = true;
            result.unmatched_tracks = (0..num_rows).collect();
        }
    }

    result.unmatched_detections = unmatched_detections_mask
        .iter()
        .enumerate()
        .filter_map(|(i, &u)| if u { Some(i) } else { None })
        .collect();

    result
}

/// Gated matching between active tracks and the frame's detections,
/// expressed in absolute track slots.
#[derive(Debug, Clone, Default)]
pub struct Association {
    /// Accepted `(track_slot, detection_index)` pairs
    pub matches: Vec<(usize, usize)>,
    /// Active slots without an accepted pair
    pub unmatched_slots: Vec<usize>,
    /// Detection indices without an accepted pair
    pub unmatched_detections: Vec<usize>,
    /// Optimal pairs rejected by the gate, with their cost
    pub rejected: Vec<(usize, usize, f64)>,
    /// Sum of the accepted pair costs
    pub total_cost: f64,
    pub solver_failed: bool,
}

impl Association {
    /// Either side of the problem was empty.
    pub fn is_degenerate(&self) -> bool {
        self.matches.is_empty()
            && self.rejected.is_empty()
            && (self.unmatched_slots.is_empty() || self.unmatched_detections.is_empty())
    }
}

/// Associate predicted positions with detections.
///
/// `active_slots[i]` is the slot whose prediction is `predictions[i]`; solver
/// rows are mapped back through it directly.
pub fn associate(
    active_slots: &[usize],
    predictions: &[Detection],
    detections: &[Detection],
    gating_distance: f64,
) -> Association {
    debug_assert_eq!(active_slots.len(), predictions.len());

    let costs = euclidean_distance(predictions, detections);
    let AssignmentResult {
        matches,
        unmatched_tracks,
        unmatched_detections,
        rejected,
        failed,
    } = linear_assignment(&costs, gating_distance);

    let total_cost = matches.iter().map(|&(row, col)| costs[[row, col]]).sum();

    Association {
        matches: matches
            .into_iter()
            .map(|(row, col)| (active_slots[row], col))
            .collect(),
        unmatched_slots: unmatched_tracks.into_iter().map(|row| active_slots[row]).collect(),
        unmatched_detections,
        rejected: rejected
            .into_iter()
            .map(|(row, col)| (active_slots[row], col, costs[[row, col]]))
            .collect(),
        total_cost,
        solver_failed: failed,
    }
}
