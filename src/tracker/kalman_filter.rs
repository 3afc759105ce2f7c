//! Constant-acceleration Kalman filter whose covariance is shared by every track.
//!
//! The state of a track is `[x, y, vx, vy, ax, ay]`. Only the state vectors
//! are per track; `P` is advanced once per frame for the whole population.

use ndarray::{Array1, Array2};

use crate::tracker::config::NoiseConfig;
use crate::tracker::error::TrackerError;

const STATE_DIM: usize = 6;
const MEASUREMENT_DIM: usize = 2;

#[derive(Debug, Clone)]
pub struct SharedKalmanFilter {
    motion_mat: Array2<f64>,
    update_mat: Array2<f64>,
    process_cov: Array2<f64>,
    measurement_cov: Array2<f64>,
    covariance: Array2<f64>,
}

impl Default for SharedKalmanFilter {
    fn default() -> Self {
        Self::new(&NoiseConfig::default())
    }
}

impl SharedKalmanFilter {
    pub fn new(noise: &NoiseConfig) -> Self {
        let dt = 1.0;

        let mut motion_mat = Array2::eye(STATE_DIM);
        for i in 0..MEASUREMENT_DIM {
            motion_mat[[i, MEASUREMENT_DIM + i]] = dt;
            motion_mat[[i, 2 * MEASUREMENT_DIM + i]] = 0.5 * dt * dt;
            motion_mat[[MEASUREMENT_DIM + i, 2 * MEASUREMENT_DIM + i]] = dt;
        }

        let mut update_mat = Array2::zeros((MEASUREMENT_DIM, STATE_DIM));
        for i in 0..MEASUREMENT_DIM {
            update_mat[[i, i]] = 1.0;
        }

        let measurement_cov = Array2::<f64>::eye(MEASUREMENT_DIM) * noise.measurement_variance;

        Self {
            motion_mat,
            update_mat,
            process_cov: diagonal(NoiseConfig::expand(noise.process_noise)),
            measurement_cov,
            covariance: diagonal(NoiseConfig::expand(noise.initial_covariance)),
        }
    }

    /// State vector for a freshly observed point: at rest, no acceleration.
    pub fn initiate(&self, measurement: [f64; 2]) -> Array1<f64> {
        let mut mean = Array1::zeros(STATE_DIM);
        mean[0] = measurement[0];
        mean[1] = measurement[1];
        mean
    }

    /// `x' = F·x`
    pub fn predict_state(&self, mean: &Array1<f64>) -> Array1<f64> {
        self.motion_mat.dot(mean)
    }

    /// `P' = F·P·Fᵗ + Q`
    pub fn predict_covariance(&mut self) {
        self.covariance =
            self.motion_mat.dot(&self.covariance).dot(&self.motion_mat.t()) + &self.process_cov;
    }

    /// Position part of a state, `H·x`.
    pub fn project(&self, mean: &Array1<f64>) -> Array1<f64> {
        self.update_mat.dot(mean)
    }

    /// Gain `K = P·Hᵗ·(H·P·Hᵗ + R)⁻¹` for the current shared covariance.
    pub fn gain(&self) -> Result<Array2<f64>, TrackerError> {
        let pht = self.covariance.dot(&self.update_mat.t()); // 6x2
        let innovation_cov = self.update_mat.dot(&pht) + &self.measurement_cov;
        let s_inv = invert_2x2(&innovation_cov).ok_or(TrackerError::SingularInnovation)?;
        Ok(pht.dot(&s_inv))
    }

    /// Correct one state with a measurement using a precomputed gain.
    ///
    /// Returns the corrected state and the residual that was applied.
    pub fn correct(
        &self,
        mean: &Array1<f64>,
        gain: &Array2<f64>,
        measurement: [f64; 2],
    ) -> (Array1<f64>, Array1<f64>) {
        let residual = Array1::from_vec(measurement.to_vec()) - self.project(mean);
        let new_mean = mean + &gain.dot(&residual);
        (new_mean, residual)
    }

    /// `P = (I − K·H)·P`
    pub fn apply_posterior(&mut self, gain: &Array2<f64>) {
        let identity = Array2::<f64>::eye(STATE_DIM);
        self.covariance = (identity - gain.dot(&self.update_mat)).dot(&self.covariance);
    }

    pub fn covariance(&self) -> &Array2<f64> {
        &self.covariance
    }
}

fn diagonal(values: [f64; STATE_DIM]) -> Array2<f64> {
    Array2::from_diag(&Array1::from_vec(values.to_vec()))
}

/// Invert a 2x2 matrix using nalgebra (pure Rust).
fn invert_2x2(m: &Array2<f64>) -> Option<Array2<f64>> {
    let nm = nalgebra::Matrix2::new(m[[0, 0]], m[[0, 1]], m[[1, 0]], m[[1, 1]]);
    let inv = nm.try_inverse()?;
    let mut res = Array2::zeros((2, 2));
    for i in 0..2 {
        for j in 0..2 {
            res[[i, j]] = inv[(i, j)];
        }
    }
    Some(res)
}
