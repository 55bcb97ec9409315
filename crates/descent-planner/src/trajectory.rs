//! Solved landing trajectory
//!
//! The downstream contract of the planner: N time-indexed (state,
//! control) pairs on a uniform grid, extracted from the backend's
//! decision-variable assignment. Nothing mutates a trajectory after the
//! solve returns; consumers (e.g. a visualizer) read the arrays.

use serde::{Deserialize, Serialize};

use descent_core::dynamics::{LanderControl, LanderState};
use descent_core::{CONTROL_DIM, STATE_DIM};

use crate::ocp::VariableLayout;

/// A solved state/control trajectory on a uniform time grid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LandingTrajectory {
    /// Step size [s]
    pub dt: f64,
    /// Node timestamps t_i = i·dt [s]
    pub times: Vec<f64>,
    /// State at each node
    pub states: Vec<LanderState>,
    /// Control at each node
    pub controls: Vec<LanderControl>,
}

impl LandingTrajectory {
    /// Extract the node trajectory from a flat decision vector
    ///
    /// Midpoint auxiliaries are solver-internal and are dropped here.
    /// `None` when the vector does not match the layout.
    pub fn from_solution(layout: &VariableLayout, dt: f64, w: &[f64]) -> Option<Self> {
        if w.len() != layout.num_variables() {
            return None;
        }

        let n = layout.num_nodes();
        let mut states = Vec::with_capacity(n);
        let mut controls = Vec::with_capacity(n);
        for i in 0..n {
            states.push(LanderState::from_slice(layout.state(w, i))?);
            controls.push(LanderControl::from_slice(layout.control(w, i))?);
        }

        Some(Self {
            dt,
            times: (0..n).map(|i| i as f64 * dt).collect(),
            states,
            controls,
        })
    }

    /// Number of trajectory nodes
    pub fn num_nodes(&self) -> usize {
        self.states.len()
    }

    /// Total duration [s]
    pub fn duration(&self) -> f64 {
        self.times.last().copied().unwrap_or(0.0)
    }

    /// States as an N×6 row-per-node array
    pub fn state_array(&self) -> Vec<[f64; STATE_DIM]> {
        self.states
            .iter()
            .map(|s| [s.x, s.y, s.vx, s.vy, s.pitch, s.pitch_rate])
            .collect()
    }

    /// Controls as an N×2 row-per-node array
    pub fn control_array(&self) -> Vec<[f64; CONTROL_DIM]> {
        self.controls.iter().map(|c| [c.throttle, c.gimbal]).collect()
    }

    /// Linearly interpolated state at time t, clamped to the grid
    pub fn sample_state(&self, t: f64) -> Option<LanderState> {
        if self.states.is_empty() {
            return None;
        }
        if t <= self.times[0] {
            return Some(self.states[0]);
        }
        let last = self.states.len() - 1;
        if t >= self.times[last] {
            return Some(self.states[last]);
        }

        let idx = ((t - self.times[0]) / self.dt) as usize;
        let idx = idx.min(last - 1);
        let alpha = (t - self.times[idx]) / self.dt;

        let a = self.states[idx].to_vector();
        let b = self.states[idx + 1].to_vector();
        Some(LanderState::from_vector(&(a + (b - a) * alpha)))
    }

    /// Zero-order-hold control at time t
    pub fn sample_control(&self, t: f64) -> Option<LanderControl> {
        if self.controls.is_empty() {
            return None;
        }
        if t <= self.times[0] {
            return Some(self.controls[0]);
        }
        let last = self.controls.len() - 1;
        if t >= self.times[last] {
            return Some(self.controls[last]);
        }

        let idx = ((t - self.times[0]) / self.dt) as usize;
        Some(self.controls[idx.min(last)])
    }
}
