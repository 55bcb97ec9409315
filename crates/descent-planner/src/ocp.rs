//! OCP definition and decision-variable layout
//!
//! The optimal control problem couples a vehicle, its boundary
//! conditions, and a planner configuration. The decision vector handed
//! to the NLP backend is flat; [`VariableLayout`] is the single source
//! of truth for where each node state, node control, and Hermite
//! midpoint auxiliary lives inside it.

use nalgebra::DVector;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use descent_core::dynamics::{LanderControl, LanderState, PlanarDynamics};
use descent_core::vehicle::{BoundaryConditions, ScaleFactors, VehicleParams};
use descent_core::{CONTROL_DIM, STATE_DIM};

use crate::config::PlannerConfig;

/// Construction-time problem errors, fatal and non-recoverable
#[derive(Debug, Error)]
pub enum ProblemError {
    #[error("horizon time must be positive, got {0}")]
    NonPositiveHorizon(f64),
    #[error("step size must be positive, got {0}")]
    NonPositiveStep(f64),
    #[error("step size {dt} exceeds horizon {horizon}")]
    StepExceedsHorizon { dt: f64, horizon: f64 },
    #[error("discretization needs at least 2 nodes, got {0}")]
    TooFewNodes(usize),
    #[error("initial altitude must be positive for the glide cone, got {0}")]
    NonPositiveInitialAltitude(f64),
}

/// Complete problem definition: vehicle, boundary conditions, config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcpDefinition {
    /// Vehicle physical envelope
    pub vehicle: VehicleParams,
    /// Fixed initial and terminal states
    pub boundary: BoundaryConditions,
    /// Planner configuration
    pub config: PlannerConfig,
}

impl Default for OcpDefinition {
    fn default() -> Self {
        Self {
            vehicle: VehicleParams::default(),
            boundary: BoundaryConditions::default(),
            config: PlannerConfig::default(),
        }
    }
}

impl OcpDefinition {
    /// State dimension per node
    pub fn nx(&self) -> usize {
        STATE_DIM
    }

    /// Control dimension per node
    pub fn nu(&self) -> usize {
        CONTROL_DIM
    }

    /// Number of trajectory nodes N
    pub fn num_nodes(&self) -> usize {
        self.config.horizon.num_nodes()
    }

    /// Scale factors for solver-side non-dimensionalization
    pub fn scale_factors(&self) -> ScaleFactors {
        self.boundary.scale_factors()
    }

    /// Check the definition before any variables are declared
    pub fn validate(&self) -> Result<(), ProblemError> {
        let horizon = &self.config.horizon;
        if horizon.horizon_time <= 0.0 {
            return Err(ProblemError::NonPositiveHorizon(horizon.horizon_time));
        }
        if horizon.dt <= 0.0 {
            return Err(ProblemError::NonPositiveStep(horizon.dt));
        }
        if horizon.dt > horizon.horizon_time {
            return Err(ProblemError::StepExceedsHorizon {
                dt: horizon.dt,
                horizon: horizon.horizon_time,
            });
        }
        let n = horizon.num_nodes();
        if n < 2 {
            return Err(ProblemError::TooFewNodes(n));
        }
        if self.boundary.initial.y <= 0.0 {
            return Err(ProblemError::NonPositiveInitialAltitude(self.boundary.initial.y));
        }
        Ok(())
    }

    /// Decision-variable layout for this problem
    pub fn layout(&self) -> VariableLayout {
        VariableLayout::new(self.num_nodes())
    }

    /// Initial-guess node trajectory
    ///
    /// Straight-line interpolation in full state space with step
    /// `(final - initial) / N`; the last row is pinned to the terminal
    /// condition so every one of the N rows is meaningful. Throttle is
    /// guessed at the midpoint of its allowed range, gimbal at zero.
    pub fn initial_guess_nodes(&self) -> (Vec<LanderState>, Vec<LanderControl>) {
        let n = self.num_nodes();
        let x0 = self.boundary.initial.to_vector();
        let xf = self.boundary.terminal.to_vector();
        let step = (xf - x0) / n as f64;

        let mut states = Vec::with_capacity(n);
        for i in 0..n {
            states.push(LanderState::from_vector(&(x0 + step * i as f64)));
        }
        states[n - 1] = self.boundary.terminal;

        let guess_control = LanderControl {
            throttle: (1.0 + self.vehicle.min_throttle) / 2.0,
            gimbal: 0.0,
        };
        let controls = vec![guess_control; n];

        (states, controls)
    }

    /// Full initial guess over the flat decision vector
    ///
    /// Midpoint auxiliaries are seeded so that the per-interval midpoint
    /// definition rows are already satisfied at the guess.
    pub fn initial_guess(&self) -> DVector<f64> {
        let layout = self.layout();
        let (states, controls) = self.initial_guess_nodes();
        let dynamics = PlanarDynamics::new(self.vehicle.clone());
        let dt = self.config.horizon.dt;

        let mut w = DVector::zeros(layout.num_variables());

        for (i, state) in states.iter().enumerate() {
            w.rows_mut(layout.state_start(i), STATE_DIM)
                .copy_from(&state.to_vector());
        }
        for (i, control) in controls.iter().enumerate() {
            w.rows_mut(layout.control_start(i), CONTROL_DIM)
                .copy_from(&control.to_vector());
        }

        for i in 0..layout.num_intervals() {
            let xi = states[i].to_vector();
            let xn = states[i + 1].to_vector();
            let fi = dynamics.derivative(&states[i], &controls[i]);
            let fn_ = dynamics.derivative(&states[i + 1], &controls[i + 1]);
            let x_mid = (xi + xn) * 0.5 + (fi - fn_) * (dt / 8.0);

            let ui = controls[i].to_vector();
            let un = controls[i + 1].to_vector();
            let u_mid = ui + (ui + un) * 0.5;

            w.rows_mut(layout.mid_state_start(i), STATE_DIM).copy_from(&x_mid);
            w.rows_mut(layout.mid_control_start(i), CONTROL_DIM)
                .copy_from(&u_mid);
        }

        w
    }
}

/// Flat decision-vector layout
///
/// Ordering: `[states N×6 | controls N×2 | midpoint states (N-1)×6 |
/// midpoint controls (N-1)×2]`. Backends must preserve this ordering
/// when translating to their native representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariableLayout {
    num_nodes: usize,
}

impl VariableLayout {
    /// Layout for an N-node trajectory
    pub fn new(num_nodes: usize) -> Self {
        Self { num_nodes }
    }

    /// Number of trajectory nodes N
    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    /// Number of collocation intervals N-1
    pub fn num_intervals(&self) -> usize {
        self.num_nodes - 1
    }

    /// Total decision-variable count
    pub fn num_variables(&self) -> usize {
        self.num_nodes * (STATE_DIM + CONTROL_DIM)
            + self.num_intervals() * (STATE_DIM + CONTROL_DIM)
    }

    /// Offset of node state i
    pub fn state_start(&self, i: usize) -> usize {
        debug_assert!(i < self.num_nodes);
        i * STATE_DIM
    }

    /// Offset of node control i
    pub fn control_start(&self, i: usize) -> usize {
        debug_assert!(i < self.num_nodes);
        self.num_nodes * STATE_DIM + i * CONTROL_DIM
    }

    /// Offset of the interval-i midpoint state auxiliary
    pub fn mid_state_start(&self, i: usize) -> usize {
        debug_assert!(i < self.num_intervals());
        self.num_nodes * (STATE_DIM + CONTROL_DIM) + i * STATE_DIM
    }

    /// Offset of the interval-i midpoint control auxiliary
    pub fn mid_control_start(&self, i: usize) -> usize {
        debug_assert!(i < self.num_intervals());
        self.num_nodes * (STATE_DIM + CONTROL_DIM)
            + self.num_intervals() * STATE_DIM
            + i * CONTROL_DIM
    }

    /// Node state i as a slice of the decision vector
    pub fn state<'a>(&self, w: &'a [f64], i: usize) -> &'a [f64] {
        &w[self.state_start(i)..self.state_start(i) + STATE_DIM]
    }

    /// Node control i as a slice of the decision vector
    pub fn control<'a>(&self, w: &'a [f64], i: usize) -> &'a [f64] {
        &w[self.control_start(i)..self.control_start(i) + CONTROL_DIM]
    }

    /// Midpoint state i as a slice of the decision vector
    pub fn mid_state<'a>(&self, w: &'a [f64], i: usize) -> &'a [f64] {
        &w[self.mid_state_start(i)..self.mid_state_start(i) + STATE_DIM]
    }

    /// Midpoint control i as a slice of the decision vector
    pub fn mid_control<'a>(&self, w: &'a [f64], i: usize) -> &'a [f64] {
        &w[self.mid_control_start(i)..self.mid_control_start(i) + CONTROL_DIM]
    }
}
