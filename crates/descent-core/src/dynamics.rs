//! Planar rigid-body dynamics of a gimbaled single-engine rocket
//!
//! State (6): crossrange position x, altitude y, velocities vx/vy,
//! pitch angle θ, pitch rate ω. Control (2): throttle fraction and
//! gimbal deflection δ relative to the body axis.
//!
//! ```text
//! ẋ  = vx
//! ẏ  = vy
//! v̇x = T_max·u·sin(δ + θ) / m
//! v̇y = T_max·u·cos(δ + θ) / m − g
//! θ̇  = ω
//! ω̇  = −T_max·u·sin(δ)·r_b / I
//! ```
//!
//! Thrust is oriented by body pitch plus gimbal offset; torque comes
//! only from the gimbal deflection of total thrust. The derivative is a
//! pure, branch-free function of (state, control) so a differentiating
//! backend can consume it directly.

use nalgebra::{Vector2, Vector6};
use serde::{Deserialize, Serialize};

use crate::vehicle::VehicleParams;
use crate::{ControlVector, StateVector, CONTROL_DIM, STATE_DIM};

/// Planar lander state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LanderState {
    /// Crossrange position [m]
    pub x: f64,
    /// Altitude [m]
    pub y: f64,
    /// Crossrange velocity [m/s]
    pub vx: f64,
    /// Vertical velocity [m/s]
    pub vy: f64,
    /// Pitch angle [rad], zero when upright
    pub pitch: f64,
    /// Pitch rate [rad/s]
    pub pitch_rate: f64,
}

impl LanderState {
    /// The all-zero (landed, upright, at rest) state
    pub fn zero() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            vx: 0.0,
            vy: 0.0,
            pitch: 0.0,
            pitch_rate: 0.0,
        }
    }

    /// Pack into a flat vector `[x, y, vx, vy, θ, ω]`
    pub fn to_vector(&self) -> StateVector {
        Vector6::new(self.x, self.y, self.vx, self.vy, self.pitch, self.pitch_rate)
    }

    /// Unpack from a flat vector
    pub fn from_vector(v: &StateVector) -> Self {
        Self {
            x: v[0],
            y: v[1],
            vx: v[2],
            vy: v[3],
            pitch: v[4],
            pitch_rate: v[5],
        }
    }

    /// Unpack from a slice; `None` when the length is not [`STATE_DIM`]
    pub fn from_slice(v: &[f64]) -> Option<Self> {
        if v.len() != STATE_DIM {
            return None;
        }
        Some(Self {
            x: v[0],
            y: v[1],
            vx: v[2],
            vy: v[3],
            pitch: v[4],
            pitch_rate: v[5],
        })
    }
}

/// Engine command at a trajectory node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LanderControl {
    /// Throttle fraction of maximum thrust [-]
    pub throttle: f64,
    /// Gimbal deflection relative to the body axis [rad]
    pub gimbal: f64,
}

impl LanderControl {
    /// Zero command (engine off, gimbal centered)
    pub fn zero() -> Self {
        Self {
            throttle: 0.0,
            gimbal: 0.0,
        }
    }

    /// Pack into a flat vector `[throttle, gimbal]`
    pub fn to_vector(&self) -> ControlVector {
        Vector2::new(self.throttle, self.gimbal)
    }

    /// Unpack from a flat vector
    pub fn from_vector(v: &ControlVector) -> Self {
        Self {
            throttle: v[0],
            gimbal: v[1],
        }
    }

    /// Unpack from a slice; `None` when the length is not [`CONTROL_DIM`]
    pub fn from_slice(v: &[f64]) -> Option<Self> {
        if v.len() != CONTROL_DIM {
            return None;
        }
        Some(Self {
            throttle: v[0],
            gimbal: v[1],
        })
    }
}

/// Continuous-time dynamics of the planar lander
#[derive(Debug, Clone)]
pub struct PlanarDynamics {
    params: VehicleParams,
    inertia: f64,
}

impl PlanarDynamics {
    /// Create the dynamics for a given vehicle
    pub fn new(params: VehicleParams) -> Self {
        let inertia = params.inertia();
        Self { params, inertia }
    }

    /// Vehicle parameters backing this model
    pub fn params(&self) -> &VehicleParams {
        &self.params
    }

    /// State derivative at (state, control)
    pub fn derivative(&self, state: &LanderState, control: &LanderControl) -> StateVector {
        self.derivative_raw(&state.to_vector(), &control.to_vector())
    }

    /// State derivative on flat vectors
    ///
    /// The collocation builder calls this form on decision-variable
    /// slices, including the Hermite midpoint auxiliaries.
    pub fn derivative_raw(&self, x: &StateVector, u: &ControlVector) -> StateVector {
        let p = &self.params;
        let thrust = p.max_thrust * u[0];
        let pointing = u[1] + x[4];

        Vector6::new(
            x[2],
            x[3],
            thrust * pointing.sin() / p.mass,
            thrust * pointing.cos() / p.mass - p.gravity,
            x[5],
            -thrust * u[1].sin() * p.thrust_arm / self.inertia,
        )
    }
}
