//! # Descent Core
//!
//! Planar rigid-body rocket model for powered-descent guidance.
//!
//! This library holds the physical side of the landing problem: the
//! vehicle parameter set, the 6-state / 2-control planar dynamics of a
//! gimbaled single-engine rocket, and the numerical integrators used to
//! replay or validate trajectories.
//!
//! ## Modules
//!
//! - [`vehicle`]: Vehicle parameters, boundary conditions, scaling factors
//! - [`dynamics`]: State/control types and the continuous-time dynamics
//! - [`integrator`]: RK4/Euler steppers and zero-order-hold propagation

pub mod dynamics;
pub mod integrator;
pub mod vehicle;

use nalgebra::{Vector2, Vector6};

/// Flat state vector `[x, y, vx, vy, pitch, pitch_rate]`
pub type StateVector = Vector6<f64>;

/// Flat control vector `[throttle, gimbal]`
pub type ControlVector = Vector2<f64>;

/// Number of state components
pub const STATE_DIM: usize = 6;

/// Number of control components
pub const CONTROL_DIM: usize = 2;

/// Standard gravity [m/s²]
pub const GRAVITY: f64 = 9.80665;
