//! Vehicle parameters and boundary conditions
//!
//! The parameter set defines the physical envelope of the lander: mass
//! properties, engine limits, and the path-constraint bounds that the
//! planner enforces. Defaults describe the reference vehicle (a 60 m
//! Starship-class booster on final descent).

use serde::{Deserialize, Serialize};

use crate::dynamics::LanderState;
use crate::GRAVITY;

/// Physical and constraint parameters of the lander
///
/// Immutable once constructed; both the dynamics and the collocation
/// builder borrow the same instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleParams {
    /// Vehicle length [m]
    pub length: f64,
    /// Vehicle width [m]
    pub width: f64,
    /// Arm between engine gimbal point and center of mass [m]
    pub thrust_arm: f64,
    /// Wet mass [kg]
    pub mass: f64,
    /// Maximum thrust [N]
    pub max_thrust: f64,
    /// Minimum throttle fraction [-]
    pub min_throttle: f64,
    /// Maximum gimbal deflection [rad]
    pub max_gimbal: f64,
    /// Glide cone gradient, tan of the cone half-angle [-]
    pub tan_cone: f64,
    /// Maximum pitch rate [rad/s]
    pub max_pitch_rate: f64,
    /// Gravitational acceleration [m/s²]
    pub gravity: f64,
}

impl Default for VehicleParams {
    fn default() -> Self {
        Self {
            length: 60.0,
            width: 9.0,
            thrust_arm: 14.0,
            mass: 120e3,
            max_thrust: 2.3e6,
            min_throttle: 0.4,
            max_gimbal: 20.0_f64.to_radians(),
            tan_cone: 60.0_f64.to_radians().tan(),
            max_pitch_rate: 25.0_f64.to_radians(),
            gravity: GRAVITY,
        }
    }
}

impl VehicleParams {
    /// Moment of inertia about the pitch axis [kg·m²]
    ///
    /// Uniform-rod approximation: I = m·L²/12.
    pub fn inertia(&self) -> f64 {
        self.mass * self.length * self.length / 12.0
    }
}

/// Fixed initial and terminal states of the two-point boundary value problem
///
/// Node 0 of the discretized trajectory is pinned to `initial`, node N-1
/// to `terminal`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundaryConditions {
    /// State at the start of the descent
    pub initial: LanderState,
    /// Soft-landing state at touchdown
    pub terminal: LanderState,
}

impl Default for BoundaryConditions {
    /// Reference vertical-descent case: 1 km up, falling at 80 m/s,
    /// belly-first (pitch -90°), landing upright at rest.
    fn default() -> Self {
        Self {
            initial: LanderState {
                x: 0.0,
                y: 1000.0,
                vx: 0.0,
                vy: -80.0,
                pitch: -std::f64::consts::FRAC_PI_2,
                pitch_rate: 0.0,
            },
            terminal: LanderState::zero(),
        }
    }
}

impl BoundaryConditions {
    /// Dimensional scale factors derived from the initial condition
    pub fn scale_factors(&self) -> ScaleFactors {
        ScaleFactors::from_initial(&self.initial)
    }
}

/// Characteristic magnitudes for solver-side non-dimensionalization
///
/// Computed once from the initial condition; a backend that scales its
/// variables divides position, velocity, and attitude components by
/// these factors.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScaleFactors {
    /// Norm of the initial position [m]
    pub position: f64,
    /// Norm of the initial velocity [m/s]
    pub velocity: f64,
    /// Norm of the initial attitude state [rad]
    pub attitude: f64,
}

impl ScaleFactors {
    /// Compute scale factors from an initial state
    pub fn from_initial(initial: &LanderState) -> Self {
        Self {
            position: (initial.x * initial.x + initial.y * initial.y).sqrt(),
            velocity: (initial.vx * initial.vx + initial.vy * initial.vy).sqrt(),
            attitude: (initial.pitch * initial.pitch
                + initial.pitch_rate * initial.pitch_rate)
                .sqrt(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_inertia_uniform_rod() {
        let params = VehicleParams::default();
        // I = m L² / 12 = 120e3 * 3600 / 12 = 3.6e7
        assert_relative_eq!(params.inertia(), 3.6e7, epsilon = 1e-3);
    }

    #[test]
    fn test_default_constraint_bounds() {
        let params = VehicleParams::default();
        assert_relative_eq!(params.max_gimbal, 0.349065850398, epsilon = 1e-9);
        assert_relative_eq!(params.tan_cone, 3.0_f64.sqrt(), epsilon = 1e-12);
        assert!(params.min_throttle > 0.0 && params.min_throttle < 1.0);
    }

    #[test]
    fn test_scale_factors_from_reference_case() {
        let bc = BoundaryConditions::default();
        let scales = bc.scale_factors();

        assert_relative_eq!(scales.position, 1000.0, epsilon = 1e-12);
        assert_relative_eq!(scales.velocity, 80.0, epsilon = 1e-12);
        assert_relative_eq!(scales.attitude, std::f64::consts::FRAC_PI_2, epsilon = 1e-12);
    }

    #[test]
    fn test_terminal_state_is_rest() {
        let bc = BoundaryConditions::default();
        assert_eq!(bc.terminal.to_vector().norm(), 0.0);
    }
}
