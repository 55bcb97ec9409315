//! Canned landing problems
//!
//! Ready-made problem definitions for the reference vehicle, used by
//! the validation tests and as starting points for custom setups.

use std::f64::consts::FRAC_PI_2;

use descent_core::dynamics::LanderState;
use descent_core::vehicle::{BoundaryConditions, VehicleParams};

use crate::config::{HorizonConfig, PlannerConfig};
use crate::ocp::OcpDefinition;

/// Reference vertical descent: 1 km up, 80 m/s down, belly-first,
/// landing upright at the pad. 18 s horizon at 0.1 s (N = 180).
pub fn vertical_descent() -> OcpDefinition {
    OcpDefinition {
        vehicle: VehicleParams::default(),
        boundary: BoundaryConditions {
            initial: LanderState {
                x: 0.0,
                y: 1000.0,
                vx: 0.0,
                vy: -80.0,
                pitch: -FRAC_PI_2,
                pitch_rate: 0.0,
            },
            terminal: LanderState::zero(),
        },
        config: PlannerConfig::default(),
    }
}

/// Lateral divert: same entry state displaced crossrange, still inside
/// the glide cone, landing on the origin pad
pub fn lateral_divert(crossrange: f64) -> OcpDefinition {
    let mut ocp = vertical_descent();
    ocp.boundary.initial.x = crossrange;
    ocp.config.horizon = HorizonConfig {
        horizon_time: 20.0,
        dt: 0.1,
    };
    ocp
}
