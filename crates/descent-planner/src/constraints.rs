//! Post-solve path-constraint checking
//!
//! The NLP backend enforces constraints only to its own tolerance; this
//! module re-evaluates them on an extracted trajectory so callers and
//! tests can see exactly which bound is active or violated, by name.
//! Violation convention: positive value = violated, magnitude = how far.

use descent_core::dynamics::LanderState;
use descent_core::vehicle::{BoundaryConditions, VehicleParams};

use crate::trajectory::LandingTrajectory;

/// Tolerance below which an equality deviation is not a violation
const EQUALITY_TOLERANCE: f64 = 1e-6;

/// Result of evaluating every path constraint on a trajectory
#[derive(Debug, Clone, Default)]
pub struct ConstraintEvaluation {
    /// Signed margins (positive = violated)
    pub values: Vec<f64>,
    /// Row names for diagnostics
    pub names: Vec<String>,
    /// Whether every row is satisfied
    pub all_satisfied: bool,
    /// Largest violation, 0 when all satisfied
    pub max_violation: f64,
}

impl ConstraintEvaluation {
    pub fn new() -> Self {
        Self {
            values: Vec::new(),
            names: Vec::new(),
            all_satisfied: true,
            max_violation: 0.0,
        }
    }

    fn add(&mut self, name: String, value: f64) {
        if value > 0.0 {
            self.all_satisfied = false;
            self.max_violation = self.max_violation.max(value);
        }
        self.names.push(name);
        self.values.push(value);
    }

    /// Names of the violated rows
    pub fn violations(&self) -> Vec<&str> {
        self.names
            .iter()
            .zip(&self.values)
            .filter(|(_, &v)| v > 0.0)
            .map(|(n, _)| n.as_str())
            .collect()
    }
}

/// Path- and boundary-constraint evaluator for solved trajectories
#[derive(Debug, Clone)]
pub struct PathConstraints {
    vehicle: VehicleParams,
    boundary: BoundaryConditions,
}

impl PathConstraints {
    pub fn new(vehicle: VehicleParams, boundary: BoundaryConditions) -> Self {
        Self { vehicle, boundary }
    }

    /// Evaluate every constraint the NLP imposes, on trajectory nodes
    pub fn evaluate(&self, trajectory: &LandingTrajectory) -> ConstraintEvaluation {
        let mut eval = ConstraintEvaluation::new();
        let n = trajectory.num_nodes();

        for (i, control) in trajectory.controls.iter().enumerate() {
            eval.add(
                format!("throttle_min_{i}"),
                self.vehicle.min_throttle - control.throttle,
            );
            eval.add(format!("throttle_max_{i}"), control.throttle - 1.0);
            eval.add(
                format!("gimbal_{i}"),
                control.gimbal.abs() - self.vehicle.max_gimbal,
            );
        }

        // Glide cone and pitch rate hold at interval-start nodes.
        for (i, state) in trajectory.states.iter().take(n.saturating_sub(1)).enumerate() {
            eval.add(
                format!("glide_cone_{i}"),
                state.x - self.vehicle.tan_cone * state.y,
            );
            eval.add(
                format!("pitch_rate_{i}"),
                state.pitch_rate.abs() - self.vehicle.max_pitch_rate,
            );
        }

        if let (Some(first), Some(last)) = (trajectory.states.first(), trajectory.states.last()) {
            eval.add(
                "initial_state".to_string(),
                state_deviation(first, &self.boundary.initial) - EQUALITY_TOLERANCE,
            );
            eval.add(
                "terminal_state".to_string(),
                state_deviation(last, &self.boundary.terminal) - EQUALITY_TOLERANCE,
            );
        }
        if let Some(last) = trajectory.controls.last() {
            eval.add(
                "terminal_gimbal".to_string(),
                last.gimbal.abs() - EQUALITY_TOLERANCE,
            );
        }

        eval
    }
}

fn state_deviation(a: &LanderState, b: &LanderState) -> f64 {
    (a.to_vector() - b.to_vector()).norm()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocp::OcpDefinition;
    use crate::trajectory::LandingTrajectory;

    fn guess_trajectory(ocp: &OcpDefinition) -> LandingTrajectory {
        let layout = ocp.layout();
        let w = ocp.initial_guess();
        LandingTrajectory::from_solution(&layout, ocp.config.horizon.dt, w.as_slice()).unwrap()
    }

    fn small_ocp() -> OcpDefinition {
        let mut ocp = OcpDefinition::default();
        ocp.config.horizon.horizon_time = 1.0;
        ocp.config.horizon.dt = 0.1;
        ocp
    }

    #[test]
    fn test_initial_guess_satisfies_path_constraints() {
        // Vertical-descent guess: on the cone axis, mid-range throttle,
        // straight-line states hitting both boundary conditions.
        let ocp = small_ocp();
        let trajectory = guess_trajectory(&ocp);
        let eval =
            PathConstraints::new(ocp.vehicle.clone(), ocp.boundary.clone()).evaluate(&trajectory);

        assert!(eval.all_satisfied, "violated: {:?}", eval.violations());
        assert_eq!(eval.max_violation, 0.0);
    }

    #[test]
    fn test_throttle_violation_is_named() {
        let ocp = small_ocp();
        let mut trajectory = guess_trajectory(&ocp);
        trajectory.controls[3].throttle = 1.2;

        let eval =
            PathConstraints::new(ocp.vehicle.clone(), ocp.boundary.clone()).evaluate(&trajectory);

        assert!(!eval.all_satisfied);
        assert!(eval.violations().contains(&"throttle_max_3"));
        assert!((eval.max_violation - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_glide_cone_violation_detected() {
        let ocp = small_ocp();
        let mut trajectory = guess_trajectory(&ocp);
        // Push a mid node far crossrange at low altitude.
        trajectory.states[5].x = 500.0;
        trajectory.states[5].y = 10.0;

        let eval =
            PathConstraints::new(ocp.vehicle.clone(), ocp.boundary.clone()).evaluate(&trajectory);

        assert!(eval.violations().contains(&"glide_cone_5"));
    }

    #[test]
    fn test_terminal_node_exempt_from_path_rows() {
        // The last node is the touchdown point; the cone and pitch-rate
        // rows only bind interval-start nodes.
        let ocp = small_ocp();
        let mut trajectory = guess_trajectory(&ocp);
        let last = trajectory.num_nodes() - 1;
        trajectory.states[last].pitch_rate = 10.0;

        let eval =
            PathConstraints::new(ocp.vehicle.clone(), ocp.boundary.clone()).evaluate(&trajectory);
        assert!(!eval.names.contains(&format!("pitch_rate_{last}")));
        // The terminal state row still flags the deviation.
        assert!(eval.violations().contains(&"terminal_state"));
    }

    #[test]
    fn test_wrong_boundary_flags_terminal_state() {
        let ocp = small_ocp();
        let mut trajectory = guess_trajectory(&ocp);
        let last = trajectory.num_nodes() - 1;
        trajectory.states[last].y = 50.0;

        let eval =
            PathConstraints::new(ocp.vehicle.clone(), ocp.boundary.clone()).evaluate(&trajectory);
        assert!(eval.violations().contains(&"terminal_state"));
    }
}
