//! End-to-end validation of the collocation formulation
//!
//! Exercises the assembled NLP on the reference vertical-descent
//! problem and on analytically propagated trajectories: the defect
//! rows must vanish when the discrete samples actually satisfy the
//! continuous dynamics, and the reference problem must declare exactly
//! the variables and constraints the formulation promises.

use approx::assert_relative_eq;
use nalgebra::DVector;

use descent_core::dynamics::{LanderControl, LanderState, PlanarDynamics};
use descent_core::integrator;
use descent_core::{CONTROL_DIM, STATE_DIM};

use descent_planner::collocation::{
    CollocationProblem, EQ_ROWS_BOUNDARY, EQ_ROWS_PER_INTERVAL,
};
use descent_planner::scenarios;

#[test]
fn reference_problem_dimensions() {
    let ocp = scenarios::vertical_descent();
    let problem = CollocationProblem::new(ocp).unwrap();

    // N = 180: states + controls at nodes, state/control auxiliaries at
    // the 179 interval midpoints.
    assert_eq!(problem.num_variables(), 180 * 8 + 179 * 8);
    assert_eq!(problem.num_equalities(), 179 * EQ_ROWS_PER_INTERVAL + EQ_ROWS_BOUNDARY);
    assert_eq!(problem.num_inequalities(), 2 * 179);
}

#[test]
fn initial_guess_is_complete_and_feasible_at_boundaries() {
    let ocp = scenarios::vertical_descent();
    let (states, controls) = ocp.initial_guess_nodes();

    assert_eq!(states.len(), 180);
    assert_eq!(controls.len(), 180);
    assert_eq!(states[0], ocp.boundary.initial);
    assert_eq!(states[179], ocp.boundary.terminal);

    // The straight-line guess never dips underground.
    for state in &states {
        assert!(state.y >= 0.0);
    }
}

#[test]
fn defect_rows_vanish_on_exactly_propagated_trajectory() {
    // Build a decision vector whose node states come from fine RK4
    // propagation of a powered, slowly rotating descent. With midpoint
    // auxiliaries from their defining equations, every defect row must
    // be near machine zero: the discretization agrees with the true
    // dynamics, not just with itself.
    let mut ocp = scenarios::vertical_descent();
    ocp.config.horizon.horizon_time = 0.5;
    ocp.config.horizon.dt = 0.05;
    let n = ocp.num_nodes();
    assert_eq!(n, 10);

    let dynamics = PlanarDynamics::new(ocp.vehicle.clone());
    let control = LanderControl {
        throttle: 0.75,
        gimbal: 0.02,
    };
    let start = LanderState {
        y: 600.0,
        vy: -50.0,
        pitch: 0.1,
        ..LanderState::zero()
    };

    // 128 substeps per interval make the reference effectively exact.
    let dt = ocp.config.horizon.dt;
    let mut nodes = vec![start];
    let mut current = start;
    for _ in 0..n - 1 {
        for _ in 0..128 {
            current = integrator::step(&dynamics, &current, &control, dt / 128.0);
        }
        nodes.push(current);
    }

    let problem = CollocationProblem::new(ocp.clone()).unwrap();
    let layout = *problem.layout();
    let mut w = DVector::zeros(layout.num_variables());

    let u = control.to_vector();
    for (i, node) in nodes.iter().enumerate() {
        w.rows_mut(layout.state_start(i), STATE_DIM)
            .copy_from(&node.to_vector());
        w.rows_mut(layout.control_start(i), CONTROL_DIM).copy_from(&u);
    }
    for i in 0..layout.num_intervals() {
        let x_i = nodes[i].to_vector();
        let x_next = nodes[i + 1].to_vector();
        let x_mid = problem.hermite_midpoint(&x_i, &u, &x_next, &u);
        // Seed the midpoint control with the control actually flown, so
        // the defect rows measure the quadrature against the true
        // dynamics. The literal linkage formula disagrees for constant
        // control (it yields 2u, not u); its rows are checked below.
        w.rows_mut(layout.mid_state_start(i), STATE_DIM).copy_from(&x_mid);
        w.rows_mut(layout.mid_control_start(i), CONTROL_DIM).copy_from(&u);
    }

    let residuals = problem.equality_residuals(w.as_slice());
    for i in 0..layout.num_intervals() {
        let base = i * EQ_ROWS_PER_INTERVAL;
        // Midpoint state rows are zero by construction.
        for j in 0..STATE_DIM {
            assert_relative_eq!(residuals[base + j], 0.0, epsilon = 1e-12);
        }
        // The preserved reference linkage u + (u+u)/2 = 2u leaves a
        // residual of u_mid - 2u = -u for constant control.
        assert_relative_eq!(residuals[base + STATE_DIM], -u[0], epsilon = 1e-12);
        assert_relative_eq!(residuals[base + STATE_DIM + 1], -u[1], epsilon = 1e-12);
        // Defect rows against the true dynamics.
        for j in 0..STATE_DIM {
            assert!(
                residuals[base + STATE_DIM + CONTROL_DIM + j].abs() < 1e-7,
                "interval {} component {} defect {}",
                i,
                j,
                residuals[base + STATE_DIM + CONTROL_DIM + j]
            );
        }
    }
}

#[test]
fn glide_cone_rows_use_multiplication_form() {
    let mut ocp = scenarios::lateral_divert(-100.0);
    ocp.config.horizon.horizon_time = 0.3;
    ocp.config.horizon.dt = 0.1;
    let problem = CollocationProblem::new(ocp.clone()).unwrap();
    let layout = *problem.layout();

    let mut w = ocp.initial_guess();
    // Drop an interval-start node to ground level, off the pad: the
    // ratio form x/y would be undefined, the margin form just reports
    // the crossrange excursion.
    w[layout.state_start(1)] = 40.0;
    w[layout.state_start(1) + 1] = 0.0;

    let mut values = vec![0.0; problem.num_inequalities()];
    problem.eval_inequalities(w.as_slice(), &mut values);
    let (_, upper) = problem.inequality_bounds();

    assert!(values[2].is_finite());
    assert_relative_eq!(values[2], 40.0);
    assert!(values[2] > upper[2], "excursion at ground level must violate");
}

#[test]
fn objective_prefers_the_quieter_trajectory() {
    let ocp = scenarios::vertical_descent();
    let problem = CollocationProblem::new(ocp.clone()).unwrap();
    let layout = *problem.layout();

    let quiet = ocp.initial_guess();
    let mut loud = quiet.clone();
    for i in 0..layout.num_nodes() {
        loud[layout.control_start(i) + 1] = 0.2; // swing the gimbal
        loud[layout.state_start(i) + 5] = 0.3; // and the pitch rate
    }

    assert!(problem.objective(loud.as_slice()) > problem.objective(quiet.as_slice()));
}
