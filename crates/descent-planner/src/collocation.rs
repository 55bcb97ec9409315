//! Hermite-Simpson collocation: continuous OCP to finite NLP
//!
//! For every interval `[i, i+1]` the state trajectory is modeled as the
//! cubic Hermite interpolant through the endpoint states and their
//! dynamics, and Simpson's rule ties the state increment to the
//! integrated dynamics:
//!
//! ```text
//! x_{i+½} = ½·(xᵢ + xᵢ₊₁) + (dt/8)·(fᵢ - fᵢ₊₁)          (midpoint state)
//! u_{i+½} = uᵢ + (uᵢ + uᵢ₊₁)/2                           (midpoint control)
//! xᵢ₊₁ - xᵢ = (dt/6)·(fᵢ + 4·f_{i+½} + fᵢ₊₁)             (defect)
//! ```
//!
//! The midpoint-control linkage is kept exactly as written: it is not a
//! plain average, and changing it changes the discretization that
//! reference solutions were produced with.
//!
//! The defect rows are the correctness core of the whole planner: they
//! force the discrete trajectory to satisfy the continuous ODE to
//! third-order accuracy per step rather than merely connecting
//! arbitrary endpoints.
//!
//! Equality-row ordering, per interval i (14 rows each), then boundary:
//!
//! | rows            | meaning                        |
//! |-----------------|--------------------------------|
//! | 14i .. 14i+6    | midpoint state definition      |
//! | 14i+6 .. 14i+8  | midpoint control definition    |
//! | 14i+8 .. 14i+14 | Simpson defect                 |
//! | last 13         | x₀ = x_init, x_{N-1} = x_final, δ_{N-1} = 0 |
//!
//! Inequality rows, per interval-start node i (2 rows each): the
//! multiplication-form glide cone `xᵢ - tanφ·yᵢ ≤ 0` (well-defined at
//! every altitude, unlike the ratio form) and the bounded pitch rate.

use nalgebra::{DMatrix, DVector};

use descent_core::dynamics::PlanarDynamics;
use descent_core::{ControlVector, StateVector, CONTROL_DIM, STATE_DIM};

use crate::ocp::{OcpDefinition, ProblemError, VariableLayout};

/// Equality rows per collocation interval
pub const EQ_ROWS_PER_INTERVAL: usize = 2 * STATE_DIM + CONTROL_DIM;

/// Equality rows pinning the boundary: both endpoint states plus the
/// terminal gimbal
pub const EQ_ROWS_BOUNDARY: usize = 2 * STATE_DIM + 1;

/// Inequality rows per interval-start node: glide cone and pitch rate
pub const INEQ_ROWS_PER_NODE: usize = 2;

/// The assembled Hermite-Simpson NLP
///
/// Holds no iteration state; every method is a pure evaluation over a
/// candidate decision vector. Backends consume the variable bounds,
/// equality residuals, bounded inequalities, and objective exactly as
/// exposed here.
#[derive(Debug, Clone)]
pub struct CollocationProblem {
    ocp: OcpDefinition,
    layout: VariableLayout,
    dynamics: PlanarDynamics,
    dt: f64,
}

impl CollocationProblem {
    /// Assemble the NLP for a validated problem definition
    pub fn new(ocp: OcpDefinition) -> Result<Self, ProblemError> {
        ocp.validate()?;
        let layout = ocp.layout();
        let dynamics = PlanarDynamics::new(ocp.vehicle.clone());
        let dt = ocp.config.horizon.dt;
        Ok(Self {
            ocp,
            layout,
            dynamics,
            dt,
        })
    }

    /// Problem definition this NLP was assembled from
    pub fn ocp(&self) -> &OcpDefinition {
        &self.ocp
    }

    /// Decision-variable layout
    pub fn layout(&self) -> &VariableLayout {
        &self.layout
    }

    /// Time step of the grid [s]
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Total decision-variable count
    pub fn num_variables(&self) -> usize {
        self.layout.num_variables()
    }

    /// Total equality-constraint rows
    pub fn num_equalities(&self) -> usize {
        self.layout.num_intervals() * EQ_ROWS_PER_INTERVAL + EQ_ROWS_BOUNDARY
    }

    /// Total inequality-constraint rows
    pub fn num_inequalities(&self) -> usize {
        self.layout.num_intervals() * INEQ_ROWS_PER_NODE
    }

    /// Box bounds on the decision variables
    ///
    /// Node controls carry the throttle and gimbal boxes; states and
    /// midpoint auxiliaries are free (midpoint controls are pinned by
    /// their equality rows instead).
    pub fn variable_bounds(&self) -> (DVector<f64>, DVector<f64>) {
        let n = self.num_variables();
        let mut lower = DVector::from_element(n, f64::NEG_INFINITY);
        let mut upper = DVector::from_element(n, f64::INFINITY);

        let v = &self.ocp.vehicle;
        for i in 0..self.layout.num_nodes() {
            let c = self.layout.control_start(i);
            lower[c] = v.min_throttle;
            upper[c] = 1.0;
            lower[c + 1] = -v.max_gimbal;
            upper[c + 1] = v.max_gimbal;
        }

        (lower, upper)
    }

    /// Hermite midpoint state of one interval
    pub fn hermite_midpoint(
        &self,
        x_i: &StateVector,
        u_i: &ControlVector,
        x_next: &StateVector,
        u_next: &ControlVector,
    ) -> StateVector {
        let f_i = self.dynamics.derivative_raw(x_i, u_i);
        let f_next = self.dynamics.derivative_raw(x_next, u_next);
        (x_i + x_next) * 0.5 + (f_i - f_next) * (self.dt / 8.0)
    }

    /// Midpoint control linkage, literal reference formula
    ///
    /// `u_{i+½} = uᵢ + (uᵢ + uᵢ₊₁)/2` — algebraically `1.5uᵢ + 0.5uᵢ₊₁`,
    /// deliberately not averaged.
    pub fn midpoint_control(u_i: &ControlVector, u_next: &ControlVector) -> ControlVector {
        u_i + (u_i + u_next) * 0.5
    }

    /// Simpson quadrature defect of one interval, given its midpoint
    ///
    /// Zero iff the discrete increment matches the integrated dynamics.
    pub fn simpson_defect(
        &self,
        x_i: &StateVector,
        u_i: &ControlVector,
        x_next: &StateVector,
        u_next: &ControlVector,
        x_mid: &StateVector,
        u_mid: &ControlVector,
    ) -> StateVector {
        let f_i = self.dynamics.derivative_raw(x_i, u_i);
        let f_next = self.dynamics.derivative_raw(x_next, u_next);
        let f_mid = self.dynamics.derivative_raw(x_mid, u_mid);
        (x_next - x_i) - (f_i + f_mid * 4.0 + f_next) * (self.dt / 6.0)
    }

    /// Evaluate all equality residuals at a candidate point
    ///
    /// # Panics
    /// If `w` or `out` do not match [`Self::num_variables`] /
    /// [`Self::num_equalities`].
    pub fn eval_equalities(&self, w: &[f64], out: &mut [f64]) {
        assert_eq!(w.len(), self.num_variables(), "decision vector length");
        assert_eq!(out.len(), self.num_equalities(), "equality residual length");

        let layout = &self.layout;
        let mut row = 0;

        for i in 0..layout.num_intervals() {
            let x_i = StateVector::from_column_slice(layout.state(w, i));
            let x_next = StateVector::from_column_slice(layout.state(w, i + 1));
            let u_i = ControlVector::from_column_slice(layout.control(w, i));
            let u_next = ControlVector::from_column_slice(layout.control(w, i + 1));
            let x_mid = StateVector::from_column_slice(layout.mid_state(w, i));
            let u_mid = ControlVector::from_column_slice(layout.mid_control(w, i));

            let mid_def = x_mid - self.hermite_midpoint(&x_i, &u_i, &x_next, &u_next);
            for j in 0..STATE_DIM {
                out[row + j] = mid_def[j];
            }
            row += STATE_DIM;

            let link = u_mid - Self::midpoint_control(&u_i, &u_next);
            out[row] = link[0];
            out[row + 1] = link[1];
            row += CONTROL_DIM;

            let defect = self.simpson_defect(&x_i, &u_i, &x_next, &u_next, &x_mid, &u_mid);
            for j in 0..STATE_DIM {
                out[row + j] = defect[j];
            }
            row += STATE_DIM;
        }

        let x_init = self.ocp.boundary.initial.to_vector();
        let x_final = self.ocp.boundary.terminal.to_vector();
        let first = layout.state(w, 0);
        let last = layout.state(w, layout.num_nodes() - 1);
        for j in 0..STATE_DIM {
            out[row + j] = first[j] - x_init[j];
            out[row + STATE_DIM + j] = last[j] - x_final[j];
        }
        row += 2 * STATE_DIM;

        // No control authority at touchdown.
        out[row] = layout.control(w, layout.num_nodes() - 1)[1];
    }

    /// Allocating form of [`Self::eval_equalities`]
    pub fn equality_residuals(&self, w: &[f64]) -> DVector<f64> {
        let mut out = DVector::zeros(self.num_equalities());
        self.eval_equalities(w, out.as_mut_slice());
        out
    }

    /// Evaluate the bounded inequality expressions at a candidate point
    ///
    /// Row 2i is the glide-cone margin `xᵢ - tanφ·yᵢ` of interval-start
    /// node i, row 2i+1 its pitch rate. Bounds come from
    /// [`Self::inequality_bounds`].
    ///
    /// # Panics
    /// If `w` or `out` do not match the declared dimensions.
    pub fn eval_inequalities(&self, w: &[f64], out: &mut [f64]) {
        assert_eq!(w.len(), self.num_variables(), "decision vector length");
        assert_eq!(out.len(), self.num_inequalities(), "inequality value length");

        let tan_cone = self.ocp.vehicle.tan_cone;
        for i in 0..self.layout.num_intervals() {
            let x = self.layout.state(w, i);
            out[INEQ_ROWS_PER_NODE * i] = x[0] - tan_cone * x[1];
            out[INEQ_ROWS_PER_NODE * i + 1] = x[5];
        }
    }

    /// Lower/upper bounds matching [`Self::eval_inequalities`] rows
    pub fn inequality_bounds(&self) -> (DVector<f64>, DVector<f64>) {
        let m = self.num_inequalities();
        let mut lower = DVector::from_element(m, f64::NEG_INFINITY);
        let mut upper = DVector::from_element(m, f64::INFINITY);

        let max_rate = self.ocp.vehicle.max_pitch_rate;
        for i in 0..self.layout.num_intervals() {
            upper[INEQ_ROWS_PER_NODE * i] = 0.0;
            lower[INEQ_ROWS_PER_NODE * i + 1] = -max_rate;
            upper[INEQ_ROWS_PER_NODE * i + 1] = max_rate;
        }

        (lower, upper)
    }

    /// Scalar objective: control effort plus pitch-rate smoothness
    ///
    /// J = Σ w_u·uᵢ² + Σ w_δ·δᵢ² + Σ w_ω·ωᵢ² over the N nodes.
    pub fn objective(&self, w: &[f64]) -> f64 {
        assert_eq!(w.len(), self.num_variables(), "decision vector length");

        let weights = &self.ocp.config.weights;
        let mut cost = 0.0;
        for i in 0..self.layout.num_nodes() {
            let u = self.layout.control(w, i);
            let x = self.layout.state(w, i);
            cost += weights.throttle * u[0] * u[0]
                + weights.gimbal * u[1] * u[1]
                + weights.pitch_rate * x[5] * x[5];
        }
        cost
    }

    /// Forward-difference Jacobian of the equality residuals
    ///
    /// For backends without automatic differentiation. Dense; intended
    /// for small grids and verification, not for the production solve
    /// path of a sparse solver.
    pub fn equality_jacobian(&self, w: &[f64]) -> DMatrix<f64> {
        let n = self.num_variables();
        let m = self.num_equalities();

        let base = self.equality_residuals(w);
        let mut jac = DMatrix::zeros(m, n);
        let mut wp = w.to_vec();

        for j in 0..n {
            let h = f64::EPSILON.sqrt() * w[j].abs().max(1.0);
            wp[j] = w[j] + h;
            let perturbed = self.equality_residuals(&wp);
            wp[j] = w[j];

            for i in 0..m {
                jac[(i, j)] = (perturbed[i] - base[i]) / h;
            }
        }

        jac
    }

    /// Glide-cone margin of a single state, multiplication form
    ///
    /// Negative inside the cone; defined for every altitude including
    /// y = 0, where the ratio form of the constraint blows up.
    pub fn glide_cone_margin(&self, x: f64, y: f64) -> f64 {
        x - self.ocp.vehicle.tan_cone * y
    }
}
