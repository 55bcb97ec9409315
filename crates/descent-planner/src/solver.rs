//! External NLP solver boundary and solve orchestration
//!
//! The crate assembles the program; the iteration (interior point, SQP,
//! line search) belongs to an external solver behind [`NlpBackend`].
//! The adapter obligation is small but strict: preserve the variable
//! ordering and constraint semantics of [`CollocationProblem`] when
//! translating to the backend's native representation, and report
//! failure honestly — a failed solve never yields a trajectory.

use nalgebra::DVector;
use thiserror::Error;

use crate::collocation::CollocationProblem;
use crate::config::SolverConfig;
use crate::constraints::PathConstraints;
use crate::ocp::{OcpDefinition, ProblemError};
use crate::trajectory::LandingTrajectory;

/// Solver-boundary errors
#[derive(Debug, Error)]
pub enum SolverError {
    #[error(transparent)]
    Problem(#[from] ProblemError),
    #[error("problem is infeasible within solver tolerance")]
    Infeasible,
    #[error("maximum iterations reached without convergence")]
    MaxIterationsReached,
    #[error("NaN detected during iteration")]
    NanDetected,
    #[error("no NLP backend available")]
    BackendUnavailable,
    #[error("solution vector length mismatch: expected {expected}, got {got}")]
    InvalidDimension { expected: usize, got: usize },
    #[error("backend failure: {0}")]
    BackendFailure(String),
}

/// Terminal status reported by a backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverStatus {
    /// Converged to the requested tolerance
    Success,
    /// Iteration budget exhausted
    MaxIterations,
    /// Constraints cannot be satisfied
    Infeasible,
    /// Numerical breakdown
    NanDetected,
    /// Backend-specific failure, see diagnostics
    Failure,
}

/// Statistics from one solve call, backend-native where noted
#[derive(Debug, Clone, Default)]
pub struct SolveStatistics {
    /// Iterations taken
    pub iterations: usize,
    /// Wall-clock solve time [ms]
    pub solve_time_ms: f64,
    /// Final objective value
    pub objective: f64,
    /// Final constraint-violation norm
    pub constraint_violation: f64,
}

/// Decision-variable assignment returned by a backend
#[derive(Debug, Clone)]
pub struct NlpSolution {
    /// Terminal status
    pub status: SolverStatus,
    /// Values in the ordering of [`crate::ocp::VariableLayout`]
    pub variables: DVector<f64>,
    /// Solver-native diagnostics, passed through opaquely
    pub stats: SolveStatistics,
}

/// A general-purpose NLP solver consuming the assembled problem
///
/// Implementations translate the problem's variables, bounds, equality
/// residuals, bounded inequalities, and objective into their native
/// form — via automatic differentiation of the closed-form expressions,
/// or via [`CollocationProblem::equality_jacobian`] for numerical-only
/// solvers — seed with the supplied guess, and iterate.
pub trait NlpBackend {
    /// Human-readable backend name for diagnostics
    fn name(&self) -> &str;

    /// Run the solve; must return `Err` or a non-`Success` status on any
    /// failure rather than a fabricated assignment
    fn solve(
        &mut self,
        problem: &CollocationProblem,
        initial_guess: &DVector<f64>,
        options: &SolverConfig,
    ) -> Result<NlpSolution, SolverError>;
}

/// One-shot powered-descent solve: model → NLP → backend → trajectory
#[derive(Debug, Clone)]
pub struct DescentPlanner {
    ocp: OcpDefinition,
}

impl DescentPlanner {
    pub fn new(ocp: OcpDefinition) -> Self {
        Self { ocp }
    }

    /// Problem definition this planner solves
    pub fn ocp(&self) -> &OcpDefinition {
        &self.ocp
    }

    /// Assemble the NLP, seed it, solve through `backend`, and extract
    /// the landed trajectory
    ///
    /// Infeasibility and non-convergence surface as errors; there are no
    /// retries, relaxations, or partial trajectories.
    pub fn solve_with<B: NlpBackend>(
        &self,
        backend: &mut B,
    ) -> Result<LandingTrajectory, SolverError> {
        let problem = CollocationProblem::new(self.ocp.clone())?;
        let guess = self.ocp.initial_guess();

        let solution = backend.solve(&problem, &guess, &self.ocp.config.solver)?;
        match solution.status {
            SolverStatus::Success => {}
            SolverStatus::MaxIterations => return Err(SolverError::MaxIterationsReached),
            SolverStatus::Infeasible => return Err(SolverError::Infeasible),
            SolverStatus::NanDetected => return Err(SolverError::NanDetected),
            SolverStatus::Failure => {
                return Err(SolverError::BackendFailure(format!(
                    "{} reported failure after {} iterations",
                    backend.name(),
                    solution.stats.iterations
                )))
            }
        }

        let expected = problem.num_variables();
        if solution.variables.len() != expected {
            return Err(SolverError::InvalidDimension {
                expected,
                got: solution.variables.len(),
            });
        }

        let trajectory = LandingTrajectory::from_solution(
            problem.layout(),
            problem.dt(),
            solution.variables.as_slice(),
        )
        .ok_or(SolverError::InvalidDimension {
            expected,
            got: solution.variables.len(),
        })?;

        let checks = PathConstraints::new(self.ocp.vehicle.clone(), self.ocp.boundary.clone())
            .evaluate(&trajectory);
        if !checks.all_satisfied {
            eprintln!(
                "descent-planner: {} returned success with residual violation {:.3e} ({:?})",
                backend.name(),
                checks.max_violation,
                checks.violations()
            );
        }
        eprintln!(
            "descent-planner: solve via {} done, {} iterations, {:.2} ms",
            backend.name(),
            solution.stats.iterations,
            solution.stats.solve_time_ms
        );

        Ok(trajectory)
    }
}
