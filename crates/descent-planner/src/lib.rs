//! # Descent Planner
//!
//! Offline trajectory design for 2D powered descent: turns the
//! continuous soft-landing boundary-value problem into a finite
//! nonlinear program (NLP) by Hermite-Simpson collocation and hands it
//! to an external solver.
//!
//! # Formulation
//!
//! ```text
//! minimize    J = Σₖ (w_u·uₖ² + w_δ·δₖ² + w_ω·ωₖ²)
//! subject to  x₀ = x_init,  x_{N-1} = x_final,  δ_{N-1} = 0
//!             x_{k+1} - xₖ = (dt/6)·(fₖ + 4·f_{k+½} + f_{k+1})   (defects)
//!             u_min ≤ uₖ ≤ 1,  |δₖ| ≤ δ_max
//!             xₖ ≤ tanφ·yₖ,  |ωₖ| ≤ ω_max                        (path)
//! ```
//!
//! The program's decision variables, constraint ordering, and objective
//! are fixed here; the iteration itself (SQP/interior point) lives
//! behind the [`solver::NlpBackend`] trait.
//!
//! # Components
//!
//! - [`config`]: Horizon, cost-weight, and solver configuration
//! - [`ocp`]: OCP definition, decision-variable layout, initial guess
//! - [`collocation`]: Hermite-Simpson NLP assembly (the core)
//! - [`constraints`]: Post-solve path-constraint checking
//! - [`solver`]: External-solver boundary and orchestration
//! - [`trajectory`]: Solved trajectory extraction and interpolation
//! - [`scenarios`]: Canned landing problems

pub mod collocation;
pub mod config;
pub mod constraints;
pub mod ocp;
pub mod scenarios;
pub mod solver;
pub mod trajectory;

pub use collocation::CollocationProblem;
pub use config::PlannerConfig;
pub use ocp::OcpDefinition;
pub use solver::DescentPlanner;
pub use trajectory::LandingTrajectory;
