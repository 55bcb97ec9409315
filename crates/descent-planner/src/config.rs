//! Planner configuration
//!
//! All knobs are fixed at problem-setup time; nothing here mutates
//! during a solve. Defaults reproduce the reference landing problem
//! (18 s horizon at 0.1 s steps).

use serde::{Deserialize, Serialize};

/// Main planner configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Time grid of the discretization
    pub horizon: HorizonConfig,
    /// Objective weights
    pub weights: CostWeights,
    /// Options forwarded opaquely to the NLP backend
    pub solver: SolverConfig,
}

/// Time-grid configuration
///
/// The horizon is exogenous: there is no time-minimization term in the
/// objective, so `horizon_time` and `dt` fully determine the grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HorizonConfig {
    /// Total horizon T [s]
    pub horizon_time: f64,
    /// Step size dt [s]
    pub dt: f64,
}

impl Default for HorizonConfig {
    fn default() -> Self {
        Self {
            horizon_time: 18.0,
            dt: 0.1,
        }
    }
}

impl HorizonConfig {
    /// Number of trajectory nodes, N = ⌈T/dt⌉
    pub fn num_nodes(&self) -> usize {
        // Small slack keeps T/dt ratios that land a rounding error above
        // an integer from gaining a spurious extra node.
        ((self.horizon_time / self.dt) - 1e-9).ceil() as usize
    }

    /// Node timestamps t_i = i·dt
    pub fn timestamps(&self) -> Vec<f64> {
        (0..self.num_nodes()).map(|i| i as f64 * self.dt).collect()
    }
}

/// Objective weights: pure control-effort and smoothness regularization
///
/// J = Σ w_throttle·u² + Σ w_gimbal·δ² + Σ w_pitch_rate·ω²
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostWeights {
    /// Squared-throttle weight
    pub throttle: f64,
    /// Squared-gimbal weight
    pub gimbal: f64,
    /// Squared-pitch-rate weight
    pub pitch_rate: f64,
}

impl Default for CostWeights {
    fn default() -> Self {
        Self {
            throttle: 1.0,
            gimbal: 1.0,
            pitch_rate: 2.0,
        }
    }
}

/// Backend solver options, passed through opaquely
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Maximum solver iterations
    pub max_iterations: usize,
    /// Convergence tolerance
    pub tolerance: f64,
    /// Wall-clock budget per solve [ms], `None` for unlimited
    pub max_cpu_time_ms: Option<f64>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: 3000,
            tolerance: 1e-8,
            max_cpu_time_ms: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_grid() {
        let horizon = HorizonConfig::default();
        assert_eq!(horizon.num_nodes(), 180);

        let times = horizon.timestamps();
        assert_eq!(times.len(), 180);
        assert_eq!(times[0], 0.0);
        assert!((times[179] - 17.9).abs() < 1e-12);
    }

    #[test]
    fn test_num_nodes_rounds_up() {
        let horizon = HorizonConfig {
            horizon_time: 1.0,
            dt: 0.3,
        };
        assert_eq!(horizon.num_nodes(), 4);
    }

    #[test]
    fn test_default_weights_match_reference_objective() {
        let weights = CostWeights::default();
        assert_eq!(weights.throttle, 1.0);
        assert_eq!(weights.gimbal, 1.0);
        assert_eq!(weights.pitch_rate, 2.0);
    }
}
