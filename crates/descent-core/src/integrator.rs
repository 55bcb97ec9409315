//! Numerical integration of the lander dynamics
//!
//! RK4 and Euler steppers over generic state vectors, plus a
//! zero-order-hold propagation helper for replaying a control sequence
//! through [`PlanarDynamics`]. The planner's collocation tests lean on
//! these to produce reference trajectories that satisfy the continuous
//! dynamics to high accuracy.

use nalgebra::SVector;

use crate::dynamics::{LanderControl, LanderState, PlanarDynamics};

/// One 4th-order Runge-Kutta step of dx/dt = f(t, x)
pub fn rk4<const N: usize, F>(x: &SVector<f64, N>, t: f64, dt: f64, f: F) -> SVector<f64, N>
where
    F: Fn(f64, &SVector<f64, N>) -> SVector<f64, N>,
{
    let k1 = f(t, x);
    let k2 = f(t + dt / 2.0, &(x + k1 * (dt / 2.0)));
    let k3 = f(t + dt / 2.0, &(x + k2 * (dt / 2.0)));
    let k4 = f(t + dt, &(x + k3 * dt));

    x + (k1 + k2 * 2.0 + k3 * 2.0 + k4) * (dt / 6.0)
}

/// One explicit Euler step of dx/dt = f(t, x)
pub fn euler<const N: usize, F>(x: &SVector<f64, N>, t: f64, dt: f64, f: F) -> SVector<f64, N>
where
    F: Fn(f64, &SVector<f64, N>) -> SVector<f64, N>,
{
    x + f(t, x) * dt
}

/// Propagate the lander one step under a held control
pub fn step(
    dynamics: &PlanarDynamics,
    state: &LanderState,
    control: &LanderControl,
    dt: f64,
) -> LanderState {
    let u = control.to_vector();
    let next = rk4(&state.to_vector(), 0.0, dt, |_t, x| {
        dynamics.derivative_raw(x, &u)
    });
    LanderState::from_vector(&next)
}

/// Propagate through a control sequence with zero-order hold
///
/// Returns `controls.len() + 1` states, starting at `initial`.
pub fn propagate(
    dynamics: &PlanarDynamics,
    initial: &LanderState,
    controls: &[LanderControl],
    dt: f64,
) -> Vec<LanderState> {
    let mut states = Vec::with_capacity(controls.len() + 1);
    states.push(*initial);

    let mut current = *initial;
    for control in controls {
        current = step(dynamics, &current, control, dt);
        states.push(current);
    }

    states
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vehicle::VehicleParams;
    use approx::assert_relative_eq;
    use nalgebra::SVector;

    #[test]
    fn test_rk4_exponential_decay() {
        // dx/dt = -x, x(0) = 1 → x(1) = e⁻¹
        let mut x = SVector::<f64, 1>::new(1.0);
        let dt = 0.01;
        let mut t = 0.0;

        for _ in 0..100 {
            x = rk4(&x, t, dt, |_t, x| -x);
            t += dt;
        }

        assert_relative_eq!(x[0], (-1.0_f64).exp(), epsilon = 1e-6);
    }

    #[test]
    fn test_rk4_exact_for_constant_acceleration() {
        // Ballistic drop: quadratic in t, which RK4 reproduces exactly.
        let dynamics = PlanarDynamics::new(VehicleParams::default());
        let initial = LanderState {
            y: 1000.0,
            vy: -80.0,
            ..LanderState::zero()
        };
        let g = dynamics.params().gravity;

        let next = step(&dynamics, &initial, &LanderControl::zero(), 0.5);

        assert_relative_eq!(next.y, 1000.0 - 80.0 * 0.5 - 0.5 * g * 0.25, epsilon = 1e-9);
        assert_relative_eq!(next.vy, -80.0 - g * 0.5, epsilon = 1e-9);
    }

    #[test]
    fn test_euler_less_accurate_than_rk4() {
        let mut x_rk4 = SVector::<f64, 1>::new(1.0);
        let mut x_euler = x_rk4;
        let dt = 0.1;
        let mut t = 0.0;

        for _ in 0..10 {
            x_rk4 = rk4(&x_rk4, t, dt, |_t, x| -x);
            x_euler = euler(&x_euler, t, dt, |_t, x| -x);
            t += dt;
        }

        let exact = (-1.0_f64).exp();
        assert!((x_rk4[0] - exact).abs() < (x_euler[0] - exact).abs() / 100.0);
    }

    #[test]
    fn test_propagate_length_and_start() {
        let dynamics = PlanarDynamics::new(VehicleParams::default());
        let initial = LanderState {
            y: 500.0,
            vy: -40.0,
            ..LanderState::zero()
        };
        let controls = vec![
            LanderControl {
                throttle: 0.7,
                gimbal: 0.0
            };
            20
        ];

        let states = propagate(&dynamics, &initial, &controls, 0.1);

        assert_eq!(states.len(), 21);
        assert_eq!(states[0], initial);
        // Thrust above hover: descent rate must be arrested.
        assert!(states.last().unwrap().vy > initial.vy);
    }
}
