//! Fixed-step time integrators.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};
use crate::model::{OdeSystem, PhaseVector};
use crate::spring::SpringSystem;
use crate::state::{OscillatorState, SimulationParameters};

/// Trait for time integrators.
pub trait Integrator {
    /// Advance state by one time step of the given system.
    fn step<S: OdeSystem>(&self, system: &S, t: f64, y: &PhaseVector, dt: f64)
    -> SimResult<PhaseVector>;
}

/// Classical RK4 (Runge-Kutta 4th order) integrator.
#[derive(Clone, Copy, Debug, Default)]
pub struct RK4;

impl Integrator for RK4 {
    fn step<S: OdeSystem>(
        &self,
        system: &S,
        t: f64,
        y: &PhaseVector,
        dt: f64,
    ) -> SimResult<PhaseVector> {
        let k1 = system.derivative(t, y)?;

        let y2 = y + k1 * (0.5 * dt);
        let k2 = system.derivative(t + 0.5 * dt, &y2)?;

        let y3 = y + k2 * (0.5 * dt);
        let k3 = system.derivative(t + 0.5 * dt, &y3)?;

        let y4 = y + k3 * dt;
        let k4 = system.derivative(t + dt, &y4)?;

        // y_new = y + (dt/6) * (k1 + 2*k2 + 2*k3 + k4)
        let k_sum = (k1 + k2 * 2.0) + (k3 * 2.0 + k4);

        Ok(y + k_sum * (dt / 6.0))
    }
}

/// Forward Euler (explicit, 1st order).
///
/// Position advances with the velocity from *before* the step, so energy
/// grows on every step of an undamped oscillator.
#[derive(Clone, Copy, Debug, Default)]
pub struct ForwardEuler;

impl ForwardEuler {
    /// One spring step on the plain state, without going through a system.
    pub fn advance(state: OscillatorState, params: &SimulationParameters) -> OscillatorState {
        let dt = params.step_size;
        let a = SpringSystem::new(params.natural_frequency).acceleration(state.position);
        OscillatorState {
            position: state.position + state.velocity * dt,
            velocity: state.velocity + a * dt,
        }
    }
}

impl Integrator for ForwardEuler {
    fn step<S: OdeSystem>(
        &self,
        system: &S,
        t: f64,
        y: &PhaseVector,
        dt: f64,
    ) -> SimResult<PhaseVector> {
        let ydot = system.derivative(t, y)?;
        Ok(y + ydot * dt)
    }
}

/// Integrator selection for a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntegratorKind {
    /// Hand-rolled forward Euler loop.
    Euler,
    /// RK4 through the fixed-step driver.
    #[default]
    Rk4,
}

impl IntegratorKind {
    pub const ALL: [IntegratorKind; 2] = [IntegratorKind::Euler, IntegratorKind::Rk4];

    pub fn label(&self) -> &'static str {
        match self {
            IntegratorKind::Euler => "euler",
            IntegratorKind::Rk4 => "rk4",
        }
    }
}

impl fmt::Display for IntegratorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for IntegratorKind {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "euler" | "forward-euler" => Ok(IntegratorKind::Euler),
            "rk4" | "runge-kutta" => Ok(IntegratorKind::Rk4),
            _ => Err(SimError::InvalidArg {
                what: "integrator must be one of: euler, rk4",
            }),
        }
    }
}
