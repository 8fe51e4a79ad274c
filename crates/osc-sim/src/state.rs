//! Phase state, run parameters and per-step frame samples.

use nalgebra::Vector2;
use osc_core::ensure_positive;
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};
use crate::model::PhaseVector;

/// Phase vector of the spring-mass system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OscillatorState {
    pub position: f64,
    pub velocity: f64,
}

impl OscillatorState {
    /// Released from rest at unit displacement.
    pub const INITIAL: Self = Self {
        position: 1.0,
        velocity: 0.0,
    };

    pub fn new(position: f64, velocity: f64) -> Self {
        Self { position, velocity }
    }

    /// Mechanical energy per unit mass: 0.5 v^2 + 0.5 w0^2 x^2.
    pub fn energy(&self, natural_frequency: f64) -> f64 {
        0.5 * self.velocity * self.velocity
            + 0.5 * natural_frequency * natural_frequency * self.position * self.position
    }
}

impl Default for OscillatorState {
    fn default() -> Self {
        Self::INITIAL
    }
}

impl From<OscillatorState> for PhaseVector {
    fn from(s: OscillatorState) -> Self {
        Vector2::new(s.position, s.velocity)
    }
}

impl From<PhaseVector> for OscillatorState {
    fn from(y: PhaseVector) -> Self {
        Self {
            position: y[0],
            velocity: y[1],
        }
    }
}

/// Inputs for one run. Immutable once the run starts.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationParameters {
    /// Natural frequency w0 = sqrt(k/m) (rad/s)
    pub natural_frequency: f64,
    /// Fixed time step (seconds)
    pub step_size: f64,
    /// Number of frames in the run
    pub step_count: usize,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            natural_frequency: 1.0,
            step_size: 0.05,
            step_count: 1000,
        }
    }
}

impl SimulationParameters {
    pub fn new(natural_frequency: f64, step_size: f64, step_count: usize) -> Self {
        Self {
            natural_frequency,
            step_size,
            step_count,
        }
    }

    pub fn validate(&self) -> SimResult<()> {
        ensure_positive(self.natural_frequency, "natural_frequency must be positive")?;
        ensure_positive(self.step_size, "step_size must be positive")?;
        if self.step_count == 0 {
            return Err(SimError::InvalidArg {
                what: "step_count must be at least 1",
            });
        }
        Ok(())
    }

    /// Time of frame `index`. Computed, not accumulated.
    pub fn time_at(&self, index: usize) -> f64 {
        index as f64 * self.step_size
    }

    /// Simulated time covered by the whole run.
    pub fn duration(&self) -> f64 {
        self.time_at(self.step_count.saturating_sub(1))
    }
}

/// One published frame: numeric position alongside the analytic oracle.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrameSample {
    pub time: f64,
    pub position: f64,
    pub analytic_position: f64,
}

impl FrameSample {
    pub fn new(time: f64, position: f64, analytic_position: f64) -> Self {
        Self {
            time,
            position,
            analytic_position,
        }
    }

    /// Signed deviation from the analytic solution.
    pub fn error(&self) -> f64 {
        self.position - self.analytic_position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_demo_constants() {
        let p = SimulationParameters::default();
        assert_eq!(p.natural_frequency, 1.0);
        assert_eq!(p.step_size, 0.05);
        assert_eq!(p.step_count, 1000);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_parameters() {
        let zero_dt = SimulationParameters::new(1.0, 0.0, 10);
        assert!(matches!(
            zero_dt.validate(),
            Err(SimError::InvalidArg { .. })
        ));

        let nan_w0 = SimulationParameters::new(f64::NAN, 0.05, 10);
        assert!(matches!(nan_w0.validate(), Err(SimError::Numeric { .. })));

        let no_steps = SimulationParameters::new(1.0, 0.05, 0);
        assert_eq!(
            no_steps.validate(),
            Err(SimError::InvalidArg {
                what: "step_count must be at least 1"
            })
        );
    }

    #[test]
    fn time_is_index_times_dt() {
        let p = SimulationParameters::new(1.0, 0.1, 4);
        assert_eq!(p.time_at(0), 0.0);
        assert_eq!(p.time_at(3), 3.0 * 0.1);
        assert_eq!(p.duration(), p.time_at(3));
    }

    #[test]
    fn state_roundtrips_through_phase_vector() {
        let s = OscillatorState::new(0.25, -1.5);
        let y: PhaseVector = s.into();
        assert_eq!(OscillatorState::from(y), s);
    }

    #[test]
    fn initial_energy() {
        assert_eq!(OscillatorState::INITIAL.energy(1.0), 0.5);
        assert_eq!(OscillatorState::INITIAL.energy(2.0), 2.0);
    }
}
