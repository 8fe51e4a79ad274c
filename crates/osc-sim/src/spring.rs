//! Undamped spring-mass system and its closed-form solution.

use nalgebra::{Matrix2, Vector2};

use crate::error::SimResult;
use crate::model::{Jacobian, OdeSystem, PhaseVector};

/// Closed-form position of the oscillator released from rest at x = 1.
pub fn analytic_position(natural_frequency: f64, t: f64) -> f64 {
    (natural_frequency * t).cos()
}

/// x' = v, v' = -w0^2 x
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpringSystem {
    natural_frequency: f64,
}

impl SpringSystem {
    pub fn new(natural_frequency: f64) -> Self {
        Self { natural_frequency }
    }

    pub fn natural_frequency(&self) -> f64 {
        self.natural_frequency
    }

    /// Restoring acceleration at displacement `x`.
    pub fn acceleration(&self, x: f64) -> f64 {
        -self.natural_frequency * self.natural_frequency * x
    }
}

impl OdeSystem for SpringSystem {
    fn derivative(&self, _t: f64, y: &PhaseVector) -> SimResult<PhaseVector> {
        Ok(Vector2::new(y[1], self.acceleration(y[0])))
    }

    fn jacobian(&self, _t: f64, _y: &PhaseVector) -> SimResult<Jacobian> {
        let w0 = self.natural_frequency;
        Ok(Jacobian {
            dfdy: Matrix2::new(0.0, 1.0, -w0 * w0, 0.0),
            dfdt: Vector2::zeros(),
        })
    }
}
