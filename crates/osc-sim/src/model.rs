//! OdeSystem trait for pluggable two-state dynamic systems.

use nalgebra::{Matrix2, Vector2};

use crate::error::SimResult;

/// State vector `y = (x, v)`.
pub type PhaseVector = Vector2<f64>;

/// Partial derivatives of the right-hand side.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Jacobian {
    /// df/dy
    pub dfdy: Matrix2<f64>,
    /// df/dt (zero for autonomous systems)
    pub dfdt: Vector2<f64>,
}

/// Capability interface for systems a fixed-step driver can advance.
///
/// Every system provides both the derivative and the Jacobian, even though
/// explicit steppers only call `derivative`.
pub trait OdeSystem {
    /// Compute dy/dt = f(t, y).
    ///
    /// Returning an error signals a failed evaluation; the driver turns it
    /// into a step failure.
    fn derivative(&self, t: f64, y: &PhaseVector) -> SimResult<PhaseVector>;

    /// Compute df/dy and df/dt at (t, y).
    fn jacobian(&self, t: f64, y: &PhaseVector) -> SimResult<Jacobian>;
}
