//! Fixed-step ODE driver.
//!
//! Owns a system and a stepper and advances `(t, y)` by a constant step,
//! rejecting any step whose evaluation fails or whose result is not finite.

use osc_core::ensure_positive;

use crate::error::{SimError, SimResult};
use crate::integrator::Integrator;
use crate::model::{Jacobian, OdeSystem, PhaseVector};

/// Why a fixed step was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepStatus {
    EvaluationFailed,
    Diverged,
}

pub struct FixedStepDriver<S, I> {
    system: S,
    stepper: I,
    h: f64,
    steps_taken: usize,
}

impl<S: OdeSystem, I: Integrator> FixedStepDriver<S, I> {
    pub fn new(system: S, stepper: I, h: f64) -> SimResult<Self> {
        let h = ensure_positive(h, "step size must be positive")?;
        Ok(Self {
            system,
            stepper,
            h,
            steps_taken: 0,
        })
    }

    pub fn step_size(&self) -> f64 {
        self.h
    }

    pub fn steps_taken(&self) -> usize {
        self.steps_taken
    }

    /// Advance `t` and `y` by one step of size `h`.
    ///
    /// On failure `t` and `y` are left untouched.
    pub fn apply_fixed_step(&mut self, t: &mut f64, y: &mut PhaseVector) -> SimResult<()> {
        let step = self.steps_taken + 1;
        let next = self
            .stepper
            .step(&self.system, *t, y, self.h)
            .map_err(|e| step_failure(step, *t, StepStatus::EvaluationFailed, e.to_string()))?;

        if !next.iter().all(|v| v.is_finite()) {
            return Err(step_failure(
                step,
                *t,
                StepStatus::Diverged,
                "state is no longer finite".to_string(),
            ));
        }

        *y = next;
        *t += self.h;
        self.steps_taken = step;
        Ok(())
    }

    /// Apply `count` fixed steps, stopping at the first failure.
    pub fn apply_fixed_steps(
        &mut self,
        t: &mut f64,
        y: &mut PhaseVector,
        count: usize,
    ) -> SimResult<()> {
        for _ in 0..count {
            self.apply_fixed_step(t, y)?;
        }
        Ok(())
    }

    /// Jacobian of the driven system, for steppers that want it.
    pub fn jacobian_at(&self, t: f64, y: &PhaseVector) -> SimResult<Jacobian> {
        self.system.jacobian(t, y)
    }
}

fn step_failure(step: usize, time: f64, status: StepStatus, detail: String) -> SimError {
    SimError::StepFailure {
        step,
        time,
        reason: format!("{status:?}: {detail}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrator::RK4;
    use crate::spring::SpringSystem;
    use nalgebra::Vector2;
    use std::cell::Cell;

    struct FailAfter {
        calls_left: Cell<usize>,
    }

    impl OdeSystem for FailAfter {
        fn derivative(&self, _t: f64, y: &PhaseVector) -> SimResult<PhaseVector> {
            let left = self.calls_left.get();
            if left == 0 {
                return Err(SimError::NonPhysical {
                    what: "intentional failure",
                });
            }
            self.calls_left.set(left - 1);
            Ok(Vector2::new(y[1], -y[0]))
        }

        fn jacobian(&self, t: f64, y: &PhaseVector) -> SimResult<Jacobian> {
            SpringSystem::new(1.0).jacobian(t, y)
        }
    }

    struct Exploding;

    impl OdeSystem for Exploding {
        fn derivative(&self, _t: f64, _y: &PhaseVector) -> SimResult<PhaseVector> {
            Ok(Vector2::new(f64::INFINITY, 0.0))
        }

        fn jacobian(&self, _t: f64, _y: &PhaseVector) -> SimResult<Jacobian> {
            Ok(Jacobian {
                dfdy: nalgebra::Matrix2::zeros(),
                dfdt: Vector2::zeros(),
            })
        }
    }

    #[test]
    fn rejects_non_positive_step() {
        assert!(FixedStepDriver::new(SpringSystem::new(1.0), RK4, 0.0).is_err());
        assert!(FixedStepDriver::new(SpringSystem::new(1.0), RK4, -0.1).is_err());
    }

    #[test]
    fn advances_time_and_counts_steps() {
        let mut d = FixedStepDriver::new(SpringSystem::new(1.0), RK4, 0.05).unwrap();
        let mut t = 0.0;
        let mut y = Vector2::new(1.0, 0.0);
        d.apply_fixed_steps(&mut t, &mut y, 20).unwrap();
        assert_eq!(d.steps_taken(), 20);
        assert!((t - 1.0).abs() < 1e-12);
        assert!((y[0] - 1.0_f64.cos()).abs() < 1e-7);
    }

    #[test]
    fn evaluation_failure_leaves_state_untouched() {
        // RK4 needs four evaluations per step; allow exactly one full step.
        let sys = FailAfter {
            calls_left: Cell::new(4),
        };
        let mut d = FixedStepDriver::new(sys, RK4, 0.1).unwrap();
        let mut t = 0.0;
        let mut y = Vector2::new(1.0, 0.0);
        d.apply_fixed_step(&mut t, &mut y).unwrap();
        let (t1, y1) = (t, y);

        let err = d.apply_fixed_step(&mut t, &mut y).unwrap_err();
        match err {
            SimError::StepFailure { step, time, reason } => {
                assert_eq!(step, 2);
                assert_eq!(time, t1);
                assert!(reason.starts_with("EvaluationFailed"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(t, t1);
        assert_eq!(y, y1);
        assert_eq!(d.steps_taken(), 1);
    }

    #[test]
    fn divergence_is_a_step_failure() {
        let mut d = FixedStepDriver::new(Exploding, RK4, 0.1).unwrap();
        let mut t = 0.0;
        let mut y = Vector2::new(1.0, 0.0);
        let err = d.apply_fixed_step(&mut t, &mut y).unwrap_err();
        assert!(matches!(err, SimError::StepFailure { step: 1, .. }));
        assert_eq!(t, 0.0);
    }

    #[test]
    fn exposes_system_jacobian() {
        let d = FixedStepDriver::new(SpringSystem::new(2.0), RK4, 0.05).unwrap();
        let jac = d.jacobian_at(0.0, &Vector2::new(1.0, 0.0)).unwrap();
        assert_eq!(jac.dfdy[(1, 0)], -4.0);
    }
}
