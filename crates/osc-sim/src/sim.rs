//! Simulation runs: lazy frame sequences and the sink-driving loop.

use tracing::{debug, info, warn};

use crate::driver::FixedStepDriver;
use crate::error::{SimError, SimResult};
use crate::integrator::{ForwardEuler, Integrator, IntegratorKind, RK4};
use crate::model::{OdeSystem, PhaseVector};
use crate::pacing::{CancelToken, FramePacing};
use crate::sink::FrameSink;
use crate::spring::{SpringSystem, analytic_position};
use crate::state::{FrameSample, OscillatorState, SimulationParameters};

enum Stepping<S> {
    /// Plain loop, no status checks: large steps just go unstable.
    Euler { system: S, t: f64 },
    Driven { driver: FixedStepDriver<S, RK4>, t: f64 },
}

impl<S: OdeSystem> Stepping<S> {
    fn advance(&mut self, y: &mut PhaseVector, dt: f64, step: usize) -> SimResult<()> {
        match self {
            Stepping::Euler { system, t } => {
                *y = ForwardEuler
                    .step(&*system, *t, y, dt)
                    .map_err(|e| SimError::StepFailure {
                        step,
                        time: *t,
                        reason: e.to_string(),
                    })?;
                *t += dt;
                Ok(())
            }
            Stepping::Driven { driver, t } => driver.apply_fixed_step(t, y),
        }
    }
}

/// Lazy, finite, one-shot sequence of frames.
///
/// Frame `i` carries the state after `i` steps at time `i * dt`, so frame 0
/// is the initial state. Yields `step_count` frames on success; on a failed
/// step it yields that error once and then ends.
pub struct Run<S = SpringSystem> {
    params: SimulationParameters,
    kind: IntegratorKind,
    stepping: Stepping<S>,
    y: PhaseVector,
    index: usize,
    finished: bool,
}

impl Run<SpringSystem> {
    /// Spring run released from rest at x = 1.
    pub fn spring(kind: IntegratorKind, params: SimulationParameters) -> SimResult<Self> {
        let system = SpringSystem::new(params.natural_frequency);
        Self::with_system(system, kind, params, OscillatorState::INITIAL)
    }
}

impl<S: OdeSystem> Run<S> {
    pub fn with_system(
        system: S,
        kind: IntegratorKind,
        params: SimulationParameters,
        initial: OscillatorState,
    ) -> SimResult<Self> {
        params.validate()?;
        let stepping = match kind {
            IntegratorKind::Euler => Stepping::Euler { system, t: 0.0 },
            IntegratorKind::Rk4 => Stepping::Driven {
                driver: FixedStepDriver::new(system, RK4, params.step_size)?,
                t: 0.0,
            },
        };
        Ok(Self {
            params,
            kind,
            stepping,
            y: initial.into(),
            index: 0,
            finished: false,
        })
    }

    pub fn params(&self) -> &SimulationParameters {
        &self.params
    }

    pub fn kind(&self) -> IntegratorKind {
        self.kind
    }

    /// Current phase state (the one behind the most recent frame).
    pub fn state(&self) -> OscillatorState {
        self.y.into()
    }

    fn sample(&self) -> FrameSample {
        let time = self.params.time_at(self.index);
        FrameSample::new(
            time,
            self.y[0],
            analytic_position(self.params.natural_frequency, time),
        )
    }
}

impl<S: OdeSystem> Iterator for Run<S> {
    type Item = SimResult<FrameSample>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished || self.index >= self.params.step_count {
            return None;
        }
        if self.index > 0 {
            let dt = self.params.step_size;
            if let Err(e) = self.stepping.advance(&mut self.y, dt, self.index) {
                self.finished = true;
                return Some(Err(e));
            }
        }
        let sample = self.sample();
        self.index += 1;
        Some(Ok(sample))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.finished {
            return (0, Some(0));
        }
        (0, Some(self.params.step_count - self.index))
    }
}

impl<S: OdeSystem> std::iter::FusedIterator for Run<S> {}

/// How a run ended.
#[derive(Clone, Debug, PartialEq)]
pub enum Termination {
    Completed,
    /// A step failed; frames emitted before it stand.
    Partial { error: SimError },
    Cancelled,
}

/// Summary of a sink-driven run.
#[derive(Clone, Debug, PartialEq)]
pub struct RunReport {
    pub kind: IntegratorKind,
    pub samples_emitted: usize,
    pub last_sample: Option<FrameSample>,
    pub termination: Termination,
}

impl RunReport {
    pub fn is_complete(&self) -> bool {
        self.termination == Termination::Completed
    }
}

/// Drive a run into a sink, pacing after every frame.
///
/// Each frame is logged as `t, x, analytic`. A step failure is logged once
/// and ends the run as `Partial`; it is never returned as an error.
pub fn run_to_sink<S, K, P>(
    mut run: Run<S>,
    sink: &mut K,
    pacing: &mut P,
    cancel: Option<&CancelToken>,
) -> RunReport
where
    S: OdeSystem,
    K: FrameSink + ?Sized,
    P: FramePacing + ?Sized,
{
    let kind = run.kind();
    let params = *run.params();
    info!(
        integrator = %kind,
        w0 = params.natural_frequency,
        dt = params.step_size,
        n = params.step_count,
        "run started"
    );

    let mut samples_emitted = 0;
    let mut last_sample = None;

    let termination = loop {
        if cancel.is_some_and(CancelToken::is_cancelled) {
            info!(samples_emitted, "run cancelled");
            break Termination::Cancelled;
        }
        match run.next() {
            None => break Termination::Completed,
            Some(Ok(sample)) => {
                debug!(
                    "t: {:.4}\tx: {:.8}\tanalytic: {:.8}",
                    sample.time, sample.position, sample.analytic_position
                );
                sink.accept(sample);
                samples_emitted += 1;
                last_sample = Some(sample);
                pacing.pause();
            }
            Some(Err(error)) => {
                warn!(%error, samples_emitted, "integrator step failed, stopping run");
                break Termination::Partial { error };
            }
        }
    };

    if termination == Termination::Completed {
        info!(samples_emitted, "run completed");
    }

    RunReport {
        kind,
        samples_emitted,
        last_sample,
        termination,
    }
}

/// Run to completion with no pacing and collect every frame.
pub fn collect_frames(
    kind: IntegratorKind,
    params: SimulationParameters,
) -> SimResult<Vec<FrameSample>> {
    Run::spring(kind, params)?.collect()
}
