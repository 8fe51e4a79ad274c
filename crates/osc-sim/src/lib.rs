//! Oscillator simulation core.
//!
//! Provides:
//! - `OdeSystem` capability (derivative + Jacobian) and the undamped `SpringSystem`
//! - Closed-form analytic reference `cos(w0 t)`
//! - Fixed-step forward Euler and RK4 integrators
//! - Fixed-step driver with step-failure reporting
//! - Lazy frame runs, frame sinks (mailbox, bounded channel) and pacing

pub mod driver;
pub mod error;
pub mod integrator;
pub mod model;
pub mod pacing;
pub mod sim;
pub mod sink;
pub mod spring;
pub mod state;

// Re-exports for public API
pub use driver::{FixedStepDriver, StepStatus};
pub use error::{SimError, SimResult};
pub use integrator::{ForwardEuler, Integrator, IntegratorKind, RK4};
pub use model::{Jacobian, OdeSystem, PhaseVector};
pub use pacing::{CancelToken, FixedDelay, FramePacing, NoPacing, pacing_from_millis};
pub use sim::{RunReport, Run, Termination, collect_frames, run_to_sink};
pub use sink::{ChannelSink, FrameMailbox, FrameSink};
pub use spring::{SpringSystem, analytic_position};
pub use state::{FrameSample, OscillatorState, SimulationParameters};
