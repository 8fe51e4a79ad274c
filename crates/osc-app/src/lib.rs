//! Host-side services for the oscillator demo.
//!
//! Configuration loading, the background simulation worker with its
//! latest-frame mailbox, spring figure geometry for renderers, and the
//! integrator comparison used by the CLI.

pub mod compare;
pub mod config;
pub mod error;
pub mod figure;
pub mod worker;

pub use compare::{IntegratorSummary, compare, summarize};
pub use config::{
    OscConfig, OscillatorDef, PacingDef, RunDef, load_config, parse_config, save_config,
};
pub use error::{AppError, AppResult};
pub use figure::{Point, Rect, SpringFigure};
pub use worker::{SimWorker, WorkerMessage};
