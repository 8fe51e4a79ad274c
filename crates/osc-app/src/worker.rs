//! Background simulation worker.
//!
//! Runs one simulation on its own thread, publishing every frame into a
//! shared [`FrameMailbox`] that the render side polls at its own pace.
//! Lifecycle events go over an mpsc channel.

use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender, channel};
use std::thread::{self, JoinHandle};

use osc_sim::{
    CancelToken, FrameMailbox, FramePacing, FrameSample, IntegratorKind, Run, RunReport,
    SimulationParameters, run_to_sink,
};
use tracing::debug;

use crate::config::OscConfig;
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone)]
pub enum WorkerMessage {
    Started {
        kind: IntegratorKind,
        params: SimulationParameters,
    },
    Finished(RunReport),
}

pub struct SimWorker {
    pub progress_rx: Receiver<WorkerMessage>,
    mailbox: Arc<FrameMailbox>,
    cancel: CancelToken,
    handle: Option<JoinHandle<RunReport>>,
}

impl SimWorker {
    pub fn start(
        kind: IntegratorKind,
        params: SimulationParameters,
        mut pacing: Box<dyn FramePacing + Send>,
    ) -> AppResult<Self> {
        // Validate on the caller's thread so bad input never spawns anything.
        let run = Run::spring(kind, params)?;

        let (tx, rx) = channel();
        let mailbox = Arc::new(FrameMailbox::new());
        let cancel = CancelToken::new();

        let mut sink = Arc::clone(&mailbox);
        let worker_cancel = cancel.clone();
        let handle = thread::Builder::new()
            .name("osc-sim".to_string())
            .spawn(move || {
                let _ = tx.send(WorkerMessage::Started { kind, params });
                let report = run_to_sink(run, &mut sink, &mut pacing, Some(&worker_cancel));
                Self::notify_finished(&tx, &report);
                report
            })?;

        Ok(Self {
            progress_rx: rx,
            mailbox,
            cancel,
            handle: Some(handle),
        })
    }

    pub fn from_config(config: &OscConfig) -> AppResult<Self> {
        config.validate()?;
        Self::start(config.run.integrator, config.params(), config.pacing())
    }

    fn notify_finished(tx: &Sender<WorkerMessage>, report: &RunReport) {
        // The host may have stopped listening; the report is still returned by join().
        if tx.send(WorkerMessage::Finished(report.clone())).is_err() {
            debug!("worker finished with no listener");
        }
    }

    pub fn mailbox(&self) -> &Arc<FrameMailbox> {
        &self.mailbox
    }

    /// Most recent published frame, if any.
    pub fn latest(&self) -> Option<FrameSample> {
        self.mailbox.latest()
    }

    /// Ask the run to stop before its next step.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Wait for the run to end and return its report.
    pub fn join(mut self) -> AppResult<RunReport> {
        let handle = self
            .handle
            .take()
            .ok_or_else(|| AppError::Worker("worker already joined".to_string()))?;
        handle
            .join()
            .map_err(|_| AppError::Worker("simulation thread panicked".to_string()))
    }
}

impl Drop for SimWorker {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.cancel.cancel();
            let _ = handle.join();
        }
    }
}
