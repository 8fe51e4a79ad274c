//! Frame sinks: where each published sample goes.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::mpsc::{Receiver, SyncSender, TrySendError, sync_channel};
use std::sync::{Arc, Mutex, PoisonError};

use crate::state::FrameSample;

/// Fire-and-forget consumer of frame samples.
pub trait FrameSink {
    fn accept(&mut self, sample: FrameSample);
}

impl FrameSink for Vec<FrameSample> {
    fn accept(&mut self, sample: FrameSample) {
        self.push(sample);
    }
}

/// Single-slot handoff holding only the most recent sample.
///
/// Writers overwrite, readers copy out. The slot is always read whole under
/// the lock; the sequence number counts publishes so a reader can tell
/// whether anything new arrived since its last look.
#[derive(Debug, Default)]
pub struct FrameMailbox {
    slot: Mutex<Option<FrameSample>>,
    sequence: AtomicU64,
}

impl FrameMailbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, sample: FrameSample) {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(sample);
        self.sequence.fetch_add(1, Ordering::Release);
    }

    pub fn latest(&self) -> Option<FrameSample> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Latest sample together with the publish count that produced it.
    pub fn latest_with_sequence(&self) -> Option<(u64, FrameSample)> {
        let slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        slot.map(|s| (self.sequence.load(Ordering::Acquire), s))
    }

    /// Number of samples published so far.
    pub fn sequence(&self) -> u64 {
        self.sequence.load(Ordering::Acquire)
    }
}

impl FrameSink for &FrameMailbox {
    fn accept(&mut self, sample: FrameSample) {
        self.publish(sample);
    }
}

impl FrameSink for Arc<FrameMailbox> {
    fn accept(&mut self, sample: FrameSample) {
        self.publish(sample);
    }
}

/// Forwards samples over a bounded channel, dropping when the reader lags.
#[derive(Debug)]
pub struct ChannelSink {
    tx: SyncSender<FrameSample>,
    dropped: Arc<AtomicUsize>,
}

impl ChannelSink {
    pub fn bounded(capacity: usize) -> (Self, Receiver<FrameSample>) {
        let (tx, rx) = sync_channel(capacity);
        (
            Self {
                tx,
                dropped: Arc::new(AtomicUsize::new(0)),
            },
            rx,
        )
    }

    /// Samples discarded because the channel was full or closed.
    pub fn dropped(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl FrameSink for ChannelSink {
    fn accept(&mut self, sample: FrameSample) {
        match self.tx.try_send(sample) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) | Err(TrySendError::Disconnected(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
            }
        }
    }
}
