//! Channels from the timing thread to display consumers.
//!
//! Judgement events are queued without bound so none is lost. Playfield
//! snapshots go through a small bounded channel; when the consumer lags,
//! the newest frame is dropped instead of blocking the timing thread.

use crate::models::judgement::Judgement;
use crate::shared::snapshot::PlayfieldSnapshot;
use crossbeam_channel::{Receiver, Sender, TrySendError, bounded, unbounded};

/// Session-level events.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Judged(Judgement),
    /// Every object has been judged.
    Finished,
}

#[derive(Clone, Debug)]
pub struct SessionBus {
    /// Timing → Display: judgement events.
    pub event_tx: Sender<SessionEvent>,
    pub event_rx: Receiver<SessionEvent>,

    /// Timing → Display: playfield snapshots.
    pub snapshot_tx: Sender<PlayfieldSnapshot>,
    pub snapshot_rx: Receiver<PlayfieldSnapshot>,
}

impl SessionBus {
    /// Max snapshots queued, to limit display latency.
    pub const SNAPSHOT_CAPACITY: usize = 2;

    pub fn new() -> Self {
        let (event_tx, event_rx) = unbounded();
        let (snapshot_tx, snapshot_rx) = bounded(Self::SNAPSHOT_CAPACITY);

        Self {
            event_tx,
            event_rx,
            snapshot_tx,
            snapshot_rx,
        }
    }

    pub fn send_event(&self, event: SessionEvent) {
        // Nobody listening is fine.
        let _ = self.event_tx.send(event);
    }

    /// Returns `false` when the frame was dropped.
    pub fn send_snapshot(&self, snapshot: PlayfieldSnapshot) -> bool {
        match self.snapshot_tx.try_send(snapshot) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                log::trace!("BUS: Display lagging, frame dropped");
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }
}

impl Default for SessionBus {
    fn default() -> Self {
        Self::new()
    }
}
