//! Double-buffered command queue
//!
//! The producer appends to a private *pending* vector without locking. The
//! *active* vector lives in a handoff slot shared with the [`Compositor`].
//! Flushing waits (boundedly) until the compositor has drained the previous
//! frame, then exchanges the two vectors under the slot's mutex, so a frame
//! is published all at once and the consumer never sees a partial one.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

use crate::command::DrawCommand;
use crate::compositor::Compositor;
use crate::config::AsyncRenderConfig;

/// The consumer-owned half of the queue
#[derive(Debug, Default)]
pub(crate) struct ActiveFrame {
    pub(crate) commands: Vec<DrawCommand>,
    /// Set while the compositor executes a frame it took out of `commands`
    pub(crate) replaying: bool,
    /// Frames handed to the consumer so far
    pub(crate) generation: u64,
}

impl ActiveFrame {
    pub(crate) fn is_drained(&self) -> bool {
        self.commands.is_empty() && !self.replaying
    }
}

/// Lock and wakeup shared by the queue and its compositors
#[derive(Debug, Default)]
pub(crate) struct Handoff {
    pub(crate) active: Mutex<ActiveFrame>,
    pub(crate) drained: Condvar,
}

/// Where the queue is in the frame cycle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QueueState {
    /// Nothing recorded, nothing waiting for replay
    Idle,
    /// The producer is recording into pending
    Accumulating,
    /// A swapped frame is waiting for the consumer
    Flushing,
    /// The consumer is executing a frame
    Replaying,
}

/// Result of one flush attempt
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlushOutcome {
    /// Nothing was recorded; no swap, no redraw
    Empty,
    /// The frame was handed to the consumer
    Submitted { commands: usize },
    /// The previous frame did not drain in time. Pending keeps `backlog`
    /// commands and the next flush submits them all.
    Backpressure { backlog: usize },
}

impl FlushOutcome {
    pub fn is_submitted(&self) -> bool {
        matches!(self, FlushOutcome::Submitted { .. })
    }
}

/// Producer end of the queue
#[derive(Debug)]
pub struct CommandQueue {
    pending: Vec<DrawCommand>,
    handoff: Arc<Handoff>,
    drain_wait: Duration,
    drain_retries: u32,
    /// Producer copy of the frame counter, readable without the lock
    submitted: u64,
}

impl CommandQueue {
    pub fn new(config: &AsyncRenderConfig) -> Self {
        Self {
            pending: Vec::new(),
            handoff: Arc::new(Handoff::default()),
            drain_wait: config.drain_wait(),
            drain_retries: config.drain_retries,
            submitted: 0,
        }
    }

    /// A consumer handle sharing this queue's handoff slot
    pub fn compositor(&self) -> Compositor {
        Compositor::new(Arc::clone(&self.handoff))
    }

    pub fn push(&mut self, command: DrawCommand) {
        self.pending.push(command);
    }

    /// Commands recorded since the last successful flush
    pub fn pending(&self) -> &[DrawCommand] {
        &self.pending
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Number of frames submitted so far; also the id of the frame being
    /// recorded
    pub fn generation(&self) -> u64 {
        self.submitted
    }

    pub fn state(&self) -> QueueState {
        let active = self.handoff.active.lock();
        if active.replaying {
            QueueState::Replaying
        } else if !active.commands.is_empty() {
            QueueState::Flushing
        } else if !self.pending.is_empty() {
            QueueState::Accumulating
        } else {
            QueueState::Idle
        }
    }

    /// Hand pending to the consumer once the previous frame has drained.
    ///
    /// Blocks for at most `drain_retries` waits of `drain_wait`. Each command
    /// of the new frame gets its `prepare` hook while the lock is still held.
    pub fn try_submit(&mut self) -> FlushOutcome {
        if self.pending.is_empty() {
            return FlushOutcome::Empty;
        }

        let mut active = self.handoff.active.lock();
        let mut waits = 0;
        while !active.is_drained() {
            if waits >= self.drain_retries {
                tracing::debug!(
                    backlog = self.pending.len(),
                    waits,
                    "previous frame still queued, dropping flush"
                );
                return FlushOutcome::Backpressure {
                    backlog: self.pending.len(),
                };
            }
            waits += 1;
            // Timeouts and spurious wakeups both land back on the check above
            let _ = self.handoff.drained.wait_for(&mut active, self.drain_wait);
        }

        std::mem::swap(&mut self.pending, &mut active.commands);
        for command in active.commands.iter_mut() {
            command.prepare();
        }
        active.generation += 1;
        self.submitted = active.generation;

        let commands = active.commands.len();
        tracing::trace!(commands, generation = active.generation, "frame swapped");
        FlushOutcome::Submitted { commands }
    }
}
