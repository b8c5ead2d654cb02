//! Consumer side of the command queue

use std::sync::Arc;
use std::time::{Duration, Instant};

use vela_paint::Surface;

use crate::command::DrawCommand;
use crate::queue::Handoff;

/// What one replay did
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReplayStats {
    /// Commands executed
    pub commands: usize,
    /// Generation of the frame that was replayed
    pub generation: u64,
}

/// Replays submitted frames onto a real surface.
///
/// Cheap to clone; every clone drains the same queue. Replay is meant to run
/// on the host's drawing thread and never waits for the producer.
#[derive(Clone, Debug)]
pub struct Compositor {
    handoff: Arc<Handoff>,
}

/// Marks the frame as drained even if a command panics mid-replay, so the
/// producer is not left waiting on a frame nobody will finish.
struct ReplayGuard<'a> {
    handoff: &'a Handoff,
    commands: Vec<DrawCommand>,
}

impl Drop for ReplayGuard<'_> {
    fn drop(&mut self) {
        let mut commands = std::mem::take(&mut self.commands);
        commands.clear();

        // The producer cannot swap while `replaying` is set, so the slot is
        // still empty and takes the buffer back for reuse
        let mut active = self.handoff.active.lock();
        active.commands = commands;
        active.replaying = false;
        drop(active);
        self.handoff.drained.notify_all();
    }
}

impl Compositor {
    pub(crate) fn new(handoff: Arc<Handoff>) -> Self {
        Self { handoff }
    }

    /// Execute the active frame in record order, each command under its own
    /// clip, then release the slot and wake a waiting flush.
    pub fn replay(&self, surface: &mut dyn Surface) -> ReplayStats {
        let (commands, generation) = {
            let mut active = self.handoff.active.lock();
            if active.commands.is_empty() || active.replaying {
                return ReplayStats::default();
            }
            active.replaying = true;
            (std::mem::take(&mut active.commands), active.generation)
        };

        let guard = ReplayGuard {
            handoff: &self.handoff,
            commands,
        };
        for command in &guard.commands {
            command.execute_with_clip(surface);
        }
        let stats = ReplayStats {
            commands: guard.commands.len(),
            generation,
        };
        drop(guard);

        tracing::trace!(commands = stats.commands, generation, "frame replayed");
        stats
    }

    /// A submitted frame is waiting to be replayed
    pub fn has_pending_frame(&self) -> bool {
        let active = self.handoff.active.lock();
        !active.commands.is_empty() && !active.replaying
    }

    /// Block until no frame is queued or replaying, or `timeout` elapses.
    /// Returns whether the slot drained.
    pub fn wait_until_drained(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut active = self.handoff.active.lock();
        while !active.is_drained() {
            if self
                .handoff
                .drained
                .wait_until(&mut active, deadline)
                .timed_out()
            {
                return active.is_drained();
            }
        }
        true
    }
}
