//! Shared state of the muxer and the barrier guarding the primary pads.
//!
//! One mutex protects the pad counter, the pending count, the collected
//! tags and the gathering/passthrough switch. The condition variable is
//! signalled whenever the pending count reaches zero or the switch
//! completes.

use super::aux_pad::AuxPadState;
use crate::element::Pad;
use crate::event::TagList;
use crate::format::Caps;
use parking_lot::{Condvar, Mutex, MutexGuard};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

/// Processing mode of the primary pads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    /// Primary traffic waits for the auxiliary pads and the tag flush.
    #[default]
    Gathering,
    /// Primary traffic is forwarded untouched. Terminal.
    Passthrough,
}

/// Bookkeeping for one requested auxiliary pad.
#[derive(Debug)]
pub(crate) struct AuxEntry {
    pub(crate) pad: Pad,
    pub(crate) state: AuxPadState,
    /// Caps most recently set on the pad; carries the role field.
    pub(crate) caps: Option<Caps>,
}

/// Everything guarded by the muxer lock.
#[derive(Debug, Default)]
pub(crate) struct MuxState {
    pub(crate) next_index: u32,
    /// Auxiliary pads that have not yet ended, released ones included.
    pub(crate) pending: usize,
    pub(crate) tags: TagList,
    pub(crate) mode: Mode,
    /// Set while one thread pushes the tag event with the lock released.
    pub(crate) flushing: bool,
    pub(crate) aux: BTreeMap<u32, AuxEntry>,

    pub(crate) aux_requested: u64,
    pub(crate) tags_collected: u64,
    pub(crate) units_rejected: u64,
    pub(crate) tag_event_sent: bool,
}

impl MuxState {
    /// Whether new tags can still reach the tag event.
    pub(crate) fn accepts_tags(&self) -> bool {
        self.mode == Mode::Gathering && !self.flushing
    }
}

/// Outcome of passing the barrier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Passage {
    /// This caller performed the flush.
    Flushed,
    /// Another caller flushed, or the gate was already open.
    Open,
}

/// Barrier plus one-shot flush.
#[derive(Debug, Default)]
pub(crate) struct Gate {
    state: Mutex<MuxState>,
    released: Condvar,
    /// Mirror of `mode == Passthrough`, read without the lock.
    passthrough: AtomicBool,
}

impl Gate {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, MuxState> {
        self.state.lock()
    }

    /// Lock-free check for the terminal mode.
    #[inline]
    pub(crate) fn is_open(&self) -> bool {
        self.passthrough.load(Ordering::Acquire)
    }

    /// Wake all waiters if nothing is pending any more.
    ///
    /// Must be called with the lock held, after the count changed.
    pub(crate) fn notify_if_idle(&self, state: &MuxState) {
        if state.pending == 0 {
            self.released.notify_all();
        }
    }

    /// Block until every auxiliary pad has ended, then flush exactly once.
    ///
    /// The first caller to find the count at zero takes the collected tags
    /// and runs `flush` with the lock released; `flush` reports whether a
    /// tag event went downstream. Concurrent callers wait until the switch
    /// to passthrough is complete, so nothing overtakes the tag event. The
    /// switch also completes when `flush` panics.
    pub(crate) fn pass(&self, flush: impl FnOnce(TagList) -> bool) -> Passage {
        if self.is_open() {
            return Passage::Open;
        }

        let mut state = self.state.lock();
        // Pads requested after the switch must not hold back late waiters
        while state.mode == Mode::Gathering && (state.pending > 0 || state.flushing) {
            self.released.wait(&mut state);
        }
        if state.mode == Mode::Passthrough {
            return Passage::Open;
        }

        state.flushing = true;
        let tags = state.tags.take();
        drop(state);

        // Completes the switch on return and on unwind alike
        let mut finish = FinishFlush {
            gate: self,
            sent: false,
        };
        finish.sent = flush(tags);
        Passage::Flushed
    }
}

/// Ends a flush that ran with the lock released.
///
/// Dropping it re-takes the lock, switches to passthrough and wakes every
/// waiter, so a panicking downstream peer cannot leave the gate half open.
struct FinishFlush<'a> {
    gate: &'a Gate,
    sent: bool,
}

impl Drop for FinishFlush<'_> {
    fn drop(&mut self) {
        let gate = self.gate;
        let mut state = gate.state.lock();
        state.tag_event_sent = self.sent;
        state.flushing = false;
        state.mode = Mode::Passthrough;
        gate.passthrough.store(true, Ordering::Release);
        gate.released.notify_all();
    }
}
