use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{CueError, CueResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cue {
    Delete,
    Move,
}

impl fmt::Display for Cue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cue::Delete => f.write_str("delete"),
            Cue::Move => f.write_str("move"),
        }
    }
}

/// Continuation run once a cue has finished (or failed) playing.
pub type CueDone = Box<dyn FnOnce(CueResult)>;

/// Audio capability injected into a widget.
///
/// `play` must eventually call `done` exactly once. Implementations may call
/// it before returning.
pub trait CuePlayer {
    fn play(&self, cue: Cue, done: CueDone);
}

/// Completes every cue immediately and successfully.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentPlayer;

impl CuePlayer for SilentPlayer {
    fn play(&self, cue: Cue, done: CueDone) {
        trace!(%cue, "silent cue");
        done(Ok(()));
    }
}

/// Holds every requested cue until the caller settles it.
#[derive(Default)]
pub struct DeferredPlayer {
    queue: RefCell<VecDeque<(Cue, CueDone)>>,
    played: RefCell<Vec<Cue>>,
}

impl DeferredPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every cue ever requested, in order.
    pub fn played(&self) -> Vec<Cue> {
        self.played.borrow().clone()
    }

    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Settles the oldest queued cue. Returns the cue, if any was queued.
    pub fn settle_next(&self, outcome: CueResult) -> Option<Cue> {
        // released before `done` runs so it may queue another cue
        let next = self.queue.borrow_mut().pop_front();
        let (cue, done) = next?;
        debug!(%cue, ok = outcome.is_ok(), "settling deferred cue");
        done(outcome);
        Some(cue)
    }

    /// Settles every cue queued at the time of the call. Returns how many.
    pub fn settle_all(&self, outcome: CueResult) -> usize {
        let count = self.pending();
        for _ in 0..count {
            self.settle_next(outcome.clone());
        }
        count
    }

    pub fn fail_all(&self, reason: &str) -> usize {
        self.settle_all(Err(CueError::Rejected(reason.to_string())))
    }
}

impl CuePlayer for DeferredPlayer {
    fn play(&self, cue: Cue, done: CueDone) {
        trace!(%cue, "deferring cue");
        self.played.borrow_mut().push(cue);
        self.queue.borrow_mut().push_back((cue, done));
    }
}

impl fmt::Debug for DeferredPlayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferredPlayer")
            .field("pending", &self.pending())
            .field("played", &self.played.borrow())
            .finish()
    }
}
