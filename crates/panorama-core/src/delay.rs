#![forbid(unsafe_code)]

//! Single-shot, cancelable deferred payloads.
//!
//! [`DelayScheduler`] holds at most one pending payload and a deadline. The
//! owner polls it with the current time on its own (UI) thread; the payload is
//! handed back exactly once, after the deadline, unless it was canceled or
//! replaced first.
//!
//! # Invariants
//!
//! 1. At most one payload is pending. `schedule` replaces any previous one
//!    (last write wins, nothing is queued).
//! 2. `poll` never yields a payload before its deadline.
//! 3. A payload is yielded at most once; after `poll` returns it, or after
//!    `cancel`, the scheduler is idle.
//!
//! [`WakeTimer`] is the optional companion for hosts without their own timer:
//! a single background thread that only sends a wake message at the deadline.
//! It never runs the payload, so all state changes stay on the polling thread.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

use web_time::Instant;

#[cfg(feature = "tracing")]
use crate::logging::trace;
#[cfg(not(feature = "tracing"))]
use crate::trace;

/// A one-slot deferred payload keyed to a deadline.
#[derive(Debug, Clone)]
pub struct DelayScheduler<T> {
    pending: Option<(Instant, T)>,
}

impl<T> Default for DelayScheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> DelayScheduler<T> {
    /// Create an idle scheduler.
    #[must_use]
    pub const fn new() -> Self {
        Self { pending: None }
    }

    /// Schedule `payload` to become due `delay` after `now`.
    ///
    /// Any previously pending payload is dropped.
    pub fn schedule(&mut self, now: Instant, delay: Duration, payload: T) {
        if self.pending.is_some() {
            trace!("delay scheduler: replacing pending payload");
        }
        self.pending = Some((now + delay, payload));
    }

    /// Drop the pending payload, returning it if there was one.
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(_, payload)| payload)
    }

    /// Whether a payload is waiting for its deadline.
    #[inline]
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Deadline of the pending payload.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(deadline, _)| *deadline)
    }

    /// Time left until the deadline, saturating at zero.
    #[must_use]
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline()
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    /// Borrow the pending payload.
    #[must_use]
    pub fn peek(&self) -> Option<&T> {
        self.pending.as_ref().map(|(_, payload)| payload)
    }

    /// Mutably borrow the pending payload.
    pub fn peek_mut(&mut self) -> Option<&mut T> {
        self.pending.as_mut().map(|(_, payload)| payload)
    }

    /// Take the payload if its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((deadline, _)) if now >= *deadline => self.cancel(),
            _ => None,
        }
    }
}

/// Wake message sent by [`WakeTimer`] when a deadline elapses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wake {
    /// Generation of the `arm` call that produced this wake.
    pub generation: u64,
}

#[derive(Debug, Clone, Copy)]
enum Command {
    Arm { generation: u64, deadline: Instant },
    Disarm,
}

/// Background timer that posts [`Wake`] messages to the owning thread.
///
/// One worker thread serves the timer for its whole life. Each `arm` replaces
/// the worker's deadline, so re-arming never spawns threads or leaves sleepers
/// behind. The worker exits when the timer is dropped.
#[derive(Debug)]
pub struct WakeTimer {
    generation: AtomicU64,
    commands: Sender<Command>,
    rx: Receiver<Wake>,
}

impl Default for WakeTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl WakeTimer {
    /// Create a timer with its own wake channel and worker thread.
    #[must_use]
    pub fn new() -> Self {
        let (commands, inbox) = mpsc::channel();
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || run_worker(&inbox, &tx));
        Self {
            generation: AtomicU64::new(0),
            commands,
            rx,
        }
    }

    /// Arm the timer to wake after `delay`, disarming any earlier arm.
    ///
    /// Returns the generation of this arm.
    pub fn arm(&self, delay: Duration) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        let deadline = Instant::now() + delay;
        // The worker only stops once `commands` is dropped.
        let _ = self.commands.send(Command::Arm {
            generation,
            deadline,
        });
        generation
    }

    /// Disarm any pending wake.
    pub fn disarm(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        let _ = self.commands.send(Command::Disarm);
    }

    /// Drain wakes that are still current. Non-blocking.
    pub fn drain(&self) -> usize {
        let live = self.generation.load(Ordering::Acquire);
        self.rx
            .try_iter()
            .filter(|wake| wake.generation == live)
            .count()
    }

    /// Block until a current wake arrives or `timeout` passes.
    pub fn wait(&self, timeout: Duration) -> Option<Wake> {
        let deadline = Instant::now() + timeout;
        loop {
            let left = deadline.saturating_duration_since(Instant::now());
            let wake = self.rx.recv_timeout(left).ok()?;
            if wake.generation == self.generation.load(Ordering::Acquire) {
                return Some(wake);
            }
        }
    }
}

/// Worker loop: sleep until the latest armed deadline, or until a command
/// replaces it.
fn run_worker(inbox: &Receiver<Command>, tx: &Sender<Wake>) {
    let mut armed: Option<(u64, Instant)> = None;
    loop {
        let command = match armed {
            None => match inbox.recv() {
                Ok(command) => command,
                Err(_) => return,
            },
            Some((generation, deadline)) => {
                let left = deadline.saturating_duration_since(Instant::now());
                match inbox.recv_timeout(left) {
                    Ok(command) => command,
                    Err(RecvTimeoutError::Timeout) => {
                        armed = None;
                        if tx.send(Wake { generation }).is_err() {
                            return;
                        }
                        continue;
                    }
                    Err(RecvTimeoutError::Disconnected) => return,
                }
            }
        };
        armed = match command {
            Command::Arm {
                generation,
                deadline,
            } => {
                trace!(generation, "wake timer armed");
                Some((generation, deadline))
            }
            Command::Disarm => None,
        };
    }
}
