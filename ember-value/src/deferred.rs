// ember-value - Deferred value kinds
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Delay, Promise, Future and Agent.
//!
//! None of these block: this layer only stores the outcome. Waiting,
//! scheduling and running agent actions belong to the executor above.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use once_cell::sync::OnceCell;
use parking_lot::{Mutex, RwLock};
use tracing::debug;

use crate::error::{Result, ValueError};
use crate::value::Value;

/// A zero-argument computation producing a value.
pub type Thunk = Arc<dyn Fn() -> Result<Value> + Send + Sync>;

/// A thunk plus its write-once result.
///
/// Realisation runs inside the cell's initialiser, so concurrent forcers
/// wait for the first one and every caller observes the same value. The
/// thunk is dropped once a value is stored.
struct Memo {
    thunk: Mutex<Option<Thunk>>,
    value: OnceCell<Value>,
}

impl Memo {
    fn new(thunk: Thunk) -> Self {
        Memo {
            thunk: Mutex::new(Some(thunk)),
            value: OnceCell::new(),
        }
    }

    fn is_realized(&self) -> bool {
        self.value.get().is_some()
    }

    fn get(&self) -> Option<&Value> {
        self.value.get()
    }

    /// Run the thunk if needed.
    fn force(&self) -> Result<Value> {
        self.value
            .get_or_try_init(|| {
                let thunk = self.thunk.lock().clone();
                let Some(thunk) = thunk else {
                    return Ok(Value::Nil);
                };
                let produced = thunk().map_err(|err| {
                    debug!(error = %err, "deferred thunk failed");
                    err
                })?;
                self.thunk.lock().take();
                Ok(produced)
            })
            .cloned()
    }
}

// ============================================================================
// Delay
// ============================================================================

/// A value computed at most once, on first deref.
pub struct Delay {
    memo: Memo,
}

impl Delay {
    pub fn new<F>(thunk: F) -> Self
    where
        F: Fn() -> Result<Value> + Send + Sync + 'static,
    {
        Delay {
            memo: Memo::new(Arc::new(thunk)),
        }
    }

    pub fn force(&self) -> Result<Value> {
        self.memo.force()
    }

    pub fn is_realized(&self) -> bool {
        self.memo.is_realized()
    }
}

impl fmt::Display for Delay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.memo.get() {
            Some(v) => write!(f, "#<Delay: {}>", v),
            None => write!(f, "#<Delay: pending>"),
        }
    }
}

// ============================================================================
// Promise
// ============================================================================

/// A write-once slot. The first delivery wins.
#[derive(Default)]
pub struct Promise {
    value: OnceCell<Value>,
}

impl Promise {
    pub fn new() -> Self {
        Promise {
            value: OnceCell::new(),
        }
    }

    /// Deliver a value. Returns false if one was already delivered.
    pub fn deliver(&self, value: Value) -> bool {
        self.value.set(value).is_ok()
    }

    pub fn try_get(&self) -> Option<Value> {
        self.value.get().cloned()
    }

    pub fn is_realized(&self) -> bool {
        self.value.get().is_some()
    }
}

impl fmt::Display for Promise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value.get() {
            Some(v) => write!(f, "#<Promise: {}>", v),
            None => write!(f, "#<Promise: pending>"),
        }
    }
}

// ============================================================================
// Future
// ============================================================================

/// The outcome of a computation run elsewhere.
#[derive(Default)]
pub struct Future {
    outcome: OnceCell<std::result::Result<Value, String>>,
    cancelled: AtomicBool,
}

impl Future {
    pub fn new() -> Self {
        Future::default()
    }

    /// Record a successful result. Returns false if already finished.
    pub fn complete(&self, value: Value) -> bool {
        self.outcome.set(Ok(value)).is_ok()
    }

    /// Record a failure. Returns false if already finished.
    pub fn fail(&self, message: impl Into<String>) -> bool {
        self.outcome.set(Err(message.into())).is_ok()
    }

    /// Cancel an unfinished future.
    pub fn cancel(&self) -> bool {
        if self.fail("future cancelled") {
            self.cancelled.store(true, Ordering::Release);
            true
        } else {
            false
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    pub fn is_done(&self) -> bool {
        self.outcome.get().is_some()
    }

    /// The outcome if finished.
    pub fn poll(&self) -> Option<Result<Value>> {
        self.outcome.get().map(|outcome| match outcome {
            Ok(v) => Ok(v.clone()),
            Err(msg) => Err(ValueError::Callback(msg.clone())),
        })
    }
}

impl fmt::Display for Future {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.outcome.get() {
            Some(Ok(v)) => write!(f, "#<Future: {}>", v),
            Some(Err(msg)) => write!(f, "#<Future: failed: {}>", msg),
            None => write!(f, "#<Future: pending>"),
        }
    }
}

// ============================================================================
// Agent
// ============================================================================

/// A state slot updated by actions run elsewhere, plus the error that
/// stopped it, if any.
pub struct Agent {
    state: RwLock<Value>,
    error: Mutex<Option<String>>,
}

impl Agent {
    pub fn new(state: Value) -> Self {
        Agent {
            state: RwLock::new(state),
            error: Mutex::new(None),
        }
    }

    pub fn deref(&self) -> Value {
        self.state.read().clone()
    }

    /// Store the result of an action. Rejected while the agent is failed.
    pub fn set_state(&self, value: Value) -> Result<()> {
        if let Some(msg) = self.error.lock().as_ref() {
            return Err(ValueError::Callback(format!("Agent is failed: {}", msg)));
        }
        *self.state.write() = value;
        Ok(())
    }

    pub fn error(&self) -> Option<String> {
        self.error.lock().clone()
    }

    pub fn set_error(&self, message: impl Into<String>) {
        *self.error.lock() = Some(message.into());
    }

    /// Clear the error and install a new state.
    pub fn restart(&self, state: Value) {
        let mut error = self.error.lock();
        *self.state.write() = state;
        *error = None;
    }
}

impl fmt::Display for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#<Agent: {}>", self.state.read())
    }
}
