//! # Actions
//!
//! The message type flowing through the store: a type, a payload and options.
//! Actions are cloned for every reducer and subscriber that sees them, so the
//! completion callback ([`Done`]) is shared and fires at most once across all clones.

use crate::error::TransportError;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::oneshot;

type DoneFn = Box<dyn FnOnce(Option<TransportError>, Option<Value>) + Send>;

/// Outcome handed to a [`Done`] callback: the failure, or the response data.
pub type DoneOutcome = (Option<TransportError>, Option<Value>);

/// Completion callback carried in [`ActionOptions`].
///
/// Cloning shares the callback; the first [`Done::call`] consumes it.
#[derive(Clone)]
pub struct Done(Arc<Mutex<Option<DoneFn>>>);

impl Done {
    pub fn new(callback: impl FnOnce(Option<TransportError>, Option<Value>) + Send + 'static) -> Self {
        Self(Arc::new(Mutex::new(Some(Box::new(callback)))))
    }

    /// A callback that forwards its outcome to a oneshot receiver.
    pub fn channel() -> (Self, oneshot::Receiver<DoneOutcome>) {
        let (sender, receiver) = oneshot::channel();
        let done = Self::new(move |error, data| {
            let _ = sender.send((error, data));
        });
        (done, receiver)
    }

    /// Invokes the callback if it has not run yet. Returns whether it ran.
    pub fn call(&self, error: Option<TransportError>, data: Option<Value>) -> bool {
        let callback = self
            .0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match callback {
            Some(callback) => {
                callback(error, data);
                true
            }
            None => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl fmt::Debug for Done {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Done")
            .field("pending", &self.is_pending())
            .finish()
    }
}

/// Options attached to an action.
#[derive(Debug, Clone, Default)]
pub struct ActionOptions {
    /// Path into state, used by `update`.
    pub key: Option<String>,
    /// Values for the resource's path template.
    pub params: Option<Map<String, Value>>,
    /// Query string of a remote call.
    pub query: Option<Map<String, Value>>,
    pub done: Option<Done>,
}

impl ActionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params
            .get_or_insert_with(Map::new)
            .insert(name.into(), value.into());
        self
    }

    pub fn query(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.query
            .get_or_insert_with(Map::new)
            .insert(name.into(), value.into());
        self
    }

    pub fn done(mut self, done: Done) -> Self {
        self.done = Some(done);
        self
    }

    pub fn on_done(
        self,
        callback: impl FnOnce(Option<TransportError>, Option<Value>) + Send + 'static,
    ) -> Self {
        self.done(Done::new(callback))
    }
}

/// A dispatched message.
#[derive(Debug, Clone)]
pub struct Action {
    pub kind: String,
    pub payload: Value,
    pub options: ActionOptions,
}

impl Action {
    pub fn new(kind: impl Into<String>, payload: Value, options: ActionOptions) -> Self {
        Self {
            kind: kind.into(),
            payload,
            options,
        }
    }

    /// An action with no payload and no options.
    pub fn bare(kind: impl Into<String>) -> Self {
        Self::new(kind, Value::Null, ActionOptions::default())
    }
}
