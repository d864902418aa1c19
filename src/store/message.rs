//! # Store Messages
//!
//! Requests sent from a [`StoreClient`](super::StoreClient) to the
//! [`StoreActor`](super::StoreActor), each carrying a oneshot channel for the reply.

use crate::action::Action;
use crate::error::ResourceError;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

/// Type alias for the one-shot response channel used by the store.
pub type Response<T> = oneshot::Sender<Result<T, ResourceError>>;

#[derive(Debug)]
pub enum StoreRequest {
    /// Run every reducer, then forward the action to every subscriber.
    Dispatch {
        action: Action,
        respond_to: Response<()>,
    },
    /// Current state of one resource slice.
    State {
        resource: String,
        respond_to: Response<Arc<Value>>,
    },
    /// Current state of every slice.
    Snapshot {
        respond_to: Response<BTreeMap<String, Arc<Value>>>,
    },
    /// Receive every action dispatched from now on.
    Subscribe {
        respond_to: Response<mpsc::UnboundedReceiver<Action>>,
    },
    /// Stop the store loop and close all subscriptions.
    Shutdown { respond_to: Response<()> },
}
