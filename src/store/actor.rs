//! # Store Actor
//!
//! The host runtime the generated resources plug into: a single task that owns every
//! resource's state slice and processes [`StoreRequest`]s one at a time.
//!
//! **Concurrency Model**:
//! Effects run concurrently in their own tasks, but all of them reach the state only
//! by sending a `Dispatch` request here. Reducers therefore run sequentially on this
//! task and the state needs no `Mutex` or `RwLock`.
//!
//! ## Dispatch
//!
//! 1. Every registered reducer sees the action (like a combined reducer); a slice is
//!    replaced only when its reducer returns a new `Arc`.
//! 2. The action is forwarded to every live subscriber, in dispatch order.
//! 3. The dispatcher's `await` resolves.

use super::client::StoreClient;
use super::message::StoreRequest;
use crate::action::Action;
use crate::config::StoreConfig;
use crate::error::ResourceError;
use crate::reducer::Reducer;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

struct Slice {
    reducer: Arc<dyn Reducer>,
    state: Arc<Value>,
}

/// The server half of the store.
pub struct StoreActor {
    receiver: mpsc::Receiver<StoreRequest>,
    slices: BTreeMap<String, Slice>,
    subscribers: Vec<mpsc::UnboundedSender<Action>>,
}

impl StoreActor {
    /// Creates the store and a client for it. Register reducers, then spawn
    /// [`StoreActor::run`].
    pub fn new(config: &StoreConfig) -> (Self, StoreClient) {
        let (sender, receiver) = mpsc::channel(config.buffer_size.max(1));
        let actor = Self {
            receiver,
            slices: BTreeMap::new(),
            subscribers: Vec::new(),
        };
        (actor, StoreClient::new(sender))
    }

    /// Registers `reducer` under the slice `name`, starting from its initial state.
    /// A second registration under the same name replaces the first.
    pub fn register(&mut self, name: impl Into<String>, reducer: Arc<dyn Reducer>) {
        let name = name.into();
        let state = reducer.initial_state();
        if self.slices.insert(name.clone(), Slice { reducer, state }).is_some() {
            warn!(resource = %name, "Reducer registered twice, replacing");
        }
    }

    /// Processes requests until every client is gone or a shutdown is requested.
    pub async fn run(mut self) {
        info!(slices = self.slices.len(), "Store started");

        while let Some(request) = self.receiver.recv().await {
            match request {
                StoreRequest::Dispatch { action, respond_to } => {
                    self.dispatch(action);
                    let _ = respond_to.send(Ok(()));
                }
                StoreRequest::State {
                    resource,
                    respond_to,
                } => {
                    let state = self
                        .slices
                        .get(&resource)
                        .map(|slice| slice.state.clone())
                        .ok_or(ResourceError::UnknownResource(resource));
                    let _ = respond_to.send(state);
                }
                StoreRequest::Snapshot { respond_to } => {
                    let snapshot = self
                        .slices
                        .iter()
                        .map(|(name, slice)| (name.clone(), slice.state.clone()))
                        .collect();
                    let _ = respond_to.send(Ok(snapshot));
                }
                StoreRequest::Subscribe { respond_to } => {
                    let (sender, receiver) = mpsc::unbounded_channel();
                    self.subscribers.push(sender);
                    debug!(subscribers = self.subscribers.len(), "Subscribed");
                    let _ = respond_to.send(Ok(receiver));
                }
                StoreRequest::Shutdown { respond_to } => {
                    let _ = respond_to.send(Ok(()));
                    break;
                }
            }
        }

        info!(slices = self.slices.len(), "Store stopped");
    }

    fn dispatch(&mut self, action: Action) {
        debug!(action_type = %action.kind, "Dispatch");

        for (name, slice) in self.slices.iter_mut() {
            let next = slice.reducer.reduce(slice.state.clone(), &action);
            if !Arc::ptr_eq(&next, &slice.state) {
                debug!(resource = %name, action_type = %action.kind, "State changed");
                slice.state = next;
            }
        }

        self.subscribers
            .retain(|subscriber| subscriber.send(action.clone()).is_ok());
    }
}
