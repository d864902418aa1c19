//! # Resource
//!
//! Generates everything a resource needs from its [`ResourceDefinition`]:
//!
//! - [`Resource::actions`] - built-in, metadata and custom action creators
//! - [`Resource::reducer`] - the state transition function for the store
//! - [`Resource::effects`] - built-in remote effects merged with custom ones
//! - [`Resource::supervisor`] - binds the effects to action types
//!
//! A `Resource` is cheap to clone and immutable once built.

pub mod definition;

pub use definition::ResourceDefinition;

use crate::action::{ActionNamer, ResourceActions};
use crate::effect::{EffectContext, EffectSet, Endpoint, Remote};
use crate::error::ResourceError;
use crate::reducer::{Reducer, ResourceReducer};
use crate::store::StoreClient;
use crate::supervisor::Supervisor;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug)]
struct Inner {
    name: String,
    reducer: Arc<ResourceReducer>,
    effects: EffectSet,
    remote: Arc<Remote>,
}

/// A generated resource.
#[derive(Debug, Clone)]
pub struct Resource {
    inner: Arc<Inner>,
}

impl Resource {
    pub fn new(definition: ResourceDefinition) -> Result<Self, ResourceError> {
        let ResourceDefinition {
            name,
            state,
            path,
            reducers,
            effects,
            transport,
            state_error,
        } = definition;

        if name.trim().is_empty() {
            return Err(ResourceError::EmptyName);
        }
        if let Some(reason) = state_error {
            return Err(ResourceError::InvalidState(reason));
        }
        let initial = match state {
            Value::Null => Value::Object(Map::new()),
            record @ Value::Object(_) => record,
            other => {
                return Err(ResourceError::InvalidState(format!(
                    "expected a record, got {}",
                    other
                )))
            }
        };
        let endpoint = path.as_deref().map(Endpoint::parse).transpose()?;

        let namer = ActionNamer::new(name.clone());
        let actions = ResourceActions::new(
            namer.clone(),
            effects.keys().chain(reducers.keys()).cloned(),
        );
        let reducer = ResourceReducer::new(&namer, initial, reducers.iter());
        let effects = EffectSet::new(effects);

        debug!(
            resource = %name,
            effects = effects.len(),
            reducers = reducers.len(),
            "Resource created"
        );

        Ok(Self {
            inner: Arc::new(Inner {
                name,
                reducer: Arc::new(reducer),
                effects,
                remote: Arc::new(Remote::new(actions, endpoint, transport)),
            }),
        })
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn actions(&self) -> &ResourceActions {
        self.inner.remote.actions()
    }

    pub fn reducer(&self) -> Arc<dyn Reducer> {
        self.inner.reducer.clone()
    }

    pub fn effects(&self) -> &EffectSet {
        &self.inner.effects
    }

    /// Context handed to effects running against `store`.
    pub fn context(&self, store: StoreClient) -> EffectContext {
        EffectContext::new(store, self.inner.remote.clone())
    }

    /// A supervisor for this resource, not yet started.
    pub fn supervisor(&self, store: StoreClient) -> Supervisor {
        Supervisor::new(self.context(store), &self.inner.effects)
    }
}
