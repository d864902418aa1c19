use crate::action::ActionOptions;
use crate::effect::{Effect, EffectContext, EffectFn};
use crate::error::ResourceError;
use crate::reducer::{custom_reducer, CustomReducer, ReducerContext};
use crate::transport::Transport;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Declarative description of a resource, turned into a
/// [`Resource`](super::Resource) by [`Resource::new`](super::Resource::new).
///
/// # Example
/// ```ignore
/// let todos = ResourceDefinition::new("todos")
///     .state(json!({"items": [], "title": ""}))
///     .path("https://api.example.com/todos/:id?")
///     .transport(Arc::new(ReqwestTransport::new()?))
///     .reducer("toggle", |payload, ctx| { /* ... */ });
/// ```
#[derive(Clone)]
pub struct ResourceDefinition {
    pub(crate) name: String,
    pub(crate) state: Value,
    pub(crate) path: Option<String>,
    pub(crate) reducers: BTreeMap<String, CustomReducer>,
    pub(crate) effects: BTreeMap<String, Arc<dyn Effect>>,
    pub(crate) transport: Option<Arc<dyn Transport>>,
    pub(crate) state_error: Option<String>,
}

impl ResourceDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Value::Null,
            path: None,
            reducers: BTreeMap::new(),
            effects: BTreeMap::new(),
            transport: None,
            state_error: None,
        }
    }

    /// Initial domain state. Must be a record (or `null` for an empty one).
    pub fn state(mut self, state: Value) -> Self {
        self.state = state;
        self.state_error = None;
        self
    }

    /// Initial domain state from any serializable type.
    pub fn state_from<T: Serialize>(mut self, state: &T) -> Self {
        match serde_json::to_value(state) {
            Ok(value) => {
                self.state = value;
                self.state_error = None;
            }
            Err(e) => self.state_error = Some(e.to_string()),
        }
        self
    }

    /// Remote path template, optionally prefixed with an origin, e.g.
    /// `https://api.test/todos/:id?`.
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn reducer<F>(mut self, key: impl Into<String>, reducer: F) -> Self
    where
        F: Fn(&Value, ReducerContext<'_>) -> Value + Send + Sync + 'static,
    {
        self.reducers.insert(key.into(), custom_reducer(reducer));
        self
    }

    pub fn effect<F, Fut>(self, key: impl Into<String>, effect: F) -> Self
    where
        F: Fn(EffectContext, Value, ActionOptions) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), ResourceError>> + Send + 'static,
    {
        self.effect_impl(key, Arc::new(EffectFn::new(effect)))
    }

    pub fn effect_impl(mut self, key: impl Into<String>, effect: Arc<dyn Effect>) -> Self {
        self.effects.insert(key.into(), effect);
        self
    }

    /// Transport used by the built-in remote effects.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for ResourceDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceDefinition")
            .field("name", &self.name)
            .field("state", &self.state)
            .field("path", &self.path)
            .field("reducers", &self.reducers.keys().collect::<Vec<_>>())
            .field("effects", &self.effects.keys().collect::<Vec<_>>())
            .field("transport", &self.transport.is_some())
            .finish()
    }
}
