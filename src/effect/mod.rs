//! # Effects
//!
//! Asynchronous procedures run by the [`Supervisor`](crate::supervisor::Supervisor)
//! whenever an action of their bound type is dispatched.
//!
//! Every resource starts with the four built-in [`RemoteEffect`]s. Custom effects are
//! layered on top and replace a built-in registered under the same key.
//!
//! ## Writing a custom effect
//!
//! ```ignore
//! let definition = ResourceDefinition::new("todos")
//!     .path("/todos/:id?")
//!     .effect("refresh", |ctx: EffectContext, _payload, options| async move {
//!         ctx.dispatch(ctx.actions().start_updating(["list"])).await?;
//!         ctx.fetch_request(Value::Null, options).await?;
//!         ctx.dispatch(ctx.actions().end_updating(["list"])).await
//!     });
//! ```

pub mod remote;

pub use remote::{Endpoint, Remote, RemoteEffect};

use crate::action::{Action, ActionOptions, RemoteOp, ResourceActions};
use crate::error::ResourceError;
use crate::store::StoreClient;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// An effect bound to one action type.
#[async_trait]
pub trait Effect: Send + Sync {
    /// Runs once per matching action. `Err` means the run could not proceed at all
    /// (a configuration error); remote failures are recorded in state instead.
    async fn run(
        &self,
        ctx: EffectContext,
        payload: Value,
        options: ActionOptions,
    ) -> Result<(), ResourceError>;
}

/// Adapts an async closure into an [`Effect`].
pub struct EffectFn<F>(F);

impl<F, Fut> EffectFn<F>
where
    F: Fn(EffectContext, Value, ActionOptions) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), ResourceError>> + Send + 'static,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

#[async_trait]
impl<F, Fut> Effect for EffectFn<F>
where
    F: Fn(EffectContext, Value, ActionOptions) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), ResourceError>> + Send + 'static,
{
    async fn run(
        &self,
        ctx: EffectContext,
        payload: Value,
        options: ActionOptions,
    ) -> Result<(), ResourceError> {
        (self.0)(ctx, payload, options).await
    }
}

/// What an effect can reach: the store, its resource's actions and the built-in
/// remote operations.
#[derive(Debug, Clone)]
pub struct EffectContext {
    store: StoreClient,
    remote: Arc<Remote>,
}

impl EffectContext {
    pub fn new(store: StoreClient, remote: Arc<Remote>) -> Self {
        Self { store, remote }
    }

    pub fn store(&self) -> &StoreClient {
        &self.store
    }

    pub fn actions(&self) -> &ResourceActions {
        self.remote.actions()
    }

    pub fn resource(&self) -> &str {
        self.actions().namer().resource()
    }

    pub async fn dispatch(&self, action: Action) -> Result<(), ResourceError> {
        self.store.dispatch(action).await
    }

    /// Current state of this effect's resource.
    pub async fn state(&self) -> Result<Arc<Value>, ResourceError> {
        self.store.state(self.resource()).await
    }

    pub async fn select<T: DeserializeOwned>(&self) -> Result<T, ResourceError> {
        self.store.select(self.resource()).await
    }

    /// Runs a built-in remote operation inline, in the calling task.
    pub async fn remote(
        &self,
        op: RemoteOp,
        payload: Value,
        options: ActionOptions,
    ) -> Result<(), ResourceError> {
        self.remote.run(op, &self.store, payload, options).await
    }

    pub async fn create_request(
        &self,
        payload: Value,
        options: ActionOptions,
    ) -> Result<(), ResourceError> {
        self.remote(RemoteOp::Create, payload, options).await
    }

    pub async fn update_request(
        &self,
        payload: Value,
        options: ActionOptions,
    ) -> Result<(), ResourceError> {
        self.remote(RemoteOp::Update, payload, options).await
    }

    pub async fn fetch_request(
        &self,
        payload: Value,
        options: ActionOptions,
    ) -> Result<(), ResourceError> {
        self.remote(RemoteOp::Fetch, payload, options).await
    }

    pub async fn delete_request(
        &self,
        payload: Value,
        options: ActionOptions,
    ) -> Result<(), ResourceError> {
        self.remote(RemoteOp::Delete, payload, options).await
    }
}

/// The merged effect map of a resource, keyed by effect key.
#[derive(Clone)]
pub struct EffectSet {
    effects: BTreeMap<String, Arc<dyn Effect>>,
}

impl EffectSet {
    /// Built-ins first, then `custom`, so a custom effect replaces a built-in of
    /// the same key.
    pub fn new(custom: impl IntoIterator<Item = (String, Arc<dyn Effect>)>) -> Self {
        let mut effects: BTreeMap<String, Arc<dyn Effect>> = RemoteOp::ALL
            .into_iter()
            .map(|op| {
                let effect: Arc<dyn Effect> = Arc::new(RemoteEffect(op));
                (op.key().to_string(), effect)
            })
            .collect();
        effects.extend(custom);
        Self { effects }
    }

    pub fn get(&self, key: &str) -> Option<&Arc<dyn Effect>> {
        self.effects.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.effects.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.effects.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<dyn Effect>)> {
        self.effects.iter().map(|(key, effect)| (key.as_str(), effect))
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}

impl fmt::Debug for EffectSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.effects.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> Arc<dyn Effect> {
        Arc::new(EffectFn::new(
            |_ctx: EffectContext, _payload: Value, _options: ActionOptions| async {
                Ok::<(), ResourceError>(())
            },
        ))
    }

    #[test]
    fn test_builtins_are_always_present() {
        let set = EffectSet::new(Vec::new());
        assert_eq!(
            set.keys().collect::<Vec<_>>(),
            vec!["createRequest", "deleteRequest", "fetchRequest", "updateRequest"]
        );
    }

    #[test]
    fn test_custom_effect_replaces_builtin() {
        let custom = noop();
        let set = EffectSet::new(vec![
            ("fetchRequest".to_string(), custom.clone()),
            ("refresh".to_string(), noop()),
        ]);

        assert_eq!(set.len(), 5);
        assert!(set.contains("refresh"));
        assert!(Arc::ptr_eq(set.get("fetchRequest").unwrap(), &custom));
    }
}
