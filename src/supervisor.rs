//! # Supervisor
//!
//! Binds a resource's effects to action types and runs them.
//!
//! The binding table is built once: an effect key naming a built-in state operation
//! (`set`, `update`, `clear`) binds to that built-in type, every other key to
//! `<resource>/<key>`.
//!
//! Every dispatched action whose type is bound starts an independent run in its own
//! task. Runs are never deduplicated, queued or cancelled, so two fetches in flight
//! race on the resource's metadata and the last dispatch wins.

use crate::effect::{Effect, EffectContext, EffectSet};
use crate::error::ResourceError;
use crate::store::Subscription;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, info_span, Instrument};

struct Binding {
    key: String,
    effect: Arc<dyn Effect>,
}

/// Watches the store and spawns effect runs for one resource.
pub struct Supervisor {
    context: EffectContext,
    bindings: HashMap<String, Binding>,
}

impl Supervisor {
    pub fn new(context: EffectContext, effects: &EffectSet) -> Self {
        let namer = context.actions().namer();
        let bindings = effects
            .iter()
            .map(|(key, effect)| {
                let binding = Binding {
                    key: key.to_string(),
                    effect: effect.clone(),
                };
                (namer.bound_type(key), binding)
            })
            .collect();
        Self { context, bindings }
    }

    /// Action types that trigger an effect.
    pub fn bound_types(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }

    /// Subscribes to the store, then runs in a background task.
    ///
    /// The subscription is in place when this resolves, so actions dispatched
    /// afterwards are never missed.
    pub async fn start(self) -> Result<JoinHandle<()>, ResourceError> {
        let subscription = self.context.store().subscribe().await?;
        Ok(tokio::spawn(self.run(subscription)))
    }

    /// Processes `subscription` until the store closes it.
    pub async fn run(self, mut subscription: Subscription) {
        let resource = self.context.resource().to_string();
        info!(resource = %resource, bindings = self.bindings.len(), "Supervisor started");

        while let Some(action) = subscription.recv().await {
            let Some(binding) = self.bindings.get(&action.kind) else {
                continue;
            };
            debug!(resource = %resource, action_type = %action.kind, effect = %binding.key, "Spawning effect");

            let effect = binding.effect.clone();
            let ctx = self.context.clone();
            let span = info_span!("effect", resource = %resource, effect = %binding.key);
            tokio::spawn(
                async move {
                    if let Err(e) = effect.run(ctx, action.payload, action.options).await {
                        error!(error = %e, "Effect failed");
                    }
                }
                .instrument(span),
            );
        }

        info!(resource = %resource, "Supervisor stopped");
    }
}
