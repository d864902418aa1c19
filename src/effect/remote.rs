//! # Remote Operations
//!
//! The four built-in effects (`createRequest`, `updateRequest`, `fetchRequest`,
//! `deleteRequest`) share one skeleton:
//!
//! 1. clear `meta.error`
//! 2. fail fast without a path, a transport or a required path parameter
//! 3. raise `meta.loading` (all but `updateRequest`)
//! 4. call the transport
//! 5. on success `fetchRequest` merges the response into state; on failure the
//!    error is stored under `meta.error` and the run still completes
//! 6. lower `meta.loading`, then report the outcome to `options.done`
//!
//! Step 2 failures are configuration errors: the run returns `Err` before any
//! loading flag is raised and `done` is never called.

use super::{Effect, EffectContext};
use crate::action::{ActionOptions, RemoteOp, ResourceActions};
use crate::error::{ErrorInfo, ResourceError};
use crate::store::StoreClient;
use crate::template::{separate, PathTemplate};
use crate::transport::{HttpRequest, Transport};
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Origin and compiled path template of a resource.
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub base_url: Option<String>,
    pub template: PathTemplate,
}

impl Endpoint {
    pub fn parse(raw: &str) -> Result<Self, ResourceError> {
        let separated = separate(raw);
        Ok(Self {
            base_url: separated.base_url,
            template: PathTemplate::compile(&separated.path)?,
        })
    }
}

/// Everything a remote operation needs from its resource.
pub struct Remote {
    actions: ResourceActions,
    endpoint: Option<Endpoint>,
    transport: Option<Arc<dyn Transport>>,
}

impl fmt::Debug for Remote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Remote")
            .field("resource", &self.actions.namer().resource())
            .field("endpoint", &self.endpoint)
            .field("transport", &self.transport.is_some())
            .finish()
    }
}

impl Remote {
    pub fn new(
        actions: ResourceActions,
        endpoint: Option<Endpoint>,
        transport: Option<Arc<dyn Transport>>,
    ) -> Self {
        Self {
            actions,
            endpoint,
            transport,
        }
    }

    pub fn actions(&self) -> &ResourceActions {
        &self.actions
    }

    fn resource(&self) -> &str {
        self.actions.namer().resource()
    }

    pub async fn run(
        &self,
        op: RemoteOp,
        store: &StoreClient,
        payload: Value,
        options: ActionOptions,
    ) -> Result<(), ResourceError> {
        let actions = &self.actions;
        store.dispatch(actions.clear_error()).await?;

        let endpoint = self
            .endpoint
            .as_ref()
            .ok_or_else(|| ResourceError::MissingPath(self.resource().to_string()))?;
        let transport = self
            .transport
            .as_ref()
            .ok_or_else(|| ResourceError::MissingTransport(self.resource().to_string()))?;
        let url = endpoint.template.render(options.params.as_ref())?;

        if op.tracks_loading() {
            store.dispatch(actions.start_loading()).await?;
        }

        let request = HttpRequest {
            method: op.method(),
            base_url: endpoint.base_url.clone(),
            url,
            query: options.query.clone(),
            body: op.sends_body().then_some(payload),
        };
        debug!(
            resource = self.resource(),
            operation = %op,
            method = %request.method,
            url = %request.url,
            "Remote call"
        );

        let (error, data) = match transport.call(request).await {
            Ok(response) => {
                if op == RemoteOp::Fetch {
                    store.dispatch(actions.set(response.data.clone())).await?;
                }
                (None, Some(response.data))
            }
            Err(error) => {
                warn!(
                    resource = self.resource(),
                    operation = %op,
                    status = error.status,
                    error = %error,
                    "Remote call failed"
                );
                store
                    .dispatch(actions.set_error(&ErrorInfo::from(&error)))
                    .await?;
                (Some(error), None)
            }
        };

        if op.tracks_loading() {
            store.dispatch(actions.end_loading()).await?;
        }
        if let Some(done) = &options.done {
            done.call(error, data);
        }
        Ok(())
    }
}

/// A built-in remote effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteEffect(pub RemoteOp);

#[async_trait]
impl Effect for RemoteEffect {
    async fn run(
        &self,
        ctx: EffectContext,
        payload: Value,
        options: ActionOptions,
    ) -> Result<(), ResourceError> {
        ctx.remote(self.0, payload, options).await
    }
}
