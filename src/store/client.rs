use super::message::StoreRequest;
use crate::action::Action;
use crate::error::ResourceError;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

/// Every action dispatched after the subscription was created, in order.
pub type Subscription = mpsc::UnboundedReceiver<Action>;

/// Handle to a running [`StoreActor`](super::StoreActor). Cheap to clone.
#[derive(Debug, Clone)]
pub struct StoreClient {
    sender: mpsc::Sender<StoreRequest>,
}

impl StoreClient {
    pub fn new(sender: mpsc::Sender<StoreRequest>) -> Self {
        Self { sender }
    }

    /// Resolves once every reducer has seen `action`.
    pub async fn dispatch(&self, action: Action) -> Result<(), ResourceError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StoreRequest::Dispatch { action, respond_to })
            .await
            .map_err(|_| ResourceError::StoreClosed)?;
        response.await.map_err(|_| ResourceError::StoreDropped)?
    }

    pub async fn state(&self, resource: &str) -> Result<Arc<Value>, ResourceError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StoreRequest::State {
                resource: resource.to_string(),
                respond_to,
            })
            .await
            .map_err(|_| ResourceError::StoreClosed)?;
        response.await.map_err(|_| ResourceError::StoreDropped)?
    }

    /// The slice of `resource`, deserialized into `T`.
    pub async fn select<T: DeserializeOwned>(&self, resource: &str) -> Result<T, ResourceError> {
        let state = self.state(resource).await?;
        Ok(T::deserialize(state.as_ref())?)
    }

    pub async fn snapshot(&self) -> Result<BTreeMap<String, Arc<Value>>, ResourceError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StoreRequest::Snapshot { respond_to })
            .await
            .map_err(|_| ResourceError::StoreClosed)?;
        response.await.map_err(|_| ResourceError::StoreDropped)?
    }

    pub async fn subscribe(&self) -> Result<Subscription, ResourceError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StoreRequest::Subscribe { respond_to })
            .await
            .map_err(|_| ResourceError::StoreClosed)?;
        response.await.map_err(|_| ResourceError::StoreDropped)?
    }

    /// Stops the store. Subscriptions end once it has exited.
    pub async fn shutdown(&self) -> Result<(), ResourceError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StoreRequest::Shutdown { respond_to })
            .await
            .map_err(|_| ResourceError::StoreClosed)?;
        response.await.map_err(|_| ResourceError::StoreDropped)?
    }
}
