//! # Lifecycle
//!
//! [`ResourceSystem`] wires a set of resources into a running store: it registers
//! every reducer, spawns the store task and starts one supervisor per resource.

pub mod tracing;

pub use self::tracing::setup_tracing;

use crate::config::StoreConfig;
use crate::error::ResourceError;
use crate::resource::Resource;
use crate::store::{StoreActor, StoreClient};
use ::tracing::{error, info};
use futures::future::{join_all, try_join_all};
use tokio::task::JoinHandle;

/// A running store with its supervisors.
///
/// # Example
///
/// ```ignore
/// let todos = Resource::new(ResourceDefinition::new("todos").path("/todos/:id"))?;
/// let system = ResourceSystem::start(vec![todos.clone()], &StoreConfig::default()).await?;
///
/// system.store.dispatch(todos.actions().custom(
///     "fetchRequest",
///     json!({}),
///     ActionOptions::new().param("id", "5"),
/// )?).await?;
///
/// system.shutdown().await?;
/// ```
pub struct ResourceSystem {
    /// Handle to the shared store.
    pub store: StoreClient,

    resources: Vec<Resource>,

    /// Store task first, then one task per supervisor.
    handles: Vec<JoinHandle<()>>,
}

impl ResourceSystem {
    /// Starts the store and every supervisor. When this resolves, all supervisors are
    /// subscribed and dispatched actions reach their effects.
    pub async fn start(
        resources: Vec<Resource>,
        config: &StoreConfig,
    ) -> Result<Self, ResourceError> {
        let (mut actor, store) = StoreActor::new(config);
        for resource in &resources {
            actor.register(resource.name(), resource.reducer());
        }
        let mut handles = vec![tokio::spawn(actor.run())];

        let supervisors = resources
            .iter()
            .map(|resource| resource.supervisor(store.clone()).start());
        handles.extend(try_join_all(supervisors).await?);

        info!(resources = resources.len(), "Resource system started");
        Ok(Self {
            store,
            resources,
            handles,
        })
    }

    pub fn resource(&self, name: &str) -> Option<&Resource> {
        self.resources.iter().find(|r| r.name() == name)
    }

    /// Stops the store, which closes every subscription, then waits for the store
    /// and the supervisors to exit. Effect runs still in flight fail on their next
    /// dispatch.
    pub async fn shutdown(self) -> Result<(), ResourceError> {
        info!("Shutting down resource system...");
        self.store.shutdown().await?;

        for result in join_all(self.handles).await {
            if let Err(e) = result {
                error!("Task failed: {:?}", e);
                return Err(ResourceError::TaskFailed(e.to_string()));
            }
        }

        info!("Resource system shutdown complete.");
        Ok(())
    }
}
