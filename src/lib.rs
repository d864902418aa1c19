//! # Resource Kit
//!
//! > **Declare a resource once, get its actions, reducer and effects for free.**
//!
//! A resource is a named slice of state backed by a remote REST endpoint. From a
//! [`ResourceDefinition`] (name, initial state, path template, custom reducers and
//! effects) this crate generates:
//!
//! - **Actions**: `set`, `update` and `clear`, metadata helpers (`start_loading`,
//!   `set_error`, ...) and one creator per custom key.
//! - **A reducer**: pure, with an explicit routing table; custom reducers override
//!   built-ins.
//! - **Effects**: `createRequest`, `updateRequest`, `fetchRequest` and
//!   `deleteRequest` against the resource's path, plus any custom ones.
//! - **A supervisor**: binds effects to action types and runs one task per
//!   matching dispatch.
//!
//! ## 🏗️ Design
//!
//! ### State
//! Every resource state is a JSON record with a `meta` block:
//!
//! ```json
//! { "title": "", "meta": { "loading": false, "updating": {}, "error": null } }
//! ```
//!
//! State is held as `Arc<Value>`. A reducer returns the same `Arc` for actions it does
//! not handle and a new one otherwise.
//!
//! ### Concurrency Model
//! The [`store`] is an actor: one task owns every slice and applies reducers
//! sequentially, so no locks guard the state. Effects run concurrently in their own
//! tasks and only touch state by dispatching.
//!
//! ### Errors
//! Remote failures are data: they land in `meta.error` and are reported to the
//! action's `done` callback. Configuration errors (no path, no transport, missing
//! path parameter) abort the run and are logged by the supervisor.
//!
//! ## 🗺️ Module Tour
//!
//! | Module | Role |
//! |--------|------|
//! | [`resource`] | definition builder and the generated [`Resource`] |
//! | [`action`] | action types, options and creators |
//! | [`reducer`] | the synthesized reducer |
//! | [`effect`] | effect trait, built-in remote operations |
//! | [`supervisor`] | effect bindings and spawning |
//! | [`store`] | the host runtime the resources plug into |
//! | [`transport`] | HTTP boundary, `reqwest` implementation |
//! | [`path`], [`template`] | state paths and URL templates |
//! | [`lifecycle`] | system wiring, tracing setup |
//! | [`mock`] | in-memory transport for tests |
//!
//! ## 🚀 Quick Start
//!
//! ```ignore
//! setup_tracing();
//!
//! let transport = Arc::new(ReqwestTransport::from_config(&TransportConfig::from_env())?);
//! let todos = Resource::new(
//!     ResourceDefinition::new("todos")
//!         .state(json!({"title": ""}))
//!         .path("/todos/:id")
//!         .transport(transport),
//! )?;
//!
//! let system = ResourceSystem::start(vec![todos.clone()], &StoreConfig::default()).await?;
//! let (done, outcome) = Done::channel();
//! let fetch = todos.actions().custom(
//!     "fetchRequest",
//!     json!({}),
//!     ActionOptions::new().param("id", "5").done(done),
//! )?;
//! system.store.dispatch(fetch).await?;
//! let (error, data) = outcome.await?;
//! ```

pub mod action;
pub mod config;
pub mod effect;
pub mod error;
pub mod lifecycle;
pub mod mock;
pub mod path;
pub mod reducer;
pub mod resource;
pub mod store;
pub mod supervisor;
pub mod template;
pub mod transport;

pub use action::{Action, ActionOptions, Done, ResourceActions};
pub use config::{StoreConfig, TransportConfig};
pub use effect::{Effect, EffectContext, EffectSet};
pub use error::{ErrorInfo, ResourceError, TransportError};
pub use lifecycle::{setup_tracing, ResourceSystem};
pub use reducer::Reducer;
pub use resource::{Resource, ResourceDefinition};
pub use store::{StoreActor, StoreClient};
pub use supervisor::Supervisor;
pub use transport::{ReqwestTransport, Transport};
