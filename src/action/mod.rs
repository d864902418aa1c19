//! Actions: naming, messages and the per-resource factory.
//!
//! - [`naming`] - `<resource>/<operation>` types, built-in and remote operation enums
//! - [`message`] - [`Action`], [`ActionOptions`] and the exactly-once [`Done`] callback
//! - [`factory`] - [`ResourceActions`], the constructors a resource exposes

pub mod factory;
pub mod message;
pub mod naming;

pub use factory::{ActionCreator, ResourceActions};
pub use message::{Action, ActionOptions, Done, DoneOutcome};
pub use naming::{ActionNamer, BuiltinOp, RemoteOp};
