//! # Store
//!
//! A minimal actor-based store: one task owns the state of every registered
//! resource, clients talk to it over a bounded channel.

pub mod actor;
pub mod client;
pub mod message;

pub use actor::StoreActor;
pub use client::{StoreClient, Subscription};
pub use message::{Response, StoreRequest};
