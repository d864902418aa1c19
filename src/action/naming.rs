//! # Action-Type Naming
//!
//! Every action type is `<resource>/<operation>`. The same [`ActionNamer`] is used to
//! build dispatchable actions and to register reducer routes and supervisor bindings,
//! so the two sides can never disagree on a name.

use crate::transport::Method;
use std::fmt;

/// The three state operations every resource understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinOp {
    Set,
    Update,
    Clear,
}

impl BuiltinOp {
    pub const ALL: [BuiltinOp; 3] = [BuiltinOp::Set, BuiltinOp::Update, BuiltinOp::Clear];

    pub fn as_str(self) -> &'static str {
        match self {
            BuiltinOp::Set => "set",
            BuiltinOp::Update => "update",
            BuiltinOp::Clear => "clear",
        }
    }

    /// Returns the built-in operation named by `key`, if any.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.as_str() == key)
    }
}

impl fmt::Display for BuiltinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The four remote operations every resource gets as effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteOp {
    Create,
    Update,
    Fetch,
    Delete,
}

impl RemoteOp {
    pub const ALL: [RemoteOp; 4] = [
        RemoteOp::Create,
        RemoteOp::Update,
        RemoteOp::Fetch,
        RemoteOp::Delete,
    ];

    /// Effect key the operation is registered under.
    pub fn key(self) -> &'static str {
        match self {
            RemoteOp::Create => "createRequest",
            RemoteOp::Update => "updateRequest",
            RemoteOp::Fetch => "fetchRequest",
            RemoteOp::Delete => "deleteRequest",
        }
    }

    pub fn method(self) -> Method {
        match self {
            RemoteOp::Create => Method::Post,
            RemoteOp::Update => Method::Patch,
            RemoteOp::Fetch => Method::Get,
            RemoteOp::Delete => Method::Delete,
        }
    }

    /// `updateRequest` leaves `meta.loading` alone.
    pub fn tracks_loading(self) -> bool {
        !matches!(self, RemoteOp::Update)
    }

    pub fn sends_body(self) -> bool {
        !matches!(self, RemoteOp::Fetch)
    }
}

impl fmt::Display for RemoteOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Derives action types scoped by a resource name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionNamer {
    resource: String,
}

impl ActionNamer {
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
        }
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn name(&self, operation: &str) -> String {
        format!("{}/{}", self.resource, operation)
    }

    pub fn builtin(&self, op: BuiltinOp) -> String {
        self.name(op.as_str())
    }

    /// Type an effect key is bound to: the built-in type when the key names a
    /// built-in state operation, the derived name otherwise.
    pub fn bound_type(&self, key: &str) -> String {
        match BuiltinOp::from_key(key) {
            Some(op) => self.builtin(op),
            None => self.name(key),
        }
    }
}
