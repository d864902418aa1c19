//! # Action Factory
//!
//! Builds the actions a resource understands:
//!
//! - the built-ins `set`, `update` and `clear`,
//! - metadata helpers derived purely from `update` (`start_loading`, `set_error`, ...),
//! - one [`ActionCreator`] per custom reducer/effect key.

use super::message::{Action, ActionOptions};
use super::naming::{ActionNamer, BuiltinOp};
use crate::error::{ErrorInfo, ResourceError};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

/// Creates actions of one custom type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionCreator {
    key: String,
    kind: String,
}

impl ActionCreator {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn create(&self, payload: Value, options: ActionOptions) -> Action {
        Action::new(self.kind.clone(), payload, options)
    }

    /// `{}` payload, default options.
    pub fn empty(&self) -> Action {
        self.create(json!({}), ActionOptions::default())
    }
}

/// All action constructors of one resource.
#[derive(Debug, Clone)]
pub struct ResourceActions {
    namer: ActionNamer,
    custom: BTreeMap<String, ActionCreator>,
}

impl ResourceActions {
    /// `keys` may repeat (a key can name both a reducer and an effect); each key
    /// gets exactly one creator.
    pub fn new<I, S>(namer: ActionNamer, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let custom = keys
            .into_iter()
            .map(|key| {
                let key: String = key.into();
                let creator = ActionCreator {
                    kind: namer.name(&key),
                    key: key.clone(),
                };
                (key, creator)
            })
            .collect();
        Self { namer, custom }
    }

    pub fn namer(&self) -> &ActionNamer {
        &self.namer
    }

    pub fn builtin_type(&self, op: BuiltinOp) -> String {
        self.namer.builtin(op)
    }

    // =========================================================================
    // Built-ins
    // =========================================================================

    /// Shallow-merges `data` onto the state.
    pub fn set(&self, data: Value) -> Action {
        Action::new(
            self.namer.builtin(BuiltinOp::Set),
            data,
            ActionOptions::default(),
        )
    }

    /// Writes (or merges, for records) `value` at the state path `key`.
    pub fn update(&self, key: impl Into<String>, value: Value) -> Action {
        Action::new(
            self.namer.builtin(BuiltinOp::Update),
            value,
            ActionOptions::default().key(key),
        )
    }

    /// Resets the state to its initial value.
    pub fn clear(&self) -> Action {
        Action::bare(self.namer.builtin(BuiltinOp::Clear))
    }

    // =========================================================================
    // Metadata helpers
    // =========================================================================

    pub fn start_loading(&self) -> Action {
        self.update("meta.loading", Value::Bool(true))
    }

    pub fn end_loading(&self) -> Action {
        self.update("meta.loading", Value::Bool(false))
    }

    pub fn start_updating<I, S>(&self, keys: I) -> Action
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.update("meta.updating", flags(keys, true))
    }

    pub fn end_updating<I, S>(&self, keys: I) -> Action
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.update("meta.updating", flags(keys, false))
    }

    pub fn set_error(&self, error: &ErrorInfo) -> Action {
        self.update(
            "meta.error",
            json!({"status": error.status, "data": error.data}),
        )
    }

    pub fn clear_error(&self) -> Action {
        self.update("meta.error", Value::Null)
    }

    // =========================================================================
    // Custom operations
    // =========================================================================

    pub fn creator(&self, key: &str) -> Option<&ActionCreator> {
        self.custom.get(key)
    }

    /// Builds a custom action, failing for keys the resource does not declare.
    pub fn custom(
        &self,
        key: &str,
        payload: Value,
        options: ActionOptions,
    ) -> Result<Action, ResourceError> {
        self.creator(key)
            .map(|creator| creator.create(payload, options))
            .ok_or_else(|| ResourceError::UnknownOperation {
                resource: self.namer.resource().to_string(),
                operation: key.to_string(),
            })
    }

    pub fn custom_keys(&self) -> impl Iterator<Item = &str> {
        self.custom.keys().map(String::as_str)
    }
}

fn flags<I, S>(keys: I, value: bool) -> Value
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Value::Object(
        keys.into_iter()
            .map(|key| (key.into(), Value::Bool(value)))
            .collect::<Map<String, Value>>(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actions() -> ResourceActions {
        ResourceActions::new(
            ActionNamer::new("todos"),
            ["toggle", "fetchRequest", "toggle"],
        )
    }

    #[test]
    fn test_builtin_actions() {
        let actions = actions();

        let set = actions.set(json!({"title": "x"}));
        assert_eq!(set.kind, "todos/set");
        assert_eq!(set.payload, json!({"title": "x"}));

        let update = actions.update("items[0]", json!(1));
        assert_eq!(update.kind, "todos/update");
        assert_eq!(update.options.key.as_deref(), Some("items[0]"));

        let clear = actions.clear();
        assert_eq!(clear.kind, "todos/clear");
        assert!(clear.payload.is_null());
    }

    #[test]
    fn test_metadata_helpers_are_updates() {
        let actions = actions();

        let loading = actions.start_loading();
        assert_eq!(loading.kind, "todos/update");
        assert_eq!(loading.options.key.as_deref(), Some("meta.loading"));
        assert_eq!(loading.payload, json!(true));

        let updating = actions.start_updating(["a", "b"]);
        assert_eq!(updating.options.key.as_deref(), Some("meta.updating"));
        assert_eq!(updating.payload, json!({"a": true, "b": true}));
        assert_eq!(actions.end_updating(["a"]).payload, json!({"a": false}));

        let error = actions.set_error(&ErrorInfo {
            status: 404,
            data: json!({"message": "nf"}),
        });
        assert_eq!(error.options.key.as_deref(), Some("meta.error"));
        assert_eq!(
            error.payload,
            json!({"status": 404, "data": {"message": "nf"}})
        );
        assert!(actions.clear_error().payload.is_null());
    }

    #[test]
    fn test_custom_creators_are_deduplicated() {
        let actions = actions();
        assert_eq!(
            actions.custom_keys().collect::<Vec<_>>(),
            vec!["fetchRequest", "toggle"]
        );

        let toggle = actions.creator("toggle").unwrap().empty();
        assert_eq!(toggle.kind, "todos/toggle");
        assert_eq!(toggle.payload, json!({}));
    }

    #[test]
    fn test_unknown_custom_key_is_an_error() {
        let result = actions().custom("missing", json!({}), ActionOptions::default());
        assert!(matches!(
            result,
            Err(ResourceError::UnknownOperation { operation, .. }) if operation == "missing"
        ));
    }
}
