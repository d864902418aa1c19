//! # Reducer Synthesizer
//!
//! The pure state-transition function of a resource.
//!
//! State is held as `Arc<Value>` so that reference identity is observable: a no-op
//! returns the *same* `Arc`, every transition returns a new one.
//!
//! ## Routing
//!
//! Routes are resolved once, when the reducer is built. Built-in routes are laid
//! down first and custom reducers are layered on top, so a custom reducer always
//! wins over a built-in of the same name.
//!
//! | Route | Result |
//! |-------|--------|
//! | custom | whatever the custom reducer returns (full override) |
//! | `set` | shallow merge of the payload record onto the state |
//! | `update` | merge-or-overwrite at the path in `options.key` |
//! | `clear` | a fresh copy of the initial state |
//! | anything else | the input `Arc`, untouched |

use crate::action::{Action, ActionNamer, BuiltinOp};
use crate::path::Path;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// State transition function registered with the store.
pub trait Reducer: Send + Sync {
    /// State the store starts from.
    fn initial_state(&self) -> Arc<Value>;

    /// Computes the next state. Must not fail and must not mutate `state`.
    fn reduce(&self, state: Arc<Value>, action: &Action) -> Arc<Value>;
}

/// What a custom reducer sees besides its payload.
#[derive(Debug, Clone, Copy)]
pub struct ReducerContext<'a> {
    pub state: &'a Value,
}

/// A user-supplied reducer: `(payload, context) -> new state`.
pub type CustomReducer = Arc<dyn Fn(&Value, ReducerContext<'_>) -> Value + Send + Sync>;

/// Boxes a closure as a [`CustomReducer`].
pub fn custom_reducer<F>(reducer: F) -> CustomReducer
where
    F: Fn(&Value, ReducerContext<'_>) -> Value + Send + Sync + 'static,
{
    Arc::new(reducer)
}

/// Metadata block every resource state starts with.
pub fn default_meta() -> Value {
    json!({"loading": false, "updating": {}, "error": null})
}

#[derive(Clone)]
enum Route {
    Builtin(BuiltinOp),
    Custom(CustomReducer),
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Builtin(op) => write!(f, "Builtin({})", op),
            Route::Custom(_) => f.write_str("Custom"),
        }
    }
}

/// The synthesized reducer of one resource.
#[derive(Debug, Clone)]
pub struct ResourceReducer {
    resource: String,
    initial: Value,
    routes: HashMap<String, Route>,
}

impl ResourceReducer {
    /// `initial` must be a record; its `meta` field is replaced by [`default_meta`].
    pub(crate) fn new<'a>(
        namer: &ActionNamer,
        mut initial: Value,
        custom: impl IntoIterator<Item = (&'a String, &'a CustomReducer)>,
    ) -> Self {
        if let Value::Object(fields) = &mut initial {
            fields.insert("meta".to_string(), default_meta());
        }

        let mut routes: HashMap<String, Route> = BuiltinOp::ALL
            .into_iter()
            .map(|op| (namer.builtin(op), Route::Builtin(op)))
            .collect();
        for (key, reducer) in custom {
            routes.insert(namer.name(key), Route::Custom(reducer.clone()));
        }

        Self {
            resource: namer.resource().to_string(),
            initial,
            routes,
        }
    }

    /// Whether `action_type` is routed by this reducer.
    pub fn handles(&self, action_type: &str) -> bool {
        self.routes.contains_key(action_type)
    }

    fn set(&self, state: &Value, payload: &Value) -> Value {
        let mut next = state.clone();
        match (&mut next, payload) {
            (Value::Object(fields), Value::Object(incoming)) => {
                fields.extend(incoming.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
            _ => {
                warn!(resource = %self.resource, "set payload is not a record, nothing merged");
            }
        }
        next
    }

    fn update(&self, state: &Value, action: &Action) -> Value {
        let Some(key) = action.options.key.as_deref() else {
            warn!(resource = %self.resource, "update without a key, state unchanged");
            return state.clone();
        };
        // Written into a copy: a failed write may have replaced containers on the way.
        let mut next = state.clone();
        let written = Path::parse(key)
            .and_then(|path| path.merge_or_set(&mut next, action.payload.clone()));
        match written {
            Ok(()) => next,
            Err(e) => {
                warn!(resource = %self.resource, key, error = %e, "invalid update key, state unchanged");
                state.clone()
            }
        }
    }
}

impl Reducer for ResourceReducer {
    fn initial_state(&self) -> Arc<Value> {
        Arc::new(self.initial.clone())
    }

    fn reduce(&self, state: Arc<Value>, action: &Action) -> Arc<Value> {
        let Some(route) = self.routes.get(&action.kind) else {
            return state;
        };
        let next = match route {
            Route::Custom(reducer) => reducer(&action.payload, ReducerContext { state: &state }),
            Route::Builtin(BuiltinOp::Set) => self.set(&state, &action.payload),
            Route::Builtin(BuiltinOp::Update) => self.update(&state, action),
            Route::Builtin(BuiltinOp::Clear) => self.initial.clone(),
        };
        Arc::new(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{ActionOptions, ResourceActions};
    use crate::error::ErrorInfo;
    use std::collections::BTreeMap;

    fn setup(custom: BTreeMap<String, CustomReducer>) -> (ResourceReducer, ResourceActions) {
        let namer = ActionNamer::new("todos");
        let reducer = ResourceReducer::new(
            &namer,
            json!({"title": "", "items": [], "filter": {"done": false, "text": ""}}),
            custom.iter(),
        );
        let actions = ResourceActions::new(namer, custom.keys().cloned());
        (reducer, actions)
    }

    #[test]
    fn test_initial_state_carries_default_meta() {
        let (reducer, _) = setup(BTreeMap::new());
        let state = reducer.initial_state();
        assert_eq!(
            state["meta"],
            json!({"loading": false, "updating": {}, "error": null})
        );
        assert_eq!(state["title"], json!(""));
    }

    #[test]
    fn test_set_merges_top_level_fields() {
        let (reducer, actions) = setup(BTreeMap::new());
        let initial = reducer.initial_state();
        let next = reducer.reduce(initial.clone(), &actions.set(json!({"title": "x"})));
        assert_eq!(next["title"], json!("x"));
        assert_eq!(next["items"], initial["items"]);
        assert_eq!(next["meta"], initial["meta"]);
    }

    #[test]
    fn test_set_empty_is_new_reference_same_value() {
        let (reducer, actions) = setup(BTreeMap::new());
        let initial = reducer.initial_state();
        let next = reducer.reduce(initial.clone(), &actions.set(json!({})));
        assert!(!Arc::ptr_eq(&initial, &next));
        assert_eq!(*initial, *next);
    }

    #[test]
    fn test_update_merges_records_at_path() {
        let (reducer, actions) = setup(BTreeMap::new());
        let next = reducer.reduce(
            reducer.initial_state(),
            &actions.update("filter", json!({"text": "milk"})),
        );
        assert_eq!(next["filter"], json!({"done": false, "text": "milk"}));
    }

    #[test]
    fn test_update_overwrites_non_records() {
        let (reducer, actions) = setup(BTreeMap::new());
        let next = reducer.reduce(
            reducer.initial_state(),
            &actions.update("items", json!([1, 2])),
        );
        assert_eq!(next["items"], json!([1, 2]));
        let next = reducer.reduce(next, &actions.update("filter", json!("all")));
        assert_eq!(next["filter"], json!("all"));
    }

    #[test]
    fn test_update_meta_leaves_domain_alone() {
        let (reducer, actions) = setup(BTreeMap::new());
        let initial = reducer.initial_state();
        let next = reducer.reduce(initial.clone(), &actions.start_loading());
        assert_eq!(next["meta"]["loading"], json!(true));
        assert_eq!(next["title"], initial["title"]);
        assert_eq!(next["items"], initial["items"]);
        assert_eq!(next["filter"], initial["filter"]);
    }

    #[test]
    fn test_updating_flags_fold_into_meta() {
        let (reducer, actions) = setup(BTreeMap::new());
        let state = reducer.reduce(reducer.initial_state(), &actions.start_updating(["a", "b"]));
        let state = reducer.reduce(state, &actions.end_updating(["a"]));
        assert_eq!(state["meta"]["updating"], json!({"a": false, "b": true}));
    }

    #[test]
    fn test_error_set_and_clear() {
        let (reducer, actions) = setup(BTreeMap::new());
        let info = ErrorInfo {
            status: 500,
            data: json!({"message": "boom"}),
        };
        let state = reducer.reduce(reducer.initial_state(), &actions.set_error(&info));
        assert_eq!(state["meta"]["error"]["status"], json!(500));
        let state = reducer.reduce(state, &actions.clear_error());
        assert!(state["meta"]["error"].is_null());
    }

    #[test]
    fn test_update_without_key_keeps_value() {
        let (reducer, actions) = setup(BTreeMap::new());
        let initial = reducer.initial_state();
        let action = Action::new(
            actions.builtin_type(BuiltinOp::Update),
            json!(1),
            ActionOptions::default(),
        );
        let next = reducer.reduce(initial.clone(), &action);
        assert_eq!(*next, *initial);
    }

    #[test]
    fn test_set_ignores_non_record_payload() {
        let (reducer, actions) = setup(BTreeMap::new());
        let initial = reducer.initial_state();
        let next = reducer.reduce(initial.clone(), &actions.set(json!([{"title": "x"}])));
        assert!(!Arc::ptr_eq(&initial, &next));
        assert_eq!(*next, *initial);
    }

    #[test]
    fn test_update_with_overflowing_index_keeps_state() {
        let (reducer, actions) = setup(BTreeMap::new());
        let initial = reducer.initial_state();
        for key in ["items[18446744073709551615]", "items.18446744073709551615"] {
            let next = reducer.reduce(initial.clone(), &actions.update(key, json!(1)));
            assert!(!Arc::ptr_eq(&initial, &next));
            assert_eq!(*next, *initial, "key {}", key);
        }
    }

    #[test]
    fn test_update_with_oversized_index_keeps_state() {
        let (reducer, actions) = setup(BTreeMap::new());
        let initial = reducer.initial_state();
        let next = reducer.reduce(initial.clone(), &actions.update("items[4000000000]", json!(1)));
        assert_eq!(*next, *initial);

        // The scalar `title` would be replaced by a list before the index is rejected.
        let next = reducer.reduce(initial.clone(), &actions.update("title[4000000000]", json!(1)));
        assert_eq!(*next, *initial);

        let next = reducer.reduce(next, &actions.update("items[2]", json!("c")));
        assert_eq!(next["items"], json!([null, null, "c"]));
    }

    #[test]
    fn test_clear_resets_and_is_idempotent() {
        let (reducer, actions) = setup(BTreeMap::new());
        let initial = reducer.initial_state();
        let dirty = reducer.reduce(initial.clone(), &actions.set(json!({"title": "x"})));
        let dirty = reducer.reduce(dirty, &actions.start_loading());
        let once = reducer.reduce(dirty, &actions.clear());
        let twice = reducer.reduce(once.clone(), &actions.clear());
        assert_eq!(*once, *initial);
        assert_eq!(*twice, *once);
    }

    #[test]
    fn test_unknown_type_returns_same_reference() {
        let (reducer, _) = setup(BTreeMap::new());
        let initial = reducer.initial_state();
        let next = reducer.reduce(initial.clone(), &Action::bare("users/set"));
        assert!(Arc::ptr_eq(&initial, &next));
    }

    #[test]
    fn test_custom_reducer_overrides_builtin() {
        let mut custom: BTreeMap<String, CustomReducer> = BTreeMap::new();
        custom.insert(
            "set".to_string(),
            custom_reducer(|_payload, ctx| {
                let mut next = ctx.state.clone();
                next["overridden"] = json!(true);
                next
            }),
        );
        let (reducer, actions) = setup(custom);
        let next = reducer.reduce(reducer.initial_state(), &actions.set(json!({"title": "x"})));
        assert_eq!(next["overridden"], json!(true));
        assert_eq!(next["title"], json!(""), "built-in merge must not run");
    }

    #[test]
    fn test_custom_reducer_receives_payload_and_state() {
        let mut custom: BTreeMap<String, CustomReducer> = BTreeMap::new();
        custom.insert(
            "addItem".to_string(),
            custom_reducer(|payload, ctx| {
                let mut next = ctx.state.clone();
                if let Some(items) = next["items"].as_array_mut() {
                    items.push(payload.clone());
                }
                next
            }),
        );
        let (reducer, actions) = setup(custom);
        assert!(reducer.handles("todos/addItem"));
        let action = actions
            .custom("addItem", json!({"title": "milk"}), ActionOptions::default())
            .unwrap();
        let next = reducer.reduce(reducer.initial_state(), &action);
        assert_eq!(next["items"], json!([{"title": "milk"}]));
    }
}
