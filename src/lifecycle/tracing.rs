//! # Observability & Tracing
//!
//! [`setup_tracing`] installs a compact `tracing-subscriber` formatter filtered by
//! `RUST_LOG`. Module paths are hidden; log lines carry `resource` and `action_type`
//! fields instead.
//!
//! ## What Gets Traced
//!
//! | Level | Events |
//! |-------|--------|
//! | `info` | store and supervisor start/stop |
//! | `debug` | every dispatch, state change, effect spawn and remote call |
//! | `warn` | failed remote calls, `update` actions without a usable key |
//! | `error` | effect runs aborted by a configuration error |
//!
//! Effect runs execute inside an `effect` span, so everything they log is tagged
//! with the resource and effect key.
//!
//! ```bash
//! RUST_LOG=info cargo test
//! RUST_LOG=resource_kit=debug cargo test
//! ```
//!
//! With `RUST_LOG=debug`, a successful `fetchRequest` looks like:
//!
//! ```text
//! DEBUG Dispatch action_type="todos/fetchRequest"
//! DEBUG Spawning effect resource=todos action_type="todos/fetchRequest" effect=fetchRequest
//! DEBUG effect: Dispatch action_type="todos/update" resource=todos effect=fetchRequest
//! DEBUG effect: Remote call resource="todos" operation=fetchRequest method=GET url=/todos/5
//! DEBUG effect: Dispatch action_type="todos/set" resource=todos effect=fetchRequest
//! ```

/// Installs the global subscriber. Later calls are no-ops, so every test may call it.
pub fn setup_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .try_init();
}
