//! End-to-end tests: real store, real supervisors and `ReqwestTransport` against a
//! wiremock server.

use resource_kit::action::DoneOutcome;
use resource_kit::{
    setup_tracing, ActionOptions, Done, EffectContext, Resource, ResourceDefinition,
    ResourceError, ResourceSystem, ReqwestTransport, StoreConfig, TransportConfig,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::oneshot;
use wiremock::matchers::{bearer_token, body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn transport(base_url: &str, bearer: Option<&str>) -> Arc<ReqwestTransport> {
    let config = TransportConfig {
        base_url: Some(base_url.to_string()),
        bearer_token: bearer.map(str::to_string),
        ..TransportConfig::default()
    };
    Arc::new(ReqwestTransport::from_config(&config).expect("transport should build"))
}

async fn start(definition: ResourceDefinition) -> (Resource, ResourceSystem) {
    setup_tracing();
    let resource = Resource::new(definition).expect("definition should be valid");
    let system = ResourceSystem::start(vec![resource.clone()], &StoreConfig::default())
        .await
        .expect("system should start");
    (resource, system)
}

fn todos(base_url: &str) -> ResourceDefinition {
    ResourceDefinition::new("todos")
        .state(json!({"title": ""}))
        .path("/todos/:id?")
        .transport(transport(base_url, None))
}

/// Dispatches `key` with a `done` callback and waits for it.
async fn run(
    resource: &Resource,
    system: &ResourceSystem,
    key: &str,
    payload: Value,
    options: ActionOptions,
) -> Result<DoneOutcome, oneshot::error::RecvError> {
    let (done, outcome) = Done::channel();
    let action = resource
        .actions()
        .custom(key, payload, options.done(done))
        .expect("operation should exist");
    system.store.dispatch(action).await.expect("dispatch");
    outcome.await
}

mod remote_operations {
    use super::*;

    #[tokio::test]
    async fn test_fetch_success_merges_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/todos/5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"title": "x"})))
            .expect(1)
            .mount(&server)
            .await;

        let (todos, system) = start(todos(&server.uri())).await;
        let (error, data) = run(
            &todos,
            &system,
            "fetchRequest",
            json!({}),
            ActionOptions::new().param("id", "5"),
        )
        .await
        .expect("done should be called");

        assert!(error.is_none());
        assert_eq!(data, Some(json!({"title": "x"})));

        let state = system.store.state("todos").await.unwrap();
        assert_eq!(
            *state,
            json!({
                "title": "x",
                "meta": {"loading": false, "updating": {}, "error": null}
            })
        );
        system.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_fetch_failure_records_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/todos/5"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "nf"})))
            .mount(&server)
            .await;

        let (todos, system) = start(todos(&server.uri())).await;
        let (error, data) = run(
            &todos,
            &system,
            "fetchRequest",
            json!({}),
            ActionOptions::new().param("id", "5"),
        )
        .await
        .expect("done should be called");

        let error = error.expect("failure should be reported");
        assert_eq!(error.status, Some(404));
        assert!(data.is_none());

        let state = system.store.state("todos").await.unwrap();
        assert_eq!(state["title"], json!(""));
        assert_eq!(state["meta"]["loading"], json!(false));
        assert_eq!(
            state["meta"]["error"],
            json!({"status": 404, "data": {"message": "nf"}})
        );
        system.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_create_posts_payload_with_query() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/todos"))
            .and(query_param("draft", "true"))
            .and(body_json(json!({"title": "milk"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 7})))
            .expect(1)
            .mount(&server)
            .await;

        let (todos, system) = start(todos(&server.uri())).await;
        let (error, data) = run(
            &todos,
            &system,
            "createRequest",
            json!({"title": "milk"}),
            ActionOptions::new().query("draft", true),
        )
        .await
        .unwrap();

        assert!(error.is_none());
        assert_eq!(data, Some(json!({"id": 7})));
        let state = system.store.state("todos").await.unwrap();
        assert_eq!(state["title"], json!(""));
        system.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_update_patches_without_loading() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/todos/5"))
            .and(body_json(json!({"title": "y"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"title": "y"})))
            .expect(1)
            .mount(&server)
            .await;

        let (todos, system) = start(todos(&server.uri())).await;
        let mut subscription = system.store.subscribe().await.unwrap();
        run(
            &todos,
            &system,
            "updateRequest",
            json!({"title": "y"}),
            ActionOptions::new().param("id", 5),
        )
        .await
        .unwrap();

        while let Ok(action) = subscription.try_recv() {
            assert_ne!(action.options.key.as_deref(), Some("meta.loading"));
        }
        let state = system.store.state("todos").await.unwrap();
        assert_eq!(state["title"], json!(""));
        system.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_sends_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/todos/5"))
            .and(bearer_token("secret"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let definition = ResourceDefinition::new("todos")
            .path("/todos/:id")
            .transport(transport(&server.uri(), Some("secret")));
        let (todos, system) = start(definition).await;
        let (error, data) = run(
            &todos,
            &system,
            "deleteRequest",
            json!({}),
            ActionOptions::new().param("id", "5"),
        )
        .await
        .unwrap();

        assert!(error.is_none());
        assert_eq!(data, Some(Value::Null));
        system.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_unreachable_server_uses_default_error_info() {
        let (todos, system) = start(todos("http://127.0.0.1:1")).await;
        let (error, _) = run(
            &todos,
            &system,
            "fetchRequest",
            json!({}),
            ActionOptions::new(),
        )
        .await
        .unwrap();

        assert_eq!(error.unwrap().status, None);
        let state = system.store.state("todos").await.unwrap();
        assert_eq!(state["meta"]["error"], json!({"status": 0, "data": {}}));
        assert_eq!(state["meta"]["loading"], json!(false));
        system.shutdown().await.unwrap();
    }
}

mod custom_effects {
    use super::*;

    #[tokio::test]
    async fn test_custom_effect_delegates_to_fetch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/todos"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"title": "x"})))
            .expect(1)
            .mount(&server)
            .await;

        let definition = todos(&server.uri()).effect(
            "refresh",
            |ctx: EffectContext, _payload, mut options: ActionOptions| async move {
                let done = options.done.take();
                ctx.dispatch(ctx.actions().start_updating(["list"])).await?;
                ctx.fetch_request(Value::Null, options).await?;
                ctx.dispatch(ctx.actions().end_updating(["list"])).await?;
                if let Some(done) = done {
                    done.call(None, None);
                }
                Ok::<(), ResourceError>(())
            },
        );
        let (todos, system) = start(definition).await;
        run(&todos, &system, "refresh", json!({}), ActionOptions::new())
            .await
            .unwrap();

        let state = system.store.state("todos").await.unwrap();
        assert_eq!(state["title"], json!("x"));
        assert_eq!(state["meta"]["updating"], json!({"list": false}));
        system.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_path_skips_done_and_keeps_supervisor_alive() {
        let transport = transport("http://127.0.0.1:1", None);
        let definition = ResourceDefinition::new("todos")
            .transport(transport)
            .effect("ping", |_ctx, _payload, options: ActionOptions| async move {
                if let Some(done) = options.done {
                    done.call(None, Some(json!("pong")));
                }
                Ok::<(), ResourceError>(())
            });
        let (todos, system) = start(definition).await;

        let fetch = run(&todos, &system, "fetchRequest", json!({}), ActionOptions::new()).await;
        assert!(fetch.is_err(), "done must not be called on a configuration error");

        let state = system.store.state("todos").await.unwrap();
        assert_eq!(state["meta"]["loading"], json!(false));
        assert_eq!(state["meta"]["error"], Value::Null);

        let (_, data) = run(&todos, &system, "ping", json!({}), ActionOptions::new())
            .await
            .unwrap();
        assert_eq!(data, Some(json!("pong")));
        system.shutdown().await.unwrap();
    }
}
