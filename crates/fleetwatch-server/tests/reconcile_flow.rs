mod common;

use common::{build_test_context, get};
use fleetwatch_alert::TickOutcome;
use fleetwatch_common::types::AlertState;
use fleetwatch_server::config::{CatalogSeedFile, ServerConfig};
use fleetwatch_server::{runtime, seed};
use fleetwatch_storage::AlertFilter;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SEED: &str = r#"{
    "configurations": [{"id": "cfg1", "customer_id": "c1", "name": "Node health"}],
    "definitions": [
        {"id": "D1", "customer_id": "c1", "configuration_id": "cfg1"},
        {"id": "D2", "customer_id": "c1", "configuration_id": "cfg1"}
    ]
}"#;

fn alert(definition: &str, source: &str, severity: &str) -> serde_json::Value {
    serde_json::json!({
        "labels": {
            "customer_uuid": "c1",
            "definition_uuid": definition,
            "configuration_uuid": "cfg1",
            "source_uuid": source,
            "severity": severity
        },
        "annotations": {"summary": format!("{definition} on {source}")},
        "state": "firing",
        "activeAt": "2026-03-01T12:00:00Z"
    })
}

async fn mount_alerts(server: &MockServer, alerts: Vec<serde_json::Value>) {
    server.reset().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/alerts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "success",
            "data": {"alerts": alerts}
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn passes_create_and_resolve_through_the_http_surface() {
    let ctx = build_test_context().await;
    let seed_file: CatalogSeedFile = serde_json::from_str(SEED).unwrap();
    seed::init_catalog(&ctx.state.store, &seed_file).await.unwrap();

    let prometheus = MockServer::start().await;
    let mut config = ServerConfig::default();
    config.prometheus.base_url = prometheus.uri();
    config.alert_query.batch_size = 1;

    let scheduler =
        runtime::build_scheduler(&config, ctx.state.store.clone(), ctx.state.metrics.clone())
            .unwrap();

    mount_alerts(
        &prometheus,
        vec![
            alert("D1", "S1", "WARNING"),
            alert("D1", "S1", "SEVERE"),
            alert("D2", "S2", "SEVERE"),
            alert("D9", "S1", "SEVERE"),
        ],
    )
    .await;
    match scheduler.run_once().await {
        TickOutcome::Completed(report) => {
            assert_eq!(report.total, 4);
            assert_eq!(report.created, 2);
            assert_eq!(report.filtered, 1);
            assert_eq!(report.resolved, 0);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }

    let metrics = get(&ctx.app, "/metrics").await.body;
    assert!(metrics.contains("alert_query_new_alerts 2"));
    assert!(metrics.contains("alert_query_filtered_alerts 1"));
    assert!(metrics.contains("alert_query_status{status=\"ok\"} 1"));

    mount_alerts(&prometheus, vec![alert("D2", "S2", "SEVERE")]).await;
    match scheduler.run_once().await {
        TickOutcome::Completed(report) => {
            assert_eq!(report.updated, 1);
            assert_eq!(report.resolved, 1);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }

    let alerts = ctx
        .state
        .store
        .list_alerts(&AlertFilter::default())
        .await
        .unwrap();
    assert_eq!(alerts.len(), 2);
    let d1 = alerts.iter().find(|a| a.definition_id == "D1").unwrap();
    assert_eq!(d1.state, AlertState::Resolved);
    let d2 = alerts.iter().find(|a| a.definition_id == "D2").unwrap();
    assert_eq!(d2.state, AlertState::Active);
}

#[tokio::test]
async fn backend_failure_is_reported_on_health() {
    let ctx = build_test_context().await;
    let prometheus = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/alerts"))
        .respond_with(ResponseTemplate::new(503).set_body_string("down"))
        .mount(&prometheus)
        .await;

    let mut config = ServerConfig::default();
    config.prometheus.base_url = prometheus.uri();
    let scheduler =
        runtime::build_scheduler(&config, ctx.state.store.clone(), ctx.state.metrics.clone())
            .unwrap();

    assert!(matches!(scheduler.run_once().await, TickOutcome::Failed(_)));

    let body = get(&ctx.app, "/v1/health").await.json();
    let status = body["last_pass_status"].as_str().unwrap();
    assert_ne!(status, "ok");
    assert!(status.contains("503"), "status was {status}");
}
