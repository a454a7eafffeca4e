use std::collections::HashSet;

use chrono::{TimeZone, Utc};
use fleetwatch_common::types::{
    Alert, AlertConfiguration, AlertDefinition, AlertLabel, AlertState, ConfigurationType,
    Severity,
};

use crate::store::{AlertFilter, AlertStore, ConfigurationFilter, DefinitionFilter};
use crate::AlertCatalog;

async fn setup() -> AlertStore {
    AlertStore::in_memory().await.unwrap()
}

fn make_alert(id: &str, definition_id: &str, source_id: &str, state: AlertState) -> Alert {
    Alert {
        id: id.to_string(),
        customer_id: "c1".to_string(),
        definition_id: definition_id.to_string(),
        configuration_id: "cfg1".to_string(),
        source_id: source_id.to_string(),
        source_name: Some(format!("{source_id}-name")),
        name: Some("High CPU".to_string()),
        severity: Severity::Warning,
        configuration_type: ConfigurationType::Universe,
        message: Some("cpu above 90%".to_string()),
        labels: vec![
            AlertLabel::new("definition_uuid", definition_id),
            AlertLabel::new("source_uuid", source_id),
        ],
        state,
        create_time: Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap(),
        acknowledged_time: None,
        resolved_time: None,
    }
}

fn make_configuration(id: &str, active: bool) -> AlertConfiguration {
    AlertConfiguration {
        id: id.to_string(),
        customer_id: "c1".to_string(),
        name: format!("config {id}"),
        target_type: ConfigurationType::Platform,
        default_severity: Severity::Severe,
        active,
        created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
    }
}

fn make_definition(id: &str, configuration_id: &str) -> AlertDefinition {
    AlertDefinition {
        id: id.to_string(),
        customer_id: "c1".to_string(),
        configuration_id: configuration_id.to_string(),
        created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
    }
}

#[tokio::test]
async fn save_and_list_alerts_round_trip() {
    let store = setup().await;
    let alert = make_alert("a1", "d1", "s1", AlertState::Active);
    let saved = store.save_alerts(std::slice::from_ref(&alert)).await.unwrap();
    assert_eq!(saved.len(), 1);

    let loaded = store.get_alert_by_id("a1").await.unwrap().unwrap();
    assert_eq!(loaded, alert);
}

#[tokio::test]
async fn save_empty_batch_is_noop() {
    let store = setup().await;
    let saved = store.save_alerts(&[]).await.unwrap();
    assert!(saved.is_empty());
    assert!(store.list_alerts(&AlertFilter::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn save_updates_existing_row_by_id() {
    let store = setup().await;
    store
        .save_alerts(&[make_alert("a1", "d1", "s1", AlertState::Active)])
        .await
        .unwrap();

    let mut updated = make_alert("a1", "d1", "s1", AlertState::Active);
    updated.severity = Severity::Severe;
    updated.message = Some("cpu above 99%".to_string());
    store.save_alerts(&[updated]).await.unwrap();

    let all = store.list_alerts(&AlertFilter::default()).await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].severity, Severity::Severe);
    assert_eq!(all[0].message.as_deref(), Some("cpu above 99%"));
}

#[tokio::test]
async fn save_keeps_acknowledged_state() {
    let store = setup().await;
    store
        .save_alerts(&[make_alert("a1", "d1", "s1", AlertState::Active)])
        .await
        .unwrap();
    let acked = store.acknowledge_alert("a1").await.unwrap().unwrap();
    assert_eq!(acked.state, AlertState::Acknowledged);
    assert!(acked.acknowledged_time.is_some());

    // A writer holding a stale copy must not clobber the acknowledgement
    let mut stale = make_alert("a1", "d1", "s1", AlertState::Active);
    stale.severity = Severity::Info;
    let saved = store.save_alerts(&[stale]).await.unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].state, AlertState::Acknowledged);
    assert_eq!(saved[0].severity, Severity::Info);

    let loaded = store.get_alert_by_id("a1").await.unwrap().unwrap();
    assert_eq!(loaded.state, AlertState::Acknowledged);
    assert!(loaded.acknowledged_time.is_some());
    assert_eq!(loaded.severity, Severity::Info);
}

#[tokio::test]
async fn save_large_batch_spans_multiple_statements() {
    let store = setup().await;
    let alerts: Vec<Alert> = (0..450)
        .map(|i| make_alert(&format!("a{i:04}"), "d1", &format!("s{i}"), AlertState::Active))
        .collect();
    let saved = store.save_alerts(&alerts).await.unwrap();
    assert_eq!(saved.len(), 450);
    let all = store.list_alerts(&AlertFilter::default()).await.unwrap();
    assert_eq!(all.len(), 450);
}

#[tokio::test]
async fn list_alerts_filters() {
    let store = setup().await;
    store
        .save_alerts(&[
            make_alert("a1", "d1", "s1", AlertState::Active),
            make_alert("a2", "d1", "s2", AlertState::Resolved),
            make_alert("a3", "d2", "s1", AlertState::Suspended),
        ])
        .await
        .unwrap();

    let firing_d1 = store
        .list_alerts(&AlertFilter::firing_for_definitions(["d1".to_string()]))
        .await
        .unwrap();
    assert_eq!(firing_d1.len(), 1);
    assert_eq!(firing_d1[0].id, "a1");

    let by_ids = store
        .list_alerts(&AlertFilter {
            ids: Some(vec!["a2".to_string(), "a3".to_string()]),
            ..AlertFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(by_ids.len(), 2);

    let excluded = store
        .list_alerts(&AlertFilter::firing_except(HashSet::from(["a1".to_string()])))
        .await
        .unwrap();
    assert_eq!(excluded.len(), 1);
    assert_eq!(excluded[0].id, "a3");
}

#[tokio::test]
async fn empty_id_list_matches_nothing() {
    let store = setup().await;
    store
        .save_alerts(&[make_alert("a1", "d1", "s1", AlertState::Active)])
        .await
        .unwrap();
    let none = store
        .list_alerts(&AlertFilter::firing_for_definitions(Vec::new()))
        .await
        .unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn mark_resolved_touches_only_firing_matches() {
    let store = setup().await;
    store
        .save_alerts(&[
            make_alert("a1", "d1", "s1", AlertState::Active),
            make_alert("a2", "d1", "s2", AlertState::Acknowledged),
            make_alert("a3", "d1", "s3", AlertState::Resolved),
            make_alert("a4", "d2", "s1", AlertState::Active),
        ])
        .await
        .unwrap();

    let resolved = store
        .mark_resolved(&AlertFilter::firing_except(HashSet::from(["a4".to_string()])))
        .await
        .unwrap();
    let mut ids: Vec<&str> = resolved.iter().map(|a| a.id.as_str()).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec!["a1", "a2"]);
    assert!(resolved
        .iter()
        .all(|a| a.state == AlertState::Resolved && a.resolved_time.is_some()));

    let a4 = store.get_alert_by_id("a4").await.unwrap().unwrap();
    assert_eq!(a4.state, AlertState::Active);
    let a1 = store.get_alert_by_id("a1").await.unwrap().unwrap();
    assert_eq!(a1.state, AlertState::Resolved);
    assert!(a1.resolved_time.is_some());
}

#[tokio::test]
async fn mark_resolved_with_nothing_firing_returns_empty() {
    let store = setup().await;
    let resolved = store
        .mark_resolved(&AlertFilter::firing_except(HashSet::new()))
        .await
        .unwrap();
    assert!(resolved.is_empty());
}

#[tokio::test]
async fn acknowledge_unknown_or_resolved_alert() {
    let store = setup().await;
    assert!(store.acknowledge_alert("missing").await.unwrap().is_none());

    store
        .save_alerts(&[make_alert("a1", "d1", "s1", AlertState::Resolved)])
        .await
        .unwrap();
    let unchanged = store.acknowledge_alert("a1").await.unwrap().unwrap();
    assert_eq!(unchanged.state, AlertState::Resolved);
    assert!(unchanged.acknowledged_time.is_none());
}

#[tokio::test]
async fn definitions_and_configurations() {
    let store = setup().await;
    store
        .insert_configuration(&make_configuration("cfg1", true))
        .await
        .unwrap();
    store
        .insert_configuration(&make_configuration("cfg2", false))
        .await
        .unwrap();
    store
        .insert_definition(&make_definition("d1", "cfg1"))
        .await
        .unwrap();
    store
        .insert_definition(&make_definition("d2", "cfg2"))
        .await
        .unwrap();

    let defs = store
        .list_definitions(&DefinitionFilter::by_ids([
            "d1".to_string(),
            "unknown".to_string(),
        ]))
        .await
        .unwrap();
    assert_eq!(defs.len(), 1);
    assert_eq!(defs[0].configuration_id, "cfg1");

    let active = store
        .list_configurations(&ConfigurationFilter::active_by_ids([
            "cfg1".to_string(),
            "cfg2".to_string(),
        ]))
        .await
        .unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, "cfg1");
    assert_eq!(active[0].target_type, ConfigurationType::Platform);

    let toggled = store
        .set_configuration_active("cfg2", true)
        .await
        .unwrap()
        .unwrap();
    assert!(toggled.active);
    assert!(store
        .set_configuration_active("nope", true)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn catalog_trait_object_delegates_to_store() {
    let store = setup().await;
    let catalog: &dyn AlertCatalog = &store;
    catalog
        .save_alerts(&[make_alert("a1", "d1", "s1", AlertState::Active)])
        .await
        .unwrap();
    let listed = catalog.list_alerts(&AlertFilter::default()).await.unwrap();
    assert_eq!(listed.len(), 1);
}

#[tokio::test]
async fn file_backed_store_persists_across_reconnects() {
    let dir = tempfile::TempDir::new().unwrap();
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("alerts.db").display());

    let store = AlertStore::new(&url).await.unwrap();
    store
        .save_alerts(&[make_alert("a1", "d1", "s1", AlertState::Active)])
        .await
        .unwrap();
    drop(store);

    let reopened = AlertStore::new(&url).await.unwrap();
    assert!(reopened.get_alert_by_id("a1").await.unwrap().is_some());
}
