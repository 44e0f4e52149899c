//! Integration tests for the live view-model: merge safety, sticky
//! connection, history replacement, and teardown semantics, all driven
//! through hand-fed fake stores.

mod common;

use common::*;

use growlink_core::model::LiveModel;
use growlink_core::paths;
use growlink_core::records::SensorSnapshot;
use serde_json::json;

fn model_over(
    keyed: std::sync::Arc<ScriptedKeyedStore>,
    documents: std::sync::Arc<ScriptedDocumentStore>,
) -> LiveModel {
    LiveModel::new(keyed, documents, arc(StaticProfiles(dieffenbachia())))
}

/// Deliver temperature and humidity in the given order and return the final
/// snapshot once both landed.
async fn snapshot_after_two_updates(first_temperature: bool) -> SensorSnapshot {
    let keyed = arc(ScriptedKeyedStore::new());
    let documents = arc(ScriptedDocumentStore::new());
    let model = model_over(keyed.clone(), documents.clone());
    let _disposer = model.start().await;

    if first_temperature {
        keyed.deliver(paths::PATH_TEMPERATURE, json!(25.0)).await;
        keyed.deliver(paths::PATH_AIR_HUMIDITY, json!(60)).await;
    } else {
        keyed.deliver(paths::PATH_AIR_HUMIDITY, json!(60)).await;
        keyed.deliver(paths::PATH_TEMPERATURE, json!(25.0)).await;
    }

    let state = wait_for(&model, |s| {
        s.sensors.temperature == 25.0 && s.sensors.air_humidity == 60.0
    })
    .await;
    state.sensors
}

#[tokio::test]
async fn concurrent_scalar_updates_never_lose_each_other() {
    let forward = snapshot_after_two_updates(true).await;
    let reversed = snapshot_after_two_updates(false).await;

    assert_eq!(forward.temperature, 25.0);
    assert_eq!(forward.air_humidity, 60.0);
    assert_eq!(forward, reversed);
}

#[tokio::test]
async fn connection_flag_latches_on_first_value_and_never_reverts() {
    let keyed = arc(ScriptedKeyedStore::new());
    let documents = arc(ScriptedDocumentStore::new());
    let model = model_over(keyed.clone(), documents.clone());
    let _disposer = model.start().await;

    assert!(!model.snapshot().await.connected);

    keyed.deliver(paths::PATH_TEMPERATURE, json!(26.5)).await;
    wait_for(&model, |s| s.connected).await;

    // Null and error deliveries must not reset the flag.
    keyed.deliver_null(paths::PATH_TEMPERATURE).await;
    keyed
        .deliver_error(paths::PATH_TEMPERATURE, "transport hiccup")
        .await;
    keyed.deliver(paths::PATH_TEMPERATURE, json!(30.0)).await;

    let state = wait_for(&model, |s| s.sensors.temperature == 30.0).await;
    assert!(state.connected);
}

#[tokio::test]
async fn history_page_arrives_newest_first_and_charts_oldest_first() {
    let keyed = arc(ScriptedKeyedStore::new());
    let documents = arc(ScriptedDocumentStore::new());
    let model = model_over(keyed.clone(), documents.clone());
    let _disposer = model.start().await;

    // Server order: t3, t2, t1 (descending by timestamp).
    documents
        .deliver_page(
            paths::RPM_COLLECTION,
            vec![
                rpm_doc("12-05-2025_10-00-00", 1400),
                rpm_doc("12-05-2025_09-00-00", 1300),
                rpm_doc("12-05-2025_08-00-00", 1200),
            ],
        )
        .await;

    let state = wait_for(&model, |s| s.rpm_history.len() == 3).await;
    let times: Vec<&str> = state.rpm_history.iter().map(|p| p.time.as_str()).collect();
    assert_eq!(times, vec!["08:00", "09:00", "10:00"]);
    assert_eq!(state.rpm_history.as_slice()[0].fan1, 1200);
    assert_eq!(state.rpm_history.latest().unwrap().fan1, 1400);
    assert!(!state.loading);
}

#[tokio::test]
async fn empty_page_never_clears_an_existing_history() {
    let keyed = arc(ScriptedKeyedStore::new());
    let documents = arc(ScriptedDocumentStore::new());
    let model = model_over(keyed.clone(), documents.clone());
    let _disposer = model.start().await;

    documents
        .deliver_page(
            paths::RPM_COLLECTION,
            vec![
                rpm_doc("12-05-2025_10-00-00", 1400),
                rpm_doc("12-05-2025_09-00-00", 1300),
            ],
        )
        .await;
    wait_for(&model, |s| s.rpm_history.len() == 2).await;

    documents.deliver_page(paths::RPM_COLLECTION, vec![]).await;
    settle().await;

    let state = model.snapshot().await;
    assert_eq!(state.rpm_history.len(), 2);
    assert_eq!(state.rpm_history.latest().unwrap().fan1, 1400);
}

#[tokio::test]
async fn malformed_documents_are_skipped_not_fatal() {
    let keyed = arc(ScriptedKeyedStore::new());
    let documents = arc(ScriptedDocumentStore::new());
    let model = model_over(keyed.clone(), documents.clone());
    let _disposer = model.start().await;

    documents
        .deliver_page(
            paths::LUX_COLLECTION,
            vec![
                lux_doc("12-05-2025_10-00-00", 1500),
                json!("not a document"),
                lux_doc("12-05-2025_09-00-00", 1200),
            ],
        )
        .await;

    let state = wait_for(&model, |s| !s.lux_history.is_empty()).await;
    assert_eq!(state.lux_history.len(), 2);
    assert!(state.load_error.is_none());
}

#[tokio::test]
async fn history_delivery_error_records_message_but_keeps_data() {
    let keyed = arc(ScriptedKeyedStore::new());
    let documents = arc(ScriptedDocumentStore::new());
    let model = model_over(keyed.clone(), documents.clone());
    let _disposer = model.start().await;

    documents
        .deliver_page(
            paths::RPM_COLLECTION,
            vec![rpm_doc("12-05-2025_10-00-00", 1400)],
        )
        .await;
    wait_for(&model, |s| s.rpm_history.len() == 1).await;

    documents
        .deliver_error(paths::RPM_COLLECTION, "permission revoked")
        .await;
    let state = wait_for(&model, |s| s.load_error.is_some()).await;

    assert_eq!(state.rpm_history.len(), 1);
    assert_eq!(
        state.load_error.as_deref(),
        Some("Failed to load fan RPM history")
    );

    // The next good page clears the error again.
    documents
        .deliver_page(
            paths::RPM_COLLECTION,
            vec![rpm_doc("12-05-2025_11-00-00", 1500)],
        )
        .await;
    let state = wait_for(&model, |s| s.load_error.is_none()).await;
    assert_eq!(state.rpm_history.latest().unwrap().time, "11:00");
}

#[tokio::test]
async fn one_setup_failure_does_not_block_other_subscriptions() {
    let keyed = arc(ScriptedKeyedStore::new());
    keyed.refuse_subscribe(paths::PATH_TEMPERATURE).await;
    let documents = arc(ScriptedDocumentStore::new());
    let model = model_over(keyed.clone(), documents.clone());
    let _disposer = model.start().await;

    assert!(model.snapshot().await.load_error.is_some());

    // Every other stream still came up.
    keyed.deliver(paths::PATH_AIR_HUMIDITY, json!(55)).await;
    documents
        .deliver_page(
            paths::LUX_COLLECTION,
            vec![lux_doc("12-05-2025_10-00-00", 900)],
        )
        .await;

    let state = wait_for(&model, |s| {
        s.sensors.air_humidity == 55.0 && !s.lux_history.is_empty()
    })
    .await;
    assert!(state.connected);
}

#[tokio::test]
async fn status_fields_follow_their_own_paths() {
    let keyed = arc(ScriptedKeyedStore::new());
    let documents = arc(ScriptedDocumentStore::new());
    let model = model_over(keyed.clone(), documents.clone());
    let _disposer = model.start().await;

    keyed.deliver(paths::PATH_PUMP, json!(true)).await;
    keyed.deliver(paths::PATH_HEATER, json!(0)).await;
    keyed.deliver(paths::PATH_LIGHT_DURATION, json!("6h 20m")).await;
    keyed.deliver(paths::PATH_SOIL_STATUS, json!("moist, draining well")).await;
    keyed.deliver(paths::PATH_VPD, json!("1.24")).await;

    let state = wait_for(&model, |s| s.vpd == "1.24").await;
    assert!(state.pump_on);
    assert!(!state.heater_on);
    assert_eq!(state.light_duration, "6h 20m");
    assert_eq!(state.soil_status, "moist, draining well");
}

#[tokio::test]
async fn plant_profile_loads_at_start() {
    let keyed = arc(ScriptedKeyedStore::new());
    let documents = arc(ScriptedDocumentStore::new());
    let model = model_over(keyed.clone(), documents.clone());
    let _disposer = model.start().await;

    let state = wait_for(&model, |s| !s.plant.name.is_empty()).await;
    assert_eq!(state.plant.name, "Dieffenbachia");
}

#[tokio::test]
async fn failed_profile_fetch_leaves_default_profile() {
    let keyed = arc(ScriptedKeyedStore::new());
    let documents = arc(ScriptedDocumentStore::new());
    let model = LiveModel::new(keyed.clone(), documents.clone(), arc(FailingProfiles));
    let _disposer = model.start().await;

    settle().await;
    // The fetch failed; the default (empty) profile is still in place and no
    // error state was introduced for it.
    assert!(model.snapshot().await.plant.name.is_empty());
}

#[tokio::test]
async fn dispose_detaches_every_subscription_and_is_idempotent() {
    let keyed = arc(ScriptedKeyedStore::new());
    let documents = arc(ScriptedDocumentStore::new());
    let model = model_over(keyed.clone(), documents.clone());
    let mut disposer = model.start().await;

    keyed.deliver(paths::PATH_TEMPERATURE, json!(22.0)).await;
    wait_for(&model, |s| s.sensors.temperature == 22.0).await;

    disposer.dispose();
    disposer.dispose();
    settle().await;

    // Receivers are gone; a late delivery has nowhere to go.
    assert!(!keyed.try_deliver(paths::PATH_TEMPERATURE, json!(99.0)).await);
    assert_eq!(model.snapshot().await.sensors.temperature, 22.0);
}

#[tokio::test]
async fn late_profile_resolution_after_dispose_writes_nothing() {
    let keyed = arc(ScriptedKeyedStore::new());
    let documents = arc(ScriptedDocumentStore::new());
    let (release, profiles) = gated_profiles();
    let model = std::sync::Arc::new(LiveModel::new(
        keyed.clone(),
        documents.clone(),
        arc(profiles),
    ));
    let mut disposer = model.start().await;

    // A refresh in flight on its own task, blocked on the gate.
    let refresh = tokio::spawn({
        let model = model.clone();
        async move { model.refresh_plant_profile().await }
    });
    settle().await;

    disposer.dispose();
    release.send(Some(dieffenbachia())).unwrap();
    refresh.await.unwrap();
    settle().await;

    // The fetch resolved after teardown; nothing may have been written.
    assert!(model.snapshot().await.plant.name.is_empty());
}

#[tokio::test]
async fn profile_resolution_before_dispose_lands() {
    let keyed = arc(ScriptedKeyedStore::new());
    let documents = arc(ScriptedDocumentStore::new());
    let (release, profiles) = gated_profiles();
    let model = LiveModel::new(keyed.clone(), documents.clone(), arc(profiles));
    let _disposer = model.start().await;

    release.send(Some(dieffenbachia())).unwrap();
    let state = wait_for(&model, |s| !s.plant.name.is_empty()).await;
    assert_eq!(state.plant.scientific_name, "Dieffenbachia seguine");
}
