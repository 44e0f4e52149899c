//! Live View-Model: Subscription Owner and Single Source of UI State
//!
//! ## Overview
//!
//! `LiveModel` is the one component that talks to the stores on the UI's
//! behalf. It opens every realtime subscription at `start()`, folds their
//! deliveries into one shared [`DashboardState`], and hands renderers whole
//! cloned snapshots. Nothing else in the system mutates that state.
//!
//! ## Update model
//!
//! Each subscription runs in its own task and deliveries from different
//! subscriptions interleave arbitrarily. Two rules keep that safe:
//!
//! 1. Every merge is a read-modify-write of the *current* shared state under
//!    the write lock. No task ever writes a state value it captured earlier,
//!    so concurrent scalar updates to disjoint fields cannot lose each
//!    other.
//! 2. History pages are replaced wholesale. A page is a complete,
//!    internally-consistent snapshot from the store; patching would only
//!    reintroduce the merge problems the store already solved.
//!
//! Existing data always wins over absence: empty pages, null scalars, and
//! delivery errors never blank previously shown values.
//!
//! ## Lifecycle
//!
//! `start()` acquires each subscription independently (one setup failure
//! does not stop the rest) and returns a [`Disposer`] owning one task per
//! acquired subscription. Disposing aborts the tasks and flips a liveness
//! flag that every async continuation checks before touching state, so a
//! one-shot fetch resolving after teardown writes nothing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, error, warn};
use serde_json::Value;
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;

use crate::decode;
use crate::errors::StoreError;
use crate::history::BoundedHistory;
use crate::paths;
use crate::records::{LuxPoint, PlantProfile, RpmPoint, SensorSnapshot, SoilMoisturePoint, VpdPoint};
use crate::store::{DocumentStore, KeyedStore, PageDelivery, ProfileSource, ScalarDelivery};

/// Everything the rendering layer consumes, as one cloneable value.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// Current scalar sensor readings
    pub sensors: SensorSnapshot,
    /// Irrigation pump running
    pub pump_on: bool,
    /// Heater running
    pub heater_on: bool,
    /// How long the grow light has been on today, display form
    pub light_duration: String,
    /// Free-text soil condition summary from the soil controller
    pub soil_status: String,
    /// Vapor pressure deficit, display form (kPa)
    pub vpd: String,
    /// Fan RPM chart window
    pub rpm_history: BoundedHistory<RpmPoint>,
    /// Light intensity chart window
    pub lux_history: BoundedHistory<LuxPoint>,
    /// Soil moisture chart window
    pub soil_history: BoundedHistory<SoilMoisturePoint>,
    /// VPD chart window
    pub vpd_history: BoundedHistory<VpdPoint>,
    /// Plant descriptor shown next to the cards
    pub plant: PlantProfile,
    /// Latched true on the first non-null keyed-store delivery; never reset
    pub connected: bool,
    /// True until the first history delivery (or history error) arrives
    pub loading: bool,
    /// Most recent user-visible load failure, if any
    pub load_error: Option<String>,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            sensors: SensorSnapshot::default(),
            pump_on: false,
            heater_on: false,
            light_duration: String::new(),
            soil_status: String::new(),
            vpd: String::new(),
            rpm_history: BoundedHistory::new(paths::RPM_HISTORY_LIMIT),
            lux_history: BoundedHistory::new(paths::LUX_HISTORY_LIMIT),
            soil_history: BoundedHistory::new(paths::SOIL_HISTORY_LIMIT),
            vpd_history: BoundedHistory::new(paths::VPD_HISTORY_LIMIT),
            plant: PlantProfile::default(),
            connected: false,
            loading: true,
            load_error: None,
        }
    }
}

/// One scalar subscription target: where it lives and which state field it
/// merges into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScalarField {
    Temperature,
    WindSpeed,
    AirHumidity,
    SoilMoisture,
    WaterTank,
    LightIntensity,
    Pump,
    Heater,
    LightDuration,
    SoilStatus,
    Vpd,
}

impl ScalarField {
    const ALL: [ScalarField; 11] = [
        ScalarField::Temperature,
        ScalarField::WindSpeed,
        ScalarField::AirHumidity,
        ScalarField::SoilMoisture,
        ScalarField::WaterTank,
        ScalarField::LightIntensity,
        ScalarField::Pump,
        ScalarField::Heater,
        ScalarField::LightDuration,
        ScalarField::SoilStatus,
        ScalarField::Vpd,
    ];

    fn path(self) -> &'static str {
        match self {
            ScalarField::Temperature => paths::PATH_TEMPERATURE,
            ScalarField::WindSpeed => paths::PATH_WIND_SPEED,
            ScalarField::AirHumidity => paths::PATH_AIR_HUMIDITY,
            ScalarField::SoilMoisture => paths::PATH_SOIL_MOISTURE,
            ScalarField::WaterTank => paths::PATH_WATER_TANK,
            ScalarField::LightIntensity => paths::PATH_LIGHT_INTENSITY,
            ScalarField::Pump => paths::PATH_PUMP,
            ScalarField::Heater => paths::PATH_HEATER,
            ScalarField::LightDuration => paths::PATH_LIGHT_DURATION,
            ScalarField::SoilStatus => paths::PATH_SOIL_STATUS,
            ScalarField::Vpd => paths::PATH_VPD,
        }
    }

    /// Merge one delivered value into the state. Only the receiving field is
    /// touched; everything else keeps whatever the latest state holds.
    fn apply(self, state: &mut DashboardState, value: &Value) {
        match self {
            ScalarField::Temperature => state.sensors.temperature = decode::coerce_f64(value),
            ScalarField::WindSpeed => state.sensors.wind_speed = decode::coerce_f64(value),
            ScalarField::AirHumidity => state.sensors.air_humidity = decode::coerce_f64(value),
            ScalarField::SoilMoisture => state.sensors.soil_moisture = decode::coerce_f64(value),
            ScalarField::WaterTank => state.sensors.water_tank_level = decode::coerce_f64(value),
            ScalarField::LightIntensity => {
                state.sensors.light_intensity = decode::coerce_i64(value)
            }
            ScalarField::Pump => state.pump_on = decode::coerce_bool(value),
            ScalarField::Heater => state.heater_on = decode::coerce_bool(value),
            ScalarField::LightDuration => state.light_duration = decode::coerce_string(value),
            ScalarField::SoilStatus => state.soil_status = decode::coerce_string(value),
            ScalarField::Vpd => state.vpd = decode::coerce_string(value),
        }
    }
}

/// One ordered-query subscription target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HistoryStream {
    Rpm,
    Lux,
    SoilMoisture,
    Vpd,
}

impl HistoryStream {
    const ALL: [HistoryStream; 4] = [
        HistoryStream::Rpm,
        HistoryStream::Lux,
        HistoryStream::SoilMoisture,
        HistoryStream::Vpd,
    ];

    fn collection(self) -> &'static str {
        match self {
            HistoryStream::Rpm => paths::RPM_COLLECTION,
            HistoryStream::Lux => paths::LUX_COLLECTION,
            HistoryStream::SoilMoisture => paths::SOIL_COLLECTION,
            HistoryStream::Vpd => paths::VPD_COLLECTION,
        }
    }

    fn limit(self) -> usize {
        match self {
            HistoryStream::Rpm => paths::RPM_HISTORY_LIMIT,
            HistoryStream::Lux => paths::LUX_HISTORY_LIMIT,
            HistoryStream::SoilMoisture => paths::SOIL_HISTORY_LIMIT,
            HistoryStream::Vpd => paths::VPD_HISTORY_LIMIT,
        }
    }

    fn error_message(self) -> &'static str {
        match self {
            HistoryStream::Rpm => "Failed to load fan RPM history",
            HistoryStream::Lux => "Failed to load light intensity history",
            HistoryStream::SoilMoisture => "Failed to load soil moisture history",
            HistoryStream::Vpd => "Failed to load VPD history",
        }
    }

    /// Decode a delivered page and, when at least one document survives,
    /// replace the matching history. Returns whether a replacement happened.
    fn apply_page(self, state: &mut DashboardState, page: &[Value]) -> bool {
        match self {
            HistoryStream::Rpm => {
                let points: Vec<RpmPoint> = page.iter().filter_map(decode::rpm_point).collect();
                state.rpm_history.replace_from_page(points)
            }
            HistoryStream::Lux => {
                let points: Vec<LuxPoint> = page.iter().filter_map(decode::lux_point).collect();
                state.lux_history.replace_from_page(points)
            }
            HistoryStream::SoilMoisture => {
                let points: Vec<SoilMoisturePoint> =
                    page.iter().filter_map(decode::soil_moisture_point).collect();
                state.soil_history.replace_from_page(points)
            }
            HistoryStream::Vpd => {
                let points: Vec<VpdPoint> = page.iter().filter_map(decode::vpd_point).collect();
                state.vpd_history.replace_from_page(points)
            }
        }
    }
}

/// State shared between the model, its subscription tasks, and the disposer.
struct Shared {
    state: RwLock<DashboardState>,
    /// Cleared on disposal; continuations check it before any state write.
    alive: AtomicBool,
}

impl Shared {
    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }
}

/// Owns the subscription tasks opened by [`LiveModel::start`].
///
/// Dispose exactly once when the dashboard scope shuts down; dropping the
/// disposer disposes as a safety net. Disposal is idempotent and safe even
/// when `start()` only partially succeeded.
pub struct Disposer {
    shared: Arc<Shared>,
    tasks: Vec<JoinHandle<()>>,
}

impl Disposer {
    /// Detach every subscription and block further state writes.
    pub fn dispose(&mut self) {
        self.shared.alive.store(false, Ordering::Release);
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}

impl Drop for Disposer {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// The live view-model. See the module docs for the update and lifecycle
/// rules.
pub struct LiveModel {
    shared: Arc<Shared>,
    keyed: Arc<dyn KeyedStore>,
    documents: Arc<dyn DocumentStore>,
    profiles: Arc<dyn ProfileSource>,
}

impl LiveModel {
    /// Build a model over explicit store handles. The handles are the only
    /// capabilities the model ever uses; there is no ambient client.
    pub fn new(
        keyed: Arc<dyn KeyedStore>,
        documents: Arc<dyn DocumentStore>,
        profiles: Arc<dyn ProfileSource>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: RwLock::new(DashboardState::default()),
                alive: AtomicBool::new(true),
            }),
            keyed,
            documents,
            profiles,
        }
    }

    /// Clone of the full current state.
    pub async fn snapshot(&self) -> DashboardState {
        self.shared.state.read().await.clone()
    }

    /// Open every subscription and kick off the initial profile fetch.
    ///
    /// Call once per model. Each acquisition is independent: a setup failure
    /// is logged, recorded in `load_error`, and the remaining subscriptions
    /// are still attempted.
    pub async fn start(&self) -> Disposer {
        let mut tasks = Vec::new();

        for field in ScalarField::ALL {
            match self.keyed.subscribe(field.path()).await {
                Ok(rx) => {
                    tasks.push(tokio::spawn(scalar_task(self.shared.clone(), field, rx)));
                }
                Err(err) => {
                    error!("subscription setup failed for {}: {err}", field.path());
                    self.record_setup_error(&err).await;
                }
            }
        }

        for stream in HistoryStream::ALL {
            match self
                .documents
                .subscribe_latest(stream.collection(), stream.limit())
                .await
            {
                Ok(rx) => {
                    tasks.push(tokio::spawn(history_task(self.shared.clone(), stream, rx)));
                }
                Err(err) => {
                    error!(
                        "history subscription setup failed for {}: {err}",
                        stream.collection()
                    );
                    let mut state = self.shared.state.write().await;
                    state.load_error = Some(stream.error_message().to_string());
                    state.loading = false;
                }
            }
        }

        tasks.push(tokio::spawn(fetch_profile(
            self.shared.clone(),
            self.profiles.clone(),
        )));

        Disposer {
            shared: self.shared.clone(),
            tasks,
        }
    }

    /// Re-fetch the static plant profile. On failure the previous profile
    /// stays in place.
    pub async fn refresh_plant_profile(&self) {
        fetch_profile(self.shared.clone(), self.profiles.clone()).await;
    }

    async fn record_setup_error(&self, err: &StoreError) {
        let mut state = self.shared.state.write().await;
        state.load_error = Some(format!("Failed to open realtime subscription: {err}"));
    }
}

/// Delivery loop for one keyed-store scalar.
async fn scalar_task(shared: Arc<Shared>, field: ScalarField, mut rx: mpsc::Receiver<ScalarDelivery>) {
    while let Some(delivery) = rx.recv().await {
        match delivery {
            Ok(Some(value)) => {
                if !shared.is_alive() {
                    break;
                }
                let mut state = shared.state.write().await;
                field.apply(&mut state, &value);
                state.connected = true;
                debug!("scalar update applied: {}", field.path());
            }
            // An empty path carries no data; keep whatever is shown.
            Ok(None) => {}
            Err(err) => {
                warn!("scalar delivery error on {}: {err}", field.path());
            }
        }
    }
}

/// Delivery loop for one ordered-query history stream.
async fn history_task(shared: Arc<Shared>, stream: HistoryStream, mut rx: mpsc::Receiver<PageDelivery>) {
    while let Some(delivery) = rx.recv().await {
        if !shared.is_alive() {
            break;
        }
        match delivery {
            Ok(page) => {
                let mut state = shared.state.write().await;
                if stream.apply_page(&mut state, &page) {
                    debug!(
                        "history replaced: {} ({} documents)",
                        stream.collection(),
                        page.len()
                    );
                    state.load_error = None;
                }
                state.loading = false;
            }
            Err(err) => {
                error!("history delivery error on {}: {err}", stream.collection());
                let mut state = shared.state.write().await;
                state.load_error = Some(stream.error_message().to_string());
                state.loading = false;
            }
        }
    }
}

/// One-shot profile fetch, shared by `start()` and explicit refreshes.
async fn fetch_profile(shared: Arc<Shared>, source: Arc<dyn ProfileSource>) {
    match source.plant_profile().await {
        Ok(profile) => {
            if !shared.is_alive() {
                return;
            }
            shared.state.write().await.plant = profile;
        }
        // Keep the previous profile; stale beats blank.
        Err(err) => error!("plant profile fetch failed: {err}"),
    }
}
