// In-memory demo repository
//
// Holds the session-scoped fixtures and answers requests routed through
// `Route`. Mutations (commands, created devices, read notifications)
// persist for the lifetime of the repository.

use chrono::{Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use reqwest::Method;
use serde::Serialize;
use serde_json::{Map, Value, json};
use tracing::debug;

use super::fixtures::{self, random_id};
use super::routes::Route;
use crate::models::{
    DashboardEvent, DashboardStats, Device, DeviceCommand, LockEvent, Notification,
    NotificationFilter, TelemetryPoint, scalar_text,
};
use crate::request::ApiRequest;

/// Samples in a history series.
pub const HISTORY_POINTS: u32 = 24;
/// Samples in a history series requested with `interval=hour`.
pub const HOURLY_POINTS: u32 = 12;

const UNHANDLED_MESSAGE: &str = "request cannot be handled in demo mode";

fn to_json<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or_default()
}

fn failure(message: impl Into<String>) -> Value {
    json!({ "success": false, "message": message.into() })
}

/// Fixture store behind demo mode.
pub struct DemoRepository {
    devices: Vec<Device>,
    lock_events: Vec<LockEvent>,
    notifications: Vec<Notification>,
    user: Value,
    rng: StdRng,
}

impl Default for DemoRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DemoRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DemoRepository")
            .field("devices", &self.devices.len())
            .field("lock_events", &self.lock_events.len())
            .field("notifications", &self.notifications.len())
            .finish_non_exhaustive()
    }
}

impl DemoRepository {
    /// Fresh fixtures with an entropy-seeded generator.
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_rng(&mut rand::rng()))
    }

    /// Fresh fixtures with a deterministic generator.
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(mut rng: StdRng) -> Self {
        let now = Utc::now();
        Self {
            devices: fixtures::devices(now),
            lock_events: fixtures::lock_events(now, &mut rng),
            notifications: fixtures::notifications(now, &mut rng),
            user: fixtures::user(now),
            rng,
        }
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn device(&self, id: &str) -> Option<&Device> {
        self.devices.iter().find(|d| d.id == id)
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    /// Answer one request. Never fails: anything without a route gets a
    /// `{success: false}` payload.
    pub fn handle(&mut self, request: &ApiRequest) -> Value {
        let route = Route::resolve(&request.path);
        debug!(method = %request.method, path = %request.path, ?route, "demo request");

        let method = &request.method;
        let body = request.body.as_ref();

        match route {
            Route::Devices if *method == Method::POST => self.create_device(body),
            Route::Devices => to_json(&self.devices),
            Route::Device(id) if *method == Method::PUT => self.update_device(id, body),
            Route::Device(id) if *method == Method::DELETE => self.delete_device(id),
            Route::Device(id) => self.device(id).map_or(Value::Null, to_json),
            Route::TemperatureHistory(id) => {
                let series = self.temperature_history(id, history_len(request));
                to_json(&series)
            }
            Route::HumidityHistory(id) => {
                let series = self.humidity_history(id, history_len(request));
                to_json(&series)
            }
            Route::AllLockHistory => to_json(&self.lock_events),
            Route::LockHistory(id) if *method == Method::POST => self.append_lock_event(id, body),
            Route::LockHistory(id) => {
                let events: Vec<&LockEvent> = self
                    .lock_events
                    .iter()
                    .filter(|e| e.device_id == id)
                    .collect();
                to_json(&events)
            }
            Route::Command(id) => self.execute_command(id, body),
            Route::Health => json!({ "status": "ok", "timestamp": Utc::now().to_rfc3339() }),
            Route::CurrentUser if *method == Method::PUT => self.update_user(body),
            Route::CurrentUser => self.user.clone(),
            Route::DashboardStats => {
                let stats = self.dashboard_stats();
                to_json(&stats)
            }
            Route::Notifications => {
                let filter = request
                    .query_value("status")
                    .map(NotificationFilter::parse)
                    .unwrap_or_default();
                let matching: Vec<&Notification> = self
                    .notifications
                    .iter()
                    .filter(|n| filter.matches(n))
                    .collect();
                to_json(&matching)
            }
            Route::Notification(id) if *method == Method::DELETE => self.delete_notification(id),
            Route::Notification(id) => self
                .notifications
                .iter()
                .find(|n| n.id == id)
                .map_or(Value::Null, to_json),
            Route::NotificationRead(id) => self.mark_notification_read(id),
            Route::Unhandled => failure(UNHANDLED_MESSAGE),
        }
    }

    // ── History ──────────────────────────────────────────────────────

    /// Hourly samples ending now, oldest first. Baseline 20..=25 °C with
    /// up to ±2.0 jitter at one decimal.
    pub fn temperature_history(&mut self, device_id: &str, count: u32) -> Vec<TelemetryPoint> {
        let base: i32 = self.rng.random_range(20..=25);
        self.series(device_id, count, |rng| {
            f64::from(base * 10 + rng.random_range(-20..=20)) / 10.0
        })
    }

    /// Hourly samples ending now, oldest first. Baseline 45..=60 % with
    /// up to ±10 jitter.
    pub fn humidity_history(&mut self, device_id: &str, count: u32) -> Vec<TelemetryPoint> {
        let base: i32 = self.rng.random_range(45..=60);
        self.series(device_id, count, |rng| {
            f64::from(base + rng.random_range(-10..=10))
        })
    }

    fn series(
        &mut self,
        device_id: &str,
        count: u32,
        mut sample: impl FnMut(&mut StdRng) -> f64,
    ) -> Vec<TelemetryPoint> {
        let now = Utc::now();
        (0..count)
            .rev()
            .map(|hours_ago| TelemetryPoint {
                id: random_id(&mut self.rng),
                device_id: device_id.to_owned(),
                timestamp: now - Duration::hours(i64::from(hours_ago)),
                value: sample(&mut self.rng),
            })
            .collect()
    }

    // ── Devices ──────────────────────────────────────────────────────

    fn next_device_id(&self) -> String {
        let highest = self
            .devices
            .iter()
            .filter_map(|d| d.id.strip_prefix("device-")?.parse::<u32>().ok())
            .max()
            .unwrap_or(0);
        format!("device-{:03}", highest + 1)
    }

    fn create_device(&mut self, body: Option<&Value>) -> Value {
        let Some(Value::Object(mut fields)) = body.cloned() else {
            return failure("device payload must be a JSON object");
        };
        fields.insert("id".into(), Value::String(self.next_device_id()));
        fields.entry("online").or_insert(Value::Bool(true));
        fields.entry("active").or_insert(Value::Bool(false));
        fields.entry("canControl").or_insert(Value::Bool(true));
        fields.insert("lastUpdated".into(), Value::String(Utc::now().to_rfc3339()));

        match serde_json::from_value::<Device>(Value::Object(fields)) {
            Ok(device) => {
                let created = to_json(&device);
                self.devices.push(device);
                created
            }
            Err(e) => failure(format!("invalid device payload: {e}")),
        }
    }

    fn update_device(&mut self, id: &str, body: Option<&Value>) -> Value {
        let Some(slot) = self.devices.iter_mut().find(|d| d.id == id) else {
            return Value::Null;
        };
        let Some(Value::Object(changes)) = body else {
            return failure("device payload must be a JSON object");
        };

        let mut merged = match to_json(&*slot) {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        for (key, value) in changes {
            if key == "id" {
                continue;
            }
            if key == "properties" {
                if let (Some(Value::Object(existing)), Value::Object(incoming)) =
                    (merged.get_mut("properties"), value)
                {
                    existing.extend(incoming.clone());
                    continue;
                }
            }
            merged.insert(key.clone(), value.clone());
        }
        merged.insert("lastUpdated".into(), Value::String(Utc::now().to_rfc3339()));

        match serde_json::from_value::<Device>(Value::Object(merged)) {
            Ok(device) => {
                *slot = device;
                to_json(&*slot)
            }
            Err(e) => failure(format!("invalid device payload: {e}")),
        }
    }

    fn delete_device(&mut self, id: &str) -> Value {
        let before = self.devices.len();
        self.devices.retain(|d| d.id != id);
        if self.devices.len() < before {
            json!({ "success": true })
        } else {
            failure(format!("device {id} not found"))
        }
    }

    /// Run a device command. `setState` merges its parameters into the
    /// device properties and refreshes the derived fields.
    fn execute_command(&mut self, id: &str, body: Option<&Value>) -> Value {
        let Some(device) = self.devices.iter_mut().find(|d| d.id == id) else {
            return failure(format!("device {id} not found"));
        };
        let command = body.and_then(|b| serde_json::from_value::<DeviceCommand>(b.clone()).ok());

        match command {
            Some(cmd) if cmd.command == DeviceCommand::SET_STATE => {
                if let Some(parameters) = cmd.parameters {
                    apply_state(device, parameters);
                }
                device.last_updated = Some(Utc::now());
                json!({ "success": true, "device": to_json(&*device) })
            }
            _ => json!({ "success": true, "message": "command executed" }),
        }
    }

    // ── Lock history ─────────────────────────────────────────────────

    fn append_lock_event(&mut self, device_id: &str, body: Option<&Value>) -> Value {
        let text = |key: &str| {
            body.and_then(|b| b.get(key))
                .and_then(Value::as_str)
                .map(str::to_owned)
        };
        let event = LockEvent {
            id: random_id(&mut self.rng),
            device_id: device_id.to_owned(),
            timestamp: Utc::now(),
            action: text("action").unwrap_or_else(|| "lock".to_owned()),
            user: text("user"),
            method: text("method"),
        };
        let created = to_json(&event);
        self.lock_events.push(event);
        created
    }

    // ── User ─────────────────────────────────────────────────────────

    fn update_user(&mut self, body: Option<&Value>) -> Value {
        if let (Value::Object(user), Some(Value::Object(changes))) = (&mut self.user, body) {
            for (key, value) in changes {
                if key != "id" {
                    user.insert(key.clone(), value.clone());
                }
            }
        }
        self.user.clone()
    }

    // ── Stats ────────────────────────────────────────────────────────

    pub fn dashboard_stats(&mut self) -> DashboardStats {
        let now = Utc::now();
        let recent_events = fixtures::RECENT_EVENTS
            .iter()
            .map(|(hours_ago, kind, message)| DashboardEvent {
                id: random_id(&mut self.rng),
                timestamp: now - Duration::hours(*hours_ago),
                kind: (*kind).to_owned(),
                message: (*message).to_owned(),
            })
            .collect();

        DashboardStats {
            device_count: self.devices.len(),
            active_device_count: self.devices.iter().filter(|d| d.active).count(),
            offline_device_count: self.devices.iter().filter(|d| !d.online).count(),
            recent_events,
        }
    }

    // ── Notifications ────────────────────────────────────────────────

    fn mark_notification_read(&mut self, id: &str) -> Value {
        match self.notifications.iter_mut().find(|n| n.id == id) {
            Some(notification) => {
                notification.is_read = true;
                to_json(&*notification)
            }
            None => failure(format!("notification {id} not found")),
        }
    }

    fn delete_notification(&mut self, id: &str) -> Value {
        let before = self.notifications.len();
        self.notifications.retain(|n| n.id != id);
        if self.notifications.len() < before {
            json!({ "success": true })
        } else {
            failure(format!("notification {id} not found"))
        }
    }
}

fn history_len(request: &ApiRequest) -> u32 {
    if request.query_value("interval") == Some("hour") {
        HOURLY_POINTS
    } else {
        HISTORY_POINTS
    }
}

fn apply_state(device: &mut Device, parameters: Map<String, Value>) {
    let power = parameters.get("tb_power").and_then(scalar_text);
    let brightness = parameters
        .get("tb_brightness")
        .and_then(scalar_text)
        .and_then(|raw| parse_percent(&raw));
    let color = parameters.get("tb_color").and_then(scalar_text);

    device.properties.extend(parameters);

    if let Some(power) = power {
        device.active = power == "on";
    }
    if let Some(brightness) = brightness {
        device.brightness = Some(brightness);
    }
    if let Some(color) = color {
        device.color = Some(format!("#{color}"));
    }
}

/// Leading integer part of `raw`, capped at 100.
fn parse_percent(raw: &str) -> Option<u8> {
    let digits = raw.trim().split('.').next()?;
    let value: u32 = digits.parse().ok()?;
    u8::try_from(value.min(100)).ok()
}
