// Device endpoints
//
// CRUD, commands, ThingsBoard sync, and the per-device history feeds
// (temperature, humidity, lock events, sensor alerts).

use chrono::Utc;
use rand::Rng;
use serde_json::{Value, json};
use tracing::debug;

use super::SmartHome;
use crate::error::Error;
use crate::models::{
    CommandOutcome, DEVICE_UNIQUE_ID, Device, DeviceCommand, DeviceDraft, Interval, LockEvent,
    TelemetryPoint,
};
use crate::request::ApiRequest;

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

fn base36(mut n: u64) -> String {
    if n == 0 {
        return "0".to_owned();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(char::from(BASE36[usize::try_from(n % 36).unwrap_or_default()]));
        n /= 36;
    }
    digits.iter().rev().collect()
}

/// `device_` + base36 millisecond timestamp + 5 random base36 characters.
pub(crate) fn unique_device_token(timestamp_ms: u64, rng: &mut impl Rng) -> String {
    let suffix: String = (0..5)
        .map(|_| char::from(BASE36[rng.random_range(0..BASE36.len())]))
        .collect();
    format!("device_{}{suffix}", base36(timestamp_ms))
}

fn require(field: &'static str, value: Option<&str>, reason: &str) -> Result<(), Error> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(()),
        _ => Err(Error::Validation {
            field,
            reason: reason.to_owned(),
        }),
    }
}

impl SmartHome {
    /// List all devices.
    ///
    /// `GET /devices`
    pub async fn devices(&self) -> Result<Vec<Device>, Error> {
        self.get("/devices").await
    }

    /// Get a device by id. `None` when the backend answers `null`.
    ///
    /// `GET /devices/{id}`
    pub async fn device(&self, id: &str) -> Result<Option<Device>, Error> {
        self.get(format!("/devices/{id}")).await
    }

    /// Create a device.
    ///
    /// `name` and `type` must be present and non-blank; nothing is sent
    /// otherwise. A `device_unique_id` property is generated when the draft
    /// does not carry one. HTTP 409 maps to [`Error::DeviceExists`].
    ///
    /// `POST /devices`
    pub async fn create_device(&self, mut draft: DeviceDraft) -> Result<Device, Error> {
        require("name", draft.name.as_deref(), "device name must not be empty")?;
        require("type", draft.device_type.as_deref(), "device type must be specified")?;

        let properties = draft.properties.get_or_insert_with(Default::default);
        if !properties.contains_key(DEVICE_UNIQUE_ID) {
            let now_ms = u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default();
            let token = unique_device_token(now_ms, &mut rand::rng());
            properties.insert(DEVICE_UNIQUE_ID.to_owned(), Value::String(token));
        }

        let name = draft.name.clone().unwrap_or_default();
        debug!(%name, "creating device");
        let body = json!(draft);

        self.dispatcher
            .request_as(ApiRequest::post("/devices").with_body(body))
            .await
            .map_err(|e| match e.status() {
                Some(409) => Error::DeviceExists { name },
                _ => e,
            })
    }

    /// Update device fields.
    ///
    /// `PUT /devices/{id}`
    pub async fn update_device(&self, id: &str, changes: &DeviceDraft) -> Result<Value, Error> {
        self.put_value(format!("/devices/{id}"), Some(json!(changes)))
            .await
    }

    /// `DELETE /devices/{id}`
    pub async fn delete_device(&self, id: &str) -> Result<Value, Error> {
        self.delete_value(format!("/devices/{id}")).await
    }

    /// Send a command. A `success: false` outcome is returned as `Ok`.
    ///
    /// `POST /devices/{id}/command`
    pub async fn send_command(
        &self,
        id: &str,
        command: &DeviceCommand,
    ) -> Result<CommandOutcome, Error> {
        debug!(id, command = %command.command, "sending device command");
        let body = json!(command);
        self.dispatcher
            .request_as(ApiRequest::post(format!("/devices/{id}/command")).with_body(body))
            .await
    }

    /// `GET /devices/{id}/status`
    pub async fn device_status(&self, id: &str) -> Result<Value, Error> {
        self.get_value(format!("/devices/{id}/status")).await
    }

    /// Devices the backend can see but that are not registered yet.
    ///
    /// `GET /devices/available-devices`
    pub async fn available_devices(&self) -> Result<Value, Error> {
        self.get_value("/devices/available-devices").await
    }

    /// `POST /devices/{id}/sync-thingsboard`
    pub async fn sync_thingsboard(&self, id: &str) -> Result<Value, Error> {
        self.post_value(format!("/devices/{id}/sync-thingsboard"), None)
            .await
    }

    // ── Telemetry history ────────────────────────────────────────────

    /// `GET /devices/{id}/temperature-history?interval=`
    pub async fn temperature_history(
        &self,
        id: &str,
        interval: Interval,
    ) -> Result<Vec<TelemetryPoint>, Error> {
        let request = ApiRequest::get(format!("/devices/{id}/temperature-history"))
            .with_query("interval", interval.as_str());
        self.dispatcher.request_as(request).await
    }

    /// `GET /devices/{id}/humidity-history?interval=`
    pub async fn humidity_history(
        &self,
        id: &str,
        interval: Interval,
    ) -> Result<Vec<TelemetryPoint>, Error> {
        let request = ApiRequest::get(format!("/devices/{id}/humidity-history"))
            .with_query("interval", interval.as_str());
        self.dispatcher.request_as(request).await
    }

    // ── Lock history ─────────────────────────────────────────────────

    /// `GET /devices/{id}/lock-history`
    pub async fn lock_history(&self, id: &str) -> Result<Vec<LockEvent>, Error> {
        self.get(format!("/devices/{id}/lock-history")).await
    }

    /// Lock events of every lock.
    ///
    /// `GET /devices/lock-history`
    pub async fn all_lock_history(&self) -> Result<Vec<LockEvent>, Error> {
        self.get("/devices/lock-history").await
    }

    /// `POST /devices/{id}/lock-history`
    pub async fn add_lock_history_entry(&self, id: &str, entry: Value) -> Result<Value, Error> {
        self.post_value(format!("/devices/{id}/lock-history"), Some(entry))
            .await
    }

    // ── Sensor alert history ─────────────────────────────────────────

    /// `GET /devices/{id}/sensor-history`
    pub async fn sensor_history(&self, id: &str) -> Result<Value, Error> {
        self.get_value(format!("/devices/{id}/sensor-history")).await
    }

    /// `GET /devices/sensor-history`
    pub async fn all_sensor_history(&self) -> Result<Value, Error> {
        self.get_value("/devices/sensor-history").await
    }

    /// `POST /devices/{id}/sensor-history`
    pub async fn add_sensor_history_entry(&self, id: &str, entry: Value) -> Result<Value, Error> {
        self.post_value(format!("/devices/{id}/sensor-history"), Some(entry))
            .await
    }

    /// `PUT /devices/sensor-history/{entry_id}/acknowledge`
    pub async fn acknowledge_sensor_entry(&self, entry_id: &str) -> Result<Value, Error> {
        self.put_value(
            format!("/devices/sensor-history/{entry_id}/acknowledge"),
            None,
        )
        .await
    }

    /// `POST /devices/sensor-history/acknowledge-all`
    pub async fn acknowledge_all_sensor_history(&self) -> Result<Value, Error> {
        self.post_value("/devices/sensor-history/acknowledge-all", None)
            .await
    }

    /// `POST /devices/{id}/sensor-history/acknowledge-all`
    pub async fn acknowledge_device_sensor_history(&self, id: &str) -> Result<Value, Error> {
        self.post_value(format!("/devices/{id}/sensor-history/acknowledge-all"), None)
            .await
    }
}
