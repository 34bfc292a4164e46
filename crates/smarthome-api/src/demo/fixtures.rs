// Seed data for demo mode.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde_json::{Value, json};

use crate::models::{Device, LockEvent, Notification, Properties};

/// Random v4 UUID drawn from the repository's generator, so seeded
/// repositories produce stable ids.
pub(crate) fn random_id(rng: &mut impl Rng) -> String {
    uuid::Builder::from_random_bytes(rng.random())
        .into_uuid()
        .to_string()
}

fn props(pairs: &[(&str, &str)]) -> Properties {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), Value::String((*v).to_owned())))
        .collect()
}

#[allow(clippy::too_many_arguments)]
fn device(
    id: &str,
    name: &str,
    device_type: &str,
    category: &str,
    sub_type: &str,
    room: &str,
    active: bool,
    can_control: bool,
    properties: Properties,
    now: DateTime<Utc>,
) -> Device {
    Device {
        id: id.to_owned(),
        name: name.to_owned(),
        device_type: device_type.to_owned(),
        category: Some(category.to_owned()),
        sub_type: Some(sub_type.to_owned()),
        room: Some(room.to_owned()),
        online: true,
        active,
        can_control,
        brightness: None,
        color: None,
        properties,
        last_updated: Some(now),
    }
}

pub(crate) fn devices(now: DateTime<Utc>) -> Vec<Device> {
    let stamp = now.to_rfc3339();

    let mut lamp = device(
        "device-001",
        "Smart Lamp - Living Room",
        "light",
        "LIGHTING",
        "SMART_BULB",
        "Living Room",
        true,
        true,
        props(&[
            ("attr_server_active", "true"),
            ("tb_color", "FFFFFF"),
            ("tb_brightness", "80"),
            ("tb_power", "on"),
        ]),
        now,
    );
    lamp.brightness = Some(80);
    lamp.color = Some("#FFFFFF".to_owned());

    vec![
        lamp,
        device(
            "device-002",
            "Temperature Sensor - Bedroom",
            "thermostat",
            "CLIMATE",
            "TEMPERATURE_SENSOR",
            "Bedroom",
            true,
            false,
            props(&[
                ("tb_temperature", "22.5"),
                ("tb_battery", "87"),
                ("tb_last_updated", &stamp),
            ]),
            now,
        ),
        device(
            "device-003",
            "Humidity Sensor - Bedroom",
            "humidity",
            "CLIMATE",
            "HUMIDITY_SENSOR",
            "Bedroom",
            true,
            false,
            props(&[
                ("tb_humidity", "52"),
                ("tb_battery", "91"),
                ("tb_last_updated", &stamp),
            ]),
            now,
        ),
        device(
            "device-004",
            "Smart Lock - Front Door",
            "lock",
            "SECURITY",
            "SMART_LOCK",
            "Hallway",
            true,
            true,
            props(&[
                ("tb_locked", "true"),
                ("tb_battery", "78"),
                ("tb_last_updated", &stamp),
            ]),
            now,
        ),
        device(
            "device-005",
            "TV - Living Room",
            "tv",
            "APPLIANCES",
            "TV",
            "Living Room",
            false,
            true,
            props(&[
                ("tb_power", "off"),
                ("tb_volume", "30"),
                ("tb_channel", "1"),
                ("tb_input_source", "hdmi1"),
                ("attr_server_active", "false"),
            ]),
            now,
        ),
    ]
}

pub(crate) fn lock_events(now: DateTime<Utc>, rng: &mut impl Rng) -> Vec<LockEvent> {
    [
        (Duration::hours(2), "unlock", "Alex", "app"),
        (Duration::hours(1), "lock", "Alex", "app"),
        (Duration::minutes(30), "unlock", "Anna", "key"),
        (Duration::minutes(25), "lock", "Anna", "key"),
    ]
    .into_iter()
    .map(|(ago, action, user, method)| LockEvent {
        id: random_id(rng),
        device_id: "device-004".to_owned(),
        timestamp: now - ago,
        action: action.to_owned(),
        user: Some(user.to_owned()),
        method: Some(method.to_owned()),
    })
    .collect()
}

pub(crate) fn notifications(now: DateTime<Utc>, rng: &mut impl Rng) -> Vec<Notification> {
    [
        (
            1,
            "Attention!",
            "Activity detected in zone \"Front Door\"",
            "security",
            false,
        ),
        (
            3,
            "Temperature change",
            "Bedroom temperature dropped below the comfort level",
            "climate",
            true,
        ),
        (
            5,
            "Alert",
            "Device \"TV - Living Room\" was switched off",
            "device",
            true,
        ),
    ]
    .into_iter()
    .map(|(hours_ago, title, message, kind, is_read)| Notification {
        id: random_id(rng),
        timestamp: now - Duration::hours(hours_ago),
        title: title.to_owned(),
        message: message.to_owned(),
        kind: kind.to_owned(),
        is_read,
    })
    .collect()
}

pub(crate) fn user(now: DateTime<Utc>) -> Value {
    json!({
        "id": "user-001",
        "name": "Demo User",
        "email": "demo@smarthouse.io",
        "role": "admin",
        "lastLogin": now.to_rfc3339(),
    })
}

/// Canned entries for the dashboard's recent activity feed.
pub(crate) const RECENT_EVENTS: &[(i64, &str, &str)] = &[
    (
        1,
        "device_status",
        "Status of \"Smart Lamp - Living Room\" changed",
    ),
    (2, "security", "Door \"Front Door\" was opened"),
    (3, "climate", "Bedroom temperature fell below 21°C"),
];
