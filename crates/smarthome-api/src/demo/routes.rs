// Demo route table
//
// Paths are matched segment by segment. Collection names that live under
// `/devices` are reserved and never resolve to a device id.

/// Collection names under `/devices` that are not device ids.
const RESERVED: &[&str] = &["lock-history", "sensor-history", "available-devices"];

/// A demo endpoint, with the path parameters it captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route<'a> {
    Devices,
    Device(&'a str),
    TemperatureHistory(&'a str),
    HumidityHistory(&'a str),
    AllLockHistory,
    LockHistory(&'a str),
    Command(&'a str),
    Health,
    CurrentUser,
    DashboardStats,
    Notifications,
    Notification(&'a str),
    NotificationRead(&'a str),
    Unhandled,
}

impl<'a> Route<'a> {
    /// Resolve a request path (query string tolerated) to a route.
    pub fn resolve(path: &'a str) -> Self {
        let path = path.split_once('?').map_or(path, |(p, _)| p);
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match *segments.as_slice() {
            ["devices"] => Self::Devices,
            ["devices", "lock-history"] => Self::AllLockHistory,
            ["devices", id] if !is_reserved(id) => Self::Device(id),
            ["devices", id, "temperature-history"] if !is_reserved(id) => {
                Self::TemperatureHistory(id)
            }
            ["devices", id, "humidity-history"] if !is_reserved(id) => Self::HumidityHistory(id),
            ["devices", id, "lock-history"] if !is_reserved(id) => Self::LockHistory(id),
            ["devices", id, "command"] if !is_reserved(id) => Self::Command(id),
            [.., "health"] => Self::Health,
            ["users", "me"] => Self::CurrentUser,
            ["stats", "dashboard"] => Self::DashboardStats,
            ["notifications"] => Self::Notifications,
            ["notifications", id] => Self::Notification(id),
            ["notifications", id, "read"] => Self::NotificationRead(id),
            _ => Self::Unhandled,
        }
    }
}

fn is_reserved(segment: &str) -> bool {
    RESERVED.contains(&segment)
}
