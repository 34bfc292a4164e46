// Statistics endpoints
//
// Two families: `/stats/*` (energy, device activity, dashboard) and
// `/statistics/*` (consumption, usage).

use serde_json::Value;

use super::SmartHome;
use crate::error::Error;
use crate::models::DashboardStats;
use crate::request::ApiRequest;

impl SmartHome {
    /// `GET /stats/energy/{period}`
    pub async fn energy_consumption(&self, period: &str) -> Result<Value, Error> {
        self.get_value(format!("/stats/energy/{period}")).await
    }

    /// Device activity over time; `params` are forwarded as query pairs.
    ///
    /// `GET /stats/device-history`
    pub async fn device_activity(&self, params: &[(&str, &str)]) -> Result<Value, Error> {
        let request = params
            .iter()
            .fold(ApiRequest::get("/stats/device-history"), |req, (k, v)| {
                req.with_query(*k, *v)
            });
        self.dispatcher.request(request).await
    }

    /// Counters and the recent activity feed shown on the dashboard.
    ///
    /// `GET /stats/dashboard`
    pub async fn dashboard_stats(&self) -> Result<DashboardStats, Error> {
        self.get("/stats/dashboard").await
    }

    /// `GET /statistics/consumption?period=`
    pub async fn consumption_stats(&self, period: &str) -> Result<Value, Error> {
        let request = ApiRequest::get("/statistics/consumption").with_query("period", period);
        self.dispatcher.request(request).await
    }

    /// `GET /statistics/devices/usage`
    pub async fn device_usage_stats(&self) -> Result<Value, Error> {
        self.get_value("/statistics/devices/usage").await
    }
}
