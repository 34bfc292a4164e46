// Scenario endpoints
//
// Scenarios have no fixed schema on the client side and travel as raw JSON.

use serde_json::Value;
use tracing::debug;

use super::SmartHome;
use crate::error::Error;

impl SmartHome {
    /// `GET /scenarios`
    pub async fn scenarios(&self) -> Result<Value, Error> {
        self.get_value("/scenarios").await
    }

    /// `GET /scenarios/{id}`
    pub async fn scenario(&self, id: &str) -> Result<Value, Error> {
        self.get_value(format!("/scenarios/{id}")).await
    }

    /// `POST /scenarios`
    pub async fn create_scenario(&self, scenario: Value) -> Result<Value, Error> {
        self.post_value("/scenarios", Some(scenario)).await
    }

    /// `PUT /scenarios/{id}`
    pub async fn update_scenario(&self, id: &str, scenario: Value) -> Result<Value, Error> {
        self.put_value(format!("/scenarios/{id}"), Some(scenario))
            .await
    }

    /// `DELETE /scenarios/{id}`
    pub async fn delete_scenario(&self, id: &str) -> Result<Value, Error> {
        self.delete_value(format!("/scenarios/{id}")).await
    }

    /// Trigger a scenario now.
    ///
    /// `POST /scenarios/{id}/run`
    pub async fn run_scenario(&self, id: &str) -> Result<Value, Error> {
        debug!(id, "running scenario");
        self.post_value(format!("/scenarios/{id}/run"), None).await
    }
}
