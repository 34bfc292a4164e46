// Location and room endpoints

use serde_json::Value;

use super::SmartHome;
use crate::error::Error;

impl SmartHome {
    /// `GET /locations`
    pub async fn locations(&self) -> Result<Value, Error> {
        self.get_value("/locations").await
    }

    /// `GET /locations/{id}`
    pub async fn location(&self, id: &str) -> Result<Value, Error> {
        self.get_value(format!("/locations/{id}")).await
    }

    /// `POST /locations`
    pub async fn create_location(&self, location: Value) -> Result<Value, Error> {
        self.post_value("/locations", Some(location)).await
    }

    /// `PUT /locations/{id}`
    pub async fn update_location(&self, id: &str, location: Value) -> Result<Value, Error> {
        self.put_value(format!("/locations/{id}"), Some(location))
            .await
    }

    /// `DELETE /locations/{id}`
    pub async fn delete_location(&self, id: &str) -> Result<Value, Error> {
        self.delete_value(format!("/locations/{id}")).await
    }

    // ── Rooms ────────────────────────────────────────────────────────

    /// `GET /locations/{location_id}/rooms`
    pub async fn rooms(&self, location_id: &str) -> Result<Value, Error> {
        self.get_value(format!("/locations/{location_id}/rooms"))
            .await
    }

    /// `POST /locations/{location_id}/rooms`
    pub async fn create_room(&self, location_id: &str, room: Value) -> Result<Value, Error> {
        self.post_value(format!("/locations/{location_id}/rooms"), Some(room))
            .await
    }

    /// `PUT /locations/{location_id}/rooms/{room_id}`
    pub async fn update_room(
        &self,
        location_id: &str,
        room_id: &str,
        room: Value,
    ) -> Result<Value, Error> {
        self.put_value(
            format!("/locations/{location_id}/rooms/{room_id}"),
            Some(room),
        )
        .await
    }

    /// `DELETE /locations/{location_id}/rooms/{room_id}`
    pub async fn delete_room(&self, location_id: &str, room_id: &str) -> Result<Value, Error> {
        self.delete_value(format!("/locations/{location_id}/rooms/{room_id}"))
            .await
    }
}
