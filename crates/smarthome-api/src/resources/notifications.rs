// Notification endpoints

use serde_json::Value;

use super::SmartHome;
use crate::error::Error;
use crate::models::{Notification, NotificationFilter};
use crate::request::ApiRequest;

impl SmartHome {
    /// List notifications, filtered by read state.
    ///
    /// `GET /notifications?status={all|read|unread}`
    pub async fn notifications(
        &self,
        filter: NotificationFilter,
    ) -> Result<Vec<Notification>, Error> {
        let request = ApiRequest::get("/notifications").with_query("status", filter.as_str());
        self.dispatcher.request_as(request).await
    }

    /// `PUT /notifications/{id}/read`
    pub async fn mark_notification_read(&self, id: &str) -> Result<Value, Error> {
        self.put_value(format!("/notifications/{id}/read"), None)
            .await
    }

    /// `DELETE /notifications/{id}`
    pub async fn delete_notification(&self, id: &str) -> Result<Value, Error> {
        self.delete_value(format!("/notifications/{id}")).await
    }
}
