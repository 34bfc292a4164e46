// User and session endpoints
//
// Login stores the bearer token together with the returned user payload;
// logout drops both without contacting the backend.

use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};
use tracing::{debug, info};

use super::SmartHome;
use crate::error::Error;
use crate::models::User;
use crate::request::ApiRequest;

/// Login credentials. The password never appears in `Debug` output.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: SecretString::from(password.into()),
        }
    }
}

impl SmartHome {
    /// `GET /users/me`
    pub async fn current_user(&self) -> Result<User, Error> {
        self.get("/users/me").await
    }

    /// `PUT /users/me`
    pub async fn update_user(&self, changes: Value) -> Result<Value, Error> {
        self.put_value("/users/me", Some(changes)).await
    }

    /// Authenticate and persist the session.
    ///
    /// The response may wrap its payload in a `data` envelope. The token and
    /// the payload are stored only when the payload carries a string
    /// `token`; the payload is returned either way.
    ///
    /// `POST /auth/login`
    pub async fn login(&self, credentials: &Credentials) -> Result<Value, Error> {
        debug!(email = %credentials.email, "logging in");
        let body = json!({
            "email": credentials.email,
            "password": credentials.password.expose_secret(),
        });
        let response = self
            .dispatcher
            .request(ApiRequest::post("/auth/login").with_body(body))
            .await?;

        let payload = match response {
            Value::Object(mut map) if map.get("data").is_some_and(Value::is_object) => {
                map.remove("data").unwrap_or_default()
            }
            other => other,
        };

        if let Some(token) = payload.get("token").and_then(Value::as_str) {
            self.dispatcher.begin_session(token, &payload)?;
            info!(email = %credentials.email, "logged in");
        }
        Ok(payload)
    }

    /// Forget the stored token and user. Local only.
    pub fn logout(&self) -> Result<(), Error> {
        self.dispatcher.end_session()?;
        info!("logged out");
        Ok(())
    }

    /// `POST /auth/register`
    pub async fn register(&self, user: Value) -> Result<Value, Error> {
        self.post_value("/auth/register", Some(user)).await
    }
}
