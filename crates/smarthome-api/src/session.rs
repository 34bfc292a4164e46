// Session credential persistence
//
// The bearer token and the user payload live next to the server settings
// in the key-value store. They are written together on login and removed
// together on logout or on any 401.

use secrecy::SecretString;
use serde_json::Value;
use smarthome_config::{KeyValueStore, TOKEN_KEY, USER_KEY};

use crate::error::Error;

/// Authentication state as seen by consumers of the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No token stored.
    Anonymous,
    /// A token is stored and attached to live requests.
    Authenticated,
    /// The backend answered 401; credentials were dropped and the user has
    /// to log in again.
    LoginRequired,
}

impl SessionState {
    pub(crate) fn from_store(store: &dyn KeyValueStore) -> Self {
        if token(store).is_some() {
            Self::Authenticated
        } else {
            Self::Anonymous
        }
    }
}

/// Stored bearer token, if any. Empty values count as absent.
pub fn token(store: &dyn KeyValueStore) -> Option<SecretString> {
    store
        .get(TOKEN_KEY)
        .filter(|t| !t.is_empty())
        .map(SecretString::from)
}

/// Stored user payload. Corrupt JSON is treated as absent.
pub fn user(store: &dyn KeyValueStore) -> Option<Value> {
    let raw = store.get(USER_KEY)?;
    serde_json::from_str(&raw).ok()
}

pub(crate) fn persist(store: &dyn KeyValueStore, token: &str, user: &Value) -> Result<(), Error> {
    store.set(TOKEN_KEY, token)?;
    store.set(USER_KEY, &user.to_string())?;
    Ok(())
}

pub(crate) fn clear(store: &dyn KeyValueStore) -> Result<(), Error> {
    store.remove(TOKEN_KEY)?;
    store.remove(USER_KEY)?;
    Ok(())
}
