use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::ServiceError;
use crate::models::Amount;

/// Account data returned by the provider's authentication operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    pub user_token: Option<String>,
    pub wallet_balance: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info_message: Option<String>,
}

#[derive(Debug, Default)]
struct SessionState {
    token: Option<String>,
    wallet_balance: Option<Amount>,
    order_ids: Vec<u64>,
    authenticated_at: Option<DateTime<Utc>>,
}

/// Per-service session state: authentication token, wallet balance, and the
/// history of order ids placed through this instance.
///
/// Shared between the façade and transport-backed refreshers via `Arc`;
/// interior mutability keeps the accessors `&self`.
#[derive(Debug, Default)]
pub struct UserSession {
    state: RwLock<SessionState>,
}

impl UserSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads freshly fetched account data, replacing token and balance.
    pub fn load(&self, data: UserData) {
        let mut state = self.state.write().unwrap();
        state.authenticated_at = data.user_token.as_ref().map(|_| Utc::now());
        state.token = data.user_token;
        state.wallet_balance = data.wallet_balance;
        debug!(authenticated = state.token.is_some(), "session loaded");
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.read().unwrap().token.is_some()
    }

    /// Current session token; privileged operations call this to stamp
    /// their requests.
    pub fn token(&self) -> Result<String, ServiceError> {
        self.state
            .read()
            .unwrap()
            .token
            .clone()
            .ok_or_else(|| ServiceError::Unauthorized("user is not authenticated".to_string()))
    }

    pub fn wallet_balance(&self) -> Option<Amount> {
        self.state.read().unwrap().wallet_balance.clone()
    }

    pub fn set_wallet_balance(&self, balance: Amount) {
        self.state.write().unwrap().wallet_balance = Some(balance);
    }

    pub fn add_order_id(&self, id: u64) {
        self.state.write().unwrap().order_ids.push(id);
    }

    pub fn order_ids(&self) -> Vec<u64> {
        self.state.read().unwrap().order_ids.clone()
    }

    pub fn authenticated_at(&self) -> Option<DateTime<Utc>> {
        self.state.read().unwrap().authenticated_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn authenticated_session() -> UserSession {
        let session = UserSession::new();
        session.load(UserData {
            user_token: Some("token-1".into()),
            wallet_balance: Some(Amount::from_minor_units(2500)),
            info_message: None,
        });
        session
    }

    #[test]
    fn fresh_session_is_unauthenticated() {
        let session = UserSession::new();
        assert!(!session.is_authenticated());
        assert!(matches!(
            session.token(),
            Err(ServiceError::Unauthorized(_))
        ));
    }

    #[test]
    fn load_sets_token_and_balance() {
        let session = authenticated_session();
        assert!(session.is_authenticated());
        assert_eq!(session.token().expect("token"), "token-1");
        assert_eq!(
            session.wallet_balance().map(|b| b.to_minor_units()),
            Some(2500)
        );
        assert!(session.authenticated_at().is_some());
    }

    #[test]
    fn order_history_appends_in_order() {
        let session = authenticated_session();
        session.add_order_id(11);
        session.add_order_id(7);
        assert_eq!(session.order_ids(), vec![11, 7]);
    }

    #[test]
    fn load_without_token_clears_authentication() {
        let session = authenticated_session();
        session.load(UserData::default());
        assert!(!session.is_authenticated());
        assert!(session.authenticated_at().is_none());
    }
}
