//! Registration, login, and session identification.

use std::sync::Arc;

use gophermart_core::error::StoreError;
use gophermart_core::sign::Signer;
use uuid::Uuid;

use crate::db::Store;

/// Passwords longer than this are rejected before ever reaching bcrypt,
/// which silently truncates at 72 bytes.
const MAX_PASSWORD_LEN: usize = 72;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("login must not be empty")]
    EmptyLogin,

    #[error("password must be 1..=72 bytes")]
    InvalidPassword,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Hash(#[from] bcrypt::BcryptError),

    #[error(transparent)]
    Sign(#[from] gophermart_core::error::SignError),
}

pub struct Auth {
    store: Arc<Store>,
    signer: Arc<Signer>,
}

impl Auth {
    pub fn new(store: Arc<Store>, signer: Arc<Signer>) -> Self {
        Self { store, signer }
    }

    /// Hashes the password with a cost-parameterised KDF and creates the
    /// user. Duplicate login surfaces as `AuthError::Store(Duplicate)`.
    pub async fn sign_up(&self, login: &str, password: &str) -> Result<String, AuthError> {
        validate_credentials(login, password)?;

        let hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)?;
        let user_id = self.store.create_user(login, &hash).await?;
        Ok(self.signer.sign(&user_id.to_string())?)
    }

    /// Fetches by login and compares the hash; `NotFound` is returned for
    /// both a missing login and a wrong password, so a caller can't
    /// distinguish the two (no enumeration hint).
    pub async fn sign_in(&self, login: &str, password: &str) -> Result<String, AuthError> {
        validate_credentials(login, password)?;

        let user = match self.store.get_user_by_login(login).await {
            Ok(user) => user,
            Err(StoreError::NotFound) => return Err(StoreError::NotFound.into()),
            Err(e) => return Err(e.into()),
        };

        let ok = bcrypt::verify(password, &user.password_hash)?;
        if !ok {
            return Err(StoreError::NotFound.into());
        }

        Ok(self.signer.sign(&user.id.to_string())?)
    }

    /// Verifies a bearer token and confirms the user it names still exists.
    pub async fn identify(&self, token: &str) -> Result<Uuid, AuthError> {
        let payload = self.signer.parse(token)?;
        let user_id: Uuid = payload.parse().map_err(|_| StoreError::NotFound)?;
        let user = self.store.get_user_by_id(user_id).await?;
        Ok(user.id)
    }
}

fn validate_credentials(login: &str, password: &str) -> Result<(), AuthError> {
    if login.is_empty() {
        return Err(AuthError::EmptyLogin);
    }
    if password.is_empty() || password.len() > MAX_PASSWORD_LEN {
        return Err(AuthError::InvalidPassword);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_login() {
        assert!(matches!(
            validate_credentials("", "password"),
            Err(AuthError::EmptyLogin)
        ));
    }

    #[test]
    fn rejects_empty_and_oversized_password() {
        assert!(matches!(
            validate_credentials("login", ""),
            Err(AuthError::InvalidPassword)
        ));
        let too_long = "a".repeat(MAX_PASSWORD_LEN + 1);
        assert!(matches!(
            validate_credentials("login", &too_long),
            Err(AuthError::InvalidPassword)
        ));
    }

    #[test]
    fn accepts_well_formed_credentials() {
        assert!(validate_credentials("login", "password").is_ok());
    }
}
