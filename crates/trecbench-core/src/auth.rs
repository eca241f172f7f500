//! Accounts and login sessions.
//!
//! Identity is carried explicitly: operations that require a logged-in
//! researcher take a [`SessionContext`] rather than consulting any ambient
//! state. Passwords are stored as Argon2id PHC strings; session tokens are
//! random UUIDs with a fixed expiry.

use crate::errors::AuthError;
use crate::model::Researcher;
use crate::storage::{NewResearcher, SessionRow, Store};
use crate::validate::ValidRegistration;
use argon2::password_hash::{rand_core::OsRng, PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use chrono::{Duration, Utc};
use uuid::Uuid;

/// A resolved login: the token presented and the researcher it belongs to.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub token: String,
    pub researcher: Researcher,
}

pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::Hash(e.to_string()))?;
    Ok(hash.to_string())
}

pub fn verify_password(stored: &str, password: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

pub fn register(
    store: &Store,
    registration: &ValidRegistration,
    is_admin: bool,
) -> Result<Researcher, AuthError> {
    if store
        .researcher_by_username(&registration.username)?
        .is_some()
    {
        return Err(AuthError::UsernameTaken);
    }
    let password_hash = hash_password(&registration.password)?;
    let researcher = store.create_researcher(&NewResearcher {
        username: registration.username.clone(),
        password_hash,
        email: registration.email.clone(),
        display_name: registration.display_name.clone(),
        organisation: registration.organisation.clone(),
        website: registration.website.clone(),
        is_admin,
    })?;
    tracing::info!(username = %researcher.username, "researcher registered");
    Ok(researcher)
}

pub fn login(
    store: &Store,
    username: &str,
    password: &str,
    ttl: Duration,
) -> Result<SessionContext, AuthError> {
    let (researcher, stored_hash) = store
        .credentials_by_username(username)?
        .ok_or(AuthError::UnknownUser)?;
    if !verify_password(&stored_hash, password) {
        return Err(AuthError::BadPassword);
    }
    if !researcher.active {
        return Err(AuthError::AccountDisabled);
    }

    let now = Utc::now();
    store.purge_expired_sessions(now)?;
    let session = SessionRow {
        token: Uuid::new_v4().to_string(),
        researcher_id: researcher.id,
        created_at: now,
        expires_at: now + ttl,
    };
    store.insert_session(&session)?;
    tracing::info!(username = %researcher.username, "login");
    Ok(SessionContext {
        token: session.token,
        researcher,
    })
}

/// Resolve a presented token. Expired rows are deleted on sight.
pub fn resolve(store: &Store, token: &str) -> Result<SessionContext, AuthError> {
    let session = store
        .session_by_token(token)?
        .ok_or(AuthError::InvalidSession)?;
    if session.expires_at <= Utc::now() {
        store.delete_session(token)?;
        return Err(AuthError::InvalidSession);
    }
    let researcher = store
        .researcher_by_id(session.researcher_id)?
        .ok_or(AuthError::InvalidSession)?;
    if !researcher.active {
        return Err(AuthError::AccountDisabled);
    }
    Ok(SessionContext {
        token: session.token,
        researcher,
    })
}

pub fn logout(store: &Store, token: &str) -> Result<(), AuthError> {
    store.delete_session(token)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> Store {
        let store = Store::memory().unwrap();
        store.init_schema().unwrap();
        store
    }

    fn registration(username: &str) -> ValidRegistration {
        ValidRegistration {
            username: username.into(),
            password: "hunter2!".into(),
            email: "ann@example.org".into(),
            display_name: "Ann".into(),
            organisation: String::new(),
            website: String::new(),
        }
    }

    #[test]
    fn hash_and_verify_round_trip() {
        let hash = hash_password("hunter2!").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password(&hash, "hunter2!"));
        assert!(!verify_password(&hash, "hunter3!"));
        assert!(!verify_password("not-a-phc-string", "hunter2!"));
    }

    #[test]
    fn register_login_logout() {
        let store = store();
        register(&store, &registration("ann"), false).unwrap();

        let ctx = login(&store, "ann", "hunter2!", Duration::days(14)).unwrap();
        assert_eq!(ctx.researcher.username, "ann");

        let resolved = resolve(&store, &ctx.token).unwrap();
        assert_eq!(resolved.researcher.id, ctx.researcher.id);

        logout(&store, &ctx.token).unwrap();
        assert!(matches!(
            resolve(&store, &ctx.token),
            Err(AuthError::InvalidSession)
        ));
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let store = store();
        register(&store, &registration("ann"), false).unwrap();
        assert!(matches!(
            register(&store, &registration("ann"), false),
            Err(AuthError::UsernameTaken)
        ));
    }

    #[test]
    fn wrong_password_and_unknown_user_fail() {
        let store = store();
        register(&store, &registration("ann"), false).unwrap();
        assert!(matches!(
            login(&store, "ann", "wrong", Duration::days(14)),
            Err(AuthError::BadPassword)
        ));
        assert!(matches!(
            login(&store, "bob", "hunter2!", Duration::days(14)),
            Err(AuthError::UnknownUser)
        ));
    }

    #[test]
    fn disabled_account_cannot_log_in() {
        let store = store();
        let r = register(&store, &registration("ann"), false).unwrap();
        store.set_researcher_active(r.id, false).unwrap();
        assert!(matches!(
            login(&store, "ann", "hunter2!", Duration::days(14)),
            Err(AuthError::AccountDisabled)
        ));
    }

    #[test]
    fn expired_session_does_not_resolve() {
        let store = store();
        let r = register(&store, &registration("ann"), false).unwrap();
        let now = Utc::now();
        store
            .insert_session(&SessionRow {
                token: "stale".into(),
                researcher_id: r.id,
                created_at: now - Duration::days(30),
                expires_at: now - Duration::days(16),
            })
            .unwrap();
        assert!(matches!(
            resolve(&store, "stale"),
            Err(AuthError::InvalidSession)
        ));
        // resolved-on-sight deletion
        assert!(store.session_by_token("stale").unwrap().is_none());
    }
}
