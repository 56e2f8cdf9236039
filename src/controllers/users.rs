use crate::constants::{
    ERR_AUTH_REQUIRED, ERR_BAD_CREDENTIALS, ERR_MISSING_CREDENTIALS, ERR_USERNAME_TAKEN,
};
use crate::controllers::CascadeReport;
use crate::error::{AppError, Result};
use crate::keys;
use crate::models::user::{required, validate_password, validate_username};
use crate::models::{
    CredentialsRequest, SelfView, Update, UpdatePasswordRequest, UpdateUserRequest, UserMetadata,
};
use crate::security::{hash_password, random_id, verify_password};
use crate::session::{Identity, NewSession, create_session, destroy_session};
use crate::store::{PutOptions, Store};

/// Shape-check signup and login bodies before any store access
fn credentials(request: CredentialsRequest) -> Result<(String, String)> {
    let username = required(request.username, ERR_MISSING_CREDENTIALS)?;
    let password = required(request.password, ERR_MISSING_CREDENTIALS)?;

    validate_username(&username)?;
    validate_password(&password)?;

    Ok((username, password))
}

fn username_taken(store: &Store, username: &str) -> Result<bool> {
    Ok(!store.users.list(&keys::username_prefix(username))?.is_empty())
}

/// Sign up and start a session
pub fn create(store: &Store, request: CredentialsRequest) -> Result<NewSession> {
    let (username, password) = credentials(request)?;

    if username_taken(store, &username)? {
        tracing::info!("Signup rejected: username already exists");
        return Err(AppError::Unprocessable(ERR_USERNAME_TAKEN.to_string()));
    }

    let id = random_id();
    let digest = hash_password(&password)?;
    let record_key = keys::user_record_key(&username, &id);

    store.users.put(
        &record_key,
        "",
        PutOptions::with_metadata(UserMetadata {
            id,
            password: digest,
        }),
    )?;

    tracing::info!("New user registered");

    create_session(store, &record_key)
}

/// Check credentials and start a session.
///
/// An unknown username is verified against the dummy digest so it costs the
/// same as a wrong password and produces the same error.
pub fn login(store: &Store, request: CredentialsRequest) -> Result<NewSession> {
    let (username, password) = credentials(request)?;

    let user = store
        .users
        .list(&keys::username_prefix(&username))?
        .into_iter()
        .find_map(|listed| listed.metadata);

    let (id, digest) = match user {
        Some(UserMetadata { id, password }) => (id, password),
        None => ("0".to_string(), String::new()),
    };

    if !verify_password(&password, &digest)? {
        tracing::warn!("Failed login attempt");
        return Err(AppError::Unprocessable(ERR_BAD_CREDENTIALS.to_string()));
    }

    create_session(store, &keys::user_record_key(&username, &id))
}

pub fn logout(store: &Store, identity: &Identity) -> Result<()> {
    destroy_session(store, &identity.session_id)
}

pub fn get_self(identity: &Identity) -> SelfView {
    identity.view()
}

fn current_metadata(store: &Store, identity: &Identity) -> Result<UserMetadata> {
    store
        .users
        .get_with_metadata(&identity.record_key())?
        .and_then(|entry| entry.metadata)
        .ok_or_else(|| AppError::Unauthorized(ERR_AUTH_REQUIRED.to_string()))
}

/// Rename the caller.
///
/// The username is part of the Users key, so a rename re-keys the entry:
/// delete the old key, then insert the new one. The two calls are not atomic;
/// a crash between them leaves the user unfindable until repaired by hand.
/// The current session is bound to the old key and is replaced.
pub fn update_self(
    store: &Store,
    identity: &Identity,
    request: UpdateUserRequest,
) -> Result<Update<NewSession>> {
    let username = required(request.username, "Missing username")?;
    validate_username(&username)?;

    if username == identity.username {
        return Ok(Update::Unchanged);
    }

    if username_taken(store, &username)? {
        return Err(AppError::Unprocessable(ERR_USERNAME_TAKEN.to_string()));
    }

    let metadata = current_metadata(store, identity)?;
    let new_key = keys::user_record_key(&username, &identity.user_id);

    store.users.delete(&identity.record_key())?;
    destroy_session(store, &identity.session_id)?;
    store
        .users
        .put(&new_key, "", PutOptions::with_metadata(metadata))?;

    tracing::info!("User {} renamed", identity.user_id);

    create_session(store, &new_key).map(Update::Changed)
}

/// Change the caller's password.
///
/// The submitted old password is compared to the new one as a plain string
/// and is not checked against the stored digest. Other sessions of the same
/// user stay valid; only the current one is rotated.
pub fn update_self_password(
    store: &Store,
    identity: &Identity,
    request: UpdatePasswordRequest,
) -> Result<Update<NewSession>> {
    let old_password = required(request.old_password, "Missing old password")?;
    let password = required(request.password, "Missing new password")?;

    if old_password == password {
        return Ok(Update::Unchanged);
    }

    validate_password(&password)?;

    let metadata = current_metadata(store, identity)?;
    let digest = hash_password(&password)?;

    store.users.put(
        &identity.record_key(),
        "",
        PutOptions::with_metadata(UserMetadata {
            id: metadata.id,
            password: digest,
        }),
    )?;
    destroy_session(store, &identity.session_id)?;

    tracing::info!("Password changed for user {}", identity.user_id);

    create_session(store, &identity.record_key()).map(Update::Changed)
}

/// Delete the caller and everything they own
pub fn delete_self(store: &Store, identity: &Identity) -> Result<CascadeReport> {
    destroy_session(store, &identity.session_id)?;
    store.users.delete(&identity.record_key())?;

    let prefix = keys::children_prefix(&keys::user_key(&identity.user_id));
    let mut report = CascadeReport::parent();
    report.sweep(store.collections.as_ref(), &prefix)?;
    report.sweep(store.sub_collections.as_ref(), &prefix)?;
    report.sweep(store.flashcards.as_ref(), &prefix)?;

    tracing::info!(
        "User {} deleted with {} owned entries",
        identity.user_id,
        report.deleted - 1
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controllers::collections;
    use crate::models::TitleRequest;
    use crate::session::resolve_identity;

    fn credentials_for(username: &str, password: &str) -> CredentialsRequest {
        CredentialsRequest {
            username: Some(username.to_string()),
            password: Some(password.to_string()),
        }
    }

    fn signed_up(store: &Store, username: &str) -> Identity {
        let session = create(store, credentials_for(username, "password123")).unwrap();
        resolve_identity(store, Some(&session.token)).unwrap()
    }

    #[test]
    fn test_create_then_login_yields_same_identity() {
        let store = Store::in_memory();

        let created = create(&store, credentials_for("alice", "password123")).unwrap();
        let logged_in = login(&store, credentials_for("alice", "password123")).unwrap();

        assert_eq!(created.user, logged_in.user);
        assert_ne!(created.token, logged_in.token);
        assert_eq!(created.user.username, "alice");
        assert_eq!(created.user.id.len(), 32);
    }

    #[test]
    fn test_create_duplicate_username_writes_nothing() {
        let store = Store::in_memory();
        create(&store, credentials_for("alice", "password123")).unwrap();

        let err = create(&store, credentials_for("alice", "password456")).unwrap_err();
        assert!(matches!(err, AppError::Unprocessable(ref msg) if msg == ERR_USERNAME_TAKEN));
        assert_eq!(store.users.list("").unwrap().len(), 1);
        assert_eq!(store.sessions.list("").unwrap().len(), 1);
    }

    #[test]
    fn test_usernames_sharing_a_prefix_are_distinct() {
        let store = Store::in_memory();
        create(&store, credentials_for("bobby", "password123")).unwrap();

        assert!(create(&store, credentials_for("bob", "password123")).is_ok());
        assert!(create(&store, credentials_for("Bobby", "password123")).is_ok());
    }

    #[test]
    fn test_create_validates_before_writing() {
        let store = Store::in_memory();

        let cases = [
            CredentialsRequest {
                username: None,
                password: Some("password123".to_string()),
            },
            credentials_for("", "password123"),
            credentials_for(&"a".repeat(21), "password123"),
            credentials_for("a:b", "password123"),
            credentials_for("alice", "short"),
        ];
        for request in cases {
            assert!(matches!(
                create(&store, request),
                Err(AppError::InvalidInput(_))
            ));
        }
        assert!(store.users.list("").unwrap().is_empty());
    }

    #[test]
    fn test_login_failures_are_uniform() {
        let store = Store::in_memory();
        create(&store, credentials_for("alice", "password123")).unwrap();

        let wrong_password = login(&store, credentials_for("alice", "password124")).unwrap_err();
        let unknown_user = login(&store, credentials_for("mallory", "password123")).unwrap_err();

        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
        assert!(matches!(wrong_password, AppError::Unprocessable(_)));
    }

    #[test]
    fn test_logout_ends_only_current_session() {
        let store = Store::in_memory();
        let identity = signed_up(&store, "alice");
        let other = login(&store, credentials_for("alice", "password123")).unwrap();

        logout(&store, &identity).unwrap();
        assert!(resolve_identity(&store, Some(&identity.session_id)).is_err());
        assert!(resolve_identity(&store, Some(&other.token)).is_ok());
    }

    #[test]
    fn test_update_self_unchanged_performs_no_writes() {
        let store = Store::in_memory();
        let identity = signed_up(&store, "alice");

        let update = update_self(
            &store,
            &identity,
            UpdateUserRequest {
                username: Some("alice".to_string()),
            },
        )
        .unwrap();

        assert_eq!(update, Update::Unchanged);
        assert!(resolve_identity(&store, Some(&identity.session_id)).is_ok());
    }

    #[test]
    fn test_update_self_rekeys_user_and_rotates_session() {
        let store = Store::in_memory();
        let identity = signed_up(&store, "alice");

        let Update::Changed(session) = update_self(
            &store,
            &identity,
            UpdateUserRequest {
                username: Some("alicia".to_string()),
            },
        )
        .unwrap() else {
            panic!("expected a rename");
        };

        assert_eq!(session.user.username, "alicia");
        assert_eq!(session.user.id, identity.user_id);
        assert!(resolve_identity(&store, Some(&identity.session_id)).is_err());

        // Old name is free, new name logs in with the old password
        assert!(store.users.list("alice:").unwrap().is_empty());
        let logged_in = login(&store, credentials_for("alicia", "password123")).unwrap();
        assert_eq!(logged_in.user.id, identity.user_id);
    }

    #[test]
    fn test_update_self_to_taken_username() {
        let store = Store::in_memory();
        let identity = signed_up(&store, "alice");
        signed_up(&store, "bob");

        let err = update_self(
            &store,
            &identity,
            UpdateUserRequest {
                username: Some("bob".to_string()),
            },
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Unprocessable(_)));
        assert_eq!(store.users.list("alice:").unwrap().len(), 1);
    }

    #[test]
    fn test_update_password_same_strings_is_unchanged_even_if_wrong() {
        let store = Store::in_memory();
        let identity = signed_up(&store, "alice");
        let before = store.users.list("alice:").unwrap();

        let update = update_self_password(
            &store,
            &identity,
            UpdatePasswordRequest {
                old_password: Some("not-my-password".to_string()),
                password: Some("not-my-password".to_string()),
            },
        )
        .unwrap();

        assert_eq!(update, Update::Unchanged);
        assert_eq!(store.users.list("alice:").unwrap(), before);
    }

    #[test]
    fn test_update_password_changes_digest() {
        let store = Store::in_memory();
        let identity = signed_up(&store, "alice");

        let update = update_self_password(
            &store,
            &identity,
            UpdatePasswordRequest {
                old_password: Some("password123".to_string()),
                password: Some("new-password-456".to_string()),
            },
        )
        .unwrap();
        assert!(matches!(update, Update::Changed(_)));

        assert!(login(&store, credentials_for("alice", "password123")).is_err());
        assert!(login(&store, credentials_for("alice", "new-password-456")).is_ok());
    }

    #[test]
    fn test_update_password_requires_both_fields() {
        let store = Store::in_memory();
        let identity = signed_up(&store, "alice");

        let err = update_self_password(
            &store,
            &identity,
            UpdatePasswordRequest {
                old_password: None,
                password: Some("new-password-456".to_string()),
            },
        )
        .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(ref msg) if msg == "Missing old password"));

        let err = update_self_password(
            &store,
            &identity,
            UpdatePasswordRequest {
                old_password: Some("password123".to_string()),
                password: None,
            },
        )
        .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(ref msg) if msg == "Missing new password"));
    }

    #[test]
    fn test_delete_self_cascades_to_owned_entries_only() {
        let store = Store::in_memory();
        let alice = signed_up(&store, "alice");
        let bob = signed_up(&store, "bob");

        for identity in [&alice, &bob] {
            collections::create(
                &store,
                &identity.user_id,
                TitleRequest {
                    title: Some("Spanish".to_string()),
                },
            )
            .unwrap();
        }

        let report = delete_self(&store, &alice).unwrap();
        assert_eq!(report.listings, 3);
        assert_eq!(report.deleted, 2);

        assert!(store.users.list("alice:").unwrap().is_empty());
        assert!(resolve_identity(&store, Some(&alice.session_id)).is_err());
        assert!(
            store
                .collections
                .list(&keys::children_prefix(&keys::user_key(&alice.user_id)))
                .unwrap()
                .is_empty()
        );
        assert_eq!(collections::list_all(&store, &bob.user_id).unwrap().len(), 1);
    }
}
