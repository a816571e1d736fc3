//! Session business logic - Issues, validates and revokes user access tokens.
//!
//! A user has at most one live session: starting a new one revokes the old ones.
//! Tokens are stored encrypted so the owner can see theirs again with `/session show`.

use crate::{
    core::encryption::TokenCipher,
    entities::{Session, session, user},
    errors::{Error, Result},
};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Duration, Utc};
use sea_orm::{QueryOrder, Set, prelude::*};

fn generate_token() -> String {
    let bytes: [u8; 32] = rand::random();
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Creates a session for `owner`, revoking any sessions it already had.
///
/// Returns the stored row together with the plaintext token.
pub async fn create_session(
    db: &DatabaseConnection,
    cipher: &TokenCipher,
    owner: &user::Model,
    ttl: Duration,
) -> Result<(session::Model, String)> {
    if ttl <= Duration::zero() {
        return Err(Error::validation("Session lifetime must be positive"));
    }

    let now = Utc::now();
    let expires_at = now
        .checked_add_signed(ttl)
        .ok_or_else(|| Error::validation("Session lifetime is too long"))?;

    revoke_sessions(db, owner.id, now).await?;

    let token = generate_token();
    let new_session = session::ActiveModel {
        user_id: Set(owner.id),
        token_ciphertext: Set(cipher.encrypt_to_string(&token)?),
        created_at: Set(now),
        expires_at: Set(expires_at),
        revoked: Set(false),
        ..Default::default()
    };

    let model = new_session.insert(db).await?;
    Ok((model, token))
}

/// The user's newest non-revoked, unexpired session.
pub async fn active_session(
    db: &DatabaseConnection,
    user_id: i64,
    now: DateTime<Utc>,
) -> Result<Option<session::Model>> {
    Session::find()
        .filter(session::Column::UserId.eq(user_id))
        .filter(session::Column::Revoked.eq(false))
        .filter(session::Column::ExpiresAt.gt(now))
        .order_by_desc(session::Column::CreatedAt)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Decrypts the token stored on a session row.
pub fn reveal_token(cipher: &TokenCipher, session: &session::Model) -> Result<String> {
    cipher
        .decrypt_from_string(&session.token_ciphertext)
        .map_err(Into::into)
}

/// Checks `token` against the user's active session.
pub async fn validate_token(
    db: &DatabaseConnection,
    cipher: &TokenCipher,
    user_id: i64,
    token: &str,
    now: DateTime<Utc>,
) -> Result<bool> {
    let Some(active) = active_session(db, user_id, now).await? else {
        return Ok(false);
    };
    Ok(reveal_token(cipher, &active)? == token)
}

/// Revokes every live session of the user. Returns how many were revoked;
/// sessions that had already expired are not counted.
pub async fn revoke_sessions(
    db: &DatabaseConnection,
    user_id: i64,
    now: DateTime<Utc>,
) -> Result<u64> {
    let result = Session::update_many()
        .col_expr(session::Column::Revoked, Expr::value(true))
        .filter(session::Column::UserId.eq(user_id))
        .filter(session::Column::Revoked.eq(false))
        .filter(session::Column::ExpiresAt.gt(now))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

/// Deletes sessions that are expired or revoked. Returns how many rows were removed.
pub async fn purge_expired(db: &DatabaseConnection, now: DateTime<Utc>) -> Result<u64> {
    let result = Session::delete_many()
        .filter(
            session::Column::ExpiresAt
                .lte(now)
                .or(session::Column::Revoked.eq(true)),
        )
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}
