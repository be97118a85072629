//! Invite token issuance, validation, and the demo-token development
//! bypass.
//!
//! Raw token strings never appear in logs; diagnostics carry a short
//! SHA-256 digest instead.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

use greenroom_core::config::ScheduleConfig;
use greenroom_core::constants::{INVITE_LINK_COMPONENT, INVITE_MAX_DAYS, INVITE_MIN_DAYS};
use greenroom_db::db::connection::DbConnection;
use greenroom_db::model::invite_token::{InviteToken, NewInviteToken};
use greenroom_db::query;

use crate::error::{ServiceError, ServiceResult};

/// Token entropy in bytes. 32 bytes = 256 bits before encoding.
const TOKEN_BYTES: usize = 32;

/// Prefix of the development-only token family.
pub const DEMO_TOKEN_PREFIX: &str = "demo-";

const DEMO_TOKEN_VALID_DAYS: i64 = 7;
const DEMO_TOKEN_EMAIL: &str = "demo@example.com";

/// Why a token failed validation. `NotFound` is deliberately
/// indistinguishable from a forged token; `Expired` and `AlreadyUsed` are
/// specific because possessing the literal token already proves issuance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    Missing,
    NotFound,
    Expired,
    AlreadyUsed,
    StorageUnavailable,
}

impl InvalidReason {
    /// Stable identifier for logs and operator diagnostics.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Missing => "missing",
            Self::NotFound => "not_found",
            Self::Expired => "expired",
            Self::AlreadyUsed => "already_used",
            Self::StorageUnavailable => "storage_unavailable",
        }
    }
}

/// A validated token's booking-relevant data.
#[derive(Debug, Clone)]
pub struct TokenGrant {
    pub token: String,
    pub email: String,
    pub guest_name: Option<String>,
    pub expires_at: DateTime<Utc>,
    /// True for the dev-mode demo family; demo grants have no stored row.
    pub demo: bool,
}

#[derive(Debug, Clone)]
pub enum TokenValidation {
    Valid(TokenGrant),
    Invalid(InvalidReason),
}

/// A freshly issued invite plus the link to hand the guest.
#[derive(Debug, Clone)]
pub struct IssuedInvite {
    pub invite: InviteToken,
    pub invite_url: String,
}

/// Generates an opaque URL-safe token with 256 bits of CSPRNG entropy.
#[must_use]
pub fn generate_token() -> String {
    let mut bytes = [0_u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Short log-safe digest of a token value.
#[must_use]
pub fn token_digest(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    hex::encode(&digest[..8])
}

/// ## Summary
/// Issues a new invite for `email`, valid for `days` days.
///
/// ## Errors
/// Returns a validation error for a blank or `@`-less email or `days`
/// outside [1, 365], and a database error if the insert fails.
pub async fn issue(
    conn: &mut DbConnection<'_>,
    origin: &str,
    email: &str,
    guest_name: Option<&str>,
    days: i64,
    now: DateTime<Utc>,
) -> ServiceResult<IssuedInvite> {
    let clean_email = email.trim();
    if clean_email.is_empty() || !clean_email.contains('@') {
        return Err(ServiceError::ValidationError("Invalid email".to_string()));
    }

    if !(INVITE_MIN_DAYS..=INVITE_MAX_DAYS).contains(&days) {
        return Err(ServiceError::ValidationError("Invalid days".to_string()));
    }

    let token = generate_token();
    let expires_at = now + Duration::days(days);

    let clean_name = guest_name
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(String::from);

    let new_invite = NewInviteToken {
        token: token.clone(),
        email: clean_email.to_string(),
        guest_name: clean_name,
        expires_at,
        used: false,
    };
    let invite = query::token::insert(conn, &new_invite).await?;

    tracing::info!(
        token_digest = %token_digest(&token),
        invite_email = %invite.email,
        expires_at = %invite.expires_at,
        "Invite token issued"
    );

    Ok(IssuedInvite {
        invite_url: format!("{origin}/{INVITE_LINK_COMPONENT}/{token}"),
        invite,
    })
}

/// ## Summary
/// Validates a presented token against the store.
///
/// In dev mode, tokens carrying the demo prefix validate without a lookup
/// so the booking flow can be exercised end to end locally. Production
/// configurations never take that path.
///
/// ## Errors
/// Returns a database error if the lookup itself fails; invalid tokens are
/// an `Ok(Invalid(_))` outcome, not an error.
pub async fn validate(
    conn: &mut DbConnection<'_>,
    schedule: &ScheduleConfig,
    raw_token: &str,
    now: DateTime<Utc>,
) -> ServiceResult<TokenValidation> {
    let trimmed = raw_token.trim();
    if trimmed.is_empty() {
        return Ok(TokenValidation::Invalid(InvalidReason::Missing));
    }

    if schedule.dev_mode && trimmed.starts_with(DEMO_TOKEN_PREFIX) {
        tracing::debug!("Accepting demo token in dev mode");
        return Ok(TokenValidation::Valid(TokenGrant {
            token: trimmed.to_string(),
            email: DEMO_TOKEN_EMAIL.to_string(),
            guest_name: None,
            expires_at: now + Duration::days(DEMO_TOKEN_VALID_DAYS),
            demo: true,
        }));
    }

    let Some(row) = query::token::fetch(conn, trimmed).await? else {
        tracing::debug!(
            token_digest = %token_digest(trimmed),
            reason = InvalidReason::NotFound.as_str(),
            "Token validation failed"
        );
        return Ok(TokenValidation::Invalid(InvalidReason::NotFound));
    };

    if row.used {
        tracing::debug!(
            token_digest = %token_digest(trimmed),
            reason = InvalidReason::AlreadyUsed.as_str(),
            "Token validation failed"
        );
        return Ok(TokenValidation::Invalid(InvalidReason::AlreadyUsed));
    }

    if row.expires_at <= now {
        tracing::debug!(
            token_digest = %token_digest(trimmed),
            reason = InvalidReason::Expired.as_str(),
            "Token validation failed"
        );
        return Ok(TokenValidation::Invalid(InvalidReason::Expired));
    }

    Ok(TokenValidation::Valid(TokenGrant {
        token: row.token,
        email: row.email,
        guest_name: row.guest_name,
        expires_at: row.expires_at,
        demo: false,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_tokens_are_url_safe_and_long() {
        let token = generate_token();
        // 32 bytes base64url without padding is 43 characters.
        assert_eq!(token.len(), 43);
        assert!(
            token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn test_generated_tokens_are_unique() {
        assert_ne!(generate_token(), generate_token());
    }

    #[test]
    fn test_token_digest_is_short_and_stable() {
        let digest = token_digest("some-token");
        assert_eq!(digest.len(), 16);
        assert_eq!(digest, token_digest("some-token"));
        assert_ne!(digest, token_digest("other-token"));
    }

    #[test]
    fn test_invalid_reason_identifiers() {
        assert_eq!(InvalidReason::Missing.as_str(), "missing");
        assert_eq!(InvalidReason::NotFound.as_str(), "not_found");
        assert_eq!(InvalidReason::Expired.as_str(), "expired");
        assert_eq!(InvalidReason::AlreadyUsed.as_str(), "already_used");
        assert_eq!(
            InvalidReason::StorageUnavailable.as_str(),
            "storage_unavailable"
        );
    }
}
