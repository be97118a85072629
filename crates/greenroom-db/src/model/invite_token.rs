use diesel::{pg::Pg, prelude::*};

use crate::db::schema;

/// A single-use invite credential. Rows are never deleted; consumed tokens
/// stay behind as the audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Identifiable)]
#[diesel(table_name = schema::invite_token)]
#[diesel(primary_key(token))]
#[diesel(check_for_backend(Pg))]
pub struct InviteToken {
    pub token: String,
    pub email: String,
    pub guest_name: Option<String>,
    pub expires_at: chrono::DateTime<chrono::Utc>,
    pub used: bool,
    pub used_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl InviteToken {
    /// A token is spendable iff it is unused and unexpired.
    #[must_use]
    pub fn is_valid_at(&self, now: chrono::DateTime<chrono::Utc>) -> bool {
        !self.used && self.expires_at > now
    }
}

/// Insert struct for newly issued invites.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::invite_token)]
pub struct NewInviteToken {
    pub token: String,
    pub email: String,
    pub guest_name: Option<String>,
    pub expires_at: chrono::DateTime<chrono::Utc>,
    pub used: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn token_at(expires_at: chrono::DateTime<Utc>, used: bool) -> InviteToken {
        InviteToken {
            token: "t".repeat(43),
            email: "guest@example.com".to_string(),
            guest_name: None,
            expires_at,
            used,
            used_at: None,
            created_at: Utc.with_ymd_and_hms(2026, 8, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_unused_unexpired_is_valid() {
        let now = Utc.with_ymd_and_hms(2026, 8, 5, 0, 0, 0).unwrap();
        assert!(token_at(now + Duration::days(7), false).is_valid_at(now));
    }

    #[test]
    fn test_expired_is_invalid_even_if_unused() {
        let now = Utc.with_ymd_and_hms(2026, 8, 5, 0, 0, 0).unwrap();
        assert!(!token_at(now - Duration::seconds(1), false).is_valid_at(now));
    }

    #[test]
    fn test_used_is_invalid_even_if_unexpired() {
        let now = Utc.with_ymd_and_hms(2026, 8, 5, 0, 0, 0).unwrap();
        assert!(!token_at(now + Duration::days(7), true).is_valid_at(now));
    }
}
