//! Invite token queries.

use diesel::{ExpressionMethods, OptionalExtension, QueryDsl, SelectableHelper};
use diesel_async::RunQueryDsl;

use crate::db::connection::DbConnection;
use crate::db::schema;
use crate::error::DbResult;
use crate::model::invite_token::{InviteToken, NewInviteToken};

/// ## Summary
/// Looks up a token row by its literal value.
///
/// ## Errors
/// Returns an error if the query fails.
pub async fn fetch(conn: &mut DbConnection<'_>, token: &str) -> DbResult<Option<InviteToken>> {
    let row = schema::invite_token::table
        .find(token)
        .select(InviteToken::as_select())
        .first::<InviteToken>(conn)
        .await
        .optional()?;

    Ok(row)
}

/// ## Summary
/// Persists a freshly issued invite.
///
/// ## Errors
/// Returns an error if the insert fails.
pub async fn insert(conn: &mut DbConnection<'_>, invite: &NewInviteToken) -> DbResult<InviteToken> {
    let row = diesel::insert_into(schema::invite_token::table)
        .values(invite)
        .returning(InviteToken::as_select())
        .get_result::<InviteToken>(conn)
        .await?;

    Ok(row)
}

/// ## Summary
/// Marks a token used, conditionally: only a row still holding
/// `used = FALSE` is updated, so exactly one of any set of concurrent
/// consumers wins. Returns whether this caller was the winner.
///
/// ## Errors
/// Returns an error if the update fails.
pub async fn consume(
    conn: &mut DbConnection<'_>,
    token: &str,
    used_at: chrono::DateTime<chrono::Utc>,
) -> DbResult<bool> {
    let updated_rows = diesel::update(schema::invite_token::table)
        .filter(schema::invite_token::token.eq(token))
        .filter(schema::invite_token::used.eq(false))
        .set((
            schema::invite_token::used.eq(true),
            schema::invite_token::used_at.eq(used_at),
        ))
        .execute(conn)
        .await?;

    Ok(updated_rows == 1)
}
