//! Transaction helper for multi-statement write paths.
//!
//! The booking flow runs its insert and the token consume in one
//! transaction so a lost consume race rolls the insert back.
//!
//! ```rust,ignore
//! use diesel_async::scoped_futures::ScopedFutureExt;
//! use crate::db::transaction::with_transaction;
//!
//! with_transaction(&mut conn, |conn| async move {
//!     let booking = query::booking::insert(conn, new_booking).await?;
//!     query::token::consume(conn, &token, now).await?;
//!     Ok(booking)
//! }.scope_boxed()).await?;
//! ```

use diesel_async::{AsyncConnection, scoped_futures::ScopedBoxFuture};

use crate::db::connection::DbConnection;

/// ## Summary
/// Runs a database transaction and returns the closure result.
///
/// Generic over the error type so a service-level rejection can abort the
/// transaction without being funneled through a catch-all error.
///
/// ## Errors
/// Returns any error produced by the closure, or errors raised while starting
/// or committing the transaction.
pub async fn with_transaction<'a, 'conn, T, E, F>(
    conn: &'a mut DbConnection<'conn>,
    callback: F,
) -> Result<T, E>
where
    F: for<'r> FnOnce(&'r mut DbConnection<'conn>) -> ScopedBoxFuture<'a, 'r, Result<T, E>>
        + Send
        + 'a,
    E: From<diesel::result::Error> + Send + 'a,
    T: Send + 'a,
{
    conn.transaction::<_, E, _>(callback).await
}
