//! Stamp Repository
//!
//! Activation is the only mutation: `is_active` goes false → true exactly
//! once, enforced by the conditional UPDATE.

use super::RepoResult;
use shared::models::Stamp;
use shared::util::now_millis;
use sqlx::SqlitePool;

const STAMP_SELECT: &str = "SELECT id, card_id, position, code, is_active, activated_by, activated_at FROM stamp";

pub async fn find_by_card(pool: &SqlitePool, card_id: i64) -> RepoResult<Vec<Stamp>> {
    let sql = format!("{} WHERE card_id = ? ORDER BY position", STAMP_SELECT);
    let stamps = sqlx::query_as::<_, Stamp>(&sql)
        .bind(card_id)
        .fetch_all(pool)
        .await?;
    Ok(stamps)
}

pub async fn find_by_code(
    pool: &SqlitePool,
    card_id: i64,
    code: &str,
) -> RepoResult<Option<Stamp>> {
    let sql = format!("{} WHERE card_id = ? AND code = ?", STAMP_SELECT);
    let stamp = sqlx::query_as::<_, Stamp>(&sql)
        .bind(card_id)
        .bind(code)
        .fetch_optional(pool)
        .await?;
    Ok(stamp)
}

pub async fn active_count(pool: &SqlitePool, card_id: i64) -> RepoResult<i64> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM stamp WHERE card_id = ? AND is_active = 1")
            .bind(card_id)
            .fetch_one(pool)
            .await?;
    Ok(count)
}

pub async fn total_count(pool: &SqlitePool, card_id: i64) -> RepoResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM stamp WHERE card_id = ?")
        .bind(card_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Compare-and-set activation. Returns false when the code was already
/// consumed (or does not exist — the caller distinguishes by lookup).
pub async fn try_activate(
    pool: &SqlitePool,
    card_id: i64,
    code: &str,
    user_id: &str,
) -> RepoResult<bool> {
    let rows = sqlx::query(
        "UPDATE stamp SET is_active = 1, activated_by = ?1, activated_at = ?2 WHERE card_id = ?3 AND code = ?4 AND is_active = 0",
    )
    .bind(user_id)
    .bind(now_millis())
    .bind(card_id)
    .bind(code)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() > 0)
}

/// Lowest-position stamp whose code has not been activated yet — the next
/// code to hand out with an order.
pub async fn first_inactive(pool: &SqlitePool, card_id: i64) -> RepoResult<Option<Stamp>> {
    let sql = format!(
        "{} WHERE card_id = ? AND is_active = 0 ORDER BY position LIMIT 1",
        STAMP_SELECT
    );
    let stamp = sqlx::query_as::<_, Stamp>(&sql)
        .bind(card_id)
        .fetch_optional(pool)
        .await?;
    Ok(stamp)
}
