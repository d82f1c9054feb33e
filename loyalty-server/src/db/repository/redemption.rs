//! Redemption Repository
//!
//! One row per redeemed stage. The `(card_id, stage_index)` uniqueness
//! constraint makes redemption exactly-once: the conditional insert either
//! lands or reports that the stage was already taken.

use super::RepoResult;
use shared::models::Redemption;
use shared::util::{now_millis, snowflake_id};
use sqlx::SqlitePool;

pub async fn find_by_card(pool: &SqlitePool, card_id: i64) -> RepoResult<Vec<Redemption>> {
    let rows = sqlx::query_as::<_, Redemption>(
        "SELECT id, card_id, stage_index, redeemed_by, redeemed_at FROM redemption WHERE card_id = ? ORDER BY stage_index",
    )
    .bind(card_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn redeemed_stages(pool: &SqlitePool, card_id: i64) -> RepoResult<Vec<i64>> {
    let rows: Vec<i64> = sqlx::query_scalar(
        "SELECT stage_index FROM redemption WHERE card_id = ? ORDER BY stage_index",
    )
    .bind(card_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Record a stage redemption; when it was the card's last unredeemed stage,
/// consume the card (`ACTIVE → USED`) in the same transaction.
///
/// Returns false when the stage was already redeemed.
pub async fn redeem(
    pool: &SqlitePool,
    card_id: i64,
    stage_index: i64,
    user_id: &str,
    total_stages: i64,
) -> RepoResult<bool> {
    let mut tx = pool.begin().await?;
    let now = now_millis();

    let inserted = sqlx::query(
        "INSERT INTO redemption (id, card_id, stage_index, redeemed_by, redeemed_at) VALUES (?1, ?2, ?3, ?4, ?5) ON CONFLICT (card_id, stage_index) DO NOTHING",
    )
    .bind(snowflake_id())
    .bind(card_id)
    .bind(stage_index)
    .bind(user_id)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    if inserted.rows_affected() == 0 {
        return Ok(false);
    }

    let redeemed: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM redemption WHERE card_id = ?")
        .bind(card_id)
        .fetch_one(&mut *tx)
        .await?;

    if redeemed >= total_stages {
        sqlx::query(
            "UPDATE card SET status = 'USED', updated_at = ?1 WHERE id = ?2 AND status = 'ACTIVE'",
        )
        .bind(now)
        .bind(card_id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(true)
}
