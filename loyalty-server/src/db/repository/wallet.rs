//! Wallet Repository
//!
//! Coin balance per user plus an append-only transaction log. Debits are
//! guarded by a conditional UPDATE so the balance can never go negative.

use super::RepoResult;
use shared::models::{WalletTransaction, WalletTxKind};
use shared::util::{now_millis, snowflake_id};
use sqlx::{Sqlite, SqlitePool, Transaction};

pub async fn balance(pool: &SqlitePool, user_id: &str) -> RepoResult<i64> {
    let balance: Option<i64> =
        sqlx::query_scalar("SELECT balance FROM wallet_account WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(pool)
            .await?;
    Ok(balance.unwrap_or(0))
}

pub async fn transactions(pool: &SqlitePool, user_id: &str) -> RepoResult<Vec<WalletTransaction>> {
    let rows = sqlx::query_as::<_, WalletTransaction>(
        "SELECT id, user_id, amount, kind, card_id, note, created_at FROM wallet_transaction WHERE user_id = ? ORDER BY created_at DESC, id DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Credit a wallet inside an open transaction (lazily creating the account)
/// and log the movement. Returns the new balance.
pub async fn apply_credit(
    tx: &mut Transaction<'_, Sqlite>,
    user_id: &str,
    amount: i64,
    kind: WalletTxKind,
    card_id: Option<i64>,
    note: Option<&str>,
) -> RepoResult<i64> {
    let now = now_millis();

    sqlx::query(
        "INSERT INTO wallet_account (user_id, balance, updated_at) VALUES (?1, ?2, ?3) ON CONFLICT (user_id) DO UPDATE SET balance = balance + excluded.balance, updated_at = excluded.updated_at",
    )
    .bind(user_id)
    .bind(amount)
    .bind(now)
    .execute(&mut **tx)
    .await?;

    sqlx::query(
        "INSERT INTO wallet_transaction (id, user_id, amount, kind, card_id, note, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )
    .bind(snowflake_id())
    .bind(user_id)
    .bind(amount)
    .bind(kind)
    .bind(card_id)
    .bind(note)
    .bind(now)
    .execute(&mut **tx)
    .await?;

    let balance: i64 = sqlx::query_scalar("SELECT balance FROM wallet_account WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(&mut **tx)
        .await?;
    Ok(balance)
}

/// Debit a wallet for a coin payment. The conditional UPDATE is the
/// overdraft guard; returns `None` when the balance is insufficient.
pub async fn debit(
    pool: &SqlitePool,
    user_id: &str,
    amount: i64,
    note: Option<&str>,
) -> RepoResult<Option<i64>> {
    let mut tx = pool.begin().await?;
    let now = now_millis();

    let rows = sqlx::query(
        "UPDATE wallet_account SET balance = balance - ?1, updated_at = ?2 WHERE user_id = ?3 AND balance >= ?1",
    )
    .bind(amount)
    .bind(now)
    .bind(user_id)
    .execute(&mut *tx)
    .await?;

    if rows.rows_affected() == 0 {
        return Ok(None);
    }

    sqlx::query(
        "INSERT INTO wallet_transaction (id, user_id, amount, kind, card_id, note, created_at) VALUES (?1, ?2, ?3, ?4, NULL, ?5, ?6)",
    )
    .bind(snowflake_id())
    .bind(user_id)
    .bind(-amount)
    .bind(WalletTxKind::Payment)
    .bind(note)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    let balance: i64 = sqlx::query_scalar("SELECT balance FROM wallet_account WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(Some(balance))
}
