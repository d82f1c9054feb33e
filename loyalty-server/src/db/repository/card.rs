//! Card Repository

use super::{RepoError, RepoResult, is_unique_violation, wallet};
use shared::models::{
    Card, CardRecord, CardStatus, CardType, CardVariant, RewardStage, WalletTxKind,
};
use shared::util::{now_millis, snowflake_id};
use sqlx::SqlitePool;

const CARD_SELECT: &str = "SELECT id, code, card_type, status, title, description, owner_id, expires_at, background_color, text_color, gift_kind, discount_value, image_url, coin_value, created_at, updated_at FROM card";

const STAGE_SELECT: &str = "SELECT stage_index, required, reward, reward_kind, discount_value FROM card_stage WHERE card_id = ? ORDER BY stage_index";

/// A fully prepared card for insertion: flat record, stage definitions and
/// stamp codes (reward cards only). Codes are generated by the registry.
pub struct NewCard {
    pub record: CardRecord,
    pub stages: Vec<RewardStage>,
    pub stamp_codes: Vec<String>,
}

/// Insert a batch of cards in one transaction (all-or-nothing).
///
/// A UNIQUE violation on any card code surfaces as [`RepoError::Duplicate`]
/// and rolls back the whole batch, so the caller can regenerate and retry.
pub async fn insert_batch(pool: &SqlitePool, cards: &[NewCard]) -> RepoResult<Vec<Card>> {
    let mut tx = pool.begin().await?;

    for new_card in cards {
        let r = &new_card.record;
        let result = sqlx::query(
            "INSERT INTO card (id, code, card_type, status, title, description, owner_id, expires_at, background_color, text_color, gift_kind, discount_value, image_url, coin_value, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
        )
        .bind(r.id)
        .bind(&r.code)
        .bind(r.card_type)
        .bind(r.status)
        .bind(&r.title)
        .bind(&r.description)
        .bind(&r.owner_id)
        .bind(r.expires_at)
        .bind(&r.background_color)
        .bind(&r.text_color)
        .bind(r.gift_kind)
        .bind(r.discount_value)
        .bind(&r.image_url)
        .bind(r.coin_value)
        .bind(r.created_at)
        .bind(r.updated_at)
        .execute(&mut *tx)
        .await;

        match result {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => {
                return Err(RepoError::Duplicate(format!("card code {}", r.code)));
            }
            Err(e) => return Err(e.into()),
        }

        for stage in &new_card.stages {
            sqlx::query(
                "INSERT INTO card_stage (id, card_id, stage_index, required, reward, reward_kind, discount_value) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )
            .bind(snowflake_id())
            .bind(r.id)
            .bind(stage.stage_index)
            .bind(stage.required)
            .bind(&stage.reward)
            .bind(stage.reward_kind)
            .bind(stage.discount_value)
            .execute(&mut *tx)
            .await?;
        }

        for (position, code) in new_card.stamp_codes.iter().enumerate() {
            sqlx::query(
                "INSERT INTO stamp (id, card_id, position, code, is_active) VALUES (?1, ?2, ?3, ?4, 0)",
            )
            .bind(snowflake_id())
            .bind(r.id)
            .bind(position as i64)
            .bind(code)
            .execute(&mut *tx)
            .await?;
        }
    }

    tx.commit().await?;

    let mut created = Vec::with_capacity(cards.len());
    for new_card in cards {
        let card = find_by_id(pool, new_card.record.id)
            .await?
            .ok_or_else(|| RepoError::Database("Failed to read back created card".into()))?;
        created.push(card);
    }
    Ok(created)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Card>> {
    let sql = format!("{} WHERE id = ?", CARD_SELECT);
    let record = sqlx::query_as::<_, CardRecord>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    match record {
        Some(record) => Ok(Some(assemble(pool, record).await?)),
        None => Ok(None),
    }
}

pub async fn find_by_code(pool: &SqlitePool, code: &str) -> RepoResult<Option<Card>> {
    let sql = format!("{} WHERE code = ?", CARD_SELECT);
    let record = sqlx::query_as::<_, CardRecord>(&sql)
        .bind(code)
        .fetch_optional(pool)
        .await?;
    match record {
        Some(record) => Ok(Some(assemble(pool, record).await?)),
        None => Ok(None),
    }
}

pub async fn code_exists(pool: &SqlitePool, code: &str) -> RepoResult<bool> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM card WHERE code = ?")
        .bind(code)
        .fetch_one(pool)
        .await?;
    Ok(count > 0)
}

pub async fn list(
    pool: &SqlitePool,
    status: Option<CardStatus>,
    card_type: Option<CardType>,
) -> RepoResult<Vec<Card>> {
    let mut sql = format!("{} WHERE 1 = 1", CARD_SELECT);
    if status.is_some() {
        sql.push_str(" AND status = ?");
    }
    if card_type.is_some() {
        sql.push_str(" AND card_type = ?");
    }
    sql.push_str(" ORDER BY created_at DESC");

    let mut query = sqlx::query_as::<_, CardRecord>(&sql);
    if let Some(status) = status {
        query = query.bind(status);
    }
    if let Some(card_type) = card_type {
        query = query.bind(card_type);
    }
    let records = query.fetch_all(pool).await?;

    let mut cards = Vec::with_capacity(records.len());
    for record in records {
        cards.push(assemble(pool, record).await?);
    }
    Ok(cards)
}

pub async fn find_by_owner(pool: &SqlitePool, owner_id: &str) -> RepoResult<Vec<Card>> {
    let sql = format!("{} WHERE owner_id = ? ORDER BY created_at DESC", CARD_SELECT);
    let records = sqlx::query_as::<_, CardRecord>(&sql)
        .bind(owner_id)
        .fetch_all(pool)
        .await?;
    let mut cards = Vec::with_capacity(records.len());
    for record in records {
        cards.push(assemble(pool, record).await?);
    }
    Ok(cards)
}

/// Compare-and-set claim: assign the owner if the card is still unowned and
/// active. Returns false when a concurrent claim (or consumption) won.
pub async fn try_claim(pool: &SqlitePool, id: i64, user_id: &str) -> RepoResult<bool> {
    let rows = sqlx::query(
        "UPDATE card SET owner_id = ?1, updated_at = ?2 WHERE id = ?3 AND owner_id IS NULL AND status = 'ACTIVE'",
    )
    .bind(user_id)
    .bind(now_millis())
    .bind(id)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() > 0)
}

/// Compare-and-set consumption: `ACTIVE → USED`. Returns false when the
/// card was already used or expired.
pub async fn try_mark_used(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query(
        "UPDATE card SET status = 'USED', updated_at = ?1 WHERE id = ?2 AND status = 'ACTIVE'",
    )
    .bind(now_millis())
    .bind(id)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() > 0)
}

/// Claim a coins card and credit the owner's wallet in one transaction.
///
/// The claim, the `ACTIVE → USED` transition and the wallet credit commit
/// together, so the credit happens exactly once per card. Returns the new
/// wallet balance, or `None` when a concurrent claim won.
pub async fn claim_coins(
    pool: &SqlitePool,
    id: i64,
    user_id: &str,
    value: i64,
) -> RepoResult<Option<i64>> {
    let mut tx = pool.begin().await?;
    let now = now_millis();

    let claimed = sqlx::query(
        "UPDATE card SET owner_id = ?1, status = 'USED', updated_at = ?2 WHERE id = ?3 AND owner_id IS NULL AND status = 'ACTIVE'",
    )
    .bind(user_id)
    .bind(now)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    if claimed.rows_affected() == 0 {
        return Ok(None);
    }

    let balance = wallet::apply_credit(
        &mut tx,
        user_id,
        value,
        WalletTxKind::CardCredit,
        Some(id),
        None,
    )
    .await?;

    tx.commit().await?;
    Ok(Some(balance))
}

/// Force-expire a card (admin). No-op when the card is already terminal.
pub async fn deactivate(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    if !exists(pool, id).await? {
        return Err(RepoError::NotFound(format!("Card {id}")));
    }
    sqlx::query(
        "UPDATE card SET status = 'EXPIRED', updated_at = ?1 WHERE id = ?2 AND status = 'ACTIVE'",
    )
    .bind(now_millis())
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Hard removal; stages and stamps go with the card (ON DELETE CASCADE).
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    let rows = sqlx::query("DELETE FROM card WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Card {id}")));
    }
    Ok(())
}

async fn exists(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM card WHERE id = ?")
        .bind(id)
        .fetch_one(pool)
        .await?;
    Ok(count > 0)
}

pub async fn find_stages(pool: &SqlitePool, card_id: i64) -> RepoResult<Vec<RewardStage>> {
    let stages = sqlx::query_as::<_, RewardStage>(STAGE_SELECT)
        .bind(card_id)
        .fetch_all(pool)
        .await?;
    Ok(stages)
}

/// Assemble the domain card from its flat record and variant tables.
async fn assemble(pool: &SqlitePool, record: CardRecord) -> RepoResult<Card> {
    let variant = match record.card_type {
        CardType::Reward => CardVariant::Reward {
            stages: find_stages(pool, record.id).await?,
        },
        CardType::Gift => CardVariant::Gift {
            gift_kind: record.gift_kind.ok_or_else(|| {
                RepoError::Database(format!("Gift card {} missing gift_kind", record.id))
            })?,
            discount_value: record.discount_value,
            image_url: record.image_url.clone(),
        },
        CardType::Coins => CardVariant::Coins {
            value: record.coin_value.ok_or_else(|| {
                RepoError::Database(format!("Coins card {} missing coin_value", record.id))
            })?,
        },
    };

    Ok(Card {
        id: record.id,
        code: record.code,
        title: record.title,
        description: record.description,
        status: record.status,
        owner_id: record.owner_id,
        expires_at: record.expires_at,
        background_color: record.background_color,
        text_color: record.text_color,
        created_at: record.created_at,
        updated_at: record.updated_at,
        variant,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::RewardKind;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        crate::db::MIGRATOR.run(&pool).await.unwrap();
        pool
    }

    fn gift_card(code: &str) -> NewCard {
        let now = now_millis();
        NewCard {
            record: CardRecord {
                id: snowflake_id(),
                code: code.to_string(),
                card_type: CardType::Gift,
                status: CardStatus::Active,
                title: "Gift".to_string(),
                description: None,
                owner_id: None,
                expires_at: None,
                background_color: None,
                text_color: None,
                gift_kind: Some(RewardKind::Discount),
                discount_value: Some(10),
                image_url: None,
                coin_value: None,
                created_at: now,
                updated_at: now,
            },
            stages: Vec::new(),
            stamp_codes: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_insert_batch_rolls_back_on_duplicate_code() {
        let pool = test_pool().await;

        let batch = vec![gift_card("11111"), gift_card("11111")];
        let err = insert_batch(&pool, &batch).await.unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));

        // The first card must not survive the failed batch
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM card")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_try_claim_is_first_wins() {
        let pool = test_pool().await;
        let batch = vec![gift_card("22222")];
        let cards = insert_batch(&pool, &batch).await.unwrap();
        let id = cards[0].id;

        assert!(try_claim(&pool, id, "user-a").await.unwrap());
        assert!(!try_claim(&pool, id, "user-b").await.unwrap());

        let card = find_by_id(&pool, id).await.unwrap().unwrap();
        assert_eq!(card.owner_id.as_deref(), Some("user-a"));
    }

    #[tokio::test]
    async fn test_try_mark_used_consumes_once() {
        let pool = test_pool().await;
        let batch = vec![gift_card("33333")];
        let cards = insert_batch(&pool, &batch).await.unwrap();
        let id = cards[0].id;

        assert!(try_mark_used(&pool, id).await.unwrap());
        assert!(!try_mark_used(&pool, id).await.unwrap());

        let card = find_by_id(&pool, id).await.unwrap().unwrap();
        assert_eq!(card.status, CardStatus::Used);
    }
}
