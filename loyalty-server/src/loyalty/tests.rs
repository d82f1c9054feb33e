//! End-to-end service tests over an in-memory store

use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

use crate::loyalty::{CardApplication, CardRegistry, RedemptionEngine, StampLedger, WalletService};
use crate::utils::ErrorCode;
use shared::models::{
    AppliedEffect, Card, CardAction, CardBatchCreate, CardStatus, CardType, OrderDraft,
    RewardKind, StageInput, WalletPayRequest, WalletTxKind,
};
use shared::util::now_millis;

/// Single shared in-memory connection so every service sees the same data
async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    crate::db::MIGRATOR.run(&pool).await.unwrap();
    pool
}

struct TestEnv {
    registry: CardRegistry,
    ledger: StampLedger,
    engine: RedemptionEngine,
    checkout: CardApplication,
    wallet: WalletService,
}

async fn test_env() -> TestEnv {
    let pool = test_pool().await;
    TestEnv {
        registry: CardRegistry::new(pool.clone()),
        ledger: StampLedger::new(pool.clone()),
        engine: RedemptionEngine::new(pool.clone()),
        checkout: CardApplication::new(pool.clone()),
        wallet: WalletService::new(pool),
    }
}

fn stage(required: i64, reward: &str, kind: RewardKind, discount: Option<i64>) -> StageInput {
    StageInput {
        required,
        reward: reward.to_string(),
        reward_kind: kind,
        discount_value: discount,
    }
}

fn reward_create(stages: Vec<StageInput>) -> CardBatchCreate {
    CardBatchCreate {
        card_type: CardType::Reward,
        count: 1,
        title: "Coffee club".to_string(),
        description: None,
        expires_at: None,
        background_color: None,
        text_color: None,
        stages: Some(stages),
        gift_kind: None,
        discount_value: None,
        image_url: None,
        coin_value: None,
    }
}

fn gift_create(kind: RewardKind, discount: Option<i64>) -> CardBatchCreate {
    CardBatchCreate {
        card_type: CardType::Gift,
        count: 1,
        title: "Welcome gift".to_string(),
        description: None,
        expires_at: None,
        background_color: None,
        text_color: None,
        stages: None,
        gift_kind: Some(kind),
        discount_value: discount,
        image_url: None,
        coin_value: None,
    }
}

fn coins_create(value: i64) -> CardBatchCreate {
    CardBatchCreate {
        card_type: CardType::Coins,
        count: 1,
        title: "Coin pack".to_string(),
        description: None,
        expires_at: None,
        background_color: None,
        text_color: None,
        stages: None,
        gift_kind: None,
        discount_value: None,
        image_url: None,
        coin_value: Some(value),
    }
}

fn order(subtotal: f64) -> OrderDraft {
    OrderDraft {
        order_id: Some("order-1".to_string()),
        subtotal,
        items: vec![],
    }
}

async fn create_one(env: &TestEnv, payload: CardBatchCreate) -> Card {
    env.registry
        .create_cards(payload)
        .await
        .unwrap()
        .pop()
        .unwrap()
}

/// Activate the first `n` inactive stamp codes of a card
async fn activate_stamps(env: &TestEnv, card_id: i64, user: &str, n: usize) {
    let stamps = env.ledger.stamps(card_id).await.unwrap();
    let codes: Vec<String> = stamps
        .iter()
        .filter(|s| !s.is_active)
        .take(n)
        .map(|s| s.code.clone())
        .collect();
    assert_eq!(codes.len(), n, "not enough inactive stamps");
    for code in codes {
        env.ledger.activate(card_id, &code, user).await.unwrap();
    }
}

// ========== Creation ==========

#[tokio::test]
async fn test_create_reward_batch_codes_and_stamps() {
    let env = test_env().await;
    let mut payload = reward_create(vec![
        stage(3, "free espresso", RewardKind::Gift, None),
        stage(5, "free lunch", RewardKind::Gift, None),
    ]);
    payload.count = 3;

    let cards = env.registry.create_cards(payload).await.unwrap();
    assert_eq!(cards.len(), 3);

    let mut codes = std::collections::HashSet::new();
    for card in &cards {
        assert_eq!(card.status, CardStatus::Active);
        assert!(card.owner_id.is_none());
        assert_eq!(card.code.len(), 7);
        assert!(card.code.chars().all(|c| c.is_ascii_digit()));
        assert!(codes.insert(card.code.clone()), "card codes must be unique");

        // Stamp slots reach the highest threshold
        let stamps = env.ledger.stamps(card.id).await.unwrap();
        assert_eq!(stamps.len(), 5);
        assert!(stamps.iter().all(|s| !s.is_active));
    }
}

#[tokio::test]
async fn test_create_gift_and_coins_code_lengths() {
    let env = test_env().await;
    let gift = create_one(&env, gift_create(RewardKind::Discount, Some(20))).await;
    assert_eq!(gift.code.len(), 5);

    let coins = create_one(&env, coins_create(500)).await;
    assert_eq!(coins.code.len(), 6);
}

#[tokio::test]
async fn test_create_batch_invalid_stage_is_all_or_nothing() {
    let env = test_env().await;
    let mut payload = reward_create(vec![stage(0, "free burger", RewardKind::Gift, None)]);
    payload.count = 3;

    let err = env.registry.create_cards(payload).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidParameters);

    // Nothing persisted
    let cards = env.registry.list(None, None).await.unwrap();
    assert!(cards.is_empty());
}

#[tokio::test]
async fn test_create_rejects_non_increasing_thresholds() {
    let env = test_env().await;
    let payload = reward_create(vec![
        stage(5, "a", RewardKind::Gift, None),
        stage(5, "b", RewardKind::Gift, None),
    ]);
    let err = env.registry.create_cards(payload).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidParameters);
}

#[tokio::test]
async fn test_create_rejects_bad_discount_and_coins() {
    let env = test_env().await;

    let err = env
        .registry
        .create_cards(gift_create(RewardKind::Discount, None))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidParameters);

    let err = env
        .registry
        .create_cards(gift_create(RewardKind::Discount, Some(101)))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidParameters);

    let err = env.registry.create_cards(coins_create(0)).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidParameters);
}

#[tokio::test]
async fn test_create_rejects_past_expiry() {
    let env = test_env().await;
    let mut payload = gift_create(RewardKind::Gift, None);
    payload.expires_at = Some(now_millis() - 1_000);
    let err = env.registry.create_cards(payload).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidParameters);
}

// ========== Claiming ==========

#[tokio::test]
async fn test_claim_is_idempotent_for_same_user_only() {
    let env = test_env().await;
    let card = create_one(
        &env,
        reward_create(vec![stage(5, "free burger", RewardKind::Gift, None)]),
    )
    .await;

    let claimed = env.registry.claim_card(&card.code, "user-a").await.unwrap();
    assert_eq!(claimed.owner_id.as_deref(), Some("user-a"));

    // Same user: no-op success
    let again = env.registry.claim_card(&card.code, "user-a").await.unwrap();
    assert_eq!(again.owner_id.as_deref(), Some("user-a"));

    // Different user: rejected
    let err = env
        .registry
        .claim_card(&card.code, "user-b")
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::CardAlreadyOwned);
}

#[tokio::test]
async fn test_claim_unknown_code() {
    let env = test_env().await;
    let err = env
        .registry
        .claim_card("0000000", "user-a")
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::CardNotFound);
}

#[tokio::test]
async fn test_concurrent_claims_exactly_one_winner() {
    let env = test_env().await;
    let card = create_one(
        &env,
        reward_create(vec![stage(5, "free burger", RewardKind::Gift, None)]),
    )
    .await;

    let (a, b) = tokio::join!(
        env.registry.claim_card(&card.code, "user-a"),
        env.registry.claim_card(&card.code, "user-b"),
    );

    let winners = [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count();
    assert_eq!(winners, 1, "exactly one claim must win");
    let loser = if a.is_ok() { b } else { a };
    assert_eq!(loser.unwrap_err().code, ErrorCode::CardAlreadyOwned);
}

// ========== Stamps ==========

#[tokio::test]
async fn test_stamp_activation_requires_ownership() {
    let env = test_env().await;
    let card = create_one(
        &env,
        reward_create(vec![stage(5, "free burger", RewardKind::Gift, None)]),
    )
    .await;
    let code = env.ledger.stamps(card.id).await.unwrap()[0].code.clone();

    // Unclaimed card
    let err = env
        .ledger
        .activate(card.id, &code, "user-a")
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::CardNotOwned);

    // Claimed by someone else
    env.registry.claim_card(&card.code, "user-a").await.unwrap();
    let err = env
        .ledger
        .activate(card.id, &code, "user-b")
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::CardNotOwned);
}

#[tokio::test]
async fn test_stamp_codes_are_single_use() {
    let env = test_env().await;
    let card = create_one(
        &env,
        reward_create(vec![stage(5, "free burger", RewardKind::Gift, None)]),
    )
    .await;
    env.registry.claim_card(&card.code, "user-a").await.unwrap();

    let code = env.ledger.stamps(card.id).await.unwrap()[0].code.clone();
    let activated = env.ledger.activate(card.id, &code, "user-a").await.unwrap();
    assert!(activated.is_active);
    assert_eq!(activated.activated_by.as_deref(), Some("user-a"));

    // No silent no-op on reuse; activated_by stays
    let err = env
        .ledger
        .activate(card.id, &code, "user-a")
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::StampAlreadyActivated);
    let stamps = env.ledger.stamps(card.id).await.unwrap();
    assert_eq!(stamps[0].activated_by.as_deref(), Some("user-a"));
}

#[tokio::test]
async fn test_stamp_unknown_code() {
    let env = test_env().await;
    let card = create_one(
        &env,
        reward_create(vec![stage(5, "free burger", RewardKind::Gift, None)]),
    )
    .await;
    env.registry.claim_card(&card.code, "user-a").await.unwrap();

    let err = env
        .ledger
        .activate(card.id, "nope", "user-a")
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::StampNotFound);
}

#[tokio::test]
async fn test_active_count_bounded_by_stamp_set() {
    let env = test_env().await;
    let card = create_one(
        &env,
        reward_create(vec![stage(3, "free espresso", RewardKind::Gift, None)]),
    )
    .await;
    env.registry.claim_card(&card.code, "user-a").await.unwrap();
    activate_stamps(&env, card.id, "user-a", 3).await;

    assert_eq!(env.ledger.active_count(card.id).await.unwrap(), 3);
    assert_eq!(env.ledger.stamps(card.id).await.unwrap().len(), 3);
    assert!(env.ledger.next_code(card.id).await.unwrap().is_none());
}

// ========== Redemption ==========

#[tokio::test]
async fn test_single_stage_redeem_once() {
    let env = test_env().await;
    let card = create_one(
        &env,
        reward_create(vec![stage(5, "free burger", RewardKind::Gift, None)]),
    )
    .await;
    env.registry.claim_card(&card.code, "user-a").await.unwrap();
    activate_stamps(&env, card.id, "user-a", 5).await;

    let progress = env
        .engine
        .progress(&env.registry.find_by_id(card.id).await.unwrap())
        .await
        .unwrap();
    assert_eq!(progress.active_stamps, 5);
    assert_eq!(progress.eligible_stage, Some(0));

    let result = env.engine.redeem(card.id, 0, "user-a").await.unwrap();
    assert_eq!(result.reward, "free burger");
    assert_eq!(result.reward_kind, RewardKind::Gift);

    // Exactly once
    let err = env.engine.redeem(card.id, 0, "user-a").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::StageAlreadyRedeemed);

    // Last stage redeemed consumes the card
    let card = env.registry.find_by_id(card.id).await.unwrap();
    assert_eq!(card.status, CardStatus::Used);
}

#[tokio::test]
async fn test_redeem_below_threshold() {
    let env = test_env().await;
    let card = create_one(
        &env,
        reward_create(vec![stage(5, "free burger", RewardKind::Gift, None)]),
    )
    .await;
    env.registry.claim_card(&card.code, "user-a").await.unwrap();
    activate_stamps(&env, card.id, "user-a", 4).await;

    let err = env.engine.redeem(card.id, 0, "user-a").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::StageNotEligible);
}

#[tokio::test]
async fn test_redeem_requires_ownership_and_known_stage() {
    let env = test_env().await;
    let card = create_one(
        &env,
        reward_create(vec![stage(2, "free espresso", RewardKind::Gift, None)]),
    )
    .await;
    env.registry.claim_card(&card.code, "user-a").await.unwrap();
    activate_stamps(&env, card.id, "user-a", 2).await;

    let err = env.engine.redeem(card.id, 0, "user-b").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::CardNotOwned);

    let err = env.engine.redeem(card.id, 7, "user-a").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::StageNotFound);
}

#[tokio::test]
async fn test_multi_stage_cumulative_progression() {
    let env = test_env().await;
    let card = create_one(
        &env,
        reward_create(vec![
            stage(3, "free espresso", RewardKind::Gift, None),
            stage(5, "20% off", RewardKind::Discount, Some(20)),
        ]),
    )
    .await;
    env.registry.claim_card(&card.code, "user-a").await.unwrap();

    activate_stamps(&env, card.id, "user-a", 3).await;
    let found = env.registry.find_by_id(card.id).await.unwrap();
    assert_eq!(
        env.engine.progress(&found).await.unwrap().eligible_stage,
        Some(0)
    );
    env.engine.redeem(card.id, 0, "user-a").await.unwrap();

    // Card stays active while stages remain
    let found = env.registry.find_by_id(card.id).await.unwrap();
    assert_eq!(found.status, CardStatus::Active);

    // Thresholds are cumulative: two more stamps reach the second stage
    activate_stamps(&env, card.id, "user-a", 2).await;
    let found = env.registry.find_by_id(card.id).await.unwrap();
    assert_eq!(
        env.engine.progress(&found).await.unwrap().eligible_stage,
        Some(1)
    );
    let result = env.engine.redeem(card.id, 1, "user-a").await.unwrap();
    assert_eq!(result.discount_value, Some(20));

    let found = env.registry.find_by_id(card.id).await.unwrap();
    assert_eq!(found.status, CardStatus::Used);
    let progress = env.engine.progress(&found).await.unwrap();
    assert_eq!(progress.eligible_stage, None);
    assert!(progress.stages.iter().all(|s| s.redeemed));
}

#[tokio::test]
async fn test_eligible_stage_is_highest_satisfied() {
    let env = test_env().await;
    let card = create_one(
        &env,
        reward_create(vec![
            stage(3, "free espresso", RewardKind::Gift, None),
            stage(5, "free lunch", RewardKind::Gift, None),
        ]),
    )
    .await;
    env.registry.claim_card(&card.code, "user-a").await.unwrap();
    activate_stamps(&env, card.id, "user-a", 5).await;

    let found = env.registry.find_by_id(card.id).await.unwrap();
    let progress = env.engine.progress(&found).await.unwrap();
    assert_eq!(progress.eligible_stage, Some(1));
    assert!(progress.stages[0].ready && progress.stages[1].ready);
}

// ========== Checkout application ==========

#[tokio::test]
async fn test_apply_gift_discount_once() {
    let env = test_env().await;
    let card = create_one(&env, gift_create(RewardKind::Discount, Some(20))).await;

    let effect = env
        .checkout
        .apply_card(&order(100.0), &card.code, "user-a", CardAction::UseGift)
        .await
        .unwrap();
    assert_eq!(
        effect,
        AppliedEffect::Discount {
            card_id: card.id,
            percent: 20,
            amount: 20.0,
            total: 80.0,
        }
    );

    let found = env.registry.find_by_id(card.id).await.unwrap();
    assert_eq!(found.status, CardStatus::Used);

    let err = env
        .checkout
        .apply_card(&order(100.0), &card.code, "user-a", CardAction::UseGift)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::CardAlreadyUsed);
}

#[tokio::test]
async fn test_apply_gift_free_item() {
    let env = test_env().await;
    let card = create_one(&env, gift_create(RewardKind::Gift, None)).await;

    let effect = env
        .checkout
        .apply_card(&order(30.0), &card.code, "user-a", CardAction::UseGift)
        .await
        .unwrap();
    assert_eq!(
        effect,
        AppliedEffect::FreeItem {
            card_id: card.id,
            description: "Welcome gift".to_string(),
        }
    );
}

#[tokio::test]
async fn test_coins_activation_credits_wallet_once() {
    let env = test_env().await;
    let card = create_one(&env, coins_create(500)).await;

    let claimed = env.registry.claim_card(&card.code, "user-a").await.unwrap();
    assert_eq!(claimed.status, CardStatus::Used);

    let balance = env.wallet.balance("user-a").await.unwrap();
    assert_eq!(balance.balance, 500);

    let transactions = env.wallet.transactions("user-a").await.unwrap();
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0].amount, 500);
    assert_eq!(transactions[0].kind, WalletTxKind::CardCredit);
    assert_eq!(transactions[0].card_id, Some(card.id));

    // Re-activation fails and does not double-credit
    let err = env
        .registry
        .claim_card(&card.code, "user-a")
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::CardAlreadyUsed);
    assert_eq!(env.wallet.balance("user-a").await.unwrap().balance, 500);

    let err = env
        .registry
        .claim_card(&card.code, "user-b")
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::CardAlreadyOwned);
}

#[tokio::test]
async fn test_apply_coins_at_checkout() {
    let env = test_env().await;
    let card = create_one(&env, coins_create(250)).await;

    let effect = env
        .checkout
        .apply_card(&order(10.0), &card.code, "user-a", CardAction::UseCoins)
        .await
        .unwrap();
    assert_eq!(
        effect,
        AppliedEffect::CoinsCredit {
            card_id: card.id,
            amount: 250,
            balance: 250,
        }
    );

    let err = env
        .checkout
        .apply_card(&order(10.0), &card.code, "user-a", CardAction::UseCoins)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::CardAlreadyUsed);
}

#[tokio::test]
async fn test_apply_wrong_action_for_type() {
    let env = test_env().await;
    let gift = create_one(&env, gift_create(RewardKind::Discount, Some(10))).await;
    let reward = create_one(
        &env,
        reward_create(vec![stage(5, "free burger", RewardKind::Gift, None)]),
    )
    .await;

    let err = env
        .checkout
        .apply_card(&order(10.0), &gift.code, "user-a", CardAction::Redeem)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::CardNotApplicable);

    let err = env
        .checkout
        .apply_card(&order(10.0), &reward.code, "user-a", CardAction::UseGift)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::CardNotApplicable);
}

#[tokio::test]
async fn test_apply_collect_hands_out_codes_in_order() {
    let env = test_env().await;
    let card = create_one(
        &env,
        reward_create(vec![stage(3, "free espresso", RewardKind::Gift, None)]),
    )
    .await;

    // Collect claims the card for the caller as a side effect
    let effect = env
        .checkout
        .apply_card(&order(12.0), &card.code, "user-a", CardAction::Collect)
        .await
        .unwrap();
    let AppliedEffect::StampCode { code, .. } = effect else {
        panic!("expected stamp code effect");
    };

    env.ledger.activate(card.id, &code, "user-a").await.unwrap();
    assert_eq!(env.ledger.active_count(card.id).await.unwrap(), 1);

    // Next collect hands out a different code
    let effect = env
        .checkout
        .apply_card(&order(12.0), &card.code, "user-a", CardAction::Collect)
        .await
        .unwrap();
    let AppliedEffect::StampCode { code: next, .. } = effect else {
        panic!("expected stamp code effect");
    };
    assert_ne!(code, next);
}

#[tokio::test]
async fn test_apply_redeem_needs_eligible_stage() {
    let env = test_env().await;
    let card = create_one(
        &env,
        reward_create(vec![stage(5, "free burger", RewardKind::Gift, None)]),
    )
    .await;
    env.registry.claim_card(&card.code, "user-a").await.unwrap();

    let err = env
        .checkout
        .apply_card(&order(10.0), &card.code, "user-a", CardAction::Redeem)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InsufficientStamps);
}

#[tokio::test]
async fn test_apply_redeem_folds_reward_into_order() {
    let env = test_env().await;
    let card = create_one(
        &env,
        reward_create(vec![stage(2, "25% off", RewardKind::Discount, Some(25))]),
    )
    .await;
    env.registry.claim_card(&card.code, "user-a").await.unwrap();
    activate_stamps(&env, card.id, "user-a", 2).await;

    let effect = env
        .checkout
        .apply_card(&order(40.0), &card.code, "user-a", CardAction::Redeem)
        .await
        .unwrap();
    assert_eq!(
        effect,
        AppliedEffect::Discount {
            card_id: card.id,
            percent: 25,
            amount: 10.0,
            total: 30.0,
        }
    );
}

// ========== Expiry and lifecycle ==========

#[tokio::test]
async fn test_expired_card_blocks_every_mutation() {
    let env = test_env().await;
    let mut payload = reward_create(vec![stage(2, "free espresso", RewardKind::Gift, None)]);
    payload.expires_at = Some(now_millis() + 500);
    let card = create_one(&env, payload).await;

    env.registry.claim_card(&card.code, "user-a").await.unwrap();
    let code = env.ledger.stamps(card.id).await.unwrap()[0].code.clone();

    // Stored status still says ACTIVE after the expiry passes; every
    // operation must treat the card as expired anyway.
    tokio::time::sleep(std::time::Duration::from_millis(700)).await;

    let err = env
        .registry
        .claim_card(&card.code, "user-b")
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::CardExpired);

    let err = env
        .ledger
        .activate(card.id, &code, "user-a")
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::CardExpired);

    let err = env.engine.redeem(card.id, 0, "user-a").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::CardExpired);

    let err = env
        .checkout
        .apply_card(&order(10.0), &card.code, "user-a", CardAction::Collect)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::CardExpired);
}

#[tokio::test]
async fn test_deactivate_is_terminal_and_idempotent() {
    let env = test_env().await;
    let card = create_one(&env, gift_create(RewardKind::Gift, None)).await;

    env.registry.deactivate(card.id).await.unwrap();
    let found = env.registry.find_by_id(card.id).await.unwrap();
    assert_eq!(found.status, CardStatus::Expired);

    let err = env
        .registry
        .claim_card(&card.code, "user-a")
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::CardExpired);

    // No-op on a terminal card
    env.registry.deactivate(card.id).await.unwrap();

    let err = env.registry.deactivate(9999).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);
}

#[tokio::test]
async fn test_delete_removes_card() {
    let env = test_env().await;
    let card = create_one(&env, gift_create(RewardKind::Gift, None)).await;

    env.registry.delete(card.id).await.unwrap();
    let err = env.registry.find_by_code(&card.code).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::CardNotFound);

    let err = env.registry.delete(card.id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);
}

// ========== Wallet ==========

#[tokio::test]
async fn test_wallet_pay_guards_balance() {
    let env = test_env().await;
    let card = create_one(&env, coins_create(500)).await;
    env.registry.claim_card(&card.code, "user-a").await.unwrap();

    let balance = env
        .wallet
        .pay(
            "user-a",
            WalletPayRequest {
                amount: 200,
                order_id: Some("order-9".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(balance.balance, 300);

    let err = env
        .wallet
        .pay(
            "user-a",
            WalletPayRequest {
                amount: 400,
                order_id: None,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::WalletInsufficientBalance);

    let transactions = env.wallet.transactions("user-a").await.unwrap();
    assert_eq!(transactions.len(), 2);
    assert_eq!(transactions.iter().map(|t| t.amount).sum::<i64>(), 300);
}

#[tokio::test]
async fn test_wallet_pay_rejects_non_positive() {
    let env = test_env().await;
    let err = env
        .wallet
        .pay(
            "user-a",
            WalletPayRequest {
                amount: 0,
                order_id: None,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidParameters);
}

#[tokio::test]
async fn test_wallet_empty_balance() {
    let env = test_env().await;
    assert_eq!(env.wallet.balance("nobody").await.unwrap().balance, 0);
    assert!(env.wallet.transactions("nobody").await.unwrap().is_empty());
}
