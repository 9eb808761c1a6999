// SPDX-FileCopyrightText: 2026 Tgrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Behavioral tests for the dispatcher, forward worker, and backfill runner.
//!
//! Each test runs on a paused clock against an isolated harness (temp
//! SQLite + mock client), so the 60-second pacing windows elapse instantly.

use tgrelay_core::{Peer, TelegramUpdate, UpdateHandler, UpdatesEnvelope};
use tgrelay_storage::queries::logs;
use tgrelay_storage::{LogInsert, NewForwardLog};
use tgrelay_test_utils::{
    EngineHarness, batch, channel_message, settle, single, wait_for_forwards, wait_until_logged,
};

const SRC: i64 = 100;
const DST: i64 = 200;

// ---- Dispatcher filtering ----

#[tokio::test(start_paused = true)]
async fn non_channel_peers_are_ignored() {
    let h = EngineHarness::new().await;
    h.create_rule(SRC, DST, ".*").await;

    let mut msg = channel_message(1, SRC, "hello");
    msg.peer = Peer::User { user_id: SRC };
    h.engine.handle(single(msg)).await.unwrap();

    let mut msg = channel_message(2, SRC, "hello");
    msg.peer = Peer::Chat { chat_id: SRC };
    h.engine.handle(single(msg)).await.unwrap();

    settle().await;
    assert_eq!(h.api.forward_count().await, 0);
}

#[tokio::test(start_paused = true)]
async fn empty_text_never_forwards() {
    let h = EngineHarness::new().await;
    h.create_rule(SRC, DST, ".*").await;

    h.engine
        .handle(single(channel_message(1, SRC, "")))
        .await
        .unwrap();

    settle().await;
    assert_eq!(h.api.forward_count().await, 0);
}

#[tokio::test(start_paused = true)]
async fn unrecognized_updates_are_ignored() {
    let h = EngineHarness::new().await;
    h.create_rule(SRC, DST, ".*").await;

    h.engine
        .handle(UpdatesEnvelope::Single(TelegramUpdate::Other))
        .await
        .unwrap();
    h.engine
        .handle(UpdatesEnvelope::Batch(vec![
            TelegramUpdate::Other,
            TelegramUpdate::NewChannelMessage(channel_message(1, SRC, "hit")),
            TelegramUpdate::Other,
        ]))
        .await
        .unwrap();

    wait_for_forwards(&h.api, 1).await;
    assert_eq!(h.api.forward_count().await, 1);
}

#[tokio::test(start_paused = true)]
async fn pattern_must_match_message_text() {
    let h = EngineHarness::new().await;
    let rule = h.create_rule(SRC, DST, "^ALERT:").await;

    h.engine
        .handle(single(channel_message(1, SRC, "routine update")))
        .await
        .unwrap();
    h.engine
        .handle(single(channel_message(2, SRC, "ALERT: fire")))
        .await
        .unwrap();

    wait_for_forwards(&h.api, 1).await;
    let forwards = h.api.forwards().await;
    assert_eq!(forwards.len(), 1);
    assert_eq!(forwards[0].request.ids, vec![2]);
    assert_eq!(forwards[0].request.from_peer.channel_id, SRC);
    assert_eq!(forwards[0].request.to_peer.channel_id, DST);

    wait_until_logged(&h.db, rule.id, 2).await;
    assert!(!logs::exists(&h.db, rule.id, 1).await.unwrap());
}

#[tokio::test(start_paused = true)]
async fn messages_for_other_channels_do_not_match() {
    let h = EngineHarness::new().await;
    h.create_rule(SRC, DST, ".*").await;

    h.engine
        .handle(single(channel_message(1, 999, "hello")))
        .await
        .unwrap();

    settle().await;
    assert_eq!(h.api.forward_count().await, 0);
}

#[tokio::test(start_paused = true)]
async fn batch_envelope_dispatches_in_order() {
    let h = EngineHarness::new().await;
    let rule_a = h.create_rule(SRC, DST, ".*").await;
    let rule_b = h.create_rule(300, 400, ".*").await;

    h.engine
        .handle(batch(vec![
            channel_message(1, SRC, "one"),
            channel_message(2, 300, "two"),
        ]))
        .await
        .unwrap();

    wait_for_forwards(&h.api, 2).await;
    wait_until_logged(&h.db, rule_a.id, 1).await;
    wait_until_logged(&h.db, rule_b.id, 2).await;
}

// ---- Lifecycle interactions ----

#[tokio::test(start_paused = true)]
async fn no_forward_starts_after_shutdown() {
    let h = EngineHarness::new().await;
    h.create_rule(SRC, DST, ".*").await;

    h.cancel.cancel();
    h.engine
        .handle(single(channel_message(1, SRC, "late")))
        .await
        .unwrap();

    settle().await;
    assert_eq!(h.api.forward_count().await, 0);
}

#[tokio::test(start_paused = true)]
async fn unwired_client_is_a_recoverable_skip() {
    let h = EngineHarness::new_unwired().await;
    let rule = h.create_rule(SRC, DST, ".*").await;

    // Dispatch survives without a client: no panic, no log row.
    h.engine
        .handle(single(channel_message(1, SRC, "early")))
        .await
        .unwrap();
    settle().await;
    assert!(!logs::exists(&h.db, rule.id, 1).await.unwrap());

    // Once wired, the same message goes through on the next update.
    h.engine.lifecycle().wire(h.api.clone());
    h.engine
        .handle(single(channel_message(1, SRC, "early")))
        .await
        .unwrap();
    wait_for_forwards(&h.api, 1).await;
}

// ---- Forward worker ----

#[tokio::test(start_paused = true)]
async fn outbound_failure_leaves_message_retryable() {
    let h = EngineHarness::new().await;
    let rule = h.create_rule(SRC, DST, ".*").await;

    h.api.set_fail_forwards(true);
    h.engine
        .handle(single(channel_message(7, SRC, "flaky")))
        .await
        .unwrap();
    settle().await;

    // Failed forward: no log row, no rate-limit advance.
    assert_eq!(h.api.forward_count().await, 0);
    assert!(!logs::exists(&h.db, rule.id, 7).await.unwrap());
    assert!(h.engine.index().time_until_allowed(rule.id).is_none());

    // The retry on the next matching update succeeds immediately.
    h.api.set_fail_forwards(false);
    h.engine
        .handle(single(channel_message(7, SRC, "flaky")))
        .await
        .unwrap();
    wait_for_forwards(&h.api, 1).await;
    wait_until_logged(&h.db, rule.id, 7).await;
}

#[tokio::test(start_paused = true)]
async fn duplicate_log_insert_is_benign() {
    let h = EngineHarness::new().await;
    let rule = h.create_rule(SRC, DST, ".*").await;

    // Another path already recorded the forward.
    let outcome = logs::insert(
        &h.db,
        NewForwardLog {
            rule_id: rule.id,
            message_id: 10,
            source_channel_id: SRC,
            target_channel_id: DST,
        },
    )
    .await
    .unwrap();
    assert_eq!(outcome, LogInsert::Inserted);

    // The worker still completes: one outbound call, the unique violation is
    // swallowed, and the rate-limit clock advances.
    h.engine.forward_now(&rule, 10).await;
    assert_eq!(h.api.forward_count().await, 1);
    assert_eq!(logs::count_for_rule(&h.db, rule.id).await.unwrap(), 1);
    assert!(h.engine.index().time_until_allowed(rule.id).is_some());
}

#[tokio::test(start_paused = true)]
async fn forward_nonces_are_fresh_per_call() {
    let h = EngineHarness::new().await;
    let rule_a = h.create_rule(SRC, DST, ".*").await;
    let rule_b = h.create_rule(SRC, 300, ".*").await;

    // Two rules forwarding the same message must not share a nonce.
    h.engine.forward_now(&rule_a, 5).await;
    h.engine.forward_now(&rule_b, 5).await;

    let forwards = h.api.forwards().await;
    assert_eq!(forwards.len(), 2);
    assert_eq!(forwards[0].request.random_ids.len(), 1);
    assert_eq!(forwards[1].request.random_ids.len(), 1);
    assert_ne!(
        forwards[0].request.random_ids[0],
        forwards[1].request.random_ids[0]
    );
}

// ---- Backfill runner ----

#[tokio::test(start_paused = true)]
async fn backfill_forwards_history_oldest_first() {
    let h = EngineHarness::new().await;
    let rule = h.create_rule(SRC, DST, "deploy").await;

    // Newest first, as the API returns history.
    h.api
        .set_history(
            SRC,
            vec![
                channel_message(30, SRC, "deploy v3"),
                channel_message(20, SRC, "lunch menu"),
                channel_message(10, SRC, "deploy v1"),
            ],
        )
        .await;

    h.engine.run_backfill(rule.clone()).await;

    let forwards = h.api.forwards().await;
    let ids: Vec<Vec<i32>> = forwards.iter().map(|f| f.request.ids.clone()).collect();
    assert_eq!(ids, vec![vec![10], vec![30]]);
    assert!(logs::exists(&h.db, rule.id, 10).await.unwrap());
    assert!(logs::exists(&h.db, rule.id, 30).await.unwrap());
    assert!(!logs::exists(&h.db, rule.id, 20).await.unwrap());
}

#[tokio::test(start_paused = true)]
async fn backfill_skips_already_logged_messages() {
    let h = EngineHarness::new().await;
    let rule = h.create_rule(SRC, DST, ".*").await;

    logs::insert(
        &h.db,
        NewForwardLog {
            rule_id: rule.id,
            message_id: 10,
            source_channel_id: SRC,
            target_channel_id: DST,
        },
    )
    .await
    .unwrap();

    h.api
        .set_history(
            SRC,
            vec![
                channel_message(20, SRC, "new"),
                channel_message(10, SRC, "old"),
            ],
        )
        .await;

    h.engine.run_backfill(rule.clone()).await;

    let forwards = h.api.forwards().await;
    assert_eq!(forwards.len(), 1);
    assert_eq!(forwards[0].request.ids, vec![20]);
}

#[tokio::test(start_paused = true)]
async fn backfill_aborts_on_history_failure() {
    let h = EngineHarness::new().await;
    let rule = h.create_rule(SRC, DST, ".*").await;

    h.api.set_fail_history(true);
    h.api
        .set_history(SRC, vec![channel_message(1, SRC, "unseen")])
        .await;

    h.engine.run_backfill(rule).await;
    assert_eq!(h.api.forward_count().await, 0);
}

#[tokio::test(start_paused = true)]
async fn backfill_stops_at_cancellation_between_ticks() {
    let h = EngineHarness::new().await;
    let rule = h.create_rule(SRC, DST, ".*").await;

    h.api
        .set_history(
            SRC,
            vec![
                channel_message(3, SRC, "c"),
                channel_message(2, SRC, "b"),
                channel_message(1, SRC, "a"),
            ],
        )
        .await;

    h.engine.spawn_backfill(rule.clone());
    wait_for_forwards(&h.api, 1).await;

    // Cancel while the runner waits out the 60s budget for message 2.
    h.cancel.cancel();
    settle().await;

    assert_eq!(h.api.forward_count().await, 1);
    assert!(logs::exists(&h.db, rule.id, 1).await.unwrap());
    assert!(!logs::exists(&h.db, rule.id, 2).await.unwrap());
}

#[tokio::test(start_paused = true)]
async fn backfill_considers_at_most_fifty_messages() {
    let h = EngineHarness::new().await;
    let rule = h.create_rule(SRC, DST, "OLD").await;

    // Newest 50 messages carry noise; the only matches sit beyond the fetch
    // window and must never be considered.
    let mut history = Vec::new();
    for id in (11..=60).rev() {
        history.push(channel_message(id, SRC, "noise"));
    }
    for id in (1..=10).rev() {
        history.push(channel_message(id, SRC, "OLD alert"));
    }
    h.api.set_history(SRC, history).await;

    h.engine.run_backfill(rule.clone()).await;

    assert_eq!(h.api.forward_count().await, 0);
    assert_eq!(logs::count_for_rule(&h.db, rule.id).await.unwrap(), 0);
}

#[tokio::test(start_paused = true)]
async fn backfill_paces_one_minute_between_forwards() {
    let h = EngineHarness::new().await;
    let rule = h.create_rule(SRC, DST, ".*").await;

    h.api
        .set_history(
            SRC,
            vec![
                channel_message(3, SRC, "three"),
                channel_message(2, SRC, "two"),
                channel_message(1, SRC, "one"),
            ],
        )
        .await;

    h.engine.spawn_backfill(rule);
    wait_for_forwards(&h.api, 3).await;

    let forwards = h.api.forwards().await;
    assert_eq!(forwards.len(), 3);
    for pair in forwards.windows(2) {
        let gap = pair[1].at.duration_since(pair[0].at);
        assert!(
            gap >= std::time::Duration::from_secs(60),
            "forwards only {gap:?} apart"
        );
    }
}
