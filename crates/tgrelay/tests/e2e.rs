// SPDX-FileCopyrightText: 2026 Tgrelay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end scenario tests for the complete forwarding pipeline: admin
//! RPC -> store -> index reload -> dispatcher/backfill -> outbound client.
//!
//! Each test runs on a paused clock with an isolated temp database and a
//! scripted mock client, so minute-scale pacing elapses instantly and every
//! scenario is order-insensitive.

use std::time::Duration;

use serde_json::{Value, json};

use tgrelay_core::UpdateHandler;
use tgrelay_rpc::envelope::RpcRequest;
use tgrelay_rpc::{RpcHandler, admin_handler};
use tgrelay_storage::queries::{logs, rules};
use tgrelay_test_utils::{
    EngineHarness, channel_message, settle, single, wait_for_forwards, wait_until_logged,
};

const SRC: i64 = 100;
const DST: i64 = 200;

async fn setup() -> (EngineHarness, RpcHandler) {
    let h = EngineHarness::new().await;
    let handler = admin_handler(h.db.clone(), h.engine.clone());
    (h, handler)
}

async fn rpc_create(handler: &RpcHandler, source: i64, target: i64, pattern: &str) -> i64 {
    let response = handler
        .dispatch(RpcRequest {
            jsonrpc: "2.0".to_string(),
            method: "rules.create".to_string(),
            params: json!({
                "source_channel_id": source,
                "source_name": "src",
                "source_hash": source,
                "target_channel_id": target,
                "target_name": "dst",
                "target_hash": target,
                "match_pattern": pattern,
            }),
            id: json!(1),
        })
        .await;
    let result = response.result.expect("rules.create should succeed");
    result["id"].as_i64().expect("rule id")
}

async fn rpc_call(handler: &RpcHandler, method: &str, params: Value) -> Value {
    let response = handler
        .dispatch(RpcRequest {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
            id: json!(1),
        })
        .await;
    response
        .result
        .unwrap_or_else(|| panic!("{method} failed: {:?}", response.error))
}

// ---- Scenario 1: exact dedup ----

#[tokio::test(start_paused = true)]
async fn duplicate_update_forwards_exactly_once() {
    let (h, handler) = setup().await;
    let rule_id = rpc_create(&handler, SRC, DST, "ALERT:.*").await;

    let msg = channel_message(77, SRC, "ALERT: x");
    h.engine.handle(single(msg.clone())).await.unwrap();
    wait_for_forwards(&h.api, 1).await;
    wait_until_logged(&h.db, rule_id, 77).await;

    // The same update delivered again is absorbed by the durable log.
    h.engine.handle(single(msg)).await.unwrap();
    settle().await;

    assert_eq!(h.api.forward_count().await, 1);
    let forward = &h.api.forwards().await[0];
    assert_eq!(forward.request.from_peer.channel_id, SRC);
    assert_eq!(forward.request.to_peer.channel_id, DST);
    assert_eq!(forward.request.ids, vec![77]);
    assert_eq!(logs::count_for_rule(&h.db, rule_id).await.unwrap(), 1);
}

// ---- Scenario 2: rate-limit drop ----

#[tokio::test(start_paused = true)]
async fn second_message_within_the_minute_is_dropped() {
    let (h, handler) = setup().await;
    let rule_id = rpc_create(&handler, SRC, DST, ".*").await;

    h.engine
        .handle(single(channel_message(1, SRC, "first")))
        .await
        .unwrap();
    wait_until_logged(&h.db, rule_id, 1).await;

    tokio::time::sleep(Duration::from_secs(30)).await;
    h.engine
        .handle(single(channel_message(2, SRC, "second")))
        .await
        .unwrap();
    settle().await;

    // Dropped, not deferred: no forward and no log row for message 2.
    assert_eq!(h.api.forward_count().await, 1);
    assert!(!logs::exists(&h.db, rule_id, 2).await.unwrap());

    // Once the window reopens the message goes through on redelivery.
    tokio::time::sleep(Duration::from_secs(31)).await;
    h.engine
        .handle(single(channel_message(2, SRC, "second")))
        .await
        .unwrap();
    wait_until_logged(&h.db, rule_id, 2).await;
    assert_eq!(h.api.forward_count().await, 2);
}

// ---- Scenario 3: backfill pacing ----

#[tokio::test(start_paused = true)]
async fn backfill_forwards_history_chronologically_one_per_minute() {
    let (h, handler) = setup().await;

    // Three matching historical messages, newest first as the API returns
    // them.
    h.api
        .set_history(
            SRC,
            vec![
                channel_message(30, SRC, "ALERT: third"),
                channel_message(20, SRC, "ALERT: second"),
                channel_message(10, SRC, "ALERT: first"),
            ],
        )
        .await;

    let rule_id = rpc_create(&handler, SRC, DST, "ALERT:.*").await;
    wait_for_forwards(&h.api, 3).await;

    let forwards = h.api.forwards().await;
    let ids: Vec<Vec<i32>> = forwards.iter().map(|f| f.request.ids.clone()).collect();
    assert_eq!(ids, vec![vec![10], vec![20], vec![30]], "oldest first");

    for pair in forwards.windows(2) {
        let gap = pair[1].at.duration_since(pair[0].at);
        assert!(
            gap >= Duration::from_secs(60),
            "backfill forwards only {gap:?} apart"
        );
    }

    assert_eq!(logs::count_for_rule(&h.db, rule_id).await.unwrap(), 3);
}

// ---- Scenario 4: backfill/realtime race ----

#[tokio::test(start_paused = true)]
async fn live_and_backfilled_copies_of_a_message_forward_once() {
    let (h, handler) = setup().await;

    // The live copy arrives first (through a pre-existing rule), then a
    // rule recreation backfills history containing the same message.
    let rule_id = rpc_create(&handler, SRC, DST, "ALERT:.*").await;
    h.engine
        .handle(single(channel_message(10, SRC, "ALERT: both paths")))
        .await
        .unwrap();
    wait_until_logged(&h.db, rule_id, 10).await;

    h.api
        .set_history(SRC, vec![channel_message(10, SRC, "ALERT: both paths")])
        .await;
    let rule = rules::get(&h.db, rule_id).await.unwrap().unwrap();
    h.engine.run_backfill(rule).await;

    assert_eq!(h.api.forward_count().await, 1);
    assert_eq!(logs::count_for_rule(&h.db, rule_id).await.unwrap(), 1);
}

// ---- Scenario 5: reload on delete ----

#[tokio::test(start_paused = true)]
async fn deleted_rule_stops_matching_after_reload() {
    let (h, handler) = setup().await;
    let r1 = rpc_create(&handler, SRC, DST, ".*").await;
    let r2 = rpc_create(&handler, SRC, 300, ".*").await;

    h.engine
        .handle(single(channel_message(5, SRC, "both match")))
        .await
        .unwrap();
    wait_until_logged(&h.db, r1, 5).await;
    wait_until_logged(&h.db, r2, 5).await;
    assert_eq!(h.api.forward_count().await, 2);

    let result = rpc_call(&handler, "rules.delete", json!({"id": r1})).await;
    assert_eq!(result["deleted"], true);

    // Identical message after the reload: only the surviving rule forwards.
    h.engine
        .handle(single(channel_message(6, SRC, "both match")))
        .await
        .unwrap();
    wait_until_logged(&h.db, r2, 6).await;
    settle().await;

    assert_eq!(h.api.forward_count().await, 3);
    let third = &h.api.forwards().await[2];
    assert_eq!(third.request.to_peer.channel_id, 300);
    assert!(!logs::exists(&h.db, r1, 6).await.unwrap());
}

// ---- Scenario 6: bad regex survives reload ----

#[tokio::test(start_paused = true)]
async fn uncompilable_pattern_skips_one_rule_not_the_reload() {
    let (h, handler) = setup().await;

    // A row edited behind the API's back, bypassing create/update validation.
    let broken = rules::create(
        &h.db,
        tgrelay_storage::NewForwardRule {
            source_channel_id: SRC,
            source_name: "broken".to_string(),
            source_hash: 0,
            target_channel_id: DST,
            target_name: "dst".to_string(),
            target_hash: 0,
            match_pattern: "[".to_string(),
            enabled: true,
        },
    )
    .await
    .unwrap();

    let good = rpc_create(&handler, SRC, 300, ".*").await;

    let active = h.engine.reload_rules().await.unwrap();
    assert_eq!(active, 1, "broken rule skipped, good rule loaded");

    h.engine
        .handle(single(channel_message(8, SRC, "anything")))
        .await
        .unwrap();
    wait_until_logged(&h.db, good, 8).await;
    settle().await;

    assert_eq!(h.api.forward_count().await, 1);
    assert!(!logs::exists(&h.db, broken.id, 8).await.unwrap());
}
