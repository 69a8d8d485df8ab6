//! End-to-end lifecycle tests for the mint manager against gateway doubles.

use alloy::primitives::U256;
use std::time::Duration;

use badge_mint::blockchain::ChainError;
use badge_mint::mint::{Confirmation, FailureKind, MintError, MintState, SubmitOutcome, ValidationError};
use badge_mint::session::SessionProvider;

mod common;
use common::{account, tx, Harness};

#[tokio::test]
async fn test_mint_happy_path_refreshes_balance_once() {
    let h = Harness::connected(3);
    let view = h.wait_balance(|b| b.value.is_some()).await;
    assert_eq!(view.value, Some(U256::from(3)));
    assert_eq!(h.read.calls(), 1);

    h.read.set_balance(4);
    assert!(h.handle.submit("Shipping on Base").await.is_accepted());
    assert_eq!(h.handle.state(), MintState::Submitting);

    let (answer, reply) = h.write.parked.next().await;
    assert_eq!(answer, "Shipping on Base");
    reply.send(Ok(tx(0x11))).unwrap();
    h.wait_state(|s| *s == MintState::Confirming(tx(0x11))).await;

    let (watched, reply) = h.watcher.parked.next().await;
    assert_eq!(watched, tx(0x11));
    reply.send(Ok(Confirmation::Confirmed { block_number: 42 })).unwrap();
    h.wait_state(|s| *s == MintState::Confirmed(tx(0x11))).await;

    let view = h.wait_balance(|b| b.value == Some(U256::from(4))).await;
    assert!(view.notice.is_none());
    assert_eq!(h.read.calls(), 2);
    assert_eq!(h.write.parked.calls(), 1);
}

#[tokio::test]
async fn test_answer_reaches_gateway_as_typed() {
    let h = Harness::connected(0);
    assert!(h.handle.submit("  gm base  ").await.is_accepted());
    let (answer, _reply) = h.write.parked.next().await;
    assert_eq!(answer, "  gm base  ");
}

#[tokio::test]
async fn test_blank_answer_never_reaches_gateway() {
    let h = Harness::connected(0);
    let outcome = h.handle.submit("   ").await;
    assert_eq!(outcome, SubmitOutcome::Rejected(MintError::Validation(ValidationError::Blank)));
    assert_eq!(h.handle.state(), MintState::Idle);

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(h.write.parked.calls(), 0);
}

#[tokio::test]
async fn test_submit_without_session_is_rejected() {
    let h = Harness::mount(SessionProvider::new(), 5);
    let outcome = h.handle.submit("gm").await;
    assert_eq!(outcome, SubmitOutcome::Rejected(MintError::Session));
    assert_eq!(h.handle.state(), MintState::Idle);

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(h.write.parked.calls(), 0);
    assert_eq!(h.read.calls(), 0);
    assert_eq!(h.handle.balance().value, None);
}

#[tokio::test]
async fn test_second_submit_while_busy_is_not_ready() {
    let h = Harness::connected(0);
    assert!(h.handle.submit("first").await.is_accepted());
    assert_eq!(h.handle.submit("second").await, SubmitOutcome::NotReady);

    let (_, reply) = h.write.parked.next().await;
    reply.send(Ok(tx(0x22))).unwrap();
    h.wait_state(|s| *s == MintState::Confirming(tx(0x22))).await;
    assert_eq!(h.handle.submit("third").await, SubmitOutcome::NotReady);

    assert_eq!(h.write.parked.calls(), 1);
}

#[tokio::test]
async fn test_declined_signature_fails_then_retry_is_manual() {
    let h = Harness::connected(0);
    assert!(h.handle.submit("gm").await.is_accepted());

    let (_, reply) = h.write.parked.next().await;
    reply
        .send(Err(ChainError::Rejected("User denied transaction signature".to_string())))
        .unwrap();

    let state = h.wait_state(|s| matches!(s, MintState::Failed(_))).await;
    let MintState::Failed(reason) = state else {
        unreachable!()
    };
    assert_eq!(reason.kind, FailureKind::Submission);
    assert_eq!(reason.message, "User denied transaction signature");

    // No automatic retry.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(h.write.parked.calls(), 1);
    assert!(h.handle.state().can_edit());

    assert!(h.handle.submit("ok").await.is_accepted());
    assert_eq!(h.handle.state(), MintState::Submitting);
    let (answer, _reply) = h.write.parked.next().await;
    assert_eq!(answer, "ok");
}

#[tokio::test]
async fn test_long_failure_message_is_truncated() {
    let h = Harness::connected(0);
    assert!(h.handle.submit("gm").await.is_accepted());

    let (_, reply) = h.write.parked.next().await;
    reply.send(Err(ChainError::Rejected("é".repeat(300)))).unwrap();

    let state = h.wait_state(|s| matches!(s, MintState::Failed(_))).await;
    let MintState::Failed(reason) = state else {
        unreachable!()
    };
    assert_eq!(reason.message.chars().count(), 100);
}

#[tokio::test]
async fn test_reverted_transaction_fails_without_balance_refresh() {
    let h = Harness::connected(2);
    h.wait_balance(|b| b.value.is_some()).await;
    h.reach_confirming("gm", tx(0x33)).await;

    let (_, reply) = h.watcher.parked.next().await;
    reply
        .send(Ok(Confirmation::Failed("Transaction reverted".to_string())))
        .unwrap();

    let state = h.wait_state(|s| matches!(s, MintState::Failed(_))).await;
    let MintState::Failed(reason) = state else {
        unreachable!()
    };
    assert_eq!(reason.kind, FailureKind::Confirmation);
    assert_eq!(reason.message, "Transaction reverted");

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(h.read.calls(), 1);
}

#[tokio::test]
async fn test_watcher_error_becomes_failure() {
    let h = Harness::connected(0);
    h.reach_confirming("gm", tx(0x34)).await;

    let (_, reply) = h.watcher.parked.next().await;
    reply.send(Err(ChainError::ConfirmationTimeout(120))).unwrap();

    let state = h.wait_state(|s| matches!(s, MintState::Failed(_))).await;
    assert!(state.to_string().contains("120"));
}

#[tokio::test]
async fn test_disconnect_mid_confirmation_discards_late_result() {
    let h = Harness::connected(1);
    h.wait_balance(|b| b.value.is_some()).await;
    h.reach_confirming("gm", tx(0x44)).await;
    let (_, reply) = h.watcher.parked.next().await;

    h.session.disconnect();
    h.wait_state(|s| *s == MintState::Idle).await;
    h.wait_balance(|b| b.value.is_none()).await;

    reply.send(Ok(Confirmation::Confirmed { block_number: 9 })).unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(h.handle.state(), MintState::Idle);
    assert_eq!(h.handle.balance().value, None);
    assert_eq!(h.read.calls(), 1);
}

#[tokio::test]
async fn test_disconnect_mid_submission_discards_late_handle() {
    let h = Harness::connected(0);
    assert!(h.handle.submit("gm").await.is_accepted());
    let (_, reply) = h.write.parked.next().await;

    h.session.disconnect();
    h.wait_state(|s| *s == MintState::Idle).await;

    reply.send(Ok(tx(0x55))).unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(h.handle.state(), MintState::Idle);
    assert_eq!(h.watcher.parked.calls(), 0);
}

#[tokio::test]
async fn test_reconnect_allows_new_attempt() {
    let h = Harness::connected(0);
    assert!(h.handle.submit("gm").await.is_accepted());
    let (_, stale) = h.write.parked.next().await;

    h.session.disconnect();
    h.session.connect(account(0xAA));
    h.wait_state(|s| *s == MintState::Idle).await;

    assert!(h.handle.submit("again").await.is_accepted());
    let (answer, reply) = h.write.parked.next().await;
    assert_eq!(answer, "again");

    // The first attempt's handle arrives late and must not win.
    stale.send(Ok(tx(0x01))).unwrap();
    reply.send(Ok(tx(0x02))).unwrap();
    let state = h.wait_state(|s| matches!(s, MintState::Confirming(_))).await;
    assert_eq!(state, MintState::Confirming(tx(0x02)));

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(h.handle.state(), MintState::Confirming(tx(0x02)));
    assert_eq!(h.watcher.parked.calls(), 1);
}

#[tokio::test]
async fn test_balance_read_error_keeps_last_value() {
    let h = Harness::connected(3);
    h.wait_balance(|b| b.value.is_some()).await;

    h.read.fail_with("connection reset");
    h.handle.refresh_balance();
    let view = h.wait_balance(|b| b.notice.is_some()).await;
    assert_eq!(view.value, Some(U256::from(3)));
    assert!(matches!(view.notice, Some(MintError::Read(_))));
    assert_eq!(h.handle.state(), MintState::Idle);

    h.read.set_balance(5);
    h.handle.refresh_balance();
    let view = h.wait_balance(|b| b.value == Some(U256::from(5))).await;
    assert!(view.notice.is_none());
}

#[tokio::test]
async fn test_account_switch_rereads_balance_for_new_account() {
    let h = Harness::connected(3);
    h.wait_balance(|b| b.value.is_some()).await;

    h.read.set_balance(8);
    h.session.switch_account(account(0xBB));
    h.wait_balance(|b| b.value == Some(U256::from(8))).await;

    assert_eq!(h.read.accounts(), vec![account(0xAA), account(0xBB)]);
}

#[tokio::test]
async fn test_refresh_while_disconnected_is_noop() {
    let h = Harness::mount(SessionProvider::new(), 1);
    h.handle.refresh_balance();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(h.read.calls(), 0);

    h.session.connect(account(0xCC));
    h.wait_balance(|b| b.value == Some(U256::from(1))).await;
    assert_eq!(h.read.accounts(), vec![account(0xCC)]);
}

#[tokio::test]
async fn test_unmount_stops_manager() {
    let h = Harness::connected(0);
    h.reach_confirming("gm", tx(0x66)).await;
    let (_, reply) = h.watcher.parked.next().await;

    h.handle.unmount();
    tokio::time::timeout(common::WAIT, h.task)
        .await
        .expect("manager did not stop")
        .unwrap();

    let _ = reply.send(Ok(Confirmation::Confirmed { block_number: 1 }));
    assert_eq!(h.handle.submit("gm").await, SubmitOutcome::Unmounted);
    assert_eq!(h.handle.state(), MintState::Confirming(tx(0x66)));
}

#[tokio::test]
async fn test_settled_balance_follows_confirmation_refresh() {
    let h = Harness::connected(3);
    h.wait_balance(|b| b.value.is_some()).await;
    h.read.set_balance(4);
    h.reach_confirming("gm", tx(0x77)).await;

    let (_, reply) = h.watcher.parked.next().await;
    reply.send(Ok(Confirmation::Confirmed { block_number: 5 })).unwrap();
    h.wait_state(|s| *s == MintState::Confirmed(tx(0x77))).await;

    // The refresh is already visible as outstanding or resolved; never the old count.
    let view = tokio::time::timeout(common::WAIT, h.handle.settled_balance())
        .await
        .expect("balance never settled")
        .expect("manager stopped");
    assert_eq!(view.value, Some(U256::from(4)));
    assert!(!view.refreshing);
}

#[tokio::test]
async fn test_settled_balance_returns_at_once_when_refresh_already_landed() {
    let h = Harness::connected(3);
    h.wait_balance(|b| b.value.is_some()).await;
    h.read.set_balance(4);
    h.reach_confirming("gm", tx(0x78)).await;

    let (_, reply) = h.watcher.parked.next().await;
    reply.send(Ok(Confirmation::Confirmed { block_number: 5 })).unwrap();
    h.wait_balance(|b| b.value == Some(U256::from(4))).await;
    tokio::time::sleep(Duration::from_millis(20)).await;

    let view = tokio::time::timeout(Duration::from_millis(100), h.handle.settled_balance())
        .await
        .expect("waited for a refresh that had already landed")
        .expect("manager stopped");
    assert_eq!(view.value, Some(U256::from(4)));
    assert_eq!(h.read.calls(), 2);
}

#[tokio::test]
async fn test_failed_refresh_still_settles_with_last_value() {
    let h = Harness::connected(3);
    h.wait_balance(|b| b.value.is_some()).await;
    h.read.fail_with("connection reset");
    h.reach_confirming("gm", tx(0x79)).await;

    let (_, reply) = h.watcher.parked.next().await;
    reply.send(Ok(Confirmation::Confirmed { block_number: 5 })).unwrap();
    h.wait_state(|s| matches!(s, MintState::Confirmed(_))).await;

    let view = tokio::time::timeout(common::WAIT, h.handle.settled_balance())
        .await
        .expect("balance never settled")
        .expect("manager stopped");
    assert_eq!(view.value, Some(U256::from(3)));
    assert!(matches!(view.notice, Some(MintError::Read(_))));
}
