//! Cross-handle synchronization and workflow tests.
//!
//! Each test opens one or more store handles over the same data directory,
//! mimicking multiple concurrent viewers of the same storage.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use paperstock_accounts::AccountStatus;
use paperstock_approvals::{ChangeAction, Decision};
use paperstock_broadcast::{BroadcastChannel, LocalChannel};
use paperstock_core::{DomainError, ItemId};
use paperstock_inventory::{
    ItemDraft, ItemPatch, Movement, NewTransaction, Priority, TransactionStatus,
};

use crate::notice::StoreNotice;
use crate::refresh::{NoticeListener, RefreshWorker};
use crate::store::StockStore;
use crate::workflow::{Actor, ChangeOutcome, Workflow, WorkflowError};

type Channel = Arc<LocalChannel<StoreNotice>>;

fn temp_dir() -> PathBuf {
    std::env::temp_dir().join(format!("paperstock-store-{}", uuid::Uuid::now_v7()))
}

fn open(dir: &Path, channel: &Channel) -> Arc<StockStore<Channel>> {
    Arc::new(StockStore::open(dir.to_path_buf(), Arc::clone(channel)).unwrap())
}

fn workflow(dir: &Path, channel: &Channel) -> Workflow<Channel> {
    Workflow::new(open(dir, channel))
}

/// Seed an admin and an approved staff account; return their actors.
fn seed_actors(flow: &Workflow<Channel>) -> (Actor, Actor) {
    flow.ensure_admin("boss", "pw").unwrap();
    let admin = flow.authenticate("boss", "pw").unwrap();
    let admin = Actor::from_account(&admin);

    let staff = flow
        .register_account("worker", "pw", vec!["inventory".to_string()])
        .unwrap();
    flow.review_account(&admin, staff.id, Decision::Approved)
        .unwrap();
    let staff = flow.authenticate("worker", "pw").unwrap();
    (admin, Actor::from_account(&staff))
}

fn draft() -> ItemDraft {
    ItemDraft {
        sheet_size: "20x30".to_string(),
        gsm: 230,
        category: "Duplex".to_string(),
        stock: 100,
        reorder_level: 20,
        reorder_quantity: 200,
    }
}

fn add_action() -> (ItemId, ChangeAction) {
    let item_id = ItemId::new();
    (
        item_id,
        ChangeAction::Add {
            item_id,
            draft: draft(),
        },
    )
}

fn wait_until(deadline: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    cond()
}

#[test]
fn second_handle_sees_writes_after_reload() {
    let dir = temp_dir();
    let channel: Channel = Arc::new(LocalChannel::new());
    let a = workflow(&dir, &channel);
    let b = open(&dir, &channel);

    let (admin, _) = seed_actors(&a);
    let (item_id, action) = add_action();
    a.submit_item_change(&admin, action, None).unwrap();

    assert!(b.items().is_empty());
    b.reload_all().unwrap();
    assert!(b.items().iter().any(|i| i.id == item_id));
}

#[test]
fn last_write_observed_wins_across_handles() {
    let dir = temp_dir();
    let channel: Channel = Arc::new(LocalChannel::new());
    let a = workflow(&dir, &channel);
    let b = workflow(&dir, &channel);

    let (admin, _) = seed_actors(&a);
    let (item_id, action) = add_action();
    a.submit_item_change(&admin, action, None).unwrap();
    b.store().reload_all().unwrap();

    // Both handles patch the same item; whichever saved last is what a fresh
    // reload observes.
    let patch_a = ChangeAction::Update {
        item_id,
        patch: ItemPatch {
            category: Some("Kraft".to_string()),
            ..Default::default()
        },
    };
    let patch_b = ChangeAction::Update {
        item_id,
        patch: ItemPatch {
            category: Some("Art Board".to_string()),
            ..Default::default()
        },
    };
    a.submit_item_change(&admin, patch_a, None).unwrap();
    b.submit_item_change(&admin, patch_b, None).unwrap();

    a.store().reload_all().unwrap();
    let item = a
        .store()
        .items()
        .into_iter()
        .find(|i| i.id == item_id)
        .unwrap();
    assert_eq!(item.category, "Art Board");
}

#[test]
fn notice_listener_reloads_other_handles() {
    let dir = temp_dir();
    let channel: Channel = Arc::new(LocalChannel::new());
    let a = workflow(&dir, &channel);
    let b = open(&dir, &channel);
    let _listener = NoticeListener::spawn(Arc::clone(&b), channel.subscribe());

    let (admin, _) = seed_actors(&a);
    let (item_id, action) = add_action();
    a.submit_item_change(&admin, action, None).unwrap();

    assert!(wait_until(Duration::from_secs(2), || {
        b.items().iter().any(|i| i.id == item_id)
    }));
}

#[test]
fn polling_fallback_catches_missed_notices() {
    let dir = temp_dir();
    // Separate channels: no notice ever crosses between the handles.
    let channel_a: Channel = Arc::new(LocalChannel::new());
    let channel_b: Channel = Arc::new(LocalChannel::new());
    let a = workflow(&dir, &channel_a);
    let b = open(&dir, &channel_b);
    let _worker = RefreshWorker::spawn_with_interval(Arc::clone(&b), Duration::from_millis(50));

    let (admin, _) = seed_actors(&a);
    let (item_id, action) = add_action();
    a.submit_item_change(&admin, action, None).unwrap();

    assert!(wait_until(Duration::from_secs(2), || {
        b.items().iter().any(|i| i.id == item_id)
    }));
}

#[test]
fn staff_changes_queue_and_approval_applies_them() {
    let dir = temp_dir();
    let channel: Channel = Arc::new(LocalChannel::new());
    let flow = workflow(&dir, &channel);
    let (admin, staff) = seed_actors(&flow);

    let (item_id, action) = add_action();
    let outcome = flow.submit_item_change(&staff, action, None).unwrap();
    let request_id = match outcome {
        ChangeOutcome::Queued { request_id } => request_id,
        other => panic!("expected queued outcome, got {other:?}"),
    };

    // The provisional item is visible immediately, flagged.
    let item = flow
        .store()
        .items()
        .into_iter()
        .find(|i| i.id == item_id)
        .unwrap();
    assert!(item.pending_approval);

    // Only one pending change per item.
    let dup = ChangeAction::Update {
        item_id,
        patch: ItemPatch {
            gsm: Some(300),
            ..Default::default()
        },
    };
    let err = flow.submit_item_change(&staff, dup, None).unwrap_err();
    assert!(matches!(err, WorkflowError::PendingApproval { .. }));

    // Staff cannot decide.
    let err = flow
        .decide_change(&staff, request_id, Decision::Approved)
        .unwrap_err();
    assert!(matches!(
        err,
        WorkflowError::Domain(DomainError::Unauthorized)
    ));

    flow.decide_change(&admin, request_id, Decision::Approved)
        .unwrap();

    let item = flow
        .store()
        .items()
        .into_iter()
        .find(|i| i.id == item_id)
        .unwrap();
    assert!(!item.pending_approval);
    assert!(flow.store().change_requests().is_empty());
}

#[test]
fn denied_add_removes_the_provisional_item() {
    let dir = temp_dir();
    let channel: Channel = Arc::new(LocalChannel::new());
    let flow = workflow(&dir, &channel);
    let (admin, staff) = seed_actors(&flow);

    let (item_id, action) = add_action();
    let ChangeOutcome::Queued { request_id } =
        flow.submit_item_change(&staff, action, None).unwrap()
    else {
        panic!("staff add should queue");
    };

    flow.decide_change(&admin, request_id, Decision::Denied)
        .unwrap();

    assert!(!flow.store().items().iter().any(|i| i.id == item_id));
    assert!(flow.store().change_requests().is_empty());
}

#[test]
fn denied_update_clears_the_flag_and_keeps_the_item() {
    let dir = temp_dir();
    let channel: Channel = Arc::new(LocalChannel::new());
    let flow = workflow(&dir, &channel);
    let (admin, staff) = seed_actors(&flow);

    let (item_id, action) = add_action();
    flow.submit_item_change(&admin, action, None).unwrap();

    let update = ChangeAction::Update {
        item_id,
        patch: ItemPatch {
            reorder_level: Some(50),
            ..Default::default()
        },
    };
    let ChangeOutcome::Queued { request_id } =
        flow.submit_item_change(&staff, update, None).unwrap()
    else {
        panic!("staff update should queue");
    };

    flow.decide_change(&admin, request_id, Decision::Denied)
        .unwrap();

    let item = flow
        .store()
        .items()
        .into_iter()
        .find(|i| i.id == item_id)
        .unwrap();
    assert!(!item.pending_approval);
    assert_eq!(item.reorder_level, 20);
}

#[test]
fn direct_delete_also_drops_queued_requests() {
    let dir = temp_dir();
    let channel: Channel = Arc::new(LocalChannel::new());
    let flow = workflow(&dir, &channel);
    let (admin, staff) = seed_actors(&flow);

    let (item_id, action) = add_action();
    flow.submit_item_change(&admin, action, None).unwrap();

    let update = ChangeAction::Update {
        item_id,
        patch: ItemPatch {
            category: Some("Kraft".to_string()),
            ..Default::default()
        },
    };
    let ChangeOutcome::Queued { request_id } =
        flow.submit_item_change(&staff, update, None).unwrap()
    else {
        panic!("staff update should queue");
    };

    // An admin deletes the item out from under the queued request.
    flow.submit_item_change(&admin, ChangeAction::Delete { item_id }, None)
        .unwrap();

    assert!(flow.store().change_requests().is_empty());
    let err = flow
        .decide_change(&admin, request_id, Decision::Approved)
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Domain(DomainError::NotFound)));
}

#[test]
fn movements_adjust_stock_and_overdraw_is_rejected() {
    let dir = temp_dir();
    let channel: Channel = Arc::new(LocalChannel::new());
    let flow = workflow(&dir, &channel);
    let (admin, staff) = seed_actors(&flow);

    let (item_id, action) = add_action();
    flow.submit_item_change(&admin, action, None).unwrap();

    let txn = flow
        .record_movement(
            &staff,
            NewTransaction {
                item_id,
                movement: Movement::Out,
                quantity: 30,
                priority: Priority::High,
                vehicle: Some("KA-05 truck".to_string()),
                note: None,
            },
        )
        .unwrap();
    assert_eq!(txn.status, TransactionStatus::Completed);

    let err = flow
        .record_movement(
            &staff,
            NewTransaction {
                item_id,
                movement: Movement::Out,
                quantity: 500,
                priority: Priority::default(),
                vehicle: None,
                note: None,
            },
        )
        .unwrap_err();
    assert!(matches!(
        err,
        WorkflowError::Domain(DomainError::InvariantViolation(_))
    ));

    let item = flow
        .store()
        .items()
        .into_iter()
        .find(|i| i.id == item_id)
        .unwrap();
    assert_eq!(item.stock, 70);
    // The rejected movement left no transaction behind.
    assert_eq!(flow.store().transactions().len(), 1);
}

#[test]
fn reorder_markers_move_no_stock_and_are_admin_resolved() {
    let dir = temp_dir();
    let channel: Channel = Arc::new(LocalChannel::new());
    let flow = workflow(&dir, &channel);
    let (admin, staff) = seed_actors(&flow);

    let (item_id, action) = add_action();
    flow.submit_item_change(&admin, action, None).unwrap();

    let txn = flow
        .record_movement(
            &staff,
            NewTransaction {
                item_id,
                movement: Movement::Reorder,
                quantity: 200,
                priority: Priority::default(),
                vehicle: None,
                note: Some("running low".to_string()),
            },
        )
        .unwrap();
    assert_eq!(txn.status, TransactionStatus::Pending);
    assert_eq!(flow.pending_reorders().len(), 1);

    let item = flow
        .store()
        .items()
        .into_iter()
        .find(|i| i.id == item_id)
        .unwrap();
    assert_eq!(item.stock, 100);

    let err = flow.complete_reorder(&staff, txn.id).unwrap_err();
    assert!(matches!(
        err,
        WorkflowError::Domain(DomainError::Unauthorized)
    ));

    flow.complete_reorder(&admin, txn.id).unwrap();
    assert!(flow.pending_reorders().is_empty());

    // Already resolved.
    let err = flow.cancel_reorder(&admin, txn.id).unwrap_err();
    assert!(matches!(
        err,
        WorkflowError::Domain(DomainError::InvariantViolation(_))
    ));
}

#[test]
fn reorder_alerts_track_the_threshold() {
    let dir = temp_dir();
    let channel: Channel = Arc::new(LocalChannel::new());
    let flow = workflow(&dir, &channel);
    let (admin, staff) = seed_actors(&flow);

    let (item_id, action) = add_action();
    flow.submit_item_change(&admin, action, None).unwrap();
    assert!(flow.reorder_alerts().is_empty());

    flow.record_movement(
        &staff,
        NewTransaction {
            item_id,
            movement: Movement::Out,
            quantity: 85,
            priority: Priority::default(),
            vehicle: None,
            note: None,
        },
    )
    .unwrap();

    let alerts = flow.reorder_alerts();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].id, item_id);
}

#[test]
fn registration_review_gates_sign_in() {
    let dir = temp_dir();
    let channel: Channel = Arc::new(LocalChannel::new());
    let flow = workflow(&dir, &channel);
    flow.ensure_admin("boss", "pw").unwrap();
    let admin = Actor::from_account(&flow.authenticate("boss", "pw").unwrap());

    let account = flow
        .register_account("newhire", "secret", vec!["transactions".to_string()])
        .unwrap();
    assert_eq!(account.status, AccountStatus::Pending);

    // Duplicate usernames are rejected case-insensitively.
    let err = flow.register_account("NEWHIRE", "x", vec![]).unwrap_err();
    assert!(matches!(err, WorkflowError::Domain(DomainError::Conflict(_))));

    assert!(matches!(
        flow.authenticate("newhire", "secret"),
        Err(WorkflowError::AccountPending)
    ));
    assert!(matches!(
        flow.authenticate("newhire", "wrong"),
        Err(WorkflowError::InvalidCredentials)
    ));
    assert!(matches!(
        flow.authenticate("ghost", "secret"),
        Err(WorkflowError::InvalidCredentials)
    ));

    flow.review_account(&admin, account.id, Decision::Approved)
        .unwrap();
    let signed_in = flow.authenticate("newhire", "secret").unwrap();
    assert!(signed_in.can_access("transactions"));
    assert!(!signed_in.can_access("audit"));
}

#[test]
fn denied_accounts_get_a_distinct_error() {
    let dir = temp_dir();
    let channel: Channel = Arc::new(LocalChannel::new());
    let flow = workflow(&dir, &channel);
    flow.ensure_admin("boss", "pw").unwrap();
    let admin = Actor::from_account(&flow.authenticate("boss", "pw").unwrap());

    let account = flow.register_account("reject", "pw", vec![]).unwrap();
    flow.review_account(&admin, account.id, Decision::Denied)
        .unwrap();

    assert!(matches!(
        flow.authenticate("reject", "pw"),
        Err(WorkflowError::AccountDenied)
    ));
}

#[test]
fn registration_publishes_a_notice_for_admins() {
    let dir = temp_dir();
    let channel: Channel = Arc::new(LocalChannel::new());
    let flow = workflow(&dir, &channel);
    let subscription = channel.subscribe();

    let account = flow.register_account("newhire", "pw", vec![]).unwrap();

    let mut saw_registration = false;
    while let Ok(notice) = subscription.try_recv() {
        if notice == (StoreNotice::UserRegistered { account_id: account.id }) {
            saw_registration = true;
        }
    }
    assert!(saw_registration);
}

#[test]
fn ensure_admin_is_idempotent() {
    let dir = temp_dir();
    let channel: Channel = Arc::new(LocalChannel::new());
    let flow = workflow(&dir, &channel);

    flow.ensure_admin("boss", "pw").unwrap();
    flow.ensure_admin("boss", "different").unwrap();

    assert_eq!(flow.store().accounts().len(), 1);
    // The original password stands.
    assert!(flow.authenticate("boss", "pw").is_ok());
}

#[test]
fn audit_trail_is_admin_only_and_append_only() {
    let dir = temp_dir();
    let channel: Channel = Arc::new(LocalChannel::new());
    let flow = workflow(&dir, &channel);
    let (admin, staff) = seed_actors(&flow);

    let (_, action) = add_action();
    flow.submit_item_change(&admin, action, None).unwrap();

    let err = flow.audit_trail(&staff).unwrap_err();
    assert!(matches!(
        err,
        WorkflowError::Domain(DomainError::Unauthorized)
    ));

    let trail = flow.audit_trail(&admin).unwrap();
    assert!(trail.iter().any(|e| e.action == "inventory.item.add"));
    assert!(trail.iter().any(|e| e.action == "accounts.registered"));
    // Newest first.
    assert!(trail.windows(2).all(|w| w[0].occurred_at >= w[1].occurred_at));
}
