// SPDX-FileCopyrightText: 2026 Casebook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Invitation, registration, login and account administration.

use casebook_core::types::{Role, UserStatus};
use casebook_core::{CasebookError, StorageAdapter, UserId};
use casebook_desk::{InviteRequest, UserPatch};
use casebook_test_utils::{TestHarness, TEST_PASSWORD};

fn alice() -> InviteRequest {
    InviteRequest {
        user_name: "alice".to_string(),
        email: Some("a@x.com".to_string()),
        role: Some("customer_support".to_string()),
        active: Some(true),
    }
}

// ---- Registration ----

#[tokio::test]
async fn alice_registers_exactly_once() {
    let harness = TestHarness::new().await.unwrap();
    let admin = harness.seed_admin("root").await.unwrap();

    let (user, token) = harness
        .desk
        .registration
        .invite(&admin, alice())
        .await
        .unwrap();
    assert_eq!(user.status, UserStatus::Pending);
    assert_eq!(user.role, Role::CustomerSupport);
    assert!(user.active);

    let name = harness.desk.registration.lookup_pending(&token).await.unwrap();
    assert_eq!(name, "alice");

    harness
        .desk
        .registration
        .complete_registration("alice", "secret1")
        .await
        .unwrap();
    let stored = harness.storage.get_user(user.id).await.unwrap().unwrap();
    assert_eq!(stored.status, UserStatus::Complete);

    let err = harness
        .desk
        .registration
        .complete_registration("alice", "secret2")
        .await
        .unwrap_err();
    assert!(matches!(err, CasebookError::Conflict(_)));

    // The first password still holds.
    harness
        .desk
        .accounts
        .authenticate("alice", "secret1")
        .await
        .unwrap();
    assert!(
        harness
            .desk
            .accounts
            .authenticate("alice", "secret2")
            .await
            .is_err()
    );

    // The token is spent.
    let err = harness
        .desk
        .registration
        .lookup_pending(&token)
        .await
        .unwrap_err();
    assert!(matches!(err, CasebookError::NotFound));
}

#[tokio::test]
async fn token_redemption_wins_once_under_concurrency() {
    let harness = TestHarness::new().await.unwrap();
    let admin = harness.seed_admin("root").await.unwrap();
    let (_, token) = harness
        .desk
        .registration
        .invite(&admin, alice())
        .await
        .unwrap();

    let (a, b) = tokio::join!(
        harness
            .desk
            .registration
            .complete_registration_by_token(&token, "secret1"),
        harness
            .desk
            .registration
            .complete_registration_by_token(&token, "secret2")
    );
    assert_eq!(
        [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(),
        1,
        "exactly one redemption must win"
    );
    let loser = if a.is_ok() { b } else { a };
    assert!(matches!(loser, Err(CasebookError::NotFound)));
}

#[tokio::test]
async fn malformed_registration_token_is_not_found() {
    let harness = TestHarness::new().await.unwrap();
    let err = harness
        .desk
        .registration
        .complete_registration_by_token("not-a-token", "secret1")
        .await
        .unwrap_err();
    assert!(matches!(err, CasebookError::NotFound));
}

#[tokio::test]
async fn short_password_is_rejected_and_account_stays_pending() {
    let harness = TestHarness::new().await.unwrap();
    let admin = harness.seed_admin("root").await.unwrap();
    let (user, token) = harness
        .desk
        .registration
        .invite(&admin, alice())
        .await
        .unwrap();

    let err = harness
        .desk
        .registration
        .complete_registration_by_token(&token, "abc")
        .await
        .unwrap_err();
    assert!(matches!(err, CasebookError::Validation(_)));

    let stored = harness.storage.get_user(user.id).await.unwrap().unwrap();
    assert_eq!(stored.status, UserStatus::Pending);
}

#[tokio::test]
async fn replayed_redemption_reports_spent_account_before_password_rules() {
    let harness = TestHarness::new().await.unwrap();
    let admin = harness.seed_admin("root").await.unwrap();
    let (_, token) = harness
        .desk
        .registration
        .invite(&admin, alice())
        .await
        .unwrap();
    harness
        .desk
        .registration
        .complete_registration("alice", "secret1")
        .await
        .unwrap();

    let err = harness
        .desk
        .registration
        .complete_registration("ALICE", "x")
        .await
        .unwrap_err();
    assert!(matches!(err, CasebookError::Conflict(_)));

    let err = harness
        .desk
        .registration
        .complete_registration("nobody", "x")
        .await
        .unwrap_err();
    assert!(matches!(err, CasebookError::Conflict(_)));

    let err = harness
        .desk
        .registration
        .complete_registration_by_token(&token, "x")
        .await
        .unwrap_err();
    assert!(matches!(err, CasebookError::NotFound));
}

#[tokio::test]
async fn invitee_is_emailed_a_registration_link() {
    let harness = TestHarness::new().await.unwrap();
    let admin = harness.seed_admin("root").await.unwrap();
    let (_, token) = harness
        .desk
        .registration
        .invite(&admin, alice())
        .await
        .unwrap();
    harness.flush_notifications().await;

    let sent = harness.notifier.sent_emails().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "a@x.com");
    assert!(sent[0].html_body.contains(&format!("/register/{token}")));
}

#[tokio::test]
async fn invite_without_email_sends_nothing() {
    let harness = TestHarness::new().await.unwrap();
    let admin = harness.seed_admin("root").await.unwrap();
    let request = InviteRequest {
        email: None,
        ..alice()
    };
    harness
        .desk
        .registration
        .invite(&admin, request)
        .await
        .unwrap();
    harness.flush_notifications().await;
    assert_eq!(harness.notifier.sent_count().await, 0);
}

#[tokio::test]
async fn unknown_role_falls_back_to_customer_support() {
    let harness = TestHarness::new().await.unwrap();
    let admin = harness.seed_admin("root").await.unwrap();
    let request = InviteRequest {
        role: Some("superuser".to_string()),
        ..alice()
    };
    let (user, _) = harness
        .desk
        .registration
        .invite(&admin, request)
        .await
        .unwrap();
    assert_eq!(user.role, Role::CustomerSupport);
}

#[tokio::test]
async fn agents_cannot_invite() {
    let harness = TestHarness::new().await.unwrap();
    let agent = harness.seed_agent("sam").await.unwrap();
    let err = harness
        .desk
        .registration
        .invite(&agent, alice())
        .await
        .unwrap_err();
    assert!(matches!(err, CasebookError::Forbidden(_)));
}

#[tokio::test]
async fn duplicate_user_name_is_a_conflict() {
    let harness = TestHarness::new().await.unwrap();
    let admin = harness.seed_admin("root").await.unwrap();
    harness
        .desk
        .registration
        .invite(&admin, alice())
        .await
        .unwrap();
    let request = InviteRequest {
        user_name: "ALICE".to_string(),
        ..alice()
    };
    let err = harness
        .desk
        .registration
        .invite(&admin, request)
        .await
        .unwrap_err();
    assert!(matches!(err, CasebookError::Conflict(_)));
}

// ---- Login ----

#[tokio::test]
async fn pending_user_cannot_log_in() {
    let harness = TestHarness::new().await.unwrap();
    let admin = harness.seed_admin("root").await.unwrap();
    harness
        .desk
        .registration
        .invite(&admin, alice())
        .await
        .unwrap();

    let err = harness
        .desk
        .accounts
        .authenticate("alice", "anything")
        .await
        .unwrap_err();
    assert!(matches!(err, CasebookError::Unauthorized(ref m) if m.contains("registration")));
}

#[tokio::test]
async fn wrong_password_and_unknown_user_look_the_same() {
    let harness = TestHarness::new().await.unwrap();
    harness.seed_agent("sam").await.unwrap();

    let wrong = harness
        .desk
        .accounts
        .authenticate("sam", "nope")
        .await
        .unwrap_err();
    let unknown = harness
        .desk
        .accounts
        .authenticate("nobody", TEST_PASSWORD)
        .await
        .unwrap_err();
    assert_eq!(wrong.to_string(), unknown.to_string());
}

#[tokio::test]
async fn login_is_case_insensitive_on_user_name() {
    let harness = TestHarness::new().await.unwrap();
    let sam = harness.seed_agent("sam").await.unwrap();
    let again = harness
        .desk
        .accounts
        .authenticate("SAM", TEST_PASSWORD)
        .await
        .unwrap();
    assert_eq!(again.user_id, sam.user_id);
}

#[tokio::test]
async fn deactivated_user_cannot_log_in() {
    let harness = TestHarness::new().await.unwrap();
    let admin = harness.seed_admin("root").await.unwrap();
    let sam = harness.seed_agent("sam").await.unwrap();

    let updated = harness
        .desk
        .accounts
        .update_user(
            &admin,
            sam.user_id,
            UserPatch {
                active: Some(false),
                ..UserPatch::default()
            },
        )
        .await
        .unwrap();
    assert!(!updated.active);

    let err = harness
        .desk
        .accounts
        .authenticate("sam", TEST_PASSWORD)
        .await
        .unwrap_err();
    assert!(matches!(err, CasebookError::Unauthorized(_)));
}

// ---- Administration ----

#[tokio::test]
async fn admin_updates_role_permissively() {
    let harness = TestHarness::new().await.unwrap();
    let admin = harness.seed_admin("root").await.unwrap();
    let sam = harness.seed_agent("sam").await.unwrap();

    let promoted = harness
        .desk
        .accounts
        .update_user(
            &admin,
            sam.user_id,
            UserPatch {
                role: Some("admin".to_string()),
                ..UserPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(promoted.role, Role::Admin);

    let demoted = harness
        .desk
        .accounts
        .update_user(
            &admin,
            sam.user_id,
            UserPatch {
                role: Some("wizard".to_string()),
                ..UserPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(demoted.role, Role::CustomerSupport);
}

#[tokio::test]
async fn empty_patch_returns_current_user() {
    let harness = TestHarness::new().await.unwrap();
    let admin = harness.seed_admin("root").await.unwrap();
    let user = harness
        .desk
        .accounts
        .update_user(&admin, admin.user_id, UserPatch::default())
        .await
        .unwrap();
    assert_eq!(user.user_name, "root");

    let err = harness
        .desk
        .accounts
        .update_user(&admin, UserId(999), UserPatch::default())
        .await
        .unwrap_err();
    assert!(matches!(err, CasebookError::NotFound));
}

#[tokio::test]
async fn role_snapshot_survives_demotion_until_next_login() {
    let harness = TestHarness::new().await.unwrap();
    let root = harness.seed_admin("root").await.unwrap();
    let other = harness.seed_admin("other").await.unwrap();

    harness
        .desk
        .accounts
        .update_user(
            &root,
            other.user_id,
            UserPatch {
                role: Some("customer_support".to_string()),
                ..UserPatch::default()
            },
        )
        .await
        .unwrap();

    // The old snapshot still carries admin.
    assert!(harness.desk.accounts.list_users(&other).await.is_ok());

    let fresh = harness
        .desk
        .accounts
        .authenticate("other", TEST_PASSWORD)
        .await
        .unwrap();
    let err = harness.desk.accounts.list_users(&fresh).await.unwrap_err();
    assert!(matches!(err, CasebookError::Forbidden(_)));
}

#[tokio::test]
async fn delete_user_rules() {
    let harness = TestHarness::new().await.unwrap();
    let admin = harness.seed_admin("root").await.unwrap();
    let sam = harness.seed_agent("sam").await.unwrap();

    let err = harness
        .desk
        .accounts
        .delete_user(&sam, admin.user_id)
        .await
        .unwrap_err();
    assert!(matches!(err, CasebookError::Forbidden(_)));

    let err = harness
        .desk
        .accounts
        .delete_user(&admin, admin.user_id)
        .await
        .unwrap_err();
    assert!(matches!(err, CasebookError::Conflict(_)));

    harness
        .desk
        .accounts
        .delete_user(&admin, sam.user_id)
        .await
        .unwrap();
    let err = harness
        .desk
        .accounts
        .delete_user(&admin, sam.user_id)
        .await
        .unwrap_err();
    assert!(matches!(err, CasebookError::NotFound));
}

#[tokio::test]
async fn bootstrap_admin_rejects_duplicate_name() {
    let harness = TestHarness::new().await.unwrap();
    harness.seed_admin("root").await.unwrap();
    let err = harness
        .desk
        .accounts
        .bootstrap_admin("Root", TEST_PASSWORD, None)
        .await
        .unwrap_err();
    assert!(matches!(err, CasebookError::Conflict(_)));
}

#[tokio::test]
async fn health_reports_healthy_stack() {
    let harness = TestHarness::new().await.unwrap();
    let status = harness.desk.health().await.unwrap();
    assert!(matches!(status, casebook_core::HealthStatus::Healthy));

    harness.notifier.set_failing(true);
    let status = harness.desk.health().await.unwrap();
    assert!(matches!(status, casebook_core::HealthStatus::Degraded(_)));
}
