// SPDX-FileCopyrightText: 2026 Casebook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests for case creation, chat and the case lifecycle.
//!
//! Each test creates an isolated TestHarness with a temp SQLite database and
//! a capturing notifier. Tests are independent and order-insensitive.

use casebook_core::types::{CaseCategory, CaseDraft, CaseStatus, UserId};
use casebook_core::{CasebookError, ChatFeed, StorageAdapter};
use casebook_desk::{Resolved, TokenKind};
use casebook_test_utils::{case_draft, TestHarness};

// ---- Creation ----

#[tokio::test]
async fn created_case_resolves_by_its_chat_token() {
    let harness = TestHarness::new().await.unwrap();
    let (case, message) = harness
        .desk
        .cases
        .create_case(case_draft("Where is my parcel?"), "It has been two weeks")
        .await
        .unwrap();

    assert_eq!(message.case_id, case.id);
    assert!(message.is_sender_customer);
    assert_eq!(harness.storage.list_cases().await.unwrap().len(), 1);
    assert_eq!(harness.storage.list_messages(case.id).await.unwrap().len(), 1);

    let resolved = harness
        .desk
        .resolver
        .resolve(&case.chat_token, TokenKind::Chat)
        .await
        .unwrap();
    assert_eq!(resolved, Resolved::Case(case));
}

#[tokio::test]
async fn bogus_status_and_category_fall_back() {
    let harness = TestHarness::new().await.unwrap();
    let draft = CaseDraft {
        title: "Help".to_string(),
        customer_email: "c@x.com".to_string(),
        status: Some("bogus".to_string()),
        category: Some("bogus".to_string()),
        ..CaseDraft::default()
    };

    let (case, message) = harness.desk.cases.create_case(draft, "hi").await.unwrap();
    assert_eq!(case.status, CaseStatus::Unopened);
    assert_eq!(case.category, CaseCategory::Other);
    assert_eq!(case.customer_first_name, "");
    assert_eq!(message.text, "hi");

    harness.flush_notifications().await;
    let sent = harness.notifier.sent_emails().await;
    assert_eq!(sent.len(), 1);
    assert!(sent[0].html_body.contains(&case.chat_token));
}

#[tokio::test]
async fn customer_names_are_optional_and_trimmed() {
    let harness = TestHarness::new().await.unwrap();
    let draft = CaseDraft {
        customer_first_name: "  Chris ".to_string(),
        customer_last_name: "   ".to_string(),
        ..case_draft("Refund")
    };
    let (case, _) = harness.desk.cases.create_case(draft, "hi").await.unwrap();
    assert_eq!(case.customer_first_name, "Chris");
    assert_eq!(case.customer_last_name, "");
}

#[tokio::test]
async fn case_cannot_be_created_closed() {
    let harness = TestHarness::new().await.unwrap();
    let draft = CaseDraft {
        status: Some("Closed".to_string()),
        ..case_draft("Refund")
    };
    let (case, _) = harness.desk.cases.create_case(draft, "hi").await.unwrap();
    assert_eq!(case.status, CaseStatus::Unopened);
    assert!(case.closed_at.is_none());
}

#[tokio::test]
async fn missing_fields_are_rejected_before_writing() {
    let harness = TestHarness::new().await.unwrap();

    let err = harness
        .desk
        .cases
        .create_case(case_draft("  "), "hi")
        .await
        .unwrap_err();
    assert!(matches!(err, CasebookError::Validation(_)));

    let err = harness
        .desk
        .cases
        .create_case(case_draft("Help"), "   ")
        .await
        .unwrap_err();
    assert!(matches!(err, CasebookError::Validation(_)));

    assert!(harness.storage.list_cases().await.unwrap().is_empty());
}

#[tokio::test]
async fn customer_is_emailed_a_chat_link() {
    let harness = TestHarness::new().await.unwrap();
    let (case, _) = harness
        .desk
        .cases
        .create_case(case_draft("Broken <b>lamp</b>"), "It flickers")
        .await
        .unwrap();
    harness.flush_notifications().await;

    let sent = harness.notifier.sent_emails().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "jane@example.com");
    assert!(sent[0].subject.starts_with("Case Created"));
    assert!(sent[0].html_body.contains(&case.chat_token));
    assert!(!sent[0].html_body.contains("<b>lamp</b>"));
}

#[tokio::test]
async fn notification_failure_does_not_fail_creation() {
    let harness = TestHarness::builder()
        .with_failing_notifier()
        .build()
        .await
        .unwrap();

    let (case, _) = harness
        .desk
        .cases
        .create_case(case_draft("Help"), "hi")
        .await
        .unwrap();
    harness.flush_notifications().await;

    assert_eq!(harness.notifier.sent_count().await, 0);
    assert!(harness.storage.get_case(case.id).await.unwrap().is_some());
}

// ---- Token resolution ----

#[tokio::test]
async fn unknown_and_malformed_tokens_are_indistinguishable() {
    let harness = TestHarness::new().await.unwrap();
    harness
        .desk
        .cases
        .create_case(case_draft("Help"), "hi")
        .await
        .unwrap();

    let unknown = harness
        .desk
        .chat
        .customer_view("6f1c2f9e-5f7a-4d0b-9a57-1b3f8f1d2c3e")
        .await
        .unwrap_err();
    let malformed = harness.desk.chat.customer_view("garbage").await.unwrap_err();

    assert!(matches!(unknown, CasebookError::NotFound));
    assert!(matches!(malformed, CasebookError::NotFound));
    assert_eq!(unknown.to_string(), malformed.to_string());
}

// ---- Chat ----

#[tokio::test]
async fn chat_view_carries_messages_in_order_and_poll_interval() {
    let harness = TestHarness::builder()
        .with_poll_interval_ms(1500)
        .build()
        .await
        .unwrap();
    let agent = harness.seed_agent("sam").await.unwrap();
    let (case, _) = harness
        .desk
        .cases
        .create_case(case_draft("Help"), "first")
        .await
        .unwrap();

    harness
        .desk
        .chat
        .post_agent_message(&agent, case.id, "second")
        .await
        .unwrap();
    harness
        .desk
        .chat
        .post_customer_message(&case.chat_token, "third")
        .await
        .unwrap();

    let view = harness.desk.chat.customer_view(&case.chat_token).await.unwrap();
    let texts: Vec<_> = view.messages.iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, vec!["first", "second", "third"]);
    assert_eq!(
        view.messages.iter().map(|m| m.is_sender_customer).collect::<Vec<_>>(),
        vec![true, false, true]
    );
    assert_eq!(view.poll_interval_ms, 1500);
    assert!(view.handler.is_none());

    let agent_view = harness.desk.chat.agent_view(case.id).await.unwrap();
    assert_eq!(agent_view.messages, view.messages);
}

#[tokio::test]
async fn empty_message_is_rejected() {
    let harness = TestHarness::new().await.unwrap();
    let (case, _) = harness
        .desk
        .cases
        .create_case(case_draft("Help"), "hi")
        .await
        .unwrap();

    let err = harness
        .desk
        .chat
        .post_customer_message(&case.chat_token, "  ")
        .await
        .unwrap_err();
    assert!(matches!(err, CasebookError::Validation(_)));
}

#[tokio::test]
async fn posting_to_unknown_case_is_not_found() {
    let harness = TestHarness::new().await.unwrap();
    let err = harness
        .desk
        .chat
        .post_message(casebook_core::CaseId(404), "hello", false)
        .await
        .unwrap_err();
    assert!(matches!(err, CasebookError::NotFound));
}

#[tokio::test]
async fn closed_case_still_accepts_messages() {
    let harness = TestHarness::new().await.unwrap();
    let (case, _) = harness
        .desk
        .cases
        .create_case(case_draft("Help"), "hi")
        .await
        .unwrap();
    harness.desk.cases.close_case(case.id).await.unwrap();

    harness
        .desk
        .chat
        .post_customer_message(&case.chat_token, "one more thing")
        .await
        .unwrap();
    let view = harness.desk.chat.agent_view(case.id).await.unwrap();
    assert_eq!(view.messages.len(), 2);
    assert_eq!(view.case.status, CaseStatus::Closed);
}

// ---- Lifecycle ----

#[tokio::test]
async fn close_is_idempotent_and_keeps_first_close_time() {
    let harness = TestHarness::new().await.unwrap();
    let (case, _) = harness
        .desk
        .cases
        .create_case(case_draft("Help"), "hi")
        .await
        .unwrap();

    let first = harness.desk.cases.close_case(case.id).await.unwrap();
    assert_eq!(first.status, CaseStatus::Closed);
    assert!(first.closed_at.is_some());

    let second = harness.desk.cases.close_case(case.id).await.unwrap();
    assert_eq!(second.status, CaseStatus::Closed);
    assert_eq!(second.closed_at, first.closed_at);
}

#[tokio::test]
async fn closed_case_cannot_reopen() {
    let harness = TestHarness::new().await.unwrap();
    let (case, _) = harness
        .desk
        .cases
        .create_case(case_draft("Help"), "hi")
        .await
        .unwrap();
    harness.desk.cases.close_case(case.id).await.unwrap();

    let err = harness.desk.cases.open_case(case.id).await.unwrap_err();
    assert!(matches!(err, CasebookError::Conflict(_)));
}

#[tokio::test]
async fn open_case_stamps_opened_at_once() {
    let harness = TestHarness::new().await.unwrap();
    let (case, _) = harness
        .desk
        .cases
        .create_case(case_draft("Help"), "hi")
        .await
        .unwrap();
    assert!(case.opened_at.is_none());

    let opened = harness.desk.cases.open_case(case.id).await.unwrap();
    assert_eq!(opened.status, CaseStatus::Open);
    assert!(opened.opened_at.is_some());

    let again = harness.desk.cases.open_case(case.id).await.unwrap();
    assert_eq!(again.opened_at, opened.opened_at);
}

#[tokio::test]
async fn closing_unknown_case_is_not_found() {
    let harness = TestHarness::new().await.unwrap();
    let err = harness
        .desk
        .cases
        .close_case(casebook_core::CaseId(99))
        .await
        .unwrap_err();
    assert!(matches!(err, CasebookError::NotFound));
}

#[tokio::test]
async fn concurrent_closes_both_succeed() {
    let harness = TestHarness::new().await.unwrap();
    let (case, _) = harness
        .desk
        .cases
        .create_case(case_draft("Help"), "hi")
        .await
        .unwrap();

    let (a, b) = tokio::join!(
        harness.desk.cases.close_case(case.id),
        harness.desk.cases.close_case(case.id)
    );
    let (a, b) = (a.unwrap(), b.unwrap());
    assert_eq!(a.closed_at, b.closed_at);
}

// ---- Handler assignment ----

#[tokio::test]
async fn agent_claims_case_and_it_opens() {
    let harness = TestHarness::new().await.unwrap();
    let agent = harness.seed_agent("sam").await.unwrap();
    let (case, _) = harness
        .desk
        .cases
        .create_case(case_draft("Help"), "hi")
        .await
        .unwrap();

    let claimed = harness
        .desk
        .cases
        .assign_handler(&agent, case.id, agent.user_id)
        .await
        .unwrap();
    assert_eq!(claimed.handler, Some(agent.user_id));
    assert_eq!(claimed.status, CaseStatus::Open);
    assert!(claimed.opened_at.is_some());

    // Same handler again is fine.
    harness
        .desk
        .cases
        .assign_handler(&agent, case.id, agent.user_id)
        .await
        .unwrap();

    let view = harness.desk.chat.customer_view(&case.chat_token).await.unwrap();
    let handler = view.handler.unwrap();
    assert_eq!(handler.id, agent.user_id);
    assert_eq!(handler.user_name, "sam");

    let mine = harness
        .desk
        .cases
        .list_cases_for_handler(agent.user_id)
        .await
        .unwrap();
    assert_eq!(mine.len(), 1);
}

#[tokio::test]
async fn second_agent_cannot_take_a_handled_case() {
    let harness = TestHarness::new().await.unwrap();
    let sam = harness.seed_agent("sam").await.unwrap();
    let kim = harness.seed_agent("kim").await.unwrap();
    let (case, _) = harness
        .desk
        .cases
        .create_case(case_draft("Help"), "hi")
        .await
        .unwrap();

    harness
        .desk
        .cases
        .assign_handler(&sam, case.id, sam.user_id)
        .await
        .unwrap();
    let err = harness
        .desk
        .cases
        .assign_handler(&kim, case.id, kim.user_id)
        .await
        .unwrap_err();
    assert!(matches!(err, CasebookError::Conflict(_)));
}

#[tokio::test]
async fn only_admins_assign_other_agents() {
    let harness = TestHarness::new().await.unwrap();
    let admin = harness.seed_admin("root").await.unwrap();
    let sam = harness.seed_agent("sam").await.unwrap();
    let kim = harness.seed_agent("kim").await.unwrap();
    let (case, _) = harness
        .desk
        .cases
        .create_case(case_draft("Help"), "hi")
        .await
        .unwrap();

    let err = harness
        .desk
        .cases
        .assign_handler(&sam, case.id, kim.user_id)
        .await
        .unwrap_err();
    assert!(matches!(err, CasebookError::Forbidden(_)));

    let assigned = harness
        .desk
        .cases
        .assign_handler(&admin, case.id, kim.user_id)
        .await
        .unwrap();
    assert_eq!(assigned.handler, Some(kim.user_id));
}

#[tokio::test]
async fn closed_case_cannot_be_assigned() {
    let harness = TestHarness::new().await.unwrap();
    let sam = harness.seed_agent("sam").await.unwrap();
    let (case, _) = harness
        .desk
        .cases
        .create_case(case_draft("Help"), "hi")
        .await
        .unwrap();
    harness.desk.cases.close_case(case.id).await.unwrap();

    let err = harness
        .desk
        .cases
        .assign_handler(&sam, case.id, sam.user_id)
        .await
        .unwrap_err();
    assert!(matches!(err, CasebookError::Conflict(ref m) if m.contains("closed")));
}

#[tokio::test]
async fn assigning_unknown_user_is_not_found() {
    let harness = TestHarness::new().await.unwrap();
    let admin = harness.seed_admin("root").await.unwrap();
    let (case, _) = harness
        .desk
        .cases
        .create_case(case_draft("Help"), "hi")
        .await
        .unwrap();

    let err = harness
        .desk
        .cases
        .assign_handler(&admin, case.id, UserId(777))
        .await
        .unwrap_err();
    assert!(matches!(err, CasebookError::NotFound));
}

#[tokio::test]
async fn deleting_handler_releases_the_case() {
    let harness = TestHarness::new().await.unwrap();
    let admin = harness.seed_admin("root").await.unwrap();
    let sam = harness.seed_agent("sam").await.unwrap();
    let (case, _) = harness
        .desk
        .cases
        .create_case(case_draft("Help"), "hi")
        .await
        .unwrap();
    harness
        .desk
        .cases
        .assign_handler(&sam, case.id, sam.user_id)
        .await
        .unwrap();

    harness
        .desk
        .accounts
        .delete_user(&admin, sam.user_id)
        .await
        .unwrap();

    let case = harness.desk.cases.get_case(case.id).await.unwrap();
    assert!(case.handler.is_none());
    assert_eq!(case.status, CaseStatus::Open);
}

#[tokio::test]
async fn cases_list_newest_first() {
    let harness = TestHarness::new().await.unwrap();
    let (older, _) = harness
        .desk
        .cases
        .create_case(case_draft("First"), "hi")
        .await
        .unwrap();
    let (newer, _) = harness
        .desk
        .cases
        .create_case(case_draft("Second"), "hi")
        .await
        .unwrap();

    let ids: Vec<_> = harness
        .desk
        .cases
        .list_cases()
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(ids, vec![newer.id, older.id]);
}
