// SPDX-FileCopyrightText: 2026 Casebook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across adapter traits and desk services.
//!
//! Timestamps are UTC strings in `%Y-%m-%dT%H:%M:%S%.3fZ` form, assigned by
//! the store. The fixed width makes lexical order equal chronological order.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Store-assigned identifier of a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CaseId(pub i64);

/// Store-assigned identifier of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub i64);

/// Store-assigned identifier of a user (agent or admin).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter behind a trait object.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Storage,
    Notifier,
}

// --- Permissive decoding ---

/// Result of decoding an enumerated value with a safe fallback.
///
/// `fallback_applied` is true only when input was present but unrecognized.
/// Absent input takes the default silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoded<T> {
    pub value: T,
    pub fallback_applied: bool,
}

/// Decode `raw` into `T`, substituting `fallback` for unrecognized input.
pub fn decode_lenient<T: FromStr>(raw: Option<&str>, fallback: T) -> Decoded<T> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Decoded {
            value: fallback,
            fallback_applied: false,
        },
        Some(s) => match s.parse::<T>() {
            Ok(value) => Decoded {
                value,
                fallback_applied: false,
            },
            Err(_) => Decoded {
                value: fallback,
                fallback_applied: true,
            },
        },
    }
}

// --- Cases ---

/// Lifecycle status of a case. Moves forward only; `Closed` is terminal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(ascii_case_insensitive)]
pub enum CaseStatus {
    Unopened,
    Open,
    Closed,
}

impl CaseStatus {
    /// Whether the state machine permits moving from `self` to `next`.
    pub fn can_transition_to(self, next: CaseStatus) -> bool {
        matches!(
            (self, next),
            (CaseStatus::Unopened, CaseStatus::Open)
                | (CaseStatus::Unopened, CaseStatus::Closed)
                | (CaseStatus::Open, CaseStatus::Closed)
        )
    }

    pub fn is_terminal(self) -> bool {
        self == CaseStatus::Closed
    }

    /// Decode caller-supplied status. Unknown values fall back to `Unopened`.
    pub fn decode(raw: Option<&str>) -> Decoded<Self> {
        decode_lenient(raw, CaseStatus::Unopened)
    }
}

/// Classification of a case.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(ascii_case_insensitive)]
pub enum CaseCategory {
    Shipping,
    Payment,
    Product,
    Account,
    Other,
}

impl CaseCategory {
    /// Decode caller-supplied category. Unknown values fall back to `Other`.
    pub fn decode(raw: Option<&str>) -> Decoded<Self> {
        decode_lenient(raw, CaseCategory::Other)
    }
}

/// Raw customer submission, before validation and enum decoding.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CaseDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub customer_first_name: String,
    #[serde(default)]
    pub customer_last_name: String,
    #[serde(default)]
    pub customer_email: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

/// A validated case ready to be inserted by the store.
#[derive(Debug, Clone)]
pub struct NewCase {
    pub status: CaseStatus,
    pub category: CaseCategory,
    pub title: String,
    pub customer_first_name: String,
    pub customer_last_name: String,
    pub customer_email: String,
}

/// One customer support conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Case {
    pub id: CaseId,
    pub status: CaseStatus,
    pub category: CaseCategory,
    pub title: String,
    pub customer_first_name: String,
    pub customer_last_name: String,
    pub customer_email: String,
    pub opened_at: Option<String>,
    pub closed_at: Option<String>,
    pub handler: Option<UserId>,
    /// Bearer credential for the customer chat. Immutable.
    pub chat_token: String,
    pub created_at: String,
}

/// A single chat message within a case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub case_id: CaseId,
    pub text: String,
    /// The only sender attribution on a message.
    pub is_sender_customer: bool,
    pub timestamp: String,
}

/// Display details of the agent handling a case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerSummary {
    pub id: UserId,
    pub user_name: String,
}

/// Full conversation state returned on every poll.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatView {
    #[serde(rename = "caseDetails")]
    pub case: Case,
    /// Ascending by timestamp.
    pub messages: Vec<Message>,
    pub handler: Option<HandlerSummary>,
    /// Suggested delay before the client's next poll.
    pub poll_interval_ms: u64,
}

// --- Users ---

/// Back-office role.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    CustomerSupport,
}

impl Role {
    /// Decode caller-supplied role. Unknown values fall back to the
    /// least-privileged role, `customer_support`.
    pub fn decode(raw: Option<&str>) -> Decoded<Self> {
        decode_lenient(raw, Role::CustomerSupport)
    }
}

/// Registration state of an account.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    /// Invited, cannot authenticate yet.
    Pending,
    /// Registration redeemed.
    Complete,
}

/// A back-office account.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub user_name: String,
    #[serde(skip_serializing, default)]
    pub password_hash: Option<String>,
    pub role: Role,
    pub email: Option<String>,
    pub active: bool,
    pub status: UserStatus,
    #[serde(skip_serializing, default)]
    pub register_token: Option<String>,
    pub created_at: String,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("user_name", &self.user_name)
            .field("password_hash", &self.password_hash.as_ref().map(|_| "[redacted]"))
            .field("role", &self.role)
            .field("email", &self.email)
            .field("active", &self.active)
            .field("status", &self.status)
            .field(
                "register_token",
                &self.register_token.as_ref().map(|_| "[redacted]"),
            )
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// A validated account ready to be inserted by the store.
///
/// Pending accounts get a fresh register token from the store.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub user_name: String,
    pub email: Option<String>,
    pub role: Role,
    pub active: bool,
    pub status: UserStatus,
    pub password_hash: Option<String>,
}

/// Partial update applied by an admin. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub user_name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub active: Option<bool>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self.user_name.is_none()
            && self.email.is_none()
            && self.role.is_none()
            && self.active.is_none()
    }
}
