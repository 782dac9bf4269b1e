//! Security audit records.
//!
//! Audit entries are append-only. Each branch of the staff invitation flow
//! has its own action so reviewers can filter on outcome.

use std::fmt;
use std::net::IpAddr;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use super::UserId;

/// Audited action recorded in `security_audit_logs.action`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    InviteMissingAuth,
    InviteInvalidToken,
    InviteForbidden,
    InviteInvalidRole,
    InviteEscalationAttempt,
    InviteUserCreationFailed,
    InviteRoleAssignmentFailed,
    StaffInvited,
    DemoAccountsSeeded,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InviteMissingAuth => "invite_missing_auth",
            Self::InviteInvalidToken => "invite_invalid_token",
            Self::InviteForbidden => "invite_forbidden",
            Self::InviteInvalidRole => "invite_invalid_role",
            Self::InviteEscalationAttempt => "invite_escalation_attempt",
            Self::InviteUserCreationFailed => "invite_user_creation_failed",
            Self::InviteRoleAssignmentFailed => "invite_role_assignment_failed",
            Self::StaffInvited => "staff_invited",
            Self::DemoAccountsSeeded => "demo_accounts_seeded",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An audit record ready to be appended.
///
/// # Examples
/// ```
/// use helpdesk::domain::{AuditAction, AuditEntry};
/// use serde_json::json;
///
/// let entry = AuditEntry::new(AuditAction::InviteMissingAuth, json!({}));
/// assert!(entry.user_id.is_none());
/// assert_eq!(entry.action.as_str(), "invite_missing_auth");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub id: Uuid,
    pub user_id: Option<UserId>,
    pub action: AuditAction,
    pub details: Value,
    pub ip_address: Option<IpAddr>,
    pub created_at: DateTime<Utc>,
}

impl AuditEntry {
    pub fn new(action: AuditAction, details: Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: None,
            action,
            details,
            ip_address: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_user(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn with_ip(mut self, ip_address: Option<IpAddr>) -> Self {
        self.ip_address = ip_address;
        self
    }

    pub fn at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }
}
