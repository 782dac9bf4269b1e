//! Tests for every invitation branch and its audit entry.

use std::sync::Mutex;

use super::*;
use crate::domain::ports::{
    AuditLogRepositoryError, FixtureCredentialHasher, MockAccountRepository, MockRoleRepository,
    RoleRepositoryError,
};
use crate::domain::{ErrorCode, Profile};
use chrono::{DateTime, TimeZone, Utc};
use mockable::MockClock;
use rstest::{fixture, rstest};
use zeroize::Zeroizing;

#[derive(Default)]
struct RecordingAuditLog {
    entries: Mutex<Vec<AuditEntry>>,
}

impl RecordingAuditLog {
    fn actions(&self) -> Vec<AuditAction> {
        self.entries
            .lock()
            .expect("audit lock")
            .iter()
            .map(|entry| entry.action)
            .collect()
    }

    fn only_entry(&self) -> AuditEntry {
        let entries = self.entries.lock().expect("audit lock");
        assert_eq!(entries.len(), 1, "expected exactly one audit entry");
        entries.first().cloned().expect("one entry")
    }
}

#[async_trait]
impl AuditLogRepository for RecordingAuditLog {
    async fn append(&self, entry: &AuditEntry) -> Result<(), AuditLogRepositoryError> {
        self.entries.lock().expect("audit lock").push(entry.clone());
        Ok(())
    }
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 7, 1, 9, 0, 0).single().expect("timestamp")
}

fn caller_ip() -> Option<IpAddr> {
    "203.0.113.7".parse().ok()
}

fn request(role: &str) -> InviteStaffRequest {
    InviteStaffRequest {
        email: "new.staff@example.org".to_owned(),
        name: "New Staff".to_owned(),
        password: Zeroizing::new("Welcome123!".to_owned()),
        role: role.to_owned(),
    }
}

fn profile_for(account: &NewAccount) -> Profile {
    Profile {
        id: account.id,
        name: account.name.clone(),
        email: account.email.clone(),
        created_at: account.created_at,
    }
}

struct Harness {
    caller: UserId,
    accounts: MockAccountRepository,
    roles: MockRoleRepository,
    audit: Arc<RecordingAuditLog>,
}

type Service =
    StaffInvitationService<MockAccountRepository, MockRoleRepository, RecordingAuditLog, FixtureCredentialHasher>;

impl Harness {
    /// Caller exists; `can_invite` and `is_admin` drive the two predicates.
    fn known_caller(mut self, can_invite: bool, is_admin: bool) -> Self {
        let caller = self.caller;
        self.accounts
            .expect_find_profile()
            .withf(move |id| *id == caller)
            .returning(move |id| {
                Ok(Some(Profile {
                    id: *id,
                    name: ProfileName::new("Caller").expect("name"),
                    email: EmailAddress::new("caller@example.org").expect("email"),
                    created_at: now(),
                }))
            });
        self.roles
            .expect_can_invite_staff()
            .returning(move |_| Ok(can_invite));
        self.roles
            .expect_has_role()
            .returning(move |_, role| Ok(role == Role::Admin && is_admin));
        self
    }

    fn service(self) -> (Service, Arc<RecordingAuditLog>, UserId) {
        let mut clock = MockClock::new();
        clock.expect_utc().returning(now);
        let audit = Arc::clone(&self.audit);
        let service = StaffInvitationService::new(
            Arc::new(self.accounts),
            Arc::new(self.roles),
            self.audit,
            Arc::new(FixtureCredentialHasher),
            Arc::new(clock),
        );
        (service, audit, self.caller)
    }
}

#[fixture]
fn harness() -> Harness {
    Harness {
        caller: UserId::random(),
        accounts: MockAccountRepository::new(),
        roles: MockRoleRepository::new(),
        audit: Arc::new(RecordingAuditLog::default()),
    }
}

#[rstest]
#[tokio::test]
async fn anonymous_callers_are_audited(harness: Harness) {
    let (service, audit, _) = harness.service();
    let err = service
        .invite(InvitationCaller::Anonymous, request("staff"), caller_ip())
        .await
        .expect_err("anonymous");

    assert_eq!(err.code(), ErrorCode::Unauthorized);
    let entry = audit.only_entry();
    assert_eq!(entry.action, AuditAction::InviteMissingAuth);
    assert_eq!(entry.ip_address, caller_ip());
    assert_eq!(entry.user_id, None);
    assert_eq!(entry.created_at, now());
}

#[rstest]
#[tokio::test]
async fn unreadable_sessions_are_invalid_tokens(harness: Harness) {
    let (service, audit, _) = harness.service();
    let caller = InvitationCaller::Unverifiable {
        reason: "malformed session".to_owned(),
    };
    let err = service
        .invite(caller, request("staff"), None)
        .await
        .expect_err("invalid token");

    assert_eq!(err.code(), ErrorCode::Unauthorized);
    assert_eq!(audit.actions(), vec![AuditAction::InviteInvalidToken]);
}

#[rstest]
#[tokio::test]
async fn unknown_session_users_are_invalid_tokens(mut harness: Harness) {
    harness.accounts.expect_find_profile().return_once(|_| Ok(None));
    let (service, audit, caller) = harness.service();

    let err = service
        .invite(InvitationCaller::User(caller), request("staff"), None)
        .await
        .expect_err("unknown user");

    assert_eq!(err.code(), ErrorCode::Unauthorized);
    assert_eq!(audit.actions(), vec![AuditAction::InviteInvalidToken]);
}

#[rstest]
#[tokio::test]
async fn students_are_forbidden(harness: Harness) {
    let (service, audit, caller) = harness.known_caller(false, false).service();

    let err = service
        .invite(InvitationCaller::User(caller), request("staff"), None)
        .await
        .expect_err("forbidden");

    assert_eq!(err.code(), ErrorCode::Forbidden);
    let entry = audit.only_entry();
    assert_eq!(entry.action, AuditAction::InviteForbidden);
    assert_eq!(entry.user_id, Some(caller));
}

#[rstest]
#[case("student")]
#[case("superuser")]
#[case("")]
#[tokio::test]
async fn non_staff_roles_are_invalid(harness: Harness, #[case] role: &str) {
    let (service, audit, caller) = harness.known_caller(true, true).service();

    let err = service
        .invite(InvitationCaller::User(caller), request(role), None)
        .await
        .expect_err("invalid role");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(audit.actions(), vec![AuditAction::InviteInvalidRole]);
}

#[rstest]
#[tokio::test]
async fn staff_inviting_admins_is_an_escalation(mut harness: Harness) {
    harness.accounts.expect_create().never();
    let (service, audit, caller) = harness.known_caller(true, false).service();

    let err = service
        .invite(InvitationCaller::User(caller), request("admin"), caller_ip())
        .await
        .expect_err("escalation");

    assert_eq!(err.code(), ErrorCode::Forbidden);
    assert_eq!(audit.actions(), vec![AuditAction::InviteEscalationAttempt]);
}

#[rstest]
#[tokio::test]
async fn invalid_payloads_are_creation_failures(mut harness: Harness) {
    harness.accounts.expect_create().never();
    let (service, audit, caller) = harness.known_caller(true, false).service();
    let mut bad = request("staff");
    bad.password = Zeroizing::new("short".to_owned());

    let err = service
        .invite(InvitationCaller::User(caller), bad, None)
        .await
        .expect_err("weak password");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(audit.actions(), vec![AuditAction::InviteUserCreationFailed]);
}

#[rstest]
#[tokio::test]
async fn duplicate_emails_conflict(mut harness: Harness) {
    harness
        .accounts
        .expect_create()
        .return_once(|_| Err(AccountRepositoryError::duplicate_email("new.staff@example.org")));
    let (service, audit, caller) = harness.known_caller(true, false).service();

    let err = service
        .invite(InvitationCaller::User(caller), request("staff"), None)
        .await
        .expect_err("duplicate");

    assert_eq!(err.code(), ErrorCode::Conflict);
    assert_eq!(audit.actions(), vec![AuditAction::InviteUserCreationFailed]);
}

#[rstest]
#[tokio::test]
async fn failed_role_assignment_removes_the_account(mut harness: Harness) {
    harness
        .accounts
        .expect_create()
        .withf(|account| account.roles.is_empty())
        .return_once(|account| Ok(profile_for(account)));
    harness
        .roles
        .expect_assign()
        .return_once(|_, _| Err(RoleRepositoryError::query("constraint violated")));
    harness.accounts.expect_delete().times(1).return_once(|_| Ok(()));
    let (service, audit, caller) = harness.known_caller(true, false).service();

    let err = service
        .invite(InvitationCaller::User(caller), request("staff"), None)
        .await
        .expect_err("role assignment failed");

    assert_eq!(err.code(), ErrorCode::InternalError);
    assert_eq!(audit.actions(), vec![AuditAction::InviteRoleAssignmentFailed]);
}

#[rstest]
#[case("staff", false, Role::Staff)]
#[case(" admin ", true, Role::Admin)]
#[case("staff", true, Role::Staff)]
#[tokio::test]
async fn successful_invitations_are_audited(
    mut harness: Harness,
    #[case] requested: &str,
    #[case] caller_is_admin: bool,
    #[case] expected_role: Role,
) {
    harness
        .accounts
        .expect_create()
        .withf(|account| {
            account.email.as_ref() == "new.staff@example.org"
                && account.password_hash == "fixture$Welcome123!"
        })
        .return_once(|account| Ok(profile_for(account)));
    harness
        .roles
        .expect_assign()
        .withf(move |_, role| *role == expected_role)
        .return_once(|_, _| Ok(true));
    let (service, audit, caller) = harness.known_caller(true, caller_is_admin).service();

    let invited = service
        .invite(InvitationCaller::User(caller), request(requested), caller_ip())
        .await
        .expect("invitation succeeds");

    assert_eq!(invited.role, expected_role);
    assert_eq!(invited.email.as_ref(), "new.staff@example.org");
    let entry = audit.only_entry();
    assert_eq!(entry.action, AuditAction::StaffInvited);
    assert_eq!(entry.user_id, Some(caller));
    assert_eq!(entry.details["newUserId"], json!(invited.user_id));
}
