//! Driving port for inviting staff and admin accounts.

use std::fmt;
use std::net::IpAddr;

use async_trait::async_trait;
use serde::Serialize;
use zeroize::Zeroizing;

use crate::domain::{EmailAddress, Error, ProfileName, Role, UserId};

/// Who is asking, as far as the inbound adapter could tell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvitationCaller {
    /// No credentials were presented.
    Anonymous,
    /// Credentials were presented but could not be read.
    Unverifiable { reason: String },
    /// A session named this user.
    User(UserId),
}

/// Invitation payload. Fields stay raw so every rejection can be audited.
#[derive(Clone, PartialEq, Eq)]
pub struct InviteStaffRequest {
    pub email: String,
    pub name: String,
    pub password: Zeroizing<String>,
    pub role: String,
}

impl fmt::Debug for InviteStaffRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InviteStaffRequest")
            .field("email", &self.email)
            .field("name", &self.name)
            .field("password", &"**redacted**")
            .field("role", &self.role)
            .finish()
    }
}

/// Account created by a successful invitation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvitedStaff {
    pub user_id: UserId,
    pub email: EmailAddress,
    pub name: ProfileName,
    pub role: Role,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StaffInvitation: Send + Sync {
    /// Run the invitation. Every outcome is written to the audit log.
    async fn invite(
        &self,
        caller: InvitationCaller,
        request: InviteStaffRequest,
        ip_address: Option<IpAddr>,
    ) -> Result<InvitedStaff, Error>;
}
