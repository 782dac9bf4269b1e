//! Driving port for seeding the fixed demo accounts.

use std::net::IpAddr;

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::{EmailAddress, Error, Role, UserId};

/// Whether a demo account was created by this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DemoAccountStatus {
    Created,
    Existing,
}

/// Outcome for one demo account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeededAccount {
    pub user_id: UserId,
    pub email: EmailAddress,
    pub role: Role,
    pub status: DemoAccountStatus,
    /// The role grant was missing and has been added.
    pub role_added: bool,
}

/// Outcome of one seeding run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DemoSeedReport {
    pub accounts: Vec<SeededAccount>,
}

impl DemoSeedReport {
    /// Number of accounts created by this run.
    pub fn created(&self) -> usize {
        self.accounts
            .iter()
            .filter(|account| account.status == DemoAccountStatus::Created)
            .count()
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DemoAccountSeeding: Send + Sync {
    /// Ensure the demo accounts exist. Safe to run repeatedly.
    async fn seed(&self, ip_address: Option<IpAddr>) -> Result<DemoSeedReport, Error>;
}
