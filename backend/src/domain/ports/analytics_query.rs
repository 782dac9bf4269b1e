//! Driving port for the admin analytics report.

use async_trait::async_trait;

use crate::domain::{Actor, AnalyticsReport, AnalyticsWindow, Error};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnalyticsQuery: Send + Sync {
    /// Build the report for `window`. Admin only.
    async fn report(&self, actor: &Actor, window: AnalyticsWindow)
    -> Result<AnalyticsReport, Error>;
}
