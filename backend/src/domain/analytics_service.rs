//! Admin analytics and the staff directory.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::debug;

use crate::domain::access;
use crate::domain::port_errors::{map_account_error, map_message_error, map_ticket_error};
use crate::domain::ports::{
    AccountRepository, AnalyticsQuery, MessageRepository, StaffQuery, TicketRepository,
};
use crate::domain::{
    Actor, AnalyticsReport, AnalyticsWindow, Error, ProfileWithRoles, StaffMember, build_report,
};

/// Loads the window's rows and hands them to [`build_report`].
#[derive(Clone)]
pub struct AnalyticsService<T, M, A> {
    tickets: Arc<T>,
    messages: Arc<M>,
    accounts: Arc<A>,
    clock: Arc<dyn Clock>,
}

impl<T, M, A> AnalyticsService<T, M, A> {
    pub fn new(tickets: Arc<T>, messages: Arc<M>, accounts: Arc<A>, clock: Arc<dyn Clock>) -> Self {
        Self {
            tickets,
            messages,
            accounts,
            clock,
        }
    }
}

#[async_trait]
impl<T, M, A> AnalyticsQuery for AnalyticsService<T, M, A>
where
    T: TicketRepository,
    M: MessageRepository,
    A: AccountRepository,
{
    async fn report(
        &self,
        actor: &Actor,
        window: AnalyticsWindow,
    ) -> Result<AnalyticsReport, Error> {
        if !access::can_view_analytics(actor) {
            return Err(Error::forbidden("analytics are restricted to admins"));
        }

        let now = self.clock.utc();
        let since = window.start(now);
        let tickets = self
            .tickets
            .list_created_since(since)
            .await
            .map_err(map_ticket_error)?;
        let messages = self
            .messages
            .list_created_since(since)
            .await
            .map_err(map_message_error)?;
        let staff: Vec<StaffMember> = self
            .accounts
            .list_staff()
            .await
            .map_err(map_account_error)?
            .into_iter()
            .map(|member| StaffMember {
                id: member.profile.id,
                name: member.profile.name,
            })
            .collect();

        debug!(
            days = window.days(),
            tickets = tickets.len(),
            messages = messages.len(),
            staff = staff.len(),
            "building analytics report"
        );
        Ok(build_report(window, now, &tickets, &messages, &staff))
    }
}

/// Admin-only listing of staff and admin profiles.
#[derive(Clone)]
pub struct StaffDirectory<A> {
    accounts: Arc<A>,
}

impl<A> StaffDirectory<A> {
    pub fn new(accounts: Arc<A>) -> Self {
        Self { accounts }
    }
}

#[async_trait]
impl<A> StaffQuery for StaffDirectory<A>
where
    A: AccountRepository,
{
    async fn list_staff(&self, actor: &Actor) -> Result<Vec<ProfileWithRoles>, Error> {
        if !access::can_list_staff(actor) {
            return Err(Error::forbidden("the staff directory is restricted to admins"));
        }
        self.accounts.list_staff().await.map_err(map_account_error)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ports::{
        FixtureAccountRepository, FixtureMessageRepository, FixtureTicketRepository,
        MockAccountRepository, MockMessageRepository, MockTicketRepository,
    };
    use crate::domain::{ErrorCode, Role, UserId};
    use chrono::{DateTime, TimeZone, Utc};
    use mockable::{DefaultClock, MockClock};
    use rstest::rstest;

    fn actor(roles: &[Role]) -> Actor {
        Actor::new(UserId::random(), roles.iter().copied().collect())
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 30, 18, 0, 0).single().expect("timestamp")
    }

    #[rstest]
    #[case(&[Role::Student])]
    #[case(&[Role::Staff])]
    #[tokio::test]
    async fn non_admins_are_refused(#[case] roles: &'static [Role]) {
        let service = AnalyticsService::new(
            Arc::new(FixtureTicketRepository),
            Arc::new(FixtureMessageRepository),
            Arc::new(FixtureAccountRepository),
            Arc::new(DefaultClock),
        );
        let err = service
            .report(&actor(roles), AnalyticsWindow::default())
            .await
            .expect_err("forbidden");
        assert_eq!(err.code(), ErrorCode::Forbidden);

        let directory = StaffDirectory::new(Arc::new(FixtureAccountRepository));
        let err = directory.list_staff(&actor(roles)).await.expect_err("forbidden");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    #[tokio::test]
    async fn report_loads_rows_from_window_start() {
        let window = AnalyticsWindow::new(7).expect("window");
        let expected_since = window.start(now());

        let mut tickets = MockTicketRepository::new();
        tickets
            .expect_list_created_since()
            .withf(move |since| *since == expected_since)
            .return_once(|_| Ok(Vec::new()));
        let mut messages = MockMessageRepository::new();
        messages
            .expect_list_created_since()
            .withf(move |since| *since == expected_since)
            .return_once(|_| Ok(Vec::new()));
        let mut accounts = MockAccountRepository::new();
        accounts.expect_list_staff().return_once(|| Ok(Vec::new()));
        let mut clock = MockClock::new();
        clock.expect_utc().returning(now);

        let report = AnalyticsService::new(
            Arc::new(tickets),
            Arc::new(messages),
            Arc::new(accounts),
            Arc::new(clock),
        )
        .report(&actor(&[Role::Admin]), window)
        .await
        .expect("report");

        assert_eq!(report.window_days, 7);
        assert_eq!(report.tickets_by_date.len(), 7);
        assert_eq!(report.generated_at, now());
    }
}
