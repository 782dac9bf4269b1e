//! Aggregate ticket analytics for administrators.
//!
//! [`build_report`] is pure: callers load the rows for the window and pass
//! them in, which keeps the arithmetic testable without a database.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::Serialize;

use super::{Message, ProfileName, Ticket, TicketId, TicketStatus, UserId};

/// Default reporting window in days.
pub const DEFAULT_WINDOW_DAYS: u16 = 30;
/// Largest accepted reporting window in days.
pub const MAX_WINDOW_DAYS: u16 = 365;
/// Number of subjects kept in [`AnalyticsReport::tickets_by_subject`].
pub const TOP_SUBJECTS: usize = 10;

/// Error raised when the requested window is outside `1..=365` days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowOutOfRange {
    pub days: i64,
}

impl fmt::Display for WindowOutOfRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "days must be between 1 and {MAX_WINDOW_DAYS}, got {}",
            self.days
        )
    }
}

impl std::error::Error for WindowOutOfRange {}

/// Reporting window covering today and the preceding `days - 1` UTC days.
///
/// # Examples
/// ```
/// use chrono::{TimeZone, Utc};
/// use helpdesk::domain::AnalyticsWindow;
///
/// let window = AnalyticsWindow::new(7).unwrap();
/// let now = Utc.with_ymd_and_hms(2025, 3, 10, 15, 30, 0).unwrap();
/// assert_eq!(window.start(now), Utc.with_ymd_and_hms(2025, 3, 4, 0, 0, 0).unwrap());
/// assert!(AnalyticsWindow::new(0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalyticsWindow {
    days: u16,
}

impl AnalyticsWindow {
    pub fn new(days: i64) -> Result<Self, WindowOutOfRange> {
        u16::try_from(days)
            .ok()
            .filter(|value| (1..=MAX_WINDOW_DAYS).contains(value))
            .map(|days| Self { days })
            .ok_or(WindowOutOfRange { days })
    }

    pub fn days(&self) -> u16 {
        self.days
    }

    fn first_day(&self, now: DateTime<Utc>) -> NaiveDate {
        now.date_naive() - Duration::days(i64::from(self.days) - 1)
    }

    /// Inclusive lower bound of the window.
    pub fn start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        self.first_day(now).and_time(NaiveTime::MIN).and_utc()
    }
}

impl Default for AnalyticsWindow {
    fn default() -> Self {
        Self {
            days: DEFAULT_WINDOW_DAYS,
        }
    }
}

/// Staff or admin profile included in the performance table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffMember {
    pub id: UserId,
    pub name: ProfileName,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub pending: u64,
    pub in_progress: u64,
    pub completed: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateCount {
    pub date: NaiveDate,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectCount {
    pub subject: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffPerformance {
    pub staff_id: UserId,
    pub name: String,
    pub messages_sent: u64,
    pub tickets_handled: u64,
    pub avg_first_response_minutes: Option<f64>,
    pub tickets_resolved: u64,
    pub avg_resolution_hours: Option<f64>,
}

/// Report returned by the admin analytics endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub window_days: u16,
    pub generated_at: DateTime<Utc>,
    pub total_tickets: u64,
    pub status_counts: StatusCounts,
    pub tickets_by_date: Vec<DateCount>,
    pub tickets_by_subject: Vec<SubjectCount>,
    pub staff_performance: Vec<StaffPerformance>,
}

/// Aggregate tickets and messages created inside `window`.
///
/// Rows outside the window are ignored, so callers may over-fetch.
pub fn build_report(
    window: AnalyticsWindow,
    now: DateTime<Utc>,
    tickets: &[Ticket],
    messages: &[Message],
    staff: &[StaffMember],
) -> AnalyticsReport {
    let start = window.start(now);
    let in_window: Vec<&Ticket> = tickets.iter().filter(|t| t.created_at >= start).collect();
    let by_id: HashMap<TicketId, &Ticket> = in_window.iter().map(|t| (t.id, *t)).collect();
    let window_messages: Vec<&Message> = messages
        .iter()
        .filter(|m| by_id.contains_key(&m.ticket_id))
        .collect();

    AnalyticsReport {
        window_days: window.days(),
        generated_at: now,
        total_tickets: count(in_window.len()),
        status_counts: status_counts(&in_window),
        tickets_by_date: tickets_by_date(window, now, &in_window),
        tickets_by_subject: tickets_by_subject(&in_window),
        staff_performance: staff_performance(staff, &by_id, &window_messages),
    }
}

fn count(value: usize) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}

fn status_counts(tickets: &[&Ticket]) -> StatusCounts {
    tickets
        .iter()
        .fold(StatusCounts::default(), |mut counts, ticket| {
            match ticket.status {
                TicketStatus::Pending => counts.pending += 1,
                TicketStatus::InProgress => counts.in_progress += 1,
                TicketStatus::Completed => counts.completed += 1,
            }
            counts
        })
}

fn tickets_by_date(window: AnalyticsWindow, now: DateTime<Utc>, tickets: &[&Ticket]) -> Vec<DateCount> {
    let mut buckets: BTreeMap<NaiveDate, u64> = window
        .first_day(now)
        .iter_days()
        .take(usize::from(window.days()))
        .map(|date| (date, 0))
        .collect();
    for ticket in tickets {
        if let Some(bucket) = buckets.get_mut(&ticket.created_at.date_naive()) {
            *bucket += 1;
        }
    }
    buckets
        .into_iter()
        .map(|(date, count)| DateCount { date, count })
        .collect()
}

fn tickets_by_subject(tickets: &[&Ticket]) -> Vec<SubjectCount> {
    let mut groups: HashMap<String, SubjectCount> = HashMap::new();
    for ticket in tickets {
        let display = ticket.subject.as_ref().trim();
        groups
            .entry(display.to_lowercase())
            .or_insert_with(|| SubjectCount {
                subject: display.to_owned(),
                count: 0,
            })
            .count += 1;
    }
    let mut subjects: Vec<(String, SubjectCount)> = groups.into_iter().collect();
    subjects.sort_by(|(left_key, left), (right_key, right)| {
        right.count.cmp(&left.count).then_with(|| left_key.cmp(right_key))
    });
    subjects
        .into_iter()
        .take(TOP_SUBJECTS)
        .map(|(_, subject)| subject)
        .collect()
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let total: f64 = values.iter().sum();
    let average = total / values.len() as f64;
    Some((average * 100.0).round() / 100.0)
}

fn staff_performance(
    staff: &[StaffMember],
    tickets: &HashMap<TicketId, &Ticket>,
    messages: &[&Message],
) -> Vec<StaffPerformance> {
    let mut rows: Vec<StaffPerformance> = staff
        .iter()
        .map(|member| member_performance(member, tickets, messages))
        .collect();
    rows.sort_by(|left, right| {
        right
            .tickets_resolved
            .cmp(&left.tickets_resolved)
            .then_with(|| right.messages_sent.cmp(&left.messages_sent))
            .then_with(|| left.name.cmp(&right.name))
    });
    rows
}

fn member_performance(
    member: &StaffMember,
    tickets: &HashMap<TicketId, &Ticket>,
    messages: &[&Message],
) -> StaffPerformance {
    let mut first_reply: HashMap<TicketId, DateTime<Utc>> = HashMap::new();
    let mut messages_sent = 0_u64;
    for message in messages.iter().filter(|m| m.sender_id == member.id) {
        messages_sent += 1;
        first_reply
            .entry(message.ticket_id)
            .and_modify(|at| *at = (*at).min(message.created_at))
            .or_insert(message.created_at);
    }

    let mut response_minutes = Vec::with_capacity(first_reply.len());
    let mut resolution_hours = Vec::new();
    let mut resolved: HashSet<TicketId> = HashSet::new();
    for (ticket_id, replied_at) in &first_reply {
        let Some(ticket) = tickets.get(ticket_id) else {
            continue;
        };
        let waited = *replied_at - ticket.created_at;
        response_minutes.push(waited.num_seconds() as f64 / 60.0);
        if ticket.status == TicketStatus::Completed {
            resolved.insert(*ticket_id);
            let open_for = ticket.updated_at - ticket.created_at;
            resolution_hours.push(open_for.num_seconds() as f64 / 3600.0);
        }
    }

    StaffPerformance {
        staff_id: member.id,
        name: member.name.to_string(),
        messages_sent,
        tickets_handled: count(first_reply.len()),
        avg_first_response_minutes: mean(&response_minutes),
        tickets_resolved: count(resolved.len()),
        avg_resolution_hours: mean(&resolution_hours),
    }
}
