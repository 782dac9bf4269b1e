//! Admin analytics handler.
//!
//! ```text
//! GET /api/v1/admin/analytics?days=7
//! ```

use actix_web::{get, web};
use serde::Deserialize;

use crate::domain::{AnalyticsReport, AnalyticsWindow};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{AnalyticsReportSchema, ErrorSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::map_window_error;

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AnalyticsQueryParams {
    /// Trailing window in whole UTC days, `1..=365`. Defaults to 30.
    #[param(example = 7)]
    pub days: Option<i64>,
}

/// Ticket volume, status mix, popular subjects and staff performance.
#[utoipa::path(
    get,
    path = "/api/v1/admin/analytics",
    params(AnalyticsQueryParams),
    responses(
        (status = 200, description = "Analytics report", body = AnalyticsReportSchema),
        (status = 400, description = "Window out of range", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Admins only", body = ErrorSchema)
    ),
    tags = ["analytics"],
    operation_id = "analyticsReport"
)]
#[get("/admin/analytics")]
pub async fn analytics_report(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<AnalyticsQueryParams>,
) -> ApiResult<web::Json<AnalyticsReport>> {
    let window = match query.days {
        Some(days) => AnalyticsWindow::new(days).map_err(map_window_error)?,
        None => AnalyticsWindow::default(),
    };
    let actor = state.actor(&session).await?;
    let report = state.analytics.report(&actor, window).await?;
    Ok(web::Json(report))
}
