//! HTTP inbound adapter exposing REST endpoints.
//!
//! Handlers translate JSON requests into driving-port calls; routing lives in
//! [`configure_api`] and [`configure_functions`] so the server binary and the
//! tests mount the same surface.

pub mod analytics;
pub mod attachments;
pub mod auth;
pub mod error;
pub mod functions;
pub mod health;
pub mod messages;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod tickets;
pub mod users;
pub mod validation;

use actix_web::web;

pub use error::ApiResult;

/// Register the `/api/v1` handlers on the enclosing scope.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(auth::signup)
        .service(auth::login)
        .service(auth::logout)
        .service(users::current_user)
        .service(users::list_staff)
        .service(tickets::list_tickets)
        .service(tickets::create_ticket)
        .service(tickets::get_ticket)
        .service(tickets::update_ticket_status)
        .service(messages::list_messages)
        .service(messages::post_message)
        .service(attachments::upload_attachment)
        .service(attachments::download_attachment)
        .service(analytics::analytics_report);
}

/// Register the `/functions/v1` handlers behind their CORS policy.
pub fn configure_functions(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("")
            .wrap(functions::cors())
            .service(functions::invite_staff)
            .service(functions::seed_demo_accounts),
    );
}
