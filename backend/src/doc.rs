//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint of the inbound layer, the schema
//! wrappers that describe domain payloads without coupling domain types to
//! utoipa, and the session cookie security scheme.
//!
//! The document backs Swagger UI in debug builds and is exported with
//! `cargo run --bin openapi-dump`.

use crate::inbound::http::auth::{LoginBody, SignupBody};
use crate::inbound::http::functions::InviteStaffBody;
use crate::inbound::http::messages::PostMessageBody;
use crate::inbound::http::schemas::{
    AnalyticsReportSchema, AttachmentKindSchema, DateCountSchema, DemoAccountStatusSchema,
    DemoSeedReportSchema, ErrorCodeSchema, ErrorSchema, InvitedStaffSchema, MediaAssetSchema,
    MessageKindSchema, MessageSchema, MessageWithAttachmentsSchema, ProfileSchema,
    ProfileWithRolesSchema, RoleSchema, SeededAccountSchema, StaffPerformanceSchema,
    StatusCountsSchema, SubjectCountSchema, TicketSchema, TicketStatusSchema,
};
use crate::inbound::http::tickets::{CreateTicketBody, UpdateStatusBody};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/auth/login or /api/v1/auth/signup.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Helpdesk backend API",
        description = "Student support tickets with threaded messages, attachments, \
            staff administration and analytics."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::signup,
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::logout,
        crate::inbound::http::users::current_user,
        crate::inbound::http::users::list_staff,
        crate::inbound::http::tickets::list_tickets,
        crate::inbound::http::tickets::create_ticket,
        crate::inbound::http::tickets::get_ticket,
        crate::inbound::http::tickets::update_ticket_status,
        crate::inbound::http::messages::list_messages,
        crate::inbound::http::messages::post_message,
        crate::inbound::http::attachments::upload_attachment,
        crate::inbound::http::attachments::download_attachment,
        crate::inbound::http::analytics::analytics_report,
        crate::inbound::http::functions::invite_staff,
        crate::inbound::http::functions::seed_demo_accounts,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        RoleSchema,
        ProfileSchema,
        ProfileWithRolesSchema,
        TicketStatusSchema,
        TicketSchema,
        MessageKindSchema,
        MessageSchema,
        MessageWithAttachmentsSchema,
        AttachmentKindSchema,
        MediaAssetSchema,
        StatusCountsSchema,
        DateCountSchema,
        SubjectCountSchema,
        StaffPerformanceSchema,
        AnalyticsReportSchema,
        InvitedStaffSchema,
        DemoAccountStatusSchema,
        SeededAccountSchema,
        DemoSeedReportSchema,
        SignupBody,
        LoginBody,
        CreateTicketBody,
        UpdateStatusBody,
        PostMessageBody,
        InviteStaffBody,
    )),
    tags(
        (name = "auth", description = "Signup, login and logout"),
        (name = "users", description = "Profiles and the staff directory"),
        (name = "tickets", description = "Support tickets"),
        (name = "messages", description = "Ticket conversations"),
        (name = "attachments", description = "Images and PDF files on messages"),
        (name = "analytics", description = "Admin reporting"),
        (name = "functions", description = "Privileged edge functions"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use utoipa::OpenApi;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[rstest]
    #[case("Error", "traceId")]
    #[case("Ticket", "studentId")]
    #[case("MediaAsset", "storagePath")]
    #[case("AnalyticsReport", "staffPerformance")]
    fn registered_schemas_use_camel_case(#[case] name: &str, #[case] field: &str) {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let schema = schemas.get(name).unwrap_or_else(|| panic!("{name} schema"));
        assert_object_schema_has_field(schema, field);
    }

    #[rstest]
    #[case("/api/v1/tickets")]
    #[case("/api/v1/tickets/{id}/status")]
    #[case("/api/v1/messages/{id}/attachments")]
    #[case("/api/v1/admin/analytics")]
    #[case("/functions/v1/invite-staff")]
    #[case("/health/ready")]
    fn every_route_is_documented(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }

    #[rstest]
    fn session_cookie_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("SessionCookie"));
    }
}
