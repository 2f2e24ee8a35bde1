use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "MES API",
        version = "0.1.0",
        description = r#"
# Manufacturing Execution API

Production orders, routings, work order operations, pause reasons, data collection and
attachments for shop-floor teams.

## Authentication

Endpoints under `/api` take the dashboard session token, either as
`Authorization: Bearer <token>` or as the session cookie. The token names the user and
the team they have selected; requests without a selected team are rejected with 400.

Endpoints under `/api/v1` take a team API key as `Authorization: Bearer <key>` or
`X-API-Key: <key>`.

## Rate Limiting

`/api/v1` responses carry:
- `X-RateLimit-Limit`: requests allowed per window
- `X-RateLimit-Remaining`: requests left in the current window
- `X-RateLimit-Reset`: end of the current window, epoch milliseconds

## Errors

`/api` errors are `{"error": "..."}`. `/api/v1` errors are
`{"code": "...", "message": "...", "status": 400, "details": ...}`.
        "#
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "orders", description = "Production orders"),
        (name = "routings", description = "Routings and their operations"),
        (name = "work-order-operations", description = "Work order operation lifecycle"),
        (name = "pause-reasons", description = "Pause reason taxonomy and usage"),
        (name = "data-collection", description = "Data collection activities and records"),
        (name = "files", description = "Stored file downloads"),
        (name = "users", description = "Team members"),
        (name = "api-keys", description = "Team API key management"),
        (name = "external", description = "API-key authenticated integration endpoints"),
        (name = "health", description = "Health checks")
    ),
    paths(
        crate::handlers::orders::list_orders,
        crate::handlers::orders::create_order,
        crate::handlers::orders::get_order,
        crate::handlers::orders::complete_order,

        crate::handlers::routings::list_routings,
        crate::handlers::routings::create_routing,
        crate::handlers::routings::get_routing,
        crate::handlers::routings::update_routing,
        crate::handlers::routings::add_operation,
        crate::handlers::routings::update_operation,
        crate::handlers::routings::delete_operation,
        crate::handlers::routings::add_operation_attachment,
        crate::handlers::routings::remove_operation_attachment,

        crate::handlers::work_order_operations::list_work_order_operations,
        crate::handlers::work_order_operations::get_work_order_operation,
        crate::handlers::work_order_operations::update_work_order_operation,
        crate::handlers::work_order_operations::start_work_order_operation,
        crate::handlers::work_order_operations::pause_work_order_operation,
        crate::handlers::work_order_operations::resume_work_order_operation,
        crate::handlers::work_order_operations::complete_work_order_operation,
        crate::handlers::work_order_operations::list_attachments,
        crate::handlers::work_order_operations::add_attachment,
        crate::handlers::work_order_operations::remove_attachment,
        crate::handlers::work_order_operations::get_data_collection,
        crate::handlers::work_order_operations::collect_data,

        crate::handlers::pause_reasons::list_pause_reasons,
        crate::handlers::pause_reasons::create_pause_reason,
        crate::handlers::pause_reasons::update_pause_reason,
        crate::handlers::pause_reasons::delete_pause_reason,
        crate::handlers::pause_reasons::list_categories,
        crate::handlers::pause_reasons::pause_reason_usage,

        crate::handlers::data_collection::list_activities,
        crate::handlers::data_collection::create_activity,
        crate::handlers::data_collection::get_activity,
        crate::handlers::data_collection::update_activity,
        crate::handlers::data_collection::delete_activity,
        crate::handlers::data_collection::assign_activity,
        crate::handlers::data_collection::unassign_activity,
        crate::handlers::data_collection::collect_data,
        crate::handlers::data_collection::list_collections,

        crate::handlers::files::download_file,
        crate::handlers::users::list_users,

        crate::handlers::api_keys::list_api_keys,
        crate::handlers::api_keys::create_api_key,
        crate::handlers::api_keys::get_api_key,
        crate::handlers::api_keys::revoke_api_key,

        crate::handlers::external::performance,
        crate::handlers::external::wip,
        crate::handlers::external::list_activities,
        crate::handlers::external::get_routing,

        crate::handlers::health::liveness_check,
        crate::handlers::health::readiness_check,
        crate::handlers::health::detailed_health_check,
    ),
    components(
        schemas(
            crate::entities::file_record::FileRecord,
            crate::entities::data_collection_activity::ActivityField,
            crate::entities::order::OrderStatus,
            crate::entities::work_order_operation::WooStatus,
            crate::entities::pause_reason::PauseCategory,
            crate::entities::team_member::MemberRole,
            crate::errors::ErrorResponse,
            crate::errors::ExternalErrorBody
        )
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "session",
            SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
        );
        components.add_security_scheme(
            "api_key",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("X-API-Key"))),
        );
    }
}

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_both_surfaces() {
        let json = serde_json::to_string(&ApiDoc::openapi()).unwrap();
        assert!(json.contains("MES API"));
        assert!(json.contains("/api/work-order-operations/{id}/pause"));
        assert!(json.contains("/api/v1/analytics/performance"));
        assert!(json.contains("api_key"));
    }
}
