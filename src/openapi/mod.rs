use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Bike Shop API",
        version = "1.0.0",
        description = r#"
# Bike Shop Work Order API

Tracks repair jobs for bikes brought into the shop: intake, assignment to a
staff member, completion and removal.

## Authentication

Every work order endpoint requires a bearer JWT:

```
Authorization: Bearer <your-jwt-token>
```

## Error Handling

Failures use a consistent body:

```json
{
  "error": "Not Found",
  "message": "Not found: Work order 42 not found",
  "request_id": "req-abc123xyz",
  "timestamp": "2024-01-01T00:00:00Z"
}
```
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "work-orders", description = "Work order management endpoints")
    ),
    paths(
        crate::handlers::work_orders::list_incomplete_work_orders,
        crate::handlers::work_orders::create_work_order,
        crate::handlers::work_orders::update_work_order,
        crate::handlers::work_orders::complete_work_order,
        crate::handlers::work_orders::delete_work_order,
    ),
    components(
        schemas(
            crate::dto::work_orders::WorkOrderPayload,
            crate::dto::work_orders::WorkOrderDetails,
            crate::dto::work_orders::BikeDetails,
            crate::entities::work_order::Model,
            crate::entities::owner::Model,
            crate::entities::bike_type::Model,
            crate::entities::user_profile::Model,
            crate::errors::ErrorResponse
        )
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDocV1;

/// Registers the `bearer_auth` scheme referenced by the work order paths
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}
