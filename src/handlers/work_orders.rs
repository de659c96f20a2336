use axum::{
    extract::{Json, Path, State},
    response::IntoResponse,
    routing::{get, post, put},
    Extension, Router,
};
use tracing::debug;

use super::common::{created_response, no_content_response, success_response};
use crate::{
    auth::AuthUser,
    dto::work_orders::{WorkOrderDetails, WorkOrderPayload},
    entities::work_order,
    errors::ServiceError,
    AppState,
};

/// Base path the work order routes are mounted under
pub const WORK_ORDERS_PATH: &str = "/api/v1/work-orders";

/// Creates the router for work order endpoints
pub fn work_order_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_work_order))
        .route("/incomplete", get(list_incomplete_work_orders))
        .route("/:id", put(update_work_order).delete(delete_work_order))
        .route("/:id/complete", put(complete_work_order))
}

/// List work orders that have not been completed
#[utoipa::path(
    get,
    path = "/api/v1/work-orders/incomplete",
    responses(
        (status = 200, description = "Open work orders, oldest first", body = [WorkOrderDetails],
            headers(("X-Request-Id" = String, description = "Unique request id"))
        ),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "work-orders"
)]
pub async fn list_incomplete_work_orders(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse, ServiceError> {
    debug!(user_id = %user.user_id, "listing incomplete work orders");
    let orders = state.work_order_service().list_incomplete().await?;
    Ok(success_response(orders))
}

/// Create a new work order
#[utoipa::path(
    post,
    path = "/api/v1/work-orders",
    request_body = WorkOrderPayload,
    responses(
        (status = 201, description = "Work order created", body = work_order::Model,
            headers(
                ("Location" = String, description = "Path of the created work order"),
                ("X-Request-Id" = String, description = "Unique request id")
            )
        ),
        (status = 400, description = "Unknown bike", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "work-orders"
)]
pub async fn create_work_order(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<WorkOrderPayload>,
) -> Result<impl IntoResponse, ServiceError> {
    debug!(user_id = %user.user_id, "creating work order");
    let created = state.work_order_service().create_work_order(payload).await?;
    let location = format!("{}/{}", WORK_ORDERS_PATH, created.id);
    Ok(created_response(&location, created))
}

/// Update description, assignee and bike of a work order
#[utoipa::path(
    put,
    path = "/api/v1/work-orders/{id}",
    params(("id" = i32, Path, description = "Work order ID")),
    request_body = WorkOrderPayload,
    responses(
        (status = 204, description = "Work order updated"),
        (status = 400, description = "Id mismatch or unknown bike", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Work order not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "work-orders"
)]
pub async fn update_work_order(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i32>,
    Json(payload): Json<WorkOrderPayload>,
) -> Result<impl IntoResponse, ServiceError> {
    debug!(user_id = %user.user_id, work_order_id = id, "updating work order");
    state
        .work_order_service()
        .update_work_order(id, payload)
        .await?;
    Ok(no_content_response())
}

/// Mark a work order complete
#[utoipa::path(
    put,
    path = "/api/v1/work-orders/{id}/complete",
    params(("id" = i32, Path, description = "Work order ID")),
    responses(
        (status = 204, description = "Work order completed"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Work order not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "work-orders"
)]
pub async fn complete_work_order(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    debug!(user_id = %user.user_id, work_order_id = id, "completing work order");
    state.work_order_service().complete_work_order(id).await?;
    Ok(no_content_response())
}

/// Delete a work order
#[utoipa::path(
    delete,
    path = "/api/v1/work-orders/{id}",
    params(("id" = i32, Path, description = "Work order ID")),
    responses(
        (status = 204, description = "Work order deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Work order not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "work-orders"
)]
pub async fn delete_work_order(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ServiceError> {
    debug!(user_id = %user.user_id, work_order_id = id, "deleting work order");
    state.work_order_service().delete_work_order(id).await?;
    Ok(no_content_response())
}
