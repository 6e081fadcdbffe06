//! HTTP handlers and routes

use std::sync::Arc;

use axum::{
    extract::{FromRequest, FromRequestParts, Path, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::{AppError, Result};
use crate::lifecycle::ConfirmOutcome;
use crate::models::{
    AssignRequest, CreateDeliveryRequest, DeliveryView, EstimatedDateRequest, Identity,
    LoginRequest, LoginResponse, MessageResponse, NotesRequest, RegisterRequest, Stats,
    UpdateItemsRequest, User,
};
use crate::AppState;

type JsonResult<T> = Result<Json<T>>;

/// JSON body whose rejections render as `AppError`
#[derive(FromRequest)]
#[from_request(via(Json), rejection(AppError))]
struct AppJson<T>(T);

/// Path parameters whose rejections render as `AppError`
#[derive(FromRequestParts)]
#[from_request(via(Path), rejection(AppError))]
struct AppPath<T>(T);

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/deliveries", get(list_deliveries).post(create_delivery))
        .route("/deliveries/:id", get(get_delivery).delete(delete_delivery))
        .route("/deliveries/:id/assign", patch(assign))
        .route("/deliveries/:id/unassign", patch(unassign))
        .route("/deliveries/:id/estimated-date", patch(update_estimated_date))
        .route("/deliveries/:id/items", patch(update_items))
        .route("/deliveries/:id/complete", post(complete))
        .route("/deliveries/:id/client-confirm", post(client_confirm))
        .route("/deliveries/:id/report-problem", post(report_problem))
        .route("/deliveries/:id/resolve-problem", post(resolve_problem))
        .route("/users", get(list_users))
        .route("/users/:id/deactivate", patch(deactivate_user))
        .route("/users/:id/reactivate", patch(reactivate_user))
        .route("/stats", get(stats))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

// Auth

async fn login(
    State(state): State<Arc<AppState>>,
    AppJson(request): AppJson<LoginRequest>,
) -> JsonResult<LoginResponse> {
    let response = state
        .auth
        .login(&request.username, &request.password)
        .await?;
    Ok(Json(response))
}

async fn register(
    State(state): State<Arc<AppState>>,
    AppJson(request): AppJson<RegisterRequest>,
) -> Result<(StatusCode, Json<Identity>)> {
    let identity = state.auth.register(request).await?;
    Ok((StatusCode::CREATED, Json(identity)))
}

// Deliveries

async fn list_deliveries(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
) -> JsonResult<Vec<DeliveryView>> {
    Ok(Json(state.engine.list(&identity).await?))
}

async fn get_delivery(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> JsonResult<DeliveryView> {
    Ok(Json(state.engine.get(&identity, id).await?))
}

async fn create_delivery(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    AppJson(request): AppJson<CreateDeliveryRequest>,
) -> Result<(StatusCode, Json<DeliveryView>)> {
    let delivery = state.engine.create(&identity, request).await?;
    let view = state.engine.view(delivery).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

async fn delete_delivery(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> JsonResult<MessageResponse> {
    state.engine.delete(&identity, id).await?;
    Ok(Json(MessageResponse::new("Delivery deleted")))
}

async fn assign(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    AppPath(id): AppPath<Uuid>,
    body: Option<Json<AssignRequest>>,
) -> JsonResult<DeliveryView> {
    let courier_id = body.and_then(|Json(request)| request.courier_id);
    let delivery = state.engine.assign(&identity, id, courier_id).await?;
    Ok(Json(state.engine.view(delivery).await?))
}

async fn unassign(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> JsonResult<DeliveryView> {
    let delivery = state.engine.unassign(&identity, id).await?;
    Ok(Json(state.engine.view(delivery).await?))
}

async fn update_estimated_date(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(request): AppJson<EstimatedDateRequest>,
) -> JsonResult<DeliveryView> {
    let delivery = state
        .engine
        .update_estimated_date(&identity, id, request.date)
        .await?;
    Ok(Json(state.engine.view(delivery).await?))
}

async fn update_items(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(request): AppJson<UpdateItemsRequest>,
) -> JsonResult<DeliveryView> {
    let delivery = state
        .engine
        .report_pending(&identity, id, &request.items)
        .await?;
    Ok(Json(state.engine.view(delivery).await?))
}

async fn complete(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    AppPath(id): AppPath<Uuid>,
    body: Option<Json<NotesRequest>>,
) -> JsonResult<DeliveryView> {
    let comment = body.and_then(|Json(request)| request.notes);
    let delivery = state
        .engine
        .complete(&identity, id, comment.as_deref())
        .await?;
    Ok(Json(state.engine.view(delivery).await?))
}

async fn client_confirm(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> JsonResult<DeliveryView> {
    let (delivery, outcome) = state.engine.confirm(&identity, id).await?;
    if outcome == ConfirmOutcome::Partial {
        tracing::debug!(delivery_id = %id, "Partial receipt, delivery stays open");
    }
    Ok(Json(state.engine.view(delivery).await?))
}

async fn report_problem(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    AppPath(id): AppPath<Uuid>,
    body: Option<Json<NotesRequest>>,
) -> JsonResult<DeliveryView> {
    let description = body.and_then(|Json(request)| request.notes);
    let delivery = state
        .engine
        .report_problem(&identity, id, description.as_deref())
        .await?;
    Ok(Json(state.engine.view(delivery).await?))
}

async fn resolve_problem(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> JsonResult<DeliveryView> {
    let delivery = state.engine.resolve_problem(&identity, id).await?;
    Ok(Json(state.engine.view(delivery).await?))
}

// Admin

async fn list_users(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
) -> JsonResult<Vec<User>> {
    Ok(Json(state.oversight.list_users(&identity).await?))
}

async fn deactivate_user(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> JsonResult<MessageResponse> {
    state.oversight.set_active(&identity, id, false).await?;
    Ok(Json(MessageResponse::new("User blocked")))
}

async fn reactivate_user(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    AppPath(id): AppPath<Uuid>,
) -> JsonResult<MessageResponse> {
    state.oversight.set_active(&identity, id, true).await?;
    Ok(Json(MessageResponse::new("User unblocked")))
}

async fn stats(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
) -> JsonResult<Stats> {
    Ok(Json(state.oversight.stats(&identity).await?))
}
