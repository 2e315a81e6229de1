use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post, put},
};
use chrono::Utc;
use domain::value_objects::{pagination::PageRequest, subscriptions::CreateOrderModel};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use crate::{
    axum_http::{
        error_responses::{AppError, Localizer},
        request_context::AuthenticatedCaller,
        webhook_signature::{self, SIGNATURE_HEADER},
    },
    wiring::Services,
};

pub struct SubscriptionRouterState {
    pub services: Services,
    pub webhook_secret: Option<String>,
}

pub fn routes(services: Services, webhook_secret: Option<String>) -> Router {
    let state = SubscriptionRouterState {
        services,
        webhook_secret,
    };

    Router::new()
        .route("/me", get(get_my_subscription))
        .route("/orders", post(create_order))
        .route("/payment-callbacks/success", post(payment_success_callback))
        .route("/cancel", post(cancel_subscription))
        .route("/pause", post(pause_subscription))
        .route("/resume", post(resume_subscription))
        .route("/auto-renew", put(set_auto_renew))
        .route("/history", get(subscription_history))
        .route("/expiring", get(expiring_subscriptions))
        .route("/expired/sweep", post(sweep_expired_subscriptions))
        .route("/auto-renewals", post(process_auto_renewals))
        .with_state(Arc::new(state))
}

#[derive(Debug, Default, Deserialize)]
pub struct ReasonRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AutoRenewRequest {
    pub enabled: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExpiringQuery {
    pub days: Option<i64>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AutoRenewalRequest {
    #[serde(default)]
    pub days_before_expiry: Option<i64>,
    #[serde(default)]
    pub dry_run: bool,
}

#[derive(Debug, Deserialize)]
pub struct PaymentSuccessCallback {
    pub order_id: String,
    #[serde(default)]
    pub amount: Option<f64>,
}

pub async fn get_my_subscription(
    State(state): State<Arc<SubscriptionRouterState>>,
    AuthenticatedCaller(ctx): AuthenticatedCaller,
    i18n: Localizer,
) -> Result<impl IntoResponse, AppError> {
    let subscription = state
        .services
        .subscriptions
        .get_my_subscription(&ctx)
        .await
        .map_err(|e| i18n.error(e))?;

    Ok((StatusCode::OK, Json(json!({ "subscription": subscription }))))
}

pub async fn create_order(
    State(state): State<Arc<SubscriptionRouterState>>,
    AuthenticatedCaller(ctx): AuthenticatedCaller,
    i18n: Localizer,
    Json(create_order_model): Json<CreateOrderModel>,
) -> Result<impl IntoResponse, AppError> {
    let order = state
        .services
        .orders
        .create_order(&ctx, create_order_model)
        .await
        .map_err(|e| i18n.error(e))?;

    Ok((StatusCode::CREATED, Json(order)))
}

pub async fn payment_success_callback(
    State(state): State<Arc<SubscriptionRouterState>>,
    i18n: Localizer,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let secret = state.webhook_secret.as_deref().ok_or_else(|| {
        AppError::Unavailable("payment callbacks are not configured".to_string())
    })?;

    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("missing payment signature".to_string()))?;

    if let Err(err) =
        webhook_signature::verify_signature(secret, signature, &body, Utc::now().timestamp())
    {
        warn!(error = ?err, "payments: rejected callback signature");
        return Err(AppError::Unauthorized(
            "invalid payment signature".to_string(),
        ));
    }

    let callback: PaymentSuccessCallback = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("invalid callback body: {}", e)))?;

    let result = state
        .services
        .payments
        .handle_payment_success(&callback.order_id, callback.amount)
        .await
        .map_err(|e| i18n.error(e))?;

    Ok((StatusCode::OK, Json(result)))
}

pub async fn cancel_subscription(
    State(state): State<Arc<SubscriptionRouterState>>,
    AuthenticatedCaller(ctx): AuthenticatedCaller,
    i18n: Localizer,
    body: Option<Json<ReasonRequest>>,
) -> Result<impl IntoResponse, AppError> {
    let reason = body.and_then(|Json(request)| request.reason);

    let subscription = state
        .services
        .subscriptions
        .cancel(&ctx, reason)
        .await
        .map_err(|e| i18n.error(e))?;

    Ok((StatusCode::OK, Json(subscription)))
}

pub async fn pause_subscription(
    State(state): State<Arc<SubscriptionRouterState>>,
    AuthenticatedCaller(ctx): AuthenticatedCaller,
    i18n: Localizer,
    body: Option<Json<ReasonRequest>>,
) -> Result<impl IntoResponse, AppError> {
    let reason = body.and_then(|Json(request)| request.reason);

    let subscription = state
        .services
        .subscriptions
        .pause(&ctx, reason)
        .await
        .map_err(|e| i18n.error(e))?;

    Ok((StatusCode::OK, Json(subscription)))
}

pub async fn resume_subscription(
    State(state): State<Arc<SubscriptionRouterState>>,
    AuthenticatedCaller(ctx): AuthenticatedCaller,
    i18n: Localizer,
) -> Result<impl IntoResponse, AppError> {
    let subscription = state
        .services
        .subscriptions
        .resume(&ctx)
        .await
        .map_err(|e| i18n.error(e))?;

    Ok((StatusCode::OK, Json(subscription)))
}

pub async fn set_auto_renew(
    State(state): State<Arc<SubscriptionRouterState>>,
    AuthenticatedCaller(ctx): AuthenticatedCaller,
    i18n: Localizer,
    Json(request): Json<AutoRenewRequest>,
) -> Result<impl IntoResponse, AppError> {
    let subscription = state
        .services
        .subscriptions
        .set_auto_renew(&ctx, request.enabled)
        .await
        .map_err(|e| i18n.error(e))?;

    Ok((StatusCode::OK, Json(subscription)))
}

pub async fn subscription_history(
    State(state): State<Arc<SubscriptionRouterState>>,
    AuthenticatedCaller(ctx): AuthenticatedCaller,
    i18n: Localizer,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let page = state
        .services
        .subscriptions
        .history(&ctx, PageRequest::new(query.page, query.page_size))
        .await
        .map_err(|e| i18n.error(e))?;

    Ok((StatusCode::OK, Json(page)))
}

pub async fn expiring_subscriptions(
    State(state): State<Arc<SubscriptionRouterState>>,
    AuthenticatedCaller(ctx): AuthenticatedCaller,
    i18n: Localizer,
    Query(query): Query<ExpiringQuery>,
) -> Result<impl IntoResponse, AppError> {
    let page = state
        .services
        .subscriptions
        .expiring(
            &ctx,
            query.days,
            PageRequest::new(query.page, query.page_size),
        )
        .await
        .map_err(|e| i18n.error(e))?;

    Ok((StatusCode::OK, Json(page)))
}

pub async fn sweep_expired_subscriptions(
    State(state): State<Arc<SubscriptionRouterState>>,
    AuthenticatedCaller(ctx): AuthenticatedCaller,
    i18n: Localizer,
) -> Result<impl IntoResponse, AppError> {
    let report = state
        .services
        .expiry_sweeper
        .sweep(&ctx)
        .await
        .map_err(|e| i18n.error(e))?;

    Ok((StatusCode::OK, Json(report)))
}

pub async fn process_auto_renewals(
    State(state): State<Arc<SubscriptionRouterState>>,
    AuthenticatedCaller(ctx): AuthenticatedCaller,
    i18n: Localizer,
    body: Option<Json<AutoRenewalRequest>>,
) -> Result<impl IntoResponse, AppError> {
    let request = body.map(|Json(request)| request).unwrap_or_default();

    let report = state
        .services
        .auto_renewal
        .trigger(&ctx, request.days_before_expiry, request.dry_run)
        .await
        .map_err(|e| i18n.error(e))?;

    Ok((StatusCode::OK, Json(report)))
}
