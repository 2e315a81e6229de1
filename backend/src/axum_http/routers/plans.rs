use std::sync::Arc;

use application::usercases::plans::PlanUseCase;
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use domain::value_objects::plans::{
    CreatePlanModel, CreatePlanPricingModel, UpdatePlanModel, UpdatePlanPricingModel,
};
use uuid::Uuid;

use crate::axum_http::{
    error_responses::{AppError, Localizer},
    request_context::{AuthenticatedCaller, Caller},
};

pub fn routes(plan_usecase: Arc<PlanUseCase>) -> Router {
    Router::new()
        .route("/", get(list_plans).post(create_plan))
        .route(
            "/:plan_id",
            get(get_plan).put(update_plan).delete(delete_plan),
        )
        .route("/:plan_id/pricings", get(list_pricings).post(create_pricing))
        .with_state(plan_usecase)
}

pub fn pricing_routes(plan_usecase: Arc<PlanUseCase>) -> Router {
    Router::new()
        .route(
            "/:pricing_id",
            get(get_pricing).put(update_pricing).delete(delete_pricing),
        )
        .with_state(plan_usecase)
}

pub async fn list_plans(
    State(plan_usecase): State<Arc<PlanUseCase>>,
    Caller(ctx): Caller,
    i18n: Localizer,
) -> Result<impl IntoResponse, AppError> {
    let plans = plan_usecase
        .list_plans(&ctx)
        .await
        .map_err(|e| i18n.error(e))?;

    Ok((StatusCode::OK, Json(plans)))
}

pub async fn get_plan(
    State(plan_usecase): State<Arc<PlanUseCase>>,
    Caller(ctx): Caller,
    i18n: Localizer,
    Path(plan_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let plan = plan_usecase
        .get_plan(&ctx, plan_id)
        .await
        .map_err(|e| i18n.error(e))?;

    Ok((StatusCode::OK, Json(plan)))
}

pub async fn create_plan(
    State(plan_usecase): State<Arc<PlanUseCase>>,
    AuthenticatedCaller(ctx): AuthenticatedCaller,
    i18n: Localizer,
    Json(create_plan_model): Json<CreatePlanModel>,
) -> Result<impl IntoResponse, AppError> {
    let plan = plan_usecase
        .create_plan(&ctx, create_plan_model)
        .await
        .map_err(|e| i18n.error(e))?;

    Ok((StatusCode::CREATED, Json(plan)))
}

pub async fn update_plan(
    State(plan_usecase): State<Arc<PlanUseCase>>,
    AuthenticatedCaller(ctx): AuthenticatedCaller,
    i18n: Localizer,
    Path(plan_id): Path<Uuid>,
    Json(update_plan_model): Json<UpdatePlanModel>,
) -> Result<impl IntoResponse, AppError> {
    let plan = plan_usecase
        .update_plan(&ctx, plan_id, update_plan_model)
        .await
        .map_err(|e| i18n.error(e))?;

    Ok((StatusCode::OK, Json(plan)))
}

pub async fn delete_plan(
    State(plan_usecase): State<Arc<PlanUseCase>>,
    AuthenticatedCaller(ctx): AuthenticatedCaller,
    i18n: Localizer,
    Path(plan_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    plan_usecase
        .delete_plan(&ctx, plan_id)
        .await
        .map_err(|e| i18n.error(e))?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_pricings(
    State(plan_usecase): State<Arc<PlanUseCase>>,
    Caller(ctx): Caller,
    i18n: Localizer,
    Path(plan_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let pricings = plan_usecase
        .list_pricings(&ctx, plan_id)
        .await
        .map_err(|e| i18n.error(e))?;

    Ok((StatusCode::OK, Json(pricings)))
}

pub async fn create_pricing(
    State(plan_usecase): State<Arc<PlanUseCase>>,
    AuthenticatedCaller(ctx): AuthenticatedCaller,
    i18n: Localizer,
    Path(plan_id): Path<Uuid>,
    Json(create_pricing_model): Json<CreatePlanPricingModel>,
) -> Result<impl IntoResponse, AppError> {
    let pricing = plan_usecase
        .create_pricing(&ctx, plan_id, create_pricing_model)
        .await
        .map_err(|e| i18n.error(e))?;

    Ok((StatusCode::CREATED, Json(pricing)))
}

pub async fn get_pricing(
    State(plan_usecase): State<Arc<PlanUseCase>>,
    Caller(ctx): Caller,
    i18n: Localizer,
    Path(pricing_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let pricing = plan_usecase
        .get_pricing(&ctx, pricing_id)
        .await
        .map_err(|e| i18n.error(e))?;

    Ok((StatusCode::OK, Json(pricing)))
}

pub async fn update_pricing(
    State(plan_usecase): State<Arc<PlanUseCase>>,
    AuthenticatedCaller(ctx): AuthenticatedCaller,
    i18n: Localizer,
    Path(pricing_id): Path<i64>,
    Json(update_pricing_model): Json<UpdatePlanPricingModel>,
) -> Result<impl IntoResponse, AppError> {
    let pricing = plan_usecase
        .update_pricing(&ctx, pricing_id, update_pricing_model)
        .await
        .map_err(|e| i18n.error(e))?;

    Ok((StatusCode::OK, Json(pricing)))
}

pub async fn delete_pricing(
    State(plan_usecase): State<Arc<PlanUseCase>>,
    AuthenticatedCaller(ctx): AuthenticatedCaller,
    i18n: Localizer,
    Path(pricing_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    plan_usecase
        .delete_pricing(&ctx, pricing_id)
        .await
        .map_err(|e| i18n.error(e))?;

    Ok(StatusCode::NO_CONTENT)
}
