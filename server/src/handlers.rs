use axum::extract::{Path, Query, State};
use axum::Json;
use axum_extra::extract::{Query as FormQuery, QueryRejection};
use preload_filter::{build, collect, Condition, DynamicBinding, QueryPlan};
use preload_model::{UserFilterV3, USER};
use preload_storage_common::Record;
use tracing::debug;

use crate::error::ApiError;
use crate::state::AppState;

const USER_ID: &str = "users.id = ?";

/// `GET /user/{id}`: one user with every association loaded. Query parameters
/// restrict the loaded associations through dynamic binding.
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<Record>, ApiError> {
    let id: i64 = id.parse().map_err(|_| ApiError::BadRequest(format!("invalid user id {:?}", id)))?;

    let binding = DynamicBinding::new(&state.catalog, USER);
    let conditions = binding.collect(params)?;
    let plan = QueryPlan::builder().root(Condition::scalar(USER_ID, id)).conditions(conditions).eager_load_all(&state.catalog, USER).build();
    debug!("get_user({}): {:?}", id, plan);

    let records = state.executor.execute(&plan, USER).await?;
    records.into_iter().next().map(Json).ok_or_else(|| ApiError::NotFound(format!("user {} not found", id)))
}

/// `GET /users`: every user matching the flat filter
pub async fn list_users(
    State(state): State<AppState>,
    filter: Result<FormQuery<UserFilterV3>, QueryRejection>,
) -> Result<Json<Vec<Record>>, ApiError> {
    let FormQuery(filter) = filter.map_err(|rejection| ApiError::BadRequest(rejection.to_string()))?;
    let plan = build(collect(&filter));
    debug!("list_users: {:?}", plan);
    Ok(Json(state.executor.execute(&plan, USER).await?))
}
