use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::{DateTime, FixedOffset};
use common::{MyWorkouts, WorkoutRecord, WorkoutWithCoach};
use enrollment::membership::NewWorkout;
use enrollment::{listing, membership, Actor};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::Validate;

use crate::auth::CurrentUser;
use crate::schemas::{
    error_response, validation_error, ApiResponse, AppState, ErrorResponse, SearchQuery,
};

/// Request body for publishing a workout
#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct CreateWorkoutRequest {
    #[validate(length(min = 1))]
    pub title: String,
    pub description: String,
    /// Session time; the offset is dropped and the wall-clock value is
    /// stored
    pub scheduled_at: DateTime<FixedOffset>,
    #[validate(length(min = 1))]
    pub address: String,
    pub price: Option<Decimal>,
    #[validate(length(min = 1))]
    pub sport_category: String,
}

/// Publish a new workout (coach only)
#[utoipa::path(
    post,
    path = "/api/v1/workouts",
    tag = "workouts",
    request_body = CreateWorkoutRequest,
    responses(
        (status = 201, description = "Workout published successfully", body = ApiResponse<WorkoutRecord>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 403, description = "Caller is not a coach", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, user, request), fields(title = %request.title))]
pub async fn create_workout(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<CreateWorkoutRequest>,
) -> Result<(StatusCode, Json<ApiResponse<WorkoutRecord>>), (StatusCode, Json<ErrorResponse>)> {
    if let Err(errors) = request.validate() {
        return Err(validation_error(errors.to_string()));
    }

    let actor = Actor::from_user(&user);
    let workout = membership::create_workout(
        &state.db,
        &actor,
        NewWorkout {
            title: request.title,
            description: request.description,
            scheduled_at: request.scheduled_at,
            address: request.address,
            price: request.price,
            sport_category: request.sport_category,
        },
    )
    .await
    .map_err(error_response)?;

    info!(workout_id = workout.id, "Workout published");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: listing::workout_record(workout),
            message: "Workout created successfully".to_string(),
            success: true,
        }),
    ))
}

/// List every workout, ordered by session time
#[utoipa::path(
    get,
    path = "/api/v1/workouts",
    tag = "workouts",
    params(
        ("search" = Option<String>, Query, description = "Case-insensitive match against title or sport category"),
    ),
    responses(
        (status = 200, description = "Workouts retrieved successfully", body = ApiResponse<Vec<WorkoutWithCoach>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn list_workouts(
    Query(query): Query<SearchQuery>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<WorkoutWithCoach>>>, (StatusCode, Json<ErrorResponse>)> {
    let workouts = listing::list_workouts(&state.db, query.search.as_deref())
        .await
        .map_err(error_response)?;

    Ok(Json(ApiResponse {
        data: workouts,
        message: "Workouts retrieved successfully".to_string(),
        success: true,
    }))
}

/// Get a single workout
#[utoipa::path(
    get,
    path = "/api/v1/workouts/{workout_id}",
    tag = "workouts",
    params(
        ("workout_id" = i32, Path, description = "Workout ID"),
    ),
    responses(
        (status = 200, description = "Workout retrieved successfully", body = ApiResponse<WorkoutWithCoach>),
        (status = 404, description = "Workout not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_workout(
    Path(workout_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<WorkoutWithCoach>>, (StatusCode, Json<ErrorResponse>)> {
    let workout = listing::get_workout(&state.db, workout_id)
        .await
        .map_err(error_response)?;

    Ok(Json(ApiResponse {
        data: workout,
        message: "Workout retrieved successfully".to_string(),
        success: true,
    }))
}

/// Delete a workout (owning coach only)
#[utoipa::path(
    delete,
    path = "/api/v1/workouts/{workout_id}",
    tag = "workouts",
    params(
        ("workout_id" = i32, Path, description = "Workout ID"),
    ),
    responses(
        (status = 200, description = "Workout deleted successfully", body = ApiResponse<String>),
        (status = 404, description = "Workout not found or not owned by the caller", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, user))]
pub async fn delete_workout(
    Path(workout_id): Path<i32>,
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<ApiResponse<String>>, (StatusCode, Json<ErrorResponse>)> {
    let actor = Actor::from_user(&user);
    membership::delete_workout(&state.db, &actor, workout_id)
        .await
        .map_err(error_response)?;

    Ok(Json(ApiResponse {
        data: format!("Workout {} deleted", workout_id),
        message: "Workout deleted successfully".to_string(),
        success: true,
    }))
}

/// Enroll the calling participant in a workout
#[utoipa::path(
    post,
    path = "/api/v1/workouts/{workout_id}/enroll",
    tag = "workouts",
    params(
        ("workout_id" = i32, Path, description = "Workout ID"),
    ),
    responses(
        (status = 200, description = "Enrolled successfully", body = ApiResponse<WorkoutRecord>),
        (status = 403, description = "Coaches cannot enroll", body = ErrorResponse),
        (status = 404, description = "Workout not found", body = ErrorResponse),
        (status = 409, description = "Already enrolled", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, user))]
pub async fn enroll_in_workout(
    Path(workout_id): Path<i32>,
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<ApiResponse<WorkoutRecord>>, (StatusCode, Json<ErrorResponse>)> {
    let actor = Actor::from_user(&user);
    let workout = membership::enroll_in_workout(&state.db, &actor, workout_id)
        .await
        .map_err(error_response)?;

    Ok(Json(ApiResponse {
        data: listing::workout_record(workout),
        message: "Successfully enrolled to workout".to_string(),
        success: true,
    }))
}

/// Remove the calling participant's workout enrollment
#[utoipa::path(
    post,
    path = "/api/v1/workouts/{workout_id}/unenroll",
    tag = "workouts",
    params(
        ("workout_id" = i32, Path, description = "Workout ID"),
    ),
    responses(
        (status = 200, description = "Unenrolled successfully", body = ApiResponse<String>),
        (status = 403, description = "Coaches cannot unenroll", body = ErrorResponse),
        (status = 404, description = "Workout not found", body = ErrorResponse),
        (status = 409, description = "Not enrolled", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, user))]
pub async fn unenroll_from_workout(
    Path(workout_id): Path<i32>,
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<ApiResponse<String>>, (StatusCode, Json<ErrorResponse>)> {
    let actor = Actor::from_user(&user);
    membership::unenroll_from_workout(&state.db, &actor, workout_id)
        .await
        .map_err(error_response)?;

    Ok(Json(ApiResponse {
        data: format!("Unenrolled from workout {}", workout_id),
        message: "Successfully unenrolled from workout".to_string(),
        success: true,
    }))
}

/// List the calling user's workouts: owned ones with rosters for
/// coaches, booked ones with coaches for participants
#[utoipa::path(
    get,
    path = "/api/v1/my/workouts",
    tag = "workouts",
    responses(
        (status = 200, description = "Workouts retrieved successfully", body = ApiResponse<MyWorkouts>),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, user))]
pub async fn my_workouts(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<ApiResponse<MyWorkouts>>, (StatusCode, Json<ErrorResponse>)> {
    let actor = Actor::from_user(&user);
    let workouts = listing::my_workouts(&state.db, &actor)
        .await
        .map_err(error_response)?;

    Ok(Json(ApiResponse {
        data: workouts,
        message: "Workouts retrieved successfully".to_string(),
        success: true,
    }))
}
