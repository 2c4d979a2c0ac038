use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use common::{CourseRecord, CourseWithCoach, MyCourses, WorkoutRecord};
use enrollment::membership::NewCourse;
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

/// Request body for publishing a course
#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct CreateCourseRequest {
    #[validate(length(min = 1))]
    pub title: String,
    pub description: String,
    pub price: Option<Decimal>,
    /// Workouts to bundle; every id must belong to the calling coach
    pub workout_ids: Vec<i32>,
}

/// A freshly published course with its attached workouts
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CourseCreatedResponse {
    pub course: CourseRecord,
    pub workouts: Vec<WorkoutRecord>,
}

/// Publish a new course bundling owned workouts (coach only)
#[utoipa::path(
    post,
    path = "/api/v1/courses",
    tag = "courses",
    request_body = CreateCourseRequest,
    responses(
        (status = 201, description = "Course published successfully", body = ApiResponse<CourseCreatedResponse>),
        (status = 400, description = "Invalid request or foreign workout ids", body = ErrorResponse),
        (status = 403, description = "Caller is not a coach", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, user, request), fields(title = %request.title))]
pub async fn create_course(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<CreateCourseRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CourseCreatedResponse>>), (StatusCode, Json<ErrorResponse>)>
{
    if let Err(errors) = request.validate() {
        return Err(validation_error(errors.to_string()));
    }

    let actor = Actor::from_user(&user);
    let (course, workouts) = membership::create_course(
        &state.db,
        &actor,
        NewCourse {
            title: request.title,
            description: request.description,
            price: request.price,
            workout_ids: request.workout_ids,
        },
    )
    .await
    .map_err(error_response)?;

    info!(course_id = course.id, "Course published");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: CourseCreatedResponse {
                course: listing::course_record(course),
                workouts: workouts.into_iter().map(listing::workout_record).collect(),
            },
            message: "Course created successfully".to_string(),
            success: true,
        }),
    ))
}

/// List every course
#[utoipa::path(
    get,
    path = "/api/v1/courses",
    tag = "courses",
    params(
        ("search" = Option<String>, Query, description = "Case-insensitive match against course title or member workout sport category"),
    ),
    responses(
        (status = 200, description = "Courses retrieved successfully", body = ApiResponse<Vec<CourseWithCoach>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn list_courses(
    Query(query): Query<SearchQuery>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<CourseWithCoach>>>, (StatusCode, Json<ErrorResponse>)> {
    let courses = listing::list_courses(&state.db, query.search.as_deref())
        .await
        .map_err(error_response)?;

    Ok(Json(ApiResponse {
        data: courses,
        message: "Courses retrieved successfully".to_string(),
        success: true,
    }))
}

/// Get a single course
#[utoipa::path(
    get,
    path = "/api/v1/courses/{course_id}",
    tag = "courses",
    params(
        ("course_id" = i32, Path, description = "Course ID"),
    ),
    responses(
        (status = 200, description = "Course retrieved successfully", body = ApiResponse<CourseWithCoach>),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_course(
    Path(course_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<CourseWithCoach>>, (StatusCode, Json<ErrorResponse>)> {
    let course = listing::get_course(&state.db, course_id)
        .await
        .map_err(error_response)?;

    Ok(Json(ApiResponse {
        data: course,
        message: "Course retrieved successfully".to_string(),
        success: true,
    }))
}

/// Delete a course (owning coach only); member workouts survive
#[utoipa::path(
    delete,
    path = "/api/v1/courses/{course_id}",
    tag = "courses",
    params(
        ("course_id" = i32, Path, description = "Course ID"),
    ),
    responses(
        (status = 200, description = "Course deleted successfully", body = ApiResponse<String>),
        (status = 404, description = "Course not found or not owned by the caller", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, user))]
pub async fn delete_course(
    Path(course_id): Path<i32>,
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<ApiResponse<String>>, (StatusCode, Json<ErrorResponse>)> {
    let actor = Actor::from_user(&user);
    membership::delete_course(&state.db, &actor, course_id)
        .await
        .map_err(error_response)?;

    Ok(Json(ApiResponse {
        data: format!("Course {} deleted", course_id),
        message: "Course deleted successfully".to_string(),
        success: true,
    }))
}

/// Remove a workout from a course's bundle (owning coach only)
#[utoipa::path(
    post,
    path = "/api/v1/courses/{course_id}/workouts/{workout_id}/remove",
    tag = "courses",
    params(
        ("course_id" = i32, Path, description = "Course ID"),
        ("workout_id" = i32, Path, description = "Workout ID"),
    ),
    responses(
        (status = 200, description = "Workout removed from course", body = ApiResponse<WorkoutRecord>),
        (status = 403, description = "Caller is not a coach", body = ErrorResponse),
        (status = 404, description = "Course or workout not found or not owned by the caller", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, user))]
pub async fn detach_workout(
    Path((course_id, workout_id)): Path<(i32, i32)>,
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<ApiResponse<WorkoutRecord>>, (StatusCode, Json<ErrorResponse>)> {
    let actor = Actor::from_user(&user);
    let workout = membership::detach_workout(&state.db, &actor, course_id, workout_id)
        .await
        .map_err(error_response)?;

    Ok(Json(ApiResponse {
        data: listing::workout_record(workout),
        message: "Workout removed from course successfully".to_string(),
        success: true,
    }))
}

/// Enroll the calling participant in a course
#[utoipa::path(
    post,
    path = "/api/v1/courses/{course_id}/enroll",
    tag = "courses",
    params(
        ("course_id" = i32, Path, description = "Course ID"),
    ),
    responses(
        (status = 200, description = "Enrolled successfully", body = ApiResponse<CourseRecord>),
        (status = 403, description = "Coaches cannot enroll", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 409, description = "Already enrolled", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, user))]
pub async fn enroll_in_course(
    Path(course_id): Path<i32>,
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<ApiResponse<CourseRecord>>, (StatusCode, Json<ErrorResponse>)> {
    let actor = Actor::from_user(&user);
    let course = membership::enroll_in_course(&state.db, &actor, course_id)
        .await
        .map_err(error_response)?;

    Ok(Json(ApiResponse {
        data: listing::course_record(course),
        message: "Successfully enrolled to course".to_string(),
        success: true,
    }))
}

/// Remove the calling participant's course enrollment
#[utoipa::path(
    post,
    path = "/api/v1/courses/{course_id}/unenroll",
    tag = "courses",
    params(
        ("course_id" = i32, Path, description = "Course ID"),
    ),
    responses(
        (status = 200, description = "Unenrolled successfully", body = ApiResponse<String>),
        (status = 403, description = "Coaches cannot unenroll", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 409, description = "Not enrolled", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, user))]
pub async fn unenroll_from_course(
    Path(course_id): Path<i32>,
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<ApiResponse<String>>, (StatusCode, Json<ErrorResponse>)> {
    let actor = Actor::from_user(&user);
    membership::unenroll_from_course(&state.db, &actor, course_id)
        .await
        .map_err(error_response)?;

    Ok(Json(ApiResponse {
        data: format!("Unenrolled from course {}", course_id),
        message: "Successfully unenrolled from course".to_string(),
        success: true,
    }))
}

/// List the calling user's courses: owned ones with rosters for
/// coaches, booked ones with coaches for participants
#[utoipa::path(
    get,
    path = "/api/v1/my/courses",
    tag = "courses",
    responses(
        (status = 200, description = "Courses retrieved successfully", body = ApiResponse<MyCourses>),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, user))]
pub async fn my_courses(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<ApiResponse<MyCourses>>, (StatusCode, Json<ErrorResponse>)> {
    let actor = Actor::from_user(&user);
    let courses = listing::my_courses(&state.db, &actor)
        .await
        .map_err(error_response)?;

    Ok(Json(ApiResponse {
        data: courses,
        message: "Courses retrieved successfully".to_string(),
        success: true,
    }))
}
