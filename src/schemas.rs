use axum::http::StatusCode;
use axum::response::Json;
use common::{
    CoachProfile, CoachedCourse, CoachedWorkout, CourseRecord, CourseWithCoach, MyCourses,
    MyWorkouts, UserPublic, WorkoutRecord, WorkoutWithCoach,
};
use enrollment::EnrollmentError;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::{OpenApi, ToSchema};

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
}

/// API response wrapper
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success status
    pub success: bool,
}

/// Error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Machine-readable error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}

/// Query parameters for the listing endpoints
#[derive(Debug, Deserialize, ToSchema)]
pub struct SearchQuery {
    /// Case-insensitive substring matched against titles and sport
    /// categories
    pub search: Option<String>,
}

/// Map an enrollment error onto the HTTP surface. Store failures are
/// logged and reported without internal detail.
pub fn error_response(err: EnrollmentError) -> (StatusCode, Json<ErrorResponse>) {
    let (status, code, message) = match &err {
        EnrollmentError::Validation(_) => {
            (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", err.to_string())
        }
        EnrollmentError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string()),
        EnrollmentError::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN", err.to_string()),
        EnrollmentError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT", err.to_string()),
        EnrollmentError::Store(db_error) => {
            error!("Store error surfaced to handler: {}", db_error);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "STORE_ERROR",
                "internal store error".to_string(),
            )
        }
    };
    (
        status,
        Json(ErrorResponse {
            error: message,
            code: code.to_string(),
            success: false,
        }),
    )
}

/// Shortcut for handler-level database failures outside the enrollment
/// crate.
pub fn store_error(db_error: sea_orm::DbErr) -> (StatusCode, Json<ErrorResponse>) {
    error_response(EnrollmentError::Store(db_error))
}

pub fn validation_error(message: impl Into<String>) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.into(),
            code: "VALIDATION_ERROR".to_string(),
            success: false,
        }),
    )
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::users::register_user,
        crate::handlers::users::login,
        crate::handlers::users::me,
        crate::handlers::users::register_coach,
        crate::handlers::users::list_coaches,
        crate::handlers::users::get_coach_profile,
        crate::handlers::workouts::create_workout,
        crate::handlers::workouts::list_workouts,
        crate::handlers::workouts::get_workout,
        crate::handlers::workouts::delete_workout,
        crate::handlers::workouts::enroll_in_workout,
        crate::handlers::workouts::unenroll_from_workout,
        crate::handlers::workouts::my_workouts,
        crate::handlers::courses::create_course,
        crate::handlers::courses::list_courses,
        crate::handlers::courses::get_course,
        crate::handlers::courses::delete_course,
        crate::handlers::courses::detach_workout,
        crate::handlers::courses::enroll_in_course,
        crate::handlers::courses::unenroll_from_course,
        crate::handlers::courses::my_courses,
    ),
    components(
        schemas(
            ErrorResponse,
            HealthResponse,
            SearchQuery,
            UserPublic,
            WorkoutRecord,
            CourseRecord,
            WorkoutWithCoach,
            CoachedWorkout,
            CourseWithCoach,
            CoachedCourse,
            CoachProfile,
            MyWorkouts,
            MyCourses,
            crate::handlers::users::RegisterUserRequest,
            crate::handlers::users::RegisterCoachRequest,
            crate::handlers::users::LoginRequest,
            crate::handlers::users::TokenResponse,
            crate::handlers::workouts::CreateWorkoutRequest,
            crate::handlers::courses::CreateCourseRequest,
            crate::handlers::courses::CourseCreatedResponse,
            ApiResponse<UserPublic>,
            ApiResponse<Vec<UserPublic>>,
            ApiResponse<crate::handlers::users::TokenResponse>,
            ApiResponse<WorkoutRecord>,
            ApiResponse<WorkoutWithCoach>,
            ApiResponse<Vec<WorkoutWithCoach>>,
            ApiResponse<CourseRecord>,
            ApiResponse<CourseWithCoach>,
            ApiResponse<Vec<CourseWithCoach>>,
            ApiResponse<crate::handlers::courses::CourseCreatedResponse>,
            ApiResponse<CoachProfile>,
            ApiResponse<MyWorkouts>,
            ApiResponse<MyCourses>,
            ApiResponse<String>,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "users", description = "Registration, login and profiles"),
        (name = "coaches", description = "Coach directory"),
        (name = "workouts", description = "Workout publishing and enrollment"),
        (name = "courses", description = "Course publishing, membership and enrollment"),
    ),
    info(
        title = "Fitbook API",
        description = "Booking backend for a fitness marketplace: coaches publish workouts and courses, participants browse and enroll",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;
