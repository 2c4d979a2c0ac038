use crate::handlers::{
    courses::{
        create_course, delete_course, detach_workout, enroll_in_course, get_course, list_courses,
        my_courses, unenroll_from_course,
    },
    health::health_check,
    users::{get_coach_profile, list_coaches, login, me, register_coach, register_user},
    workouts::{
        create_workout, delete_workout, enroll_in_workout, get_workout, list_workouts,
        my_workouts, unenroll_from_workout,
    },
};
use crate::schemas::{ApiDoc, AppState};
use axum::{
    routing::{delete, get, post},
    Router,
};
use axum_prometheus::metrics_exporter_prometheus::PrometheusHandle;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::OnceLock;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    // The Prometheus recorder is a process-global singleton that may only be
    // installed once per process. Cache the handle so that building the router
    // more than once (as the integration tests do, one server per test) reuses
    // the already-installed recorder instead of panicking on a second install.
    // In production `create_router` runs exactly once, so the observable
    // behaviour is unchanged.
    static METRIC_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();
    let prometheus_layer = PrometheusMetricLayer::new();
    let metric_handle = METRIC_HANDLE
        .get_or_init(|| PrometheusMetricLayer::pair().1)
        .clone();

    Router::new()
        // Health check and metrics
        .route("/health", get(health_check))
        .route("/metrics", get(move || async move { metric_handle.render() }))
        // Registration and login
        .route("/api/v1/users", post(register_user))
        .route("/api/v1/users/login", post(login))
        .route("/api/v1/users/me", get(me))
        // Coach directory
        .route("/api/v1/coaches", post(register_coach))
        .route("/api/v1/coaches", get(list_coaches))
        .route("/api/v1/coaches/:coach_id", get(get_coach_profile))
        // Workout routes
        .route("/api/v1/workouts", post(create_workout))
        .route("/api/v1/workouts", get(list_workouts))
        .route("/api/v1/workouts/:workout_id", get(get_workout))
        .route("/api/v1/workouts/:workout_id", delete(delete_workout))
        .route("/api/v1/workouts/:workout_id/enroll", post(enroll_in_workout))
        .route(
            "/api/v1/workouts/:workout_id/unenroll",
            post(unenroll_from_workout),
        )
        // Course routes
        .route("/api/v1/courses", post(create_course))
        .route("/api/v1/courses", get(list_courses))
        .route("/api/v1/courses/:course_id", get(get_course))
        .route("/api/v1/courses/:course_id", delete(delete_course))
        .route(
            "/api/v1/courses/:course_id/workouts/:workout_id/remove",
            post(detach_workout),
        )
        .route("/api/v1/courses/:course_id/enroll", post(enroll_in_course))
        .route(
            "/api/v1/courses/:course_id/unenroll",
            post(unenroll_from_course),
        )
        // Role-polymorphic "my" views
        .route("/api/v1/my/workouts", get(my_workouts))
        .route("/api/v1/my/courses", get(my_courses))
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30)))
                .layer(CorsLayer::permissive()),
        )
        .layer(prometheus_layer)
        .with_state(state)
}
