#[cfg(test)]
pub mod test_utils {
    use axum::Router;
    use axum_test::TestServer;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{Database, DatabaseConnection};
    use serde_json::Value;

    use crate::handlers::users::{LoginRequest, RegisterCoachRequest, RegisterUserRequest};
    use crate::router::create_router;
    use crate::schemas::{ApiResponse, AppState};

    pub const TEST_PASSWORD: &str = "correct-horse-battery";

    /// Create an in-memory SQLite database for testing
    pub async fn setup_test_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to connect to in-memory database");

        // Run migrations
        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        db
    }

    /// Create AppState for testing
    pub async fn setup_test_app_state() -> AppState {
        AppState {
            db: setup_test_db().await,
        }
    }

    /// Create axum app for testing
    pub async fn setup_test_app() -> Router {
        let state = setup_test_app_state().await;
        create_router(state)
    }

    /// Create a test server around a fresh app
    pub async fn setup_test_server() -> TestServer {
        TestServer::new(setup_test_app().await).expect("Failed to start test server")
    }

    /// Register a coach through the API, returning their user id
    pub async fn register_coach(server: &TestServer, email: &str) -> i32 {
        let response = server
            .post("/api/v1/coaches")
            .json(&RegisterCoachRequest {
                email: email.to_string(),
                first_name: "Casey".to_string(),
                last_name: "Coach".to_string(),
                middle_name: None,
                phone_number: None,
                password: TEST_PASSWORD.to_string(),
                bio: "Certified trainer".to_string(),
                experience_years: 7,
                profile_photo_url: None,
            })
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        let body: ApiResponse<Value> = response.json();
        body.data["id"].as_i64().expect("coach id") as i32
    }

    /// Register a participant through the API, returning their user id
    pub async fn register_participant(server: &TestServer, email: &str) -> i32 {
        let response = server
            .post("/api/v1/users")
            .json(&RegisterUserRequest {
                email: email.to_string(),
                first_name: "Pat".to_string(),
                last_name: "Participant".to_string(),
                middle_name: None,
                phone_number: None,
                password: TEST_PASSWORD.to_string(),
            })
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        let body: ApiResponse<Value> = response.json();
        body.data["id"].as_i64().expect("user id") as i32
    }

    /// Log in through the API, returning a bearer token
    pub async fn login(server: &TestServer, email: &str) -> String {
        let response = server
            .post("/api/v1/users/login")
            .json(&LoginRequest {
                email: email.to_string(),
                password: TEST_PASSWORD.to_string(),
            })
            .await;
        response.assert_status_ok();
        let body: ApiResponse<Value> = response.json();
        body.data["access_token"]
            .as_str()
            .expect("access token")
            .to_string()
    }

    /// Authorization header value for the given token
    pub fn bearer(token: &str) -> (axum::http::HeaderName, axum::http::HeaderValue) {
        (
            axum::http::header::AUTHORIZATION,
            axum::http::HeaderValue::from_str(&format!("Bearer {token}"))
                .expect("valid header value"),
        )
    }
}
