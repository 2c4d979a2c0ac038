#[cfg(test)]
mod integration_tests {
    use axum::http::StatusCode;
    use chrono::{FixedOffset, TimeZone};
    use rust_decimal::Decimal;
    use serde_json::Value;

    use crate::handlers::courses::CreateCourseRequest;
    use crate::handlers::users::LoginRequest;
    use crate::handlers::workouts::CreateWorkoutRequest;
    use crate::schemas::{ApiResponse, ErrorResponse};
    use crate::test_utils::test_utils::{
        bearer, login, register_coach, register_participant, setup_test_server, TEST_PASSWORD,
    };

    fn workout_request(title: &str, sport: &str, day: u32) -> CreateWorkoutRequest {
        CreateWorkoutRequest {
            title: title.to_string(),
            description: "A training session".to_string(),
            scheduled_at: FixedOffset::east_opt(2 * 3600)
                .unwrap()
                .with_ymd_and_hms(2024, 7, day, 18, 30, 0)
                .single()
                .unwrap(),
            address: "1 Gym Street".to_string(),
            price: Some(Decimal::new(1500, 2)),
            sport_category: sport.to_string(),
        }
    }

    async fn create_workout_via_api(
        server: &axum_test::TestServer,
        token: &str,
        title: &str,
        sport: &str,
        day: u32,
    ) -> i64 {
        let (name, value) = bearer(token);
        let response = server
            .post("/api/v1/workouts")
            .add_header(name, value)
            .json(&workout_request(title, sport, day))
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<Value> = response.json();
        body.data["id"].as_i64().expect("workout id")
    }

    #[tokio::test]
    async fn test_health_check() {
        let server = setup_test_server().await;

        let response = server.get("/health").await;
        response.assert_status(StatusCode::OK);
    }

    #[tokio::test]
    async fn test_registration_and_login_flow() {
        let server = setup_test_server().await;

        let user_id = register_participant(&server, "pat@example.com").await;
        assert!(user_id > 0);

        // Duplicate email is rejected with a distinct code.
        let response = server
            .post("/api/v1/users")
            .json(&serde_json::json!({
                "email": "pat@example.com",
                "first_name": "Pat",
                "last_name": "Copy",
                "password": TEST_PASSWORD,
            }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: ErrorResponse = response.json();
        assert_eq!(body.code, "EMAIL_ALREADY_REGISTERED");

        // Malformed email never reaches the store.
        let response = server
            .post("/api/v1/users")
            .json(&serde_json::json!({
                "email": "not-an-email",
                "first_name": "Pat",
                "last_name": "Broken",
                "password": TEST_PASSWORD,
            }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: ErrorResponse = response.json();
        assert_eq!(body.code, "VALIDATION_ERROR");

        // Wrong password is rejected.
        let response = server
            .post("/api/v1/users/login")
            .json(&LoginRequest {
                email: "pat@example.com".to_string(),
                password: "wrong-password".to_string(),
            })
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);

        // Correct credentials yield a usable bearer token.
        let token = login(&server, "pat@example.com").await;
        let (name, value) = bearer(&token);
        let response = server.get("/api/v1/users/me").add_header(name, value).await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Value> = response.json();
        assert_eq!(body.data["email"], "pat@example.com");
        assert_eq!(body.data["is_coach"], false);

        // No token, no identity.
        let response = server.get("/api/v1/users/me").await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_workout_publishing_permissions_and_search() {
        let server = setup_test_server().await;

        register_coach(&server, "coach@example.com").await;
        let coach_token = login(&server, "coach@example.com").await;
        register_participant(&server, "pat@example.com").await;
        let participant_token = login(&server, "pat@example.com").await;

        // Participants may not publish.
        let (name, value) = bearer(&participant_token);
        let response = server
            .post("/api/v1/workouts")
            .add_header(name, value)
            .json(&workout_request("Nope", "yoga", 1))
            .await;
        response.assert_status(StatusCode::FORBIDDEN);

        // The coach publishes two sessions out of order.
        create_workout_via_api(&server, &coach_token, "Evening Yoga", "yoga", 20).await;
        create_workout_via_api(&server, &coach_token, "Morning Run", "running", 5).await;

        // Global listing is public and ordered by session time.
        let response = server.get("/api/v1/workouts").await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Vec<Value>> = response.json();
        assert_eq!(body.data.len(), 2);
        assert_eq!(body.data[0]["workout"]["title"], "Morning Run");
        assert_eq!(body.data[1]["workout"]["title"], "Evening Yoga");
        assert_eq!(body.data[0]["coach"]["email"], "coach@example.com");

        // Search matches title or sport category, case-insensitively.
        let response = server.get("/api/v1/workouts?search=YOGA").await;
        let body: ApiResponse<Vec<Value>> = response.json();
        assert_eq!(body.data.len(), 1);
        assert_eq!(body.data[0]["workout"]["title"], "Evening Yoga");

        let response = server.get("/api/v1/workouts?search=nothing-like-this").await;
        let body: ApiResponse<Vec<Value>> = response.json();
        assert!(body.data.is_empty());
    }

    #[tokio::test]
    async fn test_course_lifecycle_maintains_course_flag() {
        let server = setup_test_server().await;

        register_coach(&server, "coach@example.com").await;
        let coach_token = login(&server, "coach@example.com").await;
        let workout_id =
            create_workout_via_api(&server, &coach_token, "Bundled", "yoga", 3).await;

        // Publish a course bundling the workout.
        let (name, value) = bearer(&coach_token);
        let response = server
            .post("/api/v1/courses")
            .add_header(name, value)
            .json(&CreateCourseRequest {
                title: "Beginner bundle".to_string(),
                description: "Four weeks of basics".to_string(),
                price: Some(Decimal::new(9900, 2)),
                workout_ids: vec![workout_id as i32],
            })
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<Value> = response.json();
        let course_id = body.data["course"]["id"].as_i64().unwrap();
        assert_eq!(body.data["workouts"][0]["is_course_part"], true);

        // The flag shows up in the public listing too.
        let response = server.get("/api/v1/workouts").await;
        let listing: ApiResponse<Vec<Value>> = response.json();
        assert_eq!(listing.data[0]["workout"]["is_course_part"], true);

        // A second coach cannot bundle someone else's workout.
        register_coach(&server, "rival@example.com").await;
        let rival_token = login(&server, "rival@example.com").await;
        let (name, value) = bearer(&rival_token);
        let response = server
            .post("/api/v1/courses")
            .add_header(name, value)
            .json(&CreateCourseRequest {
                title: "Poached".to_string(),
                description: "Not my workout".to_string(),
                price: None,
                workout_ids: vec![workout_id as i32],
            })
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let response = server.get("/api/v1/courses").await;
        let listing: ApiResponse<Vec<Value>> = response.json();
        assert_eq!(listing.data.len(), 1);

        // Detaching clears the flag.
        let (name, value) = bearer(&coach_token);
        let response = server
            .post(&format!(
                "/api/v1/courses/{}/workouts/{}/remove",
                course_id, workout_id
            ))
            .add_header(name, value)
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Value> = response.json();
        assert_eq!(body.data["is_course_part"], false);

        // The course exists with an empty bundle; deleting it works.
        let response = server.get(&format!("/api/v1/courses/{}", course_id)).await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Value> = response.json();
        assert!(body.data["workouts"].as_array().unwrap().is_empty());

        let (name, value) = bearer(&coach_token);
        let response = server
            .delete(&format!("/api/v1/courses/{}", course_id))
            .add_header(name, value)
            .await;
        response.assert_status(StatusCode::OK);
        let response = server.get(&format!("/api/v1/courses/{}", course_id)).await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_enrollment_round_trip_and_conflicts() {
        let server = setup_test_server().await;

        register_coach(&server, "coach@example.com").await;
        let coach_token = login(&server, "coach@example.com").await;
        register_participant(&server, "pat@example.com").await;
        let participant_token = login(&server, "pat@example.com").await;

        let workout_id =
            create_workout_via_api(&server, &coach_token, "Open session", "boxing", 8).await;
        let enroll_path = format!("/api/v1/workouts/{}/enroll", workout_id);
        let unenroll_path = format!("/api/v1/workouts/{}/unenroll", workout_id);

        // Coaches are blocked from participant operations.
        let (name, value) = bearer(&coach_token);
        let response = server.post(&enroll_path).add_header(name, value).await;
        response.assert_status(StatusCode::FORBIDDEN);

        // Enroll, then enroll again: the duplicate conflicts.
        let (name, value) = bearer(&participant_token);
        let response = server.post(&enroll_path).add_header(name, value).await;
        response.assert_status(StatusCode::OK);

        let (name, value) = bearer(&participant_token);
        let response = server.post(&enroll_path).add_header(name, value).await;
        response.assert_status(StatusCode::CONFLICT);
        let body: ErrorResponse = response.json();
        assert_eq!(body.code, "CONFLICT");

        // The roster shows exactly one enrollment.
        let (name, value) = bearer(&coach_token);
        let response = server
            .get("/api/v1/my/workouts")
            .add_header(name, value)
            .await;
        let body: ApiResponse<Value> = response.json();
        assert_eq!(body.data["role"], "coach");
        assert_eq!(
            body.data["workouts"][0]["enrolled_users"]
                .as_array()
                .unwrap()
                .len(),
            1
        );

        // Unenroll restores the pre-enrollment state; a second attempt
        // conflicts.
        let (name, value) = bearer(&participant_token);
        let response = server.post(&unenroll_path).add_header(name, value).await;
        response.assert_status(StatusCode::OK);

        let (name, value) = bearer(&participant_token);
        let response = server.post(&unenroll_path).add_header(name, value).await;
        response.assert_status(StatusCode::CONFLICT);

        // Enrolling in a missing workout is a 404.
        let (name, value) = bearer(&participant_token);
        let response = server
            .post("/api/v1/workouts/99999/enroll")
            .add_header(name, value)
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_course_enrollment_and_my_courses() {
        let server = setup_test_server().await;

        register_coach(&server, "coach@example.com").await;
        let coach_token = login(&server, "coach@example.com").await;
        register_participant(&server, "pat@example.com").await;
        let participant_token = login(&server, "pat@example.com").await;

        let (name, value) = bearer(&coach_token);
        let response = server
            .post("/api/v1/courses")
            .add_header(name, value)
            .json(&CreateCourseRequest {
                title: "Bundle".to_string(),
                description: "Sessions".to_string(),
                price: None,
                workout_ids: vec![],
            })
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<Value> = response.json();
        let course_id = body.data["course"]["id"].as_i64().unwrap();

        let (name, value) = bearer(&participant_token);
        let response = server
            .post(&format!("/api/v1/courses/{}/enroll", course_id))
            .add_header(name, value)
            .await;
        response.assert_status(StatusCode::OK);

        // Participant view lists the booking with the coach resolved.
        let (name, value) = bearer(&participant_token);
        let response = server
            .get("/api/v1/my/courses")
            .add_header(name, value)
            .await;
        let body: ApiResponse<Value> = response.json();
        assert_eq!(body.data["role"], "participant");
        assert_eq!(body.data["courses"][0]["course"]["id"], course_id);
        assert_eq!(body.data["courses"][0]["coach"]["email"], "coach@example.com");

        // Coach view lists the roster.
        let (name, value) = bearer(&coach_token);
        let response = server
            .get("/api/v1/my/courses")
            .add_header(name, value)
            .await;
        let body: ApiResponse<Value> = response.json();
        assert_eq!(body.data["role"], "coach");
        assert_eq!(
            body.data["courses"][0]["enrolled_users"][0]["email"],
            "pat@example.com"
        );
    }

    #[tokio::test]
    async fn test_delete_collapses_ownership_into_not_found() {
        let server = setup_test_server().await;

        register_coach(&server, "coach@example.com").await;
        let coach_token = login(&server, "coach@example.com").await;
        register_coach(&server, "rival@example.com").await;
        let rival_token = login(&server, "rival@example.com").await;

        let workout_id =
            create_workout_via_api(&server, &coach_token, "Mine", "yoga", 2).await;

        // A rival coach gets the same signal as a missing workout.
        let (name, value) = bearer(&rival_token);
        let response = server
            .delete(&format!("/api/v1/workouts/{}", workout_id))
            .add_header(name, value)
            .await;
        response.assert_status(StatusCode::NOT_FOUND);

        // The owner succeeds.
        let (name, value) = bearer(&coach_token);
        let response = server
            .delete(&format!("/api/v1/workouts/{}", workout_id))
            .add_header(name, value)
            .await;
        response.assert_status(StatusCode::OK);

        let response = server.get(&format!("/api/v1/workouts/{}", workout_id)).await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_coach_directory_and_profile() {
        let server = setup_test_server().await;

        let coach_id = register_coach(&server, "coach@example.com").await;
        let coach_token = login(&server, "coach@example.com").await;
        let participant_id = register_participant(&server, "pat@example.com").await;

        create_workout_via_api(&server, &coach_token, "Session", "yoga", 4).await;

        let response = server.get("/api/v1/coaches").await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Vec<Value>> = response.json();
        assert_eq!(body.data.len(), 1);
        assert_eq!(body.data[0]["email"], "coach@example.com");

        let response = server.get(&format!("/api/v1/coaches/{}", coach_id)).await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Value> = response.json();
        assert_eq!(body.data["profile"]["id"], coach_id);
        assert_eq!(body.data["workouts"].as_array().unwrap().len(), 1);

        // Participant ids do not resolve to coach profiles.
        let response = server
            .get(&format!("/api/v1/coaches/{}", participant_id))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
    }
}
