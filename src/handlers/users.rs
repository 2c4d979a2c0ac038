use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use common::{CoachProfile, UserPublic};
use enrollment::listing;
use model::entities::user;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

use crate::auth::{self, CurrentUser};
use crate::schemas::{store_error, validation_error, ApiResponse, AppState, ErrorResponse};

/// Request body for registering a participant
#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct RegisterUserRequest {
    /// Email address (must be unique)
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub first_name: String,
    #[validate(length(min = 1))]
    pub last_name: String,
    pub middle_name: Option<String>,
    pub phone_number: Option<String>,
    #[validate(length(min = 8))]
    pub password: String,
}

/// Request body for registering a coach
#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct RegisterCoachRequest {
    /// Email address (must be unique)
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub first_name: String,
    #[validate(length(min = 1))]
    pub last_name: String,
    pub middle_name: Option<String>,
    pub phone_number: Option<String>,
    #[validate(length(min = 8))]
    pub password: String,
    /// Coach profile text shown on the public profile
    pub bio: String,
    pub experience_years: i32,
    pub profile_photo_url: Option<String>,
}

/// Request body for logging in
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Bearer token issued on login
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

async fn email_taken(
    state: &AppState,
    email: &str,
) -> Result<bool, (StatusCode, Json<ErrorResponse>)> {
    let existing = user::Entity::find()
        .filter(user::Column::Email.eq(email))
        .one(&state.db)
        .await
        .map_err(store_error)?;
    Ok(existing.is_some())
}

fn email_taken_response(email: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: format!("email '{}' is already registered", email),
            code: "EMAIL_ALREADY_REGISTERED".to_string(),
            success: false,
        }),
    )
}

fn hash_error() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "failed to hash password".to_string(),
            code: "HASH_ERROR".to_string(),
            success: false,
        }),
    )
}

/// Register a participant account
#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "users",
    request_body = RegisterUserRequest,
    responses(
        (status = 201, description = "User registered successfully", body = ApiResponse<UserPublic>),
        (status = 400, description = "Invalid request or email taken", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request), fields(email = %request.email))]
pub async fn register_user(
    State(state): State<AppState>,
    Json(request): Json<RegisterUserRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserPublic>>), (StatusCode, Json<ErrorResponse>)> {
    debug!("Registering participant");
    if let Err(errors) = request.validate() {
        warn!("Registration rejected by validation: {}", errors);
        return Err(validation_error(errors.to_string()));
    }
    if email_taken(&state, &request.email).await? {
        warn!("Registration rejected: email already taken");
        return Err(email_taken_response(&request.email));
    }

    let password_hash = auth::hash_password(&request.password).map_err(|_| hash_error())?;
    let new_user = user::ActiveModel {
        email: Set(request.email),
        first_name: Set(request.first_name),
        last_name: Set(request.last_name),
        middle_name: Set(request.middle_name),
        phone_number: Set(request.phone_number),
        password_hash: Set(password_hash),
        is_coach: Set(false),
        bio: Set(None),
        experience_years: Set(None),
        profile_photo_url: Set(None),
        ..Default::default()
    };
    let user = new_user.insert(&state.db).await.map_err(store_error)?;

    info!(user_id = user.id, "Participant registered");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: listing::user_public(user),
            message: "User registered successfully".to_string(),
            success: true,
        }),
    ))
}

/// Register a coach account
#[utoipa::path(
    post,
    path = "/api/v1/coaches",
    tag = "coaches",
    request_body = RegisterCoachRequest,
    responses(
        (status = 201, description = "Coach registered successfully", body = ApiResponse<UserPublic>),
        (status = 400, description = "Invalid request or email taken", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request), fields(email = %request.email))]
pub async fn register_coach(
    State(state): State<AppState>,
    Json(request): Json<RegisterCoachRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserPublic>>), (StatusCode, Json<ErrorResponse>)> {
    debug!("Registering coach");
    if let Err(errors) = request.validate() {
        warn!("Registration rejected by validation: {}", errors);
        return Err(validation_error(errors.to_string()));
    }
    if email_taken(&state, &request.email).await? {
        warn!("Registration rejected: email already taken");
        return Err(email_taken_response(&request.email));
    }

    let password_hash = auth::hash_password(&request.password).map_err(|_| hash_error())?;
    let new_coach = user::ActiveModel {
        email: Set(request.email),
        first_name: Set(request.first_name),
        last_name: Set(request.last_name),
        middle_name: Set(request.middle_name),
        phone_number: Set(request.phone_number),
        password_hash: Set(password_hash),
        is_coach: Set(true),
        bio: Set(Some(request.bio)),
        experience_years: Set(Some(request.experience_years)),
        profile_photo_url: Set(request.profile_photo_url),
        ..Default::default()
    };
    let coach = new_coach.insert(&state.db).await.map_err(store_error)?;

    info!(user_id = coach.id, "Coach registered");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: listing::user_public(coach),
            message: "Coach registered successfully".to_string(),
            success: true,
        }),
    ))
}

/// Log in with email and password, receiving a bearer token
#[utoipa::path(
    post,
    path = "/api/v1/users/login",
    tag = "users",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<TokenResponse>),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request), fields(email = %request.email))]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<ApiResponse<TokenResponse>>, (StatusCode, Json<ErrorResponse>)> {
    let invalid_credentials = || {
        (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                error: "invalid email or password".to_string(),
                code: "INVALID_CREDENTIALS".to_string(),
                success: false,
            }),
        )
    };

    let user = user::Entity::find()
        .filter(user::Column::Email.eq(request.email.as_str()))
        .one(&state.db)
        .await
        .map_err(store_error)?
        .ok_or_else(|| {
            warn!("Login rejected: unknown email");
            invalid_credentials()
        })?;
    if !auth::verify_password(&request.password, &user.password_hash) {
        warn!(user_id = user.id, "Login rejected: bad password");
        return Err(invalid_credentials());
    }

    let session = auth::issue_session(&state.db, user.id)
        .await
        .map_err(store_error)?;

    info!(user_id = user.id, "Login successful");
    Ok(Json(ApiResponse {
        data: TokenResponse {
            access_token: session.token,
            token_type: "bearer".to_string(),
        },
        message: "Login successful".to_string(),
        success: true,
    }))
}

/// Get the calling user's own record
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    tag = "users",
    responses(
        (status = 200, description = "Current user retrieved", body = ApiResponse<UserPublic>),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    )
)]
#[instrument(skip_all)]
pub async fn me(
    CurrentUser(user): CurrentUser,
) -> Json<ApiResponse<UserPublic>> {
    Json(ApiResponse {
        data: listing::user_public(user),
        message: "Current user retrieved successfully".to_string(),
        success: true,
    })
}

/// List every coach
#[utoipa::path(
    get,
    path = "/api/v1/coaches",
    tag = "coaches",
    responses(
        (status = 200, description = "Coaches retrieved successfully", body = ApiResponse<Vec<UserPublic>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn list_coaches(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<UserPublic>>>, (StatusCode, Json<ErrorResponse>)> {
    let coaches = listing::list_coaches(&state.db)
        .await
        .map_err(crate::schemas::error_response)?;

    Ok(Json(ApiResponse {
        data: coaches,
        message: "Coaches retrieved successfully".to_string(),
        success: true,
    }))
}

/// Get a coach's profile together with every offering they own
#[utoipa::path(
    get,
    path = "/api/v1/coaches/{coach_id}",
    tag = "coaches",
    params(
        ("coach_id" = i32, Path, description = "Coach user ID"),
    ),
    responses(
        (status = 200, description = "Coach profile retrieved", body = ApiResponse<CoachProfile>),
        (status = 404, description = "Coach not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_coach_profile(
    Path(coach_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<CoachProfile>>, (StatusCode, Json<ErrorResponse>)> {
    let profile = listing::coach_profile(&state.db, coach_id)
        .await
        .map_err(crate::schemas::error_response)?;

    Ok(Json(ApiResponse {
        data: profile,
        message: "Coach profile retrieved successfully".to_string(),
        success: true,
    }))
}
