//! Token-based authentication helper: bcrypt password hashing, opaque
//! bearer tokens persisted in the sessions table, and an extractor that
//! resolves the calling user. The enrollment crate trusts the resolved
//! identity completely.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{header, StatusCode};
use axum::response::Json;
use chrono::{Duration, Utc};
use model::entities::{session, user};
use rand::distr::{Alphanumeric, SampleString};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
};
use tracing::warn;

use crate::schemas::{AppState, ErrorResponse};

const TOKEN_LENGTH: usize = 48;
const TOKEN_TTL_DAYS: i64 = 30;

pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
}

pub fn verify_password(password: &str, password_hash: &str) -> bool {
    bcrypt::verify(password, password_hash).unwrap_or(false)
}

/// Issue a fresh bearer token for the user.
pub async fn issue_session(db: &DatabaseConnection, user_id: i32) -> Result<session::Model, DbErr> {
    let token = Alphanumeric.sample_string(&mut rand::rng(), TOKEN_LENGTH);
    let now = Utc::now().naive_utc();

    session::ActiveModel {
        user_id: Set(user_id),
        token: Set(token),
        created_at: Set(now),
        expires_at: Set(now + Duration::days(TOKEN_TTL_DAYS)),
        ..Default::default()
    }
    .insert(db)
    .await
}

fn unauthorized() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse {
            error: "authentication required".to_string(),
            code: "UNAUTHORIZED".to_string(),
            success: false,
        }),
    )
}

fn internal() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "internal store error".to_string(),
            code: "STORE_ERROR".to_string(),
            success: false,
        }),
    )
}

/// The authenticated caller, resolved from the `Authorization: Bearer`
/// header against the sessions table.
pub struct CurrentUser(pub user::Model);

#[axum::async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(unauthorized)?;
        let token = header_value
            .strip_prefix("Bearer ")
            .ok_or_else(unauthorized)?;

        let session = session::Entity::find()
            .filter(session::Column::Token.eq(token))
            .one(&state.db)
            .await
            .map_err(|_| internal())?
            .ok_or_else(|| {
                warn!("Rejected unknown bearer token");
                unauthorized()
            })?;
        if !session.is_valid(Utc::now().naive_utc()) {
            warn!(user_id = session.user_id, "Rejected expired bearer token");
            return Err(unauthorized());
        }

        let user = user::Entity::find_by_id(session.user_id)
            .one(&state.db)
            .await
            .map_err(|_| internal())?
            .ok_or_else(unauthorized)?;

        Ok(CurrentUser(user))
    }
}
