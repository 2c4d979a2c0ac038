//! Shared fixtures for the in-crate tests: an in-memory database with
//! migrations applied plus seed users and operation inputs.

use chrono::FixedOffset;
use chrono::TimeZone;
use migration::{Migrator, MigratorTrait};
use model::entities::user;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, Set};

use crate::actor::Actor;
use crate::membership::{NewCourse, NewWorkout};

pub(crate) async fn setup_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory database");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}

async fn seed_user(db: &DatabaseConnection, email: &str, is_coach: bool) -> user::Model {
    user::ActiveModel {
        email: Set(email.to_string()),
        first_name: Set("Test".to_string()),
        last_name: Set("User".to_string()),
        middle_name: Set(None),
        phone_number: Set(None),
        password_hash: Set("not-a-real-hash".to_string()),
        is_coach: Set(is_coach),
        bio: Set(is_coach.then(|| "Certified".to_string())),
        experience_years: Set(is_coach.then_some(5)),
        profile_photo_url: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to seed user")
}

pub(crate) async fn seed_coach(db: &DatabaseConnection, email: &str) -> user::Model {
    seed_user(db, email, true).await
}

pub(crate) async fn seed_participant(db: &DatabaseConnection, email: &str) -> user::Model {
    seed_user(db, email, false).await
}

pub(crate) fn coach_actor(user: &user::Model) -> Actor {
    assert!(user.is_coach, "fixture must be a coach");
    Actor::from_user(user)
}

pub(crate) fn participant_actor(user: &user::Model) -> Actor {
    assert!(!user.is_coach, "fixture must be a participant");
    Actor::from_user(user)
}

/// Workout input on a fixed day; see [`workout_input_on_day`] for
/// tests that depend on ordering.
pub(crate) fn sample_workout_input(title: &str, sport: &str) -> NewWorkout {
    workout_input_on_day(title, sport, 15)
}

pub(crate) fn workout_input_on_day(title: &str, sport: &str, day: u32) -> NewWorkout {
    let offset = FixedOffset::east_opt(3 * 3600).expect("valid offset");
    NewWorkout {
        title: title.to_string(),
        description: "A training session".to_string(),
        scheduled_at: offset
            .with_ymd_and_hms(2024, 6, day, 10, 0, 0)
            .single()
            .expect("valid timestamp"),
        address: "1 Gym Street".to_string(),
        price: Some(Decimal::new(2500, 2)),
        sport_category: sport.to_string(),
    }
}

pub(crate) fn sample_course_input(title: &str, workout_ids: Vec<i32>) -> NewCourse {
    NewCourse {
        title: title.to_string(),
        description: "A bundle of sessions".to_string(),
        price: Some(Decimal::new(9900, 2)),
        workout_ids,
    }
}
