//! View records shared between the enrollment crate and the HTTP layer.
//! These are plain serializable projections of the stored entities with
//! related-entity summaries resolved; they carry no credential material
//! and no ORM state.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Public projection of a user record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserPublic {
    pub id: i32,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub middle_name: Option<String>,
    pub phone_number: Option<String>,
    pub is_coach: bool,
    pub bio: Option<String>,
    pub experience_years: Option<i32>,
    pub profile_photo_url: Option<String>,
}

/// Workout scalar fields as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct WorkoutRecord {
    pub id: i32,
    pub title: String,
    pub description: String,
    /// Wall-clock time without timezone.
    pub scheduled_at: NaiveDateTime,
    pub address: String,
    pub price: Option<Decimal>,
    pub sport_category: String,
    pub coach_id: i32,
    pub is_course_part: bool,
}

/// Course scalar fields as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CourseRecord {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub price: Option<Decimal>,
    pub coach_id: i32,
}

/// A workout with its owning coach resolved — the participant-facing
/// view used by the global listings and enrolled-workout listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct WorkoutWithCoach {
    pub workout: WorkoutRecord,
    pub coach: UserPublic,
}

/// A workout with its roster resolved — the owner-facing view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CoachedWorkout {
    pub workout: WorkoutRecord,
    pub enrolled_users: Vec<UserPublic>,
}

/// A course with coach and member workouts resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CourseWithCoach {
    pub course: CourseRecord,
    pub coach: UserPublic,
    pub workouts: Vec<WorkoutRecord>,
}

/// A course with member workouts and roster resolved — the owner-facing
/// view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CoachedCourse {
    pub course: CourseRecord,
    pub workouts: Vec<WorkoutRecord>,
    pub enrolled_users: Vec<UserPublic>,
}

/// A coach profile together with every offering they own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CoachProfile {
    pub profile: UserPublic,
    pub workouts: Vec<WorkoutRecord>,
    pub courses: Vec<CourseRecord>,
}

/// Role-polymorphic result of the "my workouts" listing: coaches see
/// the workouts they run with rosters, participants see the workouts
/// they booked with the coach resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "role", content = "workouts", rename_all = "snake_case")]
pub enum MyWorkouts {
    Coach(Vec<CoachedWorkout>),
    Participant(Vec<WorkoutWithCoach>),
}

/// Role-polymorphic result of the "my courses" listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "role", content = "courses", rename_all = "snake_case")]
pub enum MyCourses {
    Coach(Vec<CoachedCourse>),
    Participant(Vec<CourseWithCoach>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn my_workouts_tags_role() {
        let value = serde_json::to_value(MyWorkouts::Coach(vec![])).unwrap();
        assert_eq!(value["role"], "coach");
        assert!(value["workouts"].as_array().unwrap().is_empty());
    }

    #[test]
    fn user_public_round_trips() {
        let user = UserPublic {
            id: 7,
            email: "ada@example.com".into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            middle_name: None,
            phone_number: None,
            is_coach: true,
            bio: Some("numbers".into()),
            experience_years: Some(10),
            profile_photo_url: None,
        };
        let json = serde_json::to_string(&user).unwrap();
        let back: UserPublic = serde_json::from_str(&json).unwrap();
        assert_eq!(user, back);
    }
}
