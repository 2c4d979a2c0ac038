use sea_orm::entity::prelude::*;

/// A registered account: a coach publishing workouts and courses, or a
/// participant enrolling in them, decided by the `is_coach` flag.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub middle_name: Option<String>,
    pub phone_number: Option<String>,
    pub password_hash: String,
    #[sea_orm(default_value = "false")]
    pub is_coach: bool,
    /// Coach profile text, unset for participants.
    #[sea_orm(column_type = "Text", nullable)]
    pub bio: Option<String>,
    pub experience_years: Option<i32>,
    pub profile_photo_url: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Workouts published by this user when acting as coach.
    #[sea_orm(has_many = "super::workout::Entity")]
    Workout,
    /// Courses published by this user when acting as coach.
    #[sea_orm(has_many = "super::course::Entity")]
    Course,
    #[sea_orm(has_many = "super::session::Entity")]
    Session,
}

// The Related impls resolve through the enrollment junctions, so
// `find_related` answers "what is this user enrolled in". Owned
// offerings are queried by filtering on `coach_id` instead.
impl Related<super::workout::Entity> for Entity {
    fn to() -> RelationDef {
        super::workout_enrollment::Relation::Workout.def()
    }
    fn via() -> Option<RelationDef> {
        Some(super::workout_enrollment::Relation::User.def().rev())
    }
}

impl Related<super::course::Entity> for Entity {
    fn to() -> RelationDef {
        super::course_enrollment::Relation::Course.def()
    }
    fn via() -> Option<RelationDef> {
        Some(super::course_enrollment::Relation::User.def().rev())
    }
}

impl Related<super::session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Session.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
