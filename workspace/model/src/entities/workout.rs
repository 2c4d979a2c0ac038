use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

/// A single bookable training session.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "workouts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    /// Wall-clock session time. Offsets submitted by clients are
    /// dropped before the value reaches this column.
    pub scheduled_at: DateTime,
    pub address: String,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))", nullable)]
    pub price: Option<Decimal>,
    pub sport_category: String,
    /// The coach who published this workout.
    pub coach_id: i32,
    /// True iff at least one course currently bundles this workout.
    /// Maintained by the enrollment crate inside the transaction that
    /// changes course membership.
    #[sea_orm(default_value = "false")]
    pub is_course_part: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// A workout belongs to exactly one coach.
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::CoachId",
        to = "super::user::Column::Id"
    )]
    Coach,
    /// Junction for the many-to-many enrollment relation with users.
    #[sea_orm(has_many = "super::workout_enrollment::Entity")]
    WorkoutEnrollment,
    /// Junction for the many-to-many membership relation with courses.
    #[sea_orm(has_many = "super::course_workout::Entity")]
    CourseWorkout,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        super::workout_enrollment::Relation::User.def()
    }
    fn via() -> Option<RelationDef> {
        Some(super::workout_enrollment::Relation::Workout.def().rev())
    }
}

impl Related<super::course::Entity> for Entity {
    fn to() -> RelationDef {
        super::course_workout::Relation::Course.def()
    }
    fn via() -> Option<RelationDef> {
        Some(super::course_workout::Relation::Workout.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
