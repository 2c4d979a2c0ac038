use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

/// A bundle of workouts sold together by one coach.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "courses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))", nullable)]
    pub price: Option<Decimal>,
    /// The coach who published this course.
    pub coach_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// A course belongs to exactly one coach.
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::CoachId",
        to = "super::user::Column::Id"
    )]
    Coach,
    /// Junction for the many-to-many enrollment relation with users.
    #[sea_orm(has_many = "super::course_enrollment::Entity")]
    CourseEnrollment,
    /// Junction for the many-to-many membership relation with workouts.
    #[sea_orm(has_many = "super::course_workout::Entity")]
    CourseWorkout,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        super::course_enrollment::Relation::User.def()
    }
    fn via() -> Option<RelationDef> {
        Some(super::course_enrollment::Relation::Course.def().rev())
    }
}

impl Related<super::workout::Entity> for Entity {
    fn to() -> RelationDef {
        super::course_workout::Relation::Workout.def()
    }
    fn via() -> Option<RelationDef> {
        Some(super::course_workout::Relation::Course.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
