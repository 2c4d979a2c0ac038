//! Read-side queries: global listings with search, role-polymorphic
//! "my" views, coach profiles, and single-entity fetches. Every result
//! carries the related-entity summaries resolved, so the HTTP layer
//! only serializes.

use std::collections::HashMap;

use common::{
    CoachProfile, CoachedCourse, CoachedWorkout, CourseRecord, CourseWithCoach, MyCourses,
    MyWorkouts, UserPublic, WorkoutRecord, WorkoutWithCoach,
};
use model::entities::{course, course_enrollment, course_workout, user, workout, workout_enrollment};
use sea_orm::sea_query::{Expr, Func, IntoColumnRef, SimpleExpr};
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, JoinType, LoaderTrait, ModelTrait,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait,
};
use tracing::instrument;

use crate::actor::Actor;
use crate::error::{EnrollmentError, Result};

pub fn user_public(user: user::Model) -> UserPublic {
    UserPublic {
        id: user.id,
        email: user.email,
        first_name: user.first_name,
        last_name: user.last_name,
        middle_name: user.middle_name,
        phone_number: user.phone_number,
        is_coach: user.is_coach,
        bio: user.bio,
        experience_years: user.experience_years,
        profile_photo_url: user.profile_photo_url,
    }
}

pub fn workout_record(workout: workout::Model) -> WorkoutRecord {
    WorkoutRecord {
        id: workout.id,
        title: workout.title,
        description: workout.description,
        scheduled_at: workout.scheduled_at,
        address: workout.address,
        price: workout.price,
        sport_category: workout.sport_category,
        coach_id: workout.coach_id,
        is_course_part: workout.is_course_part,
    }
}

pub fn course_record(course: course::Model) -> CourseRecord {
    CourseRecord {
        id: course.id,
        title: course.title,
        description: course.description,
        price: course.price,
        coach_id: course.coach_id,
    }
}

/// Case-insensitive substring match, folded through LOWER on both
/// sides so it behaves the same on SQLite and Postgres.
fn contains_ci(col: impl IntoColumnRef, term: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col(col))).like(format!("%{}%", term.to_lowercase()))
}

fn normalized(search: Option<&str>) -> Option<&str> {
    search.map(str::trim).filter(|term| !term.is_empty())
}

async fn load_users_by_id(
    db: &DatabaseConnection,
    ids: impl IntoIterator<Item = i32>,
) -> Result<HashMap<i32, UserPublic>> {
    let ids: Vec<i32> = {
        let mut ids: Vec<i32> = ids.into_iter().collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    };
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let users = user::Entity::find()
        .filter(user::Column::Id.is_in(ids))
        .all(db)
        .await?;
    Ok(users
        .into_iter()
        .map(|user| (user.id, user_public(user)))
        .collect())
}

fn resolve_coach(coaches: &HashMap<i32, UserPublic>, coach_id: i32) -> Result<UserPublic> {
    coaches.get(&coach_id).cloned().ok_or_else(|| {
        EnrollmentError::NotFound(format!("coach record {coach_id} is missing"))
    })
}

/// Every workout with its coach resolved, ordered by session time.
/// The search term matches title or sport category.
#[instrument(skip(db))]
pub async fn list_workouts(
    db: &DatabaseConnection,
    search: Option<&str>,
) -> Result<Vec<WorkoutWithCoach>> {
    let mut query = workout::Entity::find().order_by_asc(workout::Column::ScheduledAt);
    if let Some(term) = normalized(search) {
        query = query.filter(
            Condition::any()
                .add(contains_ci(
                    (workout::Entity, workout::Column::Title),
                    term,
                ))
                .add(contains_ci(
                    (workout::Entity, workout::Column::SportCategory),
                    term,
                )),
        );
    }
    let workouts = query.all(db).await?;

    let coaches = load_users_by_id(db, workouts.iter().map(|w| w.coach_id)).await?;
    workouts
        .into_iter()
        .map(|workout| {
            let coach = resolve_coach(&coaches, workout.coach_id)?;
            Ok(WorkoutWithCoach {
                workout: workout_record(workout),
                coach,
            })
        })
        .collect()
}

/// Every course with coach and member workouts resolved. The search
/// term matches the course title or any member workout's sport
/// category.
#[instrument(skip(db))]
pub async fn list_courses(
    db: &DatabaseConnection,
    search: Option<&str>,
) -> Result<Vec<CourseWithCoach>> {
    let mut query = course::Entity::find();
    if let Some(term) = normalized(search) {
        query = query
            .join(JoinType::LeftJoin, course::Relation::CourseWorkout.def())
            .join(JoinType::LeftJoin, course_workout::Relation::Workout.def())
            .filter(
                Condition::any()
                    .add(contains_ci((course::Entity, course::Column::Title), term))
                    .add(contains_ci(
                        (workout::Entity, workout::Column::SportCategory),
                        term,
                    )),
            )
            .distinct();
    }
    let courses = query.all(db).await?;

    let members = courses
        .load_many_to_many(workout::Entity, course_workout::Entity, db)
        .await?;
    let coaches = load_users_by_id(db, courses.iter().map(|c| c.coach_id)).await?;

    courses
        .into_iter()
        .zip(members)
        .map(|(course, workouts)| {
            let coach = resolve_coach(&coaches, course.coach_id)?;
            Ok(CourseWithCoach {
                course: course_record(course),
                coach,
                workouts: workouts.into_iter().map(workout_record).collect(),
            })
        })
        .collect()
}

/// A single workout with its coach resolved.
#[instrument(skip(db))]
pub async fn get_workout(db: &DatabaseConnection, workout_id: i32) -> Result<WorkoutWithCoach> {
    let workout = workout::Entity::find_by_id(workout_id)
        .one(db)
        .await?
        .ok_or_else(|| EnrollmentError::NotFound("workout not found".to_string()))?;

    let coaches = load_users_by_id(db, [workout.coach_id]).await?;
    let coach = resolve_coach(&coaches, workout.coach_id)?;
    Ok(WorkoutWithCoach {
        workout: workout_record(workout),
        coach,
    })
}

/// A single course with coach and member workouts resolved.
#[instrument(skip(db))]
pub async fn get_course(db: &DatabaseConnection, course_id: i32) -> Result<CourseWithCoach> {
    let course = course::Entity::find_by_id(course_id)
        .one(db)
        .await?
        .ok_or_else(|| EnrollmentError::NotFound("course not found".to_string()))?;

    let workouts = course
        .find_related(workout::Entity)
        .order_by_asc(workout::Column::ScheduledAt)
        .all(db)
        .await?;
    let coaches = load_users_by_id(db, [course.coach_id]).await?;
    let coach = resolve_coach(&coaches, course.coach_id)?;
    Ok(CourseWithCoach {
        course: course_record(course),
        coach,
        workouts: workouts.into_iter().map(workout_record).collect(),
    })
}

/// Role-polymorphic workout listing: coaches get the workouts they
/// run with rosters resolved, participants get the workouts they
/// booked with the coach resolved.
#[instrument(skip(db))]
pub async fn my_workouts(db: &DatabaseConnection, actor: &Actor) -> Result<MyWorkouts> {
    match *actor {
        Actor::Coach { id } => {
            let workouts = workout::Entity::find()
                .filter(workout::Column::CoachId.eq(id))
                .order_by_asc(workout::Column::ScheduledAt)
                .all(db)
                .await?;
            let rosters = workouts
                .load_many_to_many(user::Entity, workout_enrollment::Entity, db)
                .await?;

            Ok(MyWorkouts::Coach(
                workouts
                    .into_iter()
                    .zip(rosters)
                    .map(|(workout, users)| CoachedWorkout {
                        workout: workout_record(workout),
                        enrolled_users: users.into_iter().map(user_public).collect(),
                    })
                    .collect(),
            ))
        }
        Actor::Participant { id } => {
            let me = user::Entity::find_by_id(id)
                .one(db)
                .await?
                .ok_or_else(|| EnrollmentError::NotFound("user not found".to_string()))?;
            let workouts = me
                .find_related(workout::Entity)
                .order_by_asc(workout::Column::ScheduledAt)
                .all(db)
                .await?;
            let coaches = load_users_by_id(db, workouts.iter().map(|w| w.coach_id)).await?;

            Ok(MyWorkouts::Participant(
                workouts
                    .into_iter()
                    .map(|workout| {
                        let coach = resolve_coach(&coaches, workout.coach_id)?;
                        Ok(WorkoutWithCoach {
                            workout: workout_record(workout),
                            coach,
                        })
                    })
                    .collect::<Result<Vec<_>>>()?,
            ))
        }
    }
}

/// Role-polymorphic course listing, mirroring [`my_workouts`].
#[instrument(skip(db))]
pub async fn my_courses(db: &DatabaseConnection, actor: &Actor) -> Result<MyCourses> {
    match *actor {
        Actor::Coach { id } => {
            let courses = course::Entity::find()
                .filter(course::Column::CoachId.eq(id))
                .all(db)
                .await?;
            let members = courses
                .load_many_to_many(workout::Entity, course_workout::Entity, db)
                .await?;
            let rosters = courses
                .load_many_to_many(user::Entity, course_enrollment::Entity, db)
                .await?;

            Ok(MyCourses::Coach(
                courses
                    .into_iter()
                    .zip(members.into_iter().zip(rosters))
                    .map(|(course, (workouts, users))| CoachedCourse {
                        course: course_record(course),
                        workouts: workouts.into_iter().map(workout_record).collect(),
                        enrolled_users: users.into_iter().map(user_public).collect(),
                    })
                    .collect(),
            ))
        }
        Actor::Participant { id } => {
            let me = user::Entity::find_by_id(id)
                .one(db)
                .await?
                .ok_or_else(|| EnrollmentError::NotFound("user not found".to_string()))?;
            let courses = me.find_related(course::Entity).all(db).await?;
            let members = courses
                .load_many_to_many(workout::Entity, course_workout::Entity, db)
                .await?;
            let coaches = load_users_by_id(db, courses.iter().map(|c| c.coach_id)).await?;

            Ok(MyCourses::Participant(
                courses
                    .into_iter()
                    .zip(members)
                    .map(|(course, workouts)| {
                        let coach = resolve_coach(&coaches, course.coach_id)?;
                        Ok(CourseWithCoach {
                            course: course_record(course),
                            coach,
                            workouts: workouts.into_iter().map(workout_record).collect(),
                        })
                    })
                    .collect::<Result<Vec<_>>>()?,
            ))
        }
    }
}

/// A coach's profile together with every offering they own. Ids that
/// resolve to participants are reported as absent.
#[instrument(skip(db))]
pub async fn coach_profile(db: &DatabaseConnection, coach_id: i32) -> Result<CoachProfile> {
    let coach = user::Entity::find_by_id(coach_id)
        .filter(user::Column::IsCoach.eq(true))
        .one(db)
        .await?
        .ok_or_else(|| EnrollmentError::NotFound("coach not found".to_string()))?;

    let workouts = workout::Entity::find()
        .filter(workout::Column::CoachId.eq(coach_id))
        .order_by_asc(workout::Column::ScheduledAt)
        .all(db)
        .await?;
    let courses = course::Entity::find()
        .filter(course::Column::CoachId.eq(coach_id))
        .all(db)
        .await?;

    Ok(CoachProfile {
        profile: user_public(coach),
        workouts: workouts.into_iter().map(workout_record).collect(),
        courses: courses.into_iter().map(course_record).collect(),
    })
}

/// Every user with the coach role.
#[instrument(skip(db))]
pub async fn list_coaches(db: &DatabaseConnection) -> Result<Vec<UserPublic>> {
    let coaches = user::Entity::find()
        .filter(user::Column::IsCoach.eq(true))
        .all(db)
        .await?;
    Ok(coaches.into_iter().map(user_public).collect())
}
