//! Mutating operations over the enrollment and course-membership
//! relations. Every operation runs inside a single database
//! transaction: a failed check rolls back by dropping the transaction,
//! so no partial write is ever visible.

use chrono::{DateTime, FixedOffset};
use model::entities::{course, course_enrollment, course_workout, workout, workout_enrollment};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, Set, TransactionTrait,
};
use tracing::{info, instrument};

use crate::actor::Actor;
use crate::error::{EnrollmentError, Result};

/// Input for publishing a workout.
#[derive(Debug, Clone)]
pub struct NewWorkout {
    pub title: String,
    pub description: String,
    /// Client timestamp with offset; the offset is dropped on storage.
    pub scheduled_at: DateTime<FixedOffset>,
    pub address: String,
    pub price: Option<Decimal>,
    pub sport_category: String,
}

/// Input for publishing a course.
#[derive(Debug, Clone)]
pub struct NewCourse {
    pub title: String,
    pub description: String,
    pub price: Option<Decimal>,
    /// Workouts to bundle; every id must resolve to a workout owned by
    /// the publishing coach.
    pub workout_ids: Vec<i32>,
}

/// Publish a new workout owned by the calling coach.
#[instrument(skip(db, input), fields(title = %input.title))]
pub async fn create_workout(
    db: &DatabaseConnection,
    actor: &Actor,
    input: NewWorkout,
) -> Result<workout::Model> {
    let Actor::Coach { id: coach_id } = *actor else {
        return Err(EnrollmentError::Forbidden(
            "only coaches may publish workouts".to_string(),
        ));
    };

    // The offset is dropped, not converted: the wall-clock value the
    // coach typed is what gets stored.
    let scheduled_at = input.scheduled_at.naive_local();

    let new_workout = workout::ActiveModel {
        title: Set(input.title),
        description: Set(input.description),
        scheduled_at: Set(scheduled_at),
        address: Set(input.address),
        price: Set(input.price),
        sport_category: Set(input.sport_category),
        coach_id: Set(coach_id),
        is_course_part: Set(false),
        ..Default::default()
    };

    let workout = new_workout.insert(db).await?;
    info!(workout_id = workout.id, coach_id, "workout published");
    Ok(workout)
}

/// Publish a course bundling the given workouts.
///
/// Fails with a validation error unless every requested workout id
/// resolves to a workout owned by the calling coach; in that case
/// nothing is persisted. On success every attached workout is marked
/// as part of a course.
#[instrument(skip(db, input), fields(title = %input.title, workouts = input.workout_ids.len()))]
pub async fn create_course(
    db: &DatabaseConnection,
    actor: &Actor,
    input: NewCourse,
) -> Result<(course::Model, Vec<workout::Model>)> {
    let Actor::Coach { id: coach_id } = *actor else {
        return Err(EnrollmentError::Forbidden(
            "only coaches may publish courses".to_string(),
        ));
    };

    let txn = db.begin().await?;

    let workouts = workout::Entity::find()
        .filter(workout::Column::Id.is_in(input.workout_ids.clone()))
        .filter(workout::Column::CoachId.eq(coach_id))
        .all(&txn)
        .await?;
    if workouts.len() != input.workout_ids.len() {
        return Err(EnrollmentError::Validation(
            "some workouts were not found or are not owned by you".to_string(),
        ));
    }

    let new_course = course::ActiveModel {
        title: Set(input.title),
        description: Set(input.description),
        price: Set(input.price),
        coach_id: Set(coach_id),
        ..Default::default()
    };
    let course = new_course.insert(&txn).await?;

    let mut attached = Vec::with_capacity(workouts.len());
    for workout in workouts {
        course_workout::ActiveModel {
            course_id: Set(course.id),
            workout_id: Set(workout.id),
        }
        .insert(&txn)
        .await?;

        let mut active: workout::ActiveModel = workout.into();
        active.is_course_part = Set(true);
        attached.push(active.update(&txn).await?);
    }

    txn.commit().await?;
    info!(course_id = course.id, coach_id, "course published");
    Ok((course, attached))
}

/// Remove a workout from a course's membership set.
///
/// Both the course and the workout must exist and be owned by the
/// calling coach. After removal the workout's course flag is
/// recomputed from the membership table inside the same transaction.
#[instrument(skip(db))]
pub async fn detach_workout(
    db: &DatabaseConnection,
    actor: &Actor,
    course_id: i32,
    workout_id: i32,
) -> Result<workout::Model> {
    let Actor::Coach { id: coach_id } = *actor else {
        return Err(EnrollmentError::Forbidden(
            "only coaches may modify courses".to_string(),
        ));
    };

    let txn = db.begin().await?;

    course::Entity::find_by_id(course_id)
        .filter(course::Column::CoachId.eq(coach_id))
        .one(&txn)
        .await?
        .ok_or_else(|| {
            EnrollmentError::NotFound("course not found or not owned by you".to_string())
        })?;
    let workout = workout::Entity::find_by_id(workout_id)
        .filter(workout::Column::CoachId.eq(coach_id))
        .one(&txn)
        .await?
        .ok_or_else(|| {
            EnrollmentError::NotFound("workout not found or not owned by you".to_string())
        })?;

    course_workout::Entity::delete_many()
        .filter(course_workout::Column::CourseId.eq(course_id))
        .filter(course_workout::Column::WorkoutId.eq(workout_id))
        .exec(&txn)
        .await?;

    let workout = recompute_course_flag(&txn, workout).await?;

    txn.commit().await?;
    info!(course_id, workout_id, "workout detached from course");
    Ok(workout)
}

/// Enroll the calling participant in a workout.
#[instrument(skip(db))]
pub async fn enroll_in_workout(
    db: &DatabaseConnection,
    actor: &Actor,
    workout_id: i32,
) -> Result<workout::Model> {
    let Actor::Participant { id: user_id } = *actor else {
        return Err(EnrollmentError::Forbidden(
            "coaches cannot enroll in workouts".to_string(),
        ));
    };

    let txn = db.begin().await?;

    let workout = workout::Entity::find_by_id(workout_id)
        .one(&txn)
        .await?
        .ok_or_else(|| EnrollmentError::NotFound("workout not found".to_string()))?;

    if workout_enrollment::Entity::find_by_id((workout_id, user_id))
        .one(&txn)
        .await?
        .is_some()
    {
        return Err(EnrollmentError::Conflict(
            "you are already enrolled in this workout".to_string(),
        ));
    }

    workout_enrollment::ActiveModel {
        workout_id: Set(workout_id),
        user_id: Set(user_id),
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;
    info!(workout_id, user_id, "enrolled in workout");
    Ok(workout)
}

/// Remove the calling participant's workout enrollment.
#[instrument(skip(db))]
pub async fn unenroll_from_workout(
    db: &DatabaseConnection,
    actor: &Actor,
    workout_id: i32,
) -> Result<()> {
    let Actor::Participant { id: user_id } = *actor else {
        return Err(EnrollmentError::Forbidden(
            "coaches cannot unenroll from workouts".to_string(),
        ));
    };

    let txn = db.begin().await?;

    workout::Entity::find_by_id(workout_id)
        .one(&txn)
        .await?
        .ok_or_else(|| EnrollmentError::NotFound("workout not found".to_string()))?;

    let enrollment = workout_enrollment::Entity::find_by_id((workout_id, user_id))
        .one(&txn)
        .await?
        .ok_or_else(|| {
            EnrollmentError::Conflict("you are not enrolled in this workout".to_string())
        })?;
    enrollment.delete(&txn).await?;

    txn.commit().await?;
    info!(workout_id, user_id, "unenrolled from workout");
    Ok(())
}

/// Enroll the calling participant in a course.
#[instrument(skip(db))]
pub async fn enroll_in_course(
    db: &DatabaseConnection,
    actor: &Actor,
    course_id: i32,
) -> Result<course::Model> {
    let Actor::Participant { id: user_id } = *actor else {
        return Err(EnrollmentError::Forbidden(
            "coaches cannot enroll in courses".to_string(),
        ));
    };

    let txn = db.begin().await?;

    let course = course::Entity::find_by_id(course_id)
        .one(&txn)
        .await?
        .ok_or_else(|| EnrollmentError::NotFound("course not found".to_string()))?;

    if course_enrollment::Entity::find_by_id((course_id, user_id))
        .one(&txn)
        .await?
        .is_some()
    {
        return Err(EnrollmentError::Conflict(
            "you are already enrolled in this course".to_string(),
        ));
    }

    course_enrollment::ActiveModel {
        course_id: Set(course_id),
        user_id: Set(user_id),
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;
    info!(course_id, user_id, "enrolled in course");
    Ok(course)
}

/// Remove the calling participant's course enrollment.
#[instrument(skip(db))]
pub async fn unenroll_from_course(
    db: &DatabaseConnection,
    actor: &Actor,
    course_id: i32,
) -> Result<()> {
    let Actor::Participant { id: user_id } = *actor else {
        return Err(EnrollmentError::Forbidden(
            "coaches cannot unenroll from courses".to_string(),
        ));
    };

    let txn = db.begin().await?;

    course::Entity::find_by_id(course_id)
        .one(&txn)
        .await?
        .ok_or_else(|| EnrollmentError::NotFound("course not found".to_string()))?;

    let enrollment = course_enrollment::Entity::find_by_id((course_id, user_id))
        .one(&txn)
        .await?
        .ok_or_else(|| {
            EnrollmentError::Conflict("you are not enrolled in this course".to_string())
        })?;
    enrollment.delete(&txn).await?;

    txn.commit().await?;
    info!(course_id, user_id, "unenrolled from course");
    Ok(())
}

/// Delete a workout owned by the calling coach.
///
/// Existence and ownership failures collapse into one not-found signal
/// so callers cannot probe who owns what. Enrollment and course
/// membership rows are removed in the same transaction.
#[instrument(skip(db))]
pub async fn delete_workout(db: &DatabaseConnection, actor: &Actor, workout_id: i32) -> Result<()> {
    let Actor::Coach { id: coach_id } = *actor else {
        return Err(EnrollmentError::NotFound(
            "workout not found or not owned by you".to_string(),
        ));
    };

    let txn = db.begin().await?;

    let workout = workout::Entity::find_by_id(workout_id)
        .filter(workout::Column::CoachId.eq(coach_id))
        .one(&txn)
        .await?
        .ok_or_else(|| {
            EnrollmentError::NotFound("workout not found or not owned by you".to_string())
        })?;

    workout_enrollment::Entity::delete_many()
        .filter(workout_enrollment::Column::WorkoutId.eq(workout_id))
        .exec(&txn)
        .await?;
    course_workout::Entity::delete_many()
        .filter(course_workout::Column::WorkoutId.eq(workout_id))
        .exec(&txn)
        .await?;
    workout.delete(&txn).await?;

    txn.commit().await?;
    info!(workout_id, coach_id, "workout deleted");
    Ok(())
}

/// Delete a course owned by the calling coach.
///
/// Member workouts survive; their course flags are recomputed from the
/// membership table after the course's rows are gone, inside the same
/// transaction.
#[instrument(skip(db))]
pub async fn delete_course(db: &DatabaseConnection, actor: &Actor, course_id: i32) -> Result<()> {
    let Actor::Coach { id: coach_id } = *actor else {
        return Err(EnrollmentError::NotFound(
            "course not found or not owned by you".to_string(),
        ));
    };

    let txn = db.begin().await?;

    let course = course::Entity::find_by_id(course_id)
        .filter(course::Column::CoachId.eq(coach_id))
        .one(&txn)
        .await?
        .ok_or_else(|| {
            EnrollmentError::NotFound("course not found or not owned by you".to_string())
        })?;

    let member_ids: Vec<i32> = course_workout::Entity::find()
        .filter(course_workout::Column::CourseId.eq(course_id))
        .all(&txn)
        .await?
        .into_iter()
        .map(|row| row.workout_id)
        .collect();

    course_workout::Entity::delete_many()
        .filter(course_workout::Column::CourseId.eq(course_id))
        .exec(&txn)
        .await?;
    course_enrollment::Entity::delete_many()
        .filter(course_enrollment::Column::CourseId.eq(course_id))
        .exec(&txn)
        .await?;
    course.delete(&txn).await?;

    for workout_id in member_ids {
        if let Some(workout) = workout::Entity::find_by_id(workout_id).one(&txn).await? {
            recompute_course_flag(&txn, workout).await?;
        }
    }

    txn.commit().await?;
    info!(course_id, coach_id, "course deleted");
    Ok(())
}

/// Recompute a workout's course flag from the membership table.
///
/// Runs against the caller's transaction: the count must reflect the
/// removal that just happened, never a value captured before it.
async fn recompute_course_flag<C: ConnectionTrait>(
    conn: &C,
    workout: workout::Model,
) -> Result<workout::Model> {
    let remaining = course_workout::Entity::find()
        .filter(course_workout::Column::WorkoutId.eq(workout.id))
        .count(conn)
        .await?;

    let mut active: workout::ActiveModel = workout.into();
    active.is_course_part = Set(remaining > 0);
    Ok(active.update(conn).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{
        coach_actor, participant_actor, sample_course_input, sample_workout_input, seed_coach,
        seed_participant, setup_db,
    };

    async fn published_workout(
        db: &DatabaseConnection,
        actor: &Actor,
        title: &str,
    ) -> workout::Model {
        create_workout(db, actor, sample_workout_input(title, "yoga"))
            .await
            .expect("workout should be created")
    }

    #[tokio::test]
    async fn create_course_attaches_workouts_and_sets_flag() {
        let db = setup_db().await;
        let coach = seed_coach(&db, "coach@example.com").await;
        let actor = coach_actor(&coach);

        let w1 = published_workout(&db, &actor, "Morning flow").await;
        let w2 = published_workout(&db, &actor, "Evening flow").await;
        assert!(!w1.is_course_part);

        let (course, attached) =
            create_course(&db, &actor, sample_course_input("Flow camp", vec![w1.id, w2.id]))
                .await
                .expect("course should be created");

        assert_eq!(course.coach_id, coach.id);
        assert_eq!(attached.len(), 2);
        assert!(attached.iter().all(|w| w.is_course_part));

        let stored = workout::Entity::find_by_id(w1.id)
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert!(stored.is_course_part);
    }

    #[tokio::test]
    async fn create_course_rejects_foreign_workouts_without_persisting() {
        let db = setup_db().await;
        let coach_a = seed_coach(&db, "a@example.com").await;
        let coach_b = seed_coach(&db, "b@example.com").await;
        let foreign = published_workout(&db, &coach_actor(&coach_b), "Not yours").await;

        let err = create_course(
            &db,
            &coach_actor(&coach_a),
            sample_course_input("Stolen goods", vec![foreign.id]),
        )
        .await
        .expect_err("foreign workout must fail validation");
        assert!(matches!(err, EnrollmentError::Validation(_)));

        // Nothing was persisted and the foreign workout is untouched.
        assert_eq!(course::Entity::find().all(&db).await.unwrap().len(), 0);
        let stored = workout::Entity::find_by_id(foreign.id)
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert!(!stored.is_course_part);
    }

    #[tokio::test]
    async fn create_course_rejects_unknown_workout_ids() {
        let db = setup_db().await;
        let coach = seed_coach(&db, "coach@example.com").await;

        let err = create_course(
            &db,
            &coach_actor(&coach),
            sample_course_input("Ghost course", vec![4242]),
        )
        .await
        .expect_err("unknown id must fail validation");
        assert!(matches!(err, EnrollmentError::Validation(_)));
    }

    #[tokio::test]
    async fn detach_clears_flag_only_when_no_course_remains() {
        let db = setup_db().await;
        let coach = seed_coach(&db, "coach@example.com").await;
        let actor = coach_actor(&coach);
        let workout = published_workout(&db, &actor, "Shared session").await;

        let (c1, _) = create_course(&db, &actor, sample_course_input("One", vec![workout.id]))
            .await
            .unwrap();
        let (c2, _) = create_course(&db, &actor, sample_course_input("Two", vec![workout.id]))
            .await
            .unwrap();

        // Still referenced by the second course after the first detach.
        let after_first = detach_workout(&db, &actor, c1.id, workout.id).await.unwrap();
        assert!(after_first.is_course_part);

        let after_second = detach_workout(&db, &actor, c2.id, workout.id).await.unwrap();
        assert!(!after_second.is_course_part);
    }

    #[tokio::test]
    async fn detach_requires_ownership_of_both_sides() {
        let db = setup_db().await;
        let coach_a = seed_coach(&db, "a@example.com").await;
        let coach_b = seed_coach(&db, "b@example.com").await;
        let actor_a = coach_actor(&coach_a);
        let workout = published_workout(&db, &actor_a, "Mine").await;
        let (course, _) =
            create_course(&db, &actor_a, sample_course_input("Mine too", vec![workout.id]))
                .await
                .unwrap();

        let err = detach_workout(&db, &coach_actor(&coach_b), course.id, workout.id)
            .await
            .expect_err("foreign coach must not detach");
        assert!(matches!(err, EnrollmentError::NotFound(_)));

        // Membership is intact.
        let stored = workout::Entity::find_by_id(workout.id)
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert!(stored.is_course_part);
    }

    #[tokio::test]
    async fn workout_enrollment_round_trip() {
        let db = setup_db().await;
        let coach = seed_coach(&db, "coach@example.com").await;
        let user = seed_participant(&db, "user@example.com").await;
        let actor = participant_actor(&user);
        let workout = published_workout(&db, &coach_actor(&coach), "Sprints").await;

        enroll_in_workout(&db, &actor, workout.id).await.unwrap();
        let dup = enroll_in_workout(&db, &actor, workout.id)
            .await
            .expect_err("double enrollment must conflict");
        assert!(matches!(dup, EnrollmentError::Conflict(_)));

        // Exactly one membership row exists.
        assert_eq!(
            workout_enrollment::Entity::find().all(&db).await.unwrap().len(),
            1
        );

        unenroll_from_workout(&db, &actor, workout.id).await.unwrap();
        assert_eq!(
            workout_enrollment::Entity::find().all(&db).await.unwrap().len(),
            0
        );

        let missing = unenroll_from_workout(&db, &actor, workout.id)
            .await
            .expect_err("second unenroll must conflict");
        assert!(matches!(missing, EnrollmentError::Conflict(_)));
    }

    #[tokio::test]
    async fn course_enrollment_round_trip() {
        let db = setup_db().await;
        let coach = seed_coach(&db, "coach@example.com").await;
        let user = seed_participant(&db, "user@example.com").await;
        let actor = participant_actor(&user);
        let (course, _) = create_course(
            &db,
            &coach_actor(&coach),
            sample_course_input("Bundle", vec![]),
        )
        .await
        .unwrap();

        enroll_in_course(&db, &actor, course.id).await.unwrap();
        let dup = enroll_in_course(&db, &actor, course.id)
            .await
            .expect_err("double enrollment must conflict");
        assert!(matches!(dup, EnrollmentError::Conflict(_)));

        unenroll_from_course(&db, &actor, course.id).await.unwrap();
        let missing = unenroll_from_course(&db, &actor, course.id)
            .await
            .expect_err("second unenroll must conflict");
        assert!(matches!(missing, EnrollmentError::Conflict(_)));
    }

    #[tokio::test]
    async fn coaches_cannot_enroll() {
        let db = setup_db().await;
        let coach = seed_coach(&db, "coach@example.com").await;
        let other = seed_coach(&db, "other@example.com").await;
        let workout = published_workout(&db, &coach_actor(&other), "Open session").await;

        let err = enroll_in_workout(&db, &coach_actor(&coach), workout.id)
            .await
            .expect_err("coach enrollment must be forbidden");
        assert!(matches!(err, EnrollmentError::Forbidden(_)));
    }

    #[tokio::test]
    async fn participants_cannot_publish() {
        let db = setup_db().await;
        let user = seed_participant(&db, "user@example.com").await;
        let actor = participant_actor(&user);

        let err = create_workout(&db, &actor, sample_workout_input("Nope", "yoga"))
            .await
            .expect_err("participant publishing must be forbidden");
        assert!(matches!(err, EnrollmentError::Forbidden(_)));

        let err = create_course(&db, &actor, sample_course_input("Nope", vec![]))
            .await
            .expect_err("participant publishing must be forbidden");
        assert!(matches!(err, EnrollmentError::Forbidden(_)));
    }

    #[tokio::test]
    async fn delete_course_recomputes_member_flags() {
        let db = setup_db().await;
        let coach = seed_coach(&db, "coach@example.com").await;
        let actor = coach_actor(&coach);
        let workout = published_workout(&db, &actor, "Member").await;
        let (course, _) =
            create_course(&db, &actor, sample_course_input("Doomed", vec![workout.id]))
                .await
                .unwrap();

        delete_course(&db, &actor, course.id).await.unwrap();

        // The workout survives the course and its flag is cleared.
        let stored = workout::Entity::find_by_id(workout.id)
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert!(!stored.is_course_part);
        assert!(course::Entity::find_by_id(course.id)
            .one(&db)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn delete_course_keeps_flag_for_doubly_bundled_workouts() {
        let db = setup_db().await;
        let coach = seed_coach(&db, "coach@example.com").await;
        let actor = coach_actor(&coach);
        let workout = published_workout(&db, &actor, "Member").await;
        let (doomed, _) =
            create_course(&db, &actor, sample_course_input("Doomed", vec![workout.id]))
                .await
                .unwrap();
        create_course(&db, &actor, sample_course_input("Survivor", vec![workout.id]))
            .await
            .unwrap();

        delete_course(&db, &actor, doomed.id).await.unwrap();

        let stored = workout::Entity::find_by_id(workout.id)
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert!(stored.is_course_part);
    }

    #[tokio::test]
    async fn delete_workout_removes_membership_rows() {
        let db = setup_db().await;
        let coach = seed_coach(&db, "coach@example.com").await;
        let user = seed_participant(&db, "user@example.com").await;
        let actor = coach_actor(&coach);
        let workout = published_workout(&db, &actor, "Doomed").await;
        create_course(&db, &actor, sample_course_input("Holder", vec![workout.id]))
            .await
            .unwrap();
        enroll_in_workout(&db, &participant_actor(&user), workout.id)
            .await
            .unwrap();

        delete_workout(&db, &actor, workout.id).await.unwrap();

        assert!(workout::Entity::find_by_id(workout.id)
            .one(&db)
            .await
            .unwrap()
            .is_none());
        assert_eq!(
            course_workout::Entity::find().all(&db).await.unwrap().len(),
            0
        );
        assert_eq!(
            workout_enrollment::Entity::find().all(&db).await.unwrap().len(),
            0
        );
    }

    #[tokio::test]
    async fn delete_collapses_ownership_into_not_found() {
        let db = setup_db().await;
        let coach_a = seed_coach(&db, "a@example.com").await;
        let coach_b = seed_coach(&db, "b@example.com").await;
        let workout = published_workout(&db, &coach_actor(&coach_a), "Mine").await;

        let err = delete_workout(&db, &coach_actor(&coach_b), workout.id)
            .await
            .expect_err("foreign delete must fail");
        assert!(matches!(err, EnrollmentError::NotFound(_)));

        let user = seed_participant(&db, "user@example.com").await;
        let err = delete_workout(&db, &participant_actor(&user), workout.id)
            .await
            .expect_err("participant delete must fail");
        assert!(matches!(err, EnrollmentError::NotFound(_)));
    }
}
