use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create users table
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk_auto(Users::Id))
                    .col(string(Users::Email).unique_key())
                    .col(string(Users::FirstName))
                    .col(string(Users::LastName))
                    .col(string_null(Users::MiddleName))
                    .col(string_null(Users::PhoneNumber))
                    .col(string(Users::PasswordHash))
                    .col(boolean(Users::IsCoach).default(false))
                    .col(text_null(Users::Bio))
                    .col(integer_null(Users::ExperienceYears))
                    .col(string_null(Users::ProfilePhotoUrl))
                    .to_owned(),
            )
            .await?;

        // Create workouts table
        manager
            .create_table(
                Table::create()
                    .table(Workouts::Table)
                    .if_not_exists()
                    .col(pk_auto(Workouts::Id))
                    .col(string(Workouts::Title))
                    .col(text(Workouts::Description))
                    .col(date_time(Workouts::ScheduledAt))
                    .col(string(Workouts::Address))
                    .col(decimal_len_null(Workouts::Price, 10, 2))
                    .col(string(Workouts::SportCategory))
                    .col(integer(Workouts::CoachId))
                    .col(boolean(Workouts::IsCoursePart).default(false))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_workout_coach")
                            .from(Workouts::Table, Workouts::CoachId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create courses table
        manager
            .create_table(
                Table::create()
                    .table(Courses::Table)
                    .if_not_exists()
                    .col(pk_auto(Courses::Id))
                    .col(string(Courses::Title))
                    .col(text(Courses::Description))
                    .col(decimal_len_null(Courses::Price, 10, 2))
                    .col(integer(Courses::CoachId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_course_coach")
                            .from(Courses::Table, Courses::CoachId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create workout_enrollments table (join table)
        manager
            .create_table(
                Table::create()
                    .table(WorkoutEnrollments::Table)
                    .if_not_exists()
                    .col(integer(WorkoutEnrollments::WorkoutId))
                    .col(integer(WorkoutEnrollments::UserId))
                    .primary_key(
                        Index::create()
                            .name("pk_workout_enrollments")
                            .col(WorkoutEnrollments::WorkoutId)
                            .col(WorkoutEnrollments::UserId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_workout_enrollments_workout")
                            .from(WorkoutEnrollments::Table, WorkoutEnrollments::WorkoutId)
                            .to(Workouts::Table, Workouts::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_workout_enrollments_user")
                            .from(WorkoutEnrollments::Table, WorkoutEnrollments::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create course_enrollments table (join table)
        manager
            .create_table(
                Table::create()
                    .table(CourseEnrollments::Table)
                    .if_not_exists()
                    .col(integer(CourseEnrollments::CourseId))
                    .col(integer(CourseEnrollments::UserId))
                    .primary_key(
                        Index::create()
                            .name("pk_course_enrollments")
                            .col(CourseEnrollments::CourseId)
                            .col(CourseEnrollments::UserId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_course_enrollments_course")
                            .from(CourseEnrollments::Table, CourseEnrollments::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_course_enrollments_user")
                            .from(CourseEnrollments::Table, CourseEnrollments::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create course_workouts table (join table)
        manager
            .create_table(
                Table::create()
                    .table(CourseWorkouts::Table)
                    .if_not_exists()
                    .col(integer(CourseWorkouts::CourseId))
                    .col(integer(CourseWorkouts::WorkoutId))
                    .primary_key(
                        Index::create()
                            .name("pk_course_workouts")
                            .col(CourseWorkouts::CourseId)
                            .col(CourseWorkouts::WorkoutId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_course_workouts_course")
                            .from(CourseWorkouts::Table, CourseWorkouts::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_course_workouts_workout")
                            .from(CourseWorkouts::Table, CourseWorkouts::WorkoutId)
                            .to(Workouts::Table, Workouts::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create sessions table (bearer tokens)
        manager
            .create_table(
                Table::create()
                    .table(Sessions::Table)
                    .if_not_exists()
                    .col(pk_auto(Sessions::Id))
                    .col(integer(Sessions::UserId))
                    .col(string(Sessions::Token).unique_key())
                    .col(date_time(Sessions::CreatedAt))
                    .col(date_time(Sessions::ExpiresAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_session_user")
                            .from(Sessions::Table, Sessions::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Sessions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CourseWorkouts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CourseEnrollments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(WorkoutEnrollments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Courses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Workouts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Email,
    FirstName,
    LastName,
    MiddleName,
    PhoneNumber,
    PasswordHash,
    IsCoach,
    Bio,
    ExperienceYears,
    ProfilePhotoUrl,
}

#[derive(DeriveIden)]
enum Workouts {
    Table,
    Id,
    Title,
    Description,
    ScheduledAt,
    Address,
    Price,
    SportCategory,
    CoachId,
    IsCoursePart,
}

#[derive(DeriveIden)]
enum Courses {
    Table,
    Id,
    Title,
    Description,
    Price,
    CoachId,
}

#[derive(DeriveIden)]
enum WorkoutEnrollments {
    Table,
    WorkoutId,
    UserId,
}

#[derive(DeriveIden)]
enum CourseEnrollments {
    Table,
    CourseId,
    UserId,
}

#[derive(DeriveIden)]
enum CourseWorkouts {
    Table,
    CourseId,
    WorkoutId,
}

#[derive(DeriveIden)]
enum Sessions {
    Table,
    Id,
    UserId,
    Token,
    CreatedAt,
    ExpiresAt,
}
