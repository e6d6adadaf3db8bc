use chrono::Duration;
use program_core::model::{EnrollmentId, Program, ProgramId, UserId, DAYS_PER_WEEK, DayLesson, Week};
use program_core::progress::apply_day_completion;
use program_core::time::fixed_now;
use storage::repository::{EnrollmentRepository, NewEnrollmentRecord, StorageError};
use storage::sqlite::SqliteRepository;

fn program(weeks: u32) -> Program {
    let weeks = (1..=weeks)
        .map(|n| {
            let days = (1..=DAYS_PER_WEEK)
                .map(|d| DayLesson::new(d, format!("Day {d}"), "Body", None).unwrap())
                .collect();
            Week::new(n, format!("Week {n}"), "", days).unwrap()
        })
        .collect();
    Program::new(ProgramId::new("life-transition").unwrap(), "Life Transition", None, weeks)
        .unwrap()
}

async fn connect(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

#[tokio::test]
async fn sqlite_roundtrip_persists_progress() {
    let repo = connect("memdb_enroll_roundtrip").await;
    let program = program(2);
    let user = UserId::random();

    let enrollment = repo
        .insert_enrollment(NewEnrollmentRecord::new(
            user,
            program.id().clone(),
            fixed_now(),
        ))
        .await
        .expect("insert");
    assert_eq!(enrollment.current_week(), 1);
    assert_eq!(enrollment.version(), 0);

    let mut state = enrollment;
    for day in 1..=DAYS_PER_WEEK {
        let next = apply_day_completion(&program, &state, 1, day)
            .unwrap()
            .with_updated_at(fixed_now() + Duration::days(i64::from(day)));
        state = repo
            .update_enrollment(state.version(), &next)
            .await
            .expect("update");
    }
    assert_eq!(state.version(), 7);
    assert_eq!(state.current_week(), 2);

    let fetched = repo
        .get_enrollment(user, program.id())
        .await
        .expect("fetch")
        .expect("enrolled");
    assert_eq!(fetched, state);

    let by_id = repo
        .get_enrollment_by_id(state.id())
        .await
        .expect("fetch by id")
        .expect("exists");
    assert_eq!(by_id.completed_days(), state.completed_days());
}

#[tokio::test]
async fn sqlite_rejects_duplicate_enrollment() {
    let repo = connect("memdb_enroll_duplicate").await;
    let user = UserId::random();
    let program_id = ProgramId::new("life-transition").unwrap();

    repo.insert_enrollment(NewEnrollmentRecord::new(user, program_id.clone(), fixed_now()))
        .await
        .expect("first insert");
    let err = repo
        .insert_enrollment(NewEnrollmentRecord::new(user, program_id, fixed_now()))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Conflict));
}

#[tokio::test]
async fn sqlite_update_detects_stale_version_and_missing_rows() {
    let repo = connect("memdb_enroll_cas").await;
    let program = program(1);
    let enrollment = repo
        .insert_enrollment(NewEnrollmentRecord::new(
            UserId::random(),
            program.id().clone(),
            fixed_now(),
        ))
        .await
        .unwrap();

    let first = apply_day_completion(&program, &enrollment, 1, 1).unwrap();
    let second = apply_day_completion(&program, &enrollment, 1, 2).unwrap();

    repo.update_enrollment(0, &first).await.expect("first writer wins");
    let err = repo.update_enrollment(0, &second).await.unwrap_err();
    assert!(matches!(err, StorageError::Conflict));

    let ghost = program_core::model::Enrollment::new(
        EnrollmentId::new(4242),
        UserId::random(),
        program.id().clone(),
        fixed_now(),
    );
    let err = repo.update_enrollment(0, &ghost).await.unwrap_err();
    assert!(matches!(err, StorageError::NotFound));
}

#[tokio::test]
async fn sqlite_lists_enrollments_per_user() {
    let repo = connect("memdb_enroll_list").await;
    let user = UserId::random();
    for slug in ["life-transition", "sleep-reset"] {
        repo.insert_enrollment(NewEnrollmentRecord::new(
            user,
            ProgramId::new(slug).unwrap(),
            fixed_now(),
        ))
        .await
        .unwrap();
    }
    repo.insert_enrollment(NewEnrollmentRecord::new(
        UserId::random(),
        ProgramId::new("life-transition").unwrap(),
        fixed_now(),
    ))
    .await
    .unwrap();

    let listed = repo.list_enrollments(user).await.unwrap();
    let slugs: Vec<_> = listed.iter().map(|e| e.program_id().as_str()).collect();
    assert_eq!(slugs, vec!["life-transition", "sleep-reset"]);
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let repo = connect("memdb_enroll_migrate_twice").await;
    repo.migrate().await.expect("second migrate");
    assert!(repo
        .get_enrollment(UserId::random(), &ProgramId::new("x").unwrap())
        .await
        .unwrap()
        .is_none());
}
