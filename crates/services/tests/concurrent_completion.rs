use std::sync::Arc;

use program_core::model::{ProgramId, UserId};
use program_core::time::fixed_clock;
use services::{AppServices, AuthContext, CatalogSource};

/// Completes all seven days of week 1 from parallel tasks and checks that
/// none of the writes was lost.
async fn complete_week_in_parallel(services: &AppServices) {
    // With seven writers each can lose at most six races.
    let svc = Arc::new((*services.enrollment_service()).clone().with_max_update_attempts(7));
    let auth = AuthContext::user(UserId::random());
    let program = ProgramId::new("life-transition").unwrap();
    let enrollment = svc.create_enrollment(auth, &program).await.unwrap();

    let mut handles = Vec::new();
    for day in 1..=7u8 {
        let svc = Arc::clone(&svc);
        let id = enrollment.id();
        handles.push(tokio::spawn(async move {
            svc.record_day_completion(auth, id, 1, day).await
        }));
    }
    for handle in handles {
        handle.await.expect("task").expect("completion");
    }

    let stored = svc.get_enrollment(auth, &program).await.unwrap().unwrap();
    assert_eq!(stored.completed_days()[&1].len(), 7);
    assert_eq!(stored.current_week(), 2);
    assert_eq!(stored.version(), 7);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_completions_of_different_days_are_all_kept() {
    let services = AppServices::new_in_memory(fixed_clock(), CatalogSource::Builtin).unwrap();
    complete_week_in_parallel(&services).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_completions_survive_sqlite_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("programs.db").display());
    let services = AppServices::new_sqlite(&url, fixed_clock(), CatalogSource::Builtin)
        .await
        .expect("bootstrap");
    for _ in 0..3 {
        complete_week_in_parallel(&services).await;
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_completions_survive_sqlite_shared_memory_store() {
    let services = AppServices::new_sqlite(
        "sqlite:file:memdb_concurrent_completion?mode=memory&cache=shared",
        fixed_clock(),
        CatalogSource::Builtin,
    )
    .await
    .expect("bootstrap");
    for _ in 0..3 {
        complete_week_in_parallel(&services).await;
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn duplicate_submissions_count_once() {
    let services = AppServices::new_in_memory(fixed_clock(), CatalogSource::Builtin).unwrap();
    let svc = services.enrollment_service();
    let auth = AuthContext::user(UserId::random());
    let program = ProgramId::new("life-transition").unwrap();
    let enrollment = svc.create_enrollment(auth, &program).await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..4 {
        let svc = Arc::clone(&svc);
        let id = enrollment.id();
        handles.push(tokio::spawn(async move {
            svc.record_day_completion(auth, id, 1, 1).await
        }));
    }
    for handle in handles {
        handle.await.expect("task").expect("completion");
    }

    let stored = svc.get_enrollment(auth, &program).await.unwrap().unwrap();
    assert_eq!(stored.completed_days()[&1].len(), 1);
    assert_eq!(stored.version(), 1);
}
