use std::env;
use std::sync::Arc;

use cloud_storage_server::{
    database::{PgStore, Store},
    errors::AppError,
    models::{FileQuery, FileType, NewFile, NewUser, User, UserStatus},
};
use uuid::Uuid;

/// Connects to `TEST_DATABASE_URL`, or returns `None` so the test is skipped.
async fn setup_test_db() -> Option<Arc<PgStore>> {
    let Ok(database_url) = env::var("TEST_DATABASE_URL") else {
        eprintln!("TEST_DATABASE_URL not set; skipping Postgres test");
        return None;
    };

    let store = PgStore::new(&database_url)
        .await
        .expect("Failed to connect to test database");
    store.migrate().await.expect("Failed to run migrations");

    Some(Arc::new(store))
}

async fn create_user(store: &PgStore, limit: f64) -> User {
    store
        .insert_user(
            NewUser::new(format!("pg_{}@example.com", Uuid::new_v4()), "Pg User", "hash")
                .with_storage_limit(limit),
        )
        .await
        .expect("Failed to create user")
}

fn file(user: &User, size: f64) -> NewFile {
    NewFile::new(user.id, "data.txt", FileType::Note, size, "http://localhost/uploads/d")
}

async fn used(store: &PgStore, user: &User) -> f64 {
    store.find_user(user.id).await.unwrap().unwrap().used_storage
}

#[tokio::test]
async fn test_conditional_reserve() {
    let Some(store) = setup_test_db().await else {
        return;
    };
    let user = create_user(&store, 1.0).await;

    store.create_file(file(&user, 0.9)).await.unwrap();
    store.create_file(file(&user, 0.05)).await.unwrap();
    assert!((used(&store, &user).await - 0.95).abs() < 1e-9);

    let result = store.create_file(file(&user, 0.2)).await;
    assert!(matches!(result, Err(AppError::QuotaExceeded)));
    assert!((used(&store, &user).await - 0.95).abs() < 1e-9);

    let rows = store.list_files(user.id, &FileQuery::default()).await.unwrap();
    assert_eq!(rows.len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_reserve_admits_one() {
    let Some(store) = setup_test_db().await else {
        return;
    };
    let user = create_user(&store, 1.0).await;

    let a = {
        let store = store.clone();
        let new_file = file(&user, 0.6);
        tokio::spawn(async move { store.create_file(new_file).await })
    };
    let b = {
        let store = store.clone();
        let new_file = file(&user, 0.6);
        tokio::spawn(async move { store.create_file(new_file).await })
    };

    let results = [a.await.unwrap(), b.await.unwrap()];
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!((used(&store, &user).await - 0.6).abs() < 1e-9);
}

#[tokio::test]
async fn test_inactive_user_is_forbidden() {
    let Some(store) = setup_test_db().await else {
        return;
    };
    let user = create_user(&store, 1.0).await;
    store
        .set_user_status(user.id, UserStatus::Inactive)
        .await
        .unwrap();

    let result = store.create_file(file(&user, 0.1)).await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn test_folder_delete_cascade() {
    let Some(store) = setup_test_db().await else {
        return;
    };
    let user = create_user(&store, 1.0).await;
    let folder = store.create_folder(user.id, "Cascade").await.unwrap();

    store
        .create_file(file(&user, 0.1).in_folder(Some(folder.id)))
        .await
        .unwrap();
    store
        .create_file(file(&user, 0.2).in_folder(Some(folder.id)))
        .await
        .unwrap();
    let outside = store.create_file(file(&user, 0.05)).await.unwrap();

    let released = store.delete_folder(folder.id).await.unwrap().unwrap();
    assert!((released - 0.3).abs() < 1e-9);
    assert!((used(&store, &user).await - 0.05).abs() < 1e-9);
    assert!(store.find_folder(folder.id).await.unwrap().is_none());
    assert!(store.find_file(outside.id).await.unwrap().is_some());
    assert_eq!(store.delete_folder(folder.id).await.unwrap(), None);
}

#[tokio::test]
async fn test_delete_and_usage_by_type() {
    let Some(store) = setup_test_db().await else {
        return;
    };
    let user = create_user(&store, 5.0).await;

    let note = store.create_file(file(&user, 0.5)).await.unwrap();
    store
        .create_file(NewFile::new(user.id, "a.png", FileType::Image, 1.0, "u"))
        .await
        .unwrap();

    let usage = store.file_usage_by_type(user.id).await.unwrap();
    assert_eq!(usage.len(), 2);
    let images = usage
        .iter()
        .find(|u| u.file_type == FileType::Image)
        .unwrap();
    assert_eq!(images.count, 1);

    assert_eq!(store.delete_file(note.id).await.unwrap(), Some(0.5));
    assert_eq!(store.delete_file(note.id).await.unwrap(), None);
    assert!((used(&store, &user).await - 1.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_lock_hides_file_from_listings() {
    let Some(store) = setup_test_db().await else {
        return;
    };
    let user = create_user(&store, 1.0).await;
    let record = store.create_file(file(&user, 0.01)).await.unwrap();

    let locked = store.lock_file(record.id, "$2b$10$hash").await.unwrap().unwrap();
    assert!(locked.is_private);

    let visible = store
        .list_files(user.id, &FileQuery::of_type(FileType::Note))
        .await
        .unwrap();
    assert!(visible.is_empty());

    let toggled = store.toggle_file_favorite(record.id).await.unwrap().unwrap();
    assert!(toggled.is_favorite);
}
