mod common;

use chrono::Utc;
use cloud_storage_server::{
    auth::{PrivateAccessClaims, TokenPurpose, TokenService},
    errors::AppError,
    models::{FileRecord, FileType, LoginRequest, NewFile, PrivateResource, ResourceKind, User},
};
use common::{create_user, setup, setup_with, TestContext, PASSWORD};
use uuid::Uuid;

async fn seed_file(ctx: &TestContext, user: &User, name: &str) -> FileRecord {
    ctx.state
        .files
        .create(
            user.id,
            NewFile::new(user.id, name, FileType::Note, 0.01, "http://localhost/uploads/f"),
        )
        .await
        .unwrap()
}

#[tokio::test]
async fn test_file_privacy_round_trip() {
    let ctx = setup();
    let user = create_user(&ctx.store, "round@example.com", 1.0).await;
    let file = seed_file(&ctx, &user, "diary.txt").await;
    let gate = &ctx.state.privacy;

    gate.set_password(user.id, file.id, ResourceKind::File, "1234")
        .await
        .unwrap();

    let locked = ctx.store.find_file(file.id).await.unwrap().unwrap();
    assert!(locked.is_private);
    assert!(locked.pin_hash.as_deref().is_some_and(|h| h != "1234"));

    let grant = gate
        .verify_password(user.id, file.id, ResourceKind::File, "1234")
        .await
        .unwrap();
    assert_eq!(grant.expires_in, 3600);
    let response = grant.to_verify_response();
    assert!(response.access_granted);
    assert_eq!(response.resource_id, file.id);
    assert_eq!(response.resource_type, ResourceKind::File);

    let resource = gate.fetch_private(user.id, &grant.access_token).await.unwrap();
    match resource {
        PrivateResource::File(fetched) => {
            assert_eq!(fetched.id, file.id);
            assert!(fetched.is_private);
        }
        other => panic!("expected a file, got {:?}", other),
    }
}

#[tokio::test]
async fn test_wrong_pin_is_unauthorized() {
    let ctx = setup();
    let user = create_user(&ctx.store, "wrongpin@example.com", 1.0).await;
    let file = seed_file(&ctx, &user, "secret.txt").await;
    let gate = &ctx.state.privacy;

    gate.set_password(user.id, file.id, ResourceKind::File, "1234")
        .await
        .unwrap();

    let result = gate
        .verify_password(user.id, file.id, ResourceKind::File, "4321")
        .await;
    assert!(matches!(result, Err(AppError::Unauthorized(_))));
}

#[tokio::test]
async fn test_folder_pin_scenario() {
    let ctx = setup();
    let user = create_user(&ctx.store, "folderpin@example.com", 1.0).await;
    let gate = &ctx.state.privacy;

    let folder = ctx.state.folders.create(user.id, "Vault").await.unwrap();
    let inside = ctx
        .state
        .files
        .create(
            user.id,
            NewFile::new(user.id, "key.txt", FileType::Note, 0.01, "u").in_folder(Some(folder.id)),
        )
        .await
        .unwrap();

    gate.set_password(user.id, folder.id, ResourceKind::Folder, "1234")
        .await
        .unwrap();

    let wrong = gate
        .verify_password(user.id, folder.id, ResourceKind::Folder, "5678")
        .await;
    assert!(matches!(wrong, Err(AppError::Unauthorized(_))));

    let grant = gate
        .verify_password(user.id, folder.id, ResourceKind::Folder, "1234")
        .await
        .unwrap();
    match gate.fetch_private(user.id, &grant.access_token).await.unwrap() {
        PrivateResource::Folder(unlocked) => {
            assert_eq!(unlocked.folder.id, folder.id);
            assert_eq!(unlocked.files.len(), 1);
            assert_eq!(unlocked.files[0].id, inside.id);
        }
        other => panic!("expected a folder, got {:?}", other),
    }
}

#[tokio::test]
async fn test_token_of_another_user_is_forbidden() {
    let ctx = setup();
    let owner = create_user(&ctx.store, "owner@example.com", 1.0).await;
    let intruder = create_user(&ctx.store, "intruder@example.com", 1.0).await;
    let file = seed_file(&ctx, &owner, "owned.txt").await;
    let gate = &ctx.state.privacy;

    gate.set_password(owner.id, file.id, ResourceKind::File, "1234")
        .await
        .unwrap();
    let grant = gate
        .verify_password(owner.id, file.id, ResourceKind::File, "1234")
        .await
        .unwrap();

    let result = gate.fetch_private(intruder.id, &grant.access_token).await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn test_other_users_cannot_lock_or_verify() {
    let ctx = setup();
    let owner = create_user(&ctx.store, "mine@example.com", 1.0).await;
    let intruder = create_user(&ctx.store, "yours@example.com", 1.0).await;
    let file = seed_file(&ctx, &owner, "owned.txt").await;
    let gate = &ctx.state.privacy;

    let lock = gate
        .set_password(intruder.id, file.id, ResourceKind::File, "1234")
        .await;
    assert!(matches!(lock, Err(AppError::Forbidden(_))));

    gate.set_password(owner.id, file.id, ResourceKind::File, "1234")
        .await
        .unwrap();
    let verify = gate
        .verify_password(intruder.id, file.id, ResourceKind::File, "1234")
        .await;
    assert!(matches!(verify, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_pin_shape_and_state_checks() {
    let ctx = setup();
    let user = create_user(&ctx.store, "shape@example.com", 1.0).await;
    let file = seed_file(&ctx, &user, "plain.txt").await;
    let gate = &ctx.state.privacy;

    for bad in ["12a4", "123", "12345"] {
        let result = gate
            .set_password(user.id, file.id, ResourceKind::File, bad)
            .await;
        assert!(matches!(result, Err(AppError::BadRequest(_))), "{bad}");
    }

    let not_private = gate
        .verify_password(user.id, file.id, ResourceKind::File, "1234")
        .await;
    assert!(matches!(not_private, Err(AppError::BadRequest(_))));

    let missing = gate
        .verify_password(user.id, Uuid::new_v4(), ResourceKind::Folder, "1234")
        .await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_repeated_set_password_replaces_pin() {
    let ctx = setup();
    let user = create_user(&ctx.store, "replace@example.com", 1.0).await;
    let file = seed_file(&ctx, &user, "notes.txt").await;
    let gate = &ctx.state.privacy;

    gate.set_password(user.id, file.id, ResourceKind::File, "1111")
        .await
        .unwrap();
    gate.set_password(user.id, file.id, ResourceKind::File, "2222")
        .await
        .unwrap();

    let old = gate
        .verify_password(user.id, file.id, ResourceKind::File, "1111")
        .await;
    assert!(matches!(old, Err(AppError::Unauthorized(_))));
    assert!(gate
        .verify_password(user.id, file.id, ResourceKind::File, "2222")
        .await
        .is_ok());
}

#[tokio::test]
async fn test_login_tokens_are_not_private_access_tokens() {
    // Same secret for every purpose: only the purpose tag separates them.
    let ctx = setup_with(|config| {
        config.jwt.refresh_secret = config.jwt.access_secret.clone();
        config.jwt.private_access_secret = config.jwt.access_secret.clone();
    });
    let user = create_user(&ctx.store, "login@example.com", 1.0).await;
    let file = seed_file(&ctx, &user, "guarded.txt").await;

    ctx.state
        .privacy
        .set_password(user.id, file.id, ResourceKind::File, "1234")
        .await
        .unwrap();

    let login = ctx
        .state
        .auth
        .login(&LoginRequest {
            email: "login@example.com".to_string(),
            password: PASSWORD.to_string(),
        })
        .await
        .unwrap();

    for token in [&login.access_token, &login.refresh_token] {
        let result = ctx.state.privacy.fetch_private(user.id, token).await;
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }
}

#[tokio::test]
async fn test_expired_private_token_is_unauthorized() {
    let ctx = setup();
    let user = create_user(&ctx.store, "expired@example.com", 1.0).await;
    let file = seed_file(&ctx, &user, "old.txt").await;

    let tokens = TokenService::new(&ctx.state.config.jwt);
    let token = tokens
        .issue_with_ttl(
            TokenPurpose::PrivateAccess,
            &PrivateAccessClaims {
                resource_id: file.id,
                resource_type: ResourceKind::File,
                user_id: user.id,
            },
            -30,
        )
        .unwrap();

    let result = ctx.state.privacy.fetch_private(user.id, &token).await;
    assert!(matches!(result, Err(AppError::Unauthorized(_))));
}

#[tokio::test]
async fn test_private_rows_are_hidden_from_listings() {
    let ctx = setup();
    let user = create_user(&ctx.store, "hidden@example.com", 1.0).await;
    let public = seed_file(&ctx, &user, "public.txt").await;
    let private = seed_file(&ctx, &user, "private.txt").await;
    let public_folder = ctx.state.folders.create(user.id, "Open").await.unwrap();
    let private_folder = ctx.state.folders.create(user.id, "Closed").await.unwrap();
    let gate = &ctx.state.privacy;

    gate.set_password(user.id, private.id, ResourceKind::File, "1234")
        .await
        .unwrap();
    gate.set_password(user.id, private_folder.id, ResourceKind::Folder, "1234")
        .await
        .unwrap();

    let notes = ctx.state.files.list_by_type(user.id, FileType::Note).await.unwrap();
    assert_eq!(notes.iter().map(|f| f.id).collect::<Vec<_>>(), vec![public.id]);

    let recent = ctx.state.files.recent(user.id).await.unwrap();
    assert_eq!(recent.iter().map(|f| f.id).collect::<Vec<_>>(), vec![public.id]);

    let today = Utc::now().format("%Y-%m-%d").to_string();
    let by_date = ctx.state.files.by_date(user.id, &today).await.unwrap();
    assert_eq!(by_date.files.iter().map(|f| f.id).collect::<Vec<_>>(), vec![public.id]);
    assert_eq!(
        by_date.folders.iter().map(|f| f.id).collect::<Vec<_>>(),
        vec![public_folder.id]
    );

    let folders = ctx.state.folders.list(user.id).await.unwrap();
    assert_eq!(folders.iter().map(|f| f.id).collect::<Vec<_>>(), vec![public_folder.id]);

    let direct = ctx.state.folders.get(user.id, private_folder.id).await;
    assert!(matches!(direct, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_public_folder_view_hides_private_files() {
    let ctx = setup();
    let user = create_user(&ctx.store, "mixed@example.com", 1.0).await;
    let folder = ctx.state.folders.create(user.id, "Mixed").await.unwrap();

    let mut ids = Vec::new();
    for name in ["a.txt", "b.txt"] {
        let file = ctx
            .state
            .files
            .create(
                user.id,
                NewFile::new(user.id, name, FileType::Note, 0.01, "u").in_folder(Some(folder.id)),
            )
            .await
            .unwrap();
        ids.push(file.id);
    }
    ctx.state
        .privacy
        .set_password(user.id, ids[1], ResourceKind::File, "9999")
        .await
        .unwrap();

    let view = ctx.state.folders.get(user.id, folder.id).await.unwrap();
    assert_eq!(view.files.iter().map(|f| f.id).collect::<Vec<_>>(), vec![ids[0]]);
}
