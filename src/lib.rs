pub mod auth;
pub mod config;
pub mod database;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod storage;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, patch, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::handlers::AppState;

/// Headroom for multipart framing on top of the largest accepted file.
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

pub fn create_app(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/login", post(handlers::auth::login))
        .route("/refresh", post(handlers::auth::refresh_token))
        .route("/logout", post(handlers::auth::logout));

    let file_routes = Router::new()
        .route("/storage", get(handlers::files::storage))
        .route("/storage-summary", get(handlers::files::storage_summary))
        .route("/upload", post(handlers::files::upload))
        .route("/note-files", get(handlers::files::note_files))
        .route("/image-files", get(handlers::files::image_files))
        .route("/pdf-files", get(handlers::files::pdf_files))
        .route("/recent", get(handlers::files::recent))
        .route("/by-date", get(handlers::files::by_date))
        .route("/favorite/:id", patch(handlers::files::toggle_favorite))
        .route("/rename/:id", patch(handlers::files::rename))
        .route("/duplicate/:id", post(handlers::files::duplicate))
        .route("/copy/:id", post(handlers::files::duplicate))
        .route("/set-password/:id", patch(handlers::privacy::set_password))
        .route("/verify-password/:id", post(handlers::privacy::verify_password))
        .route("/private-content", get(handlers::privacy::private_content))
        .route("/:id", delete(handlers::files::delete));

    let folder_routes = Router::new()
        .route(
            "/",
            post(handlers::folders::create).get(handlers::folders::list),
        )
        .route("/rename/:id", patch(handlers::folders::rename))
        .route(
            "/:id",
            get(handlers::folders::get).delete(handlers::folders::delete),
        );

    let api = Router::new()
        .nest("/auth", auth_routes)
        .nest("/files", file_routes)
        .nest("/folders", folder_routes)
        .layer(DefaultBodyLimit::max(
            state.config.max_file_size + MULTIPART_OVERHEAD,
        ));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health::liveness))
        .route("/health/ready", get(handlers::health::readiness))
        .nest("/api/v1", api)
        .nest_service("/uploads", ServeDir::new(&state.config.upload_dir))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
