//! Defines the gateway routes.
//!
//! ## Structure
//! - **Folder endpoints** (POST, JSON body)
//!   - `/create-folder`      — write `userId/folderName/.keep`
//!   - `/get-presigned-url`  — upload URL for `userId/folderName/fileName`
//!   - `/list-files`         — files under `userId/folderName/`
//!   - `/get-download-url`   — download URL for `userId/folderName/fileName`
//!   - `/delete-file`        — delete `userId/folderName/fileName`
//!
//! - **Probes**
//!   - `GET /healthz`, `GET /readyz`

use crate::{
    handlers::{
        folder_handlers::{create_folder, delete_file, get_download_url, get_upload_url, list_files},
        health_handlers::{healthz, readyz},
    },
    services::storage_service::StorageService,
};
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{get, post},
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

/// Build the router for all gateway routes.
///
/// The router carries shared state (`StorageService`) to all handlers.
pub fn routes() -> Router<StorageService> {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/create-folder", post(create_folder))
        .route("/get-presigned-url", post(get_upload_url))
        .route("/list-files", post(list_files))
        .route("/get-download-url", post(get_download_url))
        .route("/delete-file", post(delete_file))
}

/// Cross-origin access for exactly one browser origin.
///
/// A list match echoes the origin only when it is the allowed one; other
/// origins get no `access-control-allow-origin` header at all.
pub fn cors(allowed_origin: HeaderValue) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list([allowed_origin]))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
}

/// The complete application: routes, CORS, request tracing and state.
pub fn app(service: StorageService, allowed_origin: HeaderValue) -> Router {
    routes()
        .layer(cors(allowed_origin))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}
