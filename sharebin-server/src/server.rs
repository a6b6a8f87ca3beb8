use crate::config::Config;
use axum::{
    Json, Router,
    body::Body,
    extract::{
        Multipart, Path, State,
        multipart::MultipartError,
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use sharebin_core::{
    DownloadFileOperation, DownloadFileOperationOutcome, FileStore, Result, ShareError,
    SqliteCatalog, UploadFileOperation, UploadFileOperationRequest,
};
use std::sync::Arc;
use tokio_util::io::ReaderStream;
use tower_http::trace::TraceLayer;

pub struct ServerState {
    pub upload: UploadFileOperation,
    pub download: DownloadFileOperation,
    pub file_store: Arc<FileStore>,
    pub base_path: String,
}

#[derive(Debug, Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    error: Option<String>,
}

pub fn build_state(config: &Config) -> Result<Arc<ServerState>> {
    if let Some(parent) = config.storage.catalog_db.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let catalog = Arc::new(SqliteCatalog::new(config.storage.catalog_db.clone())?);
    let file_store = Arc::new(FileStore::new(config.storage.uploads_dir.clone())?);

    let upload = UploadFileOperation::new(
        catalog.clone(),
        file_store.clone(),
        config.storage.limits(),
    );
    let download = DownloadFileOperation::new(catalog, file_store.clone());

    Ok(Arc::new(ServerState {
        upload,
        download,
        file_store,
        base_path: config.api.base_path.clone(),
    }))
}

pub fn build_router(state: Arc<ServerState>) -> Router {
    let api = Router::new()
        .route("/upload", post(upload_file))
        .route("/info", get(files_info))
        .route("/download/:file_id", get(download_file));

    let base_path = state.base_path.clone();

    Router::new()
        .nest(&base_path, api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_server(config: Config) -> Result<()> {
    let state = build_state(&config)?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr).await?;
    tracing::info!("Server listening on {}", config.server.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn upload_file(
    State(state): State<Arc<ServerState>>,
    mut multipart: Multipart,
) -> Response {
    let request = match read_file_field(&mut multipart).await {
        Ok(Some(request)) => request,
        Ok(None) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                "multipart field 'file' is missing".to_string(),
            );
        }
        Err(error) => return error_response(StatusCode::BAD_REQUEST, error.to_string()),
    };

    match state.upload.run(request).await {
        Ok(result) => {
            let location = result.record.download_path(&state.base_path);
            (StatusCode::CREATED, [(header::LOCATION, location)]).into_response()
        }
        Err(error) => share_error_response(error),
    }
}

/// Pull the `file` form field out of a multipart body.
async fn read_file_field(
    multipart: &mut Multipart,
) -> std::result::Result<Option<UploadFileOperationRequest>, MultipartError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let body = field.bytes().await?;

        return Ok(Some(UploadFileOperationRequest {
            file_name,
            content_type,
            body,
        }));
    }

    Ok(None)
}

async fn files_info(State(state): State<Arc<ServerState>>) -> Response {
    match state.file_store.stored_files_info().await {
        Ok(info) => (StatusCode::OK, Json(info)).into_response(),
        Err(error) => share_error_response(error),
    }
}

async fn download_file(
    State(state): State<Arc<ServerState>>,
    Path(file_id): Path<String>,
) -> Response {
    match state.download.run(&file_id).await {
        Ok(DownloadFileOperationOutcome::Found(result)) => {
            let headers = [
                (header::CONTENT_TYPE, result.record.content_type.clone()),
                (header::CONTENT_LENGTH, result.size.to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    content_disposition(&result.record.name),
                ),
            ];
            let body = Body::from_stream(ReaderStream::new(result.body));
            (StatusCode::OK, headers, body).into_response()
        }
        Ok(DownloadFileOperationOutcome::NotFound) => error_response(
            StatusCode::NOT_FOUND,
            format!("no file with id {file_id}"),
        ),
        Err(error) => share_error_response(error),
    }
}

fn share_error_response(error: ShareError) -> Response {
    let status = match &error {
        ShareError::InsufficientSpace { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        ShareError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        ShareError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        ShareError::NotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!("request failed: {}", error);
        return error_response(status, "internal error".to_string());
    }

    error_response(status, error.to_string())
}

fn error_response(status: StatusCode, message: String) -> Response {
    let resp = ApiResponse::<()> {
        success: false,
        data: None,
        error: Some(message),
    };
    (status, Json(resp)).into_response()
}

/// Header-safe Content-Disposition value. Non-ASCII and control characters
/// in the stored name are dropped, quotes and backslashes replaced, before
/// quoting.
fn content_disposition(file_name: &str) -> String {
    let sanitized: String = file_name
        .chars()
        .filter(|c| c.is_ascii() && !c.is_ascii_control())
        .map(|c| match c {
            '"' | '\\' => '_',
            _ => c,
        })
        .collect();

    format!("attachment; filename=\"{sanitized}\"")
}
