use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use ossgate_core::models::{ObjectEntry, UploadResult};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::{ErrorResponse, HttpAppError, ValidatedQuery};
use crate::state::AppState;
use crate::utils::upload::extract_upload;

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct FileNameQuery {
    /// Full object key, e.g. `image/2024-05-01_photo.jpg`
    pub file_name: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Folder to list
    #[serde(default)]
    pub path: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteResponse {
    pub deleted: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DownloadResponse {
    pub url: String,
}

/// Upload a file
///
/// Stored under `pathName` when given, otherwise under `image`, `video`,
/// `music` or `file` by MIME type. Images also get a thumbnail.
#[utoipa::path(
    post,
    path = "/api/v0/files/upload",
    tag = "files",
    request_body(content = inline(Object), content_type = "multipart/form-data",
        description = "`file` part plus optional `pathName` text part"),
    responses(
        (status = 200, description = "File uploaded", body = UploadResult),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Storage or configuration error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "upload_file"))]
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<UploadResult>, HttpAppError> {
    let (file, path_name) = extract_upload(multipart).await?;
    let result = state
        .upload_service
        .upload_to(file, path_name.as_deref())
        .await?;
    Ok(Json(result))
}

#[utoipa::path(
    delete,
    path = "/api/v0/files",
    tag = "files",
    params(FileNameQuery),
    responses(
        (status = 200, description = "`deleted` is false when the object did not exist", body = DeleteResponse),
        (status = 400, description = "Invalid object name", body = ErrorResponse),
        (status = 500, description = "Storage error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(file_name = %query.file_name, operation = "delete_file"))]
pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    ValidatedQuery(query): ValidatedQuery<FileNameQuery>,
) -> Result<Json<DeleteResponse>, HttpAppError> {
    let deleted = state.upload_service.delete(&query.file_name).await?;
    Ok(Json(DeleteResponse { deleted }))
}

/// Access URL for an object: the public URL for local storage, a presigned URL otherwise.
#[utoipa::path(
    get,
    path = "/api/v0/files/download",
    tag = "files",
    params(FileNameQuery),
    responses(
        (status = 200, description = "Access URL", body = DownloadResponse),
        (status = 400, description = "Invalid object name", body = ErrorResponse),
        (status = 500, description = "Storage error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(file_name = %query.file_name, operation = "download_file"))]
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    ValidatedQuery(query): ValidatedQuery<FileNameQuery>,
) -> Result<Json<DownloadResponse>, HttpAppError> {
    let url = state.upload_service.download(&query.file_name).await?;
    Ok(Json(DownloadResponse { url }))
}

/// Image bytes re-encoded in the format named by the file extension.
#[utoipa::path(
    get,
    path = "/api/v0/files/image",
    tag = "files",
    params(FileNameQuery),
    responses(
        (status = 200, description = "Image bytes", body = Vec<u8>, content_type = "application/octet-stream"),
        (status = 400, description = "Not a supported image", body = ErrorResponse),
        (status = 404, description = "Object not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(file_name = %query.file_name, operation = "download_image"))]
pub async fn download_image(
    State(state): State<Arc<AppState>>,
    ValidatedQuery(query): ValidatedQuery<FileNameQuery>,
) -> Result<Response, HttpAppError> {
    let image = state
        .upload_service
        .download_image(&query.file_name)
        .await?;
    Ok(([(header::CONTENT_TYPE, image.content_type)], image.data).into_response())
}

/// Files directly inside a folder
#[utoipa::path(
    get,
    path = "/api/v0/files/list",
    tag = "files",
    params(ListQuery),
    responses(
        (status = 200, description = "Objects sorted by name", body = [ObjectEntry]),
        (status = 400, description = "Invalid folder", body = ErrorResponse),
        (status = 404, description = "Folder not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(path = %query.path, operation = "list_files"))]
pub async fn list_files(
    State(state): State<Arc<AppState>>,
    ValidatedQuery(query): ValidatedQuery<ListQuery>,
) -> Result<Json<Vec<ObjectEntry>>, HttpAppError> {
    let entries = state.upload_service.list_objects(&query.path, false).await?;
    Ok(Json(entries))
}

/// Files in a folder and all of its subfolders
#[utoipa::path(
    get,
    path = "/api/v0/files/list/all",
    tag = "files",
    params(ListQuery),
    responses(
        (status = 200, description = "Objects sorted by name", body = [ObjectEntry]),
        (status = 400, description = "Invalid folder", body = ErrorResponse),
        (status = 404, description = "Folder not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(path = %query.path, operation = "list_all_files"))]
pub async fn list_all_files(
    State(state): State<Arc<AppState>>,
    ValidatedQuery(query): ValidatedQuery<ListQuery>,
) -> Result<Json<Vec<ObjectEntry>>, HttpAppError> {
    let entries = state.upload_service.list_objects(&query.path, true).await?;
    Ok(Json(entries))
}
