//! Multipart parsing for the upload endpoint

use axum::extract::multipart::MultipartError;
use axum::extract::Multipart;
use axum::http::StatusCode;
use ossgate_core::AppError;

use crate::services::upload::UploadedFile;

/// Multipart field carrying the file
pub const FILE_FIELD: &str = "file";
/// Optional multipart field naming the destination folder
pub const PATH_FIELD: &str = "pathName";

/// Body limit overruns become 413; anything else is a malformed request.
fn multipart_error(context: &str, err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(format!("{}: {}", context, err.body_text()))
    } else {
        AppError::InvalidInput(format!("{}: {}", context, err.body_text()))
    }
}

/// Extract the uploaded file and optional destination folder from a multipart form.
/// Only one field named "file" is accepted; multiple file fields are rejected.
pub async fn extract_upload(
    mut multipart: Multipart,
) -> Result<(UploadedFile, Option<String>), AppError> {
    let mut file: Option<UploadedFile> = None;
    let mut path_name: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error("Failed to read multipart", e))?
    {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();

        match field_name.as_str() {
            FILE_FIELD => {
                if file.is_some() {
                    return Err(AppError::InvalidInput(
                        "Multiple file fields are not allowed; send exactly one field named 'file'"
                            .to_string(),
                    ));
                }
                let filename = field
                    .file_name()
                    .map(|s: &str| s.to_string())
                    .unwrap_or_else(|| "unknown".to_string());
                let content_type = field
                    .content_type()
                    .map(|s: &str| s.to_string())
                    .unwrap_or_else(|| "application/octet-stream".to_string());

                let data = field
                    .bytes()
                    .await
                    .map_err(|e| multipart_error("Failed to read file data", e))?;

                file = Some(UploadedFile {
                    filename,
                    content_type,
                    data,
                });
            }
            PATH_FIELD => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| multipart_error("Failed to read pathName", e))?;
                path_name = Some(value).filter(|v| !v.trim().is_empty());
            }
            _ => {}
        }
    }

    let file = file.ok_or_else(|| AppError::InvalidInput("No file provided".to_string()))?;

    Ok((file, path_name))
}
