//! File API integration tests against the local backend.
//!
//! Run with: `cargo test -p ossgate-api --test files_test`

mod helpers;

use axum_test::multipart::{MultipartForm, Part};
use chrono::Local;
use helpers::fixtures::{create_test_png, create_text_file};
use helpers::{api_path, setup_test_app, setup_test_app_in, TestApp, LOCAL_BASE_URL};
use serde_json::Value;

fn dated(name: &str) -> String {
    format!("{}_{}", Local::now().format("%Y-%m-%d"), name)
}

fn file_form(name: &str, mime: &str, data: Vec<u8>) -> MultipartForm {
    MultipartForm::new().add_part("file", Part::bytes(data).file_name(name).mime_type(mime))
}

#[tokio::test]
async fn test_upload_text_file_goes_to_file_folder() {
    let app = setup_test_app();
    let client = app.client();

    let response = client
        .post(&api_path("/files/upload"))
        .multipart(file_form("notes.txt", "text/plain", create_text_file()))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(
        body["url"],
        format!("{}/file/{}", LOCAL_BASE_URL, dated("notes.txt"))
    );
    assert!(body["thumbUrl"].is_null());
    assert!(app.stored_path(&format!("file/{}", dated("notes.txt"))).is_file());
}

#[tokio::test]
async fn test_upload_image_creates_thumbnail() {
    let app = setup_test_app();
    let client = app.client();

    let response = client
        .post(&api_path("/files/upload"))
        .multipart(file_form("photo.png", "image/png", create_test_png(400, 300)))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    let thumb_key = format!("thumb/thumb_{}", dated("photo.png"));
    assert_eq!(
        body["url"],
        format!("{}/image/{}", LOCAL_BASE_URL, dated("photo.png"))
    );
    assert_eq!(body["thumbUrl"], format!("{}/{}", LOCAL_BASE_URL, thumb_key));

    let thumb = image::open(app.stored_path(&thumb_key)).expect("thumbnail decodes");
    assert_eq!((thumb.width(), thumb.height()), (200, 150));
}

#[tokio::test]
async fn test_uploaded_local_url_is_served() {
    let app = setup_test_app();
    let client = app.client();

    let response = client
        .post(&api_path("/files/upload"))
        .multipart(file_form("notes.txt", "text/plain", create_text_file()))
        .await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    let url = body["url"].as_str().expect("url");

    let path = TestApp::local_url_path(url);
    assert_eq!(path, format!("/files/file/{}", dated("notes.txt")));

    let served = client.get(&path).await;
    assert_eq!(served.status_code(), 200);
    assert_eq!(served.as_bytes().to_vec(), create_text_file());

    let missing = client.get("/files/file/nothing-here.txt").await;
    assert_eq!(missing.status_code(), 404);
}

#[tokio::test]
async fn test_thumbnail_failure_removes_original() {
    let app = setup_test_app();
    let client = app.client();
    // A regular file where the thumbnail folder should be makes the second write fail.
    std::fs::write(app.stored_path("thumb"), b"not a directory").unwrap();

    let response = client
        .post(&api_path("/files/upload"))
        .multipart(file_form("photo.png", "image/png", create_test_png(64, 64)))
        .await;

    assert_eq!(response.status_code(), 500);
    let body: Value = response.json();
    assert_eq!(body["code"], "STORAGE_ERROR");
    assert!(!app
        .stored_path(&format!("image/{}", dated("photo.png")))
        .exists());
}

#[tokio::test]
async fn test_error_details_hidden_in_production() {
    for (environment, has_details) in [("test", true), ("production", false)] {
        let app = setup_test_app_in(environment);
        let form = MultipartForm::new().add_text("pathName", "docs");
        let response = app
            .client()
            .post(&api_path("/files/upload"))
            .multipart(form)
            .await;

        assert_eq!(response.status_code(), 400);
        let body: Value = response.json();
        assert_eq!(body["code"], "INVALID_INPUT");
        assert_eq!(body["error"], "No file provided");
        assert_eq!(body.get("details").is_some(), has_details, "{}", environment);
        assert_eq!(body.get("error_type").is_some(), has_details, "{}", environment);
    }
}

#[tokio::test]
async fn test_upload_with_path_name() {
    let app = setup_test_app();
    let client = app.client();

    let form = file_form("report.pdf", "application/pdf", b"%PDF-1.4".to_vec())
        .add_text("pathName", "docs/2024");
    let response = client.post(&api_path("/files/upload")).multipart(form).await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(
        body["url"],
        format!("{}/docs/2024/{}", LOCAL_BASE_URL, dated("report.pdf"))
    );
}

#[tokio::test]
async fn test_upload_strips_client_directories() {
    let app = setup_test_app();
    let client = app.client();

    let response = client
        .post(&api_path("/files/upload"))
        .multipart(file_form("../../evil.txt", "text/plain", create_text_file()))
        .await;

    assert_eq!(response.status_code(), 200);
    assert!(app.stored_path(&format!("file/{}", dated("evil.txt"))).is_file());
}

#[tokio::test]
async fn test_upload_without_file_part_is_rejected() {
    let app = setup_test_app();
    let client = app.client();

    let form = MultipartForm::new().add_text("pathName", "docs");
    let response = client.post(&api_path("/files/upload")).multipart(form).await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_upload_corrupt_image_fails_without_storing() {
    let app = setup_test_app();
    let client = app.client();

    let response = client
        .post(&api_path("/files/upload"))
        .multipart(file_form("broken.png", "image/png", b"not an image".to_vec()))
        .await;

    assert_eq!(response.status_code(), 400);
    assert!(!app
        .stored_path(&format!("image/{}", dated("broken.png")))
        .exists());
}

#[tokio::test]
async fn test_download_returns_public_url() {
    let app = setup_test_app();
    let client = app.client();

    client
        .post(&api_path("/files/upload"))
        .multipart(file_form("notes.txt", "text/plain", create_text_file()))
        .await;

    let key = format!("file/{}", dated("notes.txt"));
    let response = client
        .get(&api_path("/files/download"))
        .add_query_param("fileName", &key)
        .await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["url"], format!("{}/{}", LOCAL_BASE_URL, key));
}

#[tokio::test]
async fn test_download_rejects_traversal() {
    let app = setup_test_app();
    let response = app
        .client()
        .get(&api_path("/files/download"))
        .add_query_param("fileName", "../secret.txt")
        .await;

    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn test_download_image_reencodes_by_extension() {
    let app = setup_test_app();
    let client = app.client();

    // PNG bytes under a .jpg name come back as JPEG.
    client
        .post(&api_path("/files/upload"))
        .multipart(file_form("photo.jpg", "image/jpeg", create_test_png(64, 48)))
        .await;

    let response = client
        .get(&api_path("/files/image"))
        .add_query_param("fileName", format!("image/{}", dated("photo.jpg")))
        .await;

    assert_eq!(response.status_code(), 200);
    assert_eq!(response.header("content-type"), "image/jpeg");
    let bytes = response.as_bytes();
    assert_eq!(
        image::guess_format(bytes).expect("known format"),
        image::ImageFormat::Jpeg
    );
    let decoded = image::load_from_memory(bytes).expect("decodes");
    assert_eq!((decoded.width(), decoded.height()), (64, 48));
}

#[tokio::test]
async fn test_download_image_missing_object() {
    let app = setup_test_app();
    let response = app
        .client()
        .get(&api_path("/files/image"))
        .add_query_param("fileName", "image/missing.png")
        .await;

    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn test_download_image_unsupported_extension() {
    let app = setup_test_app();
    let response = app
        .client()
        .get(&api_path("/files/image"))
        .add_query_param("fileName", "file/report.docx")
        .await;

    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn test_delete_reports_whether_object_existed() {
    let app = setup_test_app();
    let client = app.client();

    client
        .post(&api_path("/files/upload"))
        .multipart(file_form("notes.txt", "text/plain", create_text_file()))
        .await;
    let key = format!("file/{}", dated("notes.txt"));

    let first = client
        .delete(&api_path("/files"))
        .add_query_param("fileName", &key)
        .await;
    assert_eq!(first.status_code(), 200);
    assert_eq!(first.json::<Value>()["deleted"], true);
    assert!(!app.stored_path(&key).exists());

    let second = client
        .delete(&api_path("/files"))
        .add_query_param("fileName", &key)
        .await;
    assert_eq!(second.status_code(), 200);
    assert_eq!(second.json::<Value>()["deleted"], false);
}

#[tokio::test]
async fn test_list_direct_and_recursive() {
    let app = setup_test_app();
    let client = app.client();

    client
        .post(&api_path("/files/upload"))
        .multipart(
            file_form("a.txt", "text/plain", vec![b'a'; 2048]).add_text("pathName", "docs"),
        )
        .await;
    client
        .post(&api_path("/files/upload"))
        .multipart(
            file_form("b.txt", "text/plain", create_text_file()).add_text("pathName", "docs/sub"),
        )
        .await;

    let direct = client
        .get(&api_path("/files/list"))
        .add_query_param("path", "docs")
        .await;
    assert_eq!(direct.status_code(), 200);
    let entries: Vec<Value> = direct.json();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["name"], format!("docs/{}", dated("a.txt")));
    assert_eq!(entries[0]["size"], "2.00KB");

    let all = client
        .get(&api_path("/files/list/all"))
        .add_query_param("path", "docs")
        .await;
    assert_eq!(all.status_code(), 200);
    let names: Vec<String> = all
        .json::<Vec<Value>>()
        .iter()
        .filter_map(|e| e["name"].as_str().map(str::to_string))
        .collect();
    assert_eq!(
        names,
        vec![
            format!("docs/{}", dated("a.txt")),
            format!("docs/sub/{}", dated("b.txt")),
        ]
    );
}

#[tokio::test]
async fn test_list_missing_folder_is_not_found() {
    let app = setup_test_app();
    let response = app
        .client()
        .get(&api_path("/files/list"))
        .add_query_param("path", "nowhere")
        .await;

    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn test_upload_fails_when_active_backend_has_no_profile() {
    let app = setup_test_app();
    app.settings.set_active(Some("minio"));

    let response = app
        .client()
        .post(&api_path("/files/upload"))
        .multipart(file_form("notes.txt", "text/plain", create_text_file()))
        .await;

    assert_eq!(response.status_code(), 500);
    let body: Value = response.json();
    assert_eq!(body["code"], "CONFIGURATION_ERROR");
}
