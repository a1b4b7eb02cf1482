//! Upload, download, listing, and delete handlers.

use axum::body::Body as AxumBody;
use axum::extract::{Extension, Multipart, Path};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use httpdate::fmt_http_date;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use tracing::{error, info, warn};

use crate::auth::CurrentUser;
use crate::config::UPLOAD_FIELD_NAME;
use crate::error::ApiError;
use crate::pages;
use crate::storage::{StorageError, UploadStore};

/// Accepts one file from the multipart field `file`, streams it into the
/// store under a generated name, and renders the success page. A request
/// without that field is rejected before any storage I/O.
pub async fn upload_file(
    Extension(store): Extension<Arc<UploadStore>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    while let Some(mut field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD_NAME) {
            continue;
        }
        let Some(original_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        if original_name.is_empty() {
            continue;
        }

        let stored_name = store.generate_name(&original_name);
        let mut writer = store.begin_write(&stored_name).await?;
        let write_result: Result<(), ApiError> = async {
            while let Some(chunk) = field.chunk().await? {
                writer
                    .file_mut()
                    .write_all(&chunk)
                    .await
                    .map_err(|err| ApiError::Internal(err.to_string()))?;
            }
            Ok(())
        }
        .await;
        if let Err(err) = write_result {
            writer.cleanup().await;
            return Err(err);
        }
        writer
            .finalize()
            .await
            .map_err(|err| ApiError::Internal(err.to_string()))?;

        info!(user = %user, original = %original_name, stored = %stored_name, "file uploaded");
        return Ok(Html(pages::upload_success(&stored_name)).into_response());
    }

    Err(ApiError::BadRequest("No file uploaded.".into()))
}

/// Serves a stored file's raw bytes by exact name.
pub async fn download_upload(
    Path(name): Path<String>,
    Extension(store): Extension<Arc<UploadStore>>,
) -> Result<Response, ApiError> {
    let (file, metadata) = store.open(&name).await?;
    let mime = mime_guess::from_path(&name).first_or_octet_stream();

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(mime.essence_str())
            .map_err(|_| ApiError::Internal("invalid mime type".into()))?,
    );
    headers.insert(
        header::CONTENT_LENGTH,
        HeaderValue::from_str(&metadata.len().to_string())
            .map_err(|_| ApiError::Internal("header build failed".into()))?,
    );
    if let Ok(modified) = metadata.modified() {
        headers.insert(
            header::LAST_MODIFIED,
            HeaderValue::from_str(&fmt_http_date(modified))
                .map_err(|_| ApiError::Internal("header build failed".into()))?,
        );
    }

    info!(name, size = metadata.len(), "download file");
    let stream = ReaderStream::new(file);
    Ok((StatusCode::OK, headers, AxumBody::from_stream(stream)).into_response())
}

/// Renders the file listing page from a fresh directory enumeration.
pub async fn list_uploads(
    Extension(store): Extension<Arc<UploadStore>>,
) -> Result<Html<String>, ApiError> {
    let names = store.list_all().await?;
    info!(count = names.len(), "list files");
    Ok(Html(pages::file_list(&names)))
}

/// Deletes a stored file. A missing file and a lower-level I/O failure are
/// reported to the caller with one collapsed message; the log distinguishes
/// them.
pub async fn delete_upload(
    Path(name): Path<String>,
    Extension(store): Extension<Arc<UploadStore>>,
) -> (StatusCode, &'static str) {
    match store.delete(&name).await {
        Ok(()) => {
            info!(name, "file deleted");
            (StatusCode::OK, "File deleted successfully.")
        }
        Err(StorageError::InvalidName) => (StatusCode::BAD_REQUEST, "invalid file name"),
        Err(StorageError::NotFound) => {
            warn!(name, "delete of missing file");
            (StatusCode::INTERNAL_SERVER_ERROR, "Unable to delete file.")
        }
        Err(StorageError::Io(err)) => {
            error!(name, error = %err, "delete failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Unable to delete file.")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Path;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn make_store() -> (tempfile::TempDir, Arc<UploadStore>) {
        let temp = tempdir().expect("tempdir");
        let root = temp.path().join("uploads");
        std::fs::create_dir_all(&root).expect("create uploads root");
        (temp, Arc::new(UploadStore::new(root, false)))
    }

    async fn make_multipart(body: &'static str) -> Multipart {
        use axum::extract::FromRequest;

        let request = axum::http::Request::builder()
            .method("POST")
            .uri("/upload")
            .header("content-type", "multipart/form-data; boundary=BOUNDARY")
            .body(AxumBody::from(body))
            .expect("request");
        Multipart::from_request(request, &())
            .await
            .expect("multipart")
    }

    #[tokio::test]
    async fn upload_without_file_field_is_rejected_and_stores_nothing() {
        let (_temp, store) = make_store();
        let multipart = make_multipart(concat!(
            "--BOUNDARY\r\n",
            "Content-Disposition: form-data; name=\"comment\"\r\n",
            "\r\n",
            "just text, no file\r\n",
            "--BOUNDARY--\r\n",
        ))
        .await;

        let result = upload_file(
            Extension(store.clone()),
            Extension(CurrentUser("admin".to_string())),
            multipart,
        )
        .await;

        match result {
            Err(ApiError::BadRequest(msg)) => assert_eq!(msg, "No file uploaded."),
            _ => panic!("expected a 400 for the missing file field"),
        }
        assert!(store.list_all().await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn upload_stores_the_file_under_a_generated_name() {
        let (_temp, store) = make_store();
        let multipart = make_multipart(concat!(
            "--BOUNDARY\r\n",
            "Content-Disposition: form-data; name=\"file\"; filename=\"photo.png\"\r\n",
            "Content-Type: image/png\r\n",
            "\r\n",
            "png-bytes\r\n",
            "--BOUNDARY--\r\n",
        ))
        .await;

        let response = upload_file(
            Extension(store.clone()),
            Extension(CurrentUser("admin".to_string())),
            multipart,
        )
        .await
        .expect("upload");
        assert_eq!(response.status(), StatusCode::OK);

        let names = store.list_all().await.expect("list");
        assert_eq!(names.len(), 1);
        assert!(names[0].ends_with(".png"));
        let content = tokio::fs::read(store.root_path().join(&names[0]))
            .await
            .expect("read back");
        assert_eq!(content, b"png-bytes");
    }

    #[tokio::test]
    async fn delete_reports_success_then_collapsed_failure() {
        let (_temp, store) = make_store();
        std::fs::write(store.root_path().join("123.txt"), b"x").expect("seed file");

        let (status, message) =
            delete_upload(Path("123.txt".to_string()), Extension(store.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(message, "File deleted successfully.");

        let (status, message) =
            delete_upload(Path("123.txt".to_string()), Extension(store)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(message, "Unable to delete file.");
    }

    #[tokio::test]
    async fn delete_rejects_traversal_names() {
        let (_temp, store) = make_store();
        let (status, _) =
            delete_upload(Path("../outside.txt".to_string()), Extension(store)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn list_page_contains_exactly_the_stored_names() {
        let (_temp, store) = make_store();
        std::fs::write(store.root_path().join("1700000000000.png"), b"a").expect("seed");
        std::fs::write(store.root_path().join("1700000000001.txt"), b"b").expect("seed");

        let Html(page) = list_uploads(Extension(store)).await.expect("list");
        assert!(page.contains("1700000000000.png"));
        assert!(page.contains("1700000000001.txt"));
    }

    #[tokio::test]
    async fn download_of_missing_file_is_not_found() {
        let (_temp, store) = make_store();
        let result = download_upload(Path("missing.txt".to_string()), Extension(store)).await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn download_sets_content_headers() {
        let (_temp, store) = make_store();
        std::fs::write(store.root_path().join("123.png"), b"bytes").expect("seed");

        let response = download_upload(Path("123.png".to_string()), Extension(store))
            .await
            .expect("download");
        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers.get(header::CONTENT_TYPE).unwrap(), "image/png");
        assert_eq!(headers.get(header::CONTENT_LENGTH).unwrap(), "5");
    }
}
