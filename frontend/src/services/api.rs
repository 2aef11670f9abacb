//! HTTP client for the Data Sweeper backend.
//!
//! One function per endpoint. Every call is scoped to the session created
//! at startup; errors are turned into [`AppError`] with the backend's
//! message when it sent one.

use gloo_net::http::{Request, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use wasm_bindgen::JsValue;
use web_sys::{Blob, BlobPropertyBag, File, FormData, Url};

use crate::types::*;
use crate::BACKEND_URL;

#[derive(Serialize)]
struct ColumnsRequest<'a> {
    columns: &'a [String],
}

fn file_url(session: &str, file: &str, action: &str) -> String {
    format!("{}/api/sessions/{}/files/{}/{}", BACKEND_URL, session, file, action)
}

fn js_error(context: &str, e: JsValue) -> AppError {
    AppError::Validation(format!("{}: {:?}", context, e))
}

/// Turn a non-2xx response into an error, using the `error` field of the body.
async fn check(response: Response) -> AppResult<Response> {
    if response.ok() {
        return Ok(response);
    }

    let status = response.status();
    let text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
    let message = serde_json::from_str::<serde_json::Value>(&text)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .unwrap_or(text);

    Err(AppError::Server { status, message })
}

async fn read_json<T: DeserializeOwned>(response: Response) -> AppResult<T> {
    check(response)
        .await?
        .json::<T>()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to parse response: {}", e)))
}

async fn post_empty<T: DeserializeOwned>(url: &str) -> AppResult<T> {
    let response = Request::post(url)
        .send()
        .await
        .map_err(|e| AppError::Network(e.to_string()))?;
    read_json(response).await
}

/// Start a new session.
pub async fn create_session() -> AppResult<String> {
    let url = format!("{}/api/sessions", BACKEND_URL);
    let created: SessionCreated = post_empty(&url).await?;
    Ok(created.session_id)
}

/// Upload several files in one multipart request.
pub async fn upload_files(session: &str, files: &[File]) -> AppResult<UploadResponse> {
    let form_data = FormData::new().map_err(|e| js_error("Failed to create FormData", e))?;

    for file in files {
        form_data
            .append_with_blob_and_filename("file", file, &file.name())
            .map_err(|e| js_error("Failed to append file", e))?;
    }

    let url = format!("{}/api/sessions/{}/files", BACKEND_URL, session);
    let request = Request::post(&url)
        .body(form_data)
        .map_err(|e| AppError::Upload(format!("Failed to build request: {}", e)))?;

    let response = request
        .send()
        .await
        .map_err(|e| AppError::Network(format!("HTTP request failed: {}", e)))?;

    read_json(response).await
}

pub async fn remove_duplicates(session: &str, file: &str) -> AppResult<DedupResponse> {
    post_empty(&file_url(session, file, "dedup")).await
}

pub async fn fill_missing(session: &str, file: &str) -> AppResult<FillResponse> {
    post_empty(&file_url(session, file, "fill-missing")).await
}

/// Discard cleaning and selection, back to the uploaded table.
pub async fn reset_file(session: &str, file: &str) -> AppResult<FileSummary> {
    post_empty(&file_url(session, file, "reset")).await
}

/// Chart of `column`, or of the first numeric column.
pub async fn fetch_chart(session: &str, file: &str, column: Option<&str>) -> AppResult<Visualization> {
    let base = file_url(session, file, "chart");
    let request = match column {
        Some(column) => Request::get(&base).query([("column", column)]),
        None => Request::get(&base),
    };

    let response = request
        .send()
        .await
        .map_err(|e| AppError::Network(e.to_string()))?;
    read_json(response).await
}

pub async fn select_columns(session: &str, file: &str, columns: &[String]) -> AppResult<Vec<String>> {
    let response = Request::put(&file_url(session, file, "columns"))
        .json(&ColumnsRequest { columns })
        .map_err(|e| AppError::Validation(e.to_string()))?
        .send()
        .await
        .map_err(|e| AppError::Network(e.to_string()))?;

    let selected: ColumnsResponse = read_json(response).await?;
    Ok(selected.selected_columns)
}

/// Convert a file and return a download link for it.
pub async fn export_file(session: &str, file: &FileSummary, format: ExportFormat) -> AppResult<Download> {
    let response = Request::get(&file_url(session, &file.id, "export"))
        .query([("format", format.as_query())])
        .send()
        .await
        .map_err(|e| AppError::Network(e.to_string()))?;
    let response = check(response).await?;

    let content_type = response
        .headers()
        .get("content-type")
        .unwrap_or_else(|| "application/octet-stream".to_string());
    let file_name = response
        .headers()
        .get("content-disposition")
        .and_then(|value| attachment_name(&value))
        .unwrap_or_else(|| file.name.clone());

    let bytes = response
        .binary()
        .await
        .map_err(|e| AppError::Network(e.to_string()))?;

    let url = object_url(&bytes, &content_type)?;
    Ok(Download { file_name, url })
}

/// `filename="..."` of a Content-Disposition header.
pub fn attachment_name(header: &str) -> Option<String> {
    let start = header.find("filename=")? + "filename=".len();
    let name = header[start..].split(';').next()?.trim().trim_matches('"');
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

fn object_url(bytes: &[u8], content_type: &str) -> AppResult<String> {
    let array = js_sys::Uint8Array::from(bytes);
    let parts = js_sys::Array::new();
    parts.push(&array);

    let options = BlobPropertyBag::new();
    options.set_type(content_type);

    let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options)
        .map_err(|e| js_error("Failed to create Blob", e))?;
    Url::create_object_url_with_blob(&blob).map_err(|e| js_error("Failed to create object URL", e))
}

/// Release a link created by [`export_file`].
pub fn revoke_download(download: &Download) {
    let _ = Url::revoke_object_url(&download.url);
}
