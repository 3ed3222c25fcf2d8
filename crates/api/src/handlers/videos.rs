//! Video streaming with HTTP range request support.
//!
//! Videos are addressed by the opaque file id handed out in video listings.

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::header::{self, HeaderMap};
use axum::http::StatusCode;
use axum::response::Response;
use lus_core::error::CoreError;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;

use crate::error::{AppError, AppResult};
use crate::handlers::patients::with_library;
use crate::state::AppState;

/// Maximum read chunk size for open-ended ranges (1 MiB).
const MAX_CHUNK_SIZE: u64 = 1024 * 1024;

/// Parse a `Range: bytes=START-END` header value.
/// Returns `(start, optional_end)`.
fn parse_range_header(range: &str) -> Option<(u64, Option<u64>)> {
    let range = range.strip_prefix("bytes=")?;
    let (start, end) = range.split_once('-')?;
    let start = start.parse::<u64>().ok()?;
    let end = if end.is_empty() {
        None
    } else {
        Some(end.parse::<u64>().ok()?)
    };
    Some((start, end))
}

fn build(builder: axum::http::response::Builder, body: Body) -> AppResult<Response> {
    builder
        .body(body)
        .map_err(|e| AppError::InternalError(format!("Failed to build response: {e}")))
}

/// GET /api/videos/{file_id}
pub async fn stream_video(
    State(state): State<AppState>,
    Path(file_id): Path<String>,
    headers: HeaderMap,
) -> AppResult<Response> {
    let lookup_id = file_id.clone();
    let video = with_library(&state, move |lib| {
        lib.find_video(&lookup_id)
            .ok_or_else(|| CoreError::not_found("Video", lookup_id))
    })
    .await?;

    let file_size = tokio::fs::metadata(&video.path).await?.len();

    if let Some(range_value) = headers.get(header::RANGE) {
        let range_str = range_value
            .to_str()
            .map_err(|_| AppError::BadRequest("Invalid Range header".into()))?;

        if let Some((start, end)) = parse_range_header(range_str) {
            if start >= file_size {
                return Err(AppError::RangeNotSatisfiable { size: file_size });
            }
            let last = file_size - 1;
            let end = end
                .map(|e| e.min(last))
                .unwrap_or_else(|| start.saturating_add(MAX_CHUNK_SIZE - 1).min(last));

            if start > end {
                return Err(AppError::RangeNotSatisfiable { size: file_size });
            }

            let length = end - start + 1;
            let mut file = tokio::fs::File::open(&video.path).await?;
            file.seek(std::io::SeekFrom::Start(start)).await?;
            let stream = ReaderStream::new(file.take(length));

            tracing::debug!(%file_id, start, end, "Streaming video range");

            return build(
                Response::builder()
                    .status(StatusCode::PARTIAL_CONTENT)
                    .header(header::CONTENT_TYPE, "video/mp4")
                    .header(header::CONTENT_LENGTH, length.to_string())
                    .header(
                        header::CONTENT_RANGE,
                        format!("bytes {start}-{end}/{file_size}"),
                    )
                    .header(header::ACCEPT_RANGES, "bytes"),
                Body::from_stream(stream),
            );
        }
    }

    let file = tokio::fs::File::open(&video.path).await?;
    build(
        Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, "video/mp4")
            .header(header::CONTENT_LENGTH, file_size.to_string())
            .header(header::ACCEPT_RANGES, "bytes"),
        Body::from_stream(ReaderStream::new(file)),
    )
}
