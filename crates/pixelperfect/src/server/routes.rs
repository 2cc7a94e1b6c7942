//! Request handlers.

use axum::extract::{Multipart, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use std::time::Instant;
use tokio::time::timeout;

use super::{form, ApiError, AppState};

/// Liveness probe.
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "online", "engine": "image-rs" }))
}

/// `POST /api/resize`: run one upload through the transform pipeline.
///
/// Parameters are validated before the upload is decoded. The pipeline runs
/// on a blocking worker bounded by the configured timeout.
pub async fn resize(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let start = Instant::now();
    let form = form::read(multipart).await?;
    let request = form.params.validate()?;
    let upload_size = form.file.len();

    let transformer = state.transformer.clone();
    let file = form.file;
    let job = tokio::task::spawn_blocking(move || transformer.transform(file, &request));

    let output = match timeout(state.timeout, job).await {
        Ok(Ok(result)) => result?,
        Ok(Err(e)) => return Err(ApiError::Internal(format!("Task join error: {}", e))),
        Err(_) => return Err(ApiError::Timeout(state.timeout.as_millis() as u64)),
    };

    tracing::info!(
        "Resized upload ({} bytes) to {}x{} {} ({} bytes) in {:?}",
        upload_size,
        output.width,
        output.height,
        output.media_type,
        output.bytes.len(),
        start.elapsed()
    );
    Ok(([(header::CONTENT_TYPE, output.media_type)], output.bytes).into_response())
}

#[cfg(test)]
mod tests {
    use super::super::router;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use image::{DynamicImage, GenericImageView, ImageFormat, Rgb, RgbImage};
    use pixelperfect_core::Config;
    use serde_json::Value;
    use std::io::Cursor;
    use tower::ServiceExt;

    const BOUNDARY: &str = "pixelperfect-test-boundary";

    fn app() -> Router {
        router(&Config::default()).unwrap()
    }

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, y| Rgb([x as u8, y as u8, 128]));
        let mut buffer = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut buffer, ImageFormat::Png)
            .unwrap();
        buffer.into_inner()
    }

    fn multipart_body(fields: &[(&str, &str)], file: Option<&[u8]>) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        if let Some(bytes) = file {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"upload.png\"\r\nContent-Type: image/png\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn resize_request(body: Vec<u8>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/resize")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn base_fields<'a>(format: &'a str) -> Vec<(&'a str, &'a str)> {
        vec![
            ("width", "50"),
            ("height", "50"),
            ("format", format),
            ("quality", "0.8"),
        ]
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "online");
    }

    #[tokio::test]
    async fn test_resize_png_to_jpeg() {
        let source = png(200, 200);
        let body = multipart_body(&base_fields("image/jpeg"), Some(&source));
        let response = app().oneshot(resize_request(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "image/jpeg");
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.dimensions(), (50, 50));
    }

    #[tokio::test]
    async fn test_resize_with_crop_and_flags() {
        let source = png(100, 100);
        let mut fields = base_fields("image/png");
        fields.extend([
            ("crop_x", "10"),
            ("crop_y", "10"),
            ("crop_w", "80"),
            ("crop_h", "40"),
            ("optimize_png", "true"),
        ]);
        let response = app()
            .oneshot(resize_request(multipart_body(&fields, Some(&source))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "image/png");
    }

    #[tokio::test]
    async fn test_unsupported_format_is_415() {
        let source = png(20, 20);
        let body = multipart_body(&base_fields("image/bmp"), Some(&source));
        let response = app().oneshot(resize_request(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        let body = json_body(response).await;
        assert_eq!(body["error"], "UnsupportedFormatError");
    }

    #[tokio::test]
    async fn test_partial_crop_is_400() {
        let source = png(20, 20);
        let mut fields = base_fields("image/png");
        fields.extend([("crop_x", "0"), ("crop_y", "0")]);
        let response = app()
            .oneshot(resize_request(multipart_body(&fields, Some(&source))))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"], "InvalidCropError");
    }

    #[tokio::test]
    async fn test_crop_out_of_bounds_is_400() {
        let source = png(100, 100);
        let mut fields = base_fields("image/png");
        fields.extend([
            ("crop_x", "50"),
            ("crop_y", "0"),
            ("crop_w", "60"),
            ("crop_h", "10"),
        ]);
        let response = app()
            .oneshot(resize_request(multipart_body(&fields, Some(&source))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_missing_file_is_400() {
        let body = multipart_body(&base_fields("image/png"), None);
        let response = app().oneshot(resize_request(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert!(body["detail"].as_str().unwrap().contains("'file'"));
    }

    #[tokio::test]
    async fn test_non_numeric_width_is_400() {
        let source = png(20, 20);
        let fields = [
            ("width", "wide"),
            ("height", "50"),
            ("format", "image/png"),
            ("quality", "0.8"),
        ];
        let response = app()
            .oneshot(resize_request(multipart_body(&fields, Some(&source))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_garbage_upload_is_422() {
        let body = multipart_body(&base_fields("image/png"), Some(b"not an image at all"));
        let response = app().oneshot(resize_request(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = json_body(response).await;
        assert_eq!(body["error"], "DecodeError");
    }

    #[tokio::test]
    async fn test_oversized_upload_is_413() {
        let mut config = Config::default();
        config.limits.max_upload_size_mb = 1;
        let big = vec![0u8; 2 * 1024 * 1024];
        let body = multipart_body(&base_fields("image/png"), Some(&big));

        let response = router(&config)
            .unwrap()
            .oneshot(resize_request(body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_expired_budget_is_504() {
        let mut config = Config::default();
        config.limits.transform_timeout_ms = 1;
        let source = png(200, 200);
        let fields = [
            ("width", "4000"),
            ("height", "4000"),
            ("format", "image/png"),
            ("quality", "0.8"),
        ];
        let body = multipart_body(&fields, Some(&source));

        let response = router(&config)
            .unwrap()
            .oneshot(resize_request(body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
        let body = json_body(response).await;
        assert_eq!(body["error"], "TimeoutError");
    }
}
