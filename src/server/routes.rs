//! HTTP route handlers
//!
//! Thin transport over the engine: each handler drains the multipart
//! form, translates fields into operation options, runs the transform in
//! a blocking task so PDF work never stalls the async runtime, and
//! returns the result as an attachment. All buffers live on the request
//! stack and drop on every exit path.

use axum::{
    body::Body,
    extract::Multipart,
    http::{header, StatusCode},
    response::Response,
    Json,
};
use serde::Serialize;
use tracing::info;

use crate::error::Error;
use crate::layout::Anchor;
use crate::pdf::{
    self, Overlay, PackOptions, PageNumberOptions, Rgb, RotateOptions, RotationScope,
    WatermarkOptions,
};
use crate::range::PageSelection;

use super::error::ApiError;
use super::forms::FormData;

type RouteResult = std::result::Result<Response, ApiError>;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `POST /add-watermark`: stamp a text or image watermark.
pub async fn add_watermark(multipart: Multipart) -> RouteResult {
    let form = FormData::read(multipart).await?;
    let file = form.require_file_with_extension("file", &[".pdf"])?;

    let selection = PageSelection::parse(form.text("page_range").unwrap_or(""))?;
    let anchor = form.parse_or("position", Anchor::Center)?;
    let rotation: f64 = form.number_or("rotation", 0.0)?;

    let overlay = match form.text("watermark_type").unwrap_or("text") {
        "" | "text" => {
            let text = form.text("watermark_text").unwrap_or("").to_string();
            let font_size: f64 = form.number_or("font_size", 16.0)?;
            let color = Rgb::parse_hex(form.text("font_color").unwrap_or("#000000"))?;
            let opacity: f64 = form.number_or("opacity", 50.0)?;
            Overlay::Text {
                text,
                font_size,
                color,
                opacity: (opacity / 100.0).clamp(0.0, 1.0),
            }
        }
        "image" => {
            let image = form.require_file("watermark_image").map_err(|_| {
                Error::MissingInput("no watermark image uploaded".to_string())
            })?;
            let opacity: f64 = form.number_or("image_opacity", 50.0)?;
            Overlay::Image {
                data: image.data.to_vec(),
                opacity: (opacity / 100.0).clamp(0.0, 1.0),
            }
        }
        other => {
            return Err(Error::InvalidParameter(format!(
                "unknown watermark type '{other}' (expected text or image)"
            ))
            .into())
        }
    };

    info!(pages = %form.text("page_range").unwrap_or("all"), "watermarking upload");

    let input = file.data.clone();
    let options = WatermarkOptions {
        overlay,
        anchor,
        rotation,
        selection,
    };
    let output = run_blocking(move || pdf::add_watermark(&input, &options)).await?;

    pdf_attachment("watermarked.pdf", output)
}

/// `POST /rotate-pdf`: adjust page rotation metadata.
pub async fn rotate_pdf(multipart: Multipart) -> RouteResult {
    let form = FormData::read(multipart).await?;
    let file = form.require_file_with_extension("file", &[".pdf"])?;

    let angle: i32 = form.number_or("rotation_angle", 90)?;
    let scope = form.parse_or("rotation_scope", RotationScope::All)?;
    let selection = PageSelection::parse(form.text("page_range").unwrap_or(""))?;

    info!(angle, ?scope, "rotating upload");

    let input = file.data.clone();
    let options = RotateOptions {
        angle,
        scope,
        selection,
    };
    let output = run_blocking(move || pdf::rotate_pages(&input, &options)).await?;

    pdf_attachment("rotated.pdf", output)
}

/// `POST /add-page-numbers`: draw page-number labels.
pub async fn add_page_numbers(multipart: Multipart) -> RouteResult {
    let form = FormData::read(multipart).await?;
    let file = form.require_file_with_extension("file", &[".pdf"])?;

    let style = form.parse_or("number_style", Default::default())?;
    let anchor = form.parse_or("number_position", Anchor::BottomRight)?;
    let font_size: f64 = form.number_or("font_size", 10.0)?;
    let color = Rgb::parse_hex(form.text("font_color").unwrap_or("#000000"))?;
    let selection = PageSelection::parse(form.text("page_range").unwrap_or(""))?;

    info!(?style, "numbering upload");

    let input = file.data.clone();
    let options = PageNumberOptions {
        style,
        anchor,
        font_size,
        color,
        selection,
    };
    let output = run_blocking(move || pdf::add_page_numbers(&input, &options)).await?;

    pdf_attachment("numbered.pdf", output)
}

/// `POST /convert-images`: pack uploaded images into a PDF.
///
/// Files without a usable image extension are skipped, mirroring how the
/// upload form behaves with mixed selections; the request only fails when
/// nothing usable remains.
pub async fn convert_images(multipart: Multipart) -> RouteResult {
    let form = FormData::read(multipart).await?;

    let images: Vec<Vec<u8>> = form
        .files("files")
        .iter()
        .filter(|f| {
            let name = f.filename.to_lowercase();
            name.ends_with(".jpg") || name.ends_with(".jpeg") || name.ends_with(".png")
        })
        .map(|f| f.data.to_vec())
        .collect();

    if images.is_empty() {
        return Err(Error::MissingInput("no image files selected".to_string()).into());
    }

    let options = PackOptions {
        page_size: form.parse_or("page_size", Default::default())?,
        orientation: form.parse_or("orientation", Default::default())?,
    };

    info!(count = images.len(), "packing images");

    let output = run_blocking(move || pdf::images_to_pdf(&images, &options)).await?;

    pdf_attachment("converted.pdf", output)
}

/// Run a CPU-bound transform off the async runtime.
async fn run_blocking<F>(work: F) -> Result<Vec<u8>, ApiError>
where
    F: FnOnce() -> crate::error::Result<Vec<u8>> + Send + 'static,
{
    let result = tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| Error::ConversionFailed(format!("worker task failed: {e}")))?;
    result.map_err(ApiError::from)
}

/// Binary success response with an attachment disposition.
fn pdf_attachment(filename: &str, bytes: Vec<u8>) -> RouteResult {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/pdf")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        )
        .body(Body::from(bytes))
        .map_err(|e| Error::ConversionFailed(format!("response assembly failed: {e}")).into())
}
