//! Router-level tests: multipart round-trips through the HTTP layer

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use lopdf::Document;
use tower::util::ServiceExt;

use pdfpress::config::Config;
use pdfpress::server;

mod common;

const BOUNDARY: &str = "pdfpress-test-boundary";

/// One part of a handcrafted multipart body.
struct Part<'a> {
    name: &'a str,
    filename: Option<&'a str>,
    data: Vec<u8>,
}

impl<'a> Part<'a> {
    fn field(name: &'a str, value: &str) -> Self {
        Self {
            name,
            filename: None,
            data: value.as_bytes().to_vec(),
        }
    }

    fn file(name: &'a str, filename: &'a str, data: Vec<u8>) -> Self {
        Self {
            name,
            filename: Some(filename),
            data,
        }
    }
}

fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part.filename {
            Some(filename) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                        part.name, filename
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
            }
            None => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", part.name)
                        .as_bytes(),
                );
            }
        }
        body.extend_from_slice(&part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

async fn post(uri: &str, parts: &[Part<'_>]) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let app = server::router(&Config::default());

    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(parts)))
        .expect("build request");

    let response = app.oneshot(request).await.expect("route request");
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body")
        .to_vec();
    (status, headers, body)
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = server::router(&Config::default());
    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let health: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(health["status"], "healthy");
    assert!(health["version"].is_string());
}

#[tokio::test]
async fn test_rotate_returns_pdf_attachment() {
    let pdf = common::pdf_with_pages(&["one", "two"]);
    let (status, headers, body) = post(
        "/rotate-pdf",
        &[
            Part::file("file", "input.pdf", pdf),
            Part::field("rotation_angle", "90"),
            Part::field("rotation_scope", "all"),
        ],
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        headers.get(header::CONTENT_TYPE).unwrap(),
        "application/pdf"
    );
    assert_eq!(
        headers.get(header::CONTENT_DISPOSITION).unwrap(),
        "attachment; filename=\"rotated.pdf\""
    );

    let doc = Document::load_mem(&body).unwrap();
    assert_eq!(doc.get_pages().len(), 2);
    for (_, page_id) in doc.get_pages() {
        assert_eq!(pdfpress::pdf::page_rotation(&doc, page_id), 90);
    }
}

#[tokio::test]
async fn test_watermark_round_trip() {
    let pdf = common::pdf_with_pages(&["one", "two", "three"]);
    let (status, headers, body) = post(
        "/add-watermark",
        &[
            Part::file("file", "input.pdf", pdf),
            Part::field("watermark_type", "text"),
            Part::field("watermark_text", "DRAFT"),
            Part::field("font_size", "24"),
            Part::field("font_color", "#FF0000"),
            Part::field("opacity", "30"),
            Part::field("position", "center"),
            Part::field("rotation", "45"),
            Part::field("page_range", "1-2"),
        ],
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        headers.get(header::CONTENT_DISPOSITION).unwrap(),
        "attachment; filename=\"watermarked.pdf\""
    );

    let doc = Document::load_mem(&body).unwrap();
    assert_eq!(doc.get_pages().len(), 3);
    let page1 = String::from_utf8_lossy(&common::page_content_bytes(&doc, 1)).to_string();
    assert!(page1.contains("(DRAFT) Tj"));
    let page3 = String::from_utf8_lossy(&common::page_content_bytes(&doc, 3)).to_string();
    assert!(!page3.contains("(DRAFT) Tj"));
}

#[tokio::test]
async fn test_page_numbers_round_trip() {
    let pdf = common::pdf_with_pages(&["a", "b", "c", "d"]);
    let (status, _, body) = post(
        "/add-page-numbers",
        &[
            Part::file("file", "input.pdf", pdf),
            Part::field("number_style", "I"),
            Part::field("number_position", "bottom-center"),
        ],
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let doc = Document::load_mem(&body).unwrap();
    let page4 = String::from_utf8_lossy(&common::page_content_bytes(&doc, 4)).to_string();
    assert!(page4.contains("(IV) Tj"));
}

#[tokio::test]
async fn test_convert_images_packs_pages() {
    let (status, headers, body) = post(
        "/convert-images",
        &[
            Part::file("files", "a.png", common::png_bytes(30, 20)),
            Part::file("files", "b.png", common::png_bytes(20, 30)),
            Part::field("page_size", "letter"),
        ],
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        headers.get(header::CONTENT_DISPOSITION).unwrap(),
        "attachment; filename=\"converted.pdf\""
    );
    let doc = Document::load_mem(&body).unwrap();
    assert_eq!(doc.get_pages().len(), 2);
}

#[tokio::test]
async fn test_missing_file_is_bad_request() {
    let (status, _, body) = post("/add-watermark", &[Part::field("watermark_text", "X")]).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let text = String::from_utf8_lossy(&body).to_string();
    assert!(text.contains("missing_input"));
}

#[tokio::test]
async fn test_wrong_extension_is_bad_request() {
    let (status, _, _) = post(
        "/rotate-pdf",
        &[Part::file("file", "notes.txt", b"hello".to_vec())],
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_page_range_is_bad_request() {
    let pdf = common::pdf_with_pages(&["one"]);
    let (status, _, body) = post(
        "/add-watermark",
        &[
            Part::file("file", "input.pdf", pdf),
            Part::field("watermark_text", "X"),
            Part::field("page_range", "abc"),
        ],
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let text = String::from_utf8_lossy(&body).to_string();
    assert!(text.contains("invalid_page_range"));
}

#[tokio::test]
async fn test_unknown_position_is_bad_request() {
    let pdf = common::pdf_with_pages(&["one"]);
    let (status, _, body) = post(
        "/add-page-numbers",
        &[
            Part::file("file", "input.pdf", pdf),
            Part::field("number_position", "middle-ish"),
        ],
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let text = String::from_utf8_lossy(&body).to_string();
    assert!(text.contains("invalid_parameter"));
}

#[tokio::test]
async fn test_corrupt_pdf_is_internal_error() {
    let (status, _, body) = post(
        "/rotate-pdf",
        &[Part::file("file", "input.pdf", b"%PDF-1.5 broken".to_vec())],
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let text = String::from_utf8_lossy(&body).to_string();
    assert!(text.contains("conversion_failed"));
}
