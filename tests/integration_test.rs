use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde::Deserialize;
use std::io::Cursor;
use std::process::{Child, Command};
use std::sync::atomic::{AtomicU16, Ordering};
use std::time::{Duration, Instant};

// Use atomic counter to give each test a unique port
static PORT_COUNTER: AtomicU16 = AtomicU16::new(9500);

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct LabTest {
    test_name: String,
    test_value: String,
    bio_reference_range: String,
    test_unit: String,
    lab_test_out_of_range: bool,
}

#[derive(Debug, Deserialize)]
struct LabTestsResponse {
    is_success: bool,
    message: Option<String>,
    data: Vec<LabTest>,
}

#[derive(Debug, Deserialize)]
struct HealthResponse {
    status: String,
    message: String,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct CatalogEntry {
    name: String,
    unit: Option<String>,
    reference_range: String,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct InfoResponse {
    version: String,
    default_engine: String,
    max_file_size_bytes: usize,
    catalog: Vec<CatalogEntry>,
}

struct TestServer {
    child: Child,
    port: u16,
}

impl TestServer {
    async fn start() -> Self {
        let port = PORT_COUNTER.fetch_add(1, Ordering::SeqCst);

        let child = Command::new(env!("CARGO_BIN_EXE_labtest-ocr-server"))
            .args(["--host", "127.0.0.1", "--port", &port.to_string()])
            .spawn()
            .expect("Failed to start server");

        let server = Self { child, port };
        server.wait_until_ready().await;
        server
    }

    /// Poll the health endpoint; the first start may be downloading models
    async fn wait_until_ready(&self) {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + Duration::from_secs(120);

        while Instant::now() < deadline {
            if client.get(self.base_url()).send().await.is_ok() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(250)).await;
        }

        panic!("Server on port {} did not become ready", self.port);
    }

    fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
    }
}

fn blank_page_png() -> Vec<u8> {
    let img = GrayImage::from_pixel(200, 100, Luma([255]));
    let mut bytes = Vec::new();
    DynamicImage::ImageLuma8(img)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

async fn upload(
    client: &reqwest::Client,
    base_url: &str,
    data: Vec<u8>,
    mime_type: &str,
) -> reqwest::Response {
    let part = Part::bytes(data)
        .file_name("report.png")
        .mime_str(mime_type)
        .unwrap();

    let form = Form::new().part("file", part);

    client
        .post(format!("{}/get-lab-tests", base_url))
        .multipart(form)
        .send()
        .await
        .expect("Failed to send request")
}

#[tokio::test]
async fn test_health_endpoint() {
    let server = TestServer::start().await;
    let client = reqwest::Client::new();

    let response: HealthResponse = client
        .get(server.base_url())
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");

    assert_eq!(response.status, "active");
    assert_eq!(response.message, "Lab Test Analyzer API is running");
}

#[tokio::test]
async fn test_blank_page_reports_no_tests() {
    let server = TestServer::start().await;
    let client = reqwest::Client::new();

    let response = upload(&client, &server.base_url(), blank_page_png(), "image/png").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: LabTestsResponse = response.json().await.expect("Failed to parse response");
    assert!(!body.is_success);
    assert_eq!(
        body.message.as_deref(),
        Some("No lab tests could be identified in the image")
    );
    assert!(body.data.is_empty());
}

#[tokio::test]
async fn test_non_image_upload_is_rejected() {
    let server = TestServer::start().await;
    let client = reqwest::Client::new();

    let response = upload(
        &client,
        &server.base_url(),
        b"HB ESTIMATION: 10.5 g/dL".to_vec(),
        "text/plain",
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: LabTestsResponse = response.json().await.expect("Failed to parse response");
    assert!(!body.is_success);
    assert_eq!(body.message.as_deref(), Some("Uploaded file is not an image"));
}

#[tokio::test]
async fn test_missing_file_is_rejected() {
    let server = TestServer::start().await;
    let client = reqwest::Client::new();

    let form = Form::new().text("note", "no file here");
    let response = client
        .post(format!("{}/get-lab-tests", server.base_url()))
        .multipart(form)
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_corrupt_image_is_server_error() {
    let server = TestServer::start().await;
    let client = reqwest::Client::new();

    let mut truncated = blank_page_png();
    truncated.truncate(truncated.len() / 2);

    let response = upload(&client, &server.base_url(), truncated, "image/png").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: LabTestsResponse = response.json().await.expect("Failed to parse response");
    assert!(!body.is_success);
    assert!(body
        .message
        .unwrap_or_default()
        .starts_with("Error processing image"));
}

#[tokio::test]
async fn test_info_endpoint() {
    let server = TestServer::start().await;
    let client = reqwest::Client::new();

    let response: InfoResponse = client
        .get(format!("{}/info", server.base_url()))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");

    assert!(!response.version.is_empty());
    assert_eq!(response.default_engine, "ocrs");
    assert_eq!(response.catalog.len(), 5);
    assert_eq!(response.catalog[0].name, "HB ESTIMATION");
}
