#![allow(dead_code)]

use std::path::Path;
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use lopdf::{dictionary, Document, Object, Stream};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use pdf2pptx::{
    build_router, Artifact, ConversionService, ConvertError, Converter, JobStore, PdfToPptx,
    ServiceConfig,
};

pub const BOUNDARY: &str = "pdf2pptx-test-boundary";

// ---------------------------------------------------------------------------
// App construction
// ---------------------------------------------------------------------------

/// A router over a service whose directories live in a scratch dir.
pub struct TestApp {
    pub router: Router,
    pub service: ConversionService,
    pub dir: TempDir,
}

impl TestApp {
    pub fn upload_dir(&self) -> std::path::PathBuf {
        self.dir.path().join("uploads")
    }

    pub fn output_dir(&self) -> std::path::PathBuf {
        self.dir.path().join("converted")
    }
}

/// Test app backed by the real PDF → PPTX converter.
pub fn test_app() -> TestApp {
    test_app_with(Arc::new(PdfToPptx::default()))
}

/// Test app backed by the given converter.
pub fn test_app_with(converter: Arc<dyn Converter>) -> TestApp {
    let dir = TempDir::new().expect("create temp dir");
    let config = ServiceConfig::builder()
        .upload_dir(dir.path().join("uploads"))
        .output_dir(dir.path().join("converted"))
        .cors_origins(["http://localhost:3000"])
        .build()
        .expect("valid test config");

    let service = ConversionService::new(config, Arc::new(JobStore::new()), converter);
    service.init_dirs().expect("create storage dirs");

    TestApp {
        router: build_router(service.clone()),
        service,
        dir,
    }
}

// ---------------------------------------------------------------------------
// Converters
// ---------------------------------------------------------------------------

/// Always fails with a fixed message.
pub struct FailingConverter;

impl Converter for FailingConverter {
    fn convert(&self, input: &Path, _output: &Path) -> Result<Artifact, ConvertError> {
        Err(ConvertError::CorruptPdf {
            path: input.to_path_buf(),
            detail: "xref table is missing".into(),
        })
    }
}

/// Blocks until [`GatedConverter::open`] is called, then delegates to the
/// real converter.
#[derive(Default)]
pub struct GatedConverter {
    gate: (Mutex<bool>, Condvar),
    inner: PdfToPptx,
}

impl GatedConverter {
    pub fn open(&self) {
        let (lock, cvar) = &self.gate;
        *lock.lock().unwrap() = true;
        cvar.notify_all();
    }
}

impl Converter for GatedConverter {
    fn convert(&self, input: &Path, output: &Path) -> Result<Artifact, ConvertError> {
        let (lock, cvar) = &self.gate;
        let mut open = lock.lock().unwrap();
        while !*open {
            open = cvar.wait(open).unwrap();
        }
        drop(open);
        self.inner.convert(input, output)
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Build a multipart upload with one field.
///
/// `filename: None` omits the `filename` attribute entirely.
pub fn multipart_upload(field: &str, filename: Option<&str>, data: &[u8]) -> Request<Body> {
    let disposition = match filename {
        Some(name) => format!("form-data; name=\"{field}\"; filename=\"{name}\""),
        None => format!("form-data; name=\"{field}\""),
    };

    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(format!("Content-Disposition: {disposition}\r\n").as_bytes());
    body.extend_from_slice(b"Content-Type: application/pdf\r\n\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/upload")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

pub async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str) -> Response {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// Upload `data` as `filename` and return the job id.
pub async fn upload_pdf(app: &Router, filename: &str, data: &[u8]) -> String {
    let response = send(app, multipart_upload("file", Some(filename), data)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    json["uploadId"].as_str().expect("uploadId").to_string()
}

/// Poll the status endpoint until `predicate` accepts the body.
pub async fn poll_status(app: &Router, id: &str, predicate: impl Fn(&Value) -> bool) -> Value {
    for _ in 0..500 {
        let response = get(app, &format!("/api/status/{id}")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        if predicate(&json) {
            return json;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("status of {id} never matched");
}

pub async fn wait_terminal(app: &Router, id: &str) -> Value {
    poll_status(app, id, |json| {
        json["status"] == "completed" || json["status"] == "error"
    })
    .await
}

// ---------------------------------------------------------------------------
// PDF fixtures
// ---------------------------------------------------------------------------

/// Build a PDF with one page per entry; each line is its own text object.
///
/// Mirrors `pipeline::extract::fixtures::pdf_bytes`, which unit tests use
/// from inside the crate; keep the two in sync.
pub fn pdf_bytes(pages: &[&[&str]]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for lines in pages {
        let mut content = String::new();
        for (i, line) in lines.iter().enumerate() {
            content.push_str(&format!(
                "BT\n/F1 12 Tf\n72 {} Td\n({}) Tj\nET\n",
                720 - 16 * i as i64,
                line
            ));
        }
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Resources" => resources_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

/// A small two-page deck source.
pub fn sample_pdf() -> Vec<u8> {
    pdf_bytes(&[
        &["Quarterly Review", "Revenue grew 12 percent", "Costs were flat"],
        &["Next Steps", "Hire two engineers"],
    ])
}
