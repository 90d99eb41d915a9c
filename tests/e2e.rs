//! End-to-end integration tests for cert2pdf.
//!
//! Most tests drive the full parse → batch → export flow against a recording
//! fake engine, so they are fast and deterministic. The last section runs the
//! real `printpdf` engine to prove actual PDF bytes come out; it needs no
//! network or external binaries, so it is not gated.

use cert2pdf::{
    parse_names, AlwaysConfirm, CertError, CertificateBatch, CertificateDocument, ConfirmPrompt,
    ExportConfig, ExportDriver, ExportPolicy, ExportReport, Name, PdfOptions, PrintPdfRasterizer,
    RasterizeError, Rasterizer, RenderMode, Session,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Records every submitted name, in order; optionally fails some of them.
struct RecordingEngine {
    calls: Mutex<Vec<String>>,
    fail_for: Option<String>,
}

impl RecordingEngine {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            fail_for: None,
        })
    }

    fn failing_on(name: &str) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            fail_for: Some(name.to_string()),
        })
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Rasterizer for RecordingEngine {
    fn rasterize(
        &self,
        doc: &CertificateDocument,
        _opts: &PdfOptions,
    ) -> Result<Vec<u8>, RasterizeError> {
        let name = doc.name().as_str().to_string();
        self.calls.lock().unwrap().push(name.clone());
        if self.fail_for.as_deref() == Some(name.as_str()) {
            return Err(RasterizeError("synthetic failure".into()));
        }
        Ok(b"%PDF-1.7 fake".to_vec())
    }
}

struct ScriptedPrompt {
    answer: bool,
    asked: AtomicUsize,
}

impl ScriptedPrompt {
    fn answering(answer: bool) -> Arc<Self> {
        Arc::new(Self {
            answer,
            asked: AtomicUsize::new(0),
        })
    }
}

impl ConfirmPrompt for ScriptedPrompt {
    fn confirm(&self, _message: &str) -> bool {
        self.asked.fetch_add(1, Ordering::SeqCst);
        self.answer
    }
}

fn fast_config(out_dir: &std::path::Path) -> ExportConfig {
    ExportConfig::builder()
        .out_dir(out_dir)
        .inter_item_delay_ms(0)
        .build()
        .expect("valid config")
}

// ── Full-flow scenarios ──────────────────────────────────────────────────────

/// The canonical scenario: three newline-separated names all the way to PDFs
/// on disk, submitted in batch order.
#[tokio::test]
async fn full_flow_three_names_to_disk() {
    let dir = tempfile::tempdir().unwrap();
    let engine = RecordingEngine::new();
    let driver = ExportDriver::new(engine.clone(), fast_config(dir.path()));

    let names = parse_names("João Silva\nMaria Santos\nPedro Oliveira");
    assert_eq!(
        names.iter().map(Name::as_str).collect::<Vec<_>>(),
        ["João Silva", "Maria Santos", "Pedro Oliveira"]
    );

    let mut batch = CertificateBatch::new();
    batch.replace(names);

    let report = driver.export_all(&batch, &AlwaysConfirm).await.unwrap();

    assert_eq!(report.total, 3);
    assert_eq!(report.exported, 3);
    assert!(report.all_succeeded());
    assert_eq!(
        engine.calls(),
        ["João Silva", "Maria Santos", "Pedro Oliveira"]
    );

    for expected in [
        "certificado_João_Silva.pdf",
        "certificado_Maria_Santos.pdf",
        "certificado_Pedro_Oliveira.pdf",
    ] {
        assert!(dir.path().join(expected).exists(), "missing {expected}");
    }
}

/// Messy separator soup still parses cleanly and exports in input order.
#[tokio::test]
async fn mixed_separators_full_flow() {
    let dir = tempfile::tempdir().unwrap();
    let engine = RecordingEngine::new();
    let driver = ExportDriver::new(engine.clone(), fast_config(dir.path()));

    let mut batch = CertificateBatch::new();
    batch.replace(parse_names("  Ana ;Bia,,Carla:\n\nDuda  "));

    let report = driver.export_all(&batch, &AlwaysConfirm).await.unwrap();
    assert_eq!(report.exported, 4);
    assert_eq!(engine.calls(), ["Ana", "Bia", "Carla", "Duda"]);
}

/// One mid-batch engine failure: the rest of the batch still lands on disk
/// and the report carries the mixed outcome.
#[tokio::test]
async fn mid_batch_failure_is_isolated() {
    let dir = tempfile::tempdir().unwrap();
    let engine = RecordingEngine::failing_on("Maria Santos");
    let driver = ExportDriver::new(engine.clone(), fast_config(dir.path()));

    let mut batch = CertificateBatch::new();
    batch.replace(parse_names("João Silva\nMaria Santos\nPedro Oliveira"));

    let report = driver.export_all(&batch, &AlwaysConfirm).await.unwrap();

    assert_eq!(report.exported, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(engine.calls().len(), 3, "every item must still be submitted");
    assert!(dir.path().join("certificado_Pedro_Oliveira.pdf").exists());
    assert!(!dir.path().join("certificado_Maria_Santos.pdf").exists());

    let failure = &report.items[1];
    assert_eq!(failure.name, "Maria Santos");
    assert!(failure.error.as_ref().unwrap().to_string().contains("synthetic"));
}

/// Six items crosses the confirmation threshold: the prompt fires once, a
/// decline submits nothing, an accept submits exactly six in order.
#[tokio::test]
async fn threshold_confirmation_gate() {
    let dir = tempfile::tempdir().unwrap();
    let engine = RecordingEngine::new();
    let driver = ExportDriver::new(engine.clone(), fast_config(dir.path()));

    let mut batch = CertificateBatch::new();
    batch.replace(parse_names("A,B,C,D,E,F"));

    let decline = ScriptedPrompt::answering(false);
    let err = driver.export_all(&batch, decline.as_ref()).await.unwrap_err();
    assert!(matches!(err, CertError::ConfirmDeclined));
    assert_eq!(decline.asked.load(Ordering::SeqCst), 1);
    assert!(engine.calls().is_empty());

    let accept = ScriptedPrompt::answering(true);
    let report = driver.export_all(&batch, accept.as_ref()).await.unwrap();
    assert_eq!(accept.asked.load(Ordering::SeqCst), 1);
    assert_eq!(report.exported, 6);
    assert_eq!(engine.calls(), ["A", "B", "C", "D", "E", "F"]);
}

/// The staggered policy keeps initiation order even though items run
/// concurrently, and the report stays in batch order.
#[tokio::test]
async fn staggered_policy_full_flow() {
    let dir = tempfile::tempdir().unwrap();
    let engine = RecordingEngine::new();
    let config = ExportConfig::builder()
        .out_dir(dir.path())
        .policy(ExportPolicy::Staggered)
        .inter_item_delay_ms(25)
        .build()
        .unwrap();
    let driver = ExportDriver::new(engine.clone(), config);

    let mut batch = CertificateBatch::new();
    batch.replace(parse_names("Ana\nBia\nCarla"));

    let report = driver.export_all(&batch, &AlwaysConfirm).await.unwrap();

    assert_eq!(engine.calls(), ["Ana", "Bia", "Carla"]);
    let names: Vec<&str> = report.items.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, ["Ana", "Bia", "Carla"]);
}

/// A clear that lands after submission cannot touch in-flight exports:
/// the snapshot captured at submission time drives the whole batch.
#[tokio::test]
async fn clear_after_submission_does_not_affect_batch() {
    let dir = tempfile::tempdir().unwrap();
    let engine = RecordingEngine::new();
    let config = ExportConfig::builder()
        .out_dir(dir.path())
        .inter_item_delay_ms(30)
        .build()
        .unwrap();
    let driver = Arc::new(ExportDriver::new(engine.clone(), config));

    let mut batch = CertificateBatch::new();
    batch.replace(parse_names("Ana\nBia\nCarla"));

    let task = {
        let driver = Arc::clone(&driver);
        let batch_snapshot = batch.clone();
        tokio::spawn(async move { driver.export_all(&batch_snapshot, &AlwaysConfirm).await })
    };

    // Clear the session's batch while the export drains.
    tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    batch.clear();

    let report = task.await.unwrap().unwrap();
    assert_eq!(report.exported, 3);
    assert!(dir.path().join("certificado_Carla.pdf").exists());
}

// ── Session-level scenarios ──────────────────────────────────────────────────

fn session_with(prompt: Arc<dyn ConfirmPrompt>, out_dir: &std::path::Path) -> Session {
    let driver = ExportDriver::new(RecordingEngine::new(), fast_config(out_dir));
    Session::new(driver, prompt)
}

/// Generate from the seeded example input: 3 rows, first name previewed.
#[test]
fn session_generate_seeds_rows_and_preview() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = session_with(ScriptedPrompt::answering(true), dir.path());

    let count = session.generate().unwrap();
    assert_eq!(count, 3);
    assert_eq!(session.list_rows().len(), 3);
    assert_eq!(session.previewed().unwrap().as_str(), "João Silva");
}

/// The preview document is pure: rendering twice gives identical content.
#[test]
fn preview_rendering_is_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = session_with(ScriptedPrompt::answering(true), dir.path());
    session.generate().unwrap();

    let first = session.select_preview(1).to_text();
    let second = session.select_preview(1).to_text();
    assert_eq!(first, second);
    assert!(first.contains("Maria Santos"));
}

/// Declined clear leaves batch, input text and rows exactly as they were.
#[test]
fn session_clear_declined_is_a_no_op() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = session_with(ScriptedPrompt::answering(false), dir.path());
    session.generate().unwrap();
    let rows_before = session.list_rows();
    let input_before = session.input_buffer().to_string();

    assert!(!session.clear());

    assert_eq!(session.list_rows(), rows_before);
    assert_eq!(session.input_buffer(), input_before);
    assert_eq!(session.batch().len(), 3);
}

/// Export-all through the session honours the driver's confirmation flow.
#[tokio::test]
async fn session_export_all_runs_the_batch() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = session_with(ScriptedPrompt::answering(true), dir.path());
    session.generate().unwrap();

    let report = session.export_all().await.unwrap();
    assert_eq!(report.exported, 3);
    assert!(dir.path().join("certificado_João_Silva.pdf").exists());
}

// ── Report serialisation ─────────────────────────────────────────────────────

#[tokio::test]
async fn report_round_trips_through_json() {
    let dir = tempfile::tempdir().unwrap();
    let driver = ExportDriver::new(RecordingEngine::failing_on("Bia"), fast_config(dir.path()));

    let mut batch = CertificateBatch::new();
    batch.replace(parse_names("Ana\nBia"));

    let report = driver.export_all(&batch, &AlwaysConfirm).await.unwrap();
    let json = serde_json::to_string_pretty(&report).expect("report must serialise");
    let back: ExportReport = serde_json::from_str(&json).expect("report must deserialise");

    assert_eq!(back.total, report.total);
    assert_eq!(back.failed, 1);
    assert_eq!(back.items[0].file_name, "certificado_Ana.pdf");
}

// ── Real engine smoke tests (no network, pure Rust) ──────────────────────────

/// The bundled printpdf engine must produce bytes with the PDF magic header
/// for a print-mode certificate.
#[test]
fn printpdf_engine_emits_pdf_magic() {
    let name = Name::parse("Maria Santos").unwrap();
    let doc = cert2pdf::render(&name, RenderMode::Print);
    let opts = PdfOptions::print("certificado_Maria_Santos.pdf", doc.pixel_size());

    let bytes = PrintPdfRasterizer
        .rasterize(&doc, &opts)
        .expect("printpdf must rasterize the certificate template");

    assert!(bytes.len() > 100, "suspiciously small PDF: {} bytes", bytes.len());
    assert_eq!(&bytes[..5], b"%PDF-", "output must start with the PDF magic");
}

/// Full flow against the real engine: a genuine PDF file lands on disk.
#[tokio::test]
async fn real_engine_writes_a_pdf_file() {
    let dir = tempfile::tempdir().unwrap();
    let driver = ExportDriver::with_default_engine(fast_config(dir.path()));

    let mut batch = CertificateBatch::new();
    batch.replace(parse_names("João Silva"));

    let report = driver.export_all(&batch, &AlwaysConfirm).await.unwrap();
    assert!(report.all_succeeded());

    let path = dir.path().join("certificado_João_Silva.pdf");
    let bytes = std::fs::read(&path).expect("PDF file must exist");
    assert_eq!(&bytes[..5], b"%PDF-");
}
