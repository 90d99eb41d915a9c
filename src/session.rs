//! The interactive session: top-level wiring between the user's commands and
//! the batch, renderer and export driver.
//!
//! The session owns the three pieces of per-run state — the free-form input
//! buffer (the "text area"), the [`CertificateBatch`], and the currently
//! previewed name — and exposes one operation per user trigger. The command
//! loop in [`Session::run`] is a thin parser over those operations, so tests
//! drive the operations directly without a terminal.
//!
//! State rules carried over from the workflow design:
//! * generate validates first and replaces the batch wholesale — a failed
//!   generate never mutates anything;
//! * the preview is not reactively tied to the batch: whoever mutates the
//!   batch refreshes it explicitly;
//! * clear asks for confirmation, and a declined clear changes nothing.

use crate::batch::{CertificateBatch, Name};
use crate::error::{CertError, ExportError};
use crate::export::{ConfirmPrompt, ExportDriver};
use crate::pipeline::parse::parse_names;
use crate::pipeline::render::{render, CertificateDocument, RenderMode};
use crate::report::ExportReport;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

/// Names seeded into the input buffer on startup, so the first `generate`
/// has something to show.
pub const EXAMPLE_NAMES: &str = "João Silva\nMaria Santos\nPedro Oliveira";

/// One visible row of the certificate list.
///
/// Rows are built fresh from the batch on every request; they carry the
/// index their actions are bound to, so a stale row can never outlive a
/// batch replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRow {
    pub index: usize,
    pub name: String,
}

enum Flow {
    Continue,
    Quit,
}

/// The interactive session controller.
pub struct Session {
    input_buffer: String,
    batch: CertificateBatch,
    preview: Option<Name>,
    driver: ExportDriver,
    prompt: Arc<dyn ConfirmPrompt>,
}

impl Session {
    /// Create a session with seeded example input and an initial preview,
    /// over an empty batch.
    pub fn new(driver: ExportDriver, prompt: Arc<dyn ConfirmPrompt>) -> Self {
        let preview = parse_names(EXAMPLE_NAMES).into_iter().next();
        Self {
            input_buffer: EXAMPLE_NAMES.to_string(),
            batch: CertificateBatch::new(),
            preview,
            driver,
            prompt,
        }
    }

    // ── State accessors ──────────────────────────────────────────────────

    pub fn input_buffer(&self) -> &str {
        &self.input_buffer
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input_buffer = text.into();
    }

    pub fn batch(&self) -> &CertificateBatch {
        &self.batch
    }

    /// The name currently shown on the preview surface.
    pub fn previewed(&self) -> Option<&Name> {
        self.preview.as_ref()
    }

    /// Fresh list rows for the current batch.
    pub fn list_rows(&self) -> Vec<ListRow> {
        self.batch
            .iter()
            .enumerate()
            .map(|(index, name)| ListRow {
                index,
                name: name.as_str().to_string(),
            })
            .collect()
    }

    // ── User triggers ────────────────────────────────────────────────────

    /// Parse the input buffer and replace the batch.
    ///
    /// Validation happens before any mutation: an empty buffer or an input
    /// with zero usable names leaves batch and preview untouched. On success
    /// the preview is refreshed to the first name and the new size is
    /// returned.
    pub fn generate(&mut self) -> Result<usize, CertError> {
        if self.input_buffer.trim().is_empty() {
            return Err(CertError::EmptyInput);
        }
        let names = parse_names(&self.input_buffer);
        if names.is_empty() {
            return Err(CertError::NoValidNames);
        }

        let count = names.len();
        self.preview = Some(names[0].clone());
        self.batch.replace(names);
        info!(count, "batch generated");
        Ok(count)
    }

    /// Select the preview for the row at `index` and render it.
    ///
    /// `index` must be in range — the command loop validates user input
    /// before calling. An out-of-range index here is a wiring bug, not a
    /// recoverable condition.
    pub fn select_preview(&mut self, index: usize) -> CertificateDocument {
        let name = self
            .batch
            .get(index)
            .unwrap_or_else(|| panic!("preview index {index} out of range"))
            .clone();
        let doc = render(&name, RenderMode::Preview);
        self.preview = Some(name);
        doc
    }

    /// Export the certificate at `index`. Reads the name through the batch
    /// at call time; the driver captures it by value from there on.
    pub async fn export_at(&self, index: usize) -> Result<PathBuf, ExportError> {
        let name = self
            .batch
            .get(index)
            .unwrap_or_else(|| panic!("export index {index} out of range"));
        self.driver.export_one(name, index).await
    }

    /// Export the whole batch through the driver's configured policy.
    pub async fn export_all(&self) -> Result<ExportReport, CertError> {
        self.driver.export_all(&self.batch, self.prompt.as_ref()).await
    }

    /// Ask for confirmation, then reset everything to the placeholder state.
    /// Returns `true` if the user confirmed and the state was cleared.
    pub fn clear(&mut self) -> bool {
        if !self
            .prompt
            .confirm("Clear the certificate list? This also clears the input text.")
        {
            return false;
        }
        self.batch.clear();
        self.input_buffer.clear();
        self.preview = None;
        info!("session cleared");
        true
    }

    // ── Command loop ─────────────────────────────────────────────────────

    /// Run the interactive loop on stdin until `quit` or end of input.
    pub async fn run(mut self) -> Result<(), CertError> {
        println!("cert2pdf — interactive certificate generator");
        println!("Type 'help' for commands. Input is pre-seeded with example names.\n");
        self.show_preview();
        self.show_list();

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            print_prompt();
            let Some(line) = lines
                .next_line()
                .await
                .map_err(|e| CertError::Internal(format!("stdin read failed: {e}")))?
            else {
                break;
            };

            match self.handle_command(line.trim(), &mut lines).await {
                Ok(Flow::Quit) => break,
                Ok(Flow::Continue) => {}
                Err(e) => println!("error: {e}"),
            }
        }
        Ok(())
    }

    async fn handle_command(
        &mut self,
        line: &str,
        lines: &mut tokio::io::Lines<BufReader<tokio::io::Stdin>>,
    ) -> Result<Flow, CertError> {
        let (cmd, rest) = match line.split_once(char::is_whitespace) {
            Some((cmd, rest)) => (cmd, rest.trim()),
            None => (line, ""),
        };

        match cmd {
            "" => {}
            "help" => print_help(),
            "input" => {
                println!("Enter names (newline/comma/semicolon/colon separated).");
                println!("Finish with a single '.' on its own line.");
                let mut buffer = String::new();
                loop {
                    let Some(entry) = lines
                        .next_line()
                        .await
                        .map_err(|e| CertError::Internal(format!("stdin read failed: {e}")))?
                    else {
                        break;
                    };
                    if entry.trim() == "." {
                        break;
                    }
                    buffer.push_str(&entry);
                    buffer.push('\n');
                }
                self.set_input(buffer);
                println!("Input replaced ({} bytes).", self.input_buffer.len());
            }
            "generate" => {
                if !rest.is_empty() {
                    self.set_input(rest.to_string());
                }
                let count = self.generate()?;
                println!("{count} certificate(s) generated.");
                self.show_list();
                self.show_preview();
            }
            "list" => self.show_list(),
            "preview" => {
                let index = self.parse_row_number(rest)?;
                let doc = self.select_preview(index);
                println!("{}", frame_preview(&doc));
            }
            "export" => {
                let index = self.parse_row_number(rest)?;
                match self.export_at(index).await {
                    Ok(path) => println!("Saved {}", path.display()),
                    Err(e) => println!("error: {e}"),
                }
            }
            "export-all" => match self.export_all().await {
                Ok(report) => {
                    if report.all_succeeded() {
                        println!(
                            "All {} certificates exported to {} in {}ms.",
                            report.exported,
                            self.driver.config().out_dir.display(),
                            report.duration_ms
                        );
                    } else {
                        println!(
                            "{}/{} certificates exported; {} failed:",
                            report.exported, report.total, report.failed
                        );
                        for item in report.items.iter().filter(|i| !i.succeeded()) {
                            if let Some(ref e) = item.error {
                                println!("  - {e}");
                            }
                        }
                    }
                }
                Err(CertError::ConfirmDeclined) => println!("{}", CertError::ConfirmDeclined),
                Err(e) => return Err(e),
            },
            "clear" => {
                if self.clear() {
                    println!("Cleared. {}", placeholder_list());
                    println!("{}", placeholder_preview());
                } else {
                    println!("Nothing changed.");
                }
            }
            "quit" | "exit" => return Ok(Flow::Quit),
            other => println!("Unknown command '{other}'. Type 'help' for commands."),
        }
        Ok(Flow::Continue)
    }

    /// Validate a user-typed 1-based row number against the current batch.
    fn parse_row_number(&self, raw: &str) -> Result<usize, CertError> {
        let n: usize = raw
            .parse()
            .map_err(|_| CertError::Internal(format!("expected a row number, got '{raw}'")))?;
        if n == 0 || n > self.batch.len() {
            return Err(CertError::Internal(format!(
                "row {n} is out of range (list has {} rows)",
                self.batch.len()
            )));
        }
        Ok(n - 1)
    }

    fn show_list(&self) {
        let rows = self.list_rows();
        if rows.is_empty() {
            println!("{}", placeholder_list());
            return;
        }
        for row in rows {
            println!("  {:>3}. {}", row.index + 1, row.name);
        }
    }

    fn show_preview(&self) {
        match self.preview {
            Some(ref name) => {
                let doc = render(name, RenderMode::Preview);
                println!("{}", frame_preview(&doc));
            }
            None => println!("{}", placeholder_preview()),
        }
    }
}

fn placeholder_list() -> &'static str {
    "No certificates generated yet."
}

fn placeholder_preview() -> &'static str {
    "Select a certificate to preview."
}

fn print_prompt() {
    use std::io::Write;
    print!("> ");
    let _ = std::io::stdout().flush();
}

/// Box the preview's text rendering for the terminal.
fn frame_preview(doc: &CertificateDocument) -> String {
    let text = doc.to_text();
    let lines: Vec<&str> = text.lines().collect();
    let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let mut out = String::new();
    out.push_str(&format!("┌{}┐\n", "─".repeat(width + 2)));
    for line in lines {
        let pad = width - line.chars().count();
        let left = pad / 2;
        let right = pad - left;
        out.push_str(&format!(
            "│ {}{}{} │\n",
            " ".repeat(left),
            line,
            " ".repeat(right)
        ));
    }
    out.push_str(&format!("└{}┘", "─".repeat(width + 2)));
    out
}

fn print_help() {
    println!(
        "\
Commands:
  input           Enter a new name list (end with '.' on its own line)
  generate [TEXT] Parse the input (or TEXT) into the certificate batch
  list            Show the staged certificates
  preview N       Preview the certificate on row N
  export N        Export row N as PDF
  export-all      Export every staged certificate
  clear           Empty the batch and the input text (asks first)
  quit            Leave"
    );
}
