//! Certificate rendering: one [`Name`] → a populated [`CertificateDocument`].
//!
//! ## Why a typed node tree?
//!
//! Building the document as HTML-by-string-concatenation makes the one
//! variable slot (the recipient name) indistinguishable from the fixed
//! template around it, and leaves escaping to the discipline of every call
//! site. A small node tree keeps the template structural: the name passes
//! through exactly one [`Node::text`] leaf and is escaped exactly once, when
//! the tree is serialised.
//!
//! Everything except the name — title, attestation line, course statement,
//! dates, signature block — is fixed template data. Rendering is total and
//! deterministic: the same name in the same mode always produces the same
//! document, and every call returns a fresh tree with no aliasing.

use crate::batch::Name;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

// ── Template constants ───────────────────────────────────────────────────

const TITLE: &str = "CERTIFICADO";
const SUBTITLE: &str = "ESTE CERTIFICADO COMPROVA QUE";
const BODY_LINES: [&str; 3] = [
    "CONCLUIU COM ÊXITO O CURSO GASTRONOMIA MINISTRADO POR BORCELLE",
    "ENTRE 28/08/2019 E 28/08/2022 E DEMONSTROU DEDICAÇÃO E EMPENHO EXEMPLARES.",
    "PARABÉNS E BOA SORTE NO FUTURO. EMITIDO EM 13/09/2022 PELA BORCELLE.",
];
const SIGNATURE_NAME: &str = "Ariel Lima";
const SIGNATURE_ROLE: &str = "Diretora Responsável";

/// A4 landscape canvas at the reference raster scale, in CSS pixels.
pub const PRINT_WIDTH_PX: u32 = 1123;
/// See [`PRINT_WIDTH_PX`].
pub const PRINT_HEIGHT_PX: u32 = 794;

/// Base stylesheet shared by both render modes. Kept deliberately small:
/// the certificate artwork is template data, not a styling system.
const BASE_CSS: &str = "\
body { margin: 0; padding: 0; }\n\
.certificate { font-family: Georgia, serif; text-align: center; background-color: #FFFFFF; padding: 48px; box-sizing: border-box; }\n\
.certificate-title { font-size: 44px; letter-spacing: 8px; margin: 24px 0 8px 0; }\n\
.certificate-subtitle { font-size: 14px; letter-spacing: 3px; margin: 0 0 24px 0; }\n\
.participant-name { font-size: 34px; font-style: italic; margin: 16px 0; }\n\
.certificate-body p { font-size: 13px; letter-spacing: 1px; margin: 6px 0; }\n\
.signature { margin-top: 48px; }\n\
.signature-name { font-size: 18px; border-top: 1px solid #333; display: inline-block; padding: 6px 32px 0 32px; }\n\
.signature-role { font-size: 12px; margin-top: 4px; }\n";

// ── Render tree ──────────────────────────────────────────────────────────

/// One node of the certificate render tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element {
        tag: &'static str,
        class: &'static str,
        style: Option<String>,
        children: Vec<Node>,
    },
    Text(String),
}

impl Node {
    fn el(tag: &'static str, class: &'static str, children: Vec<Node>) -> Self {
        Node::Element {
            tag,
            class,
            style: None,
            children,
        }
    }

    fn styled(
        tag: &'static str,
        class: &'static str,
        style: String,
        children: Vec<Node>,
    ) -> Self {
        Node::Element {
            tag,
            class,
            style: Some(style),
            children,
        }
    }

    fn text(content: impl Into<String>) -> Self {
        Node::Text(content.into())
    }

    fn write_html(&self, out: &mut String) {
        match self {
            Node::Text(t) => out.push_str(&escape_html(t)),
            Node::Element {
                tag,
                class,
                style,
                children,
            } => {
                let _ = write!(out, "<{tag} class=\"{class}\"");
                if let Some(style) = style {
                    let _ = write!(out, " style=\"{style}\"");
                }
                out.push('>');
                for child in children {
                    child.write_html(out);
                }
                let _ = write!(out, "</{tag}>");
            }
        }
    }

    /// Collect the visible text, one line per leaf block, for the terminal
    /// preview surface. Decorative elements with no text contribute nothing.
    fn collect_lines(&self, out: &mut Vec<String>) {
        match self {
            Node::Text(t) => out.push(t.clone()),
            Node::Element { children, .. } => {
                let has_nested = children.iter().any(|c| matches!(c, Node::Element { .. }));
                if has_nested {
                    for child in children {
                        child.collect_lines(out);
                    }
                } else {
                    let line: String = children
                        .iter()
                        .filter_map(|c| match c {
                            Node::Text(t) => Some(t.as_str()),
                            Node::Element { .. } => None,
                        })
                        .collect();
                    if !line.is_empty() {
                        out.push(line);
                    }
                }
            }
        }
    }
}

/// Minimal HTML text escaping for the single variable slot.
fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

// ── Document ─────────────────────────────────────────────────────────────

/// Which layout variant a document is rendered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RenderMode {
    /// On-screen preview: responsive, no fixed canvas.
    #[default]
    Preview,
    /// Print-accurate: fixed 1123×794 px canvas matching A4 landscape.
    Print,
}

/// A rendered, name-populated certificate.
///
/// Transient by design: created on demand for a preview or an export and
/// discarded afterwards. Never stored in the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateDocument {
    name: Name,
    mode: RenderMode,
    root: Node,
}

impl CertificateDocument {
    /// The recipient this document was rendered for.
    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    /// Fixed canvas size in pixels — print mode only.
    pub fn pixel_size(&self) -> Option<(u32, u32)> {
        match self.mode {
            RenderMode::Print => Some((PRINT_WIDTH_PX, PRINT_HEIGHT_PX)),
            RenderMode::Preview => None,
        }
    }

    /// Serialise the full HTML page handed to the rasterize collaborator.
    pub fn html(&self) -> String {
        let mut body = String::new();
        self.root.write_html(&mut body);
        format!(
            "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><style>{BASE_CSS}</style></head><body>{body}</body></html>"
        )
    }

    /// Plain-text rendering for the terminal preview surface.
    pub fn to_text(&self) -> String {
        let mut lines = Vec::new();
        self.root.collect_lines(&mut lines);
        lines.join("\n")
    }
}

/// Render the certificate for `name` in the requested mode.
///
/// The two modes share the same tree; print mode pins the canvas size on the
/// root element so the rasterizer lays the page out at exactly the A4
/// landscape geometry.
pub fn render(name: &Name, mode: RenderMode) -> CertificateDocument {
    let children = vec![
        Node::el("div", "corner-decoration top-left", vec![]),
        Node::el("div", "corner-decoration bottom-right", vec![]),
        Node::el("h1", "certificate-title", vec![Node::text(TITLE)]),
        Node::el("p", "certificate-subtitle", vec![Node::text(SUBTITLE)]),
        Node::el("h2", "participant-name", vec![Node::text(name.as_str())]),
        Node::el(
            "div",
            "certificate-body",
            BODY_LINES
                .iter()
                .map(|line| Node::el("p", "", vec![Node::text(*line)]))
                .collect(),
        ),
        Node::el(
            "div",
            "signature",
            vec![
                Node::el("div", "signature-name", vec![Node::text(SIGNATURE_NAME)]),
                Node::el("div", "signature-role", vec![Node::text(SIGNATURE_ROLE)]),
            ],
        ),
    ];

    let root = match mode {
        RenderMode::Preview => Node::el("div", "certificate certificate-preview-mode", children),
        RenderMode::Print => Node::styled(
            "div",
            "certificate certificate-print-mode",
            format!("width:{PRINT_WIDTH_PX}px;height:{PRINT_HEIGHT_PX}px;"),
            children,
        ),
    };

    CertificateDocument {
        name: name.clone(),
        mode,
        root,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> Name {
        Name::parse(s).unwrap()
    }

    #[test]
    fn rendering_is_idempotent() {
        let n = name("Maria Santos");
        let a = render(&n, RenderMode::Print);
        let b = render(&n, RenderMode::Print);
        assert_eq!(a.html(), b.html());
        assert_eq!(a.to_text(), b.to_text());
    }

    #[test]
    fn name_appears_exactly_once_in_html() {
        let doc = render(&name("Pedro Oliveira"), RenderMode::Preview);
        assert_eq!(doc.html().matches("Pedro Oliveira").count(), 1);
    }

    #[test]
    fn name_is_html_escaped() {
        let doc = render(&name("Ana <b> & Cia"), RenderMode::Print);
        let html = doc.html();
        assert!(html.contains("Ana &lt;b&gt; &amp; Cia"));
        assert!(!html.contains("Ana <b>"));
    }

    #[test]
    fn modes_differ_only_in_canvas_hints() {
        let n = name("João Silva");
        let preview = render(&n, RenderMode::Preview);
        let print = render(&n, RenderMode::Print);

        // Same textual content either way.
        assert_eq!(preview.to_text(), print.to_text());

        // Print pins the A4 landscape canvas; preview stays fluid.
        assert_eq!(preview.pixel_size(), None);
        assert_eq!(print.pixel_size(), Some((1123, 794)));
        assert!(print.html().contains("width:1123px;height:794px;"));
        assert!(!preview.html().contains("width:1123px"));
    }

    #[test]
    fn template_text_surrounds_the_name() {
        let doc = render(&name("João Silva"), RenderMode::Preview);
        let text = doc.to_text();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "CERTIFICADO");
        assert_eq!(lines[1], "ESTE CERTIFICADO COMPROVA QUE");
        assert_eq!(lines[2], "João Silva");
        assert!(lines[3].contains("GASTRONOMIA"));
        assert!(text.contains("Ariel Lima"));
        assert!(text.contains("Diretora Responsável"));
    }

    #[test]
    fn fresh_tree_per_render_no_aliasing() {
        let n = name("Ana");
        let a = render(&n, RenderMode::Preview);
        let b = render(&n, RenderMode::Preview);
        // Equal but distinct values: mutating one cannot affect the other.
        assert_eq!(a, b);
        let mut c = b.clone();
        c.mode = RenderMode::Print;
        assert_ne!(a.mode(), c.mode());
    }
}
