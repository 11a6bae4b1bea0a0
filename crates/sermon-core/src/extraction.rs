//! Supporting document text extraction
//!
//! Reduces a reference document chosen by the user to plain text that can be
//! sent along with the outline request. Plain text and Markdown are read
//! as-is; HTML is reduced to its visible text with paragraph breaks kept.

use std::path::{Path, PathBuf};

use scraper::{ElementRef, Html, Node};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while reading a supporting document
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Unsupported document type: {}", .0.display())]
    Unsupported(PathBuf),

    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not valid UTF-8 text", .0.display())]
    Encoding(PathBuf),

    #[error("No text found in {}", .0.display())]
    Empty(PathBuf),
}

/// Document kinds understood by [`extract_text`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    PlainText,
    Html,
}

impl DocumentKind {
    /// Detect the kind from the file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "txt" | "text" | "md" | "markdown" => Some(DocumentKind::PlainText),
            "html" | "htm" | "xhtml" => Some(DocumentKind::Html),
            _ => None,
        }
    }
}

/// Read `path` and return its text content
pub fn extract_text(path: &Path) -> Result<String, ExtractionError> {
    let kind = DocumentKind::from_path(path)
        .ok_or_else(|| ExtractionError::Unsupported(path.to_path_buf()))?;

    let bytes = std::fs::read(path).map_err(|source| ExtractionError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let raw =
        String::from_utf8(bytes).map_err(|_| ExtractionError::Encoding(path.to_path_buf()))?;

    let text = match kind {
        DocumentKind::PlainText => raw.trim().to_string(),
        DocumentKind::Html => html_to_text(&raw),
    };

    if text.is_empty() {
        return Err(ExtractionError::Empty(path.to_path_buf()));
    }
    debug!("Extracted {} characters from {:?}", text.chars().count(), path);
    Ok(text)
}

/// Visible text of an HTML document, one paragraph per line
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut lines = Vec::new();
    let mut current = String::new();
    collect_text(document.root_element(), &mut lines, &mut current);
    flush_line(&mut lines, &mut current);
    lines.join("\n")
}

fn collect_text(element: ElementRef<'_>, lines: &mut Vec<String>, current: &mut String) {
    let name = element.value().name();
    if is_hidden(name) {
        return;
    }
    let block = is_block(name);
    if block {
        flush_line(lines, current);
    }

    for child in element.children() {
        match child.value() {
            Node::Text(text) => push_words(current, text),
            Node::Element(el) if el.name() == "br" => flush_line(lines, current),
            Node::Element(_) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    collect_text(child_element, lines, current);
                }
            }
            _ => {}
        }
    }

    if block {
        flush_line(lines, current);
    }
}

fn push_words(current: &mut String, text: &str) {
    // Collapse runs of whitespace the way a browser would
    if text.starts_with(char::is_whitespace) && !current.is_empty() {
        current.push(' ');
    }
    let mut words = text.split_whitespace().peekable();
    while let Some(word) = words.next() {
        current.push_str(word);
        if words.peek().is_some() {
            current.push(' ');
        }
    }
    if text.ends_with(char::is_whitespace) && !current.is_empty() && !current.ends_with(' ') {
        current.push(' ');
    }
}

fn flush_line(lines: &mut Vec<String>, current: &mut String) {
    let line = current.trim();
    if !line.is_empty() {
        lines.push(line.to_string());
    }
    current.clear();
}

fn is_hidden(name: &str) -> bool {
    matches!(
        name,
        "head" | "script" | "style" | "noscript" | "template" | "svg"
    )
}

fn is_block(name: &str) -> bool {
    matches!(
        name,
        "p" | "div"
            | "section"
            | "article"
            | "aside"
            | "header"
            | "footer"
            | "nav"
            | "li"
            | "ul"
            | "ol"
            | "blockquote"
            | "pre"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "tr"
            | "table"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_kind_from_path() {
        assert_eq!(
            DocumentKind::from_path(Path::new("notas.TXT")),
            Some(DocumentKind::PlainText)
        );
        assert_eq!(
            DocumentKind::from_path(Path::new("a/b/comentario.md")),
            Some(DocumentKind::PlainText)
        );
        assert_eq!(
            DocumentKind::from_path(Path::new("page.htm")),
            Some(DocumentKind::Html)
        );
        assert_eq!(DocumentKind::from_path(Path::new("livro.pdf")), None);
        assert_eq!(DocumentKind::from_path(Path::new("sem_extensao")), None);
    }

    #[test]
    fn test_html_to_text() {
        let html = r#"<html><head><title>Ignorado</title><style>p { color: red }</style></head>
            <body>
              <h1>Êxodo   40</h1>
              <p>A glória do <strong>Senhor</strong> encheu
                 o tabernáculo.</p>
              <script>alert("x")</script>
              <ul><li>Um</li><li>Dois &amp; três</li></ul>
              <p>Linha<br>quebrada</p>
            </body></html>"#;

        assert_eq!(
            html_to_text(html),
            "Êxodo 40\nA glória do Senhor encheu o tabernáculo.\nUm\nDois & três\nLinha\nquebrada"
        );
    }

    #[test]
    fn test_extract_plain_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("apoio.md");
        fs::write(&path, "\n# Notas\n\nTexto de apoio.\n").unwrap();

        assert_eq!(extract_text(&path).unwrap(), "# Notas\n\nTexto de apoio.");
    }

    #[test]
    fn test_extract_html_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("apoio.html");
        fs::write(&path, "<p>Primeiro</p><p>Segundo</p>").unwrap();

        assert_eq!(extract_text(&path).unwrap(), "Primeiro\nSegundo");
    }

    #[test]
    fn test_extract_errors() {
        let dir = tempfile::tempdir().unwrap();

        let pdf = dir.path().join("livro.pdf");
        fs::write(&pdf, b"%PDF-1.4").unwrap();
        assert!(matches!(
            extract_text(&pdf),
            Err(ExtractionError::Unsupported(_))
        ));

        let missing = dir.path().join("faltando.txt");
        assert!(matches!(
            extract_text(&missing),
            Err(ExtractionError::Io { .. })
        ));

        let binary = dir.path().join("binario.txt");
        fs::write(&binary, [0xff, 0xfe, 0x00]).unwrap();
        assert!(matches!(
            extract_text(&binary),
            Err(ExtractionError::Encoding(_))
        ));

        let blank = dir.path().join("vazio.html");
        fs::write(&blank, "<script>x()</script>").unwrap();
        assert!(matches!(
            extract_text(&blank),
            Err(ExtractionError::Empty(_))
        ));
    }
}
