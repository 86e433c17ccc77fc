//! Pretty-printed HTML snapshots of fetched policy documents.
//!
//! Each document is written to its own file. The last document is also
//! copied to a fixed file name for quick inspection. Every file is written
//! under a temporary name and renamed into place, so runs sharing an export
//! directory only ever see complete snapshots.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use scraper::{ElementRef, Html, Node};
use tracing::{debug, info};

use crate::types::PolicyContent;

/// File that always holds the most recently exported document.
pub const LATEST_SNAPSHOT: &str = "Zone Planning and Development Policies.html";

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Re-indent an HTML fragment: one tag or text run per line, one space of
/// indentation per nesting level.
pub fn prettify(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let mut out = String::new();
    write_children(fragment.root_element(), 0, &mut out);
    out
}

fn write_children(element: ElementRef, depth: usize, out: &mut String) {
    for child in element.children() {
        if let Some(child) = ElementRef::wrap(child) {
            write_element(child, depth, out);
            continue;
        }
        match child.value() {
            Node::Text(text) => {
                let text = text.trim();
                if !text.is_empty() {
                    write_line(out, depth, &escape_text(text));
                }
            }
            Node::Comment(comment) => {
                write_line(out, depth, &format!("<!--{}-->", &**comment));
            }
            _ => {}
        }
    }
}

fn write_element(element: ElementRef, depth: usize, out: &mut String) {
    let value = element.value();
    let mut open = format!("<{}", value.name());
    for (name, attr) in value.attrs() {
        open.push_str(&format!(" {}=\"{}\"", name, escape_attr(attr)));
    }
    open.push('>');
    write_line(out, depth, &open);

    if VOID_ELEMENTS.contains(&value.name()) {
        return;
    }
    write_children(element, depth + 1, out);
    write_line(out, depth, &format!("</{}>", value.name()));
}

fn write_line(out: &mut String, depth: usize, line: &str) {
    out.push_str(&" ".repeat(depth));
    out.push_str(line);
    out.push('\n');
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}

/// File name for a document id; anything but ASCII alphanumerics, `-` and
/// `_` becomes `_`.
pub fn snapshot_file_name(document_id: &str) -> String {
    let safe: String = document_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{}.html", safe)
}

/// Write one snapshot per document into `dir`, then copy the last one to
/// [`LATEST_SNAPSHOT`]. Returns the per-document paths in input order.
pub async fn write_snapshots(
    dir: &Path,
    contents: &[PolicyContent],
) -> std::io::Result<Vec<PathBuf>> {
    tokio::fs::create_dir_all(dir).await?;

    let mut written = Vec::with_capacity(contents.len());
    for content in contents {
        let path = dir.join(snapshot_file_name(&content.document_id));
        write_replacing(&path, prettify(&content.html).as_bytes()).await?;
        debug!(path = %path.display(), "Wrote policy snapshot");
        written.push(path);
    }

    if let Some(last) = written.last() {
        let latest = dir.join(LATEST_SNAPSHOT);
        let html = tokio::fs::read(last).await?;
        write_replacing(&latest, &html).await?;
        info!(path = %latest.display(), documents = written.len(), "Exported policy snapshots");
    }
    Ok(written)
}

/// Write to a unique sibling temp file, then rename over `path`.
async fn write_replacing(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp = path.with_file_name(format!(
        ".{}.{}.{}.tmp",
        file_name,
        std::process::id(),
        TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
    ));

    if let Err(e) = tokio::fs::write(&temp, bytes).await {
        let _ = tokio::fs::remove_file(&temp).await;
        return Err(e);
    }
    if let Err(e) = tokio::fs::rename(&temp, path).await {
        let _ = tokio::fs::remove_file(&temp).await;
        return Err(e);
    }
    Ok(())
}
