use std::panic::{self, AssertUnwindSafe};

/// Extracted document text in the two variants the signal scanner needs.
///
/// `raw` keeps the original casing for the case-sensitive patterns (the
/// "DHTI" field label, uppercase "OK" aging tokens); `lower` is the
/// lower-cased twin used by everything else. Both are whitespace-collapsed.
/// Derived deterministically from the input bytes; immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedText {
    /// Case-preserved, whitespace-collapsed text.
    pub raw: String,
    /// Lower-cased variant of `raw`.
    pub lower: String,
}

impl NormalizedText {
    pub fn from_text(text: &str) -> Self {
        let raw = collapse_whitespace(text);
        let lower = raw.to_lowercase();
        Self { raw, lower }
    }

    /// True when extraction produced no usable text.
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }
}

/// Best-effort text extraction from an uploaded document.
///
/// Contract (never fails past this boundary): a malformed, encrypted, or
/// otherwise unreadable document degrades to the empty string so downstream
/// stages operate on "no text" rather than an error. PDF payloads go through
/// `pdf-extract`; anything else is taken as plain text via lossy UTF-8.
pub fn extract_text(bytes: &[u8]) -> String {
    if bytes.is_empty() {
        return String::new();
    }

    if bytes.starts_with(b"%PDF") {
        // pdf-extract can panic on malformed xref tables, so the unwind is
        // contained here to honor the no-failure contract.
        let extracted = panic::catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem(bytes)
        }));
        return match extracted {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => {
                tracing::warn!("PDF text extraction failed: {}", e);
                String::new()
            }
            Err(_) => {
                tracing::warn!("PDF text extraction panicked on malformed document");
                String::new()
            }
        };
    }

    String::from_utf8_lossy(bytes).into_owned()
}

/// Extract and normalize in one step.
pub fn extract_normalized(bytes: &[u8]) -> NormalizedText {
    NormalizedText::from_text(&extract_text(bytes))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
