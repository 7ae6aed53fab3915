//! Item title decoding.
//!
//! Order items carry their titles in the encoding used by the upstream
//! order-management system. The carrier needs plain product names, so the
//! gateway asks a [`TitleDecoder`] for each one.

/// Decodes stored item titles into display names.
pub trait TitleDecoder: Send + Sync {
    /// Returns `None` when the title cannot be decoded.
    fn decode(&self, encoded: &str) -> Option<String>;
}

/// Decoder for deployments whose titles are stored as plain text.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTitles;

impl TitleDecoder for PlainTitles {
    fn decode(&self, encoded: &str) -> Option<String> {
        Some(encoded.to_string())
    }
}
