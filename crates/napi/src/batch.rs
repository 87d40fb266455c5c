//! Inputs, options and results of `renderBatch`.

use crate::types::RenderResult;
use napi_derive::napi;

/// One fragment of a batch.
#[napi(object)]
#[derive(Debug, Clone)]
pub struct BatchInput {
    /// Fragment identifier (typically a post id or slug).
    pub id: String,
    /// Raw block markup.
    pub html: String,
    /// WordPress URL of the site the fragment belongs to.
    pub source_url: Option<String>,
}

/// Outcome of one fragment.
#[napi(object)]
#[derive(Debug, Clone)]
pub struct BatchResult {
    /// Id of the input fragment.
    pub id: String,
    /// Render output on success.
    pub result: Option<RenderResult>,
    /// Why the fragment failed.
    pub error: Option<String>,
}

/// Counters for a finished batch.
#[napi(object)]
#[derive(Debug, Clone)]
pub struct BatchStats {
    /// Fragments submitted.
    pub total: u32,
    /// Fragments rendered.
    pub succeeded: u32,
    /// Fragments that failed.
    pub failed: u32,
    /// Wall-clock time of the batch in milliseconds.
    pub processing_time_ms: f64,
}

/// Batch tuning.
#[napi(object)]
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    /// Pool size; rayon's global pool when absent.
    pub max_threads: Option<u32>,
    /// Keep going past failed fragments (default true).
    pub continue_on_error: Option<bool>,
    /// Also serialize each tree back to HTML.
    pub include_html: Option<bool>,
}

/// Per-fragment results in input order, plus counters.
#[napi(object)]
#[derive(Debug, Clone)]
pub struct BatchProcessingResult {
    /// One entry per rendered or failed fragment.
    pub results: Vec<BatchResult>,
    /// Batch counters.
    pub stats: BatchStats,
}
