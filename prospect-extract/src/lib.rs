//! Contact and content extraction pipeline.
//!
//! - Markup normalization from rendered page source (`markdown`)
//! - Noise stripping ahead of pattern matching (`preprocess`)
//! - Locale-aware phone recognizers with signature dedup (`phone`)
//! - Email recognition and placeholder filtering (`email`)
//! - Link extraction and contact-page scoring (`links`)
//! - The per-URL orchestration state machine (`pipeline`)
//!
//! The pipeline consumes rendered pages through the [`PageRenderer`] port;
//! browser plumbing lives elsewhere and is injected at construction.

pub mod document;
pub mod email;
pub mod links;
pub mod markdown;
pub mod phone;
pub mod pipeline;
pub mod preprocess;

pub use document::{NormalizedDocument, PageRenderer};
pub use pipeline::{ContactSource, ContentResult, ExtractionPipeline, ExtractionResult};
