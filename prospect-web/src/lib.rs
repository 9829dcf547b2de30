//! Page acquisition for the extraction pipeline.
//!
//! - [`renderer::FantocciniRenderer`]: the WebDriver-backed
//!   [`prospect_extract::PageRenderer`] implementation

pub mod renderer;

pub use renderer::FantocciniRenderer;
