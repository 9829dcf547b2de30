//! Driver layer for browser automation.
//!
//! This crate exposes the WebDriver session wrapper used to render pages
//! before content extraction.
//!
//! - [`prospect_browser::driver::BrowserSession`]: WebDriver client wrapper
//! - [`prospect_browser::page::BrowserPage`]: page source and metadata helpers
pub mod prospect_browser;
