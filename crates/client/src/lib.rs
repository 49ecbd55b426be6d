//! Capture-side collaborators for tab-bear.
//!
//! This crate provides the capture dispatcher (which tabs get an agent) and
//! the capture agent (page to `CACHE_MARKDOWN` message), both independent of
//! any particular browser host.

pub mod agent;
pub mod dispatch;

pub use agent::{AgentError, MarkdownConverter, PageSnapshot, capture_page, clean_markdown, is_valid_markdown_line};
pub use dispatch::{CaptureDispatcher, DispatchError, TabHost, TabInfo, is_injectable_url};
