//! `markpatch`: locate an edit position with a small pattern language, then
//! insert or replace text there.
//!
//! ```
//! let outcome = markpatch::apply("let x = OLD;", "let x = >>>OLD<<<", "NEW");
//! assert!(outcome.changed());
//! assert_eq!(outcome.text(), "let x = NEW;");
//! ```
//!
//! The engine lives in [`patch`]. Around it:
//!
//! - [`document`]: Markdown patch documents (`Source file`, `match:`, `patch`)
//! - [`report`]: the text report for a processed document
//! - [`server`] / [`tools`]: MCP server over stdio (JSON-RPC 2.0)
//!
//! # Architecture
//!
//! ```text
//! markpatch apply doc.md ─┐
//!                         ├→ PatchDocument → patch::apply → report / diff
//! stdin (JSON-RPC) → McpServer → ToolRouter ─┘
//! ```

pub mod document;
pub mod error;
pub mod patch;
pub mod report;
pub mod server;
pub mod tools;
pub mod util;

pub use error::{MarkpatchError, MarkpatchResult, PatchError};
pub use patch::{apply, try_apply, PatchOutcome};
pub use server::run_mcp_server;
