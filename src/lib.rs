//! Workbench for code-oriented prompts against Google Gemini
//!
//! Each mode turns user input (text, code, images) into a single-turn
//! `generateContent` request and post-processes the answer into a code
//! block, rendered Markdown, or an explanation plus code split.

pub mod ai;
pub mod app;
pub mod credentials;
pub mod error;
pub mod extract;
pub mod models;
pub mod modes;
pub mod parts;
pub mod prompts;
pub mod request;

pub use error::{Error, Result};
