//! Post-processing of generated text.
//!
//! Three independent strategies over the raw text returned by the model:
//! single code block extraction, Markdown rendering, and the sentinel split
//! into an explanation and a code block. None of them fail; shape mismatches
//! fall back to a defined default.

use crate::models::SplitResult;
use crate::Error;

/// Code shown when the model's answer has no code section.
pub const NO_CODE_PLACEHOLDER: &str = "// No code section found.";

/// Explanation shown when nothing precedes the sentinel.
pub const NO_EXPLANATION_PLACEHOLDER: &str = "No explanation section found.";

const FENCE: &str = "```";

/// Fence headers stripped from the code half of a split, besides the
/// caller's own language hint.
const SPLIT_FENCE_LANGUAGES: &[&str] = &["python", "cpp", "c", "arduino", "ino"];

/// Renders Markdown source to HTML.
pub trait MarkdownRenderer: Send + Sync {
    fn render(&self, markdown: &str) -> String;
}

/// Annotates code with highlighting markup.
pub trait Highlighter: Send + Sync {
    fn highlight(&self, code: &str, language_hint: &str) -> String;
}

/// Remove one leading "```lang\n" line and one trailing "```".
///
/// Text without a fence is returned unchanged. Interior fences and any
/// whitespace outside the fence markers are left alone.
pub fn strip_code_fence(raw: &str) -> String {
    let body = strip_opening_fence(raw).unwrap_or(raw);
    body.strip_suffix(FENCE).unwrap_or(body).to_string()
}

/// Rest of `text` after a "```tag\n" opening line, if it starts with one.
fn strip_opening_fence(text: &str) -> Option<&str> {
    let rest = text.strip_prefix(FENCE)?;
    let tag_len = rest
        .find(|c: char| !is_fence_tag_char(c))
        .unwrap_or(rest.len());
    let after_tag = &rest[tag_len..];
    after_tag
        .strip_prefix('\n')
        .or_else(|| after_tag.strip_prefix("\r\n"))
}

fn is_fence_tag_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '+' | '#' | '-' | '_' | '.')
}

/// Render Markdown through `renderer`, or pass the text through untouched
/// when none is available.
pub fn to_markdown_html(raw: &str, renderer: Option<&dyn MarkdownRenderer>) -> String {
    match renderer {
        Some(renderer) => renderer.render(raw),
        None => raw.to_string(),
    }
}

/// Split `raw` on the first `sentinel` into a Markdown explanation and a
/// literal code block.
///
/// This relies on the model never writing the sentinel anywhere else, which
/// is only ever best effort. When the sentinel is missing the whole text is
/// the explanation and the code is [`NO_CODE_PLACEHOLDER`].
pub fn split_on_sentinel(
    raw: &str,
    sentinel: &str,
    code_language_hint: &str,
    renderer: Option<&dyn MarkdownRenderer>,
    highlighter: Option<&dyn Highlighter>,
) -> SplitResult {
    let (explanation, code) = match raw.split_once(sentinel).filter(|_| !sentinel.is_empty()) {
        Some((before, after)) => (
            before.trim(),
            Some(clean_code_section(after, code_language_hint)),
        ),
        None => {
            let mismatch =
                Error::ContentShapeMismatch(format!("sentinel {:?} not found", sentinel));
            tracing::warn!("{}; showing the whole answer as explanation", mismatch);
            (raw.trim(), None)
        }
    };

    let explanation = if explanation.is_empty() {
        NO_EXPLANATION_PLACEHOLDER.to_string()
    } else {
        explanation.to_string()
    };

    let code = match code {
        Some(code) if !code.is_empty() => code,
        _ => NO_CODE_PLACEHOLDER.to_string(),
    };

    SplitResult {
        explanation_html: to_markdown_html(&explanation, renderer),
        explanation,
        code_html: highlighter.map(|h| h.highlight(&code, code_language_hint)),
        code,
        code_language_hint: code_language_hint.to_string(),
    }
}

/// Trim, drop one known fence header and a trailing fence, trim again.
fn clean_code_section(section: &str, language_hint: &str) -> String {
    let section = section.trim();
    let body = strip_known_fence_header(section, language_hint).unwrap_or(section);
    let body = body.strip_suffix(FENCE).unwrap_or(body);
    body.trim().to_string()
}

fn strip_known_fence_header<'a>(section: &'a str, language_hint: &str) -> Option<&'a str> {
    let rest = section.strip_prefix(FENCE)?;
    let (tag, body) = rest.split_once('\n')?;
    let tag = tag.trim_end_matches('\r');

    let known = tag.is_empty()
        || tag.eq_ignore_ascii_case(language_hint)
        || SPLIT_FENCE_LANGUAGES
            .iter()
            .any(|lang| tag.eq_ignore_ascii_case(lang));

    if known {
        Some(body)
    } else {
        tracing::debug!("Leaving unrecognized fence header {:?} in place", tag);
        None
    }
}
