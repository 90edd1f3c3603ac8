//! Single-turn request construction.

use crate::models::ContentPart;
use crate::parts::encode_text;

/// A system instruction plus the user's parts, in the order supplied.
///
/// Built fresh for every call and never mutated afterwards, so a failed
/// call cannot leak state into the next one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    system_instruction: String,
    parts: Vec<ContentPart>,
}

/// Combine a system instruction and user parts into one request.
pub fn build(system_instruction: impl Into<String>, user_parts: Vec<ContentPart>) -> GenerationRequest {
    GenerationRequest {
        system_instruction: system_instruction.into(),
        parts: user_parts,
    }
}

impl GenerationRequest {
    pub fn system_instruction(&self) -> &str {
        &self.system_instruction
    }

    pub fn user_parts(&self) -> &[ContentPart] {
        &self.parts
    }

    /// Parts of the outbound user turn: the system instruction as a text
    /// part, followed by the user parts.
    pub fn outbound_parts(&self) -> Vec<ContentPart> {
        std::iter::once(encode_text(self.system_instruction.clone()))
            .chain(self.parts.iter().cloned())
            .collect()
    }
}
