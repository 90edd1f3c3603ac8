//! Mode table.
//!
//! Each mode is a [`ModeSpec`] record: which template steers the model,
//! which inputs it takes, which of them become content parts, and how the
//! answer is post-processed. Adding a mode means adding a row.

use crate::extract::{self, Highlighter, MarkdownRenderer};
use crate::models::{ContentPart, ModeOutput};
use crate::parts::{encode_file, encode_media, encode_text};
use crate::{prompts, Error, Result};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

pub const MATH_SENTINEL: &str = "---PYTHON_CODE_BLOCK---";
pub const ARDUINO_SENTINEL: &str = "---ARDUINO_CODE_BLOCK---";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Generation,
    Styling,
    Vision,
    Explainer,
    Lab,
    Math,
    Arduino,
}

impl Mode {
    pub const ALL: [Mode; 7] = [
        Mode::Generation,
        Mode::Styling,
        Mode::Vision,
        Mode::Explainer,
        Mode::Lab,
        Mode::Math,
        Mode::Arduino,
    ];

    pub fn spec(self) -> &'static ModeSpec {
        // Rows are laid out in declaration order.
        &MODES[self as usize]
    }

    pub fn id(self) -> &'static str {
        match self {
            Mode::Generation => "generation",
            Mode::Styling => "styling",
            Mode::Vision => "vision",
            Mode::Explainer => "explainer",
            Mode::Lab => "lab",
            Mode::Math => "math",
            Mode::Arduino => "arduino",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Mode::ALL
            .into_iter()
            .find(|mode| mode.id().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| Error::UnknownMode(wanted.to_string()))
    }
}

/// A named user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Prompt,
    Code,
    Language,
    Style,
    CustomInstructions,
    LabDomain,
    Image,
}

impl Slot {
    pub fn name(self) -> &'static str {
        match self {
            Slot::Prompt => "prompt",
            Slot::Code => "code",
            Slot::Language => "language",
            Slot::Style => "style",
            Slot::CustomInstructions => "custom instructions",
            Slot::LabDomain => "lab domain",
            Slot::Image => "image",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Required,
    Optional,
}

/// How the raw answer becomes a display artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Single code block with its fence removed.
    CodeBlock,
    /// Markdown passed to the renderer.
    Markdown,
    /// Explanation and code separated by `sentinel`.
    Split {
        sentinel: &'static str,
        language_hint: &'static str,
    },
}

#[derive(Debug)]
pub struct ModeSpec {
    pub mode: Mode,
    pub template: &'static str,
    pub slots: &'static [(Slot, Requirement)],
    /// Non-empty when at least one of these slots must be present.
    pub requires_any: &'static [Slot],
    /// Slots sent as content parts, in this order.
    pub part_slots: &'static [Slot],
    pub strategy: Strategy,
    /// Highlighting hint for code-block output when it is not user-chosen.
    pub code_language: Option<&'static str>,
}

use Requirement::{Optional, Required};

static MODES: &[ModeSpec] = &[
    ModeSpec {
        mode: Mode::Generation,
        template: prompts::GENERATION,
        slots: &[(Slot::Prompt, Required), (Slot::Language, Required)],
        requires_any: &[],
        part_slots: &[Slot::Prompt],
        strategy: Strategy::CodeBlock,
        code_language: None,
    },
    ModeSpec {
        mode: Mode::Styling,
        template: prompts::STYLING,
        slots: &[
            (Slot::Code, Required),
            (Slot::Style, Required),
            (Slot::CustomInstructions, Optional),
        ],
        requires_any: &[],
        part_slots: &[Slot::Code],
        strategy: Strategy::CodeBlock,
        code_language: None,
    },
    ModeSpec {
        mode: Mode::Vision,
        template: prompts::VISION,
        slots: &[(Slot::Image, Required)],
        requires_any: &[],
        part_slots: &[Slot::Image],
        strategy: Strategy::CodeBlock,
        code_language: Some("html"),
    },
    ModeSpec {
        mode: Mode::Explainer,
        template: prompts::EXPLAINER,
        slots: &[(Slot::Code, Required)],
        requires_any: &[],
        part_slots: &[Slot::Code],
        strategy: Strategy::Markdown,
        code_language: None,
    },
    ModeSpec {
        mode: Mode::Lab,
        template: prompts::LAB,
        slots: &[(Slot::Prompt, Required), (Slot::LabDomain, Optional)],
        requires_any: &[],
        part_slots: &[Slot::Prompt],
        strategy: Strategy::Markdown,
        code_language: None,
    },
    ModeSpec {
        mode: Mode::Math,
        template: prompts::MATH,
        slots: &[(Slot::Prompt, Optional), (Slot::Image, Optional)],
        requires_any: &[Slot::Prompt, Slot::Image],
        part_slots: &[Slot::Prompt, Slot::Image],
        strategy: Strategy::Split {
            sentinel: MATH_SENTINEL,
            language_hint: "python",
        },
        code_language: None,
    },
    ModeSpec {
        mode: Mode::Arduino,
        template: prompts::ARDUINO,
        slots: &[(Slot::Prompt, Required)],
        requires_any: &[],
        part_slots: &[Slot::Prompt],
        strategy: Strategy::Split {
            sentinel: ARDUINO_SENTINEL,
            language_hint: "cpp",
        },
        code_language: None,
    },
];

/// Look up a mode by identifier.
pub fn lookup(id: &str) -> Result<&'static ModeSpec> {
    id.parse::<Mode>().map(Mode::spec)
}

/// Where image input comes from.
#[derive(Debug, Clone)]
pub enum MediaSource {
    File(PathBuf),
    Bytes { bytes: Vec<u8>, mime_type: String },
}

/// Values the user supplied for one action. Blank strings count as absent.
#[derive(Debug, Clone, Default)]
pub struct ModeInputs {
    pub prompt: Option<String>,
    pub code: Option<String>,
    pub language: Option<String>,
    pub style: Option<String>,
    pub custom_instructions: Option<String>,
    pub lab_domain: Option<String>,
    pub image: Option<MediaSource>,
}

impl ModeInputs {
    fn text(&self, slot: Slot) -> Option<&str> {
        let value = match slot {
            Slot::Prompt => &self.prompt,
            Slot::Code => &self.code,
            Slot::Language => &self.language,
            Slot::Style => &self.style,
            Slot::CustomInstructions => &self.custom_instructions,
            Slot::LabDomain => &self.lab_domain,
            Slot::Image => return None,
        };
        value.as_deref().filter(|v| !v.trim().is_empty())
    }

    fn has(&self, slot: Slot) -> bool {
        match slot {
            Slot::Image => self.image.is_some(),
            other => self.text(other).is_some(),
        }
    }
}

impl ModeSpec {
    /// Validate inputs, render the system instruction and encode the user
    /// parts.
    pub async fn prepare(&self, inputs: &ModeInputs) -> Result<(String, Vec<ContentPart>)> {
        self.validate(inputs)?;
        let instruction = self.system_instruction(inputs);

        let mut parts = Vec::with_capacity(self.part_slots.len());
        for &slot in self.part_slots {
            match slot {
                Slot::Image => match &inputs.image {
                    Some(MediaSource::File(path)) => parts.push(encode_file(path).await?),
                    Some(MediaSource::Bytes { bytes, mime_type }) => {
                        parts.push(encode_media(bytes, mime_type)?)
                    }
                    None => {}
                },
                text_slot => {
                    if let Some(text) = inputs.text(text_slot) {
                        parts.push(encode_text(text));
                    }
                }
            }
        }

        Ok((instruction, parts))
    }

    fn validate(&self, inputs: &ModeInputs) -> Result<()> {
        if let Some((slot, _)) = self
            .slots
            .iter()
            .find(|(slot, req)| *req == Required && !inputs.has(*slot))
        {
            return Err(Error::MissingInput(format!(
                "{} mode needs a {}",
                self.mode,
                slot.name()
            )));
        }

        if !self.requires_any.is_empty() && !self.requires_any.iter().any(|s| inputs.has(*s)) {
            let names: Vec<&str> = self.requires_any.iter().map(|s| s.name()).collect();
            return Err(Error::MissingInput(format!(
                "{} mode needs at least one of: {}",
                self.mode,
                names.join(", ")
            )));
        }

        Ok(())
    }

    /// Render the template with every value the table knows how to derive.
    pub fn system_instruction(&self, inputs: &ModeInputs) -> String {
        let custom = inputs
            .text(Slot::CustomInstructions)
            .map(|text| format!("ADDITIONAL INSTRUCTIONS: {} ", text.trim()))
            .unwrap_or_default();
        let role = match inputs.text(Slot::LabDomain).map(str::trim) {
            Some(domain) if domain.eq_ignore_ascii_case("chem") => "chemist",
            _ => "electrical engineer",
        };
        let separator = match self.strategy {
            Strategy::Split { sentinel, .. } => sentinel,
            _ => "",
        };

        prompts::render(
            self.template,
            &[
                ("prompt", inputs.text(Slot::Prompt).unwrap_or_default()),
                ("language", inputs.text(Slot::Language).unwrap_or_default()),
                ("style", inputs.text(Slot::Style).unwrap_or_default()),
                ("custom_instructions", &custom),
                ("role", role),
                ("separator", separator),
            ],
        )
    }

    /// Highlighting hint for a code-block answer.
    pub fn code_language_hint(&self, inputs: &ModeInputs) -> Option<String> {
        match self.strategy {
            Strategy::Split { language_hint, .. } => Some(language_hint.to_string()),
            Strategy::Markdown => None,
            Strategy::CodeBlock => self.code_language.map(str::to_string).or_else(|| {
                inputs
                    .text(Slot::Language)
                    .map(|lang| lang.trim().to_lowercase())
            }),
        }
    }

    /// Turn the model's raw answer into the mode's display artifact.
    pub fn extract(
        &self,
        raw: &str,
        inputs: &ModeInputs,
        renderer: Option<&dyn MarkdownRenderer>,
        highlighter: Option<&dyn Highlighter>,
    ) -> ModeOutput {
        match self.strategy {
            Strategy::CodeBlock => {
                let code = extract::strip_code_fence(raw.trim()).trim().to_string();
                let language_hint = self.code_language_hint(inputs);
                let highlighted = highlighter
                    .map(|h| h.highlight(&code, language_hint.as_deref().unwrap_or_default()));
                ModeOutput::Code {
                    code,
                    language_hint,
                    highlighted,
                }
            }
            Strategy::Markdown => ModeOutput::Markdown {
                source: raw.to_string(),
                html: extract::to_markdown_html(raw, renderer),
            },
            Strategy::Split {
                sentinel,
                language_hint,
            } => ModeOutput::Split(extract::split_on_sentinel(
                raw,
                sentinel,
                language_hint,
                renderer,
                highlighter,
            )),
        }
    }
}
