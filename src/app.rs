//! Orchestration of one user action: encode, request, extract.

use crate::ai::TextGenerator;
use crate::credentials::CredentialProvider;
use crate::extract::{Highlighter, MarkdownRenderer};
use crate::models::{ModeOutput, UiState};
use crate::modes::{self, ModeInputs};
use crate::{request, Error, Result};
use tracing::{error, info};

/// Receives presentation state changes.
pub trait StateObserver: Send + Sync {
    fn on_state(&self, state: &UiState);
}

/// Observer that only logs transitions.
pub struct LoggingObserver;

impl StateObserver for LoggingObserver {
    fn on_state(&self, state: &UiState) {
        tracing::debug!("UI state -> {:?}", state);
    }
}

/// Runs modes against a text generator.
///
/// Holds no per-request state: every action builds its own request, so a
/// failed action leaves nothing behind for the next one.
pub struct Workbench {
    generator: Box<dyn TextGenerator>,
    credentials: Box<dyn CredentialProvider>,
    renderer: Option<Box<dyn MarkdownRenderer>>,
    highlighter: Option<Box<dyn Highlighter>>,
    observer: Box<dyn StateObserver>,
}

impl Workbench {
    pub fn new(
        generator: Box<dyn TextGenerator>,
        credentials: Box<dyn CredentialProvider>,
    ) -> Self {
        Self {
            generator,
            credentials,
            renderer: None,
            highlighter: None,
            observer: Box::new(LoggingObserver),
        }
    }

    pub fn with_renderer(mut self, renderer: Box<dyn MarkdownRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn with_highlighter(mut self, highlighter: Box<dyn Highlighter>) -> Self {
        self.highlighter = Some(highlighter);
        self
    }

    pub fn with_observer(mut self, observer: Box<dyn StateObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Run one action in `mode`.
    ///
    /// The observer sees `Loading`, then `Success` or `Error`, then `Idle`
    /// once the workbench is ready for the next action.
    pub async fn run(&self, mode: &str, inputs: &ModeInputs) -> Result<ModeOutput> {
        self.observer.on_state(&UiState::Loading);

        let outcome = self.execute(mode, inputs).await;
        match &outcome {
            Ok(_) => {
                info!("[{}] Action completed", mode);
                self.observer.on_state(&UiState::Success);
            }
            Err(e) => {
                error!("[{}] Action failed: {}", mode, e);
                self.observer.on_state(&UiState::Error(e.user_message()));
            }
        }

        self.observer.on_state(&UiState::Idle);
        outcome
    }

    async fn execute(&self, mode: &str, inputs: &ModeInputs) -> Result<ModeOutput> {
        let spec = modes::lookup(mode)?;

        let api_key = self
            .credentials
            .api_key()
            .ok_or_else(|| Error::Auth("missing API key".to_string()))?;

        let (instruction, parts) = spec.prepare(inputs).await?;
        info!("[{}] Sending {} user part(s)", spec.mode, parts.len());

        let request = request::build(instruction, parts);
        let raw = self.generator.generate(&api_key, &request).await?;

        Ok(spec.extract(
            &raw,
            inputs,
            self.renderer.as_deref(),
            self.highlighter.as_deref(),
        ))
    }
}
