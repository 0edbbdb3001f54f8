use std::env;
use std::process::Command;
use std::sync::Arc;

use saarthi_core::Language;
use tracing::debug;

pub const LLM_CMD_ENV: &str = "SAARTHI_LLM_CMD";

/// Optional generative collaborator consulted only after every rule-based
/// interpretation has failed. `None` means unavailable or failed; never an
/// error the dispatcher has to handle.
pub trait GenerativeFallback: Send + Sync {
    fn generate(&self, prompt: &str, language: Language) -> Option<String>;
}

#[derive(Debug, Default)]
pub struct DisabledFallback;

impl GenerativeFallback for DisabledFallback {
    fn generate(&self, _prompt: &str, _language: Language) -> Option<String> {
        None
    }
}

/// Shells out to a locally installed model runner, e.g.
/// `SAARTHI_LLM_CMD="llama-run /opt/models/assistant.gguf"`. The full prompt
/// (system instruction + user text) is passed as the final argument and
/// stdout is the answer.
#[derive(Debug, Clone)]
pub struct CommandFallback {
    program: String,
    args: Vec<String>,
}

impl CommandFallback {
    pub fn from_command_line(command_line: &str) -> Option<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }
}

impl GenerativeFallback for CommandFallback {
    fn generate(&self, prompt: &str, language: Language) -> Option<String> {
        let target = match language {
            Language::Hi => "Hindi (Devanagari script)",
            Language::HiLatn => "Hinglish (Hindi written in Latin script)",
            Language::En => "English",
        };
        let full_prompt = format!(
            "You are Saarthi, a polite transport assistant. Answer concisely in {target}, no emojis.\n\n{prompt}"
        );

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(&full_prompt)
            .output();

        match output {
            Ok(output) if output.status.success() => {
                let answer = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if answer.is_empty() {
                    None
                } else {
                    Some(answer)
                }
            }
            Ok(output) => {
                debug!(status = ?output.status, "generative fallback command failed");
                None
            }
            Err(err) => {
                debug!(error = %err, "generative fallback command did not run");
                None
            }
        }
    }
}

/// Test double: always answers with the configured text.
#[derive(Debug, Clone)]
pub struct ScriptedFallback {
    pub reply: String,
}

impl GenerativeFallback for ScriptedFallback {
    fn generate(&self, _prompt: &str, _language: Language) -> Option<String> {
        if self.reply.is_empty() {
            None
        } else {
            Some(self.reply.clone())
        }
    }
}

#[derive(Clone)]
pub struct LmStack {
    pub model: Arc<dyn GenerativeFallback>,
    pub enabled: bool,
}

impl LmStack {
    pub fn load_default() -> Self {
        match env::var(LLM_CMD_ENV) {
            Ok(command_line) if !command_line.trim().is_empty() => {
                match CommandFallback::from_command_line(&command_line) {
                    Some(model) => Self {
                        model: Arc::new(model),
                        enabled: true,
                    },
                    None => Self::disabled(),
                }
            }
            _ => Self::disabled(),
        }
    }

    pub fn disabled() -> Self {
        Self {
            model: Arc::new(DisabledFallback),
            enabled: false,
        }
    }

    pub fn scripted(reply: impl Into<String>) -> Self {
        Self {
            model: Arc::new(ScriptedFallback {
                reply: reply.into(),
            }),
            enabled: true,
        }
    }
}
