use std::env;
use std::process::Command;
use std::sync::Arc;

use tracing::debug;

pub const STT_CMD_ENV: &str = "SAARTHI_STT_CMD";
pub const TTS_CMD_ENV: &str = "SAARTHI_TTS_CMD";

pub trait SpeechToText: Send + Sync {
    /// One utterance, or `None` when nothing was captured.
    fn capture_once(&self) -> Option<String>;
}

/// Best-effort output channel; failures are swallowed, never surfaced.
pub trait TextToSpeech: Send + Sync {
    fn speak(&self, text: &str);
}

struct CommandStt {
    program: String,
    args: Vec<String>,
}

impl SpeechToText for CommandStt {
    fn capture_once(&self) -> Option<String> {
        let output = Command::new(&self.program).args(&self.args).output();
        match output {
            Ok(output) if output.status.success() => {
                let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if text.is_empty() {
                    None
                } else {
                    Some(text)
                }
            }
            Ok(output) => {
                debug!(status = ?output.status, "speech capture command failed");
                None
            }
            Err(err) => {
                debug!(error = %err, "speech capture command did not run");
                None
            }
        }
    }
}

struct CommandTts {
    program: String,
    args: Vec<String>,
}

impl TextToSpeech for CommandTts {
    fn speak(&self, text: &str) {
        let result = Command::new(&self.program).args(&self.args).arg(text).status();
        if let Err(err) = result {
            debug!(error = %err, "text to speech command did not run");
        }
    }
}

#[derive(Clone, Default)]
pub struct VoiceStack {
    stt: Option<Arc<dyn SpeechToText>>,
    tts: Option<Arc<dyn TextToSpeech>>,
}

impl VoiceStack {
    /// Capability detection happens once at startup; absence of a collaborator
    /// is normal, not an error.
    pub fn detect() -> Self {
        Self {
            stt: command_from_env(STT_CMD_ENV)
                .map(|(program, args)| Arc::new(CommandStt { program, args }) as Arc<dyn SpeechToText>),
            tts: command_from_env(TTS_CMD_ENV)
                .map(|(program, args)| Arc::new(CommandTts { program, args }) as Arc<dyn TextToSpeech>),
        }
    }

    pub fn silent() -> Self {
        Self::default()
    }

    pub fn stt_available(&self) -> bool {
        self.stt.is_some()
    }

    pub fn tts_available(&self) -> bool {
        self.tts.is_some()
    }

    pub fn capture_once(&self) -> Option<String> {
        self.stt.as_ref()?.capture_once()
    }

    pub fn speak(&self, text: &str) {
        if let Some(tts) = &self.tts {
            tts.speak(text);
        }
    }
}

fn command_from_env(var: &str) -> Option<(String, Vec<String>)> {
    let command_line = env::var(var).ok()?;
    let mut parts = command_line.split_whitespace().map(str::to_string);
    let program = parts.next()?;
    Some((program, parts.collect()))
}
