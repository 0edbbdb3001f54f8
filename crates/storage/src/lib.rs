use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use parking_lot::RwLock;
use saarthi_core::{ChatTurn, ComplaintTicket};
use tokio::fs;
use tokio::io::AsyncWriteExt;

pub trait ComplaintRepository: Send + Sync {
    async fn append_complaint(&self, ticket: &ComplaintTicket) -> Result<()>;
    async fn list_complaints(&self) -> Result<Vec<ComplaintTicket>>;
}

pub trait TranscriptRepository: Send + Sync {
    async fn append_turn(&self, turn: &ChatTurn) -> Result<()>;
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    complaints: Arc<RwLock<Vec<ComplaintTicket>>>,
    turns: Arc<RwLock<Vec<ChatTurn>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn turns(&self) -> Vec<ChatTurn> {
        self.turns.read().clone()
    }
}

impl ComplaintRepository for MemoryStore {
    async fn append_complaint(&self, ticket: &ComplaintTicket) -> Result<()> {
        self.complaints.write().push(ticket.clone());
        Ok(())
    }

    async fn list_complaints(&self) -> Result<Vec<ComplaintTicket>> {
        Ok(self.complaints.read().clone())
    }
}

impl TranscriptRepository for MemoryStore {
    async fn append_turn(&self, turn: &ChatTurn) -> Result<()> {
        self.turns.write().push(turn.clone());
        Ok(())
    }
}

#[derive(Clone)]
pub struct FileStore {
    complaints_path: PathBuf,
    transcript_path: PathBuf,
}

impl FileStore {
    pub async fn open(log_dir: impl AsRef<Path>) -> Result<Self> {
        let log_dir = log_dir.as_ref();
        fs::create_dir_all(log_dir)
            .await
            .with_context(|| format!("failed creating log directory {}", log_dir.display()))?;

        Ok(Self {
            complaints_path: log_dir.join("complaints.json"),
            transcript_path: log_dir.join("chat_history.jsonl"),
        })
    }

    async fn read_complaints(&self) -> Result<Vec<ComplaintTicket>> {
        match fs::read_to_string(&self.complaints_path).await {
            Ok(raw) if !raw.trim().is_empty() => serde_json::from_str(&raw).with_context(|| {
                format!(
                    "invalid complaint ledger at {}",
                    self.complaints_path.display()
                )
            }),
            Ok(_) => Ok(Vec::new()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(err) => Err(err).with_context(|| {
                format!(
                    "failed reading complaint ledger at {}",
                    self.complaints_path.display()
                )
            }),
        }
    }
}

impl ComplaintRepository for FileStore {
    async fn append_complaint(&self, ticket: &ComplaintTicket) -> Result<()> {
        let mut tickets = self.read_complaints().await?;
        tickets.push(ticket.clone());

        let serialized = serde_json::to_string_pretty(&tickets)?;
        fs::write(&self.complaints_path, serialized)
            .await
            .with_context(|| {
                format!(
                    "failed writing complaint ledger at {}",
                    self.complaints_path.display()
                )
            })
    }

    async fn list_complaints(&self) -> Result<Vec<ComplaintTicket>> {
        self.read_complaints().await
    }
}

impl TranscriptRepository for FileStore {
    async fn append_turn(&self, turn: &ChatTurn) -> Result<()> {
        let mut line = serde_json::to_string(turn)?;
        line.push('\n');

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.transcript_path)
            .await
            .with_context(|| {
                format!(
                    "failed opening chat transcript at {}",
                    self.transcript_path.display()
                )
            })?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

#[derive(Clone)]
pub enum Store {
    Memory(MemoryStore),
    File(FileStore),
}

impl Store {
    pub fn memory() -> Self {
        Self::Memory(MemoryStore::new())
    }

    pub async fn file(log_dir: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::File(FileStore::open(log_dir).await?))
    }
}

impl ComplaintRepository for Store {
    async fn append_complaint(&self, ticket: &ComplaintTicket) -> Result<()> {
        match self {
            Store::Memory(store) => store.append_complaint(ticket).await,
            Store::File(store) => store.append_complaint(ticket).await,
        }
    }

    async fn list_complaints(&self) -> Result<Vec<ComplaintTicket>> {
        match self {
            Store::Memory(store) => store.list_complaints().await,
            Store::File(store) => store.list_complaints().await,
        }
    }
}

impl TranscriptRepository for Store {
    async fn append_turn(&self, turn: &ChatTurn) -> Result<()> {
        match self {
            Store::Memory(store) => store.append_turn(turn).await,
            Store::File(store) => store.append_turn(turn).await,
        }
    }
}
