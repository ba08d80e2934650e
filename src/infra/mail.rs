//! Email transports for the contact form.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::Serialize;
use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use crate::application::contact::{ContactMessage, EmailSender, SendError};

/// Records each message as a structured log event.
#[derive(Debug, Clone, Default)]
pub struct LogEmailSender;

#[async_trait]
impl EmailSender for LogEmailSender {
    async fn send(&self, message: &ContactMessage) -> Result<(), SendError> {
        info!(
            target: "folio::contact::mail",
            from_name = %message.name,
            from_email = %message.email,
            length = message.message.chars().count(),
            body = %message.message,
            "contact message received"
        );
        Ok(())
    }
}

/// Writes each message as a JSON file into an outbox directory.
#[derive(Debug, Clone)]
pub struct OutboxEmailSender {
    dir: PathBuf,
}

#[derive(Serialize)]
struct OutboxRecord<'a> {
    id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    received_at: OffsetDateTime,
    #[serde(flatten)]
    message: &'a ContactMessage,
}

impl OutboxEmailSender {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

}

#[async_trait]
impl EmailSender for OutboxEmailSender {
    async fn send(&self, message: &ContactMessage) -> Result<(), SendError> {
        let record = OutboxRecord {
            id: Uuid::new_v4(),
            received_at: OffsetDateTime::now_utc(),
            message,
        };
        let payload = serde_json::to_vec_pretty(&record)
            .map_err(|err| SendError::transport(format!("failed to encode message: {err}")))?;

        tokio::fs::create_dir_all(&self.dir).await.map_err(|err| {
            SendError::transport(format!("outbox {} unavailable: {err}", self.dir.display()))
        })?;

        let path = self.dir.join(format!("{}.json", record.id));
        tokio::fs::write(&path, payload).await.map_err(|err| {
            SendError::transport(format!("failed to write {}: {err}", path.display()))
        })?;

        info!(
            target: "folio::contact::mail",
            message_id = %record.id,
            path = %path.display(),
            "contact message queued in outbox"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message() -> ContactMessage {
        ContactMessage {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            message: "Hello there".to_string(),
        }
    }

    #[tokio::test]
    async fn outbox_writes_one_file_per_message() {
        let dir = tempfile::tempdir().expect("temp dir");
        let outbox = dir.path().join("outbox");
        let sender = OutboxEmailSender::new(&outbox);

        sender.send(&message()).await.expect("first send");
        sender.send(&message()).await.expect("second send");

        let mut files = std::fs::read_dir(&outbox)
            .expect("outbox exists")
            .map(|entry| entry.expect("entry").path())
            .collect::<Vec<_>>();
        files.sort();
        assert_eq!(files.len(), 2);

        let stored: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&files[0]).expect("read")).expect("json");
        assert_eq!(stored["name"], "Ada");
        assert_eq!(stored["email"], "ada@example.com");
        assert!(stored["received_at"].is_string());
    }

    #[tokio::test]
    async fn outbox_reports_unwritable_directory() {
        let dir = tempfile::tempdir().expect("temp dir");
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"not a directory").expect("write");

        let sender = OutboxEmailSender::new(blocker.join("outbox"));
        let err = sender.send(&message()).await.expect_err("must fail");
        assert!(matches!(err, SendError::Transport(_)));
    }

    #[tokio::test]
    async fn log_sender_always_succeeds() {
        assert!(LogEmailSender.send(&message()).await.is_ok());
    }
}
