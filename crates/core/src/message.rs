//! Boundary messages and their dispatch.
//!
//! Messages arrive tagged by `type`, e.g.
//! `{"type": "CACHE_MARKDOWN", "url": "...", "markdown": "..."}`. The source
//! tab id is supplied by the transport, not the payload.

use serde::{Deserialize, Serialize};

use crate::Error;
use crate::export::SessionExport;
use crate::session::SessionCache;
use crate::writer::AppendOutcome;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Message {
    StartSession,
    StopSession,
    DownloadSession,
    OpenEditor,
    CacheMarkdown { url: String, markdown: String },
}

/// What handling a message did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MessageOutcome {
    Started,
    Stopped,
    Exported { export: Option<SessionExport> },
    Cached { result: AppendOutcome },
    /// Presentation-only message with no effect on session state.
    Ignored,
}

impl SessionCache {
    /// Route one message to the matching operation.
    pub async fn handle(&self, message: Message, source_tab: Option<u32>) -> Result<MessageOutcome, Error> {
        match message {
            Message::StartSession => self.start().await.map(|()| MessageOutcome::Started),
            Message::StopSession => self.stop().await.map(|()| MessageOutcome::Stopped),
            Message::DownloadSession => Ok(MessageOutcome::Exported { export: self.export().await? }),
            Message::CacheMarkdown { url, markdown } => {
                let result = self.append(&url, &markdown, source_tab).await?;
                Ok(MessageOutcome::Cached { result })
            }
            Message::OpenEditor => Ok(MessageOutcome::Ignored),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::tests::fixture;
    use crate::writer::RejectReason;
    use serde_json::json;

    #[test]
    fn test_message_wire_format() {
        let msg: Message = serde_json::from_value(json!({"type": "START_SESSION"})).unwrap();
        assert_eq!(msg, Message::StartSession);

        let msg: Message = serde_json::from_value(json!({
            "type": "CACHE_MARKDOWN",
            "url": "https://example.com",
            "markdown": "# Hi"
        }))
        .unwrap();
        assert_eq!(msg, Message::CacheMarkdown { url: "https://example.com".into(), markdown: "# Hi".into() });

        assert!(serde_json::from_value::<Message>(json!({"type": "DEACTIVATE"})).is_err());
    }

    #[tokio::test]
    async fn test_handle_lifecycle() {
        let f = fixture();

        assert_eq!(f.cache.handle(Message::StartSession, None).await.unwrap(), MessageOutcome::Started);

        let cached = f
            .cache
            .handle(Message::CacheMarkdown { url: "https://a.com".into(), markdown: "# A".into() }, Some(3))
            .await
            .unwrap();
        assert_eq!(cached, MessageOutcome::Cached { result: AppendOutcome::Stored { pages_count: 1 } });

        let no_tab = f
            .cache
            .handle(Message::CacheMarkdown { url: "https://b.com".into(), markdown: "# B".into() }, None)
            .await
            .unwrap();
        assert_eq!(
            no_tab,
            MessageOutcome::Cached { result: AppendOutcome::Rejected { reason: RejectReason::MissingTab } }
        );

        let MessageOutcome::Exported { export: Some(export) } =
            f.cache.handle(Message::DownloadSession, None).await.unwrap()
        else {
            panic!("expected an export");
        };
        assert_eq!(export.page_count, 1);

        assert_eq!(f.cache.handle(Message::StopSession, None).await.unwrap(), MessageOutcome::Stopped);
        assert_eq!(f.cache.handle(Message::OpenEditor, None).await.unwrap(), MessageOutcome::Ignored);
        assert!(!f.cache.snapshot().await.unwrap().active);
    }
}
