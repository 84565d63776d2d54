//! # Mensagens entre Agentes
//!
//! Toda [`Message`] é imutável depois de criada. Ela vai para o log global
//! do [`CollaborationManager`](super::CollaborationManager) e/ou para a lista
//! de mensagens de uma colaboração.
//!
//! O conteúdo é uma soma fechada de formatos conhecidos ([`MessageContent`])
//! com uma variante `Json` para o resto.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::{new_id, AtomId};

use super::collaboration::CollaborationId;

/// Remetente reservado para mensagens geradas pelo próprio sistema.
pub const SYSTEM_SENDER: &str = "system";

/// Destinatário reservado para mensagens de difusão.
pub const BROADCAST: &str = "broadcast";

pub type MessageId = String;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Request,
    Response,
    Broadcast,
    Notification,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Request => "request",
            MessageKind::Response => "response",
            MessageKind::Broadcast => "broadcast",
            MessageKind::Notification => "notification",
        }
    }
}

/// Conteúdo tipado de uma mensagem.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MessageContent {
    Text {
        text: String,
    },
    HelpRequest {
        help_type: String,
        context: String,
    },
    KnowledgeShared {
        atom_ids: Vec<AtomId>,
    },
    CollaborationClosed {
        collaboration_id: CollaborationId,
        goal: String,
        success: bool,
    },
    Json {
        value: serde_json::Value,
    },
}

impl MessageContent {
    pub fn text(text: impl Into<String>) -> Self {
        MessageContent::Text { text: text.into() }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub from: String,
    pub to: String,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub content: MessageContent,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        kind: MessageKind,
        content: MessageContent,
    ) -> Self {
        Self {
            id: new_id("msg"),
            from: from.into(),
            to: to.into(),
            kind,
            content,
            timestamp: Utc::now(),
        }
    }

    /// `true` se a mensagem foi gerada pelo sistema.
    pub fn is_system(&self) -> bool {
        self.from == SYSTEM_SENDER
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_wire_shape() {
        let msg = Message::new(
            SYSTEM_SENDER,
            BROADCAST,
            MessageKind::Notification,
            MessageContent::KnowledgeShared { atom_ids: vec!["x".into()] },
        );
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["type"], "notification");
        assert_eq!(value["content"]["kind"], "knowledge_shared");
        assert_eq!(value["content"]["atom_ids"][0], "x");
        assert!(msg.is_system());
    }

    #[test]
    fn test_content_parses_from_json() {
        let content: MessageContent =
            serde_json::from_str(r#"{"kind":"text","text":"olá"}"#).unwrap();
        assert_eq!(content, MessageContent::text("olá"));
    }
}
