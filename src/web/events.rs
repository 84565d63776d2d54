//! # Eventos SSE da Orquestração
//!
//! Define o enum [`OrchestrationEvent`]: tudo o que o
//! [`Orchestrator`](crate::orchestrator::Orchestrator) e os handlers de
//! persistência publicam no canal broadcast, enviado em tempo real aos
//! clientes de `GET /events`.
//!
//! ## Ciclo de Vida de uma Tarefa
//!
//! ```text
//! TaskCreated → [TaskAssigned]* → TaskCompleted
//!                              ou → TaskFailed
//! ```
//!
//! ## Serialização
//!
//! Usa `#[serde(tag = "type")]` para produzir JSON com discriminador:
//!
//! ```json
//! { "type": "TaskAssigned", "task_id": "task_...", "agent_id": "agent_..." }
//! ```

use serde::Serialize;

use crate::agents::{AgentRole, MessageKind};

/// Evento de orquestração enviado via SSE.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum OrchestrationEvent {
    AgentCreated {
        id: String,
        name: String,
        role: AgentRole,
    },

    /// Tarefa criada. `assigned_to` vem preenchido se a atribuição ingênua achou alguém.
    TaskCreated {
        id: String,
        description: String,
        priority: i32,
        assigned_to: Option<String>,
    },

    TaskAssigned {
        task_id: String,
        agent_id: String,
    },

    TaskCompleted {
        task_id: String,
        agent_id: String,
    },

    TaskFailed {
        task_id: String,
        agent_id: String,
        reason: Option<String>,
    },

    MessageSent {
        id: String,
        from: String,
        to: String,
        kind: MessageKind,
    },

    CollaborationOpened {
        id: String,
        goal: String,
        participants: Vec<String>,
    },

    CollaborationClosed {
        id: String,
        success: bool,
    },

    /// Orquestração ligada ou desligada; todos os agentes voltaram a `idle`.
    OrchestrationToggled {
        active: bool,
    },

    /// A KnowledgeStore foi esvaziada.
    StoreReset,

    SnapshotImported {
        atoms: usize,
        processes: usize,
    },
}

impl OrchestrationEvent {
    /// Nome do evento SSE (campo `event:`).
    pub fn name(&self) -> &'static str {
        match self {
            OrchestrationEvent::AgentCreated { .. } => "agent",
            OrchestrationEvent::TaskCreated { .. }
            | OrchestrationEvent::TaskAssigned { .. }
            | OrchestrationEvent::TaskCompleted { .. }
            | OrchestrationEvent::TaskFailed { .. } => "task",
            OrchestrationEvent::MessageSent { .. } => "message",
            OrchestrationEvent::CollaborationOpened { .. }
            | OrchestrationEvent::CollaborationClosed { .. } => "collaboration",
            OrchestrationEvent::OrchestrationToggled { .. } => "orchestration",
            OrchestrationEvent::StoreReset | OrchestrationEvent::SnapshotImported { .. } => "store",
        }
    }
}
