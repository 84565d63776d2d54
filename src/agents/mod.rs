//! # Módulo Agents — Orquestração Multiagente
//!
//! Três coleções, cada uma com um único dono:
//!
//! | Coleção | Dono | Guarda |
//! |---------|------|--------|
//! | agentes | [`AgentRegistry`] | [`Agent`] |
//! | tarefas | [`TaskScheduler`] | [`Task`] |
//! | mensagens e sessões | [`CollaborationManager`] | [`Message`], [`Collaboration`] |
//!
//! As estruturas não têm travas próprias. O
//! [`Orchestrator`](crate::orchestrator::Orchestrator) envolve cada uma em
//! seu `RwLock` e empresta o registro às outras duas quando uma operação
//! precisa mexer em agentes.
//!
//! ```text
//! TaskScheduler ──&mut AgentRegistry──▶ liga/libera agentes
//! CollaborationManager ──&mut AgentRegistry──▶ estado communicating, memória
//! AgentRegistry ──AgentListener──▶ KnowledgeStore (processo "Agent: <nome>")
//! ```

pub mod agent;
pub mod collaboration;
pub mod message;
pub mod registry;
pub mod scheduler;
pub mod task;

pub use agent::{Agent, AgentId, AgentMemory, AgentRole, AgentState, Performance};
pub use collaboration::{
    Collaboration, CollaborationEffectiveness, CollaborationId, CollaborationManager,
    CollaborationStatus, HelpOutcome,
};
pub use message::{Message, MessageContent, MessageId, MessageKind, BROADCAST, SYSTEM_SENDER};
pub use registry::{AgentListener, AgentRegistry};
pub use scheduler::{score, AgentStats, TaskScheduler};
pub use task::{Task, TaskId, TaskResult, TaskStatus, DEFAULT_PRIORITY};
