//! Tarefas e seus resultados.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::new_id;

use super::agent::AgentId;

/// Identificador de tarefa (`task_<uuid>`).
pub type TaskId = String;

/// Prioridade usada quando o cliente não informa uma.
pub const DEFAULT_PRIORITY: i32 = 5;

/// Ciclo de vida de uma tarefa.
///
/// ```text
/// pending ──assign──▶ in-progress ──complete──▶ completed
///    ▲                    │
///    └──── deslocada ─────┤
///                         └──────fail──────▶ failed
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
        }
    }

    /// `pending` ou `in-progress`.
    pub fn is_active(&self) -> bool {
        matches!(self, TaskStatus::Pending | TaskStatus::InProgress)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resultado anexado a uma tarefa concluída ou falha.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TaskResult {
    Summary { success: bool, summary: String },
    Text { text: String },
    Json { value: serde_json::Value },
}

impl TaskResult {
    pub fn text(text: impl Into<String>) -> Self {
        TaskResult::Text { text: text.into() }
    }
}

/// Unidade de trabalho com prioridade, opcionalmente ligada a um agente.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub description: String,
    pub assigned_to: Option<AgentId>,
    pub status: TaskStatus,
    pub priority: i32,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub result: Option<TaskResult>,
    pub timestamp: DateTime<Utc>,
    /// Momento da última ligação a um agente, base do tempo de resposta.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub assigned_at: Option<DateTime<Utc>>,
}

impl Task {
    pub fn new(description: impl Into<String>, priority: i32) -> Self {
        Self {
            id: new_id("task"),
            description: description.into(),
            assigned_to: None,
            status: TaskStatus::Pending,
            priority,
            result: None,
            timestamp: Utc::now(),
            assigned_at: None,
        }
    }

    /// Segundos entre a ligação e `now` (0 se nunca foi ligada).
    pub fn response_secs(&self, now: DateTime<Utc>) -> f64 {
        self.assigned_at
            .map(|at| (now - at).num_milliseconds() as f64 / 1000.0)
            .unwrap_or(0.0)
    }
}
