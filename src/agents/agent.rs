//! # Agent — Trabalhador Autônomo
//!
//! Um [`Agent`] tem um **papel** fixo ([`AgentRole`]), um **estado**
//! comportamental livre ([`AgentState`]), uma lista de capacidades,
//! memória de trabalho e estatísticas de desempenho.
//!
//! ## Estado Sem Guarda
//!
//! `state` é um campo de controle: qualquer estado é alcançável a partir
//! de qualquer outro. Não existe tabela de transições.
//!
//! ## Palavras-Chave por Papel
//!
//! O casamento tarefa↔papel usado na atribuição pontuada e no pedido
//! de ajuda procura estas palavras (sem diferenciar maiúsculas):
//!
//! | Papel | Palavras |
//! |-------|----------|
//! | planner | `plan` |
//! | executor | `execute`, `code` |
//! | monitor | `monitor`, `check` |
//! | learner | `learn` |
//! | coordinator | — |

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::{new_id, Atom, AtomId};

use super::task::TaskId;

/// Identificador de um agente (`agent_<uuid>`).
pub type AgentId = String;

/// Papel de um agente no sistema.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentRole {
    Planner,
    Executor,
    Monitor,
    Learner,
    Coordinator,
}

impl AgentRole {
    pub const ALL: [AgentRole; 5] = [
        AgentRole::Planner,
        AgentRole::Executor,
        AgentRole::Monitor,
        AgentRole::Learner,
        AgentRole::Coordinator,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentRole::Planner => "planner",
            AgentRole::Executor => "executor",
            AgentRole::Monitor => "monitor",
            AgentRole::Learner => "learner",
            AgentRole::Coordinator => "coordinator",
        }
    }

    /// Palavras que, presentes em um texto, indicam este papel.
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            AgentRole::Planner => &["plan"],
            AgentRole::Executor => &["execute", "code"],
            AgentRole::Monitor => &["monitor", "check"],
            AgentRole::Learner => &["learn"],
            AgentRole::Coordinator => &[],
        }
    }

    /// `true` se o texto contém alguma palavra-chave deste papel.
    pub fn matches(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        self.keywords().iter().any(|k| lower.contains(k))
    }

    /// Nome e capacidades do agente semeado para este papel.
    pub fn default_profile(&self) -> (&'static str, &'static [&'static str]) {
        match self {
            AgentRole::Planner => ("Strategic Planner", &["planning", "goal-setting", "strategy"]),
            AgentRole::Executor => (
                "Code Executor",
                &["code-execution", "file-operations", "deployment"],
            ),
            AgentRole::Monitor => ("System Monitor", &["monitoring", "diagnostics", "reporting"]),
            AgentRole::Learner => (
                "Knowledge Learner",
                &["learning", "pattern-recognition", "adaptation"],
            ),
            AgentRole::Coordinator => (
                "Coordination Agent",
                &["coordination", "task-allocation", "communication"],
            ),
        }
    }
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Estado comportamental do agente.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentState {
    Idle,
    Thinking,
    Acting,
    Communicating,
    Learning,
}

impl AgentState {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentState::Idle => "idle",
            AgentState::Thinking => "thinking",
            AgentState::Acting => "acting",
            AgentState::Communicating => "communicating",
            AgentState::Learning => "learning",
        }
    }

    /// Estados em que o agente aceita trabalho novo ou pedidos de ajuda.
    pub fn is_available(&self) -> bool {
        matches!(self, AgentState::Idle | AgentState::Thinking)
    }
}

impl fmt::Display for AgentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Memória do agente.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentMemory {
    /// Cópias de átomos recentes.
    pub short_term: Vec<Atom>,
    /// IDs de átomos em foco — sem repetição, em ordem de chegada.
    pub working_memory: Vec<AtomId>,
    pub goals: Vec<String>,
}

impl AgentMemory {
    /// Acrescenta IDs à memória de trabalho ignorando os já presentes.
    ///
    /// Retorna quantos IDs foram realmente adicionados.
    pub fn remember<'a, I>(&mut self, atom_ids: I) -> usize
    where
        I: IntoIterator<Item = &'a AtomId>,
    {
        let mut added = 0;
        for id in atom_ids {
            if !self.working_memory.contains(id) {
                self.working_memory.push(id.clone());
                added += 1;
            }
        }
        added
    }
}

/// Estatísticas de desempenho.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Performance {
    pub tasks_completed: u32,
    /// `completed / (completed + failed)`, em `[0, 1]`.
    pub success_rate: f64,
    /// Média móvel, em segundos, entre atribuição e conclusão.
    pub avg_response_time: f64,
    #[serde(default)]
    pub tasks_failed: u32,
}

impl Performance {
    /// Registra o desfecho de uma tarefa e recalcula as médias.
    pub fn record(&mut self, success: bool, response_secs: f64) {
        let resolved_before = f64::from(self.tasks_completed + self.tasks_failed);
        if success {
            self.tasks_completed += 1;
        } else {
            self.tasks_failed += 1;
        }
        let resolved = resolved_before + 1.0;
        self.success_rate = f64::from(self.tasks_completed) / resolved;
        self.avg_response_time =
            (self.avg_response_time * resolved_before + response_secs.max(0.0)) / resolved;
    }
}

/// Trabalhador autônomo registrado no [`AgentRegistry`](super::AgentRegistry).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    pub role: AgentRole,
    pub state: AgentState,
    pub capabilities: Vec<String>,
    pub memory: AgentMemory,
    /// Tarefa em andamento. Se presente, a tarefa aponta de volta para este agente.
    pub current_task: Option<TaskId>,
    pub performance: Performance,
    pub timestamp: DateTime<Utc>,
}

impl Agent {
    /// Agente ocioso, com memória vazia e desempenho zerado.
    pub fn new(name: impl Into<String>, role: AgentRole, capabilities: Vec<String>) -> Self {
        Self {
            id: new_id("agent"),
            name: name.into(),
            role,
            state: AgentState::Idle,
            capabilities,
            memory: AgentMemory::default(),
            current_task: None,
            performance: Performance::default(),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_keywords() {
        assert!(AgentRole::Planner.matches("Plan the release"));
        assert!(AgentRole::Executor.matches("execute the build"));
        assert!(AgentRole::Executor.matches("write CODE"));
        assert!(AgentRole::Monitor.matches("check disk usage"));
        assert!(AgentRole::Learner.matches("learn from logs"));
        assert!(!AgentRole::Coordinator.matches("plan and execute"));
        assert!(!AgentRole::Monitor.matches("generate documentation"));
    }

    #[test]
    fn test_new_agent_defaults() {
        let agent = Agent::new("Code Executor", AgentRole::Executor, vec!["deployment".into()]);
        assert_eq!(agent.state, AgentState::Idle);
        assert!(agent.current_task.is_none());
        assert_eq!(agent.performance, Performance::default());
        assert!(agent.memory.working_memory.is_empty());
    }

    #[test]
    fn test_remember_deduplicates() {
        let mut memory = AgentMemory::default();
        let ids: Vec<AtomId> = vec!["x".into(), "y".into(), "x".into()];
        assert_eq!(memory.remember(&ids), 2);
        assert_eq!(memory.remember(&ids), 0);
        assert_eq!(memory.working_memory, vec!["x".to_string(), "y".to_string()]);
    }

    #[test]
    fn test_performance_record() {
        let mut perf = Performance::default();
        perf.record(true, 2.0);
        perf.record(false, 4.0);
        perf.record(true, 0.0);
        assert_eq!(perf.tasks_completed, 2);
        assert_eq!(perf.tasks_failed, 1);
        assert!((perf.success_rate - 2.0 / 3.0).abs() < 1e-9);
        assert!((perf.avg_response_time - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_state_serde_lowercase() {
        assert_eq!(serde_json::to_string(&AgentState::Communicating).unwrap(), "\"communicating\"");
        assert!(AgentState::Thinking.is_available());
        assert!(!AgentState::Acting.is_available());
    }
}
