//! # CognitiveProcess — Atividade Cognitiva de Longa Duração
//!
//! Um [`CognitiveProcess`] acompanha uma atividade nomeada (atenção,
//! raciocínio, aprendizado, planejamento) com um percentual de progresso.
//! Não é um átomo: vive em uma tabela própria da
//! [`KnowledgeStore`](super::KnowledgeStore).
//!
//! ```text
//! ▶ active  ⇄  ⏸ paused
//!     └──────────→ ✓ completed
//! ```
//!
//! As transições não são restringidas — [`ProcessUpdate`] faz merge raso
//! dos campos informados.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::atom::{new_id, AtomId};

/// Identificador de um [CognitiveProcess] (`process_<uuid>`).
pub type ProcessId = String;

/// Tipo de atividade cognitiva.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessKind {
    Attention,
    Reasoning,
    Learning,
    Planning,
}

impl ProcessKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessKind::Attention => "attention",
            ProcessKind::Reasoning => "reasoning",
            ProcessKind::Learning => "learning",
            ProcessKind::Planning => "planning",
        }
    }
}

/// Estado do processo.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessStatus {
    Active,
    Paused,
    Completed,
}

impl ProcessStatus {
    /// Ícone usado pelo console.
    pub fn icon(&self) -> &'static str {
        match self {
            ProcessStatus::Active => "▶",
            ProcessStatus::Paused => "⏸",
            ProcessStatus::Completed => "✓",
        }
    }
}

/// Atividade cognitiva rastreada pela KnowledgeStore.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CognitiveProcess {
    pub id: ProcessId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ProcessKind,
    pub status: ProcessStatus,
    /// Átomos sobre os quais o processo atua.
    #[serde(default)]
    pub target_atoms: Vec<AtomId>,
    /// Progresso de 0 a 100.
    pub progress: u8,
    pub timestamp: DateTime<Utc>,
}

impl CognitiveProcess {
    /// Cria um processo ativo com progresso zero.
    pub fn new(name: impl Into<String>, kind: ProcessKind, target_atoms: Vec<AtomId>) -> Self {
        Self {
            id: new_id("process"),
            name: name.into(),
            kind,
            status: ProcessStatus::Active,
            target_atoms,
            progress: 0,
            timestamp: Utc::now(),
        }
    }

    /// Merge raso: só os campos `Some` são substituídos.
    ///
    /// `progress` acima de 100 é limitado a 100. `id` e `timestamp` nunca mudam.
    pub fn apply(&mut self, update: &ProcessUpdate) {
        if let Some(name) = &update.name {
            self.name = name.clone();
        }
        if let Some(kind) = update.kind {
            self.kind = kind;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(targets) = &update.target_atoms {
            self.target_atoms = targets.clone();
        }
        if let Some(progress) = update.progress {
            self.progress = progress.min(100);
        }
    }
}

/// Atualização parcial de um [`CognitiveProcess`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<ProcessKind>,
    #[serde(default)]
    pub status: Option<ProcessStatus>,
    #[serde(default)]
    pub target_atoms: Option<Vec<AtomId>>,
    #[serde(default)]
    pub progress: Option<u8>,
}

impl ProcessUpdate {
    /// Atalho para atualizar só o progresso.
    pub fn progress(progress: u8) -> Self {
        Self {
            progress: Some(progress),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_process_defaults() {
        let p = CognitiveProcess::new("Logical Inference", ProcessKind::Reasoning, vec![]);
        assert_eq!(p.status, ProcessStatus::Active);
        assert_eq!(p.progress, 0);
        assert!(p.id.starts_with("process_"));
    }

    #[test]
    fn test_apply_is_shallow_merge() {
        let mut p = CognitiveProcess::new("Pattern Recognition", ProcessKind::Learning, vec![]);
        let id = p.id.clone();
        p.apply(&ProcessUpdate {
            status: Some(ProcessStatus::Paused),
            progress: Some(30),
            ..ProcessUpdate::default()
        });
        assert_eq!(p.id, id);
        assert_eq!(p.name, "Pattern Recognition");
        assert_eq!(p.status, ProcessStatus::Paused);
        assert_eq!(p.progress, 30);
    }

    #[test]
    fn test_progress_capped_at_100() {
        let mut p = CognitiveProcess::new("x", ProcessKind::Planning, vec![]);
        p.apply(&ProcessUpdate::progress(250));
        assert_eq!(p.progress, 100);
    }
}
