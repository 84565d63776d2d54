//! # Estado da Aplicação Web
//!
//! [`AppState`] é clonado para cada handler Axum. Tudo dentro dele é
//! `Arc`, então o clone é barato.
//!
//! ```text
//! AppState
//!  ├── orchestrator ──▶ registry / scheduler / collaborations (+ canal de eventos)
//!  │        └── store ──▶ Arc<RwLock<KnowledgeStore>>
//!  ├── storage      ──▶ dyn SnapshotStorage (disco ou memória)
//!  └── console      ──▶ Mutex<Console> (histórico compartilhado)
//! ```

use std::sync::Arc;

use parking_lot::Mutex;

use crate::console::{Console, ConsoleContext};
use crate::core::SharedStore;
use crate::orchestrator::SharedOrchestrator;
use crate::persistence::{self, SnapshotStorage};

/// Estado compartilhado da aplicação Axum.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: SharedOrchestrator,
    pub storage: Arc<dyn SnapshotStorage>,
    pub console: Arc<Mutex<Console>>,
    /// Chave do snapshot salvo pelo autosave.
    pub snapshot_key: String,
    /// Salva o snapshot após cada mutação da store.
    pub autosave: bool,
}

impl AppState {
    pub fn store(&self) -> &SharedStore {
        self.orchestrator.store()
    }

    pub fn console_context(&self) -> ConsoleContext {
        ConsoleContext {
            orchestrator: self.orchestrator.clone(),
            storage: self.storage.clone(),
            snapshot_key: self.snapshot_key.clone(),
            autosave: self.autosave,
        }
    }

    /// Persiste a store se o autosave estiver ligado. Falhas só geram log.
    pub fn autosave(&self) {
        if !self.autosave {
            return;
        }
        persistence::autosave_store(self.store(), self.storage.as_ref(), &self.snapshot_key);
    }
}
