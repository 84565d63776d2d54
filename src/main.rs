//! # CogSpace — AtomSpace + Orquestração de Agentes
//!
//! **Ponto de entrada** da aplicação: monta a KnowledgeStore, o
//! orquestrador multiagente, o console e a API HTTP.
//!
//! ## Fluxo de Inicialização
//!
//! ```text
//! main()
//!   ├── Configura tracing/logging (RUST_LOG)
//!   ├── Config::from_env()
//!   ├── FileStorage(<data_dir>) → carrega o snapshot salvo (ou store vazia)
//!   ├── Cria broadcast channel para SSE
//!   ├── Orchestrator (+ cinco agentes padrão, se configurado)
//!   ├── Console com os comandos padrão
//!   └── Monta AppState e Router → axum::serve
//! ```
//!
//! ## Exemplo de Uso
//!
//! ```bash
//! RUST_LOG=debug COGSPACE_ADDR=127.0.0.1:8080 cargo run
//! ```

/// Módulo `core` — átomos, TruthValue, processos, KnowledgeStore e snapshots.
mod core;

/// Módulo `agents` — agentes, tarefas, mensagens e colaborações.
mod agents;

/// Módulo `orchestrator` — fachada concorrente sobre os agentes e a store.
mod orchestrator;

/// Módulo `persistence` — armazenamento chave → snapshot JSON.
mod persistence;

/// Módulo `config` — configuração via variáveis de ambiente.
mod config;

/// Módulo `console` — terminal de comandos.
mod console;

/// Módulo `web` — API JSON, SSE e estado compartilhado.
mod web;

use std::sync::Arc;

use anyhow::{Context, Result};
use parking_lot::{Mutex, RwLock};
use tokio::sync::broadcast;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::console::Console;
use crate::core::KnowledgeStore;
use crate::orchestrator::Orchestrator;
use crate::persistence::{FileStorage, SnapshotStorage};
use crate::web::events::OrchestrationEvent;
use crate::web::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("🧠 CogSpace — Starting...");

    let config = Config::from_env();
    let storage: Arc<dyn SnapshotStorage> = Arc::new(FileStorage::new(&config.data_dir));

    // Snapshot ausente ou inválido: segue com a store vazia.
    let store = Arc::new(RwLock::new(KnowledgeStore::new()));
    match persistence::load_store(&store, storage.as_ref(), &config.snapshot_key) {
        Ok(true) => {
            let store = store.read();
            tracing::info!(
                atoms = store.atom_count(),
                processes = store.process_count(),
                "Snapshot carregado do disco"
            );
        }
        Ok(false) => tracing::info!(key = %config.snapshot_key, "Nenhum snapshot salvo, iniciando vazia"),
        Err(e) => tracing::warn!(error = %e, "Falha ao carregar snapshot, iniciando vazia"),
    }

    // Capacidade de 256 eventos — assinantes lentos perdem os mais antigos.
    let (events_tx, _) = broadcast::channel::<OrchestrationEvent>(256);
    let orchestrator = Arc::new(Orchestrator::new(store, events_tx));
    if config.seed_agents {
        let seeded = orchestrator.seed_default_agents();
        tracing::info!(agents = seeded, "Agentes padrão criados");
    }

    let console = Console::new().context("falha ao montar o console")?;

    let state = AppState {
        orchestrator,
        storage,
        console: Arc::new(Mutex::new(console)),
        snapshot_key: config.snapshot_key.clone(),
        autosave: config.autosave,
    };

    let app = web::create_router(state);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("falha ao escutar em {}", config.addr))?;
    tracing::info!(addr = %config.addr, "🚀 Server running");

    axum::serve(listener, app).await?;

    Ok(())
}
