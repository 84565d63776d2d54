//! # Módulo Core — O AtomSpace
//!
//! Este módulo agrupa os tipos da **base de conhecimento**:
//!
//! - [`TruthValue`] — par strength/confidence de cada átomo
//! - [`Atom`] / [`AtomType`] — nós e links tipados e nomeados
//! - [`CognitiveProcess`] — atividade cognitiva com progresso
//! - [`KnowledgeStore`] — contêiner com índices por tipo e por nome
//! - [`Snapshot`] — documento versionado de exportação/importação
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use crate::core::{AtomType, KnowledgeStore, TruthValueUpdate};
//!
//! let mut store = KnowledgeStore::new();
//! let ts = store.create_atom(AtomType::ConceptNode, "TypeScript", None, None);
//! store.update_truth_value(&ts.id, &TruthValueUpdate { strength: Some(0.9), confidence: None });
//!
//! let payload = store.export_snapshot()?;
//! let mut copia = KnowledgeStore::new();
//! assert!(copia.import_snapshot(&payload));
//! ```

/// Grau de verdade e atualização parcial.
pub mod truth_value;

/// Átomos, tipos de átomo e metadados.
pub mod atom;

/// Processos cognitivos.
pub mod process;

/// A store e seus índices.
pub mod knowledge_store;

/// Exportação/importação versionada.
pub mod snapshot;

pub use atom::{new_id, Atom, AtomId, AtomType, AtomTypeParseError, MetaValue, Metadata};
pub use knowledge_store::{FileEntry, FileKind, KnowledgeStore, SharedStore, StoreStatistics};
pub use process::{CognitiveProcess, ProcessId, ProcessKind, ProcessStatus, ProcessUpdate};
pub use snapshot::{ImportSummary, Snapshot, SnapshotError, SNAPSHOT_VERSION};
pub use truth_value::{TruthValue, TruthValueUpdate};
