//! # Snapshot — Exportação e Importação da KnowledgeStore
//!
//! Serializa a store como um documento JSON versionado:
//!
//! ```json
//! {
//!   "version": "1.0",
//!   "timestamp": "2026-10-19T12:00:00Z",
//!   "atoms": [ ... ],
//!   "processes": [ ... ],
//!   "file_atom_map": { "/src/main.rs": "atom_..." },
//!   "metadata": { "total_atoms": 8, "total_processes": 3, "atom_types": ["ConceptNode", ...] }
//! }
//! ```
//!
//! ## Regras do Import
//!
//! 1. A store é **sempre** esvaziada primeiro (`clear()`)
//! 2. JSON malformado → `false`, store continua vazia
//! 3. Versão diferente → apenas `warn`, o import segue
//! 4. Átomos e processos são carregados em lote e os índices são
//!    **reconstruídos do zero** — o documento não carrega índices
//!
//! Como tudo acontece em um único `&mut self`, quem segura a trava da
//! store enxerga o antes ou o depois, nunca o meio do caminho.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::atom::{Atom, AtomId, AtomType};
use super::knowledge_store::KnowledgeStore;
use super::process::CognitiveProcess;

/// Versão atual do formato de snapshot.
pub const SNAPSHOT_VERSION: &str = "1.0";

/// Falhas de exportação/importação de snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("snapshot malformado: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("snapshot inconsistente: {reason}")]
    Inconsistent { reason: String },
}

/// Sumário calculado no momento da exportação.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    pub total_atoms: usize,
    pub total_processes: usize,
    /// Tipos distintos presentes, em ordem de declaração.
    pub atom_types: Vec<AtomType>,
}

/// Documento de snapshot completo.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub atoms: Vec<Atom>,
    pub processes: Vec<CognitiveProcess>,
    #[serde(default)]
    pub file_atom_map: BTreeMap<String, AtomId>,
    pub metadata: SnapshotMetadata,
}

/// Resultado de um import bem-sucedido.
#[derive(Clone, Debug, PartialEq)]
pub struct ImportSummary {
    pub atoms: usize,
    pub processes: usize,
    /// `true` quando a versão do documento diferia da atual.
    pub version_mismatch: bool,
}

impl KnowledgeStore {
    /// Monta o documento de snapshot a partir do estado atual.
    pub fn to_snapshot(&self) -> Snapshot {
        let stats = self.statistics();
        Snapshot {
            version: SNAPSHOT_VERSION.to_string(),
            timestamp: Utc::now(),
            atoms: self.atoms.clone(),
            processes: self.processes.clone(),
            file_atom_map: self.file_atom_map.clone(),
            metadata: SnapshotMetadata {
                total_atoms: stats.total_atoms,
                total_processes: stats.total_processes,
                atom_types: stats.per_type_counts.keys().copied().collect(),
            },
        }
    }

    /// Exporta a store como JSON pretty-printed.
    pub fn export_snapshot(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(&self.to_snapshot())?)
    }

    /// Importa um snapshot, substituindo todo o conteúdo da store.
    ///
    /// Retorna `true` em caso de sucesso. Em caso de falha a store fica vazia.
    pub fn import_snapshot(&mut self, payload: &str) -> bool {
        match self.try_import_snapshot(payload) {
            Ok(summary) => {
                tracing::info!(
                    atoms = summary.atoms,
                    processes = summary.processes,
                    "store: snapshot importado"
                );
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "store: falha ao importar snapshot, store permanece vazia");
                false
            }
        }
    }

    /// Versão detalhada de [`import_snapshot()`](Self::import_snapshot).
    pub fn try_import_snapshot(&mut self, payload: &str) -> Result<ImportSummary, SnapshotError> {
        self.clear();

        let snapshot: Snapshot = serde_json::from_str(payload)?;
        let version_mismatch = snapshot.version != SNAPSHOT_VERSION;
        if version_mismatch {
            tracing::warn!(
                found = %snapshot.version,
                expected = SNAPSHOT_VERSION,
                "store: versão de snapshot diferente, importando mesmo assim"
            );
        }
        check_unique_ids(&snapshot)?;

        self.load_snapshot(snapshot);
        Ok(ImportSummary {
            atoms: self.atom_count(),
            processes: self.process_count(),
            version_mismatch,
        })
    }

    /// Carga em lote seguida da reconstrução dos índices.
    fn load_snapshot(&mut self, snapshot: Snapshot) {
        self.atoms = snapshot.atoms;
        self.processes = snapshot.processes;
        self.file_atom_map = snapshot.file_atom_map;
        self.rebuild_indexes();
    }
}

/// IDs repetidos quebrariam a correspondência posição↔ID dos índices.
fn check_unique_ids(snapshot: &Snapshot) -> Result<(), SnapshotError> {
    let mut seen = std::collections::HashSet::new();
    if let Some(dup) = snapshot.atoms.iter().find(|a| !seen.insert(a.id.as_str())) {
        return Err(SnapshotError::Inconsistent {
            reason: format!("átomo duplicado {}", dup.id),
        });
    }
    let mut seen = std::collections::HashSet::new();
    if let Some(dup) = snapshot.processes.iter().find(|p| !seen.insert(p.id.as_str())) {
        return Err(SnapshotError::Inconsistent {
            reason: format!("processo duplicado {}", dup.id),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Metadata, ProcessKind, ProcessUpdate, TruthValueUpdate};

    fn populated_store() -> KnowledgeStore {
        let mut store = KnowledgeStore::new();
        let web = store.create_atom(AtomType::ConceptNode, "Web Development", None, None);
        let mut meta = Metadata::new();
        meta.insert("category".into(), "technology".into());
        let react = store.create_atom(AtomType::ConceptNode, "React Framework", None, Some(meta));
        store.create_atom(
            AtomType::InheritanceLink,
            "React inherits from Web Development",
            Some(vec![react.id.clone(), web.id.clone()]),
            None,
        );
        store.update_truth_value(&react.id, &TruthValueUpdate { strength: Some(0.7), confidence: None });
        let p = store.create_process("Attention Allocation", ProcessKind::Attention, vec![web.id.clone()]);
        store.update_process(&p.id, &ProcessUpdate::progress(25));
        store.link_file_to_atom("/web", web.id);
        store
    }

    /// import(export()) reproduz átomos, processos e índices
    #[test]
    fn test_round_trip_reproduces_store() {
        let original = populated_store();
        let payload = original.export_snapshot().unwrap();

        let mut restored = KnowledgeStore::new();
        restored.create_atom(AtomType::VariableNode, "lixo anterior", None, None);
        assert!(restored.import_snapshot(&payload));

        assert_eq!(restored.all_atoms(), original.all_atoms());
        assert_eq!(restored.all_processes(), original.all_processes());
        for t in AtomType::ALL {
            assert_eq!(restored.type_index(t), original.type_index(t), "tipo {t}");
        }
        assert_eq!(restored.statistics(), original.statistics());
        assert!(restored.find_atom_by_name("lixo anterior").is_none());
        assert!(restored.find_atom_by_name("React Framework").is_some());
    }

    #[test]
    fn test_export_metadata_summary() {
        let store = populated_store();
        let snapshot = store.to_snapshot();
        assert_eq!(snapshot.version, SNAPSHOT_VERSION);
        assert_eq!(snapshot.metadata.total_atoms, 3);
        assert_eq!(snapshot.metadata.total_processes, 1);
        assert_eq!(
            snapshot.metadata.atom_types,
            vec![AtomType::ConceptNode, AtomType::InheritanceLink]
        );
    }

    /// JSON malformado: retorna false e deixa a store vazia
    #[test]
    fn test_malformed_import_leaves_store_cleared() {
        let mut store = populated_store();
        assert!(!store.import_snapshot("{ not json"));
        assert_eq!(store.atom_count(), 0);
        assert_eq!(store.process_count(), 0);
        assert!(store.type_index(AtomType::ConceptNode).is_empty());
    }

    /// Versão diferente gera apenas aviso
    #[test]
    fn test_version_mismatch_is_tolerated() {
        let store = populated_store();
        let mut snapshot = store.to_snapshot();
        snapshot.version = "0.9".into();
        let payload = serde_json::to_string(&snapshot).unwrap();

        let mut restored = KnowledgeStore::new();
        let summary = restored.try_import_snapshot(&payload).unwrap();
        assert!(summary.version_mismatch);
        assert_eq!(summary.atoms, 3);
    }

    /// Índices vêm sempre da reconstrução, nunca do documento
    #[test]
    fn test_import_rebuilds_indexes_from_atoms() {
        let mut store = KnowledgeStore::new();
        let a = store.create_atom(AtomType::PredicateNode, "has-feature", None, None);
        let mut snapshot = store.to_snapshot();
        // metadados mentirosos não afetam o índice
        snapshot.metadata.atom_types = vec![AtomType::ExecutionLink];
        let payload = serde_json::to_string(&snapshot).unwrap();

        let mut restored = KnowledgeStore::new();
        assert!(restored.import_snapshot(&payload));
        assert_eq!(restored.type_index(AtomType::PredicateNode), &[a.id.clone()]);
        assert!(restored.type_index(AtomType::ExecutionLink).is_empty());
        assert_eq!(restored.find_atom_by_name("has-feature").map(|x| &x.id), Some(&a.id));
    }

    #[test]
    fn test_duplicate_atom_ids_rejected() {
        let store = populated_store();
        let mut snapshot = store.to_snapshot();
        let dup = snapshot.atoms[0].clone();
        snapshot.atoms.push(dup);
        let payload = serde_json::to_string(&snapshot).unwrap();

        let mut restored = KnowledgeStore::new();
        assert!(!restored.import_snapshot(&payload));
        assert_eq!(restored.atom_count(), 0);
    }
}
