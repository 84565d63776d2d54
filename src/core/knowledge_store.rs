//! # KnowledgeStore — O AtomSpace em Memória
//!
//! A [`KnowledgeStore`] é o contêiner central de conhecimento: armazena
//! os [`Atom`]s, os [`CognitiveProcess`]es e a tabela arquivo→átomo, e
//! mantém dois índices secundários para busca rápida.
//!
//! ## Armazenamento
//!
//! - **Átomos**: `Vec<Atom>` em ordem de criação + posição por ID
//! - **Índice por tipo**: `HashMap<AtomType, Vec<AtomId>>` — "quais átomos são ConceptNode?"
//! - **Índice por nome**: `HashMap<String, AtomId>` — último escritor vence
//! - **Processos**: `Vec<CognitiveProcess>` em ordem de criação + posição por ID
//! - **Arquivos**: `BTreeMap<caminho, AtomId>`
//!
//! Os índices **nunca** são serializados. Após importar um snapshot eles são
//! reconstruídos do zero por [`rebuild_indexes()`](KnowledgeStore::rebuild_indexes).
//!
//! ## Concorrência
//!
//! A store não tem trava interna: o dono a envolve em `Arc<RwLock<KnowledgeStore>>`
//! ([`SharedStore`]). Cada operação `&mut self` é, portanto, atômica para
//! os leitores — inclusive `clear()` seguido de carga em lote no import.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use crate::core::{AtomType, KnowledgeStore};
//!
//! let mut store = KnowledgeStore::new();
//! let react = store.create_atom(AtomType::ConceptNode, "React Framework", None, None);
//! let web = store.create_atom(AtomType::ConceptNode, "Web Development", None, None);
//! store.create_atom(
//!     AtomType::InheritanceLink,
//!     "React inherits from Web Development",
//!     Some(vec![react.id.clone(), web.id.clone()]),
//!     None,
//! );
//! assert_eq!(store.get_atoms_by_type(AtomType::ConceptNode).len(), 2);
//! ```

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use super::atom::{Atom, AtomId, AtomType, MetaValue, Metadata};
use super::process::{CognitiveProcess, ProcessId, ProcessKind, ProcessStatus, ProcessUpdate};
use super::truth_value::TruthValueUpdate;

/// Handle compartilhado da store, como o servidor e o orquestrador a enxergam.
pub type SharedStore = Arc<RwLock<KnowledgeStore>>;

/// Tipo de entrada sincronizada por [`KnowledgeStore::sync_files()`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    File,
    Folder,
}

impl FileKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileKind::File => "file",
            FileKind::Folder => "folder",
        }
    }
}

/// Arquivo ou pasta do workspace a ser representado no AtomSpace.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FileEntry {
    pub path: String,
    pub kind: FileKind,
    /// Conteúdo do arquivo (pastas não têm).
    #[serde(default)]
    pub content: Option<String>,
}

/// Estatísticas agregadas da store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoreStatistics {
    pub total_atoms: usize,
    pub total_processes: usize,
    /// Contagem por tipo — só tipos com ao menos um átomo.
    pub per_type_counts: BTreeMap<AtomType, usize>,
    pub active_process_count: usize,
    /// Média de `truth_value.strength` (0 com a store vazia).
    pub average_truth_strength: f64,
    pub files_mapped: usize,
}

/// AtomSpace em memória — átomos, processos, índices e tabela de arquivos.
#[derive(Debug, Default)]
pub struct KnowledgeStore {
    /// Coleção primária, em ordem de criação.
    pub(super) atoms: Vec<Atom>,
    /// Processos, em ordem de criação.
    pub(super) processes: Vec<CognitiveProcess>,
    /// Caminho de arquivo → átomo que o representa.
    pub(super) file_atom_map: BTreeMap<String, AtomId>,

    atom_positions: HashMap<AtomId, usize>,
    process_positions: HashMap<ProcessId, usize>,
    by_type: HashMap<AtomType, Vec<AtomId>>,
    by_name: HashMap<String, AtomId>,
}

impl KnowledgeStore {
    /// Cria uma store vazia.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cria um átomo novo com verdade `⟨1.0, 1.0⟩` e atualiza os dois índices.
    ///
    /// Nunca falha. Se o nome já existir, o índice por nome passa a apontar
    /// para o átomo novo (último escritor vence).
    pub fn create_atom(
        &mut self,
        atom_type: AtomType,
        name: impl Into<String>,
        outgoing: Option<Vec<AtomId>>,
        metadata: Option<Metadata>,
    ) -> Atom {
        let atom = Atom::new(atom_type, name, outgoing, metadata);
        tracing::debug!(id = %atom.id, atom_type = %atom.atom_type, name = %atom.name, "store: átomo criado");
        self.index_atom(&atom, self.atoms.len());
        self.atoms.push(atom.clone());
        atom
    }

    /// Registra um átomo em todos os índices, na posição informada.
    fn index_atom(&mut self, atom: &Atom, position: usize) {
        self.atom_positions.insert(atom.id.clone(), position);
        self.by_type
            .entry(atom.atom_type)
            .or_default()
            .push(atom.id.clone());
        self.by_name.insert(atom.name.clone(), atom.id.clone());
    }

    /// Reconstrói do zero os índices a partir das coleções primárias.
    ///
    /// É o algoritmo oficial de reconstrução: roda a cada import de snapshot,
    /// percorrendo os átomos em ordem. Nenhum índice vem do snapshot.
    pub fn rebuild_indexes(&mut self) {
        self.atom_positions.clear();
        self.by_type.clear();
        self.by_name.clear();
        let atoms = std::mem::take(&mut self.atoms);
        for (position, atom) in atoms.iter().enumerate() {
            self.index_atom(atom, position);
        }
        self.atoms = atoms;

        self.process_positions = self
            .processes
            .iter()
            .enumerate()
            .map(|(position, p)| (p.id.clone(), position))
            .collect();
    }

    /// Busca um átomo pelo ID.
    pub fn get_atom(&self, id: &str) -> Option<&Atom> {
        self.atom_positions.get(id).map(|&pos| &self.atoms[pos])
    }

    /// Busca um átomo pelo nome, via índice por nome.
    pub fn find_atom_by_name(&self, name: &str) -> Option<&Atom> {
        self.by_name.get(name).and_then(|id| self.get_atom(id))
    }

    /// Todos os átomos de um tipo, em ordem de criação.
    ///
    /// Tipo sem átomos → vetor vazio, nunca erro.
    pub fn get_atoms_by_type(&self, atom_type: AtomType) -> Vec<&Atom> {
        self.by_type
            .get(&atom_type)
            .map(|ids| ids.iter().filter_map(|id| self.get_atom(id)).collect())
            .unwrap_or_default()
    }

    /// IDs indexados para um tipo (conteúdo bruto do índice).
    pub fn type_index(&self, atom_type: AtomType) -> &[AtomId] {
        self.by_type
            .get(&atom_type)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Todos os átomos, em ordem de criação.
    pub fn all_atoms(&self) -> &[Atom] {
        &self.atoms
    }

    /// Merge parcial no grau de verdade de um átomo.
    ///
    /// Retorna `false` (e não faz nada) se o ID não existir.
    pub fn update_truth_value(&mut self, id: &str, update: &TruthValueUpdate) -> bool {
        let Some(&pos) = self.atom_positions.get(id) else {
            return false;
        };
        let atom = &mut self.atoms[pos];
        atom.truth_value.merge(update);
        tracing::debug!(id = %id, truth = %atom.truth_value, "store: verdade atualizada");
        true
    }

    /// Substitui os metadados de um átomo. `false` se o ID não existir.
    pub fn set_metadata(&mut self, id: &str, metadata: Option<Metadata>) -> bool {
        let Some(&pos) = self.atom_positions.get(id) else {
            return false;
        };
        self.atoms[pos].metadata = metadata;
        true
    }

    /// Cria um processo cognitivo ativo, com progresso zero.
    pub fn create_process(
        &mut self,
        name: impl Into<String>,
        kind: ProcessKind,
        target_atoms: Vec<AtomId>,
    ) -> CognitiveProcess {
        let process = CognitiveProcess::new(name, kind, target_atoms);
        tracing::debug!(id = %process.id, name = %process.name, kind = process.kind.as_str(), "store: processo criado");
        self.process_positions
            .insert(process.id.clone(), self.processes.len());
        self.processes.push(process.clone());
        process
    }

    /// Merge raso em um processo. `false` se o ID não existir.
    pub fn update_process(&mut self, id: &str, update: &ProcessUpdate) -> bool {
        let Some(&pos) = self.process_positions.get(id) else {
            return false;
        };
        self.processes[pos].apply(update);
        true
    }

    pub fn get_process(&self, id: &str) -> Option<&CognitiveProcess> {
        self.process_positions
            .get(id)
            .map(|&pos| &self.processes[pos])
    }

    /// Todos os processos, em ordem de criação.
    pub fn all_processes(&self) -> &[CognitiveProcess] {
        &self.processes
    }

    /// Associa um caminho de arquivo a um átomo.
    pub fn link_file_to_atom(&mut self, path: impl Into<String>, atom_id: impl Into<AtomId>) {
        self.file_atom_map.insert(path.into(), atom_id.into());
    }

    /// Átomo associado a um caminho, se houver.
    pub fn atom_for_file(&self, path: &str) -> Option<&AtomId> {
        self.file_atom_map.get(path)
    }

    /// Sincroniza arquivos e pastas com o AtomSpace.
    ///
    /// Para cada caminho ainda não mapeado, cria um `ConceptNode` com nome
    /// igual ao caminho e metadados `file_type` (e `content` para arquivos).
    /// Caminhos já mapeados são ignorados. Retorna quantos átomos foram criados.
    pub fn sync_files<I>(&mut self, entries: I) -> usize
    where
        I: IntoIterator<Item = FileEntry>,
    {
        let mut created = 0;
        for entry in entries {
            if self.file_atom_map.contains_key(&entry.path) {
                continue;
            }
            let mut metadata = Metadata::new();
            metadata.insert("file_type".into(), entry.kind.as_str().into());
            if entry.kind == FileKind::File {
                if let Some(content) = entry.content {
                    metadata.insert("content".into(), MetaValue::Text(content));
                }
            }
            let atom = self.create_atom(AtomType::ConceptNode, entry.path.clone(), None, Some(metadata));
            self.link_file_to_atom(entry.path, atom.id);
            created += 1;
        }
        if created > 0 {
            tracing::info!(created, "store: arquivos sincronizados");
        }
        created
    }

    /// Esvazia a store — átomos, processos, arquivos e índices — em um único passo.
    pub fn clear(&mut self) {
        self.atoms.clear();
        self.processes.clear();
        self.file_atom_map.clear();
        self.atom_positions.clear();
        self.process_positions.clear();
        self.by_type.clear();
        self.by_name.clear();
    }

    /// Estatísticas agregadas.
    pub fn statistics(&self) -> StoreStatistics {
        let per_type_counts = self
            .by_type
            .iter()
            .filter(|(_, ids)| !ids.is_empty())
            .map(|(t, ids)| (*t, ids.len()))
            .collect();
        let average_truth_strength = if self.atoms.is_empty() {
            0.0
        } else {
            self.atoms.iter().map(|a| a.truth_value.strength).sum::<f64>() / self.atoms.len() as f64
        };
        StoreStatistics {
            total_atoms: self.atoms.len(),
            total_processes: self.processes.len(),
            per_type_counts,
            active_process_count: self
                .processes
                .iter()
                .filter(|p| p.status == ProcessStatus::Active)
                .count(),
            average_truth_strength,
            files_mapped: self.file_atom_map.len(),
        }
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub fn process_count(&self) -> usize {
        self.processes.len()
    }
}
