//! # Persistência — Snapshots em Armazenamento Chave-Valor
//!
//! O adaptador de armazenamento só guarda e devolve a **string** do
//! snapshot sob uma chave escolhida pelo chamador. Quem entende o formato
//! é a [`KnowledgeStore`] (`export_snapshot` / `import_snapshot`).
//!
//! ## Implementações
//!
//! | Tipo | Onde guarda |
//! |------|-------------|
//! | [`FileStorage`] | `<data_dir>/<chave>.json` |
//! | [`MemoryStorage`] | `HashMap` em memória (testes, execuções efêmeras) |
//!
//! ## Chaves
//!
//! Em disco a chave vira nome de arquivo: qualquer caractere fora de
//! `[A-Za-z0-9_-]` é trocado por `_`.
//!
//! ## ⚠️ Atomicidade
//!
//! A escrita em disco passa por um arquivo `.tmp` seguido de `rename`,
//! então um crash no meio não corrompe o snapshot anterior.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use parking_lot::RwLock;

use crate::core::SharedStore;

/// Armazenamento chave-valor de payloads de snapshot.
pub trait SnapshotStorage: Send + Sync {
    fn save(&self, key: &str, payload: &str) -> Result<()>;

    /// `Ok(None)` quando a chave não existe.
    fn load(&self, key: &str) -> Result<Option<String>>;

    /// Chaves salvas, em ordem alfabética.
    fn keys(&self) -> Result<Vec<String>>;
}

/// Snapshots como arquivos JSON em um diretório.
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_key(key)))
    }
}

impl SnapshotStorage for FileStorage {
    fn save(&self, key: &str, payload: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Falha ao criar diretório {}", self.dir.display()))?;
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, payload)
            .with_context(|| format!("Falha ao escrever {}", tmp.display()))?;
        std::fs::rename(&tmp, &path)
            .with_context(|| format!("Falha ao mover snapshot para {}", path.display()))?;
        tracing::debug!(path = %path.display(), bytes = payload.len(), "storage: snapshot salvo");
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let payload = std::fs::read_to_string(&path)
            .with_context(|| format!("Falha ao ler {}", path.display()))?;
        Ok(Some(payload))
    }

    fn keys(&self) -> Result<Vec<String>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let entries = std::fs::read_dir(&self.dir)
            .with_context(|| format!("Falha ao listar {}", self.dir.display()))?;
        let mut keys = Vec::new();
        for entry in entries {
            let path = entry.context("Falha ao ler entrada de diretório")?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    keys.push(stem.to_string());
                }
            }
        }
        keys.sort();
        Ok(keys)
    }
}

/// Snapshots em memória.
#[derive(Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStorage for MemoryStorage {
    fn save(&self, key: &str, payload: &str) -> Result<()> {
        self.entries.write().insert(key.to_string(), payload.to_string());
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn keys(&self) -> Result<Vec<String>> {
        let mut keys: Vec<String> = self.entries.read().keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}

/// Troca tudo fora de `[A-Za-z0-9_-]` por `_`.
pub fn sanitize_key(key: &str) -> String {
    let cleaned: String = key
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
        .collect();
    if cleaned.is_empty() {
        "_".to_string()
    } else {
        cleaned
    }
}

/// Exporta a store e salva o payload sob `key`.
///
/// Adquire só a trava de leitura da store; a escrita acontece depois de soltá-la.
pub fn save_store(store: &SharedStore, storage: &dyn SnapshotStorage, key: &str) -> Result<()> {
    let payload = store
        .read()
        .export_snapshot()
        .context("Falha ao serializar a KnowledgeStore")?;
    storage.save(key, &payload)
}

/// [`save_store`] para depois de uma mutação: falhas só geram log.
pub fn autosave_store(store: &SharedStore, storage: &dyn SnapshotStorage, key: &str) {
    if let Err(e) = save_store(store, storage, key) {
        tracing::error!(error = %e, key = %key, "Falha no autosave da store");
    }
}

/// Carrega o payload de `key` e importa na store.
///
/// `Ok(false)` se a chave não existe (store intocada) ou se o payload é
/// inválido (store esvaziada, como em qualquer import malformado).
pub fn load_store(store: &SharedStore, storage: &dyn SnapshotStorage, key: &str) -> Result<bool> {
    let Some(payload) = storage.load(key)? else {
        tracing::info!(key = %key, "storage: nenhum snapshot salvo, mantendo store atual");
        return Ok(false);
    };
    Ok(store.write().import_snapshot(&payload))
}
