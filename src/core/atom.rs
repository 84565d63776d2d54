//! # Atom — Unidade de Conhecimento do AtomSpace
//!
//! Um [`Atom`] é a menor unidade da [`KnowledgeStore`](super::KnowledgeStore):
//! um nó ou link **tipado** e **nomeado**, com grau de verdade e metadados.
//!
//! ## Nós e Links
//!
//! | Tipo | Categoria | Exemplo |
//! |------|-----------|---------|
//! | `ConceptNode` | nó | "TypeScript" |
//! | `PredicateNode` | nó | "has-feature" |
//! | `VariableNode` | nó | "$X" |
//! | `ListLink` | link | lista ordenada de argumentos |
//! | `EvaluationLink` | link | predicado aplicado a argumentos |
//! | `InheritanceLink` | link | "React é um Web Development" |
//! | `SimilarityLink` | link | "React ≈ TypeScript" |
//! | `ImplicationLink` | link | "A ⇒ B" |
//! | `ExecutionLink` | link | execução de um procedimento |
//!
//! Links referenciam seus argumentos, em ordem, pelo campo `outgoing`.
//!
//! ## Imutabilidade de Identidade
//!
//! `id` e `atom_type` nunca mudam após a criação. Apenas `truth_value`
//! e `metadata` podem ser substituídos — e só pela KnowledgeStore.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::TruthValue;

/// Identificador de um [Atom] — string única no formato `atom_<uuid>`.
pub type AtomId = String;

/// Gera um identificador único com o prefixo informado (`atom`, `process`, ...).
///
/// Compartilhado por todas as entidades do sistema: `<prefixo>_<uuid simples>`.
pub fn new_id(prefix: &str) -> String {
    format!("{}_{}", prefix, Uuid::new_v4().simple())
}

/// Enumeração fechada dos tipos de átomo.
///
/// Serializado com o nome da variante (`"ConceptNode"`, `"InheritanceLink"`...).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AtomType {
    ConceptNode,
    PredicateNode,
    VariableNode,
    ListLink,
    EvaluationLink,
    InheritanceLink,
    SimilarityLink,
    ImplicationLink,
    ExecutionLink,
}

impl AtomType {
    /// Todos os tipos, na ordem de declaração.
    pub const ALL: [AtomType; 9] = [
        AtomType::ConceptNode,
        AtomType::PredicateNode,
        AtomType::VariableNode,
        AtomType::ListLink,
        AtomType::EvaluationLink,
        AtomType::InheritanceLink,
        AtomType::SimilarityLink,
        AtomType::ImplicationLink,
        AtomType::ExecutionLink,
    ];

    /// Nome canônico do tipo (igual ao serializado).
    pub fn as_str(&self) -> &'static str {
        match self {
            AtomType::ConceptNode => "ConceptNode",
            AtomType::PredicateNode => "PredicateNode",
            AtomType::VariableNode => "VariableNode",
            AtomType::ListLink => "ListLink",
            AtomType::EvaluationLink => "EvaluationLink",
            AtomType::InheritanceLink => "InheritanceLink",
            AtomType::SimilarityLink => "SimilarityLink",
            AtomType::ImplicationLink => "ImplicationLink",
            AtomType::ExecutionLink => "ExecutionLink",
        }
    }

    /// `true` para os tipos `*Link`, que usam `outgoing`.
    pub fn is_link(&self) -> bool {
        !matches!(
            self,
            AtomType::ConceptNode | AtomType::PredicateNode | AtomType::VariableNode
        )
    }
}

impl fmt::Display for AtomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Erro ao interpretar um nome de tipo de átomo desconhecido.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("tipo de átomo desconhecido: '{0}'")]
pub struct AtomTypeParseError(pub String);

impl FromStr for AtomType {
    type Err = AtomTypeParseError;

    /// Aceita o nome canônico sem diferenciar maiúsculas/minúsculas.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AtomType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| AtomTypeParseError(s.to_string()))
    }
}

/// Valor de metadado de um átomo.
///
/// Formas conhecidas (texto, número, flag) e um curinga JSON para o resto.
/// Serializado sem tag: `"react"`, `0.8`, `true`, `{...}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
    Text(String),
    Number(f64),
    Flag(bool),
    Json(serde_json::Value),
}

impl MetaValue {
    /// Retorna o texto, se o valor for [`MetaValue::Text`].
    pub fn as_text(&self) -> Option<&str> {
        match self {
            MetaValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for MetaValue {
    fn from(s: &str) -> Self {
        MetaValue::Text(s.to_string())
    }
}

impl From<String> for MetaValue {
    fn from(s: String) -> Self {
        MetaValue::Text(s)
    }
}

impl From<f64> for MetaValue {
    fn from(n: f64) -> Self {
        MetaValue::Number(n)
    }
}

impl From<bool> for MetaValue {
    fn from(b: bool) -> Self {
        MetaValue::Flag(b)
    }
}

/// Mapa aberto de metadados: chave → [`MetaValue`].
///
/// Chaves usadas pelo sistema:
/// - `file_type` (`"file"` | `"folder"`) e `content` — átomos de arquivo
pub type Metadata = BTreeMap<String, MetaValue>;

/// Nó ou link tipado do AtomSpace.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Atom {
    /// Identificador único, imutável.
    pub id: AtomId,

    /// Tipo do átomo, imutável.
    #[serde(rename = "type")]
    pub atom_type: AtomType,

    /// Nome do átomo. Não há unicidade de nome.
    pub name: String,

    /// Grau de verdade — `⟨1.0, 1.0⟩` até ser atualizado.
    pub truth_value: TruthValue,

    /// Argumentos ordenados (IDs de átomos), usados por links.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outgoing: Option<Vec<AtomId>>,

    /// Metadados opcionais.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,

    /// Momento da criação.
    pub timestamp: DateTime<Utc>,
}

impl Atom {
    /// Cria um átomo novo, com ID fresco e verdade `⟨1.0, 1.0⟩`.
    pub fn new(
        atom_type: AtomType,
        name: impl Into<String>,
        outgoing: Option<Vec<AtomId>>,
        metadata: Option<Metadata>,
    ) -> Self {
        Self {
            id: new_id("atom"),
            atom_type,
            name: name.into(),
            truth_value: TruthValue::certain(),
            outgoing,
            metadata,
            timestamp: Utc::now(),
        }
    }

    /// Busca um metadado pela chave.
    pub fn meta(&self, key: &str) -> Option<&MetaValue> {
        self.metadata.as_ref().and_then(|m| m.get(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_atom_type_case_insensitive() {
        assert_eq!("conceptnode".parse::<AtomType>(), Ok(AtomType::ConceptNode));
        assert_eq!(
            "InheritanceLink".parse::<AtomType>(),
            Ok(AtomType::InheritanceLink)
        );
        assert!("Blob".parse::<AtomType>().is_err());
    }

    #[test]
    fn test_is_link() {
        assert!(!AtomType::PredicateNode.is_link());
        assert!(AtomType::EvaluationLink.is_link());
    }

    #[test]
    fn test_atom_serializes_type_field() {
        let atom = Atom::new(AtomType::SimilarityLink, "a ≈ b", Some(vec!["x".into()]), None);
        let json = serde_json::to_value(&atom).unwrap();
        assert_eq!(json["type"], "SimilarityLink");
        assert_eq!(json["truth_value"]["strength"], 1.0);
        assert!(json.get("metadata").is_none());
    }

    /// Metadados sem tag voltam para a variante certa
    #[test]
    fn test_meta_value_untagged_round_trip() {
        let mut meta = Metadata::new();
        meta.insert("category".into(), "language".into());
        meta.insert("weight".into(), 0.8.into());
        meta.insert("pinned".into(), true.into());
        meta.insert("tags".into(), MetaValue::Json(serde_json::json!(["a", "b"])));

        let json = serde_json::to_string(&meta).unwrap();
        let back: Metadata = serde_json::from_str(&json).unwrap();
        assert_eq!(back, meta);
        assert_eq!(back["category"].as_text(), Some("language"));
    }

    #[test]
    fn test_new_id_prefix_and_uniqueness() {
        let a = new_id("atom");
        let b = new_id("atom");
        assert!(a.starts_with("atom_"));
        assert_ne!(a, b);
    }
}
