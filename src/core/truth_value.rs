//! # TruthValue — Grau de Verdade de um Átomo
//!
//! Cada [`Atom`](super::Atom) carrega um [`TruthValue`] com duas dimensões:
//!
//! - **Strength (s)**: "Quão verdadeira é a proposição?" — de 0.0 a 1.0
//! - **Confidence (c)**: "Quanto confiamos nessa estimativa?" — de 0.0 a 1.0
//!
//! Diferente de um sistema de evidências acumuladas, aqui os dois campos
//! são armazenados diretamente e substituídos por atualização parcial
//! ([`TruthValueUpdate`]): o chamador informa apenas os campos que mudam.
//!
//! ## Valores Fora do Intervalo
//!
//! A atualização é **permissiva**: valores fora de `[0, 1]` são aceitos
//! como vieram. O chamador é responsável por fornecer valores válidos;
//! [`TruthValue::is_valid()`] permite verificar a invariante.
//!
//! ## Exemplo
//!
//! ```rust
//! use crate::core::{TruthValue, TruthValueUpdate};
//!
//! let mut tv = TruthValue::certain(); // ⟨1.00, 1.00⟩
//! tv.merge(&TruthValueUpdate { strength: Some(0.5), confidence: None });
//! assert_eq!(tv.confidence, 1.0);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Grau de verdade `{strength, confidence}` associado a um átomo.
///
/// Display: `⟨strength, confidence⟩`, por exemplo `⟨0.80, 0.45⟩`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TruthValue {
    /// Força da crença (0.0 a 1.0).
    pub strength: f64,
    /// Confiança na força informada (0.0 a 1.0).
    pub confidence: f64,
}

/// Atualização parcial de um [`TruthValue`].
///
/// Campos `None` permanecem inalterados no merge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TruthValueUpdate {
    /// Nova força, se informada.
    #[serde(default)]
    pub strength: Option<f64>,
    /// Nova confiança, se informada.
    #[serde(default)]
    pub confidence: Option<f64>,
}

impl TruthValue {
    /// Cria um TruthValue com os valores exatos informados (sem clamp).
    pub fn new(strength: f64, confidence: f64) -> Self {
        Self {
            strength,
            confidence,
        }
    }

    /// Valor inicial de todo átomo recém-criado: `⟨1.00, 1.00⟩`.
    pub fn certain() -> Self {
        Self::new(1.0, 1.0)
    }

    /// Aplica uma atualização parcial — só os campos informados mudam.
    pub fn merge(&mut self, update: &TruthValueUpdate) {
        if let Some(strength) = update.strength {
            self.strength = strength;
        }
        if let Some(confidence) = update.confidence {
            self.confidence = confidence;
        }
    }

    /// `true` se ambos os componentes estão em `[0, 1]`.
    pub fn is_valid(&self) -> bool {
        (0.0..=1.0).contains(&self.strength) && (0.0..=1.0).contains(&self.confidence)
    }
}

impl Default for TruthValue {
    fn default() -> Self {
        Self::certain()
    }
}

impl fmt::Display for TruthValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "⟨{:.2}, {:.2}⟩", self.strength, self.confidence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_certain_is_one_one() {
        let tv = TruthValue::certain();
        assert_eq!(tv.strength, 1.0);
        assert_eq!(tv.confidence, 1.0);
    }

    /// Atualizar só a força preserva a confiança
    #[test]
    fn test_merge_only_supplied_fields() {
        let mut tv = TruthValue::new(0.9, 0.7);
        tv.merge(&TruthValueUpdate {
            strength: Some(0.2),
            confidence: None,
        });
        assert_eq!(tv.strength, 0.2);
        assert_eq!(tv.confidence, 0.7);

        tv.merge(&TruthValueUpdate::default());
        assert_eq!(tv, TruthValue::new(0.2, 0.7));
    }

    /// O merge é permissivo: nada é limitado a [0, 1]
    #[test]
    fn test_merge_does_not_clamp() {
        let mut tv = TruthValue::certain();
        tv.merge(&TruthValueUpdate {
            strength: Some(1.5),
            confidence: Some(-0.25),
        });
        assert_eq!(tv.strength, 1.5);
        assert_eq!(tv.confidence, -0.25);
        assert!(!tv.is_valid());
    }

    #[test]
    fn test_display() {
        assert_eq!(TruthValue::new(0.8, 0.45).to_string(), "⟨0.80, 0.45⟩");
    }
}
