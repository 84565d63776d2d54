//! # Configuração
//!
//! Valores padrão sobrescritos por variáveis de ambiente:
//!
//! | Variável | Padrão | Uso |
//! |----------|--------|-----|
//! | `COGSPACE_ADDR` | `0.0.0.0:3000` | endereço HTTP |
//! | `COGSPACE_DATA_DIR` | `data` | diretório do [`FileStorage`](crate::persistence::FileStorage) |
//! | `COGSPACE_SNAPSHOT_KEY` | `atomspace_snapshot` | chave carregada no boot e salva pelo autosave |
//! | `COGSPACE_SEED_AGENTS` | `true` | semeia os cinco agentes padrão |
//! | `COGSPACE_AUTOSAVE` | `true` | salva o snapshot após mutações HTTP |
//!
//! Valor inválido gera `warn` e cai no padrão.

use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub addr: SocketAddr,
    pub data_dir: PathBuf,
    pub snapshot_key: String,
    pub seed_agents: bool,
    pub autosave: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            data_dir: PathBuf::from("data"),
            snapshot_key: "atomspace_snapshot".to_string(),
            seed_agents: true,
            autosave: true,
        }
    }
}

impl Config {
    /// Lê a configuração do ambiente do processo.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Monta a configuração a partir de uma função de consulta.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup("COGSPACE_ADDR") {
            match raw.parse() {
                Ok(addr) => config.addr = addr,
                Err(e) => tracing::warn!(value = %raw, error = %e, "config: COGSPACE_ADDR inválido, usando padrão"),
            }
        }
        if let Some(raw) = lookup("COGSPACE_DATA_DIR").filter(|s| !s.trim().is_empty()) {
            config.data_dir = PathBuf::from(raw);
        }
        if let Some(raw) = lookup("COGSPACE_SNAPSHOT_KEY").filter(|s| !s.trim().is_empty()) {
            config.snapshot_key = raw;
        }
        if let Some(raw) = lookup("COGSPACE_SEED_AGENTS") {
            config.seed_agents = parse_flag("COGSPACE_SEED_AGENTS", &raw, config.seed_agents);
        }
        if let Some(raw) = lookup("COGSPACE_AUTOSAVE") {
            config.autosave = parse_flag("COGSPACE_AUTOSAVE", &raw, config.autosave);
        }
        config
    }
}

fn parse_flag(name: &str, raw: &str, default: bool) -> bool {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => {
            tracing::warn!(var = name, value = %raw, "config: flag inválida, usando padrão");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_env() {
        assert_eq!(Config::from_lookup(|_| None), Config::default());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("COGSPACE_ADDR", "127.0.0.1:8080"),
            ("COGSPACE_DATA_DIR", "/tmp/cog"),
            ("COGSPACE_SNAPSHOT_KEY", "demo"),
            ("COGSPACE_SEED_AGENTS", "off"),
            ("COGSPACE_AUTOSAVE", "0"),
        ]));
        assert_eq!(config.addr, "127.0.0.1:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(config.data_dir, PathBuf::from("/tmp/cog"));
        assert_eq!(config.snapshot_key, "demo");
        assert!(!config.seed_agents);
        assert!(!config.autosave);
    }

    /// Valores inválidos caem no padrão
    #[test]
    fn test_invalid_values_fall_back() {
        let config = Config::from_lookup(lookup(&[
            ("COGSPACE_ADDR", "não é endereço"),
            ("COGSPACE_SEED_AGENTS", "talvez"),
            ("COGSPACE_SNAPSHOT_KEY", "   "),
        ]));
        assert_eq!(config, Config::default());
    }
}
