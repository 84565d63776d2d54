//! # Console — Terminal de Comandos estilo CogServer
//!
//! Uma tabela registrável `nome → (descrição, handler)`. Cada handler
//! recebe os argumentos já separados, um destino de escrita
//! ([`fmt::Write`]) e o [`ConsoleContext`] com a store, o orquestrador e
//! o armazenamento de snapshots.
//!
//! ## Fluxo de uma Linha
//!
//! ```text
//! "create-atom ConceptNode \"Web Development\""
//!   │
//!   ├── 1. Histórico ← linha
//!   ├── 2. Tokens: ["create-atom", "ConceptNode", "Web Development"]
//!   ├── 3. Busca "create-atom" na tabela
//!   │      └── ausente → "Unknown command: <nome>"
//!   └── 4. handler(args, out, ctx)
//!          └── Err(e) → "Error executing command: <e>"
//! ```
//!
//! Os comandos padrão ficam em [`commands`].

pub mod commands;

use std::fmt;
use std::sync::Arc;

use regex::Regex;

use crate::core::{AtomTypeParseError, SnapshotError};
use crate::orchestrator::SharedOrchestrator;
use crate::persistence::{self, SnapshotStorage};

/// Erros de execução de comandos.
#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error(transparent)]
    InvalidAtomType(#[from] AtomTypeParseError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error("{0:#}")]
    Storage(#[from] anyhow::Error),

    #[error("padrão de argumentos inválido: {0}")]
    Pattern(#[from] regex::Error),

    #[error("falha ao escrever saída")]
    Output(#[from] fmt::Error),
}

/// Dependências visíveis aos handlers.
#[derive(Clone)]
pub struct ConsoleContext {
    pub orchestrator: SharedOrchestrator,
    pub storage: Arc<dyn SnapshotStorage>,
    /// Chave usada por `save`/`load` sem argumento e pelo autosave.
    pub snapshot_key: String,
    /// Salva o snapshot após comandos que mudam a store.
    pub autosave: bool,
}

impl ConsoleContext {
    /// Persiste a store sob `snapshot_key` se o autosave estiver ligado.
    pub fn autosave(&self) {
        if self.autosave {
            persistence::autosave_store(self.orchestrator.store(), self.storage.as_ref(), &self.snapshot_key);
        }
    }
}

/// Uma chamada de comando como o handler a enxerga.
pub struct Invocation<'a> {
    pub args: &'a [String],
    pub ctx: &'a ConsoleContext,
    /// `(nome, descrição)` de todos os comandos, em ordem de registro.
    pub catalog: &'a [(String, String)],
}

pub type CommandHandler =
    Box<dyn Fn(&Invocation<'_>, &mut dyn fmt::Write) -> Result<(), ConsoleError> + Send + Sync>;

struct Command {
    name: String,
    description: String,
    handler: CommandHandler,
}

/// Interpretador de linhas de comando.
pub struct Console {
    commands: Vec<Command>,
    history: Vec<String>,
    /// `"segmento entre aspas"` ou sequência sem espaço.
    token_re: Regex,
}

impl Console {
    /// Console com os comandos padrão registrados.
    pub fn new() -> Result<Self, ConsoleError> {
        let mut console = Self::empty()?;
        commands::register_defaults(&mut console);
        Ok(console)
    }

    /// Console sem nenhum comando.
    pub fn empty() -> Result<Self, ConsoleError> {
        Ok(Self {
            commands: Vec::new(),
            history: Vec::new(),
            token_re: Regex::new(r#""([^"]*)"|(\S+)"#)?,
        })
    }

    /// Registra (ou substitui) um comando.
    pub fn register<F>(&mut self, name: &str, description: &str, handler: F)
    where
        F: Fn(&Invocation<'_>, &mut dyn fmt::Write) -> Result<(), ConsoleError> + Send + Sync + 'static,
    {
        let command = Command {
            name: name.to_string(),
            description: description.to_string(),
            handler: Box::new(handler),
        };
        match self.commands.iter_mut().find(|c| c.name == name) {
            Some(existing) => *existing = command,
            None => self.commands.push(command),
        }
    }

    /// Nomes registrados, em ordem de registro.
    pub fn command_names(&self) -> Vec<&str> {
        self.commands.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Separa a linha em tokens; aspas duplas mantêm espaços juntos.
    pub fn tokenize(&self, line: &str) -> Vec<String> {
        self.token_re
            .captures_iter(line)
            .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
            .map(|m| m.as_str().to_string())
            .collect()
    }

    /// Executa um comando já separado em nome e argumentos.
    pub fn run(
        &self,
        name: &str,
        args: &[String],
        ctx: &ConsoleContext,
        out: &mut dyn fmt::Write,
    ) -> Result<(), ConsoleError> {
        let command = self
            .commands
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| ConsoleError::UnknownCommand(name.to_string()))?;
        let catalog: Vec<(String, String)> = self
            .commands
            .iter()
            .map(|c| (c.name.clone(), c.description.clone()))
            .collect();
        let invocation = Invocation {
            args,
            ctx,
            catalog: &catalog,
        };
        (command.handler)(&invocation, out)
    }

    /// Executa uma linha e devolve a saída do terminal.
    pub fn execute(&mut self, line: &str, ctx: &ConsoleContext) -> String {
        let line = line.trim();
        if line.is_empty() {
            return String::new();
        }
        self.history.push(line.to_string());

        let mut tokens = self.tokenize(line);
        if tokens.is_empty() {
            return String::new();
        }
        let name = tokens.remove(0);
        tracing::debug!(command = %name, args = tokens.len(), "console: executando");

        let mut out = String::new();
        match self.run(&name, &tokens, ctx, &mut out) {
            Ok(()) => {}
            Err(ConsoleError::UnknownCommand(name)) => {
                out.push_str(&format!("\nUnknown command: {name}\n"));
                out.push_str("Type 'help' for available commands\n\n");
            }
            Err(e) => {
                tracing::warn!(command = %name, error = %e, "console: comando falhou");
                out.push_str(&format!("\nError executing command: {e}\n\n"));
            }
        }
        out
    }
}
