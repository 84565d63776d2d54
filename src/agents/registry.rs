//! # AgentRegistry — Dono dos Agentes
//!
//! Guarda os [`Agent`]s em ordem de criação. Essa ordem é a "ordem de
//! iteração do registro" usada como desempate em toda a orquestração
//! (primeiro agente ocioso, primeiro candidato com maior pontuação...).
//!
//! ## Ouvintes
//!
//! A criação de um agente é publicada para cada [`AgentListener`]
//! registrado. Um ouvinte que falha só gera um `warn`: o agente continua
//! criado.
//!
//! ```text
//! create_agent()
//!   ├── insere o agente
//!   └── para cada ouvinte: on_agent_created(&agent)
//!         └── Err(e) → tracing::warn!, segue
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use super::agent::{Agent, AgentId, AgentRole, AgentState};

/// Observador de eventos do registro.
pub trait AgentListener: Send + Sync {
    fn on_agent_created(&self, agent: &Agent) -> anyhow::Result<()>;
}

/// Registro de agentes.
#[derive(Default)]
pub struct AgentRegistry {
    agents: Vec<Agent>,
    positions: HashMap<AgentId, usize>,
    listeners: Vec<Arc<dyn AgentListener>>,
    seeded: bool,
    orchestration_active: bool,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener(&mut self, listener: Arc<dyn AgentListener>) {
        self.listeners.push(listener);
    }

    /// Cria um agente ocioso e notifica os ouvintes.
    pub fn create_agent(
        &mut self,
        name: impl Into<String>,
        role: AgentRole,
        capabilities: Vec<String>,
    ) -> Agent {
        let agent = Agent::new(name, role, capabilities);
        self.positions.insert(agent.id.clone(), self.agents.len());
        self.agents.push(agent.clone());
        tracing::debug!(id = %agent.id, name = %agent.name, role = %role, "registry: agente criado");

        for listener in &self.listeners {
            if let Err(e) = listener.on_agent_created(&agent) {
                tracing::warn!(id = %agent.id, error = %e, "registry: ouvinte falhou, agente mantido");
            }
        }
        agent
    }

    /// Semeia um agente por papel se o registro estiver vazio.
    ///
    /// Roda no máximo uma vez por instância: chamadas seguintes retornam
    /// 0 mesmo que o registro esteja vazio.
    pub fn seed_defaults(&mut self) -> usize {
        if std::mem::replace(&mut self.seeded, true) || !self.agents.is_empty() {
            return 0;
        }
        for role in AgentRole::ALL {
            let (name, caps) = role.default_profile();
            self.create_agent(name, role, caps.iter().map(|c| c.to_string()).collect());
        }
        tracing::info!(count = AgentRole::ALL.len(), "registry: agentes padrão semeados");
        AgentRole::ALL.len()
    }

    /// Substitui o estado sem checar transições. `false` se o ID não existe.
    pub fn update_agent_state(&mut self, id: &str, state: AgentState) -> bool {
        match self.get_agent_mut(id) {
            Some(agent) => {
                agent.state = state;
                tracing::debug!(id = %id, state = %state, "registry: estado atualizado");
                true
            }
            None => false,
        }
    }

    pub fn get_agent(&self, id: &str) -> Option<&Agent> {
        self.positions.get(id).map(|&i| &self.agents[i])
    }

    pub(crate) fn get_agent_mut(&mut self, id: &str) -> Option<&mut Agent> {
        match self.positions.get(id) {
            Some(&i) => Some(&mut self.agents[i]),
            None => None,
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.positions.contains_key(id)
    }

    /// Todos os agentes, em ordem de criação.
    pub fn all_agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agents_by_role(&self, role: AgentRole) -> Vec<&Agent> {
        self.agents.iter().filter(|a| a.role == role).collect()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn is_orchestration_active(&self) -> bool {
        self.orchestration_active
    }

    /// Liga a orquestração e devolve todos os agentes a `idle`.
    pub fn start_orchestration(&mut self) {
        self.set_orchestration(true);
    }

    /// Desliga a orquestração e devolve todos os agentes a `idle`.
    pub fn stop_orchestration(&mut self) {
        self.set_orchestration(false);
    }

    // Tarefas em andamento continuam ligadas aos seus agentes.
    fn set_orchestration(&mut self, active: bool) {
        self.orchestration_active = active;
        for agent in &mut self.agents {
            agent.state = AgentState::Idle;
        }
        tracing::info!(active, agents = self.agents.len(), "registry: orquestração alternada");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    struct Recorder(Mutex<Vec<String>>);

    impl AgentListener for Recorder {
        fn on_agent_created(&self, agent: &Agent) -> anyhow::Result<()> {
            self.0.lock().push(agent.name.clone());
            Ok(())
        }
    }

    struct Failing;

    impl AgentListener for Failing {
        fn on_agent_created(&self, _agent: &Agent) -> anyhow::Result<()> {
            anyhow::bail!("store indisponível")
        }
    }

    #[test]
    fn test_seed_defaults_once() {
        let mut registry = AgentRegistry::new();
        assert_eq!(registry.seed_defaults(), 5);
        assert_eq!(registry.seed_defaults(), 0);
        assert_eq!(registry.len(), 5);

        let names: Vec<&str> = registry.all_agents().iter().map(|a| a.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Strategic Planner",
                "Code Executor",
                "System Monitor",
                "Knowledge Learner",
                "Coordination Agent"
            ]
        );
        let planner = registry.agents_by_role(AgentRole::Planner)[0];
        assert_eq!(planner.capabilities, vec!["planning", "goal-setting", "strategy"]);
    }

    /// Registro já populado não recebe sementes
    #[test]
    fn test_seed_skipped_when_populated() {
        let mut registry = AgentRegistry::new();
        registry.create_agent("solo", AgentRole::Learner, vec![]);
        assert_eq!(registry.seed_defaults(), 0);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_state_is_unconstrained() {
        let mut registry = AgentRegistry::new();
        let a = registry.create_agent("a", AgentRole::Monitor, vec![]);
        for state in [AgentState::Learning, AgentState::Idle, AgentState::Acting, AgentState::Communicating] {
            assert!(registry.update_agent_state(&a.id, state));
            assert_eq!(registry.get_agent(&a.id).unwrap().state, state);
        }
        assert!(!registry.update_agent_state("agent_nenhum", AgentState::Idle));
    }

    #[test]
    fn test_listener_failure_keeps_agent() {
        let recorder = Arc::new(Recorder(Mutex::new(Vec::new())));
        let mut registry = AgentRegistry::new();
        registry.add_listener(Arc::new(Failing));
        registry.add_listener(recorder.clone());

        let agent = registry.create_agent("Observer", AgentRole::Monitor, vec![]);
        assert!(registry.contains(&agent.id));
        assert_eq!(*recorder.0.lock(), vec!["Observer".to_string()]);
    }

    #[test]
    fn test_orchestration_resets_states() {
        let mut registry = AgentRegistry::new();
        registry.seed_defaults();
        let id = registry.all_agents()[1].id.clone();
        registry.update_agent_state(&id, AgentState::Acting);

        registry.start_orchestration();
        assert!(registry.is_orchestration_active());
        assert!(registry.all_agents().iter().all(|a| a.state == AgentState::Idle));

        registry.stop_orchestration();
        assert!(!registry.is_orchestration_active());
    }
}
