//! # Orquestrador — Fachada Multiagente
//!
//! O [`Orchestrator`] é o **ponto de entrada** da orquestração: segura
//! as três coleções de agentes, cada uma atrás do seu `RwLock`, e publica
//! um [`OrchestrationEvent`] para cada mudança observável.
//!
//! ## Travas
//!
//! ```text
//! ┌──────────────┐   ┌────────────────┐   ┌──────────────────────┐
//! │ TaskScheduler│   │ AgentRegistry  │   │ CollaborationManager │
//! │  RwLock      │   │  RwLock        │   │  RwLock              │
//! └──────┬───────┘   └───────▲────────┘   └──────────┬───────────┘
//!        └──── 1º dono ──────┴──── 2º registro ──────┘
//!
//! AgentRegistry ──(ouvinte, try_write_for)──▶ SharedStore
//! ```
//!
//! Quem precisa de duas coleções trava primeiro a dona da operação e
//! depois o registro. Nunca o contrário. O ouvinte da store só **tenta**
//! a trava por [`STORE_LISTENER_TIMEOUT`]: se não conseguir, o agente
//! continua criado e o processo não é registrado.
//!
//! ## Eventos
//!
//! | Operação | Eventos |
//! |----------|---------|
//! | `create_agent` / `seed_default_agents` | `AgentCreated` |
//! | `create_task` | `TaskCreated` |
//! | `assign_task`, `smart_task_assignment`, `assign_pending` | `TaskAssigned` |
//! | `complete_task` / `fail_task` | `TaskCompleted` / `TaskFailed` |
//! | `send_message`, `share_knowledge`, `request_help`, `complete_collaboration` | `MessageSent` |
//! | `create_collaboration`, `request_help` | `CollaborationOpened` |
//! | `complete_collaboration` | `CollaborationClosed` |
//!
//! Publicar nunca bloqueia; sem assinantes o evento é descartado.

use std::sync::Arc;
use std::time::Duration;

use anyhow::bail;
use parking_lot::RwLock;
use tokio::sync::broadcast;

use crate::agents::{
    Agent, AgentId, AgentListener, AgentRegistry, AgentRole, AgentState, AgentStats, Collaboration,
    CollaborationEffectiveness, CollaborationManager, HelpOutcome, Message, MessageContent,
    MessageKind, Task, TaskResult, TaskScheduler,
};
use crate::core::{AtomId, ProcessKind, SharedStore};
use crate::web::events::OrchestrationEvent;

/// Tempo máximo que o ouvinte espera pela trava de escrita da store.
pub const STORE_LISTENER_TIMEOUT: Duration = Duration::from_millis(50);

/// Handle compartilhado, como o servidor e o console o enxergam.
pub type SharedOrchestrator = Arc<Orchestrator>;

/// Registra um processo `reasoning` "Agent: <nome>" para cada agente criado,
/// a menos que a store já tenha um processo com esse nome.
struct StoreProcessRecorder {
    store: SharedStore,
}

impl AgentListener for StoreProcessRecorder {
    fn on_agent_created(&self, agent: &Agent) -> anyhow::Result<()> {
        let Some(mut store) = self.store.try_write_for(STORE_LISTENER_TIMEOUT) else {
            bail!("store ocupada, processo do agente {} não registrado", agent.id);
        };
        let name = format!("Agent: {}", agent.name);
        // processo restaurado de um snapshot: não duplica
        if store.all_processes().iter().any(|p| p.name == name) {
            tracing::debug!(agent = %agent.id, process = %name, "orquestrador: processo do agente já existe");
            return Ok(());
        }
        store.create_process(name, ProcessKind::Reasoning, Vec::new());
        Ok(())
    }
}

/// Repassa a criação de agentes para o canal de eventos.
struct EventRelay {
    events: broadcast::Sender<OrchestrationEvent>,
}

impl AgentListener for EventRelay {
    fn on_agent_created(&self, agent: &Agent) -> anyhow::Result<()> {
        let _ = self.events.send(OrchestrationEvent::AgentCreated {
            id: agent.id.clone(),
            name: agent.name.clone(),
            role: agent.role,
        });
        Ok(())
    }
}

/// Fachada sobre registro, scheduler e colaborações.
pub struct Orchestrator {
    store: SharedStore,
    registry: RwLock<AgentRegistry>,
    scheduler: RwLock<TaskScheduler>,
    collaborations: RwLock<CollaborationManager>,
    events: broadcast::Sender<OrchestrationEvent>,
}

impl Orchestrator {
    /// Cria o orquestrador já com os ouvintes da store e de eventos.
    pub fn new(store: SharedStore, events: broadcast::Sender<OrchestrationEvent>) -> Self {
        let mut registry = AgentRegistry::new();
        registry.add_listener(Arc::new(StoreProcessRecorder { store: store.clone() }));
        registry.add_listener(Arc::new(EventRelay { events: events.clone() }));
        Self {
            store,
            registry: RwLock::new(registry),
            scheduler: RwLock::new(TaskScheduler::new()),
            collaborations: RwLock::new(CollaborationManager::new()),
            events,
        }
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub fn subscribe(&self) -> broadcast::Receiver<OrchestrationEvent> {
        self.events.subscribe()
    }

    /// Publica um evento; sem assinantes ele é descartado.
    pub fn publish(&self, event: OrchestrationEvent) {
        let _ = self.events.send(event);
    }

    // ── Agentes ───────────────────────────────────────────────

    pub fn seed_default_agents(&self) -> usize {
        self.registry.write().seed_defaults()
    }

    pub fn create_agent(&self, name: &str, role: AgentRole, capabilities: Vec<String>) -> Agent {
        self.registry.write().create_agent(name, role, capabilities)
    }

    pub fn update_agent_state(&self, id: &str, state: AgentState) -> bool {
        let updated = self.registry.write().update_agent_state(id, state);
        if !updated {
            tracing::warn!(id = %id, "orchestrator: agente desconhecido");
        }
        updated
    }

    pub fn agents(&self) -> Vec<Agent> {
        self.registry.read().all_agents().to_vec()
    }

    pub fn get_agent(&self, id: &str) -> Option<Agent> {
        self.registry.read().get_agent(id).cloned()
    }

    pub fn agents_by_role(&self, role: AgentRole) -> Vec<Agent> {
        self.registry.read().agents_by_role(role).into_iter().cloned().collect()
    }

    pub fn start_orchestration(&self) {
        self.registry.write().start_orchestration();
        self.publish(OrchestrationEvent::OrchestrationToggled { active: true });
    }

    pub fn stop_orchestration(&self) {
        self.registry.write().stop_orchestration();
        self.publish(OrchestrationEvent::OrchestrationToggled { active: false });
    }

    pub fn is_orchestration_active(&self) -> bool {
        self.registry.read().is_orchestration_active()
    }

    // ── Tarefas ───────────────────────────────────────────────

    pub fn create_task(&self, description: &str, priority: i32) -> Task {
        let task = {
            let mut scheduler = self.scheduler.write();
            let mut registry = self.registry.write();
            scheduler.create_task(&mut registry, description, priority)
        };
        self.publish(OrchestrationEvent::TaskCreated {
            id: task.id.clone(),
            description: task.description.clone(),
            priority: task.priority,
            assigned_to: task.assigned_to.clone(),
        });
        task
    }

    pub fn assign_task(&self, task_id: &str, agent_id: &str) -> bool {
        let bound = {
            let mut scheduler = self.scheduler.write();
            let mut registry = self.registry.write();
            scheduler.assign_task(&mut registry, task_id, agent_id)
        };
        if bound {
            self.publish_assigned(task_id, agent_id);
        }
        bound
    }

    pub fn smart_task_assignment(&self, task_id: &str) -> Option<AgentId> {
        let winner = {
            let mut scheduler = self.scheduler.write();
            let mut registry = self.registry.write();
            scheduler.smart_task_assignment(&mut registry, task_id)
        };
        if let Some(agent_id) = &winner {
            self.publish_assigned(task_id, agent_id);
        }
        winner
    }

    /// Reexecuta a atribuição ingênua para as tarefas pendentes.
    pub fn assign_pending(&self) -> usize {
        let bound = {
            let mut scheduler = self.scheduler.write();
            let mut registry = self.registry.write();
            scheduler.assign_pending(&mut registry)
        };
        for (task_id, agent_id) in &bound {
            self.publish_assigned(task_id, agent_id);
        }
        bound.len()
    }

    pub fn complete_task(&self, task_id: &str, result: Option<TaskResult>) -> bool {
        let resolved = {
            let mut scheduler = self.scheduler.write();
            let mut registry = self.registry.write();
            let agent = scheduler.get_task(task_id).and_then(|t| t.assigned_to.clone());
            agent.filter(|_| scheduler.complete_task(&mut registry, task_id, result))
        };
        match resolved {
            Some(agent_id) => {
                self.publish(OrchestrationEvent::TaskCompleted {
                    task_id: task_id.to_string(),
                    agent_id,
                });
                true
            }
            None => false,
        }
    }

    pub fn fail_task(&self, task_id: &str, reason: Option<String>) -> bool {
        let resolved = {
            let mut scheduler = self.scheduler.write();
            let mut registry = self.registry.write();
            let agent = scheduler.get_task(task_id).and_then(|t| t.assigned_to.clone());
            agent.filter(|_| scheduler.fail_task(&mut registry, task_id, reason.clone()))
        };
        match resolved {
            Some(agent_id) => {
                self.publish(OrchestrationEvent::TaskFailed {
                    task_id: task_id.to_string(),
                    agent_id,
                    reason,
                });
                true
            }
            None => false,
        }
    }

    pub fn get_task(&self, id: &str) -> Option<Task> {
        self.scheduler.read().get_task(id).cloned()
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.scheduler.read().all_tasks().to_vec()
    }

    pub fn active_tasks(&self) -> Vec<Task> {
        self.scheduler.read().get_active_tasks().into_iter().cloned().collect()
    }

    pub fn agent_stats(&self) -> AgentStats {
        let scheduler = self.scheduler.read();
        let registry = self.registry.read();
        scheduler.get_agent_stats(&registry)
    }

    // ── Mensagens e colaborações ──────────────────────────────

    pub fn send_message(&self, from: &str, to: &str, kind: MessageKind, content: MessageContent) -> Message {
        let message = {
            let mut collabs = self.collaborations.write();
            let mut registry = self.registry.write();
            collabs.send_message(&mut registry, from, to, kind, content)
        };
        self.publish_message(&message);
        message
    }

    pub fn create_collaboration(&self, participants: Vec<AgentId>, goal: &str) -> Collaboration {
        let collab = self.collaborations.write().create_collaboration(participants, goal);
        self.publish_opened(&collab);
        collab
    }

    pub fn send_collaboration_message(
        &self,
        collab_id: &str,
        from: &str,
        content: MessageContent,
    ) -> Option<Message> {
        self.collaborations
            .write()
            .send_collaboration_message(collab_id, from, content)
    }

    pub fn complete_collaboration(&self, collab_id: &str, success: bool) -> bool {
        let notices = {
            let mut collabs = self.collaborations.write();
            let mut registry = self.registry.write();
            collabs.complete_collaboration(&mut registry, collab_id, success)
        };
        let Some(notices) = notices else {
            return false;
        };
        self.publish(OrchestrationEvent::CollaborationClosed {
            id: collab_id.to_string(),
            success,
        });
        for message in &notices {
            self.publish_message(message);
        }
        true
    }

    pub fn request_help(&self, requester: &str, help_type: &str, context: &str) -> Option<HelpOutcome> {
        let outcome = {
            let mut collabs = self.collaborations.write();
            let mut registry = self.registry.write();
            collabs.request_help(&mut registry, requester, help_type, context)
        }?;
        self.publish_message(&outcome.request);
        if let Some(collab) = self.get_collaboration(&outcome.collaboration_id) {
            self.publish_opened(&collab);
        }
        Some(outcome)
    }

    pub fn share_knowledge(&self, from: &str, to: &str, atom_ids: &[AtomId]) -> bool {
        let message = {
            let mut collabs = self.collaborations.write();
            let mut registry = self.registry.write();
            collabs.share_knowledge(&mut registry, from, to, atom_ids)
        };
        match message {
            Some(message) => {
                self.publish_message(&message);
                true
            }
            None => false,
        }
    }

    pub fn collaboration_effectiveness(&self) -> CollaborationEffectiveness {
        self.collaborations.read().analyze_effectiveness()
    }

    pub fn agent_collaborations(&self, agent_id: &str) -> Vec<Collaboration> {
        self.collaborations
            .read()
            .get_agent_collaborations(agent_id)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn get_collaboration(&self, id: &str) -> Option<Collaboration> {
        self.collaborations.read().get_collaboration(id).cloned()
    }

    pub fn collaborations(&self) -> Vec<Collaboration> {
        self.collaborations.read().all_collaborations().to_vec()
    }

    pub fn messages(&self) -> Vec<Message> {
        self.collaborations.read().messages().to_vec()
    }

    fn publish_assigned(&self, task_id: &str, agent_id: &str) {
        self.publish(OrchestrationEvent::TaskAssigned {
            task_id: task_id.to_string(),
            agent_id: agent_id.to_string(),
        });
    }

    fn publish_message(&self, message: &Message) {
        self.publish(OrchestrationEvent::MessageSent {
            id: message.id.clone(),
            from: message.from.clone(),
            to: message.to.clone(),
            kind: message.kind,
        });
    }

    fn publish_opened(&self, collab: &Collaboration) {
        self.publish(OrchestrationEvent::CollaborationOpened {
            id: collab.id.clone(),
            goal: collab.goal.clone(),
            participants: collab.participants.clone(),
        });
    }
}
