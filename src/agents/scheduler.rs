//! # TaskScheduler — Dono das Tarefas
//!
//! Cria, liga, conclui e falha [`Task`]s. Toda operação que toca agentes
//! recebe o [`AgentRegistry`] emprestado: o scheduler não guarda agentes.
//!
//! ## Dois Algoritmos de Atribuição
//!
//! | Caminho | Algoritmo | Candidatos |
//! |---------|-----------|------------|
//! | [`create_task()`](TaskScheduler::create_task), [`assign_pending()`](TaskScheduler::assign_pending) | primeiro agente `idle` na ordem do registro | `idle` |
//! | [`smart_task_assignment()`](TaskScheduler::smart_task_assignment) | maior [`score()`] | `idle`, `thinking` |
//!
//! Sem agente disponível a tarefa fica `pending` até alguém chamar uma
//! das operações de atribuição de novo. Não há nova tentativa automática.
//!
//! ## Pontuação
//!
//! ```text
//! score = success_rate × 100
//!       + 50   se a descrição casa com o papel do agente
//!       − 30   se o agente já segura uma tarefa
//!       + 100 / (avg_response_time + 1)
//! ```
//!
//! Empate: vence o primeiro candidato encontrado.
//!
//! ## Ligação Bidirecional
//!
//! `task.assigned_to == agent.id` ⇔ `agent.current_task == task.id`
//! enquanto a tarefa está `in-progress`. Para manter isso ao religar:
//! - o agente anterior da tarefa é liberado (`idle`, sem tarefa)
//! - a tarefa que o novo agente segurava volta para `pending`, sem agente

use std::collections::HashMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::agent::{Agent, AgentId, AgentState};
use super::registry::AgentRegistry;
use super::task::{Task, TaskId, TaskResult, TaskStatus};

/// Estatísticas agregadas de agentes e tarefas.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentStats {
    pub total_agents: usize,
    /// Agentes com estado diferente de `idle`.
    pub active_agents: usize,
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub pending_tasks: usize,
    /// Média de `success_rate` sobre os agentes (0 sem agentes).
    pub avg_success_rate: f64,
}

/// Pontuação de um agente para uma descrição de tarefa.
pub fn score(agent: &Agent, description: &str) -> f64 {
    let mut score = agent.performance.success_rate * 100.0;
    if agent.role.matches(description) {
        score += 50.0;
    }
    if agent.current_task.is_some() {
        score -= 30.0;
    }
    score + 100.0 / (agent.performance.avg_response_time + 1.0)
}

#[derive(Debug, Default)]
pub struct TaskScheduler {
    tasks: Vec<Task>,
    positions: HashMap<TaskId, usize>,
}

impl TaskScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cria uma tarefa `pending` e tenta a atribuição ingênua na hora.
    pub fn create_task(
        &mut self,
        registry: &mut AgentRegistry,
        description: impl Into<String>,
        priority: i32,
    ) -> Task {
        let task = Task::new(description, priority);
        let idx = self.tasks.len();
        self.positions.insert(task.id.clone(), idx);
        self.tasks.push(task);
        tracing::debug!(id = %self.tasks[idx].id, priority, "scheduler: tarefa criada");

        if let Some(agent_id) = first_idle(registry) {
            self.bind(registry, idx, &agent_id);
        }
        self.tasks[idx].clone()
    }

    /// Liga a tarefa ao agente. `false` se algum ID não existe ou a tarefa já terminou.
    pub fn assign_task(&mut self, registry: &mut AgentRegistry, task_id: &str, agent_id: &str) -> bool {
        let Some(&idx) = self.positions.get(task_id) else {
            return false;
        };
        if !registry.contains(agent_id) || !self.tasks[idx].status.is_active() {
            return false;
        }
        self.bind(registry, idx, agent_id);
        true
    }

    /// Conclui uma tarefa em andamento e devolve o agente a `idle`.
    ///
    /// No-op (`false`) se a tarefa não existe ou não está ligada a um agente.
    pub fn complete_task(
        &mut self,
        registry: &mut AgentRegistry,
        task_id: &str,
        result: Option<TaskResult>,
    ) -> bool {
        self.resolve(registry, task_id, TaskStatus::Completed, result)
    }

    /// Marca uma tarefa em andamento como falha, guardando o motivo.
    pub fn fail_task(
        &mut self,
        registry: &mut AgentRegistry,
        task_id: &str,
        reason: Option<String>,
    ) -> bool {
        self.resolve(registry, task_id, TaskStatus::Failed, reason.map(TaskResult::text))
    }

    /// Atribuição pontuada. Retorna o agente escolhido, ou `None` sem candidatos.
    pub fn smart_task_assignment(&mut self, registry: &mut AgentRegistry, task_id: &str) -> Option<AgentId> {
        let &idx = self.positions.get(task_id)?;
        if !self.tasks[idx].status.is_active() {
            return None;
        }

        let description = &self.tasks[idx].description;
        let mut best: Option<(&Agent, f64)> = None;
        for agent in registry.all_agents().iter().filter(|a| a.state.is_available()) {
            let s = score(agent, description);
            if best.map_or(true, |(_, top)| s > top) {
                best = Some((agent, s));
            }
        }
        let (winner, top) = best?;
        let winner = winner.id.clone();
        tracing::debug!(task = %task_id, agent = %winner, score = top, "scheduler: atribuição pontuada");

        self.bind(registry, idx, &winner);
        Some(winner)
    }

    /// Reexecuta a atribuição ingênua para cada tarefa `pending`, em ordem de criação.
    pub fn assign_pending(&mut self, registry: &mut AgentRegistry) -> Vec<(TaskId, AgentId)> {
        let mut bound = Vec::new();
        for idx in 0..self.tasks.len() {
            if self.tasks[idx].status != TaskStatus::Pending {
                continue;
            }
            let Some(agent_id) = first_idle(registry) else {
                break;
            };
            self.bind(registry, idx, &agent_id);
            bound.push((self.tasks[idx].id.clone(), agent_id));
        }
        bound
    }

    pub fn get_task(&self, id: &str) -> Option<&Task> {
        self.positions.get(id).map(|&i| &self.tasks[i])
    }

    /// Todas as tarefas, em ordem de criação.
    pub fn all_tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Tarefas `pending` ou `in-progress`.
    pub fn get_active_tasks(&self) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.status.is_active()).collect()
    }

    pub fn get_agent_stats(&self, registry: &AgentRegistry) -> AgentStats {
        let agents = registry.all_agents();
        let avg_success_rate = if agents.is_empty() {
            0.0
        } else {
            agents.iter().map(|a| a.performance.success_rate).sum::<f64>() / agents.len() as f64
        };
        AgentStats {
            total_agents: agents.len(),
            active_agents: agents.iter().filter(|a| a.state != AgentState::Idle).count(),
            total_tasks: self.tasks.len(),
            completed_tasks: self.count(TaskStatus::Completed),
            pending_tasks: self.count(TaskStatus::Pending),
            avg_success_rate,
        }
    }

    fn count(&self, status: TaskStatus) -> usize {
        self.tasks.iter().filter(|t| t.status == status).count()
    }

    // O chamador garante que `agent_id` existe no registro.
    fn bind(&mut self, registry: &mut AgentRegistry, idx: usize, agent_id: &str) {
        let task_id = self.tasks[idx].id.clone();

        if let Some(prev) = self.tasks[idx].assigned_to.clone() {
            if prev != agent_id {
                if let Some(prev_agent) = registry.get_agent_mut(&prev) {
                    if prev_agent.current_task.as_deref() == Some(task_id.as_str()) {
                        prev_agent.current_task = None;
                        prev_agent.state = AgentState::Idle;
                    }
                }
            }
        }

        let Some(agent) = registry.get_agent_mut(agent_id) else {
            return;
        };
        if let Some(old) = agent.current_task.replace(task_id.clone()) {
            if old != task_id {
                if let Some(&i) = self.positions.get(&old) {
                    let displaced = &mut self.tasks[i];
                    if displaced.status == TaskStatus::InProgress {
                        displaced.status = TaskStatus::Pending;
                        displaced.assigned_to = None;
                        displaced.assigned_at = None;
                        tracing::debug!(task = %old, agent = %agent_id, "scheduler: tarefa deslocada volta a pending");
                    }
                }
            }
        }
        agent.state = AgentState::Acting;

        let task = &mut self.tasks[idx];
        task.assigned_to = Some(agent_id.to_string());
        task.status = TaskStatus::InProgress;
        task.assigned_at = Some(Utc::now());
        tracing::debug!(task = %task_id, agent = %agent_id, "scheduler: tarefa atribuída");
    }

    fn resolve(
        &mut self,
        registry: &mut AgentRegistry,
        task_id: &str,
        outcome: TaskStatus,
        result: Option<TaskResult>,
    ) -> bool {
        let Some(&idx) = self.positions.get(task_id) else {
            return false;
        };
        let task = &mut self.tasks[idx];
        let Some(agent_id) = task.assigned_to.clone() else {
            return false;
        };
        if task.status != TaskStatus::InProgress {
            return false;
        }

        let now = Utc::now();
        let elapsed = task.response_secs(now);
        task.status = outcome;
        task.result = result;

        if let Some(agent) = registry.get_agent_mut(&agent_id) {
            if agent.current_task.as_deref() == Some(task_id) {
                agent.current_task = None;
                agent.state = AgentState::Idle;
            }
            agent.performance.record(outcome == TaskStatus::Completed, elapsed);
        }
        tracing::debug!(task = %task_id, agent = %agent_id, status = %outcome, "scheduler: tarefa resolvida");
        true
    }
}

fn first_idle(registry: &AgentRegistry) -> Option<AgentId> {
    registry
        .all_agents()
        .iter()
        .find(|a| a.state == AgentState::Idle)
        .map(|a| a.id.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::agent::AgentRole;
    use crate::agents::task::DEFAULT_PRIORITY;

    fn seeded() -> AgentRegistry {
        let mut registry = AgentRegistry::new();
        registry.seed_defaults();
        registry
    }

    /// in-progress ⇒ assigned_to presente e o agente aponta de volta
    fn assert_binding_invariant(scheduler: &TaskScheduler, registry: &AgentRegistry) {
        for task in scheduler.all_tasks() {
            if task.status == TaskStatus::InProgress {
                let agent_id = task.assigned_to.as_ref().expect("in-progress sem agente");
                let agent = registry.get_agent(agent_id).unwrap();
                assert_eq!(agent.current_task.as_deref(), Some(task.id.as_str()));
            }
        }
        for agent in registry.all_agents() {
            if let Some(task_id) = &agent.current_task {
                let task = scheduler.get_task(task_id).unwrap();
                assert_eq!(task.assigned_to.as_deref(), Some(agent.id.as_str()));
            }
        }
    }

    #[test]
    fn test_create_task_assigns_first_idle() {
        let mut registry = seeded();
        let mut scheduler = TaskScheduler::new();
        let first = registry.all_agents()[0].id.clone();

        let task = scheduler.create_task(&mut registry, "qualquer coisa", DEFAULT_PRIORITY);
        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(task.assigned_to.as_deref(), Some(first.as_str()));
        assert_eq!(registry.get_agent(&first).unwrap().state, AgentState::Acting);

        let second = scheduler.create_task(&mut registry, "outra", 1);
        assert_eq!(second.assigned_to.as_deref(), Some(registry.all_agents()[1].id.as_str()));
        assert_binding_invariant(&scheduler, &registry);
    }

    /// Sem agente idle a tarefa acumula em pending
    #[test]
    fn test_pending_accumulates_without_idle_agents() {
        let mut registry = AgentRegistry::new();
        let mut scheduler = TaskScheduler::new();
        let t = scheduler.create_task(&mut registry, "sem ninguém", DEFAULT_PRIORITY);
        assert_eq!(t.status, TaskStatus::Pending);
        assert!(t.assigned_to.is_none());

        registry.create_agent("tardio", AgentRole::Executor, vec![]);
        assert_eq!(scheduler.get_task(&t.id).unwrap().status, TaskStatus::Pending);

        let bound = scheduler.assign_pending(&mut registry);
        assert_eq!(bound.len(), 1);
        assert_eq!(scheduler.get_task(&t.id).unwrap().status, TaskStatus::InProgress);
        assert_binding_invariant(&scheduler, &registry);
    }

    #[test]
    fn test_complete_task_releases_agent() {
        let mut registry = seeded();
        let mut scheduler = TaskScheduler::new();
        let task = scheduler.create_task(&mut registry, "build", DEFAULT_PRIORITY);
        let agent_id = task.assigned_to.clone().unwrap();

        assert!(scheduler.complete_task(&mut registry, &task.id, Some(TaskResult::text("ok"))));
        let done = scheduler.get_task(&task.id).unwrap();
        assert_eq!(done.status, TaskStatus::Completed);
        assert_eq!(done.result, Some(TaskResult::text("ok")));

        let agent = registry.get_agent(&agent_id).unwrap();
        assert_eq!(agent.state, AgentState::Idle);
        assert!(agent.current_task.is_none());
        assert_eq!(agent.performance.tasks_completed, 1);
        assert_eq!(agent.performance.success_rate, 1.0);

        // segunda conclusão não conta de novo
        assert!(!scheduler.complete_task(&mut registry, &task.id, None));
        assert_eq!(registry.get_agent(&agent_id).unwrap().performance.tasks_completed, 1);
    }

    /// complete em tarefa sem agente não muda nada
    #[test]
    fn test_complete_unassigned_is_noop() {
        let mut registry = AgentRegistry::new();
        let mut scheduler = TaskScheduler::new();
        let task = scheduler.create_task(&mut registry, "órfã", DEFAULT_PRIORITY);
        assert!(!scheduler.complete_task(&mut registry, &task.id, None));
        assert_eq!(scheduler.get_task(&task.id).unwrap().status, TaskStatus::Pending);
        assert!(!scheduler.complete_task(&mut registry, "task_inexistente", None));
    }

    #[test]
    fn test_fail_task_updates_success_rate() {
        let mut registry = seeded();
        let mut scheduler = TaskScheduler::new();
        let a = scheduler.create_task(&mut registry, "a", DEFAULT_PRIORITY);
        let agent_id = a.assigned_to.clone().unwrap();
        scheduler.complete_task(&mut registry, &a.id, None);

        let b = scheduler.create_task(&mut registry, "b", DEFAULT_PRIORITY);
        assert_eq!(b.assigned_to.as_deref(), Some(agent_id.as_str()));
        assert!(scheduler.fail_task(&mut registry, &b.id, Some("timeout".into())));

        let failed = scheduler.get_task(&b.id).unwrap();
        assert_eq!(failed.status, TaskStatus::Failed);
        assert_eq!(failed.result, Some(TaskResult::text("timeout")));

        let perf = &registry.get_agent(&agent_id).unwrap().performance;
        assert_eq!(perf.tasks_completed, 1);
        assert_eq!(perf.success_rate, 0.5);
    }

    /// Agente que saiu de `acting` (pensando ou conversando) ainda é liberado
    #[test]
    fn test_resolve_releases_thinking_and_communicating_agents() {
        let mut registry = seeded();
        let mut scheduler = TaskScheduler::new();

        let a = scheduler.create_task(&mut registry, "a", DEFAULT_PRIORITY);
        let thinker = a.assigned_to.clone().unwrap();
        assert!(registry.update_agent_state(&thinker, AgentState::Thinking));

        let b = scheduler.create_task(&mut registry, "b", DEFAULT_PRIORITY);
        let talker = b.assigned_to.clone().unwrap();
        assert_ne!(thinker, talker);
        assert!(registry.update_agent_state(&talker, AgentState::Communicating));

        assert!(scheduler.complete_task(&mut registry, &a.id, None));
        let agent = registry.get_agent(&thinker).unwrap();
        assert_eq!(agent.state, AgentState::Idle);
        assert_eq!(agent.current_task, None);
        assert_eq!(agent.performance.tasks_completed, 1);
        assert_eq!(agent.performance.success_rate, 1.0);

        assert!(scheduler.fail_task(&mut registry, &b.id, Some("canal caiu".into())));
        let agent = registry.get_agent(&talker).unwrap();
        assert_eq!(agent.state, AgentState::Idle);
        assert_eq!(agent.current_task, None);
        assert_eq!(agent.performance.tasks_completed, 0);
        assert_eq!(agent.performance.tasks_failed, 1);
        assert_eq!(agent.performance.success_rate, 0.0);
        assert_binding_invariant(&scheduler, &registry);
    }

    /// Sem agentes idle/thinking: nenhuma atribuição, tarefa segue pending
    #[test]
    fn test_smart_assignment_without_candidates() {
        let mut registry = seeded();
        let ids: Vec<AgentId> = registry.all_agents().iter().map(|a| a.id.clone()).collect();
        for id in &ids {
            registry.update_agent_state(id, AgentState::Communicating);
        }
        let mut scheduler = TaskScheduler::new();
        let task = scheduler.create_task(&mut registry, "plan things", DEFAULT_PRIORITY);
        assert_eq!(task.status, TaskStatus::Pending);

        assert_eq!(scheduler.smart_task_assignment(&mut registry, &task.id), None);
        assert_eq!(scheduler.get_task(&task.id).unwrap().status, TaskStatus::Pending);
    }

    /// success_rate igual: o executor ganha +50 em "execute the build"
    #[test]
    fn test_smart_assignment_prefers_role_keyword() {
        let mut registry = AgentRegistry::new();
        let planner = registry.create_agent("p", AgentRole::Planner, vec![]);
        let executor = registry.create_agent("e", AgentRole::Executor, vec![]);
        let monitor = registry.create_agent("m", AgentRole::Monitor, vec![]);
        for id in [&planner.id, &executor.id, &monitor.id] {
            registry.get_agent_mut(id).unwrap().performance.success_rate = 0.5;
            registry.update_agent_state(id, AgentState::Thinking);
        }

        let description = "execute the build";
        let base = score(registry.get_agent(&planner.id).unwrap(), description);
        let exec = score(registry.get_agent(&executor.id).unwrap(), description);
        assert_eq!(exec - base, 50.0);

        let mut scheduler = TaskScheduler::new();
        let task = scheduler.create_task(&mut registry, description, DEFAULT_PRIORITY);
        assert_eq!(task.status, TaskStatus::Pending);

        let winner = scheduler.smart_task_assignment(&mut registry, &task.id);
        assert_eq!(winner.as_deref(), Some(executor.id.as_str()));
        assert_eq!(registry.get_agent(&executor.id).unwrap().state, AgentState::Acting);
        assert_binding_invariant(&scheduler, &registry);
    }

    /// Empate: vence o primeiro na ordem do registro
    #[test]
    fn test_smart_assignment_tie_goes_to_first() {
        let mut registry = AgentRegistry::new();
        let first = registry.create_agent("a", AgentRole::Coordinator, vec![]);
        registry.create_agent("b", AgentRole::Coordinator, vec![]);
        let mut scheduler = TaskScheduler::new();
        // sem agentes idle no momento da criação
        for a in registry.all_agents().to_vec() {
            registry.update_agent_state(&a.id, AgentState::Thinking);
        }
        let task = scheduler.create_task(&mut registry, "coordenar", DEFAULT_PRIORITY);
        assert_eq!(
            scheduler.smart_task_assignment(&mut registry, &task.id).as_deref(),
            Some(first.id.as_str())
        );
    }

    #[test]
    fn test_score_penalizes_busy_agent() {
        let mut registry = AgentRegistry::new();
        let a = registry.create_agent("a", AgentRole::Learner, vec![]);
        let idle_score = score(registry.get_agent(&a.id).unwrap(), "learn rust");
        registry.get_agent_mut(&a.id).unwrap().current_task = Some("task_x".into());
        let busy_score = score(registry.get_agent(&a.id).unwrap(), "learn rust");
        assert_eq!(idle_score - busy_score, 30.0);
        assert_eq!(idle_score, 150.0);
    }

    /// Religar mantém a relação bidirecional
    #[test]
    fn test_rebinding_keeps_invariant() {
        let mut registry = seeded();
        let mut scheduler = TaskScheduler::new();
        let t1 = scheduler.create_task(&mut registry, "t1", DEFAULT_PRIORITY);
        let t2 = scheduler.create_task(&mut registry, "t2", DEFAULT_PRIORITY);
        let a1 = t1.assigned_to.clone().unwrap();
        let a2 = t2.assigned_to.clone().unwrap();

        // t1 passa para a2: a1 fica livre, t2 volta a pending
        assert!(scheduler.assign_task(&mut registry, &t1.id, &a2));
        assert_eq!(registry.get_agent(&a1).unwrap().state, AgentState::Idle);
        assert!(registry.get_agent(&a1).unwrap().current_task.is_none());
        let t2_now = scheduler.get_task(&t2.id).unwrap();
        assert_eq!(t2_now.status, TaskStatus::Pending);
        assert!(t2_now.assigned_to.is_none());
        assert_binding_invariant(&scheduler, &registry);

        assert!(!scheduler.assign_task(&mut registry, &t1.id, "agent_nenhum"));
        assert!(!scheduler.assign_task(&mut registry, "task_nenhuma", &a1));
    }

    #[test]
    fn test_agent_stats() {
        let mut registry = seeded();
        let mut scheduler = TaskScheduler::new();
        assert_eq!(scheduler.get_agent_stats(&registry).avg_success_rate, 0.0);

        let t = scheduler.create_task(&mut registry, "x", DEFAULT_PRIORITY);
        scheduler.create_task(&mut registry, "y", DEFAULT_PRIORITY);
        scheduler.complete_task(&mut registry, &t.id, None);

        let stats = scheduler.get_agent_stats(&registry);
        assert_eq!(stats.total_agents, 5);
        assert_eq!(stats.active_agents, 1);
        assert_eq!(stats.total_tasks, 2);
        assert_eq!(stats.completed_tasks, 1);
        assert_eq!(stats.pending_tasks, 0);
        assert!((stats.avg_success_rate - 0.2).abs() < 1e-9);
        assert_eq!(scheduler.get_active_tasks().len(), 1);
        assert_eq!(scheduler.get_agent_stats(&AgentRegistry::new()).avg_success_rate, 0.0);
    }
}
