//! # CollaborationManager — Mensagens e Sessões entre Agentes
//!
//! Dono do **log global de mensagens** e das [`Collaboration`]s.
//!
//! ## Efeitos Colaterais no Registro
//!
//! | Operação | Efeito nos agentes |
//! |----------|--------------------|
//! | `send_message` | remetente e destinatário existentes → `communicating` |
//! | `share_knowledge` | destinatário recebe os IDs na memória de trabalho |
//! | `complete_collaboration` | cada participante recebe uma notificação do `system` |
//! | `request_help` | ajudante recebe um `request` |
//!
//! ## Estados Terminais
//!
//! `completed` e `failed` são finais: concluir de novo é no-op.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::{new_id, AtomId};

use super::agent::{AgentId, AgentState};
use super::message::{Message, MessageContent, MessageKind, BROADCAST, SYSTEM_SENDER};
use super::registry::AgentRegistry;

pub type CollaborationId = String;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollaborationStatus {
    Active,
    Completed,
    Failed,
}

impl CollaborationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CollaborationStatus::Active => "active",
            CollaborationStatus::Completed => "completed",
            CollaborationStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, CollaborationStatus::Active)
    }
}

/// Sessão multiagente com objetivo e histórico ordenado.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Collaboration {
    pub id: CollaborationId,
    /// Participantes sem repetição, na ordem informada.
    pub participants: Vec<AgentId>,
    pub goal: String,
    pub status: CollaborationStatus,
    pub messages: Vec<Message>,
    pub timestamp: DateTime<Utc>,
}

/// Resultado de um pedido de ajuda atendido.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HelpOutcome {
    pub helper: AgentId,
    pub collaboration_id: CollaborationId,
    pub request: Message,
}

/// Métricas de efetividade das colaborações.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CollaborationEffectiveness {
    pub total_collaborations: usize,
    /// `completed / (completed + failed)`, 0 sem colaborações resolvidas.
    pub success_rate: f64,
    pub avg_messages_per_collab: f64,
    pub most_collaborative_agent: Option<AgentId>,
}

#[derive(Debug, Default)]
pub struct CollaborationManager {
    collaborations: Vec<Collaboration>,
    positions: HashMap<CollaborationId, usize>,
    log: Vec<Message>,
}

impl CollaborationManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registra a mensagem no log global e põe remetente e destinatário em `communicating`.
    pub fn send_message(
        &mut self,
        registry: &mut AgentRegistry,
        from: &str,
        to: &str,
        kind: MessageKind,
        content: MessageContent,
    ) -> Message {
        let message = Message::new(from, to, kind, content);
        for id in [from, to] {
            if let Some(agent) = registry.get_agent_mut(id) {
                agent.state = AgentState::Communicating;
            }
        }
        tracing::debug!(id = %message.id, from = %from, to = %to, kind = kind.as_str(), "collab: mensagem enviada");
        self.log.push(message.clone());
        message
    }

    /// Abre uma colaboração `active` sem mensagens.
    pub fn create_collaboration(&mut self, participants: Vec<AgentId>, goal: impl Into<String>) -> Collaboration {
        let mut unique: Vec<AgentId> = Vec::with_capacity(participants.len());
        for p in participants {
            if !unique.contains(&p) {
                unique.push(p);
            }
        }
        let collab = Collaboration {
            id: new_id("collab"),
            participants: unique,
            goal: goal.into(),
            status: CollaborationStatus::Active,
            messages: Vec::new(),
            timestamp: Utc::now(),
        };
        tracing::debug!(id = %collab.id, participants = collab.participants.len(), "collab: colaboração aberta");
        self.positions.insert(collab.id.clone(), self.collaborations.len());
        self.collaborations.push(collab.clone());
        collab
    }

    /// Anexa uma mensagem pronta à colaboração. `false` se ela não existe.
    pub fn add_collaboration_message(&mut self, collab_id: &str, message: Message) -> bool {
        match self.get_collaboration_mut(collab_id) {
            Some(collab) => {
                collab.messages.push(message);
                true
            }
            None => false,
        }
    }

    /// Anexa uma mensagem `broadcast` de `from` à colaboração.
    pub fn send_collaboration_message(
        &mut self,
        collab_id: &str,
        from: &str,
        content: MessageContent,
    ) -> Option<Message> {
        let message = Message::new(from, BROADCAST, MessageKind::Broadcast, content);
        self.add_collaboration_message(collab_id, message.clone())
            .then_some(message)
    }

    /// Encerra a colaboração e notifica cada participante.
    ///
    /// `None` se a colaboração não existe ou já terminou.
    pub fn complete_collaboration(
        &mut self,
        registry: &mut AgentRegistry,
        collab_id: &str,
        success: bool,
    ) -> Option<Vec<Message>> {
        let collab = self.get_collaboration_mut(collab_id)?;
        if collab.status.is_terminal() {
            return None;
        }
        collab.status = if success {
            CollaborationStatus::Completed
        } else {
            CollaborationStatus::Failed
        };
        let participants = collab.participants.clone();
        let goal = collab.goal.clone();
        tracing::debug!(id = %collab_id, success, "collab: colaboração encerrada");

        let notices = participants
            .iter()
            .map(|p| {
                let content = MessageContent::CollaborationClosed {
                    collaboration_id: collab_id.to_string(),
                    goal: goal.clone(),
                    success,
                };
                self.send_message(registry, SYSTEM_SENDER, p, MessageKind::Notification, content)
            })
            .collect();
        Some(notices)
    }

    /// Procura um ajudante disponível cujo papel casa com `help_type`.
    ///
    /// O solicitante nunca é candidato. Sem ajudante, nada acontece.
    pub fn request_help(
        &mut self,
        registry: &mut AgentRegistry,
        requester: &str,
        help_type: &str,
        context: &str,
    ) -> Option<HelpOutcome> {
        let helper = registry
            .all_agents()
            .iter()
            .find(|a| a.id != requester && a.state.is_available() && a.role.matches(help_type))
            .map(|a| a.id.clone());
        let Some(helper) = helper else {
            tracing::debug!(requester = %requester, help_type = %help_type, "collab: nenhum ajudante disponível");
            return None;
        };

        let request = self.send_message(
            registry,
            requester,
            &helper,
            MessageKind::Request,
            MessageContent::HelpRequest {
                help_type: help_type.to_string(),
                context: context.to_string(),
            },
        );
        let collab = self.create_collaboration(
            vec![requester.to_string(), helper.clone()],
            format!("Help with: {help_type}"),
        );
        self.add_collaboration_message(&collab.id, request.clone());

        Some(HelpOutcome {
            helper,
            collaboration_id: collab.id,
            request,
        })
    }

    /// Copia os IDs para a memória de trabalho do destinatário e o notifica.
    ///
    /// `false` se algum dos dois agentes não existe.
    pub fn share_knowledge(
        &mut self,
        registry: &mut AgentRegistry,
        from: &str,
        to: &str,
        atom_ids: &[AtomId],
    ) -> Option<Message> {
        if !registry.contains(from) {
            return None;
        }
        let recipient = registry.get_agent_mut(to)?;
        let added = recipient.memory.remember(atom_ids);
        tracing::debug!(from = %from, to = %to, added, "collab: conhecimento compartilhado");

        Some(self.send_message(
            registry,
            from,
            to,
            MessageKind::Notification,
            MessageContent::KnowledgeShared {
                atom_ids: atom_ids.to_vec(),
            },
        ))
    }

    pub fn analyze_effectiveness(&self) -> CollaborationEffectiveness {
        let total = self.collaborations.len();
        let completed = self.count(CollaborationStatus::Completed);
        let resolved = completed + self.count(CollaborationStatus::Failed);
        let messages: usize = self.collaborations.iter().map(|c| c.messages.len()).sum();

        // (agente, participações) na ordem em que aparecem
        let mut tally: Vec<(&AgentId, usize)> = Vec::new();
        for p in self.collaborations.iter().flat_map(|c| &c.participants) {
            match tally.iter_mut().find(|(id, _)| *id == p) {
                Some((_, n)) => *n += 1,
                None => tally.push((p, 1)),
            }
        }
        let mut most: Option<(&AgentId, usize)> = None;
        for (id, n) in tally {
            if most.map_or(true, |(_, top)| n > top) {
                most = Some((id, n));
            }
        }

        CollaborationEffectiveness {
            total_collaborations: total,
            success_rate: if resolved == 0 { 0.0 } else { completed as f64 / resolved as f64 },
            avg_messages_per_collab: if total == 0 { 0.0 } else { messages as f64 / total as f64 },
            most_collaborative_agent: most.map(|(id, _)| id.clone()),
        }
    }

    /// Colaborações de que o agente participa, em ordem de criação.
    pub fn get_agent_collaborations(&self, agent_id: &str) -> Vec<&Collaboration> {
        self.collaborations
            .iter()
            .filter(|c| c.participants.iter().any(|p| p == agent_id))
            .collect()
    }

    pub fn get_collaboration(&self, id: &str) -> Option<&Collaboration> {
        self.positions.get(id).map(|&i| &self.collaborations[i])
    }

    pub fn all_collaborations(&self) -> &[Collaboration] {
        &self.collaborations
    }

    /// Log global de mensagens, em ordem de envio.
    pub fn messages(&self) -> &[Message] {
        &self.log
    }

    fn get_collaboration_mut(&mut self, id: &str) -> Option<&mut Collaboration> {
        match self.positions.get(id) {
            Some(&i) => Some(&mut self.collaborations[i]),
            None => None,
        }
    }

    fn count(&self, status: CollaborationStatus) -> usize {
        self.collaborations.iter().filter(|c| c.status == status).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::agent::AgentRole;

    fn two_agents() -> (AgentRegistry, AgentId, AgentId) {
        let mut registry = AgentRegistry::new();
        let a1 = registry.create_agent("a1", AgentRole::Planner, vec![]).id;
        let a2 = registry.create_agent("a2", AgentRole::Learner, vec![]).id;
        (registry, a1, a2)
    }

    #[test]
    fn test_send_message_sets_communicating() {
        let (mut registry, a1, a2) = two_agents();
        let mut manager = CollaborationManager::new();
        let msg = manager.send_message(&mut registry, &a1, &a2, MessageKind::Request, MessageContent::text("oi"));
        assert_eq!(manager.messages(), &[msg]);
        assert_eq!(registry.get_agent(&a1).unwrap().state, AgentState::Communicating);
        assert_eq!(registry.get_agent(&a2).unwrap().state, AgentState::Communicating);

        // destinatário desconhecido não impede o envio
        manager.send_message(&mut registry, &a1, BROADCAST, MessageKind::Broadcast, MessageContent::text("todos"));
        assert_eq!(manager.messages().len(), 2);
    }

    /// Encerrar com sucesso gera uma notificação do system por participante
    #[test]
    fn test_complete_collaboration_notifies_participants() {
        let mut registry = AgentRegistry::new();
        let mut manager = CollaborationManager::new();
        let collab = manager.create_collaboration(vec!["a1".into(), "a2".into()], "goal");
        assert_eq!(collab.status, CollaborationStatus::Active);
        assert!(collab.messages.is_empty());

        let notices = manager.complete_collaboration(&mut registry, &collab.id, true).unwrap();
        assert_eq!(notices.len(), 2);
        assert_eq!(manager.get_collaboration(&collab.id).unwrap().status, CollaborationStatus::Completed);

        let logged: Vec<&Message> = manager
            .messages()
            .iter()
            .filter(|m| m.kind == MessageKind::Notification)
            .collect();
        assert_eq!(logged.len(), 2);
        assert!(logged.iter().all(|m| m.from == SYSTEM_SENDER));
        assert_eq!(logged[0].to, "a1");
        assert_eq!(logged[1].to, "a2");

        // terminal é final
        assert!(manager.complete_collaboration(&mut registry, &collab.id, false).is_none());
        assert_eq!(manager.get_collaboration(&collab.id).unwrap().status, CollaborationStatus::Completed);
        assert_eq!(manager.messages().len(), 2);
    }

    /// Compartilhar duas vezes não duplica a memória de trabalho
    #[test]
    fn test_share_knowledge_is_idempotent() {
        let (mut registry, a1, a2) = two_agents();
        let mut manager = CollaborationManager::new();
        let ids: Vec<AtomId> = vec!["x".into(), "y".into()];

        let first = manager.share_knowledge(&mut registry, &a1, &a2, &ids).unwrap();
        let second = manager.share_knowledge(&mut registry, &a1, &a2, &ids).unwrap();
        assert_ne!(first.id, second.id);
        assert_eq!(
            second.content,
            MessageContent::KnowledgeShared { atom_ids: ids.clone() }
        );
        assert_eq!(manager.messages().last(), Some(&second));
        assert_eq!(
            registry.get_agent(&a2).unwrap().memory.working_memory,
            vec!["x".to_string(), "y".to_string()]
        );
        assert_eq!(manager.messages().len(), 2);

        assert!(manager.share_knowledge(&mut registry, "agent_fantasma", &a2, &ids).is_none());
        assert!(manager.share_knowledge(&mut registry, &a1, "agent_fantasma", &ids).is_none());
    }

    #[test]
    fn test_collaboration_message_is_broadcast() {
        let mut manager = CollaborationManager::new();
        let collab = manager.create_collaboration(vec!["a1".into(), "a1".into(), "a2".into()], "g");
        assert_eq!(collab.participants, vec!["a1".to_string(), "a2".to_string()]);

        let msg = manager.send_collaboration_message(&collab.id, "a1", MessageContent::text("status?")).unwrap();
        assert_eq!(msg.kind, MessageKind::Broadcast);
        assert_eq!(msg.to, BROADCAST);
        assert_eq!(manager.get_collaboration(&collab.id).unwrap().messages.len(), 1);
        assert!(manager.messages().is_empty());

        assert!(manager.send_collaboration_message("collab_nenhuma", "a1", MessageContent::text("?")).is_none());
    }

    #[test]
    fn test_request_help_picks_matching_helper() {
        let mut registry = AgentRegistry::new();
        registry.seed_defaults();
        let planner = registry.agents_by_role(AgentRole::Planner)[0].id.clone();
        let monitor = registry.agents_by_role(AgentRole::Monitor)[0].id.clone();
        let mut manager = CollaborationManager::new();

        let outcome = manager
            .request_help(&mut registry, &planner, "check the disk", "quota")
            .unwrap();
        assert_eq!(outcome.helper, monitor);
        assert_eq!(outcome.request.kind, MessageKind::Request);

        let collab = manager.get_collaboration(&outcome.collaboration_id).unwrap();
        assert_eq!(collab.goal, "Help with: check the disk");
        assert_eq!(collab.participants, vec![planner.clone(), monitor.clone()]);
        assert_eq!(manager.get_agent_collaborations(&monitor).len(), 1);
    }

    /// O solicitante não ajuda a si mesmo; sem candidato é no-op
    #[test]
    fn test_request_help_without_match_is_noop() {
        let mut registry = AgentRegistry::new();
        let planner = registry.create_agent("p", AgentRole::Planner, vec![]).id;
        let mut manager = CollaborationManager::new();

        assert!(manager.request_help(&mut registry, &planner, "plan", "").is_none());
        assert!(manager.all_collaborations().is_empty());
        assert!(manager.messages().is_empty());
        assert_eq!(registry.get_agent(&planner).unwrap().state, AgentState::Idle);
    }

    #[test]
    fn test_effectiveness_metrics() {
        let mut registry = AgentRegistry::new();
        let mut manager = CollaborationManager::new();
        assert_eq!(manager.analyze_effectiveness().success_rate, 0.0);
        assert_eq!(manager.analyze_effectiveness().most_collaborative_agent, None);

        let c1 = manager.create_collaboration(vec!["a".into(), "b".into()], "g1");
        let c2 = manager.create_collaboration(vec!["b".into(), "a".into()], "g2");
        manager.create_collaboration(vec!["c".into()], "g3");
        manager.send_collaboration_message(&c1.id, "a", MessageContent::text("1"));
        manager.send_collaboration_message(&c1.id, "b", MessageContent::text("2"));
        manager.send_collaboration_message(&c2.id, "b", MessageContent::text("3"));
        manager.complete_collaboration(&mut registry, &c1.id, true);
        manager.complete_collaboration(&mut registry, &c2.id, false);

        let report = manager.analyze_effectiveness();
        assert_eq!(report.total_collaborations, 3);
        assert_eq!(report.success_rate, 0.5);
        assert_eq!(report.avg_messages_per_collab, 1.0);
        // a e b empatam com 2; a apareceu primeiro
        assert_eq!(report.most_collaborative_agent.as_deref(), Some("a"));
    }
}
