//! # Handlers HTTP — Os Endpoints da Aplicação
//!
//! Cada função pública neste módulo é um handler Axum, mapeado a uma
//! rota em [`super::create_router()`]. Todos falam JSON, exceto
//! `GET /events` (SSE).
//!
//! ## Padrão de Resposta
//!
//! | Situação | Resposta |
//! |----------|----------|
//! | GET de entidade inexistente | `404` |
//! | mutação sobre ID inexistente | `200` com `false` / `null` no corpo |
//! | nenhum candidato (atribuição, ajuda) | `200` com `null` |
//! | snapshot malformado no import | `200` com `"imported": false` |
//!
//! Mutações na store disparam o autosave ([`AppState::autosave()`]).

use std::convert::Infallible;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use axum::response::IntoResponse;
use axum::Json;
use futures_util::stream::StreamExt;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio_stream::wrappers::BroadcastStream;

use super::state::AppState;
use crate::agents::{
    Agent, AgentRole, AgentState, AgentStats, Collaboration, CollaborationEffectiveness,
    HelpOutcome, Message, MessageContent, MessageKind, Task, TaskResult, DEFAULT_PRIORITY,
};
use crate::core::{
    Atom, AtomId, AtomType, CognitiveProcess, Metadata, ProcessKind, ProcessUpdate,
    StoreStatistics, TruthValueUpdate,
};
use crate::web::events::OrchestrationEvent;

// ─── Corpos de requisição ─────────────────────────────────────────

#[derive(Deserialize)]
pub struct AtomQuery {
    #[serde(rename = "type")]
    pub atom_type: Option<AtomType>,
}

#[derive(Deserialize)]
pub struct CreateAtomRequest {
    #[serde(rename = "type")]
    pub atom_type: AtomType,
    pub name: String,
    #[serde(default)]
    pub outgoing: Option<Vec<AtomId>>,
    #[serde(default)]
    pub metadata: Option<Metadata>,
}

#[derive(Deserialize)]
pub struct CreateProcessRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ProcessKind,
    #[serde(default)]
    pub target_atoms: Vec<AtomId>,
}

#[derive(Deserialize)]
pub struct CreateAgentRequest {
    pub name: String,
    pub role: AgentRole,
    #[serde(default)]
    pub capabilities: Vec<String>,
}

#[derive(Deserialize)]
pub struct AgentStateRequest {
    pub state: AgentState,
}

#[derive(Deserialize)]
pub struct CreateTaskRequest {
    pub description: String,
    #[serde(default)]
    pub priority: Option<i32>,
}

#[derive(Deserialize, Default)]
pub struct CompleteTaskRequest {
    #[serde(default)]
    pub result: Option<TaskResult>,
}

#[derive(Deserialize, Default)]
pub struct FailTaskRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Deserialize)]
pub struct SendMessageRequest {
    pub from: String,
    pub to: String,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub content: MessageContent,
}

#[derive(Deserialize)]
pub struct CreateCollaborationRequest {
    pub participants: Vec<String>,
    pub goal: String,
}

#[derive(Deserialize)]
pub struct CollaborationMessageRequest {
    pub from: String,
    pub content: MessageContent,
}

#[derive(Deserialize)]
pub struct CompleteCollaborationRequest {
    pub success: bool,
}

#[derive(Deserialize)]
pub struct HelpRequest {
    pub requester: String,
    pub help_type: String,
    #[serde(default)]
    pub context: String,
}

#[derive(Deserialize)]
pub struct ShareKnowledgeRequest {
    pub from: String,
    pub to: String,
    pub atom_ids: Vec<AtomId>,
}

#[derive(Deserialize)]
pub struct ConsoleRequest {
    pub line: String,
}

// ─── Corpos de resposta ───────────────────────────────────────────

/// Resposta de `GET /status`.
#[derive(Serialize)]
pub struct StatusResponse {
    pub atoms: usize,
    pub processes: usize,
    pub agents: usize,
    pub active_tasks: usize,
    pub orchestration_active: bool,
}

#[derive(Serialize)]
pub struct ConsoleResponse {
    pub output: String,
}

// ─── Store ────────────────────────────────────────────────────────

/// GET `/status` — resumo rápido do sistema.
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let (atoms, processes) = {
        let store = state.store().read();
        (store.atom_count(), store.process_count())
    };
    Json(StatusResponse {
        atoms,
        processes,
        agents: state.orchestrator.agents().len(),
        active_tasks: state.orchestrator.active_tasks().len(),
        orchestration_active: state.orchestrator.is_orchestration_active(),
    })
}

/// GET `/stats` — estatísticas da KnowledgeStore.
pub async fn store_stats(State(state): State<AppState>) -> Json<StoreStatistics> {
    Json(state.store().read().statistics())
}

/// GET `/atoms?type=T` — átomos de um tipo, ou todos sem filtro.
pub async fn list_atoms(State(state): State<AppState>, Query(query): Query<AtomQuery>) -> Json<Vec<Atom>> {
    let store = state.store().read();
    let atoms = match query.atom_type {
        Some(t) => store.get_atoms_by_type(t).into_iter().cloned().collect(),
        None => store.all_atoms().to_vec(),
    };
    Json(atoms)
}

/// POST `/atoms` — cria um átomo.
pub async fn create_atom(State(state): State<AppState>, Json(req): Json<CreateAtomRequest>) -> Json<Atom> {
    let atom = state
        .store()
        .write()
        .create_atom(req.atom_type, req.name, req.outgoing, req.metadata);
    state.autosave();
    Json(atom)
}

/// GET `/atoms/{id}`.
pub async fn get_atom(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Atom>, StatusCode> {
    state
        .store()
        .read()
        .get_atom(&id)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

/// PATCH `/atoms/{id}/truth` — merge parcial do TruthValue.
pub async fn update_truth(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<TruthValueUpdate>,
) -> Json<Value> {
    let updated = state.store().write().update_truth_value(&id, &update);
    if updated {
        state.autosave();
    }
    Json(json!({ "updated": updated }))
}

/// PUT `/atoms/{id}/metadata` — substitui os metadados (`null` remove).
pub async fn set_metadata(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(metadata): Json<Option<Metadata>>,
) -> Json<Value> {
    let updated = state.store().write().set_metadata(&id, metadata);
    if updated {
        state.autosave();
    }
    Json(json!({ "updated": updated }))
}

/// POST `/processes`.
pub async fn create_process(
    State(state): State<AppState>,
    Json(req): Json<CreateProcessRequest>,
) -> Json<CognitiveProcess> {
    let process = state
        .store()
        .write()
        .create_process(req.name, req.kind, req.target_atoms);
    state.autosave();
    Json(process)
}

/// PATCH `/processes/{id}` — merge raso dos campos informados.
pub async fn update_process(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<ProcessUpdate>,
) -> Json<Value> {
    let updated = state.store().write().update_process(&id, &update);
    if updated {
        state.autosave();
    }
    Json(json!({ "updated": updated }))
}

/// POST `/knowledge/reset` — esvazia a store.
pub async fn reset_knowledge(State(state): State<AppState>) -> Json<StoreStatistics> {
    let stats = {
        let mut store = state.store().write();
        store.clear();
        store.statistics()
    };
    state.orchestrator.publish(OrchestrationEvent::StoreReset);
    state.autosave();
    tracing::info!("KnowledgeStore resetada via HTTP");
    Json(stats)
}

/// GET `/snapshot` — documento JSON completo.
pub async fn export_snapshot(State(state): State<AppState>) -> impl IntoResponse {
    match state.store().read().export_snapshot() {
        Ok(payload) => Ok(([(header::CONTENT_TYPE, "application/json")], payload)),
        Err(e) => {
            tracing::error!(error = %e, "Falha ao exportar snapshot");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// POST `/snapshot` — substitui a store pelo documento enviado.
///
/// O corpo é lido como bytes crus: UTF-8 inválido ou JSON malformado
/// vira `"imported": false` (e store vazia), não um 4xx.
pub async fn import_snapshot(State(state): State<AppState>, body: Bytes) -> Json<Value> {
    let (imported, atoms, processes) = {
        let mut store = state.store().write();
        let imported = match std::str::from_utf8(&body) {
            Ok(payload) => store.import_snapshot(payload),
            Err(e) => {
                tracing::warn!(error = %e, "Snapshot recebido não é UTF-8, store esvaziada");
                store.clear();
                false
            }
        };
        (imported, store.atom_count(), store.process_count())
    };
    if imported {
        state
            .orchestrator
            .publish(OrchestrationEvent::SnapshotImported { atoms, processes });
    } else {
        state.orchestrator.publish(OrchestrationEvent::StoreReset);
    }
    state.autosave();
    Json(json!({ "imported": imported, "atoms": atoms, "processes": processes }))
}

// ─── Agentes ──────────────────────────────────────────────────────

pub async fn list_agents(State(state): State<AppState>) -> Json<Vec<Agent>> {
    Json(state.orchestrator.agents())
}

/// GET `/agents/{id}`.
pub async fn get_agent(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Agent>, StatusCode> {
    state.orchestrator.get_agent(&id).map(Json).ok_or(StatusCode::NOT_FOUND)
}

pub async fn create_agent(State(state): State<AppState>, Json(req): Json<CreateAgentRequest>) -> Json<Agent> {
    let agent = state
        .orchestrator
        .create_agent(&req.name, req.role, req.capabilities);
    // o processo "Agent: <nome>" mudou a store
    state.autosave();
    Json(agent)
}

pub async fn update_agent_state(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<AgentStateRequest>,
) -> Json<Value> {
    let updated = state.orchestrator.update_agent_state(&id, req.state);
    Json(json!({ "updated": updated }))
}

pub async fn agent_stats(State(state): State<AppState>) -> Json<AgentStats> {
    Json(state.orchestrator.agent_stats())
}

/// GET `/agents/{id}/collaborations` — 404 se o agente não existe.
pub async fn agent_collaborations(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Collaboration>>, StatusCode> {
    if state.orchestrator.get_agent(&id).is_none() {
        return Err(StatusCode::NOT_FOUND);
    }
    Ok(Json(state.orchestrator.agent_collaborations(&id)))
}

pub async fn start_orchestration(State(state): State<AppState>) -> Json<Value> {
    state.orchestrator.start_orchestration();
    Json(json!({ "active": true }))
}

pub async fn stop_orchestration(State(state): State<AppState>) -> Json<Value> {
    state.orchestrator.stop_orchestration();
    Json(json!({ "active": false }))
}

// ─── Tarefas ──────────────────────────────────────────────────────

/// GET `/tasks` — todas as tarefas, em ordem de criação.
pub async fn list_tasks(State(state): State<AppState>) -> Json<Vec<Task>> {
    Json(state.orchestrator.tasks())
}

/// GET `/tasks/{id}`.
pub async fn get_task(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Task>, StatusCode> {
    state.orchestrator.get_task(&id).map(Json).ok_or(StatusCode::NOT_FOUND)
}

pub async fn active_tasks(State(state): State<AppState>) -> Json<Vec<Task>> {
    Json(state.orchestrator.active_tasks())
}

pub async fn create_task(State(state): State<AppState>, Json(req): Json<CreateTaskRequest>) -> Json<Task> {
    let priority = req.priority.unwrap_or(DEFAULT_PRIORITY);
    Json(state.orchestrator.create_task(&req.description, priority))
}

pub async fn assign_task(
    State(state): State<AppState>,
    Path((task_id, agent_id)): Path<(String, String)>,
) -> Json<Value> {
    let assigned = state.orchestrator.assign_task(&task_id, &agent_id);
    Json(json!({ "assigned": assigned }))
}

pub async fn smart_assign(State(state): State<AppState>, Path(task_id): Path<String>) -> Json<Value> {
    let agent_id = state.orchestrator.smart_task_assignment(&task_id);
    Json(json!({ "agent_id": agent_id }))
}

pub async fn complete_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    Json(req): Json<CompleteTaskRequest>,
) -> Json<Value> {
    let completed = state.orchestrator.complete_task(&task_id, req.result);
    Json(json!({ "completed": completed }))
}

pub async fn fail_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    Json(req): Json<FailTaskRequest>,
) -> Json<Value> {
    let failed = state.orchestrator.fail_task(&task_id, req.reason);
    Json(json!({ "failed": failed }))
}

pub async fn assign_pending(State(state): State<AppState>) -> Json<Value> {
    let assigned = state.orchestrator.assign_pending();
    Json(json!({ "assigned": assigned }))
}

// ─── Mensagens e colaborações ─────────────────────────────────────

/// GET `/messages` — log global de mensagens.
pub async fn list_messages(State(state): State<AppState>) -> Json<Vec<Message>> {
    Json(state.orchestrator.messages())
}

pub async fn send_message(State(state): State<AppState>, Json(req): Json<SendMessageRequest>) -> Json<Message> {
    Json(
        state
            .orchestrator
            .send_message(&req.from, &req.to, req.kind, req.content),
    )
}

pub async fn list_collaborations(State(state): State<AppState>) -> Json<Vec<Collaboration>> {
    Json(state.orchestrator.collaborations())
}

/// GET `/collaborations/{id}`.
pub async fn get_collaboration(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Collaboration>, StatusCode> {
    state
        .orchestrator
        .get_collaboration(&id)
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

pub async fn create_collaboration(
    State(state): State<AppState>,
    Json(req): Json<CreateCollaborationRequest>,
) -> Json<Collaboration> {
    Json(
        state
            .orchestrator
            .create_collaboration(req.participants, &req.goal),
    )
}

pub async fn collaboration_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<CollaborationMessageRequest>,
) -> Json<Option<Message>> {
    Json(
        state
            .orchestrator
            .send_collaboration_message(&id, &req.from, req.content),
    )
}

pub async fn complete_collaboration(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<CompleteCollaborationRequest>,
) -> Json<Value> {
    let completed = state.orchestrator.complete_collaboration(&id, req.success);
    Json(json!({ "completed": completed }))
}

pub async fn request_help(State(state): State<AppState>, Json(req): Json<HelpRequest>) -> Json<Option<HelpOutcome>> {
    Json(
        state
            .orchestrator
            .request_help(&req.requester, &req.help_type, &req.context),
    )
}

pub async fn share_knowledge(
    State(state): State<AppState>,
    Json(req): Json<ShareKnowledgeRequest>,
) -> Json<Value> {
    let shared = state
        .orchestrator
        .share_knowledge(&req.from, &req.to, &req.atom_ids);
    Json(json!({ "shared": shared }))
}

pub async fn collaboration_effectiveness(State(state): State<AppState>) -> Json<CollaborationEffectiveness> {
    Json(state.orchestrator.collaboration_effectiveness())
}

// ─── Console e eventos ────────────────────────────────────────────

/// POST `/console` — executa uma linha no console compartilhado.
pub async fn console(State(state): State<AppState>, Json(req): Json<ConsoleRequest>) -> Json<ConsoleResponse> {
    let ctx = state.console_context();
    let output = state.console.lock().execute(&req.line, &ctx);
    Json(ConsoleResponse { output })
}

/// GET `/events` — Stream SSE de [`OrchestrationEvent`]s.
///
/// Keep-alive a cada 15s. Se o assinante ficar para trás, os eventos
/// perdidos são descartados em silêncio.
pub async fn sse_events(
    State(state): State<AppState>,
) -> Sse<impl futures_util::Stream<Item = Result<SseEvent, Infallible>>> {
    let rx = state.orchestrator.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|result| async move {
        let event = result.ok()?;
        let data = serde_json::to_string(&event).ok()?;
        Some(Ok(SseEvent::default().event(event.name()).data(data)))
    });
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
