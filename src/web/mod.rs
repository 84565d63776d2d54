//! # Módulo Web — API JSON + SSE
//!
//! Camada HTTP construída com **Axum**, expondo as superfícies de
//! consulta, mutação e persistência como JSON.
//!
//! ## Rotas
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │ Store                                                           │
//! │  GET  /status  /stats  /atoms?type=T  /atoms/{id}  /snapshot    │
//! │  POST /atoms  /processes  /knowledge/reset  /snapshot           │
//! │  PATCH /atoms/{id}/truth  /processes/{id}                       │
//! │  PUT  /atoms/{id}/metadata                                      │
//! ├─────────────────────────────────────────────────────────────────┤
//! │ Agentes                                                         │
//! │  GET  /agents  /agents/{id}  /agents/stats                      │
//! │       /agents/{id}/collaborations                               │
//! │  POST /agents  /orchestration/start  /orchestration/stop        │
//! │  PUT  /agents/{id}/state                                        │
//! ├─────────────────────────────────────────────────────────────────┤
//! │ Tarefas                                                         │
//! │  GET  /tasks  /tasks/{id}  /tasks/active                        │
//! │  POST /tasks  /tasks/assign-pending  /tasks/{id}/smart-assign   │
//! │       /tasks/{id}/assign/{agent_id}  /tasks/{id}/complete|fail  │
//! ├─────────────────────────────────────────────────────────────────┤
//! │ Mensagens                                                       │
//! │  POST /messages  /collaborations  /collaborations/{id}/messages │
//! │       /collaborations/{id}/complete  /help  /knowledge/share    │
//! │  GET  /messages  /collaborations  /collaborations/{id}          │
//! │       /collaborations/effectiveness                             │
//! ├─────────────────────────────────────────────────────────────────┤
//! │ POST /console        GET /events (SSE)                          │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Submódulos
//!
//! | Módulo | Responsabilidade |
//! |--------|------------------|
//! | [`state`] | Estado compartilhado (`AppState`) |
//! | [`events`] | Enum de eventos SSE da orquestração |
//! | [`handlers`] | Handlers Axum para cada rota |

pub mod events;
pub mod handlers;
pub mod state;

use axum::routing::{get, patch, post, put};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use state::AppState;

/// Cria o router Axum com todas as rotas da aplicação.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // ── Store ─────────────────────────────────────────────
        .route("/status", get(handlers::status))
        .route("/stats", get(handlers::store_stats))
        .route("/atoms", get(handlers::list_atoms).post(handlers::create_atom))
        .route("/atoms/{id}", get(handlers::get_atom))
        .route("/atoms/{id}/truth", patch(handlers::update_truth))
        .route("/atoms/{id}/metadata", put(handlers::set_metadata))
        .route("/processes", post(handlers::create_process))
        .route("/processes/{id}", patch(handlers::update_process))
        .route("/knowledge/reset", post(handlers::reset_knowledge))
        .route(
            "/snapshot",
            get(handlers::export_snapshot).post(handlers::import_snapshot),
        )
        // ── Agentes ───────────────────────────────────────────
        .route("/agents", get(handlers::list_agents).post(handlers::create_agent))
        .route("/agents/stats", get(handlers::agent_stats))
        .route("/agents/{id}", get(handlers::get_agent))
        .route("/agents/{id}/state", put(handlers::update_agent_state))
        .route("/agents/{id}/collaborations", get(handlers::agent_collaborations))
        .route("/orchestration/start", post(handlers::start_orchestration))
        .route("/orchestration/stop", post(handlers::stop_orchestration))
        // ── Tarefas ───────────────────────────────────────────
        .route("/tasks", get(handlers::list_tasks).post(handlers::create_task))
        .route("/tasks/active", get(handlers::active_tasks))
        .route("/tasks/assign-pending", post(handlers::assign_pending))
        .route("/tasks/{id}", get(handlers::get_task))
        .route("/tasks/{id}/assign/{agent_id}", post(handlers::assign_task))
        .route("/tasks/{id}/smart-assign", post(handlers::smart_assign))
        .route("/tasks/{id}/complete", post(handlers::complete_task))
        .route("/tasks/{id}/fail", post(handlers::fail_task))
        // ── Mensagens e colaborações ──────────────────────────
        .route("/messages", get(handlers::list_messages).post(handlers::send_message))
        .route(
            "/collaborations",
            get(handlers::list_collaborations).post(handlers::create_collaboration),
        )
        .route(
            "/collaborations/effectiveness",
            get(handlers::collaboration_effectiveness),
        )
        .route("/collaborations/{id}", get(handlers::get_collaboration))
        .route("/collaborations/{id}/messages", post(handlers::collaboration_message))
        .route("/collaborations/{id}/complete", post(handlers::complete_collaboration))
        .route("/help", post(handlers::request_help))
        .route("/knowledge/share", post(handlers::share_knowledge))
        // ── Console e eventos ─────────────────────────────────
        .route("/console", post(handlers::console))
        .route("/events", get(handlers::sse_events))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
