//! HTTP API wrapping the engine operations 1:1.

use axum::{
	extract::{Path, Query, State},
	http::StatusCode,
	response::{IntoResponse, Json, Response},
	routing::{get, post},
	Router,
};
use recon_core::ReconEngine;
use recon_types::{CreateIntentRequest, IntentId, ReconError};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

/// HTTP front for the reconciliation engine.
pub struct ApiServer {
	port: u16,
	engine: Arc<ReconEngine>,
}

impl ApiServer {
	pub fn new(port: u16, engine: Arc<ReconEngine>) -> Self {
		Self { port, engine }
	}

	pub async fn run(self) -> anyhow::Result<()> {
		let app = router(self.engine);

		let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", self.port)).await?;

		info!("API server listening on port {}", self.port);

		axum::serve(listener, app).await?;

		Ok(())
	}
}

pub fn router(engine: Arc<ReconEngine>) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/intents", post(create_intent).get(list_pending))
		.route("/v1/intents/{id}", get(get_status))
		.with_state(AppState { engine })
		.layer(TraceLayer::new_for_http())
		.layer(CorsLayer::permissive())
}

#[derive(Clone)]
struct AppState {
	engine: Arc<ReconEngine>,
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn create_intent(
	State(state): State<AppState>,
	Json(request): Json<CreateIntentRequest>,
) -> Response {
	match state
		.engine
		.create_intent(
			&request.payer_reference,
			request.expected_amount,
			request.metadata,
		)
		.await
	{
		Ok(receipt) => (StatusCode::CREATED, Json(receipt)).into_response(),
		Err(error) => error_response(error),
	}
}

async fn get_status(State(state): State<AppState>, Path(id): Path<String>) -> Response {
	// An unparsable id cannot name an intent.
	let id = match IntentId::parse(&id) {
		Ok(id) => id,
		Err(_) => return error_response(ReconError::NotFound(id)),
	};

	match state.engine.check_status(&id).await {
		Ok(report) => Json(report).into_response(),
		Err(error) => error_response(error),
	}
}

#[derive(Deserialize)]
struct ListQuery {
	payer_reference: String,
}

async fn list_pending(
	State(state): State<AppState>,
	Query(query): Query<ListQuery>,
) -> Response {
	match state.engine.list_pending(&query.payer_reference).await {
		Ok(intents) => Json(intents).into_response(),
		Err(error) => error_response(error),
	}
}

fn error_response(error: ReconError) -> Response {
	let (status, code) = match &error {
		ReconError::Validation(_) => (StatusCode::BAD_REQUEST, "invalid_input"),
		ReconError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
		_ => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
	};

	(
		status,
		Json(serde_json::json!({
			"error": {
				"code": code,
				"message": error.to_string(),
			}
		})),
	)
		.into_response()
}
