use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use reqwest::Client;
use serde::Serialize;
use tracing::{error, info};

#[derive(Clone)]
pub struct HealthState {
    http: Client,
    llm_base_url: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub upstream_llm: HealthCheck,
    pub checked_at: String,
}

pub fn router(http: Client, llm_base_url: Option<String>) -> Router {
    Router::new()
        .route("/health", get(health))
        .with_state(HealthState { http, llm_base_url })
}

pub async fn spawn(
    bind_address: &str,
    port: u16,
    http: Client,
    llm_base_url: Option<String>,
) -> std::io::Result<()> {
    let address = format!("{bind_address}:{port}");
    let listener = tokio::net::TcpListener::bind(&address).await?;

    info!(
        event_name = "server.health.start",
        bind_address = %address,
        "health endpoint started"
    );

    tokio::spawn(async move {
        if let Err(err) = axum::serve(listener, router(http, llm_base_url)).await {
            error!(
                event_name = "server.health.error",
                error = %err,
                "health endpoint server terminated unexpectedly"
            );
        }
    });

    Ok(())
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let upstream_llm = upstream_check(&state).await;
    // Loss of the model is degradation, not downtime: the deterministic pass
    // still serves every fragment, so the service itself stays ready.
    let ready = upstream_llm.status == "ready";

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        service: HealthCheck {
            status: "ready",
            detail: "minutey-server runtime initialized".to_string(),
        },
        upstream_llm,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

async fn upstream_check(state: &HealthState) -> HealthCheck {
    let Some(base_url) = &state.llm_base_url else {
        return HealthCheck {
            status: "ready",
            detail: "no local upstream configured; remote provider assumed reachable".to_string(),
        };
    };

    match state.http.get(base_url).send().await {
        Ok(response) if response.status().is_success() => HealthCheck {
            status: "ready",
            detail: "upstream llm responded".to_string(),
        },
        Ok(response) => HealthCheck {
            status: "degraded",
            detail: format!("upstream llm returned status {}", response.status()),
        },
        Err(err) => {
            HealthCheck { status: "degraded", detail: format!("upstream llm unreachable: {err}") }
        }
    }
}
