use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};

use events_api::{BatchStatistics, iso_now};
use events_engine::InputError;

use super::AppState;

// ═══════════════════════════════════════════════════════════════
//  Response body
// ═══════════════════════════════════════════════════════════════

/// Тело ответа триггера. HTTP-статус всегда 200: успех или провал
/// передаются только здесь.
#[derive(Debug, Serialize)]
struct TriggerResponse {
    miztiik_event_processed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    resp: Option<BatchStatistics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_processed_on: Option<String>,
    msg: String,
}

impl TriggerResponse {
    fn rejected(msg: String) -> Self {
        Self {
            miztiik_event_processed: false,
            count: None,
            resp: None,
            last_processed_on: None,
            msg,
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  GET|POST /api/events?count=N  (или JSON {"count": N})
// ═══════════════════════════════════════════════════════════════

#[derive(Deserialize)]
pub(crate) struct TriggerParams {
    count: Option<String>,
}

pub(crate) async fn handle_trigger(
    State(state): State<AppState>,
    Query(params): Query<TriggerParams>,
    body: Bytes,
) -> impl IntoResponse {
    let count = match resolve_count(params.count.as_deref(), &body) {
        Ok(n) => n,
        Err(e) => {
            tracing::warn!(error = %e, "rejected trigger");
            return axum::Json(TriggerResponse::rejected(e.to_string()));
        }
    };
    tracing::info!(count, "received trigger");

    let cancel = state.shutdown.child_token();
    let stats = match state.runner.run(count, &cancel).await {
        Ok(stats) => stats,
        Err(e) => {
            tracing::warn!(error = %e, "rejected trigger");
            return axum::Json(TriggerResponse::rejected(e.to_string()));
        }
    };

    let msg = if stats.status {
        format!("Generated {count} messages")
    } else {
        format!(
            "Generated {} of {count} messages: {}",
            stats.total_messages,
            stats.err_msg.as_deref().unwrap_or("unknown error")
        )
    };

    axum::Json(TriggerResponse {
        miztiik_event_processed: true,
        count: Some(count),
        resp: Some(stats),
        last_processed_on: Some(iso_now()),
        msg,
    })
}

/// Достать `count`: сначала query-параметр, затем JSON body.
///
/// Query `count=0` не считается ответом и уступает body; если body
/// пустое, возвращается сам ноль, и его отвергнет валидация batch'а.
pub fn resolve_count(query: Option<&str>, body: &[u8]) -> Result<i64, InputError> {
    let from_query = match query.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => Some(raw.parse::<i64>().map_err(|_| InputError::Invalid(raw.to_string()))?),
        None => None,
    };
    if let Some(n) = from_query.filter(|n| *n != 0) {
        return Ok(n);
    }

    match count_from_body(body) {
        Err(InputError::Missing) => from_query.ok_or(InputError::Missing),
        other => other,
    }
}

fn count_from_body(body: &[u8]) -> Result<i64, InputError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(InputError::Missing);
    }
    let value: serde_json::Value = serde_json::from_slice(body).map_err(|_| InputError::Missing)?;
    match value.get("count") {
        None | Some(serde_json::Value::Null) => Err(InputError::Missing),
        Some(serde_json::Value::Number(n)) => n.as_i64().ok_or_else(|| InputError::Invalid(n.to_string())),
        Some(serde_json::Value::String(s)) => {
            s.trim().parse::<i64>().map_err(|_| InputError::Invalid(s.clone()))
        }
        Some(other) => Err(InputError::Invalid(other.to_string())),
    }
}

// ═══════════════════════════════════════════════════════════════
//  GET /api/health
// ═══════════════════════════════════════════════════════════════

pub(crate) async fn handle_health() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
