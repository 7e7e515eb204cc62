//! Progress observation endpoints
//!
//! Clients either poll the JSON snapshot endpoint or open the WebSocket
//! stream, which relays a snapshot every second and closes after the
//! final terminal snapshot has been sent.

use actix_web::{web, HttpRequest, HttpResponse, Responder};
use actix_ws::AggregatedMessage;
use futures_util::StreamExt;
use std::sync::Arc;
use std::time::Duration;

use crate::execution::ProgressTracker;
use crate::AppState;

/// Seconds between relayed snapshots
const POLL_INTERVAL: Duration = Duration::from_secs(1);

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/api/progress/{execution_id}")
            .route(web::get().to(get_progress))
            .route(web::delete().to(remove_progress)),
    );
    cfg.service(
        web::resource("/ws/progress/{execution_id}").route(web::get().to(progress_stream)),
    );
}

/// One point-in-time snapshot
async fn get_progress(data: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let execution_id = path.into_inner();
    match data.progress.get(&execution_id) {
        Some(tracker) => HttpResponse::Ok().json(tracker.snapshot()),
        None => HttpResponse::NotFound().json(serde_json::json!({
            "error": format!("Execution '{}' not found", execution_id)
        })),
    }
}

/// Release registry state once a client is done observing
async fn remove_progress(data: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let execution_id = path.into_inner();
    data.progress.remove(&execution_id);
    HttpResponse::Ok().json(serde_json::json!({
        "execution_id": execution_id,
        "status": "removed"
    }))
}

/// WebSocket progress stream
async fn progress_stream(
    req: HttpRequest,
    stream: web::Payload,
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, actix_web::Error> {
    let execution_id = path.into_inner();
    let tracker = match data.progress.get(&execution_id) {
        Some(tracker) => tracker,
        None => {
            return Ok(HttpResponse::NotFound().json(serde_json::json!({
                "error": format!("Execution '{}' not found", execution_id)
            })));
        }
    };

    let (response, session, msg_stream) = actix_ws::handle(&req, stream)?;
    actix_web::rt::spawn(relay_progress(session, msg_stream, tracker));
    Ok(response)
}

async fn relay_progress(
    mut session: actix_ws::Session,
    msg_stream: actix_ws::MessageStream,
    tracker: Arc<ProgressTracker>,
) {
    log::debug!(
        "[PROGRESS] Client connected to stream for {}",
        tracker.execution_id()
    );

    let mut msg_stream = msg_stream
        .aggregate_continuations()
        .max_continuation_size(64 * 1024);
    let mut interval = tokio::time::interval(POLL_INTERVAL);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let snapshot = tracker.snapshot();
                let terminal = snapshot.status.is_terminal();
                match serde_json::to_string(&snapshot) {
                    Ok(json) => {
                        if session.text(json).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        log::error!("[PROGRESS] Failed to serialize snapshot: {}", e);
                        break;
                    }
                }
                // one final snapshot after the terminal transition, then close
                if terminal {
                    break;
                }
            }
            msg = msg_stream.next() => {
                match msg {
                    Some(Ok(AggregatedMessage::Ping(data))) => {
                        if session.pong(&data).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(AggregatedMessage::Close(_))) | None => break,
                    Some(Err(e)) => {
                        log::warn!("[PROGRESS] WebSocket error: {:?}", e);
                        break;
                    }
                    _ => {}
                }
            }
        }
    }

    let _ = session.close(None).await;
    log::debug!("[PROGRESS] Stream for {} closed", tracker.execution_id());
}
