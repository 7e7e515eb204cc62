use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use std::time::Duration;

use crate::execution::{rollback, ExecutionRunner, JournalError};
use crate::models::{ExecuteRequest, ExecuteResponse};
use crate::AppState;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/execute").route(web::post().to(execute_plan)));
    cfg.service(
        web::resource("/api/execution/{execution_id}/cancel")
            .route(web::post().to(cancel_execution)),
    );
    cfg.service(
        web::resource("/api/execution/{execution_id}/rollback")
            .route(web::post().to(rollback_execution)),
    );
}

/// Start executing a plan in the background. Progress is observed via
/// the progress endpoints until a terminal status appears.
async fn execute_plan(
    data: web::Data<AppState>,
    request: web::Json<ExecuteRequest>,
) -> impl Responder {
    if !data.catalog.is_populated() {
        return HttpResponse::NotFound().json(serde_json::json!({
            "error": "No plans available. Call /api/plans first to generate plans."
        }));
    }

    let plan = match data.catalog.find(&request.plan_id) {
        Some(plan) => plan,
        None => {
            return HttpResponse::NotFound().json(serde_json::json!({
                "error": format!("Plan '{}' not found", request.plan_id)
            }));
        }
    };

    // fresh id per run, so one runner per execution id by construction
    let execution_id = uuid::Uuid::new_v4().to_string();
    let tracker = data.progress.get_or_create(&execution_id);
    let cancel_token = data.progress.cancellation_token(&execution_id);

    let runner = ExecutionRunner::new(
        &execution_id,
        plan,
        request.dry_run,
        tracker,
        cancel_token,
        &data.config.data_dir,
        Duration::from_millis(data.config.dry_run_step_delay_ms),
    );

    log::info!(
        "[EXECUTION] Starting execution {} of plan {} (dry_run={})",
        execution_id,
        request.plan_id,
        request.dry_run
    );
    tokio::spawn(runner.execute());

    HttpResponse::Ok().json(ExecuteResponse {
        execution_id,
        status: "started".to_string(),
        started_at: Utc::now(),
    })
}

/// Request cooperative cancellation; the runner stops before its next
/// action and marks the execution CANCELLED.
async fn cancel_execution(data: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let execution_id = path.into_inner();
    if data.progress.cancel(&execution_id) {
        HttpResponse::Ok().json(serde_json::json!({
            "execution_id": execution_id,
            "status": "cancelling"
        }))
    } else {
        HttpResponse::NotFound().json(serde_json::json!({
            "error": format!("Execution '{}' not found", execution_id)
        }))
    }
}

/// Replay the execution's rollback journal in reverse order
async fn rollback_execution(data: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let execution_id = path.into_inner();

    // never roll back underneath a live runner
    if let Some(tracker) = data.progress.get(&execution_id) {
        let status = tracker.status();
        if !status.is_terminal() {
            return HttpResponse::Conflict().json(serde_json::json!({
                "error": format!("Execution '{}' is still {}", execution_id, status)
            }));
        }
    }

    let data_dir = data.config.data_dir.clone();
    let id = execution_id.clone();
    let result = web::block(move || rollback::rollback(&data_dir, &id)).await;

    match result {
        Ok(Ok(report)) => HttpResponse::Ok().json(report),
        Ok(Err(JournalError::NotFound(_))) => HttpResponse::NotFound().json(serde_json::json!({
            "error": format!("No rollback data found for {}", execution_id)
        })),
        Ok(Err(e)) => {
            log::error!("[EXECUTION] Rollback failed: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Rollback failed: {}", e)
            }))
        }
        Err(e) => {
            log::error!("[EXECUTION] Worker error: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Rollback failed"
            }))
        }
    }
}
