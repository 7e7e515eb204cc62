use actix_web::{web, HttpResponse, Responder};

use crate::analyzer::{DriveAnalyzer, DriveScanner};
use crate::AppState;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/analyze").route(web::get().to(analyze_drives)));
}

/// Analyze all drives: usage statistics, top space consumers, and
/// imbalance detection.
async fn analyze_drives(data: web::Data<AppState>) -> impl Responder {
    let scanner = DriveScanner::new(data.config.scan_mounts.clone());

    // directory sizing walks real filesystems; keep it off the executor
    let result = web::block(move || DriveAnalyzer::new(scanner).analyze()).await;

    match result {
        Ok(Ok(analysis)) => HttpResponse::Ok().json(analysis),
        Ok(Err(e)) => {
            log::error!("[ANALYSIS] {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Analysis failed: {}", e)
            }))
        }
        Err(e) => {
            log::error!("[ANALYSIS] Worker error: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Analysis failed"
            }))
        }
    }
}
