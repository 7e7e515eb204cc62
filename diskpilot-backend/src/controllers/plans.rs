use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;

use crate::analyzer::{DriveAnalyzer, DriveScanner};
use crate::planner::PlanGenerator;
use crate::AppState;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/plans").route(web::get().to(get_plans)));
    cfg.service(web::resource("/api/plan/{plan_id}").route(web::get().to(get_plan_details)));
}

#[derive(Debug, Deserialize)]
struct PlansQuery {
    /// Force AI or rule-based generation
    use_ai: Option<bool>,
}

/// Generate the three cleanup plans (Conservative, Balanced, Aggressive).
/// A recent plan set is served from the catalog instead of regenerating.
async fn get_plans(data: web::Data<AppState>, query: web::Query<PlansQuery>) -> impl Responder {
    if query.use_ai.is_none() {
        if let Some(plans) = data.catalog.fresh() {
            return HttpResponse::Ok().json(plans);
        }
    }

    let scanner = DriveScanner::new(data.config.scan_mounts.clone());
    let analysis = match web::block(move || DriveAnalyzer::new(scanner).analyze()).await {
        Ok(Ok(analysis)) => analysis,
        Ok(Err(e)) => {
            log::error!("[PLANS] {}", e);
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Plan generation failed: {}", e)
            }));
        }
        Err(e) => {
            log::error!("[PLANS] Worker error: {}", e);
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Plan generation failed"
            }));
        }
    };

    let settings = data.settings.load();
    let generator = PlanGenerator::new(data.config.clone());
    let plans = generator
        .generate_plans(&analysis, &settings, query.use_ai)
        .await;

    data.catalog.store(plans.clone());
    HttpResponse::Ok().json(plans)
}

/// Detailed information for one plan from the last generated set
async fn get_plan_details(data: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let plan_id = path.into_inner();

    if !data.catalog.is_populated() {
        return HttpResponse::NotFound().json(serde_json::json!({
            "error": "No plans available. Call /api/plans first to generate plans."
        }));
    }

    match data.catalog.find(&plan_id) {
        Some(plan) => HttpResponse::Ok().json(plan),
        None => HttpResponse::NotFound().json(serde_json::json!({
            "error": format!("Plan '{}' not found", plan_id)
        })),
    }
}
