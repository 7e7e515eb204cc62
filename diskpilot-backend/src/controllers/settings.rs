use actix_web::{web, HttpResponse, Responder};

use std::path::Path;

use crate::models::UpdateSettingsRequest;
use crate::util::{validate_api_key, validate_drive_letter};
use crate::AppState;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/api/settings")
            .route(web::get().to(get_settings))
            .route(web::post().to(update_settings)),
    );
}

/// All user preferences: AI configuration, safety settings, and storage
/// locations.
async fn get_settings(data: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(data.settings.load())
}

/// Partial settings update; only provided fields change
async fn update_settings(
    data: web::Data<AppState>,
    request: web::Json<UpdateSettingsRequest>,
) -> impl Responder {
    let request = request.into_inner();

    // reject obviously malformed keys before persisting them
    if let Some(key) = request.api_key.as_deref() {
        if !key.is_empty() {
            let provider = request
                .ai_provider
                .clone()
                .unwrap_or_else(|| data.settings.load().ai_provider);
            if !validate_api_key(key, &provider) {
                return HttpResponse::BadRequest().json(serde_json::json!({
                    "error": format!("API key does not match the {} key format", provider)
                }));
            }
        }
    }

    // target drives are either Windows drive letters or absolute paths
    for drive in [
        request.primary_target_drive.as_deref(),
        request.secondary_target_drive.as_deref(),
    ]
    .into_iter()
    .flatten()
    {
        let trimmed = drive.trim_end_matches(['\\', '/']);
        if !validate_drive_letter(trimmed) && !Path::new(drive).is_absolute() {
            return HttpResponse::BadRequest().json(serde_json::json!({
                "error": format!("Invalid target drive: {}", drive)
            }));
        }
    }

    match data.settings.update(request) {
        Ok(settings) => HttpResponse::Ok().json(settings),
        Err(e) => {
            log::error!("[SETTINGS] {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Failed to save settings: {}", e)
            }))
        }
    }
}
