use actix_multipart::Multipart;
use actix_web::{Error, HttpResponse, web};
use futures::{StreamExt, TryStreamExt};
use log::{error, info};
use serde::Serialize;
use serde_json::json;
use shared::ClassifierResponse;

use crate::model::{MODEL_VERSION, Model};

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/predict").route(web::post().to(handle_predict)))
        .service(web::resource("/health").route(web::get().to(health)));
}

async fn handle_predict(model: web::Data<Model>, mut payload: Multipart) -> Result<HttpResponse, Error> {
    let mut image_data = Vec::new();

    // The first non-empty part is the image.
    while let Ok(Some(mut field)) = payload.try_next().await {
        while let Some(chunk) = field.next().await {
            let data = chunk?;
            image_data.extend_from_slice(&data);
        }
        if !image_data.is_empty() {
            break;
        }
    }

    if image_data.is_empty() {
        return Ok(HttpResponse::BadRequest().json(ErrorResponse {
            error: "No image file in request".into(),
        }));
    }

    match model.inference(&image_data) {
        Ok(predictions) => {
            let (class, confidence) = model.calculate_result(&predictions);
            info!("Predicted {} ({:.3}) for {} byte upload", class, confidence, image_data.len());
            Ok(HttpResponse::Ok().json(ClassifierResponse {
                class,
                confidence,
                model_version: MODEL_VERSION.to_string(),
            }))
        }
        Err(e) => {
            error!("Model inference error: {}", e);
            Ok(HttpResponse::BadRequest().json(ErrorResponse { error: e.to_string() }))
        }
    }
}

async fn health(model: web::Data<Model>) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "model_version": MODEL_VERSION,
        "labels": model.labels(),
    }))
}
