mod types;

use std::collections::{HashMap, HashSet};

use actix_cors::Cors;
use actix_web::{dev::Server, get, post, web, App, HttpResponse, HttpServer, Responder};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::json;
use tracing::{error, info, warn};
use validator::Validate;

pub use types::{
    AdvisoryDto, ConvertRequest, ConvertResponse, ErrorResponse, ExportDto, FileResult,
    UploadRequest,
};

use crate::application::use_cases::batch_converter::BatchConverter;
use crate::domain::conversion::{FileOptions, UploadDescriptor};
use crate::domain::error::AppError;
use crate::infrastructure::config::{ConverterConfig, ServerSettings};

pub struct HttpState {
    pub converter: BatchConverter,
    pub server: ServerSettings,
}

impl HttpState {
    pub fn new(config: &ConverterConfig) -> Self {
        Self {
            converter: BatchConverter::new(config),
            server: config.server.clone(),
        }
    }
}

/// One request slot: either decoded and ready, or rejected up front
enum Slot {
    Ready,
    Rejected(FileResult),
}

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

#[post("/convert")]
async fn convert(data: web::Data<HttpState>, req: web::Json<ConvertRequest>) -> impl Responder {
    let request = req.into_inner();

    if let Err(e) = request.validate() {
        let err = AppError::ValidationError(e.to_string());
        warn!(error = %err, "Rejected convert request");
        return HttpResponse::BadRequest().json(ErrorResponse::from(&err));
    }

    let mut seen = HashSet::with_capacity(request.files.len());
    for file in &request.files {
        if !seen.insert(file.file_name.as_str()) {
            let err = AppError::ValidationError(format!(
                "Duplicate file name in request: {}",
                file.file_name
            ));
            return HttpResponse::BadRequest().json(ErrorResponse::from(&err));
        }
    }

    info!(files = request.files.len(), "Converting uploads");

    let mut slots = Vec::with_capacity(request.files.len());
    let mut uploads = Vec::with_capacity(request.files.len());
    let mut options: HashMap<String, FileOptions> = HashMap::new();

    for file in request.files {
        match STANDARD.decode(file.content_base64.as_bytes()) {
            Ok(content) if content.len() > data.server.max_upload_bytes => {
                let err = AppError::ValidationError(format!(
                    "{} is {} bytes, limit is {}",
                    file.file_name,
                    content.len(),
                    data.server.max_upload_bytes
                ));
                return HttpResponse::BadRequest().json(ErrorResponse::from(&err));
            }
            Ok(content) => {
                options.insert(file.file_name.clone(), file.options);
                uploads.push(UploadDescriptor::new(file.file_name, content));
                slots.push(Slot::Ready);
            }
            Err(e) => {
                let err = AppError::ValidationError(format!("Invalid base64 content: {}", e));
                warn!(file_name = %file.file_name, error = %err, "Skipping upload");
                slots.push(Slot::Rejected(FileResult::failed(&file.file_name, &err)));
            }
        }
    }

    let state = data.clone();
    let batch = match web::block(move || state.converter.convert(&uploads, &options)).await {
        Ok(batch) => batch,
        Err(e) => {
            let err = AppError::Internal(format!("Conversion worker failed: {}", e));
            error!(error = %err, "Batch aborted");
            return HttpResponse::InternalServerError().json(ErrorResponse::from(&err));
        }
    };

    let mut reports = batch.reports.into_iter();
    let results = slots
        .into_iter()
        .filter_map(|slot| match slot {
            Slot::Ready => reports.next().map(FileResult::from),
            Slot::Rejected(result) => Some(result),
        })
        .collect();

    HttpResponse::Ok().json(ConvertResponse {
        batch_id: batch.batch_id.to_string(),
        results,
    })
}

/// Smallest JSON body limit, so tiny upload caps still admit the envelope
const MIN_JSON_LIMIT: usize = 256 * 1024;

/// JSON body limit: base64 inflates uploads by a third
fn json_config(server: &ServerSettings) -> web::JsonConfig {
    let limit = server.max_upload_bytes.saturating_mul(2).max(MIN_JSON_LIMIT);
    web::JsonConfig::default().limit(limit)
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/api").service(health).service(convert));
}

pub fn start_server(config: &ConverterConfig) -> std::io::Result<Server> {
    let state = web::Data::new(HttpState::new(config));
    let json_limit = json_config(&config.server);

    let server = HttpServer::new(move || {
        let cors = Cors::permissive(); // Allow all origins for local tool

        App::new()
            .wrap(cors)
            .app_data(state.clone())
            .app_data(json_limit.clone())
            .configure(configure)
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run();

    info!(
        host = %config.server.host,
        port = config.server.port,
        "HTTP server listening"
    );

    Ok(server)
}
