use actix_web::{HttpResponse, web};
use serde::Serialize;

use crate::domain::types::AgencyId;
use crate::repository::errors::LoadError;
use crate::routes::api::{
    api_v1_agencies, api_v1_clear_cache, api_v1_clientes, api_v1_export, api_v1_metadata,
    api_v1_status,
};
use crate::services::ServiceError;

pub mod api;

/// Registers the JSON API under `/api`.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(api_v1_agencies)
            .service(api_v1_metadata)
            .service(api_v1_clientes)
            .service(api_v1_export)
            .service(api_v1_clear_cache)
            .service(api_v1_status),
    );
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps a service failure to the JSON error answered to the interface.
///
/// Messages are shown to dealership staff as-is.
pub fn error_response(err: &ServiceError) -> HttpResponse {
    let body = |message: String| ErrorBody { error: message };
    match err {
        ServiceError::NotFound => {
            HttpResponse::NotFound().json(body("Agencia no encontrada.".to_string()))
        }
        ServiceError::Form(message) => {
            HttpResponse::BadRequest().json(body(format!("Filtros inválidos: {message}")))
        }
        ServiceError::Load(LoadError::Failed { file, .. }) => HttpResponse::ServiceUnavailable()
            .json(body(format!(
                "No se pudieron cargar los datos de {file}. Intente de nuevo más tarde."
            ))),
        ServiceError::Load(LoadError::Superseded(_)) => HttpResponse::Conflict().json(body(
            "La carga fue reemplazada por otra selección de agencia.".to_string(),
        )),
        ServiceError::Load(_) => HttpResponse::ServiceUnavailable().json(body(
            "No se pudieron cargar los datos. Intente de nuevo más tarde.".to_string(),
        )),
        ServiceError::Internal(_) => HttpResponse::InternalServerError()
            .json(body("Error interno del servidor.".to_string())),
    }
}

/// Parses the `{agency}` path segment; blank ids are reported as unknown.
pub fn parse_agency(raw: &str) -> Result<AgencyId, ServiceError> {
    AgencyId::new(raw).map_err(|_| ServiceError::NotFound)
}
