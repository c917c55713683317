use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{HttpRequest, HttpResponse, Responder, get, post, web};

use crate::dto::main::ClientesQuery;
use crate::forms::main::FilterForm;
use crate::models::config::ServerConfig;
use crate::repository::CsvRepository;
use crate::routes::{error_response, parse_agency};
use crate::services::filter::FilterActivity;
use crate::services::main as main_service;
use crate::services::ServiceError;

fn parse_query(req: &HttpRequest) -> Result<ClientesQuery, ServiceError> {
    FilterForm::from_query(req.query_string())
        .and_then(ClientesQuery::try_from)
        .map_err(|err| {
            log::warn!("Rejected filter query: {err}");
            ServiceError::Form(err.to_string())
        })
}

#[get("/v1/agencies")]
pub async fn api_v1_agencies(repo: web::Data<CsvRepository>) -> impl Responder {
    HttpResponse::Ok().json(main_service::list_agencies(repo.get_ref()))
}

#[get("/v1/agencies/{agency}/metadata")]
pub async fn api_v1_metadata(
    agency: web::Path<String>,
    repo: web::Data<CsvRepository>,
) -> impl Responder {
    let agency = match parse_agency(&agency) {
        Ok(agency) => agency,
        Err(err) => return error_response(&err),
    };

    match main_service::load_metadata(repo.get_ref(), &agency).await {
        Ok(metadata) => HttpResponse::Ok().json(metadata),
        Err(err) => error_response(&err),
    }
}

#[get("/v1/agencies/{agency}/clientes")]
pub async fn api_v1_clientes(
    req: HttpRequest,
    agency: web::Path<String>,
    repo: web::Data<CsvRepository>,
    activity: web::Data<FilterActivity>,
    server_config: web::Data<ServerConfig>,
) -> impl Responder {
    let (agency, query) = match parse_agency(&agency).and_then(|a| Ok((a, parse_query(&req)?))) {
        Ok(parsed) => parsed,
        Err(err) => return error_response(&err),
    };

    match main_service::load_index_page(
        repo.get_ref(),
        activity.get_ref(),
        &agency,
        query,
        server_config.page_size,
    )
    .await
    {
        Ok(page) => HttpResponse::Ok().json(page),
        Err(err) => error_response(&err),
    }
}

#[get("/v1/agencies/{agency}/export")]
pub async fn api_v1_export(
    req: HttpRequest,
    agency: web::Path<String>,
    repo: web::Data<CsvRepository>,
    activity: web::Data<FilterActivity>,
    server_config: web::Data<ServerConfig>,
) -> impl Responder {
    let (agency, query) = match parse_agency(&agency).and_then(|a| Ok((a, parse_query(&req)?))) {
        Ok(parsed) => parsed,
        Err(err) => return error_response(&err),
    };

    match main_service::export_page(
        repo.get_ref(),
        activity.get_ref(),
        &agency,
        query,
        server_config.page_size,
        server_config.export_max_rows,
    )
    .await
    {
        Ok(file) => HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .insert_header(ContentDisposition {
                disposition: DispositionType::Attachment,
                parameters: vec![DispositionParam::Filename(file.file_name)],
            })
            .body(file.body),
        Err(err) => error_response(&err),
    }
}

#[post("/v1/cache/clear")]
pub async fn api_v1_clear_cache(repo: web::Data<CsvRepository>) -> impl Responder {
    main_service::clear_cache(repo.get_ref());
    HttpResponse::NoContent().finish()
}

#[get("/v1/status")]
pub async fn api_v1_status(
    repo: web::Data<CsvRepository>,
    activity: web::Data<FilterActivity>,
) -> impl Responder {
    HttpResponse::Ok().json(main_service::status(repo.get_ref(), activity.get_ref()))
}
