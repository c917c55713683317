#[cfg(feature = "data")]
pub mod domain;
#[cfg(feature = "data")]
pub mod dto;
#[cfg(feature = "server")]
pub mod forms;
#[cfg(feature = "data")]
pub mod models;
#[cfg(feature = "data")]
pub mod pagination;
#[cfg(feature = "data")]
pub mod repository;
#[cfg(feature = "server")]
pub mod routes;
#[cfg(feature = "data")]
pub mod services;

#[cfg(feature = "server")]
pub use server::run;

#[cfg(feature = "server")]
mod server {
    use std::sync::Arc;
    use std::time::Duration;

    use actix_cors::Cors;
    use actix_files::Files;
    use actix_web::{App, HttpServer, middleware, web};

    use crate::models::config::{DataSourceConfig, ServerConfig};
    use crate::repository::CsvRepository;
    use crate::repository::cache::DatasetCache;
    use crate::repository::source::CsvSource;
    use crate::routes::configure_api;
    use crate::services::filter::FilterActivity;

    /// Builds the CSV source described by the configuration.
    fn build_source(config: &DataSourceConfig) -> CsvSource {
        match config {
            DataSourceConfig::Directory { path } => CsvSource::directory(path.clone()),
            DataSourceConfig::Http { base_url } => CsvSource::http(base_url.clone()),
        }
    }

    /// Builds and runs the Actix-Web HTTP server using the provided configuration.
    pub async fn run(server_config: ServerConfig) -> std::io::Result<()> {
        let source = build_source(&server_config.data_source);

        let repo = web::Data::new(CsvRepository::new(
            source,
            server_config.agencies.clone(),
            server_config.loader.clone(),
            Arc::new(DatasetCache::new()),
        ));
        let activity = web::Data::new(FilterActivity::new(Duration::from_millis(
            server_config.filter_settle_ms,
        )));

        let data_dir = match &server_config.data_source {
            DataSourceConfig::Directory { path } => Some(path.clone()),
            DataSourceConfig::Http { .. } => None,
        };

        log::info!(
            "Serving {} agencies on {}:{}",
            server_config.agencies.len(),
            server_config.address,
            server_config.port
        );

        let bind_address = (server_config.address.clone(), server_config.port);
        let server_config = web::Data::new(server_config);

        HttpServer::new(move || {
            let mut app = App::new()
                .wrap(Cors::permissive())
                .wrap(middleware::Compress::default())
                .wrap(middleware::Logger::default())
                .configure(configure_api)
                .app_data(repo.clone())
                .app_data(activity.clone())
                .app_data(server_config.clone());

            if let Some(dir) = &data_dir {
                app = app.service(Files::new("/data", dir.clone()));
            }
            app
        })
        .bind(bind_address)?
        .run()
        .await
    }
}
