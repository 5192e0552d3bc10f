use actix_web::{
    self,
    middleware::{from_fn, Logger},
    web, App, HttpServer,
};
use std::sync::{Arc, LazyLock};

use crate::{
    middlewares::{limit_content_length, MULTIPART_OVERHEAD},
    modules::convert::{ConvertService, SofficeConverter},
};

mod api;
mod configs;
mod constants;
mod middlewares;
mod modules;
#[cfg(test)]
mod test;
mod utils;

pub static ENV: LazyLock<constants::Env> = LazyLock::new(|| {
    dotenvy::dotenv().ok();
    env_logger::init();
    log::info!("Environment variables loaded from .env file");
    constants::Env::default()
});

#[actix_web::get("/")]
async fn health_check() -> &'static str {
    "Server is running"
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let config = configs::convert_config(&ENV).map_err(|e| {
        log::error!("Invalid configuration: {}", e);
        std::io::Error::other("Invalid configuration")
    })?;

    let converter_path =
        configs::resolve_converter(ENV.converter_path.as_deref()).map_err(|e| {
            log::error!("{}", e);
            std::io::Error::other("Converter executable not found")
        })?;
    log::info!("Using converter {}", converter_path.display());

    configs::prepare_directories(&[&config.workspace_root, &config.output_dir])
        .await
        .map_err(|_| std::io::Error::other("Could not create working directories"))?;

    let body_limit = (config.max_files as u64) * (config.max_file_size as u64) + MULTIPART_OVERHEAD;
    let convert_service =
        ConvertService::with_dependencies(Arc::new(SofficeConverter::new(converter_path)), config);

    println!("Starting server at http://{}:{}", ENV.ip.as_str(), ENV.port);
    HttpServer::new(move || {
        App::new()
            .wrap(from_fn(limit_content_length(body_limit)))
            .wrap(configs::cors(&ENV.allowed_origins))
            .wrap(Logger::default())
            .app_data(web::Data::new(convert_service.clone()))
            .service(health_check)
            .configure(modules::convert::route::configure)
    })
    .bind((ENV.ip.as_str(), ENV.port))?
    .workers(ENV.workers.max(1))
    .run()
    .await
}
