use actix_cors::Cors;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::{api::error, constants::Env, modules::convert::ConvertConfig};

const DEFAULT_CONVERTERS: [&str; 2] = ["soffice", "libreoffice"];

/// Locate the converter executable.
///
/// A configured value containing a path separator must point at an existing file;
/// a bare name is searched on `PATH`. Without configuration the usual LibreOffice
/// binary names are tried in order.
pub fn resolve_converter(configured: Option<&str>) -> Result<PathBuf, error::SystemError> {
    match configured {
        Some(value) if value.contains(std::path::MAIN_SEPARATOR) || value.contains('/') => {
            let path = PathBuf::from(value);
            if path.is_file() {
                Ok(path)
            } else {
                Err(error::SystemError::ConverterNotFound(value.to_string().into()))
            }
        }
        Some(name) => which::which(name)
            .map_err(|_| error::SystemError::ConverterNotFound(name.to_string().into())),
        None => DEFAULT_CONVERTERS
            .iter()
            .find_map(|name| which::which(name).ok())
            .ok_or_else(|| {
                error::SystemError::ConverterNotFound(DEFAULT_CONVERTERS.join(", ").into())
            }),
    }
}

pub fn convert_config(env: &Env) -> Result<ConvertConfig, error::SystemError> {
    if env.max_files == 0 || env.max_file_size == 0 {
        return Err(error::SystemError::config("MAX_FILES and MAX_FILE_SIZE must be positive"));
    }
    if env.conversion_timeout == 0 {
        return Err(error::SystemError::config("CONVERSION_TIMEOUT must be positive"));
    }
    Ok(ConvertConfig {
        policy: env.policy.parse()?,
        target: env.target_format.parse()?,
        allowed_extensions: env
            .allowed_extensions
            .iter()
            .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
            .collect(),
        max_files: env.max_files,
        max_file_size: env.max_file_size,
        conversion_timeout: Duration::from_secs(env.conversion_timeout),
        max_parallel: env.max_parallel_conversions.max(1),
        workspace_root: PathBuf::from(&env.upload_dir),
        output_dir: PathBuf::from(&env.output_dir),
    })
}

pub fn cors(origins: &[String]) -> Cors {
    let cors = Cors::default()
        .allowed_methods(vec!["GET", "POST"])
        .allow_any_header()
        .expose_headers(vec![actix_web::http::header::CONTENT_DISPOSITION])
        .max_age(3600);

    if origins.iter().any(|o| o == "*") {
        cors.allow_any_origin()
    } else {
        origins.iter().fold(cors, |cors, origin| cors.allowed_origin(origin))
    }
}

pub async fn prepare_directories(dirs: &[&Path]) -> Result<(), error::SystemError> {
    for dir in dirs {
        tokio::fs::create_dir_all(dir).await?;
        log::info!("Using directory {}", dir.display());
    }
    Ok(())
}
