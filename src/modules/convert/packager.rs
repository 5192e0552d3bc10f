use std::io::{ErrorKind, Write};
use std::path::Path;

use uuid::Uuid;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::api::error;
use crate::modules::convert::model::{ConversionResult, ConvertedFile};
use crate::modules::convert::validator::NO_VALID_FILES;

pub fn archive_name() -> String {
    format!("converted_{}.zip", Uuid::new_v4().simple())
}

/// Turn the outputs of a batch into one downloadable artifact inside `dir`.
pub async fn package(
    mut outputs: Vec<ConvertedFile>,
    dir: &Path,
) -> Result<ConversionResult, error::SystemError> {
    match outputs.len() {
        0 => Err(error::SystemError::bad_request(NO_VALID_FILES)),
        1 => {
            let file = outputs.remove(0);
            Ok(ConversionResult::File { name: file.name, path: file.path })
        }
        _ => {
            let name = archive_name();
            let path = dir.join(&name);
            let target = path.clone();
            tokio::task::spawn_blocking(move || write_archive(&target, &outputs)).await??;
            log::debug!("Packed archive {}", path.display());
            Ok(ConversionResult::Archive { name, path })
        }
    }
}

/// Deflate every file into the archive root under its own name.
fn write_archive(path: &Path, files: &[ConvertedFile]) -> Result<(), error::SystemError> {
    let mut zip = ZipWriter::new(std::fs::File::create(path)?);
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o644);

    for file in files {
        let data = std::fs::read(&file.path)?;
        zip.start_file(file.name.as_str(), options)?;
        zip.write_all(&data)?;
    }

    zip.finish()?;
    Ok(())
}

/// Move outputs into the shared download directory, replacing older files of the same name.
///
/// If any file cannot be moved, the ones already published by this call are removed again.
pub async fn publish(
    outputs: Vec<ConvertedFile>,
    output_dir: &Path,
) -> Result<Vec<String>, error::SystemError> {
    if outputs.is_empty() {
        return Err(error::SystemError::bad_request(NO_VALID_FILES));
    }
    tokio::fs::create_dir_all(output_dir).await?;

    let mut names = Vec::with_capacity(outputs.len());
    for file in outputs {
        if let Err(e) = move_file(&file.path, &output_dir.join(&file.name)).await {
            unpublish(output_dir, &names).await;
            return Err(e.into());
        }
        names.push(file.name);
    }
    Ok(names)
}

async fn move_file(from: &Path, to: &Path) -> std::io::Result<()> {
    match tokio::fs::rename(from, to).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(e),
        Err(e) => {
            // rename fails across filesystems
            log::debug!("Rename of {} failed ({}), copying instead", from.display(), e);
            tokio::fs::copy(from, to).await?;
            Ok(())
        }
    }
}

async fn unpublish(output_dir: &Path, names: &[String]) {
    for name in names {
        if let Err(e) = tokio::fs::remove_file(output_dir.join(name)).await {
            log::warn!("Failed to remove partially published {}: {}", name, e);
        }
    }
}
