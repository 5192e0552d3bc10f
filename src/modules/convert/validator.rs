use std::collections::HashSet;

use crate::api::error;
use crate::modules::convert::model::{ConvertConfig, Policy, RawUpload, UploadedFile};
use crate::utils::{file_extension, sanitize_filename};

pub const NO_FILES: &str = "No files uploaded";
pub const NO_VALID_FILES: &str = "No valid files converted";

pub fn too_many_files(max_files: usize) -> error::SystemError {
    error::SystemError::bad_request(format!("Maximum {} files allowed", max_files))
}

/// Filter a raw batch down to storable uploads according to the configured policy.
pub fn validate(
    config: &ConvertConfig,
    raw: Vec<RawUpload>,
) -> Result<Vec<UploadedFile>, error::SystemError> {
    if raw.is_empty() {
        return Err(error::SystemError::bad_request(NO_FILES));
    }
    if config.policy == Policy::Strict && raw.len() > config.max_files {
        return Err(too_many_files(config.max_files));
    }

    let mut stems = HashSet::new();
    let mut accepted = Vec::with_capacity(raw.len());

    for upload in raw {
        let original_name = upload.filename.unwrap_or_default();
        let checked = sanitize_filename(&original_name).and_then(|name| {
            let ext = file_extension(&name)?;
            config.allows(&ext).then_some((name, ext))
        });

        let Some((name, extension)) = checked else {
            if config.policy == Policy::Strict {
                return Err(error::SystemError::bad_request(config.disallowed_message()));
            }
            log::info!("Skipping upload '{}': not an allowed file", original_name);
            continue;
        };

        let sanitized_name = unique_name(&mut stems, &name, &extension);
        accepted.push(UploadedFile {
            original_name,
            sanitized_name,
            extension,
            content: upload.content,
        });
    }

    if accepted.is_empty() {
        return Err(error::SystemError::bad_request(NO_VALID_FILES));
    }
    Ok(accepted)
}

/// Suffix the stem until it is unused in this batch, so outputs never overwrite each other.
fn unique_name(stems: &mut HashSet<String>, name: &str, extension: &str) -> String {
    let stem = name.strip_suffix(&format!(".{}", extension)).unwrap_or(name);
    let mut candidate = stem.to_string();
    let mut n = 1;
    while !stems.insert(candidate.to_ascii_lowercase()) {
        candidate = format!("{}_{}", stem, n);
        n += 1;
    }
    format!("{}.{}", candidate, extension)
}
