use actix_multipart::{Field, Multipart};
use actix_web::{get, post, web, Either};
use futures_util::TryStreamExt;

use crate::api::success::{Attachment, FileAttachment, Success};
use crate::api::{error, success};
use crate::modules::convert::{
    model::{ConvertConfig, ConvertOutcome, Policy, RawUpload},
    schema::ConvertResponse,
    service::ConvertService,
    validator,
};

const FILES_FIELD: &str = "files";

/// Read every `files` part into memory, enforcing the per-file size ceiling and,
/// under the strict policy, the batch ceiling before anything else is buffered.
async fn collect_uploads(
    mut payload: Multipart,
    config: &ConvertConfig,
) -> Result<Vec<RawUpload>, error::SystemError> {
    let mut uploads = Vec::new();

    while let Some(mut field) = payload.try_next().await? {
        if field.name() != Some(FILES_FIELD) {
            drain(&mut field).await?;
            continue;
        }
        if config.policy == Policy::Strict && uploads.len() >= config.max_files {
            return Err(validator::too_many_files(config.max_files));
        }

        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(|name| name.to_string());

        let mut content = Vec::new();
        while let Some(chunk) = field.try_next().await? {
            if content.len() + chunk.len() > config.max_file_size {
                return Err(error::SystemError::payload_too_large(format!(
                    "File exceeds maximum size of {}",
                    config.max_file_size_label()
                )));
            }
            content.extend_from_slice(&chunk);
        }

        uploads.push(RawUpload { filename, content });
    }

    Ok(uploads)
}

async fn drain(field: &mut Field) -> Result<(), error::SystemError> {
    while field.try_next().await?.is_some() {}
    Ok(())
}

#[post("/convert")]
pub async fn convert(
    service: web::Data<ConvertService>,
    payload: Multipart,
) -> Result<Either<success::Success<ConvertResponse>, Attachment>, error::Error> {
    let uploads = collect_uploads(payload, service.config()).await?;

    match service.convert(uploads).await? {
        ConvertOutcome::Listing(converted) => {
            Ok(Either::Left(Success::ok(ConvertResponse { converted })))
        }
        ConvertOutcome::Download { name, bytes } => {
            Ok(Either::Right(Attachment::new(name, bytes)))
        }
    }
}

#[get("/download/{filename}")]
pub async fn download(
    service: web::Data<ConvertService>,
    filename: web::Path<String>,
) -> Result<FileAttachment, error::Error> {
    let filename = filename.into_inner();
    let (file, len) = service.download(&filename).await?;
    Ok(FileAttachment::new(filename, file, len))
}
