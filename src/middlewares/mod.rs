use actix_web::{
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    http::header::CONTENT_LENGTH,
    middleware::Next,
};
use futures_util::{future::LocalBoxFuture, FutureExt};

use crate::api::error;

/// Multipart framing allowance per request on top of the raw file bytes.
pub const MULTIPART_OVERHEAD: u64 = 64 * 1024;

/// Reject requests whose declared body is larger than `max_bytes` before reading it.
pub fn limit_content_length<B>(
    max_bytes: u64,
) -> impl Fn(
    ServiceRequest,
    Next<B>,
) -> LocalBoxFuture<'static, Result<ServiceResponse<B>, actix_web::Error>>
where
    B: MessageBody + 'static,
{
    move |req: ServiceRequest, next: Next<B>| {
        async move {
            let declared = req
                .headers()
                .get(CONTENT_LENGTH)
                .and_then(|h| h.to_str().ok())
                .and_then(|h| h.parse::<u64>().ok());

            if let Some(length) = declared.filter(|length| *length > max_bytes) {
                log::warn!("Rejected request body of {} bytes (limit {})", length, max_bytes);
                return Err(error::Error::payload_too_large("Request body too large").into());
            }
            next.call(req).await
        }
        .boxed_local()
    }
}
