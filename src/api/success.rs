use actix_web::{
    http::header::{ContentDisposition, DispositionParam, DispositionType},
    HttpResponse,
};

pub struct Success<T: serde::Serialize> {
    pub status: actix_web::http::StatusCode,
    pub body: T,
}

impl<T: serde::Serialize> Success<T> {
    pub fn ok(data: T) -> Self {
        Self { status: actix_web::http::StatusCode::OK, body: data }
    }
}

impl<T: serde::Serialize> actix_web::Responder for Success<T> {
    type Body = actix_web::body::BoxBody;

    fn respond_to(self, _req: &actix_web::HttpRequest) -> HttpResponse<Self::Body> {
        HttpResponse::build(self.status).json(self.body)
    }
}

/// File bytes sent back as a download.
pub struct Attachment {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl Attachment {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { filename: filename.into(), bytes }
    }
}

fn attachment_response(filename: String) -> actix_web::HttpResponseBuilder {
    let mime = mime_guess::from_path(&filename).first_or_octet_stream();
    let disposition = ContentDisposition {
        disposition: DispositionType::Attachment,
        parameters: vec![DispositionParam::Filename(filename)],
    };

    let mut builder = HttpResponse::Ok();
    builder.content_type(mime.essence_str()).insert_header(disposition);
    builder
}

impl actix_web::Responder for Attachment {
    type Body = actix_web::body::BoxBody;

    fn respond_to(self, _req: &actix_web::HttpRequest) -> HttpResponse<Self::Body> {
        attachment_response(self.filename).body(self.bytes)
    }
}

/// A file on disk streamed back as a download.
pub struct FileAttachment {
    pub filename: String,
    pub file: tokio::fs::File,
    pub len: u64,
}

impl FileAttachment {
    pub fn new(filename: impl Into<String>, file: tokio::fs::File, len: u64) -> Self {
        Self { filename: filename.into(), file, len }
    }
}

impl actix_web::Responder for FileAttachment {
    type Body = actix_web::body::BoxBody;

    fn respond_to(self, _req: &actix_web::HttpRequest) -> HttpResponse<Self::Body> {
        attachment_response(self.filename)
            .no_chunking(self.len)
            .streaming(tokio_util::io::ReaderStream::new(self.file))
    }
}
