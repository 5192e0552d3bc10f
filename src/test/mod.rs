#![allow(dead_code)]

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::modules::convert::{
    converter::{ConversionError, Converter},
    model::{ConvertConfig, DocumentFormat, Policy},
};

pub const BOUNDARY: &str = "----docflip-test-boundary";

pub fn test_config(root: &Path, policy: Policy) -> ConvertConfig {
    ConvertConfig {
        policy,
        workspace_root: root.join("temp"),
        output_dir: root.join("converted"),
        ..Default::default()
    }
}

/// Copies the input to `<stem>.<target>`; any stem containing "fail" exits with an error.
#[derive(Default, Clone)]
pub struct CopyConverter {
    pub calls: Arc<AtomicUsize>,
}

#[async_trait::async_trait]
impl Converter for CopyConverter {
    async fn convert(
        &self,
        input: &Path,
        target: DocumentFormat,
        output_dir: &Path,
        _profile_dir: &Path,
    ) -> Result<PathBuf, ConversionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let stem = input.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
        if stem.contains("fail") {
            return Err(ConversionError::Failed {
                status: "exit status: 1".to_string(),
                stderr: format!("cannot convert {}", stem),
            });
        }
        let output = output_dir.join(format!("{}.{}", stem, target.extension()));
        tokio::fs::copy(input, &output).await?;
        Ok(output)
    }
}

/// `CopyConverter` that first waits `delay` for stems containing "slow".
#[derive(Clone)]
pub struct SlowConverter {
    pub delay: Duration,
    pub completed: Arc<AtomicUsize>,
    inner: CopyConverter,
}

impl SlowConverter {
    pub fn new(delay: Duration) -> Self {
        Self { delay, completed: Arc::default(), inner: CopyConverter::default() }
    }
}

#[async_trait::async_trait]
impl Converter for SlowConverter {
    async fn convert(
        &self,
        input: &Path,
        target: DocumentFormat,
        output_dir: &Path,
        profile_dir: &Path,
    ) -> Result<PathBuf, ConversionError> {
        let slow = input.file_stem().and_then(|s| s.to_str()).is_some_and(|s| s.contains("slow"));
        if slow {
            tokio::time::sleep(self.delay).await;
        }
        let result = self.inner.convert(input, target, output_dir, profile_dir).await;
        if slow {
            self.completed.fetch_add(1, Ordering::SeqCst);
        }
        result
    }
}

/// Never finishes on its own.
pub struct HangingConverter;

#[async_trait::async_trait]
impl Converter for HangingConverter {
    async fn convert(
        &self,
        _input: &Path,
        _target: DocumentFormat,
        _output_dir: &Path,
        _profile_dir: &Path,
    ) -> Result<PathBuf, ConversionError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Err(ConversionError::Timeout(Duration::from_secs(3600)))
    }
}

/// A part of a multipart body: (field name, filename, bytes).
pub type Part<'a> = (&'a str, Option<&'a str>, &'a [u8]);

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for (field, filename, bytes) in parts {
        write!(body, "--{}\r\n", BOUNDARY).unwrap();
        match filename {
            Some(name) => write!(
                body,
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n",
                field, name
            )
            .unwrap(),
            None => {
                write!(body, "Content-Disposition: form-data; name=\"{}\"\r\n\r\n", field).unwrap()
            }
        }
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    write!(body, "--{}--\r\n", BOUNDARY).unwrap();
    body
}

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={}", BOUNDARY)
}

/// Smallest WordprocessingML package LibreOffice accepts.
pub fn minimal_docx(text: &str) -> Vec<u8> {
    let mut buffer = Vec::new();
    {
        let mut zip = zip::ZipWriter::new(std::io::Cursor::new(&mut buffer));
        let options = zip::write::SimpleFileOptions::default();

        zip.start_file("[Content_Types].xml", options).unwrap();
        zip.write_all(br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#).unwrap();

        zip.start_file("_rels/.rels", options).unwrap();
        zip.write_all(br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#).unwrap();

        zip.start_file("word/document.xml", options).unwrap();
        write!(
            zip,
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:r><w:t>{}</w:t></w:r></w:p></w:body></w:document>"#,
            text
        )
        .unwrap();

        zip.finish().unwrap();
    }
    buffer
}
