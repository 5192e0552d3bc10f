use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;

use crate::modules::convert::{
    converter::{ConversionError, Converter},
    model::DocumentFormat,
};

const STDERR_EXCERPT: usize = 512;

/// LibreOffice running headless.
#[derive(Debug, Clone)]
pub struct SofficeConverter {
    executable: PathBuf,
}

impl SofficeConverter {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self { executable: executable.into() }
    }

    fn filter(target: DocumentFormat) -> &'static str {
        match target {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Docx => "docx:MS Word 2007 XML",
        }
    }

    fn args(
        input: &Path,
        target: DocumentFormat,
        output_dir: &Path,
        profile_dir: &Path,
    ) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            format!("-env:UserInstallation=file://{}", profile_dir.display()).into(),
            "--headless".into(),
            "--norestore".into(),
        ];
        let is_pdf = input
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
        if is_pdf {
            args.push("--infilter=writer_pdf_import".into());
        }
        args.push("--convert-to".into());
        args.push(Self::filter(target).into());
        args.push("--outdir".into());
        args.push(output_dir.as_os_str().to_owned());
        args.push(input.as_os_str().to_owned());
        args
    }

    pub fn expected_output(input: &Path, target: DocumentFormat, output_dir: &Path) -> PathBuf {
        let stem = input.file_stem().map(|s| s.to_os_string()).unwrap_or_default();
        let mut name = stem;
        name.push(".");
        name.push(target.extension());
        output_dir.join(name)
    }
}

#[async_trait::async_trait]
impl Converter for SofficeConverter {
    async fn convert(
        &self,
        input: &Path,
        target: DocumentFormat,
        output_dir: &Path,
        profile_dir: &Path,
    ) -> Result<PathBuf, ConversionError> {
        let args = Self::args(input, target, output_dir, profile_dir);
        log::debug!("Running {} {:?}", self.executable.display(), args);

        let output = Command::new(&self.executable)
            .args(&args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr: String = stderr.chars().take(STDERR_EXCERPT).collect();
            return Err(ConversionError::Failed { status: output.status.to_string(), stderr });
        }

        let produced = Self::expected_output(input, target, output_dir);
        if !tokio::fs::try_exists(&produced).await.unwrap_or(false) {
            return Err(ConversionError::MissingOutput(produced));
        }
        Ok(produced)
    }
}
