use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::api::error;

/// Formats the converter can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
}

impl DocumentFormat {
    pub fn extension(self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Docx => "docx",
        }
    }
}

impl FromStr for DocumentFormat {
    type Err = error::SystemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pdf" => Ok(DocumentFormat::Pdf),
            "docx" => Ok(DocumentFormat::Docx),
            other => Err(error::SystemError::config(format!("Unsupported format '{}'", other))),
        }
    }
}

/// How a batch reacts to a bad file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Skip invalid or failing files, answer with the list of converted names.
    Lenient,
    /// Reject the batch on the first invalid or failing file, answer with the file itself.
    Strict,
}

impl FromStr for Policy {
    type Err = error::SystemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lenient" => Ok(Policy::Lenient),
            "strict" => Ok(Policy::Strict),
            other => Err(error::SystemError::config(format!("Unknown policy '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetMode {
    /// pdf becomes docx, everything else becomes pdf
    Invert,
    Fixed(DocumentFormat),
}

impl TargetMode {
    pub fn resolve(self, extension: &str) -> DocumentFormat {
        match self {
            TargetMode::Fixed(format) => format,
            TargetMode::Invert if extension == "pdf" => DocumentFormat::Docx,
            TargetMode::Invert => DocumentFormat::Pdf,
        }
    }
}

impl FromStr for TargetMode {
    type Err = error::SystemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("auto") {
            return Ok(TargetMode::Invert);
        }
        s.parse().map(TargetMode::Fixed)
    }
}

/// Immutable settings handed to the conversion service.
#[derive(Debug, Clone)]
pub struct ConvertConfig {
    pub policy: Policy,
    pub target: TargetMode,
    pub allowed_extensions: Vec<String>,
    pub max_files: usize,
    pub max_file_size: usize,
    pub conversion_timeout: Duration,
    pub max_parallel: usize,
    pub workspace_root: PathBuf,
    pub output_dir: PathBuf,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            policy: Policy::Strict,
            target: TargetMode::Invert,
            allowed_extensions: vec!["pdf".to_string(), "docx".to_string()],
            max_files: 15,
            max_file_size: 10 * 1024 * 1024, // 10MB
            conversion_timeout: Duration::from_secs(120),
            max_parallel: 2,
            workspace_root: PathBuf::from("temp"),
            output_dir: PathBuf::from("converted"),
        }
    }
}

impl ConvertConfig {
    pub fn allows(&self, extension: &str) -> bool {
        self.allowed_extensions.iter().any(|e| e == extension)
    }

    /// "Only PDF and DOCX allowed"
    pub fn disallowed_message(&self) -> String {
        let names: Vec<String> =
            self.allowed_extensions.iter().map(|e| e.to_ascii_uppercase()).collect();
        let listed = match names.split_last() {
            Some((last, rest)) if !rest.is_empty() => format!("{} and {}", rest.join(", "), last),
            Some((last, _)) => last.clone(),
            None => "no".to_string(),
        };
        format!("Only {} allowed", listed)
    }

    pub fn max_file_size_label(&self) -> String {
        const MB: usize = 1024 * 1024;
        if self.max_file_size % MB == 0 {
            format!("{} MB", self.max_file_size / MB)
        } else {
            format!("{} bytes", self.max_file_size)
        }
    }
}

/// A `files` part as received, before validation.
#[derive(Debug, Clone)]
pub struct RawUpload {
    pub filename: Option<String>,
    pub content: Vec<u8>,
}

/// An upload that passed validation and is safe to store.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub original_name: String,
    pub sanitized_name: String,
    pub extension: String,
    pub content: Vec<u8>,
}

impl UploadedFile {
    pub fn target_name(&self, format: DocumentFormat) -> String {
        crate::utils::with_extension(&self.sanitized_name, format.extension())
    }
}

/// One successful conversion inside a workspace.
#[derive(Debug, Clone)]
pub struct ConvertedFile {
    pub name: String,
    pub path: PathBuf,
}

/// What the packager hands back for the response.
#[derive(Debug)]
pub enum ConversionResult {
    File { name: String, path: PathBuf },
    Archive { name: String, path: PathBuf },
}

/// What a finished `/convert` request answers with, depending on the policy.
#[derive(Debug)]
pub enum ConvertOutcome {
    Listing(Vec<String>),
    Download { name: String, bytes: Vec<u8> },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invert_target() {
        assert_eq!(TargetMode::Invert.resolve("pdf"), DocumentFormat::Docx);
        assert_eq!(TargetMode::Invert.resolve("docx"), DocumentFormat::Pdf);
        assert_eq!(TargetMode::Invert.resolve("odt"), DocumentFormat::Pdf);
    }

    #[test]
    fn test_fixed_target() {
        let mode: TargetMode = "PDF".parse().unwrap();
        assert_eq!(mode, TargetMode::Fixed(DocumentFormat::Pdf));
        assert_eq!(mode.resolve("pdf"), DocumentFormat::Pdf);
        assert_eq!("auto".parse::<TargetMode>().unwrap(), TargetMode::Invert);
        assert!(matches!("png".parse::<TargetMode>(), Err(error::SystemError::Config(_))));
    }

    #[test]
    fn test_policy_parse() {
        assert_eq!("Lenient".parse::<Policy>().unwrap(), Policy::Lenient);
        assert_eq!(" strict ".parse::<Policy>().unwrap(), Policy::Strict);
        assert!("yolo".parse::<Policy>().is_err());
    }

    #[test]
    fn test_disallowed_message() {
        let config = ConvertConfig::default();
        assert_eq!(config.disallowed_message(), "Only PDF and DOCX allowed");

        let single =
            ConvertConfig { allowed_extensions: vec!["docx".into()], ..Default::default() };
        assert_eq!(single.disallowed_message(), "Only DOCX allowed");

        let three = ConvertConfig {
            allowed_extensions: vec!["pdf".into(), "docx".into(), "odt".into()],
            ..Default::default()
        };
        assert_eq!(three.disallowed_message(), "Only PDF, DOCX and ODT allowed");
    }

    #[test]
    fn test_size_label() {
        assert_eq!(ConvertConfig::default().max_file_size_label(), "10 MB");
        let odd = ConvertConfig { max_file_size: 1500, ..Default::default() };
        assert_eq!(odd.max_file_size_label(), "1500 bytes");
    }
}
