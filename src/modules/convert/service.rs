use futures_util::{stream, StreamExt, TryStreamExt};
use log::info;
use std::io::ErrorKind;
use std::sync::Arc;

use crate::api::error;
use crate::modules::convert::{
    converter::{ConversionError, Converter},
    model::{
        ConversionResult, ConvertConfig, ConvertOutcome, ConvertedFile, Policy, RawUpload,
        UploadedFile,
    },
    packager, validator,
    workspace::{Workspace, WorkspaceManager},
};
use crate::utils::is_safe_name;

#[derive(Clone)]
pub struct ConvertService {
    converter: Arc<dyn Converter + Send + Sync>,
    workspaces: WorkspaceManager,
    config: Arc<ConvertConfig>,
}

impl ConvertService {
    pub fn with_dependencies(
        converter: Arc<dyn Converter + Send + Sync>,
        config: ConvertConfig,
    ) -> Self {
        info!("ConvertService initialized with {:?} policy", config.policy);
        ConvertService {
            converter,
            workspaces: WorkspaceManager::new(config.workspace_root.clone()),
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &ConvertConfig {
        &self.config
    }

    /// Validate, convert and package one upload batch.
    ///
    /// The workspace is released on every path out of here; a failed release is
    /// logged and never replaces the primary result.
    pub async fn convert(&self, raw: Vec<RawUpload>) -> Result<ConvertOutcome, error::SystemError> {
        let files = validator::validate(&self.config, raw)?;
        let workspace = self.workspaces.acquire().await?;

        let outcome = self.run(&workspace, files).await;

        let id = workspace.id();
        if let Err(e) = workspace.release().await {
            log::error!("Failed to release workspace {}: {}", id, e);
        }
        outcome
    }

    async fn run(
        &self,
        workspace: &Workspace,
        files: Vec<UploadedFile>,
    ) -> Result<ConvertOutcome, error::SystemError> {
        let input_dir = workspace.input_dir();
        for file in &files {
            tokio::fs::write(input_dir.join(&file.sanitized_name), &file.content).await?;
        }

        match self.config.policy {
            Policy::Lenient => {
                let outputs = self.convert_lenient(workspace, &files).await;
                let names = packager::publish(outputs, &self.config.output_dir).await?;
                info!("Converted {} of {} files", names.len(), files.len());
                Ok(ConvertOutcome::Listing(names))
            }
            Policy::Strict => {
                let outputs = self.convert_strict(workspace, &files).await?;
                let (name, path) = match packager::package(outputs, workspace.path()).await? {
                    ConversionResult::File { name, path }
                    | ConversionResult::Archive { name, path } => (name, path),
                };
                let bytes = tokio::fs::read(&path).await?;
                info!("Converted {} files into {}", files.len(), name);
                Ok(ConvertOutcome::Download { name, bytes })
            }
        }
    }

    fn parallelism(&self, batch: usize) -> usize {
        self.config.max_parallel.clamp(1, batch.max(1))
    }

    /// Failures are dropped from the result; siblings keep running.
    async fn convert_lenient(
        &self,
        workspace: &Workspace,
        files: &[UploadedFile],
    ) -> Vec<ConvertedFile> {
        let results: Vec<_> = stream::iter(
            files.iter().enumerate().map(|(index, file)| self.convert_one(workspace, index, file)),
        )
        .buffered(self.parallelism(files.len()))
        .collect()
        .await;

        results
            .into_iter()
            .zip(files)
            .filter_map(|(result, file)| match result {
                Ok(converted) => Some(converted),
                Err(e) => {
                    log::warn!("Skipping '{}': {}", file.original_name, e);
                    None
                }
            })
            .collect()
    }

    /// The first failure to finish stops the batch; in-flight conversions are dropped,
    /// which kills them. Outputs keep upload order.
    async fn convert_strict(
        &self,
        workspace: &Workspace,
        files: &[UploadedFile],
    ) -> Result<Vec<ConvertedFile>, ConversionError> {
        let mut outputs: Vec<(usize, ConvertedFile)> =
            stream::iter(files.iter().enumerate().map(|(index, file)| {
                Ok::<_, ConversionError>(async move {
                    let converted = self.convert_one(workspace, index, file).await;
                    converted.map(|converted| (index, converted))
                })
            }))
            .try_buffer_unordered(self.parallelism(files.len()))
            .try_collect()
            .await?;

        outputs.sort_by_key(|(index, _)| *index);
        Ok(outputs.into_iter().map(|(_, converted)| converted).collect())
    }

    async fn convert_one(
        &self,
        workspace: &Workspace,
        index: usize,
        file: &UploadedFile,
    ) -> Result<ConvertedFile, ConversionError> {
        let input = workspace.input_dir().join(&file.sanitized_name);
        let output_dir = workspace.output_dir();
        let profile_dir = workspace.profile_dir(index);
        let target = self.config.target.resolve(&file.extension);
        let limit = self.config.conversion_timeout;

        let call = self.converter.convert(&input, target, &output_dir, &profile_dir);
        let path = match tokio::time::timeout(limit, call).await {
            Ok(Ok(path)) => path,
            Ok(Err(e)) => {
                log::warn!("Conversion of '{}' failed: {}", file.sanitized_name, e);
                return Err(e);
            }
            Err(_) => {
                log::warn!("Conversion of '{}' timed out after {:?}", file.sanitized_name, limit);
                return Err(ConversionError::Timeout(limit));
            }
        };

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(String::from)
            .unwrap_or_else(|| file.target_name(target));
        Ok(ConvertedFile { name, path })
    }

    /// Open a previously published file in the download directory, with its length.
    pub async fn download(
        &self,
        name: &str,
    ) -> Result<(tokio::fs::File, u64), error::SystemError> {
        if !is_safe_name(name) {
            return Err(error::SystemError::bad_request("Invalid filename"));
        }
        let file = match tokio::fs::File::open(self.config.output_dir.join(name)).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(error::SystemError::not_found("File not found"));
            }
            Err(e) => return Err(e.into()),
        };
        let metadata = file.metadata().await?;
        if !metadata.is_file() {
            return Err(error::SystemError::not_found("File not found"));
        }
        Ok((file, metadata.len()))
    }
}
