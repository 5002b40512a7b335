use crate::error::{MarkdownFetcherError, Result};
use crate::services::converter::MarkdownConverter;
use crate::types::{BatchConfig, BatchResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Converts a directory tree of saved HTML pages into Markdown files.
pub struct BatchConverter;

impl BatchConverter {
    pub async fn convert_directory(
        converter: &MarkdownConverter,
        config: &BatchConfig,
    ) -> Result<BatchResult> {
        if !config.input_dir.is_dir() {
            return Err(MarkdownFetcherError::FileNotFound {
                path: config.input_dir.display().to_string(),
            });
        }

        let inputs = Self::find_html_files(&config.input_dir);
        info!(
            "Converting {} HTML files from {}",
            inputs.len(),
            config.input_dir.display()
        );

        Self::ensure_output_directory(&config.output_dir).await?;

        let base_url = config.base_url.as_deref().unwrap_or_default();
        let mut result = BatchResult::default();

        for input in inputs {
            let html = match fs::read_to_string(&input).await {
                Ok(html) => html,
                Err(e) => {
                    warn!("Skipping {}: {}", input.display(), e);
                    result.failures.push((input, e.to_string()));
                    continue;
                }
            };

            let markdown = converter.convert(&html, base_url);
            let output_file = Self::output_path(&config.input_dir, &config.output_dir, &input);

            match Self::write_markdown(&output_file, &markdown).await {
                Ok(()) => {
                    debug!("{} -> {}", input.display(), output_file.display());
                    result.output_files.push(output_file);
                }
                Err(e) => {
                    warn!("Skipping {}: {}", input.display(), e);
                    result.failures.push((input, e.to_string()));
                }
            }
        }

        info!(
            "Wrote {} Markdown files ({} failed)",
            result.output_files.len(),
            result.failures.len()
        );
        Ok(result)
    }

    async fn write_markdown(output_file: &Path, markdown: &str) -> Result<()> {
        if let Some(parent) = output_file.parent() {
            Self::ensure_output_directory(parent).await?;
        }
        fs::write(output_file, markdown).await.map_err(|e| {
            MarkdownFetcherError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to write {}: {}", output_file.display(), e),
            ))
        })
    }

    fn find_html_files(dir: &Path) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = WalkDir::new(dir)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| Self::is_html(path))
            .collect();
        files.sort();
        files
    }

    fn is_html(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"))
            .unwrap_or(false)
    }

    /// Mirrors the input's position under `input_dir` inside `output_dir`, with an `.md` extension.
    fn output_path(input_dir: &Path, output_dir: &Path, input: &Path) -> PathBuf {
        let relative = input.strip_prefix(input_dir).unwrap_or(input);
        output_dir.join(relative).with_extension("md")
    }

    async fn ensure_output_directory(output_dir: &Path) -> Result<()> {
        if !output_dir.exists() {
            fs::create_dir_all(output_dir).await?;
            info!("Created output directory: {}", output_dir.display());
        }
        Ok(())
    }
}
