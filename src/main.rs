mod cli;

use anyhow::{bail, Context};
use clap::Parser;
use cli::{BatchArgs, Cli, Commands, FetchArgs, ValidateArgs};
use markdown_fetcher::{
    AppConfig, BatchConfig, BatchConverter, ContentFetcher, ConversionResponse,
    ConversionWorkflow, MarkdownConverter,
};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries the converted output
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match AppConfig::load_or_default(cli.config.as_deref()).await {
        Ok(config) => match &cli.command {
            Commands::Fetch(args) => handle_fetch_command(args, config).await,
            Commands::Batch(args) => handle_batch_command(args, config).await,
            Commands::Validate(args) => handle_validate_command(args, config).await,
        },
        Err(e) => Err(e.into()),
    };

    if let Err(e) = result {
        error!("Operation failed: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

async fn handle_fetch_command(args: &FetchArgs, mut config: AppConfig) -> anyhow::Result<()> {
    if let Some(timeout) = args.timeout {
        config.fetch.timeout_secs = timeout;
    }
    if let Some(user_agent) = &args.user_agent {
        config.fetch.user_agent = user_agent.clone();
    }

    let fetcher = ContentFetcher::new(&config.fetch)?;
    let converter = Arc::new(MarkdownConverter::new(&config.extractor)?);
    let workflow = ConversionWorkflow::new(fetcher, converter);

    info!("Starting fetch of {} sources", args.sources.len());

    let mut responses: Vec<ConversionResponse> = Vec::with_capacity(args.sources.len());
    for (idx, source) in args.sources.iter().enumerate() {
        info!("Processing source {}/{}: {}", idx + 1, args.sources.len(), source);

        let response = workflow
            .respond(source, args.base_url.as_deref(), args.stats)
            .await;

        if args.markdown {
            match (&response.content, &response.error) {
                (Some(content), _) => println!("{}", content),
                (None, Some(err)) => error!("{}: {}", source, err),
                (None, None) => {}
            }
        } else {
            let line = serde_json::to_string(&response)
                .context("Failed to serialize conversion response")?;
            println!("{}", line);
        }

        responses.push(response);
    }

    if let Some(json_path) = &args.json_output {
        let json_content = serde_json::to_string_pretty(&responses)
            .context("Failed to serialize conversion responses")?;

        tokio::fs::write(json_path, json_content)
            .await
            .context("Failed to write JSON output file")?;

        info!("Responses written to: {}", json_path.display());
    }

    let failed = responses.iter().filter(|r| !r.success).count();
    if failed > 0 {
        bail!("{} of {} sources failed", failed, responses.len());
    }

    info!("Fetch completed successfully!");
    Ok(())
}

async fn handle_batch_command(args: &BatchArgs, config: AppConfig) -> anyhow::Result<()> {
    // Check if output directory exists and handle force flag
    if args.output.exists() && !args.force {
        let mut entries = std::fs::read_dir(&args.output).with_context(|| {
            format!("Cannot read output directory {}", args.output.display())
        })?;

        if entries.next().is_some() {
            bail!("Output directory is not empty. Use --force to overwrite.");
        }
    }

    let converter = MarkdownConverter::new(&config.extractor)?;
    let batch = BatchConfig {
        input_dir: args.input.clone(),
        output_dir: args.output.clone(),
        base_url: args.base_url.clone(),
    };

    let result = BatchConverter::convert_directory(&converter, &batch).await?;

    for output_file in &result.output_files {
        info!("  - {}", output_file.display());
    }
    for (input, reason) in &result.failures {
        error!("  ✗ {}: {}", input.display(), reason);
    }

    if !result.failures.is_empty() {
        bail!("{} files could not be converted", result.failures.len());
    }

    info!("Batch conversion completed successfully!");
    Ok(())
}

async fn handle_validate_command(args: &ValidateArgs, config: AppConfig) -> anyhow::Result<()> {
    info!("Validating {} sources", args.sources.len());

    let fetcher = ContentFetcher::new(&config.fetch)?;
    let mut valid_sources = Vec::new();
    let mut invalid_sources = Vec::new();

    for source in &args.sources {
        match ContentFetcher::validate_source(source) {
            Ok(source_type) => {
                info!("✓ Valid: {} ({:?})", source, source_type);
                valid_sources.push(source);

                if args.check_access {
                    match fetcher.fetch(source, None).await {
                        Ok(document) => {
                            info!("  Accessible, {} bytes of HTML found", document.html.len());
                        }
                        Err(e) => {
                            error!("  Cannot access content: {}", e);
                            invalid_sources.push((source, format!("Access error: {}", e)));
                        }
                    }
                }
            }
            Err(e) => {
                error!("✗ Invalid: {} - {}", source, e);
                invalid_sources.push((source, e.to_string()));
            }
        }
    }

    println!("\n=== Validation Summary ===");
    println!("Valid sources: {}/{}", valid_sources.len(), args.sources.len());

    if !invalid_sources.is_empty() {
        println!("Invalid sources:");
        let invalid_count = invalid_sources.len();
        for (source, error) in invalid_sources {
            println!("  - {}: {}", source, error);
        }
        bail!("{} sources failed validation", invalid_count);
    }

    println!("All sources are valid!");
    Ok(())
}
