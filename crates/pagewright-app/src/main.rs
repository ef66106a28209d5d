// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pagewright — convert, merge, and view documents
//
// Entry point. Initialises logging and configuration, then runs one
// conversion job (or opens one document in the viewer) and reports the
// outcome.

mod services;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use pagewright_bridge::Collaborators;
use pagewright_core::human_errors::humanize_error;
use pagewright_core::{AppConfig, BlobStore, JobPhase, Operation, PagewrightError};
use pagewright_document::{
    AssemblyEngine, ConversionPipeline, ConversionResult, InputFile, SourceAdapter,
};
use pagewright_viewer::{LayoutRenderer, ViewerSession};
use tracing::{info, warn};

use services::{config_store, data_dir};

#[derive(Parser, Debug)]
#[command(
    name = "pagewright",
    version,
    about = "Turn text, images, spreadsheets, and PDFs into one paginated PDF"
)]
struct Cli {
    /// text, word, excel, image, merge, quick, compress, view, ppt, or secure.
    #[arg(value_parser = parse_operation)]
    operation: Operation,

    /// Input files, in order. Only merge and image take more than one.
    /// `view` also accepts an http(s) URL.
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Where to write the result. Defaults to a timestamped name in the
    /// current directory.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// With `view`: count case-insensitive matches of this text per page.
    #[arg(long)]
    find: Option<String>,

    /// Write the effective configuration to the data directory and exit.
    #[arg(long)]
    write_config: bool,
}

fn parse_operation(keyword: &str) -> Result<Operation, String> {
    Operation::from_keyword(keyword).ok_or_else(|| format!("unknown operation `{keyword}`"))
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    info!(operation = ?cli.operation, inputs = cli.inputs.len(), "Pagewright starting");

    let config = match data_dir::data_dir() {
        Ok(dir) => {
            let config = config_store::load_config(&dir);
            if cli.write_config {
                return match config_store::persist_config(&dir, &config) {
                    Ok(()) => {
                        println!("Configuration written to {}", dir.join("config.json").display());
                        ExitCode::SUCCESS
                    }
                    Err(err) => report(&err),
                };
            }
            config
        }
        Err(err) => {
            warn!(%err, "data directory unavailable, using default configuration");
            AppConfig::default()
        }
    };

    let blobs = BlobStore::new();
    let outcome = if cli.operation == Operation::View {
        view(&cli, &config, blobs).await
    } else {
        convert(&cli, config, blobs).await
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report(&err),
    }
}

// -- Conversion -----------------------------------------------------------------

async fn convert(cli: &Cli, config: AppConfig, blobs: BlobStore) -> Result<(), PagewrightError> {
    let mut inputs = Vec::with_capacity(cli.inputs.len());
    for path in &cli.inputs {
        inputs.push(InputFile::read(path).await?);
    }

    let mut pipeline = ConversionPipeline::new(
        SourceAdapter::new(Collaborators::default()),
        AssemblyEngine::new(config),
        blobs.clone(),
    );

    let mut phases = pipeline.subscribe();
    let progress = tokio::spawn(async move {
        while phases.changed().await.is_ok() {
            let phase = *phases.borrow_and_update();
            if let Some(label) = phase_label(phase) {
                eprintln!("{label}");
            }
        }
    });

    let outcome = tokio::select! {
        result = pipeline.run(cli.operation, inputs) => result,
        _ = tokio::signal::ctrl_c() => Err(PagewrightError::Cancelled),
    };
    if matches!(outcome, Err(PagewrightError::Cancelled)) {
        pipeline.cancel().ok();
    }

    let written = match outcome {
        Ok(result) => save_result(&blobs, &result, cli.output.clone()).await,
        Err(err) => Err(err),
    };
    pipeline.reset();
    drop(pipeline);
    progress.await.ok();
    written
}

async fn save_result(
    blobs: &BlobStore,
    result: &ConversionResult,
    output: Option<PathBuf>,
) -> Result<(), PagewrightError> {
    let bytes = blobs
        .get(&result.handle)
        .ok_or(PagewrightError::NoActiveJob)?;
    let path = output.unwrap_or_else(|| PathBuf::from(&result.suggested_name));
    tokio::fs::write(&path, &bytes).await?;

    println!(
        "{} ({} page{}, {} bytes, sha256 {})",
        path.display(),
        result.page_count,
        if result.page_count == 1 { "" } else { "s" },
        result.byte_len,
        result.sha256
    );
    Ok(())
}

fn phase_label(phase: JobPhase) -> Option<&'static str> {
    match phase {
        JobPhase::Reading => Some("Reading files..."),
        JobPhase::Finalizing => Some("Finalizing PDF..."),
        JobPhase::Done => Some("Done."),
        JobPhase::Idle | JobPhase::Error => None,
    }
}

// -- Viewing --------------------------------------------------------------------

async fn view(cli: &Cli, config: &AppConfig, blobs: BlobStore) -> Result<(), PagewrightError> {
    let target = cli.inputs.first().ok_or_else(|| {
        PagewrightError::InvalidInput("view needs a document".into())
    })?;
    if cli.inputs.len() > 1 {
        return Err(PagewrightError::InvalidInput(
            "view opens a single document".into(),
        ));
    }

    let mut session = ViewerSession::new(LayoutRenderer::new(), blobs, config.viewer.clone());
    let lower = target.to_ascii_lowercase();
    let page_count = if lower.starts_with("http://") || lower.starts_with("https://") {
        session.open_remote(target.clone()).await?
    } else {
        let input = InputFile::read(target).await?;
        session.open_upload(input.bytes).await?
    };
    println!("{target}: {page_count} page(s)");

    if let Some(query) = &cli.find {
        session.set_search_query(query.clone());
    }
    for page in 1..=page_count {
        session.set_page(page);
        for surface in session.render_visible().await? {
            let matches = session
                .highlight_page(&surface.text)
                .iter()
                .filter(|span| span.is_match())
                .count();
            let found = match &cli.find {
                Some(_) => format!(", {matches} match(es)"),
                None => String::new(),
            };
            println!(
                "  page {}: {:.0} x {:.0} px{}",
                session.page_label(),
                surface.width,
                surface.height,
                found
            );
        }
    }

    session.close();
    Ok(())
}

// -- Errors ---------------------------------------------------------------------

fn report(err: &PagewrightError) -> ExitCode {
    let human = humanize_error(err);
    eprintln!("{}", human.message);
    eprintln!("{}", human.suggestion);
    if human.retriable {
        eprintln!("(You can try again.)");
    }
    tracing::debug!(%err, "detailed error");
    ExitCode::FAILURE
}
