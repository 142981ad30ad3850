//! talk-pdf command line
//!
//! Run with: cargo run -p talk-pdf -- chat manual.pdf

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use talk_pdf::{
    config::RagConfig,
    ingestion::IngestPipeline,
    providers::Providers,
    server::PdfChatServer,
    types::Role,
    ChatSession, UploadedFile, VectorIndex,
};

#[derive(Parser)]
#[command(name = "talk-pdf", about = "Chat with your PDF documents", version)]
struct Cli {
    /// Configuration file (default: ./talk-pdf.toml if present)
    #[arg(long, global = true, env = "TALK_PDF_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Process PDFs and ask questions interactively
    Chat {
        /// PDF files to process
        #[arg(required = true)]
        pdfs: Vec<PathBuf>,
    },

    /// Answer a single question
    Ask {
        /// The question
        question: String,
        /// Saved index to answer from
        #[arg(long, conflicts_with = "pdf")]
        index: Option<PathBuf>,
        /// PDF files to process first
        #[arg(long, num_args = 1..)]
        pdf: Vec<PathBuf>,
    },

    /// Build an index from PDFs and save it
    Ingest {
        /// PDF files to index
        #[arg(required = true)]
        pdfs: Vec<PathBuf>,
        /// Output file
        #[arg(long, short)]
        out: PathBuf,
    },

    /// Run the HTTP server
    Serve {
        /// Host address
        #[arg(long)]
        host: Option<String>,
        /// Port number
        #[arg(long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "talk_pdf=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = RagConfig::load(cli.config.as_deref())?;

    match cli.command {
        Command::Chat { pdfs } => chat(config, &pdfs).await,
        Command::Ask {
            question,
            index,
            pdf,
        } => ask(config, &question, index.as_deref(), &pdf).await,
        Command::Ingest { pdfs, out } => ingest(config, &pdfs, &out).await,
        Command::Serve { host, port } => serve(config, host, port).await,
    }
}

fn spinner(message: &str) -> anyhow::Result<ProgressBar> {
    let bar = ProgressBar::new_spinner();
    bar.set_style(ProgressStyle::with_template("{spinner:.cyan} {msg}")?);
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(100));
    Ok(bar)
}

fn read_uploads(paths: &[PathBuf]) -> anyhow::Result<Vec<UploadedFile>> {
    paths
        .iter()
        .map(|path| {
            let bytes =
                std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
            let filename = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string());
            Ok(UploadedFile::new(filename, bytes))
        })
        .collect()
}

async fn process(session: &ChatSession, paths: &[PathBuf]) -> anyhow::Result<()> {
    let files = read_uploads(paths)?;
    let bar = spinner("Processing your documents...")?;
    let result = session.process_documents(files).await;
    bar.finish_and_clear();

    let summary = result?;
    println!(
        "{} {} document(s), {} chunks",
        style("Documents processed:").green().bold(),
        summary.documents.len(),
        summary.chunks
    );
    for name in &summary.skipped_duplicates {
        println!("{} {} (duplicate content)", style("Skipped").yellow(), name);
    }
    Ok(())
}

async fn answer(session: &ChatSession, question: &str) -> anyhow::Result<()> {
    let bar = spinner("Searching through your documents...")?;
    let result = session.ask(question).await;
    bar.finish_and_clear();

    let message = result?;
    println!("{} {}", style(format!("[{}]", message.timestamp)).dim(), message.content);
    Ok(())
}

async fn chat(config: RagConfig, pdfs: &[PathBuf]) -> anyhow::Result<()> {
    let session = ChatSession::new(config)?;
    process(&session, pdfs).await?;

    println!(
        "{}",
        style("Ask a question about your documents (/history, /clear, /quit)").cyan()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{} ", style(">").bold());
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        match line.trim() {
            "" => continue,
            "/quit" | "/exit" => break,
            "/clear" => session.clear_messages(),
            "/history" => {
                for message in session.messages() {
                    let who = match message.role {
                        Role::User => style("you").blue(),
                        Role::Assistant => style("assistant").green(),
                    };
                    println!("{} {}: {}", style(&message.timestamp).dim(), who, message.content);
                }
            }
            question => {
                if let Err(e) = answer(&session, question).await {
                    eprintln!("{} {}", style("Error:").red().bold(), e);
                }
            }
        }
    }

    Ok(())
}

async fn ask(
    config: RagConfig,
    question: &str,
    index: Option<&Path>,
    pdfs: &[PathBuf],
) -> anyhow::Result<()> {
    let session = ChatSession::new(config)?;

    match index {
        Some(path) => {
            let index = VectorIndex::load(path)
                .await
                .with_context(|| format!("Failed to load index {}", path.display()))?;
            session.load_index(index)?;
        }
        None if pdfs.is_empty() => bail!("Provide --index <file> or --pdf <file>..."),
        None => process(&session, pdfs).await?,
    }

    answer(&session, question).await
}

async fn ingest(config: RagConfig, pdfs: &[PathBuf], out: &Path) -> anyhow::Result<()> {
    let pipeline = IngestPipeline::new(&config.chunking)?;
    let providers = Providers::from_config(&config.api)?;

    let mut chunks = Vec::new();
    for file in read_uploads(pdfs)? {
        let ingested = pipeline.ingest(&file.filename, &file.bytes)?;
        println!(
            "{} {} ({} pages, {} chunks)",
            style("Extracted").green(),
            file.filename,
            ingested.document.total_pages.unwrap_or(0),
            ingested.chunks.len()
        );
        chunks.extend(ingested.chunks);
    }

    let bar = spinner("Embedding chunks...")?;
    let result =
        VectorIndex::build(chunks, providers.embedder.as_ref(), config.retrieval.metric).await;
    bar.finish_and_clear();
    let index = result?;

    index.save(out).await?;
    println!(
        "{} {} chunks to {}",
        style("Saved").green().bold(),
        index.len(),
        out.display()
    );
    Ok(())
}

async fn serve(
    mut config: RagConfig,
    host: Option<String>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    match Providers::from_config(&config.api) {
        Ok(providers) => match providers.chat.health_check().await {
            Ok(true) => tracing::info!("{} is reachable", config.api.base_url),
            _ => tracing::warn!("{} is not reachable", config.api.base_url),
        },
        Err(e) => tracing::warn!("{}; document processing will fail until it is set", e),
    }

    let server = PdfChatServer::new(config)?;

    println!("\n{}", style("Talk with PDF").cyan().bold());
    println!("  API: http://{}", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("  API Info: http://{}/api/info", server.address());
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;
    Ok(())
}
