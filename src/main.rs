// file: src/main.rs
// description: commandline application entry point with command handling
// reference: application bootstrap and orchestration

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use notes_rag::utils::logging::{format_label, format_success, format_warning};
use notes_rag::{
    Config, IngestPipeline, LanceDbClient, OpenAiChatClient, OpenAiEmbeddingClient, QueryPipeline,
    Retrieval, SchemaManager,
};
use std::path::PathBuf;
use tracing::{error, info, warn};

const NO_MATCH_MESSAGE: &str = "Unable to find matching results.";

#[derive(Parser)]
#[command(name = "notes_rag")]
#[command(author = "cipher")]
#[command(version = "0.1.0")]
#[command(about = "Question answering over a folder of markdown notes", long_about = None)]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = "config/default.toml"
    )]
    config: PathBuf,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    color: bool,

    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rebuild the vector store from the notes directory
    Ingest,

    /// Answer a question from the ingested notes
    Query {
        /// Question text
        query_text: String,
    },

    Stats,

    Reset {
        #[arg(long)]
        confirm: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    notes_rag::utils::logging::init_logger(cli.color, cli.verbose);

    info!("Loading configuration from: {}", cli.config.display());

    let config = if cli.config.exists() {
        Config::load(Some(cli.config.as_path())).context("Failed to load configuration")?
    } else {
        warn!(
            "Config file {} not found, using default configuration",
            cli.config.display()
        );
        Config::load(None).context("Failed to load configuration")?
    };

    match cli.command {
        Commands::Ingest => {
            cmd_ingest(&config, cli.color).await?;
        }
        Commands::Query { query_text } => {
            cmd_query(&config, &query_text, cli.verbose).await?;
        }
        Commands::Stats => {
            cmd_stats(&config).await?;
        }
        Commands::Reset { confirm } => {
            cmd_reset(&config, confirm).await?;
        }
    }

    Ok(())
}

async fn cmd_ingest(config: &Config, colored: bool) -> Result<()> {
    info!("Starting ingestion pipeline");

    let api_key = config.require_api_key()?;
    let embedder = OpenAiEmbeddingClient::from_config(&config.openai, api_key);

    let client = LanceDbClient::new(config.database.clone())
        .await
        .context("Failed to open vector store")?;

    let stats = IngestPipeline::new(config, &embedder, &client)
        .with_color(colored)
        .run()
        .await
        .context("Ingestion failed")?;

    info!(
        "Ingestion complete in {:.2}s ({:.1} chunks/document)",
        stats.duration_ms as f64 / 1000.0,
        stats.chunks_per_document()
    );
    println!(
        "{}",
        format_success(&format!(
            "Saved {} chunks from {} documents to {}",
            stats.chunks_saved, stats.documents_loaded, config.database.uri
        ))
    );

    Ok(())
}

async fn cmd_query(config: &Config, query_text: &str, verbose: bool) -> Result<()> {
    let api_key = config.require_api_key()?;
    let embedder = OpenAiEmbeddingClient::from_config(&config.openai, api_key);
    let chat = OpenAiChatClient::from_config(&config.openai, api_key);

    let client = LanceDbClient::new(config.database.clone())
        .await
        .context("Failed to open vector store")?;

    let pipeline = QueryPipeline::new(&config.query, &embedder, &client, &chat);

    let prepared = match pipeline.prepare(query_text).await.context("Retrieval failed")? {
        Retrieval::NoMatch { .. } => {
            println!("{}", NO_MATCH_MESSAGE);
            return Ok(());
        }
        Retrieval::Ready(prepared) => prepared,
    };

    if verbose {
        for result in &prepared.results {
            println!("{}", result.format_summary(120));
        }
    }
    if config.query.show_prompt {
        println!("{}", prepared.prompt);
    }

    let answer = pipeline
        .complete(prepared)
        .await
        .context("Answer generation failed")?;

    println!("{}", format_label("Response", &answer.response));
    println!("{}", format_label("Sources", &format!("{:?}", answer.sources)));

    Ok(())
}

async fn cmd_stats(config: &Config) -> Result<()> {
    info!("Gathering statistics");

    let client = LanceDbClient::new(config.database.clone())
        .await
        .context("Failed to open vector store")?;

    if !SchemaManager::new(&client).verify_schema().await? {
        println!(
            "{}",
            format_warning(&format!("No chunks stored at {}; run ingest first", client.uri()))
        );
        return Ok(());
    }

    let count = client.get_chunk_count().await?;
    println!("{}", format_label("Store", client.uri()));
    println!("{}", format_label("Table", client.table_name()));
    println!("{}", format_label("Chunks", &count.to_string()));

    Ok(())
}

async fn cmd_reset(config: &Config, confirm: bool) -> Result<()> {
    if !confirm {
        error!("This will delete all stored chunks. Use --confirm to proceed");
        return Ok(());
    }

    warn!("Resetting vector store - all chunks will be lost");

    let client = LanceDbClient::new(config.database.clone())
        .await
        .context("Failed to open vector store")?;

    let dropped = SchemaManager::new(&client)
        .drop_chunks_table()
        .await
        .context("Failed to drop chunks table")?;

    if dropped {
        info!("Vector store reset complete");
    } else {
        info!("Nothing to reset");
    }

    Ok(())
}
