use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use relate::io::format_record_line;
use relate::{
    default_db_path, pipeline, read_transcript, write_json, AnalysisClient, HistoryStore,
    HumanReport, LlmConfig, PipelineConfig, SamplingConfig, DEFAULT_MAX_MESSAGES,
};

#[derive(Parser)]
#[command(name = "relate")]
#[command(author, version, about = "Relationship-health reports from exported chat transcripts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze an exported chat and print the report
    Analyze {
        /// Exported chat file (.txt)
        #[arg(short, long)]
        input: PathBuf,

        /// Maximum number of messages sent to the model
        #[arg(long, default_value_t = DEFAULT_MAX_MESSAGES)]
        max_messages: usize,

        /// Model name (overrides RELATE_MODEL)
        #[arg(long)]
        model: Option<String>,

        /// Language for the report text
        #[arg(long, default_value = "English")]
        language: String,

        /// Retries when the call fails or the result is invalid
        #[arg(long, default_value = "2")]
        retries: u32,

        /// Also write the result as JSON to this file
        #[arg(long)]
        json: Option<PathBuf>,

        /// Also write the text report to this file
        #[arg(long)]
        report: Option<PathBuf>,

        /// Don't save the result to history
        #[arg(long)]
        no_save: bool,

        /// History database (defaults to RELATE_DB or the user data dir)
        #[arg(long)]
        db: Option<PathBuf>,
    },

    /// Print the prompt excerpt that would be sent, without calling the model
    Prompt {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(long, default_value_t = DEFAULT_MAX_MESSAGES)]
        max_messages: usize,
    },

    /// Print message statistics for an exported chat
    Stats {
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Manage saved analyses
    History {
        #[command(subcommand)]
        action: HistoryAction,

        /// History database (defaults to RELATE_DB or the user data dir)
        #[arg(long, global = true)]
        db: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum HistoryAction {
    /// List saved analyses, newest first
    List,
    /// Show the full report for one saved analysis
    Show { id: i64 },
    /// Delete one saved analysis
    Delete { id: i64 },
    /// Delete all saved analyses
    Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        Commands::Analyze {
            input,
            max_messages,
            model,
            language,
            retries,
            json,
            report,
            no_save,
            db,
        } => {
            let config = PipelineConfig {
                sampling: SamplingConfig { max_messages },
                max_retries: retries,
            };
            let save_to = if no_save { None } else { Some(resolve_db(db)?) };
            let outputs = ReportOutputs {
                json,
                report,
                save_to,
            };
            analyze_chat(input, config, model, language, outputs).await
        }
        Commands::Prompt {
            input,
            max_messages,
        } => print_prompt(&input, max_messages),
        Commands::Stats { input } => print_stats(&input),
        Commands::History { action, db } => run_history(action, &resolve_db(db)?),
    }
}

fn setup_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_db(db: Option<PathBuf>) -> Result<PathBuf> {
    match db {
        Some(path) => Ok(path),
        None => default_db_path(),
    }
}

/// Where an analysis gets written besides stdout
struct ReportOutputs {
    json: Option<PathBuf>,
    report: Option<PathBuf>,
    save_to: Option<PathBuf>,
}

async fn analyze_chat(
    input: PathBuf,
    config: PipelineConfig,
    model: Option<String>,
    language: String,
    outputs: ReportOutputs,
) -> Result<()> {
    info!("Loading chat from {:?}", input);
    let raw = read_transcript(&input)?;

    let mut llm_config = LlmConfig::from_env()?;
    if let Some(model) = model {
        llm_config.model = model;
    }
    llm_config.language = language;
    let client = AnalysisClient::new(llm_config)?;

    info!(
        "Analyzing with {} (report language: {})",
        client.config().model,
        client.config().language
    );
    let outcome = pipeline::analyze_transcript(&client, &raw, &config).await?;
    info!(
        "Analyzed {} messages in {} attempt(s)",
        outcome.prepared.messages.len(),
        outcome.attempts
    );

    let report = HumanReport::new(&outcome.result);
    print!("{}", report.format());

    if let Some(path) = outputs.report {
        report.write_file(&path)?;
        info!("Report written to {:?}", path);
    }

    if let Some(path) = outputs.json {
        write_json(&outcome.result, &path)?;
        info!("JSON written to {:?}", path);
    }

    if let Some(db_path) = outputs.save_to {
        let result = outcome.result.clone();
        let id = tokio::task::spawn_blocking(move || {
            let store = HistoryStore::open(&db_path)?;
            store.insert(&result)
        })
        .await
        .context("history save spawn_blocking")??;
        info!("Saved to history as #{}", id);
    }

    Ok(())
}

fn print_prompt(input: &Path, max_messages: usize) -> Result<()> {
    let config = PipelineConfig {
        sampling: SamplingConfig { max_messages },
        ..Default::default()
    };
    let prepared = pipeline::prepare(&read_transcript(input)?, &config)?;
    print!("{}", prepared.prompt);
    Ok(())
}

fn print_stats(input: &Path) -> Result<()> {
    let prepared = pipeline::prepare(&read_transcript(input)?, &PipelineConfig::default())?;
    let stats = &prepared.stats;

    println!("Chat Statistics");
    println!("===============");
    println!("Total messages: {}", stats.total_messages);
    println!("Total words: {}", stats.total_words);
    println!("Senders: {}", stats.unique_senders.len());
    println!();

    for (sender, count) in stats.senders_by_activity() {
        let words = stats.words_by_sender.get(sender).copied().unwrap_or(0);
        println!(
            "{}: {} messages ({:.1}%), {} words",
            sender,
            count,
            count as f64 / stats.total_messages as f64 * 100.0,
            words
        );
    }

    if let Some(balance) = stats.balance() {
        println!();
        println!(
            "Balance: {} {}% / {} {}%",
            balance.person_a,
            balance.person_a_percentage,
            balance.person_b,
            balance.person_b_percentage
        );
    }

    Ok(())
}

fn run_history(action: HistoryAction, db: &Path) -> Result<()> {
    let store = HistoryStore::open(db)?;

    match action {
        HistoryAction::List => {
            let records = store.list()?;
            if records.is_empty() {
                println!("No saved analyses.");
            }
            for record in &records {
                println!("{}", format_record_line(record));
            }
        }
        HistoryAction::Show { id } => {
            let record = store
                .get(id)?
                .with_context(|| format!("no saved analysis with id {}", id))?;
            println!("{}", format_record_line(&record));
            println!();
            print!("{}", HumanReport::new(&record.to_result()).format());
        }
        HistoryAction::Delete { id } => {
            if store.delete(id)? {
                println!("Deleted #{}", id);
            } else {
                anyhow::bail!("no saved analysis with id {}", id);
            }
        }
        HistoryAction::Clear => {
            let n = store.delete_all()?;
            println!("Deleted {} saved analyses", n);
        }
    }

    Ok(())
}
