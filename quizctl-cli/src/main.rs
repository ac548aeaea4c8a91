//! quizctl CLI - quiz question store
//!
//! Entry point for the question repository:
//! - Connectivity check (`ping`)
//! - Question writes with cascading responses (`create`, `update`, `delete`)
//! - Reads (`show`, `search`)

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use quizctl_core::config::{load_dotenv, DatabaseConfig};
use quizctl_core::Question;
use quizctl_db::{create_pool, ping, DeleteOutcome, PgPool, QuestionRepo};
use tracing::info;

mod args;
mod tracing_setup;

use args::{parse_question_id, QuestionArgs};

#[derive(Parser, Debug)]
#[command(name = "quizctl", version, about = "Store and search quiz questions")]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Config file (defaults to ~/.quizctl/config.toml)
    #[arg(long, global = true, value_name = "PATH", env = "QUIZCTL_CONFIG")]
    config: Option<PathBuf>,

    /// Abort any single operation after this many seconds
    #[arg(long, global = true, value_name = "SECS")]
    timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check that the database is reachable
    Ping,
    /// Create a question with its responses
    Create(QuestionArgs),
    /// Replace a question's content, quiz and full response set
    Update(UpdateArgs),
    /// Delete a question and its responses (no-op if absent)
    Delete(IdArgs),
    /// Show a question with its responses
    Show(ShowArgs),
    /// List questions whose quiz has the given topic
    Search(SearchArgs),
}

#[derive(Args, Debug)]
struct UpdateArgs {
    /// Question id
    #[arg(value_parser = parse_question_id)]
    id: i32,

    #[command(flatten)]
    question: QuestionArgs,
}

#[derive(Args, Debug)]
struct IdArgs {
    /// Question id
    #[arg(value_parser = parse_question_id)]
    id: i32,
}

#[derive(Args, Debug)]
struct ShowArgs {
    /// Question id
    #[arg(value_parser = parse_question_id)]
    id: i32,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct SearchArgs {
    /// Quiz topic to match exactly
    topic: String,

    /// Group results under their quizzes
    #[arg(long)]
    by_quiz: bool,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_setup::init(&tracing_setup::TracingConfig { debug: cli.debug }).ok();
    load_dotenv();

    let config = match &cli.config {
        Some(path) => DatabaseConfig::load_from(path)?,
        None => DatabaseConfig::load()?,
    };
    let pool = create_pool(&config)
        .await
        .with_context(|| format!("Failed to connect to {}:{}", config.host, config.port))?;

    let deadline = cli.timeout_secs.map(Duration::from_secs);

    match cli.command {
        Commands::Ping => {
            ping(&pool).await.context("Ping failed")?;
            println!("ok");
        }
        Commands::Create(args) => run_create(&pool, deadline, args).await?,
        Commands::Update(args) => run_update(&pool, deadline, args).await?,
        Commands::Delete(args) => run_delete(&pool, deadline, args).await?,
        Commands::Show(args) => run_show(&pool, deadline, args).await?,
        Commands::Search(args) => run_search(&pool, deadline, args).await?,
    }

    pool.close().await;
    Ok(())
}

fn repo(pool: &PgPool, deadline: Option<Duration>) -> QuestionRepo<'_> {
    let repo = QuestionRepo::new(pool);
    match deadline {
        Some(limit) => repo.with_deadline(limit),
        None => repo,
    }
}

async fn run_create(pool: &PgPool, deadline: Option<Duration>, args: QuestionArgs) -> Result<()> {
    let mut question = args.into_question();
    let id = repo(pool, deadline)
        .create(&mut question)
        .await
        .context("Failed to create question")?;

    info!(question_id = id, "Created question");
    println!("{}", id);
    Ok(())
}

async fn run_update(pool: &PgPool, deadline: Option<Duration>, args: UpdateArgs) -> Result<()> {
    let mut question = args.question.into_question();
    question.id = Some(args.id);

    repo(pool, deadline)
        .update(&mut question)
        .await
        .with_context(|| format!("Failed to update question {}", args.id))?;

    info!(question_id = args.id, responses = question.responses.len(), "Updated question");
    Ok(())
}

async fn run_delete(pool: &PgPool, deadline: Option<Duration>, args: IdArgs) -> Result<()> {
    let outcome = repo(pool, deadline)
        .delete_by_id(args.id)
        .await
        .with_context(|| format!("Failed to delete question {}", args.id))?;

    match outcome {
        DeleteOutcome::Deleted { responses } => {
            info!(question_id = args.id, responses, "Deleted question");
        }
        DeleteOutcome::Absent => info!(question_id = args.id, "No such question, nothing deleted"),
    }
    Ok(())
}

async fn run_show(pool: &PgPool, deadline: Option<Duration>, args: ShowArgs) -> Result<()> {
    let question = repo(pool, deadline)
        .find_by_id(args.id)
        .await
        .with_context(|| format!("Failed to load question {}", args.id))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&question)?);
    } else {
        print_question(&question);
    }
    Ok(())
}

async fn run_search(pool: &PgPool, deadline: Option<Duration>, args: SearchArgs) -> Result<()> {
    let repo = repo(pool, deadline);
    let context = || format!("Failed to search topic '{}'", args.topic);

    if args.by_quiz {
        let quizzes = repo.find_quizzes_by_topic(&args.topic).await.with_context(context)?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&quizzes)?);
        } else {
            for quiz in &quizzes {
                println!("quiz {} [{}] difficulty {}", quiz.id, quiz.topic, quiz.difficulty);
                quiz.questions.iter().for_each(print_question);
            }
        }
        return Ok(());
    }

    let questions = repo.find_by_topic(&args.topic).await.with_context(context)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&questions)?);
    } else {
        questions.iter().for_each(print_question);
    }
    info!(topic = %args.topic, found = questions.len(), "Search complete");
    Ok(())
}

fn print_question(question: &Question) {
    let id = question.id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string());
    println!("#{} (quiz {}) {}", id, question.quiz_id, question.content);
    for response in &question.responses {
        let mark = if response.correct { "x" } else { " " };
        println!("  [{}] {}", mark, response.text);
    }
}
