use clap::{Args, Parser, Subcommand};
use intake_agent::config::{parse_max_attempts, AppConfig};
use intake_agent::error::AppError;
use intake_agent::telemetry;
use intake_agent::workflows::intake::{
    Console, ConversationController, Ledger, QuestionBank, RetryPolicy, TopicClassifier,
};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "intake-agent",
    about = "Interview job applicants on the console and record their answers",
    version
)]
struct Cli {
    #[command(flatten)]
    storage: StorageArgs,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Args, Debug, Default)]
struct StorageArgs {
    /// Override the configured question bank CSV
    #[arg(long, global = true)]
    question_bank: Option<PathBuf>,
    /// Override the configured application ledger CSV
    #[arg(long, global = true)]
    ledger: Option<PathBuf>,
    /// Abort after this many invalid answers to a single prompt
    #[arg(long, global = true, value_parser = parse_attempts)]
    max_attempts: Option<u32>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run an applicant interview (default command)
    Interview,
    /// Predict the topic of a free-text description
    Classify {
        /// Text to classify
        text: String,
    },
    /// Print the stored application ledger
    Ledger(LedgerArgs),
}

#[derive(Args, Debug)]
struct LedgerArgs {
    /// Emit one JSON object per record
    #[arg(long)]
    json: bool,
}

fn main() {
    if let Err(err) = run_cli() {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

fn parse_attempts(raw: &str) -> Result<u32, String> {
    parse_max_attempts(raw).map_err(|err| err.to_string())
}

fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let mut config = AppConfig::load()?;

    let StorageArgs {
        question_bank,
        ledger,
        max_attempts,
    } = cli.storage;
    if let Some(path) = question_bank {
        config.storage.question_bank = path;
    }
    if let Some(path) = ledger {
        config.storage.ledger = path;
    }
    if max_attempts.is_some() {
        config.interview.max_attempts = max_attempts;
    }

    telemetry::init(&config.telemetry)?;
    info!(environment = ?config.environment, "intake agent starting");

    match cli.command.unwrap_or(Command::Interview) {
        Command::Interview => run_interview(&config),
        Command::Classify { text } => run_classify(&config, &text),
        Command::Ledger(args) => run_ledger(&config, args),
    }
}

fn run_interview(config: &AppConfig) -> Result<(), AppError> {
    let bank = QuestionBank::from_path(&config.storage.question_bank)?;
    let ledger = Ledger::load(&config.storage.ledger)?;

    let stdin = io::stdin();
    let console = Console::new(stdin.lock(), io::stdout());
    let policy = RetryPolicy {
        max_attempts: config.interview.max_attempts,
    };

    let mut controller = ConversationController::new(
        bank,
        ledger,
        config.storage.ledger.clone(),
        console,
        rand::thread_rng(),
    )?
    .with_retry_policy(policy);

    let outcome = controller.run()?;
    info!(
        records = outcome.records_appended,
        ledger = %config.storage.ledger.display(),
        "application stored"
    );
    Ok(())
}

fn run_classify(config: &AppConfig, text: &str) -> Result<(), AppError> {
    let bank = QuestionBank::from_path(&config.storage.question_bank)?;
    let mut classifier = TopicClassifier::new();
    classifier.train(&bank)?;
    println!("{}", classifier.predict(text)?);
    Ok(())
}

fn run_ledger(config: &AppConfig, args: LedgerArgs) -> Result<(), AppError> {
    let ledger = Ledger::load(&config.storage.ledger)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for record in ledger.records() {
        if args.json {
            serde_json::to_writer(&mut out, record)?;
            writeln!(out)?;
        } else {
            writeln!(
                out,
                "{} | {} | {}",
                record.topic, record.question, record.answer
            )?;
        }
    }

    if ledger.is_empty() && !args.json {
        writeln!(out, "Ledger is empty: {}", config.storage.ledger.display())?;
    }
    Ok(())
}
