use std::io::BufRead;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use log::{error, info, warn};
use scribe_client::{CancellationToken, TranscriptionClient};
use scribe_lib::config::{AppConfig, Overrides};
use scribe_lib::credentials::resolve_api_key;
use scribe_lib::keychain::{CredentialStore, Keychain};
use scribe_lib::{service, Error};

/// Transcribe audio files with a remote speech-to-text service
#[derive(Parser, Debug)]
#[command(name = "scribe", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Transcribe one or more audio files
    Transcribe(TranscribeArgs),
    /// Manage the API key stored in the system keychain
    #[command(subcommand)]
    Auth(AuthCommand),
}

#[derive(Args, Debug)]
struct TranscribeArgs {
    /// Audio files (mp3, wav, m4a, flac, ogg, webm, ...)
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Write `<name>.txt` transcripts here instead of printing them
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// API key; falls back to the keychain when unset
    #[arg(long, env = "ASSEMBLYAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// JSON config file (baseUrl, pollIntervalMs, maxPollAttempts, requestTimeoutSecs)
    #[arg(long, env = "SCRIBE_CONFIG")]
    config: Option<PathBuf>,

    /// Service root URL
    #[arg(long, env = "SCRIBE_BASE_URL")]
    base_url: Option<String>,

    /// Milliseconds between status checks
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    poll_interval_ms: Option<u64>,

    /// Give up after this many status checks
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    max_polls: Option<u32>,

    /// Per-request HTTP timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,
}

#[derive(Subcommand, Debug)]
enum AuthCommand {
    /// Store an API key in the keychain, read from the first line of stdin
    Set,
    /// Remove the stored API key
    Clear,
    /// Show whether an API key is stored
    Status,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    scribe_lib::log::init(cli.verbose);

    let result = match cli.command {
        Command::Transcribe(args) => transcribe(args).await,
        Command::Auth(command) => auth(command, &Keychain, &mut std::io::stdin().lock()),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            error!("{}", e);
            eprintln!("{}", e.user_message());
            ExitCode::FAILURE
        }
    }
}

async fn transcribe(args: TranscribeArgs) -> Result<ExitCode, Error> {
    let config = match &args.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    }
    .apply(Overrides {
        base_url: args.base_url,
        poll_interval_ms: args.poll_interval_ms,
        max_poll_attempts: args.max_polls,
        request_timeout_secs: args.timeout_secs,
    });

    let (api_key, source) = resolve_api_key(args.api_key.as_deref(), &Keychain)?;
    info!("API key source: {}", source);

    let client = TranscriptionClient::new(&config.client_config(api_key))?;

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, cancelling transcriptions");
                cancel.cancel();
            }
        });
    }

    let outcomes =
        service::transcribe_files(&client, &args.files, args.output_dir.as_deref(), &cancel)
            .await;

    let many = outcomes.len() > 1;
    let mut failed = 0;

    for outcome in outcomes {
        let text = match outcome.result {
            Ok(text) => text,
            Err(e) => {
                failed += 1;
                eprintln!("{}: {}", outcome.path.display(), e.user_message());
                continue;
            }
        };

        if let Some(target) = &outcome.written_to {
            eprintln!("{} -> {}", outcome.path.display(), target.display());
            continue;
        }

        if let Some(e) = &outcome.write_error {
            failed += 1;
            eprintln!(
                "{}: transcript could not be saved ({}), printing it instead",
                outcome.path.display(),
                e
            );
        }

        if many || outcome.write_error.is_some() {
            println!("== {} ==", outcome.path.display());
        }
        println!("{}", text);
    }

    Ok(if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn auth(
    command: AuthCommand,
    store: &impl CredentialStore,
    input: &mut impl BufRead,
) -> Result<ExitCode, Error> {
    match command {
        AuthCommand::Set => {
            eprintln!("Paste the API key and press Enter:");
            let mut line = String::new();
            input.read_line(&mut line)?;

            let key = line.trim();
            if key.is_empty() {
                return Err(Error::ApiKeyMissing);
            }
            store.save(key)?;
            eprintln!("API key saved.");
        }
        AuthCommand::Clear => {
            store.delete()?;
            eprintln!("API key removed.");
        }
        AuthCommand::Status => match store.load()? {
            Some(_) => eprintln!("An API key is stored in the keychain."),
            None => eprintln!("No API key stored."),
        },
    }

    Ok(ExitCode::SUCCESS)
}
