//! LeadLink command-line interface
//!
//! Drives the OAuth login flow and the conversation message fetcher
//! from a terminal. Exit code is 0 on success and 1 after printing a
//! failure summary.

use std::io::Write as _;
use std::path::PathBuf;

use anyhow::{bail, Context};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};

use leadlink_api::context::{AppConfig, AppContext};
use leadlink_api::utils::logging::init_tracing;
use leadlink_infra::integrations::conversations::FetchFilters;

#[derive(Parser)]
#[command(name = "leadlink", version, about = "CRM integration: OAuth login and message retrieval")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Manage the OAuth credential lifecycle
    Auth {
        #[command(subcommand)]
        command: AuthCommand,
    },
    /// Fetch conversation messages with date filtering
    FetchMessages(FetchMessagesArgs),
}

#[derive(Subcommand)]
enum AuthCommand {
    /// Start a browser login and complete the code exchange
    Login,
    /// Show credential status for a principal
    Status {
        /// Principal to inspect; defaults to the configured one
        #[arg(long)]
        principal: Option<String>,
    },
}

#[derive(Args)]
struct FetchMessagesArgs {
    /// Conversation to fetch
    #[arg(long)]
    conversation_id: String,

    /// Oldest timestamp to retain (ISO 8601; bare dates mean midnight UTC)
    #[arg(long)]
    start_date: Option<String>,

    /// Newest timestamp to retain (ISO 8601; bare dates mean end of day UTC)
    #[arg(long)]
    end_date: Option<String>,

    /// Message type to request; repeat for several
    #[arg(long = "message-type")]
    message_types: Vec<String>,

    /// Output format
    #[arg(long, value_enum, default_value = "summary")]
    format: OutputFormat,

    /// Write output to a file instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Authenticate with a fixed token instead of the OAuth lifecycle
    #[arg(long, env = "LEADLINK_ACCESS_TOKEN")]
    access_token: Option<String>,

    /// Principal whose credential authenticates the requests
    #[arg(long)]
    principal: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Full messages and metadata as pretty-printed JSON
    Json,
    /// One human-readable line per message
    Text,
    /// Counts and the effective filters only
    Summary,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Auth { command } => run_auth(command).await,
        Command::FetchMessages(args) => run_fetch_messages(args).await,
    }
}

async fn run_auth(command: AuthCommand) -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("loading configuration")?;
    let default_principal = config.default_principal.clone();
    let ctx = AppContext::new(config).context("building application context")?;

    match command {
        AuthCommand::Login => {
            let (url, expected_state) =
                ctx.store.begin_authorization().await.context("building authorization URL")?;

            println!("Open this URL in a browser and approve access:\n\n{url}\n");

            let code = prompt("Authorization code: ")?;
            let state = prompt("State from the callback: ")?;

            if state != expected_state {
                // The store would reject this too; failing here keeps the
                // message actionable
                bail!("state does not match this login attempt; restart the login");
            }

            let credential = ctx
                .store
                .complete_authorization(&code, &state)
                .await
                .context("completing code exchange")?;

            println!(
                "Authenticated as {} (expires {})",
                credential.principal_id,
                credential.expires_at.to_rfc3339()
            );
            Ok(())
        }
        AuthCommand::Status { principal } => {
            let principal = principal.unwrap_or(default_principal);
            match ctx.store.get(&principal).await {
                Some(credential) => {
                    println!("Principal:  {}", credential.principal_id);
                    if let Some(location) = &credential.location_id {
                        println!("Location:   {location}");
                    }
                    if let Some(scope) = &credential.scope {
                        println!("Scope:      {scope}");
                    }
                    println!("Expires:    {}", credential.expires_at.to_rfc3339());
                    println!("Remaining:  {}s", credential.seconds_until_expiry());
                }
                None => println!("Not authenticated (principal {principal})"),
            }
            Ok(())
        }
    }
}

async fn run_fetch_messages(args: FetchMessagesArgs) -> anyhow::Result<()> {
    // A static token authenticates on its own; only the OAuth path
    // needs client credentials in the environment
    let config = match &args.access_token {
        Some(_) => AppConfig::from_env_static(),
        None => AppConfig::from_env().context("loading configuration")?,
    };
    let principal = args.principal.clone().unwrap_or_else(|| config.default_principal.clone());

    let ctx = match &args.access_token {
        Some(token) => AppContext::with_static_token(config, token.clone()),
        None => AppContext::new(config),
    }
    .context("building application context")?;

    let filters = FetchFilters {
        start_date: args
            .start_date
            .as_deref()
            .map(|raw| parse_cli_date(raw, false))
            .transpose()
            .context("parsing --start-date")?,
        end_date: args
            .end_date
            .as_deref()
            .map(|raw| parse_cli_date(raw, true))
            .transpose()
            .context("parsing --end-date")?,
        message_types: args.message_types.clone(),
    };

    let outcome = ctx
        .messages
        .fetch_messages(&principal, &args.conversation_id, &filters)
        .await
        .context("fetching messages")?;

    let rendered = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&serde_json::json!({
            "messages": outcome.messages,
            "metadata": outcome.metadata,
        }))
        .context("serializing output")?,
        OutputFormat::Text => {
            let mut lines: Vec<String> =
                outcome.messages.iter().map(|m| m.display_line()).collect();
            lines.push(format!(
                "\n{} of {} messages retained across {} pages",
                outcome.metadata.total_retained,
                outcome.metadata.total_scanned,
                outcome.metadata.pages_fetched
            ));
            lines.join("\n")
        }
        OutputFormat::Summary => format!(
            "Conversation: {}\nScanned:      {}\nRetained:     {}\nPages:        {}\nFilters:      {}",
            outcome.metadata.conversation_id,
            outcome.metadata.total_scanned,
            outcome.metadata.total_retained,
            outcome.metadata.pages_fetched,
            serde_json::to_string(&outcome.metadata.filters).context("serializing filters")?,
        ),
    };

    match &args.output {
        Some(path) => {
            std::fs::write(path, rendered.as_bytes())
                .with_context(|| format!("writing {}", path.display()))?;
            println!("Wrote {} messages to {}", outcome.metadata.total_retained, path.display());
        }
        None => println!("{rendered}"),
    }

    Ok(())
}

/// Parse a CLI date as UTC.
///
/// Accepts RFC 3339, a naive datetime assumed UTC, or a bare date.
/// Bare dates expand to midnight for start bounds and end of day for
/// end bounds so `--end-date 2024-03-10` includes that day.
fn parse_cli_date(raw: &str, end_of_day: bool) -> anyhow::Result<DateTime<Utc>> {
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(raw) {
        return Ok(with_offset.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Ok(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        let time = if end_of_day { (23, 59, 59) } else { (0, 0, 0) };
        if let Some(naive) = date.and_hms_opt(time.0, time.1, time.2) {
            return Ok(naive.and_utc());
        }
    }
    bail!("unrecognized date {raw:?}; use ISO 8601 (2024-03-10 or 2024-03-10T12:00:00Z)")
}

fn prompt(label: &str) -> anyhow::Result<String> {
    print!("{label}");
    std::io::stdout().flush().context("flushing stdout")?;

    let mut line = String::new();
    std::io::stdin().read_line(&mut line).context("reading stdin")?;
    Ok(line.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cli_date_variants() {
        let start = parse_cli_date("2024-03-10", false).unwrap();
        assert_eq!(start.to_rfc3339(), "2024-03-10T00:00:00+00:00");

        let end = parse_cli_date("2024-03-10", true).unwrap();
        assert_eq!(end.to_rfc3339(), "2024-03-10T23:59:59+00:00");

        let precise = parse_cli_date("2024-03-10T12:30:00Z", false).unwrap();
        assert_eq!(precise.to_rfc3339(), "2024-03-10T12:30:00+00:00");

        let naive = parse_cli_date("2024-03-10T12:30:00", false).unwrap();
        assert_eq!(naive, precise);

        assert!(parse_cli_date("next tuesday", false).is_err());
    }

    #[test]
    fn test_cli_parses_fetch_messages() {
        let cli = Cli::try_parse_from([
            "leadlink",
            "fetch-messages",
            "--conversation-id",
            "conv_1",
            "--start-date",
            "2024-03-01",
            "--message-type",
            "TYPE_SMS",
            "--message-type",
            "TYPE_EMAIL",
            "--format",
            "json",
        ])
        .unwrap();

        match cli.command {
            Command::FetchMessages(args) => {
                assert_eq!(args.conversation_id, "conv_1");
                assert_eq!(args.message_types, vec!["TYPE_SMS", "TYPE_EMAIL"]);
                assert!(matches!(args.format, OutputFormat::Json));
            }
            Command::Auth { .. } => panic!("wrong subcommand"),
        }
    }
}
