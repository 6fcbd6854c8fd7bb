use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use tfarmer::{
    config::Config,
    database::Database,
    handlers::{upload, user, AppState},
    models::{MetricsReport, Tier, UploadMode},
    services::{IpfsClient, MailClient, Recipient, ReportSink},
};

#[derive(Parser, Debug)]
#[command(name = "tfarmer", version, about = "Scrapes user and upload metrics from Temporal's databases")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to a TOML or JSON configuration file
    #[arg(long, global = true, env = "TFARMER_CONFIG")]
    config: Option<String>,

    /// Toggle debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Disable SSL on the database connection
    #[arg(long, global = true)]
    db_no_ssl: bool,

    /// Run database migrations before querying
    #[arg(long, global = true)]
    db_migrate: bool,

    /// Print the report as JSON instead of a sentence
    #[arg(long, global = true)]
    json: bool,

    /// Email the report after printing it
    #[arg(long, global = true)]
    email_enabled: bool,

    /// Address to send the report to (repeatable)
    #[arg(long = "email-recipient", global = true)]
    email_recipients: Vec<String>,

    /// Display name for the recipient at the same position
    #[arg(long = "recipient-name", global = true)]
    recipient_names: Vec<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// User based metrics (registrations, tiers, activity)
    #[command(subcommand)]
    User(UserCommand),
    /// Feature usage based metrics
    #[command(subcommand)]
    Usage(UsageCommand),
    /// Upload based metrics (number of uploads, average size)
    #[command(subcommand)]
    Upload(UploadCommand),
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    /// Number of registered users
    Registered,
    /// Number of free users
    Free(TierArgs),
    /// Number of light users
    Light(TierArgs),
    /// Number of plus users
    Plus(TierArgs),
    /// Number of paid users
    Paid(TierArgs),
    /// Number of users on an arbitrary tier
    Tier {
        tier: String,
        #[command(flatten)]
        args: TierArgs,
    },
    /// Users that logged in within the window
    Active {
        #[arg(long, default_value_t = 24)]
        window_hours: u32,
    },
}

#[derive(Args, Debug, Clone, Copy)]
struct TierArgs {
    /// Include the users themselves in the report (best read with --json)
    #[arg(long)]
    list: bool,
}

#[derive(Subcommand, Debug)]
enum UsageCommand {
    /// Usage records updated within the window
    Active {
        #[arg(long, default_value_t = 24)]
        window_hours: u32,
    },
}

#[derive(Subcommand, Debug)]
enum UploadCommand {
    /// Total number of uploads
    Count {
        /// Count each content hash once
        #[arg(long)]
        unique: bool,
    },
    /// Average size of uploads in gigabytes
    Size {
        /// Size each content hash once
        #[arg(long)]
        unique: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    if let Err(e) = run(cli).await {
        eprintln!("{:#}", e);
        std::process::exit(1);
    }
}

fn init_tracing(debug: bool) {
    let default_filter = if debug { "tfarmer=debug" } else { "tfarmer=info" };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load(cli.config.as_deref()).context("failed to load config")?;
    apply_flags(&mut config, &cli);

    // Fail on a bad email setup before doing any work.
    let mailer = if cli.email_enabled {
        let recipients = recipients(&cli.email_recipients, &cli.recipient_names)?;
        let client = MailClient::new(&config.sendgrid).context("failed to initialize mail manager")?;
        Some((client, recipients))
    } else {
        None
    };

    let database = Database::new(&config.database)
        .await
        .context("failed to initialize database connection")?;
    if cli.db_migrate {
        database.migrate().await.context("failed to run database migrations")?;
    }

    let sizes = IpfsClient::new(&config.ipfs).context("failed to open ipfs api connection")?;
    let state = AppState::new(Arc::new(database), Arc::new(sizes), config);

    let report = dispatch(&state, cli.command).await?;

    if cli.json {
        println!("{}", serde_json::to_string(&report)?);
    } else {
        println!("{}", report);
    }

    if let Some((client, recipients)) = mailer {
        client
            .deliver(&report, &recipients)
            .await
            .context("failed to send email report")?;
    }

    Ok(())
}

/// Command-line switches win over every config source.
fn apply_flags(config: &mut Config, cli: &Cli) {
    if cli.db_no_ssl {
        config.database.ssl_mode_disable = true;
    }
}

async fn dispatch(state: &AppState, command: Command) -> Result<MetricsReport> {
    let now = Utc::now();

    let report = match command {
        Command::User(UserCommand::Registered) => user::registered_users(state)
            .await
            .context("failed to get registered users")?,
        Command::User(UserCommand::Free(args)) => tier_report(state, Tier::Free, args).await?,
        Command::User(UserCommand::Light(args)) => tier_report(state, Tier::Light, args).await?,
        Command::User(UserCommand::Plus(args)) => tier_report(state, Tier::Plus, args).await?,
        Command::User(UserCommand::Paid(args)) => tier_report(state, Tier::Paid, args).await?,
        Command::User(UserCommand::Tier { tier, args }) => {
            tier_report(state, Tier::from(tier), args).await?
        }
        Command::User(UserCommand::Active { window_hours }) => {
            user::active_users(state, now, window_hours)
                .await
                .context("failed to get active users")?
        }
        Command::Usage(UsageCommand::Active { window_hours }) => {
            user::active_usage(state, now, window_hours)
                .await
                .context("failed to get active usage")?
        }
        Command::Upload(UploadCommand::Count { unique }) => {
            upload::upload_count(state, UploadMode::from_unique(unique))
                .await
                .context("failed to get number of uploads")?
        }
        Command::Upload(UploadCommand::Size { unique }) => {
            upload::average_upload_size(state, UploadMode::from_unique(unique))
                .await
                .context("failed to get upload size average")?
        }
    };

    Ok(report)
}

async fn tier_report(state: &AppState, tier: Tier, args: TierArgs) -> Result<MetricsReport> {
    let report = if args.list {
        user::list_users_by_tier(state, &tier).await
    } else {
        user::users_by_tier(state, &tier).await
    };
    report.with_context(|| format!("failed to get {} users", tier))
}

/// Pairs each address with the name at the same position, if any.
fn recipients(emails: &[String], names: &[String]) -> Result<Vec<Recipient>> {
    if emails.is_empty() {
        anyhow::bail!("--email-enabled requires at least one --email-recipient");
    }

    Ok(emails
        .iter()
        .enumerate()
        .map(|(i, email)| {
            let name = names.get(i).cloned().unwrap_or_default();
            Recipient::new(name, email.clone())
        })
        .collect())
}
