use anyhow::Context;
use clap::{Parser, Subcommand};
use finadvisor_core::advisor::{self, risk_profile};
use finadvisor_core::config::Settings;
use finadvisor_core::domain::user::RiskTolerance;
use finadvisor_core::market::MarketDataSource;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod seed;

#[derive(Debug, Parser)]
#[command(name = "finadvisor_worker")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply pending database migrations.
    Migrate,

    /// Create a demo user with three months of transactions.
    SeedDemo {
        #[arg(long, default_value = "demo@example.com")]
        email: String,

        /// conservative | moderate | aggressive (anything else is moderate).
        #[arg(long, default_value = "moderate")]
        risk_tolerance: String,

        #[arg(long, default_value_t = 3000.0)]
        monthly_income: f64,

        /// Print the planned rows instead of writing them.
        #[arg(long)]
        dry_run: bool,
    },

    /// Fetch and score market quotes, printing the snapshot as JSON.
    Snapshot,

    /// Print savings advice and the risk profile for a user as JSON.
    Advise {
        #[arg(long)]
        user_id: i64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    let res = run(&settings, args.command).await;
    if let Err(err) = &res {
        sentry_anyhow::capture_anyhow(err);
        tracing::error!(error = %format!("{err:#}"), "worker command failed");
    }
    res
}

async fn run(settings: &Settings, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Migrate => {
            connect(settings).await?;
            tracing::info!(database_url = settings.database_url(), "migrations applied");
        }
        Command::SeedDemo {
            email,
            risk_tolerance,
            monthly_income,
            dry_run,
        } => {
            if dry_run {
                let planned = seed::demo_transactions(0, monthly_income, chrono::Utc::now())?;
                tracing::info!(dry_run = true, rows = planned.len(), "seed-demo plan");
                println!("{}", serde_json::to_string_pretty(&planned)?);
                return Ok(());
            }

            let pool = connect(settings).await?;
            let opts = seed::SeedOptions {
                email,
                risk_tolerance: RiskTolerance::from_tag(&risk_tolerance),
                monthly_income,
            };
            let user = seed::seed_demo_user(&pool, &opts).await?;
            println!("{}", serde_json::to_string_pretty(&user)?);
        }
        Command::Snapshot => {
            let market = MarketDataSource::from_settings(settings)?;
            let snapshot = market.snapshot().await;
            if snapshot.is_degraded() {
                tracing::warn!("snapshot contains fallback quotes");
            }
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        Command::Advise { user_id } => {
            let pool = connect(settings).await?;
            let user = finadvisor_core::storage::users::get_user(&pool, user_id)
                .await?
                .with_context(|| format!("user {user_id} not found"))?;

            let advice = advisor::advice_for_user(&pool, &user).await?;
            let profile = risk_profile::assess(&user);
            let out = serde_json::json!({
                "advice": advice,
                "risk_profile": profile,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
    }
    Ok(())
}

async fn connect(settings: &Settings) -> anyhow::Result<sqlx::SqlitePool> {
    let pool = finadvisor_core::storage::connect(settings.database_url()).await?;
    finadvisor_core::storage::migrate(&pool).await?;
    Ok(pool)
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
