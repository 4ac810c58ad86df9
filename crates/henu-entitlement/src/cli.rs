//! CLI module for henu-entitlement.
//!
//! Manages accounts and inspects the download ledger in a SQL store. Used
//! as the standalone `henu-admin` binary and as `henu-rs admin`.
//!
//! # Usage
//!
//! ```bash
//! # Initialize database schema
//! henu-admin init -d sqlite:henu.db?mode=rwc
//!
//! # Add an account and raise its quota
//! henu-admin add -d sqlite:henu.db -u uid-123 -e ada@example.org --verified
//! henu-admin set-tier -d sqlite:henu.db -u uid-123 elevated
//!
//! # What would the download page say right now?
//! henu-admin status -d sqlite:henu.db -u uid-123
//!
//! # Same, for a server configured with `standard_daily = 5`
//! henu-admin status -d sqlite:henu.db -u uid-123 --standard-daily 5
//!
//! # Today's ledger for an account, then the latest downloads by anyone
//! henu-admin ledger -d sqlite:henu.db -u uid-123
//! henu-admin ledger -d sqlite:henu.db --limit 20
//! ```
//!
//! The quota flags default to the server defaults and also read
//! `HENU_STANDARD_DAILY`, `HENU_ELEVATED_DAILY` and `HENU_UTC_OFFSET_SECS`.

use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use henu_core::{
    DEFAULT_ELEVATED_DAILY_QUOTA, DEFAULT_QUOTA_UTC_OFFSET_SECS, DEFAULT_STANDARD_DAILY_QUOTA,
    SECS_PER_DAY,
};
use tabled::{Table, Tabled};

use crate::clock::{Clock, SystemClock};
use crate::digest_hex;
use crate::engine::EntitlementEngine;
use crate::policy::QuotaPolicy;
use crate::record::{AccountRecord, ClientContext, DownloadEvent, Profile, Tier};
use crate::sql::{SqlStore, SqlStoreConfig};
use crate::store::AccountStore;
use crate::verdict::RecordResult;

/// Entitlement management CLI arguments.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "henu-admin",
    version,
    about = "Manage HENU OS download accounts"
)]
pub struct AdminArgs {
    #[command(subcommand)]
    pub command: AdminCommands,
}

/// Quota settings for commands that evaluate or record. Must match the
/// server's `[quota]` section to give the same answers.
#[derive(Args, Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaArgs {
    /// Downloads per day for standard accounts.
    #[arg(long, env = "HENU_STANDARD_DAILY", default_value_t = DEFAULT_STANDARD_DAILY_QUOTA)]
    pub standard_daily: u32,

    /// Downloads per day for elevated accounts.
    #[arg(long, env = "HENU_ELEVATED_DAILY", default_value_t = DEFAULT_ELEVATED_DAILY_QUOTA)]
    pub elevated_daily: u32,

    /// Offset of the quota day from UTC, in seconds.
    #[arg(
        long,
        env = "HENU_UTC_OFFSET_SECS",
        default_value_t = DEFAULT_QUOTA_UTC_OFFSET_SECS,
        allow_hyphen_values = true
    )]
    pub utc_offset_secs: i64,
}

impl From<QuotaArgs> for QuotaPolicy {
    fn from(args: QuotaArgs) -> Self {
        Self {
            standard: args.standard_daily,
            elevated: args.elevated_daily,
            utc_offset_secs: args.utc_offset_secs,
        }
    }
}

/// Admin CLI subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum AdminCommands {
    /// Initialize database schema.
    Init {
        /// Database connection URL.
        #[arg(short, long, env = "DATABASE_URL")]
        database: String,
    },

    /// Add an account (no-op if it already exists).
    Add {
        /// Database connection URL.
        #[arg(short, long, env = "DATABASE_URL")]
        database: String,

        /// Identity provider user ID.
        #[arg(short, long)]
        user_id: String,

        /// Email address.
        #[arg(short, long)]
        email: String,

        /// Display name.
        #[arg(short = 'n', long)]
        display_name: Option<String>,

        /// Tier (standard, elevated).
        #[arg(short, long, default_value = "standard")]
        tier: String,

        /// Mark the email address as verified.
        #[arg(long)]
        verified: bool,
    },

    /// Change an account's tier.
    SetTier {
        /// Database connection URL.
        #[arg(short, long, env = "DATABASE_URL")]
        database: String,

        /// User ID to update.
        #[arg(short, long)]
        user_id: String,

        /// New tier (standard, elevated).
        tier: String,
    },

    /// Override the email verification flag.
    Verify {
        /// Database connection URL.
        #[arg(short, long, env = "DATABASE_URL")]
        database: String,

        /// User ID to update.
        #[arg(short, long)]
        user_id: String,

        /// Clear the flag instead of setting it.
        #[arg(long)]
        revoke: bool,
    },

    /// List all accounts.
    List {
        /// Database connection URL.
        #[arg(short, long, env = "DATABASE_URL")]
        database: String,

        /// Output format (table, json, csv).
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Evaluate an account's download entitlement now.
    Status {
        /// Database connection URL.
        #[arg(short, long, env = "DATABASE_URL")]
        database: String,

        /// User ID to evaluate.
        #[arg(short, long)]
        user_id: String,

        #[command(flatten)]
        quota: QuotaArgs,
    },

    /// Record a download, enforcing the daily quota.
    Record {
        /// Database connection URL.
        #[arg(short, long, env = "DATABASE_URL")]
        database: String,

        /// User ID to record for.
        #[arg(short, long)]
        user_id: String,

        #[command(flatten)]
        quota: QuotaArgs,
    },

    /// Show download events: one account oldest first, or everyone newest first.
    Ledger {
        /// Database connection URL.
        #[arg(short, long, env = "DATABASE_URL")]
        database: String,

        /// Only this account's events.
        #[arg(short, long)]
        user_id: Option<String>,

        /// Number of quota days to include (1 = today only). Defaults to
        /// today for one account and to all time otherwise.
        #[arg(long)]
        days: Option<u32>,

        /// Most events to show when listing every account.
        #[arg(long, default_value_t = 50)]
        limit: u32,

        /// Offset of the quota day from UTC, in seconds.
        #[arg(
            long,
            env = "HENU_UTC_OFFSET_SECS",
            default_value_t = DEFAULT_QUOTA_UTC_OFFSET_SECS,
            allow_hyphen_values = true
        )]
        utc_offset_secs: i64,
    },

    /// Print the SHA-224 digest of a secret (for static identity tables).
    Digest {
        /// Token or password to digest.
        secret: String,
    },
}

/// Account row for display.
#[derive(Tabled)]
struct AccountDisplay {
    #[tabled(rename = "User ID")]
    user_id: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Tier")]
    tier: String,
    #[tabled(rename = "Verified")]
    verified: String,
    #[tabled(rename = "Downloads")]
    downloads: u64,
    #[tabled(rename = "Last Download")]
    last_download: String,
}

impl From<&AccountRecord> for AccountDisplay {
    fn from(record: &AccountRecord) -> Self {
        Self {
            user_id: record.user_id.clone(),
            email: record.email.clone(),
            tier: record.tier.to_string(),
            verified: if record.email_verified { "yes" } else { "no" }.to_string(),
            downloads: record.lifetime_download_count,
            last_download: record
                .last_download_at
                .map_or_else(|| "Never".to_string(), format_timestamp),
        }
    }
}

/// Ledger row for display.
#[derive(Tabled)]
struct EventDisplay {
    #[tabled(rename = "Event ID")]
    event_id: String,
    #[tabled(rename = "User ID")]
    user_id: String,
    #[tabled(rename = "Time")]
    occurred_at: String,
    #[tabled(rename = "User Agent")]
    user_agent: String,
    #[tabled(rename = "Origin")]
    origin: String,
}

/// Run the admin CLI with the given arguments.
///
/// This is the main entry point for the admin CLI, used by both the
/// standalone binary and the unified henu-rs CLI.
pub async fn run(args: AdminArgs) -> Result<(), Box<dyn std::error::Error>> {
    match args.command {
        AdminCommands::Init { database } => {
            connect(&database).await?.init_schema().await?;
            println!("Database schema initialized successfully.");
            Ok(())
        }
        AdminCommands::Add {
            database,
            user_id,
            email,
            display_name,
            tier,
            verified,
        } => {
            let tier: Tier = tier.parse()?;
            let store = connect(&database).await?;
            let profile = Profile {
                email,
                email_verified: verified,
                display_name,
                photo_url: None,
            };
            let record = AccountRecord::new(&user_id, &profile, SystemClock.now_unix()).with_tier(tier);
            if store.insert_if_absent(&record).await? {
                println!("Account added successfully.");
                println!("  User ID: {user_id}");
                println!("  Tier: {tier}");
                println!("  Verified: {verified}");
            } else {
                println!("Account {user_id} already exists; nothing changed.");
            }
            Ok(())
        }
        AdminCommands::SetTier {
            database,
            user_id,
            tier,
        } => {
            let tier: Tier = tier.parse()?;
            connect(&database)
                .await?
                .set_tier(&user_id, tier, SystemClock.now_unix())
                .await?;
            println!("Account {user_id} is now {tier}.");
            Ok(())
        }
        AdminCommands::Verify {
            database,
            user_id,
            revoke,
        } => {
            connect(&database)
                .await?
                .set_verified(&user_id, !revoke, SystemClock.now_unix())
                .await?;
            let state = if revoke { "unverified" } else { "verified" };
            println!("Account {user_id} marked {state}.");
            Ok(())
        }
        AdminCommands::List { database, format } => list_accounts(&database, &format).await,
        AdminCommands::Status {
            database,
            user_id,
            quota,
        } => {
            let engine = engine(connect(&database).await?, quota);
            let verdict = engine.evaluate(&user_id).await;
            println!("{}", serde_json::to_string_pretty(&verdict)?);
            println!("{}", verdict.message());
            Ok(())
        }
        AdminCommands::Record {
            database,
            user_id,
            quota,
        } => {
            let engine = engine(connect(&database).await?, quota);
            let context = ClientContext {
                user_agent: Some(format!("henu-admin/{}", env!("CARGO_PKG_VERSION"))),
                origin: None,
            };
            match engine.record(&user_id, context).await {
                RecordResult::Success(receipt) => {
                    println!("{}", serde_json::to_string_pretty(&receipt)?);
                    Ok(())
                }
                RecordResult::Denied(reason) => {
                    Err(format!("download denied: {}", reason.code()).into())
                }
                RecordResult::Failure(failure) => Err(failure.into()),
            }
        }
        AdminCommands::Ledger {
            database,
            user_id,
            days,
            limit,
            utc_offset_secs,
        } => {
            let store = connect(&database).await?;
            let policy = QuotaPolicy {
                utc_offset_secs,
                ..QuotaPolicy::default()
            };
            let now = SystemClock.now_unix();
            match user_id {
                Some(user_id) => {
                    let since = ledger_since(&policy, now, days.unwrap_or(1));
                    let events = store.events_since(&user_id, since).await?;
                    print_ledger(&events, since);
                }
                None => {
                    let since = days.map(|d| ledger_since(&policy, now, d));
                    let events = store.list_events(since, limit).await?;
                    print_ledger(&events, since.unwrap_or(i64::MIN));
                }
            }
            Ok(())
        }
        AdminCommands::Digest { secret } => {
            println!("{}", digest_hex(&secret));
            Ok(())
        }
    }
}

/// Connect with a single pooled connection.
async fn connect(url: &str) -> Result<SqlStore, Box<dyn std::error::Error>> {
    Ok(SqlStore::connect(SqlStoreConfig::new(url).max_connections(1)).await?)
}

type SqlEngine = EntitlementEngine<Arc<SqlStore>, Arc<SqlStore>>;

fn engine(store: SqlStore, quota: QuotaArgs) -> SqlEngine {
    let store = Arc::new(store);
    EntitlementEngine::new(store.clone(), store, quota.into())
}

async fn list_accounts(url: &str, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let accounts = connect(url).await?.list_accounts().await?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&accounts)?),
        "csv" => {
            println!("user_id,email,tier,email_verified,download_count,last_download_at");
            for a in &accounts {
                println!(
                    "{},{},{},{},{},{}",
                    a.user_id,
                    a.email,
                    a.tier,
                    a.email_verified,
                    a.lifetime_download_count,
                    a.last_download_at.map(|t| t.to_string()).unwrap_or_default()
                );
            }
        }
        "table" => {
            if accounts.is_empty() {
                println!("No accounts found.");
            } else {
                let rows: Vec<AccountDisplay> = accounts.iter().map(AccountDisplay::from).collect();
                println!("{}", Table::new(rows));
                println!("Total: {} account(s)", accounts.len());
            }
        }
        other => return Err(format!("unknown format: {other} (expected table, json or csv)").into()),
    }
    Ok(())
}

/// Start of the window covering the last `days` quota days, today included.
fn ledger_since(policy: &QuotaPolicy, now: i64, days: u32) -> i64 {
    policy.start_of_day(now) - i64::from(days.saturating_sub(1)) * SECS_PER_DAY
}

fn print_ledger(events: &[DownloadEvent], since: i64) {
    let window = if since == i64::MIN {
        String::new()
    } else {
        format!(" since {}", format_timestamp(since))
    };
    if events.is_empty() {
        println!("No downloads{window}.");
        return;
    }

    let rows: Vec<EventDisplay> = events
        .iter()
        .map(|e| EventDisplay {
            event_id: e.event_id.clone(),
            user_id: e.user_id.clone(),
            occurred_at: format_timestamp(e.occurred_at),
            user_agent: e.context.user_agent.clone().unwrap_or_default(),
            origin: e.context.origin.clone().unwrap_or_default(),
        })
        .collect();
    println!("{}", Table::new(rows));
    println!("Total: {} download(s){window}", events.len());
}

/// Format Unix seconds as `YYYY-MM-DD HH:MM:SS UTC`.
pub fn format_timestamp(ts: i64) -> String {
    let days = ts.div_euclid(SECS_PER_DAY);
    let secs = ts.rem_euclid(SECS_PER_DAY);
    let (year, month, day) = civil_from_days(days);
    format!(
        "{year:04}-{month:02}-{day:02} {:02}:{:02}:{:02} UTC",
        secs / 3600,
        (secs % 3600) / 60,
        secs % 60
    )
}

/// Proleptic Gregorian date for a count of days since 1970-01-01.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month as u32, day as u32)
}
