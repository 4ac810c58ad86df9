//! `henu-rs applications`: review submitted team applications.

use clap::{Args, Subcommand, ValueEnum};
use henu_apply::{ApplicationStore, SqlApplications, StoredApplication};
use henu_entitlement::cli::format_timestamp;
use henu_entitlement::sql::{SqlStore, SqlStoreConfig};
use tabled::{Table, Tabled};

/// Team application commands (SQL backend).
#[derive(Args, Debug, Clone)]
pub struct ApplicationsArgs {
    #[command(subcommand)]
    pub command: ApplicationsCommands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ApplicationsCommands {
    /// List submitted applications, oldest first.
    List {
        /// Database connection URL.
        #[arg(short, long, env = "DATABASE_URL")]
        database: String,

        /// Output format.
        #[arg(short, long, value_enum, default_value_t = ListFormat::Table)]
        format: ListFormat,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListFormat {
    Table,
    Json,
}

#[derive(Tabled)]
struct ApplicationDisplay {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Submitted")]
    submitted_at: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Skills")]
    skills: usize,
}

impl From<&StoredApplication> for ApplicationDisplay {
    fn from(stored: &StoredApplication) -> Self {
        Self {
            id: stored.id.clone(),
            submitted_at: format_timestamp(stored.submitted_at),
            name: stored.application.name.clone(),
            email: stored.application.email.clone(),
            skills: stored.application.skills.len(),
        }
    }
}

pub async fn run(args: ApplicationsArgs) -> Result<(), Box<dyn std::error::Error>> {
    match args.command {
        ApplicationsCommands::List { database, format } => {
            let store = SqlStore::connect(SqlStoreConfig::new(&database).max_connections(1)).await?;
            let applications = SqlApplications::new(store.pool().clone(), store.database_type());
            applications.init_schema().await?;

            let items = applications.list().await?;
            match format {
                ListFormat::Json => println!("{}", serde_json::to_string_pretty(&items)?),
                ListFormat::Table if items.is_empty() => println!("No applications."),
                ListFormat::Table => {
                    let rows: Vec<ApplicationDisplay> = items.iter().map(Into::into).collect();
                    println!("{}", Table::new(rows));
                    println!("Total: {} application(s)", items.len());
                }
            }
            Ok(())
        }
    }
}
