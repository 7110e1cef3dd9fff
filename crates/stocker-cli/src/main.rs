//! Stocker CLI - mirror and browse Qiita stocks from the terminal.

mod cli;
mod commands;
mod error;

#[cfg(test)]
mod tests;

use clap::Parser;
use stocker_core::config::StockerConfig;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::EnvFilter;

use crate::cli::{AccountCommands, CategoryCommands, Cli, Commands};
use crate::commands::account::{run_account_add, run_account_set_token, run_account_show};
use crate::commands::categories::{
    run_categorize, run_category_add, run_category_delete, run_category_list,
    run_category_rename, run_uncategorize,
};
use crate::commands::common::{open_database, resolve_account_id, resolve_db_path};
use crate::commands::stocks::{run_categorized, run_stocks};
use crate::commands::sync::run_sync;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let filter = EnvFilter::from_default_env();
    let filter = match "stocker=info".parse::<Directive>() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let config = StockerConfig::from_env()?;
    let db_path = resolve_db_path(cli.db_path, &config)?;
    let db = open_database(&db_path).await?;
    let account = cli.account.as_deref();

    match cli.command {
        Commands::Account { command } => match command {
            AccountCommands::Add { user_name, token } => {
                run_account_add(&db, &user_name, &token).await?;
            }
            AccountCommands::Show { json } => {
                run_account_show(&db, resolve_account_id(account)?, json).await?;
            }
            AccountCommands::SetToken { token } => {
                run_account_set_token(&db, resolve_account_id(account)?, &token).await?;
            }
        },
        Commands::Sync { json } => {
            run_sync(&db, &config, resolve_account_id(account)?, json).await?;
        }
        Commands::Stocks { window, json } => {
            run_stocks(&db, &config, resolve_account_id(account)?, &window, json).await?;
        }
        Commands::Categorized {
            category_id,
            window,
            json,
        } => {
            let account_id = resolve_account_id(account)?;
            run_categorized(&db, &config, account_id, &category_id, &window, json).await?;
        }
        Commands::Category { command } => {
            let account_id = resolve_account_id(account)?;
            match command {
                CategoryCommands::Add { name } => run_category_add(&db, account_id, &name).await?,
                CategoryCommands::List { json } => {
                    run_category_list(&db, account_id, json).await?;
                }
                CategoryCommands::Rename { category_id, name } => {
                    run_category_rename(&db, account_id, &category_id, &name).await?;
                }
                CategoryCommands::Delete { category_id } => {
                    run_category_delete(&db, account_id, &category_id).await?;
                }
            }
        }
        Commands::Categorize {
            category_id,
            article_ids,
            json,
        } => {
            let account_id = resolve_account_id(account)?;
            run_categorize(&db, &config, account_id, &category_id, &article_ids, json).await?;
        }
        Commands::Uncategorize { relation_id } => {
            run_uncategorize(&db, resolve_account_id(account)?, &relation_id).await?;
        }
    }

    Ok(())
}
