use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "stocker")]
#[command(about = "Mirror, categorize, and browse Qiita stocks from the command line")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Optional path to local database file
    #[arg(long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,

    /// Local account ID (falls back to STOCKER_ACCOUNT_ID)
    #[arg(short, long, global = true, value_name = "ID")]
    pub account: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage local accounts
    Account {
        #[command(subcommand)]
        command: AccountCommands,
    },
    /// Mirror the account's Qiita stocks into the local store
    Sync {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List mirrored stocks, newest article first
    Stocks {
        #[command(flatten)]
        window: WindowArgs,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the stocks related to one category
    Categorized {
        /// Category ID
        category_id: String,
        #[command(flatten)]
        window: WindowArgs,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Manage categories
    Category {
        #[command(subcommand)]
        command: CategoryCommands,
    },
    /// Relate stocked articles to a category
    Categorize {
        /// Category ID
        category_id: String,
        /// Qiita article IDs
        #[arg(required = true)]
        article_ids: Vec<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove a category relation
    Uncategorize {
        /// Category relation ID
        relation_id: String,
    },
}

#[derive(clap::Args)]
pub struct WindowArgs {
    /// 1-based page number
    #[arg(long, default_value = "1")]
    pub page: String,
    /// Stocks per page (1-100)
    #[arg(long, default_value = "20")]
    pub per_page: String,
}

#[derive(Subcommand)]
pub enum AccountCommands {
    /// Register a Qiita user and access token
    Add {
        /// Qiita user name
        user_name: String,
        /// Qiita access token
        #[arg(long, value_name = "TOKEN")]
        token: String,
    },
    /// Show the selected account
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Replace the selected account's access token
    SetToken {
        /// New Qiita access token
        token: String,
    },
}

#[derive(Subcommand)]
pub enum CategoryCommands {
    /// Create a category
    Add {
        /// Category name (1-50 characters)
        name: String,
    },
    /// List categories
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Rename a category
    Rename {
        /// Category ID
        category_id: String,
        /// New category name
        name: String,
    },
    /// Delete a category and its relations
    Delete {
        /// Category ID
        category_id: String,
    },
}
