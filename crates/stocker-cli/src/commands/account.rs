use chrono::DateTime;
use serde::Serialize;
use stocker_core::{Account, AccountId, DatabaseService};

use crate::error::CliError;

/// Account fields safe to print; the access token is left out.
#[derive(Debug, Serialize)]
pub struct AccountItem {
    pub id: i64,
    pub user_name: String,
    pub created_at: i64,
    pub created_at_iso: String,
}

pub fn account_to_item(account: &Account) -> AccountItem {
    AccountItem {
        id: account.id.get(),
        user_name: account.user_name.clone(),
        created_at: account.created_at,
        created_at_iso: DateTime::from_timestamp_millis(account.created_at)
            .map(|timestamp| timestamp.to_rfc3339())
            .unwrap_or_default(),
    }
}

pub async fn run_account_add(
    db: &DatabaseService,
    user_name: &str,
    access_token: &str,
) -> Result<(), CliError> {
    let account = db.create_account(user_name, access_token).await?;
    println!("{}", account.id);
    Ok(())
}

pub async fn run_account_show(
    db: &DatabaseService,
    account_id: AccountId,
    as_json: bool,
) -> Result<(), CliError> {
    let account = db.resolve_account(account_id).await?;
    let item = account_to_item(&account);

    if as_json {
        println!("{}", serde_json::to_string_pretty(&item)?);
    } else {
        println!("{}  {}  {}", item.id, item.user_name, item.created_at_iso);
    }
    Ok(())
}

pub async fn run_account_set_token(
    db: &DatabaseService,
    account_id: AccountId,
    access_token: &str,
) -> Result<(), CliError> {
    db.update_access_token(account_id, access_token).await?;
    println!("Access token updated for account {account_id}");
    Ok(())
}
