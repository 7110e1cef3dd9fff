use std::sync::Arc;

use stocker_core::config::StockerConfig;
use stocker_core::{AccountId, CategoryId, CategoryRelationManager, DatabaseService, RelationId};

use crate::commands::common::format_category_lines;
use crate::error::CliError;

pub async fn run_category_add(
    db: &DatabaseService,
    account_id: AccountId,
    name: &str,
) -> Result<(), CliError> {
    let category = db.create_category(account_id, name).await?;
    println!("{}", category.id);
    Ok(())
}

pub async fn run_category_list(
    db: &DatabaseService,
    account_id: AccountId,
    as_json: bool,
) -> Result<(), CliError> {
    let categories = db.list_categories(account_id).await?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&categories)?);
    } else if categories.is_empty() {
        println!("No categories yet.");
    } else {
        for line in format_category_lines(&categories) {
            println!("{line}");
        }
    }
    Ok(())
}

pub async fn run_category_rename(
    db: &DatabaseService,
    account_id: AccountId,
    category_id: &str,
    name: &str,
) -> Result<(), CliError> {
    let category = db
        .rename_category(account_id, category_id.parse::<CategoryId>()?, name)
        .await?;
    println!("Renamed category {} to {}", category.id, category.name);
    Ok(())
}

pub async fn run_category_delete(
    db: &DatabaseService,
    account_id: AccountId,
    category_id: &str,
) -> Result<(), CliError> {
    let category_id = category_id.parse::<CategoryId>()?;
    db.delete_category(account_id, category_id).await?;
    println!("Deleted category {category_id}");
    Ok(())
}

pub async fn run_categorize(
    db: &DatabaseService,
    config: &StockerConfig,
    account_id: AccountId,
    category_id: &str,
    article_ids: &[String],
    as_json: bool,
) -> Result<(), CliError> {
    let category_id = category_id.parse::<CategoryId>()?;
    let manager = CategoryRelationManager::new(db.clone(), Arc::new(config.qiita_client()?))
        .with_concurrency(config.sync_concurrency);

    let relations = manager
        .categorize_all(account_id, category_id, article_ids)
        .await?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&relations)?);
    } else {
        for relation in &relations {
            println!("{}  {}", relation.id, relation.article_id);
        }
    }
    Ok(())
}

pub async fn run_uncategorize(
    db: &DatabaseService,
    account_id: AccountId,
    relation_id: &str,
) -> Result<(), CliError> {
    let relation_id = relation_id.parse::<RelationId>()?;
    db.destroy_relation(account_id, relation_id).await?;
    println!("Removed relation {relation_id}");
    Ok(())
}
