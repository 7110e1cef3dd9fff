use std::path::PathBuf;

use chrono::{TimeZone, Utc};
use clap::Parser;
use stocker_core::config::StockerConfig;
use stocker_core::models::StockContent;
use stocker_core::{AccountId, DatabaseService, Page, PageWindow, StockRecord};

use crate::cli::{AccountCommands, CategoryCommands, Cli, Commands};
use crate::commands::account::account_to_item;
use crate::commands::categories::{
    run_category_add, run_category_delete, run_category_rename, run_uncategorize,
};
use crate::commands::common::{
    format_category_lines, format_page_footer, format_stock_lines, resolve_account_id,
    resolve_db_path,
};
use crate::error::CliError;

fn stock(article_id: &str, title: &str, tags: &[&str]) -> StockRecord {
    serde_json::from_value(serde_json::json!({
        "id": 1,
        "account_id": 1,
        "article_id": article_id,
        "title": title,
        "author_user_id": "qiita",
        "author_profile_image_url": "https://example.com/qiita.png",
        "article_created_at": "2019-04-01T09:30:00Z",
        "tags": tags,
        "version": 0,
        "created_at": 0,
        "updated_at": 0
    }))
    .unwrap()
}

#[test]
fn cli_parses_global_account_after_subcommand() {
    let cli = Cli::try_parse_from(["stocker", "stocks", "--page", "2", "--account", "7"]).unwrap();

    assert_eq!(cli.account.as_deref(), Some("7"));
    match cli.command {
        Commands::Stocks { window, json } => {
            assert_eq!(window.page, "2");
            assert_eq!(window.per_page, "20");
            assert!(!json);
        }
        _ => panic!("expected stocks command"),
    }
}

#[test]
fn cli_keeps_raw_window_values_for_core_validation() {
    let cli = Cli::try_parse_from(["stocker", "categorized", "abc", "--per-page", "1.5"]).unwrap();
    match cli.command {
        Commands::Categorized {
            category_id,
            window,
            ..
        } => {
            assert_eq!(category_id, "abc");
            assert_eq!(window.per_page, "1.5");
        }
        _ => panic!("expected categorized command"),
    }
}

#[test]
fn cli_requires_article_ids_for_categorize() {
    assert!(Cli::try_parse_from(["stocker", "categorize", "1"]).is_err());

    let cli = Cli::try_parse_from(["stocker", "categorize", "1", "abc", "def"]).unwrap();
    match cli.command {
        Commands::Categorize { article_ids, .. } => assert_eq!(article_ids, vec!["abc", "def"]),
        _ => panic!("expected categorize command"),
    }
}

#[test]
fn cli_parses_nested_subcommands() {
    let cli = Cli::try_parse_from(["stocker", "account", "add", "kobayashi", "--token", "t"])
        .unwrap();
    assert!(matches!(
        cli.command,
        Commands::Account {
            command: AccountCommands::Add { .. }
        }
    ));

    let cli = Cli::try_parse_from(["stocker", "category", "rename", "4", "Rust"]).unwrap();
    assert!(matches!(
        cli.command,
        Commands::Category {
            command: CategoryCommands::Rename { .. }
        }
    ));
}

#[test]
fn db_path_prefers_flag_over_config() {
    let config = StockerConfig {
        db_path: Some(PathBuf::from("/tmp/from-env.db")),
        ..Default::default()
    };

    let flag = resolve_db_path(Some(PathBuf::from("/tmp/from-flag.db")), &config).unwrap();
    assert_eq!(flag, PathBuf::from("/tmp/from-flag.db"));

    let env = resolve_db_path(None, &config).unwrap();
    assert_eq!(env, PathBuf::from("/tmp/from-env.db"));
}

#[test]
fn account_id_is_validated() {
    assert_eq!(resolve_account_id(Some(" 12 ")).unwrap(), AccountId::new(12));
    assert!(matches!(
        resolve_account_id(Some("twelve")),
        Err(CliError::Core(stocker_core::Error::Validation(_)))
    ));
    assert!(matches!(
        resolve_account_id(Some("0")),
        Err(CliError::Core(stocker_core::Error::Validation(_)))
    ));
}

#[test]
fn stock_lines_include_date_and_tags() {
    let lines = format_stock_lines(&[
        stock("c686397e4a0f4f11683d", "Example title", &["Ruby", "Rails"]),
        stock("b000000000000000000a", "Untagged", &[]),
    ]);

    assert!(lines[0].starts_with("c686397e4a0f4f11683d  2019-04-01  Example title"));
    assert!(lines[0].ends_with("[Ruby, Rails]"));
    assert_eq!(lines[1], "b000000000000000000a  2019-04-01  Untagged");
}

#[test]
fn stock_lines_truncate_long_titles() {
    let title = "a".repeat(60);
    let lines = format_stock_lines(&[stock("abc", &title, &[])]);

    assert!(lines[0].ends_with(&format!("{}...", "a".repeat(45))));
}

#[test]
fn page_footer_shows_total_and_link() {
    let window = PageWindow::new(1, 2).unwrap();
    let page = Page::new(
        vec![stock("abc", "t", &[])],
        3,
        window,
        "http://localhost:8080/api/stocks",
    );

    assert_eq!(
        format_page_footer(&page),
        vec![
            "Total-Count: 3".to_string(),
            "Link: <http://localhost:8080/api/stocks?page=2&per_page=2>; rel=\"next\", \
             <http://localhost:8080/api/stocks?page=2&per_page=2>; rel=\"last\""
                .to_string(),
        ]
    );

    let empty: Page<StockRecord> = Page::new(Vec::new(), 0, window, "http://localhost:8080");
    assert_eq!(format_page_footer(&empty), vec!["Total-Count: 0".to_string()]);
}

#[test]
fn account_item_omits_access_token() {
    let account = stocker_core::Account {
        id: AccountId::new(3),
        user_name: "kobayashi".to_string(),
        access_token: "secret-token".to_string(),
        created_at: Utc
            .with_ymd_and_hms(2020, 1, 2, 3, 4, 5)
            .unwrap()
            .timestamp_millis(),
    };

    let json = serde_json::to_string(&account_to_item(&account)).unwrap();
    assert!(!json.contains("secret-token"));
    assert!(json.contains("2020-01-02T03:04:05"));
}

#[test]
fn stock_content_fields_survive_json_output() {
    let record = stock("abc", "t", &["Rust"]);
    let content: &StockContent = &record.content;
    let json = serde_json::to_value(&record).unwrap();

    assert_eq!(json["article_id"], content.article_id.as_str());
    assert_eq!(json["tags"][0], "Rust");
}

#[tokio::test(flavor = "multi_thread")]
async fn category_commands_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let db = DatabaseService::open_path(dir.path().join("stocker.db"))
        .await
        .unwrap();
    let account = db.create_account("kobayashi", "token").await.unwrap();

    run_category_add(&db, account.id, "Rust").await.unwrap();
    let categories = db.list_categories(account.id).await.unwrap();
    assert_eq!(format_category_lines(&categories), vec!["     1  Rust"]);

    run_category_rename(&db, account.id, "1", "Rust 2024")
        .await
        .unwrap();
    assert!(matches!(
        run_category_rename(&db, account.id, "x", "Rust").await,
        Err(CliError::Core(stocker_core::Error::Validation(_)))
    ));

    assert!(matches!(
        run_uncategorize(&db, account.id, "1").await,
        Err(CliError::Core(stocker_core::Error::NotFound(..)))
    ));

    run_category_delete(&db, account.id, "1").await.unwrap();
    assert!(db.list_categories(account.id).await.unwrap().is_empty());
}
