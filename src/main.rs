use clap::Parser;
use contact_tidy::{airtable, cli, commands, config, error, normalizer, writeback};
use airtable::{AirtableClient, RecordStore};
use cli::{Cli, Commands};
use commands::{RunContext, TagMode};
use config::Config;
use contact_tidy_common::FieldKind;
use error::Result;
use std::time::Duration;

fn context(cli: &Cli, config: &Config, report: Option<std::path::PathBuf>) -> RunContext {
    RunContext {
        dry_run: cli.dry_run,
        yes: cli.yes,
        verbose: cli.verbose,
        preview_limit: cli.preview.unwrap_or(config.preview_limit),
        report,
        write: writeback::WriteOptions {
            interval: Duration::from_millis(config.write_interval_ms),
            show_progress: true,
            verbose: cli.verbose,
        },
    }
}

fn client(config: &Config, verbose: bool) -> Result<AirtableClient> {
    let credentials = config.credentials()?;
    Ok(AirtableClient::new(credentials, config.timeout_seconds)?.with_verbose(verbose))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;

    match &cli.command {
        Commands::Titles { format, report } => {
            println!("🧹 contact-tidy - 役職の統一\n");
            let store = client(&config, cli.verbose)?;
            let options = normalizer::NormalizationOptions { format_titles: *format };
            let ctx = context(&cli, &config, report.clone());
            commands::run_field(&store, &config.fields, FieldKind::JobTitle, &options, &ctx).await?;
        }

        Commands::Companies { report } => {
            println!("🧹 contact-tidy - 会社名の統一\n");
            let store = client(&config, cli.verbose)?;
            let ctx = context(&cli, &config, report.clone());
            commands::run_field(&store, &config.fields, FieldKind::CompanyName, &Default::default(), &ctx).await?;
        }

        Commands::Names { report } => {
            println!("🧹 contact-tidy - 氏名の統一\n");
            let store = client(&config, cli.verbose)?;
            let ctx = context(&cli, &config, report.clone());
            commands::run_field(&store, &config.fields, FieldKind::PersonName, &Default::default(), &ctx).await?;
        }

        Commands::Tags { preset, map, votes, report } => {
            println!("🏷  contact-tidy - タグの整理\n");
            let mode = if *votes {
                TagMode::Votes
            } else {
                TagMode::from_sources(preset.as_deref(), map.as_deref())?
            };
            let store = client(&config, cli.verbose)?;
            let ctx = context(&cli, &config, report.clone());
            commands::run_tags(&store, &config.fields, &mode, &ctx).await?;
        }

        Commands::NameColumns { report } => {
            println!("🧹 contact-tidy - 氏名列の整理\n");
            let store = client(&config, cli.verbose)?;
            let ctx = context(&cli, &config, report.clone());
            commands::run_name_columns(&store, &config.fields, &ctx).await?;
        }

        Commands::Analyze { tags } => {
            println!("📊 contact-tidy - 分析\n");
            let store = client(&config, cli.verbose)?;
            let ctx = context(&cli, &config, None);
            commands::run_analyze(&store, &config.fields, *tags, &ctx).await?;
        }

        Commands::Check { count } => {
            println!("🔌 contact-tidy - 接続確認\n");
            let store = client(&config, cli.verbose)?;
            let records = store.fetch_records(Some(*count)).await?;
            println!("✔ 接続成功: {}件を取得\n", records.len());

            for record in &records {
                println!("ID: {}", record.id);
                for (name, value) in &record.fields {
                    let text: String = value.to_string().chars().take(100).collect();
                    println!("  {}: {}", name, text);
                }
                println!();
            }

            if let Some(first) = records.first() {
                if cli.verbose {
                    let fetched = store.get(&first.id).await?;
                    println!("✔ 単一レコード取得: {}", fetched.id);
                }
            }
        }

        Commands::Config { set_token, set_base, set_table, show } => {
            let mut config = config;
            let mut changed = false;

            if let Some(token) = set_token {
                config.airtable_token = Some(token.clone());
                changed = true;
            }
            if let Some(base) = set_base {
                config.base_id = Some(base.clone());
                changed = true;
            }
            if let Some(table) = set_table {
                config.table_id = Some(table.clone());
                changed = true;
            }

            if changed {
                config.save()?;
                println!("✔ 設定を保存しました: {}", Config::config_path()?.display());
            }

            if *show || !changed {
                let status = |v: &Option<String>| if v.is_some() { "設定済み" } else { "未設定" };
                println!("設定:");
                println!("  トークン: {}", status(&config.airtable_token));
                println!("  ベースID: {}", config.base_id.as_deref().unwrap_or("未設定"));
                println!("  テーブルID: {}", config.table_id.as_deref().unwrap_or("未設定"));
                println!("  列名:");
                println!("    氏名: {}", config.fields.name);
                println!("    別名: {}", config.fields.alias_name);
                println!("    役職: {}", config.fields.title);
                println!("    会社名: {}", config.fields.company);
                println!("    タグ: {}", config.fields.tags);
                println!("  プレビュー件数: {}", config.preview_limit);
                println!("  書き込み間隔: {}ms", config.write_interval_ms);
            }
        }
    }

    Ok(())
}
