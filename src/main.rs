use clap::Parser;
use landmark_fix::{cli, config, error, logging, report, session};
use landmark_fix::common::{locate, CorrectionTable, FieldSpan};
use cli::{Cli, Commands};
use config::Config;
use error::{PatchError, Result};
use session::PatchSession;

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);
    let config = Config::load()?;

    match cli.command {
        Commands::Apply { file, table, preset, output, dry_run, backup } => {
            println!("🛠  landmark-fix - データ修正\n");

            // 1. 修正テーブル
            let table = match (table, preset) {
                (Some(path), _) => CorrectionTable::from_file(&path, config.photo_limits())?,
                (None, Some(name)) => CorrectionTable::from_preset(&name)
                    .ok_or(PatchError::UnknownPreset(name))?,
                (None, None) => return Err(PatchError::MissingTable),
            };

            // 2. 読み込み
            let path = config.resolve_file(file)?;
            println!("[1/3] 読み込み中...");
            let mut session = PatchSession::load(&path)?;
            println!(
                "✔ {} ({} bytes) / 修正 {}件\n",
                session.path().display(),
                session.original().len(),
                table.len()
            );

            // 3. 適用
            println!("[2/3] 修正を適用中...");
            let run = session.patch(&table)?;
            report::print_report(run, cli.verbose);
            println!();

            if cli.verbose {
                println!("  SHA-256 (before): {}", report::checksum(session.original()));
                println!("  SHA-256 (after):  {}\n", report::checksum(session.text()));
            }

            // 4. 書き込み
            if dry_run {
                println!("[3/3] ドライランのため書き込みをスキップ");
            } else {
                println!("[3/3] 書き込み中...");
                let persisted = session.persist(output.as_deref(), backup || config.backup)?;
                if let Some(backup_path) = &persisted.backup {
                    println!("✔ バックアップ: {}", backup_path.display());
                }
                println!("✔ 保存: {}", persisted.path.display());
            }

            println!("\n✅ 完了");
        }

        Commands::Locate { file, id, field } => {
            let path = config.resolve_file(file)?;
            let session = PatchSession::load(&path)?;
            let text = session.original();

            match locate(text, &id, field) {
                Ok(located) => {
                    println!("レコード: {} ({}..{})", id, located.record.start, located.record.end);
                    println!("探索範囲: {}..{}", located.region.start, located.region.end);
                    match located.field {
                        FieldSpan::Coordinates { lat, lng } => {
                            println!("  lat: {} ({}..{})", lat.slice(text), lat.start, lat.end);
                            println!("  lng: {} ({}..{})", lng.slice(text), lng.start, lng.end);
                        }
                        FieldSpan::Photos { list, .. } => {
                            println!("  photos ({}..{}):", list.start, list.end);
                            println!("  [{}]", list.slice(text));
                        }
                    }
                    if located.ambiguous {
                        println!("⚠ 候補が複数あります（先頭を採用）");
                    }
                }
                Err(err) => println!("✗ {}", err),
            }
        }

        Commands::Config { set_default_file, show } => {
            let mut config = config;

            if let Some(path) = set_default_file {
                config.set_default_file(path)?;
                println!("✔ 既定の対象ファイルを設定しました");
            }

            if show {
                println!("設定:");
                println!("  設定ファイル: {}", Config::config_path()?.display());
                println!(
                    "  対象ファイル: {}",
                    config
                        .default_file
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "未設定".into())
                );
                println!("  バックアップ: {}", if config.backup { "有効" } else { "無効" });
                println!("  写真枚数: {}〜{}", config.min_photos, config.max_photos);
                println!("  プリセット: {}", CorrectionTable::preset_names().join(", "));
            }
        }
    }

    Ok(())
}
