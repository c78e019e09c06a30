use clap::{Parser, Subcommand};
use landmark_fix_common::FieldKind;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "landmark-fix")]
#[command(about = "ランドマークのシードデータ修正ツール（座標・写真リスト）", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 修正テーブルを適用してファイルを書き換える
    Apply {
        /// 対象ファイル（省略時は設定の default_file）
        file: Option<PathBuf>,

        /// 修正テーブルJSONファイル
        #[arg(short, long, conflicts_with = "preset")]
        table: Option<PathBuf>,

        /// 組み込みテーブル（都市名 rome/paris/london など、all、rome-photos）
        #[arg(short, long)]
        preset: Option<String>,

        /// 出力先（省略時は上書き）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// ドライラン（書き込まずに結果だけ表示）
        #[arg(long)]
        dry_run: bool,

        /// 書き込み前にバックアップを作成
        #[arg(long)]
        backup: bool,
    },

    /// レコードのフィールド位置を表示
    Locate {
        /// 対象ファイル（省略時は設定の default_file）
        file: Option<PathBuf>,

        /// レコードID
        #[arg(long)]
        id: String,

        /// フィールド (coordinates/photos)
        #[arg(short, long, default_value = "coordinates")]
        field: FieldKind,
    },

    /// 設定を表示/編集
    Config {
        /// 既定の対象ファイルを設定
        #[arg(long)]
        set_default_file: Option<PathBuf>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}
