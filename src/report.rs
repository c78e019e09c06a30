//! 結果レポート
//!
//! 運用者が何を変えたか確認するための出力。機械可読な形式ではない。

use landmark_fix_common::{FieldValue, PatchOutcome, PatchRun, PatchSummary};
use sha2::{Digest, Sha256};

/// テキストのSHA-256（16進）
pub fn checksum(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}

/// エントリごとの行
pub fn entry_lines(run: &PatchRun) -> Vec<String> {
    run.results
        .iter()
        .map(|result| {
            let mut line = match &result.outcome {
                PatchOutcome::Applied(_) => {
                    format!("✔ {}", result.label().unwrap_or_default())
                }
                PatchOutcome::Unchanged => {
                    format!("- {} {}: 変更なし", result.record_id, result.field)
                }
                PatchOutcome::Skipped(err) => {
                    format!("✗ {} {}: {}", result.record_id, result.field, err)
                }
            };
            if result.ambiguous {
                line.push_str("（候補が複数あり先頭を採用）");
            }
            line
        })
        .collect()
}

/// 最終集計行
pub fn summary_line(summary: &PatchSummary) -> String {
    format!(
        "更新: {} / {} 件（変更なし {}、スキップ {}）",
        summary.applied, summary.total, summary.unchanged, summary.skipped
    )
}

/// 適用した写真リストのURL（詳細表示用）
pub fn photo_lines(run: &PatchRun) -> Vec<String> {
    let mut lines = Vec::new();
    for result in run.applied() {
        if let PatchOutcome::Applied(FieldValue::Photos(urls)) = &result.outcome {
            lines.push(format!("{} photos:", result.record_id));
            lines.extend(urls.iter().enumerate().map(|(i, url)| format!("  {}. {}", i + 1, url)));
        }
    }
    lines
}

pub fn print_report(run: &PatchRun, verbose: bool) {
    for line in entry_lines(run) {
        println!("  {}", line);
    }
    if verbose {
        for line in photo_lines(run) {
            println!("    {}", line);
        }
    }
    println!();
    println!("{}", summary_line(&run.summary()));
}
