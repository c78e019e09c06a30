//! 修正適用モジュール
//!
//! 修正エントリを呼び出し側の順序どおりに1件ずつ適用する。
//! テキスト全体が唯一の可変状態で、各エントリはそれまでの置換結果を見る。

use crate::locator::{locate, FieldSpan, Located};
use crate::render::{render_coordinate, render_photo_list, ListStyle};
use crate::types::{CorrectionEntry, FieldValue, PatchOutcome, PatchResult, Span};

/// バッチ適用の結果
#[derive(Debug, Clone)]
pub struct PatchRun {
    /// 置換後のテキスト
    pub text: String,
    /// エントリごとの結果（入力と同じ順序）
    pub results: Vec<PatchResult>,
}

/// 集計
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatchSummary {
    pub applied: usize,
    pub unchanged: usize,
    pub skipped: usize,
    pub total: usize,
}

impl std::fmt::Display for PatchSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.applied, self.total)
    }
}

impl PatchRun {
    pub fn summary(&self) -> PatchSummary {
        let mut summary = PatchSummary {
            total: self.results.len(),
            ..Default::default()
        };
        for result in &self.results {
            match result.outcome {
                PatchOutcome::Applied(_) => summary.applied += 1,
                PatchOutcome::Unchanged => summary.unchanged += 1,
                PatchOutcome::Skipped(_) => summary.skipped += 1,
            }
        }
        summary
    }

    pub fn applied(&self) -> impl Iterator<Item = &PatchResult> {
        self.results.iter().filter(|r| r.is_applied())
    }
}

/// 修正テーブルをテキストに適用
///
/// 見つからないエントリはスキップして次へ進む。1件の失敗でバッチは止まらない。
pub fn apply(text: &str, corrections: &[CorrectionEntry]) -> PatchRun {
    let mut text = text.to_string();
    let results = corrections
        .iter()
        .map(|entry| apply_entry(&mut text, entry))
        .collect();

    PatchRun { text, results }
}

/// 1エントリを適用
pub fn apply_entry(text: &mut String, entry: &CorrectionEntry) -> PatchResult {
    let field = entry.field();
    let located = match locate(text, &entry.record_id, field) {
        Ok(located) => located,
        Err(err) => {
            tracing::debug!(record_id = %entry.record_id, %field, "skipped: {}", err);
            return PatchResult {
                record_id: entry.record_id.clone(),
                field,
                outcome: PatchOutcome::Skipped(err),
                ambiguous: false,
            };
        }
    };

    let mut replacements = replacements(text, &located, &entry.value);
    let changed = replacements
        .iter()
        .any(|(span, new)| span.slice(text) != new.as_str());

    let outcome = if changed {
        // 後ろから置換すれば前のオフセットはずれない
        replacements.sort_by(|a, b| b.0.start.cmp(&a.0.start));
        for (span, new) in &replacements {
            text.replace_range(span.start..span.end, new);
        }
        tracing::debug!(record_id = %entry.record_id, %field, "applied");
        PatchOutcome::Applied(entry.value.clone())
    } else {
        tracing::debug!(record_id = %entry.record_id, %field, "already up to date");
        PatchOutcome::Unchanged
    };

    PatchResult {
        record_id: entry.record_id.clone(),
        field,
        outcome,
        ambiguous: located.ambiguous,
    }
}

/// 置換対象範囲と新しいテキストの組
fn replacements(text: &str, located: &Located, value: &FieldValue) -> Vec<(Span, String)> {
    match (&located.field, value) {
        (FieldSpan::Coordinates { lat, lng }, FieldValue::Coordinates(c)) => vec![
            (*lat, render_coordinate(c.lat)),
            (*lng, render_coordinate(c.lng)),
        ],
        (FieldSpan::Photos { key, list }, FieldValue::Photos(urls)) => {
            let style = ListStyle::detect(text, key.start, list.slice(text));
            vec![(*list, render_photo_list(urls, &style))]
        }
        (field, value) => unreachable!(
            "locate は value.kind() で探すので種類は一致する: {:?} / {}",
            field,
            value.kind()
        ),
    }
}
