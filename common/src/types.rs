//! 修正データの型定義
//!
//! - CorrectionEntry: 修正テーブルの1行（レコードID + 対象フィールド + 新しい値）
//! - PatchResult: 1エントリの適用結果
//! - Span: 元テキスト上のバイト範囲

use crate::error::LocateError;
use serde::{Deserialize, Serialize};

/// 修正対象フィールド
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// 座標（lat / lng の組）
    Coordinates,
    /// 写真URLリスト
    Photos,
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldKind::Coordinates => write!(f, "coordinates"),
            FieldKind::Photos => write!(f, "photos"),
        }
    }
}

impl std::str::FromStr for FieldKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "coordinates" | "coords" | "latlng" => Ok(FieldKind::Coordinates),
            "photos" | "photo" => Ok(FieldKind::Photos),
            _ => Err(format!("Unknown field: {}. Use coordinates or photos", s)),
        }
    }
}

/// 緯度経度
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// 新しい値
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Coordinates(Coordinates),
    Photos(Vec<String>),
}

impl FieldValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Coordinates(_) => FieldKind::Coordinates,
            FieldValue::Photos(_) => FieldKind::Photos,
        }
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Coordinates(c) => write!(
                f,
                "({}, {})",
                crate::render::render_coordinate(c.lat),
                crate::render::render_coordinate(c.lng)
            ),
            FieldValue::Photos(urls) => write!(f, "{} photos", urls.len()),
        }
    }
}

/// 修正エントリ
#[derive(Debug, Clone, PartialEq)]
pub struct CorrectionEntry {
    pub record_id: String,
    pub value: FieldValue,
}

impl CorrectionEntry {
    pub fn coordinates(record_id: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            record_id: record_id.into(),
            value: FieldValue::Coordinates(Coordinates { lat, lng }),
        }
    }

    pub fn photos<I, S>(record_id: impl Into<String>, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            record_id: record_id.into(),
            value: FieldValue::Photos(urls.into_iter().map(Into::into).collect()),
        }
    }

    pub fn field(&self) -> FieldKind {
        self.value.kind()
    }
}

/// テキスト上のバイト範囲 `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start..self.end]
    }

    /// `offset` バイトずらした範囲
    pub fn shifted(&self, offset: usize) -> Self {
        Self::new(self.start + offset, self.end + offset)
    }
}

/// 1エントリの処理結果
#[derive(Debug, Clone, PartialEq)]
pub enum PatchOutcome {
    /// 置換した（適用した値）
    Applied(FieldValue),
    /// 見つかったが既に同じ値
    Unchanged,
    /// 見つからずスキップ
    Skipped(LocateError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PatchResult {
    pub record_id: String,
    pub field: FieldKind,
    pub outcome: PatchOutcome,
    /// 複数候補から先頭を選んだ
    pub ambiguous: bool,
}

impl PatchResult {
    pub fn is_applied(&self) -> bool {
        matches!(self.outcome, PatchOutcome::Applied(_))
    }

    /// 監査用の1行表示（適用時のみ）
    pub fn label(&self) -> Option<String> {
        match &self.outcome {
            PatchOutcome::Applied(value) => {
                Some(format!("Updated {} {}: {}", self.record_id, self.field, value))
            }
            _ => None,
        }
    }
}
