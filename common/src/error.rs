//! エラー型定義

use crate::types::FieldKind;
use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;

/// レコード探索の失敗（バッチは継続する）
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocateError {
    #[error("record not found: {0}")]
    RecordNotFound(String),

    #[error("field `{field}` not found in record {record_id}")]
    FieldNotFound { record_id: String, field: FieldKind },
}
