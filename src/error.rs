use thiserror::Error;

#[derive(Error, Debug)]
pub enum PatchError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("対象ファイルが指定されていません。引数で渡すか `landmark-fix config --set-default-file PATH` で設定してください")]
    MissingTargetFile,

    #[error("修正テーブルが指定されていません（--table または --preset）")]
    MissingTable,

    #[error("不明なプリセット: {0}（一覧は `landmark-fix config --show`）")]
    UnknownPreset(String),

    #[error("処理順序エラー: {0}")]
    InvalidState(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] landmark_fix_common::Error),
}

pub type Result<T> = std::result::Result<T, PatchError>;
