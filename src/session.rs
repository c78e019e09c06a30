//! バッチ処理セッション
//!
//! ファイルを1回読み込み、メモリ上で全エントリを適用し、最後に1回だけ書き込む。
//! 状態は `Loaded → Patched → Persisted` の順にしか進まない。

use crate::error::{PatchError, Result};
use landmark_fix_common::{apply, CorrectionTable, PatchRun};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    Loaded,
    Patched,
    Persisted,
}

impl std::fmt::Display for BatchState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BatchState::Loaded => write!(f, "loaded"),
            BatchState::Patched => write!(f, "patched"),
            BatchState::Persisted => write!(f, "persisted"),
        }
    }
}

/// 書き込み結果
#[derive(Debug, Clone)]
pub struct Persisted {
    pub path: PathBuf,
    pub backup: Option<PathBuf>,
}

pub struct PatchSession {
    path: PathBuf,
    original: String,
    run: Option<PatchRun>,
    state: BatchState,
}

impl PatchSession {
    /// 対象ファイルを読み込む（UTF-8）
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(PatchError::FileNotFound(path.display().to_string()));
        }
        let original = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), bytes = original.len(), "loaded");

        Ok(Self {
            path: path.to_path_buf(),
            original,
            run: None,
            state: BatchState::Loaded,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn state(&self) -> BatchState {
        self.state
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    /// 置換後のテキスト（未適用なら元のテキスト）
    pub fn text(&self) -> &str {
        self.run.as_ref().map(|r| r.text.as_str()).unwrap_or(&self.original)
    }

    pub fn is_modified(&self) -> bool {
        self.text() != self.original
    }

    /// 修正テーブルを適用
    pub fn patch(&mut self, table: &CorrectionTable) -> Result<&PatchRun> {
        if self.state != BatchState::Loaded {
            return Err(PatchError::InvalidState(format!(
                "patch は loaded 状態でのみ実行できます（現在: {}）",
                self.state
            )));
        }

        let run = apply(&self.original, &table.entries);
        self.state = BatchState::Patched;
        Ok(self.run.insert(run))
    }

    /// 結果を書き込む
    ///
    /// # Arguments
    /// * `output` - 出力先（省略時は上書き）
    /// * `backup` - 上書き前に既存ファイルをコピーする
    pub fn persist(&mut self, output: Option<&Path>, backup: bool) -> Result<Persisted> {
        if self.state != BatchState::Patched {
            return Err(PatchError::InvalidState(format!(
                "persist は patched 状態でのみ実行できます（現在: {}）",
                self.state
            )));
        }

        let target = output.unwrap_or(self.path.as_path()).to_path_buf();
        let backup_path = if backup && target.exists() {
            let backup_path = backup_path_for(&target);
            std::fs::copy(&target, &backup_path)?;
            tracing::debug!(backup = %backup_path.display(), "backup created");
            Some(backup_path)
        } else {
            None
        };

        std::fs::write(&target, self.text())?;
        self.state = BatchState::Persisted;
        tracing::debug!(path = %target.display(), "written");

        Ok(Persisted {
            path: target,
            backup: backup_path,
        })
    }
}

/// `storage.ts` → `storage.ts.20260118-093000.bak`
pub fn backup_path_for(path: &Path) -> PathBuf {
    let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    path.with_file_name(format!("{}.{}.bak", file_name, stamp))
}
