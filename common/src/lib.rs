//! Landmark Fix Common Library
//!
//! シードデータ中のレコードを探し、座標・写真リストだけを書き換える

pub mod types;
pub mod error;
pub mod locator;
pub mod render;
pub mod applier;
pub mod table;

pub use types::{Coordinates, CorrectionEntry, FieldKind, FieldValue, PatchOutcome, PatchResult, Span};
pub use error::{Error, LocateError, Result};
pub use locator::{find_record, locate, FieldSpan, Located};
pub use applier::{apply, PatchRun, PatchSummary};
pub use table::{CorrectionTable, PhotoLimits, TableRow};
