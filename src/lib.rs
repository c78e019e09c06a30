//! landmark-fix
//!
//! シードデータファイル内のランドマークを ID で探し、座標と写真リストだけを修正する。

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod report;
pub mod session;

pub use landmark_fix_common as common;
