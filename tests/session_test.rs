//! ファイル単位の統合テスト
//!
//! 読み込み→適用→書き込みの一連の流れと再実行の安全性を検証

use landmark_fix::common::{CorrectionTable, PhotoLimits};
use landmark_fix::session::{BatchState, PatchSession};
use tempfile::tempdir;

const STORAGE: &str = include_str!("fixtures/storage.ts");

const TABLE: &str = r#"[
  { "id": "colosseum", "lat": 41.890251, "lng": 12.492373 },
  { "id": "roman_forum", "lat": 41.892464, "lng": 12.485325,
    "photos": [
      "https://images.unsplash.com/photo-1531572753322-ad063cecc140?w=800",
      "https://images.unsplash.com/photo-1525874684015-58379d421a52?w=800",
      "https://images.unsplash.com/photo-1569154941061-e231b4725ef1?w=800",
      "https://images.unsplash.com/photo-1552832230-c0197dd311b5?w=800",
      "https://images.unsplash.com/photo-1583422409516-2895a77efded?w=800",
      "https://images.unsplash.com/photo-1604580864964-0462f5d5b1a8?w=800",
      "https://images.unsplash.com/photo-1515542622106-78bda8ba0e5b?w=800"
    ] },
  { "id": "pantheon", "lat": 41.898609, "lng": 12.476873 }
]"#;

/// 適用して書き込み、再実行では何も変わらない
#[test]
fn test_apply_persist_and_rerun() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("storage.ts");
    std::fs::write(&path, STORAGE).unwrap();

    let table = CorrectionTable::from_json(TABLE, PhotoLimits::default()).unwrap();
    assert_eq!(table.len(), 4);

    let mut session = PatchSession::load(&path).unwrap();
    let summary = session.patch(&table).unwrap().summary();
    assert_eq!((summary.applied, summary.skipped, summary.total), (3, 1, 4));
    session.persist(None, false).unwrap();
    assert_eq!(session.state(), BatchState::Persisted);

    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.contains("lat: 41.890251,\n    lng: 12.492373,"));
    assert!(written.contains("photo-1515542622106-78bda8ba0e5b"));

    // 再実行
    let mut rerun = PatchSession::load(&path).unwrap();
    let summary = rerun.patch(&table).unwrap().summary();
    assert_eq!(summary.applied, 0);
    assert!(!rerun.is_modified());
}

/// プリセットは存在するレコードだけを更新する
#[test]
fn test_preset_on_fixture() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("storage.ts");
    std::fs::write(&path, STORAGE).unwrap();

    let table = CorrectionTable::from_preset("rome").unwrap();
    let mut session = PatchSession::load(&path).unwrap();
    let summary = session.patch(&table).unwrap().summary();

    // フィクスチャにあるのは colosseum / roman_forum / trevi_fountain のみ
    assert_eq!((summary.applied, summary.total), (3, 8));
    assert!(session.text().contains("lat: 41.900932,\n    lng: 12.483313,"));
    assert!(session.text().contains("lat: 51.5007,\n    lng: -0.1246,"));
}

/// ドライランでは書き込まない
#[test]
fn test_dry_run_leaves_file_untouched() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("storage.ts");
    std::fs::write(&path, STORAGE).unwrap();

    let table = CorrectionTable::from_json(TABLE, PhotoLimits::default()).unwrap();
    let mut session = PatchSession::load(&path).unwrap();
    session.patch(&table).unwrap();
    assert!(session.is_modified());
    drop(session);

    assert_eq!(std::fs::read_to_string(&path).unwrap(), STORAGE);
}
