//! 修正テーブル
//!
//! JSON配列（順序を保持）から修正エントリを組み立てる。
//!
//! ```json
//! [
//!   { "id": "colosseum", "lat": 41.890251, "lng": 12.492373 },
//!   { "id": "pantheon", "photos": ["https://...", "https://..."] }
//! ]
//! ```

use crate::error::{Error, Result};
use crate::types::{CorrectionEntry, FieldKind};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// テーブルの1行
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TableRow {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photos: Option<Vec<String>>,
}

/// 写真枚数の許容範囲
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhotoLimits {
    pub min: usize,
    pub max: usize,
}

impl Default for PhotoLimits {
    fn default() -> Self {
        Self { min: 6, max: 9 }
    }
}

/// 修正テーブル（適用順）
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CorrectionTable {
    pub entries: Vec<CorrectionEntry>,
}

impl CorrectionTable {
    /// 行から組み立てる
    ///
    /// 1行に座標と写真の両方があれば、座標→写真の順で2エントリになる。
    pub fn from_rows(rows: Vec<TableRow>, limits: PhotoLimits) -> Result<Self> {
        let mut entries = Vec::with_capacity(rows.len());
        let mut seen: HashSet<(String, FieldKind)> = HashSet::new();

        for (index, row) in rows.into_iter().enumerate() {
            let id = row.id.trim();
            if id.is_empty() {
                return Err(Error::Parse(format!("row {}: empty id", index + 1)));
            }

            let mut row_entries = Vec::new();
            match (row.lat, row.lng) {
                (Some(lat), Some(lng)) => {
                    check_coordinates(id, lat, lng)?;
                    row_entries.push(CorrectionEntry::coordinates(id, lat, lng));
                }
                (None, None) => {}
                _ => {
                    return Err(Error::Parse(format!("{}: lat and lng must be given together", id)));
                }
            }
            if let Some(photos) = row.photos {
                check_photos(id, &photos, limits)?;
                row_entries.push(CorrectionEntry::photos(id, photos));
            }

            if row_entries.is_empty() {
                return Err(Error::Parse(format!("{}: nothing to correct", id)));
            }
            for entry in row_entries {
                if !seen.insert((entry.record_id.clone(), entry.field())) {
                    return Err(Error::Parse(format!(
                        "{}: duplicate {} correction",
                        entry.record_id,
                        entry.field()
                    )));
                }
                entries.push(entry);
            }
        }

        Ok(Self { entries })
    }

    /// JSONファイルから読み込み
    pub fn from_file(path: &std::path::Path, limits: PhotoLimits) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content, limits)
    }

    /// JSON文字列から読み込み
    pub fn from_json(json: &str, limits: PhotoLimits) -> Result<Self> {
        let rows: Vec<TableRow> = serde_json::from_str(json)?;
        Self::from_rows(rows, limits)
    }

    /// 組み込みプリセットを取得
    ///
    /// * 都市名（`rome`, `london`, `kuala_lumpur` など）: その都市の座標
    /// * `all`: 全都市の座標（都市順）
    /// * `rome-photos`: ローマの写真リスト
    pub fn from_preset(name: &str) -> Option<Self> {
        let entries = match name.to_lowercase().as_str() {
            ALL_PRESET => COORDINATE_PRESETS
                .iter()
                .flat_map(|(_, rows)| rows.iter())
                .map(coordinate_entry)
                .collect(),
            ROME_PHOTOS_PRESET => ROME_PHOTOS
                .iter()
                .map(|(id, photos)| CorrectionEntry::photos(*id, photos.iter().map(|p| unsplash_url(p))))
                .collect(),
            city => COORDINATE_PRESETS
                .iter()
                .find(|(name, _)| *name == city)?
                .1
                .iter()
                .map(coordinate_entry)
                .collect(),
        };
        Some(Self { entries })
    }

    pub fn preset_names() -> Vec<&'static str> {
        COORDINATE_PRESETS
            .iter()
            .map(|(name, _)| *name)
            .chain([ALL_PRESET, ROME_PHOTOS_PRESET])
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn check_coordinates(id: &str, lat: f64, lng: f64) -> Result<()> {
    if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
        return Err(Error::Parse(format!("{}: latitude out of range: {}", id, lat)));
    }
    if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
        return Err(Error::Parse(format!("{}: longitude out of range: {}", id, lng)));
    }
    Ok(())
}

fn check_photos(id: &str, photos: &[String], limits: PhotoLimits) -> Result<()> {
    if photos.len() < limits.min || photos.len() > limits.max {
        return Err(Error::Parse(format!(
            "{}: {} photos given, expected {}-{}",
            id,
            photos.len(),
            limits.min,
            limits.max
        )));
    }
    if photos.iter().any(|url| url.trim().is_empty()) {
        return Err(Error::Parse(format!("{}: empty photo URL", id)));
    }
    Ok(())
}

const ALL_PRESET: &str = "all";
const ROME_PHOTOS_PRESET: &str = "rome-photos";

fn coordinate_entry(row: &(&str, f64, f64)) -> CorrectionEntry {
    let (id, lat, lng) = *row;
    CorrectionEntry::coordinates(id, lat, lng)
}

fn unsplash_url(photo_id: &str) -> String {
    format!("https://images.unsplash.com/{}?w=800", photo_id)
}

/// 都市ごとの正しい座標
const COORDINATE_PRESETS: &[(&str, &[(&str, f64, f64)])] = &[
    (
        "rome",
        &[
            ("colosseum", 41.890251, 12.492373),
            ("roman_forum", 41.892464, 12.485325),
            ("trevi_fountain", 41.900932, 12.483313),
            ("pantheon", 41.898609, 12.476873),
            ("spanish_steps", 41.905991, 12.482775),
            ("vatican_museums", 41.906487, 12.453641),
            ("st_peters_basilica", 41.902168, 12.453937),
            ("castel_santangelo", 41.903065, 12.466276),
        ],
    ),
    (
        "paris",
        &[
            ("eiffel_tower", 48.858093, 2.294694),
            ("louvre", 48.860294, 2.338629),
            ("notre_dame", 48.852966, 2.349902),
            ("arc_triomphe", 48.873787, 2.295047),
            ("sacre_coeur", 48.886452, 2.343121),
            ("versailles", 48.804865, 2.120355),
            ("musee_dorsay", 48.860000, 2.326561),
        ],
    ),
    (
        "london",
        &[
            ("big_ben", 51.500786, -0.124681),
            ("tower_bridge", 51.505500, -0.075300),
            ("buckingham_palace", 51.501476, -0.140634),
            ("london_eye", 51.503399, -0.119519),
            ("westminster_abbey", 51.499361, -0.127305),
            ("british_museum", 51.519413, -0.126957),
            ("st_pauls_cathedral", 51.513845, -0.098351),
        ],
    ),
    (
        "amsterdam",
        &[
            ("anne_frank_house", 52.375218, 4.883977),
            ("rijksmuseum", 52.359998, 4.885218),
        ],
    ),
    (
        "barcelona",
        &[
            ("sagrada_familia", 41.403629, 2.174356),
            ("park_guell", 41.414495, 2.152694),
            ("casa_batllo", 41.391638, 2.164993),
        ],
    ),
    (
        "brussels",
        &[
            ("atomium", 50.894941, 4.341555),
            ("grand_place", 50.846574, 4.352310),
        ],
    ),
    (
        "prague",
        &[
            ("charles_bridge", 50.086389, 14.411389),
            ("prague_castle", 50.090833, 14.400556),
            ("old_town_square", 50.087465, 14.421254),
        ],
    ),
    (
        "budapest",
        &[
            ("parliament_building", 47.507222, 19.045556),
            ("chain_bridge", 47.498611, 19.042778),
        ],
    ),
    (
        "warsaw",
        &[
            ("warsaw_old_town", 52.249722, 21.011944),
            ("palace_of_culture", 52.231667, 21.005833),
        ],
    ),
    (
        "stockholm",
        &[
            ("vasa_museum", 59.327939, 18.091573),
            ("gamla_stan", 59.325000, 18.070833),
        ],
    ),
    (
        "copenhagen",
        &[
            ("little_mermaid", 55.692871, 12.599291),
            ("nyhavn", 55.680087, 12.590611),
            ("tivoli_gardens", 55.673686, 12.568105),
        ],
    ),
    (
        "oslo",
        &[
            ("viking_ship_museum", 59.904722, 10.684167),
            ("oslo_opera_house", 59.907222, 10.753333),
        ],
    ),
    (
        "alaska",
        &[
            ("denali_national_park", 63.129700, -151.197400),
            ("mendenhall_glacier", 58.441667, -134.545833),
            ("alaska_wildlife_center", 60.821359, -148.978592),
            ("anchorage_museum", 61.217649, -149.886149),
            ("kenai_fjords", 59.909722, -149.642778),
            ("northern_lights_point", 64.837778, -147.716389),
            ("glacier_bay", 58.665806, -136.900208),
        ],
    ),
    (
        "singapore",
        &[
            ("marina-bay-sands", 1.283700, 103.860700),
            ("merlion-park", 1.286915, 103.854520),
            ("gardens-by-the-bay", 1.281563, 103.863560),
            ("singapore-flyer", 1.289250, 103.863000),
            ("chinatown-heritage-centre", 1.283611, 103.844167),
            ("national-museum-singapore", 1.296667, 103.848611),
            ("sentosa-island", 1.249404, 103.830321),
        ],
    ),
    (
        "cebu",
        &[
            ("magellans-cross", 10.293475, 123.901984),
            ("basilica-santo-nino", 10.293889, 123.902778),
            ("fort-san-pedro", 10.292222, 123.905556),
            ("tops-lookout", 10.350278, 123.817500),
            ("taoist-temple-cebu", 10.346667, 123.879444),
            ("cebu-heritage-monument", 10.294167, 123.897778),
            ("sirao-flower-garden", 10.386111, 123.824722),
        ],
    ),
    (
        "penang",
        &[
            ("kek-lok-si-temple", 5.399167, 100.272500),
            ("fort-cornwallis", 5.421667, 100.345000),
            ("khoo-kongsi", 5.416389, 100.336667),
            ("penang-hill", 5.422778, 100.268611),
            ("george-town-unesco-site", 5.414167, 100.328611),
            ("pinang-peranakan-mansion", 5.420278, 100.338611),
            ("penang-national-park", 5.460000, 100.203333),
        ],
    ),
    (
        "kuala_lumpur",
        &[
            ("petronas-towers", 3.157764, 101.711861),
            ("batu-caves", 3.237222, 101.683889),
            ("thean-hou-temple", 3.122500, 101.686111),
            ("kl-tower", 3.152778, 101.703611),
            ("central-market-kl", 3.145833, 101.695000),
        ],
    ),
    (
        "phuket",
        &[
            ("big-buddha-phuket", 7.827582, 98.312842),
            ("patong-beach", 7.895000, 98.296111),
            ("wat-chalong", 7.845556, 98.337778),
            ("karon-viewpoint", 7.820833, 98.307500),
            ("old-phuket-town", 7.883889, 98.389444),
            ("phi-phi-islands", 7.740833, 98.778333),
        ],
    ),
];

/// ローマの写真リスト（Unsplash の写真ID）
const ROME_PHOTOS: &[(&str, &[&str])] = &[
    (
        "colosseum",
        &[
            "photo-1552832230-c0197dd311b5",
            "photo-1555992336-fb0d29498b13",
            "photo-1604580864964-0462f5d5b1a8",
            "photo-1546961342-ea5f71b193f3",
            "photo-1583422409516-2895a77efded",
            "photo-1529260830199-42c24126f198",
            "photo-1548585744-4e87a0e84c88",
            "photo-1515542622106-78bda8ba0e5b",
        ],
    ),
    (
        "roman_forum",
        &[
            "photo-1531572753322-ad063cecc140",
            "photo-1525874684015-58379d421a52",
            "photo-1569154941061-e231b4725ef1",
            "photo-1552832230-c0197dd311b5",
            "photo-1583422409516-2895a77efded",
            "photo-1604580864964-0462f5d5b1a8",
            "photo-1515542622106-78bda8ba0e5b",
        ],
    ),
    (
        "trevi_fountain",
        &[
            "photo-1525874684015-58379d421a52",
            "photo-1529260830199-42c24126f198",
            "photo-1548585744-4e87a0e84c88",
            "photo-1569154941061-e231b4725ef1",
            "photo-1515542622106-78bda8ba0e5b",
            "photo-1583422409516-2895a77efded",
            "photo-1604580864964-0462f5d5b1a8",
        ],
    ),
    (
        "pantheon",
        &[
            "photo-1548585744-4e87a0e84c88",
            "photo-1569154941061-e231b4725ef1",
            "photo-1583422409516-2895a77efded",
            "photo-1552832230-c0197dd311b5",
            "photo-1531572753322-ad063cecc140",
            "photo-1604580864964-0462f5d5b1a8",
            "photo-1515542622106-78bda8ba0e5b",
        ],
    ),
    (
        "spanish_steps",
        &[
            "photo-1529260830199-42c24126f198",
            "photo-1515542622106-78bda8ba0e5b",
            "photo-1569154941061-e231b4725ef1",
            "photo-1583422409516-2895a77efded",
            "photo-1548585744-4e87a0e84c88",
            "photo-1552832230-c0197dd311b5",
            "photo-1525874684015-58379d421a52",
        ],
    ),
    (
        "vatican_museums",
        &[
            "photo-1583424223556-bb53f4362c65",
            "photo-1519677100203-a0e668c92439",
            "photo-1567359781514-3b964e2b04d6",
            "photo-1531572753322-ad063cecc140",
            "photo-1552832230-c0197dd311b5",
            "photo-1569154941061-e231b4725ef1",
            "photo-1583422409516-2895a77efded",
        ],
    ),
    (
        "st_peters_basilica",
        &[
            "photo-1531572753322-ad063cecc140",
            "photo-1583992876959-af90c2dcf744",
            "photo-1609081219090-a6d81d3085bf",
            "photo-1552832230-c0197dd311b5",
            "photo-1569154941061-e231b4725ef1",
            "photo-1583424223556-bb53f4362c65",
            "photo-1515542622106-78bda8ba0e5b",
        ],
    ),
    (
        "castel_santangelo",
        &[
            "photo-1544508618-f6927bc85146",
            "photo-1569154941061-e231b4725ef1",
            "photo-1552832230-c0197dd311b5",
            "photo-1531572753322-ad063cecc140",
            "photo-1583422409516-2895a77efded",
            "photo-1515542622106-78bda8ba0e5b",
            "photo-1548585744-4e87a0e84c88",
        ],
    ),
    (
        "borghese-gift-shop-rome",
        &[
            "photo-1441986300917-64674bd600d8",
            "photo-1555529669-e69e7aa0ba9a",
            "photo-1556742049-0cfed4f6a45d",
            "photo-1472851294608-062f824d29cc",
            "photo-1604719312566-8912e9227c6a",
            "photo-1528698827591-e19ccd7bc23d",
            "photo-1567401893414-76b7b1e5a7a5",
        ],
    ),
    (
        "vatican-gifts-rome",
        &[
            "photo-1567401893414-76b7b1e5a7a5",
            "photo-1604719312566-8912e9227c6a",
            "photo-1555529669-e69e7aa0ba9a",
            "photo-1556742049-0cfed4f6a45d",
            "photo-1472851294608-062f824d29cc",
            "photo-1528698827591-e19ccd7bc23d",
            "photo-1441986300917-64674bd600d8",
        ],
    ),
    (
        "colosseum-memories-rome",
        &[
            "photo-1556742049-0cfed4f6a45d",
            "photo-1555529669-e69e7aa0ba9a",
            "photo-1472851294608-062f824d29cc",
            "photo-1604719312566-8912e9227c6a",
            "photo-1528698827591-e19ccd7bc23d",
            "photo-1567401893414-76b7b1e5a7a5",
            "photo-1441986300917-64674bd600d8",
        ],
    ),
    (
        "trastevere-artisan-shop-rome",
        &[
            "photo-1528698827591-e19ccd7bc23d",
            "photo-1604719312566-8912e9227c6a",
            "photo-1567401893414-76b7b1e5a7a5",
            "photo-1555529669-e69e7aa0ba9a",
            "photo-1472851294608-062f824d29cc",
            "photo-1556742049-0cfed4f6a45d",
            "photo-1441986300917-64674bd600d8",
        ],
    ),
    (
        "piazza-navona-crafts-rome",
        &[
            "photo-1515542622106-78bda8ba0e5b",
            "photo-1604719312566-8912e9227c6a",
            "photo-1555529669-e69e7aa0ba9a",
            "photo-1556742049-0cfed4f6a45d",
            "photo-1472851294608-062f824d29cc",
            "photo-1528698827591-e19ccd7bc23d",
            "photo-1567401893414-76b7b1e5a7a5",
        ],
    ),
];
