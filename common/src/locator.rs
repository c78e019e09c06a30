//! レコード探索モジュール
//!
//! IDをアンカーにしてレコードを見つけ、そのレコード内の対象フィールドの
//! 値の範囲を返す。
//!
//! ## 探索手順
//! 1. `id: '<record_id>'` 宣言を先頭から探す（最初の一致のみ）
//! 2. 次のID宣言（値は問わない）またはテキスト末尾までを探索範囲とする
//! 3. 探索範囲内でフィールドキーを探す（範囲外には決して出ない）
//! 4. 写真リストは括弧の対応を取って終端を決める
//!
//! 正規表現は単一トークン（キーと数値リテラル）の認識にだけ使い、
//! レコード境界をまたぐマッチには使わない。文字列リテラルやコメントの中に
//! 現れたキーは候補から外す。

use crate::error::LocateError;
use crate::types::{FieldKind, Span};
use regex::{Captures, Regex};

lazy_static::lazy_static! {
    // id: 'xxx' / "id": "xxx"（placeId や city_id は対象外）
    static ref ID_DECL_RE: Regex = Regex::new(
        r#"(?:^|[^\w$])(?P<key>id|'id'|"id")\s*:\s*(?:'(?P<sq>[^'\\\r\n]*)'|"(?P<dq>[^"\\\r\n]*)")"#
    ).unwrap();
    static ref LAT_RE: Regex = numeric_key_regex("lat");
    static ref LNG_RE: Regex = numeric_key_regex("lng");
    static ref PHOTOS_RE: Regex = Regex::new(
        r#"(?:^|[^\w$])(?P<key>photos|'photos'|"photos")\s*:\s*\["#
    ).unwrap();
}

fn numeric_key_regex(key: &str) -> Regex {
    Regex::new(&format!(
        r#"(?:^|[^\w$])(?P<key>{key}|'{key}'|"{key}")\s*:\s*(?P<num>-?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?)"#
    ))
    .unwrap()
}

/// ID宣言
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdDecl {
    /// `id` キーの先頭から値の閉じ引用符まで
    pub span: Span,
    pub value: String,
}

/// レコードの位置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordRegion {
    /// ID宣言
    pub decl: Span,
    /// 探索範囲（ID宣言の直後から次のID宣言の直前まで）
    pub region: Span,
}

/// 見つかったフィールドの値の範囲
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldSpan {
    /// 数値リテラル部分のみ
    Coordinates { lat: Span, lng: Span },
    /// `key` は `photos` キー、`list` は `[` と `]` の間
    Photos { key: Span, list: Span },
}

/// 探索結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Located {
    /// ID宣言の先頭からフィールド値の末尾まで
    pub record: Span,
    pub region: Span,
    pub field: FieldSpan,
    /// 探索範囲内に候補が複数あり、先頭を採用した
    pub ambiguous: bool,
}

/// テキスト中のID宣言を先頭から列挙
///
/// 文字列リテラルやコメントの中の `id:` は数えない。
pub fn id_declarations(text: &str) -> impl Iterator<Item = IdDecl> + '_ {
    let literals = literal_spans(text);
    ID_DECL_RE
        .captures_iter(text)
        .filter_map(move |caps| id_decl(&caps, &literals))
}

fn id_decl(caps: &Captures<'_>, literals: &[Span]) -> Option<IdDecl> {
    let key = caps.name("key")?;
    if in_literal(literals, key.start()) {
        return None;
    }
    let whole = caps.get(0)?;
    let value = caps.name("sq").or_else(|| caps.name("dq"))?;
    Some(IdDecl {
        span: Span::new(key.start(), whole.end()),
        value: value.as_str().to_string(),
    })
}

/// レコードを探す
///
/// 同じIDが複数あっても最初の宣言だけを対象とする。
pub fn find_record(text: &str, record_id: &str) -> Option<RecordRegion> {
    find_record_with(text, record_id, &literal_spans(text))
}

fn find_record_with(text: &str, record_id: &str, literals: &[Span]) -> Option<RecordRegion> {
    let mut decls = ID_DECL_RE
        .captures_iter(text)
        .filter_map(|caps| id_decl(&caps, literals));
    let decl = decls.by_ref().find(|d| d.value == record_id)?;
    let bound = decls.next().map(|next| next.span.start).unwrap_or(text.len());

    Some(RecordRegion {
        decl: decl.span,
        region: Span::new(decl.span.end, bound),
    })
}

/// フィールドを探す
///
/// # Arguments
/// * `text` - 元テキスト
/// * `record_id` - レコードID
/// * `field` - 対象フィールド
///
/// # Returns
/// * `Ok(Located)` - 値の範囲（バイトオフセット）
/// * `Err(LocateError)` - レコードまたはフィールドが見つからない
pub fn locate(text: &str, record_id: &str, field: FieldKind) -> Result<Located, LocateError> {
    let literals = literal_spans(text);
    let record = find_record_with(text, record_id, &literals)
        .ok_or_else(|| LocateError::RecordNotFound(record_id.to_string()))?;
    let not_found = || LocateError::FieldNotFound {
        record_id: record_id.to_string(),
        field,
    };

    let (field_span, end, ambiguous) = match field {
        FieldKind::Coordinates => {
            // 片方だけの更新はしない
            let (lat, lat_count) =
                find_numeric(&LAT_RE, text, record.region, &literals).ok_or_else(not_found)?;
            let (lng, lng_count) =
                find_numeric(&LNG_RE, text, record.region, &literals).ok_or_else(not_found)?;
            (
                FieldSpan::Coordinates { lat, lng },
                lat.end.max(lng.end),
                lat_count > 1 || lng_count > 1,
            )
        }
        FieldKind::Photos => {
            let (key, list, count) =
                find_list(&PHOTOS_RE, text, record.region, &literals).ok_or_else(not_found)?;
            (FieldSpan::Photos { key, list }, list.end + 1, count > 1)
        }
    };

    if ambiguous {
        tracing::warn!(
            record_id,
            %field,
            "multiple `{}` keys inside one record, using the first",
            field
        );
    }

    Ok(Located {
        record: Span::new(record.decl.start, end),
        region: record.region,
        field: field_span,
        ambiguous,
    })
}

/// 探索範囲内のキー候補（リテラル・コメント内は除く）
fn key_candidates<'t>(
    re: &'t Regex,
    text: &'t str,
    region: Span,
    literals: &'t [Span],
) -> impl Iterator<Item = Captures<'t>> + 't {
    let scope = &text[region.start..region.end];
    re.captures_iter(scope).filter(move |caps| {
        caps.name("key")
            .is_some_and(|key| !in_literal(literals, region.start + key.start()))
    })
}

/// 探索範囲内で `key: <number>` を探す（最初の一致と候補数）
fn find_numeric(re: &Regex, text: &str, region: Span, literals: &[Span]) -> Option<(Span, usize)> {
    let mut matches = key_candidates(re, text, region, literals);
    let first = matches.next()?;
    let count = 1 + matches.count();
    let num = first.name("num")?;
    Some((Span::new(num.start(), num.end()).shifted(region.start), count))
}

/// 探索範囲内で `key: [ ... ]` を探す
fn find_list(re: &Regex, text: &str, region: Span, literals: &[Span]) -> Option<(Span, Span, usize)> {
    let mut matches = key_candidates(re, text, region, literals);
    let caps = matches.next()?;
    let count = 1 + matches.count();

    let key = caps.name("key")?;
    let open = region.start + caps.get(0)?.end() - 1;
    let close = matching_bracket(text, open, region.end)?;

    Some((
        Span::new(key.start(), key.end()).shifted(region.start),
        Span::new(open + 1, close),
        count,
    ))
}

/// `open` 位置の `[` に対応する `]` の位置を返す
///
/// 文字列リテラルとコメントの中の括弧は数えない。
/// `limit` までに閉じなければ `None`。
fn matching_bracket(text: &str, open: usize, limit: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut i = open;

    while i < limit {
        if let Some(end) = skip_literal(bytes, i, limit) {
            i = end;
            continue;
        }
        match bytes[i] {
            b'[' => depth += 1,
            b']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }

    None
}

/// テキスト全体の文字列リテラルとコメントの範囲（昇順、重なりなし）
fn literal_spans(text: &str) -> Vec<Span> {
    let bytes = text.as_bytes();
    let mut spans = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        match skip_literal(bytes, i, bytes.len()) {
            Some(end) => {
                spans.push(Span::new(i, end));
                i = end;
            }
            None => i += 1,
        }
    }

    spans
}

/// `offset` がリテラルかコメントの内側にあるか
///
/// 開き引用符そのものの位置は内側に含めない（`'lat': ...` のようなキーのため）。
fn in_literal(literals: &[Span], offset: usize) -> bool {
    let index = literals.partition_point(|span| span.end <= offset);
    literals.get(index).is_some_and(|span| span.start < offset)
}

/// `i` から文字列リテラル（'/"/`）かコメントが始まるなら、その直後の位置を返す
///
/// 閉じていなければ `limit` で打ち切る。
/// 区切り文字はすべてASCIIなのでバイト単位で走査してよい。
fn skip_literal(bytes: &[u8], i: usize, limit: usize) -> Option<usize> {
    match bytes[i] {
        quote @ (b'\'' | b'"' | b'`') => {
            let mut j = i + 1;
            while j < limit && bytes[j] != quote {
                if bytes[j] == b'\\' {
                    j += 1;
                }
                j += 1;
            }
            Some((j + 1).min(limit))
        }
        b'/' if bytes.get(i + 1) == Some(&b'/') => {
            let mut j = i + 2;
            while j < limit && bytes[j] != b'\n' {
                j += 1;
            }
            Some(j)
        }
        b'/' if bytes.get(i + 1) == Some(&b'*') => {
            let mut j = i + 2;
            while j + 1 < limit && !(bytes[j] == b'*' && bytes[j + 1] == b'/') {
                j += 1;
            }
            Some((j + 2).min(limit))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"export const landmarks = [
  {
    id: 'colosseum',
    name: 'Colosseum',
    lat: 41.8902,
    lng: 12.4922,
    photos: [
      'https://images.unsplash.com/photo-1552832230-c0197dd311b5?w=800'
    ],
  },
  {
    id: 'roman_forum',
    cityId: 'rome',
    lat: 41.8925,
    lng: 12.4853,
  },
];
"#;

    fn slice(text: &str, span: Span) -> &str {
        span.slice(text)
    }

    #[test]
    fn test_id_declarations() {
        let ids: Vec<String> = id_declarations(SAMPLE).map(|d| d.value).collect();
        assert_eq!(ids, vec!["colosseum", "roman_forum"]);
    }

    #[test]
    fn test_id_declarations_quoted_keys() {
        let text = r#"[{"id": "a", "lat": 1.5}, {'id':'b'}]"#;
        let ids: Vec<String> = id_declarations(text).map(|d| d.value).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_id_declarations_skip_suffixed_keys() {
        let text = "{ placeId: 'x', city_id: 'y', landmarkid: 'z', id: 'real' }";
        let ids: Vec<String> = id_declarations(text).map(|d| d.value).collect();
        assert_eq!(ids, vec!["real"]);
    }

    #[test]
    fn test_find_record_region_bounded_by_next_id() {
        let record = find_record(SAMPLE, "colosseum").unwrap();
        let next = SAMPLE.find("id: 'roman_forum'").unwrap();
        assert_eq!(record.region.end, next);
        assert_eq!(slice(SAMPLE, record.decl), "id: 'colosseum'");
    }

    #[test]
    fn test_find_record_last_runs_to_end() {
        let record = find_record(SAMPLE, "roman_forum").unwrap();
        assert_eq!(record.region.end, SAMPLE.len());
    }

    #[test]
    fn test_locate_coordinates() {
        let located = locate(SAMPLE, "colosseum", FieldKind::Coordinates).unwrap();
        match located.field {
            FieldSpan::Coordinates { lat, lng } => {
                assert_eq!(slice(SAMPLE, lat), "41.8902");
                assert_eq!(slice(SAMPLE, lng), "12.4922");
            }
            other => panic!("unexpected field span: {:?}", other),
        }
        assert!(!located.ambiguous);
        assert!(slice(SAMPLE, located.record).starts_with("id: 'colosseum'"));
        assert!(slice(SAMPLE, located.record).ends_with("12.4922"));
    }

    #[test]
    fn test_locate_photos() {
        let located = locate(SAMPLE, "colosseum", FieldKind::Photos).unwrap();
        match located.field {
            FieldSpan::Photos { key, list } => {
                assert_eq!(slice(SAMPLE, key), "photos");
                assert_eq!(
                    slice(SAMPLE, list).trim(),
                    "'https://images.unsplash.com/photo-1552832230-c0197dd311b5?w=800'"
                );
            }
            other => panic!("unexpected field span: {:?}", other),
        }
        assert!(slice(SAMPLE, located.record).ends_with(']'));
    }

    #[test]
    fn test_locate_record_not_found() {
        let err = locate(SAMPLE, "pantheon", FieldKind::Coordinates).unwrap_err();
        assert_eq!(err, LocateError::RecordNotFound("pantheon".to_string()));
    }

    #[test]
    fn test_locate_does_not_bleed_into_next_record() {
        // a には photos が無い。次のレコードを見に行ってはいけない
        let text = "{ id: 'a', lat: 1.0, lng: 2.0 }, { id: 'b', photos: ['x'] }";
        let err = locate(text, "a", FieldKind::Photos).unwrap_err();
        assert!(matches!(err, LocateError::FieldNotFound { field: FieldKind::Photos, .. }));
    }

    #[test]
    fn test_locate_coordinates_requires_both() {
        let text = "{ id: 'a', lat: 1.0 }, { id: 'b', lat: 3.0, lng: 4.0 }";
        let err = locate(text, "a", FieldKind::Coordinates).unwrap_err();
        assert!(matches!(err, LocateError::FieldNotFound { .. }));
    }

    #[test]
    fn test_locate_ignores_longer_key_names() {
        let text = "{ id: 'a', latitude: 9.9, lat: 1.0, lngOffset: 3, lng: 2.0 }";
        let located = locate(text, "a", FieldKind::Coordinates).unwrap();
        match located.field {
            FieldSpan::Coordinates { lat, lng } => {
                assert_eq!(slice(text, lat), "1.0");
                assert_eq!(slice(text, lng), "2.0");
            }
            other => panic!("unexpected field span: {:?}", other),
        }
        assert!(!located.ambiguous);
    }

    #[test]
    fn test_locate_ambiguous_takes_first() {
        let text = "{ id: 'a', lat: 1.0, lng: 2.0, lat: 5.0 }";
        let located = locate(text, "a", FieldKind::Coordinates).unwrap();
        assert!(located.ambiguous);
        match located.field {
            FieldSpan::Coordinates { lat, .. } => assert_eq!(slice(text, lat), "1.0"),
            other => panic!("unexpected field span: {:?}", other),
        }
    }

    #[test]
    fn test_locate_photos_ambiguous_takes_first() {
        let text = "{ id: 'a', photos: ['first'], lat: 1.0, photos: ['second', 'third'] }";
        let located = locate(text, "a", FieldKind::Photos).unwrap();
        assert!(located.ambiguous);
        match located.field {
            FieldSpan::Photos { list, .. } => assert_eq!(slice(text, list), "'first'"),
            other => panic!("unexpected field span: {:?}", other),
        }
    }

    #[test]
    fn test_locate_skips_keys_inside_strings() {
        let text = "{ id: 'a', narration: 'The old survey said lat: 40.0 here', lat: 41.0, lng: 12.0 }";
        let located = locate(text, "a", FieldKind::Coordinates).unwrap();
        match located.field {
            FieldSpan::Coordinates { lat, lng } => {
                assert_eq!(lat.start, text.find("41.0").unwrap());
                assert_eq!(slice(text, lng), "12.0");
            }
            other => panic!("unexpected field span: {:?}", other),
        }
        // 文字列中の候補は数えない
        assert!(!located.ambiguous);
    }

    #[test]
    fn test_locate_skips_keys_inside_comments() {
        let text = "{ id: 'a',\n  // photos: ['old'],\n  /* lng: 0.0 */ lat: 1.0, lng: 2.0,\n  photos: ['x'] }";
        let coords = locate(text, "a", FieldKind::Coordinates).unwrap();
        match coords.field {
            FieldSpan::Coordinates { lng, .. } => assert_eq!(slice(text, lng), "2.0"),
            other => panic!("unexpected field span: {:?}", other),
        }
        let photos = locate(text, "a", FieldKind::Photos).unwrap();
        match photos.field {
            FieldSpan::Photos { list, .. } => assert_eq!(slice(text, list), "'x'"),
            other => panic!("unexpected field span: {:?}", other),
        }
        assert!(!photos.ambiguous);
    }

    #[test]
    fn test_id_inside_string_is_not_a_record() {
        let text = "{ id: 'a', narration: \"see id: 'b' nearby\", lat: 1.0, lng: 2.0 }";
        let ids: Vec<String> = id_declarations(text).map(|d| d.value).collect();
        assert_eq!(ids, vec!["a"]);
        // a の範囲が文字列中の "id:" で切れていない
        assert!(locate(text, "a", FieldKind::Coordinates).is_ok());
        assert!(matches!(
            locate(text, "b", FieldKind::Coordinates),
            Err(LocateError::RecordNotFound(_))
        ));
    }

    #[test]
    fn test_quoted_keys_are_not_treated_as_strings() {
        let text = r#"{"id": "a", "lat": 1.5, "lng": 2.5}"#;
        let located = locate(text, "a", FieldKind::Coordinates).unwrap();
        match located.field {
            FieldSpan::Coordinates { lat, lng } => {
                assert_eq!(slice(text, lat), "1.5");
                assert_eq!(slice(text, lng), "2.5");
            }
            other => panic!("unexpected field span: {:?}", other),
        }
    }

    #[test]
    fn test_locate_negative_and_reversed_order() {
        let text = "{ id: 'big_ben', lng: -0.1246, lat: 51.5007 }";
        let located = locate(text, "big_ben", FieldKind::Coordinates).unwrap();
        match located.field {
            FieldSpan::Coordinates { lat, lng } => {
                assert_eq!(slice(text, lat), "51.5007");
                assert_eq!(slice(text, lng), "-0.1246");
            }
            other => panic!("unexpected field span: {:?}", other),
        }
    }

    #[test]
    fn test_matching_bracket_skips_strings_and_comments() {
        let text = "photos: ['a]b', \"c[d\", // it's ] here\n /* ] */ ['nested'] ] tail";
        let open = text.find('[').unwrap();
        let close = matching_bracket(text, open, text.len()).unwrap();
        assert_eq!(&text[close..], "] tail");
    }

    #[test]
    fn test_matching_bracket_unterminated() {
        let text = "photos: ['a', 'b'";
        let open = text.find('[').unwrap();
        assert_eq!(matching_bracket(text, open, text.len()), None);
    }

    #[test]
    fn test_list_must_close_inside_record() {
        let text = "{ id: 'a', photos: ['x', }, { id: 'b', photos: ['y'] }";
        let err = locate(text, "a", FieldKind::Photos).unwrap_err();
        assert!(matches!(err, LocateError::FieldNotFound { .. }));
    }
}
