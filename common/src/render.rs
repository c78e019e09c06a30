//! 置換後の値テキスト生成
//!
//! 座標は f64 の最短往復表現、写真リストは1行1URLで出力する。
//! 写真リストの改行コードは元ファイルに合わせる。

/// 座標値を文字列化
///
/// 入力精度（小数4〜6桁）を丸めずに保つ。指数表記にはしない。
/// 整数値は `12.0` のように小数点を付ける。
pub fn render_coordinate(value: f64) -> String {
    let s = format!("{}", value);
    if s.contains('.') || s.contains("inf") || s.contains("NaN") {
        s
    } else {
        format!("{}.0", s)
    }
}

/// 写真リストの書式
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListStyle {
    /// `photos` キーの行のインデント
    pub indent: String,
    /// 要素の引用符
    pub quote: char,
    /// 改行（`\n` または `\r\n`）
    pub newline: &'static str,
}

impl Default for ListStyle {
    fn default() -> Self {
        Self {
            indent: "    ".to_string(),
            quote: '\'',
            newline: "\n",
        }
    }
}

impl ListStyle {
    /// 既存テキストから書式を推定
    ///
    /// # Arguments
    /// * `text` - 元テキスト
    /// * `key_start` - `photos` キーの先頭位置
    /// * `list` - 現在のリスト内容（括弧の内側）
    pub fn detect(text: &str, key_start: usize, list: &str) -> Self {
        let line_start = text[..key_start].rfind('\n').map(|i| i + 1).unwrap_or(0);
        let indent: String = text[line_start..key_start]
            .chars()
            .take_while(|c| *c == ' ' || *c == '\t')
            .collect();

        let quote = list
            .trim_start()
            .chars()
            .next()
            .filter(|c| matches!(*c, '\'' | '"' | '`'))
            .unwrap_or('\'');

        // キーの行の行末に合わせる。最終行なら前の行を見る
        let crlf = match text[key_start..].find('\n') {
            Some(i) => text[..key_start + i].ends_with('\r'),
            None => text[..line_start].ends_with("\r\n"),
        };
        let newline = if crlf { "\r\n" } else { "\n" };

        Self { indent, quote, newline }
    }
}

/// 写真リストの内側（`[` と `]` の間）を生成
///
/// ```
/// use landmark_fix_common::render::{render_photo_list, ListStyle};
///
/// let style = ListStyle { indent: "    ".into(), quote: '\'', newline: "\n" };
/// let inner = render_photo_list(&["a".to_string(), "b".to_string()], &style);
/// assert_eq!(inner, "\n      'a',\n      'b'\n    ");
/// ```
pub fn render_photo_list(urls: &[String], style: &ListStyle) -> String {
    if urls.is_empty() {
        return String::new();
    }

    let item_indent = format!("{}  ", style.indent);
    let items: Vec<String> = urls
        .iter()
        .map(|url| format!("{}{}{}", style.newline, item_indent, quote_url(url, style.quote)))
        .collect();

    format!("{}{}{}", items.join(","), style.newline, style.indent)
}

fn quote_url(url: &str, quote: char) -> String {
    let mut out = String::with_capacity(url.len() + 2);
    out.push(quote);
    for c in url.chars() {
        if c == quote || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push(quote);
    out
}
