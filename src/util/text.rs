/// テキスト処理ユーティリティ。
use unicode_normalization::UnicodeNormalization;

/// NFC正規化して前後の空白を取り除く。
#[must_use]
pub fn normalize_text(input: &str) -> String {
    input.trim().nfc().collect::<String>()
}

/// 空白のみ、または空のテキストかどうか。
#[must_use]
pub fn is_blank(input: &str) -> bool {
    input.trim().is_empty()
}

/// ログ出力用に先頭`max_chars`文字だけを切り出す。
#[must_use]
pub(crate) fn preview(input: &str, max_chars: usize) -> String {
    let mut chars = input.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{head}…")
    } else {
        head
    }
}
