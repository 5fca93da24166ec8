//! `$DWGCODEPAGE` values and the decoding they select for pre-R2007 files.

use encoding_rs::Encoding;

/// How string values of a file declaring a code page are decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodePage {
    /// ASCII or UTF-8; the reader's default handling applies.
    Plain,
    /// Non-UTF-8 lines are decoded with this encoding.
    Encoded(&'static Encoding),
    /// Not a code page name this reader knows.
    Unrecognized,
}

/// Code pages with no systematic label in `encoding_rs`.
fn named(name: &str) -> Option<&'static Encoding> {
    match name {
        "ansi_932" => Some(encoding_rs::SHIFT_JIS),
        "ansi_936" | "gb2312" => Some(encoding_rs::GBK),
        "ansi_949" | "korean" | "johab" => Some(encoding_rs::EUC_KR),
        "ansi_950" | "big5" => Some(encoding_rs::BIG5),
        "koi8-r" => Some(encoding_rs::KOI8_R),
        "koi8-u" => Some(encoding_rs::KOI8_U),
        "mac-roman" => Some(encoding_rs::MACINTOSH),
        _ => None,
    }
}

/// Nearest `encoding_rs` encoding for the DOS (OEM) code pages.
fn dos(number: u16) -> Option<&'static Encoding> {
    match number {
        437 | 850 | 860 | 861 | 863 | 865 => Some(encoding_rs::WINDOWS_1252),
        852 => Some(encoding_rs::WINDOWS_1250),
        855 | 866 => Some(encoding_rs::IBM866),
        857 => Some(encoding_rs::WINDOWS_1254),
        864 => Some(encoding_rs::WINDOWS_1256),
        869 => Some(encoding_rs::WINDOWS_1253),
        _ => None,
    }
}

/// Classify a `$DWGCODEPAGE` value (case-insensitive).
///
/// `ANSI_874` and `ANSI_1250`..`ANSI_1258` map to the Windows encodings,
/// `ISO8859-n` to the ISO encodings (with the WHATWG aliases, so 8859-1
/// decodes as Windows-1252).
pub fn code_page(name: &str) -> CodePage {
    let name = name.trim().to_ascii_lowercase();
    if matches!(name.as_str(), "ascii" | "utf-8" | "utf8" | "unicode") {
        return CodePage::Plain;
    }
    if let Some(encoding) = named(&name) {
        return CodePage::Encoded(encoding);
    }

    let encoding = if let Some(number) = name.strip_prefix("ansi_") {
        Encoding::for_label(format!("windows-{}", number).as_bytes())
    } else if let Some(number) = name.strip_prefix("dos") {
        number.parse().ok().and_then(dos)
    } else if let Some(part) = name
        .strip_prefix("iso8859-")
        .or_else(|| name.strip_prefix("iso_8859-"))
    {
        Encoding::for_label(format!("iso-8859-{}", part).as_bytes())
    } else {
        None
    };

    encoding.map_or(CodePage::Unrecognized, CodePage::Encoded)
}
