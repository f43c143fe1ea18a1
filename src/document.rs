//! Reading email documents from disk.
//!
//! Training and test corpora are stored in GB18030. Invalid byte sequences
//! are dropped rather than reported, so decoding itself never fails; only
//! the file read can. Documents may be HTML, in which case only the visible
//! text is kept.

use crate::error::{Error, Result};
use encoding_rs::GB18030;
use regex::{Captures, Regex};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use std::sync::OnceLock;

static HIDDEN: OnceLock<Regex> = OnceLock::new();
static TAG: OnceLock<Regex> = OnceLock::new();
static ENTITY: OnceLock<Regex> = OnceLock::new();

/// Read a document and return its visible text.
///
/// # Errors
/// Returns [`Error::DocumentRead`] if the file cannot be opened or read
/// (missing file, permission denied, a directory, ...).
pub fn read_document(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|source| Error::DocumentRead {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(extract_text(&decode_lossy(&bytes)))
}

/// Decode GB18030 bytes, dropping anything that does not decode.
pub fn decode_lossy(bytes: &[u8]) -> String {
    let (text, had_errors) = GB18030.decode_without_bom_handling(bytes);
    if had_errors {
        text.chars().filter(|&c| c != char::REPLACEMENT_CHARACTER).collect()
    } else {
        text.into_owned()
    }
}

/// Encode text as GB18030 for the output files.
pub fn encode(text: &str) -> Vec<u8> {
    let (bytes, _, _) = GB18030.encode(text);
    bytes.into_owned()
}

/// Read a GB18030 text file without any markup handling.
pub fn read_text(path: &Path) -> Result<String> {
    Ok(decode_lossy(&std::fs::read(path)?))
}

/// Write `text` to `path` as GB18030.
pub fn write_text(path: &Path, text: &str) -> Result<()> {
    std::fs::write(path, encode(text))?;
    Ok(())
}

/// Read every row of a headed GB18030 CSV file.
pub fn read_csv<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let text = read_text(path)?;
    let mut reader = csv::Reader::from_reader(text.as_bytes());
    let rows = reader.deserialize().collect::<std::result::Result<Vec<T>, _>>()?;
    Ok(rows)
}

/// Write `header` and then `rows` to a GB18030 CSV file, replacing it.
///
/// The header is written even when there are no rows.
pub fn write_csv<T, I>(path: &Path, header: &[&str], rows: I) -> Result<()>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(header)?;
    for row in rows {
        writer.serialize(row)?;
    }
    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    write_text(path, &String::from_utf8_lossy(&bytes))
}

/// Strip markup from `html`, keeping the text a browser would show.
///
/// Script and style bodies and comments are removed entirely, tags are
/// removed without inserting whitespace, and character entities are
/// decoded. Plain text passes through unchanged.
pub fn extract_text(html: &str) -> String {
    let hidden = HIDDEN.get_or_init(|| {
        Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>|<!--.*?-->")
            .expect("hidden content pattern is a valid regex")
    });
    let tag = TAG.get_or_init(|| {
        Regex::new(r"<[a-zA-Z/!?][^>]*>").expect("tag pattern is a valid regex")
    });
    let entity = ENTITY.get_or_init(|| {
        Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z]+);")
            .expect("entity pattern is a valid regex")
    });

    let visible = hidden.replace_all(html, "");
    let visible = tag.replace_all(&visible, "");
    entity
        .replace_all(&visible, |caps: &Captures| decode_entity(&caps[0], &caps[1]))
        .into_owned()
}

fn decode_entity(raw: &str, name: &str) -> String {
    let code = if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
        u32::from_str_radix(hex, 16).ok()
    } else if let Some(dec) = name.strip_prefix('#') {
        dec.parse::<u32>().ok()
    } else {
        let named = match name {
            "amp" => '&',
            "lt" => '<',
            "gt" => '>',
            "quot" => '"',
            "apos" => '\'',
            "nbsp" => '\u{a0}',
            "copy" => '©',
            "reg" => '®',
            _ => return raw.to_string(),
        };
        return named.to_string();
    };

    match code.and_then(char::from_u32) {
        Some(c) => c.to_string(),
        None => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_unchanged() {
        assert_eq!(extract_text("hello a < b world"), "hello a < b world");
    }

    #[test]
    fn test_strips_tags_scripts_and_styles() {
        let html = "<html><head><style>p { color: red }</style>\
                    <script type=\"text/javascript\">var spam = 1;</script></head>\
                    <body><p>Buy <b>now</b></p><!-- hidden --></body></html>";
        assert_eq!(extract_text(html), "Buy now");
    }

    #[test]
    fn test_decodes_entities() {
        assert_eq!(extract_text("Tom &amp; Jerry &#65;&#x42; &bogus;"), "Tom & Jerry AB &bogus;");
    }

    #[test]
    fn test_gb18030_round_trip() {
        let text = "免费 offer";
        assert_eq!(decode_lossy(&encode(text)), text);
    }

    #[test]
    fn test_invalid_bytes_are_dropped() {
        let mut bytes = b"free".to_vec();
        bytes.push(0xFF);
        bytes.extend_from_slice(b" money");
        assert_eq!(decode_lossy(&bytes), "free money");
    }

    #[test]
    fn test_read_missing_document() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_document(&dir.path().join("missing.eml")).unwrap_err();
        assert!(matches!(err, Error::DocumentRead { .. }));
    }

    #[test]
    fn test_read_html_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("offer.html");
        std::fs::write(&path, encode("<p>限时 Offer</p>")).unwrap();
        assert_eq!(read_document(&path).unwrap(), "限时 Offer");
    }
}
