//! §4.E step 2 — classifies a pasteboard snapshot into one of the five
//! content shapes, in priority order: files, image, URL, CSS color, plain
//! text.

use crate::pasteboard::{Pasteboard, PasteboardDataKind};

/// An un-transcoded, un-hashed classification result. `crate::pipeline`
/// turns this into a `clipkeep_core::Content` (running image transcoding
/// and assigning the initial link state along the way).
#[derive(Debug, Clone, PartialEq)]
pub enum RawContent {
    Files(Vec<RawFileEntry>),
    Image { bytes: Vec<u8> },
    Url(String),
    Color { rgba: u32, raw_text: String },
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawFileEntry {
    pub path: String,
    pub display_name: String,
    pub byte_size: u64,
    pub bookmark_bytes: Option<Vec<u8>>,
}

/// Runs the priority cascade against a single pasteboard snapshot. Returns
/// `None` if the pasteboard currently holds nothing classifiable (§4.E:
/// "return without recording" — the caller already filtered the
/// concealed/transient case before calling this).
pub fn classify(pb: &dyn Pasteboard) -> Option<RawContent> {
    if let Some(bytes) = pb.data(PasteboardDataKind::FileUrls) {
        if let Some(files) = parse_file_url_list(&bytes) {
            if !files.is_empty() {
                return Some(RawContent::Files(files));
            }
        }
    }

    for kind in [PasteboardDataKind::Png, PasteboardDataKind::Tiff, PasteboardDataKind::Jpeg] {
        if let Some(bytes) = pb.data(kind) {
            if !bytes.is_empty() {
                return Some(RawContent::Image { bytes });
            }
        }
    }

    let text = pb.string()?;
    if text.trim().is_empty() {
        return None;
    }
    Some(classify_text(&text))
}

/// A newline-separated list of `path\tdisplay_name\tbyte_size` records,
/// matching the shape the host application's pasteboard shim is expected to
/// hand across the FFI boundary for file-URL drags.
fn parse_file_url_list(bytes: &[u8]) -> Option<Vec<RawFileEntry>> {
    let text = std::str::from_utf8(bytes).ok()?;
    let mut out = Vec::new();
    for line in text.lines() {
        if line.is_empty() {
            continue;
        }
        let mut fields = line.split('\t');
        let path = fields.next()?.to_string();
        let display_name = fields
            .next()
            .map(str::to_string)
            .unwrap_or_else(|| path.rsplit('/').next().unwrap_or(&path).to_string());
        let byte_size = fields.next().and_then(|s| s.parse().ok()).unwrap_or(0);
        out.push(RawFileEntry {
            path,
            display_name,
            byte_size,
            bookmark_bytes: None,
        });
    }
    Some(out)
}

fn classify_text(text: &str) -> RawContent {
    let trimmed = text.trim();
    if is_url(trimmed) {
        return RawContent::Url(trimmed.to_string());
    }
    if let Some((rgba, raw)) = parse_css_color(trimmed) {
        return RawContent::Color { rgba, raw_text: raw };
    }
    RawContent::Text(text.to_string())
}

fn is_url(text: &str) -> bool {
    (text.starts_with("http://") || text.starts_with("https://")) && !text.contains(char::is_whitespace)
}

/// Recognizes `#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb(r, g, b)`, and
/// `rgba(r, g, b, a)`. Returns the packed `R<<24 | G<<16 | B<<8 | A` word
/// plus the raw text the user copied, per §3.1.
fn parse_css_color(text: &str) -> Option<(u32, String)> {
    if let Some(hex) = text.strip_prefix('#') {
        return parse_hex_color(hex).map(|rgba| (rgba, text.to_string()));
    }
    if let Some(inner) = text.strip_prefix("rgba(").and_then(|s| s.strip_suffix(')')) {
        return parse_rgb_components(inner, true).map(|rgba| (rgba, text.to_string()));
    }
    if let Some(inner) = text.strip_prefix("rgb(").and_then(|s| s.strip_suffix(')')) {
        return parse_rgb_components(inner, false).map(|rgba| (rgba, text.to_string()));
    }
    None
}

fn parse_hex_color(hex: &str) -> Option<u32> {
    let expand = |c: char| u8::from_str_radix(&c.to_string().repeat(2), 16).ok();
    let (r, g, b, a): (u8, u8, u8, u8) = match hex.len() {
        3 => {
            let mut chars = hex.chars();
            (expand(chars.next()?)?, expand(chars.next()?)?, expand(chars.next()?)?, 255)
        }
        6 => (
            u8::from_str_radix(&hex[0..2], 16).ok()?,
            u8::from_str_radix(&hex[2..4], 16).ok()?,
            u8::from_str_radix(&hex[4..6], 16).ok()?,
            255,
        ),
        8 => (
            u8::from_str_radix(&hex[0..2], 16).ok()?,
            u8::from_str_radix(&hex[2..4], 16).ok()?,
            u8::from_str_radix(&hex[4..6], 16).ok()?,
            u8::from_str_radix(&hex[6..8], 16).ok()?,
        ),
        _ => return None,
    };
    Some(pack_rgba(r, g, b, a))
}

fn parse_rgb_components(inner: &str, has_alpha: bool) -> Option<u32> {
    let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
    if has_alpha && parts.len() != 4 || !has_alpha && parts.len() != 3 {
        return None;
    }
    let r: u8 = parts[0].parse().ok()?;
    let g: u8 = parts[1].parse().ok()?;
    let b: u8 = parts[2].parse().ok()?;
    let a: u8 = if has_alpha {
        (parts[3].parse::<f64>().ok()?.clamp(0.0, 1.0) * 255.0).round() as u8
    } else {
        255
    };
    Some(pack_rgba(r, g, b, a))
}

fn pack_rgba(r: u8, g: u8, b: u8, a: u8) -> u32 {
    ((r as u32) << 24) | ((g as u32) << 16) | ((b as u32) << 8) | a as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_must_start_with_http_scheme_and_have_no_whitespace() {
        assert!(is_url("https://example.com/path"));
        assert!(!is_url("not a url"));
        assert!(!is_url("ftp://example.com"));
    }

    #[test]
    fn hex_shorthand_and_full_forms_parse_to_the_same_packed_word() {
        let (short, _) = parse_css_color("#f53").unwrap();
        let (long, _) = parse_css_color("#ff5533").unwrap();
        assert_eq!(short, long);
    }

    #[test]
    fn rgba_parses_and_quantizes_alpha() {
        let (rgba, _) = parse_css_color("rgba(255, 0, 0, 1.0)").unwrap();
        assert_eq!(rgba, pack_rgba(255, 0, 0, 255));
    }

    #[test]
    fn plain_text_falls_through_every_other_classifier() {
        assert_eq!(classify_text("just some notes"), RawContent::Text("just some notes".into()));
    }
}
