//! Glyph keys and inline glyph markup / 글리프 키와 해설 마크업
//!
//! Some characters have no Unicode code point and exist only as scanned images. They are
//! stored under a synthetic `img:NNN:CC` key. Radical explanations embed inline glyph
//! images with `{{glyph:...}}` markers.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static IMAGE_KEY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^img:([0-9]{3}):([0-9]{2})$").unwrap());

static MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{\{glyph:([^}]+)\}\}").unwrap());

/// Marker ids that map to an inline image: radical, related character, image character
static INLINE_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[0-9]{3}_[0-9]{2}|c_[0-9A-F]{4}_[0-9]{2}|img_[0-9]{3}_[0-9]{2}_[0-9]{2})$").unwrap()
});

/// `img:005:02` → `005_02`; anything not exactly that shape → `None` / 합성 키 해석
pub fn parse_image_key(key: &str) -> Option<String> {
    IMAGE_KEY
        .captures(key)
        .map(|caps| format!("{}_{}", &caps[1], &caps[2]))
}

/// Image path of a synthetic-key character / 이미지 한자 경로
pub fn char_image_src(key: &str) -> Option<String> {
    parse_image_key(key).map(|suffix| format!("/glyphs/char_img_{}.png", suffix))
}

/// Chart image path of a code point (uppercase hex, at least four digits) / 코드포인트 차트 경로
pub fn codepoint_chart_src(codepoint: u32) -> String {
    format!("/glyphs/char_{:04X}.png", codepoint)
}

/// Best image for a glyph: the scan for synthetic keys, the chart otherwise
pub fn char_glyph_src(glyph: &str) -> Option<String> {
    if let Some(src) = char_image_src(glyph) {
        return Some(src);
    }
    glyph.chars().next().map(|c| codepoint_chart_src(c as u32))
}

/// Piece of a radical explanation / 해설 조각
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExplanationSegment {
    Text { text: String },
    Glyph { marker: String, asset: String },
}

/// Split explanation text on glyph markers / 해설 분할
///
/// Recognized markers become `Glyph` segments pointing at `/glyphs/inline_{id}.png`.
/// Unrecognized markers are kept verbatim as text.
pub fn segment_explanation(text: &str) -> Vec<ExplanationSegment> {
    let mut segments = Vec::new();
    let mut pending = String::new();
    let mut last = 0;

    for caps in MARKER.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        pending.push_str(&text[last..whole.start()]);
        last = whole.end();

        let id = &caps[1];
        if INLINE_ID.is_match(id) {
            if !pending.is_empty() {
                segments.push(ExplanationSegment::Text {
                    text: std::mem::take(&mut pending),
                });
            }
            segments.push(ExplanationSegment::Glyph {
                marker: id.to_string(),
                asset: format!("/glyphs/inline_{}.png", id),
            });
        } else {
            pending.push_str(whole.as_str());
        }
    }

    pending.push_str(&text[last..]);
    if !pending.is_empty() {
        segments.push(ExplanationSegment::Text { text: pending });
    }
    segments
}

/// Explanation with every marker removed, for one-line previews / 마커 제거
pub fn strip_markers(text: &str) -> String {
    MARKER.replace_all(text, "").into_owned()
}
