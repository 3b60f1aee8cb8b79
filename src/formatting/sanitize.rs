// src/formatting/sanitize.rs
//! Post-processing of a record's rendered HTML.
//!
//! Steps, in order: code is swapped out for placeholders, tracking pixels
//! are removed, separator runs and blank-line runs are collapsed, image URLs
//! that would expire are made permanent, code is restored, and the result is
//! trimmed. Running it on its own output changes nothing.

use crate::constants::TRACKING_PIXEL_MAX_DIMENSION;
use crate::images::{is_permanent_url, AssetResolver};
use regex::{Captures, Regex};
use std::collections::HashMap;

use super::rich_text::html_escape;

const PLACEHOLDER_OPEN: char = '\u{E000}';
const PLACEHOLDER_CLOSE: char = '\u{E001}';

lazy_static::lazy_static! {
    // A whole `<pre><code>` pair is tried first so markup inside it can hold `</pre>`.
    static ref CODE_REGION: Regex = Regex::new(
        r"(?is)<pre\b[^>]*>\s*<code\b[^>]*>.*?</code>\s*</pre>|<pre\b[^>]*>.*?</pre>|<code\b[^>]*>.*?</code>"
    )
    .expect("code region regex is valid");
    static ref PLACEHOLDER: Regex = Regex::new("\u{E000}([0-9]+)\u{E001}")
        .expect("placeholder regex is valid");
    static ref IMG_TAG: Regex = Regex::new(r"(?is)<img\b[^>]*>").expect("img regex is valid");
    static ref DIMENSION_ATTR: Regex =
        Regex::new(r#"(?i)\b(width|height)\s*=\s*["']?\s*([0-9]+)"#).expect("dimension regex is valid");
    static ref SRC_ATTR: Regex =
        Regex::new(r#"(?i)(\bsrc\s*=\s*)("([^"]*)"|'([^']*)')"#).expect("src regex is valid");
    static ref EMPTY_FIGURE: Regex =
        Regex::new(r"(?i)<figure>\s*</figure>").expect("figure regex is valid");
    static ref HR_RUN: Regex =
        Regex::new(r"(?i)<hr\s*/?>(?:\s*<hr\s*/?>)+").expect("hr regex is valid");
    static ref BLANK_LINE_RUN: Regex =
        Regex::new(r"\n(?:[ \t]*\n){2,}").expect("blank line regex is valid");
}

/// What counts as a tracking pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingPixelRules {
    /// Images whose declared width and height are both at most this are dropped.
    pub max_pixel_dimension: u32,
    /// File names (last path segment of `src`) that are always dropped.
    pub filename_patterns: Vec<String>,
}

impl Default for TrackingPixelRules {
    fn default() -> Self {
        Self {
            max_pixel_dimension: TRACKING_PIXEL_MAX_DIMENSION,
            filename_patterns: vec!["0.gif".to_string()],
        }
    }
}

impl TrackingPixelRules {
    pub fn is_tracking_pixel(&self, img_tag: &str) -> bool {
        let mut width = None;
        let mut height = None;
        for caps in DIMENSION_ATTR.captures_iter(img_tag) {
            let value = caps[2].parse::<u64>().ok();
            if caps[1].eq_ignore_ascii_case("width") {
                width = width.or(value);
            } else {
                height = height.or(value);
            }
        }
        let max = u64::from(self.max_pixel_dimension);
        if let (Some(w), Some(h)) = (width, height) {
            if w <= max && h <= max {
                return true;
            }
        }

        match src_of(img_tag) {
            Some(src) => {
                let file_name = file_name_of(&src);
                self.filename_patterns
                    .iter()
                    .any(|pattern| !pattern.is_empty() && file_name.eq_ignore_ascii_case(pattern))
            }
            None => false,
        }
    }
}

/// Cleans `html` and makes its image URLs permanent.
pub async fn sanitize(html: &str, rules: &TrackingPixelRules, resolver: &AssetResolver) -> String {
    let (protected, regions) = protect_code(html);
    let cleaned = clean_markup(&protected, rules);
    let rewritten = rewrite_image_sources(&cleaned, resolver).await;
    restore_code(&rewritten, &regions).trim().to_string()
}

/// The synchronous part of [`sanitize`]: everything except URL rewriting.
pub fn sanitize_markup(html: &str, rules: &TrackingPixelRules) -> String {
    let (protected, regions) = protect_code(html);
    let cleaned = clean_markup(&protected, rules);
    restore_code(&cleaned, &regions).trim().to_string()
}

fn clean_markup(html: &str, rules: &TrackingPixelRules) -> String {
    let without_pixels = IMG_TAG.replace_all(html, |caps: &Captures| {
        if rules.is_tracking_pixel(&caps[0]) {
            log::debug!("Dropping tracking pixel {}", &caps[0]);
            String::new()
        } else {
            caps[0].to_string()
        }
    });
    let without_figures = EMPTY_FIGURE.replace_all(&without_pixels, "");
    let single_rules = HR_RUN.replace_all(&without_figures, "<hr />");
    BLANK_LINE_RUN.replace_all(&single_rules, "\n\n").into_owned()
}

fn protect_code(html: &str) -> (String, Vec<String>) {
    let mut regions = Vec::new();
    let protected = CODE_REGION.replace_all(html, |caps: &Captures| {
        regions.push(caps[0].to_string());
        format!("{}{}{}", PLACEHOLDER_OPEN, regions.len() - 1, PLACEHOLDER_CLOSE)
    });
    (protected.into_owned(), regions)
}

fn restore_code(html: &str, regions: &[String]) -> String {
    PLACEHOLDER
        .replace_all(html, |caps: &Captures| {
            caps[1]
                .parse::<usize>()
                .ok()
                .and_then(|index| regions.get(index))
                .cloned()
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

async fn rewrite_image_sources(html: &str, resolver: &AssetResolver) -> String {
    let sources: Vec<String> = IMG_TAG
        .find_iter(html)
        .filter_map(|tag| src_of(tag.as_str()))
        .filter(|src| !is_permanent_url(src) && !src.trim().is_empty())
        .collect();

    let mut resolved: HashMap<String, String> = HashMap::new();
    for src in sources {
        if resolved.contains_key(&src) {
            continue;
        }
        let permanent = resolver.resolve(&src, None).await;
        resolved.insert(src, permanent);
    }
    if resolved.is_empty() {
        return html.to_string();
    }

    IMG_TAG
        .replace_all(html, |caps: &Captures| {
            SRC_ATTR
                .replace(&caps[0], |src: &Captures| {
                    let raw = src.get(3).or_else(|| src.get(4)).map_or("", |m| m.as_str());
                    match resolved.get(&html_unescape(raw)) {
                        Some(permanent) => format!("{}\"{}\"", &src[1], html_escape(permanent)),
                        None => src[0].to_string(),
                    }
                })
                .into_owned()
        })
        .into_owned()
}

fn src_of(img_tag: &str) -> Option<String> {
    SRC_ATTR.captures(img_tag).map(|caps| {
        let raw = caps.get(3).or_else(|| caps.get(4)).map_or("", |m| m.as_str());
        html_unescape(raw)
    })
}

fn file_name_of(src: &str) -> &str {
    let path = src.split(['?', '#']).next().unwrap_or(src);
    path.rsplit('/').next().unwrap_or(path)
}

fn html_unescape(value: &str) -> String {
    value
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
