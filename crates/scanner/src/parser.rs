use regex::Regex;
use std::sync::LazyLock;

use crate::tokenizer::{self, Segment};

/// Category assigned to a piece of a release name.
///
/// Episode numbers and file extensions are never classified: they only mark
/// where a title ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementCategory {
    AnimeTitle,
    ReleaseGroup,
    VideoTerm,
    Year,
    Checksum,
    ProviderId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub category: ElementCategory,
    pub value: String,
}

impl Element {
    fn new(category: ElementCategory, value: impl Into<String>) -> Self {
        Self {
            category,
            value: value.into(),
        }
    }
}

static MEDIA_EXTENSIONS: &[&str] = &[
    "mkv", "mp4", "avi", "m4v", "mov", "wmv", "flv", "webm", "ts", "m2ts", "mts", "mpg", "mpeg",
    "3gp", "ogv", "ogm", "vob", "rmvb", "srt", "ass", "ssa", "sub", "idx",
];

// Release vocabulary: sources, codecs, audio, subtitle and batch markers.
static VIDEO_TERMS: &[&str] = &[
    "bd", "bdrip", "bdremux", "bluray", "blu-ray", "dvd", "dvdrip", "hdtv", "tvrip", "web",
    "web-dl", "webdl", "webrip", "remux", "x264", "x265", "h264", "h.264", "h265", "h.265",
    "hevc", "avc", "av1", "xvid", "divx", "10bit", "10-bit", "8bit", "8-bit", "hi10", "hi10p",
    "hdr", "hdr10", "sdr", "aac", "ac3", "eac3", "flac", "opus", "mp3", "dts", "truehd",
    "dual-audio", "multi-audio", "multisub", "multi-sub", "vostfr", "raw", "batch", "complete",
    "uncensored", "4k", "uhd", "fhd",
];

static RE_RESOLUTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(\d{3,4}[pi]|\d{3,4}x\d{3,4})$").unwrap());

// S01E02, E05, EP05, Ep.05, #05, 01v2
static RE_EPISODE_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(s\d{1,2}e\d{1,4}|e\d{1,4}|ep\.?\d{1,4}|#\d{1,4}|\d{1,4}v\d)$").unwrap()
});

static RE_EPISODE_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(episode|ep\.?|vol\.?|volume)$").unwrap());

static RE_CHECKSUM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9A-Fa-f]{8}$").unwrap());

static RE_YEAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(19|20)\d{2}$").unwrap());

static RE_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+$").unwrap());

// Provider ID tag: [anisearch=1234], [kitsu=7442]
static RE_PROVIDER_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(\w+)=([^\]]+)\]").unwrap());

static SEPARATORS: &[&str] = &["-", "–", "—", "~", "|", "+"];

/// Extract the series title from a release name.
///
/// Returns `raw` unchanged when no title can be found.
pub fn normalize(raw: &str) -> String {
    classify(raw)
        .into_iter()
        .find(|e| e.category == ElementCategory::AnimeTitle)
        .map(|e| e.value)
        .unwrap_or_else(|| raw.to_string())
}

/// Extract provider IDs from a name like `Show [kitsu=7442]`.
pub fn extract_provider_ids(name: &str) -> Vec<(String, String)> {
    RE_PROVIDER_ID
        .captures_iter(name)
        .map(|c| (c[1].to_lowercase(), c[2].trim().to_string()))
        .collect()
}

/// Classify every recognizable part of a release name, in input order.
pub fn classify(raw: &str) -> Vec<Element> {
    let stem = strip_extension(raw);
    let segments = tokenizer::segments(stem);

    let mut elements = Vec::new();
    let mut title_found = false;
    let mut fallback_candidates = Vec::new();

    for (idx, segment) in segments.iter().enumerate() {
        if segment.enclosed {
            match classify_enclosed(&segment.text) {
                Some(element) => elements.push(element),
                None if idx == 0 && segments.len() > 1 => {
                    elements.push(Element::new(
                        ElementCategory::ReleaseGroup,
                        segment.text.trim(),
                    ));
                }
                None => fallback_candidates.push((elements.len(), segment)),
            }
            continue;
        }

        let words = tokenizer::words(&segment.text);
        let mut rest = words.as_slice();
        if !title_found {
            let (title, consumed) = take_title(rest);
            if let Some(title) = title {
                elements.push(Element::new(ElementCategory::AnimeTitle, title));
                title_found = true;
            }
            rest = &rest[consumed..];
        }
        for word in rest {
            if RE_YEAR.is_match(word) {
                elements.push(Element::new(ElementCategory::Year, word.as_str()));
            } else if is_video_term(word) {
                elements.push(Element::new(ElementCategory::VideoTerm, word.as_str()));
            }
        }
    }

    if !title_found {
        if let Some((pos, title)) = fallback_title(&fallback_candidates) {
            elements.insert(pos, Element::new(ElementCategory::AnimeTitle, title));
        }
    }

    elements
}

fn fallback_title(candidates: &[(usize, &Segment)]) -> Option<(usize, String)> {
    candidates.iter().find_map(|(pos, segment)| {
        let words = tokenizer::words(&segment.text);
        let (title, _) = take_title(&words);
        title
            .filter(|t| !RE_NUMBER.is_match(t))
            .map(|t| (*pos, t))
    })
}

fn classify_enclosed(text: &str) -> Option<Element> {
    let trimmed = text.trim();
    if trimmed.contains('=') {
        let tagged = format!("[{trimmed}]");
        if RE_PROVIDER_ID.is_match(&tagged) {
            return Some(Element::new(ElementCategory::ProviderId, trimmed));
        }
    }
    if RE_CHECKSUM.is_match(trimmed) {
        return Some(Element::new(ElementCategory::Checksum, trimmed));
    }
    if RE_YEAR.is_match(trimmed) {
        return Some(Element::new(ElementCategory::Year, trimmed));
    }

    let words = tokenizer::words(trimmed);
    if !words.is_empty() && words.iter().all(|w| is_video_term(w)) {
        return Some(Element::new(ElementCategory::VideoTerm, trimmed));
    }
    None
}

/// Take leading title words. Returns the joined title (if any) and how many
/// words were consumed.
fn take_title(words: &[String]) -> (Option<String>, usize) {
    let mut title: Vec<&str> = Vec::new();
    let mut consumed = 0;
    let mut after_separator = false;

    for word in words {
        if is_separator(word) {
            if title.is_empty() {
                after_separator = true;
                consumed += 1;
                continue;
            }
            break;
        }
        if is_video_term(word) || RE_EPISODE_MARKER.is_match(word) || RE_EPISODE_WORD.is_match(word)
        {
            break;
        }
        // A bare year after the title: `Show.Name.2019.1080p`.
        if !title.is_empty() && RE_YEAR.is_match(word) {
            break;
        }
        title.push(word);
        consumed += 1;
    }

    let joined = title.join(" ");
    let cleaned = joined
        .trim_matches(|c: char| c.is_whitespace() || matches!(c, ',' | '-' | '~' | '|'))
        .to_string();
    // " - 01" after a bracketed title is an episode number.
    if cleaned.is_empty() || (after_separator && RE_NUMBER.is_match(&cleaned)) {
        (None, consumed)
    } else {
        (Some(cleaned), consumed)
    }
}

fn is_separator(word: &str) -> bool {
    SEPARATORS.contains(&word)
}

fn is_video_term(word: &str) -> bool {
    let lower = word.to_lowercase();
    RE_RESOLUTION.is_match(&lower) || VIDEO_TERMS.contains(&lower.as_str())
}

fn extension_of(filename: &str) -> Option<usize> {
    let pos = filename.rfind('.')?;
    let ext = filename[pos + 1..].to_lowercase();
    if MEDIA_EXTENSIONS.contains(&ext.as_str()) {
        Some(pos)
    } else {
        None
    }
}

fn strip_extension(raw: &str) -> &str {
    match extension_of(raw) {
        Some(pos) => &raw[..pos],
        None => raw,
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
