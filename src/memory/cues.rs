//! Cue extraction: the retrieval index terms of an engram.
//!
//! [`extract`] unions a handful of independent passes over the content and the
//! optional mind-map schema. Every pass is pure and lowercases its output, so
//! the cue set of an engram is a function of its text alone and is simply
//! recomputed on every write.

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

macro_rules! cached_regex {
    ($name:ident, $pattern:expr) => {
        fn $name() -> &'static Regex {
            static RE: OnceLock<Regex> = OnceLock::new();
            RE.get_or_init(|| Regex::new($pattern).expect("valid cue pattern"))
        }
    };
}

// CJK unified ideographs, U+4E00..=U+9FA5.
cached_regex!(cjk_run_re, "[\u{4e00}-\u{9fa5}]{2,8}");
cached_regex!(latin_run_re, r"[A-Za-z][A-Za-z0-9]*");
cached_regex!(
    mixed_run_re,
    "[A-Za-z]+[\u{4e00}-\u{9fa5}]+|[\u{4e00}-\u{9fa5}]+[A-Za-z]+"
);
cached_regex!(delimiter_re, r"[\s,，。.!！?？;；:：、()（）\[\]【】{}｛｝]+");
cached_regex!(strength_annotation_re, r"\s*\[[\d.]+\]\s*$");
cached_regex!(root_line_re, r"^root\s*[(\[{]+\s*(.*?)\s*[)\]}]+$");

/// Full cue set for an engram.
pub fn extract(content: &str, schema: Option<&str>) -> BTreeSet<String> {
    let mut cues = BTreeSet::new();
    cues.extend(full_content(content));
    cues.extend(cjk_runs(content));
    cues.extend(latin_runs(content));
    cues.extend(mixed_runs(content));
    cues.extend(delimited_tokens(content));
    if let Some(schema) = schema {
        cues.extend(schema_cues(schema));
    }
    tracing::trace!(count = cues.len(), "extracted cues");
    cues
}

/// The whole content as one cue, for exact-phrase matching.
pub fn full_content(content: &str) -> Option<String> {
    let trimmed = content.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_lowercase())
}

/// Runs of 2–8 CJK characters, taken left to right without overlap.
pub fn cjk_runs(content: &str) -> Vec<String> {
    matches(cjk_run_re(), content)
}

/// Latin words: a letter followed by letters or digits.
pub fn latin_runs(content: &str) -> Vec<String> {
    matches(latin_run_re(), content)
}

/// Latin letters glued to CJK characters (either order), kept whole.
pub fn mixed_runs(content: &str) -> Vec<String> {
    matches(mixed_run_re(), content)
}

/// Tokens between punctuation/whitespace delimiters, longer than one char.
pub fn delimited_tokens(content: &str) -> Vec<String> {
    delimiter_re()
        .split(&content.to_lowercase())
        .filter(|token| token.chars().count() > 1)
        .map(str::to_string)
        .collect()
}

/// Cues from a newline-delimited mind-map outline.
///
/// The `mindmap` declaration is skipped; a `root((label))` line contributes
/// only its label. Every other line contributes the phrase left after
/// removing indentation and a trailing `[0.8]`-style strength annotation,
/// plus each of its whitespace-separated words longer than one char.
pub fn schema_cues(schema: &str) -> Vec<String> {
    let mut cues = Vec::new();
    for line in schema.lines() {
        let line = line.trim();
        if line.is_empty() || line.eq_ignore_ascii_case("mindmap") {
            continue;
        }

        if let Some(caps) = root_line_re().captures(line) {
            let label = caps[1].trim();
            if !label.is_empty() {
                cues.push(label.to_lowercase());
            }
            continue;
        }

        let phrase = strength_annotation_re().replace(line, "");
        let phrase = phrase.trim();
        if phrase.is_empty() {
            continue;
        }
        let phrase = phrase.to_lowercase();

        if phrase.contains(char::is_whitespace) {
            cues.extend(
                phrase
                    .split_whitespace()
                    .filter(|word| word.chars().count() > 1)
                    .map(str::to_string),
            );
        }
        cues.push(phrase);
    }
    cues
}

fn matches(re: &Regex, text: &str) -> Vec<String> {
    re.find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .collect()
}
