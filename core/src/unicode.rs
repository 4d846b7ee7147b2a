//! Code-point-level Unicode utilities: normalization, emoji detection,
//! n-gram windowing, and fast hashing.
//!
//! All functions here operate on code points, not UTF-8 bytes, except
//! where a byte offset is explicitly part of the contract (see
//! `text_index.rs`).

use std::sync::OnceLock;

use ahash::AHasher;
use std::hash::{Hash, Hasher};
use unicode_general_category::{get_general_category, GeneralCategory};
use unicode_normalization::UnicodeNormalization;

/// Unicode normalization form selected for a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Form {
    /// NFC: composes characters, keeps compatibility variants distinct.
    Canonical,
    /// NFKC: composes and folds compatibility equivalents.
    Compatibility,
}

/// Characters that count as "emoji" for `emoji_only` purposes even
/// though they carry no `Emoji` property of their own: zero-width
/// joiner, emoji variation selector, combining enclosing keycap.
const EMOJI_JOINERS: [char; 3] = ['\u{200D}', '\u{FE0F}', '\u{20E3}'];

/// Returns true once, on first call, guarding any process-wide lookup
/// table initialization a future revision of this module might add.
/// Present so the one-shot-initializer invariant (global Unicode state
/// must serialize N concurrent first callers) has a concrete home;
/// today no lazily-built table is needed, so this simply marks the
/// guard as satisfied.
static INIT: OnceLock<()> = OnceLock::new();

fn ensure_init() {
    INIT.get_or_init(|| ());
}

/// Normalizes a single line per §4.A: rejects whitespace-only, single
/// code point, or (tab-free) emoji-only lines; otherwise normalizes
/// each tab-delimited field independently and rejoins with U+0009.
///
/// Never fails on malformed UTF-8: `&str` inputs are already valid
/// UTF-8 by construction, and the Rust standard replacement-character
/// behavior applies only at the byte-decoding boundary, which callers
/// are expected to have crossed (e.g. via `String::from_utf8_lossy`)
/// before calling this function.
pub fn normalize_line(line: &str, form: Form) -> Option<String> {
    ensure_init();

    if line.is_empty() {
        return None;
    }
    if line.chars().all(char::is_whitespace) {
        return None;
    }
    if line.chars().count() <= 1 {
        return None;
    }
    if !line.contains('\t') && emoji_only(line) {
        return None;
    }

    let fields: Vec<String> = line.split('\t').map(|f| normalize_field(f, form)).collect();
    let result = fields.join("\t");

    if result.is_empty() || result.chars().count() < 2 {
        return None;
    }
    Some(result)
}

fn normalize_field(field: &str, form: Form) -> String {
    let composed: String = match form {
        Form::Canonical => field.nfc().collect(),
        Form::Compatibility => field.nfkc().collect(),
    };

    let stripped: String = composed.chars().filter(|c| !is_control_or_format(*c)).collect();

    if form == Form::Compatibility && !stripped.chars().any(|c| c.is_ascii_digit() || c.is_numeric())
    {
        stripped.to_lowercase()
    } else {
        stripped
    }
}

fn is_control_or_format(c: char) -> bool {
    matches!(
        get_general_category(c),
        GeneralCategory::Control | GeneralCategory::Format
    )
}

/// True when every non-whitespace, non-punctuation code point in
/// `line` is an emoji (by Unicode `Emoji` property, a well-known emoji
/// range, or a joining/variation-selector/keycap character) and at
/// least one genuine emoji was observed.
pub fn emoji_only(line: &str) -> bool {
    let mut saw_emoji = false;
    for c in line.chars() {
        if c.is_whitespace() || is_punctuation(c) {
            continue;
        }
        if EMOJI_JOINERS.contains(&c) {
            continue;
        }
        if is_emoji_char(c) {
            saw_emoji = true;
            continue;
        }
        return false;
    }
    saw_emoji
}

fn is_punctuation(c: char) -> bool {
    matches!(
        get_general_category(c),
        GeneralCategory::ConnectorPunctuation
            | GeneralCategory::DashPunctuation
            | GeneralCategory::OpenPunctuation
            | GeneralCategory::ClosePunctuation
            | GeneralCategory::InitialPunctuation
            | GeneralCategory::FinalPunctuation
            | GeneralCategory::OtherPunctuation
    )
}

fn is_emoji_char(c: char) -> bool {
    if let Some(emoji) = emojis::get(&c.to_string()) {
        return emoji.as_str().chars().count() == 1 || emoji.as_str() == c.to_string();
    }
    is_well_known_emoji_range(c)
}

/// Well-known emoji code point blocks, used as a fallback for code
/// points the `emojis` crate's lookup table (which is keyed on
/// fully-formed emoji strings, not bare code points) does not
/// recognize in isolation.
fn is_well_known_emoji_range(c: char) -> bool {
    let cp = c as u32;
    matches!(cp,
        0x1F300..=0x1FAFF // misc symbols/pictographs through symbols-extended
        | 0x2600..=0x27BF // misc symbols, dingbats
        | 0x1F1E6..=0x1F1FF // regional indicators
        | 0x2300..=0x23FF // misc technical (contains some emoji like watch, hourglass)
    )
}

/// Produces every contiguous code-point window of length `n` within
/// `text`, never crossing a U+000A line boundary. Returns an empty
/// vector if every line has fewer than `n` code points.
pub fn generate_ngrams(text: &str, n: usize) -> Vec<String> {
    if n == 0 {
        return Vec::new();
    }
    let mut out = Vec::new();
    for line in text.split('\n') {
        let chars: Vec<char> = line.chars().collect();
        if chars.len() < n {
            continue;
        }
        for window in chars.windows(n) {
            out.push(window.iter().collect());
        }
    }
    out
}

/// A fast, non-cryptographic 64-bit hash of `text`'s UTF-8 bytes, used
/// only for dedup-oracle membership acceleration — never for content
/// addressing or security purposes.
pub fn hash(text: &str) -> u64 {
    let mut hasher = AHasher::default();
    text.hash(&mut hasher);
    hasher.finish()
}
