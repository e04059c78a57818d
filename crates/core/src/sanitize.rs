use crate::replacement::{apply_replacements, ReplacementRule};
use serde::{Deserialize, Serialize};

/// Stem used when nothing usable survives sanitizing.
pub const DEFAULT_STEM: &str = "untitled";
/// Appended to a stem that collides with a reserved device name.
pub const RESERVED_SUFFIX: &str = "_file";
/// Longest path component, in bytes, that common filesystems accept.
pub const MAX_NAME_BYTES: usize = 255;

const WINDOWS_RESERVED_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

const UNIVERSAL_ILLEGAL_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

#[cfg(windows)]
const HOST_ILLEGAL_CHARS: &[char] = UNIVERSAL_ILLEGAL_CHARS;
#[cfg(target_os = "macos")]
const HOST_ILLEGAL_CHARS: &[char] = &['/', ':'];
#[cfg(not(any(windows, target_os = "macos")))]
const HOST_ILLEGAL_CHARS: &[char] = &['/'];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformMode {
    /// Only what the host filesystem rejects.
    #[default]
    Auto,
    /// Everything any supported filesystem rejects; enables strict-only rules.
    Universal,
}

impl PlatformMode {
    pub fn is_strict(self) -> bool {
        self == PlatformMode::Universal
    }

    fn illegal_chars(self) -> &'static [char] {
        match self {
            PlatformMode::Auto => HOST_ILLEGAL_CHARS,
            PlatformMode::Universal => UNIVERSAL_ILLEGAL_CHARS,
        }
    }
}

/// Turns one rendered path component into a legal, non-empty stem whose
/// length plus `extension` fits in `max_bytes`.
pub fn sanitize_filename(
    raw: &str,
    mode: PlatformMode,
    literal_rules: &[ReplacementRule],
    extension: &str,
    max_bytes: usize,
) -> String {
    let replaced = apply_replacements(literal_rules, raw, mode.is_strict());
    let cleaned = replace_illegal_chars(&replaced, mode);
    let mut out = trim_trailing(&cleaned).to_string();

    if is_reserved_name(&out) {
        tracing::debug!(name = %out, "reserved device name disambiguated");
        let base_end = out.find('.').unwrap_or(out.len());
        out.insert_str(base_end, RESERVED_SUFFIX);
    }

    let out = truncate_stem(&out, extension, max_bytes);
    if out.is_empty() {
        DEFAULT_STEM.to_string()
    } else {
        out
    }
}

/// Replaces every character illegal under `mode` with a space and collapses
/// the resulting whitespace runs.
pub fn replace_illegal_chars(value: &str, mode: PlatformMode) -> String {
    let illegal = mode.illegal_chars();
    let replaced: String = value
        .chars()
        .map(|ch| {
            if ch.is_control() || illegal.contains(&ch) {
                ' '
            } else {
                ch
            }
        })
        .collect();
    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cuts the stem on a char boundary so that stem and extension together
/// fit in `max_bytes`. A stem is never cut to nothing.
pub fn truncate_stem(stem: &str, extension: &str, max_bytes: usize) -> String {
    if stem.len() + extension.len() <= max_bytes {
        return stem.to_string();
    }

    let mut end = max_bytes.saturating_sub(extension.len()).min(stem.len());
    while !stem.is_char_boundary(end) {
        end -= 1;
    }
    let truncated = trim_trailing(&stem[..end]);
    tracing::debug!(
        from = stem.len(),
        to = truncated.len(),
        "filename truncated to fit length limit"
    );

    if truncated.is_empty() {
        stem.chars().next().map(String::from).unwrap_or_default()
    } else {
        truncated.to_string()
    }
}

fn trim_trailing(value: &str) -> &str {
    value.trim_end_matches(|c: char| c == '.' || c == ' ')
}

fn is_reserved_name(value: &str) -> bool {
    let stem = value
        .split('.')
        .next()
        .unwrap_or(value)
        .to_ascii_uppercase();
    WINDOWS_RESERVED_NAMES
        .iter()
        .any(|reserved| reserved == &stem)
}
