//! Lexical grammar of the play markup.
//!
//! Every pattern is matched against a single physical line with the line
//! terminator removed. Multi-line dialogue bodies are assembled by the line
//! scanner, which uses [`is_boundary`] to decide where a body stops.

use once_cell::sync::Lazy;
use regex::Regex;

pub(crate) static FUNCTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/(?P<name>\w+)(?:\s(?P<arguments>.*))?$").unwrap());

pub(crate) static PLAY_TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#\s?(?P<title>[^#]*)$").unwrap());

pub(crate) static ACT_TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^##\s?(?P<title>[^#]*)$").unwrap());

pub(crate) static SCENE_TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^###\s?(?P<title>[^#]*)$").unwrap());

pub(crate) static METADATA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<key>[a-zA-Z0-9_\-]+):\s?(?P<value>.*)$").unwrap());

pub(crate) static STAGE_DIRECTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^>[ \t](?P<text>.*)$").unwrap());

pub(crate) static DIALOGUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<speakers>@[a-zA-Z0-9]+(?:,\s?@[a-zA-Z0-9]+)*):[ \t]?(?P<text>.*)$").unwrap()
});

static DIALOGUE_OPENER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^@[a-zA-Z0-9]+(?:,\s?@[a-zA-Z0-9]+)*:").unwrap());

pub(crate) const COMMENT_PREFIX: char = '%';

pub(crate) fn is_comment(line: &str) -> bool {
    line.starts_with(COMMENT_PREFIX)
}

/// Whether `line` starts a new unit and therefore ends a running dialogue body.
pub(crate) fn is_boundary(line: &str) -> bool {
    if line.starts_with('#') || line.starts_with('/') || is_comment(line) {
        return true;
    }
    if let Some(rest) = line.strip_prefix('>') {
        if rest.starts_with(|c: char| c.is_whitespace()) {
            return true;
        }
    }
    DIALOGUE_OPENER.is_match(line)
}
