//! Typed view over the metadata keys renderers understand.
//!
//! Nothing here affects parsing; unknown keys are ignored and unusable values
//! fall back to the default.

use crate::types::Metadata;
use indexmap::IndexMap;
use serde::Serialize;
use tracing::warn;

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct PageLayout {
    pub width: String,
    pub height: String,
    pub orientation: String,
    pub margin_left: String,
    pub margin_right: String,
    pub margin_top: String,
    pub margin_bottom: String,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            width: "210mm".to_string(),
            height: "297mm".to_string(),
            orientation: "portrait".to_string(),
            margin_left: "20mm".to_string(),
            margin_right: "20mm".to_string(),
            margin_top: "20mm".to_string(),
            margin_bottom: "20mm".to_string(),
        }
    }
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct Template {
    pub language: String,
    pub author: Option<String>,
    pub year: Option<String>,
    pub characters_sorted: bool,
    pub break_after_act: bool,
    pub direction_open: String,
    pub direction_close: String,
    pub font_family: String,
    pub font_size: u32,
    pub page: PageLayout,
}

impl Default for Template {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            author: None,
            year: None,
            characters_sorted: false,
            break_after_act: false,
            direction_open: "(".to_string(),
            direction_close: ")".to_string(),
            font_family: "Times New Roman".to_string(),
            font_size: 12,
            page: PageLayout::default(),
        }
    }
}

impl Template {
    pub fn from_metadata(metadata: &IndexMap<String, Metadata>) -> Self {
        let mut template = Self::default();
        for (key, entry) in metadata {
            let value = entry.value.trim();
            match key.as_str() {
                "language" => template.language = value.to_string(),
                "author" => template.author = Some(value.to_string()),
                "year" => template.year = Some(value.to_string()),
                "characters-sorted" => set_flag(&mut template.characters_sorted, entry),
                "break-after-act" => set_flag(&mut template.break_after_act, entry),
                "direction-open" => template.direction_open = entry.value.clone(),
                "direction-close" => template.direction_close = entry.value.clone(),
                "font-family" => template.font_family = value.to_string(),
                "font-size" => match value.parse::<u32>() {
                    Ok(size) if size > 0 => template.font_size = size,
                    _ => unusable(entry),
                },
                "page-width" => template.page.width = value.to_string(),
                "page-height" => template.page.height = value.to_string(),
                "page-orientation" => template.page.orientation = value.to_string(),
                "page-margin-left" => template.page.margin_left = value.to_string(),
                "page-margin-right" => template.page.margin_right = value.to_string(),
                "page-margin-top" => template.page.margin_top = value.to_string(),
                "page-margin-bottom" => template.page.margin_bottom = value.to_string(),
                _ => {}
            }
        }
        template
    }
}

fn set_flag(flag: &mut bool, entry: &Metadata) {
    match parse_flag(&entry.value) {
        Some(v) => *flag = v,
        None => unusable(entry),
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

fn unusable(entry: &Metadata) {
    warn!(
        location = %entry.context,
        key = %entry.key,
        value = %entry.value,
        "Unusable template value, keeping the default"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Context;

    fn meta(pairs: &[(&str, &str)]) -> IndexMap<String, Metadata> {
        pairs
            .iter()
            .enumerate()
            .map(|(i, (k, v))| {
                (
                    k.to_string(),
                    Metadata {
                        key: k.to_string(),
                        value: v.to_string(),
                        context: Context::new("play.stage", i + 1),
                    },
                )
            })
            .collect()
    }

    #[test]
    fn test_defaults() {
        let template = Template::from_metadata(&IndexMap::new());
        assert_eq!(template, Template::default());
        assert_eq!(template.page.height, "297mm");
    }

    #[test]
    fn test_recognized_keys() {
        let template = Template::from_metadata(&meta(&[
            ("language", "cs"),
            ("author", "Karel"),
            ("characters-sorted", "Yes"),
            ("break-after-act", "off"),
            ("direction-open", "["),
            ("font-size", "14"),
            ("page-margin-top", "25mm"),
            ("unrelated", "x"),
        ]));
        assert_eq!(template.language, "cs");
        assert_eq!(template.author.as_deref(), Some("Karel"));
        assert!(template.characters_sorted);
        assert!(!template.break_after_act);
        assert_eq!(template.direction_open, "[");
        assert_eq!(template.direction_close, ")");
        assert_eq!(template.font_size, 14);
        assert_eq!(template.page.margin_top, "25mm");
    }

    #[test]
    fn test_unusable_values_keep_defaults() {
        let template = Template::from_metadata(&meta(&[
            ("characters-sorted", "maybe"),
            ("font-size", "large"),
        ]));
        assert!(!template.characters_sorted);
        assert_eq!(template.font_size, 12);
    }
}
