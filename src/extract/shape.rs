use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::text::is_target_script_value;

/// `section_key -> text blocks`, in source order.
pub type ContentMap = IndexMap<String, Vec<String>>;

/// The two chapter layouts found in the store, plus everything else.
#[derive(Debug, Clone, Copy)]
pub enum ChapterShape<'a> {
    /// List of sections, each a list of text blocks (Rashi, Tosafot).
    Ordered(&'a [Value]),
    /// Sections keyed by daf or label (Meiri).
    Keyed(&'a Map<String, Value>),
    Other,
}

impl<'a> From<&'a Value> for ChapterShape<'a> {
    fn from(value: &'a Value) -> Self {
        match value {
            Value::Array(items) => ChapterShape::Ordered(items),
            Value::Object(map) => ChapterShape::Keyed(map),
            _ => ChapterShape::Other,
        }
    }
}

pub fn normalize(chapter: &Value) -> ContentMap {
    normalize_shape(ChapterShape::from(chapter))
}

pub fn normalize_shape(shape: ChapterShape<'_>) -> ContentMap {
    let mut out = ContentMap::new();
    match shape {
        ChapterShape::Ordered(sections) => {
            for (i, section) in sections.iter().enumerate() {
                if let Some(blocks) = filter_section(section) {
                    out.insert(format!("section_{}", i + 1), blocks);
                }
            }
        }
        ChapterShape::Keyed(sections) => {
            for (key, section) in sections {
                if let Some(blocks) = filter_section(section) {
                    out.insert(key.clone(), blocks);
                }
            }
        }
        ChapterShape::Other => {}
    }
    out
}

/// Hebrew string blocks of a section, or None if the section is not a
/// non-empty list or nothing survives the filter.
fn filter_section(section: &Value) -> Option<Vec<String>> {
    let items = section.as_array().filter(|a| !a.is_empty())?;
    let blocks: Vec<String> = items
        .iter()
        .filter(|v| is_target_script_value(v))
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect();
    if blocks.is_empty() {
        None
    } else {
        Some(blocks)
    }
}

pub fn text_block_count(content: &ContentMap) -> usize {
    content.values().map(Vec::len).sum()
}
