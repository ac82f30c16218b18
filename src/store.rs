//! Document store capability: the extractor only needs `find`.

use std::io::BufRead;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::Result;

/// Babylonian Talmud tractates selected by the default query.
pub const BAVLI_TRACTATES: [&str; 36] = [
    "Berakhot", "Shabbat", "Eruvin", "Pesachim", "Yoma", "Sukkah",
    "Beitzah", "Rosh Hashanah", "Taanit", "Megillah", "Moed Katan",
    "Chagigah", "Yevamot", "Ketubot", "Nedarim", "Nazir", "Sotah",
    "Gittin", "Kiddushin", "Bava Kamma", "Bava Metzia", "Bava Batra",
    "Sanhedrin", "Makkot", "Shevuot", "Avodah Zarah", "Horayot",
    "Zevachim", "Menachot", "Chullin", "Bekhorot", "Arakhin",
    "Temurah", "Keritot", "Meilah", "Niddah",
];

/// One text record as read from the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub id: Option<i64>,
    pub title: String,
    pub language: String,
    #[serde(default)]
    pub chapter: Value,
}

/// `<scholar> on <tractate>` title pattern (case-insensitive) plus an exact
/// language tag.
#[derive(Debug, Clone)]
pub struct TitleQuery {
    pattern: Regex,
    language: String,
}

impl TitleQuery {
    pub fn new<S: AsRef<str>>(tractates: &[S], language: &str) -> Result<Self> {
        let alternatives: Vec<String> = tractates
            .iter()
            .map(|t| regex::escape(t.as_ref()))
            .collect();
        let pattern = Regex::new(&format!(r"(?i)^(.+) on ({})$", alternatives.join("|")))?;
        Ok(TitleQuery {
            pattern,
            language: language.to_string(),
        })
    }

    pub fn talmud(language: &str) -> Result<Self> {
        Self::new(&BAVLI_TRACTATES, language)
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn matches_title(&self, title: &str) -> bool {
        self.pattern.is_match(title)
    }

    #[cfg(test)]
    pub fn matches(&self, doc: &Document) -> bool {
        doc.language == self.language && self.matches_title(&doc.title)
    }
}

pub trait DocumentStore {
    fn find(&self, query: &TitleQuery) -> Result<Vec<Document>>;
}

/// Vec-backed store for tests.
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    docs: Vec<Document>,
}

#[cfg(test)]
impl MemoryStore {
    pub fn new(docs: Vec<Document>) -> Self {
        MemoryStore { docs }
    }
}

#[cfg(test)]
impl DocumentStore for MemoryStore {
    fn find(&self, query: &TitleQuery) -> Result<Vec<Document>> {
        Ok(self
            .docs
            .iter()
            .filter(|d| query.matches(d))
            .cloned()
            .collect())
    }
}

/// Reads a JSON-lines dump, one document per line. Blank lines are ignored;
/// lines that do not parse are logged and counted in the second value.
pub fn read_jsonl<R: BufRead>(reader: R) -> Result<(Vec<Document>, usize)> {
    let mut docs = Vec::new();
    let mut malformed = 0;
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<Document>(&line) {
            Ok(doc) => docs.push(doc),
            Err(e) => {
                warn!("Line {}: {}", i + 1, e);
                malformed += 1;
            }
        }
    }
    Ok((docs, malformed))
}
