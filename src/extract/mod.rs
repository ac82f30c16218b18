pub mod report;
pub mod shape;
pub mod title;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use crate::corpus;
use crate::error::Result;
use crate::store::{Document, DocumentStore, TitleQuery};
use shape::{normalize, text_block_count};
use title::CommentaryEntry;

/// Running counters for one extraction batch.
#[derive(Debug, Clone, Default)]
pub struct ExtractionStats {
    pub total_documents: usize,
    pub successful_extractions: usize,
    pub parse_failures: usize,
    pub empty_documents: usize,
    pub write_failures: usize,
    pub scholars_found: BTreeSet<String>,
    pub tractates_found: BTreeSet<String>,
    pub total_sections: usize,
    pub total_text_blocks: usize,
}

impl ExtractionStats {
    /// Percentage of documents written, one decimal; 0 for an empty batch.
    pub fn success_rate(&self) -> f64 {
        if self.total_documents == 0 {
            return 0.0;
        }
        let pct = self.successful_extractions as f64 / self.total_documents as f64 * 100.0;
        (pct * 10.0).round() / 10.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedFile {
    pub scholar: String,
    pub tractate: String,
    pub sections: usize,
    pub text_blocks: usize,
    pub file_path: PathBuf,
}

#[derive(Debug, Clone, Default)]
pub struct ExtractionOutcome {
    pub stats: ExtractionStats,
    /// Keyed by document title; a repeated title keeps the last write.
    pub successful: IndexMap<String, ExtractedFile>,
    pub failed_titles: Vec<String>,
}

pub struct Extractor {
    corpus_root: PathBuf,
    show_progress: bool,
}

impl Extractor {
    pub fn new(corpus_root: impl Into<PathBuf>) -> Self {
        Extractor {
            corpus_root: corpus_root.into(),
            show_progress: false,
        }
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn corpus_root(&self) -> &Path {
        &self.corpus_root
    }

    /// Query the store and extract everything it returns. Only a failing
    /// store query is an error; per-document problems are counted.
    pub fn run(&self, store: &dyn DocumentStore, query: &TitleQuery) -> Result<ExtractionOutcome> {
        let docs = store.find(query)?;
        info!("Found {} commentary documents", docs.len());
        Ok(self.extract_all(&docs))
    }

    pub fn extract_all(&self, docs: &[Document]) -> ExtractionOutcome {
        let mut outcome = ExtractionOutcome::default();
        outcome.stats.total_documents = docs.len();

        let pb = self.progress_bar(docs.len());
        for doc in docs {
            self.extract_one(doc, &mut outcome);
            pb.inc(1);
        }
        pb.finish_and_clear();

        info!(
            "Extracted {} of {} documents ({} parse failures, {} without Hebrew content)",
            outcome.stats.successful_extractions,
            outcome.stats.total_documents,
            outcome.stats.parse_failures,
            outcome.stats.empty_documents
        );
        outcome
    }

    fn extract_one(&self, doc: &Document, outcome: &mut ExtractionOutcome) {
        let stats = &mut outcome.stats;
        let entry = match CommentaryEntry::parse(&doc.title) {
            Ok(e) => e,
            Err(e) => {
                warn!("{}", e);
                stats.parse_failures += 1;
                outcome.failed_titles.push(doc.title.clone());
                return;
            }
        };
        stats.scholars_found.insert(entry.scholar.clone());
        stats.tractates_found.insert(entry.tractate.clone());

        let content = normalize(&doc.chapter);
        if content.is_empty() {
            debug!("No Hebrew content in '{}'", doc.title);
            stats.empty_documents += 1;
            return;
        }

        let file_path = match corpus::write_file(&self.corpus_root, &entry, &content) {
            Ok(p) => p,
            Err(e) => {
                warn!("Failed to write '{}': {}", doc.title, e);
                stats.write_failures += 1;
                return;
            }
        };

        let sections = content.len();
        let text_blocks = text_block_count(&content);
        stats.total_sections += sections;
        stats.total_text_blocks += text_blocks;
        stats.successful_extractions += 1;
        debug!("{}: {} sections, {} text blocks", doc.title, sections, text_blocks);

        outcome.successful.insert(
            doc.title.clone(),
            ExtractedFile {
                scholar: entry.scholar,
                tractate: entry.tractate,
                sections,
                text_blocks,
                file_path,
            },
        );
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(len as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")
        {
            pb.set_style(style.progress_chars("=> "));
        }
        pb
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::{json, Value};
    use std::fs;
    use tempfile::tempdir;

    fn doc(title: &str, chapter: Value) -> Document {
        Document {
            id: None,
            title: title.to_string(),
            language: "he".to_string(),
            chapter,
        }
    }

    #[test]
    fn end_to_end_single_document() {
        let dir = tempdir().unwrap();
        let out = Extractor::new(dir.path()).extract_all(&[doc(
            "Rashi on Berakhot",
            json!([["א ב ג"], ["HTML<x>ignored</x> ד"]]),
        )]);

        assert_eq!(out.stats.successful_extractions, 1);
        assert_eq!(out.stats.total_sections, 2);
        assert_eq!(out.stats.total_text_blocks, 2);

        let path = dir.path().join("Rashi/Berakhot.json");
        let file = corpus::read_file(&path).unwrap();
        assert_eq!(file["Rashi_on_Berakhot.section_1"], json!(["א ב ג"]));
        assert_eq!(
            file["Rashi_on_Berakhot.section_2"],
            json!(["HTML<x>ignored</x> ד"])
        );
        assert_eq!(out.successful["Rashi on Berakhot"].file_path, path);
    }

    #[test]
    fn parse_failures_are_counted_and_skipped() {
        let dir = tempdir().unwrap();
        let out = Extractor::new(dir.path()).extract_all(&[
            doc("Berakhot", json!([["א"]])),
            doc("Notes on Rashi on Yoma", json!([["א"]])),
            doc("Ran on Nedarim", json!([["ב"]])),
        ]);
        assert_eq!(out.stats.total_documents, 3);
        assert_eq!(out.stats.parse_failures, 2);
        assert_eq!(out.stats.successful_extractions, 1);
        assert_eq!(out.failed_titles, vec!["Berakhot", "Notes on Rashi on Yoma"]);
        assert!(!dir.path().join("Notes_on_Rashi").exists());
    }

    #[test]
    fn empty_content_writes_nothing() {
        let dir = tempdir().unwrap();
        let out = Extractor::new(dir.path()).extract_all(&[
            doc("Rashi on Yoma", json!([["English"], []])),
            doc("Meiri on Yoma", json!("not a chapter")),
        ]);
        assert_eq!(out.stats.successful_extractions, 0);
        assert_eq!(out.stats.empty_documents, 2);
        // parsed titles still register their scholar and tractate
        assert_eq!(out.stats.scholars_found.len(), 2);
        assert_eq!(out.stats.tractates_found.len(), 1);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn idempotent_output() {
        let dir = tempdir().unwrap();
        let docs = vec![
            doc("Rashi on Berakhot", json!([["א", "ב"], ["ג"]])),
            doc("Meiri on Bava Batra", json!({"2a": ["ד"], "2b": ["ה ו"]})),
        ];
        let ex = Extractor::new(dir.path());
        ex.extract_all(&docs);
        let a1 = fs::read(dir.path().join("Rashi/Berakhot.json")).unwrap();
        let b1 = fs::read(dir.path().join("Meiri/Bava Batra.json")).unwrap();
        ex.extract_all(&docs);
        let a2 = fs::read(dir.path().join("Rashi/Berakhot.json")).unwrap();
        let b2 = fs::read(dir.path().join("Meiri/Bava Batra.json")).unwrap();
        assert_eq!(a1, a2);
        assert_eq!(b1, b2);
    }

    #[test]
    fn keyed_chapter_keys_pass_through() {
        let dir = tempdir().unwrap();
        Extractor::new(dir.path()).extract_all(&[doc(
            "Meiri on Bava Batra",
            json!({"2a": ["ד"], "2b": []}),
        )]);
        let file = corpus::read_file(&dir.path().join("Meiri/Bava Batra.json")).unwrap();
        let keys: Vec<&String> = file.keys().collect();
        assert_eq!(keys, vec!["Meiri_on_Bava Batra.2a"]);
    }

    #[test]
    fn write_failure_does_not_abort_batch() {
        let dir = tempdir().unwrap();
        // a plain file where the scholar directory should go
        fs::write(dir.path().join("Rashi"), "blocker").unwrap();
        let out = Extractor::new(dir.path()).extract_all(&[
            doc("Rashi on Yoma", json!([["א"]])),
            doc("Ran on Yoma", json!([["ב"]])),
        ]);
        assert_eq!(out.stats.write_failures, 1);
        assert_eq!(out.stats.successful_extractions, 1);
        assert!(dir.path().join("Ran/Yoma.json").exists());
    }

    #[test]
    fn titles_never_leave_corpus_root() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("corpus");
        let out = Extractor::new(&root).extract_all(&[
            doc("Rif/Rosh on Berakhot", json!([["א"]])),
            doc("../escaped on Yoma", json!([["ב"]])),
            doc("Rashi on Yoma", json!([["ג ד"]])),
        ]);
        assert_eq!(out.stats.parse_failures, 2);
        assert_eq!(out.stats.successful_extractions, 1);
        assert!(!dir.path().join("escaped").exists());
        assert!(!root.join("Rif").exists());

        // every successful extraction is visible to the aggregator
        let b = crate::analysis::aggregate(&root, &Default::default()).unwrap();
        assert_eq!(b.totals.files, out.stats.successful_extractions);
        assert_eq!(b.totals.words, 2);
    }

    #[test]
    fn run_queries_store() {
        let dir = tempdir().unwrap();
        let store = MemoryStore::new(vec![
            doc("Rashi on Berakhot", json!([["א"]])),
            doc("Rashi on Genesis", json!([["א"]])),
        ]);
        let q = TitleQuery::talmud("he").unwrap();
        let out = Extractor::new(dir.path()).run(&store, &q).unwrap();
        assert_eq!(out.stats.total_documents, 1);
        assert!(dir.path().join("Rashi/Berakhot.json").exists());
        assert!(!dir.path().join("Rashi/Genesis.json").exists());
    }

    #[test]
    fn success_rate_rounding() {
        let stats = ExtractionStats {
            total_documents: 3,
            successful_extractions: 2,
            ..Default::default()
        };
        assert_eq!(stats.success_rate(), 66.7);
        assert_eq!(ExtractionStats::default().success_rate(), 0.0);
    }
}
