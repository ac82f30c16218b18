use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use super::ExtractionOutcome;
use crate::corpus;
use crate::error::Result;

pub const REPORT_FILE: &str = "extraction_report.json";
const TOP_SCHOLARS: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionReport {
    pub extraction_stats: StatsSection,
    pub scholar_summary: BTreeMap<String, ScholarSummary>,
    pub successful_extractions: IndexMap<String, FileSummary>,
    pub failed_titles: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsSection {
    pub total_documents: usize,
    pub successful_extractions: usize,
    pub success_rate: f64,
    pub parse_failures: usize,
    pub empty_documents: usize,
    pub write_failures: usize,
    pub scholars_found: Vec<String>,
    pub tractates_found: Vec<String>,
    pub total_sections: usize,
    pub total_text_blocks: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScholarSummary {
    pub tractates: usize,
    pub text_blocks: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileSummary {
    pub sections: usize,
    pub text_blocks: usize,
    pub file_path: String,
}

impl ExtractionReport {
    pub fn from_outcome(outcome: &ExtractionOutcome) -> Self {
        let s = &outcome.stats;
        let mut scholar_summary: BTreeMap<String, ScholarSummary> = BTreeMap::new();
        for file in outcome.successful.values() {
            let entry = scholar_summary.entry(file.scholar.clone()).or_default();
            entry.tractates += 1;
            entry.text_blocks += file.text_blocks;
        }

        let successful_extractions = outcome
            .successful
            .iter()
            .map(|(title, f)| {
                (
                    title.clone(),
                    FileSummary {
                        sections: f.sections,
                        text_blocks: f.text_blocks,
                        file_path: f.file_path.display().to_string(),
                    },
                )
            })
            .collect();

        ExtractionReport {
            extraction_stats: StatsSection {
                total_documents: s.total_documents,
                successful_extractions: s.successful_extractions,
                success_rate: s.success_rate(),
                parse_failures: s.parse_failures,
                empty_documents: s.empty_documents,
                write_failures: s.write_failures,
                scholars_found: s.scholars_found.iter().cloned().collect(),
                tractates_found: s.tractates_found.iter().cloned().collect(),
                total_sections: s.total_sections,
                total_text_blocks: s.total_text_blocks,
            },
            scholar_summary,
            successful_extractions,
            failed_titles: outcome.failed_titles.clone(),
        }
    }

    pub fn write(&self, report_dir: &Path) -> Result<()> {
        corpus::write_json(&report_dir.join(REPORT_FILE), self)
    }

    /// The report left in `report_dir` by an earlier extract run, if any.
    pub fn read(report_dir: &Path) -> Result<Option<Self>> {
        let path = report_dir.join(REPORT_FILE);
        if !path.is_file() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&raw)?))
    }

    /// Scholars ordered by extracted tractates, most first; ties by name.
    pub fn top_scholars(&self, n: usize) -> Vec<(&str, &ScholarSummary)> {
        self.scholar_summary
            .iter()
            .sorted_by(|a, b| b.1.tractates.cmp(&a.1.tractates).then(a.0.cmp(b.0)))
            .take(n)
            .map(|(name, summary)| (name.as_str(), summary))
            .collect()
    }

    pub fn render(&self) -> String {
        let s = &self.extraction_stats;
        let mut out = String::new();
        out.push_str("## Extraction Report\n");
        out.push_str(&format!(
            "- Total documents processed: {}\n- Successful extractions: {}\n- Success rate: {:.1}%\n",
            s.total_documents, s.successful_extractions, s.success_rate
        ));
        out.push_str(&format!(
            "- Title parse failures: {}\n- Without Hebrew content: {}\n- Write failures: {}\n",
            s.parse_failures, s.empty_documents, s.write_failures
        ));
        out.push_str(&format!(
            "- Unique scholars found: {}\n- Tractates covered: {}\n",
            s.scholars_found.len(),
            s.tractates_found.len()
        ));
        out.push_str(&format!(
            "- Total sections extracted: {}\n- Total text blocks extracted: {}\n",
            s.total_sections, s.total_text_blocks
        ));

        out.push_str(&format!("\n### Top {} scholars by extractions\n", TOP_SCHOLARS));
        for (name, summary) in self.top_scholars(TOP_SCHOLARS) {
            out.push_str(&format!(
                "- {}: {} tractates, {} text blocks\n",
                name, summary.tractates, summary.text_blocks
            ));
        }
        out
    }
}
