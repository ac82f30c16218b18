use std::path::Path;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use tracing::{debug, warn};

use super::{StatisticsBundle, Totals};
use crate::corpus;
use crate::error::Result;
use crate::extract::report::ExtractionReport;

pub const REPORT_FILE: &str = "comprehensive_analysis_report.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    pub generated_at: String,
    pub corpus_root: String,
    pub tool_version: String,
    pub totals: Totals,
    /// Success rate of the last extract run writing to the same report dir.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extraction_success_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub analysis_metadata: AnalysisMetadata,
    #[serde(flatten)]
    pub bundle: StatisticsBundle,
}

impl AnalysisReport {
    pub fn new(corpus_root: &Path, bundle: StatisticsBundle) -> Self {
        AnalysisReport {
            analysis_metadata: AnalysisMetadata {
                generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
                corpus_root: corpus_root.display().to_string(),
                tool_version: env!("CARGO_PKG_VERSION").to_string(),
                totals: bundle.totals.clone(),
                extraction_success_rate: None,
            },
            bundle,
        }
    }

    /// Picks up the success rate from `extraction_report.json` in
    /// `report_dir`. A missing or unreadable report leaves it unset.
    pub fn with_extraction(mut self, report_dir: &Path) -> Self {
        match ExtractionReport::read(report_dir) {
            Ok(Some(r)) => {
                self.analysis_metadata.extraction_success_rate =
                    Some(r.extraction_stats.success_rate);
            }
            Ok(None) => debug!("No extraction report in {}", report_dir.display()),
            Err(e) => warn!("Ignoring unreadable extraction report: {}", e),
        }
        self
    }

    pub fn write(&self, report_dir: &Path) -> Result<()> {
        corpus::write_json(&report_dir.join(REPORT_FILE), self)
    }

    pub fn render(&self) -> String {
        let b = &self.bundle;
        let t = &b.totals;
        let mut out = String::new();

        out.push_str("## Corpus Analysis\n");
        out.push_str(&format!(
            "- Scholars: {}\n- Tractates: {}\n- Files: {} ({} skipped)\n- Words: {}\n",
            t.scholars, t.tractates, t.files, t.skipped_files, t.words
        ));
        out.push_str(&format!(
            "- Sections: {}\n- Text blocks: {}\n",
            t.sections, t.text_blocks
        ));
        if let Some(rate) = self.analysis_metadata.extraction_success_rate {
            out.push_str(&format!("- Extraction success rate: {:.1}%\n", rate));
        }

        let v = &b.volume_averages;
        out.push_str(&format!(
            "- Avg words per scholar: {:.0}\n- Avg words per tractate: {:.0}\n- Avg words per section: {:.1}\n",
            v.words_per_scholar, v.words_per_tractate, v.words_per_section
        ));

        out.push_str("\n### Periods\n");
        for (period, count) in &b.period_distribution {
            let style = b.period_style.get(period);
            let avg = style.map(|s| s.avg_words_per_tractate).unwrap_or(0.0);
            out.push_str(&format!(
                "- {}: {} scholars, {:.0} words per tractate\n",
                period, count, avg
            ));
        }

        let a = &b.archetypes;
        out.push_str(&format!(
            "\n### Archetypes (median breadth {:.1}, median depth {:.0})\n",
            a.breadth_median, a.depth_median
        ));
        for (label, count) in &a.counts {
            out.push_str(&format!("- {}: {}\n", label, count));
        }

        let l = &b.length_analysis;
        out.push_str(&format!(
            "\n### Volume vs length\n- words = {:.1} * dapim + {:.1} (R² {:.3}, n = {})\n",
            l.regression.slope, l.regression.intercept, l.regression.r_squared, l.regression.n
        ));
        for o in &l.outliers {
            out.push_str(&format!(
                "- outlier {}: {} words over {} dapim ({:+.0})\n",
                o.tractate, o.words, o.length, o.residual
            ));
        }

        out.push_str(&format!("\n### Top {} scholars by words\n", b.top_scholars.len()));
        for (i, s) in b.top_scholars.iter().enumerate() {
            out.push_str(&format!(
                "{:>2}. {} ({}): {} words, {} tractates\n",
                i + 1,
                s.scholar,
                s.period,
                s.words,
                s.tractates
            ));
        }

        let q = &b.data_quality;
        out.push_str(&format!(
            "\n### Data quality\n- Files with content: {}/{}\n- Scholars with >1000 words: {}\n",
            q.files_with_content, t.files, q.substantial_scholars
        ));
        out
    }
}
