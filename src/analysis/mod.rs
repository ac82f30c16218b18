pub mod archetype;
pub mod length;
pub mod period;
pub mod regression;
pub mod report;
pub mod tables;

use std::collections::BTreeMap;
use std::path::Path;

use indexmap::IndexMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::corpus;
use crate::error::Result;
use crate::text::count_value_words;
use archetype::Archetype;
use length::LengthAnalysis;
use period::{PeriodSederAnalysis, PeriodStyle};
use regression::median;
use tables::ClassificationTables;

pub const TOP_SCHOLARS: usize = 20;
/// Word total above which a scholar counts as substantial.
pub const SUBSTANTIAL_WORDS: usize = 1000;

// ── Raw measurements ──

/// Counts taken from one readable corpus file.
#[derive(Debug, Clone, PartialEq)]
pub struct FileMeasure {
    pub tractate: String,
    pub words: usize,
    pub sections: usize,
    pub text_blocks: usize,
}

impl FileMeasure {
    /// Every key is a section; only array values hold text blocks.
    pub fn from_body(tractate: &str, body: &IndexMap<String, Value>) -> Self {
        let mut words = 0;
        let mut text_blocks = 0;
        for blocks in body.values().filter_map(Value::as_array) {
            text_blocks += blocks.len();
            words += blocks.iter().map(count_value_words).sum::<usize>();
        }
        FileMeasure {
            tractate: tractate.to_string(),
            words,
            sections: body.len(),
            text_blocks,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScholarMeasure {
    pub scholar: String,
    pub files: Vec<FileMeasure>,
}

// ── Bundle ──

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    /// Scholar directories with at least one readable file.
    pub scholars: usize,
    pub tractates: usize,
    pub files: usize,
    pub words: usize,
    pub sections: usize,
    pub text_blocks: usize,
    pub skipped_files: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TractateWords {
    pub tractate: String,
    pub words: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScholarAggregate {
    pub period: String,
    pub tractates: usize,
    pub words: usize,
    pub sections: usize,
    pub text_blocks: usize,
    pub tractate_list: Vec<TractateWords>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TractateAggregate {
    pub words: usize,
    /// Scholars with a file for this tractate.
    pub scholars: usize,
    pub scholars_with_words: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScholarArchetype {
    pub archetype: Archetype,
    pub period: String,
    /// Tractates with words.
    pub tractates: usize,
    pub avg_words: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArchetypeAnalysis {
    pub breadth_median: f64,
    pub depth_median: f64,
    pub counts: IndexMap<String, usize>,
    pub scholars: IndexMap<String, ScholarArchetype>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VolumeAverages {
    pub words_per_scholar: f64,
    pub words_per_tractate: f64,
    pub sections_per_scholar: f64,
    pub words_per_section: f64,
    pub text_blocks_per_section: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataQuality {
    pub scholars_with_content: usize,
    pub files_with_content: usize,
    /// Scholars above `SUBSTANTIAL_WORDS`.
    pub substantial_scholars: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopScholar {
    pub scholar: String,
    pub period: String,
    pub words: usize,
    pub tractates: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatisticsBundle {
    pub totals: Totals,
    pub scholars: IndexMap<String, ScholarAggregate>,
    pub tractates: IndexMap<String, TractateAggregate>,
    pub tractate_coverage: IndexMap<String, Vec<String>>,
    pub period_distribution: IndexMap<String, usize>,
    pub archetypes: ArchetypeAnalysis,
    pub length_analysis: LengthAnalysis,
    pub period_seder: PeriodSederAnalysis,
    pub period_style: IndexMap<String, PeriodStyle>,
    pub volume_averages: VolumeAverages,
    pub data_quality: DataQuality,
    pub top_scholars: Vec<TopScholar>,
}

// ── Entry points ──

/// Walks the corpus and computes every view. Fails only when the root
/// cannot be listed; unreadable entries and files are logged and counted.
pub fn aggregate(corpus_root: &Path, tables: &ClassificationTables) -> Result<StatisticsBundle> {
    let found = corpus::scan(corpus_root)?;
    let mut skipped = found.unreadable;
    let mut measures = Vec::with_capacity(found.scholars.len());

    for dir in found.scholars {
        let mut files = Vec::with_capacity(dir.files.len());
        for file in &dir.files {
            match corpus::read_file(&file.path) {
                Ok(body) => files.push(FileMeasure::from_body(&file.tractate, &body)),
                Err(e) => {
                    warn!("Skipping {:?}: {}", file.path, e);
                    skipped += 1;
                }
            }
        }
        measures.push(ScholarMeasure {
            scholar: dir.scholar,
            files,
        });
    }

    let bundle = summarize(&measures, skipped, tables);
    info!(
        "Aggregated {} scholars, {} files, {} words ({} files skipped)",
        bundle.totals.scholars, bundle.totals.files, bundle.totals.words, skipped
    );
    Ok(bundle)
}

/// Pure recomputation from measurements. Scholars without files are dropped.
pub fn summarize(
    measures: &[ScholarMeasure],
    skipped_files: usize,
    tables: &ClassificationTables,
) -> StatisticsBundle {
    let mut totals = Totals {
        skipped_files,
        ..Default::default()
    };
    let mut scholars: IndexMap<String, ScholarAggregate> = IndexMap::new();
    let mut tractates: BTreeMap<String, TractateAggregate> = BTreeMap::new();
    let mut coverage: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut files_with_content = 0;

    for m in measures.iter().filter(|m| !m.files.is_empty()) {
        let agg = scholars
            .entry(m.scholar.clone())
            .or_insert_with(|| ScholarAggregate {
                period: tables.periods.classify(&m.scholar).to_string(),
                tractates: 0,
                words: 0,
                sections: 0,
                text_blocks: 0,
                tractate_list: Vec::new(),
            });
        for f in &m.files {
            agg.tractates += 1;
            agg.words += f.words;
            agg.sections += f.sections;
            agg.text_blocks += f.text_blocks;
            agg.tractate_list.push(TractateWords {
                tractate: f.tractate.clone(),
                words: f.words,
            });

            let t = tractates.entry(f.tractate.clone()).or_default();
            t.words += f.words;
            t.scholars += 1;
            if f.words > 0 {
                t.scholars_with_words += 1;
                files_with_content += 1;
            }
            coverage
                .entry(f.tractate.clone())
                .or_default()
                .push(m.scholar.clone());

            totals.files += 1;
            totals.words += f.words;
            totals.sections += f.sections;
            totals.text_blocks += f.text_blocks;
        }
    }
    totals.scholars = scholars.len();
    totals.tractates = tractates.len();

    let tractates: IndexMap<String, TractateAggregate> = tractates.into_iter().collect();
    let data_quality = DataQuality {
        scholars_with_content: scholars.values().filter(|s| s.words > 0).count(),
        files_with_content,
        substantial_scholars: scholars
            .values()
            .filter(|s| s.words > SUBSTANTIAL_WORDS)
            .count(),
    };

    StatisticsBundle {
        volume_averages: volume_averages(&totals),
        period_distribution: period::distribution(&scholars, tables),
        archetypes: archetypes(&scholars),
        length_analysis: length::analyze(&tractates, tables),
        period_seder: period::seder_crosstab(&scholars, tables),
        period_style: period::style(&scholars, tables),
        top_scholars: top_scholars(&scholars, TOP_SCHOLARS),
        tractate_coverage: coverage.into_iter().collect(),
        data_quality,
        totals,
        scholars,
        tractates,
    }
}

// ── Views ──

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

fn volume_averages(t: &Totals) -> VolumeAverages {
    VolumeAverages {
        words_per_scholar: ratio(t.words, t.scholars),
        words_per_tractate: ratio(t.words, t.tractates),
        sections_per_scholar: ratio(t.sections, t.scholars),
        words_per_section: ratio(t.words, t.sections),
        text_blocks_per_section: ratio(t.text_blocks, t.sections),
    }
}

/// Breadth and depth use only tractates with words; scholars with none are
/// left out of the medians and the assignment.
pub fn archetypes(scholars: &IndexMap<String, ScholarAggregate>) -> ArchetypeAnalysis {
    let points: Vec<(&String, &ScholarAggregate, usize, f64)> = scholars
        .iter()
        .filter_map(|(name, agg)| {
            let with_words: Vec<usize> = agg
                .tractate_list
                .iter()
                .map(|t| t.words)
                .filter(|w| *w > 0)
                .collect();
            if with_words.is_empty() {
                return None;
            }
            let avg = with_words.iter().sum::<usize>() as f64 / with_words.len() as f64;
            Some((name, agg, with_words.len(), avg))
        })
        .collect();

    let breadths: Vec<f64> = points.iter().map(|p| p.2 as f64).collect();
    let depths: Vec<f64> = points.iter().map(|p| p.3).collect();
    let breadth_median = median(&breadths);
    let depth_median = median(&depths);

    let mut counts: IndexMap<String, usize> = Archetype::ALL
        .iter()
        .map(|a| (a.label().to_string(), 0))
        .collect();
    let mut assigned = IndexMap::new();
    for (name, agg, tractates, avg_words) in points {
        let archetype = Archetype::classify(tractates as f64, avg_words, breadth_median, depth_median);
        *counts.entry(archetype.label().to_string()).or_insert(0) += 1;
        assigned.insert(
            name.clone(),
            ScholarArchetype {
                archetype,
                period: agg.period.clone(),
                tractates,
                avg_words,
            },
        );
    }

    ArchetypeAnalysis {
        breadth_median,
        depth_median,
        counts,
        scholars: assigned,
    }
}

fn top_scholars(scholars: &IndexMap<String, ScholarAggregate>, n: usize) -> Vec<TopScholar> {
    scholars
        .iter()
        .sorted_by(|a, b| b.1.words.cmp(&a.1.words).then(a.0.cmp(b.0)))
        .take(n)
        .map(|(name, agg)| TopScholar {
            scholar: name.clone(),
            period: agg.period.clone(),
            words: agg.words,
            tractates: agg.tractates,
        })
        .collect()
}
