//! Period views: scholar counts, per-period writing style, and the
//! period × seder volume table.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::regression::{median, percent, population_std};
use super::tables::ClassificationTables;
use super::ScholarAggregate;

pub fn distribution(
    scholars: &IndexMap<String, ScholarAggregate>,
    tables: &ClassificationTables,
) -> IndexMap<String, usize> {
    let mut counts: IndexMap<String, usize> = tables
        .periods
        .labels()
        .into_iter()
        .map(|l| (l.to_string(), 0))
        .collect();
    for agg in scholars.values() {
        *counts.entry(agg.period.clone()).or_insert(0) += 1;
    }
    counts
}

// ── Style ──

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeriodStyle {
    pub scholars: usize,
    /// Tractate files with at least one word.
    pub tractate_entries: usize,
    pub total_words: usize,
    pub avg_words_per_tractate: f64,
    pub median_words_per_tractate: f64,
    pub std_words_per_tractate: f64,
}

pub fn style(
    scholars: &IndexMap<String, ScholarAggregate>,
    tables: &ClassificationTables,
) -> IndexMap<String, PeriodStyle> {
    let mut entries: IndexMap<String, (usize, Vec<f64>)> = tables
        .periods
        .labels()
        .into_iter()
        .map(|l| (l.to_string(), (0, Vec::new())))
        .collect();
    for agg in scholars.values() {
        let (count, words) = entries.entry(agg.period.clone()).or_default();
        *count += 1;
        words.extend(
            agg.tractate_list
                .iter()
                .filter(|t| t.words > 0)
                .map(|t| t.words as f64),
        );
    }

    entries
        .into_iter()
        .map(|(period, (scholars, words))| {
            let total = words.iter().sum::<f64>();
            let style = PeriodStyle {
                scholars,
                tractate_entries: words.len(),
                total_words: words.iter().map(|w| *w as usize).sum(),
                avg_words_per_tractate: if words.is_empty() {
                    0.0
                } else {
                    total / words.len() as f64
                },
                median_words_per_tractate: median(&words),
                std_words_per_tractate: population_std(&words),
            };
            (period, style)
        })
        .collect()
}

// ── Period × seder ──

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeriodSederAnalysis {
    pub sedarim: Vec<String>,
    pub volume: IndexMap<String, IndexMap<String, usize>>,
    /// Share of each period's classified volume; 0 for an empty period.
    pub percentages: IndexMap<String, IndexMap<String, f64>>,
    pub period_totals: IndexMap<String, usize>,
    /// Tractates outside every seder; their words are left out.
    pub unclassified_tractates: Vec<String>,
}

pub fn seder_crosstab(
    scholars: &IndexMap<String, ScholarAggregate>,
    tables: &ClassificationTables,
) -> PeriodSederAnalysis {
    let sedarim: Vec<String> = tables.sedarim.keys().cloned().collect();
    let empty_row = || -> IndexMap<String, usize> {
        sedarim.iter().map(|s| (s.clone(), 0)).collect()
    };

    let mut volume: IndexMap<String, IndexMap<String, usize>> = tables
        .periods
        .labels()
        .into_iter()
        .map(|l| (l.to_string(), empty_row()))
        .collect();
    let mut unclassified: BTreeSet<String> = BTreeSet::new();

    for agg in scholars.values() {
        let row = volume.entry(agg.period.clone()).or_insert_with(empty_row);
        for t in &agg.tractate_list {
            match tables.seder_of(&t.tractate) {
                Some(seder) => *row.entry(seder.to_string()).or_insert(0) += t.words,
                None => {
                    if unclassified.insert(t.tractate.clone()) {
                        warn!("Tractate '{}' is in no seder; left out of period totals", t.tractate);
                    }
                }
            }
        }
    }

    let period_totals: IndexMap<String, usize> = volume
        .iter()
        .map(|(p, row)| (p.clone(), row.values().sum()))
        .collect();
    let percentages = volume
        .iter()
        .map(|(p, row)| {
            let total = period_totals[p] as f64;
            let pcts = row
                .iter()
                .map(|(s, v)| (s.clone(), percent(*v as f64, total)))
                .collect();
            (p.clone(), pcts)
        })
        .collect();

    PeriodSederAnalysis {
        sedarim,
        volume,
        percentages,
        period_totals,
        unclassified_tractates: unclassified.into_iter().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::TractateWords;

    fn scholar(period: &str, tractates: &[(&str, usize)]) -> ScholarAggregate {
        let tractate_list: Vec<TractateWords> = tractates
            .iter()
            .map(|(t, w)| TractateWords {
                tractate: t.to_string(),
                words: *w,
            })
            .collect();
        ScholarAggregate {
            period: period.to_string(),
            tractates: tractate_list.len(),
            words: tractate_list.iter().map(|t| t.words).sum(),
            sections: 0,
            text_blocks: 0,
            tractate_list,
        }
    }

    fn corpus() -> IndexMap<String, ScholarAggregate> {
        let mut m = IndexMap::new();
        m.insert(
            "Rashi".to_string(),
            scholar("Rishonim", &[("Berakhot", 30), ("Shabbat", 10), ("Genesis", 5)]),
        );
        m.insert("Maharsha".to_string(), scholar("Acharonim", &[("Yoma", 0)]));
        m
    }

    #[test]
    fn every_label_is_reported() {
        let d = distribution(&corpus(), &ClassificationTables::default());
        assert_eq!(d["Rishonim"], 1);
        assert_eq!(d["Acharonim"], 1);
        assert_eq!(d["Modern"], 0);
    }

    #[test]
    fn zero_volume_period_has_zero_percentages() {
        let x = seder_crosstab(&corpus(), &ClassificationTables::default());
        assert_eq!(x.sedarim.len(), 6);
        assert_eq!(x.period_totals["Acharonim"], 0);
        assert!(x.percentages["Acharonim"].values().all(|p| *p == 0.0));
        assert!(x.percentages["Modern"].values().all(|p| *p == 0.0));
    }

    #[test]
    fn rishonim_split_by_seder() {
        let x = seder_crosstab(&corpus(), &ClassificationTables::default());
        assert_eq!(x.volume["Rishonim"]["Zeraim"], 30);
        assert_eq!(x.volume["Rishonim"]["Moed"], 10);
        assert_eq!(x.period_totals["Rishonim"], 40);
        assert_eq!(x.percentages["Rishonim"]["Zeraim"], 75.0);
        assert_eq!(x.percentages["Rishonim"]["Moed"], 25.0);
        assert_eq!(x.unclassified_tractates, vec!["Genesis"]);
    }

    #[test]
    fn style_counts_only_tractates_with_words() {
        let s = style(&corpus(), &ClassificationTables::default());
        let r = &s["Rishonim"];
        assert_eq!(r.scholars, 1);
        assert_eq!(r.tractate_entries, 3);
        assert_eq!(r.total_words, 45);
        assert_eq!(r.avg_words_per_tractate, 15.0);
        assert_eq!(r.median_words_per_tractate, 10.0);

        let a = &s["Acharonim"];
        assert_eq!(a.scholars, 1);
        assert_eq!(a.tractate_entries, 0);
        assert_eq!(a.avg_words_per_tractate, 0.0);
        assert_eq!(a.std_words_per_tractate, 0.0);
    }
}
