//! Commentary volume against tractate length: a least-squares line through
//! (dapim, words) plus residual outliers.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::regression::{mean, population_std, Regression};
use super::tables::ClassificationTables;
use super::TractateAggregate;

const OUTLIER_SIGMA: f64 = 2.0;
const LABEL_SIGMA: f64 = 1.5;
/// Residual spread below this fraction of the mean volume counts as a
/// perfect fit, so float noise never produces outliers.
const RESIDUAL_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LengthAnalysis {
    pub regression: Regression,
    pub residual_std: f64,
    pub tractates: Vec<LengthPoint>,
    /// |residual| > 2σ, largest first.
    pub outliers: Vec<Outlier>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LengthPoint {
    pub tractate: String,
    pub seder: Option<String>,
    pub length: u32,
    pub words: usize,
    /// Scholars whose file for this tractate has words.
    pub scholars: usize,
    pub words_per_daf: f64,
    pub predicted: f64,
    pub residual: f64,
    /// |residual| > 1.5σ.
    pub labeled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outlier {
    pub tractate: String,
    pub length: u32,
    pub words: usize,
    pub residual: f64,
    /// Words per daf.
    pub ratio: f64,
}

/// Only tractates present in the length table with non-zero volume take part.
pub fn analyze(
    tractates: &IndexMap<String, TractateAggregate>,
    tables: &ClassificationTables,
) -> LengthAnalysis {
    let mut points: Vec<LengthPoint> = tractates
        .iter()
        .filter_map(|(name, agg)| {
            let length = tables.length_of(name)?;
            if agg.words == 0 {
                return None;
            }
            Some(LengthPoint {
                tractate: name.clone(),
                seder: tables.seder_of(name).map(str::to_string),
                length,
                words: agg.words,
                scholars: agg.scholars_with_words,
                words_per_daf: if length == 0 {
                    0.0
                } else {
                    agg.words as f64 / length as f64
                },
                predicted: 0.0,
                residual: 0.0,
                labeled: false,
            })
        })
        .collect();

    let x: Vec<f64> = points.iter().map(|p| p.length as f64).collect();
    let y: Vec<f64> = points.iter().map(|p| p.words as f64).collect();
    let regression = Regression::fit(&x, &y);
    let residuals = regression.residuals(&x, &y);
    let residual_std = population_std(&residuals);

    let scale = mean(&y).abs().max(1.0);
    let spread = residual_std > RESIDUAL_EPSILON * scale;

    for (point, r) in points.iter_mut().zip(&residuals) {
        point.predicted = regression.predict(point.length as f64);
        point.residual = *r;
        point.labeled = spread && r.abs() > LABEL_SIGMA * residual_std;
    }

    let mut outliers: Vec<Outlier> = if spread {
        points
            .iter()
            .filter(|p| p.residual.abs() > OUTLIER_SIGMA * residual_std)
            .map(|p| Outlier {
                tractate: p.tractate.clone(),
                length: p.length,
                words: p.words,
                residual: p.residual,
                ratio: p.words_per_daf,
            })
            .collect()
    } else {
        Vec::new()
    };
    outliers.sort_by(|a, b| b.residual.abs().total_cmp(&a.residual.abs()));

    LengthAnalysis {
        regression,
        residual_std,
        tractates: points,
        outliers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tables(lengths: &[(&str, u32)]) -> ClassificationTables {
        ClassificationTables {
            tractate_lengths: lengths.iter().map(|(t, l)| (t.to_string(), *l)).collect(),
            ..Default::default()
        }
    }

    fn volumes(words: &[(&str, usize)]) -> IndexMap<String, TractateAggregate> {
        words
            .iter()
            .map(|(t, w)| {
                (
                    t.to_string(),
                    TractateAggregate {
                        words: *w,
                        scholars: 1,
                        scholars_with_words: usize::from(*w > 0),
                    },
                )
            })
            .collect()
    }

    #[test]
    fn identical_lengths_do_not_produce_nan() {
        let t = tables(&[("A", 50), ("B", 50), ("C", 50)]);
        let a = analyze(&volumes(&[("A", 10), ("B", 20), ("C", 60)]), &t);
        assert_eq!(a.regression.slope, 0.0);
        assert_eq!(a.regression.r_squared, 0.0);
        assert!(a.tractates.iter().all(|p| !p.residual.is_nan()));
        assert!(!a.residual_std.is_nan());
        assert!(a.outliers.is_empty());
    }

    #[test]
    fn zero_volume_and_unlisted_tractates_are_excluded() {
        let t = tables(&[("A", 10), ("B", 20), ("C", 30)]);
        let a = analyze(&volumes(&[("A", 100), ("B", 0), ("Genesis", 500)]), &t);
        let names: Vec<&str> = a.tractates.iter().map(|p| p.tractate.as_str()).collect();
        assert_eq!(names, vec!["A"]);
        assert_eq!(a.tractates[0].words_per_daf, 10.0);
    }

    #[test]
    fn single_heavy_tractate_is_the_outlier() {
        // ten tractates on words = 10 * length, one lifted by 2000
        let lengths: Vec<(String, u32)> =
            (1..=10).map(|i| (format!("T{i}"), i * 10)).collect();
        let t = ClassificationTables {
            tractate_lengths: lengths.iter().cloned().collect(),
            ..Default::default()
        };
        let words: IndexMap<String, TractateAggregate> = lengths
            .iter()
            .map(|(name, len)| {
                let extra = if name == "T5" { 2000 } else { 0 };
                (
                    name.clone(),
                    TractateAggregate {
                        words: (*len as usize) * 10 + extra,
                        scholars: 1,
                        scholars_with_words: 1,
                    },
                )
            })
            .collect();

        let a = analyze(&words, &t);
        assert_eq!(a.outliers.len(), 1);
        assert_eq!(a.outliers[0].tractate, "T5");
        assert!(a.outliers[0].residual > 0.0);
        assert_eq!(a.outliers[0].ratio, 2500.0 / 50.0);
        let labeled: Vec<&str> = a
            .tractates
            .iter()
            .filter(|p| p.labeled)
            .map(|p| p.tractate.as_str())
            .collect();
        assert_eq!(labeled, vec!["T5"]);
    }

    #[test]
    fn perfect_fit_has_no_outliers() {
        let t = tables(&[("A", 10), ("B", 20), ("C", 30), ("D", 40)]);
        let a = analyze(&volumes(&[("A", 100), ("B", 200), ("C", 300), ("D", 400)]), &t);
        assert!((a.regression.r_squared - 1.0).abs() < 1e-9);
        assert!(a.outliers.is_empty());
        assert!(a.tractates.iter().all(|p| !p.labeled));
    }

    #[test]
    fn seder_attached_from_tables() {
        let a = analyze(
            &volumes(&[("Berakhot", 10), ("Niddah", 20)]),
            &ClassificationTables::default(),
        );
        assert_eq!(a.tractates[0].seder.as_deref(), Some("Zeraim"));
        assert_eq!(a.tractates[1].seder.as_deref(), Some("Kodashim"));
    }
}
