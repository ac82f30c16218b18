//! Classification tables injected into the aggregator: period name rules,
//! tractate lengths in dapim, and the seder partition.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodRule {
    pub label: String,
    /// Lowercase substrings; any hit assigns the label.
    pub patterns: Vec<String>,
}

/// Ordered substring rules; the first matching rule wins, otherwise
/// `fallback`. A heuristic: short patterns such as "ran" also hit longer
/// names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodTable {
    pub rules: Vec<PeriodRule>,
    pub fallback: String,
}

impl PeriodTable {
    pub fn classify(&self, scholar: &str) -> &str {
        let lower = scholar.to_lowercase();
        self.rules
            .iter()
            .find(|r| r.patterns.iter().any(|p| lower.contains(p.as_str())))
            .map(|r| r.label.as_str())
            .unwrap_or(&self.fallback)
    }

    /// Every label the table can produce, rule order first, fallback last.
    pub fn labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = Vec::new();
        for label in self
            .rules
            .iter()
            .map(|r| r.label.as_str())
            .chain(std::iter::once(self.fallback.as_str()))
        {
            if !labels.contains(&label) {
                labels.push(label);
            }
        }
        labels
    }
}

impl Default for PeriodTable {
    fn default() -> Self {
        let rule = |label: &str, patterns: &[&str]| PeriodRule {
            label: label.to_string(),
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
        };
        PeriodTable {
            rules: vec![
                rule(
                    "Rishonim",
                    &[
                        "rashi", "tosafot", "ramban", "rashba", "ritva", "ran", "rosh", "meiri",
                        "nimukei", "rabbeinu", "yad ramah",
                    ],
                ),
                rule("Modern", &["steinsaltz"]),
            ],
            fallback: "Acharonim".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationTables {
    pub periods: PeriodTable,
    /// Tractate length in dapim (folios).
    pub tractate_lengths: IndexMap<String, u32>,
    /// Seder name -> tractates, in canonical seder order.
    pub sedarim: IndexMap<String, Vec<String>>,
}

impl ClassificationTables {
    /// Reads tables from JSON; missing sections keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn length_of(&self, tractate: &str) -> Option<u32> {
        self.tractate_lengths.get(tractate).copied()
    }

    pub fn seder_of(&self, tractate: &str) -> Option<&str> {
        self.sedarim
            .iter()
            .find(|(_, tractates)| tractates.iter().any(|t| t == tractate))
            .map(|(seder, _)| seder.as_str())
    }
}

impl Default for ClassificationTables {
    fn default() -> Self {
        let lengths: [(&str, u32); 36] = [
            ("Berakhot", 64),
            ("Shabbat", 157),
            ("Eruvin", 105),
            ("Pesachim", 121),
            ("Yoma", 88),
            ("Sukkah", 56),
            ("Beitzah", 40),
            ("Rosh Hashanah", 35),
            ("Taanit", 31),
            ("Megillah", 32),
            ("Moed Katan", 29),
            ("Chagigah", 27),
            ("Yevamot", 122),
            ("Ketubot", 112),
            ("Nedarim", 91),
            ("Nazir", 66),
            ("Sotah", 49),
            ("Gittin", 90),
            ("Kiddushin", 82),
            ("Bava Kamma", 119),
            ("Bava Metzia", 119),
            ("Bava Batra", 176),
            ("Sanhedrin", 113),
            ("Makkot", 24),
            ("Shevuot", 49),
            ("Avodah Zarah", 76),
            ("Horayot", 14),
            ("Zevachim", 120),
            ("Menachot", 110),
            ("Chullin", 142),
            ("Bekhorot", 61),
            ("Arakhin", 34),
            ("Temurah", 34),
            ("Keritot", 28),
            ("Meilah", 22),
            ("Niddah", 73),
        ];
        let sedarim: [(&str, &[&str]); 6] = [
            ("Zeraim", &["Berakhot"]),
            (
                "Moed",
                &[
                    "Shabbat", "Eruvin", "Pesachim", "Yoma", "Sukkah", "Beitzah",
                    "Rosh Hashanah", "Taanit", "Megillah", "Moed Katan", "Chagigah",
                ],
            ),
            (
                "Nashim",
                &["Yevamot", "Ketubot", "Nedarim", "Nazir", "Sotah", "Gittin", "Kiddushin"],
            ),
            (
                "Nezikin",
                &[
                    "Bava Kamma", "Bava Metzia", "Bava Batra", "Sanhedrin", "Makkot",
                    "Shevuot", "Avodah Zarah", "Horayot",
                ],
            ),
            // Niddah is grouped here; the Bavli has no other Tohorot tractate.
            (
                "Kodashim",
                &[
                    "Zevachim", "Menachot", "Chullin", "Bekhorot", "Arakhin", "Temurah",
                    "Keritot", "Meilah", "Niddah",
                ],
            ),
            ("Tohorot", &[]),
        ];

        ClassificationTables {
            periods: PeriodTable::default(),
            tractate_lengths: lengths.iter().map(|(t, l)| (t.to_string(), *l)).collect(),
            sedarim: sedarim
                .iter()
                .map(|(s, ts)| (s.to_string(), ts.iter().map(|t| t.to_string()).collect()))
                .collect(),
        }
    }
}
