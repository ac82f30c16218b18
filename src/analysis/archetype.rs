use std::fmt;

use serde::{Deserialize, Serialize};

/// Breadth (tractates covered) against depth (average words per tractate),
/// each split at the corpus median.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Archetype {
    /// Broad and deep.
    Sages,
    /// Narrow and deep.
    Specialists,
    /// Broad and shallow.
    Surveyors,
    /// Narrow and shallow.
    Glossators,
}

impl Archetype {
    pub const ALL: [Archetype; 4] = [
        Archetype::Sages,
        Archetype::Specialists,
        Archetype::Surveyors,
        Archetype::Glossators,
    ];

    /// Values at or above the median count as high.
    pub fn classify(tractates: f64, avg_words: f64, breadth_median: f64, depth_median: f64) -> Self {
        let broad = tractates >= breadth_median;
        let deep = avg_words >= depth_median;
        match (broad, deep) {
            (true, true) => Archetype::Sages,
            (false, true) => Archetype::Specialists,
            (true, false) => Archetype::Surveyors,
            (false, false) => Archetype::Glossators,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Archetype::Sages => "Sages",
            Archetype::Specialists => "Specialists",
            Archetype::Surveyors => "Surveyors",
            Archetype::Glossators => "Glossators",
        }
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quadrants() {
        assert_eq!(Archetype::classify(10.0, 500.0, 5.0, 100.0), Archetype::Sages);
        assert_eq!(Archetype::classify(1.0, 500.0, 5.0, 100.0), Archetype::Specialists);
        assert_eq!(Archetype::classify(10.0, 50.0, 5.0, 100.0), Archetype::Surveyors);
        assert_eq!(Archetype::classify(1.0, 50.0, 5.0, 100.0), Archetype::Glossators);
    }

    #[test]
    fn median_itself_is_high() {
        assert_eq!(Archetype::classify(5.0, 100.0, 5.0, 100.0), Archetype::Sages);
    }

    #[test]
    fn serializes_as_label() {
        assert_eq!(
            serde_json::to_string(&Archetype::Glossators).unwrap(),
            "\"Glossators\""
        );
        assert_eq!(Archetype::Surveyors.to_string(), "Surveyors");
    }
}
