use crate::error::{CorpusError, Result};

pub const SEPARATOR: &str = " on ";

/// Scholar and tractate parsed out of a `"<scholar> on <tractate>"` title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentaryEntry {
    pub scholar: String,
    pub tractate: String,
}

impl CommentaryEntry {
    /// Splits on the literal separator. Titles with zero or several
    /// separators, an empty half, or a half that is not a single path
    /// component are rejected rather than guessed at.
    pub fn parse(title: &str) -> Result<Self> {
        let mut parts = title.split(SEPARATOR);
        let (Some(scholar), Some(tractate), None) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(parse_error(title));
        };
        if !is_path_component(scholar) || !is_path_component(tractate) {
            return Err(parse_error(title));
        }
        Ok(CommentaryEntry {
            scholar: scholar.to_string(),
            tractate: tractate.to_string(),
        })
    }

    /// Directory name for the scholar: spaces become underscores.
    pub fn scholar_dir(&self) -> String {
        self.scholar.replace(' ', "_")
    }

    /// Prefix of every key in this entry's corpus file.
    pub fn key_prefix(&self) -> String {
        format!("{}_on_{}", self.scholar_dir(), self.tractate)
    }
}

/// Both halves become file names under the corpus root.
fn is_path_component(part: &str) -> bool {
    !part.is_empty() && part != "." && part != ".." && !part.contains(['/', '\\', '\0'])
}

fn parse_error(title: &str) -> CorpusError {
    CorpusError::TitleParse {
        title: title.to_string(),
    }
}
