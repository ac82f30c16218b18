//! On-disk corpus layout: `<root>/<Scholar_Dir>/<Tractate>.json`.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use tempfile::NamedTempFile;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{CorpusError, Result};
use crate::extract::shape::ContentMap;
use crate::extract::title::CommentaryEntry;

pub const FILE_EXT: &str = "json";

pub fn file_path(root: &Path, entry: &CommentaryEntry) -> PathBuf {
    root.join(entry.scholar_dir())
        .join(format!("{}.{}", entry.tractate, FILE_EXT))
}

/// Flat corpus-file body: `"<Scholar>_on_<Tractate>.<section>" -> blocks`.
pub fn corpus_keys(entry: &CommentaryEntry, content: &ContentMap) -> IndexMap<String, Vec<String>> {
    let prefix = entry.key_prefix();
    content
        .iter()
        .map(|(section, blocks)| (format!("{}.{}", prefix, section), blocks.clone()))
        .collect()
}

/// Writes (or replaces) the corpus file for `entry` and returns its path.
pub fn write_file(root: &Path, entry: &CommentaryEntry, content: &ContentMap) -> Result<PathBuf> {
    let path = file_path(root, entry);
    write_json(&path, &corpus_keys(entry, content))?;
    Ok(path)
}

/// Pretty JSON, non-ASCII kept literal, replaced atomically.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let body = serde_json::to_string_pretty(value)?;
    atomic_write(path, body.as_bytes())
}

/// Write to a temp file beside `path`, then rename over it, so readers see
/// either the old or the new file and never a partial one.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut temp_file = NamedTempFile::new_in(dir)?;
    temp_file.write_all(content)?;
    temp_file.flush()?;
    temp_file
        .persist(path)
        .map_err(|source| CorpusError::Persist {
            path: path.to_path_buf(),
            source,
        })?;
    debug!("Wrote {:?}", path);
    Ok(())
}

// ── Reading ──

#[derive(Debug, Clone)]
pub struct TractateFile {
    pub tractate: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ScholarDir {
    /// Directory name with underscores turned back into spaces.
    pub scholar: String,
    pub files: Vec<TractateFile>,
}

#[derive(Debug, Clone, Default)]
pub struct CorpusScan {
    pub scholars: Vec<ScholarDir>,
    /// Entries below the root that could not be listed or inspected.
    pub unreadable: usize,
}

/// Lists scholar directories and their `.json` files, sorted by name.
/// Stray files at the top level and deeper nesting are ignored. Only a
/// root that cannot be read is an error.
pub fn scan(root: &Path) -> Result<CorpusScan> {
    let mut out = CorpusScan::default();
    let walker = WalkDir::new(root)
        .min_depth(1)
        .max_depth(2)
        .sort_by_file_name();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => return Err(walk_error(e)),
            Err(e) => {
                warn!("Skipping unreadable corpus entry: {}", e);
                out.unreadable += 1;
                continue;
            }
        };
        let path = entry.path();
        match entry.depth() {
            1 if entry.file_type().is_dir() => {
                let dir_name = entry.file_name().to_string_lossy();
                out.scholars.push(ScholarDir {
                    scholar: dir_name.replace('_', " "),
                    files: Vec::new(),
                });
            }
            2 if entry.file_type().is_file() => {
                if path.extension().and_then(|e| e.to_str()) != Some(FILE_EXT) {
                    continue;
                }
                let Some(tractate) = path.file_stem().map(|s| s.to_string_lossy().to_string())
                else {
                    continue;
                };
                // sort_by_file_name visits a directory's children right after it
                if let Some(current) = out.scholars.last_mut() {
                    current.files.push(TractateFile {
                        tractate,
                        path: path.to_path_buf(),
                    });
                }
            }
            _ => {}
        }
    }
    Ok(out)
}

fn walk_error(e: walkdir::Error) -> CorpusError {
    CorpusError::Io(e.into_io_error().unwrap_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::Other, "corpus walk failed")
    }))
}

/// Parses one corpus file into its flat key/value object.
pub fn read_file(path: &Path) -> Result<IndexMap<String, Value>> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn entry(scholar: &str, tractate: &str) -> CommentaryEntry {
        CommentaryEntry {
            scholar: scholar.to_string(),
            tractate: tractate.to_string(),
        }
    }

    #[test]
    fn path_layout() {
        let p = file_path(Path::new("data"), &entry("Rabbi Akiva Eiger", "Bava Kamma"));
        assert_eq!(p, PathBuf::from("data/Rabbi_Akiva_Eiger/Bava Kamma.json"));
    }

    #[test]
    fn writes_hebrew_unescaped() {
        let dir = tempdir().unwrap();
        let mut content = ContentMap::new();
        content.insert("section_1".into(), vec!["שלום <b>עולם</b>".into()]);
        let path = write_file(dir.path(), &entry("Rashi", "Berakhot"), &content).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"Rashi_on_Berakhot.section_1\""));
        assert!(raw.contains("שלום <b>עולם</b>"));
        assert!(!raw.contains("\\u"));

        let back = read_file(&path).unwrap();
        assert_eq!(back["Rashi_on_Berakhot.section_1"], json!(["שלום <b>עולם</b>"]));
    }

    #[test]
    fn rewrite_replaces_whole_file() {
        let dir = tempdir().unwrap();
        let e = entry("Ran", "Nedarim");
        let mut first = ContentMap::new();
        first.insert("section_1".into(), vec!["א".into()]);
        first.insert("section_2".into(), vec!["ב".into()]);
        write_file(dir.path(), &e, &first).unwrap();

        let mut second = ContentMap::new();
        second.insert("section_9".into(), vec!["ג".into()]);
        let path = write_file(dir.path(), &e, &second).unwrap();

        let back = read_file(&path).unwrap();
        assert_eq!(back.len(), 1);
        assert!(back.contains_key("Ran_on_Nedarim.section_9"));
        // no temp files left behind
        let leftovers = fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn scan_groups_files_by_scholar() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("Rashi")).unwrap();
        fs::create_dir_all(root.join("Rabbi_Akiva_Eiger")).unwrap();
        fs::create_dir_all(root.join("Empty")).unwrap();
        fs::write(root.join("Rashi/Yoma.json"), "{}").unwrap();
        fs::write(root.join("Rashi/Berakhot.json"), "{}").unwrap();
        fs::write(root.join("Rashi/notes.txt"), "x").unwrap();
        fs::write(root.join("Rabbi_Akiva_Eiger/Shabbat.json"), "{}").unwrap();
        fs::write(root.join("stray.json"), "{}").unwrap();

        let scholars = scan(root).unwrap().scholars;
        let names: Vec<&str> = scholars.iter().map(|s| s.scholar.as_str()).collect();
        assert_eq!(names, vec!["Empty", "Rabbi Akiva Eiger", "Rashi"]);
        assert!(scholars[0].files.is_empty());
        let rashi: Vec<&str> = scholars[2].files.iter().map(|f| f.tractate.as_str()).collect();
        assert_eq!(rashi, vec!["Berakhot", "Yoma"]);
    }

    #[test]
    fn scan_missing_root_fails() {
        let dir = tempdir().unwrap();
        assert!(scan(&dir.path().join("nope")).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_scholar_dir_is_skipped() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("Locked")).unwrap();
        fs::create_dir_all(root.join("Rashi")).unwrap();
        fs::write(root.join("Locked/Yoma.json"), "{}").unwrap();
        fs::write(root.join("Rashi/Yoma.json"), "{}").unwrap();
        fs::set_permissions(root.join("Locked"), fs::Permissions::from_mode(0o000)).unwrap();

        let readable = fs::read_dir(root.join("Locked")).is_ok();
        let result = scan(root);
        fs::set_permissions(root.join("Locked"), fs::Permissions::from_mode(0o755)).unwrap();
        if readable {
            // permission bits are not enforced for this user
            return;
        }

        let found = result.unwrap();
        assert_eq!(found.unreadable, 1);
        let rashi = found.scholars.iter().find(|s| s.scholar == "Rashi").unwrap();
        assert_eq!(rashi.files.len(), 1);
        let locked = found.scholars.iter().find(|s| s.scholar == "Locked").unwrap();
        assert!(locked.files.is_empty());
    }
}
