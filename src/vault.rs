use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File name the calendar document is stored under inside a vault.
pub const CALENDAR_FILE: &str = "calendar.md";

/// How deep below the vault root the calendar file is looked for.
const MAX_DEPTH: usize = 4;

/// Resolve a user-supplied path to the calendar document.
///
/// A file is returned as is. For a directory (a notes vault), the
/// shallowest `calendar.md` wins; ties go to the first path in sorted order.
/// Hidden directories such as `.obsidian` or `.git` are not entered.
pub fn locate_calendar(path: &Path) -> Option<PathBuf> {
    if path.is_file() {
        return Some(path.to_path_buf());
    }
    if !path.is_dir() {
        return None;
    }

    WalkDir::new(path)
        .min_depth(1)
        .max_depth(MAX_DEPTH)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name().to_str().unwrap_or("")))
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && e.file_name() == CALENDAR_FILE)
        .min_by_key(|e| e.depth())
        .map(|e| e.into_path())
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// Fresh scratch directory under the system temp dir.
    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "fantasy_calendar_vault_{}_{name}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_file_is_returned_directly() {
        let dir = scratch("file");
        let file = dir.join("notes.md");
        fs::write(&file, "## Âges\n").unwrap();
        assert_eq!(locate_calendar(&file), Some(file));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_shallowest_calendar_wins() {
        let dir = scratch("depth");
        fs::create_dir_all(dir.join("a/b")).unwrap();
        fs::create_dir_all(dir.join("z")).unwrap();
        fs::write(dir.join("a/b/calendar.md"), "").unwrap();
        fs::write(dir.join("z/calendar.md"), "").unwrap();
        assert_eq!(locate_calendar(&dir), Some(dir.join("z/calendar.md")));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_hidden_dirs_are_skipped() {
        let dir = scratch("hidden");
        fs::create_dir_all(dir.join(".obsidian")).unwrap();
        fs::write(dir.join(".obsidian/calendar.md"), "").unwrap();
        assert_eq!(locate_calendar(&dir), None);

        fs::create_dir_all(dir.join("monde")).unwrap();
        fs::write(dir.join("monde/calendar.md"), "").unwrap();
        assert_eq!(locate_calendar(&dir), Some(dir.join("monde/calendar.md")));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_path() {
        let dir = scratch("missing");
        assert_eq!(locate_calendar(&dir.join("nope")), None);
        assert_eq!(locate_calendar(&dir), None);
        fs::remove_dir_all(&dir).unwrap();
    }
}
