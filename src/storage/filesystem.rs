//! File system operations
//!
//! Read-only queries against the document root. The server never writes.

use log::debug;
use std::io::Result;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::storage::validation::join_segments;

/// Name of the per-directory map file.
pub const GOPHERMAP_NAME: &str = "gophermap";

/// A directory entry that is visible in listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedEntry {
    pub name: String,
    pub is_dir: bool,
}

/// Check if file exists
pub async fn file_exists(path: &Path) -> bool {
    fs::metadata(path)
        .await
        .map(|meta| meta.is_file())
        .unwrap_or(false)
}

/// Check if directory exists
pub async fn directory_exists(path: &Path) -> bool {
    fs::metadata(path)
        .await
        .map(|meta| meta.is_dir())
        .unwrap_or(false)
}

/// Path of the gophermap that would govern `dir`
pub fn gophermap_path(dir: &Path) -> PathBuf {
    join_segments(dir, &[GOPHERMAP_NAME])
}

/// Whether an entry is hidden from directory listings
pub fn is_hidden_entry(name: &str) -> bool {
    name.starts_with('.') || name == GOPHERMAP_NAME
}

/// Lists the visible entries of a directory, sorted by name.
///
/// Symbolic links are followed to decide whether an entry is a directory;
/// entries whose type can't be determined are listed as plain files.
/// Names that aren't valid UTF-8 can't be requested back and are skipped.
pub async fn list_directory(path: &Path) -> Result<Vec<ListedEntry>> {
    let mut reader = fs::read_dir(path).await?;
    let mut entries = Vec::new();

    while let Some(entry) = reader.next_entry().await? {
        let name = match entry.file_name().into_string() {
            Ok(name) => name,
            Err(raw) => {
                debug!("Skipping entry with non UTF-8 name {:?}", raw);
                continue;
            }
        };
        if is_hidden_entry(&name) {
            continue;
        }

        let is_dir = match fs::metadata(entry.path()).await {
            Ok(meta) => meta.is_dir(),
            Err(e) => {
                debug!("Could not stat {}: {}", entry.path().display(), e);
                false
            }
        };

        entries.push(ListedEntry { name, is_dir });
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs as std_fs;

    #[tokio::test]
    async fn listing_skips_dotfiles_and_gophermap() {
        let root = tempfile::tempdir().unwrap();
        std_fs::write(root.path().join("b.txt"), "b").unwrap();
        std_fs::write(root.path().join(".hidden"), "h").unwrap();
        std_fs::write(root.path().join("gophermap"), "iHi").unwrap();
        std_fs::create_dir(root.path().join("a_dir")).unwrap();

        let entries = list_directory(root.path()).await.unwrap();
        assert_eq!(
            entries,
            vec![
                ListedEntry { name: "a_dir".into(), is_dir: true },
                ListedEntry { name: "b.txt".into(), is_dir: false },
            ]
        );
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn listing_skips_non_utf8_names() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let root = tempfile::tempdir().unwrap();
        std_fs::write(root.path().join(OsStr::from_bytes(b"bad\xffname")), "x").unwrap();
        std_fs::write(root.path().join("good.txt"), "g").unwrap();

        let entries = list_directory(root.path()).await.unwrap();
        assert_eq!(
            entries,
            vec![ListedEntry { name: "good.txt".into(), is_dir: false }]
        );
    }

    #[tokio::test]
    async fn existence_checks_distinguish_kinds() {
        let root = tempfile::tempdir().unwrap();
        let file = root.path().join("f");
        std_fs::write(&file, "x").unwrap();

        assert!(file_exists(&file).await);
        assert!(!directory_exists(&file).await);
        assert!(directory_exists(root.path()).await);
        assert!(!file_exists(root.path()).await);
        assert!(!file_exists(&root.path().join("missing")).await);
    }

    #[test]
    fn hidden_entries() {
        assert!(is_hidden_entry(".git"));
        assert!(is_hidden_entry("gophermap"));
        assert!(!is_hidden_entry("gophermap.txt"));
        assert!(!is_hidden_entry("readme"));
    }

    #[test]
    fn gophermap_lives_in_directory() {
        assert_eq!(
            gophermap_path(Path::new("/srv/docs")),
            PathBuf::from("/srv/docs/gophermap")
        );
    }
}
