use std::collections::HashMap;
use std::ffi::CString;
use std::fs;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::IceError;
use crate::Result;

/// The name of the pseudo-command that is always present in a `CommandTable`.
pub const EXIT_COMMAND: &str = "exit";

/// A mapping of command names to the executables that implement them.
///
/// A table is built from an ordered list of directories. Directories are scanned in order and a
/// later directory's entry replaces an earlier one of the same name.
#[derive(Debug, Clone, Default)]
pub struct CommandTable {
    cmds: HashMap<String, PathBuf>,
}

impl CommandTable {
    /// Scans the given directories and builds a table of the executables found in them.
    ///
    /// Only direct entries that are regular files (after following symlinks) and executable by
    /// the real user are picked up. Directories that can't be read contribute nothing. The `exit`
    /// entry always points at `exit` inside the last directory, whether that file exists or not.
    ///
    /// # Arguments
    /// `dirs` - The directories to scan, lowest precedence first.
    ///
    /// # Returns
    /// `Result<CommandTable>` - The table, or `EmptySearchPath` if `dirs` is empty.
    pub fn scan<P: AsRef<Path>>(dirs: &[P]) -> Result<CommandTable> {
        let last: &Path = match dirs.last() {
            Some(last) => last.as_ref(),
            None => return Err(IceError::EmptySearchPath { which: "command" }),
        };

        let mut table = CommandTable::default();
        for dir in dirs {
            table.scan_dir(dir.as_ref());
        }
        table.add(EXIT_COMMAND, last.join(EXIT_COMMAND));

        Ok(table)
    }

    fn scan_dir(&mut self, dir: &Path) {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) => {
                debug!(dir = %dir.display(), %err, "skipping unreadable search directory");
                return;
            }
        };

        for entry in entries.filter_map(|entry| entry.ok()) {
            let path = entry.path();
            let name = match entry.file_name().to_str() {
                Some(name) => name.to_string(),
                None => continue,
            };

            if is_executable_file(&path) {
                self.add(&name, path);
            } else {
                debug!(path = %path.display(), "not an executable file, skipping");
            }
        }
    }

    /// Retrieves the path of the executable, if one exists, for the given name.
    pub fn get(&self, name: &str) -> Option<&Path> {
        self.cmds.get(name).map(PathBuf::as_path)
    }

    /// Adds (or replaces) the command with the given name.
    pub fn add(&mut self, name: &str, path: PathBuf) {
        self.cmds.insert(name.to_owned(), path);
    }

    /// Tests for existence of a command with the given `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.cmds.contains_key(name)
    }

    /// Retrieves the command names of this table, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names_vec: Vec<String> = self.cmds.keys().cloned().collect();
        // We are a map under the hood with no ordering of our own. Sorting keeps callers
        // deterministic.
        names_vec.sort();
        names_vec
    }

    /// Returns the names of all commands that start with `prefix`.
    ///
    /// The prefix is matched literally; characters like `.` or `*` carry no special meaning.
    ///
    /// # Arguments
    /// `prefix` - The text the user typed so far.
    ///
    /// # Returns
    /// `Vec<String>` - Every matching name, once, in sorted order.
    pub fn complete(&self, prefix: &str) -> Vec<String> {
        self.names()
            .into_iter()
            .filter(|name| name.starts_with(prefix))
            .collect()
    }
}

/// Checks that `path` is a regular file the real user may execute. Symlinks are followed.
fn is_executable_file(path: &Path) -> bool {
    match fs::metadata(path) {
        Ok(metadata) if metadata.is_file() => {}
        _ => return false,
    }

    let c_path = match CString::new(path.as_os_str().as_bytes()) {
        Ok(c_path) => c_path,
        Err(_) => return false,
    };

    // access(2) checks against the real uid/gid, not the effective ones.
    unsafe { libc::access(c_path.as_ptr(), libc::X_OK) == 0 }
}

#[cfg(test)]
mod test {
    use super::*;

    use crate::shell::test::{make_dummy_root, write_script};

    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn dummy_dirs(root: &Path) -> Vec<PathBuf> {
        vec![root.join("bin"), root.join("sbin")]
    }

    #[test]
    fn picks_up_executables_across_directories() {
        let root = make_dummy_root();
        let table = CommandTable::scan(&dummy_dirs(root.path())).unwrap();

        assert_eq!(table.names(), vec!["bar", "exit", "foo1", "foo3"]);
        assert_eq!(table.get("foo1").unwrap(), root.path().join("bin/foo1"));
        assert_eq!(table.get("foo3").unwrap(), root.path().join("sbin/foo3"));
    }

    #[test]
    fn skips_non_executables_and_directories() {
        let root = make_dummy_root();
        let table = CommandTable::scan(&dummy_dirs(root.path())).unwrap();

        // foo2 exists but isn't executable, subdir is a directory.
        assert!(!table.contains("foo2"));
        assert!(!table.contains("subdir"));
    }

    #[test]
    fn later_directory_wins() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        let third = TempDir::new().unwrap();
        write_script(&first.path().join("dup"), "exit 0");
        write_script(&second.path().join("dup"), "exit 0");
        write_script(&first.path().join("only-first"), "exit 0");

        let table =
            CommandTable::scan(&[first.path(), second.path(), third.path()]).unwrap();

        assert_eq!(table.get("dup").unwrap(), second.path().join("dup"));
        assert_eq!(
            table.get("only-first").unwrap(),
            first.path().join("only-first")
        );
    }

    #[test]
    fn exit_points_into_last_directory() {
        let first = TempDir::new().unwrap();
        let last = TempDir::new().unwrap();
        write_script(&first.path().join("exit"), "exit 251");

        let table = CommandTable::scan(&[first.path(), last.path()]).unwrap();

        // Even though only the first directory has one, and the last has no such file.
        assert_eq!(table.get("exit").unwrap(), last.path().join("exit"));
    }

    #[test]
    fn missing_directories_are_skipped() {
        let root = TempDir::new().unwrap();
        let missing = root.path().join("nope");

        let table = CommandTable::scan(&[&missing]).unwrap();

        assert_eq!(table.names(), vec!["exit"]);
        assert_eq!(table.get("exit").unwrap(), missing.join("exit"));
    }

    #[test]
    fn empty_search_path_is_an_error() {
        let dirs: Vec<PathBuf> = Vec::new();

        match CommandTable::scan(&dirs) {
            Err(IceError::EmptySearchPath { .. }) => {}
            other => panic!("expected an empty search path error, got {:?}", other),
        }
    }

    #[test]
    fn follows_symlinks() {
        let target_dir = TempDir::new().unwrap();
        let dir = TempDir::new().unwrap();
        write_script(&target_dir.path().join("real"), "exit 0");
        std::os::unix::fs::symlink(target_dir.path().join("real"), dir.path().join("alias"))
            .unwrap();
        std::os::unix::fs::symlink(target_dir.path(), dir.path().join("dirlink")).unwrap();

        let table = CommandTable::scan(&[dir.path()]).unwrap();

        assert!(table.contains("alias"));
        assert!(!table.contains("dirlink"));
    }

    mod completions {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn across_directories() {
            let root = make_dummy_root();
            let table = CommandTable::scan(&dummy_dirs(root.path())).unwrap();

            assert_eq!(table.complete("foo"), vec!["foo1", "foo3"]);
        }

        #[test]
        fn non_executables_are_not_offered() {
            let root = make_dummy_root();
            let table = CommandTable::scan(&dummy_dirs(root.path())).unwrap();

            assert!(table.complete("foo2").is_empty());
        }

        #[test]
        fn exit_is_always_offered() {
            let dir = TempDir::new().unwrap();
            let table = CommandTable::scan(&[dir.path()]).unwrap();

            assert_eq!(table.complete("ex"), vec!["exit"]);
        }

        #[test]
        fn prefix_is_literal() {
            let dir = TempDir::new().unwrap();
            write_script(&dir.path().join("axb"), "exit 0");
            write_script(&dir.path().join("a.b.c"), "exit 0");
            write_script(&dir.path().join("star"), "exit 0");

            let table = CommandTable::scan(&[dir.path()]).unwrap();

            assert_eq!(table.complete("a.b"), vec!["a.b.c"]);
            assert!(table.complete("s*").is_empty());
            assert!(table.complete("^s").is_empty());
            assert!(table.complete("[a]").is_empty());
        }

        #[test]
        fn empty_prefix_offers_everything() {
            let root = make_dummy_root();
            let table = CommandTable::scan(&dummy_dirs(root.path())).unwrap();

            assert_eq!(table.complete(""), table.names());
        }

        #[test]
        fn no_matches() {
            let root = make_dummy_root();
            let table = CommandTable::scan(&dummy_dirs(root.path())).unwrap();

            assert!(table.complete("idontexistlol").is_empty());
        }
    }
}
