//! Optional sibling-library discovery and import.
//!
//! Deciding whether a library is present ([`ModuleFinder`]) is kept apart from
//! importing it ([`ModuleImporter`]). The decision and the side effect can then
//! be tested independently and the host supplies whichever mechanism it has:
//! `importlib` inside Python, a directory scan from the CLI.

use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::ident::is_module_path;

/// Result of asking the host whether a library can be imported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Availability {
    Available,
    Unavailable,
    /// The lookup mechanism itself failed.
    DiscoveryError(String),
}

impl Availability {
    pub fn is_available(&self) -> bool {
        matches!(self, Availability::Available)
    }
}

/// Host module discovery.
pub trait ModuleFinder {
    fn find(&self, name: &str) -> Availability;
}

/// Host module import.
pub trait ModuleImporter {
    fn import(&mut self, name: &str) -> Result<(), ImportError>;
}

/// A library that was reported available could not be imported.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Failed to import '{name}': {reason}")]
pub struct ImportError {
    pub name: String,
    pub reason: String,
}

/// Errors from [`SiblingLoader::load_if_available`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("Module discovery failed while looking for '{name}': {reason}")]
    Discovery { name: String, reason: String },

    #[error(transparent)]
    Import(#[from] ImportError),
}

/// What [`SiblingLoader::load_if_available`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Imported,
    AlreadyLoaded,
    Absent,
}

/// Classify `name`. Malformed identifiers are never looked up and count as
/// unavailable.
pub fn classify<F: ModuleFinder + ?Sized>(finder: &F, name: &str) -> Availability {
    if !is_module_path(name) {
        return Availability::Unavailable;
    }
    finder.find(name)
}

/// Boolean availability signal. Never fails: a broken lookup is logged and
/// reported as `false`.
pub fn probe<F: ModuleFinder + ?Sized>(finder: &F, name: &str) -> bool {
    match classify(finder, name) {
        Availability::Available => true,
        Availability::Unavailable => false,
        Availability::DiscoveryError(reason) => {
            tracing::warn!(library = name, error = %reason, "Module discovery failed");
            false
        }
    }
}

/// Wraps a finder whose lookup of `a.b` imports the package `a` (Python's
/// `find_spec` does). Each parent is looked up first, outermost to innermost,
/// so a dotted name under a missing package resolves to the parent's answer
/// without the inner finder ever being asked for a child.
#[derive(Debug, Clone, Default)]
pub struct ParentsFirst<F>(pub F);

impl<F: ModuleFinder> ModuleFinder for ParentsFirst<F> {
    fn find(&self, name: &str) -> Availability {
        if let Some((parent, _)) = name.rsplit_once('.') {
            match self.find(parent) {
                Availability::Available => {}
                other => {
                    tracing::debug!(library = name, parent, "Parent package not found");
                    return other;
                }
            }
        }
        self.0.find(name)
    }
}

/// Imports optional siblings, each at most once.
#[derive(Debug, Default)]
pub struct SiblingLoader {
    loaded: BTreeSet<String>,
}

impl SiblingLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Import `name` if the finder reports it available and it has not been
    /// imported by this loader before.
    ///
    /// Absence is `Ok(LoadOutcome::Absent)`. A broken discovery mechanism and
    /// a failed import of a present library are errors. Nothing is retried.
    pub fn load_if_available<F, I>(
        &mut self,
        finder: &F,
        importer: &mut I,
        name: &str,
    ) -> Result<LoadOutcome, LoadError>
    where
        F: ModuleFinder + ?Sized,
        I: ModuleImporter + ?Sized,
    {
        if self.loaded.contains(name) {
            return Ok(LoadOutcome::AlreadyLoaded);
        }
        match classify(finder, name) {
            Availability::Available => {
                importer.import(name)?;
                tracing::info!(library = name, "Imported optional sibling library");
                self.loaded.insert(name.to_string());
                Ok(LoadOutcome::Imported)
            }
            Availability::Unavailable => {
                tracing::debug!(library = name, "Optional sibling library not found");
                Ok(LoadOutcome::Absent)
            }
            Availability::DiscoveryError(reason) => Err(LoadError::Discovery {
                name: name.to_string(),
                reason,
            }),
        }
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        self.loaded.contains(name)
    }

    /// Names imported so far, sorted.
    pub fn loaded(&self) -> Vec<String> {
        self.loaded.iter().cloned().collect()
    }
}

/// Finds libraries by scanning an ordered list of directories, the way a
/// Python path finder walks `sys.path`.
///
/// For `name = "a.b"` and a search directory `d`, the candidates live in
/// `d/a/` and are: `b.py`, `b/__init__.py`, `b.so`, `libb.so`, `b.dylib`,
/// `b.dll`, and extension modules such as `b.cpython-311-x86_64-linux-gnu.so`
/// or `b.cp311-win_amd64.pyd`.
#[derive(Debug, Clone, Default)]
pub struct SearchPathFinder {
    dirs: Vec<PathBuf>,
}

impl SearchPathFinder {
    pub fn new(dirs: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            dirs: dirs.into_iter().collect(),
        }
    }

    /// Search the directories listed in the path-list environment variable
    /// `var`. An unset variable yields an empty search path.
    pub fn from_env(var: &str) -> Self {
        Self::default().with_env(var)
    }

    /// Append the directories listed in `var`.
    pub fn with_env(mut self, var: &str) -> Self {
        if let Some(paths) = std::env::var_os(var) {
            self.dirs
                .extend(std::env::split_paths(&paths).filter(|p| !p.as_os_str().is_empty()));
        }
        self
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Whether `dir` holds a candidate for `name`.
    ///
    /// A search-path entry that cannot be listed (missing, not a directory,
    /// permission denied) holds nothing. One stale entry must not hide the
    /// rest of the path.
    fn find_in(&self, dir: &Path, name: &str) -> bool {
        let mut segments: Vec<&str> = name.split('.').collect();
        let leaf = match segments.pop() {
            Some(leaf) => leaf,
            None => return false,
        };
        let base = segments.iter().fold(dir.to_path_buf(), |p, s| p.join(s));

        let entries = match fs::read_dir(&base) {
            Ok(entries) => entries,
            Err(e) => {
                if e.kind() != io::ErrorKind::NotFound {
                    tracing::debug!(dir = %base.display(), error = %e, "Skipping search path entry");
                }
                return false;
            }
        };

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::debug!(dir = %base.display(), error = %e, "Skipping unreadable entry");
                    continue;
                }
            };
            let file_name = entry.file_name();
            if candidate_matches(&file_name, leaf)
                || (file_name.to_str() == Some(leaf) && entry.path().join("__init__.py").is_file())
            {
                return true;
            }
        }
        false
    }
}

fn candidate_matches(file_name: &OsStr, leaf: &str) -> bool {
    let file_name = match file_name.to_str() {
        Some(f) => f,
        None => return false,
    };
    let exact = [
        format!("{}.py", leaf),
        format!("{}.so", leaf),
        format!("lib{}.so", leaf),
        format!("{}.dylib", leaf),
        format!("{}.dll", leaf),
    ];
    if exact.iter().any(|c| c == file_name) {
        return true;
    }
    file_name
        .strip_prefix(leaf)
        .and_then(|rest| rest.strip_prefix('.'))
        .map(|rest| rest.ends_with(".so") || rest.ends_with(".pyd"))
        .unwrap_or(false)
}

impl ModuleFinder for SearchPathFinder {
    /// A directory scan has no mechanism that can break as a whole, so this
    /// finder only ever answers `Available` or `Unavailable`.
    fn find(&self, name: &str) -> Availability {
        if self.dirs.iter().any(|dir| self.find_in(dir, name)) {
            Availability::Available
        } else {
            Availability::Unavailable
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    struct StaticFinder(HashMap<&'static str, Availability>);

    impl ModuleFinder for StaticFinder {
        fn find(&self, name: &str) -> Availability {
            self.0.get(name).cloned().unwrap_or(Availability::Unavailable)
        }
    }

    #[derive(Default)]
    struct CountingImporter {
        imports: Vec<String>,
        fail: bool,
    }

    impl ModuleImporter for CountingImporter {
        fn import(&mut self, name: &str) -> Result<(), ImportError> {
            if self.fail {
                return Err(ImportError {
                    name: name.to_string(),
                    reason: "boom".to_string(),
                });
            }
            self.imports.push(name.to_string());
            Ok(())
        }
    }

    fn finder() -> StaticFinder {
        StaticFinder(HashMap::from([
            ("vxl", Availability::Available),
            ("broken", Availability::DiscoveryError("finder offline".to_string())),
        ]))
    }

    #[test]
    fn test_probe_missing_is_false() {
        assert!(!probe(&finder(), "definitely_not_a_module"));
    }

    #[test]
    fn test_probe_discovery_error_is_swallowed() {
        assert!(!probe(&finder(), "broken"));
    }

    #[test]
    fn test_probe_present_is_true() {
        assert!(probe(&finder(), "vxl"));
    }

    #[test]
    fn test_malformed_name_not_looked_up() {
        let f = StaticFinder(HashMap::from([("../vxl", Availability::Available)]));
        assert_eq!(classify(&f, "../vxl"), Availability::Unavailable);
    }

    struct RecordingFinder {
        present: &'static [&'static str],
        asked: std::cell::RefCell<Vec<String>>,
    }

    impl ModuleFinder for RecordingFinder {
        fn find(&self, name: &str) -> Availability {
            self.asked.borrow_mut().push(name.to_string());
            if self.present.iter().any(|p| *p == name) {
                Availability::Available
            } else {
                Availability::Unavailable
            }
        }
    }

    #[test]
    fn test_parents_first_stops_at_missing_package() {
        let finder = ParentsFirst(RecordingFinder {
            present: &["vxl.vgl"],
            asked: Default::default(),
        });
        assert_eq!(finder.find("vxl.vgl"), Availability::Unavailable);
        assert_eq!(*finder.0.asked.borrow(), vec!["vxl"]);
    }

    #[test]
    fn test_parents_first_walks_outermost_first() {
        let finder = ParentsFirst(RecordingFinder {
            present: &["vxl", "vxl.vgl", "vxl.vgl.algo"],
            asked: Default::default(),
        });
        assert_eq!(classify(&finder, "vxl.vgl.algo"), Availability::Available);
        assert_eq!(*finder.0.asked.borrow(), vec!["vxl", "vxl.vgl", "vxl.vgl.algo"]);
    }

    #[test]
    fn test_parents_first_passes_parent_error_through() {
        let finder = ParentsFirst(StaticFinder(HashMap::from([
            ("broken", Availability::DiscoveryError("finder offline".to_string())),
            ("broken.child", Availability::Available),
        ])));
        assert_eq!(
            finder.find("broken.child"),
            Availability::DiscoveryError("finder offline".to_string())
        );
        assert!(!probe(&finder, "broken.child"));
    }

    #[test]
    fn test_load_imports_exactly_once() {
        let mut loader = SiblingLoader::new();
        let mut importer = CountingImporter::default();

        let first = loader.load_if_available(&finder(), &mut importer, "vxl");
        let second = loader.load_if_available(&finder(), &mut importer, "vxl");

        assert_eq!(first, Ok(LoadOutcome::Imported));
        assert_eq!(second, Ok(LoadOutcome::AlreadyLoaded));
        assert_eq!(importer.imports, vec!["vxl"]);
        assert!(loader.is_loaded("vxl"));
    }

    #[test]
    fn test_load_absent_does_not_import() {
        let mut loader = SiblingLoader::new();
        let mut importer = CountingImporter::default();

        let outcome = loader.load_if_available(&finder(), &mut importer, "missing");
        assert_eq!(outcome, Ok(LoadOutcome::Absent));
        assert!(importer.imports.is_empty());
        assert!(loader.loaded().is_empty());
    }

    #[test]
    fn test_load_discovery_error_propagates() {
        let mut loader = SiblingLoader::new();
        let mut importer = CountingImporter::default();

        let err = loader
            .load_if_available(&finder(), &mut importer, "broken")
            .unwrap_err();
        assert!(matches!(err, LoadError::Discovery { ref name, .. } if name == "broken"));
        assert!(importer.imports.is_empty());
    }

    #[test]
    fn test_load_import_failure_not_recorded() {
        let mut loader = SiblingLoader::new();
        let mut importer = CountingImporter {
            fail: true,
            ..Default::default()
        };

        let err = loader.load_if_available(&finder(), &mut importer, "vxl");
        assert!(matches!(err, Err(LoadError::Import(_))));
        assert!(!loader.is_loaded("vxl"));
    }

    #[test]
    fn test_search_path_module_file() {
        let tmp = tempdir().expect("create temp dir");
        fs::write(tmp.path().join("vxl.py"), "").unwrap();

        let finder = SearchPathFinder::new([tmp.path().to_path_buf()]);
        assert_eq!(finder.find("vxl"), Availability::Available);
        assert_eq!(finder.find("vgl"), Availability::Unavailable);
    }

    #[test]
    fn test_search_path_package_and_submodule() {
        let tmp = tempdir().expect("create temp dir");
        let pkg = tmp.path().join("vxl");
        fs::create_dir(&pkg).unwrap();
        fs::write(pkg.join("__init__.py"), "").unwrap();
        fs::write(pkg.join("vgl.cpython-311-x86_64-linux-gnu.so"), "").unwrap();

        let finder = SearchPathFinder::new([tmp.path().to_path_buf()]);
        assert!(finder.find("vxl").is_available());
        assert!(finder.find("vxl.vgl").is_available());
        assert!(!finder.find("vxl.vpgl").is_available());
    }

    #[test]
    fn test_search_path_directory_without_init_is_not_a_package() {
        let tmp = tempdir().expect("create temp dir");
        fs::create_dir(tmp.path().join("vxl")).unwrap();

        let finder = SearchPathFinder::new([tmp.path().to_path_buf()]);
        assert_eq!(finder.find("vxl"), Availability::Unavailable);
    }

    #[test]
    fn test_search_path_shared_libraries() {
        let tmp = tempdir().expect("create temp dir");
        fs::write(tmp.path().join("libvxl.so"), "").unwrap();
        fs::write(tmp.path().join("vgl.dylib"), "").unwrap();

        let finder = SearchPathFinder::new([tmp.path().to_path_buf()]);
        assert!(finder.find("vxl").is_available());
        assert!(finder.find("vgl").is_available());
        // Prefix alone is not enough
        assert!(!finder.find("vg").is_available());
    }

    #[test]
    fn test_search_path_skips_missing_dirs() {
        let tmp = tempdir().expect("create temp dir");
        fs::write(tmp.path().join("vxl.py"), "").unwrap();

        let finder = SearchPathFinder::new([
            tmp.path().join("does-not-exist"),
            tmp.path().to_path_buf(),
        ]);
        assert!(finder.find("vxl").is_available());
    }

    #[test]
    fn test_search_path_skips_entries_that_are_not_directories() {
        let tmp = tempdir().expect("create temp dir");
        let file = tmp.path().join("not_a_dir");
        fs::write(&file, "").unwrap();
        fs::write(tmp.path().join("vxl.py"), "").unwrap();

        // Listing `not_a_dir/sub` fails with ENOTDIR
        let finder = SearchPathFinder::new([file.join("sub"), tmp.path().to_path_buf()]);
        assert_eq!(finder.find("vxl"), Availability::Available);
        assert_eq!(
            SearchPathFinder::new([file.join("sub")]).find("vxl"),
            Availability::Unavailable
        );

        let mut importer = crate::RecordingImporter::default();
        let module = crate::Bootstrap::default()
            .run(&finder, &mut importer)
            .expect("stale search path entry must not abort bootstrap");
        assert_eq!(module.siblings(), vec!["vxl"]);
        assert_eq!(importer.imported(), &["vxl".to_string()]);
    }

    #[test]
    fn test_search_path_from_env() {
        let tmp = tempdir().expect("create temp dir");
        fs::write(tmp.path().join("vxl.py"), "").unwrap();

        let var = "HELLO_CORE_TEST_SEARCH_PATH";
        std::env::set_var(var, tmp.path());
        let finder = SearchPathFinder::from_env(var);
        std::env::remove_var(var);

        assert_eq!(finder.dirs(), &[tmp.path().to_path_buf()]);
        assert!(finder.find("vxl").is_available());
        assert!(SearchPathFinder::from_env("HELLO_CORE_TEST_UNSET_VAR")
            .dirs()
            .is_empty());
    }
}
