//! Configuration file discovery.
//!
//! Discovers `.esq.toml` files by walking up the directory tree from a starting
//! point, then appending the global `~/.esq.toml` if present.

use std::path::{Path, PathBuf};

use directories::BaseDirs;

use crate::parse::is_root_config;

/// The configuration filename.
pub const CONFIG_FILENAME: &str = ".esq.toml";

/// Discovers all configuration files relevant to the given directory.
///
/// Returns paths in precedence order: closest to `cwd` first, global
/// (`~/.esq.toml`) last. Walking stops at the first file with `root = true`;
/// the global file is skipped in that case.
pub fn discover_config_files(cwd: &Path) -> Vec<PathBuf> {
    let mut configs = Vec::new();
    let mut found_root = false;

    let mut current = Some(cwd);
    while let Some(dir) = current {
        let config_path = dir.join(CONFIG_FILENAME);
        if config_path.is_file() {
            let is_root = is_root_config(&config_path);
            configs.push(config_path);
            if is_root {
                found_root = true;
                break;
            }
        }
        current = dir.parent();
    }

    if !found_root
        && let Some(global_path) = global_config_path()
        && global_path.is_file()
        && !configs.contains(&global_path)
    {
        configs.push(global_path);
    }

    configs
}

/// Returns the path to the global configuration file (`~/.esq.toml`).
///
/// Returns `None` if the home directory cannot be determined.
pub fn global_config_path() -> Option<PathBuf> {
    BaseDirs::new().map(|dirs| dirs.home_dir().join(CONFIG_FILENAME))
}

/// Checks if a path is the global configuration file.
pub fn is_global_config(path: &Path) -> bool {
    global_config_path().is_some_and(|global| path == global)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestDir;

    /// Discovered configs, minus the global one of whoever runs the tests.
    fn local_configs(cwd: &Path) -> Vec<PathBuf> {
        discover_config_files(cwd)
            .into_iter()
            .filter(|p| !is_global_config(p))
            .collect()
    }

    #[test]
    fn test_finds_nothing_without_configs() {
        let test_dir = TestDir::new();
        let subdir = test_dir.create_dir("a/b/c");
        assert!(local_configs(&subdir).is_empty());
    }

    #[test]
    fn test_closest_config_comes_first() {
        let test_dir = TestDir::new();
        let top = test_dir.create_config("");
        let mid = test_dir.create_config("a/b");
        let working_dir = test_dir.create_dir("a/b/c");

        assert_eq!(local_configs(&working_dir), vec![mid, top]);
    }

    #[test]
    fn test_root_config_stops_discovery() {
        let test_dir = TestDir::new();
        test_dir.create_config("");
        let root = test_dir.create_root_config("project");
        let child = test_dir.create_config("project/sub");
        let working_dir = test_dir.create_dir("project/sub/deep");

        // The global config is skipped too.
        assert_eq!(discover_config_files(&working_dir), vec![child, root]);
    }

    #[test]
    fn test_root_false_keeps_walking() {
        let test_dir = TestDir::new();
        let top = test_dir.create_config("");
        let mid = test_dir.create_config_with_content("project", "root = false\n");
        let working_dir = test_dir.create_dir("project/src");

        assert_eq!(local_configs(&working_dir), vec![mid, top]);
    }

    #[test]
    fn test_directories_named_like_configs_are_skipped() {
        let test_dir = TestDir::new();
        test_dir.create_dir(CONFIG_FILENAME);
        let subdir = test_dir.create_dir("sub");
        assert!(local_configs(&subdir).is_empty());
    }

    #[test]
    fn test_global_path_uses_config_filename() {
        let path = global_config_path().unwrap();
        assert!(path.ends_with(CONFIG_FILENAME));
        assert!(is_global_config(&path));
        assert!(!is_global_config(Path::new("/elsewhere/.esq.toml")));
    }
}
