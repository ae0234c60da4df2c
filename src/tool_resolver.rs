//! # Tool Path Resolver
//!
//! Finds the optimizer executable the same way the OS will when it is
//! spawned: explicit paths are checked directly, bare names are searched
//! on `PATH`. Only used for the pre-flight diagnostic; a missing tool is
//! still reported per file by the invoker.

use std::env;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Tool path resolver for the current environment
pub struct ToolPathResolver {
    search_path: Option<std::ffi::OsString>,
}

impl ToolPathResolver {
    /// Resolver over the process `PATH`
    pub fn new() -> Self {
        Self {
            search_path: env::var_os("PATH"),
        }
    }

    /// Resolver over an explicit search path (same syntax as `PATH`)
    pub fn with_search_path(search_path: impl AsRef<OsStr>) -> Self {
        Self {
            search_path: Some(search_path.as_ref().to_os_string()),
        }
    }

    /// Resolve the path to a specific tool
    pub fn resolve_tool(&self, tool_name: &str) -> Option<PathBuf> {
        let direct = Path::new(tool_name);
        if direct.components().count() > 1 {
            debug!("Checking explicit tool path: {:?}", direct);
            return is_executable(direct).then(|| direct.to_path_buf());
        }

        let found = self.find_in_system_path(tool_name);
        debug!("Resolved tool {} -> {:?}", tool_name, found);
        found
    }

    fn find_in_system_path(&self, tool_name: &str) -> Option<PathBuf> {
        let extension = if cfg!(windows) { ".exe" } else { "" };
        let tool_with_ext = if tool_name.ends_with(extension) {
            tool_name.to_string()
        } else {
            format!("{}{}", tool_name, extension)
        };

        env::split_paths(self.search_path.as_ref()?)
            .map(|dir| dir.join(&tool_with_ext))
            .find(|path| is_executable(path))
    }
}

/// A regular file the OS would agree to run
#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

impl Default for ToolPathResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn tool_file_name(name: &str) -> String {
        if cfg!(windows) {
            format!("{name}.exe")
        } else {
            name.to_string()
        }
    }

    fn install_tool(path: &Path) {
        std::fs::write(path, b"").unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
        }
    }

    #[test]
    fn test_resolve_tool_on_search_path() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        let tool = second.path().join(tool_file_name("fakeopt"));
        install_tool(&tool);

        let search = env::join_paths([first.path(), second.path()]).unwrap();
        let resolver = ToolPathResolver::with_search_path(&search);

        assert_eq!(resolver.resolve_tool("fakeopt"), Some(tool));
        assert!(resolver.resolve_tool("missingopt").is_none());
    }

    #[test]
    fn test_resolve_tool_explicit_path() {
        let dir = TempDir::new().unwrap();
        let tool = dir.path().join("opt.sh");
        install_tool(&tool);

        let resolver = ToolPathResolver::with_search_path("");
        let explicit = tool.to_string_lossy().into_owned();
        assert_eq!(resolver.resolve_tool(&explicit), Some(tool));
        assert!(resolver
            .resolve_tool(&dir.path().join("nope").to_string_lossy())
            .is_none());
    }

    #[test]
    fn test_resolve_tool_ignores_directories() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join(tool_file_name("optipng"))).unwrap();

        let resolver = ToolPathResolver::with_search_path(dir.path());
        assert!(resolver.resolve_tool("optipng").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_tool_skips_non_executable_files() {
        let shadow = TempDir::new().unwrap();
        let real = TempDir::new().unwrap();
        std::fs::write(shadow.path().join("optipng"), b"").unwrap();
        let tool = real.path().join("optipng");
        install_tool(&tool);

        let search = env::join_paths([shadow.path(), real.path()]).unwrap();
        let resolver = ToolPathResolver::with_search_path(&search);
        assert_eq!(resolver.resolve_tool("optipng"), Some(tool));

        let only_shadow = ToolPathResolver::with_search_path(shadow.path());
        assert!(only_shadow.resolve_tool("optipng").is_none());

        let explicit = shadow.path().join("optipng").to_string_lossy().into_owned();
        assert!(only_shadow.resolve_tool(&explicit).is_none());
    }
}
