use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use crate::host::ToolLocator;

/// Resolves tools by scanning a PATH value, the way a shell would.
#[derive(Debug, Clone)]
pub struct PathLocator {
    path: String,
    pathext: Vec<String>,
    windows: bool,
}

impl PathLocator {
    pub fn from_vars(vars: &BTreeMap<String, String>) -> Self {
        let path = vars
            .get("PATH")
            .or_else(|| vars.get("Path"))
            .cloned()
            .unwrap_or_default();

        Self {
            path,
            pathext: pathext_list(vars),
            windows: cfg!(windows),
        }
    }

    fn separator(&self) -> char {
        if self.windows {
            ';'
        } else {
            ':'
        }
    }

    fn candidates(&self, dir: &Path, tool: &str) -> Vec<PathBuf> {
        if !self.windows || tool.contains('.') {
            return vec![dir.join(tool)];
        }
        self.pathext
            .iter()
            .map(|ext| dir.join(format!("{tool}{ext}")))
            .collect()
    }
}

impl ToolLocator for PathLocator {
    fn locate(&self, tool: &str) -> Option<PathBuf> {
        // If it contains a path separator, treat as a path.
        if tool.contains('/') || tool.contains('\\') {
            let p = Path::new(tool);
            return is_executable(p).then(|| p.to_path_buf());
        }

        self.path
            .split(self.separator())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .flat_map(|dir| self.candidates(Path::new(dir), tool))
            .find(|p| is_executable(p))
    }
}

fn pathext_list(vars: &BTreeMap<String, String>) -> Vec<String> {
    let raw = vars
        .get("PATHEXT")
        .map(|s| s.as_str())
        .unwrap_or(".COM;.EXE;.BAT;.CMD");

    raw.split(';')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| {
            if p.starts_with('.') {
                p.to_ascii_lowercase()
            } else {
                format!(".{}", p.to_ascii_lowercase())
            }
        })
        .collect()
}

#[cfg(unix)]
fn is_executable(p: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(p)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(p: &Path) -> bool {
    p.is_file()
}
