//! Include resolver (C7): depth-first pre-order walk of the inclusion
//! graph rooted at the top netlist.
//!
//! The resolver only scans lines for `include` directives; it never parses
//! a file's cards. A visited-set keyed by canonicalized path, carried down
//! the current recursion path, turns a revisited ancestor into a fatal
//! [`NetlateError::IncludeCycle`] instead of recursing forever — the tool
//! this resolver derives from has no such guard.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::{NetlateError, Result};

/// One discovered file, in the order the pre-order traversal visits it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludedFile {
    pub dir: String,
    pub basename: String,
    pub ext: String,
    pub depth: u32,
}

impl IncludedFile {
    pub fn path(&self) -> PathBuf {
        Path::new(&self.dir).join(format!("{}.{}", self.basename, self.ext))
    }
}

/// Resolve the full inclusion graph starting from `root_dir/top_basename.top_ext`.
pub fn resolve(root_dir: &Path, top_basename: &str, top_ext: &str) -> Result<Vec<IncludedFile>> {
    let mut hierarchy = Vec::new();
    let mut on_path = HashSet::new();
    resolve_rec(root_dir, "", top_basename, top_ext, 0, &mut hierarchy, &mut on_path)?;
    Ok(hierarchy)
}

#[allow(clippy::too_many_arguments)]
fn resolve_rec(
    parent_dir: &Path,
    sub_path: &str,
    basename: &str,
    ext: &str,
    depth: u32,
    hierarchy: &mut Vec<IncludedFile>,
    on_path: &mut HashSet<PathBuf>,
) -> Result<()> {
    let dir = parent_dir.join(sub_path);
    let file_path = dir.join(format!("{basename}.{ext}"));

    let canonical = std::fs::canonicalize(&file_path).map_err(|_| NetlateError::IncludeMissing {
        path: file_path.clone(),
    })?;

    if on_path.contains(&canonical) {
        return Err(NetlateError::IncludeCycle { path: canonical });
    }

    let text = std::fs::read_to_string(&file_path).map_err(|source| NetlateError::Io {
        path: file_path.clone(),
        source,
    })?;

    hierarchy.push(IncludedFile {
        dir: dir.to_string_lossy().into_owned(),
        basename: basename.to_string(),
        ext: ext.to_string(),
        depth,
    });

    on_path.insert(canonical.clone());

    for line in text.lines() {
        if line.starts_with("include") {
            let (child_sub, child_basename, child_ext) = parse_include_line(line)?;
            let combined_sub = format!("{sub_path}{child_sub}");
            resolve_rec(parent_dir, &combined_sub, &child_basename, &child_ext, depth + 1, hierarchy, on_path)?;
        }
    }

    on_path.remove(&canonical);
    Ok(())
}

/// Extract `(path_prefix, basename, ext)` from a raw `include "…/name.ext"`
/// line. Only the quoted path matters; everything outside it is ignored.
fn parse_include_line(line: &str) -> Result<(String, String, String)> {
    let first = line.find('"').ok_or_else(|| NetlateError::IncludeMalformed { text: line.to_string() })?;
    let rest = &line[first + 1..];
    let second = rest.find('"').ok_or_else(|| NetlateError::IncludeMalformed { text: line.to_string() })?;
    let inner = &rest[..second];

    let (path_prefix, filename) = match inner.rfind('/') {
        Some(idx) => (inner[..=idx].to_string(), inner[idx + 1..].to_string()),
        None => (String::new(), inner.to_string()),
    };
    let (basename, ext) = filename
        .rfind('.')
        .map(|idx| (filename[..idx].to_string(), filename[idx + 1..].to_string()))
        .ok_or_else(|| NetlateError::IncludeMalformed { text: line.to_string() })?;

    Ok((path_prefix, basename, ext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn resolves_single_level_include_tree() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("top.scs"), "include \"sub.scs\"\nR1 a b resistor r=1\n").unwrap();
        fs::write(dir.path().join("sub.scs"), "model m bsim4 a=1\n").unwrap();

        let files = resolve(dir.path(), "top", "scs").unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].basename, "top");
        assert_eq!(files[0].depth, 0);
        assert_eq!(files[1].basename, "sub");
        assert_eq!(files[1].depth, 1);
    }

    #[test]
    fn missing_include_target_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("top.scs"), "include \"missing.scs\"\n").unwrap();

        let err = resolve(dir.path(), "top", "scs").unwrap_err();
        assert!(matches!(err, NetlateError::IncludeMissing { .. }));
    }

    #[test]
    fn include_cycle_is_detected_and_rejected() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.scs"), "include \"b.scs\"\n").unwrap();
        fs::write(dir.path().join("b.scs"), "include \"a.scs\"\n").unwrap();

        let err = resolve(dir.path(), "a", "scs").unwrap_err();
        assert!(matches!(err, NetlateError::IncludeCycle { .. }));
    }

    #[test]
    fn subdirectory_include_concatenates_path_prefix() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("lib")).unwrap();
        fs::write(dir.path().join("top.scs"), "include \"lib/sub.scs\"\n").unwrap();
        fs::write(dir.path().join("lib/sub.scs"), "model m bsim4 a=1\n").unwrap();

        let files = resolve(dir.path(), "top", "scs").unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[1].dir, dir.path().join("lib").to_string_lossy());
    }
}
