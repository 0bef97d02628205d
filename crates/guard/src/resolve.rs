//! Path resolution and containment checks for manifest entries
//!
//! Manifest paths are attacker-controlled text. Before a file is opened its
//! path is resolved the way the kernel would resolve it (every existing
//! symlink followed) and must land strictly inside the model directory.
//! Components that do not exist yet are applied lexically so a missing file
//! still has a well-defined location to report against.

use std::ffi::OsString;
use std::io;
use std::path::{Component, Path, PathBuf, MAIN_SEPARATOR_STR};

/// Symlink hops allowed during one resolution, same bound as Linux `ELOOP`
const MAX_LINK_HOPS: usize = 40;

/// Result of resolving a manifest path against a model root
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Canonical path strictly below the root
    Contained(PathBuf),
    /// Canonical path outside the root (or the root itself)
    Escapes(PathBuf),
}

enum Part {
    Prefix(OsString),
    Root,
    Parent,
    Name(OsString),
}

fn parts(path: &Path) -> Vec<Part> {
    path.components()
        .filter_map(|component| match component {
            Component::Prefix(prefix) => Some(Part::Prefix(prefix.as_os_str().to_os_string())),
            Component::RootDir => Some(Part::Root),
            Component::CurDir => None,
            Component::ParentDir => Some(Part::Parent),
            Component::Normal(name) => Some(Part::Name(name.to_os_string())),
        })
        .collect()
}

fn is_missing(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
    )
}

/// Canonicalize `path`, tolerating components that do not exist
///
/// Existing symlinks (dangling ones included) are followed. Once a
/// component is missing the rest of the path is applied lexically.
/// Relative input is taken relative to the current directory.
///
/// # Errors
///
/// Returns an error on symlink loops or when a component cannot be
/// inspected (for example permission denied).
pub fn soft_canonicalize(path: &Path) -> io::Result<PathBuf> {
    let mut stack = parts(path);
    if path.is_relative() {
        stack.splice(0..0, parts(&std::env::current_dir()?));
    }
    stack.reverse();

    let mut resolved = PathBuf::new();
    let mut hops = 0;

    while let Some(part) = stack.pop() {
        match part {
            Part::Prefix(prefix) => resolved = PathBuf::from(prefix),
            Part::Root => {
                resolved = match resolved.components().next() {
                    Some(Component::Prefix(prefix)) => {
                        PathBuf::from(prefix.as_os_str()).join(MAIN_SEPARATOR_STR)
                    }
                    _ => PathBuf::from(MAIN_SEPARATOR_STR),
                };
            }
            Part::Parent => {
                resolved.pop();
            }
            Part::Name(name) => {
                let candidate = resolved.join(&name);
                match std::fs::symlink_metadata(&candidate) {
                    Ok(meta) if meta.file_type().is_symlink() => {
                        hops += 1;
                        if hops > MAX_LINK_HOPS {
                            return Err(io::Error::other(format!(
                                "too many levels of symbolic links: {}",
                                path.display()
                            )));
                        }
                        let target = std::fs::read_link(&candidate)?;
                        let mut target_parts = parts(&target);
                        target_parts.reverse();
                        stack.extend(target_parts);
                    }
                    Ok(_) => resolved = candidate,
                    Err(e) if is_missing(&e) => resolved = candidate,
                    Err(e) => return Err(e),
                }
            }
        }
    }

    Ok(resolved)
}

/// True when `candidate` lies strictly below `root`
///
/// Both paths must already be canonical. Comparison is per component, so
/// `/models/a-b` is not inside `/models/a`.
#[must_use]
pub fn is_contained(root: &Path, candidate: &Path) -> bool {
    candidate != root && candidate.starts_with(root)
}

/// Resolve a manifest-declared path against a canonical model root
///
/// An absolute `relative` replaces the root and therefore escapes.
///
/// # Errors
///
/// Propagates errors from [`soft_canonicalize`].
pub fn resolve_entry(root: &Path, relative: &str) -> io::Result<Resolution> {
    let resolved = soft_canonicalize(&root.join(relative))?;
    if is_contained(root, &resolved) {
        Ok(Resolution::Contained(resolved))
    } else {
        Ok(Resolution::Escapes(resolved))
    }
}
