//! Source tree scanning for the layering contract.

use std::fs;
use std::path::{Path, PathBuf};

/// A source line that broke a layering rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hit {
    pub path: String,
    pub line: usize,
    pub text: String,
}

/// A Rust file under the crate root, path kept relative with `/` separators.
pub struct SourceFile {
    pub path: String,
    pub text: String,
}

impl SourceFile {
    fn is_mod_rs(&self) -> bool {
        self.path == "mod.rs" || self.path.ends_with("/mod.rs")
    }

    fn hit(&self, index: usize, text: &str) -> Hit {
        Hit {
            path: self.path.clone(),
            line: index + 1,
            text: text.to_string(),
        }
    }
}

fn crate_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

/// Every `.rs` file below `dir`, depth first, sorted by path.
pub fn rust_sources(dir: &str) -> Vec<SourceFile> {
    let root = crate_root();
    let mut pending = vec![root.join(dir)];
    let mut paths = Vec::new();

    while let Some(next) = pending.pop() {
        let listing = fs::read_dir(&next)
            .unwrap_or_else(|e| panic!("cannot list {}: {e}", next.display()));
        for item in listing {
            let path = item.unwrap_or_else(|e| panic!("bad dir entry: {e}")).path();
            if path.is_dir() {
                pending.push(path);
            } else if path.extension().is_some_and(|ext| ext == "rs") {
                paths.push(path);
            }
        }
    }
    paths.sort();

    paths
        .into_iter()
        .map(|path| SourceFile {
            text: fs::read_to_string(&path)
                .unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display())),
            path: display_path(&root, &path),
        })
        .collect()
}

fn display_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

/// Lines under `dir` that mention any of `needles`.
pub fn lines_mentioning(dir: &str, needles: &[&str]) -> Vec<Hit> {
    rust_sources(dir)
        .iter()
        .flat_map(|file| {
            file.text
                .lines()
                .enumerate()
                .filter(|(_, line)| needles.iter().any(|needle| line.contains(needle)))
                .map(|(index, line)| file.hit(index, line))
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Lines in `mod.rs` files under `dir` that carry logic rather than
/// declarations. Multi-line `pub use` blocks count as declarations.
pub fn mod_file_logic(dir: &str) -> Vec<Hit> {
    let mut hits = Vec::new();

    for file in rust_sources(dir).iter().filter(|file| file.is_mod_rs()) {
        let mut open_use = false;
        for (index, raw) in file.text.lines().enumerate() {
            let line = raw.trim();
            if open_use || line.starts_with("pub use ") {
                open_use = !line.ends_with(';');
                continue;
            }
            let declaration = line.is_empty()
                || ["//", "pub mod ", "mod ", "#[cfg"]
                    .iter()
                    .any(|prefix| line.starts_with(prefix));
            if !declaration {
                hits.push(file.hit(index, raw));
            }
        }
    }

    hits
}

pub fn exists(path: &str) -> bool {
    crate_root().join(path).exists()
}

pub fn read(path: &str) -> String {
    fs::read_to_string(crate_root().join(path))
        .unwrap_or_else(|e| panic!("cannot read {path}: {e}"))
}
