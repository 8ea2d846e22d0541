//! Import resolution against a local dependency directory
//!
//! `solc --standard-json` has no callback for missing files, so every unit an
//! `import` reaches is read up front and handed to the compiler as a source.

use std::collections::{BTreeMap, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use memecoin_core::{CompilationError, Error, Result};
use regex::Regex;
use tracing::{debug, error};

use super::SourceFile;

fn import_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?m)^\s*import\s+(?:[^;]*?\s+from\s+)?["']([^"']+)["']"#)
            .expect("valid import pattern")
    })
}

/// Paths named by the `import` statements of a source unit
pub fn import_paths(source: &str) -> Vec<String> {
    import_pattern()
        .captures_iter(source)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Resolve an import path to a unit name, relative imports against `importer`
pub fn resolve_unit_name(importer: &str, import: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    if import.starts_with("./") || import.starts_with("../") {
        parts.extend(importer.split('/'));
        parts.pop();
    }

    for segment in import.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if matches!(parts.last(), None | Some(&"..")) {
                    parts.push("..");
                } else {
                    parts.pop();
                }
            }
            other => parts.push(other),
        }
    }

    parts.join("/")
}

/// Loads imported units from a dependency directory
#[derive(Debug, Clone)]
pub struct ImportResolver {
    root: PathBuf,
}

impl ImportResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Add every transitively imported unit to `sources`
    pub fn resolve(&self, sources: &mut BTreeMap<String, SourceFile>) -> Result<()> {
        let mut pending: VecDeque<String> = sources.keys().cloned().collect();

        while let Some(unit) = pending.pop_front() {
            let imports = match sources.get(&unit) {
                Some(file) => import_paths(&file.content),
                None => continue,
            };

            for import in imports {
                let name = resolve_unit_name(&unit, &import);
                if sources.contains_key(&name) {
                    continue;
                }

                let content = self.load(&name)?;
                debug!(unit = %name, "Resolved import");
                sources.insert(name.clone(), SourceFile { content });
                pending.push_back(name);
            }
        }

        Ok(())
    }

    fn load(&self, name: &str) -> Result<String> {
        if name.split('/').any(|segment| segment == "..") {
            return Err(CompilationError::UnresolvedImport(name.to_string()).into());
        }

        fs::read_to_string(self.root.join(name)).map_err(|e| {
            error!("Error loading import {}: {}", name, e);
            Error::from(CompilationError::UnresolvedImport(name.to_string()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_forms() {
        let source = r#"
pragma solidity ^0.8.20;
import "@openzeppelin/contracts/token/ERC20/ERC20.sol";
import {Context} from "../../utils/Context.sol";
import * as Math from './math/Math.sol';
import {
    IERC20,
    IERC20Metadata
} from "./extensions/IERC20Metadata.sol";
// a comment mentioning import "nothing.sol" is not an import statement
contract X {}
"#;

        assert_eq!(
            import_paths(source),
            vec![
                "@openzeppelin/contracts/token/ERC20/ERC20.sol",
                "../../utils/Context.sol",
                "./math/Math.sol",
                "./extensions/IERC20Metadata.sol",
            ]
        );
    }

    #[test]
    fn test_relative_imports_resolve_against_importer() {
        let importer = "@openzeppelin/contracts/token/ERC20/ERC20.sol";

        assert_eq!(
            resolve_unit_name(importer, "./IERC20.sol"),
            "@openzeppelin/contracts/token/ERC20/IERC20.sol"
        );
        assert_eq!(
            resolve_unit_name(importer, "../../utils/Context.sol"),
            "@openzeppelin/contracts/utils/Context.sol"
        );
        assert_eq!(
            resolve_unit_name("Token.sol", "@openzeppelin/contracts/access/Ownable.sol"),
            "@openzeppelin/contracts/access/Ownable.sol"
        );
        assert_eq!(resolve_unit_name("Token.sol", "../outside.sol"), "../outside.sol");
    }

    #[test]
    fn test_resolve_loads_transitive_imports() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("@lib/contracts");
        fs::create_dir_all(base.join("utils")).unwrap();
        fs::write(
            base.join("Token.sol"),
            "import \"./utils/Context.sol\";\ncontract Base {}",
        )
        .unwrap();
        fs::write(base.join("utils/Context.sol"), "contract Context {}").unwrap();

        let mut sources = BTreeMap::new();
        sources.insert(
            "Token.sol".to_string(),
            SourceFile {
                content: "import \"@lib/contracts/Token.sol\";\ncontract Mine is Base {}".to_string(),
            },
        );

        ImportResolver::new(dir.path()).resolve(&mut sources).unwrap();

        let names: Vec<&str> = sources.keys().map(String::as_str).collect();
        assert_eq!(
            names,
            vec![
                "@lib/contracts/Token.sol",
                "@lib/contracts/utils/Context.sol",
                "Token.sol",
            ]
        );
        assert_eq!(sources["@lib/contracts/utils/Context.sol"].content, "contract Context {}");
    }

    #[test]
    fn test_missing_import_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut sources = BTreeMap::new();
        sources.insert(
            "Token.sol".to_string(),
            SourceFile {
                content: "import \"@openzeppelin/contracts/access/Ownable.sol\";".to_string(),
            },
        );

        let err = ImportResolver::new(dir.path()).resolve(&mut sources).unwrap_err();
        assert!(matches!(
            err,
            Error::Compilation(CompilationError::UnresolvedImport(path))
                if path == "@openzeppelin/contracts/access/Ownable.sol"
        ));
    }

    #[test]
    fn test_imports_cannot_escape_the_dependency_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut sources = BTreeMap::new();
        sources.insert(
            "Token.sol".to_string(),
            SourceFile {
                content: "import \"../secrets.sol\";".to_string(),
            },
        );

        assert!(ImportResolver::new(dir.path()).resolve(&mut sources).is_err());
    }
}
