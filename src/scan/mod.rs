//! Static type-hierarchy discovery.
//!
//! The browser runtime has no type introspection, so implementors of the
//! designated extension points are discovered at build time instead: every
//! compiled type descriptor from the project's build output and its
//! dependency archives is loaded into an in-memory graph, then project-owned
//! types transitively descending from a marker type are collected into a
//! listing the generated runtime reads in place of reflection.
//!
//! Unreadable descriptors, entries or archives are logged and skipped —
//! discovery never fails the pipeline.

use crate::core::error::PipelineError;
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File extension of compiled type descriptors.
pub const DESCRIPTOR_EXTENSION: &str = "typeinfo";

/// On-disk form of a compiled type descriptor.
#[derive(Debug, Deserialize)]
struct TypeDescriptor {
    /// Qualified type name.
    name: String,

    /// Qualified name of the parent type, if any.
    #[serde(default)]
    parent: Option<String>,

    /// Qualified names of implemented interfaces.
    #[serde(default)]
    interfaces: Vec<String>,
}

/// A node in the type graph.
#[derive(Debug, Clone)]
pub struct TypeNode {
    pub qualified_name: String,
    pub parent: Option<String>,
    pub interfaces: Vec<String>,
    /// True when the descriptor came from the project's own build output
    /// rather than a dependency archive.
    pub owned: bool,
}

/// In-memory type graph, built fresh per discovery invocation.
#[derive(Debug, Default)]
pub struct TypeGraph {
    nodes: HashMap<String, TypeNode>,
}

impl TypeGraph {
    /// Build the graph from the project's compiled-output root and its
    /// dependency archives. Project descriptors are inserted as owned;
    /// archive descriptors never overwrite an owned entry.
    pub fn build(classes_dir: &Path, archives: &[PathBuf]) -> Self {
        let mut graph = TypeGraph::default();
        if classes_dir.is_dir() {
            graph.load_directory(classes_dir);
        }
        for archive in archives {
            graph.load_archive(archive);
        }
        debug!("type graph built with {} nodes", graph.nodes.len());
        graph
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, qualified_name: &str) -> Option<&TypeNode> {
        self.nodes.get(qualified_name)
    }

    fn load_directory(&mut self, dir: &Path) {
        let read_dir = match std::fs::read_dir(dir) {
            Ok(rd) => rd,
            Err(e) => {
                warn!("cannot read descriptor dir {}: {e}", dir.display());
                return;
            }
        };
        let mut children: Vec<std::fs::DirEntry> = read_dir.filter_map(|e| e.ok()).collect();
        children.sort_by_key(|e| e.file_name());

        for entry in children {
            let path = entry.path();
            if path.is_dir() {
                self.load_directory(&path);
            } else if path.extension().is_some_and(|ext| ext == DESCRIPTOR_EXTENSION) {
                match std::fs::read_to_string(&path) {
                    Ok(content) => self.insert_descriptor(&content, &path.display().to_string(), true),
                    Err(e) => warn!("failed to read descriptor {}: {e}", path.display()),
                }
            }
        }
    }

    fn load_archive(&mut self, archive_path: &Path) {
        let file = match std::fs::File::open(archive_path) {
            Ok(f) => f,
            Err(e) => {
                warn!("failed to open archive {}: {e}", archive_path.display());
                return;
            }
        };
        let mut archive = match zip::ZipArchive::new(file) {
            Ok(a) => a,
            Err(e) => {
                warn!("failed to read archive {}: {e}", archive_path.display());
                return;
            }
        };
        for index in 0..archive.len() {
            let mut entry = match archive.by_index(index) {
                Ok(e) => e,
                Err(e) => {
                    warn!("unreadable entry #{index} in {}: {e}", archive_path.display());
                    continue;
                }
            };
            if !entry.name().ends_with(&format!(".{DESCRIPTOR_EXTENSION}")) {
                continue;
            }
            let mut content = String::new();
            let origin = format!("{}!{}", archive_path.display(), entry.name());
            if let Err(e) = entry.read_to_string(&mut content) {
                warn!("failed to read {origin}: {e}");
                continue;
            }
            self.insert_descriptor(&content, &origin, false);
        }
    }

    fn insert_descriptor(&mut self, content: &str, origin: &str, owned: bool) {
        let descriptor: TypeDescriptor = match serde_json::from_str(content) {
            Ok(d) => d,
            Err(e) => {
                warn!("skipping corrupt descriptor {origin}: {e}");
                return;
            }
        };
        if !owned {
            // Dependency descriptors never shadow the project's own types.
            if self.nodes.get(&descriptor.name).is_some_and(|n| n.owned) {
                return;
            }
        }
        self.nodes.insert(
            descriptor.name.clone(),
            TypeNode {
                qualified_name: descriptor.name,
                parent: descriptor.parent,
                interfaces: descriptor.interfaces,
                owned,
            },
        );
    }

    /// Qualified names of owned types transitively extending/implementing
    /// `marker`. Dependency types only resolve ancestry chains; they are
    /// never part of the result even when they would match.
    pub fn find_implementations(&self, marker: &str) -> BTreeSet<String> {
        let mut found = BTreeSet::new();
        for node in self.nodes.values().filter(|n| n.owned) {
            let mut visited = HashSet::new();
            if self.descends_from(node, marker, &mut visited) {
                found.insert(node.qualified_name.clone());
            }
        }
        found
    }

    fn descends_from<'a>(
        &'a self,
        node: &'a TypeNode,
        marker: &str,
        visited: &mut HashSet<&'a str>,
    ) -> bool {
        // Malformed archives could introduce a cycle; the visited set keeps
        // the traversal finite.
        if !visited.insert(node.qualified_name.as_str()) {
            return false;
        }
        let ancestors = node.parent.iter().chain(node.interfaces.iter());
        for ancestor in ancestors {
            if ancestor == marker {
                return true;
            }
            // An ancestor absent from the graph ends that branch quietly.
            if let Some(ancestor_node) = self.nodes.get(ancestor.as_str()) {
                if self.descends_from(ancestor_node, marker, visited) {
                    return true;
                }
            }
        }
        false
    }
}

/// Collect the dependency archive files under the project deps directory.
pub fn collect_archives(deps_dir: &Path) -> Vec<PathBuf> {
    let Ok(read_dir) = std::fs::read_dir(deps_dir) else {
        return Vec::new();
    };
    let mut archives: Vec<PathBuf> = read_dir
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.extension()
                .is_some_and(|ext| ext == "zip" || ext == "jar")
        })
        .collect();
    archives.sort();
    archives
}

/// Serialize a discovery listing: sorted qualified names, one per line.
pub fn write_listing(path: &Path, names: &BTreeSet<String>) -> Result<(), PipelineError> {
    let mut content = names.iter().cloned().collect::<Vec<_>>().join("\n");
    content.push('\n');
    crate::fsops::write_string(path, &content)
}
