use std::collections::BTreeSet;

use crate::model::path::JsonPath;
use crate::model::value::JsonValue;

use super::json_path::collect_leaf_paths;

/// Dotted paths highlighted in the editor.
///
/// Built once from the tool's simplified schema: every leaf path is marked,
/// along with each of its proper prefixes so that the objects leading to an
/// important field are marked too. Display only; never used for mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportantPaths {
    paths: BTreeSet<String>,
}

impl ImportantPaths {
    pub fn from_simplified(simplified: &JsonValue) -> Self {
        let mut paths = BTreeSet::new();
        for leaf in collect_leaf_paths(simplified) {
            for prefix in leaf.proper_prefixes() {
                paths.insert(prefix.dotted());
            }
            paths.insert(leaf.dotted());
        }
        ImportantPaths { paths }
    }

    pub fn contains(&self, path: &JsonPath) -> bool {
        self.paths.contains(&path.dotted())
    }

    pub fn contains_dotted(&self, dotted: &str) -> bool {
        self.paths.contains(dotted)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Sorted dotted paths
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(|s| s.as_str())
    }
}
