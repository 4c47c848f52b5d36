pub mod important;
pub mod json_path;
pub mod scalar_text;
pub mod stages;

pub use important::ImportantPaths;
pub use json_path::{collect_leaf_paths, deep_merge, delete_at, get, set};
