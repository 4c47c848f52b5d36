pub mod config;
pub mod path;
pub mod value;
pub mod workspace;

pub use config::*;
pub use path::*;
pub use value::*;
pub use workspace::*;
