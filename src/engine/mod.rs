//! Engine module: hashing, path tools, CLI surface

pub mod arg_parser;
pub mod cli;
pub mod hashing;
pub mod progress;
pub mod tools;

// Re-export commonly used functions
pub use arg_parser::Cli;
pub use cli::handle_run;
pub use hashing::{HashAlgorithm, hash_file};
pub use tools::{
    base_name, component_ext, ext_name, is_executable, is_hidden_path, normalize_path,
    path_relative_to, path_to_slash_string,
};
