use clap::Parser;
use std::path::PathBuf;

struct DefaultArgs;

impl DefaultArgs {
    pub const DIR: &'static str = ".";
}

/// Hash a deploy directory into a content-addressed manifest.
#[derive(Clone, Parser)]
#[command(name = "deployhash")]
#[command(about = "Hash a deploy directory (and optional functions directory) into a manifest plus a digest index.")]
pub struct Cli {
    /// Directory of static files to deploy. Default: current directory.
    #[arg(value_name = "DIR", default_value = DefaultArgs::DIR)]
    pub dir: PathBuf,

    /// Functions directory; each top-level .js/.zip or executable becomes a function.
    #[arg(long, value_name = "FN_DIR")]
    pub functions: Option<PathBuf>,

    /// Digest for static files: sha1, sha256 or blake3. Default: sha1.
    #[arg(long, value_name = "ID")]
    pub hash_algorithm: Option<String>,

    /// Digest for function bundles: sha1, sha256 or blake3. Default: sha256.
    #[arg(long, value_name = "ID")]
    pub fn_hash_algorithm: Option<String>,

    /// Max concurrent stats in the functions directory.
    #[arg(long, value_name = "N")]
    pub concurrent_stat: Option<usize>,

    /// Max files hashed in parallel.
    #[arg(long, value_name = "N")]
    pub concurrent_hash: Option<usize>,

    /// Write the JSON report here instead of stdout.
    #[arg(long, short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Follow symbolic links while walking DIR.
    #[arg(long, short = 'f', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub follow_links: Option<bool>,

    /// Verbose output (debug logs and a progress counter).
    #[arg(long, short = 'v', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub verbose: Option<bool>,
}
