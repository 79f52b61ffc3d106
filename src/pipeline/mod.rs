//! Pipeline components: discover / filter → hash → normalize → collect, plus wiring.

pub mod collector;
pub mod context;
pub mod discover;
pub mod filter;
pub mod hasher;
pub mod normalize;
pub mod orchestrator;
pub mod walk;

pub use collector::ManifestCollector;
pub use context::{PipelineContext, PipelineStats, stage_channel};
pub use discover::{DiscoverOpts, Discoverer, classify_runtime};
pub use filter::FileFilter;
pub use hasher::{Hasher, HasherOpts};
pub use normalize::{Normalizer, NormalizerOpts};
pub use orchestrator::{OnCollected, run_file_pipeline, run_function_pipeline};
pub use walk::{list_names, spawn_file_feed, spawn_name_feed, to_descriptor_walkdir, walk_tree};
