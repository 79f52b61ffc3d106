use deployhash::engine::{
    base_name, ext_name, is_hidden_path, normalize_path, path_relative_to, path_to_slash_string,
};
use deployhash::pipeline::{
    DiscoverOpts, Discoverer, FileFilter, Hasher, HasherOpts, ManifestCollector, Normalizer,
    NormalizerOpts,
};
use deployhash::{
    EntryType, FileDescriptor, FileStat, HashAlgorithm, HashIndex, Manifest, PipelineError,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn desc(relname: &str, entry_type: EntryType) -> FileDescriptor {
    let root: Arc<Path> = Arc::from(Path::new("/deploy"));
    FileDescriptor {
        filepath: root.join(relname),
        root,
        relname: relname.to_string(),
        basename: base_name(relname).to_string(),
        extname: ext_name(relname).to_string(),
        entry_type,
        runtime: None,
        stat: FileStat::default(),
        asset_type: None,
        normalized_path: None,
        hash: None,
    }
}

fn finished(relname: &str, logical: &str, hash: &str) -> FileDescriptor {
    let mut d = desc(relname, EntryType::File);
    d.normalized_path = Some(logical.to_string());
    d.hash = Some(hash.to_string());
    d
}

// --- path_relative_to / path_to_slash_string ---

#[test]
fn test_path_relative_under_base() {
    let base = PathBuf::from("/foo/bar");
    let path = PathBuf::from("/foo/bar/baz/qux");
    assert_eq!(
        path_relative_to(&path, &base),
        Some(PathBuf::from("baz/qux"))
    );
}

#[test]
fn test_path_relative_not_under_base() {
    let base = PathBuf::from("/foo/bar");
    let path = PathBuf::from("/other/qux");
    assert_eq!(path_relative_to(&path, &base), None);
}

#[test]
fn test_path_to_slash_string_normalizes_backslashes() {
    assert_eq!(
        path_to_slash_string(&PathBuf::from("src\\main.js")),
        "src/main.js"
    );
}

// --- normalize_path ---

#[test]
fn test_normalize_path_strips_leading_dot_slash() {
    assert_eq!(normalize_path("./a/b.txt").unwrap(), "a/b.txt");
    assert_eq!(normalize_path("/a/b.txt").unwrap(), "a/b.txt");
}

#[test]
fn test_normalize_path_platform_separators() {
    assert_eq!(normalize_path("a\\b\\c.css").unwrap(), "a/b/c.css");
    assert_eq!(normalize_path("a//b.css").unwrap(), "a/b.css");
}

#[test]
fn test_normalize_path_rejects_hash_and_question_mark() {
    assert!(matches!(
        normalize_path("a#b.html"),
        Err(PipelineError::InvalidPath(_))
    ));
    assert!(matches!(
        normalize_path("q?.html"),
        Err(PipelineError::InvalidPath(_))
    ));
}

// --- is_hidden_path / FileFilter ---

#[test]
fn test_hidden_dot_segments() {
    assert!(is_hidden_path(".env"));
    assert!(is_hidden_path(".git/config"));
    assert!(is_hidden_path("assets/.cache/x.js"));
    assert!(!is_hidden_path("assets/app.v1.js"));
}

#[test]
fn test_hidden_macos_resource_fork() {
    assert!(is_hidden_path("__MACOSX/img.png"));
    assert!(is_hidden_path("a/__MACOSX/img.png"));
    assert!(!is_hidden_path("a/MACOSX/img.png"));
}

#[test]
fn test_filter_keeps_only_visible_files() {
    assert!(FileFilter::keep(&desc("index.html", EntryType::File)));
    assert!(!FileFilter::keep(&desc("css", EntryType::Directory)));
    assert!(!FileFilter::keep(&desc("dev", EntryType::Other)));
    assert!(!FileFilter::keep(&desc("a/.DS_Store", EntryType::File)));
}

#[test]
fn test_filter_preserves_order() {
    let input = vec![
        desc("z.html", EntryType::File),
        desc(".hidden", EntryType::File),
        desc("a.html", EntryType::File),
        desc("img", EntryType::Directory),
        desc("m.html", EntryType::File),
    ];
    let kept: Vec<String> = FileFilter::apply(input).map(|d| d.relname).collect();
    assert_eq!(kept, vec!["z.html", "a.html", "m.html"]);
}

// --- Normalizer ---

#[test]
fn test_function_normalizer_strips_extension() {
    let n = Normalizer::function(NormalizerOpts::default());
    let out = n.normalize(desc("hello.zip", EntryType::File)).unwrap();
    assert_eq!(out.normalized_path.as_deref(), Some("hello"));
    assert_eq!(out.asset_type.as_deref(), Some("function"));
}

#[test]
fn test_function_normalizer_collides_on_base_name() {
    let n = Normalizer::function(NormalizerOpts::default());
    let js = n.logical_path(&desc("hello.js", EntryType::File)).unwrap();
    let zip = n.logical_path(&desc("hello.zip", EntryType::File)).unwrap();
    assert_eq!(js, zip);
}

#[test]
fn test_file_normalizer_uses_relname() {
    let n = Normalizer::file(NormalizerOpts::default());
    let out = n.normalize(desc("css/site.css", EntryType::File)).unwrap();
    assert_eq!(out.normalized_path.as_deref(), Some("css/site.css"));
    assert_eq!(out.asset_type.as_deref(), Some("file"));
}

#[test]
fn test_normalizer_custom_asset_type() {
    let n = Normalizer::file(NormalizerOpts {
        asset_type: Some("edge".to_string()),
    });
    let out = n.normalize(desc("e.js", EntryType::File)).unwrap();
    assert_eq!(out.asset_type.as_deref(), Some("edge"));
}

// --- ManifestCollector ---

#[test]
fn test_collector_groups_identical_content() {
    let mut manifest = Manifest::new();
    let mut index = HashIndex::new();
    let mut c = ManifestCollector::new(&mut manifest, &mut index);
    c.collect(finished("a.txt", "a.txt", "h1")).unwrap();
    c.collect(finished("b.txt", "b.txt", "h1")).unwrap();
    c.collect(finished("c.txt", "c.txt", "h2")).unwrap();
    assert_eq!(c.collected(), 3);

    assert_eq!(manifest.len(), 3);
    assert_eq!(index["h1"].len(), 2);
    assert_eq!(index["h2"].len(), 1);
    assert!(index["h1"].iter().all(|d| d.hash.as_deref() == Some("h1")));
}

#[test]
fn test_collector_last_write_wins_on_logical_path() {
    let mut manifest = Manifest::new();
    let mut index = HashIndex::new();
    let mut c = ManifestCollector::new(&mut manifest, &mut index);
    c.collect(finished("hello.js", "hello", "h1")).unwrap();
    c.collect(finished("hello.zip", "hello", "h2")).unwrap();

    assert_eq!(manifest.len(), 1);
    assert_eq!(manifest["hello"], "h2");
    // Both descriptors stay in the index.
    assert_eq!(index.len(), 2);
}

#[test]
fn test_collector_rejects_incomplete_descriptor() {
    let mut manifest = Manifest::new();
    let mut index = HashIndex::new();
    let mut c = ManifestCollector::new(&mut manifest, &mut index);
    let err = c.collect(desc("a.txt", EntryType::File)).unwrap_err();
    assert!(matches!(err, PipelineError::Incomplete(_)));
    assert!(manifest.is_empty());
}

// --- construction-time config errors ---

#[test]
fn test_hasher_zero_concurrency_is_config_error() {
    let err = Hasher::new(HasherOpts {
        concurrent_hash: 0,
        hash_algorithm: HashAlgorithm::Sha1,
    })
    .unwrap_err();
    assert!(err.is_config());
}

#[test]
fn test_hasher_defaults_to_sha1() {
    let h = Hasher::new(HasherOpts {
        concurrent_hash: 2,
        ..HasherOpts::default()
    })
    .unwrap();
    assert_eq!(h.algorithm(), HashAlgorithm::Sha1);
}

#[test]
fn test_discoverer_requires_root() {
    let err = Discoverer::new(DiscoverOpts {
        root: None,
        concurrent_stat: 4,
    })
    .unwrap_err();
    assert!(err.is_config());
}

#[test]
fn test_discoverer_requires_positive_concurrency() {
    let err = Discoverer::new(DiscoverOpts {
        root: Some(PathBuf::from("/fns")),
        concurrent_stat: 0,
    })
    .unwrap_err();
    assert!(err.is_config());
}
