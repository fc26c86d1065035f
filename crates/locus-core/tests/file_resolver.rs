use std::fs;

use tempfile::TempDir;
use url::Url;

use locus_core::error::SourceError;
use locus_core::resolver::{FileUriResolver, UriResolver};
use locus_core::source::{Source, SourceFactory};

fn factory() -> SourceFactory {
    SourceFactory::builder().resolver(FileUriResolver::new()).build()
}

#[test]
fn file_uri_binds_to_local_path() {
    let factory = factory();
    let uri = Url::parse("file:///tmp/project/lib/main.src").unwrap();

    let source = FileUriResolver::new()
        .resolve_absolute(&factory, &uri)
        .unwrap()
        .expect("file URIs are always claimed");

    assert_eq!(source.uri(), &uri);
    assert_eq!(source.path(), std::path::Path::new("/tmp/project/lib/main.src"));
    assert_eq!(source.short_name(), "main.src");
    assert!(!source.is_in_system_library());
}

#[test]
fn other_schemes_are_declined() {
    let factory = factory();
    let resolver = FileUriResolver::new();

    for text in [
        "http://example.com/a.src",
        "package:util/util.src",
        "dart:core",
    ] {
        let uri = Url::parse(text).unwrap();
        let result = resolver.resolve_absolute(&factory, &uri).unwrap();
        assert!(result.is_none(), "{text} should be declined");
    }
}

#[test]
fn uppercase_scheme_is_normalized_before_matching() {
    let factory = factory();
    let source = factory.resolve_str("FILE:///tmp/a.src").unwrap();
    assert_eq!(source.uri().scheme(), "file");
}

#[cfg(unix)]
#[test]
fn remote_file_uri_is_invalid() {
    let err = factory().resolve_str("file://server/share/a.src").unwrap_err();
    assert!(matches!(err, SourceError::InvalidFileUri { .. }));
}

#[test]
fn existing_file_is_read_lazily() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("lib.src");
    let factory = factory();

    let source = factory.for_path(&path).unwrap();
    assert!(!source.exists());

    fs::write(&path, "library lib;\n").unwrap();
    assert!(source.exists());
    assert_eq!(source.contents().unwrap(), "library lib;\n");
    assert_eq!(source.bytes().unwrap(), b"library lib;\n");
    assert!(source.modification_stamp().is_some());

    fs::write(&path, "library lib2;\n").unwrap();
    assert_eq!(source.contents().unwrap(), "library lib2;\n");
}

#[test]
fn missing_content_is_a_read_error_not_a_resolution_error() {
    let factory = factory();
    let source = factory.resolve_str("file:///tmp/missing.src").unwrap();

    assert!(!source.exists());
    assert!(source.modification_stamp().is_none());

    let err = source.contents().unwrap_err();
    assert!(matches!(err, SourceError::MissingContent { .. }));
    assert!(err.is_read_error());
}

#[test]
fn invalid_utf8_is_reported_on_text_read() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("binary.src");
    fs::write(&path, [0xffu8, 0xfe, 0x00]).unwrap();

    let source = factory().for_path(&path).unwrap();
    assert!(matches!(
        source.contents().unwrap_err(),
        SourceError::InvalidUtf8 { .. }
    ));
    assert_eq!(source.bytes().unwrap(), vec![0xff, 0xfe, 0x00]);
}

#[test]
fn content_hash_tracks_content() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("a.src");
    fs::write(&path, "one").unwrap();

    let source = factory().for_path(&path).unwrap();
    let first = source.content_hash().unwrap();
    assert_eq!(first.len(), 64);

    fs::write(&path, "two").unwrap();
    assert_ne!(source.content_hash().unwrap(), first);
}

#[test]
fn relative_path_is_rejected() {
    let err = factory()
        .for_path(std::path::Path::new("relative/a.src"))
        .unwrap_err();
    assert!(matches!(err, SourceError::RelativePath { .. }));
}

#[test]
fn relative_import_resolves_next_to_containing_file() {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("lib/src")).unwrap();
    fs::write(temp.path().join("lib/main.src"), "import 'src/util.src';").unwrap();
    fs::write(temp.path().join("lib/src/util.src"), "library util;").unwrap();

    let factory = factory();
    let main = factory.for_path(&temp.path().join("lib/main.src")).unwrap();
    let util = main.resolve_relative("src/util.src").unwrap();

    assert_eq!(util.contents().unwrap(), "library util;");
    let again = factory
        .for_path(&temp.path().join("lib/src/util.src"))
        .unwrap();
    assert!(Source::ptr_eq(&util, &again));
}
