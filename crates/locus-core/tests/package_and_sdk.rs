use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use locus_core::error::SourceError;
use locus_core::resolver::{FileUriResolver, PackageUriResolver, SdkLibraries, SdkUriResolver};
use locus_core::source::{Source, SourceFactory};

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create_dir_all should succeed in test temp dirs");
    }
    fs::write(path, content).expect("write should succeed in test temp dirs");
}

struct Layout {
    _temp: TempDir,
    sdk: PathBuf,
    packages: PathBuf,
}

fn layout() -> Layout {
    let temp = tempfile::tempdir().expect("tempdir should succeed");
    let sdk = temp.path().join("sdk");
    let packages = temp.path().join("packages");

    write_file(&sdk.join("lib/core/core.dart"), "library dart.core;\npart 'list.dart';\n");
    write_file(&sdk.join("lib/core/list.dart"), "part of dart.core;\n");
    write_file(&packages.join("util/util.dart"), "library util;\nimport 'src/strings.dart';\n");
    write_file(&packages.join("util/src/strings.dart"), "library strings;\n");

    Layout {
        _temp: temp,
        sdk,
        packages,
    }
}

fn factory(layout: &Layout) -> SourceFactory {
    SourceFactory::builder()
        .resolver(SdkUriResolver::new(&layout.sdk))
        .resolver(PackageUriResolver::new(&layout.packages))
        .resolver(FileUriResolver::new())
        .build()
}

#[test]
fn sdk_library_resolves_to_system_source() {
    let layout = layout();
    let factory = factory(&layout);

    let core = factory.resolve_str("dart:core").unwrap();
    assert!(core.is_in_system_library());
    assert_eq!(core.path(), layout.sdk.join("lib/core/core.dart"));
    assert!(core.contents().unwrap().starts_with("library dart.core;"));
}

#[test]
fn sdk_part_resolves_relative_to_library() {
    let layout = layout();
    let factory = factory(&layout);

    let core = factory.resolve_str("dart:core").unwrap();
    let list = core.resolve_relative("list.dart").unwrap();

    assert_eq!(list.uri().as_str(), "dart:core/list.dart");
    assert!(list.is_in_system_library());
    assert_eq!(list.contents().unwrap(), "part of dart.core;\n");
}

#[test]
fn unknown_sdk_library_fails_resolution() {
    let layout = layout();
    let err = factory(&layout).resolve_str("dart:mirrors").unwrap_err();
    assert!(matches!(err, SourceError::UnknownLibrary { .. }));
}

#[test]
fn declared_but_missing_sdk_library_still_resolves() {
    let layout = layout();
    let factory = factory(&layout);

    let io = factory.resolve_str("dart:io").unwrap();
    assert!(!io.exists());
    assert!(matches!(
        io.contents().unwrap_err(),
        SourceError::MissingContent { .. }
    ));
}

#[test]
fn url_mapping_overrides_sdk_layout() {
    let layout = layout();
    let patched = layout.packages.join("patched_json.dart");
    write_file(&patched, "library json_patched;\n");

    let mut mapping = HashMap::new();
    mapping.insert("dart:json".to_string(), patched.clone());
    let factory = SourceFactory::builder()
        .resolver(SdkUriResolver::new(&layout.sdk).with_url_mapping(mapping))
        .build();

    let json = factory.resolve_str("dart:json").unwrap();
    assert_eq!(json.path(), patched);
    assert!(json.is_in_system_library());
}

#[test]
fn extra_sdk_library_is_resolvable() {
    let layout = layout();
    write_file(
        &layout.sdk.join("lib/collection/collection.dart"),
        "library dart.collection;\n",
    );
    let mut libraries = SdkLibraries::builtin();
    libraries.insert("collection", "collection/collection.dart");

    let factory = SourceFactory::builder()
        .resolver(SdkUriResolver::new(&layout.sdk).with_libraries(libraries))
        .build();

    let collection = factory.resolve_str("dart:collection").unwrap();
    assert!(collection.exists());
}

#[test]
fn package_import_resolves_under_package_root() {
    let layout = layout();
    let factory = factory(&layout);

    let util = factory.resolve_str("package:util/util.dart").unwrap();
    assert_eq!(util.path(), layout.packages.join("util/util.dart"));
    assert!(!util.is_in_system_library());

    let strings = util.resolve_relative("src/strings.dart").unwrap();
    assert_eq!(strings.uri().as_str(), "package:util/src/strings.dart");
    assert_eq!(strings.contents().unwrap(), "library strings;\n");
}

#[test]
fn package_and_file_uris_name_distinct_identities() {
    let layout = layout();
    let factory = factory(&layout);

    let by_package = factory.resolve_str("package:util/util.dart").unwrap();
    let by_file = factory
        .for_path(&layout.packages.join("util/util.dart"))
        .unwrap();

    assert_ne!(by_package, by_file);
    assert_eq!(by_package.path(), by_file.path());
    assert_eq!(
        by_package.content_hash().unwrap(),
        by_file.content_hash().unwrap()
    );
}

#[test]
fn malformed_package_uri_is_reported_by_its_resolver() {
    let layout = layout();
    let err = factory(&layout).resolve_str("package:util").unwrap_err();
    assert!(matches!(err, SourceError::InvalidPackageUri { .. }));
}

#[test]
fn file_import_from_package_source_crosses_schemes() {
    let layout = layout();
    let factory = factory(&layout);
    let util = factory.resolve_str("package:util/util.dart").unwrap();

    let target = layout.packages.join("util/src/strings.dart");
    let file_uri = url::Url::from_file_path(&target).unwrap();
    let strings = util.resolve_relative(file_uri.as_str()).unwrap();

    assert!(Source::ptr_eq(&strings, &factory.for_path(&target).unwrap()));
}

#[test]
fn non_ascii_package_file_matches_its_file_uri() {
    let layout = layout();
    let target = layout.packages.join("util/café.dart");
    write_file(&target, "library cafe;\n");
    let factory = factory(&layout);

    let by_package = factory.resolve_str("package:util/café.dart").unwrap();
    let by_file = factory.for_path(&target).unwrap();

    assert_eq!(by_package.path(), by_file.path());
    assert_eq!(by_package.contents().unwrap(), "library cafe;\n");
}

#[test]
fn escaped_space_in_package_path_reads_the_file() {
    let layout = layout();
    write_file(&layout.packages.join("util/a b.dart"), "library spaced;\n");

    let source = factory(&layout)
        .resolve_str("package:util/a%20b.dart")
        .unwrap();
    assert_eq!(source.path(), layout.packages.join("util/a b.dart"));
    assert!(source.exists());
}

#[test]
fn encoded_traversal_out_of_package_is_rejected() {
    let layout = layout();
    let factory = factory(&layout);

    for text in ["package:util/%2E%2E/%2E%2E/secret.dart", "package:util/src%2F..%2Fx.dart"] {
        let err = factory.resolve_str(text).unwrap_err();
        assert!(matches!(err, SourceError::InvalidPackageUri { .. }), "{text}");
    }
}
