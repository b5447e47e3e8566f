//! Loading catalogs from JAR files on disk

use classdeps_core::{
    select_seeds, ArchiveRuntime, BaseRuntime, Catalog, CatalogError, ClassGlob, ClassParseError,
};
use classdeps_test_fixtures::{simple_class_entry, ClassFileBuilder, JarFixture};
use pretty_assertions::assert_eq;

type TestResult = Result<(), Box<dyn std::error::Error>>;

#[test]
fn test_loads_class_entries_only() -> TestResult {
    let fixture = JarFixture::new();
    let jar = fixture.jar(
        "app.jar",
        &[
            ("META-INF/".to_string(), Vec::new()),
            ("META-INF/MANIFEST.MF".to_string(), b"Manifest-Version: 1.0\n".to_vec()),
            ("com/".to_string(), Vec::new()),
            simple_class_entry("com/app/Main"),
            simple_class_entry("com/app/Util"),
            ("assets/logo.png".to_string(), vec![0x89, 0x50, 0x4e, 0x47]),
        ],
    );

    let catalog = Catalog::load(&[&jar])?;
    assert_eq!(catalog.len(), 2);
    assert_eq!(catalog.names().collect::<Vec<_>>(), ["com.app.Main", "com.app.Util"]);
    assert_eq!(catalog.archives(), [jar]);
    Ok(())
}

#[test]
fn test_later_archive_wins() -> TestResult {
    let fixture = JarFixture::new();
    let first = fixture.jar(
        "first.jar",
        &[(
            "com/app/Shared.class",
            ClassFileBuilder::new("com/app/Shared").build(),
        )],
    );
    let second = fixture.jar(
        "second.jar",
        &[(
            "com/app/Shared.class",
            ClassFileBuilder::new("com/app/Shared")
                .extends("com/app/Base")
                .build(),
        )],
    );

    let catalog = Catalog::load(&[&first, &second])?;
    assert_eq!(catalog.len(), 1);
    let shared = catalog.get("com.app.Shared").ok_or("missing class")?;
    assert_eq!(shared.super_name.as_deref(), Some("com.app.Base"));
    assert_eq!(catalog.archives().len(), 2);
    Ok(())
}

#[test]
fn test_corrupt_class_reports_archive_and_entry() {
    let fixture = JarFixture::new();
    let mut truncated = ClassFileBuilder::new("com/app/Broken").build();
    truncated.truncate(12);
    let jar = fixture.jar(
        "broken.jar",
        &[
            simple_class_entry("com/app/Fine"),
            ("com/app/Broken.class".to_string(), truncated),
        ],
    );

    match Catalog::load(&[&jar]) {
        Err(CatalogError::ClassFile {
            path,
            entry,
            source: ClassParseError::UnexpectedEof,
        }) => {
            assert_eq!(path, jar);
            assert_eq!(entry, "com/app/Broken.class");
        }
        other => panic!("expected a class-file error, got {:?}", other),
    }
}

#[test]
fn test_not_a_zip_archive() {
    let fixture = JarFixture::new();
    let garbage = fixture.garbage("garbage.jar");
    let error = Catalog::load(&[&garbage]).expect_err("not a zip file");
    assert!(matches!(error, CatalogError::Zip { .. }));
    assert!(error.to_string().contains("garbage.jar"));
}

#[test]
fn test_archive_runtime_reads_entry_names() -> TestResult {
    let fixture = JarFixture::new();
    let platform = fixture.jar(
        "android.jar",
        &[
            ("android/view/View.class".to_string(), b"not decoded".to_vec()),
            simple_class_entry("android/os/Bundle"),
            ("android/".to_string(), Vec::new()),
        ],
    );

    let runtime = ArchiveRuntime::load(&[platform])?;
    assert_eq!(runtime.len(), 2);
    assert!(runtime.provides("android.view.View"));
    assert!(runtime.provides("android.os.Bundle"));
    assert!(!runtime.provides("android.view.ViewGroup"));
    Ok(())
}

#[test]
fn test_deeply_nested_annotation_is_a_class_error() {
    let mut builder = ClassFileBuilder::new("com/app/Hostile");
    let type_index = builder.pool().utf8("Lcom/app/Marker;");
    let name_index = builder.pool().utf8("value");
    let string_index = builder.pool().utf8("leaf");

    // One annotation whose single element is an array nested far past any
    // sensible depth.
    let mut body = Vec::new();
    body.extend_from_slice(&1u16.to_be_bytes());
    body.extend_from_slice(&type_index.to_be_bytes());
    body.extend_from_slice(&1u16.to_be_bytes());
    body.extend_from_slice(&name_index.to_be_bytes());
    for _ in 0..400_000 {
        body.extend_from_slice(&[b'[', 0, 1]);
    }
    body.push(b's');
    body.extend_from_slice(&string_index.to_be_bytes());

    let hostile = builder
        .attribute("RuntimeVisibleAnnotations", &body)
        .build();
    let fixture = JarFixture::new();
    let jar = fixture.jar("hostile.jar", &[("com/app/Hostile.class", hostile)]);

    match Catalog::load(&[&jar]) {
        Err(CatalogError::ClassFile {
            path,
            entry,
            source: ClassParseError::NestingTooDeep { .. },
        }) => {
            assert_eq!(path, jar);
            assert_eq!(entry, "com/app/Hostile.class");
        }
        other => panic!("expected a nesting error, got {:?}", other),
    }
}

#[test]
fn test_nested_annotations_within_limit_decode() -> TestResult {
    let mut builder = ClassFileBuilder::new("com/app/Nested");
    let type_index = builder.pool().utf8("Lcom/app/Marker;");
    let name_index = builder.pool().utf8("value");

    let mut body = Vec::new();
    body.extend_from_slice(&1u16.to_be_bytes());
    body.extend_from_slice(&type_index.to_be_bytes());
    body.extend_from_slice(&1u16.to_be_bytes());
    body.extend_from_slice(&name_index.to_be_bytes());
    for _ in 0..10 {
        body.extend_from_slice(&[b'[', 0, 1]);
    }
    body.extend_from_slice(&[b'[', 0, 0]);

    let bytes = builder.attribute("RuntimeVisibleAnnotations", &body).build();
    let record = classdeps_core::parse_class(&bytes)?;
    assert_eq!(record.annotations.len(), 1);
    Ok(())
}

#[test]
fn test_missing_class_names_searched_archives() -> TestResult {
    let fixture = JarFixture::new();
    let app = fixture.jar("app.jar", &[simple_class_entry("com/app/Main")]);
    let lib = fixture.jar("lib.jar", &[simple_class_entry("com/lib/Util")]);
    let catalog = Catalog::load(&[&app, &lib])?;

    let globs = [ClassGlob::compile("com.app.Missing")?];
    let error = select_seeds::<&str>(&globs, &[], &catalog).expect_err("class is absent");
    let message = error.to_string();
    assert!(message.contains("com.app.Missing"), "{message}");
    assert!(message.contains(&app.display().to_string()), "{message}");
    assert!(message.contains(&lib.display().to_string()), "{message}");
    Ok(())
}
