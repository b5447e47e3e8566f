//! End-to-end closure scenarios over real archives

use classdeps_core::{
    select_seeds, Analyzer, AnalyzerConfig, Catalog, ClassGlob, ClassSet, ClosureEngine, Namespace,
    NoBaseRuntime, PackageRuntime,
};
use classdeps_test_fixtures::{op, ClassFileBuilder, JarFixture};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::collections::BTreeSet;

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn names(set: &ClassSet) -> Vec<&str> {
    set.keys().map(String::as_str).collect()
}

/// A small application over a fake platform:
///
/// ```text
/// com.app.MainActivity extends android.app.Activity
///   field  com.app.Model
///   method onCreate(android.os.Bundle) { new com.app.Presenter; }
/// com.app.Presenter
///   method show(android.view.View) throws com.app.PresenterException
/// android.view.View
///   field  android.graphics.Canvas
///   method post(java.lang.Runnable)
/// ```
fn application(fixture: &JarFixture) -> Vec<std::path::PathBuf> {
    let platform = fixture.jar(
        "platform.jar",
        &[
            (
                "android/app/Activity.class",
                ClassFileBuilder::new("android/app/Activity").build(),
            ),
            (
                "android/os/Bundle.class",
                ClassFileBuilder::new("android/os/Bundle").build(),
            ),
            (
                "android/view/View.class",
                ClassFileBuilder::new("android/view/View")
                    .field("canvas", "Landroid/graphics/Canvas;", |_| {})
                    .method("post", "(Ljava/lang/Runnable;)V", |_| {})
                    .build(),
            ),
            (
                "android/graphics/Canvas.class",
                ClassFileBuilder::new("android/graphics/Canvas").build(),
            ),
            (
                "android/widget/Unused.class",
                ClassFileBuilder::new("android/widget/Unused").build(),
            ),
        ],
    );
    let app = fixture.jar(
        "app.jar",
        &[
            (
                "com/app/MainActivity.class",
                ClassFileBuilder::new("com/app/MainActivity")
                    .extends("android/app/Activity")
                    .field("model", "Lcom/app/Model;", |_| {})
                    .method("onCreate", "(Landroid/os/Bundle;)V", |m| {
                        m.code(|c| {
                            c.type_insn(op::NEW, "com/app/Presenter").emit(&[op::POP, op::RETURN]);
                        });
                    })
                    .build(),
            ),
            (
                "com/app/Model.class",
                ClassFileBuilder::new("com/app/Model").build(),
            ),
            (
                "com/app/Presenter.class",
                ClassFileBuilder::new("com/app/Presenter")
                    .method("show", "(Landroid/view/View;)V", |m| {
                        m.exceptions(&["com/app/PresenterException"]);
                    })
                    .build(),
            ),
            (
                "com/app/PresenterException.class",
                ClassFileBuilder::new("com/app/PresenterException")
                    .extends("java/lang/Exception")
                    .build(),
            ),
            (
                "com/app/Unrelated.class",
                ClassFileBuilder::new("com/app/Unrelated").build(),
            ),
        ],
    );
    vec![platform, app]
}

#[test]
fn test_analyze_application() -> TestResult {
    let fixture = JarFixture::new();
    let config = AnalyzerConfig {
        archives: application(&fixture),
        derive_from: vec!["android.app.Activity".to_string()],
        ..Default::default()
    };

    let analysis = Analyzer::new(config).analyze(&PackageRuntime::java_platform())?;
    assert_eq!(analysis.catalog_size, 10);
    assert_eq!(analysis.seeds, 2);
    assert_eq!(
        names(analysis.closure.kept()),
        [
            "android.app.Activity",
            "com.app.MainActivity",
            "com.app.Model",
            "com.app.Presenter",
            "com.app.PresenterException",
        ]
    );
    assert_eq!(
        names(analysis.closure.dependencies()),
        ["android.graphics.Canvas", "android.os.Bundle", "android.view.View"]
    );
    Ok(())
}

#[test]
fn test_runtime_provided_classes_are_dropped() -> TestResult {
    let fixture = JarFixture::new();
    let catalog = Catalog::load(&application(&fixture))?;
    let globs = [ClassGlob::compile("com.app.MainActivity")?];
    let seeds = select_seeds(&globs, &[] as &[&str], &catalog)?;

    let runtime = |name: &str| name.starts_with("android.view.");
    let engine = ClosureEngine::new(&catalog, &runtime, Namespace::prefix("android"));
    let closure = engine.close(seeds);

    // View is provided, so Canvas is never reached.
    assert_eq!(
        names(closure.dependencies()),
        ["android.app.Activity", "android.os.Bundle"]
    );
    assert!(!closure.kept().contains_key("android.view.View"));
    Ok(())
}

#[test]
fn test_wildcard_seeds_and_empty_namespace() -> TestResult {
    let fixture = JarFixture::new();
    let catalog = Catalog::load(&application(&fixture))?;
    let globs = [ClassGlob::compile("com.app.*")?];
    let seeds = select_seeds(&globs, &[] as &[&str], &catalog)?;
    assert_eq!(seeds.len(), 5);

    let engine = ClosureEngine::new(&catalog, &NoBaseRuntime, Namespace::substring(""));
    let closure = engine.close(seeds);

    assert_eq!(names(closure.kept()).len(), 5);
    assert_eq!(
        names(closure.dependencies()),
        [
            "android.app.Activity",
            "android.graphics.Canvas",
            "android.os.Bundle",
            "android.view.View",
        ]
    );
    Ok(())
}

/// Class `c{i}` references `c{j}` for every `j` in `edges[i]`; the catalog
/// also names a few classes outside it.
fn random_catalog(edges: &[Vec<usize>]) -> Catalog {
    let count = edges.len();
    Catalog::from_records(edges.iter().enumerate().map(|(i, targets)| {
        let mut builder = ClassFileBuilder::new(&format!("p{}/C{}", i % 3, i));
        for (k, target) in targets.iter().enumerate() {
            let target = if *target < count {
                format!("Lp{}/C{};", target % 3, target)
            } else {
                format!("Lmissing/M{};", target)
            };
            builder = builder.field(&format!("f{}", k), &target, |_| {});
        }
        classdeps_core::parse_class(&builder.build()).expect("fixture class decodes")
    }))
}

fn graph() -> impl Strategy<Value = (Vec<Vec<usize>>, Vec<usize>)> {
    (1usize..12).prop_flat_map(|count| {
        (
            prop::collection::vec(prop::collection::vec(0..count + 3, 0..4), count),
            prop::collection::vec(0..count, 1..4),
        )
    })
}

fn namespace_pattern() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("p0".to_string()),
        Just("p1".to_string()),
        Just(String::new()),
    ]
}

proptest! {
    #[test]
    fn closure_properties((edges, seed_indices) in graph(), namespace in namespace_pattern()) {
        let catalog = random_catalog(&edges);
        let seeds: ClassSet = seed_indices
            .iter()
            .map(|i| format!("p{}.C{}", i % 3, i))
            .filter_map(|name| catalog.get(&name).map(|r| (name, r.clone())))
            .collect();
        let seed_names: BTreeSet<String> = seeds.keys().cloned().collect();

        let runtime = |name: &str| name.ends_with("C0");
        let engine = ClosureEngine::new(&catalog, &runtime, Namespace::prefix(namespace.clone()));
        let closure = engine.close(seeds.clone());

        // The same inputs give the same result.
        let repeated = engine.close(seeds);
        prop_assert_eq!(names(repeated.kept()), names(closure.kept()));
        prop_assert_eq!(names(repeated.dependencies()), names(closure.dependencies()));
        prop_assert_eq!(repeated.rounds(), closure.rounds());

        // Disjoint and catalog-backed.
        for name in closure.kept().keys() {
            prop_assert!(!closure.dependencies().contains_key(name));
            prop_assert!(catalog.contains(name));
        }
        for name in closure.dependencies().keys() {
            prop_assert!(catalog.contains(name));
            prop_assert!(Namespace::prefix(namespace.clone()).contains(name));
            prop_assert!(!runtime(name.as_str()));
        }

        // Seeds stay kept; the run is bounded by the catalog.
        for name in &seed_names {
            prop_assert!(closure.kept().contains_key(name));
        }
        prop_assert!(closure.rounds() <= catalog.len().max(1));

        // Closing the result again adds nothing.
        let again = engine.close(closure.kept().clone());
        prop_assert_eq!(names(again.kept()), names(closure.kept()));
        prop_assert!(again
            .dependencies()
            .keys()
            .all(|name| closure.dependencies().contains_key(name)));
    }
}
