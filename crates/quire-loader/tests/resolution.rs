//! Integration tests for specifier resolution.
//!
//! Covers caching, relative references, dependency-root remapping, URLs and
//! the not-found path against an archive plus packaged resources.

use std::fs;
use std::sync::Arc;

use quire_loader::{
    Archive, LoaderConfig, MemoryResources, ResourceSpace, Resolver, SourceArtifact,
};
use tempfile::TempDir;
use url::Url;

fn resolver(archive: Archive, resources: ResourceSpace) -> Resolver {
    Resolver::new(&LoaderConfig::default(), Arc::new(archive), Arc::new(resources))
}

fn project() -> Archive {
    Archive::new()
        .with_file(".atomist/editors/Foo.ts", "import {Bar} from './Bar';")
        .with_file(".atomist/editors/Bar", "export class Bar {}")
        .with_file(".atomist/lib/util.js", "exports.util = 1;")
}

fn packaged() -> ResourceSpace {
    ResourceSpace::new().with(
        MemoryResources::new()
            .with("lodash/index.js", "module.exports = lodash;")
            .with("lib/helper.js", "exports.help = 1;")
            .with(".atomist/node_modules/@atomist/rug/model/Core.js", "core"),
    )
}

// ────────────────────────────────────────────────────────────────────────────
// Caching
// ────────────────────────────────────────────────────────────────────────────

#[test]
fn test_resolution_is_idempotent() {
    let resolver = resolver(project(), packaged());
    for specifier in [
        ".atomist/editors/Foo.ts",
        "lodash/index.js",
        "some/path/node_modules/lodash/index.js",
    ] {
        let first = resolver.resolve(specifier, None).unwrap().unwrap();
        let second = resolver.resolve(specifier, None).unwrap().unwrap();
        assert_eq!(first, second, "{} changed between calls", specifier);
        assert!(first.same_as(&second), "{} was not served from cache", specifier);
    }
}

#[test]
fn test_cache_is_keyed_by_requested_specifier() {
    let resolver = resolver(project(), packaged());
    resolver.resolve("some/path/node_modules/lodash/index.js", None).unwrap().unwrap();
    assert!(resolver.cached("some/path/node_modules/lodash/index.js").is_some());
    assert!(resolver.cached("lodash/index.js").is_none());
}

#[test]
fn test_cached_entry_is_never_replaced() {
    let resolver = resolver(project(), packaged());
    let first = resolver.resolve(".atomist/lib/util.js", None).unwrap().unwrap();
    for _ in 0..3 {
        let again = resolver.resolve(".atomist/lib/util.js", None).unwrap().unwrap();
        assert!(again.same_as(&first));
    }
    assert_eq!(resolver.cache_len(), 1);
}

// ────────────────────────────────────────────────────────────────────────────
// Relative references
// ────────────────────────────────────────────────────────────────────────────

#[test]
fn test_relative_to_base() {
    let resolver = resolver(project(), packaged());
    let bar = resolver
        .resolve("./Bar", Some(".atomist/editors/Foo.ts"))
        .unwrap()
        .unwrap();
    assert_eq!(bar.uri(), ".atomist/editors/Bar");
    assert_eq!(bar.contents(), "export class Bar {}");
}

#[test]
fn test_parent_relative_to_base() {
    let resolver = resolver(project(), packaged());
    let util = resolver
        .resolve("../lib/util.js", Some(".atomist/editors/Foo.ts"))
        .unwrap()
        .unwrap();
    assert_eq!(util.uri(), ".atomist/lib/util.js");
}

#[test]
fn test_same_relative_text_from_different_bases() {
    let archive = Archive::new()
        .with_file("a/main.js", "")
        .with_file("a/x.js", "from a")
        .with_file("b/main.js", "")
        .with_file("b/x.js", "from b");
    let resolver = resolver(archive, ResourceSpace::new());

    let from_a = resolver.resolve("./x.js", Some("a/main.js")).unwrap().unwrap();
    let from_b = resolver.resolve("./x.js", Some("b/main.js")).unwrap().unwrap();
    assert_eq!(from_a.contents(), "from a");
    assert_eq!(from_b.contents(), "from b");
}

#[test]
fn test_relative_uses_context_when_base_is_unknown() {
    let resolver = resolver(project(), packaged());
    let context = SourceArtifact::new(".atomist/editors/Foo.js", "");
    let bar = resolver
        .resolve_in("./Bar", Some("not/a/known/file.ts"), Some(&context))
        .unwrap()
        .unwrap();
    assert_eq!(bar.uri(), ".atomist/editors/Bar");
}

#[test]
fn test_relative_to_resource_url_context() {
    let resolver = resolver(Archive::new(), packaged());
    let context = SourceArtifact::new("classpath:/lib/nested/main.js", "");
    let helper = resolver
        .resolve_in("../helper.js", None, Some(&context))
        .unwrap()
        .unwrap();
    assert_eq!(helper.uri(), "classpath:/lib/helper.js");
    assert_eq!(helper.contents(), "exports.help = 1;");
}

#[test]
fn test_relative_from_context_falls_through_to_remapping() {
    let resolver = resolver(Archive::new(), packaged());
    let context = SourceArtifact::new("lodash/main.js", "");
    let index = resolver
        .resolve_in("./index.js", None, Some(&context))
        .unwrap()
        .unwrap();
    assert_eq!(index.uri(), "lodash/index.js");
}

// ────────────────────────────────────────────────────────────────────────────
// Dependency-root remapping
// ────────────────────────────────────────────────────────────────────────────

#[test]
fn test_nested_dependency_matches_direct_lookup() {
    let resolver = resolver(project(), packaged());
    let nested = resolver
        .resolve("some/path/node_modules/lodash/index.js", None)
        .unwrap()
        .unwrap();
    let direct = resolver.resolve("lodash/index.js", None).unwrap().unwrap();

    assert_eq!(nested.contents(), direct.contents());
    assert_eq!(nested.uri(), "some/path/node_modules/lodash/index.js");
}

#[test]
fn test_innermost_dependency_root_wins() {
    let resolver = resolver(project(), packaged());
    let found = resolver
        .resolve("node_modules/a/node_modules/lodash/index.js", None)
        .unwrap()
        .unwrap();
    assert_eq!(found.contents(), "module.exports = lodash;");
}

#[test]
fn test_alternate_namespaced_root() {
    let resolver = resolver(project(), packaged());
    let core = resolver.resolve("@atomist/rug/model/Core.js", None).unwrap().unwrap();
    assert_eq!(core.contents(), "core");
}

#[test]
fn test_custom_package_roots() {
    let config = LoaderConfig::from_toml_str(
        r#"
dependency_marker = "vendor/"
package_roots = ["vendor/"]
"#,
    )
    .unwrap();
    let resources = ResourceSpace::new().with(
        MemoryResources::new()
            .with("left-pad/index.js", "pad")
            .with("vendor/right-pad/index.js", "right"),
    );
    let resolver = Resolver::new(&config, Arc::new(Archive::new()), Arc::new(resources));

    let nested = resolver.resolve("x/vendor/left-pad/index.js", None).unwrap().unwrap();
    assert_eq!(nested.contents(), "pad");
    let bare = resolver.resolve("right-pad/index.js", None).unwrap().unwrap();
    assert_eq!(bare.contents(), "right");
}

// ────────────────────────────────────────────────────────────────────────────
// URLs and fallbacks
// ────────────────────────────────────────────────────────────────────────────

#[test]
fn test_file_url() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("local.js");
    fs::write(&path, "var local;").unwrap();
    let url = Url::from_file_path(&path).unwrap();

    let resolver = resolver(Archive::new(), ResourceSpace::new());
    let found = resolver.resolve(url.as_str(), None).unwrap().unwrap();
    assert_eq!(found.uri(), url.as_str());
    assert_eq!(found.contents(), "var local;");
}

#[test]
fn test_relative_to_file_url_base() {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("lib")).unwrap();
    fs::write(temp.path().join("main.js"), "main").unwrap();
    fs::write(temp.path().join("lib/dep.js"), "dep").unwrap();
    let main = Url::from_file_path(temp.path().join("main.js")).unwrap();

    let resolver = resolver(Archive::new(), ResourceSpace::new());
    let dep = resolver.resolve("./lib/dep.js", Some(main.as_str())).unwrap().unwrap();
    assert_eq!(dep.contents(), "dep");
    assert!(dep.uri().starts_with("file:///"));
    assert!(dep.uri().ends_with("/lib/dep.js"));
}

#[test]
fn test_unknown_specifier_is_not_found() {
    let resolver = resolver(project(), packaged());
    assert!(resolver.resolve("does/not/exist.js", None).unwrap().is_none());
    assert!(resolver.resolve("https://example.com/a.js", None).unwrap().is_none());
    assert!(resolver
        .resolve("./Missing", Some(".atomist/editors/Foo.ts"))
        .unwrap()
        .is_none());
    assert_eq!(resolver.cache_len(), 1, "only the base was cached");
}
