//! Integration tests for whole-archive compilation.

use std::fs;
use std::sync::Arc;

use quire_loader::{
    Archive, ArchiveCompiler, CompilationError, LoaderConfig, MemoryResources, ResourceSpace,
    SourceLookup, SourceTree,
};
use tempfile::TempDir;

const EDITOR_TS: &str = "class SimpleEditor  {\n\n    edit() {\n        return \"yeah\"\n    }\n}\n";

const BROKEN_EDITOR_TS: &str =
    "class SimpleEditor  {\n\n    edit() {\n        let bla = new Test();\n        return \"yeah\"\n    }\n}\n";

/// Stands in for the transpiler: reports `new Test()` as an unknown name the
/// way tsc does, and otherwise emits the source behind a banner. Imports of
/// the form `import "<name>"` must resolve.
fn fake_tsc(name: &str, sources: &dyn SourceLookup) -> Result<String, CompilationError> {
    let source = sources
        .source_for(name, None)
        .map_err(|e| CompilationError::new(name, e.to_string()))?
        .ok_or_else(|| CompilationError::new(name, format!("cannot find source {}", name)))?;

    for (ix, line) in source.contents().lines().enumerate() {
        if let Some(column) = line.find("Test") {
            let caret = format!("{}^", " ".repeat(column));
            return Err(CompilationError::from_output(
                name,
                &format!(
                    "<#>{}({},{}): error TS2304: Cannot find name 'Test'.\n{}\n{}\n<#>",
                    name,
                    ix + 1,
                    column + 1,
                    line,
                    caret
                ),
            ));
        }
        if let Some(import) = line.strip_prefix("import \"").and_then(|l| l.strip_suffix('"')) {
            if sources.source_for(import, Some(name)).ok().flatten().is_none() {
                return Err(CompilationError::from_output(
                    name,
                    &format!(
                        "{}({},1): error TS2307: Cannot find module '{}'.",
                        name,
                        ix + 1,
                        import
                    ),
                ));
            }
        }
    }
    Ok(format!("// compiled\n{}", source.contents()))
}

fn compiler(resources: ResourceSpace) -> ArchiveCompiler {
    ArchiveCompiler::new(LoaderConfig::default(), Arc::new(fake_tsc), Arc::new(resources))
}

#[test]
fn test_compile_adds_executables() {
    let archive = Archive::new().with_file(".atomist/editors/MyEditor.ts", EDITOR_TS);
    let compiler = compiler(ResourceSpace::new());
    assert!(compiler.supports(&archive));

    let result = compiler.compile(&archive).unwrap();
    let compiled = result.find_file(".atomist/editors/MyEditor.js").unwrap();
    assert!(compiled.contains("class SimpleEditor"));
    assert!(result.contains(".atomist/editors/MyEditor.ts"));
}

#[test]
fn test_broken_sources_are_reported_together() {
    let archive = Archive::new()
        .with_file(".atomist/editors/MyEditor2.ts", BROKEN_EDITOR_TS)
        .with_file(".atomist/editors/MyEditor1.ts", BROKEN_EDITOR_TS);

    let err = compiler(ResourceSpace::new()).compile(&archive).unwrap_err();
    assert_eq!(
        err.to_string(),
        ".atomist/editors/MyEditor1.ts(4,23): error TS2304: Cannot find name 'Test'.\n\
         \x20       let bla = new Test();\n\
         \x20                     ^\n\
         \n\
         .atomist/editors/MyEditor2.ts(4,23): error TS2304: Cannot find name 'Test'.\n\
         \x20       let bla = new Test();\n\
         \x20                     ^"
    );
    assert_eq!(err.diagnostics().len(), 2);
    assert_eq!(err.source_name(), ".atomist/editors/MyEditor1.ts, .atomist/editors/MyEditor2.ts");
}

#[test]
fn test_one_broken_source_fails_the_archive() {
    let archive = Archive::new()
        .with_file(".atomist/editors/Good.ts", EDITOR_TS)
        .with_file(".atomist/editors/Bad.ts", BROKEN_EDITOR_TS);

    let err = compiler(ResourceSpace::new()).compile(&archive).unwrap_err();
    assert_eq!(err.diagnostics().len(), 1);
    assert_eq!(err.diagnostics()[0].file.as_deref(), Some(".atomist/editors/Bad.ts"));
}

#[test]
fn test_imports_resolve_through_packaged_resources() {
    let archive = Archive::new().with_file(
        ".atomist/editors/UsesRug.ts",
        "import \"@atomist/rug/operations/ProjectEditor.ts\"\nlet editor = 1;",
    );

    let missing = compiler(ResourceSpace::new()).compile(&archive).unwrap_err();
    assert_eq!(missing.diagnostics()[0].code.as_deref(), Some("TS2307"));

    let resources = ResourceSpace::new().with(MemoryResources::new().with(
        ".atomist/node_modules/@atomist/rug/operations/ProjectEditor.ts",
        "export interface ProjectEditor {}",
    ));
    let result = compiler(resources).compile(&archive).unwrap();
    assert!(result.contains(".atomist/editors/UsesRug.js"));
}

/// Emits `<name> uses <contents>` for each import, so tests can see which
/// copy of a dependency the compiler was handed.
fn inline_imports(name: &str, sources: &dyn SourceLookup) -> Result<String, CompilationError> {
    let source = sources
        .source_for(name, None)
        .map_err(|e| CompilationError::new(name, e.to_string()))?
        .ok_or_else(|| CompilationError::new(name, format!("cannot find source {}", name)))?;

    let mut out = Vec::new();
    for line in source.contents().lines() {
        if let Some(import) = line.strip_prefix("import \"").and_then(|l| l.strip_suffix('"')) {
            let dependency = sources
                .source_for(import, Some(name))
                .map_err(|e| CompilationError::new(name, e.to_string()))?
                .ok_or_else(|| CompilationError::new(name, format!("cannot find {}", import)))?;
            out.push(format!("{} uses {}", name, dependency.contents()));
        }
    }
    Ok(out.join("\n"))
}

#[test]
fn test_bundled_dependencies_shadow_packaged_ones() {
    let archive = Archive::new()
        .with_file(
            ".atomist/editors/Ed.ts",
            "import \".atomist/node_modules/@atomist/rug/model/Core.ts\"",
        )
        .with_file(".atomist/node_modules/@atomist/rug/model/Core.ts", "ARCHIVE-CORE");
    let resources = ResourceSpace::new()
        .with(MemoryResources::new().with("@atomist/rug/model/Core.ts", "PACKAGED-CORE"));
    let compiler = ArchiveCompiler::new(
        LoaderConfig::default(),
        Arc::new(inline_imports),
        Arc::new(resources),
    );

    let result = compiler.compile(&archive).unwrap();
    assert_eq!(
        result.find_file(".atomist/editors/Ed.js").as_deref(),
        Some(".atomist/editors/Ed.ts uses ARCHIVE-CORE")
    );
    assert!(result.find_file(".atomist/node_modules/@atomist/rug/model/Core.js").is_none());
}

#[test]
fn test_round_trip_through_directories() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    fs::create_dir_all(input.path().join(".atomist/editors")).unwrap();
    fs::write(input.path().join(".atomist/editors/MyEditor.ts"), EDITOR_TS).unwrap();

    let archive = Archive::from_dir(input.path()).unwrap();
    let result = compiler(ResourceSpace::new()).compile(&archive).unwrap();
    result.write_to(output.path()).unwrap();

    let written = fs::read_to_string(output.path().join(".atomist/editors/MyEditor.js")).unwrap();
    assert!(written.starts_with("// compiled\n"));
    assert!(output.path().join(".atomist/editors/MyEditor.ts").exists());
}

#[test]
fn test_nothing_to_compile() {
    let archive = Archive::new().with_file("README.md", "# demo");
    let compiler = compiler(ResourceSpace::new());
    assert!(!compiler.supports(&archive));
    assert_eq!(compiler.compile(&archive).unwrap(), archive);
}
