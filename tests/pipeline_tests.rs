//! Integration tests for the compile pipeline, from source text to a loaded
//! module or a diagnostic list.
//!
//! Scripts are loaded from the test_scripts directory.

use std::path::PathBuf;

use quickc::provider::{
    CodeProvider, DEFAULT_NAMESPACES, DEFAULT_REFERENCES, DefaultCompilationOptionProvider,
    DefaultNamespaceProvider, DefaultReferenceProvider, DefaultWithAdditionalNamespaceProvider,
    DefaultWithAdditionalReferenceProvider, FixedModuleNameProvider, MetadataReference, Provider,
    SyntaxTreeProvider,
};
use quickc::{
    CompilationAssembler, CompilationOptions, CompileError, LOAD_FAILURE, MemoryCompiler,
    ModuleEmitter, PolicyOverrides, ReferenceCatalog, Severity, compile,
};

/// Load a test script from the test_scripts directory.
fn load_script(filename: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("test_scripts")
        .join(filename);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e))
}

fn fixed(name: &str) -> Option<PolicyOverrides> {
    Some(PolicyOverrides::new().with_module_name(name))
}

fn emit_failure(result: Result<quickc::LoadedModule, CompileError>) -> quickc::EmitFailure {
    match result {
        Err(CompileError::Emit(failure)) => failure,
        Err(other) => panic!("expected an emit failure, got {other}"),
        Ok(module) => panic!("expected an emit failure, got module {}", module.name()),
    }
}

// =============================================================================
// Successful compiles
// =============================================================================

#[test]
fn test_scripts_compile_without_errors() {
    for script in ["greeter.cs", "counter.cs", "control_flow.cs", "library.cs"] {
        let module = compile(&load_script(script), None)
            .unwrap_or_else(|e| panic!("{script}: {e}\n{:?}", e.diagnostics()));
        assert!(!module.warnings().has_blocking(), "{script}");
    }
}

#[test]
fn greeter_types_are_found_by_qualified_name() {
    let module = compile(&load_script("greeter.cs"), None).unwrap();
    assert!(module.find_class("Samples.Greeter").is_some());
    assert!(module.find_class("Greeter").is_none());
}

#[test]
fn identical_sources_emit_identical_images() {
    let source = load_script("counter.cs");
    let first = compile(&source, fixed("deterministic")).unwrap();
    let second = compile(&source, fixed("deterministic")).unwrap();
    assert_eq!(first.image_bytes(), second.image_bytes());
    assert_eq!(first.image(), second.image());
}

#[test]
fn random_module_names_are_valid_identifiers() {
    let module = compile("class A {}", None).unwrap();
    assert!(quickc::provider::is_valid_module_name(module.name()));
    assert_eq!(module.name().len(), 12);
}

// =============================================================================
// Failed compiles
// =============================================================================

#[test]
fn bad_return_yields_errors_and_no_module() {
    let failure = emit_failure(compile(&load_script("errors.cs"), None));
    assert!(failure.errors().count() > 0);
    assert!(failure.errors().all(|d| d.severity == Severity::Error));
    assert!(failure.contains_code("QC0127"));
}

#[test]
fn syntax_errors_fail_with_error_diagnostics() {
    let failure = emit_failure(compile("class A { public int M() { return 1 } }", None));
    assert!(failure.errors().any(|d| d.code.starts_with("QC1")));
}

#[test]
fn excessive_nesting_is_a_parse_failure() {
    let depth = 300;
    let source = format!(
        "class A {{ public int M() => {}1{}; }}",
        "(".repeat(depth),
        ")".repeat(depth)
    );
    assert!(matches!(compile(&source, None), Err(CompileError::Parse(_))));
}

#[test]
fn nesting_just_below_the_limit_compiles_on_a_default_thread() {
    let depth = quickc_parser::MAX_NESTING as usize - 3;
    let source = format!(
        "class A {{ public int M() => {}1{}; }}",
        "(".repeat(depth),
        ")".repeat(depth)
    );
    let compiled = std::thread::spawn(move || compile(&source, None).map(|module| module.name().to_string()))
        .join()
        .unwrap();
    assert!(compiled.is_ok(), "{compiled:?}");
}

#[test]
fn long_flat_sums_compile_and_run() {
    for terms in [3_000, 20_000] {
        let source = format!("class A {{ public int M() => {}; }}", vec!["1"; terms].join(" + "));
        let value = std::thread::spawn(move || {
            let module = compile(&source, None).unwrap();
            let instance = module.create_instance("A").unwrap();
            instance.func::<(), i32>("M", ()).unwrap()
        })
        .join()
        .unwrap();
        assert_eq!(value, terms as i32);
    }
}

#[test]
fn long_member_chains_are_reported_not_fatal() {
    let source = format!(
        "class A {{ public string M() => \"a\"{}; }}",
        ".ToString()".repeat(5_000)
    );
    let failure = emit_failure(compile(&source, None));
    assert!(failure.contains_code("QC8078"));
}

#[test]
fn unknown_reference_is_reported() {
    let overrides = PolicyOverrides::new().with_references(["System.Drawing"]);
    let failure = emit_failure(compile("class A {}", Some(overrides)));
    assert!(failure.contains_code("QC0006"));
}

#[test]
fn unknown_using_is_reported() {
    let failure = emit_failure(compile("using System.Windows.Forms; class A {}", None));
    assert!(failure.contains_code("QC0246"));
}

#[test]
fn constant_overflow_is_a_compile_error() {
    let failure = emit_failure(compile(
        "class A { public int M() => int.MaxValue + 1; }",
        None,
    ));
    assert!(failure.contains_code("QC0220"));
}

// =============================================================================
// Warnings
// =============================================================================

#[test]
fn warnings_do_not_block_by_default() {
    let module = compile(&load_script("warnings.cs"), None).unwrap();
    assert!(module.warnings().contains_code("QC0162"));
    assert!(module.warnings().iter().all(|d| d.severity == Severity::Warning));
}

#[test]
fn warnings_as_errors_blocks_the_emit() {
    let options = CompilationOptions::default().with_warnings_as_errors(true);
    let overrides = PolicyOverrides::new().with_options(options);
    let failure = emit_failure(compile(&load_script("warnings.cs"), Some(overrides)));
    let promoted: Vec<_> = failure.errors().collect();
    assert_eq!(promoted.len(), 1);
    assert_eq!(promoted[0].code, "QC0162");
    assert!(promoted[0].is_warning_as_error);
}

// =============================================================================
// Providers and composition
// =============================================================================

#[test]
fn additional_providers_are_supersets() {
    let namespaces = DefaultWithAdditionalNamespaceProvider::new(["Extra.Namespace"]).provide();
    assert!(namespaces.iter().any(|n| n == "Extra.Namespace"));
    for default in DefaultNamespaceProvider.provide() {
        assert!(namespaces.contains(&default));
    }

    let references = DefaultWithAdditionalReferenceProvider::new(["Extra.Library"]).provide();
    assert!(references.contains(&MetadataReference::new("Extra.Library")));
    for default in DefaultReferenceProvider.provide() {
        assert!(references.contains(&default));
    }
}

#[test]
fn custom_provider_stack_compiles() {
    let arena = bumpalo::Bump::new();
    let name = FixedModuleNameProvider::new("custom_stack").unwrap();
    let assembler = CompilationAssembler::new(
        SyntaxTreeProvider::new(CodeProvider::new(load_script("greeter.cs")), &arena),
        name,
        DefaultReferenceProvider,
        DefaultCompilationOptionProvider::new(DefaultNamespaceProvider),
    );
    let module = MemoryCompiler::new(ModuleEmitter::new(ReferenceCatalog::standard()))
        .compile(&assembler)
        .unwrap();
    assert_eq!(module.name(), "custom_stack");
    assert_eq!(module.image().references, DEFAULT_REFERENCES);
}

#[test]
fn extra_namespaces_are_global_usings() {
    let source = "class A { public int M() => Enumerable.Count(\"abc\"); }";
    let options = CompilationOptions::default().with_usings(["System.Linq"]);
    let arena = bumpalo::Bump::new();
    let assembler = CompilationAssembler::new(
        SyntaxTreeProvider::new(CodeProvider::new(source), &arena),
        || "linq_only".to_string(),
        || vec![MetadataReference::new("System.Linq")],
        move || options.clone(),
    );
    let module = MemoryCompiler::default().compile(&assembler).unwrap();
    assert_eq!(module.image().references, ["System.Linq"]);
    assert_eq!(DEFAULT_NAMESPACES.len(), 7);
}

#[test]
fn restricted_catalog_fails_unknown_references() {
    let catalog = ReferenceCatalog::new().with(quickc_modules::runtime::library());
    let arena = bumpalo::Bump::new();
    let assembler = CompilationAssembler::new(
        SyntaxTreeProvider::new(CodeProvider::new("class A {}"), &arena),
        || "restricted".to_string(),
        DefaultReferenceProvider,
        CompilationOptions::default,
    );
    let result = MemoryCompiler::new(ModuleEmitter::new(&catalog)).compile(&assembler);
    let failure = emit_failure(result);
    assert!(failure.contains_code("QC0006"));
    assert!(!failure.contains_code(LOAD_FAILURE));
}
