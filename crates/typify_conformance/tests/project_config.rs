//! Integration tests for building from an on-disk project configuration:
//! `typify.toml`, settings file discovery and adapter options.

use typify_conformance::{ToyEngine, Workspace};
use typify_config::{load_config, load_settings, resolve_adapter};
use typify_incremental::{Coordinator, CoordinatorOptions, ScriptVersion};

fn coordinator_from_disk(ws: &Workspace) -> Coordinator<ToyEngine> {
    let config = load_config(&ws.project).unwrap();
    let adapter = resolve_adapter(&config, &ws.project).unwrap();
    let settings = load_settings(&adapter.settings_file).unwrap();
    let options = CoordinatorOptions::from_adapter(&adapter, &ws.input, &ws.cache, settings);
    Coordinator::new(options, ToyEngine::new()).unwrap()
}

#[test]
fn builds_from_project_files() {
    let mut ws = Workspace::new();
    ws.write_project(
        "typify.toml",
        r#"
[adapter]
name = "dummy"
local_types = "types"
extensions = [".ts"]
root_files = ["index.ts"]
"#,
    );
    ws.write_project(
        "tsconfig.json",
        r#"{
  // comments are allowed
  "compilerOptions": {
    "target": "es2017",
    "declaration": true,
    "rootDir": "elsewhere",
    "outDir": "dist",
  },
}"#,
    );
    ws.write_project("types/rsvp/index.d.ts", "export {};");
    ws.write("index.ts", "import RSVP from 'rsvp';\nexport const index = 1;\n");
    ws.write("legacy.js", "var ignored;\n");

    let mut c = coordinator_from_disk(&ws);
    assert!(c.instance().starts_with("dummy:"));
    let settings = c.host().compiler_settings();
    assert_eq!(settings.root_dir.as_ref(), Some(&ws.input));
    assert_eq!(settings.out_dir.as_ref(), Some(&ws.cache));
    assert_eq!(settings.target.as_deref(), Some("es2017"));

    // Seeded before any diff, unversioned until touched.
    let index = ws.input.join("index.ts");
    assert_eq!(c.host().script_file_names(), vec![index.clone()]);
    assert_eq!(c.host().script_version(&index), ScriptVersion::Unversioned);

    ws.rebuild(&mut c).unwrap();
    assert_eq!(c.host().script_version(&index), ScriptVersion::Revision(0));
    assert_eq!(c.host().script_file_names(), vec![index]);
    assert!(ws.cached("index.js").is_some());
    assert!(ws.cached("index.d.ts").is_some());
    assert!(ws.cached("legacy.js").is_none());
}

#[test]
fn settings_file_found_beside_package_json() {
    let ws = Workspace::new();
    ws.write_project("typify.toml", "[adapter]\nname = \"nested\"\n");
    ws.write_project("tsconfig.json", "{ \"compilerOptions\": { \"baseUrl\": \"src\" } }");
    let sub = ws.project.join("tmp");

    let config = load_config(&ws.project).unwrap();
    let adapter = resolve_adapter(&config, &sub).unwrap();
    assert_eq!(adapter.settings_file, ws.project.join("tsconfig.json"));
    let settings = load_settings(&adapter.settings_file).unwrap();
    assert_eq!(settings.base_url, Some(ws.project.join("src")));
}

#[test]
fn invalid_settings_are_rejected_before_building() {
    let ws = Workspace::new();
    ws.write_project("typify.toml", "[adapter]\nname = \"bad\"\n");
    ws.write_project(
        "tsconfig.json",
        r#"{ "compilerOptions": { "sourceMap": true, "inlineSourceMap": true } }"#,
    );
    let config = load_config(&ws.project).unwrap();
    let adapter = resolve_adapter(&config, &ws.project).unwrap();
    assert!(load_settings(&adapter.settings_file).is_err());
}

#[test]
fn options_built_in_code() {
    let mut ws = Workspace::new();
    ws.write_project("typings/moment/index.d.ts", "export {};");
    ws.write("a.ts", "import moment from 'moment';\nexport const a = 1;\n");
    ws.write("b.js", "var b;\n");

    let options = ws
        .options(Default::default())
        .with_name("manual")
        .with_local_types(ws.project.join("typings"))
        .with_extensions(vec![".ts".to_string()]);
    let mut c = Coordinator::new(options, ToyEngine::new()).unwrap();
    assert!(c.instance().starts_with("manual:"));

    ws.rebuild(&mut c).unwrap();
    assert!(ws.cached("a.js").is_some());
    assert!(ws.cached("b.js").is_none());
}
