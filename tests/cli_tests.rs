//! CLI integration tests
//!
//! These tests run the fmpal binary against small projects on disk and check
//! exit codes and written files.

mod common;

use common::*;
use fmpalette::container::Container;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn fmpal(cwd: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_fmpal"))
        .current_dir(cwd)
        // Keep config discovery inside the temp dir
        .env("XDG_CONFIG_HOME", cwd)
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("Failed to execute fmpal")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

// ============================================================================
// inspect
// ============================================================================

#[test]
fn test_inspect_json() {
    let dir = TempDir::new().unwrap();
    write_project(&dir.path().join("project"), "ns::hero.body");

    let output = fmpal(dir.path(), &["inspect", "project", "--json"]);
    assert!(output.status.success(), "inspect failed: {}", stderr(&output));

    let report: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(report["objects"][0]["id"], "ns::hero.body");
    assert_eq!(report["objects"][0]["image"], "hero.png");
    assert_eq!(report["objects"][0]["costumes"][0]["enabled"], false);
    assert_eq!(report["objects"][0]["costumes"][1]["enabled"], true);
}

#[test]
fn test_inspect_reports_orphans_as_warning() {
    let dir = TempDir::new().unwrap();
    let project = dir.path().join("project");
    write_project(&project, "ns::hero.body");
    add_orphans(&project);

    let output = fmpal(dir.path(), &["inspect", "project"]);
    assert!(output.status.success(), "inspect failed: {}", stderr(&output));
    assert!(stderr(&output).contains("Warning: found orphan files"));
    assert!(stdout(&output).contains("orphan: loose.png (no meta file)"));
    assert!(stdout(&output).contains("orphan: gone.png.meta (no content)"));
}

#[test]
fn test_strict_orphans_fail() {
    let dir = TempDir::new().unwrap();
    let project = dir.path().join("project");
    write_project(&project, "ns::hero.body");
    add_orphans(&project);

    let output = fmpal(dir.path(), &["inspect", "project", "--strict"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Error: found orphan files"));
}

#[test]
fn test_missing_directory_is_aborted() {
    let dir = TempDir::new().unwrap();
    let output = fmpal(dir.path(), &["inspect", "nowhere"]);
    assert_eq!(output.status.code(), Some(3));
    assert!(!stderr(&output).contains("Error:"));
}

#[test]
fn test_invalid_config_is_rejected() {
    let dir = TempDir::new().unwrap();
    write_project(&dir.path().join("project"), "ns::hero.body");
    std::fs::write(dir.path().join("fmpal.toml"), "[preview]\nscale = 0\n").unwrap();

    let output = fmpal(dir.path(), &["inspect", "project"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("preview.scale"));
}

// ============================================================================
// preview
// ============================================================================

#[test]
fn test_preview_writes_every_costume() {
    let dir = TempDir::new().unwrap();
    write_project(&dir.path().join("project"), "ns::hero.body");

    let output = fmpal(dir.path(), &["preview", "project", "-o", "out", "--scale", "2"]);
    assert!(output.status.success(), "preview failed: {}", stderr(&output));

    let base = image::open(dir.path().join("out/ns__hero_body_0.png")).unwrap().to_rgba8();
    let blue = image::open(dir.path().join("out/ns__hero_body_1.png")).unwrap().to_rgba8();
    assert_eq!(base.dimensions(), (4, 4));
    assert_eq!(base.get_pixel(0, 0).0, RED);
    assert_eq!(blue.get_pixel(0, 0).0, BLUE);
    assert_eq!(blue.get_pixel(2, 0).0, GREEN);
}

#[test]
fn test_preview_colliding_names_are_kept_apart() {
    let dir = TempDir::new().unwrap();
    let project = dir.path().join("project");
    write_project(&project, "a b::c.d");
    // Second palette over the same image whose id sanitizes to the same name
    std::fs::write(project.join("library/other.palettes"), palette_json("pal-2", "a_b::c.d", "img-1")).unwrap();

    let output = fmpal(dir.path(), &["preview", "project", "-o", "out"]);
    assert!(output.status.success(), "preview failed: {}", stderr(&output));
    assert!(stderr(&output).contains("already written"));

    let out = dir.path().join("out");
    for name in ["a_b__c_d_0.png", "a_b__c_d_1.png", "a_b__c_d_0-2.png", "a_b__c_d_1-2.png"] {
        assert!(out.join(name).is_file(), "missing {}", name);
    }
}

#[test]
fn test_preview_unknown_object() {
    let dir = TempDir::new().unwrap();
    write_project(&dir.path().join("project"), "ns::hero.body");

    let output = fmpal(dir.path(), &["preview", "project", "--object", "ns::nope.x"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_preview_scale_out_of_range() {
    let dir = TempDir::new().unwrap();
    let output = fmpal(dir.path(), &["preview", ".", "--scale", "17"]);
    assert_eq!(output.status.code(), Some(2));
}

// ============================================================================
// export
// ============================================================================

#[test]
fn test_export_writes_container() {
    let dir = TempDir::new().unwrap();
    write_project(&dir.path().join("project"), "ns::hero.body");
    write_template(dir.path());

    let output = fmpal(
        dir.path(),
        &["export", "project", "--template", "paletteeditor.fra", "-o", "build", "--id", "mymod"],
    );
    assert!(output.status.success(), "export failed: {}", stderr(&output));

    let bytes = std::fs::read(dir.path().join("build/mymod.fra")).unwrap();
    let container = Container::parse(&bytes).unwrap();
    assert_eq!(container.payload, &template_payload()[..]);

    let json: serde_json::Value = serde_json::from_str(container.json).unwrap();
    assert_eq!(json["id"], "mymod");
    assert_eq!(json["name"], "Palette Editor");
    assert!(json["scripts"]["palettes"].as_str().unwrap().contains("\"ns::hero.body\" => ns__hero_body_PALETTES,"));
}

#[test]
fn test_export_invalid_id_lists_offenders() {
    let dir = TempDir::new().unwrap();
    write_project(&dir.path().join("project"), "badid");
    write_template(dir.path());

    let output = fmpal(dir.path(), &["export", "project", "--template", "paletteeditor.fra"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("  badid"));
    // Nothing was written over the template, which shares the default output name
    assert_eq!(std::fs::read(dir.path().join("paletteeditor.fra")).unwrap(), template_bytes());
}

#[test]
fn test_export_with_edits() {
    let dir = TempDir::new().unwrap();
    write_project(&dir.path().join("project"), "badid");
    write_template(dir.path());

    let output = fmpal(
        dir.path(),
        &[
            "export",
            "project",
            "--template",
            "paletteeditor.fra",
            "-o",
            "build",
            "--rename",
            "badid=ns::fixed.id",
            "--toggle",
            "ns::fixed.id#0",
            "--move",
            "ns::fixed.id#1=5",
        ],
    );
    assert!(output.status.success(), "export failed: {}", stderr(&output));

    let bytes = std::fs::read(dir.path().join("build/paletteeditor.fra")).unwrap();
    let container = Container::parse(&bytes).unwrap();
    let json: serde_json::Value = serde_json::from_str(container.json).unwrap();
    let script = json["scripts"]["palettes"].as_str().unwrap();
    assert!(script.contains("var ns__fixed_id_PALETTES"));
    assert!(script.contains("  0 => ["));
    assert!(script.contains("  5 => ["));
    assert!(!script.contains("  1 => ["));
}

#[test]
fn test_export_unknown_rename_target() {
    let dir = TempDir::new().unwrap();
    write_project(&dir.path().join("project"), "ns::hero.body");
    write_template(dir.path());

    let output = fmpal(
        dir.path(),
        &["export", "project", "--template", "paletteeditor.fra", "--rename", "ns::x.y=ns::z.w"],
    );
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("not found"));
}

#[test]
fn test_export_missing_template() {
    let dir = TempDir::new().unwrap();
    write_project(&dir.path().join("project"), "ns::hero.body");

    let output = fmpal(dir.path(), &["export", "project", "--template", "missing.fra"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("missing.fra"));
}
