//! Criterion benchmarks for fmpalette critical paths
//!
//! Benchmarks the core performance-critical operations:
//! - Remap: per-pixel color substitution over RGBA buffers
//! - Script: rendering the palette script for many objects
//! - Container: patching a template with a large payload
//! - Registry: resolving a shuffled project

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use fmpalette::color::{pack, ColorValue};
use fmpalette::container::{patch, Container, SCRIPT_SENTINEL};
use fmpalette::registry::{AssetRegistry, Costume, FileEntry, FileHandle, GameObject, PaletteGraph};
use fmpalette::remap::{costume_lookup, remap};
use fmpalette::script::render_script;

// =============================================================================
// Test Data Generators
// =============================================================================

/// RGBA buffer cycling through 16 colors
fn make_pixels(pixel_count: usize) -> Vec<u8> {
    (0..pixel_count).flat_map(|i| [(i % 16) as u8 * 16, 0, 255 - (i % 16) as u8, 255]).collect()
}

/// Costume mapping every other color of the 16-color cycle
fn make_costume(index: u32) -> Costume {
    let mut costume = Costume::new(index, format!("costume{}", index));
    for i in (0..16u8).step_by(2) {
        let src = pack(i * 16, 0, 255 - i, 255);
        costume.set(src, ColorValue::from(pack(0, i * 16, 0, 255).to_string().as_str()));
    }
    costume
}

fn make_graph(objects: usize, costumes: u32) -> PaletteGraph {
    let mut graph = PaletteGraph::new();
    for o in 0..objects {
        let mut object = GameObject::new(format!("bench::group{}.obj{}", o, o), None);
        for c in 0..costumes {
            object.insert_costume(make_costume(c));
        }
        graph.insert(object);
    }
    graph
}

fn make_project(palettes: usize) -> Vec<FileEntry> {
    let mut entries = Vec::new();
    for i in 0..palettes {
        let palette = format!(
            r#"{{"guid":"p{i}","id":"bench::g.o{i}","imageAsset":"img{i}","colors":[{{"$id":"a","color":"4278190335"}}],"maps":[{{"name":"Base","colors":[{{"paletteColorId":"a","targetColor":"4278255360"}}]}}]}}"#
        );
        entries.push(FileEntry::new(FileHandle::from_bytes(format!("o{i}.palettes"), palette)));
        entries.push(FileEntry::new(FileHandle::from_bytes(
            format!("o{i}.png.meta"),
            format!(r#"{{"guid":"img{i}"}}"#),
        )));
        entries.push(FileEntry::new(FileHandle::from_bytes(format!("o{i}.png"), vec![0u8; 16])));
    }
    // Sidecars before and after their content
    entries.reverse();
    entries
}

// =============================================================================
// Remap Benchmarks
// =============================================================================

fn bench_remap(c: &mut Criterion) {
    let mut group = c.benchmark_group("remap");
    let lookup = costume_lookup(&make_costume(0)).expect("bench colors are valid");

    for side in [64usize, 256, 1024] {
        let pixels = make_pixels(side * side);
        group.throughput(Throughput::Elements((side * side) as u64));
        group.bench_with_input(BenchmarkId::new("remap", side), &pixels, |b, pixels| {
            b.iter(|| remap(black_box(pixels), &lookup))
        });
    }

    group.finish();
}

// =============================================================================
// Script Benchmarks
// =============================================================================

fn bench_script(c: &mut Criterion) {
    let mut group = c.benchmark_group("script");

    for objects in [1usize, 16, 128] {
        let graph = make_graph(objects, 8);
        group.bench_with_input(BenchmarkId::new("render_script", objects), &graph, |b, graph| {
            b.iter(|| render_script(black_box(graph)))
        });
    }

    group.finish();
}

// =============================================================================
// Container Benchmarks
// =============================================================================

fn bench_container(c: &mut Criterion) {
    let mut group = c.benchmark_group("container");
    let json = format!(r#"{{"id":"paletteeditor","name":"Palette Editor","code":"{}"}}"#, SCRIPT_SENTINEL);
    let script = render_script(&make_graph(32, 8));

    for payload_kb in [64usize, 4096] {
        let template = Container::assemble(&json, &vec![7u8; payload_kb * 1024])
            .expect("bench template fits");
        group.throughput(Throughput::Bytes(template.len() as u64));
        group.bench_with_input(BenchmarkId::new("patch", payload_kb), &template, |b, template| {
            b.iter(|| patch(black_box(template), SCRIPT_SENTINEL, &script, Some("mymod"), None))
        });
    }

    group.finish();
}

// =============================================================================
// Registry Benchmarks
// =============================================================================

fn bench_registry(c: &mut Criterion) {
    let mut group = c.benchmark_group("registry");
    let entries = make_project(200);

    group.bench_function("resolve_200_palettes", |b| {
        b.iter(|| {
            let mut registry = AssetRegistry::new();
            registry.ingest_all(entries.clone()).expect("bench project is valid");
            registry.build_graph()
        })
    });

    group.finish();
}

criterion_group!(benches, bench_remap, bench_script, bench_container, bench_registry);
criterion_main!(benches);
