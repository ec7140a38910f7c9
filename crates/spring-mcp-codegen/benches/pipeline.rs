//! Scan pipeline benchmarks over a synthetic project.
//!
//! Run with: cargo bench --package spring-mcp-codegen

use criterion::{Criterion, criterion_group, criterion_main};
use spring_mcp_codegen::Converter;
use spring_mcp_core::ConverterConfig;
use std::fmt::Write;
use std::fs;
use std::hint::black_box;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

/// `controllers` controllers with 10 routes each, sharing a small model graph.
fn project(controllers: usize) -> TempDir {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(
        root,
        "src/main/java/com/bench/dto/Item.java",
        "package com.bench.dto;\n\
         public class Item { private Long id; private String name; private Item parent; \
         private java.util.List<Tag> tags; }\n",
    );
    write(
        root,
        "src/main/java/com/bench/dto/Tag.java",
        "package com.bench.dto;\npublic record Tag(String label, int weight) {}\n",
    );
    for index in 0..controllers {
        let mut text = format!(
            "package com.bench.web;\n\
             import com.bench.dto.*;\n\
             @RestController\n\
             @RequestMapping(\"/api/c{index}\")\n\
             public class Controller{index} {{\n"
        );
        for route in 0..10 {
            let _ = write!(
                text,
                "    @PostMapping(\"/items{route}/{{id}}\")\n\
                 \x20   public Item route{route}(@PathVariable Long id, @RequestBody Item item) {{ return item; }}\n"
            );
        }
        text.push_str("}\n");
        write(
            root,
            &format!("src/main/java/com/bench/web/Controller{index}.java"),
            &text,
        );
    }
    temp
}

fn bench_scan(c: &mut Criterion) {
    let temp = project(50);
    let converter = Converter::new(ConverterConfig::default()).unwrap();
    c.bench_function("scan_50_controllers", |b| {
        b.iter(|| converter.scan(black_box(temp.path())).unwrap());
    });
}

criterion_group!(benches, bench_scan);
criterion_main!(benches);
