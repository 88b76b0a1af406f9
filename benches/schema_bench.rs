use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use schema_erd::loader;
use schema_erd::render::to_plantuml;
use schema_erd::schema::SchemaModel;
use std::hint::black_box;

fn generate_schema(tables: usize, columns_per_table: usize) -> String {
    let mut src = String::from("ActiveRecord::Schema[7.1].define(version: 2024_01_01_000000) do\n");

    for t in 0..tables {
        src.push_str(&format!(
            "  create_table \"table_{}s\", force: :cascade do |t|\n",
            t
        ));
        for c in 0..columns_per_table {
            src.push_str(&format!(
                "    t.string \"column_{}\", limit: 255, null: false, default: \"\"\n",
                c
            ));
        }
        if t > 0 {
            src.push_str(&format!("    t.bigint \"table_{}_id\", null: false\n", t - 1));
            src.push_str(&format!(
                "    t.index [\"table_{}_id\"], name: \"index_table_{}_on_parent\"\n",
                t - 1,
                t
            ));
        }
        src.push_str("  end\n\n");
    }

    for t in 1..tables {
        src.push_str(&format!(
            "  add_foreign_key \"table_{}s\", \"table_{}s\"\n",
            t,
            t - 1
        ));
    }

    src.push_str("end\n");
    src
}

fn bench_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("load");

    for tables in [10, 100, 500] {
        let src = generate_schema(tables, 10);

        group.throughput(Throughput::Bytes(src.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("load_str", format!("{}_tables", tables)),
            &src,
            |b, src| {
                b.iter(|| {
                    let mut model = SchemaModel::new();
                    loader::load_str(black_box(src), &mut model).unwrap();
                    model
                });
            },
        );
    }

    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");

    for tables in [10, 100, 500] {
        let mut model = SchemaModel::new();
        loader::load_str(&generate_schema(tables, 10), &mut model).unwrap();

        group.bench_with_input(
            BenchmarkId::new("plantuml", format!("{}_tables", tables)),
            &model,
            |b, model| {
                b.iter(|| to_plantuml(black_box(model)));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_load, bench_render);
criterion_main!(benches);
