//! Throughput of one classification and rewrite pass over a large client module.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use prisma_json_types::schema::Datamodel;
use prisma_json_types::{EntityCatalog, RewriteConfig, rewrite_source};
use std::fmt::Write;
use std::hint::black_box;

fn datamodel(entities: usize) -> Datamodel {
    let models: Vec<String> = (0..entities)
        .map(|i| {
            format!(
                r#"{{ "name": "Entity{i}", "fields": [
                    {{ "name": "id", "type": "String" }},
                    {{ "name": "meta", "type": "Json", "documentation": "[Meta{i}]" }},
                    {{ "name": "raw", "type": "Json" }}
                ] }}"#
            )
        })
        .collect();
    Datamodel::from_json(&format!(r#"{{ "models": [{}] }}"#, models.join(",")))
        .expect("generated schema is valid")
}

/// A module shaped like generated client output: payloads, inputs and relation wrappers.
fn module(entities: usize) -> String {
    let mut out = String::from("export namespace Prisma {\n");
    for i in 0..entities {
        let e = format!("Entity{i}");
        let next = format!("Entity{}", (i + 1) % entities);
        write!(
            out,
            r#"  export type ${e}Payload<ExtArgs> = {{
    name: "{e}"
    objects: {{ parent: Prisma.${next}Payload<ExtArgs> | null }}
    scalars: $Extensions.GetPayloadResult<{{
      id: string
      meta: Prisma.JsonValue | null
      raw: Prisma.JsonValue | null
    }}, ExtArgs["result"]["entity"]>
    composites: {{}}
  }}
  export type {e}CreateInput = {{
    id?: string
    meta?: NullableJsonNullValueInput | InputJsonValue
    raw?: NullableJsonNullValueInput | InputJsonValue
  }}
  export type {e}WhereInput = {{
    id?: StringFilter<"{e}"> | string
    meta?: JsonNullableFilter<"{e}">
  }}
  export type {e}UncheckedUpdateManyWithoutParentInput = {{
    meta?: NullableJsonNullValueInput | InputJsonValue
  }}
  export type {e}ListRelationFilter = {{
    every?: {e}WhereInput
  }}
"#
        )
        .expect("writing to a String cannot fail");
    }
    out.push_str("}\n");
    out
}

fn bench_rewrite(c: &mut Criterion) {
    let mut group = c.benchmark_group("rewrite_pass");
    for entities in [10, 100, 500] {
        let catalog = EntityCatalog::build(&datamodel(entities), &RewriteConfig::default())
            .expect("catalog builds");
        let source = module(entities);
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(entities), &source, |b, source| {
            b.iter(|| rewrite_source(black_box(source), &catalog).expect("rewrite succeeds"))
        });
    }
    group.finish();
}

fn bench_catalog(c: &mut Criterion) {
    let datamodel = datamodel(500);
    c.bench_function("catalog_build_500", |b| {
        b.iter(|| EntityCatalog::build(black_box(&datamodel), &RewriteConfig::default()))
    });
}

criterion_group!(benches, bench_rewrite, bench_catalog);
criterion_main!(benches);
