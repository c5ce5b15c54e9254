use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde_json::json;
use stencil_engine::{Engine, RenderConfig};
use stencil_model::DataNode;
use stencil_text::TextDocument;

const LETTER: &str = r#"Dear ${Value *value:name},
${If *cond:vip}
thank you for being a valued customer.
${Else}
thank you for your order.
${EndIf}
${For *value:orders @as:o}
Order ${Value @value:"o.id"}:
${For *value:lines as:line}
- ${Value $value:"line.item"} x ${Value $value:"line.qty"}
${EndFor}
${EndFor}
Regards"#;

fn model(orders: usize, lines: usize) -> serde_json::Value {
    let orders: Vec<_> = (0..orders)
        .map(|id| {
            let lines: Vec<_> = (0..lines)
                .map(|n| json!({ "item": format!("item-{}", n), "qty": n + 1 }))
                .collect();
            json!({ "id": id, "lines": lines })
        })
        .collect();
    json!({ "name": "Ada", "vip": true, "orders": orders })
}

fn render_letter(c: &mut Criterion, name: &str, orders: usize, lines: usize) {
    let data = model(orders, lines);
    c.bench_function(name, |b| {
        b.iter(|| {
            let mut doc = TextDocument::parse(black_box(LETTER));
            let mut engine = Engine::with_core_commands(RenderConfig::default());
            engine
                .render(&mut doc, DataNode::from_json(&data))
                .map(|_| doc.render())
        })
    });
}

fn render_small(c: &mut Criterion) {
    render_letter(c, "render_small_letter", 2, 3);
}

fn render_large(c: &mut Criterion) {
    render_letter(c, "render_large_letter", 50, 20);
}

fn parse_only(c: &mut Criterion) {
    c.bench_function("parse_letter", |b| {
        b.iter(|| TextDocument::parse(black_box(LETTER)))
    });
}

criterion_group!(benches, parse_only, render_small, render_large);
criterion_main!(benches);
