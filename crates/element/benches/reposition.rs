//! Sibling reordering and child-list rebuild cost

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use dom::DomArena;
use element::{Child, ElementHandle, ElementOptions, Parent, Position};

fn list_with(arena: &mut DomArena, len: usize) -> (ElementHandle, Vec<ElementHandle>) {
    let ul = ElementHandle::create(arena, ElementOptions::new().tag("ul")).unwrap();
    let parent = Parent::try_from(&ul).unwrap();
    let items = (0..len)
        .map(|i| {
            ElementHandle::create(
                arena,
                ElementOptions::new()
                    .tag("li")
                    .parent(parent)
                    .child(i.to_string()),
            )
            .unwrap()
        })
        .collect();
    (ul, items)
}

fn bench_to_position(c: &mut Criterion) {
    let mut group = c.benchmark_group("to_position");
    for len in [8usize, 64, 512] {
        let mut arena = DomArena::new();
        let (_ul, items) = list_with(&mut arena, len);
        let target = &items[len / 2];

        group.bench_with_input(BenchmarkId::from_parameter(len), &len, |b, _| {
            b.iter(|| {
                target.to_position(&mut arena, Position::First).unwrap();
                target
                    .to_position(&mut arena, black_box(Position::Last))
                    .unwrap();
            })
        });
    }
    group.finish();
}

fn bench_set_children(c: &mut Criterion) {
    c.bench_function("set_children/16_text", |b| {
        let mut arena = DomArena::new();
        let mut handle = ElementHandle::create(&mut arena, ElementOptions::new()).unwrap();
        let mut round = 0usize;

        b.iter(|| {
            round += 1;
            let children: Vec<Child> = (0..16)
                .map(|i| Child::Text(format!("{}-{}", round, i)))
                .collect();
            handle.set_children(&mut arena, black_box(children)).unwrap();
        })
    });
}

criterion_group!(benches, bench_to_position, bench_set_children);
criterion_main!(benches);
