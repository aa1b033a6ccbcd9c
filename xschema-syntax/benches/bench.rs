use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use xschema_syntax::{Collector, Scanner, StrSource};

fn prolog(comments: usize) -> String {
    let mut text = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"no\"?>\n");
    for i in 0..comments {
        text.push_str(&format!(
            "<!-- comment {i} with some \u{1F600} text --><?pi-{i} data &#x41; here?>\n"
        ));
    }
    text.push_str("<root/>");
    text
}

fn bench_prolog(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan_prolog");
    for comments in [10, 1_000] {
        let text = prolog(comments);
        group.bench_with_input(BenchmarkId::from_parameter(comments), &text, |b, text| {
            let mut scanner = Scanner::new();
            b.iter(|| {
                let mut src = StrSource::new(black_box(text));
                let mut errors = Collector::new();
                let items = scanner.scan_prolog(&mut src, &mut errors, false);
                black_box(items.map(|i| i.len()).ok())
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_prolog);
criterion_main!(benches);
