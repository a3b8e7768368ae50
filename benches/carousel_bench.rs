use criterion::{criterion_group, criterion_main, Criterion};
use showreel::markup::scan_document;
use showreel::platform::SimulatedPlatform;
use showreel::{Direction, Page, ShowreelConfig};

const FIXTURE: &str = include_str!("../tests/fixtures/portfolio.html");

fn bench_scan_document(c: &mut Criterion) {
    c.bench_function("scan_document", |b| {
        b.iter(|| {
            let _ = scan_document(FIXTURE, None).unwrap();
        })
    });
}

fn bench_change_slide(c: &mut Criterion) {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .expect("runtime");
    let local = tokio::task::LocalSet::new();
    let markup = scan_document(FIXTURE, None).unwrap();
    let platform = SimulatedPlatform::new();

    // Mounting spawns timers, so it has to happen inside the LocalSet
    let page = local.block_on(&rt, async {
        Page::mount(&markup, &platform, &ShowreelConfig::default()).expect("mount")
    });

    c.bench_function("change_slide", |b| {
        b.iter(|| {
            page.change_slide("c1", Direction::Next);
        })
    });
}

criterion_group!(benches, bench_scan_document, bench_change_slide);
criterion_main!(benches);
