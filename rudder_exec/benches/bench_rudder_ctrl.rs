//! # Rudder Control Benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use rudder_lib::rudder_ctrl::{Params, RudderCtrl};

fn rudder_ctrl_benchmark(c: &mut Criterion) {
    let params = Params {
        k_p: 2.0,
        k_i: 1.0,
        sample_interval_s: 0.2,
        rudder_max_deg: 45.0,
        rudder_min_deg: -45.0,
    };

    let mut rudder_ctrl = RudderCtrl::with_params(params).unwrap();

    // Sweep the heading so both sides of the map get exercised
    let mut heading_deg = -180.0;

    c.bench_function("rudder_ctrl_control_cycle", |b| {
        b.iter(|| {
            heading_deg += 7.5;
            if heading_deg > 180.0 {
                heading_deg -= 360.0;
            }

            rudder_ctrl
                .control_cycle(black_box(90.0), black_box(heading_deg))
                .unwrap()
        })
    });
}

criterion_group!(benches, rudder_ctrl_benchmark);
criterion_main!(benches);
