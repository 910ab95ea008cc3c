#![feature(test)]

extern crate test;

use clipmatch::assigner::costs::cost_matrix;
use clipmatch::assigner::AssignerOptions;
use clipmatch::examples::{ClipGen, InstanceGen};
use clipmatch::prelude::{CornerBox, ImageShape};
use test::Bencher;

#[bench]
fn bench_cost_matrix_0010(b: &mut Bencher) {
    bench_costs(10, b);
}

#[bench]
fn bench_cost_matrix_0100(b: &mut Bencher) {
    bench_costs(100, b);
}

#[bench]
fn bench_cost_matrix_0500(b: &mut Bencher) {
    bench_costs(500, b);
}

fn bench_costs(instances: usize, b: &mut Bencher) {
    let shape = ImageShape::new(1920.0, 1080.0);
    let classes = 8;
    let mut gen = ClipGen::new(shape, classes, instances / 2);

    for i in 0..instances {
        let col = (i % 25) as f32;
        let row = (i / 25) as f32;
        gen.add_instance(InstanceGen::new(
            i as i64 + 1,
            (i % classes) as i64,
            CornerBox::new(
                20.0 + 74.0 * col,
                10.0 + 52.0 * row,
                80.0 + 74.0 * col,
                55.0 + 52.0 * row,
            ),
            1.0,
        ));
    }

    let frame = gen.next().unwrap();
    let opts = AssignerOptions::default();

    b.iter(|| {
        let costs = cost_matrix(&frame, &shape, &opts);
        assert_eq!(costs.ncols(), instances);
    });
}
