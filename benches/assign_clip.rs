#![feature(test)]

extern crate test;

use clipmatch::examples::{ClipGen, InstanceGen};
use clipmatch::prelude::{ClipAssigner, CornerBox, ImageShape};
use test::Bencher;

#[bench]
fn bench_assign_clip_0010(b: &mut Bencher) {
    bench_assign(10, b);
}

#[bench]
fn bench_assign_clip_0050(b: &mut Bencher) {
    bench_assign(50, b);
}

#[bench]
fn bench_assign_clip_0100(b: &mut Bencher) {
    bench_assign(100, b);
}

fn bench_assign(instances: usize, b: &mut Bencher) {
    let shape = ImageShape::new(1920.0, 1080.0);
    let classes = 8;
    let frames = 4;
    let mut gen = ClipGen::new(shape, classes, instances / 2);

    for i in 0..instances {
        let col = (i % 10) as f32;
        let row = (i / 10) as f32;
        gen.add_instance(InstanceGen::new(
            i as i64 + 1,
            (i % classes) as i64,
            CornerBox::new(
                100.0 + 170.0 * col,
                80.0 + 95.0 * row,
                180.0 + 170.0 * col,
                170.0 + 95.0 * row,
            ),
            2.0,
        ));
    }

    let assigner = ClipAssigner::default();

    b.iter(|| {
        let clip = gen.clip(frames);
        let results = assigner.assign(&clip).unwrap();
        assert_eq!(results.len(), frames);
        assert_eq!(results[0].num_assigned(), instances);
    });
}
