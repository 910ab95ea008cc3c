use clipmatch::examples::{ClipGen, InstanceGen};
use clipmatch::prelude::{ClipAssigner, CornerBox, ImageShape};

fn main() {
    env_logger::init();

    let shape = ImageShape::new(1920.0, 1080.0);
    let mut gen = ClipGen::new(shape, 4, 6);
    gen.add_instance(InstanceGen::new(
        1,
        0,
        CornerBox::new(100.0, 200.0, 260.0, 420.0),
        3.0,
    ));
    gen.add_instance(InstanceGen::new(
        2,
        2,
        CornerBox::new(900.0, 300.0, 1100.0, 640.0),
        3.0,
    ));
    gen.add_instance(InstanceGen::new(
        3,
        1,
        CornerBox::new(1400.0, 700.0, 1600.0, 980.0),
        3.0,
    ));

    let clip = gen.clip(8);
    let assigner = ClipAssigner::default();
    let results = assigner.assign(&clip).unwrap();

    for (frame, result) in results.iter().enumerate() {
        eprintln!("Frame {}: {:#?}", frame, result);
    }
}
