use clipmatch::examples::{ClipGen, InstanceGen};
use clipmatch::prelude::{
    AssignBatchRequest, AssignerOptions, BatchAssigner, CornerBox, Frame, ImageShape,
};

fn main() {
    env_logger::init();

    let shape = ImageShape::new(1280.0, 720.0);
    let mut engine = BatchAssigner::with_default_workers(AssignerOptions::default(), shape);

    let (mut request, result) = AssignBatchRequest::<Frame>::new();
    for clip_id in 0..4u64 {
        let mut gen = ClipGen::new(shape, 3, 5);
        gen.add_instance(InstanceGen::new(
            1,
            0,
            CornerBox::new(80.0, 90.0, 240.0, 330.0),
            2.0,
        ));
        gen.add_instance(InstanceGen::new(
            2,
            1,
            CornerBox::new(600.0, 200.0, 820.0, 500.0),
            2.0,
        ));
        for frame in gen.take(6) {
            request.add(clip_id, frame);
        }
    }

    engine.predict(request);

    for _ in 0..result.batch_size() {
        let (clip_id, results) = result.get();
        let results = results.unwrap();
        eprintln!("Clip {}: {} frames", clip_id, results.len());
        for (frame, r) in results.iter().enumerate() {
            eprintln!(
                "  frame {}: gt_inds {:?}, labels {:?}",
                frame, r.gt_inds, r.labels
            );
        }
    }
}
