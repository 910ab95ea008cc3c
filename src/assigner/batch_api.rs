use crate::assigner::batch::{AssignBatchRequest, ClipAssignments};
use crate::assigner::{AssignerOptions, ClipAssigner};
use crate::clip::{Clip, Frame};
use crate::utils::bbox::ImageShape;
use crossbeam::channel::{Receiver, Sender};
use log::warn;
use std::mem;
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{spawn, JoinHandle};

type AssignSenderChannel = Sender<AssignCommands>;
type AssignReceiverChannel = Receiver<AssignCommands>;
type BatchBusyMonitor = Arc<(Mutex<usize>, Condvar)>;

enum AssignCommands {
    Assign {
        clip_id: u64,
        frames: Vec<Frame>,
        channel: Sender<ClipAssignments>,
        monitor: BatchBusyMonitor,
    },
    Exit,
}

/// Multi-threaded engine matching batches of independent clips.
///
/// Clips of a batch are dispatched round-robin over a fixed pool of worker
/// threads, each holding its own [ClipAssigner] with the shared options.
/// Clip validation failures travel to the caller through the result channel
/// rather than killing the worker.
///
pub struct BatchAssigner {
    monitor: Option<BatchBusyMonitor>,
    shape: ImageShape,
    worker_threads: Vec<(AssignSenderChannel, JoinHandle<()>)>,
}

impl Drop for BatchAssigner {
    fn drop(&mut self) {
        let worker_threads = mem::take(&mut self.worker_threads);
        for (tx, t) in worker_threads {
            tx.send(AssignCommands::Exit)
                .expect("Worker thread must be alive.");
            drop(tx);
            t.join()
                .expect("Worker thread is expected to shutdown successfully.");
        }
    }
}

fn assign_thread(opts: AssignerOptions, shape: ImageShape, rx: AssignReceiverChannel) {
    let assigner = ClipAssigner::new(opts);
    while let Ok(command) = rx.recv() {
        match command {
            AssignCommands::Assign {
                clip_id,
                frames,
                channel,
                monitor,
            } => {
                let results = Clip::new(frames, shape).and_then(|clip| assigner.assign(&clip));
                let res = channel.send((clip_id, results));
                if let Err(e) = res {
                    warn!("Unable to send results to a caller, likely the caller already closed the channel. Error is: {:?}", e);
                }
                let (lock, cvar) = &*monitor;
                let mut lock = lock.lock().unwrap();
                *lock -= 1;
                cvar.notify_one();
            }
            AssignCommands::Exit => break,
        }
    }
}

impl BatchAssigner {
    pub fn new(opts: AssignerOptions, shape: ImageShape, workers: usize) -> Self {
        assert!(workers > 0);
        let worker_threads = (0..workers)
            .map(|_| {
                let (tx, rx) = crossbeam::channel::unbounded();
                let thread_opts = opts.clone();
                (tx, spawn(move || assign_thread(thread_opts, shape, rx)))
            })
            .collect::<Vec<_>>();

        Self {
            monitor: None,
            shape,
            worker_threads,
        }
    }

    /// Engine with one worker per available core
    pub fn with_default_workers(opts: AssignerOptions, shape: ImageShape) -> Self {
        Self::new(opts, shape, num_cpus::get())
    }

    /// Dispatches the batch to the worker pool.
    ///
    /// Blocks while a previous batch is still in flight, then returns as soon
    /// as every clip is handed to a worker. Results are consumed from the
    /// request's paired result object.
    ///
    pub fn predict(&mut self, batch_request: AssignBatchRequest<Frame>) {
        if let Some(m) = &self.monitor {
            let (lock, cvar) = &**m;
            let _guard = cvar.wait_while(lock.lock().unwrap(), |v| *v > 0).unwrap();
        }

        self.monitor = Some(Arc::new((
            Mutex::new(batch_request.batch_size()),
            Condvar::new(),
        )));

        for (i, (clip_id, frames)) in batch_request.get_batch().iter().enumerate() {
            let thread_id = i % self.worker_threads.len();
            self.worker_threads[thread_id]
                .0
                .send(AssignCommands::Assign {
                    clip_id: *clip_id,
                    frames: frames.clone(),
                    channel: batch_request.get_sender(),
                    monitor: self.monitor.as_ref().unwrap().clone(),
                })
                .expect("Sending assignment request to worker thread must not fail");
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::assigner::batch::AssignBatchRequest;
    use crate::assigner::batch_api::BatchAssigner;
    use crate::assigner::{AssignerOptions, ClipAssigner};
    use crate::clip::{Clip, Frame};
    use crate::examples::{ClipGen, InstanceGen};
    use crate::utils::bbox::{CenterBox, CornerBox, ImageShape};
    use nalgebra::DMatrix;

    fn shape() -> ImageShape {
        ImageShape::new(100.0, 100.0)
    }

    fn generator() -> ClipGen {
        let mut gen = ClipGen::new(shape(), 2, 3);
        gen.add_instance(InstanceGen::new(
            1,
            0,
            CornerBox::new(10.0, 10.0, 30.0, 30.0),
            1.0,
        ));
        gen.add_instance(InstanceGen::new(
            2,
            1,
            CornerBox::new(50.0, 50.0, 75.0, 80.0),
            1.0,
        ));
        gen
    }

    #[test]
    fn batch_matches_direct_assignment() {
        let frames = generator().take(4).collect::<Vec<_>>();

        let direct = ClipAssigner::default()
            .assign(&Clip::new(frames.clone(), shape()).unwrap())
            .unwrap();

        let mut engine = BatchAssigner::new(AssignerOptions::default(), shape(), 2);
        let (mut request, result) = AssignBatchRequest::new();
        for f in frames {
            request.add(7, f);
        }
        engine.predict(request);

        let (clip_id, results) = result.get();
        assert_eq!(clip_id, 7);
        assert_eq!(results.unwrap(), direct);
    }

    #[test]
    fn several_clips_all_answered() {
        let mut engine = BatchAssigner::with_default_workers(AssignerOptions::default(), shape());
        let (mut request, result) = AssignBatchRequest::new();

        let mut gen = generator();
        for clip_id in 0..3u64 {
            for f in gen.by_ref().take(5) {
                request.add(clip_id, f);
            }
        }
        engine.predict(request);

        let mut seen = Vec::default();
        for _ in 0..result.batch_size() {
            let (clip_id, results) = result.get();
            let results = results.unwrap();
            assert_eq!(results.len(), 5);
            for r in &results {
                assert_eq!(r.num_assigned(), 2);
            }
            seen.push(clip_id);
        }
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2]);
    }

    #[test]
    fn inconsistent_clip_reports_error() {
        let mut engine = BatchAssigner::new(AssignerOptions::default(), shape(), 1);
        let (mut request, result) = AssignBatchRequest::new();

        request.add(
            3,
            Frame::new(
                vec![CenterBox::new(0.5, 0.5, 0.1, 0.1)],
                DMatrix::zeros(1, 2),
                vec![],
                vec![],
                vec![],
            )
            .unwrap(),
        );
        request.add(
            3,
            Frame::new(vec![], DMatrix::zeros(0, 2), vec![], vec![], vec![]).unwrap(),
        );
        engine.predict(request);

        let (clip_id, results) = result.get();
        assert_eq!(clip_id, 3);
        assert!(results.is_err());
    }

    #[test]
    fn new_drop() {
        let mut engine = BatchAssigner::new(AssignerOptions::default(), shape(), 2);
        let (mut request, result) = AssignBatchRequest::new();
        for f in generator().take(2) {
            request.add(0, f);
        }
        engine.predict(request);

        for _ in 0..result.batch_size() {
            let data = result.get();
            assert_eq!(data.0, 0);
        }
    }
}
