use crate::assigner::result::AssignResult;
use anyhow::Result;
use crossbeam::channel::{Receiver, Sender};
use log::debug;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub type BatchRecords<T> = HashMap<u64, Vec<T>>;
pub type ClipAssignments = (u64, Result<Vec<AssignResult>>);

/// Batch of clips submitted for assignment in one go. Items are grouped by
/// clip id; the paired [AssignBatchResult] receives one message per clip.
///
#[derive(Debug, Clone)]
pub struct AssignBatchRequest<T> {
    batch: BatchRecords<T>,
    sender: Sender<ClipAssignments>,
    batch_size: Arc<Mutex<usize>>,
}

#[derive(Clone, Debug)]
pub struct AssignBatchResult {
    receiver: Receiver<ClipAssignments>,
    batch_size: Arc<Mutex<usize>>,
}

impl AssignBatchResult {
    pub fn ready(&self) -> bool {
        !self.receiver.is_empty()
    }

    pub fn get(&self) -> ClipAssignments {
        self.receiver
            .recv()
            .expect("Receiver must always receive batch computation result")
    }

    pub fn batch_size(&self) -> usize {
        *self.batch_size.lock().unwrap()
    }
}

impl<T> AssignBatchRequest<T> {
    pub fn get_sender(&self) -> Sender<ClipAssignments> {
        self.sender.clone()
    }

    #[allow(dead_code)]
    pub(crate) fn send(&self, res: ClipAssignments) -> bool {
        let res = self.sender.send(res);
        if let Err(e) = res {
            debug!(
                "Error occurred when sending results to the batch result object. Error is: {:?}",
                e
            );
            false
        } else {
            true
        }
    }

    pub fn batch_size(&self) -> usize {
        *self.batch_size.lock().unwrap()
    }

    pub fn add(&mut self, clip_id: u64, elt: T) {
        let vec = self.batch.get_mut(&clip_id);
        if let Some(vec) = vec {
            vec.push(elt);
        } else {
            self.batch.insert(clip_id, vec![elt]);
        }
        let mut batch_size = self.batch_size.lock().unwrap();
        *batch_size = self.batch.len();
    }

    pub fn new() -> (Self, AssignBatchResult) {
        let (sender, receiver) = crossbeam::channel::bounded(1);
        let batch_size = Arc::new(Mutex::new(0));
        (
            Self {
                batch: BatchRecords::default(),
                sender,
                batch_size: batch_size.clone(),
            },
            AssignBatchResult {
                receiver,
                batch_size,
            },
        )
    }

    pub fn get_batch(&self) -> &BatchRecords<T> {
        &self.batch
    }
}
