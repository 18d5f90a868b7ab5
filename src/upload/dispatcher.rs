//! Background dispatch of uploads off the frame loop.

use std::thread::{self, JoinHandle};

use crossbeam_channel::{Sender, TrySendError};
use tracing::{error, info, warn};

use crate::upload::{UploadRequest, Uploader};

/// Result of handing a request to a sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitStatus {
    Queued,
    /// The sink was saturated or closed; the request was discarded.
    Dropped,
}

/// Receives upload requests from the capture loop. `submit` must not block.
pub trait UploadSink {
    fn submit(&self, request: UploadRequest) -> SubmitStatus;
}

/// Runs an [`Uploader`] on a dedicated worker thread fed by a bounded queue.
///
/// Outcomes are only logged. A saturated queue drops new requests instead of
/// stalling the caller.
pub struct UploadDispatcher {
    sender: Option<Sender<UploadRequest>>,
    worker: Option<JoinHandle<()>>,
}

impl UploadDispatcher {
    pub fn spawn<U>(uploader: U, queue_capacity: usize) -> std::io::Result<Self>
    where
        U: Uploader + Send + 'static,
    {
        let (sender, receiver) = crossbeam_channel::bounded::<UploadRequest>(queue_capacity.max(1));

        let worker = thread::Builder::new()
            .name("palm-upload".to_string())
            .spawn(move || {
                for request in receiver {
                    let path = request.purpose.path();
                    match uploader.upload(&request) {
                        Ok(receipt) => {
                            info!(path, status = receipt.status, "palm uploaded");
                        }
                        Err(e) => {
                            warn!(path, error = %e, "palm upload failed");
                        }
                    }
                }
            })?;

        Ok(Self {
            sender: Some(sender),
            worker: Some(worker),
        })
    }

    /// Stop accepting requests, finish the queued ones and join the worker.
    pub fn shutdown(mut self) {
        self.close();
    }

    fn close(&mut self) {
        drop(self.sender.take());
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!("upload worker panicked");
            }
        }
    }
}

impl UploadSink for UploadDispatcher {
    fn submit(&self, request: UploadRequest) -> SubmitStatus {
        let Some(sender) = self.sender.as_ref() else {
            return SubmitStatus::Dropped;
        };
        match sender.try_send(request) {
            Ok(()) => SubmitStatus::Queued,
            Err(TrySendError::Full(_)) => {
                warn!("upload queue full, palm image dropped");
                SubmitStatus::Dropped
            }
            Err(TrySendError::Disconnected(_)) => {
                error!("upload worker is gone, palm image dropped");
                SubmitStatus::Dropped
            }
        }
    }
}

impl Drop for UploadDispatcher {
    fn drop(&mut self) {
        self.close();
    }
}
