//! Outbound side of the pipeline: encoding palm crops and getting them to
//! the processing server without stalling the frame loop.
//!
//! Upload outcomes are reported through `tracing` only. Nothing in this
//! module feeds back into the tracker.

mod dispatcher;
mod encode;
mod http;
mod request;

pub use dispatcher::{SubmitStatus, UploadDispatcher, UploadSink};
pub use encode::{EncodeError, encode_jpeg};
pub use http::{HttpUploader, UploadConfig};
pub use request::{
    EncodedImage, ResponseBody, UploadError, UploadPurpose, UploadReceipt, UploadRequest, Uploader,
};
