//! CapturePipeline for combining detection, steadiness tracking and upload.

use std::time::Instant;

use tracing::{debug, warn};

use crate::config::AppConfig;
use crate::integration::{DetectionSource, Frame};
use crate::tracker::{Action, Rect, SteadinessTracker, Timestamp, select_best};
use crate::upload::{
    HttpUploader, SubmitStatus, UploadDispatcher, UploadPurpose, UploadRequest, UploadSink,
    encode_jpeg,
};

/// What happened to one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameOutcome {
    /// Nothing to upload this frame
    NoAction,
    /// The tracker was ready but the box covered no pixels
    EmptyCrop { bbox: Rect },
    /// The crop could not be encoded
    EncodeFailed { bbox: Rect },
    /// The crop was handed to the upload sink
    Dispatched { bbox: Rect },
    /// The upload sink refused the crop
    Dropped { bbox: Rect },
}

/// Per-stream loop body: detector, steadiness tracker and upload sink.
///
/// One pipeline per camera stream. Drive it with one call per frame, in
/// capture order.
pub struct CapturePipeline<D: DetectionSource, S: UploadSink> {
    detector: D,
    tracker: SteadinessTracker,
    sink: S,
    purpose: UploadPurpose,
    jpeg_quality: u8,
    clock_origin: Instant,
}

impl<D: DetectionSource, S: UploadSink> CapturePipeline<D, S> {
    /// Create a pipeline uploading plain captures.
    pub fn new(detector: D, tracker: SteadinessTracker, sink: S) -> Self {
        Self {
            detector,
            tracker,
            sink,
            purpose: UploadPurpose::Capture,
            jpeg_quality: 90,
            clock_origin: Instant::now(),
        }
    }

    /// Set what uploads triggered by this pipeline are for.
    pub fn with_purpose(mut self, purpose: UploadPurpose) -> Self {
        self.purpose = purpose;
        self
    }

    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality;
        self
    }

    /// Process a frame stamped with the pipeline's monotonic clock.
    pub fn process_frame(&mut self, frame: &Frame) -> FrameOutcome {
        let now = self.clock_origin.elapsed();
        self.process_frame_at(frame, now)
    }

    /// Process a frame captured at `now`.
    ///
    /// A detector error is logged and treated as a frame without a palm.
    pub fn process_frame_at(&mut self, frame: &Frame, now: Timestamp) -> FrameOutcome {
        let detections = match self.detector.detect(frame) {
            Ok(detections) => detections,
            Err(e) => {
                warn!(error = %e, "palm detection failed");
                Vec::new()
            }
        };

        let best = select_best(detections, self.tracker.config().confidence_threshold);
        match self.tracker.update(best, now) {
            Action::NoAction => FrameOutcome::NoAction,
            Action::UploadReady { bbox } => self.dispatch(frame, bbox),
        }
    }

    fn dispatch(&mut self, frame: &Frame, bbox: Rect) -> FrameOutcome {
        let Some(crop) = frame.crop(&bbox) else {
            debug!(?bbox, "palm crop is empty, nothing to upload");
            return FrameOutcome::EmptyCrop { bbox };
        };

        let image = match encode_jpeg(&crop, self.jpeg_quality) {
            Ok(image) => image,
            Err(e) => {
                warn!(error = %e, "failed to encode palm crop");
                return FrameOutcome::EncodeFailed { bbox };
            }
        };

        match self
            .sink
            .submit(UploadRequest::new(self.purpose.clone(), image))
        {
            SubmitStatus::Queued => FrameOutcome::Dispatched { bbox },
            SubmitStatus::Dropped => FrameOutcome::Dropped { bbox },
        }
    }

    /// Get a reference to the underlying detector.
    pub fn detector(&self) -> &D {
        &self.detector
    }

    /// Get a mutable reference to the underlying detector.
    pub fn detector_mut(&mut self) -> &mut D {
        &mut self.detector
    }

    /// Get a reference to the underlying tracker.
    pub fn tracker(&self) -> &SteadinessTracker {
        &self.tracker
    }

    /// Get a mutable reference to the underlying tracker.
    pub fn tracker_mut(&mut self) -> &mut SteadinessTracker {
        &mut self.tracker
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn purpose(&self) -> &UploadPurpose {
        &self.purpose
    }

    pub fn jpeg_quality(&self) -> u8 {
        self.jpeg_quality
    }
}

impl<D: DetectionSource> CapturePipeline<D, UploadDispatcher> {
    /// Build a pipeline that posts crops to the configured server.
    ///
    /// The tracker, the HTTP uploader with its worker queue and the JPEG
    /// quality all come from `config`. The detector is built by the caller,
    /// typically from `config.detector`.
    pub fn from_config(detector: D, config: &AppConfig) -> crate::Result<Self> {
        config.validate()?;
        let tracker = SteadinessTracker::new(config.tracker.clone())?;
        let uploader = HttpUploader::new(&config.upload)?;
        let sink = UploadDispatcher::spawn(uploader, config.upload.queue_capacity)?;
        debug!(
            endpoint = %config.upload.endpoint,
            queue = config.upload.queue_capacity,
            "capture pipeline configured"
        );
        Ok(Self::new(detector, tracker, sink).with_jpeg_quality(config.upload.jpeg_quality))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::fmt;
    use std::time::Duration;

    use super::*;
    use crate::error::Error;
    use crate::tracker::{Detection, TrackerConfig};
    use crate::upload::UploadConfig;

    #[derive(Debug)]
    struct DetectorDown;

    impl fmt::Display for DetectorDown {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "detector down")
        }
    }

    impl std::error::Error for DetectorDown {}

    /// Replays a fixed script of per-frame results.
    struct ScriptedDetector {
        script: VecDeque<Result<Vec<Detection>, DetectorDown>>,
    }

    impl ScriptedDetector {
        fn new(script: Vec<Result<Vec<Detection>, DetectorDown>>) -> Self {
            Self {
                script: script.into(),
            }
        }
    }

    impl DetectionSource for ScriptedDetector {
        type Error = DetectorDown;

        fn detect(&mut self, _frame: &Frame) -> Result<Vec<Detection>, Self::Error> {
            self.script.pop_front().unwrap_or(Ok(Vec::new()))
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        requests: RefCell<Vec<UploadRequest>>,
        refuse: bool,
    }

    impl UploadSink for RecordingSink {
        fn submit(&self, request: UploadRequest) -> SubmitStatus {
            if self.refuse {
                return SubmitStatus::Dropped;
            }
            self.requests.borrow_mut().push(request);
            SubmitStatus::Queued
        }
    }

    fn secs(s: f64) -> Timestamp {
        Duration::from_secs_f64(s)
    }

    fn palm(x0: f32, y0: f32, x1: f32, y1: f32) -> Result<Vec<Detection>, DetectorDown> {
        Ok(vec![Detection::new(x0, y0, x1, y1, 0.9)])
    }

    fn pipeline(
        script: Vec<Result<Vec<Detection>, DetectorDown>>,
        sink: RecordingSink,
    ) -> CapturePipeline<ScriptedDetector, RecordingSink> {
        let tracker = SteadinessTracker::new(TrackerConfig::default()).unwrap();
        CapturePipeline::new(ScriptedDetector::new(script), tracker, sink)
    }

    #[test]
    fn test_steady_palm_is_uploaded() {
        let frame = Frame::filled(640, 480, 3, 90);
        let mut p = pipeline(
            vec![palm(100.0, 100.0, 200.0, 200.0), palm(102.0, 100.0, 202.0, 200.0)],
            RecordingSink::default(),
        )
        .with_purpose(UploadPurpose::Register {
            token: "user-1".into(),
        });

        assert_eq!(p.process_frame_at(&frame, secs(0.0)), FrameOutcome::NoAction);
        let bbox = Rect::from_tlbr(100.0, 100.0, 200.0, 200.0);
        assert_eq!(
            p.process_frame_at(&frame, secs(0.1)),
            FrameOutcome::Dispatched { bbox }
        );

        let requests = p.sink().requests.borrow();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].purpose.path(), "/registerPalm");
        assert_eq!(&requests[0].image.bytes[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_best_detection_is_tracked() {
        let frame = Frame::filled(640, 480, 3, 0);
        let mut p = pipeline(
            vec![Ok(vec![
                Detection::new(0.0, 0.0, 50.0, 50.0, 0.6),
                Detection::new(300.0, 300.0, 400.0, 400.0, 0.95),
            ])],
            RecordingSink::default(),
        );
        p.process_frame_at(&frame, secs(0.0));
        assert_eq!(
            p.tracker().state().reference(),
            Some(Rect::from_tlbr(300.0, 300.0, 400.0, 400.0))
        );
    }

    #[test]
    fn test_detector_error_is_a_miss() {
        let frame = Frame::filled(640, 480, 3, 0);
        let mut p = pipeline(
            vec![
                palm(100.0, 100.0, 200.0, 200.0),
                Err(DetectorDown),
                palm(100.0, 100.0, 200.0, 200.0),
            ],
            RecordingSink::default(),
        );

        p.process_frame_at(&frame, secs(0.0));
        assert_eq!(p.process_frame_at(&frame, secs(0.1)), FrameOutcome::NoAction);
        assert_eq!(p.tracker().state().steady_since(), Some(secs(0.0)));
        assert!(matches!(
            p.process_frame_at(&frame, secs(0.2)),
            FrameOutcome::Dispatched { .. }
        ));
    }

    #[test]
    fn test_empty_crop_leaves_tracker_alone() {
        // Box entirely outside the frame
        let frame = Frame::filled(64, 48, 3, 0);
        let mut p = pipeline(
            vec![palm(100.0, 100.0, 200.0, 200.0), palm(100.0, 100.0, 200.0, 200.0)],
            RecordingSink::default(),
        );

        p.process_frame_at(&frame, secs(0.0));
        let bbox = Rect::from_tlbr(100.0, 100.0, 200.0, 200.0);
        assert_eq!(
            p.process_frame_at(&frame, secs(0.1)),
            FrameOutcome::EmptyCrop { bbox }
        );
        assert!(p.sink().requests.borrow().is_empty());
        assert_eq!(p.tracker().state().reference(), Some(bbox));
        assert_eq!(p.tracker().state().steady_since(), Some(secs(0.0)));
    }

    #[test]
    fn test_refused_upload_still_starts_cooldown() {
        let frame = Frame::filled(640, 480, 3, 0);
        let sink = RecordingSink {
            refuse: true,
            ..Default::default()
        };
        let mut p = pipeline(
            vec![
                palm(100.0, 100.0, 200.0, 200.0),
                palm(100.0, 100.0, 200.0, 200.0),
                palm(100.0, 100.0, 200.0, 200.0),
            ],
            sink,
        );

        p.process_frame_at(&frame, secs(0.0));
        assert!(matches!(
            p.process_frame_at(&frame, secs(0.1)),
            FrameOutcome::Dropped { .. }
        ));
        // No early retry: the cooldown is time based
        assert_eq!(p.process_frame_at(&frame, secs(0.2)), FrameOutcome::NoAction);
        assert_eq!(p.tracker().last_emitted_at(), Some(secs(0.1)));
    }

    #[test]
    fn test_unencodable_frame() {
        let frame = Frame::filled(640, 480, 4, 0);
        let mut p = pipeline(
            vec![palm(100.0, 100.0, 200.0, 200.0), palm(100.0, 100.0, 200.0, 200.0)],
            RecordingSink::default(),
        );
        p.process_frame_at(&frame, secs(0.0));
        assert!(matches!(
            p.process_frame_at(&frame, secs(0.1)),
            FrameOutcome::EncodeFailed { .. }
        ));
    }

    fn offline_config() -> AppConfig {
        AppConfig {
            tracker: TrackerConfig {
                movement_threshold: 12.0,
                upload_cooldown: secs(5.0),
                ..Default::default()
            },
            upload: UploadConfig {
                // Nothing listens here; uploads fail in the worker and are only logged
                endpoint: "http://127.0.0.1:9".into(),
                timeout: Duration::from_millis(200),
                queue_capacity: 2,
                jpeg_quality: 55,
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_from_config_applies_sections() {
        let config = offline_config();
        let detector = ScriptedDetector::new(vec![
            palm(100.0, 100.0, 200.0, 200.0),
            palm(100.0, 100.0, 200.0, 200.0),
        ]);
        let mut p = CapturePipeline::from_config(detector, &config).unwrap();

        assert_eq!(p.tracker().config(), &config.tracker);
        assert_eq!(p.jpeg_quality(), 55);
        assert_eq!(p.purpose(), &UploadPurpose::Capture);

        let frame = Frame::filled(640, 480, 3, 0);
        p.process_frame_at(&frame, secs(0.0));
        assert!(matches!(
            p.process_frame_at(&frame, secs(0.1)),
            FrameOutcome::Dispatched { .. }
        ));
    }

    #[test]
    fn test_from_config_rejects_invalid_config() {
        let mut config = offline_config();
        config.upload.jpeg_quality = 0;
        let result = CapturePipeline::from_config(ScriptedDetector::new(Vec::new()), &config);
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
