use std::convert::Infallible;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use ndarray::array;
use palm_gate::integration::DetectorConfig;
use palm_gate::upload::{ResponseBody, UploadError, UploadReceipt, UploadRequest, Uploader};
use palm_gate::{
    AppConfig, CapturePipeline, Detection, DetectionSource, Frame, FrameOutcome,
    SteadinessTracker, TrackerConfig, UploadDispatcher, UploadPurpose,
};

/// Emits the same raw model output for every frame.
#[derive(Default)]
struct FixedPalmModel {
    config: DetectorConfig,
}

impl DetectionSource for FixedPalmModel {
    type Error = Infallible;

    fn detect(&mut self, frame: &Frame) -> Result<Vec<Detection>, Self::Error> {
        // Palm in the middle of the frame, logit 3.0 (~0.95)
        let output = array![[0.5_f32, 0.5, 3.0, 0.25, 0.25, 0.0, 0.0]];
        Ok(self.config.decode(output.view(), frame).unwrap_or_default())
    }
}

#[derive(Clone, Default)]
struct Recorder {
    seen: Arc<Mutex<Vec<UploadRequest>>>,
}

impl Uploader for Recorder {
    fn upload(&self, request: &UploadRequest) -> Result<UploadReceipt, UploadError> {
        self.seen.lock().unwrap().push(request.clone());
        Ok(UploadReceipt {
            status: 200,
            body: ResponseBody::Text("ok".into()),
        })
    }
}

#[test]
fn test_end_to_end_scan_upload() {
    let recorder = Recorder::default();
    let dispatcher = UploadDispatcher::spawn(recorder.clone(), 2).unwrap();
    let tracker = SteadinessTracker::new(TrackerConfig {
        steady_duration: Duration::from_millis(200),
        upload_cooldown: Duration::from_secs(2),
        ..Default::default()
    })
    .unwrap();

    let mut pipeline = CapturePipeline::new(FixedPalmModel::default(), tracker, dispatcher)
        .with_purpose(UploadPurpose::Scan {
            merchant: "Tealive".into(),
            amount: 8.5,
        });

    let frame = Frame::filled(320, 240, 3, 200);
    let outcomes: Vec<FrameOutcome> = (0..40)
        .map(|i| pipeline.process_frame_at(&frame, Duration::from_millis(i * 100)))
        .collect();

    let uploads: Vec<usize> = outcomes
        .iter()
        .enumerate()
        .filter(|(_, o)| matches!(o, FrameOutcome::Dispatched { .. }))
        .map(|(i, _)| i)
        .collect();

    // Steady at 200ms, then every time 2s has strictly passed
    assert_eq!(uploads, vec![2, 23]);

    // Dropping the pipeline drains the queue and joins the worker
    drop(pipeline);

    let seen = recorder.seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].purpose.path(), "/scanPalm");
    assert_eq!(seen[0].image.filename, "palm.jpg");
    assert_eq!(&seen[0].image.bytes[..2], &[0xFF, 0xD8]);
}

#[test]
fn test_dispatched_crop_matches_reference_box() {
    let tracker = SteadinessTracker::new(TrackerConfig::default()).unwrap();
    let dispatcher = UploadDispatcher::spawn(Recorder::default(), 1).unwrap();
    let mut pipeline = CapturePipeline::new(FixedPalmModel::default(), tracker, dispatcher);

    let frame = Frame::filled(320, 240, 3, 0);
    pipeline.process_frame_at(&frame, Duration::ZERO);
    match pipeline.process_frame_at(&frame, Duration::from_millis(50)) {
        FrameOutcome::Dispatched { bbox } => {
            assert_eq!(bbox.to_tlbr(), [120.0, 90.0, 200.0, 150.0]);
        }
        other => panic!("expected a dispatch, got {other:?}"),
    }
}

/// Whether `raw` holds a full request: headers plus the announced body.
fn request_complete(raw: &[u8]) -> bool {
    let text = String::from_utf8_lossy(raw);
    let Some(split) = text.find("\r\n\r\n") else {
        return false;
    };
    let head = text[..split].to_ascii_lowercase();
    match head.lines().find_map(|l| l.strip_prefix("content-length:")) {
        Some(len) => raw.len() >= split + 4 + len.trim().parse::<usize>().unwrap(),
        None => raw.ends_with(b"0\r\n\r\n"),
    }
}

#[test]
fn test_pipeline_from_config_posts_to_server() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let endpoint = format!("http://{}", listener.local_addr().unwrap());
    let server = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut raw = Vec::new();
        let mut buf = [0u8; 4096];
        while !request_complete(&raw) {
            let n = stream.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            raw.extend_from_slice(&buf[..n]);
        }
        let body = r#"{"status":"success"}"#;
        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(response.as_bytes()).unwrap();
        String::from_utf8_lossy(&raw).into_owned()
    });

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("palm-gate.json");
    let json = format!(
        r#"{{
            "tracker": {{ "steady_duration": 0.2, "upload_cooldown": 10.0 }},
            "detector": {{ "input_size": 192 }},
            "upload": {{ "endpoint": "{endpoint}", "timeout": 2.0, "jpeg_quality": 70 }}
        }}"#
    );
    std::fs::write(&path, json).unwrap();
    let config = AppConfig::load(&path).unwrap();

    let detector = FixedPalmModel {
        config: config.detector.clone(),
    };
    let mut pipeline = CapturePipeline::from_config(detector, &config)
        .unwrap()
        .with_purpose(UploadPurpose::Scan {
            merchant: "Tealive".into(),
            amount: 8.5,
        });
    assert_eq!(pipeline.jpeg_quality(), 70);

    let frame = Frame::filled(320, 240, 3, 200);
    let outcomes: Vec<FrameOutcome> = (0..4)
        .map(|i| pipeline.process_frame_at(&frame, Duration::from_millis(i * 100)))
        .collect();
    assert!(matches!(outcomes[2], FrameOutcome::Dispatched { .. }));
    assert_eq!(outcomes[3], FrameOutcome::NoAction);

    // Dropping the pipeline waits for the queued upload to finish
    drop(pipeline);

    let raw = server.join().unwrap();
    assert!(raw.starts_with("POST /scanPalm HTTP/1.1\r\n"));
    assert!(raw.contains("name=\"merchant\"\r\n\r\nTealive\r\n"));
    assert!(raw.contains("name=\"amount\"\r\n\r\n8.5\r\n"));
    assert!(raw.contains("name=\"image\"; filename=\"palm.jpg\""));
}

