//! Keypoint input.  An external hand detector writes one JSON object per
//! frame; this module turns those lines into [`Frame`]s.
//!
//! ```json
//! {"timestamp_ms": 1234, "hands": [{"handedness": "Right", "score": 0.93,
//!   "landmarks": [[0.51, 0.80, 0.0], ...]}]}
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::gesture::{HandPose, Handedness, Landmark, LANDMARK_COUNT};

/// One frame of detector output.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    /// Detector timestamp, if it supplied one.
    pub timestamp: Option<Duration>,
    /// Hands in detector order; the first is the primary hand.
    pub hands: Vec<HandPose>,
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read frame: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to start reader thread: {0}")]
    Thread(#[source] std::io::Error),
}

/// Result of waiting a bounded time for a frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Polled {
    Frame(Frame),
    /// Nothing arrived within the timeout.
    Idle,
    End,
}

/// Source of per-frame hand keypoints.  May block until a frame arrives.
pub trait KeypointProvider {
    /// Next frame, or `None` at end of input.
    fn next_frame(&mut self) -> Result<Option<Frame>, ProviderError>;

    /// Wait at most `timeout` for the next frame.  Providers that cannot
    /// wait with a bound block as `next_frame` does.
    fn poll_frame(&mut self, _timeout: Duration) -> Result<Polled, ProviderError> {
        Ok(match self.next_frame()? {
            Some(frame) => Polled::Frame(frame),
            None => Polled::End,
        })
    }
}

// ── Wire format ────────────────────────────────────────────

#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum LandmarkJson {
    Point {
        x: f32,
        y: f32,
        #[serde(default)]
        z: f32,
    },
    Array(Vec<f32>),
}

impl LandmarkJson {
    fn to_landmark(&self) -> Option<Landmark> {
        match *self {
            Self::Point { x, y, z } => Some(Landmark::new(x, y, z)),
            Self::Array(ref v) => match v.as_slice() {
                [x, y] => Some(Landmark::new(*x, *y, 0.0)),
                [x, y, z] => Some(Landmark::new(*x, *y, *z)),
                _ => None,
            },
        }
    }
}

#[derive(Deserialize, Debug)]
struct HandJson {
    #[serde(default)]
    handedness: Option<String>,
    #[serde(default)]
    score: Option<f32>,
    landmarks: Vec<LandmarkJson>,
}

#[derive(Deserialize, Debug)]
struct FrameJson {
    #[serde(default)]
    timestamp_ms: Option<f64>,
    #[serde(default)]
    hands: Vec<HandJson>,
    #[serde(default)]
    error: Option<String>,
}

impl HandJson {
    fn into_pose(self) -> Option<HandPose> {
        if self.landmarks.len() != LANDMARK_COUNT {
            debug!("Dropping hand with {} landmarks (expected {})", self.landmarks.len(), LANDMARK_COUNT);
            return None;
        }
        let points: Vec<Landmark> = self.landmarks.iter().map(LandmarkJson::to_landmark).collect::<Option<_>>()?;
        let mut pose = HandPose::from_slice(&points)?;
        if let Some(score) = self.score {
            pose.score = score;
        }
        pose.handedness = self.handedness.as_deref().and_then(Handedness::parse);
        Some(pose)
    }
}

/// Parse one line of detector output.
pub fn parse_frame(line: &str) -> Result<Frame, serde_json::Error> {
    let json: FrameJson = serde_json::from_str(line)?;
    if let Some(error) = json.error {
        warn!("Detector error: {}", error);
        return Ok(Frame {
            timestamp: timestamp(json.timestamp_ms),
            hands: Vec::new(),
        });
    }
    Ok(Frame {
        timestamp: timestamp(json.timestamp_ms),
        hands: json.hands.into_iter().filter_map(HandJson::into_pose).collect(),
    })
}

fn timestamp(ms: Option<f64>) -> Option<Duration> {
    let ms = ms?;
    if ms < 0.0 {
        return None;
    }
    Duration::try_from_secs_f64(ms / 1000.0).ok()
}

// ── Provider ───────────────────────────────────────────────

/// Reads JSON-lines frames from any buffered reader (stdin, a file, a
/// detector subprocess pipe).
pub struct JsonLinesProvider<R> {
    reader: R,
    line: String,
    line_no: u64,
    malformed: u64,
}

impl<R: BufRead> JsonLinesProvider<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: String::new(),
            line_no: 0,
            malformed: 0,
        }
    }

    /// Lines that failed to parse so far.
    pub fn malformed(&self) -> u64 {
        self.malformed
    }
}

impl JsonLinesProvider<BufReader<File>> {
    pub fn open(path: &Path) -> Result<Self, ProviderError> {
        let file = File::open(path).map_err(|source| ProviderError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> KeypointProvider for JsonLinesProvider<R> {
    fn next_frame(&mut self) -> Result<Option<Frame>, ProviderError> {
        loop {
            self.line.clear();
            if self.reader.read_line(&mut self.line)? == 0 {
                return Ok(None);
            }
            self.line_no += 1;

            let trimmed = self.line.trim();
            if trimmed.is_empty() {
                continue;
            }
            return match parse_frame(trimmed) {
                Ok(frame) => Ok(Some(frame)),
                Err(e) => {
                    self.malformed += 1;
                    warn!("Malformed frame on line {}: {}", self.line_no, e);
                    Ok(Some(Frame::default()))
                }
            };
        }
    }
}

// ── Reader thread ──────────────────────────────────────────

/// Runs a blocking provider on its own thread so the consumer can wait
/// with a timeout.  A reader stuck on a silent pipe is left behind when
/// this is dropped; it exits on its next frame or at process exit.
pub struct FrameReader {
    rx: Receiver<Result<Option<Frame>, ProviderError>>,
    done: bool,
}

impl FrameReader {
    /// Frames buffered ahead of the consumer.
    const QUEUE_DEPTH: usize = 64;

    pub fn spawn<P>(mut provider: P) -> Result<Self, ProviderError>
    where
        P: KeypointProvider + Send + 'static,
    {
        let (tx, rx) = mpsc::sync_channel(Self::QUEUE_DEPTH);
        thread::Builder::new()
            .name("keypoint-reader".into())
            .spawn(move || loop {
                let next = provider.next_frame();
                let last = !matches!(next, Ok(Some(_)));
                if tx.send(next).is_err() || last {
                    debug!("Keypoint reader thread exiting");
                    break;
                }
            })
            .map_err(ProviderError::Thread)?;
        Ok(Self { rx, done: false })
    }

    fn finish(&mut self, next: Result<Option<Frame>, ProviderError>) -> Result<Polled, ProviderError> {
        match next {
            Ok(Some(frame)) => Ok(Polled::Frame(frame)),
            Ok(None) => {
                self.done = true;
                Ok(Polled::End)
            }
            Err(e) => {
                self.done = true;
                Err(e)
            }
        }
    }
}

impl KeypointProvider for FrameReader {
    fn next_frame(&mut self) -> Result<Option<Frame>, ProviderError> {
        if self.done {
            return Ok(None);
        }
        let next = self.rx.recv().unwrap_or(Ok(None));
        match self.finish(next)? {
            Polled::Frame(frame) => Ok(Some(frame)),
            _ => Ok(None),
        }
    }

    fn poll_frame(&mut self, timeout: Duration) -> Result<Polled, ProviderError> {
        if self.done {
            return Ok(Polled::End);
        }
        match self.rx.recv_timeout(timeout) {
            Ok(next) => self.finish(next),
            Err(RecvTimeoutError::Timeout) => Ok(Polled::Idle),
            // Reader thread gone without reporting end of input
            Err(RecvTimeoutError::Disconnected) => self.finish(Ok(None)),
        }
    }
}
