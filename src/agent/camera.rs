// MOODTUNE Camera Capture
// Copyright (c) 2026 Xing_The_Creator | MOODTUNE
//
// Webcam frames via an ffmpeg child process piping raw RGB24. A reader
// thread overwrites a single latest-frame slot; each tick takes whatever
// is newest, older frames are simply replaced.

use std::io::Read;
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use tracing::{info, warn};

/// A single RGB24 frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl Frame {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self { width, height, data }
    }

    pub fn byte_len(width: u32, height: u32) -> usize {
        width as usize * height as usize * 3
    }
}

/// Anything that can hand out the latest camera frame without blocking.
pub trait FrameSource {
    fn read_frame(&mut self) -> Option<Frame>;
}

/// Holds the most recent frame the reader thread produced.
#[derive(Clone, Default)]
struct LatestFrame {
    slot: Arc<Mutex<Option<Vec<u8>>>>,
    ended: Arc<AtomicBool>,
}

impl LatestFrame {
    fn put(&self, bytes: Vec<u8>) {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        *slot = Some(bytes);
    }

    /// Newest unseen frame, if any.
    fn take(&self) -> Option<Vec<u8>> {
        self.slot.lock().unwrap_or_else(|e| e.into_inner()).take()
    }

    fn has_ended(&self) -> bool {
        self.ended.load(Ordering::Acquire)
    }
}

/// Read fixed-size frames from `source` until EOF, keeping only the latest.
fn spawn_frame_reader<R: Read + Send + 'static>(mut source: R, frame_size: usize) -> LatestFrame {
    let latest = LatestFrame::default();
    let writer = latest.clone();
    thread::spawn(move || {
        let mut buffer = vec![0u8; frame_size];
        // EOF or device gone
        while source.read_exact(&mut buffer).is_ok() {
            writer.put(buffer.clone());
        }
        writer.ended.store(true, Ordering::Release);
    });
    latest
}

pub struct FfmpegCamera {
    latest: LatestFrame,
    process: Option<Child>,
    width: u32,
    height: u32,
    disconnected: bool,
}

impl FfmpegCamera {
    /// Open the webcam. `device` is platform specific: `/dev/video0` on
    /// Linux, the avfoundation index on macOS, the dshow name on Windows.
    pub fn open(device: &str, resolution: (u32, u32)) -> std::io::Result<Self> {
        let (width, height) = resolution;
        let args = build_capture_args(std::env::consts::OS, device, width, height);

        info!("[SENSOR] Opening camera {} at {}x{}", device, width, height);
        let mut child = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()?;

        let stdout = child.stdout.take().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::BrokenPipe, "ffmpeg stdout not captured")
        })?;

        let mut camera = Self::from_reader(stdout, resolution);
        camera.process = Some(child);
        Ok(camera)
    }

    /// Camera over any raw RGB24 byte stream.
    fn from_reader<R: Read + Send + 'static>(source: R, resolution: (u32, u32)) -> Self {
        let (width, height) = resolution;
        Self {
            latest: spawn_frame_reader(source, Frame::byte_len(width, height)),
            process: None,
            width,
            height,
            disconnected: false,
        }
    }

    pub fn close(&mut self) {
        if let Some(mut child) = self.process.take() {
            let _ = child.kill();
            let _ = child.wait();
            info!("[SENSOR] Camera released.");
        }
    }
}

impl FrameSource for FfmpegCamera {
    fn read_frame(&mut self) -> Option<Frame> {
        let newest = self.latest.take();
        if newest.is_none() && self.latest.has_ended() && !self.disconnected {
            warn!("[SENSOR] Camera stream ended.");
            self.disconnected = true;
        }
        newest.map(|data| Frame::new(self.width, self.height, data))
    }
}

impl Drop for FfmpegCamera {
    fn drop(&mut self) {
        self.close();
    }
}

/// ffmpeg arguments for grabbing the platform webcam as raw RGB24 on stdout.
pub fn build_capture_args(os: &str, device: &str, width: u32, height: u32) -> Vec<String> {
    let size = format!("{}x{}", width, height);
    let (format, input) = match os {
        "windows" => ("dshow", format!("video={}", device)),
        "macos" => ("avfoundation", device.to_string()),
        _ => ("v4l2", device.to_string()),
    };

    let mut args: Vec<String> = vec![
        "-nostdin".into(),
        "-loglevel".into(),
        "error".into(),
        "-f".into(),
        format.into(),
    ];
    if os == "macos" {
        args.extend(["-framerate".to_string(), "30".to_string()]);
    }
    args.extend([
        "-video_size".to_string(),
        size.clone(),
        "-i".to_string(),
        input,
        "-f".to_string(),
        "image2pipe".to_string(),
        "-pix_fmt".to_string(),
        "rgb24".to_string(),
        "-vcodec".to_string(),
        "rawvideo".to_string(),
        "-s".to_string(),
        size,
        "-".to_string(),
    ]);
    args
}
