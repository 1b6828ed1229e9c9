//! Thank-you video capture
//!
//! After donating, the donor may record a short video message. Camera and
//! microphone live in the platform layer; this module only defines the
//! capability the platform supplies ([`CaptureDevice`]) and the small session
//! state around it.

use async_trait::async_trait;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Longest message a donor can record
pub const MAX_RECORDING: Duration = Duration::from_secs(60);

/// A finished recording
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recording {
    pub path: PathBuf,
    pub duration_ms: u64,
    pub size_bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    #[error("To record your donation message, camera and microphone access are needed")]
    PermissionDenied,

    #[error("Camera not available")]
    Unavailable,

    #[error("Recording was cancelled")]
    Cancelled,

    #[error("Failed to record video: {0}")]
    Failed(String),

    #[error("Please record a message first.")]
    NothingRecorded,
}

/// Camera capability provided by the platform
#[async_trait]
pub trait CaptureDevice: Send + Sync {
    /// Ask for camera and microphone access; true when both are granted
    async fn request_permissions(&self) -> bool;

    /// Record until the donor stops, `limit` elapses, or capture is cancelled
    async fn start_capture(&self, limit: Duration) -> Result<Recording, CaptureError>;
}

/// Record / retake / continue state for the video message step
pub struct RecordingSession<D> {
    device: D,
    limit: Duration,
    recording: Option<Recording>,
}

impl<D: CaptureDevice> RecordingSession<D> {
    pub fn new(device: D) -> Self {
        Self {
            device,
            limit: MAX_RECORDING,
            recording: None,
        }
    }

    pub fn recording(&self) -> Option<&Recording> {
        self.recording.as_ref()
    }

    /// Record a message; a failed attempt keeps the previous one
    pub async fn record(&mut self) -> Result<&Recording, CaptureError> {
        if !self.device.request_permissions().await {
            return Err(CaptureError::PermissionDenied);
        }

        let recording = self.device.start_capture(self.limit).await.map_err(|e| {
            tracing::warn!(error = %e, "Video capture did not complete");
            e
        })?;
        let recording = Recording {
            duration_ms: recording.duration_ms.min(self.limit.as_millis() as u64),
            ..recording
        };

        tracing::info!(path = %recording.path.display(), "Video recorded");
        Ok(self.recording.insert(recording))
    }

    /// Throw away the current recording
    pub fn retake(&mut self) -> Option<Recording> {
        self.recording.take()
    }

    /// Finish the step with the recorded message
    pub fn continue_with(self) -> Result<Recording, CaptureError> {
        self.recording.ok_or(CaptureError::NothingRecorded)
    }
}

/// Elapsed recording time as `m:ss`
pub fn format_elapsed(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct FakeCamera {
        granted: bool,
        results: Mutex<Vec<Result<Recording, CaptureError>>>,
    }

    impl FakeCamera {
        fn new(granted: bool, results: Vec<Result<Recording, CaptureError>>) -> Self {
            Self {
                granted,
                results: Mutex::new(results),
            }
        }
    }

    #[async_trait]
    impl CaptureDevice for FakeCamera {
        async fn request_permissions(&self) -> bool {
            self.granted
        }

        async fn start_capture(&self, _limit: Duration) -> Result<Recording, CaptureError> {
            self.results.lock().unwrap().remove(0)
        }
    }

    fn clip(name: &str, duration_ms: u64) -> Recording {
        Recording {
            path: PathBuf::from(name),
            duration_ms,
            size_bytes: 1024,
        }
    }

    #[tokio::test]
    async fn test_record_then_continue() {
        let mut session = RecordingSession::new(FakeCamera::new(true, vec![Ok(clip("a.mp4", 12_000))]));

        let recorded = session.record().await.unwrap();
        assert_eq!(recorded.path, PathBuf::from("a.mp4"));

        let recording = session.continue_with().unwrap();
        assert_eq!(recording.duration_ms, 12_000);
    }

    #[tokio::test]
    async fn test_permission_denied() {
        let mut session = RecordingSession::new(FakeCamera::new(false, vec![]));
        assert_eq!(session.record().await.unwrap_err(), CaptureError::PermissionDenied);
    }

    #[tokio::test]
    async fn test_cancelled_capture_keeps_previous_recording() {
        let mut session = RecordingSession::new(FakeCamera::new(
            true,
            vec![Ok(clip("first.mp4", 5_000)), Err(CaptureError::Cancelled)],
        ));

        session.record().await.unwrap();
        assert_eq!(session.record().await.unwrap_err(), CaptureError::Cancelled);
        assert_eq!(session.recording().unwrap().path, PathBuf::from("first.mp4"));
    }

    #[tokio::test]
    async fn test_duration_capped_at_limit() {
        let mut session = RecordingSession::new(FakeCamera::new(true, vec![Ok(clip("long.mp4", 75_000))]));
        assert_eq!(session.record().await.unwrap().duration_ms, 60_000);
    }

    #[tokio::test]
    async fn test_retake_then_continue_requires_recording() {
        let mut session = RecordingSession::new(FakeCamera::new(true, vec![Ok(clip("a.mp4", 1_000))]));
        session.record().await.unwrap();

        assert!(session.retake().is_some());
        assert_eq!(
            session.continue_with().unwrap_err().to_string(),
            "Please record a message first."
        );
    }

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(0), "0:00");
        assert_eq!(format_elapsed(9), "0:09");
        assert_eq!(format_elapsed(60), "1:00");
        assert_eq!(format_elapsed(75), "1:15");
    }
}
