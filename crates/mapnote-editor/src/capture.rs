//! Preview capture.
//!
//! Waits for the engine to settle, pauses for the settle delay, reads the
//! surface back and validates it. Any failure falls back to the placeholder,
//! so a preview is always produced while an annotation exists.

use mapnote_core::{EngineError, MapAnnotation, PreviewImage, PreviewSource};
use mapnote_settings::CaptureSettings;
use std::time::Duration;

use crate::engine::{Frame, MapEngine};
use crate::placeholder::render_placeholder;

/// Result of a capture attempt.
#[derive(Debug, Clone)]
pub struct CaptureOutcome {
    pub image: PreviewImage,
    /// Why read-back was abandoned, when the placeholder was used.
    pub fallback_reason: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PreviewCapture {
    settle_delay: Duration,
    placeholder_width: u32,
    placeholder_height: u32,
}

impl PreviewCapture {
    pub fn new(settle_delay: Duration, placeholder_width: u32, placeholder_height: u32) -> Self {
        Self {
            settle_delay,
            placeholder_width,
            placeholder_height,
        }
    }

    pub fn from_settings(settings: &CaptureSettings) -> Self {
        Self::new(
            settings.settle_delay(),
            settings.placeholder_width,
            settings.placeholder_height,
        )
    }

    /// Captures the current view, or returns `None` when there is nothing
    /// to depict.
    pub async fn capture<E: MapEngine + ?Sized>(
        &self,
        engine: &mut E,
        annotation: Option<&MapAnnotation>,
    ) -> Option<CaptureOutcome> {
        let annotation = annotation?;

        if !engine.is_idle() {
            engine.wait_for_idle().await;
        }
        tokio::time::sleep(self.settle_delay).await;

        let result = engine.read_pixels().and_then(validate_frame);
        Some(match result {
            Ok(frame) => CaptureOutcome {
                image: PreviewImage {
                    width: frame.width,
                    height: frame.height,
                    rgba: frame.rgba,
                    source: PreviewSource::Captured,
                },
                fallback_reason: None,
            },
            Err(e) => {
                tracing::warn!("Preview capture failed, using placeholder: {}", e);
                CaptureOutcome {
                    image: self.render_fallback(annotation),
                    fallback_reason: Some(e.to_string()),
                }
            }
        })
    }

    /// The placeholder image for `annotation`.
    pub fn render_fallback(&self, annotation: &MapAnnotation) -> PreviewImage {
        render_placeholder(annotation, self.placeholder_width, self.placeholder_height)
    }
}

impl Default for PreviewCapture {
    fn default() -> Self {
        Self::from_settings(&CaptureSettings::default())
    }
}

fn validate_frame(frame: Frame) -> Result<Frame, EngineError> {
    let invalid = |reason: &str| EngineError::InvalidFrame {
        reason: reason.to_string(),
    };
    if frame.width == 0 || frame.height == 0 {
        return Err(invalid("zero dimensions"));
    }
    let expected = frame.width as usize * frame.height as usize * 4;
    if frame.rgba.len() != expected {
        return Err(EngineError::InvalidFrame {
            reason: format!("expected {} bytes, got {}", expected, frame.rgba.len()),
        });
    }
    // A surface read without a preserved buffer comes back fully transparent
    if frame.rgba.iter().all(|&b| b == 0) {
        return Err(invalid("empty pixel data"));
    }
    Ok(frame)
}
