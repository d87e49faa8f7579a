// Replay container with a compressed frame log.

use std::io::{Read, Write};
use std::path::Path;

use anyhow::Result;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use osu_model::{Mods, Vec2};
use osu_rule::Buttons;
use serde::{Deserialize, Serialize};

use crate::frame::ReplayFrame;

/// Bytes per encoded frame record: time i64 + x f32 + y f32 + buttons u8.
const RECORD_SIZE: usize = 17;

/// Complete replay data for one cursor's play session.
///
/// Frames live either decoded in `frames` or compressed in `frame_data`
/// (Base64 URL-safe encoded GZIP), never meaningfully in both: `shrink`
/// moves them into the compressed form, `validate` back out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayData {
    /// Player name.
    #[serde(default)]
    pub player: String,
    /// Chart hash the replay was recorded against.
    #[serde(default)]
    pub chart_hash: String,
    /// Modifier set used.
    #[serde(default)]
    pub mods: Mods,
    /// Decoded input frames (populated after `validate()`).
    #[serde(default)]
    pub frames: Vec<ReplayFrame>,
    /// Compressed frame data. Populated after `shrink()`, cleared after
    /// `validate()`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_data: Option<String>,
    /// Play date (unix timestamp).
    #[serde(default)]
    pub date: i64,
}

impl Default for ReplayData {
    fn default() -> Self {
        Self {
            player: String::new(),
            chart_hash: String::new(),
            mods: Mods::NONE,
            frames: Vec::new(),
            frame_data: None,
            date: 0,
        }
    }
}

impl ReplayData {
    /// Compress `frames` into `frame_data` and clear the decoded list.
    pub fn shrink(&mut self) {
        if self.frames.is_empty() {
            return;
        }

        let mut raw = Vec::with_capacity(self.frames.len() * RECORD_SIZE);
        for frame in &self.frames {
            raw.extend_from_slice(&frame.time.to_le_bytes());
            raw.extend_from_slice(&frame.x.to_le_bytes());
            raw.extend_from_slice(&frame.y.to_le_bytes());
            raw.push(frame.buttons.0);
        }

        let mut gzip_buf = Vec::new();
        let mut encoder = GzEncoder::new(&mut gzip_buf, Compression::default());
        encoder.write_all(&raw).unwrap();
        encoder.finish().unwrap();

        self.frame_data = Some(URL_SAFE.encode(&gzip_buf));
        self.frames.clear();
    }

    /// Decompress `frame_data` back into `frames`, dropping invalid
    /// records. Returns `true` if frames are non-empty afterwards.
    pub fn validate(&mut self) -> bool {
        if let Some(ref input) = self.frame_data {
            if let Ok(gzip_data) = URL_SAFE.decode(input) {
                let mut decoder = GzDecoder::new(&gzip_data[..]);
                let mut raw = Vec::new();
                if decoder.read_to_end(&mut raw).is_ok() {
                    let mut frames = Vec::with_capacity(raw.len() / RECORD_SIZE);
                    let mut pos = 0;
                    while pos + RECORD_SIZE <= raw.len() {
                        let time = i64::from_le_bytes(raw[pos..pos + 8].try_into().unwrap());
                        let x = f32::from_le_bytes(raw[pos + 8..pos + 12].try_into().unwrap());
                        let y = f32::from_le_bytes(raw[pos + 12..pos + 16].try_into().unwrap());
                        let buttons = Buttons(raw[pos + 16] & Buttons::BOTH.0);
                        frames.push(ReplayFrame::new(time, Vec2::new(x, y), buttons));
                        pos += RECORD_SIZE;
                    }
                    self.frames = frames;
                }
            }
            self.frame_data = None;
        }

        self.frames.retain(|f| f.validate());
        !self.frames.is_empty()
    }
}

/// Read an .orp replay file (GZIP-compressed JSON).
pub fn read_orp(path: &Path) -> Result<ReplayData> {
    let file = std::fs::File::open(path)?;
    let decoder = GzDecoder::new(file);
    let mut replay: ReplayData = serde_json::from_reader(decoder)?;
    replay.validate();
    Ok(replay)
}

/// Write an .orp replay file (GZIP-compressed JSON).
pub fn write_orp(replay: &mut ReplayData, path: &Path) -> Result<()> {
    replay.shrink();
    let file = std::fs::File::create(path)?;
    let encoder = GzEncoder::new(file, Compression::default());
    serde_json::to_writer(encoder, replay)?;
    Ok(())
}
