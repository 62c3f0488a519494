use std::{
    path::{Path, PathBuf},
    process::{Child, ChildStdin, Command, Stdio},
};

use crate::error::{SimreelError, SimreelResult};

#[derive(Clone, Debug)]
pub struct EncodeConfig {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub out_path: PathBuf,
    pub overwrite: bool,
}

impl EncodeConfig {
    pub fn validate(&self) -> SimreelResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(SimreelError::encoding(
                "encode width/height must be non-zero",
            ));
        }
        if self.fps == 0 {
            return Err(SimreelError::encoding("encode fps must be non-zero"));
        }
        if !self.width.is_multiple_of(2) || !self.height.is_multiple_of(2) {
            // We target yuv420p output for maximum player compatibility.
            return Err(SimreelError::encoding(
                "encode width/height must be even (required for yuv420p mp4 output)",
            ));
        }
        Ok(())
    }
}

pub fn default_mp4_config(
    out_path: impl Into<PathBuf>,
    width: u32,
    height: u32,
    fps: u32,
) -> EncodeConfig {
    EncodeConfig {
        width,
        height,
        fps,
        out_path: out_path.into(),
        overwrite: true,
    }
}

pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// One open encoder session: a spawned `ffmpeg` fed raw RGB24 frames over
/// stdin. Must be finalized exactly once with [`FfmpegEncoder::finish`] so the
/// container index is flushed and the output file is valid on disk.
pub struct FfmpegEncoder {
    cfg: EncodeConfig,
    child: Child,
    stdin: Option<ChildStdin>,
}

impl FfmpegEncoder {
    pub fn new(cfg: EncodeConfig) -> SimreelResult<Self> {
        cfg.validate()?;

        if !cfg.overwrite && cfg.out_path.exists() {
            return Err(SimreelError::encoding(format!(
                "output file '{}' already exists",
                cfg.out_path.display()
            )));
        }

        if !is_ffmpeg_on_path() {
            return Err(SimreelError::encoding(
                "ffmpeg is required for MP4 encoding, but was not found on PATH",
            ));
        }

        // System `ffmpeg` binary rather than linked FFmpeg libraries, to avoid
        // native dev header/lib requirements.
        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        if cfg.overwrite {
            cmd.arg("-y");
        } else {
            cmd.arg("-n");
        }

        cmd.args([
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgb24",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
            "-r",
            &cfg.fps.to_string(),
            "-i",
            "pipe:0",
            "-an",
            "-c:v",
            "libx264",
            "-pix_fmt",
            "yuv420p",
            "-movflags",
            "+faststart",
        ])
        .arg(&cfg.out_path);

        let mut child = cmd.spawn().map_err(|e| {
            SimreelError::encoding(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| SimreelError::encoding("failed to open ffmpeg stdin (unexpected)"))?;

        Ok(Self {
            cfg,
            child,
            stdin: Some(stdin),
        })
    }

    /// Append one RGB24 frame. The buffer must match the session dimensions.
    pub fn write_frame(&mut self, rgb: &[u8]) -> SimreelResult<()> {
        if rgb.len() != (self.cfg.width * self.cfg.height * 3) as usize {
            return Err(SimreelError::encoding(format!(
                "frame buffer size mismatch: got {} bytes, expected {}x{}x3",
                rgb.len(),
                self.cfg.width,
                self.cfg.height
            )));
        }

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(SimreelError::encoding("ffmpeg encoder is already finalized"));
        };

        use std::io::Write as _;
        stdin
            .write_all(rgb)
            .map_err(|e| SimreelError::encoding(format!("failed to write frame to ffmpeg stdin: {e}")))?;

        Ok(())
    }

    pub fn finish(mut self) -> SimreelResult<()> {
        drop(self.stdin.take());

        let output = self
            .child
            .wait_with_output()
            .map_err(|e| SimreelError::encoding(format!("failed to wait for ffmpeg to finish: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SimreelError::encoding(format!(
                "ffmpeg exited with status {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(())
    }
}

/// Assemble ordered frame files into one MP4 at `out_path`.
///
/// The first frame fixes the video dimensions and must decode; every later
/// frame that fails to decode (or disagrees on dimensions) is logged and
/// skipped. Frames are flipped vertically before encoding (the simulation
/// writes rows bottom-up, the encoder expects top-down). The encoder session is
/// finalized on every exit path once opened. Returns the number of frames
/// encoded.
pub fn assemble(frames: &[PathBuf], out_path: &Path, fps: u32) -> SimreelResult<usize> {
    let Some(first_path) = frames.first() else {
        return Err(SimreelError::encoding("no frames to assemble"));
    };

    let first = decode_rgb(first_path).map_err(|source| SimreelError::FirstFrameUnreadable {
        path: first_path.clone(),
        source,
    })?;
    let (width, height) = first.dimensions();
    tracing::info!(
        out = %out_path.display(),
        frames = frames.len(),
        width,
        height,
        fps,
        "assembling video"
    );

    let mut encoder = FfmpegEncoder::new(default_mp4_config(out_path, width, height, fps))?;
    let outcome = write_all_frames(&mut encoder, frames, Some(first));
    // Finalize exactly once, also when a frame write failed mid-loop.
    let finish = encoder.finish();
    let encoded = outcome?;
    finish?;

    tracing::info!(out = %out_path.display(), encoded, "video written");
    Ok(encoded)
}

fn write_all_frames(
    encoder: &mut FfmpegEncoder,
    frames: &[PathBuf],
    mut first: Option<image::RgbImage>,
) -> SimreelResult<usize> {
    let (width, height) = (encoder.cfg.width, encoder.cfg.height);
    let mut encoded = 0usize;

    for path in frames {
        let img = match first.take() {
            Some(img) => img,
            None => match decode_rgb(path) {
                Ok(img) => img,
                Err(e) => {
                    tracing::warn!(frame = %path.display(), error = %e, "cannot decode frame, skipping");
                    continue;
                }
            },
        };

        if img.dimensions() != (width, height) {
            tracing::warn!(
                frame = %path.display(),
                got = ?img.dimensions(),
                expected = ?(width, height),
                "frame dimensions differ from first frame, skipping"
            );
            continue;
        }

        let mut rgb = img.into_raw();
        flip_rows_in_place(&mut rgb, width, height);
        encoder.write_frame(&rgb)?;
        encoded += 1;
    }

    Ok(encoded)
}

fn decode_rgb(path: &Path) -> image::ImageResult<image::RgbImage> {
    Ok(image::open(path)?.to_rgb8())
}

/// Swap pixel row `y` with row `height-1-y` in an RGB24 buffer.
fn flip_rows_in_place(rgb: &mut [u8], width: u32, height: u32) {
    let stride = width as usize * 3;
    let height = height as usize;
    for y in 0..height / 2 {
        let (top, rest) = rgb.split_at_mut((height - 1 - y) * stride);
        top[y * stride..y * stride + stride].swap_with_slice(&mut rest[..stride]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_validation_catches_bad_values() {
        let base = default_mp4_config("target/out.mp4", 10, 10, 30);

        assert!(EncodeConfig { width: 0, ..base.clone() }.validate().is_err());
        assert!(EncodeConfig { width: 11, ..base.clone() }.validate().is_err());
        assert!(EncodeConfig { height: 7, ..base.clone() }.validate().is_err());
        assert!(EncodeConfig { fps: 0, ..base.clone() }.validate().is_err());
        assert!(base.validate().is_ok());
    }

    #[test]
    fn flip_reverses_rows_of_4x4() {
        // Every pixel of row y carries the byte value y.
        let mut rgb: Vec<u8> = (0..4u8)
            .flat_map(|y| std::iter::repeat_n(y, 4 * 3))
            .collect();
        flip_rows_in_place(&mut rgb, 4, 4);

        for y in 0..4usize {
            let row = &rgb[y * 12..(y + 1) * 12];
            assert!(row.iter().all(|&b| b == (3 - y) as u8), "row {y}");
        }
    }

    #[test]
    fn flip_keeps_middle_row_of_odd_height() {
        let mut rgb: Vec<u8> = (0..3u8).flat_map(|y| std::iter::repeat_n(y, 2 * 3)).collect();
        flip_rows_in_place(&mut rgb, 2, 3);
        assert_eq!(&rgb[0..6], &[2; 6]);
        assert_eq!(&rgb[6..12], &[1; 6]);
        assert_eq!(&rgb[12..18], &[0; 6]);
    }

    #[test]
    fn decode_rgb_reads_ppm() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame_00000.ppm");
        // Minimal binary PPM: 2x2, max 255, then 12 raw RGB bytes.
        let mut ppm = b"P6\n2 2\n255\n".to_vec();
        ppm.extend_from_slice(&[255, 0, 0, 0, 255, 0, 0, 0, 255, 9, 9, 9]);
        std::fs::write(&path, ppm).unwrap();

        let img = decode_rgb(&path).unwrap();
        assert_eq!(img.dimensions(), (2, 2));
        assert_eq!(img.get_pixel(0, 0).0, [255, 0, 0]);
        assert_eq!(img.get_pixel(1, 1).0, [9, 9, 9]);
    }

    #[test]
    fn unreadable_first_frame_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame_00000.ppm");
        std::fs::write(&path, b"not a ppm").unwrap();

        let err = assemble(&[path], &dir.path().join("out.mp4"), 24).unwrap_err();
        assert!(matches!(err, SimreelError::FirstFrameUnreadable { .. }));
        assert!(!dir.path().join("out.mp4").exists());
    }
}
