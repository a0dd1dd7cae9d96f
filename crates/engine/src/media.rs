// crates/engine/src/media.rs
//! ffmpeg probes and minimal clip generation.

use crate::error::{EngineError, Result};
use crate::tools;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One-second sine tone decoded to the null muxer.
pub const SMOKE_ARGS: &[&str] = &[
    "-f",
    "lavfi",
    "-i",
    "sine=frequency=1000:duration=1",
    "-f",
    "null",
    "-",
];

const CLIP_FILE_NAME: &str = "test_video.mp4";
const TEMP_PREFIX: &str = "ytdiag_test_";

#[derive(Debug, Clone, Serialize)]
pub struct FfmpegProbe {
    pub path: PathBuf,
    pub version: Option<String>,
    /// `None` when the smoke run was not requested.
    pub smoke: Option<tools::CommandOutcome>,
}

/// Locate ffmpeg, read its version, and optionally run the sine smoke test.
///
/// # Errors
/// Returns an error when ffmpeg is not found, cannot be started, or
/// `-version` exits non-zero.
pub fn probe_ffmpeg(program: &str, smoke: bool) -> Result<FfmpegProbe> {
    let path = tools::require_executable(program)?;
    let version = tools::run_capture(&path, ["-version"])?;
    if !version.success {
        return Err(EngineError::Ffmpeg {
            code: version.code,
            stderr: version.stderr.trim().to_string(),
        });
    }

    let smoke = if smoke {
        tracing::info!("running ffmpeg sine smoke test");
        Some(tools::run_capture(&path, SMOKE_ARGS)?)
    } else {
        None
    };

    Ok(FfmpegProbe {
        version: version.first_line().map(str::to_string),
        path,
        smoke,
    })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClipSpec {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub duration_secs: u32,
    pub color: String,
    pub codec: String,
}

impl Default for ClipSpec {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            fps: 24,
            duration_secs: 3,
            color: "blue".to_string(),
            codec: "libx264".to_string(),
        }
    }
}

impl ClipSpec {
    /// Full ffmpeg argument list writing the clip to `output`.
    #[must_use]
    pub fn ffmpeg_args(&self, output: &Path) -> Vec<String> {
        vec![
            "-y".to_string(),
            "-f".to_string(),
            "lavfi".to_string(),
            "-i".to_string(),
            format!(
                "color=c={}:s={}x{}:d={}",
                self.color, self.width, self.height, self.duration_secs
            ),
            "-vf".to_string(),
            format!("fps={}", self.fps),
            "-c:v".to_string(),
            self.codec.clone(),
            "-pix_fmt".to_string(),
            "yuv420p".to_string(),
            output.to_string_lossy().into_owned(),
        ]
    }

    fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 || self.fps == 0 || self.duration_secs == 0 {
            return Err(EngineError::Config(
                "clip width, height, fps and duration must be positive".into(),
            ));
        }
        // libx264 with yuv420p rejects odd dimensions.
        if self.width % 2 != 0 || self.height % 2 != 0 {
            return Err(EngineError::Config(format!(
                "clip size must be even, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

/// Where the clip is written.
#[derive(Debug, Clone)]
pub enum ClipOutput {
    /// Fresh temporary directory; removed after the run unless `keep`.
    Temp { keep: bool },
    /// Existing (or creatable) directory chosen by the operator.
    Dir(PathBuf),
}

#[derive(Debug, Clone, Serialize)]
pub struct ClipReport {
    pub path: PathBuf,
    pub bytes: u64,
    pub command: Vec<String>,
    /// Whether the file still exists after the call returned.
    pub retained: bool,
}

/// Render a clip with ffmpeg and verify the output is non-empty.
///
/// # Errors
/// Returns an error for an invalid spec, a missing ffmpeg, a failed ffmpeg
/// run, or an empty/missing output file.
pub fn generate_clip(ffmpeg: &str, spec: &ClipSpec, output: &ClipOutput) -> Result<ClipReport> {
    spec.validate()?;
    let ffmpeg = tools::require_executable(ffmpeg)?;

    let (dir, temp) = match output {
        ClipOutput::Dir(dir) => {
            std::fs::create_dir_all(dir).map_err(|source| EngineError::FileWrite {
                path: dir.clone(),
                source,
            })?;
            (dir.clone(), None)
        }
        ClipOutput::Temp { .. } => {
            let temp = tempfile::Builder::new().prefix(TEMP_PREFIX).tempdir()?;
            (temp.path().to_path_buf(), Some(temp))
        }
    };
    tracing::info!(dir = %dir.display(), "generating test clip");

    let path = dir.join(CLIP_FILE_NAME);
    let args = spec.ffmpeg_args(&path);
    let outcome = tools::run_capture(&ffmpeg, &args)?;
    if !outcome.success {
        return Err(EngineError::Ffmpeg {
            code: outcome.code,
            stderr: outcome.stderr.trim().to_string(),
        });
    }

    let bytes = std::fs::metadata(&path)
        .map(|m| m.len())
        .map_err(|_| EngineError::FileMissing(path.clone()))?;
    if bytes == 0 {
        return Err(EngineError::FileMissing(path));
    }

    let retained = match (temp, output) {
        (Some(temp), ClipOutput::Temp { keep: true }) => {
            let _ = temp.keep();
            true
        }
        (Some(_), _) => false,
        (None, _) => true,
    };

    let mut command = vec![ffmpeg.to_string_lossy().into_owned()];
    command.extend(args);
    Ok(ClipReport {
        path,
        bytes,
        command,
        retained,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_clip_arguments() {
        let args = ClipSpec::default().ffmpeg_args(Path::new("/tmp/out.mp4"));
        assert_eq!(
            args,
            [
                "-y",
                "-f",
                "lavfi",
                "-i",
                "color=c=blue:s=640x480:d=3",
                "-vf",
                "fps=24",
                "-c:v",
                "libx264",
                "-pix_fmt",
                "yuv420p",
                "/tmp/out.mp4",
            ]
        );
    }

    #[test]
    fn odd_dimensions_are_rejected() {
        let spec = ClipSpec {
            width: 641,
            ..ClipSpec::default()
        };
        let err = spec.validate().unwrap_err();
        assert!(err.to_string().contains("even"));
    }

    #[test]
    fn zero_duration_is_rejected() {
        let spec = ClipSpec {
            duration_secs: 0,
            ..ClipSpec::default()
        };
        assert!(spec.validate().is_err());
    }

    #[test]
    fn missing_ffmpeg_is_reported_before_any_work() {
        let err = generate_clip(
            "ytdiag-missing-ffmpeg",
            &ClipSpec::default(),
            &ClipOutput::Temp { keep: false },
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::ExecutableNotFound(_)));

        let err = probe_ffmpeg("ytdiag-missing-ffmpeg", true).unwrap_err();
        assert!(matches!(err, EngineError::ExecutableNotFound(_)));
    }

    #[cfg(unix)]
    #[test]
    fn failing_encoder_surfaces_stderr() {
        use std::os::unix::fs::PermissionsExt;
        let tmp = tempfile::TempDir::new().unwrap();
        let fake = tmp.path().join("fake-ffmpeg");
        std::fs::write(&fake, "#!/bin/sh\necho 'Unknown encoder' >&2\nexit 1\n").unwrap();
        std::fs::set_permissions(&fake, std::fs::Permissions::from_mode(0o755)).unwrap();

        let err = generate_clip(
            &fake.to_string_lossy(),
            &ClipSpec::default(),
            &ClipOutput::Dir(tmp.path().join("out")),
        )
        .unwrap_err();
        match err {
            EngineError::Ffmpeg { code, stderr } => {
                assert_eq!(code, Some(1));
                assert_eq!(stderr, "Unknown encoder");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn fake_encoder_output_is_verified() {
        use std::os::unix::fs::PermissionsExt;
        let tmp = tempfile::TempDir::new().unwrap();
        let fake = tmp.path().join("fake-ffmpeg");
        // Writes a few bytes to the last argument, like a real encoder would.
        std::fs::write(
            &fake,
            "#!/bin/sh\nfor last; do :; done\nprintf 'mp4' > \"$last\"\n",
        )
        .unwrap();
        std::fs::set_permissions(&fake, std::fs::Permissions::from_mode(0o755)).unwrap();

        let out_dir = tmp.path().join("out");
        let report = generate_clip(
            &fake.to_string_lossy(),
            &ClipSpec::default(),
            &ClipOutput::Dir(out_dir.clone()),
        )
        .unwrap();
        assert_eq!(report.path, out_dir.join(CLIP_FILE_NAME));
        assert_eq!(report.bytes, 3);
        assert!(report.retained);
    }
}
