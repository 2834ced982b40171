//! FFmpeg command builder and runner.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use crate::error::{MediaError, MediaResult};

/// Where the command writes its result.
#[derive(Debug, Clone)]
enum OutputTarget {
    /// A real output file.
    File(PathBuf),
    /// The null muxer; used for analysis passes that only produce logs.
    Null,
}

/// Builder for FFmpeg commands.
///
/// Arguments are accumulated through typed setters and rendered once by
/// [`FfmpegCommand::build_args`]; call sites never assemble argv strings
/// by hand.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    /// Input file path
    input: PathBuf,
    /// Output target
    output: OutputTarget,
    /// Input arguments (before -i)
    input_args: Vec<String>,
    /// Output arguments (after -i)
    output_args: Vec<String>,
    /// Log level
    log_level: String,
}

impl FfmpegCommand {
    /// Create a command writing to `output`.
    pub fn new(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            output: OutputTarget::File(output.as_ref().to_path_buf()),
            input_args: Vec::new(),
            output_args: Vec::new(),
            log_level: "error".to_string(),
        }
    }

    /// Create an analysis command that discards its output through the
    /// null muxer. The diagnostic log is the product of such a run, so
    /// the log level is raised to `info`.
    pub fn analysis(input: impl AsRef<Path>) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            output: OutputTarget::Null,
            input_args: Vec::new(),
            output_args: Vec::new(),
            log_level: "info".to_string(),
        }
    }

    /// Add an input argument (before -i).
    pub fn input_arg(mut self, arg: impl Into<String>) -> Self {
        self.input_args.push(arg.into());
        self
    }

    /// Add an output argument (after -i).
    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    /// Seek before the input for fast chunk extraction.
    pub fn seek(self, seconds: f64) -> Self {
        self.input_arg("-ss").input_arg(format!("{:.3}", seconds))
    }

    /// Limit the output duration.
    pub fn duration(self, seconds: f64) -> Self {
        self.output_arg("-t").output_arg(format!("{:.3}", seconds))
    }

    /// Read the input through the concat demuxer (the input file is a
    /// manifest listing files to join).
    pub fn concat_demuxer(self) -> Self {
        self.input_arg("-f")
            .input_arg("concat")
            .input_arg("-safe")
            .input_arg("0")
    }

    /// Set filter complex.
    pub fn filter_complex(self, filter: impl Into<String>) -> Self {
        self.output_arg("-filter_complex").output_arg(filter)
    }

    /// Set audio filter.
    pub fn audio_filter(self, filter: impl Into<String>) -> Self {
        self.output_arg("-af").output_arg(filter)
    }

    /// Map a labeled filter-graph pad into the output.
    pub fn map_label(self, label: impl AsRef<str>) -> Self {
        self.output_arg("-map")
            .output_arg(format!("[{}]", label.as_ref()))
    }

    /// Set video codec.
    pub fn video_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:v").output_arg(codec)
    }

    /// Set audio codec.
    pub fn audio_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:a").output_arg(codec)
    }

    /// Set encoder preset.
    pub fn preset(self, preset: impl Into<String>) -> Self {
        self.output_arg("-preset").output_arg(preset)
    }

    /// Set audio sample rate.
    pub fn audio_sample_rate(self, hz: u32) -> Self {
        self.output_arg("-ar").output_arg(hz.to_string())
    }

    /// Drop the video streams from the output.
    pub fn no_video(self) -> Self {
        self.output_arg("-vn")
    }

    /// Shift timestamps so the output starts at zero. Required on chunk
    /// boundaries: seeking before a re-encode otherwise leaves non-zero
    /// timestamps that break later concatenation.
    pub fn zero_timestamps(self) -> Self {
        self.output_arg("-avoid_negative_ts").output_arg("make_zero")
    }

    /// Build the command arguments.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        // Overwrite without prompting
        args.push("-y".to_string());
        args.push("-hide_banner".to_string());

        args.push("-v".to_string());
        args.push(self.log_level.clone());

        args.extend(self.input_args.clone());

        args.push("-i".to_string());
        args.push(self.input.to_string_lossy().to_string());

        args.extend(self.output_args.clone());

        match &self.output {
            OutputTarget::File(path) => {
                args.push(path.to_string_lossy().to_string());
            }
            OutputTarget::Null => {
                args.push("-f".to_string());
                args.push("null".to_string());
                args.push("-".to_string());
            }
        }

        args
    }

    /// Run the command to completion, returning the captured stderr.
    ///
    /// The stderr text is returned on success too: analysis passes read
    /// their results out of it, and encode passes may log it.
    pub async fn run(&self) -> MediaResult<String> {
        which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)?;

        let args = self.build_args();
        debug!("Running FFmpeg: ffmpeg {}", args.join(" "));

        let output = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !output.status.success() {
            return Err(MediaError::encode_failed(
                format!(
                    "FFmpeg exited with status {:?} for {}",
                    output.status.code(),
                    self.input.display()
                ),
                Some(stderr_tail(&stderr)),
                output.status.code(),
            ));
        }

        Ok(stderr)
    }
}

/// Last few stderr lines; enough diagnostic for error reporting without
/// dragging the whole encode log into the error value.
pub(crate) fn stderr_tail(stderr: &str) -> String {
    const TAIL_LINES: usize = 10;
    let lines: Vec<&str> = stderr.lines().collect();
    let start = lines.len().saturating_sub(TAIL_LINES);
    lines[start..].join("\n")
}

/// Check if FFmpeg is available.
pub fn check_ffmpeg() -> MediaResult<PathBuf> {
    which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)
}

/// Check if FFprobe is available.
pub fn check_ffprobe() -> MediaResult<PathBuf> {
    which::which("ffprobe").map_err(|_| MediaError::FfprobeNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_builder() {
        let cmd = FfmpegCommand::new("input.mp4", "output.mp4")
            .seek(10.0)
            .duration(30.0)
            .video_codec("libx264")
            .preset("ultrafast");

        let args = cmd.build_args();
        assert!(args.contains(&"-ss".to_string()));
        assert!(args.contains(&"10.000".to_string()));
        assert!(args.contains(&"-c:v".to_string()));
        assert!(args.contains(&"libx264".to_string()));
        assert_eq!(args.last().unwrap(), "output.mp4");

        // -ss lands before -i, -t after it
        let ss = args.iter().position(|a| a == "-ss").unwrap();
        let i = args.iter().position(|a| a == "-i").unwrap();
        let t = args.iter().position(|a| a == "-t").unwrap();
        assert!(ss < i && i < t);
    }

    #[test]
    fn test_analysis_targets_null_muxer() {
        let cmd = FfmpegCommand::analysis("input.mp4").audio_filter("silencedetect=n=-30dB:d=0.5");
        let args = cmd.build_args();

        let len = args.len();
        assert_eq!(&args[len - 3..], &["-f", "null", "-"]);
        assert!(args.contains(&"-af".to_string()));
        // Analysis output arrives through the log, so it must not be silenced
        let v = args.iter().position(|a| a == "-v").unwrap();
        assert_eq!(args[v + 1], "info");
    }

    #[test]
    fn test_map_label_brackets() {
        let cmd = FfmpegCommand::new("in.mp4", "out.mp4").map_label("outv");
        let args = cmd.build_args();
        assert!(args.contains(&"[outv]".to_string()));
    }

    #[test]
    fn test_concat_demuxer_args_before_input() {
        let cmd = FfmpegCommand::new("concat.txt", "out.mp4").concat_demuxer();
        let args = cmd.build_args();
        let f = args.iter().position(|a| a == "-f").unwrap();
        let i = args.iter().position(|a| a == "-i").unwrap();
        assert!(f < i);
        assert_eq!(args[f + 1], "concat");
    }

    #[test]
    fn test_stderr_tail_truncates() {
        let long: String = (0..50).map(|i| format!("line {}\n", i)).collect();
        let tail = stderr_tail(&long);
        assert!(tail.starts_with("line 40"));
        assert!(tail.ends_with("line 49"));
    }
}
