use std::ffi::OsString;
use std::io::{self, BufReader, Read};
use std::path::Path;
use std::process::{Child, ChildStdout, Command, Stdio};

use image::{DynamicImage, RgbImage};
use tracing::{debug, warn};

use super::SourceError;
use super::video::VideoDecoder;

const FFPROBE: &str = "ffprobe";
const FFMPEG: &str = "ffmpeg";
const RGB_CHANNELS: usize = 3;

/// Video decoder backed by the system `ffmpeg` binary.
///
/// `ffprobe` reports the first video stream's dimensions, then an `ffmpeg`
/// child streams `rgb24` raw frames over a pipe. The child is killed and
/// reaped when the decoder is dropped.
pub struct FfmpegDecoder {
    child: Child,
    stdout: BufReader<ChildStdout>,
    width: u32,
    height: u32,
    buffer: Vec<u8>,
}

impl FfmpegDecoder {
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let (width, height) = probe_dimensions(path)?;
        let mut child = Command::new(FFMPEG)
            .args(decoder_args(path))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|err| open_error(path, format!("failed to spawn {FFMPEG}: {err}")))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| open_error(path, format!("{FFMPEG} stdout unavailable")))?;

        debug!(path = %path.display(), width, height, "video decoder started");
        let frame_len = width as usize * height as usize * RGB_CHANNELS;
        Ok(Self {
            child,
            stdout: BufReader::new(stdout),
            width,
            height,
            buffer: vec![0u8; frame_len],
        })
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl VideoDecoder for FfmpegDecoder {
    fn next_image(&mut self) -> Result<Option<DynamicImage>, SourceError> {
        if !read_frame(&mut self.stdout, &mut self.buffer)? {
            return Ok(None);
        }
        let image = RgbImage::from_raw(self.width, self.height, self.buffer.clone())
            .ok_or_else(|| SourceError::VideoDecode("raw frame size mismatch".to_string()))?;
        Ok(Some(DynamicImage::ImageRgb8(image)))
    }
}

impl Drop for FfmpegDecoder {
    fn drop(&mut self) {
        if let Err(err) = self.child.kill() {
            if err.kind() != io::ErrorKind::InvalidInput {
                warn!(error = %err, "failed to stop video decoder");
            }
        }
        let _ = self.child.wait();
    }
}

/// `ffmpeg` arguments for a raw `rgb24` pipe. Auto-rotation is disabled so
/// frames keep the coded `ffprobe` dimensions.
fn decoder_args(path: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = ["-v", "error", "-nostdin", "-noautorotate", "-i"]
        .into_iter()
        .map(OsString::from)
        .collect();
    args.push(path.as_os_str().to_owned());
    args.extend(["-f", "rawvideo", "-pix_fmt", "rgb24", "-"].map(OsString::from));
    args
}

fn open_error(path: &Path, message: String) -> SourceError {
    SourceError::VideoOpen {
        path: path.display().to_string(),
        message,
    }
}

fn probe_dimensions(path: &Path) -> Result<(u32, u32), SourceError> {
    let output = Command::new(FFPROBE)
        .args(["-v", "error", "-select_streams", "v:0"])
        .args(["-show_entries", "stream=width,height", "-of", "csv=s=x:p=0"])
        .arg(path)
        .stdin(Stdio::null())
        .output()
        .map_err(|err| open_error(path, format!("failed to run {FFPROBE}: {err}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(open_error(path, stderr.trim().to_string()));
    }
    parse_dimensions(&String::from_utf8_lossy(&output.stdout))
        .ok_or_else(|| open_error(path, "no video stream found".to_string()))
}

/// Parse `ffprobe` csv output such as `1920x1080`.
fn parse_dimensions(text: &str) -> Option<(u32, u32)> {
    let line = text.lines().map(str::trim).find(|line| !line.is_empty())?;
    let mut parts = line.split('x');
    let width = parts.next()?.trim().parse::<u32>().ok()?;
    let height = parts.next()?.trim().parse::<u32>().ok()?;
    if width == 0 || height == 0 {
        return None;
    }
    Some((width, height))
}

/// Fill `buffer` with one frame. Returns `false` at end of stream; a
/// truncated trailing frame is dropped.
fn read_frame<R: Read>(reader: &mut R, buffer: &mut [u8]) -> io::Result<bool> {
    let mut filled = 0;
    while filled < buffer.len() {
        match reader.read(&mut buffer[filled..]) {
            Ok(0) => {
                if filled > 0 {
                    debug!(bytes = filled, "dropping truncated trailing video frame");
                }
                return Ok(false);
            }
            Ok(n) => filled += n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }
    }
    Ok(true)
}
