use crate::command;
use crate::resp::{Decoder, Reply, element_count, frame_line_count};
use crate::store::Store;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Appends accepted write frames to the log file.
///
/// Each append is one `write_all` of one frame. Callers serialize appends
/// through [`SharedAofWriter`], so frames never interleave on disk.
pub struct AofWriter {
    file: Option<File>,
    fsync_policy: FsyncPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FsyncPolicy {
    Always,
    Everysec,
    No,
}

impl FsyncPolicy {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Self {
        match s {
            "always" => FsyncPolicy::Always,
            "everysec" => FsyncPolicy::Everysec,
            _ => FsyncPolicy::No,
        }
    }
}

impl Default for AofWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl AofWriter {
    pub fn new() -> Self {
        AofWriter {
            file: None,
            fsync_policy: FsyncPolicy::Everysec,
        }
    }

    /// Open or create the log file for appending.
    pub fn open(&mut self, path: &Path, policy: FsyncPolicy) -> io::Result<()> {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        self.file = Some(file);
        self.fsync_policy = policy;
        Ok(())
    }

    /// Append the raw bytes of one frame. A writer that was never opened
    /// drops the frame.
    pub fn append(&mut self, frame: &[u8]) -> io::Result<()> {
        let file = match &mut self.file {
            Some(f) => f,
            None => return Ok(()),
        };

        file.write_all(frame)?;

        if self.fsync_policy == FsyncPolicy::Always {
            file.sync_data()?;
        }
        Ok(())
    }

    /// Push written frames to disk.
    pub fn sync(&mut self) -> io::Result<()> {
        if let Some(f) = &mut self.file {
            f.sync_data()?;
        }
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.file.is_some()
    }

    pub fn fsync_policy(&self) -> FsyncPolicy {
        self.fsync_policy
    }

    pub fn close(&mut self) {
        if let Some(f) = self.file.take() {
            let _ = f.sync_all();
        }
    }
}

pub type SharedAofWriter = Arc<Mutex<AofWriter>>;

/// Summary of one replay run.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ReplayStats {
    /// Complete frames fed back through the dispatcher.
    pub frames_applied: usize,
    /// Lines outside any frame that did not start a new one.
    pub lines_skipped: usize,
    /// An incomplete frame at the end of the log was dropped.
    pub truncated_tail: bool,
    /// Length of the log up to the end of its last complete frame.
    pub valid_len: usize,
}

/// One log line with its terminator removed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line<'a> {
    pub text: &'a [u8],
    /// Offset just past the line's `\n`.
    pub end: usize,
}

/// Frames recovered from a sequence of log lines.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Reassembly {
    pub frames: Vec<Vec<u8>>,
    pub lines_skipped: usize,
    pub truncated_tail: bool,
    pub valid_len: usize,
}

/// Split log contents into lines without their `\r\n` terminators.
///
/// Every record ends in `\r\n`, so a final segment with no `\n` is a partial
/// write and is left out. The second value reports whether that happened.
pub fn split_lines(data: &[u8]) -> (Vec<Line<'_>>, bool) {
    let mut lines = Vec::new();
    let mut start = 0;
    while let Some(pos) = data[start..].iter().position(|b| *b == b'\n') {
        let raw = &data[start..start + pos];
        lines.push(Line {
            text: raw.strip_suffix(b"\r").unwrap_or(raw),
            end: start + pos + 1,
        });
        start += pos + 1;
    }
    (lines, start < data.len())
}

/// Rebuild frame boundaries from log lines.
///
/// A line starting with `*` opens a frame spanning `2 * N + 1` lines, header
/// included. Lines are collected with their `\r\n` restored until the frame
/// is complete. Between frames, lines that do not open one are skipped. An
/// unfinished frame at the end is dropped.
pub fn reassemble(lines: &[Line<'_>]) -> Reassembly {
    let mut result = Reassembly::default();
    let mut buf = Vec::new();
    let mut remaining = 0usize;

    for line in lines {
        if remaining == 0 {
            match element_count(line.text) {
                Some(count) => remaining = frame_line_count(count),
                None => {
                    result.lines_skipped += 1;
                    result.valid_len = line.end;
                    continue;
                }
            }
        }

        buf.extend_from_slice(line.text);
        buf.extend_from_slice(b"\r\n");
        remaining -= 1;

        if remaining == 0 {
            result.frames.push(std::mem::take(&mut buf));
            result.valid_len = line.end;
        }
    }

    result.truncated_tail = remaining != 0;
    result
}

/// Replay raw log contents into the store.
pub fn replay_bytes(data: &[u8], store: &mut Store) -> ReplayStats {
    let (lines, partial_line) = split_lines(data);
    let reassembly = reassemble(&lines);

    let mut stats = ReplayStats {
        lines_skipped: reassembly.lines_skipped,
        truncated_tail: reassembly.truncated_tail || partial_line,
        valid_len: reassembly.valid_len,
        ..Default::default()
    };

    for raw in &reassembly.frames {
        let frame = Decoder::decode(raw);
        // Replayed frames are already in the log; the persist flag is ignored.
        let outcome = command::dispatch(&frame, store);
        if let Reply::Error(msg) = &outcome.reply {
            debug!("Replayed frame rejected: {msg}");
        }
        stats.frames_applied += 1;
    }
    stats
}

/// Replay the log at `path` into the store. A missing file replays nothing.
///
/// An incomplete frame at the end of the file is cut off so later appends
/// start on a frame boundary.
pub fn replay(path: &Path, store: &mut Store) -> io::Result<ReplayStats> {
    let data = match std::fs::read(path) {
        Ok(d) => d,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(ReplayStats::default()),
        Err(e) => return Err(e),
    };
    let stats = replay_bytes(&data, store);

    if stats.truncated_tail {
        warn!(
            "Dropping {} bytes of incomplete frame at end of {}",
            data.len() - stats.valid_len,
            path.display()
        );
        let file = std::fs::OpenOptions::new().write(true).open(path)?;
        file.set_len(stats.valid_len as u64)?;
        file.sync_all()?;
    }
    Ok(stats)
}

/// Replay the log at `path`, then open it for appending.
///
/// The writer is opened only after replay succeeds. A failed replay may
/// leave an incomplete tail in place, and appends behind it would be folded
/// into that frame on the next start.
pub fn restore(
    path: &Path,
    policy: FsyncPolicy,
    store: &mut Store,
) -> io::Result<(ReplayStats, AofWriter)> {
    let stats = replay(path, store)?;
    let mut writer = AofWriter::new();
    writer.open(path, policy)?;
    Ok((stats, writer))
}
