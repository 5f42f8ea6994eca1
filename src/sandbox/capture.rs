//! Pipe draining for child output.
//!
//! Each pipe is drained on its own thread until EOF so a chatty child never
//! blocks on a full pipe. Only the first `cap` bytes are kept; the rest is
//! read and dropped.

use std::io::{ErrorKind, Read};
use std::sync::mpsc::{Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Stream {
    Stdout,
    Stderr,
}

/// Bytes kept from one stream.
#[derive(Debug, Default)]
pub(crate) struct Captured {
    pub bytes: Vec<u8>,
    pub truncated: bool,
}

impl Captured {
    fn push(&mut self, chunk: &[u8], cap: usize) {
        let room = cap.saturating_sub(self.bytes.len());
        if chunk.len() > room {
            self.truncated = true;
        }
        self.bytes.extend_from_slice(&chunk[..chunk.len().min(room)]);
    }
}

/// Drain `pipe` on a helper thread and send what was kept on `tx`.
///
/// A missing pipe reports an empty capture immediately.
pub(crate) fn spawn_reader<R>(pipe: Option<R>, stream: Stream, cap: usize, tx: Sender<(Stream, Captured)>)
where
    R: Read + Send + 'static,
{
    let Some(mut pipe) = pipe else {
        let _ = tx.send((stream, Captured::default()));
        return;
    };

    thread::spawn(move || {
        let mut captured = Captured::default();
        let mut buf = [0u8; 8192];
        loop {
            match pipe.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => captured.push(&buf[..n], cap),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(_) => break,
            }
        }
        let _ = tx.send((stream, captured));
    });
}

/// Collect both streams, waiting at most `grace` in total.
///
/// A reader that has not finished by then is abandoned; this only happens
/// when something outside the killed process group still holds the pipe.
pub(crate) fn collect(rx: Receiver<(Stream, Captured)>, grace: Duration) -> (Captured, Captured) {
    let deadline = Instant::now() + grace;
    let mut stdout = None;
    let mut stderr = None;

    while stdout.is_none() || stderr.is_none() {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match rx.recv_timeout(remaining) {
            Ok((Stream::Stdout, c)) => stdout = Some(c),
            Ok((Stream::Stderr, c)) => stderr = Some(c),
            Err(_) => {
                warn!(target: "parley::sandbox", "output reader still running after grace period; abandoning it");
                break;
            }
        }
    }

    (stdout.unwrap_or_default(), stderr.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::mpsc;

    #[test]
    fn keeps_only_the_first_cap_bytes() {
        let (tx, rx) = mpsc::channel();
        spawn_reader(Some(Cursor::new(vec![b'x'; 20_000])), Stream::Stdout, 10, tx.clone());
        spawn_reader(Some(Cursor::new(b"err".to_vec())), Stream::Stderr, 10, tx);

        let (out, err) = collect(rx, Duration::from_secs(5));
        assert_eq!(out.bytes, vec![b'x'; 10]);
        assert!(out.truncated);
        assert_eq!(err.bytes, b"err");
        assert!(!err.truncated);
    }

    #[test]
    fn missing_pipes_report_empty_captures() {
        let (tx, rx) = mpsc::channel();
        spawn_reader(None::<Cursor<Vec<u8>>>, Stream::Stdout, 10, tx.clone());
        spawn_reader(None::<Cursor<Vec<u8>>>, Stream::Stderr, 10, tx);

        let (out, err) = collect(rx, Duration::from_millis(100));
        assert!(out.bytes.is_empty() && err.bytes.is_empty());
    }
}
