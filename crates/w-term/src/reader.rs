// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Background stdin reader.
//
// A dedicated thread reads raw bytes from stdin and sends them as chunks
// over an mpsc channel. The input manager drains the channel, blocking or
// not depending on its no-delay flag, so the reading side never has to.
//
// Shutdown: the thread polls stdin's fd with a short timeout and checks an
// `AtomicBool` stop flag between polls, so it never sits in a blocking
// `read()` when asked to exit.

#[cfg(unix)]
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};

/// Large enough for a paste, small enough for a keypress not to matter.
const READ_BUF_SIZE: usize = 4096;

/// Upper bound on shutdown latency.
const POLL_TIMEOUT_MS: i32 = 50;

/// Background stdin reader thread.
///
/// ```no_run
/// use w_term::reader::StdinReader;
///
/// let (reader, rx) = StdinReader::spawn()?;
/// if let Ok(bytes) = rx.recv() {
///     println!("got {} bytes", bytes.len());
/// }
/// drop(reader);
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct StdinReader {
    handle: Option<JoinHandle<()>>,
    stop: Arc<AtomicBool>,
}

impl StdinReader {
    /// Spawn the reader thread.
    ///
    /// Each received `Vec<u8>` is a non-empty chunk of stdin. The channel
    /// closes when the reader stops or stdin hits EOF.
    ///
    /// # Errors
    ///
    /// Returns an error if the OS cannot spawn the thread.
    pub fn spawn() -> std::io::Result<(Self, Receiver<Vec<u8>>)> {
        let (tx, rx) = mpsc::channel();
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);

        let handle = thread::Builder::new()
            .name("wcurses-stdin".into())
            .spawn(move || {
                Self::reader_loop(tx, stop_flag);
            })?;

        log::debug!("reader: stdin thread started");

        Ok((
            Self {
                handle: Some(handle),
                stop,
            },
            rx,
        ))
    }

    /// Signal the thread to stop and join it. Idempotent.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
            log::debug!("reader: stdin thread stopped");
        }
    }

    #[cfg(unix)]
    #[allow(clippy::needless_pass_by_value)] // Owned values moved into thread closure.
    fn reader_loop(tx: mpsc::Sender<Vec<u8>>, stop: Arc<AtomicBool>) {
        use std::os::unix::io::AsRawFd;

        let stdin_fd = io::stdin().as_raw_fd();
        let mut buf = [0u8; READ_BUF_SIZE];

        while !stop.load(Ordering::Relaxed) {
            let ready = unsafe {
                let mut pfd = libc::pollfd {
                    fd: stdin_fd,
                    events: libc::POLLIN,
                    revents: 0,
                };
                libc::poll(&raw mut pfd, 1, POLL_TIMEOUT_MS)
            };

            if ready <= 0 {
                continue;
            }

            let n = unsafe { libc::read(stdin_fd, buf.as_mut_ptr().cast(), buf.len()) };
            let Ok(n) = usize::try_from(n) else {
                break;
            };
            if n == 0 {
                break;
            }

            if tx.send(buf[..n].to_vec()).is_err() {
                break;
            }
        }
    }

    /// Blocking fallback. Shutdown waits for the next keypress.
    #[cfg(not(unix))]
    #[allow(clippy::needless_pass_by_value)]
    fn reader_loop(tx: mpsc::Sender<Vec<u8>>, stop: Arc<AtomicBool>) {
        use std::io::Read;

        let stdin = std::io::stdin();
        let mut buf = [0u8; READ_BUF_SIZE];

        while !stop.load(Ordering::Relaxed) {
            match stdin.lock().read(&mut buf) {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    if tx.send(buf[..n].to_vec()).is_err() {
                        break;
                    }
                }
            }
        }
    }
}

impl Drop for StdinReader {
    fn drop(&mut self) {
        self.stop();
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
