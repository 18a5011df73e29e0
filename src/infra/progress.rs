use std::io::{self, Write};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

const FRAMES: [char; 4] = ['|', '/', '-', '\\'];

/// Animates a small indicator on stdout while a blocking external command
/// runs. Purely cosmetic: it touches nothing but the output stream.
///
/// The stop signal is sent exactly once, either by `finish` or by `Drop` on
/// early-return paths, and the thread is joined so it never outlives the
/// workflow step.
pub struct Spinner {
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Spinner {
    pub fn start(message: &str) -> Self {
        let (stop, ticks) = mpsc::channel();
        let message = message.to_string();
        let handle = thread::spawn(move || animate(&message, &ticks));

        Self {
            stop: Some(stop),
            handle: Some(handle),
        }
    }

    pub fn finish(mut self) {
        self.signal();
    }

    fn signal(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        self.signal();
    }
}

fn animate(message: &str, ticks: &Receiver<()>) {
    let mut frame = 0usize;
    loop {
        match ticks.recv_timeout(Duration::from_millis(100)) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                print!("\r{message}... done        \n");
                let _ = io::stdout().flush();
                return;
            }
            Err(RecvTimeoutError::Timeout) => {
                print!("\r{message} {}", FRAMES[frame % FRAMES.len()]);
                let _ = io::stdout().flush();
                frame += 1;
            }
        }
    }
}
