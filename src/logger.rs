//! Structured logging with box-drawing output.
//!
//! Every line the host prints goes through these macros so the output reads as
//! one continuous tree:
//!
//! ```text
//! ┏ gaptime v1.4.0 ━━╸
//! ┃
//! ┣ Loaded settings
//! ┃   Hand order: SMH
//! ┣[INFO] Invert policy changed to sunrise
//! ╹
//! ```
//!
//! ## Conventions
//!
//! - **`log_block_start!`** opens a new conceptual block (state changes, phases).
//!   It prints a spacer pipe before the `┣` line.
//! - **`log_decorated!`** continues the current block.
//! - **`log_indented!`** lists details that belong to the line above it.
//! - **`log_pipe!`** inserts a spacer before a semantic message that starts its
//!   own block. Never at the end of a block.
//! - **`log_version!`** / **`log_end!`** bracket the whole run.
//! - **`log_info!`, `log_warning!`, `log_error!`, `log_debug!`**
//!   carry a coloured `[LEVEL]` tag.
//! - **`log_error_exit!`** closes the tree with `┗` before the process exits.
//!
//! Output can be disabled at runtime (tests and quiet runs) and routed to a file
//! while the `--log` flag is active.

use std::io::Write;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Sender, channel};

static LOGGING_ENABLED: AtomicBool = AtomicBool::new(true);

// Set once when --log is active
static LOG_CHANNEL: OnceLock<Sender<LogMessage>> = OnceLock::new();

enum LogMessage {
    Formatted(String),
    Shutdown,
}

/// Runtime control over the logger.
pub struct Log;

impl Log {
    /// Enable or disable all log output.
    pub fn set_enabled(enabled: bool) {
        LOGGING_ENABLED.store(enabled, Ordering::SeqCst);
    }

    pub fn is_enabled() -> bool {
        LOGGING_ENABLED.load(Ordering::SeqCst)
    }

    /// Route all subsequent output to `file_path` on a writer thread.
    ///
    /// The returned guard flushes and joins the writer when dropped.
    pub fn start_file_logging(file_path: String) -> anyhow::Result<LoggerGuard> {
        let (tx, rx) = channel();

        LOG_CHANNEL
            .set(tx.clone())
            .map_err(|_| anyhow::anyhow!("Logger channel already initialized"))?;

        let handle = std::thread::spawn(move || {
            let mut file = std::fs::File::create(&file_path)?;

            loop {
                match rx.recv() {
                    Ok(LogMessage::Formatted(text)) => file.write_all(text.as_bytes())?,
                    Ok(LogMessage::Shutdown) | Err(_) => {
                        file.flush()?;
                        break;
                    }
                }
            }

            Ok::<(), anyhow::Error>(())
        });

        Ok(LoggerGuard {
            tx,
            handle: Some(handle),
        })
    }

    /// `[HH:MM:SS] ` while the time source is simulated, empty otherwise.
    pub fn timestamp_prefix() -> String {
        if crate::time::source::is_initialized() && crate::time::source::is_simulated() {
            format!("[{}] ", crate::time::source::now().format("%H:%M:%S"))
        } else {
            String::new()
        }
    }
}

/// Guard for file logging that flushes the writer thread on drop.
pub struct LoggerGuard {
    tx: Sender<LogMessage>,
    handle: Option<std::thread::JoinHandle<anyhow::Result<()>>>,
}

impl Drop for LoggerGuard {
    fn drop(&mut self) {
        let _ = self.tx.send(LogMessage::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Line renderers used by the macros. Each takes the timestamp prefix and the
/// already formatted message.
#[doc(hidden)]
pub mod render {
    const YELLOW: &str = "\x1b[33m";
    const RED: &str = "\x1b[31m";
    const GREEN: &str = "\x1b[32m";
    const RESET: &str = "\x1b[0m";

    fn tagged(prefix: &str, color: &str, tag: &str, message: &str) -> String {
        format!("{prefix}┣[{color}{tag}{RESET}] {message}\n")
    }

    pub fn decorated(prefix: &str, message: &str) -> String {
        format!("{prefix}┣ {message}\n")
    }

    pub fn indented(prefix: &str, message: &str) -> String {
        format!("{prefix}┃   {message}\n")
    }

    pub fn block_start(prefix: &str, message: &str) -> String {
        format!("{prefix}┃\n{prefix}┣ {message}\n")
    }

    pub fn info(prefix: &str, message: &str) -> String {
        tagged(prefix, GREEN, "INFO", message)
    }

    pub fn debug(prefix: &str, message: &str) -> String {
        tagged(prefix, GREEN, "DEBUG", message)
    }

    pub fn warning(prefix: &str, message: &str) -> String {
        tagged(prefix, YELLOW, "WARNING", message)
    }

    pub fn error(prefix: &str, message: &str) -> String {
        tagged(prefix, RED, "ERROR", message)
    }

    pub fn error_exit(prefix: &str, message: &str) -> String {
        format!("{prefix}┃\n{prefix}┗[{RED}ERROR{RESET}] {message}\n")
    }
}

fn strip_ansi_codes(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            for ch in chars.by_ref() {
                if ch == 'm' {
                    break;
                }
            }
        } else {
            result.push(ch);
        }
    }

    result
}

/// Write a rendered line to the file logger if active, stdout otherwise.
pub fn write_output(text: &str) {
    if let Some(tx) = LOG_CHANNEL.get() {
        let _ = tx.send(LogMessage::Formatted(strip_ansi_codes(text)));
    } else {
        print!("{text}");
        let _ = std::io::stdout().flush();
    }
}

// # Logging Macros

#[doc(hidden)]
#[macro_export]
macro_rules! __log_emit {
    ($render:path; $fmt:literal $($arg:tt)*) => {{
        use $crate::logger::Log;
        if Log::is_enabled() {
            let prefix = Log::timestamp_prefix();
            let message = format!($fmt $($arg)*);
            $crate::logger::write_output(&$render(&prefix, &message));
        }
    }};
    ($render:path; $expr:expr) => {{
        use $crate::logger::Log;
        if Log::is_enabled() {
            let prefix = Log::timestamp_prefix();
            let message = ($expr).to_string();
            $crate::logger::write_output(&$render(&prefix, &message));
        }
    }};
}

/// Continue the current block with `┣ message`.
#[macro_export]
macro_rules! log_decorated {
    ($($t:tt)+) => { $crate::__log_emit!($crate::logger::render::decorated; $($t)+) };
}

/// Detail line `┃   message` under the previous line.
#[macro_export]
macro_rules! log_indented {
    ($($t:tt)+) => { $crate::__log_emit!($crate::logger::render::indented; $($t)+) };
}

/// Open a new block with a spacer pipe.
#[macro_export]
macro_rules! log_block_start {
    ($($t:tt)+) => { $crate::__log_emit!($crate::logger::render::block_start; $($t)+) };
}

#[macro_export]
macro_rules! log_info {
    ($($t:tt)+) => { $crate::__log_emit!($crate::logger::render::info; $($t)+) };
}

#[macro_export]
macro_rules! log_debug {
    ($($t:tt)+) => { $crate::__log_emit!($crate::logger::render::debug; $($t)+) };
}

#[macro_export]
macro_rules! log_warning {
    ($($t:tt)+) => { $crate::__log_emit!($crate::logger::render::warning; $($t)+) };
}

#[macro_export]
macro_rules! log_error {
    ($($t:tt)+) => { $crate::__log_emit!($crate::logger::render::error; $($t)+) };
}

/// Terminate the tree with an error corner.
#[macro_export]
macro_rules! log_error_exit {
    ($($t:tt)+) => { $crate::__log_emit!($crate::logger::render::error_exit; $($t)+) };
}

/// Empty spacer line.
#[macro_export]
macro_rules! log_pipe {
    () => {{
        use $crate::logger::Log;
        if Log::is_enabled() {
            let prefix = Log::timestamp_prefix();
            $crate::logger::write_output(&format!("{prefix}┃\n"));
        }
    }};
}

/// Startup header.
#[macro_export]
macro_rules! log_version {
    () => {{
        use $crate::logger::Log;
        if Log::is_enabled() {
            let prefix = Log::timestamp_prefix();
            let version = env!("CARGO_PKG_VERSION");
            $crate::logger::write_output(&format!("{prefix}┏ gaptime v{version} ━━╸\n"));
        }
    }};
}

/// Final termination marker.
#[macro_export]
macro_rules! log_end {
    () => {{
        use $crate::logger::Log;
        if Log::is_enabled() {
            let prefix = Log::timestamp_prefix();
            $crate::logger::write_output(&format!("{prefix}╹\n"));
        }
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_ansi_codes() {
        let colored = render::warning("", "careful");
        assert_eq!(strip_ansi_codes(&colored), "┣[WARNING] careful\n");
    }

    #[test]
    fn test_render_block_start_has_spacer() {
        assert_eq!(
            render::block_start("[12:00:00] ", "Loaded"),
            "[12:00:00] ┃\n[12:00:00] ┣ Loaded\n"
        );
    }

    #[test]
    fn test_plain_text_survives_stripping() {
        assert_eq!(strip_ansi_codes("┃   no colour"), "┃   no colour");
    }
}
