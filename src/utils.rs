use chrono::Local;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Keep only printable ASCII and whitespace; protocol lines come straight
/// off the wire and must not be echoed raw to a terminal.
pub fn filter_printable_chars(input: &str) -> String {
    input
        .chars()
        .filter(|c| c.is_ascii_graphic() || c.is_ascii_whitespace())
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info = 0,
    Notice = 1,
    Warning = 2,
    Error = 3,
}

impl Severity {
    fn label(&self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Notice => "NOTICE",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
        }
    }
}

/// Console logger with an optional append-only log file.
///
/// `level` is the verbosity threshold: 0 logs everything down to per-command
/// traffic, 3 logs errors only. Console output is filtered to printable
/// characters; the log file gets the message as-is.
pub struct Logger {
    level: u8,
    writer: Option<Arc<Mutex<BufWriter<File>>>>,
}

impl Logger {
    pub fn new(level: u8, log_file: Option<PathBuf>) -> anyhow::Result<Self> {
        let writer = if let Some(path) = log_file {
            if let Some(parent) = path.parent() {
                if !parent.exists() {
                    std::fs::create_dir_all(parent)?;
                }
            }

            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Some(Arc::new(Mutex::new(BufWriter::new(file))))
        } else {
            None
        };

        Ok(Self { level, writer })
    }

    pub async fn info(&self, client_addr: &SocketAddr, message: &str) {
        self.log(Severity::Info, client_addr, message).await;
    }

    pub async fn notice(&self, client_addr: &SocketAddr, message: &str) {
        self.log(Severity::Notice, client_addr, message).await;
    }

    pub async fn warning(&self, client_addr: &SocketAddr, message: &str) {
        self.log(Severity::Warning, client_addr, message).await;
    }

    pub async fn error(&self, client_addr: &SocketAddr, message: &str) {
        self.log(Severity::Error, client_addr, message).await;
    }

    async fn log(&self, severity: Severity, client_addr: &SocketAddr, message: &str) {
        if (severity as u8) < self.level {
            return;
        }

        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        let prefix = format!("{} [{}] {}", timestamp, severity.label(), client_addr);

        println!("{} {}", prefix, filter_printable_chars(message));

        if let Some(writer) = &self.writer {
            let mut writer = writer.lock().await;
            let _ = writer.write_all(format!("{} {}\n", prefix, message).as_bytes());
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_printable_chars() {
        assert_eq!(filter_printable_chars("RCPT TO:<a@b>"), "RCPT TO:<a@b>");
        assert_eq!(filter_printable_chars("abc\x00\x1bdef"), "abcdef");
        assert_eq!(filter_printable_chars("tab\tok"), "tab\tok");
    }

    #[test]
    fn test_severity_order_matches_thresholds() {
        assert!(Severity::Info < Severity::Notice);
        assert!(Severity::Notice < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
    }
}
