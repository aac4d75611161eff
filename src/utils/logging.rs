use crate::core::message::Message;
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Append-only transcript of the session, enabled with `--log <file>`.
pub struct LoggingState {
    file_path: Option<PathBuf>,
    is_active: bool,
}

impl LoggingState {
    /// Checks the file is writable up front so a bad path fails at startup.
    pub fn new(log_file: Option<PathBuf>) -> Result<Self, std::io::Error> {
        let is_active = match &log_file {
            Some(path) => {
                test_file_access(path)?;
                true
            }
            None => false,
        };
        Ok(LoggingState {
            file_path: log_file,
            is_active,
        })
    }

    pub fn disabled() -> Self {
        LoggingState {
            file_path: None,
            is_active: false,
        }
    }

    pub fn log_message(&self, message: &Message) -> Result<(), std::io::Error> {
        let Some(path) = self.file_path.as_deref().filter(|_| self.is_active) else {
            return Ok(());
        };

        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let mut writer = BufWriter::new(file);
        let mut lines = message.text().lines();
        let first = lines.next().unwrap_or_default();
        writeln!(
            writer,
            "{} {}: {}",
            message.clock_label(),
            message.role().as_str(),
            first
        )?;
        // Continuation lines are indented under the first one.
        for line in lines {
            writeln!(writer, "    {line}")?;
        }
        writer.flush()
    }

    /// Marker line written when the transcript is cleared on screen.
    pub fn log_marker(&self, marker: &str) -> Result<(), std::io::Error> {
        let Some(path) = self.file_path.as_deref().filter(|_| self.is_active) else {
            return Ok(());
        };
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "## {marker}")
    }

    /// Stop writing after a failure. The file keeps what was already written.
    pub fn pause(&mut self) {
        self.is_active = false;
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn get_status_string(&self) -> String {
        match (&self.file_path, self.is_active) {
            (Some(path), true) => format!(
                "active ({})",
                Path::new(path)
                    .file_name()
                    .unwrap_or_default()
                    .to_string_lossy()
            ),
            (Some(_), false) => "paused".to_string(),
            (None, _) => "disabled".to_string(),
        }
    }
}

fn test_file_access(path: &Path) -> Result<(), std::io::Error> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.flush()
}
