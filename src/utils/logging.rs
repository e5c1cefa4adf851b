use crate::api::ChatResult;
use chrono::Local;
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing_subscriber::EnvFilter;

const VERBOSE_FILTER: &str = "warn,blogchat=debug";

/// Installs the stderr `tracing` subscriber. `RUST_LOG` is honoured unless
/// `verbose` is set, which forces debug output for this crate and keeps
/// warnings from everything else.
pub fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Append-only transcript of prompts and the answers they produced.
pub struct LoggingState {
    file_path: Option<String>,
}

impl LoggingState {
    pub fn new(log_file: Option<String>) -> Result<Self, std::io::Error> {
        let logging = LoggingState {
            file_path: log_file,
        };
        if let Some(path) = &logging.file_path {
            // Fail early rather than after a long generation.
            logging.test_file_access(path)?;
        }
        Ok(logging)
    }

    pub fn is_active(&self) -> bool {
        self.file_path.is_some()
    }

    pub fn log_exchange(&self, prompt: &str, result: &ChatResult) -> Result<(), std::io::Error> {
        let mut entry = format!(
            "## {}\n\nYou: {}\n\n",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            prompt
        );
        if result.success {
            entry.push_str(&result.message);
        } else {
            entry.push_str(&format!(
                "## Error: {}",
                result.error.as_deref().unwrap_or("generation failed")
            ));
        }
        self.log_message(&entry)
    }

    pub fn log_message(&self, content: &str) -> Result<(), std::io::Error> {
        let Some(file_path) = &self.file_path else {
            return Ok(());
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(file_path)?;
        let mut writer = BufWriter::with_capacity(64 * 1024, file);

        for line in content.lines() {
            writeln!(writer, "{line}")?;
        }
        // Blank line between entries
        writeln!(writer)?;

        writer.flush()?;
        Ok(())
    }

    pub fn get_status_string(&self) -> String {
        match &self.file_path {
            None => "disabled".to_string(),
            Some(path) => format!(
                "active ({})",
                Path::new(path)
                    .file_name()
                    .unwrap_or_default()
                    .to_string_lossy()
            ),
        }
    }

    fn test_file_access(&self, path: &str) -> Result<(), std::io::Error> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.flush()?;
        Ok(())
    }
}
