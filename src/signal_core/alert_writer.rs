//! JSONL alert sink
//!
//! One append-only stream; the delivery collaborator tails it. Buffered,
//! flushed explicitly at the end of a run and again on drop.

use super::alert::Alert;
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

pub struct AlertWriter {
    writer: BufWriter<std::fs::File>,
    path: PathBuf,
}

impl AlertWriter {
    pub fn new(path: PathBuf) -> std::io::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        log::info!("📝 Writing alerts to: {}", path.display());

        Ok(Self {
            writer: BufWriter::new(file),
            path,
        })
    }

    pub fn write_alert(&mut self, alert: &Alert) -> std::io::Result<()> {
        let json = serde_json::to_string(alert)?;
        writeln!(self.writer, "{}", json)?;
        Ok(())
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl Drop for AlertWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}
