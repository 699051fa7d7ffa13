use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::Serialize;

use smartstore_core::EntityKind;

use super::{PersistenceSink, Record, SinkError};

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
enum Op {
    Upsert,
    Remove,
}

#[derive(Debug, Serialize)]
struct JournalLine<'a> {
    op: Op,
    kind: EntityKind,
    key: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    record: Option<&'a Record>,
}

/// Append-only journal: one JSON object per line, flushed per write.
#[derive(Debug)]
pub struct JsonLinesSink {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
}

impl JsonLinesSink {
    /// Open `path` for appending, creating it if needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SinkError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, line: &JournalLine<'_>) -> Result<(), SinkError> {
        let encoded = serde_json::to_vec(line)?;
        let mut writer = self.writer.lock();
        writer.write_all(&encoded)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}

impl PersistenceSink for JsonLinesSink {
    fn upsert(&self, record: &Record) -> Result<(), SinkError> {
        let key = record.key();
        self.append(&JournalLine {
            op: Op::Upsert,
            kind: record.kind(),
            key: &key,
            record: Some(record),
        })
    }

    fn remove(&self, kind: EntityKind, key: &str) -> Result<(), SinkError> {
        self.append(&JournalLine {
            op: Op::Remove,
            kind,
            key,
            record: None,
        })
    }
}
