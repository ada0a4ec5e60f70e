// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! rosbag2 writer.
//!
//! Creates the bag directory with a single sqlite storage file. Messages
//! accumulate in one transaction committed on close; `metadata.yaml` is
//! written atomically (temp file + rename) so an interrupted write leaves
//! no metadata and the bag is detectable as incomplete.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::core::connection::{Connection, ConnectionExt};
use crate::core::error::{BagError, Result};

use super::metadata::{
    BagInfo, BagMetadata, DurationField, StartingTimeField, TopicMetadata, TopicWithCount,
    WRITE_VERSION,
};

const SQLITE_SCHEMA: &str = "
CREATE TABLE topics(
  id INTEGER PRIMARY KEY,
  name TEXT NOT NULL,
  type TEXT NOT NULL,
  serialization_format TEXT NOT NULL,
  offered_qos_profiles TEXT NOT NULL
);
CREATE TABLE messages(
  id INTEGER PRIMARY KEY,
  topic_id INTEGER NOT NULL,
  timestamp INTEGER NOT NULL,
  data BLOB NOT NULL
);
CREATE INDEX timestamp_idx ON messages (timestamp ASC);
";

/// Compression applied by the writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMode {
    /// No compression
    None,
    /// zstd-compress the whole storage file on close
    File,
    /// zstd-compress each message blob
    Message,
}

/// rosbag2 writer.
pub struct Writer {
    path: PathBuf,
    metapath: PathBuf,
    dbpath: PathBuf,
    compression: CompressionMode,
    conn: Option<rusqlite::Connection>,
    connections: Vec<Connection>,
    counts: Vec<u64>,
    closed: bool,
}

impl Writer {
    /// Create a writer for a new bag directory. The target must not exist.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if path.exists() {
            return Err(BagError::Io(std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                format!("{} exists already, not overwriting", path.display()),
            )));
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "bag".to_string());
        Ok(Self {
            metapath: path.join("metadata.yaml"),
            dbpath: path.join(format!("{name}.db3")),
            path,
            compression: CompressionMode::None,
            conn: None,
            connections: Vec::new(),
            counts: Vec::new(),
            closed: false,
        })
    }

    /// Select compression. Must be called before `open`.
    pub fn set_compression(&mut self, mode: CompressionMode) -> Result<()> {
        if self.conn.is_some() {
            return Err(BagError::metadata(
                "cannot set compression on an open bag".to_string(),
            ));
        }
        self.compression = mode;
        Ok(())
    }

    /// Create the bag directory and open the storage database.
    pub fn open(&mut self) -> Result<()> {
        std::fs::create_dir_all(&self.path)?;
        let conn = rusqlite::Connection::open(&self.dbpath)?;
        conn.execute_batch(SQLITE_SCHEMA)?;
        conn.execute_batch("BEGIN")?;
        self.conn = Some(conn);
        debug!(path = %self.path.display(), "opened rosbag2 for writing");
        Ok(())
    }

    /// Register a topic. Each topic can only be added once.
    pub fn add_connection(
        &mut self,
        topic: &str,
        msgtype: &str,
        serialization_format: &str,
        offered_qos_profiles: &str,
    ) -> Result<Connection> {
        let conn = self
            .conn
            .as_ref()
            .ok_or_else(|| BagError::metadata("bag was not opened".to_string()))?;
        if self.connections.iter().any(|c| c.topic == topic) {
            return Err(BagError::metadata(format!(
                "topics can only be added once: {topic:?}"
            )));
        }

        let id = self.connections.len() + 1;
        conn.execute(
            "INSERT INTO topics VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![
                id as i64,
                topic,
                msgtype,
                serialization_format,
                offered_qos_profiles
            ],
        )?;

        let connection = Connection {
            id,
            topic: topic.to_string(),
            msgtype: msgtype.to_string(),
            ext: ConnectionExt::Rosbag2 {
                serialization_format: serialization_format.to_string(),
                offered_qos_profiles: offered_qos_profiles.to_string(),
            },
        };
        self.connections.push(connection.clone());
        self.counts.push(0);
        Ok(connection)
    }

    /// Write a message to the bag.
    pub fn write(&mut self, connection: &Connection, timestamp: u64, data: &[u8]) -> Result<()> {
        let conn = self
            .conn
            .as_ref()
            .ok_or_else(|| BagError::metadata("bag was not opened".to_string()))?;
        let index = connection.id.checked_sub(1).filter(|&idx| {
            self.connections
                .get(idx)
                .map_or(false, |c| c.topic == connection.topic)
        });
        let Some(index) = index else {
            return Err(BagError::metadata(format!(
                "tried to write to unknown topic {:?}",
                connection.topic
            )));
        };

        let blob = if self.compression == CompressionMode::Message {
            zstd::stream::encode_all(data, 0).map_err(|err| BagError::StorageError {
                message: format!("zstd compression failed: {err}"),
            })?
        } else {
            data.to_vec()
        };

        conn.execute(
            "INSERT INTO messages (topic_id, timestamp, data) VALUES (?1, ?2, ?3)",
            rusqlite::params![connection.id as i64, timestamp as i64, blob],
        )?;
        self.counts[index] += 1;
        Ok(())
    }

    /// Commit the transaction, optionally compress the storage file, and
    /// write `metadata.yaml`.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        let conn = self
            .conn
            .take()
            .ok_or_else(|| BagError::metadata("bag was not opened".to_string()))?;

        let (start, end, count): (Option<i64>, Option<i64>, i64) = conn.query_row(
            "SELECT min(timestamp), max(timestamp), count(*) FROM messages",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?;
        conn.execute_batch("COMMIT")?;
        conn.execute_batch("PRAGMA optimize")?;
        drop(conn);

        let mut relative_path = self
            .dbpath
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if self.compression == CompressionMode::File {
            let compressed = self.dbpath.with_extension("db3.zstd");
            let mut input = std::fs::File::open(&self.dbpath)?;
            let mut output = std::fs::File::create(&compressed)?;
            zstd::stream::copy_encode(&mut input, &mut output, 0).map_err(|err| {
                BagError::StorageError {
                    message: format!("zstd compression failed: {err}"),
                }
            })?;
            std::fs::remove_file(&self.dbpath)?;
            relative_path = compressed
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
        }

        let (compression_format, compression_mode) = match self.compression {
            CompressionMode::None => (String::new(), String::new()),
            CompressionMode::File => ("zstd".to_string(), "file".to_string()),
            CompressionMode::Message => ("zstd".to_string(), "message".to_string()),
        };

        let metadata = BagMetadata {
            rosbag2_bagfile_information: BagInfo {
                version: WRITE_VERSION,
                storage_identifier: "sqlite3".to_string(),
                relative_file_paths: vec![relative_path],
                duration: DurationField {
                    nanoseconds: match (start, end) {
                        (Some(start), Some(end)) => (end - start) as u64,
                        _ => 0,
                    },
                },
                starting_time: StartingTimeField {
                    nanoseconds_since_epoch: start.map_or(0, |s| s as u64),
                },
                message_count: count as u64,
                topics_with_message_count: self
                    .connections
                    .iter()
                    .zip(&self.counts)
                    .map(|(conn, &message_count)| {
                        let ConnectionExt::Rosbag2 {
                            serialization_format,
                            offered_qos_profiles,
                        } = &conn.ext
                        else {
                            unreachable!("rosbag2 writer only creates rosbag2 connections")
                        };
                        TopicWithCount {
                            topic_metadata: TopicMetadata {
                                name: conn.topic.clone(),
                                msgtype: conn.msgtype.clone(),
                                serialization_format: serialization_format.clone(),
                                offered_qos_profiles: offered_qos_profiles.clone(),
                            },
                            message_count,
                        }
                    })
                    .collect(),
                compression_format,
                compression_mode,
                files: Vec::new(),
            },
        };

        let text = serde_yaml::to_string(&metadata)
            .map_err(|err| BagError::metadata(format!("could not render metadata: {err}")))?;
        let temp = self.metapath.with_extension("yaml.tmp");
        std::fs::write(&temp, text)?;
        std::fs::rename(&temp, &self.metapath)?;

        self.closed = true;
        debug!(
            path = %self.path.display(),
            messages = count,
            "closed rosbag2"
        );
        Ok(())
    }

    /// Connections registered so far.
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }
}

impl Drop for Writer {
    fn drop(&mut self) {
        if self.conn.is_some() && !self.closed {
            warn!(
                path = %self.path.display(),
                "rosbag2 writer dropped without close; metadata.yaml is missing"
            );
        }
    }
}
