// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! rosbag2 reader.
//!
//! A bag is a directory with a `metadata.yaml` document and one or more
//! sqlite storage files. Messages are read per file ordered by timestamp;
//! `file`-compressed storage is transparently decompressed into a temporary
//! directory, `message`-compressed blobs are decompressed per row.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use rusqlite::OpenFlags;
use tracing::debug;

use crate::core::connection::{Connection, ConnectionExt};
use crate::core::error::{BagError, Result};

use super::metadata::BagMetadata;

/// rosbag2 reader.
#[derive(Debug)]
pub struct Reader {
    path: PathBuf,
    metadata: BagMetadata,
    connections: Vec<Connection>,
    storage_paths: Vec<PathBuf>,
    open: bool,
}

impl Reader {
    /// Parse and validate the bag directory's metadata.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let metadata = BagMetadata::from_file(&path.join("metadata.yaml"))?;

        let storage_paths: Vec<PathBuf> = metadata
            .info()
            .relative_file_paths
            .iter()
            .map(|rel| {
                // Only the file name matters; older bags stored full paths.
                let name = Path::new(rel)
                    .file_name()
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(rel));
                path.join(name)
            })
            .collect();
        let missing: Vec<_> = storage_paths.iter().filter(|p| !p.exists()).collect();
        if !missing.is_empty() {
            return Err(BagError::metadata(format!(
                "storage files are missing: {missing:?}"
            )));
        }

        let connections = metadata
            .info()
            .topics_with_message_count
            .iter()
            .enumerate()
            .map(|(idx, topic)| Connection {
                id: idx + 1,
                topic: topic.topic_metadata.name.clone(),
                msgtype: topic.topic_metadata.msgtype.clone(),
                ext: ConnectionExt::Rosbag2 {
                    serialization_format: topic.topic_metadata.serialization_format.clone(),
                    offered_qos_profiles: topic.topic_metadata.offered_qos_profiles.clone(),
                },
            })
            .collect();

        Ok(Self {
            path,
            metadata,
            connections,
            storage_paths,
            open: false,
        })
    }

    /// Open the bag for message access.
    pub fn open(&mut self) -> Result<()> {
        self.open = true;
        debug!(path = %self.path.display(), "opened rosbag2");
        Ok(())
    }

    /// Close the bag.
    pub fn close(&mut self) {
        self.open = false;
    }

    /// Bag directory path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parsed metadata document.
    pub fn metadata(&self) -> &BagMetadata {
        &self.metadata
    }

    /// Connections listed in the metadata.
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Topic names mapped to their connections.
    pub fn topics(&self) -> impl Iterator<Item = (&str, &Connection)> {
        self.connections
            .iter()
            .map(|conn| (conn.topic.as_str(), conn))
    }

    /// Timestamp of the earliest message, 0 for empty bags.
    pub fn start_time(&self) -> u64 {
        self.metadata.start_time()
    }

    /// `start_time + duration`, 0 for empty bags.
    pub fn end_time(&self) -> u64 {
        self.metadata.end_time()
    }

    /// Nanoseconds between earliest and latest messages.
    pub fn duration(&self) -> u64 {
        self.metadata.info().duration.nanoseconds
    }

    /// Total message count.
    pub fn message_count(&self) -> u64 {
        self.metadata.info().message_count
    }

    /// Iterate messages ordered by timestamp.
    ///
    /// `topics` filters by topic name when non-empty; `start`/`stop` bound
    /// timestamps as a half-open `[start, stop)` range. The sequence is
    /// lazy per storage file and not restartable.
    pub fn messages(
        &self,
        topics: Option<&[&str]>,
        start: Option<u64>,
        stop: Option<u64>,
    ) -> Result<Messages> {
        if !self.open {
            return Err(BagError::metadata("bag is not open".to_string()));
        }
        Ok(Messages {
            connections: self.connections.clone(),
            pending: self.storage_paths.clone().into(),
            buffered: VecDeque::new(),
            topics: topics
                .map(|names| names.iter().map(|s| s.to_string()).collect())
                .unwrap_or_default(),
            start,
            stop,
            file_compressed: self.metadata.compression_mode() == Some("file"),
            message_compressed: self.metadata.compression_mode() == Some("message"),
            _scratch: None,
        })
    }
}

/// Lazy message sequence over a rosbag2 directory.
pub struct Messages {
    connections: Vec<Connection>,
    pending: VecDeque<PathBuf>,
    buffered: VecDeque<(usize, u64, Vec<u8>)>,
    topics: Vec<String>,
    start: Option<u64>,
    stop: Option<u64>,
    file_compressed: bool,
    message_compressed: bool,
    /// Keeps decompressed storage alive while rows are buffered.
    _scratch: Option<tempfile::TempDir>,
}

impl Messages {
    fn load_next_file(&mut self) -> Result<bool> {
        let Some(path) = self.pending.pop_front() else {
            return Ok(false);
        };

        let db_path = if self.file_compressed {
            let scratch = tempfile::tempdir()?;
            let target = scratch.path().join(
                path.file_stem()
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("storage.db3")),
            );
            let mut input = std::fs::File::open(&path)?;
            let mut output = std::fs::File::create(&target)?;
            zstd::stream::copy_decode(&mut input, &mut output).map_err(|err| {
                BagError::StorageError {
                    message: format!("zstd decompression failed: {err}"),
                }
            })?;
            self._scratch = Some(scratch);
            target
        } else {
            path
        };

        let conn = rusqlite::Connection::open_with_flags(
            &db_path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        let tables: u32 = conn.query_row(
            "SELECT count(*) FROM sqlite_master \
             WHERE type='table' AND name IN ('messages', 'topics')",
            [],
            |row| row.get(0),
        )?;
        if tables != 2 {
            return Err(BagError::StorageError {
                message: format!("database {} is missing tables", db_path.display()),
            });
        }

        let mut query = String::from(
            "SELECT topics.id, messages.timestamp, messages.data \
             FROM messages JOIN topics ON messages.topic_id = topics.id",
        );
        let mut params: Vec<rusqlite::types::Value> = Vec::new();
        let mut clause = "WHERE";

        if !self.topics.is_empty() {
            let marks = vec!["?"; self.topics.len()].join(",");
            query.push_str(&format!(" {clause} topics.name IN ({marks})"));
            params.extend(
                self.topics
                    .iter()
                    .map(|name| rusqlite::types::Value::Text(name.clone())),
            );
            clause = "AND";
        }
        if let Some(start) = self.start {
            query.push_str(&format!(" {clause} messages.timestamp >= ?"));
            params.push(rusqlite::types::Value::Integer(start as i64));
            clause = "AND";
        }
        if let Some(stop) = self.stop {
            query.push_str(&format!(" {clause} messages.timestamp < ?"));
            params.push(rusqlite::types::Value::Integer(stop as i64));
        }
        query.push_str(" ORDER BY timestamp");

        let mut stmt = conn.prepare(&query)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(params), |row| {
            let cid: i64 = row.get(0)?;
            let timestamp: i64 = row.get(1)?;
            let data: Vec<u8> = row.get(2)?;
            Ok((cid as usize, timestamp as u64, data))
        })?;
        for row in rows {
            self.buffered.push_back(row?);
        }
        Ok(true)
    }

    fn yield_row(&self, cid: usize, timestamp: u64, data: Vec<u8>) -> Result<(Connection, u64, Vec<u8>)> {
        let connection = self
            .connections
            .iter()
            .find(|conn| conn.id == cid)
            .ok_or_else(|| BagError::StorageError {
                message: format!("message references unknown topic id {cid}"),
            })?
            .clone();
        let data = if self.message_compressed {
            zstd::stream::decode_all(data.as_slice()).map_err(|err| BagError::StorageError {
                message: format!("zstd decompression failed: {err}"),
            })?
        } else {
            data
        };
        Ok((connection, timestamp, data))
    }
}

impl Iterator for Messages {
    type Item = Result<(Connection, u64, Vec<u8>)>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((cid, timestamp, data)) = self.buffered.pop_front() {
                return Some(self.yield_row(cid, timestamp, data));
            }
            match self.load_next_file() {
                Ok(true) => continue,
                Ok(false) => return None,
                Err(err) => return Some(Err(err)),
            }
        }
    }
}
