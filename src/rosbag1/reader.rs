// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! rosbag1 v2.0 reader.
//!
//! Designed for a ROS2 world: message type names are normalized to their
//! ROS2 form on open. Only indexed bags are readable; the reader seeks to
//! the index region, builds the connection table and chunk directory, and
//! iterates messages in timestamp order by merging the per-connection
//! indexes. One decompressed chunk is cached at a time.

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufRead, BufReader, Cursor, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::core::connection::{Connection, ConnectionExt};
use crate::core::error::{BagError, Result};
use crate::typesys::ast::normalize_msgtype;

use super::record::{
    read_bytes, read_u32, RecordHeader, OP_BAGHEADER, OP_CHUNK, OP_CHUNK_INFO, OP_CONNECTION,
    OP_IDXDATA, OP_MSGDATA,
};

/// Chunk compression applied by the writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    /// Chunks stored verbatim
    None,
    /// bz2-compressed chunks
    Bz2,
    /// lz4 frame-compressed chunks
    Lz4,
}

impl Compression {
    fn from_name(name: &str) -> Result<Self> {
        match name {
            "none" => Ok(Compression::None),
            "bz2" => Ok(Compression::Bz2),
            "lz4" => Ok(Compression::Lz4),
            other => Err(BagError::corrupt(
                "chunk",
                format!("compression {other:?} is not supported"),
            )),
        }
    }

    fn decompress(self, data: Vec<u8>) -> Result<Vec<u8>> {
        match self {
            Compression::None => Ok(data),
            Compression::Bz2 => {
                let mut out = Vec::new();
                bzip2::read::BzDecoder::new(data.as_slice())
                    .read_to_end(&mut out)
                    .map_err(|e| BagError::corrupt("chunk", format!("bz2: {e}")))?;
                Ok(out)
            }
            Compression::Lz4 => {
                let mut out = Vec::new();
                lz4_flex::frame::FrameDecoder::new(data.as_slice())
                    .read_to_end(&mut out)
                    .map_err(|e| BagError::corrupt("chunk", format!("lz4: {e}")))?;
                Ok(out)
            }
        }
    }
}

/// One entry of a connection's message index.
#[derive(Debug, Clone, Copy)]
struct IndexEntry {
    time: u64,
    chunk_pos: u64,
    offset: u32,
}

/// Chunk directory entry from the index region.
#[derive(Debug, Clone)]
struct ChunkInfo {
    pos: u64,
    start_time: u64,
    /// Exclusive end (latest timestamp + 1).
    end_time: u64,
    connection_counts: HashMap<u32, u32>,
}

/// Chunk record location and compression.
#[derive(Debug, Clone, Copy)]
struct ChunkMeta {
    datasize: u32,
    datapos: u64,
    compression: Compression,
}

/// Per-topic summary.
#[derive(Debug, Clone)]
pub struct TopicInfo {
    /// Number of connections publishing the topic.
    pub connection_count: usize,
    /// Total message count.
    pub message_count: u64,
    /// Message type of the first connection.
    pub msgtype: String,
    /// Message definition of the first connection.
    pub msgdef: String,
}

/// rosbag1 reader.
#[derive(Debug)]
pub struct Reader {
    path: PathBuf,
    file: Option<BufReader<File>>,
    connections: BTreeMap<u32, Connection>,
    indexes: BTreeMap<u32, Vec<IndexEntry>>,
    chunk_infos: Vec<ChunkInfo>,
    chunks: HashMap<u64, ChunkMeta>,
    topics: BTreeMap<String, TopicInfo>,
    current_chunk: Option<(u64, Vec<u8>)>,
}

impl Reader {
    /// Open a rosbag1 file and read its metadata.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut file = BufReader::new(File::open(&path)?);

        let parsed = Self::parse(&mut file)?;
        let (connections, indexes, chunk_infos, chunks) = parsed;

        let mut topics: BTreeMap<String, TopicInfo> = BTreeMap::new();
        for conn in connections.values() {
            let count: u64 = chunk_infos
                .iter()
                .filter_map(|ci| ci.connection_counts.get(&(conn.id as u32)))
                .map(|&c| u64::from(c))
                .sum();
            let msgdef = match &conn.ext {
                ConnectionExt::Rosbag1 { msgdef, .. } => msgdef.clone(),
                ConnectionExt::Rosbag2 { .. } => String::new(),
            };
            topics
                .entry(conn.topic.clone())
                .and_modify(|info| {
                    info.connection_count += 1;
                    info.message_count += count;
                })
                .or_insert_with(|| TopicInfo {
                    connection_count: 1,
                    message_count: count,
                    msgtype: conn.msgtype.clone(),
                    msgdef,
                });
        }

        debug!(
            path = %path.display(),
            connections = connections.len(),
            chunks = chunk_infos.len(),
            "opened rosbag1"
        );

        Ok(Self {
            path,
            file: Some(file),
            connections,
            indexes,
            chunk_infos,
            chunks,
            topics,
            current_chunk: None,
        })
    }

    /// Open a bag recorded as a set of files. Split sets are not supported;
    /// exactly one path is accepted.
    pub fn open_paths(paths: &[PathBuf]) -> Result<Self> {
        match paths {
            [single] => Self::open(single),
            [] => Err(BagError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no bag path given",
            ))),
            _ => Err(BagError::SplitNotSupported),
        }
    }

    #[allow(clippy::type_complexity)]
    fn parse(
        file: &mut BufReader<File>,
    ) -> Result<(
        BTreeMap<u32, Connection>,
        BTreeMap<u32, Vec<IndexEntry>>,
        Vec<ChunkInfo>,
        HashMap<u64, ChunkMeta>,
    )> {
        let mut magic = Vec::new();
        file.read_until(b'\n', &mut magic)?;
        let magic = String::from_utf8_lossy(&magic);
        if magic.is_empty() {
            return Err(BagError::corrupt("magic", "file is empty"));
        }
        let version = magic
            .strip_prefix("#ROSBAG V")
            .map(str::trim)
            .ok_or_else(|| BagError::corrupt("magic", "file magic is invalid"))?;
        if version != "2.0" {
            return Err(BagError::corrupt(
                "magic",
                format!("bag version {version:?} is not supported"),
            ));
        }

        let header = RecordHeader::read_expect(file, OP_BAGHEADER)?;
        let index_pos = header.get_u64("index_pos")?;
        let conn_count = header.get_u32("conn_count")?;
        let chunk_count = header.get_u32("chunk_count")?;
        if header.contains("encryptor") && !header.get_string("encryptor")?.is_empty() {
            return Err(BagError::corrupt("bag header", "encryption is not supported"));
        }
        if index_pos == 0 {
            return Err(BagError::Unindexed);
        }

        file.seek(SeekFrom::Start(index_pos))?;

        let mut connections = BTreeMap::new();
        for _ in 0..conn_count {
            let (cid, conn) = Self::read_connection(file)?;
            connections.insert(cid, conn);
        }

        let mut chunk_infos = Vec::with_capacity(chunk_count as usize);
        for _ in 0..chunk_count {
            chunk_infos.push(Self::read_chunk_info(file)?);
        }

        let mut chunks = HashMap::new();
        let mut indexes: BTreeMap<u32, Vec<IndexEntry>> = BTreeMap::new();
        for info in &chunk_infos {
            file.seek(SeekFrom::Start(info.pos))?;
            chunks.insert(info.pos, Self::read_chunk(file)?);

            for _ in 0..info.connection_counts.len() {
                let (cid, entries) = Self::read_index_data(file, info.pos)?;
                indexes.entry(cid).or_default().extend(entries);
            }
        }
        for entries in indexes.values_mut() {
            entries.sort_by_key(|e| e.time);
        }

        Ok((connections, indexes, chunk_infos, chunks))
    }

    fn read_connection(file: &mut BufReader<File>) -> Result<(u32, Connection)> {
        let header = RecordHeader::read_expect(file, OP_CONNECTION)?;
        let cid = header.get_u32("conn")?;
        let topic = normalize_topic(&header.get_string("topic")?);

        // Connection record data is itself a header dictionary.
        let data = RecordHeader::read(file)?;
        let msgtype = normalize_msgtype(&data.get_string("type")?);
        let md5sum = data.get_string("md5sum")?;
        let msgdef = data.get_string("message_definition")?;
        let callerid = data.contains("callerid").then(|| data.get_string("callerid")).transpose()?;
        let latching = if data.contains("latching") {
            data.get_string("latching")?.parse().unwrap_or(0)
        } else {
            0
        };

        Ok((
            cid,
            Connection {
                id: cid as usize,
                topic,
                msgtype,
                ext: ConnectionExt::Rosbag1 {
                    md5sum,
                    msgdef,
                    callerid,
                    latching,
                },
            },
        ))
    }

    fn read_chunk_info(file: &mut BufReader<File>) -> Result<ChunkInfo> {
        let header = RecordHeader::read_expect(file, OP_CHUNK_INFO)?;
        let ver = header.get_u32("ver")?;
        if ver != 1 {
            return Err(BagError::corrupt(
                "chunk info",
                format!("version {ver} is not supported"),
            ));
        }
        let pos = header.get_u64("chunk_pos")?;
        let start_time = header.get_time("start_time")?;
        let end_time = header.get_time("end_time")? + 1;
        let count = header.get_u32("count")?;

        // Skip the record data length prefix.
        read_u32(file)?;
        let mut connection_counts = HashMap::with_capacity(count as usize);
        for _ in 0..count {
            let cid = read_u32(file)?;
            let msgs = read_u32(file)?;
            connection_counts.insert(cid, msgs);
        }

        Ok(ChunkInfo {
            pos,
            start_time,
            end_time,
            connection_counts,
        })
    }

    fn read_chunk(file: &mut BufReader<File>) -> Result<ChunkMeta> {
        let header = RecordHeader::read_expect(file, OP_CHUNK)?;
        let compression = Compression::from_name(&header.get_string("compression")?)?;
        let datasize = read_u32(file)?;
        let datapos = file.stream_position()?;
        file.seek(SeekFrom::Current(i64::from(datasize)))?;
        Ok(ChunkMeta {
            datasize,
            datapos,
            compression,
        })
    }

    fn read_index_data(
        file: &mut BufReader<File>,
        chunk_pos: u64,
    ) -> Result<(u32, Vec<IndexEntry>)> {
        let header = RecordHeader::read_expect(file, OP_IDXDATA)?;
        let ver = header.get_u32("ver")?;
        if ver != 1 {
            return Err(BagError::corrupt(
                "index data",
                format!("version {ver} is not supported"),
            ));
        }
        let cid = header.get_u32("conn")?;
        let count = header.get_u32("count")?;

        // Skip the record data length prefix.
        read_u32(file)?;
        let mut entries = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let sec = u64::from(read_u32(file)?);
            let nsec = u64::from(read_u32(file)?);
            let offset = read_u32(file)?;
            entries.push(IndexEntry {
                time: sec * super::record::NANOS_PER_SEC + nsec,
                chunk_pos,
                offset,
            });
        }
        Ok((cid, entries))
    }

    /// Path of the bag file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Connections recorded in the bag.
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }

    /// Per-topic summaries.
    pub fn topics(&self) -> &BTreeMap<String, TopicInfo> {
        &self.topics
    }

    /// Timestamp of the earliest message, 0 for empty bags.
    pub fn start_time(&self) -> u64 {
        self.chunk_infos
            .iter()
            .map(|ci| ci.start_time)
            .min()
            .unwrap_or(0)
    }

    /// Timestamp just past the latest message, 0 for empty bags.
    pub fn end_time(&self) -> u64 {
        self.chunk_infos
            .iter()
            .map(|ci| ci.end_time)
            .max()
            .unwrap_or(0)
    }

    /// Nanoseconds between earliest and latest messages.
    pub fn duration(&self) -> u64 {
        self.end_time().saturating_sub(self.start_time())
    }

    /// Total message count.
    pub fn message_count(&self) -> u64 {
        self.topics.values().map(|t| t.message_count).sum()
    }

    /// Iterate messages in non-decreasing timestamp order.
    ///
    /// `topics` filters by topic name when non-empty; `start`/`stop` bound
    /// timestamps as a half-open `[start, stop)` range. The sequence is
    /// lazy and not restartable.
    pub fn messages(
        &mut self,
        topics: Option<&[&str]>,
        start: Option<u64>,
        stop: Option<u64>,
    ) -> Result<Messages<'_>> {
        if self.file.is_none() {
            return Err(BagError::corrupt("reader", "bag is not open"));
        }

        let mut entries: Vec<(u32, IndexEntry)> = Vec::new();
        for (cid, conn) in &self.connections {
            if let Some(wanted) = topics {
                if !wanted.is_empty() && !wanted.contains(&conn.topic.as_str()) {
                    continue;
                }
            }
            if let Some(index) = self.indexes.get(cid) {
                entries.extend(index.iter().map(|e| (*cid, *e)));
            }
        }
        entries.retain(|(_, e)| {
            start.map_or(true, |s| e.time >= s) && stop.map_or(true, |s| e.time < s)
        });
        // Stable sort keeps source order on equal timestamps.
        entries.sort_by_key(|(_, e)| e.time);

        Ok(Messages {
            reader: self,
            entries: entries.into_iter(),
        })
    }

    /// Close the bag. Also happens on drop.
    pub fn close(&mut self) {
        self.file = None;
        self.current_chunk = None;
    }

    fn read_entry(&mut self, _cid: u32, entry: IndexEntry) -> Result<(Connection, u64, Vec<u8>)> {
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| BagError::corrupt("reader", "bag is not open"))?;

        if self.current_chunk.as_ref().map(|(pos, _)| *pos) != Some(entry.chunk_pos) {
            let meta = *self.chunks.get(&entry.chunk_pos).ok_or_else(|| {
                BagError::corrupt("chunk", format!("no chunk at position {}", entry.chunk_pos))
            })?;
            file.seek(SeekFrom::Start(meta.datapos))?;
            let compressed = read_bytes(file, meta.datasize as usize)?;
            let data = meta.compression.decompress(compressed)?;
            self.current_chunk = Some((entry.chunk_pos, data));
        }

        let (_, chunk) = self.current_chunk.as_ref().expect("chunk cached above");
        let mut cursor = Cursor::new(&chunk[..]);
        cursor.set_position(u64::from(entry.offset));

        // Connection records may precede the message inside the chunk.
        let header = loop {
            let header = RecordHeader::read(&mut cursor)?;
            if header.get_u8("op")? != OP_CONNECTION {
                break header;
            }
            let skip = read_u32(&mut cursor)?;
            cursor.seek(SeekFrom::Current(i64::from(skip)))?;
        };
        if header.get_u8("op")? != OP_MSGDATA {
            return Err(BagError::corrupt("chunk", "expected to find message data"));
        }

        let size = read_u32(&mut cursor)?;
        let data = read_bytes(&mut cursor, size as usize)?;
        let conn = self
            .connections
            .get(&header.get_u32("conn")?)
            .ok_or_else(|| BagError::corrupt("chunk", "message references unknown connection"))?
            .clone();
        Ok((conn, entry.time, data))
    }
}

/// Lazy message sequence over a [`Reader`].
pub struct Messages<'a> {
    reader: &'a mut Reader,
    entries: std::vec::IntoIter<(u32, IndexEntry)>,
}

impl Iterator for Messages<'_> {
    type Item = Result<(Connection, u64, Vec<u8>)>;

    fn next(&mut self) -> Option<Self::Item> {
        let (cid, entry) = self.entries.next()?;
        Some(self.reader.read_entry(cid, entry))
    }
}

/// Collapse duplicate slashes in a topic name.
fn normalize_topic(name: &str) -> String {
    let leading = if name.starts_with('/') { "/" } else { "" };
    let joined = name
        .split('/')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("/");
    format!("{leading}{joined}")
}
