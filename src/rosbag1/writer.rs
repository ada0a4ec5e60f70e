// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! rosbag1 v2.0 writer.
//!
//! Messages are buffered into chunks (768 KiB uncompressed by default,
//! optionally bz2- or lz4-compressed) and flushed with per-connection index
//! records. `close` writes the index region and patches the bag header; a
//! writer dropped without closing leaves `index_pos == 0`, which marks the
//! bag as incomplete for any reader.

use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, WriteBytesExt};
use tracing::{debug, warn};

use crate::core::connection::{Connection, ConnectionExt};
use crate::core::error::{BagError, Result};
use crate::typesys::ast::denormalize_msgtype;
use crate::typesys::msgdef::generate_msgdef;
use crate::typesys::registry::TypeRegistry;

use super::record::{
    RecordHeader, NANOS_PER_SEC, OP_BAGHEADER, OP_CHUNK, OP_CHUNK_INFO, OP_CONNECTION, OP_IDXDATA,
    OP_MSGDATA,
};

/// Default uncompressed chunk budget.
const DEFAULT_CHUNK_THRESHOLD: usize = 768 * 1024;

/// Bag header records are padded to this size so they can be rewritten in
/// place on close.
const BAG_HEADER_SIZE: usize = 4096;

/// Length of the magic line, where the final bag header is patched in.
const MAGIC_LEN: u64 = 13;

/// Chunk compression selected before opening.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkCompression {
    /// Store chunks verbatim
    None,
    /// bz2-compress each chunk
    Bz2,
    /// lz4 frame-compress each chunk
    Lz4,
}

impl ChunkCompression {
    fn name(self) -> &'static str {
        match self {
            ChunkCompression::None => "none",
            ChunkCompression::Bz2 => "bz2",
            ChunkCompression::Lz4 => "lz4",
        }
    }

    fn compress(self, data: &[u8]) -> Result<Vec<u8>> {
        match self {
            ChunkCompression::None => Ok(data.to_vec()),
            ChunkCompression::Bz2 => {
                let mut out = Vec::new();
                bzip2::read::BzEncoder::new(data, bzip2::Compression::best())
                    .read_to_end(&mut out)?;
                Ok(out)
            }
            ChunkCompression::Lz4 => {
                let mut encoder = lz4_flex::frame::FrameEncoder::new(Vec::new());
                encoder.write_all(data)?;
                encoder
                    .finish()
                    .map_err(|e| BagError::corrupt("chunk", format!("lz4: {e}")))
            }
        }
    }
}

/// Chunk being filled.
struct OpenChunk {
    data: Vec<u8>,
    start: u64,
    end: u64,
    connections: BTreeMap<u32, Vec<(u64, u32)>>,
}

impl OpenChunk {
    fn new() -> Self {
        Self {
            data: Vec::new(),
            start: u64::MAX,
            end: 0,
            connections: BTreeMap::new(),
        }
    }
}

/// Chunk already written to the file.
struct FinishedChunk {
    pos: u64,
    start: u64,
    end: u64,
    connection_counts: Vec<(u32, u32)>,
}

/// rosbag1 writer.
pub struct Writer {
    path: PathBuf,
    file: Option<BufWriter<File>>,
    compression: ChunkCompression,
    connections: Vec<Connection>,
    current: OpenChunk,
    finished: Vec<FinishedChunk>,
    chunk_threshold: usize,
    closed: bool,
}

impl Writer {
    /// Create a writer for a new bag. The target path must not exist.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if path.exists() {
            return Err(BagError::Io(std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                format!("{} exists already, not overwriting", path.display()),
            )));
        }
        Ok(Self {
            path,
            file: None,
            compression: ChunkCompression::None,
            connections: Vec::new(),
            current: OpenChunk::new(),
            finished: Vec::new(),
            chunk_threshold: DEFAULT_CHUNK_THRESHOLD,
            closed: false,
        })
    }

    /// Select chunk compression. Must be called before `open`.
    pub fn set_compression(&mut self, compression: ChunkCompression) -> Result<()> {
        if self.file.is_some() {
            return Err(BagError::corrupt(
                "writer",
                "cannot set compression on an open bag",
            ));
        }
        self.compression = compression;
        Ok(())
    }

    /// Override the uncompressed chunk byte budget.
    pub fn set_chunk_threshold(&mut self, threshold: usize) {
        self.chunk_threshold = threshold.max(1);
    }

    /// Open the bag file and write the placeholder header.
    pub fn open(&mut self) -> Result<()> {
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)?;
        let mut file = BufWriter::new(file);

        file.write_all(b"#ROSBAG V2.0\n")?;
        Self::write_bag_header(&mut file, 0, 0, 0)?;
        self.file = Some(file);
        debug!(path = %self.path.display(), "opened rosbag1 for writing");
        Ok(())
    }

    /// Write a bag header record padded to its fixed size.
    fn write_bag_header<W: Write>(
        dst: &mut W,
        index_pos: u64,
        conn_count: u32,
        chunk_count: u32,
    ) -> Result<()> {
        let mut header = RecordHeader::new();
        header.set_u64("index_pos", index_pos);
        header.set_u32("conn_count", conn_count);
        header.set_u32("chunk_count", chunk_count);
        let written = header.write(dst, Some(OP_BAGHEADER))?;

        let padsize = BAG_HEADER_SIZE - 4 - written;
        dst.write_u32::<LittleEndian>(padsize as u32)?;
        dst.write_all(&vec![b' '; padsize])?;
        Ok(())
    }

    /// Register a connection. `msgdef_md5` may carry the ROS1 definition
    /// text and hash; when absent both are generated from the registry.
    pub fn add_connection(
        &mut self,
        topic: &str,
        msgtype: &str,
        msgdef_md5: Option<(String, String)>,
        callerid: Option<String>,
        latching: u8,
        registry: &TypeRegistry,
    ) -> Result<Connection> {
        if self.file.is_none() {
            return Err(BagError::corrupt("writer", "bag was not opened"));
        }

        let (msgdef, md5sum) = match msgdef_md5 {
            Some(pair) => pair,
            None => generate_msgdef(msgtype, registry)?,
        };

        let connection = Connection {
            id: self.connections.len(),
            topic: topic.to_string(),
            msgtype: msgtype.to_string(),
            ext: ConnectionExt::Rosbag1 {
                md5sum,
                msgdef,
                callerid,
                latching,
            },
        };

        if self
            .connections
            .iter()
            .any(|have| have.topic == connection.topic && have.ext == connection.ext)
        {
            return Err(BagError::corrupt(
                "writer",
                format!("connection for {topic:?} was already added with the same arguments"),
            ));
        }

        Self::write_connection(&connection, &mut self.current.data)?;
        self.connections.push(connection.clone());
        Ok(connection)
    }

    /// Write a message to the bag.
    pub fn write(&mut self, connection: &Connection, timestamp: u64, data: &[u8]) -> Result<()> {
        if self.file.is_none() {
            return Err(BagError::corrupt("writer", "bag was not opened"));
        }
        if self.connections.get(connection.id).map(|c| &c.topic) != Some(&connection.topic) {
            return Err(BagError::corrupt(
                "writer",
                format!("there is no connection {:?}", connection.topic),
            ));
        }

        let chunk = &mut self.current;
        chunk
            .connections
            .entry(connection.id as u32)
            .or_default()
            .push((timestamp, chunk.data.len() as u32));
        chunk.start = chunk.start.min(timestamp);
        chunk.end = chunk.end.max(timestamp);

        let mut header = RecordHeader::new();
        header.set_u32("conn", connection.id as u32);
        header.set_time("time", timestamp);
        header.write(&mut chunk.data, Some(OP_MSGDATA))?;
        chunk.data.write_u32::<LittleEndian>(data.len() as u32)?;
        chunk.data.extend_from_slice(data);

        if chunk.data.len() > self.chunk_threshold {
            self.flush_chunk()?;
        }
        Ok(())
    }

    /// Write a connection record to a stream.
    fn write_connection(connection: &Connection, dst: &mut impl Write) -> Result<()> {
        let ConnectionExt::Rosbag1 {
            md5sum,
            msgdef,
            callerid,
            latching,
        } = &connection.ext
        else {
            return Err(BagError::corrupt("writer", "connection is not rosbag1"));
        };

        let mut header = RecordHeader::new();
        header.set_u32("conn", connection.id as u32);
        header.set_string("topic", &connection.topic);
        header.write(dst, Some(OP_CONNECTION))?;

        let mut data = RecordHeader::new();
        data.set_string("topic", &connection.topic);
        data.set_string("type", &denormalize_msgtype(&connection.msgtype));
        data.set_string("md5sum", md5sum);
        data.set_string("message_definition", msgdef);
        if let Some(callerid) = callerid {
            data.set_string("callerid", callerid);
        }
        data.set_string("latching", &latching.to_string());
        data.write(dst, None)?;
        Ok(())
    }

    /// Flush the open chunk with its index records.
    fn flush_chunk(&mut self) -> Result<()> {
        if self.current.data.is_empty() {
            return Ok(());
        }
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| BagError::corrupt("writer", "bag was not opened"))?;
        let chunk = std::mem::replace(&mut self.current, OpenChunk::new());
        let pos = file.stream_position()?;

        let mut header = RecordHeader::new();
        header.set_string("compression", self.compression.name());
        header.set_u32("size", chunk.data.len() as u32);
        header.write(file, Some(OP_CHUNK))?;

        let compressed = self.compression.compress(&chunk.data)?;
        file.write_u32::<LittleEndian>(compressed.len() as u32)?;
        file.write_all(&compressed)?;

        for (cid, items) in &chunk.connections {
            let mut header = RecordHeader::new();
            header.set_u32("ver", 1);
            header.set_u32("conn", *cid);
            header.set_u32("count", items.len() as u32);
            header.write(file, Some(OP_IDXDATA))?;
            file.write_u32::<LittleEndian>(items.len() as u32 * 12)?;
            for (time, offset) in items {
                file.write_u32::<LittleEndian>((time / NANOS_PER_SEC) as u32)?;
                file.write_u32::<LittleEndian>((time % NANOS_PER_SEC) as u32)?;
                file.write_u32::<LittleEndian>(*offset)?;
            }
        }

        self.finished.push(FinishedChunk {
            pos,
            start: if chunk.start == u64::MAX { 0 } else { chunk.start },
            end: chunk.end,
            connection_counts: chunk
                .connections
                .iter()
                .map(|(cid, items)| (*cid, items.len() as u32))
                .collect(),
        });
        Ok(())
    }

    /// Close the bag: flush open chunks, write the index region, and patch
    /// the bag header.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.flush_chunk()?;

        let file = self
            .file
            .as_mut()
            .ok_or_else(|| BagError::corrupt("writer", "bag was not opened"))?;
        let index_pos = file.stream_position()?;

        for connection in &self.connections {
            Self::write_connection(connection, file)?;
        }

        for chunk in &self.finished {
            let mut header = RecordHeader::new();
            header.set_u32("ver", 1);
            header.set_u64("chunk_pos", chunk.pos);
            header.set_time("start_time", chunk.start);
            header.set_time("end_time", chunk.end);
            header.set_u32("count", chunk.connection_counts.len() as u32);
            header.write(file, Some(OP_CHUNK_INFO))?;
            file.write_u32::<LittleEndian>(chunk.connection_counts.len() as u32 * 8)?;
            for (cid, count) in &chunk.connection_counts {
                file.write_u32::<LittleEndian>(*cid)?;
                file.write_u32::<LittleEndian>(*count)?;
            }
        }

        file.seek(SeekFrom::Start(MAGIC_LEN))?;
        Self::write_bag_header(
            file,
            index_pos,
            self.connections.len() as u32,
            self.finished.len() as u32,
        )?;
        file.flush()?;

        self.file = None;
        self.closed = true;
        debug!(
            path = %self.path.display(),
            connections = self.connections.len(),
            chunks = self.finished.len(),
            "closed rosbag1"
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
        if self.file.is_some() && !self.closed {
            warn!(
                path = %self.path.display(),
                "rosbag1 writer dropped without close; bag is unindexed"
            );
        }
    }
}
