// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! `metadata.yaml` document model for rosbag2 directories.
//!
//! Versions 1 through 5 are accepted. Time bounds are always reported;
//! empty bags default to 0/0.

use std::path::Path;

use ::serde::{Deserialize, Serialize};

use crate::core::error::{BagError, Result};

/// Top-level metadata document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BagMetadata {
    /// The single document key used by rosbag2.
    pub rosbag2_bagfile_information: BagInfo,
}

/// Bag-wide information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BagInfo {
    /// Metadata format version.
    pub version: u32,
    /// Storage plugin identifier; only `sqlite3` is supported.
    pub storage_identifier: String,
    /// Paths of the storage files, relative to the bag directory.
    pub relative_file_paths: Vec<String>,
    /// Bag duration.
    #[serde(default)]
    pub duration: DurationField,
    /// Timestamp of the earliest message.
    #[serde(default)]
    pub starting_time: StartingTimeField,
    /// Total message count.
    pub message_count: u64,
    /// Topics with their per-topic counts.
    pub topics_with_message_count: Vec<TopicWithCount>,
    /// `zstd` or empty for none.
    #[serde(default)]
    pub compression_format: String,
    /// `file`, `message`, or empty for none.
    #[serde(default)]
    pub compression_mode: String,
    /// Per-file details, present from version 5 on.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<FileInfo>,
}

/// Duration wrapper used by the document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DurationField {
    /// Span in nanoseconds.
    pub nanoseconds: u64,
}

/// Starting time wrapper used by the document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StartingTimeField {
    /// Nanoseconds since the Unix epoch.
    pub nanoseconds_since_epoch: u64,
}

/// Topic entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicWithCount {
    /// Topic metadata.
    pub topic_metadata: TopicMetadata,
    /// Message count for this topic.
    pub message_count: u64,
}

/// Per-topic metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicMetadata {
    /// Topic name.
    pub name: String,
    /// Message type name.
    #[serde(rename = "type")]
    pub msgtype: String,
    /// Serialization format; only `cdr` is supported.
    pub serialization_format: String,
    /// YAML list of offered QoS profiles.
    #[serde(default)]
    pub offered_qos_profiles: String,
}

/// Per-file entry (version 5).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileInfo {
    /// File path relative to the bag directory.
    pub path: String,
    /// Starting time of this file.
    pub starting_time: StartingTimeField,
    /// Duration of this file.
    pub duration: DurationField,
    /// Message count in this file.
    pub message_count: u64,
}

/// Latest metadata version accepted by the reader.
pub const MAX_VERSION: u32 = 5;

/// Metadata version emitted by the writer.
pub const WRITE_VERSION: u32 = 4;

impl BagMetadata {
    /// Load and validate a `metadata.yaml` file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|err| {
            BagError::metadata(format!("could not read {}: {err}", path.display()))
        })?;
        let metadata: BagMetadata = serde_yaml::from_str(&text)
            .map_err(|err| BagError::metadata(format!("could not parse YAML: {err}")))?;
        metadata.validate()?;
        Ok(metadata)
    }

    /// Validate version, storage, serialization, and compression settings.
    pub fn validate(&self) -> Result<()> {
        let info = &self.rosbag2_bagfile_information;
        if info.version > MAX_VERSION {
            return Err(BagError::VersionUnsupported {
                version: info.version,
            });
        }
        if info.storage_identifier != "sqlite3" {
            return Err(BagError::metadata(format!(
                "storage plugin {:?} is not supported",
                info.storage_identifier
            )));
        }
        for topic in &info.topics_with_message_count {
            if topic.topic_metadata.serialization_format != "cdr" {
                return Err(BagError::metadata(format!(
                    "serialization format {:?} is not supported",
                    topic.topic_metadata.serialization_format
                )));
            }
        }
        match self.compression_mode() {
            None | Some("file") | Some("message") => {}
            Some(other) => {
                return Err(BagError::metadata(format!(
                    "compression mode {other:?} is not supported"
                )));
            }
        }
        if self.compression_mode().is_some() && info.compression_format != "zstd" {
            return Err(BagError::metadata(format!(
                "compression format {:?} is not supported",
                info.compression_format
            )));
        }
        Ok(())
    }

    /// Bag info shorthand.
    pub fn info(&self) -> &BagInfo {
        &self.rosbag2_bagfile_information
    }

    /// Effective compression mode, lowercased; `None` when disabled.
    pub fn compression_mode(&self) -> Option<&str> {
        match self
            .rosbag2_bagfile_information
            .compression_mode
            .to_lowercase()
            .as_str()
        {
            "" | "none" => None,
            "file" => Some("file"),
            "message" => Some("message"),
            _ => Some("unsupported"),
        }
    }

    /// Timestamp of the earliest message, 0 for empty bags.
    pub fn start_time(&self) -> u64 {
        if self.info().message_count == 0 {
            0
        } else {
            self.info().starting_time.nanoseconds_since_epoch
        }
    }

    /// `start_time + duration`, 0 for empty bags.
    pub fn end_time(&self) -> u64 {
        if self.info().message_count == 0 {
            0
        } else {
            self.start_time() + self.info().duration.nanoseconds
        }
    }
}
