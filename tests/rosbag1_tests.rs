// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! rosbag1 container integration tests: write/read round-trips, chunking,
//! compression, filtering, and refusal of unindexed files.

use std::io::Write as _;

use rosbags::rosbag1::record::{RecordHeader, OP_BAGHEADER};
use rosbags::rosbag1::{ChunkCompression, Reader, Writer};
use rosbags::serde::serialize_ros1;
use rosbags::typesys::TypeRegistry;
use rosbags::{BagError, Value};

fn string_message(text: &str, registry: &TypeRegistry) -> Vec<u8> {
    let value = Value::from_fields([("data", Value::from(text))]);
    serialize_ros1(&value, "std_msgs/msg/String", registry).unwrap()
}

fn write_sample_bag(
    path: &std::path::Path,
    compression: ChunkCompression,
    chunk_threshold: Option<usize>,
) -> Vec<(String, u64, Vec<u8>)> {
    let registry = TypeRegistry::with_builtins();
    let mut writer = Writer::new(path).unwrap();
    writer.set_compression(compression).unwrap();
    if let Some(threshold) = chunk_threshold {
        writer.set_chunk_threshold(threshold);
    }
    writer.open().unwrap();

    let chatter = writer
        .add_connection("/chatter", "std_msgs/msg/String", None, None, 0, &registry)
        .unwrap();
    let status = writer
        .add_connection("/status", "std_msgs/msg/String", None, None, 1, &registry)
        .unwrap();

    let mut written = Vec::new();
    for step in 0u64..10 {
        let timestamp = 1_000_000_000 + step * 100;
        let (conn, topic) = if step % 2 == 0 {
            (&chatter, "/chatter")
        } else {
            (&status, "/status")
        };
        let data = string_message(&format!("message {step}"), &registry);
        writer.write(conn, timestamp, &data).unwrap();
        written.push((topic.to_string(), timestamp, data));
    }
    writer.close().unwrap();
    written
}

#[test]
fn test_write_read_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sample.bag");
    let written = write_sample_bag(&path, ChunkCompression::None, None);

    let mut reader = Reader::open(&path).unwrap();
    assert_eq!(reader.message_count(), 10);
    assert_eq!(reader.topics().len(), 2);
    assert_eq!(reader.start_time(), 1_000_000_000);
    assert_eq!(reader.end_time(), 1_000_000_901);

    let messages: Vec<_> = reader
        .messages(None, None, None)
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(messages.len(), written.len());
    for ((conn, timestamp, data), (topic, wts, wdata)) in messages.iter().zip(&written) {
        assert_eq!(&conn.topic, topic);
        assert_eq!(timestamp, wts);
        assert_eq!(data, wdata);
    }
    // Non-decreasing timestamps.
    for pair in messages.windows(2) {
        assert!(pair[0].1 <= pair[1].1);
    }
}

#[test]
fn test_multiple_chunks_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chunked.bag");
    // Tiny budget forces a chunk per message.
    let written = write_sample_bag(&path, ChunkCompression::None, Some(16));

    let mut reader = Reader::open(&path).unwrap();
    let messages: Vec<_> = reader
        .messages(None, None, None)
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(messages.len(), written.len());
    for ((_, timestamp, data), (_, wts, wdata)) in messages.iter().zip(&written) {
        assert_eq!(timestamp, wts);
        assert_eq!(data, wdata);
    }
}

#[test]
fn test_compressed_chunks_roundtrip() {
    for compression in [ChunkCompression::Bz2, ChunkCompression::Lz4] {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("compressed.bag");
        let written = write_sample_bag(&path, compression, Some(64));

        let mut reader = Reader::open(&path).unwrap();
        let messages: Vec<_> = reader
            .messages(None, None, None)
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(messages.len(), written.len(), "{compression:?}");
        for ((_, _, data), (_, _, wdata)) in messages.iter().zip(&written) {
            assert_eq!(data, wdata, "{compression:?}");
        }
    }
}

#[test]
fn test_topic_filter() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("filter.bag");
    write_sample_bag(&path, ChunkCompression::None, None);

    let mut reader = Reader::open(&path).unwrap();
    let messages: Vec<_> = reader
        .messages(Some(&["/status"]), None, None)
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(messages.len(), 5);
    assert!(messages.iter().all(|(conn, _, _)| conn.topic == "/status"));
}

#[test]
fn test_half_open_time_range() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("range.bag");
    write_sample_bag(&path, ChunkCompression::None, None);

    let start = 1_000_000_200;
    let stop = 1_000_000_500;
    let mut reader = Reader::open(&path).unwrap();
    let messages: Vec<_> = reader
        .messages(None, Some(start), Some(stop))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(messages.len(), 3);
    assert!(messages.iter().all(|(_, ts, _)| *ts >= start && *ts < stop));
    // Never yields a record with timestamp == stop.
    assert!(messages.iter().all(|(_, ts, _)| *ts != stop));
}

#[test]
fn test_unindexed_bag_refused() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("unindexed.bag");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(b"#ROSBAG V2.0\n").unwrap();
    let mut header = RecordHeader::new();
    header.set_u64("index_pos", 0);
    header.set_u32("conn_count", 0);
    header.set_u32("chunk_count", 0);
    header.write(&mut file, Some(OP_BAGHEADER)).unwrap();

    let err = Reader::open(&path).unwrap_err();
    assert!(matches!(err, BagError::Unindexed));
}

#[test]
fn test_invalid_magic_refused() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("garbage.bag");
    std::fs::write(&path, b"not a rosbag\n").unwrap();
    let err = Reader::open(&path).unwrap_err();
    assert!(matches!(err, BagError::CorruptRecord { .. }));
}

#[test]
fn test_connection_metadata_survives_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("meta.bag");
    write_sample_bag(&path, ChunkCompression::None, None);

    let reader = Reader::open(&path).unwrap();
    let status = reader
        .connections()
        .find(|conn| conn.topic == "/status")
        .unwrap();
    assert_eq!(status.msgtype, "std_msgs/msg/String");
    assert!(status.is_latching());
    match &status.ext {
        rosbags::ConnectionExt::Rosbag1 { md5sum, msgdef, .. } => {
            assert_eq!(md5sum, "992ce8a1687cec8c8bd883ec73ca41d1");
            assert_eq!(msgdef, "string data\n");
        }
        other => panic!("unexpected ext {other:?}"),
    }
}
