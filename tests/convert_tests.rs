// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Converter integration tests: format upgrades and downgrades, QoS
//! bridging for latched topics, and unknown-type refusal.

use rosbags::convert::convert_with_registry;
use rosbags::serde::{deserialize_cdr, serialize_cdr_with, serialize_ros1, Endianness};
use rosbags::typesys::TypeRegistry;
use rosbags::{rosbag1, rosbag2, BagError, ConnectionExt, Value};

fn string_value(text: &str) -> Value {
    Value::from_fields([("data", Value::from(text))])
}

#[test]
fn test_rosbag1_to_rosbag2() {
    let registry = TypeRegistry::with_builtins();
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("input.bag");
    let dst = dir.path().join("output");

    let mut writer = rosbag1::Writer::new(&src).unwrap();
    writer.open().unwrap();
    let conn = writer
        .add_connection("/chatter", "std_msgs/msg/String", None, None, 0, &registry)
        .unwrap();
    let raw = serialize_ros1(&string_value("hello"), "std_msgs/msg/String", &registry).unwrap();
    writer.write(&conn, 42, &raw).unwrap();
    writer.close().unwrap();

    convert_with_registry(&src, Some(&dst), &registry).unwrap();

    let mut reader = rosbag2::Reader::new(&dst).unwrap();
    reader.open().unwrap();
    assert_eq!(reader.message_count(), 1);
    let conn = &reader.connections()[0];
    assert_eq!(conn.topic, "/chatter");
    assert_eq!(conn.serialization_format(), "cdr");

    let messages: Vec<_> = reader
        .messages(None, None, None)
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(messages[0].1, 42);
    let value = deserialize_cdr(&messages[0].2, "std_msgs/msg/String", &registry).unwrap();
    assert_eq!(value.get("data").and_then(Value::as_str), Some("hello"));
}

#[test]
fn test_latched_topic_maps_to_transient_local() {
    let registry = TypeRegistry::with_builtins();
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("latched.bag");
    let dst = dir.path().join("latched");

    let mut writer = rosbag1::Writer::new(&src).unwrap();
    writer.open().unwrap();
    let conn = writer
        .add_connection(
            "/tf_static",
            "tf2_msgs/msg/TFMessage",
            None,
            None,
            1,
            &registry,
        )
        .unwrap();
    // Empty TFMessage: just the transforms count.
    writer.write(&conn, 5, &0u32.to_le_bytes()).unwrap();
    writer.close().unwrap();

    convert_with_registry(&src, Some(&dst), &registry).unwrap();

    let reader = rosbag2::Reader::new(&dst).unwrap();
    let conn = &reader.connections()[0];
    assert_eq!(conn.topic, "/tf_static");
    match &conn.ext {
        ConnectionExt::Rosbag2 {
            offered_qos_profiles,
            ..
        } => {
            // durability 1 is transient-local.
            assert!(offered_qos_profiles.contains("durability: 1"));
        }
        other => panic!("unexpected ext {other:?}"),
    }
    assert!(conn.is_latching());
}

#[test]
fn test_rosbag2_to_rosbag1() {
    let registry = TypeRegistry::with_builtins();
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("source");
    let dst = dir.path().join("target.bag");

    let mut writer = rosbag2::Writer::new(&src).unwrap();
    writer.open().unwrap();
    let conn = writer
        .add_connection("/chatter", "std_msgs/msg/String", "cdr", "")
        .unwrap();
    let cdr = serialize_cdr_with(
        &string_value("downgrade"),
        "std_msgs/msg/String",
        Endianness::Little,
        &registry,
    )
    .unwrap();
    writer.write(&conn, 77, &cdr).unwrap();
    writer.close().unwrap();

    convert_with_registry(&src, Some(&dst), &registry).unwrap();

    let mut reader = rosbag1::Reader::open(&dst).unwrap();
    let conn = reader.connections().next().unwrap().clone();
    assert_eq!(conn.serialization_format(), "ros1");
    match &conn.ext {
        ConnectionExt::Rosbag1 { md5sum, msgdef, .. } => {
            assert_eq!(md5sum, "992ce8a1687cec8c8bd883ec73ca41d1");
            assert_eq!(msgdef, "string data\n");
        }
        other => panic!("unexpected ext {other:?}"),
    }

    let messages: Vec<_> = reader
        .messages(None, None, None)
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].1, 77);
    let expected =
        serialize_ros1(&string_value("downgrade"), "std_msgs/msg/String", &registry).unwrap();
    assert_eq!(messages[0].2, expected);
}

#[test]
fn test_full_roundtrip_preserves_payload() {
    let registry = TypeRegistry::with_builtins();
    let dir = tempfile::tempdir().unwrap();
    let original = dir.path().join("original.bag");
    let upgraded = dir.path().join("upgraded");
    let downgraded = dir.path().join("downgraded.bag");

    let mut writer = rosbag1::Writer::new(&original).unwrap();
    writer.open().unwrap();
    let conn = writer
        .add_connection("/chatter", "std_msgs/msg/String", None, None, 0, &registry)
        .unwrap();
    let mut raws = Vec::new();
    for step in 0u64..4 {
        let raw = serialize_ros1(
            &string_value(&format!("round {step}")),
            "std_msgs/msg/String",
            &registry,
        )
        .unwrap();
        writer.write(&conn, 100 + step, &raw).unwrap();
        raws.push(raw);
    }
    writer.close().unwrap();

    convert_with_registry(&original, Some(&upgraded), &registry).unwrap();
    convert_with_registry(&upgraded, Some(&downgraded), &registry).unwrap();

    let mut reader = rosbag1::Reader::open(&downgraded).unwrap();
    let messages: Vec<_> = reader
        .messages(None, None, None)
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(messages.len(), raws.len());
    for ((_, timestamp, data), (step, raw)) in messages.iter().zip(raws.iter().enumerate()) {
        assert_eq!(*timestamp, 100 + step as u64);
        assert_eq!(data, raw);
    }
}

#[test]
fn test_unknown_type_refused_on_downgrade() {
    let registry = TypeRegistry::with_builtins();
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("mystery");
    let dst = dir.path().join("mystery.bag");

    let mut writer = rosbag2::Writer::new(&src).unwrap();
    writer.open().unwrap();
    let conn = writer
        .add_connection("/mystery", "vendor_msgs/msg/Mystery", "cdr", "")
        .unwrap();
    writer.write(&conn, 1, &[0x00, 0x01, 0x00, 0x00]).unwrap();
    writer.close().unwrap();

    let err = convert_with_registry(&src, Some(&dst), &registry).unwrap_err();
    assert!(matches!(err, BagError::UnknownType { .. }));
}

#[test]
fn test_types_autoregistered_from_rosbag1_definitions() {
    // A custom type only defined inside the bag's connection record must be
    // registered during conversion.
    let registry = TypeRegistry::with_builtins();
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("custom.bag");
    let dst = dir.path().join("custom");

    let msgdef = "float32 voltage\nuint8[] cells\n".to_string();
    // ROS1 md5 over the two field lines.
    let md5sum = format!("{:x}", md5::compute(b"float32 voltage\nuint8[] cells"));

    let mut writer = rosbag1::Writer::new(&src).unwrap();
    writer.open().unwrap();
    let conn = writer
        .add_connection(
            "/battery",
            "vendor_msgs/msg/Battery",
            Some((msgdef, md5sum)),
            None,
            0,
            &registry,
        )
        .unwrap();
    let mut raw = Vec::new();
    raw.extend_from_slice(&12.5f32.to_le_bytes());
    raw.extend_from_slice(&2u32.to_le_bytes());
    raw.extend_from_slice(&[3, 4]);
    writer.write(&conn, 11, &raw).unwrap();
    writer.close().unwrap();

    convert_with_registry(&src, Some(&dst), &registry).unwrap();
    assert!(registry.contains("vendor_msgs/msg/Battery"));

    let mut reader = rosbag2::Reader::new(&dst).unwrap();
    reader.open().unwrap();
    let messages: Vec<_> = reader
        .messages(None, None, None)
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    let value = deserialize_cdr(&messages[0].2, "vendor_msgs/msg/Battery", &registry).unwrap();
    assert_eq!(value.get("voltage"), Some(&Value::Float32(12.5)));
    assert_eq!(
        value.get("cells"),
        Some(&Value::Array(vec![Value::UInt8(3), Value::UInt8(4)]))
    );
}
