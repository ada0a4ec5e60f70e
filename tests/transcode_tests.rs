// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! ROS1 <-> CDR transcoder integration tests, including the Header seq
//! bridging rule and the commutation laws.

use rosbags::serde::{
    cdr_to_ros1, deserialize_cdr, ros1_to_cdr, serialize_cdr_with, serialize_ros1, Endianness,
};
use rosbags::typesys::{parse_msg, TypeRegistry};
use rosbags::Value;

#[test]
fn test_ros1_definition_with_header_transcodes_to_cdr() {
    // Register a type from its rosbag1 connection definition, then
    // transcode a message whose Header carries seq = 7. The seq must be
    // dropped on the CDR side.
    let registry = TypeRegistry::with_builtins();
    let defs = parse_msg(
        "Header header\nstring data\n===\nMSG: std_msgs/Header\n\
         uint32 seq\ntime stamp\nstring frame_id\n",
        "test_msgs/msg/Chat",
    )
    .unwrap();
    registry.register(defs).unwrap();

    let mut raw = Vec::new();
    raw.extend_from_slice(&7u32.to_le_bytes()); // header.seq
    raw.extend_from_slice(&10i32.to_le_bytes()); // header.stamp.sec
    raw.extend_from_slice(&0u32.to_le_bytes()); // header.stamp.nanosec
    raw.extend_from_slice(&1u32.to_le_bytes()); // header.frame_id length
    raw.push(b'f');
    raw.extend_from_slice(&1u32.to_le_bytes()); // data length
    raw.push(b'x');

    let cdr = ros1_to_cdr(&raw, "test_msgs/msg/Chat", &registry).unwrap();
    let value = deserialize_cdr(&cdr, "test_msgs/msg/Chat", &registry).unwrap();

    let header = value.get("header").unwrap();
    assert!(header.get("seq").is_none());
    assert_eq!(
        header.get("stamp").and_then(|s| s.get("sec")),
        Some(&Value::Int32(10))
    );
    assert_eq!(header.get("frame_id").and_then(Value::as_str), Some("f"));
    assert_eq!(value.get("data").and_then(Value::as_str), Some("x"));
}

#[test]
fn test_cdr_ros1_cdr_commutes() {
    let registry = TypeRegistry::with_builtins();
    let value = Value::from_fields([
        (
            "header",
            Value::from_fields([
                (
                    "stamp",
                    Value::from_fields([("sec", Value::Int32(5)), ("nanosec", Value::UInt32(6))]),
                ),
                ("frame_id", Value::from("imu_link")),
            ]),
        ),
        (
            "orientation",
            Value::from_fields([
                ("x", Value::Float64(0.0)),
                ("y", Value::Float64(0.0)),
                ("z", Value::Float64(0.0)),
                ("w", Value::Float64(1.0)),
            ]),
        ),
        (
            "orientation_covariance",
            Value::Array(vec![Value::Float64(0.1); 9]),
        ),
        (
            "angular_velocity",
            Value::from_fields([
                ("x", Value::Float64(0.1)),
                ("y", Value::Float64(0.2)),
                ("z", Value::Float64(0.3)),
            ]),
        ),
        (
            "angular_velocity_covariance",
            Value::Array(vec![Value::Float64(0.0); 9]),
        ),
        (
            "linear_acceleration",
            Value::from_fields([
                ("x", Value::Float64(9.8)),
                ("y", Value::Float64(0.0)),
                ("z", Value::Float64(0.0)),
            ]),
        ),
        (
            "linear_acceleration_covariance",
            Value::Array(vec![Value::Float64(0.0); 9]),
        ),
    ]);

    let cdr =
        serialize_cdr_with(&value, "sensor_msgs/msg/Imu", Endianness::Little, &registry).unwrap();
    let ros1 = cdr_to_ros1(&cdr, "sensor_msgs/msg/Imu", &registry).unwrap();
    let cdr_again = ros1_to_cdr(&ros1, "sensor_msgs/msg/Imu", &registry).unwrap();
    assert_eq!(cdr, cdr_again);
}

#[test]
fn test_ros1_cdr_ros1_commutes_with_zero_seq() {
    let registry = TypeRegistry::with_builtins();
    let value = Value::from_fields([
        (
            "header",
            Value::from_fields([
                (
                    "stamp",
                    Value::from_fields([("sec", Value::Int32(1)), ("nanosec", Value::UInt32(2))]),
                ),
                ("frame_id", Value::from("map")),
            ]),
        ),
        ("child_frame_id", Value::from("odom")),
        (
            "pose",
            Value::from_fields([
                (
                    "pose",
                    Value::from_fields([
                        (
                            "position",
                            Value::from_fields([
                                ("x", Value::Float64(1.0)),
                                ("y", Value::Float64(2.0)),
                                ("z", Value::Float64(3.0)),
                            ]),
                        ),
                        (
                            "orientation",
                            Value::from_fields([
                                ("x", Value::Float64(0.0)),
                                ("y", Value::Float64(0.0)),
                                ("z", Value::Float64(0.0)),
                                ("w", Value::Float64(1.0)),
                            ]),
                        ),
                    ]),
                ),
                ("covariance", Value::Array(vec![Value::Float64(0.0); 36])),
            ]),
        ),
        (
            "twist",
            Value::from_fields([
                (
                    "twist",
                    Value::from_fields([
                        (
                            "linear",
                            Value::from_fields([
                                ("x", Value::Float64(0.5)),
                                ("y", Value::Float64(0.0)),
                                ("z", Value::Float64(0.0)),
                            ]),
                        ),
                        (
                            "angular",
                            Value::from_fields([
                                ("x", Value::Float64(0.0)),
                                ("y", Value::Float64(0.0)),
                                ("z", Value::Float64(0.1)),
                            ]),
                        ),
                    ]),
                ),
                ("covariance", Value::Array(vec![Value::Float64(0.0); 36])),
            ]),
        ),
    ]);

    // ROS1 bytes with seq == 0, as produced by the typed codec.
    let ros1 = serialize_ros1(&value, "nav_msgs/msg/Odometry", &registry).unwrap();
    let cdr = ros1_to_cdr(&ros1, "nav_msgs/msg/Odometry", &registry).unwrap();
    let ros1_again = cdr_to_ros1(&cdr, "nav_msgs/msg/Odometry", &registry).unwrap();
    assert_eq!(ros1, ros1_again);
}

#[test]
fn test_transcoded_bytes_match_typed_codec() {
    // Transcoding and re-serializing through typed values must agree.
    let registry = TypeRegistry::with_builtins();
    let value = Value::from_fields([
        ("name", Value::from("battery")),
        (
            "values",
            Value::Array(vec![Value::Float32(11.1), Value::Float32(22.2)]),
        ),
    ]);
    let ros1 = serialize_ros1(&value, "sensor_msgs/msg/ChannelFloat32", &registry).unwrap();
    let transcoded = ros1_to_cdr(&ros1, "sensor_msgs/msg/ChannelFloat32", &registry).unwrap();
    let direct = serialize_cdr_with(
        &value,
        "sensor_msgs/msg/ChannelFloat32",
        Endianness::Little,
        &registry,
    )
    .unwrap();
    assert_eq!(transcoded, direct);
}

#[test]
fn test_empty_message_sequence_transcodes() {
    let registry = TypeRegistry::with_builtins();
    // TFMessage with zero transforms: a single zero count on both wires.
    let ros1 = 0u32.to_le_bytes().to_vec();
    let cdr = ros1_to_cdr(&ros1, "tf2_msgs/msg/TFMessage", &registry).unwrap();
    assert_eq!(cdr, vec![0x00, 0x01, 0x00, 0x00, 0, 0, 0, 0]);
    let back = cdr_to_ros1(&cdr, "tf2_msgs/msg/TFMessage", &registry).unwrap();
    assert_eq!(back, ros1);
}

#[test]
fn test_empty_message_sequence_padding_transcodes() {
    // The CDR side pads after the count of an empty sequence of an
    // 8-aligned message type; a trailing low-alignment field must land
    // after that padding in both directions.
    let registry = TypeRegistry::with_builtins();
    let defs = parse_msg(
        "geometry_msgs/Point[] points\nuint8 tail\n",
        "test_msgs/msg/EmptyPoints",
    )
    .unwrap();
    registry.register(defs).unwrap();

    // ROS1 is packed: count 0, then the tail byte.
    let ros1: Vec<u8> = vec![0, 0, 0, 0, 0xCD];
    let cdr = ros1_to_cdr(&ros1, "test_msgs/msg/EmptyPoints", &registry).unwrap();
    // header | count 0 @ 0..4 | pad @ 4..8 | tail @ 8
    assert_eq!(
        cdr,
        vec![0x00, 0x01, 0x00, 0x00, 0, 0, 0, 0, 0, 0, 0, 0, 0xCD]
    );
    let back = cdr_to_ros1(&cdr, "test_msgs/msg/EmptyPoints", &registry).unwrap();
    assert_eq!(back, ros1);
}
