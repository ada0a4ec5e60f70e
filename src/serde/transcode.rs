// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Byte-level conversion between the ROS1 wire format and CDR.
//!
//! The transcoders walk the field tree with an input and an output cursor
//! and never build a typed value. Primitives are copied through typed
//! reads/writes so a big-endian CDR input lands as little-endian output.
//!
//! Header bridging: `std_msgs/msg/Header` carries a `uint32 seq` only on
//! the ROS1 wire. ROS1→CDR reads and discards it; CDR→ROS1 emits a zero.

use crate::core::error::{BagError, Result};
use crate::typesys::ast::{BaseType, FieldType, MsgDef};
use crate::typesys::registry::TypeRegistry;

use super::cursor::{ReadCursor, WriteCursor};
use super::head_alignment;

const HEADER_TYPE: &str = "std_msgs/msg/Header";

/// Convert a serialized ROS1 message directly to little-endian CDR.
pub fn ros1_to_cdr(raw: &[u8], typename: &str, registry: &TypeRegistry) -> Result<Vec<u8>> {
    let def = registry.lookup(typename)?;
    let mut input = ReadCursor::new_ros1(raw);
    let mut output = WriteCursor::new_cdr(true);
    walk_to_cdr(&mut input, &mut output, &def, registry)?;
    if input.remaining() > 0 {
        return Err(BagError::ExcessBytes {
            remaining: input.remaining(),
        });
    }
    Ok(output.into_bytes())
}

/// Convert a serialized CDR message directly to the ROS1 wire format.
pub fn cdr_to_ros1(raw: &[u8], typename: &str, registry: &TypeRegistry) -> Result<Vec<u8>> {
    let def = registry.lookup(typename)?;
    let mut input = ReadCursor::new_cdr(raw)?;
    let mut output = WriteCursor::new_ros1();
    walk_to_ros1(&mut input, &mut output, &def, registry)?;
    if input.remaining() > 3 {
        return Err(BagError::ExcessBytes {
            remaining: input.remaining(),
        });
    }
    Ok(output.into_bytes())
}

fn walk_to_cdr(
    input: &mut ReadCursor<'_>,
    output: &mut WriteCursor,
    def: &MsgDef,
    registry: &TypeRegistry,
) -> Result<()> {
    if def.name == HEADER_TYPE {
        input.skip(4)?;
    }
    for field in &def.fields {
        field_to_cdr(input, output, &field.ty, registry)?;
    }
    Ok(())
}

fn field_to_cdr(
    input: &mut ReadCursor<'_>,
    output: &mut WriteCursor,
    ty: &FieldType,
    registry: &TypeRegistry,
) -> Result<()> {
    match ty {
        FieldType::Base(BaseType::String) => {
            let length = input.read_length()?;
            let bytes = input.read_bytes(length)?.to_vec();
            output.write_u32(length as u32 + 1);
            output.write_bytes(&bytes);
            output.write_u8(0);
            Ok(())
        }
        FieldType::Base(base) => copy_base(input, output, *base),
        FieldType::Message(name) => {
            let def = registry.lookup(name)?;
            walk_to_cdr(input, output, &def, registry)
        }
        FieldType::Array(elem, len) => {
            for _ in 0..*len {
                field_to_cdr(input, output, elem, registry)?;
            }
            Ok(())
        }
        FieldType::Sequence(elem, _) => {
            let count = input.read_u32()? as usize;
            check_sequence(count, elem, input)?;
            output.write_u32(count as u32);
            output.align(head_alignment(elem, registry)?);
            for _ in 0..count {
                field_to_cdr(input, output, elem, registry)?;
            }
            Ok(())
        }
    }
}

fn walk_to_ros1(
    input: &mut ReadCursor<'_>,
    output: &mut WriteCursor,
    def: &MsgDef,
    registry: &TypeRegistry,
) -> Result<()> {
    if def.name == HEADER_TYPE {
        output.write_u32(0);
    }
    for field in &def.fields {
        field_to_ros1(input, output, &field.ty, registry)?;
    }
    Ok(())
}

fn field_to_ros1(
    input: &mut ReadCursor<'_>,
    output: &mut WriteCursor,
    ty: &FieldType,
    registry: &TypeRegistry,
) -> Result<()> {
    match ty {
        FieldType::Base(BaseType::String) => {
            let length = input.read_length()?;
            if length == 0 {
                output.write_u32(0);
                return Ok(());
            }
            let bytes = input.read_bytes(length)?;
            output.write_u32(length as u32 - 1);
            let body = bytes[..length - 1].to_vec();
            output.write_bytes(&body);
            Ok(())
        }
        FieldType::Base(base) => copy_base(input, output, *base),
        FieldType::Message(name) => {
            let def = registry.lookup(name)?;
            walk_to_ros1(input, output, &def, registry)
        }
        FieldType::Array(elem, len) => {
            for _ in 0..*len {
                field_to_ros1(input, output, elem, registry)?;
            }
            Ok(())
        }
        FieldType::Sequence(elem, _) => {
            let count = input.read_u32()? as usize;
            input.align(head_alignment(elem, registry)?)?;
            check_sequence(count, elem, input)?;
            output.write_u32(count as u32);
            for _ in 0..count {
                field_to_ros1(input, output, elem, registry)?;
            }
            Ok(())
        }
    }
}

fn check_sequence(count: usize, elem: &FieldType, input: &ReadCursor<'_>) -> Result<()> {
    if let FieldType::Base(base) = elem {
        if let Some(size) = base.size() {
            let needed = count
                .checked_mul(size)
                .ok_or_else(|| BagError::bad_length(count, input.remaining()))?;
            if needed > input.remaining() {
                return Err(BagError::bad_length(count, input.remaining()));
            }
        }
    }
    Ok(())
}

fn copy_base(
    input: &mut ReadCursor<'_>,
    output: &mut WriteCursor,
    base: BaseType,
) -> Result<()> {
    match base {
        BaseType::Bool | BaseType::UInt8 => output.write_u8(input.read_u8()?),
        BaseType::Int8 => output.write_i8(input.read_i8()?),
        BaseType::Int16 => output.write_i16(input.read_i16()?),
        BaseType::UInt16 => output.write_u16(input.read_u16()?),
        BaseType::Int32 => output.write_i32(input.read_i32()?),
        BaseType::UInt32 => output.write_u32(input.read_u32()?),
        BaseType::Int64 => output.write_i64(input.read_i64()?),
        BaseType::UInt64 => output.write_u64(input.read_u64()?),
        BaseType::Float32 => output.write_f32(input.read_f32()?),
        BaseType::Float64 => output.write_f64(input.read_f64()?),
        BaseType::String => unreachable!("strings handled by the callers"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::value::Value;
    use crate::serde::cdr::{deserialize_cdr, serialize_cdr_with};
    use crate::serde::ros1::serialize_ros1;
    use crate::serde::Endianness;
    use crate::typesys::registry::TypeRegistry;

    #[test]
    fn test_ros1_to_cdr_drops_header_seq() {
        let registry = TypeRegistry::with_builtins();
        // ROS1 Header bytes with seq = 7.
        let mut raw = Vec::new();
        raw.extend_from_slice(&7u32.to_le_bytes()); // seq
        raw.extend_from_slice(&10i32.to_le_bytes()); // stamp.sec
        raw.extend_from_slice(&0u32.to_le_bytes()); // stamp.nanosec
        raw.extend_from_slice(&1u32.to_le_bytes()); // frame_id length
        raw.push(b'f');

        let cdr = ros1_to_cdr(&raw, "std_msgs/msg/Header", &registry).unwrap();
        let value = deserialize_cdr(&cdr, "std_msgs/msg/Header", &registry).unwrap();
        assert_eq!(
            value.get("stamp").and_then(|s| s.get("sec")),
            Some(&Value::Int32(10))
        );
        assert_eq!(
            value.get("frame_id").and_then(Value::as_str),
            Some("f")
        );
    }

    #[test]
    fn test_cdr_to_ros1_injects_zero_seq() {
        let registry = TypeRegistry::with_builtins();
        let value = Value::from_fields([
            (
                "stamp",
                Value::from_fields([("sec", Value::Int32(1)), ("nanosec", Value::UInt32(2))]),
            ),
            ("frame_id", Value::from("map")),
        ]);
        let cdr =
            serialize_cdr_with(&value, "std_msgs/msg/Header", Endianness::Little, &registry)
                .unwrap();
        let ros1 = cdr_to_ros1(&cdr, "std_msgs/msg/Header", &registry).unwrap();
        assert_eq!(&ros1[..4], &[0, 0, 0, 0]);
        assert_eq!(ros1, serialize_ros1(&value, "std_msgs/msg/Header", &registry).unwrap());
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
                        Value::from_fields([
                            ("sec", Value::Int32(3)),
                            ("nanosec", Value::UInt32(4)),
                        ]),
                    ),
                    ("frame_id", Value::from("laser")),
                ]),
            ),
            ("angle_min", Value::Float32(-1.5)),
            ("angle_max", Value::Float32(1.5)),
            ("angle_increment", Value::Float32(0.01)),
            ("time_increment", Value::Float32(0.0)),
            ("scan_time", Value::Float32(0.1)),
            ("range_min", Value::Float32(0.2)),
            ("range_max", Value::Float32(30.0)),
            (
                "ranges",
                Value::Array(vec![Value::Float32(1.0), Value::Float32(2.0)]),
            ),
            ("intensities", Value::Array(vec![])),
        ]);
        let cdr = serialize_cdr_with(
            &value,
            "sensor_msgs/msg/LaserScan",
            Endianness::Little,
            &registry,
        )
        .unwrap();
        let ros1 = cdr_to_ros1(&cdr, "sensor_msgs/msg/LaserScan", &registry).unwrap();
        let cdr_again = ros1_to_cdr(&ros1, "sensor_msgs/msg/LaserScan", &registry).unwrap();
        assert_eq!(cdr, cdr_again);
    }

    #[test]
    fn test_ros1_cdr_ros1_commutes_with_zero_seq() {
        let registry = TypeRegistry::with_builtins();
        let value = Value::from_fields([
            (
                "stamp",
                Value::from_fields([("sec", Value::Int32(9)), ("nanosec", Value::UInt32(8))]),
            ),
            ("frame_id", Value::from("x")),
        ]);
        let ros1 = serialize_ros1(&value, "std_msgs/msg/Header", &registry).unwrap();
        let cdr = ros1_to_cdr(&ros1, "std_msgs/msg/Header", &registry).unwrap();
        let ros1_again = cdr_to_ros1(&cdr, "std_msgs/msg/Header", &registry).unwrap();
        assert_eq!(ros1, ros1_again);
    }

    #[test]
    fn test_big_endian_cdr_input_lands_little_endian() {
        let registry = TypeRegistry::with_builtins();
        let value = Value::from_fields([("data", Value::UInt32(0x01020304))]);
        let cdr_be =
            serialize_cdr_with(&value, "std_msgs/msg/UInt32", Endianness::Big, &registry)
                .unwrap();
        let ros1 = cdr_to_ros1(&cdr_be, "std_msgs/msg/UInt32", &registry).unwrap();
        assert_eq!(ros1, vec![0x04, 0x03, 0x02, 0x01]);
    }

    #[test]
    fn test_excess_input_rejected() {
        let registry = TypeRegistry::with_builtins();
        let mut raw = Vec::new();
        raw.extend_from_slice(&1u32.to_le_bytes());
        raw.push(b'x');
        raw.push(0xFF); // junk
        let err = ros1_to_cdr(&raw, "std_msgs/msg/String", &registry).unwrap_err();
        assert!(matches!(err, BagError::ExcessBytes { .. }));
    }
}
