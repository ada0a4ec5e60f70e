// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! ROS1 wire codec.
//!
//! The legacy format is little-endian and packed: no encapsulation header,
//! no alignment, strings length-prefixed without a trailing NUL. Message
//! definitions are looked up under their ROS2 names; `std_msgs/msg/Header`
//! carries an extra `uint32 seq` on the ROS1 wire that is synthesized as
//! zero on write and skipped on read.

use crate::core::error::{BagError, Result};
use crate::core::value::Value;
use crate::typesys::ast::{BaseType, FieldType, MsgDef};
use crate::typesys::registry::TypeRegistry;

use super::cursor::{ReadCursor, WriteCursor};

const HEADER_TYPE: &str = "std_msgs/msg/Header";

/// Serialize a message value to the ROS1 wire format.
pub fn serialize_ros1(value: &Value, typename: &str, registry: &TypeRegistry) -> Result<Vec<u8>> {
    let def = registry.lookup(typename)?;
    let mut cursor = WriteCursor::new_ros1();
    write_message(&mut cursor, value, &def, registry, typename)?;
    Ok(cursor.into_bytes())
}

/// Deserialize a ROS1 wire message. The format has no padding, so any
/// trailing byte is excess.
pub fn deserialize_ros1(data: &[u8], typename: &str, registry: &TypeRegistry) -> Result<Value> {
    let def = registry.lookup(typename)?;
    let mut cursor = ReadCursor::new_ros1(data);
    let value = read_message(&mut cursor, &def, registry)?;
    if cursor.remaining() > 0 {
        return Err(BagError::ExcessBytes {
            remaining: cursor.remaining(),
        });
    }
    Ok(value)
}

fn write_message(
    cursor: &mut WriteCursor,
    value: &Value,
    def: &MsgDef,
    registry: &TypeRegistry,
    path: &str,
) -> Result<()> {
    let Value::Struct(fields) = value else {
        return Err(BagError::value_mismatch(path, format!("struct {}", def.name)));
    };
    if def.name == HEADER_TYPE {
        cursor.write_u32(0);
    }
    for field in &def.fields {
        let fpath = format!("{path}.{}", field.name);
        let fval = fields
            .get(&field.name)
            .ok_or_else(|| BagError::value_mismatch(&fpath, "present field"))?;
        write_field(cursor, fval, &field.ty, registry, &fpath)?;
    }
    Ok(())
}

fn write_field(
    cursor: &mut WriteCursor,
    value: &Value,
    ty: &FieldType,
    registry: &TypeRegistry,
    path: &str,
) -> Result<()> {
    match ty {
        FieldType::Base(base) => write_base(cursor, value, *base, path),
        FieldType::Message(name) => {
            let def = registry.lookup(name)?;
            write_message(cursor, value, &def, registry, path)
        }
        FieldType::Array(elem, len) => {
            let items = value
                .as_array()
                .ok_or_else(|| BagError::value_mismatch(path, "array"))?;
            if items.len() != *len {
                return Err(BagError::value_mismatch(path, format!("array of {len}")));
            }
            for item in items {
                write_field(cursor, item, elem, registry, path)?;
            }
            Ok(())
        }
        FieldType::Sequence(elem, _) => {
            let items = value
                .as_array()
                .ok_or_else(|| BagError::value_mismatch(path, "array"))?;
            cursor.write_u32(items.len() as u32);
            for item in items {
                write_field(cursor, item, elem, registry, path)?;
            }
            Ok(())
        }
    }
}

fn write_base(cursor: &mut WriteCursor, value: &Value, base: BaseType, path: &str) -> Result<()> {
    match (base, value) {
        (BaseType::Bool, Value::Bool(v)) => cursor.write_u8(u8::from(*v)),
        (BaseType::Int8, Value::Int8(v)) => cursor.write_i8(*v),
        (BaseType::Int16, Value::Int16(v)) => cursor.write_i16(*v),
        (BaseType::Int32, Value::Int32(v)) => cursor.write_i32(*v),
        (BaseType::Int64, Value::Int64(v)) => cursor.write_i64(*v),
        (BaseType::UInt8, Value::UInt8(v)) => cursor.write_u8(*v),
        (BaseType::UInt16, Value::UInt16(v)) => cursor.write_u16(*v),
        (BaseType::UInt32, Value::UInt32(v)) => cursor.write_u32(*v),
        (BaseType::UInt64, Value::UInt64(v)) => cursor.write_u64(*v),
        (BaseType::Float32, Value::Float32(v)) => cursor.write_f32(*v),
        (BaseType::Float64, Value::Float64(v)) => cursor.write_f64(*v),
        (BaseType::String, Value::String(v)) => {
            let bytes = v.as_bytes();
            cursor.write_u32(bytes.len() as u32);
            cursor.write_bytes(bytes);
        }
        _ => return Err(BagError::value_mismatch(path, base.name())),
    }
    Ok(())
}

fn read_message(
    cursor: &mut ReadCursor<'_>,
    def: &MsgDef,
    registry: &TypeRegistry,
) -> Result<Value> {
    if def.name == HEADER_TYPE {
        cursor.skip(4)?;
    }
    let mut fields = std::collections::HashMap::with_capacity(def.fields.len());
    for field in &def.fields {
        let value = read_field(cursor, &field.ty, registry)?;
        fields.insert(field.name.clone(), value);
    }
    Ok(Value::Struct(fields))
}

fn read_field(
    cursor: &mut ReadCursor<'_>,
    ty: &FieldType,
    registry: &TypeRegistry,
) -> Result<Value> {
    match ty {
        FieldType::Base(base) => read_base(cursor, *base),
        FieldType::Message(name) => {
            let def = registry.lookup(name)?;
            read_message(cursor, &def, registry)
        }
        FieldType::Array(elem, len) => {
            let mut items = Vec::with_capacity((*len).min(1024));
            for _ in 0..*len {
                items.push(read_field(cursor, elem, registry)?);
            }
            Ok(Value::Array(items))
        }
        FieldType::Sequence(elem, _) => {
            let count = cursor.read_u32()? as usize;
            if let FieldType::Base(base) = elem.as_ref() {
                if let Some(size) = base.size() {
                    let needed = count
                        .checked_mul(size)
                        .ok_or_else(|| BagError::bad_length(count, cursor.remaining()))?;
                    if needed > cursor.remaining() {
                        return Err(BagError::bad_length(count, cursor.remaining()));
                    }
                }
            }
            let mut items = Vec::with_capacity(count.min(1024));
            for _ in 0..count {
                items.push(read_field(cursor, elem, registry)?);
            }
            Ok(Value::Array(items))
        }
    }
}

fn read_base(cursor: &mut ReadCursor<'_>, base: BaseType) -> Result<Value> {
    Ok(match base {
        BaseType::Bool => Value::Bool(cursor.read_u8()? != 0),
        BaseType::Int8 => Value::Int8(cursor.read_i8()?),
        BaseType::Int16 => Value::Int16(cursor.read_i16()?),
        BaseType::Int32 => Value::Int32(cursor.read_i32()?),
        BaseType::Int64 => Value::Int64(cursor.read_i64()?),
        BaseType::UInt8 => Value::UInt8(cursor.read_u8()?),
        BaseType::UInt16 => Value::UInt16(cursor.read_u16()?),
        BaseType::UInt32 => Value::UInt32(cursor.read_u32()?),
        BaseType::UInt64 => Value::UInt64(cursor.read_u64()?),
        BaseType::Float32 => Value::Float32(cursor.read_f32()?),
        BaseType::Float64 => Value::Float64(cursor.read_f64()?),
        BaseType::String => {
            let length = cursor.read_length()?;
            let bytes = cursor.read_bytes(length)?;
            let text = std::str::from_utf8(bytes)
                .map_err(|_| BagError::value_mismatch("string", "valid UTF-8"))?;
            Value::String(text.to_string())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typesys::registry::TypeRegistry;

    #[test]
    fn test_string_is_packed_without_nul() {
        let registry = TypeRegistry::with_builtins();
        let value = Value::from_fields([("data", Value::from("hi"))]);
        let bytes = serialize_ros1(&value, "std_msgs/msg/String", &registry).unwrap();
        assert_eq!(bytes, vec![0x02, 0x00, 0x00, 0x00, 0x68, 0x69]);
    }

    #[test]
    fn test_no_alignment_padding() {
        let registry = TypeRegistry::with_builtins();
        let defs = crate::typesys::msg::parse_msg(
            "uint8 a\nfloat64 b\n",
            "test_msgs/msg/PackedRos1",
        )
        .unwrap();
        registry.register(defs).unwrap();
        let value = Value::from_fields([
            ("a", Value::UInt8(1)),
            ("b", Value::Float64(2.0)),
        ]);
        let bytes = serialize_ros1(&value, "test_msgs/msg/PackedRos1", &registry).unwrap();
        assert_eq!(bytes.len(), 9);
        let back = deserialize_ros1(&bytes, "test_msgs/msg/PackedRos1", &registry).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn test_header_seq_synthesized_and_skipped() {
        let registry = TypeRegistry::with_builtins();
        let value = Value::from_fields([
            (
                "stamp",
                Value::from_fields([("sec", Value::Int32(10)), ("nanosec", Value::UInt32(0))]),
            ),
            ("frame_id", Value::from("f")),
        ]);
        let bytes = serialize_ros1(&value, "std_msgs/msg/Header", &registry).unwrap();
        // seq(4) + sec(4) + nanosec(4) + strlen(4) + "f"(1)
        assert_eq!(bytes.len(), 17);
        assert_eq!(&bytes[..4], &[0, 0, 0, 0]);

        let back = deserialize_ros1(&bytes, "std_msgs/msg/Header", &registry).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn test_excess_bytes_rejected() {
        let registry = TypeRegistry::with_builtins();
        let value = Value::from_fields([("data", Value::from("x"))]);
        let mut bytes = serialize_ros1(&value, "std_msgs/msg/String", &registry).unwrap();
        bytes.push(0);
        let err = deserialize_ros1(&bytes, "std_msgs/msg/String", &registry).unwrap_err();
        assert!(matches!(err, BagError::ExcessBytes { .. }));
    }

    #[test]
    fn test_sequence_roundtrip() {
        let registry = TypeRegistry::with_builtins();
        let value = Value::from_fields([
            (
                "status",
                Value::Array(vec![Value::from_fields([
                    ("level", Value::UInt8(1)),
                    ("name", Value::from("drv")),
                    ("message", Value::from("ok")),
                    ("hardware_id", Value::from("hw0")),
                    (
                        "values",
                        Value::Array(vec![Value::from_fields([
                            ("key", Value::from("k")),
                            ("value", Value::from("v")),
                        ])]),
                    ),
                ])]),
            ),
            (
                "header",
                Value::from_fields([
                    (
                        "stamp",
                        Value::from_fields([
                            ("sec", Value::Int32(1)),
                            ("nanosec", Value::UInt32(2)),
                        ]),
                    ),
                    ("frame_id", Value::from("")),
                ]),
            ),
        ]);
        let bytes =
            serialize_ros1(&value, "diagnostic_msgs/msg/DiagnosticArray", &registry).unwrap();
        let back =
            deserialize_ros1(&bytes, "diagnostic_msgs/msg/DiagnosticArray", &registry).unwrap();
        assert_eq!(back, value);
    }
}
