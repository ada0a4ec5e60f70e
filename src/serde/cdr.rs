// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! CDR wire codec.
//!
//! Messages start with a 4-byte encapsulation header (representation id +
//! options); payload alignment is measured from the payload start. Strings
//! carry a u32 length including the trailing NUL. Sequences carry a u32
//! count and align to the element type's leading alignment right after it,
//! independent of the element count, so padding never depends on runtime
//! data.

use crate::core::error::{BagError, Result};
use crate::core::value::Value;
use crate::typesys::ast::{BaseType, FieldType, MsgDef};
use crate::typesys::registry::TypeRegistry;

use super::cursor::{ReadCursor, WriteCursor};
use super::{head_alignment, Endianness};

/// Serialize a message value to CDR with the given endianness.
pub fn serialize_cdr_with(
    value: &Value,
    typename: &str,
    endianness: Endianness,
    registry: &TypeRegistry,
) -> Result<Vec<u8>> {
    let def = registry.lookup(typename)?;
    let mut cursor = WriteCursor::new_cdr(endianness == Endianness::Little);
    write_message(&mut cursor, value, &def, registry, typename)?;
    Ok(cursor.into_bytes())
}

/// Serialize a message value to CDR with host endianness.
pub fn serialize_cdr(value: &Value, typename: &str, registry: &TypeRegistry) -> Result<Vec<u8>> {
    serialize_cdr_with(value, typename, Endianness::native(), registry)
}

/// Deserialize a CDR message; endianness comes from the encapsulation
/// header. Fails with `ExcessBytes` when more than the up-to-3 padding
/// bytes remain after the last field.
pub fn deserialize_cdr(data: &[u8], typename: &str, registry: &TypeRegistry) -> Result<Value> {
    let def = registry.lookup(typename)?;
    let mut cursor = ReadCursor::new_cdr(data)?;
    let value = read_message(&mut cursor, &def, registry)?;
    if cursor.remaining() > 3 {
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
            let items = expect_array(value, path)?;
            if items.len() != *len {
                return Err(BagError::value_mismatch(path, format!("array of {len}")));
            }
            for item in items {
                write_field(cursor, item, elem, registry, path)?;
            }
            Ok(())
        }
        FieldType::Sequence(elem, _) => {
            let items = expect_array(value, path)?;
            cursor.write_u32(items.len() as u32);
            cursor.align(head_alignment(elem, registry)?);
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
            cursor.write_u32(bytes.len() as u32 + 1);
            cursor.write_bytes(bytes);
            cursor.write_u8(0);
        }
        _ => return Err(BagError::value_mismatch(path, base.name())),
    }
    Ok(())
}

fn expect_array<'v>(value: &'v Value, path: &str) -> Result<&'v [Value]> {
    value
        .as_array()
        .ok_or_else(|| BagError::value_mismatch(path, "array"))
}

fn read_message(
    cursor: &mut ReadCursor<'_>,
    def: &MsgDef,
    registry: &TypeRegistry,
) -> Result<Value> {
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
            cursor.align(head_alignment(elem, registry)?)?;
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
            if length == 0 {
                Value::String(String::new())
            } else {
                let bytes = cursor.read_bytes(length)?;
                let text = std::str::from_utf8(&bytes[..length - 1])
                    .map_err(|_| BagError::value_mismatch("string", "valid UTF-8"))?;
                Value::String(text.to_string())
            }
        }
    })
}
