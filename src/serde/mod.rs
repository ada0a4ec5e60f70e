// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Wire codecs: CDR, the legacy ROS1 format, and direct transcoding
//! between the two.

pub mod cdr;
pub mod cursor;
pub mod ros1;
pub mod transcode;

pub use cdr::{deserialize_cdr, serialize_cdr, serialize_cdr_with};
pub use ros1::{deserialize_ros1, serialize_ros1};
pub use transcode::{cdr_to_ros1, ros1_to_cdr};

use crate::core::error::Result;
use crate::typesys::ast::FieldType;
use crate::typesys::registry::TypeRegistry;

/// Leading alignment of a field type on the CDR wire: the alignment of the
/// first primitive an element of this type would write. Message elements
/// resolve through the registry into their first field.
///
/// Sequence data aligns to this boundary right after the u32 count whether
/// or not any elements follow, so padding never depends on the runtime
/// element count.
pub(crate) fn head_alignment(ty: &FieldType, registry: &TypeRegistry) -> Result<usize> {
    match ty {
        FieldType::Base(base) => Ok(base.alignment()),
        FieldType::Message(name) => {
            let def = registry.lookup(name)?;
            match def.fields.first() {
                Some(field) => head_alignment(&field.ty, registry),
                None => Ok(1),
            }
        }
        FieldType::Array(elem, _) => head_alignment(elem, registry),
        FieldType::Sequence(_, _) => Ok(4),
    }
}

/// Byte order for CDR serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endianness {
    /// Little-endian representation (`0x00 0x01` header).
    Little,
    /// Big-endian representation (`0x00 0x00` header).
    Big,
}

impl Endianness {
    /// The host byte order.
    pub fn native() -> Self {
        if cfg!(target_endian = "little") {
            Endianness::Little
        } else {
            Endianness::Big
        }
    }
}
