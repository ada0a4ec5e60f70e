// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Error types shared across the crate.
//!
//! One exhaustive enum covers every layer:
//! - definition parsing and the type registry
//! - wire-format violations in the codecs and transcoders
//! - rosbag1 and rosbag2 container defects
//! - converter failures and propagated I/O errors

use std::fmt;
use std::io;

/// Failure kinds reported by the definition parsers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// A `/* ... */` comment was never closed.
    UnterminatedComment,
    /// A token that fits no grammar rule.
    UnknownToken,
    /// A field declaration could not be parsed.
    BadField,
    /// A constant declaration could not be parsed.
    BadConstant,
    /// A declaration is missing its type.
    MissingType,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParseErrorKind::UnterminatedComment => "unterminated comment",
            ParseErrorKind::UnknownToken => "unknown token",
            ParseErrorKind::BadField => "bad field",
            ParseErrorKind::BadConstant => "bad constant",
            ParseErrorKind::MissingType => "missing type",
        };
        write!(f, "{name}")
    }
}

/// Errors raised by readers, writers, codecs, and the converter.
#[derive(Debug)]
pub enum BagError {
    /// Malformed message definition text.
    Parse {
        /// What went wrong.
        kind: ParseErrorKind,
        /// Where it went wrong (line or token context).
        location: String,
    },

    /// A type was re-registered with a different shape.
    TypeConflict {
        /// Conflicting type name.
        type_name: String,
    },

    /// A type name is not present in the registry.
    TypeNotFound {
        /// Missing type name.
        type_name: String,
    },

    /// Wire data ended before the requested read.
    ShortRead {
        /// Bytes requested.
        requested: usize,
        /// Bytes available.
        available: usize,
        /// Cursor position when the read failed.
        position: u64,
    },

    /// Wire data continued past the last field.
    ExcessBytes {
        /// Bytes left over after the final field.
        remaining: usize,
    },

    /// A length prefix exceeds the remaining buffer.
    BadLength {
        /// Declared length.
        length: usize,
        /// Bytes actually remaining.
        remaining: usize,
    },

    /// rosbag1 file has no index region.
    Unindexed,

    /// rosbag1 split sets are not supported.
    SplitNotSupported,

    /// rosbag1 record stream is malformed.
    CorruptRecord {
        /// What was being read.
        context: String,
        /// Error detail.
        message: String,
    },

    /// rosbag2 metadata document is malformed or inconsistent.
    MetadataInvalid {
        /// Error detail.
        reason: String,
    },

    /// rosbag2 metadata version is newer than supported.
    VersionUnsupported {
        /// Declared version.
        version: u32,
    },

    /// sqlite storage failure.
    StorageError {
        /// Error detail.
        message: String,
    },

    /// The converter could not resolve a message type.
    UnknownType {
        /// Unresolvable type name.
        type_name: String,
    },

    /// A value handed to a serializer does not match the definition.
    ValueMismatch {
        /// Field path that failed.
        field: String,
        /// What the definition expects there.
        expected: String,
    },

    /// Underlying filesystem error, propagated verbatim.
    Io(io::Error),
}

impl BagError {
    /// Create a parse error.
    pub fn parse(kind: ParseErrorKind, location: impl Into<String>) -> Self {
        BagError::Parse {
            kind,
            location: location.into(),
        }
    }

    /// Create a type conflict error.
    pub fn type_conflict(type_name: impl Into<String>) -> Self {
        BagError::TypeConflict {
            type_name: type_name.into(),
        }
    }

    /// Create a "type not found" error.
    pub fn type_not_found(type_name: impl Into<String>) -> Self {
        BagError::TypeNotFound {
            type_name: type_name.into(),
        }
    }

    /// Create a short read error.
    pub fn short_read(requested: usize, available: usize, position: u64) -> Self {
        BagError::ShortRead {
            requested,
            available,
            position,
        }
    }

    /// Create a bad length error.
    pub fn bad_length(length: usize, remaining: usize) -> Self {
        BagError::BadLength { length, remaining }
    }

    /// Create a corrupt record error.
    pub fn corrupt(context: impl Into<String>, message: impl Into<String>) -> Self {
        BagError::CorruptRecord {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Create a metadata error.
    pub fn metadata(reason: impl Into<String>) -> Self {
        BagError::MetadataInvalid {
            reason: reason.into(),
        }
    }

    /// Create an unknown type error.
    pub fn unknown_type(type_name: impl Into<String>) -> Self {
        BagError::UnknownType {
            type_name: type_name.into(),
        }
    }

    /// Create a value mismatch error.
    pub fn value_mismatch(field: impl Into<String>, expected: impl Into<String>) -> Self {
        BagError::ValueMismatch {
            field: field.into(),
            expected: expected.into(),
        }
    }
}

impl fmt::Display for BagError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BagError::Parse { kind, location } => {
                write!(f, "Parse error ({kind}) at {location}")
            }
            BagError::TypeConflict { type_name } => {
                write!(
                    f,
                    "Type {type_name:?} is already present with a different definition"
                )
            }
            BagError::TypeNotFound { type_name } => {
                write!(f, "Type {type_name:?} is unknown")
            }
            BagError::ShortRead {
                requested,
                available,
                position,
            } => write!(
                f,
                "Short read: requested {requested} bytes at position {position}, only {available} available"
            ),
            BagError::ExcessBytes { remaining } => {
                write!(
                    f,
                    "Message has {remaining} excess bytes after the last field"
                )
            }
            BagError::BadLength { length, remaining } => write!(
                f,
                "Length prefix {length} exceeds the {remaining} remaining bytes"
            ),
            BagError::Unindexed => {
                write!(f, "Bag is not indexed, reindex before reading")
            }
            BagError::SplitNotSupported => {
                write!(f, "Split bags are not supported")
            }
            BagError::CorruptRecord { context, message } => {
                write!(f, "Corrupt record in {context}: {message}")
            }
            BagError::MetadataInvalid { reason } => {
                write!(f, "Invalid metadata: {reason}")
            }
            BagError::VersionUnsupported { version } => {
                write!(f, "Rosbag2 version {version} is not supported")
            }
            BagError::StorageError { message } => {
                write!(f, "Storage error: {message}")
            }
            BagError::UnknownType { type_name } => {
                write!(f, "Cannot resolve message type {type_name:?}")
            }
            BagError::ValueMismatch { field, expected } => {
                write!(f, "Value for field {field:?} does not match expected {expected}")
            }
            BagError::Io(err) => write!(f, "I/O error: {err}"),
        }
    }
}

impl std::error::Error for BagError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BagError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for BagError {
    fn from(err: io::Error) -> Self {
        BagError::Io(err)
    }
}

impl From<rusqlite::Error> for BagError {
    fn from(err: rusqlite::Error) -> Self {
        BagError::StorageError {
            message: err.to_string(),
        }
    }
}

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, BagError>;
