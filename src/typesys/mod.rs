// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Message type system: definition parsers, parse trees, and the registry.
//!
//! Two dialects are accepted, `.msg` and `.idl`; both produce the same
//! [`MsgDef`] shape. The registry maps fully-qualified names
//! (`pkg/msg/Name`) to definitions and is pre-populated with the standard
//! ROS2 distribution.

pub mod ast;
pub mod builtin;
pub mod idl;
pub mod msg;
pub mod msgdef;
pub mod registry;

pub use ast::{
    denormalize_msgtype, normalize_msgtype, BaseType, ConstDef, FieldDef, FieldType, MsgDef,
};
pub use idl::parse_idl;
pub use msg::parse_msg;
pub use msgdef::generate_msgdef;
pub use registry::{default_registry, TypeRegistry};
