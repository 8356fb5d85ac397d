//! xdg-foreign protocol error codes and error handling

use super::types::*;
use std::fmt;
use thiserror::Error;

/// Protocol error codes posted to a client before its connection is terminated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    InvalidRole = 0,
    RoleMismatch = 1,
    InvalidObject = 2,
    NoMemory = 3,
}

impl ErrorCode {
    pub fn from_u32(code: u32) -> Option<Self> {
        match code {
            0 => Some(ErrorCode::InvalidRole),
            1 => Some(ErrorCode::RoleMismatch),
            2 => Some(ErrorCode::InvalidObject),
            3 => Some(ErrorCode::NoMemory),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidRole => "InvalidRole: surface is not an xdg_toplevel",
            ErrorCode::RoleMismatch => "RoleMismatch: surfaces must have the same role",
            ErrorCode::InvalidObject => "InvalidObject: object does not exist",
            ErrorCode::NoMemory => "NoMemory: insufficient resources",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A protocol error raised against one object of a client
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{object}: {code} ({message})")]
pub struct ProtocolError {
    pub code: ErrorCode,
    pub object: ObjectId,
    pub message: String,
}

impl ProtocolError {
    pub fn new(code: ErrorCode, object: impl Into<ObjectId>, message: impl Into<String>) -> Self {
        ProtocolError {
            code,
            object: object.into(),
            message: message.into(),
        }
    }
}

/// Helper functions to create common errors
impl ProtocolError {
    pub fn not_xdg_surface(object: impl Into<ObjectId>) -> Self {
        ProtocolError::new(ErrorCode::InvalidRole, object, "surface must be an xdg_surface")
    }

    pub fn not_toplevel(object: impl Into<ObjectId>) -> Self {
        ProtocolError::new(ErrorCode::InvalidRole, object, "surface must be an xdg_toplevel")
    }

    pub fn role_mismatch(object: impl Into<ObjectId>) -> Self {
        ProtocolError::new(
            ErrorCode::RoleMismatch,
            object,
            "surfaces must have the same role",
        )
    }

    pub fn invalid_object(object: impl Into<ObjectId>) -> Self {
        ProtocolError::new(ErrorCode::InvalidObject, object, "unknown object")
    }

    pub fn no_memory(object: impl Into<ObjectId>) -> Self {
        ProtocolError::new(ErrorCode::NoMemory, object, "no memory")
    }
}
