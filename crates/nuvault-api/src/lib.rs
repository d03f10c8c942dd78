//! Client for the Nuvault password service.
//!
//! This crate provides:
//! - Wire models for vault entries, profiles and auth responses
//! - `NuvaultClient`, a `reqwest` client that attaches the stored bearer token
//! - `ApiError`, classifying failures into network, auth, validation,
//!   conflict and unknown kinds
//! - `PasswordService`, the narrow trait the vault cache depends on

mod client;
mod error;
mod models;
mod service;

pub use client::NuvaultClient;
pub use error::{ApiError, ApiResult, ErrorKind};
pub use models::{
    Category, EntryId, EntryInput, FilterKey, GeneratePasswordOptions, GeneratedPassword,
    LoginResponse, MessageResponse, Profile, ProfileUpdate, Registration, TagRef, TagType,
    UserInfo, VaultEntry,
};
pub use service::PasswordService;
