// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # trxgate Protocol: Core Library
//!
//! Everything the gateway knows about a partner submission, minus the HTTP.
//!
//! ## Architecture
//!
//! - **message**: Wire types and the structural validator.
//! - **crypto**: Canonical string, SHA-256 digest, base64 signature codec.
//! - **directory**: Partner credential lookup.
//! - **pipeline**: Authentication, amount reconciliation and freshness.
//! - **config**: Limits, windows and partner-facing messages.
//!
//! A submission flows through [`message::validate_request`] first. Only a
//! structurally valid request reaches [`pipeline::TransactionPipeline`].

pub mod config;
pub mod crypto;
pub mod directory;
pub mod message;
pub mod pipeline;
