// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Persona Identity Contributors

//! Persona Identity - Wallet-to-DID Resolution & Routing Engine
//!
//! This crate decides whether a connected wallet is already bound to a DID
//! and routes callers between new-registration and returning-user flows,
//! backed by a transitional local identity cache.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `routing` - Route decision engine and recognition adapter
//! - `storage` - Identity cache over a single-slot storage capability
//! - `provisioning` - Remote TOTP provisioning proxy
//! - `session` - OAuth session augmentation boundary types

pub mod api;
pub mod config;
pub mod error;
pub mod provisioning;
pub mod routing;
pub mod session;
pub mod state;
pub mod storage;
