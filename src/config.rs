// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Persona Identity Contributors

//! # Runtime Configuration Constants
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `DATA_DIR` | Root directory for the identity slot file | in-memory cache when unset |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `TOTP_PROVISION_URL` | Upstream TOTP provisioning function | Provisioning disabled when unset |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

/// Environment variable name for the data directory path.
///
/// When set, the identity cache persists to `{DATA_DIR}/identities.json`
/// and survives restarts. When unset, the cache is in-memory only, which is
/// acceptable because the cache is transitional and never authoritative.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

/// Environment variable name for the upstream TOTP provisioning function URL.
pub const TOTP_PROVISION_URL_ENV: &str = "TOTP_PROVISION_URL";

/// Default log filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";
