/*
 * config.rs
 * Copyright (C) 2026 Chris Burdess
 *
 * This file is part of Postino, a mail composition and submission library.
 *
 * Postino is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Postino is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Postino.  If not, see <http://www.gnu.org/licenses/>.
 */

//! Session options: EHLO name, TLS policy, certificate verification and per-step deadlines.
//! Deserializable so callers can keep them in their own config files; durations are in seconds.

use std::time::Duration;

use serde::{Deserialize, Deserializer};

pub const DEFAULT_EHLO_HOSTNAME: &str = "localhost";

const fn minutes(n: u64) -> Duration {
    Duration::from_secs(n * 60)
}

/// When to encrypt the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TlsPolicy {
    /// STARTTLS when the server advertises it, plain otherwise.
    #[default]
    Opportunistic,
    /// STARTTLS must be offered and succeed.
    Required,
    /// TLS from the first byte (SMTPS, usually port 465).
    Implicit,
    /// Never upgrade. Debugging only.
    Disabled,
}

/// How long each step may wait for the server. Defaults are the RFC 5321 §4.5.3.2 minimums.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    /// TCP connect (and implicit TLS handshake).
    #[serde(deserialize_with = "seconds")]
    pub connect: Duration,
    /// The initial `220` greeting.
    #[serde(deserialize_with = "seconds")]
    pub greeting: Duration,
    /// EHLO, STARTTLS, AUTH and QUIT.
    #[serde(deserialize_with = "seconds")]
    pub command: Duration,
    #[serde(deserialize_with = "seconds")]
    pub mail: Duration,
    #[serde(deserialize_with = "seconds")]
    pub rcpt: Duration,
    /// Waiting for `354` after DATA.
    #[serde(deserialize_with = "seconds")]
    pub data_init: Duration,
    /// Writing the message body.
    #[serde(deserialize_with = "seconds")]
    pub data_block: Duration,
    /// Waiting for `250` after the final `.`.
    #[serde(deserialize_with = "seconds")]
    pub data_termination: Duration,
}

impl Timeouts {
    /// The same deadline for every step.
    pub fn uniform(limit: Duration) -> Self {
        Self {
            connect: limit,
            greeting: limit,
            command: limit,
            mail: limit,
            rcpt: limit,
            data_init: limit,
            data_block: limit,
            data_termination: limit,
        }
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(30),
            greeting: minutes(5),
            command: minutes(5),
            mail: minutes(5),
            rcpt: minutes(5),
            data_init: minutes(2),
            data_block: minutes(3),
            data_termination: minutes(10),
        }
    }
}

fn seconds<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    u64::deserialize(deserializer).map(Duration::from_secs)
}

/// Everything about a session that is not the message or the credentials.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionOptions {
    /// Name announced in EHLO/HELO.
    pub ehlo_hostname: String,
    pub tls: TlsPolicy,
    /// Skip server certificate verification. Off by default; when on, any certificate is
    /// accepted and the session is open to interception.
    pub accept_invalid_certs: bool,
    pub timeouts: Timeouts,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            ehlo_hostname: DEFAULT_EHLO_HOSTNAME.to_string(),
            tls: TlsPolicy::default(),
            accept_invalid_certs: false,
            timeouts: Timeouts::default(),
        }
    }
}
