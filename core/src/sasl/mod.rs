/*
 * mod.rs
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

//! SASL client pieces for SMTP AUTH: PLAIN (preferred) and LOGIN. Both send the password in
//! the clear and are only used over TLS or to a loopback host.

mod mechanism;
mod plain;

pub use mechanism::SaslMechanism;
pub use plain::encode_plain;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SaslError {
    #[error("invalid server challenge: {0}")]
    InvalidChallenge(String),
    #[error("unexpected {0} challenge")]
    UnexpectedChallenge(SaslMechanism),
}

/// Pick a mechanism from the EHLO `AUTH` parameters. PLAIN unless the server lists LOGIN
/// without PLAIN; an empty list also means PLAIN.
pub fn choose_mechanism(advertised: &str) -> SaslMechanism {
    let offered: Vec<SaslMechanism> = advertised
        .split_whitespace()
        .filter_map(SaslMechanism::from_name)
        .collect();
    if offered.contains(&SaslMechanism::Login) && !offered.contains(&SaslMechanism::Plain) {
        SaslMechanism::Login
    } else {
        SaslMechanism::Plain
    }
}

/// LOGIN: the first challenge asks for the username, the second for the password.
/// Returns the raw (not yet base64-encoded) response.
pub fn login_respond_to_challenge(
    challenge_b64: &str,
    authcid: &str,
    password: &str,
) -> Result<Vec<u8>, SaslError> {
    let decoded = BASE64
        .decode(challenge_b64.trim())
        .map_err(|e| SaslError::InvalidChallenge(e.to_string()))?;
    let prompt = String::from_utf8_lossy(&decoded).to_lowercase();
    if prompt.contains("username") {
        Ok(authcid.as_bytes().to_vec())
    } else if prompt.contains("password") {
        Ok(password.as_bytes().to_vec())
    } else {
        Err(SaslError::UnexpectedChallenge(SaslMechanism::Login))
    }
}
