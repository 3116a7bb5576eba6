/*
 * validate.rs
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

//! Pre-condition gate. Runs before any filesystem or network activity and reports a single
//! generic error.

use log::debug;

use crate::error::SendError;
use crate::message::{MailMessage, ServerCredentials};
use crate::mime::is_valid_address;

/// Longest accepted Content-Language value, in characters.
pub const MAX_LANGUAGE_LEN: usize = 5;

pub fn validate(message: &MailMessage, credentials: &ServerCredentials) -> Result<(), SendError> {
    let valid = !credentials.host.is_empty()
        && (1..=u32::from(u16::MAX)).contains(&credentials.port)
        && !credentials.username.is_empty()
        && !message.to.is_empty()
        && is_valid_address(&message.sender.address)
        && message
            .language
            .as_deref()
            .map_or(true, |l| l.chars().count() <= MAX_LANGUAGE_LEN)
        && message.priority <= 5;
    if valid {
        Ok(())
    } else {
        debug!("rejecting send to {}:{}: invalid settings", credentials.host, credentials.port);
        Err(SendError::InvalidConfiguration)
    }
}
