/*
 * error.rs
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

//! Send errors. One variant per session phase; network variants carry the underlying [`Cause`].

use std::io;
use std::time::Duration;

use thiserror::Error;

use crate::protocol::smtp::SessionState;
use crate::sasl::SaslError;

/// What actually went wrong inside a failed step.
#[derive(Debug, Error)]
pub enum Cause {
    #[error(transparent)]
    Io(#[from] io::Error),
    /// The server answered with a negative or unexpected reply.
    #[error("server replied {code} {text}")]
    Reply { code: u16, text: String },
    #[error("no reply within {0:?}")]
    Timeout(Duration),
    #[error("malformed reply: {0}")]
    Malformed(String),
    /// The client declined to continue (e.g. credentials over an unencrypted channel).
    #[error("{0}")]
    Refused(String),
    #[error(transparent)]
    Sasl(#[from] SaslError),
}

impl Cause {
    pub fn refused(msg: impl Into<String>) -> Self {
        Self::Refused(msg.into())
    }

    /// Reply code when the server answered; `None` for local and transport failures.
    pub fn reply_code(&self) -> Option<u16> {
        match self {
            Cause::Reply { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Cause::Timeout(_))
    }
}

/// Flat discriminant of [`SendError`], for matching without destructuring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidConfiguration,
    Connection,
    TlsNegotiation,
    Authentication,
    Envelope,
    Transfer,
    SessionClose,
    OutOfSequence,
}

/// Outcome of a failed send. The first failing step wins; nothing is retried.
#[derive(Debug, Error)]
pub enum SendError {
    /// A pre-condition on the message or the credentials does not hold. Deliberately does not
    /// name the offending field.
    #[error("invalid settings")]
    InvalidConfiguration,
    #[error("connection failed: {0}")]
    Connection(Cause),
    #[error("TLS negotiation failed: {0}")]
    TlsNegotiation(Cause),
    #[error("authentication failed: {0}")]
    Authentication(Cause),
    /// MAIL FROM or one RCPT TO was rejected.
    #[error("envelope rejected for {mailbox}: {cause}")]
    Envelope { mailbox: String, cause: Cause },
    #[error("data transfer failed: {0}")]
    Transfer(Cause),
    /// QUIT failed after the server had already accepted the message.
    #[error("session close failed after the message was accepted: {0}")]
    SessionClose(Cause),
    #[error("{step} is not valid in state {state}")]
    OutOfSequence {
        step: &'static str,
        state: SessionState,
    },
}

impl SendError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SendError::InvalidConfiguration => ErrorKind::InvalidConfiguration,
            SendError::Connection(_) => ErrorKind::Connection,
            SendError::TlsNegotiation(_) => ErrorKind::TlsNegotiation,
            SendError::Authentication(_) => ErrorKind::Authentication,
            SendError::Envelope { .. } => ErrorKind::Envelope,
            SendError::Transfer(_) => ErrorKind::Transfer,
            SendError::SessionClose(_) => ErrorKind::SessionClose,
            SendError::OutOfSequence { .. } => ErrorKind::OutOfSequence,
        }
    }

    pub fn cause(&self) -> Option<&Cause> {
        match self {
            SendError::Connection(c)
            | SendError::TlsNegotiation(c)
            | SendError::Authentication(c)
            | SendError::Transfer(c)
            | SendError::SessionClose(c) => Some(c),
            SendError::Envelope { cause, .. } => Some(cause),
            SendError::InvalidConfiguration | SendError::OutOfSequence { .. } => None,
        }
    }

    /// True when the server had already queued the message, so the error is cleanup noise
    /// rather than a failed delivery.
    pub fn message_accepted(&self) -> bool {
        matches!(self, SendError::SessionClose(_))
    }
}
