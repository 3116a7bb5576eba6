/*
 * lib.rs
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

//! Postino core: compose outbound mail as MIME and submit it over SMTP.
//!
//! [`compose`] turns a [`MailMessage`] into the DATA payload; [`SmtpMailer`] (or [`send_mail`])
//! validates, composes and delivers it through one [`SmtpSession`]. The library installs no
//! logger; output goes through the `log` facade.

pub mod config;
pub mod error;
pub mod message;
pub mod mime;
pub mod net;
pub mod protocol;
pub mod sasl;
pub mod validate;

pub use config::{SessionOptions, Timeouts, TlsPolicy};
pub use error::{Cause, ErrorKind, SendError};
pub use message::{EmailAddress, MailMessage, Priority, ServerCredentials};
pub use protocol::smtp::{
    compose, compose_with, send_mail, send_mail_async, ComposedMessage, SessionState,
    SkippedAttachment, SmtpMailer, SmtpSession,
};
pub use validate::validate;
