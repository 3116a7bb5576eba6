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

//! SMTP submission: compose a [`MailMessage`] and deliver it over one session.
//!
//! [`SmtpMailer`] holds the server credentials and session options. Each send validates the
//! message, composes it, opens a fresh connection and runs it through [`SmtpSession`]. Nothing
//! is shared between sends.

mod build_mime;
mod client;
pub mod dot_stuffer;

pub use build_mime::{compose, compose_with, ComposedMessage, SkippedAttachment};
pub use client::{is_loopback, Extensions, Reply, SessionState, SmtpSession};

use log::debug;

use crate::config::{SessionOptions, Timeouts, TlsPolicy};
use crate::error::{Cause, SendError};
use crate::message::{MailMessage, ServerCredentials};
use crate::net::{Connection, MailStream};
use crate::validate::validate;

/// SMTP submission client for one server account.
#[derive(Debug, Clone)]
pub struct SmtpMailer {
    credentials: ServerCredentials,
    options: SessionOptions,
}

impl SmtpMailer {
    pub fn new(credentials: ServerCredentials) -> Self {
        Self::with_options(credentials, SessionOptions::default())
    }

    pub fn with_options(credentials: ServerCredentials, options: SessionOptions) -> Self {
        Self {
            credentials,
            options,
        }
    }

    pub fn set_tls_policy(&mut self, policy: TlsPolicy) -> &mut Self {
        self.options.tls = policy;
        self
    }

    /// Accept any server certificate. Only for test servers with self-signed certificates.
    pub fn set_accept_invalid_certs(&mut self, accept: bool) -> &mut Self {
        self.options.accept_invalid_certs = accept;
        self
    }

    pub fn set_ehlo_hostname(&mut self, hostname: impl Into<String>) -> &mut Self {
        self.options.ehlo_hostname = hostname.into();
        self
    }

    pub fn set_timeouts(&mut self, timeouts: Timeouts) -> &mut Self {
        self.options.timeouts = timeouts;
        self
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub fn credentials(&self) -> &ServerCredentials {
        &self.credentials
    }

    /// Validate, compose and deliver, blocking the calling thread. Builds its own
    /// current-thread runtime, so it must not be called from inside an async context.
    pub fn send(&self, message: &MailMessage) -> Result<(), SendError> {
        validate(message, &self.credentials)?;
        let composed = compose(message);
        self.block_on_delivery(&composed, message)
    }

    /// Deliver an already composed message, blocking. The message is still validated first.
    pub fn send_composed(
        &self,
        composed: &ComposedMessage,
        message: &MailMessage,
    ) -> Result<(), SendError> {
        validate(message, &self.credentials)?;
        self.block_on_delivery(composed, message)
    }

    /// Validate, compose and deliver on the caller's runtime.
    pub async fn send_async(&self, message: &MailMessage) -> Result<(), SendError> {
        validate(message, &self.credentials)?;
        let composed = compose(message);
        self.run(&composed, message).await
    }

    fn block_on_delivery(
        &self,
        composed: &ComposedMessage,
        message: &MailMessage,
    ) -> Result<(), SendError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| SendError::Connection(Cause::Io(e)))?;
        runtime.block_on(self.run(composed, message))
    }

    async fn run(
        &self,
        composed: &ComposedMessage,
        message: &MailMessage,
    ) -> Result<(), SendError> {
        let host = self.credentials.host.as_str();
        let port = u16::try_from(self.credentials.port)
            .map_err(|_| SendError::InvalidConfiguration)?;
        let timeouts = &self.options.timeouts;

        debug!("connecting to {}:{} ({:?})", host, port, self.options.tls);
        let connect = MailStream::connect(host, port);
        let mut stream = match tokio::time::timeout(timeouts.connect, connect).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => return Err(SendError::Connection(e.into())),
            Err(_) => return Err(SendError::Connection(Cause::Timeout(timeouts.connect))),
        };
        if self.options.tls == TlsPolicy::Implicit {
            let handshake = stream.start_tls(host, self.options.accept_invalid_certs);
            stream = match tokio::time::timeout(timeouts.connect, handshake).await {
                Ok(Ok(stream)) => stream,
                Ok(Err(e)) => return Err(SendError::TlsNegotiation(e.into())),
                Err(_) => return Err(SendError::TlsNegotiation(Cause::Timeout(timeouts.connect))),
            };
        }

        let mut session = SmtpSession::new(stream, host, self.options.clone());
        session.deliver(composed, message, &self.credentials).await
    }
}

/// Validate, compose and send `message` with default session options, blocking.
pub fn send_mail(message: &MailMessage, credentials: &ServerCredentials) -> Result<(), SendError> {
    SmtpMailer::new(credentials.clone()).send(message)
}

/// Async form of [`send_mail`] with explicit options.
pub async fn send_mail_async(
    message: &MailMessage,
    credentials: &ServerCredentials,
    options: SessionOptions,
) -> Result<(), SendError> {
    SmtpMailer::with_options(credentials.clone(), options)
        .send_async(message)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn setters_chain() {
        let mut mailer = SmtpMailer::new(ServerCredentials::new(
            "smtp.example.com",
            587,
            "alice",
            "secret",
        ));
        mailer
            .set_tls_policy(TlsPolicy::Required)
            .set_ehlo_hostname("client.example.com")
            .set_timeouts(Timeouts::uniform(Duration::from_secs(7)));
        assert_eq!(mailer.options().tls, TlsPolicy::Required);
        assert_eq!(mailer.options().ehlo_hostname, "client.example.com");
        assert_eq!(mailer.options().timeouts.rcpt, Duration::from_secs(7));
        assert!(!mailer.options().accept_invalid_certs);
        assert_eq!(mailer.credentials().host, "smtp.example.com");
    }

    #[test]
    fn invalid_message_fails_before_connecting() {
        let mailer = SmtpMailer::new(ServerCredentials::new("", 25, "alice", "pw"));
        let message = MailMessage::default();
        let err = mailer.send(&message).unwrap_err();
        assert!(matches!(err, SendError::InvalidConfiguration));
    }
}
