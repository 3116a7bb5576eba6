/*
 * client.rs
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

//! Async SMTP submission session: greeting, EHLO, STARTTLS, AUTH, MAIL FROM, RCPT TO, DATA, QUIT.
//! Each step is a method on [`SmtpSession`] that checks the current [`SessionState`] before
//! touching the wire and runs under its own deadline from [`Timeouts`](crate::config::Timeouts).

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::io;
use std::net::IpAddr;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use log::{debug, info, warn};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::config::{SessionOptions, TlsPolicy};
use crate::error::{Cause, SendError};
use crate::message::{MailMessage, ServerCredentials};
use crate::net::Connection;
use crate::protocol::smtp::build_mime::ComposedMessage;
use crate::protocol::smtp::dot_stuffer::DotStuffer;
use crate::sasl::{
    choose_mechanism, encode_plain, login_respond_to_challenge, SaslError, SaslMechanism,
};

/// Longest reply line accepted (RFC 5321 allows 512; some servers are generous).
const MAX_REPLY_LINE: usize = 4096;
/// LOGIN asks for the username, then the password.
const MAX_LOGIN_ROUNDS: usize = 2;

/// Where a session is in the submission sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    /// Greeting received (and EHLO done, once negotiated).
    Connected,
    /// TLS is active.
    Secured,
    Authenticated,
    SenderDeclared,
    RecipientsDeclared,
    /// DATA accepted with 354; the payload is being written.
    DataOpen,
    /// The server accepted the message.
    Sent,
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SessionState::Disconnected => "disconnected",
            SessionState::Connected => "connected",
            SessionState::Secured => "secured",
            SessionState::Authenticated => "authenticated",
            SessionState::SenderDeclared => "sender declared",
            SessionState::RecipientsDeclared => "recipients declared",
            SessionState::DataOpen => "data open",
            SessionState::Sent => "sent",
            SessionState::Closed => "closed",
        })
    }
}

/// One SMTP reply: a three-digit code and the text of each line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub code: u16,
    pub lines: Vec<String>,
}

impl Reply {
    pub fn message(&self) -> String {
        self.lines.join(" ")
    }

    pub fn is_positive(&self) -> bool {
        (200..300).contains(&self.code)
    }

    pub fn into_cause(self) -> Cause {
        Cause::Reply {
            code: self.code,
            text: self.lines.join(" "),
        }
    }
}

/// EHLO keywords (upper-cased) with their parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extensions {
    keywords: HashMap<String, String>,
}

impl Extensions {
    /// Parse the lines after the first (which is the server's greeting name).
    pub fn parse(reply: &Reply) -> Self {
        let keywords = reply
            .lines
            .iter()
            .skip(1)
            .filter_map(|line| {
                let line = line.trim();
                let (keyword, params) = line.split_once(' ').unwrap_or((line, ""));
                (!keyword.is_empty()).then(|| (keyword.to_uppercase(), params.trim().to_string()))
            })
            .collect();
        Self { keywords }
    }

    pub fn supports(&self, keyword: &str) -> bool {
        self.keywords.contains_key(&keyword.to_uppercase())
    }

    pub fn params(&self, keyword: &str) -> Option<&str> {
        self.keywords
            .get(&keyword.to_uppercase())
            .map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }
}

/// Read one line, LF-terminated, without the line ending. A trailing CR is dropped.
async fn read_line<S>(stream: &mut S, buf: &mut Vec<u8>) -> Result<String, Cause>
where
    S: AsyncRead + Unpin,
{
    buf.clear();
    loop {
        let b = match stream.read_u8().await {
            Ok(b) => b,
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                return Err(Cause::Io(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "connection closed",
                )))
            }
            Err(e) => return Err(e.into()),
        };
        if b == b'\n' {
            break;
        }
        if buf.len() >= MAX_REPLY_LINE {
            return Err(Cause::Malformed(format!(
                "reply line longer than {} bytes",
                MAX_REPLY_LINE
            )));
        }
        buf.push(b);
    }
    if buf.last() == Some(&b'\r') {
        buf.pop();
    }
    Ok(String::from_utf8_lossy(buf).into_owned())
}

/// Split `250-text` / `250 text` / `250` into (code, is_last, text).
fn parse_reply_line(line: &str) -> Result<(u16, bool, String), Cause> {
    let bytes = line.as_bytes();
    if bytes.len() < 3 || !bytes[..3].iter().all(u8::is_ascii_digit) {
        return Err(Cause::Malformed(line.to_string()));
    }
    let code = line[..3]
        .parse()
        .map_err(|_| Cause::Malformed(line.to_string()))?;
    let last = match bytes.get(3) {
        None | Some(b' ') => true,
        Some(b'-') => false,
        Some(_) => return Err(Cause::Malformed(line.to_string())),
    };
    let text = line.get(4..).unwrap_or("").to_string();
    Ok((code, last, text))
}

/// Read a complete (possibly multi-line) reply.
pub(crate) async fn read_reply<S>(stream: &mut S, buf: &mut Vec<u8>) -> Result<Reply, Cause>
where
    S: AsyncRead + Unpin,
{
    let mut lines = Vec::new();
    let mut first_code = None;
    loop {
        let line = read_line(stream, buf).await?;
        debug!("S: {}", line);
        let (code, last, text) = parse_reply_line(&line)?;
        match first_code {
            None => first_code = Some(code),
            Some(c) if c != code => {
                return Err(Cause::Malformed(format!(
                    "reply code changed from {} to {} mid-reply",
                    c, code
                )))
            }
            Some(_) => {}
        }
        lines.push(text);
        if last {
            return Ok(Reply { code, lines });
        }
    }
}

/// Write a line (no CRLF) then CRLF.
async fn write_line<S>(stream: &mut S, line: &[u8]) -> io::Result<()>
where
    S: AsyncWrite + Unpin,
{
    stream.write_all(line).await?;
    stream.write_all(b"\r\n").await?;
    stream.flush().await?;
    Ok(())
}

async fn with_deadline<T, E, F>(limit: Duration, fut: F) -> Result<T, Cause>
where
    F: Future<Output = Result<T, E>>,
    Cause: From<E>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result.map_err(Cause::from),
        Err(_) => Err(Cause::Timeout(limit)),
    }
}

/// `localhost` or a loopback IP literal (bracketed or not).
pub fn is_loopback(host: &str) -> bool {
    if host.eq_ignore_ascii_case("localhost") {
        return true;
    }
    host.trim_start_matches('[')
        .trim_end_matches(']')
        .parse::<IpAddr>()
        .map_or(false, |ip| ip.is_loopback())
}

/// Command arguments must not smuggle in extra commands.
fn check_line(arg: &str) -> Result<(), Cause> {
    if arg.contains(['\r', '\n']) {
        return Err(Cause::refused("line break in command argument"));
    }
    Ok(())
}

fn connection_lost() -> Cause {
    Cause::Io(io::Error::new(io::ErrorKind::NotConnected, "connection lost"))
}

/// One submission session over `C`. Steps must be called in order; [`deliver`](Self::deliver)
/// runs them all.
pub struct SmtpSession<C: Connection> {
    /// `None` only after a failed TLS upgrade consumed the stream.
    stream: Option<C>,
    line_buf: Vec<u8>,
    state: SessionState,
    host: String,
    options: SessionOptions,
    extensions: Extensions,
    stuffer: DotStuffer,
}

impl<C: Connection> SmtpSession<C> {
    /// Wrap a connected stream. `host` is the server name used for TLS verification and the
    /// plaintext-auth check.
    pub fn new(stream: C, host: impl Into<String>, options: SessionOptions) -> Self {
        Self {
            stream: Some(stream),
            line_buf: Vec::with_capacity(512),
            state: SessionState::Disconnected,
            host: host.into(),
            options,
            extensions: Extensions::default(),
            stuffer: DotStuffer::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Extensions from the most recent EHLO.
    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    pub fn is_secure(&self) -> bool {
        self.stream.as_ref().map_or(false, Connection::is_secure)
    }

    fn expect_state(&self, step: &'static str, allowed: &[SessionState]) -> Result<(), SendError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(SendError::OutOfSequence {
                step,
                state: self.state,
            })
        }
    }

    async fn command(&mut self, line: &str, limit: Duration) -> Result<Reply, Cause> {
        self.command_with(line, line, limit).await
    }

    /// Send `line`, logging `logged` in its place, and read the reply.
    async fn command_with(
        &mut self,
        line: &str,
        logged: &str,
        limit: Duration,
    ) -> Result<Reply, Cause> {
        debug!("C: {}", logged);
        let stream = self.stream.as_mut().ok_or_else(connection_lost)?;
        let buf = &mut self.line_buf;
        with_deadline(limit, async move {
            write_line(stream, line.as_bytes()).await?;
            read_reply(stream, buf).await
        })
        .await
    }

    async fn write_raw(&mut self, bytes: &[u8], limit: Duration) -> Result<(), Cause> {
        let stream = self.stream.as_mut().ok_or_else(connection_lost)?;
        with_deadline(limit, async move {
            stream.write_all(bytes).await?;
            stream.flush().await
        })
        .await
    }

    /// Wait for the `220` greeting.
    pub async fn greet(&mut self) -> Result<(), SendError> {
        self.expect_state("greeting", &[SessionState::Disconnected])?;
        let limit = self.options.timeouts.greeting;
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| SendError::Connection(connection_lost()))?;
        let reply = with_deadline(limit, read_reply(stream, &mut self.line_buf))
            .await
            .map_err(SendError::Connection)?;
        if reply.code != 220 {
            return Err(SendError::Connection(reply.into_cause()));
        }
        self.state = SessionState::Connected;
        Ok(())
    }

    /// EHLO (falling back to HELO) and record the advertised extensions.
    pub async fn negotiate(&mut self) -> Result<(), SendError> {
        self.expect_state("EHLO", &[SessionState::Connected])?;
        self.hello().await
    }

    async fn hello(&mut self) -> Result<(), SendError> {
        let limit = self.options.timeouts.command;
        let name = self.options.ehlo_hostname.clone();
        check_line(&name).map_err(SendError::Connection)?;
        let reply = self
            .command(&format!("EHLO {}", name), limit)
            .await
            .map_err(SendError::Connection)?;
        if reply.is_positive() {
            self.extensions = Extensions::parse(&reply);
            return Ok(());
        }
        debug!("EHLO refused with {}, trying HELO", reply.code);
        let reply = self
            .command(&format!("HELO {}", name), limit)
            .await
            .map_err(SendError::Connection)?;
        if !reply.is_positive() {
            return Err(SendError::Connection(reply.into_cause()));
        }
        self.extensions = Extensions::default();
        Ok(())
    }

    /// Upgrade with STARTTLS as the TLS policy demands, then EHLO again. A stream that is
    /// already encrypted (implicit TLS) goes straight to [`SessionState::Secured`]; when the
    /// policy allows plaintext and no upgrade happens the state stays `Connected`.
    pub async fn secure(&mut self) -> Result<(), SendError> {
        self.expect_state("STARTTLS", &[SessionState::Connected])?;
        if self.is_secure() {
            self.state = SessionState::Secured;
            return Ok(());
        }
        let offered = self.extensions.supports("STARTTLS");
        match self.options.tls {
            TlsPolicy::Disabled => {
                debug!("TLS disabled; continuing in plaintext");
                return Ok(());
            }
            TlsPolicy::Opportunistic if !offered => {
                debug!("server does not offer STARTTLS; continuing in plaintext");
                return Ok(());
            }
            TlsPolicy::Required | TlsPolicy::Implicit if !offered => {
                return Err(SendError::TlsNegotiation(Cause::refused(
                    "server does not offer STARTTLS",
                )));
            }
            _ => {}
        }

        let limit = self.options.timeouts.command;
        let reply = self
            .command("STARTTLS", limit)
            .await
            .map_err(SendError::TlsNegotiation)?;
        if reply.code != 220 {
            return Err(SendError::TlsNegotiation(reply.into_cause()));
        }
        let stream = self
            .stream
            .take()
            .ok_or_else(|| SendError::TlsNegotiation(connection_lost()))?;
        let upgraded = with_deadline(
            limit,
            stream.start_tls(&self.host, self.options.accept_invalid_certs),
        )
        .await
        .map_err(SendError::TlsNegotiation)?;
        self.stream = Some(upgraded);
        self.extensions = Extensions::default();
        self.hello().await?;
        self.state = SessionState::Secured;
        Ok(())
    }

    /// AUTH PLAIN, or LOGIN when that is all the server offers. Credentials are only sent over
    /// TLS or to a loopback host.
    pub async fn authenticate(&mut self, username: &str, password: &str) -> Result<(), SendError> {
        self.expect_state("AUTH", &[SessionState::Connected, SessionState::Secured])?;
        let advertised = match self.extensions.params("AUTH") {
            Some(mechanisms) => mechanisms.to_string(),
            None => {
                return Err(SendError::Authentication(Cause::refused(
                    "server does not support AUTH",
                )))
            }
        };
        if !self.is_secure() && !is_loopback(&self.host) {
            return Err(SendError::Authentication(Cause::refused(
                "refusing to send credentials over an unencrypted connection",
            )));
        }
        let mechanism = choose_mechanism(&advertised);
        let result = match mechanism {
            SaslMechanism::Plain => self.auth_plain(username, password).await,
            SaslMechanism::Login => self.auth_login(username, password).await,
        };
        result.map_err(SendError::Authentication)?;
        debug!("authenticated as {} with {}", username, mechanism);
        self.state = SessionState::Authenticated;
        Ok(())
    }

    async fn auth_plain(&mut self, username: &str, password: &str) -> Result<(), Cause> {
        let limit = self.options.timeouts.command;
        let token = BASE64.encode(encode_plain("", username, password));
        let reply = self
            .command_with(&format!("AUTH PLAIN {}", token), "AUTH PLAIN <redacted>", limit)
            .await?;
        match reply.code {
            235 => Ok(()),
            334 => {
                self.command("*", limit).await?;
                Err(SaslError::UnexpectedChallenge(SaslMechanism::Plain).into())
            }
            _ => Err(reply.into_cause()),
        }
    }

    async fn auth_login(&mut self, username: &str, password: &str) -> Result<(), Cause> {
        let limit = self.options.timeouts.command;
        let mut reply = self.command("AUTH LOGIN", limit).await?;
        for _ in 0..MAX_LOGIN_ROUNDS {
            if reply.code != 334 {
                break;
            }
            let challenge = reply.lines.first().map(String::as_str).unwrap_or("");
            let response = match login_respond_to_challenge(challenge, username, password) {
                Ok(response) => response,
                Err(e) => {
                    self.command("*", limit).await?;
                    return Err(e.into());
                }
            };
            reply = self
                .command_with(&BASE64.encode(response), "<redacted>", limit)
                .await?;
        }
        match reply.code {
            235 => Ok(()),
            334 => {
                self.command("*", limit).await?;
                Err(SaslError::UnexpectedChallenge(SaslMechanism::Login).into())
            }
            _ => Err(reply.into_cause()),
        }
    }

    /// MAIL FROM with the bare sender address.
    pub async fn declare_sender(&mut self, address: &str) -> Result<(), SendError> {
        self.expect_state("MAIL FROM", &[SessionState::Authenticated])?;
        let envelope = |cause| SendError::Envelope {
            mailbox: address.to_string(),
            cause,
        };
        check_line(address).map_err(envelope)?;
        let mut line = format!("MAIL FROM:<{}>", address);
        if self.extensions.supports("8BITMIME") {
            line.push_str(" BODY=8BITMIME");
        }
        if self.extensions.supports("SMTPUTF8") {
            line.push_str(" SMTPUTF8");
        }
        let reply = self
            .command(&line, self.options.timeouts.mail)
            .await
            .map_err(envelope)?;
        if !reply.is_positive() {
            return Err(envelope(reply.into_cause()));
        }
        self.state = SessionState::SenderDeclared;
        Ok(())
    }

    /// RCPT TO for one recipient. `mailbox` goes between the angle brackets as given.
    pub async fn declare_recipient(&mut self, mailbox: &str) -> Result<(), SendError> {
        self.expect_state(
            "RCPT TO",
            &[SessionState::SenderDeclared, SessionState::RecipientsDeclared],
        )?;
        let envelope = |cause| SendError::Envelope {
            mailbox: mailbox.to_string(),
            cause,
        };
        check_line(mailbox).map_err(envelope)?;
        let reply = self
            .command(&format!("RCPT TO:<{}>", mailbox), self.options.timeouts.rcpt)
            .await
            .map_err(envelope)?;
        if reply.code / 10 != 25 {
            return Err(envelope(reply.into_cause()));
        }
        self.state = SessionState::RecipientsDeclared;
        Ok(())
    }

    /// DATA; expects `354`.
    pub async fn open_data(&mut self) -> Result<(), SendError> {
        self.expect_state("DATA", &[SessionState::RecipientsDeclared])?;
        let reply = self
            .command("DATA", self.options.timeouts.data_init)
            .await
            .map_err(SendError::Transfer)?;
        if reply.code != 354 {
            return Err(SendError::Transfer(reply.into_cause()));
        }
        self.stuffer.reset();
        self.state = SessionState::DataOpen;
        Ok(())
    }

    /// Write a chunk of the message, dot-stuffed. May be called repeatedly.
    pub async fn write_data(&mut self, bytes: &[u8]) -> Result<(), SendError> {
        self.expect_state("message data", &[SessionState::DataOpen])?;
        let mut stuffed = Vec::with_capacity(bytes.len() + bytes.len() / 64 + 2);
        self.stuffer
            .process_chunk(bytes, |s| stuffed.extend_from_slice(s));
        self.write_raw(&stuffed, self.options.timeouts.data_block)
            .await
            .map_err(SendError::Transfer)
    }

    /// Write the end-of-data terminator and wait for `250`.
    pub async fn finish_data(&mut self) -> Result<(), SendError> {
        self.expect_state("end of data", &[SessionState::DataOpen])?;
        let mut tail = Vec::with_capacity(5);
        self.stuffer.end_message(|s| tail.extend_from_slice(s));
        self.write_raw(&tail, self.options.timeouts.data_block)
            .await
            .map_err(SendError::Transfer)?;
        let limit = self.options.timeouts.data_termination;
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| SendError::Transfer(connection_lost()))?;
        let reply = with_deadline(limit, read_reply(stream, &mut self.line_buf))
            .await
            .map_err(SendError::Transfer)?;
        if reply.code != 250 {
            return Err(SendError::Transfer(reply.into_cause()));
        }
        self.state = SessionState::Sent;
        Ok(())
    }

    /// QUIT; expects `221`. Failure here means the message was still accepted.
    pub async fn quit(&mut self) -> Result<(), SendError> {
        self.expect_state("QUIT", &[SessionState::Sent])?;
        let reply = self
            .command("QUIT", self.options.timeouts.command)
            .await
            .map_err(SendError::SessionClose)?;
        self.state = SessionState::Closed;
        if let Some(mut stream) = self.stream.take() {
            let _ = with_deadline(self.options.timeouts.command, stream.shutdown()).await;
        }
        if reply.code != 221 {
            return Err(SendError::SessionClose(reply.into_cause()));
        }
        Ok(())
    }

    /// Run the whole sequence for one message: greet, negotiate, secure, authenticate, MAIL,
    /// one RCPT per recipient (to, cc, bcc), DATA and QUIT.
    pub async fn deliver(
        &mut self,
        composed: &ComposedMessage,
        message: &MailMessage,
        credentials: &ServerCredentials,
    ) -> Result<(), SendError> {
        self.greet().await?;
        self.negotiate().await?;
        self.secure().await?;
        self.authenticate(&credentials.username, &credentials.password)
            .await?;
        self.declare_sender(&message.sender.address).await?;
        let mut count = 0usize;
        for recipient in message.recipients() {
            self.declare_recipient(&recipient.mailbox()).await?;
            count += 1;
        }
        self.open_data().await?;
        self.write_data(composed.as_bytes()).await?;
        self.finish_data().await?;
        info!(
            "message accepted by {} for {} recipient(s), {} bytes",
            self.host,
            count,
            composed.len()
        );
        self.quit().await.map_err(|e| {
            warn!("{}", e);
            e
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn parse(input: &[u8]) -> Result<Reply, Cause> {
        let mut stream = input;
        let mut buf = Vec::new();
        read_reply(&mut stream, &mut buf).await
    }

    #[tokio::test]
    async fn single_line_reply() {
        let reply = parse(b"220 mx.example.com ESMTP ready\r\n").await.unwrap();
        assert_eq!(reply.code, 220);
        assert_eq!(reply.lines, vec!["mx.example.com ESMTP ready"]);
        assert!(reply.is_positive());
    }

    #[tokio::test]
    async fn multi_line_reply_and_bare_lf() {
        let reply = parse(b"250-mx.example.com\r\n250-PIPELINING\n250 AUTH PLAIN LOGIN\r\n")
            .await
            .unwrap();
        assert_eq!(reply.code, 250);
        assert_eq!(reply.lines.len(), 3);
        assert_eq!(reply.message(), "mx.example.com PIPELINING AUTH PLAIN LOGIN");
    }

    #[tokio::test]
    async fn code_only_line() {
        let reply = parse(b"354\r\n").await.unwrap();
        assert_eq!(reply.code, 354);
        assert_eq!(reply.lines, vec![String::new()]);
    }

    #[tokio::test]
    async fn malformed_replies() {
        assert!(matches!(parse(b"hello\r\n").await, Err(Cause::Malformed(_))));
        assert!(matches!(parse(b"25\r\n").await, Err(Cause::Malformed(_))));
        assert!(matches!(parse(b"250x\r\n").await, Err(Cause::Malformed(_))));
        assert!(matches!(
            parse(b"250-first\r\n251 second\r\n").await,
            Err(Cause::Malformed(_))
        ));
        let long = format!("250 {}\r\n", "a".repeat(MAX_REPLY_LINE));
        assert!(matches!(parse(long.as_bytes()).await, Err(Cause::Malformed(_))));
    }

    #[tokio::test]
    async fn eof_mid_reply() {
        let err = parse(b"250-first\r\n250-sec").await.unwrap_err();
        match err {
            Cause::Io(e) => assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn extensions_from_ehlo() {
        let reply = Reply {
            code: 250,
            lines: vec![
                "mx.example.com greets you".into(),
                "starttls".into(),
                "AUTH LOGIN PLAIN".into(),
                "SIZE 35882577".into(),
                "8BITMIME".into(),
            ],
        };
        let ext = Extensions::parse(&reply);
        assert!(ext.supports("STARTTLS"));
        assert!(ext.supports("8bitmime"));
        assert!(!ext.supports("MX.EXAMPLE.COM"));
        assert_eq!(ext.params("auth"), Some("LOGIN PLAIN"));
        assert_eq!(ext.params("SIZE"), Some("35882577"));
        assert_eq!(ext.params("STARTTLS"), Some(""));
        assert_eq!(ext.params("CHUNKING"), None);
    }

    #[test]
    fn loopback_hosts() {
        assert!(is_loopback("localhost"));
        assert!(is_loopback("LOCALHOST"));
        assert!(is_loopback("127.0.0.1"));
        assert!(is_loopback("::1"));
        assert!(is_loopback("[::1]"));
        assert!(!is_loopback("smtp.example.com"));
        assert!(!is_loopback("10.0.0.1"));
    }

    #[test]
    fn line_breaks_refused() {
        assert!(check_line("bob@x.com").is_ok());
        assert!(check_line("bob@x.com>\r\nRCPT TO:<eve@y.com").is_err());
        assert!(check_line("a\nb").is_err());
    }

    #[tokio::test]
    async fn deadline_expires() {
        let limit = Duration::from_millis(20);
        let result: Result<(), Cause> =
            with_deadline(limit, std::future::pending::<Result<(), Cause>>()).await;
        assert!(matches!(result, Err(Cause::Timeout(d)) if d == limit));
    }

    #[test]
    fn state_names() {
        assert_eq!(SessionState::RecipientsDeclared.to_string(), "recipients declared");
        assert_eq!(SessionState::Disconnected.to_string(), "disconnected");
    }
}
