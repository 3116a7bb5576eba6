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

//! Scripted in-memory SMTP peer for session tests.

#![allow(dead_code)]

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use postino_core::net::Connection;
use tokio::io::{
    AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, DuplexStream, ReadBuf,
};
use tokio::task::JoinHandle;

/// Client half of the pipe. `start_tls` just flips `secure` (or fails when `fail_tls`).
pub struct MockConnection {
    io: DuplexStream,
    pub secure: bool,
    pub fail_tls: bool,
    /// Never complete `poll_shutdown`, like a TLS peer that stopped reading.
    pub stall_shutdown: bool,
}

impl Connection for MockConnection {
    fn is_secure(&self) -> bool {
        self.secure
    }

    async fn start_tls(mut self, _host: &str, _accept_invalid_certs: bool) -> io::Result<Self> {
        if self.fail_tls {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "handshake failure",
            ));
        }
        self.secure = true;
        Ok(self)
    }
}

impl AsyncRead for MockConnection {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().io).poll_read(cx, buf)
    }
}

impl AsyncWrite for MockConnection {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.get_mut().io).poll_write(cx, buf)
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().io).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        if self.stall_shutdown {
            return Poll::Pending;
        }
        Pin::new(&mut self.get_mut().io).poll_shutdown(cx)
    }
}

/// What the server saw: each command line (CRLF stripped) and the unstuffed DATA payload.
#[derive(Debug, Default)]
pub struct Transcript {
    pub commands: Vec<String>,
    pub data: Vec<u8>,
}

impl Transcript {
    pub fn saw(&self, prefix: &str) -> bool {
        self.commands.iter().any(|c| c.starts_with(prefix))
    }
}

/// Server behaviour. Defaults accept everything and offer STARTTLS plus AUTH PLAIN LOGIN.
pub struct StubServer {
    /// EHLO lines after the greeting name.
    pub ehlo: Vec<&'static str>,
    pub reject_ehlo: bool,
    pub reject_auth: bool,
    /// Zero-based RCPT index to answer with 550.
    pub reject_rcpt_at: Option<usize>,
    pub quit_code: u16,
    /// Stop answering once a command with this prefix arrives.
    pub stall_on: Option<&'static str>,
}

impl Default for StubServer {
    fn default() -> Self {
        Self {
            ehlo: vec!["STARTTLS", "AUTH PLAIN LOGIN"],
            reject_ehlo: false,
            reject_auth: false,
            reject_rcpt_at: None,
            quit_code: 221,
            stall_on: None,
        }
    }
}

async fn read_line(reader: &mut BufReader<DuplexStream>) -> Option<Vec<u8>> {
    let mut line = Vec::new();
    match reader.read_until(b'\n', &mut line).await {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line),
    }
}

fn trim_crlf(line: &[u8]) -> String {
    let mut end = line.len();
    while end > 0 && (line[end - 1] == b'\n' || line[end - 1] == b'\r') {
        end -= 1;
    }
    String::from_utf8_lossy(&line[..end]).into_owned()
}

impl StubServer {
    /// Start the server task; returns the client end and a handle yielding the transcript once
    /// the client quits or hangs up.
    pub fn spawn(self) -> (MockConnection, JoinHandle<Transcript>) {
        let (client, server) = tokio::io::duplex(64 * 1024);
        let handle = tokio::spawn(self.run(server));
        let conn = MockConnection {
            io: client,
            secure: false,
            fail_tls: false,
            stall_shutdown: false,
        };
        (conn, handle)
    }

    async fn run(self, io: DuplexStream) -> Transcript {
        let mut reader = BufReader::new(io);
        let mut transcript = Transcript::default();
        let mut rcpt_count = 0usize;
        macro_rules! reply {
            ($($arg:tt)*) => {
                if reader
                    .get_mut()
                    .write_all(format!("{}\r\n", format!($($arg)*)).as_bytes())
                    .await
                    .is_err()
                {
                    return transcript;
                }
            };
        }

        reply!("220 stub.example.com ESMTP ready");
        while let Some(raw) = read_line(&mut reader).await {
            let line = trim_crlf(&raw);
            transcript.commands.push(line.clone());
            if let Some(prefix) = self.stall_on {
                if line.starts_with(prefix) {
                    std::future::pending::<()>().await;
                }
            }
            let verb = line
                .split(|c: char| c == ' ' || c == ':')
                .next()
                .unwrap_or("")
                .to_uppercase();
            match verb.as_str() {
                "EHLO" if self.reject_ehlo => reply!("502 5.5.1 EHLO not implemented"),
                "EHLO" => {
                    if self.ehlo.is_empty() {
                        reply!("250 stub.example.com");
                    } else {
                        reply!("250-stub.example.com");
                        for (i, ext) in self.ehlo.iter().enumerate() {
                            let sep = if i + 1 == self.ehlo.len() { ' ' } else { '-' };
                            reply!("250{}{}", sep, ext);
                        }
                    }
                }
                "HELO" => reply!("250 stub.example.com"),
                "STARTTLS" => reply!("220 2.0.0 ready to start TLS"),
                "AUTH" if self.reject_auth => reply!("535 5.7.8 authentication failed"),
                "AUTH" if line.eq_ignore_ascii_case("AUTH LOGIN") => {
                    reply!("334 VXNlcm5hbWU6");
                    let Some(user) = read_line(&mut reader).await else {
                        return transcript;
                    };
                    transcript.commands.push(trim_crlf(&user));
                    reply!("334 UGFzc3dvcmQ6");
                    let Some(pass) = read_line(&mut reader).await else {
                        return transcript;
                    };
                    transcript.commands.push(trim_crlf(&pass));
                    reply!("235 2.7.0 authenticated");
                }
                "AUTH" => reply!("235 2.7.0 authenticated"),
                "MAIL" => reply!("250 2.1.0 sender ok"),
                "RCPT" => {
                    let index = rcpt_count;
                    rcpt_count += 1;
                    if self.reject_rcpt_at == Some(index) {
                        reply!("550 5.1.1 no such user");
                    } else {
                        reply!("250 2.1.5 recipient ok");
                    }
                }
                "DATA" => {
                    reply!("354 end data with <CR><LF>.<CR><LF>");
                    loop {
                        let Some(data_line) = read_line(&mut reader).await else {
                            return transcript;
                        };
                        if data_line == b".\r\n" {
                            break;
                        }
                        let unstuffed = if data_line.starts_with(b"..") {
                            &data_line[1..]
                        } else {
                            &data_line[..]
                        };
                        transcript.data.extend_from_slice(unstuffed);
                    }
                    reply!("250 2.0.0 queued as 4F2A1");
                }
                "QUIT" => {
                    reply!("{} 2.0.0 bye", self.quit_code);
                    break;
                }
                "*" => reply!("501 5.7.0 authentication cancelled"),
                _ => reply!("500 5.5.2 command not recognized"),
            }
        }
        transcript
    }
}
