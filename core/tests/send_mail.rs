/*
 * send_mail.rs
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

//! Blocking and async entry points against a loopback SMTP stub.

use std::io::{BufRead, BufReader, ErrorKind as IoErrorKind, Write};
use std::net::TcpListener;
use std::thread;
use std::time::Duration;

use postino_core::{
    send_mail, send_mail_async, EmailAddress, ErrorKind, MailMessage, ServerCredentials,
    SessionOptions, SmtpMailer, Timeouts,
};

struct Received {
    commands: Vec<String>,
    data: String,
}

/// Serve one connection on 127.0.0.1: no STARTTLS, AUTH PLAIN, optional RCPT rejection.
fn start_stub(reject_rcpt: bool) -> (u16, thread::JoinHandle<Received>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut writer = stream.try_clone().unwrap();
        let mut reader = BufReader::new(stream);
        let mut received = Received {
            commands: Vec::new(),
            data: String::new(),
        };
        writer.write_all(b"220 localhost ESMTP stub\r\n").unwrap();
        let mut line = String::new();
        loop {
            line.clear();
            if reader.read_line(&mut line).unwrap_or(0) == 0 {
                break;
            }
            let command = line.trim_end().to_string();
            received.commands.push(command.clone());
            let reply: &[u8] = if command.starts_with("EHLO") {
                b"250-localhost\r\n250 AUTH PLAIN\r\n"
            } else if command.starts_with("AUTH") {
                b"235 2.7.0 ok\r\n"
            } else if command.starts_with("RCPT") && reject_rcpt {
                b"550 5.1.1 unknown\r\n"
            } else if command == "DATA" {
                writer.write_all(b"354 go ahead\r\n").unwrap();
                loop {
                    line.clear();
                    if reader.read_line(&mut line).unwrap_or(0) == 0 || line == ".\r\n" {
                        break;
                    }
                    received.data.push_str(&line);
                }
                b"250 2.0.0 queued\r\n"
            } else if command == "QUIT" {
                let _ = writer.write_all(b"221 bye\r\n");
                break;
            } else {
                b"250 ok\r\n"
            };
            if writer.write_all(reply).is_err() {
                break;
            }
        }
        received
    });
    (port, handle)
}

fn message() -> MailMessage {
    let mut m = MailMessage::new(EmailAddress::new("Alice", "alice@example.com"), "Hi");
    m.to.push(EmailAddress::new("Bob", "bob@x.com"));
    m.text_body = Some("hello".into());
    m
}

fn credentials(port: u16) -> ServerCredentials {
    ServerCredentials::new("127.0.0.1", u32::from(port), "alice", "secret")
}

#[test]
fn blocking_send_over_loopback() {
    let (port, stub) = start_stub(false);
    send_mail(&message(), &credentials(port)).unwrap();

    let received = stub.join().unwrap();
    assert_eq!(received.commands[0], "EHLO localhost");
    assert!(received.commands.iter().any(|c| c.starts_with("AUTH PLAIN ")));
    assert!(received
        .commands
        .contains(&"RCPT TO:<\"Bob\" <bob@x.com>>".to_string()));
    assert_eq!(received.commands.last().map(String::as_str), Some("QUIT"));
    assert!(received.data.starts_with("From:\"Alice\" <alice@example.com>\r\n"));
    assert!(received.data.contains("\r\n\r\nhello\r\n"));
}

#[test]
fn mailer_uses_configured_hostname() {
    let (port, stub) = start_stub(false);
    let mut mailer = SmtpMailer::new(credentials(port));
    mailer
        .set_ehlo_hostname("client.example.net")
        .set_timeouts(Timeouts::uniform(Duration::from_secs(5)));
    mailer.send(&message()).unwrap();
    assert_eq!(stub.join().unwrap().commands[0], "EHLO client.example.net");
}

#[test]
fn rejected_recipient_surfaces_envelope_error() {
    let (port, stub) = start_stub(true);
    let err = send_mail(&message(), &credentials(port)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Envelope);
    assert!(!err.message_accepted());
    let received = stub.join().unwrap();
    assert!(!received.commands.iter().any(|c| c == "DATA"));
}

#[tokio::test]
async fn async_send_over_loopback() {
    let (port, stub) = start_stub(false);
    send_mail_async(&message(), &credentials(port), SessionOptions::default())
        .await
        .unwrap();
    let received = tokio::task::spawn_blocking(move || stub.join().unwrap())
        .await
        .unwrap();
    assert!(received.data.contains("Subject:Hi\r\n"));
}

#[test]
fn invalid_settings_never_connect() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.set_nonblocking(true).unwrap();
    let port = u32::from(listener.local_addr().unwrap().port());
    let good = ServerCredentials::new("127.0.0.1", port, "alice", "secret");

    let mut cases: Vec<(MailMessage, ServerCredentials)> = Vec::new();
    cases.push((message(), ServerCredentials { host: String::new(), ..good.clone() }));
    cases.push((message(), ServerCredentials { port: 0, ..good.clone() }));
    cases.push((message(), ServerCredentials { port: 70000, ..good.clone() }));
    cases.push((message(), ServerCredentials { username: String::new(), ..good.clone() }));
    let mut no_to = message();
    no_to.to.clear();
    cases.push((no_to, good.clone()));
    let mut bad_sender = message();
    bad_sender.sender = EmailAddress::new("Alice", "not an address");
    cases.push((bad_sender, good.clone()));
    let mut long_language = message();
    long_language.language = Some("en-GBx".into());
    cases.push((long_language, good.clone()));
    let mut bad_priority = message();
    bad_priority.priority = 6;
    cases.push((bad_priority, good.clone()));

    for (i, (m, c)) in cases.iter().enumerate() {
        let err = send_mail(m, c).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfiguration, "case {}", i);
        assert_eq!(err.to_string(), "invalid settings");
    }
    match listener.accept() {
        Err(e) => assert_eq!(e.kind(), IoErrorKind::WouldBlock),
        Ok(_) => panic!("validation failure still connected"),
    }
}

#[test]
fn connection_refused() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let err = send_mail(&message(), &credentials(port)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Connection);
}
