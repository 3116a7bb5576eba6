/*
 * message.rs
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

//! Outbound message description (sender, recipients, bodies, attachments) and server credentials.

use std::fmt;
use std::path::PathBuf;

use serde::Deserialize;

use crate::mime::format_mailbox;

/// A mailbox: optional display name plus address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EmailAddress {
    #[serde(default)]
    pub display_name: Option<String>,
    pub address: String,
}

impl EmailAddress {
    pub fn new(display_name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            display_name: Some(display_name.into()),
            address: address.into(),
        }
    }

    /// Address without a display name.
    pub fn bare(address: impl Into<String>) -> Self {
        Self {
            display_name: None,
            address: address.into(),
        }
    }

    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or("")
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// `"name" <address>`: the form used in headers and as the RCPT TO target.
    pub fn mailbox(&self) -> String {
        format_mailbox(self.display_name(), &self.address)
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.mailbox())
    }
}

/// X-Priority levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(u8)]
pub enum Priority {
    Highest = 1,
    High = 2,
    #[default]
    Normal = 3,
    Low = 4,
    Lowest = 5,
}

impl Priority {
    /// Map a numeric level; anything outside 1..=5 (including 0, "unset") becomes Normal.
    pub fn from_level(level: u8) -> Self {
        match level {
            1 => Priority::Highest,
            2 => Priority::High,
            3 => Priority::Normal,
            4 => Priority::Low,
            5 => Priority::Lowest,
            _ => Priority::Normal,
        }
    }

    pub fn level(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            Priority::Highest => "Highest",
            Priority::High => "High",
            Priority::Normal => "Normal",
            Priority::Low => "Low",
            Priority::Lowest => "Lowest",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.level(), self.label())
    }
}

/// Everything needed to compose and address one outbound email.
#[derive(Debug, Clone, Default)]
pub struct MailMessage {
    pub sender: EmailAddress,
    pub to: Vec<EmailAddress>,
    pub cc: Vec<EmailAddress>,
    /// Envelope-only recipients; never written to a header.
    pub bcc: Vec<EmailAddress>,
    /// Full paths of files to attach, in order.
    pub attachments: Vec<PathBuf>,
    pub subject: String,
    pub html_body: Option<String>,
    pub text_body: Option<String>,
    /// 0 means unset; see [`Priority::from_level`].
    pub priority: u8,
    pub language: Option<String>,
    pub user_agent: Option<String>,
    /// Read-receipt address (Disposition-Notification-To).
    pub disposition_notification_to: Option<String>,
}

impl MailMessage {
    pub fn new(sender: EmailAddress, subject: impl Into<String>) -> Self {
        Self {
            sender,
            subject: subject.into(),
            ..Self::default()
        }
    }

    pub fn priority(&self) -> Priority {
        Priority::from_level(self.priority)
    }

    /// Envelope recipients in RCPT order: to, cc, then bcc.
    pub fn recipients(&self) -> impl Iterator<Item = &EmailAddress> {
        self.to.iter().chain(&self.cc).chain(&self.bcc)
    }
}

/// SMTP server endpoint and login. `port` is wider than `u16` so that out-of-range input
/// reaches the validation gate instead of failing at parse time.
#[derive(Clone, Default, Deserialize)]
pub struct ServerCredentials {
    pub host: String,
    pub port: u32,
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl ServerCredentials {
    pub fn new(
        host: impl Into<String>,
        port: u32,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for ServerCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerCredentials")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_labels() {
        let labels: Vec<_> = (1..=5).map(|l| Priority::from_level(l).label()).collect();
        assert_eq!(labels, ["Highest", "High", "Normal", "Low", "Lowest"]);
    }

    #[test]
    fn priority_out_of_range_is_normal() {
        for level in [0, 6, 9, 255] {
            assert_eq!(Priority::from_level(level), Priority::Normal);
        }
        assert_eq!(Priority::from_level(0).to_string(), "3 (Normal)");
    }

    #[test]
    fn recipients_in_envelope_order() {
        let mut m = MailMessage::new(EmailAddress::bare("a@x.com"), "s");
        m.to.push(EmailAddress::bare("to@x.com"));
        m.cc.push(EmailAddress::bare("cc@x.com"));
        m.bcc.push(EmailAddress::bare("bcc@x.com"));
        let order: Vec<_> = m.recipients().map(EmailAddress::address).collect();
        assert_eq!(order, ["to@x.com", "cc@x.com", "bcc@x.com"]);
    }

    #[test]
    fn mailbox_quotes_display_name() {
        assert_eq!(EmailAddress::new("Bob", "bob@x.com").mailbox(), "\"Bob\" <bob@x.com>");
        assert_eq!(EmailAddress::bare("bob@x.com").mailbox(), "\"\" <bob@x.com>");
    }

    #[test]
    fn credentials_debug_hides_password() {
        let c = ServerCredentials::new("smtp.x.com", 587, "bob", "hunter2");
        let shown = format!("{:?}", c);
        assert!(!shown.contains("hunter2"));
        assert!(shown.contains("smtp.x.com"));
    }
}
