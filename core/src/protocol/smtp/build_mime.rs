/*
 * build_mime.rs
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

//! Build the DATA payload (headers + multipart/mixed body) from a [`MailMessage`].
//!
//! The layout is fixed: From, To, Cc and Subject in compact `Name:value` form, optional
//! read-receipt, X-Priority, Content-Language and User-Agent, then the multipart header and one
//! part per body and readable attachment. There is no closing delimiter; receiving servers
//! accept the truncated form.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use log::{debug, warn};

use crate::message::{EmailAddress, MailMessage};
use crate::mime::{
    choose_boundary, format_mailbox, BoundarySource, HeaderField, MimeMessage, Part,
    RandomBoundary, TextSubtype,
};

const HTML_SHELL_HEAD: &str = "\r\n<!DOCTYPE html>\r\n<html>\r\n  <head>\r\n    \
<meta http-equiv=\"content-type\" content=\"text/html; charset=UTF-8\">\r\n  </head>\r\n  \
<body>\r\n    ";
const HTML_SHELL_TAIL: &str = "\r\n  </body>\r\n</html>\r\n";

/// An attachment that could not be read and was left out of the message.
#[derive(Debug)]
pub struct SkippedAttachment {
    pub path: PathBuf,
    pub error: io::Error,
}

/// The complete DATA payload for one send. Built once and not modified afterwards.
#[derive(Debug)]
pub struct ComposedMessage {
    bytes: Vec<u8>,
    boundary: String,
    skipped: Vec<SkippedAttachment>,
}

impl ComposedMessage {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Top-level header lines, up to (not including) the blank line that ends them.
    pub fn header_block(&self) -> &[u8] {
        let end = self
            .bytes
            .windows(4)
            .position(|w| w == b"\r\n\r\n")
            .map_or(self.bytes.len(), |p| p + 2);
        &self.bytes[..end]
    }

    /// Attachments dropped because they could not be read.
    pub fn skipped_attachments(&self) -> &[SkippedAttachment] {
        &self.skipped
    }
}

/// Compose with a fresh random boundary.
pub fn compose(message: &MailMessage) -> ComposedMessage {
    compose_with(message, &mut RandomBoundary)
}

/// Compose drawing the boundary from `source`.
pub fn compose_with(message: &MailMessage, source: &mut dyn BoundarySource) -> ComposedMessage {
    let mut parts = body_parts(message);
    let mut skipped = Vec::new();
    for path in &message.attachments {
        match attachment_part(path) {
            Ok(part) => parts.push(part),
            Err(error) => {
                warn!("skipping attachment {}: {}", path.display(), error);
                skipped.push(SkippedAttachment {
                    path: path.clone(),
                    error,
                });
            }
        }
    }

    let contents: Vec<&[u8]> = parts.iter().map(|p| p.body().as_bytes()).collect();
    let boundary = choose_boundary(source, &contents);

    let mut mime = MimeMessage::new(boundary.clone());
    for field in header_fields(message) {
        mime.push_header(field);
    }
    for part in parts {
        mime.push_part(part);
    }
    let bytes = mime.serialize();
    debug!(
        "composed {} bytes, {} part(s), {} attachment(s) skipped",
        bytes.len(),
        mime.parts().len(),
        skipped.len()
    );
    ComposedMessage {
        bytes,
        boundary,
        skipped,
    }
}

fn address_list(list: &[EmailAddress]) -> String {
    list.iter()
        .map(|a| a.mailbox())
        .collect::<Vec<_>>()
        .join(",")
}

fn header_fields(message: &MailMessage) -> Vec<HeaderField> {
    let mut fields = vec![
        HeaderField::compact("From", message.sender.mailbox()),
        HeaderField::compact("To", address_list(&message.to)),
        HeaderField::compact("Cc", address_list(&message.cc)),
        HeaderField::compact("Subject", message.subject.as_str()),
    ];
    if let Some(receipt) = non_empty(&message.disposition_notification_to) {
        fields.push(HeaderField::new(
            "Disposition-Notification-To",
            format_mailbox(receipt, receipt),
        ));
    }
    fields.push(HeaderField::new("X-Priority", message.priority().to_string()));
    if let Some(language) = non_empty(&message.language) {
        fields.push(HeaderField::new("Content-Language", language));
    }
    if let Some(user_agent) = non_empty(&message.user_agent) {
        fields.push(HeaderField::new("User-Agent", user_agent));
    }
    fields
}

fn body_parts(message: &MailMessage) -> Vec<Part> {
    let mut parts = Vec::new();
    if let Some(text) = non_empty(&message.text_body) {
        parts.push(Part::Text {
            subtype: TextSubtype::Plain,
            content: text.to_string(),
        });
    }
    if let Some(html) = non_empty(&message.html_body) {
        parts.push(Part::Text {
            subtype: TextSubtype::Html,
            content: format!("{}{}{}", HTML_SHELL_HEAD, html, HTML_SHELL_TAIL),
        });
    }
    parts
}

fn attachment_part(path: &Path) -> io::Result<Part> {
    let content = fs::read(path)?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(Part::Attachment {
        filename,
        encoded: BASE64.encode(content),
    })
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}
