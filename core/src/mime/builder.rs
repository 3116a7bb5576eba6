/*
 * builder.rs
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

//! Structured multipart/mixed writer: an ordered list of header fields and typed parts,
//! serialized once into a pre-sized buffer.

use super::address::quote_escape;

const CRLF: &[u8] = b"\r\n";

/// One header line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderField {
    name: &'static str,
    value: String,
    compact: bool,
}

impl HeaderField {
    /// `Name: value`. CR and LF in the value become spaces so it stays on one line.
    pub fn new(name: &'static str, value: impl Into<String>) -> Self {
        Self {
            name,
            value: single_line(value.into()),
            compact: false,
        }
    }

    /// `Name:value`, without the space after the colon.
    pub fn compact(name: &'static str, value: impl Into<String>) -> Self {
        Self {
            compact: true,
            ..Self::new(name, value)
        }
    }

    pub fn name(&self) -> &str {
        self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    fn encoded_len(&self) -> usize {
        self.name.len() + 1 + usize::from(!self.compact) + self.value.len() + CRLF.len()
    }

    fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self.name.as_bytes());
        out.extend_from_slice(if self.compact { b":" } else { b": " });
        out.extend_from_slice(self.value.as_bytes());
        out.extend_from_slice(CRLF);
    }
}

fn single_line(value: String) -> String {
    if value.contains(['\r', '\n']) {
        value.replace(['\r', '\n'], " ")
    } else {
        value
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSubtype {
    Plain,
    Html,
}

impl TextSubtype {
    fn content_type(self) -> &'static str {
        match self {
            TextSubtype::Plain => "text/plain; charset=utf-8",
            TextSubtype::Html => "text/html; charset=utf-8",
        }
    }
}

/// A body part of the multipart container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    Text { subtype: TextSubtype, content: String },
    /// Binary file, already base64-encoded.
    Attachment { filename: String, encoded: String },
}

impl Part {
    pub fn headers(&self) -> Vec<HeaderField> {
        match self {
            Part::Text { subtype, .. } => {
                vec![HeaderField::new("Content-Type", subtype.content_type())]
            }
            Part::Attachment { filename, .. } => {
                let filename = quote_escape(filename);
                vec![
                    HeaderField::new(
                        "Content-Type",
                        format!("application/octet-stream; name=\"{}\"", filename),
                    ),
                    HeaderField::new(
                        "Content-Disposition",
                        format!("attachment; filename=\"{}\"", filename),
                    ),
                    HeaderField::new("Content-Transfer-Encoding", "base64"),
                ]
            }
        }
    }

    pub fn body(&self) -> &str {
        match self {
            Part::Text { content, .. } => content,
            Part::Attachment { encoded, .. } => encoded,
        }
    }
}

/// Top-level headers plus parts; the multipart Content-Type header is added on serialization.
/// No closing delimiter is written.
#[derive(Debug, Clone)]
pub struct MimeMessage {
    headers: Vec<HeaderField>,
    boundary: String,
    parts: Vec<Part>,
}

impl MimeMessage {
    pub fn new(boundary: impl Into<String>) -> Self {
        Self {
            headers: Vec::new(),
            boundary: boundary.into(),
            parts: Vec::new(),
        }
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    pub fn push_header(&mut self, field: HeaderField) -> &mut Self {
        self.headers.push(field);
        self
    }

    pub fn push_part(&mut self, part: Part) -> &mut Self {
        self.parts.push(part);
        self
    }

    pub fn headers(&self) -> &[HeaderField] {
        &self.headers
    }

    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    fn content_type(&self) -> HeaderField {
        HeaderField::new(
            "Content-Type",
            format!("multipart/mixed; boundary=\"{}\"", self.boundary),
        )
    }

    pub fn serialize(&self) -> Vec<u8> {
        let content_type = self.content_type();
        let delimiter_len = 2 + self.boundary.len() + CRLF.len();
        let size = self.headers.iter().map(HeaderField::encoded_len).sum::<usize>()
            + content_type.encoded_len()
            + CRLF.len()
            + self
                .parts
                .iter()
                .map(|p| {
                    delimiter_len
                        + p.headers().iter().map(HeaderField::encoded_len).sum::<usize>()
                        + CRLF.len()
                        + p.body().len()
                        + 2 * CRLF.len()
                })
                .sum::<usize>();

        let mut out = Vec::with_capacity(size);
        for field in &self.headers {
            field.write_to(&mut out);
        }
        content_type.write_to(&mut out);
        out.extend_from_slice(CRLF);
        for part in &self.parts {
            out.extend_from_slice(b"--");
            out.extend_from_slice(self.boundary.as_bytes());
            out.extend_from_slice(CRLF);
            for field in part.headers() {
                field.write_to(&mut out);
            }
            out.extend_from_slice(CRLF);
            out.extend_from_slice(part.body().as_bytes());
            out.extend_from_slice(CRLF);
            out.extend_from_slice(CRLF);
        }
        debug_assert_eq!(out.len(), size);
        out
    }
}
