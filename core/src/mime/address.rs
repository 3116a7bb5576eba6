/*
 * address.rs
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

//! RFC 5322 mailbox grammar (the subset used for submission) and the quoted mailbox form
//! written to headers and RCPT TO.

/// A parsed mailbox: optional display name, local part and domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mailbox {
    pub display_name: Option<String>,
    pub local_part: String,
    pub domain: String,
}

impl Mailbox {
    /// local-part@domain.
    pub fn address(&self) -> String {
        format!("{}@{}", self.local_part, self.domain)
    }
}

/// Format a mailbox as `"name" <address>`. Quotes and backslashes in the name are escaped; an
/// empty name still yields `""`.
pub fn format_mailbox(display_name: &str, address: &str) -> String {
    format!("\"{}\" <{}>", quote_escape(display_name), address)
}

pub(crate) fn quote_escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

pub fn is_valid_address(value: &str) -> bool {
    parse_mailbox(value).is_some()
}

/// Parse a single mailbox: `local@domain`, `Name <local@domain>` or `"Name" <local@domain>`.
/// The whole input must be consumed.
pub fn parse_mailbox(value: &str) -> Option<Mailbox> {
    let value = value.trim();
    parse_bare(value).or_else(|| parse_named(value))
}

fn parse_bare(value: &str) -> Option<Mailbox> {
    let mut c = Cursor::new(value);
    let (local_part, domain) = parse_addr_spec(&mut c)?;
    c.at_end().then(|| Mailbox {
        display_name: None,
        local_part,
        domain,
    })
}

fn parse_named(value: &str) -> Option<Mailbox> {
    let mut c = Cursor::new(value);
    let display_name = parse_display_name(&mut c)?;
    c.skip_ws();
    c.eat('<')?;
    let (local_part, domain) = parse_addr_spec(&mut c)?;
    c.eat('>')?;
    c.skip_ws();
    c.at_end().then(|| Mailbox {
        display_name,
        local_part,
        domain,
    })
}

struct Cursor<'a> {
    s: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(s: &'a str) -> Self {
        Self { s, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.s[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn eat(&mut self, expected: char) -> Option<()> {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            Some(())
        } else {
            None
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.s.len()
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(' ' | '\t')) {
            self.pos += 1;
        }
    }
}

fn is_atext(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || "!#$%&'*+-/=?^_`{|}~".contains(ch) || !ch.is_ascii()
}

fn is_label_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '-' || !ch.is_ascii()
}

/// Phrase or quoted string before `<`; may be empty.
fn parse_display_name(c: &mut Cursor) -> Option<Option<String>> {
    c.skip_ws();
    if c.peek() == Some('"') {
        let name = parse_quoted_string(c)?;
        return Some(Some(name));
    }
    let start = c.pos;
    while let Some(ch) = c.peek() {
        if ch == '<' {
            break;
        }
        if !(is_atext(ch) || ch == ' ' || ch == '\t' || ch == '.') {
            return None;
        }
        c.bump();
    }
    let name = c.s[start..c.pos].trim();
    Some(if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    })
}

/// Body of a quoted string with escapes resolved; cursor must be on the opening quote.
fn parse_quoted_string(c: &mut Cursor) -> Option<String> {
    c.eat('"')?;
    let mut out = String::new();
    loop {
        match c.bump()? {
            '"' => return Some(out),
            '\\' => out.push(c.bump()?),
            '\r' | '\n' => return None,
            ch => out.push(ch),
        }
    }
}

fn parse_addr_spec(c: &mut Cursor) -> Option<(String, String)> {
    let local_part = if c.peek() == Some('"') {
        let start = c.pos;
        parse_quoted_string(c)?;
        c.s[start..c.pos].to_string()
    } else {
        parse_dot_atom(c, is_atext)?
    };
    c.eat('@')?;
    let domain = if c.peek() == Some('[') {
        parse_domain_literal(c)?
    } else {
        parse_dot_atom(c, is_label_char)?
    };
    Some((local_part, domain))
}

/// One or more runs of `allowed` separated by single dots.
fn parse_dot_atom(c: &mut Cursor, allowed: fn(char) -> bool) -> Option<String> {
    let start = c.pos;
    loop {
        let atom_start = c.pos;
        while c.peek().map_or(false, allowed) {
            c.bump();
        }
        if c.pos == atom_start {
            return None;
        }
        if c.peek() != Some('.') {
            break;
        }
        c.bump();
    }
    Some(c.s[start..c.pos].to_string())
}

fn parse_domain_literal(c: &mut Cursor) -> Option<String> {
    let start = c.pos;
    c.eat('[')?;
    loop {
        match c.bump()? {
            ']' => break,
            '[' | '\\' | '\r' | '\n' => return None,
            _ => {}
        }
    }
    if c.pos - start <= 2 {
        return None;
    }
    Some(c.s[start..c.pos].to_string())
}
