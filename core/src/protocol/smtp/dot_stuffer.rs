/*
 * dot_stuffer.rs
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

//! Dot stuffing for SMTP DATA (RFC 5321 §4.5.2): a `.` at the start of a line is doubled and
//! bare LF becomes CRLF, so the payload can never contain the `CRLF.CRLF` terminator.

#[derive(Clone, Copy, PartialEq, Eq)]
enum State {
    LineStart,
    Data,
    SawCr,
}

/// Streaming dot stuffer. Starts at the beginning of a line.
pub struct DotStuffer {
    state: State,
}

impl Default for DotStuffer {
    fn default() -> Self {
        Self {
            state: State::LineStart,
        }
    }
}

impl DotStuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a chunk; call `out` for each slice to send.
    pub fn process_chunk<F>(&mut self, chunk: &[u8], mut out: F)
    where
        F: FnMut(&[u8]),
    {
        let mut start = 0;
        for (i, &b) in chunk.iter().enumerate() {
            match self.state {
                State::LineStart | State::Data => {
                    if self.state == State::LineStart && b == b'.' {
                        out(&chunk[start..i]);
                        out(b".");
                        start = i;
                    }
                    self.state = State::Data;
                    if b == b'\r' {
                        self.state = State::SawCr;
                    } else if b == b'\n' {
                        out(&chunk[start..i]);
                        out(b"\r");
                        start = i;
                        self.state = State::LineStart;
                    }
                }
                State::SawCr => {
                    self.state = match b {
                        b'\n' => State::LineStart,
                        b'\r' => State::SawCr,
                        _ => State::Data,
                    };
                }
            }
        }
        if start < chunk.len() {
            out(&chunk[start..]);
        }
    }

    /// Complete a partial last line, emit the `.` CRLF terminator and reset.
    pub fn end_message<F>(&mut self, mut out: F)
    where
        F: FnMut(&[u8]),
    {
        match self.state {
            State::SawCr => out(b"\n"),
            State::Data => out(b"\r\n"),
            State::LineStart => {}
        }
        out(b".\r\n");
        self.reset();
    }

    pub fn reset(&mut self) {
        self.state = State::LineStart;
    }
}
