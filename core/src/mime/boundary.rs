/*
 * boundary.rs
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

//! Multipart boundary tokens. Randomness sits behind [`BoundarySource`] so tests can pin it.

use log::warn;
use rand::rngs::OsRng;
use rand::RngCore;

/// Random bytes per token (hex-encoded to twice as many characters).
pub const BOUNDARY_BYTES: usize = 16;

/// Redraws allowed when a candidate occurs inside the content.
const MAX_DRAWS: usize = 8;

/// Supplies candidate boundary tokens.
pub trait BoundarySource {
    fn next_boundary(&mut self) -> String;
}

/// OS randomness, hex-encoded.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomBoundary;

impl BoundarySource for RandomBoundary {
    fn next_boundary(&mut self) -> String {
        let mut bytes = [0u8; BOUNDARY_BYTES];
        OsRng.fill_bytes(&mut bytes);
        hex::encode(bytes)
    }
}

/// Always the same token.
#[derive(Debug, Clone)]
pub struct FixedBoundary(String);

impl FixedBoundary {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl BoundarySource for FixedBoundary {
    fn next_boundary(&mut self) -> String {
        self.0.clone()
    }
}

/// Draw a token whose delimiter (`--token`) does not occur in any of `contents`.
/// Gives up after a few draws and keeps the last candidate.
pub fn choose_boundary(source: &mut dyn BoundarySource, contents: &[&[u8]]) -> String {
    let mut candidate = source.next_boundary();
    for _ in 1..MAX_DRAWS {
        if !collides(&candidate, contents) {
            return candidate;
        }
        candidate = source.next_boundary();
    }
    if collides(&candidate, contents) {
        warn!("boundary {} occurs in message content", candidate);
    }
    candidate
}

fn collides(token: &str, contents: &[&[u8]]) -> bool {
    let delimiter = format!("--{}", token);
    let needle = delimiter.as_bytes();
    contents
        .iter()
        .any(|c| c.windows(needle.len()).any(|w| w == needle))
}
