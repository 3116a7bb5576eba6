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

//! MIME for outbound mail: mailbox grammar, boundary tokens and the multipart writer.

mod address;
mod boundary;
mod builder;

pub use address::{format_mailbox, is_valid_address, parse_mailbox, Mailbox};
pub use boundary::{choose_boundary, BoundarySource, FixedBoundary, RandomBoundary, BOUNDARY_BYTES};
pub use builder::{HeaderField, MimeMessage, Part, TextSubtype};
