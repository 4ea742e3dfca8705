// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: md5mac
// File: executor.rs

//! One-shot and streaming helpers for MAC computation.

use std::io::{ErrorKind, Read};

use digest::Mac;
use hex::encode;

use super::engine::{Md5Mac, Tag};
use super::error::MacError;

const MAC_BUFFER_SIZE: usize = 8192;

/// Computes the tag of `message` under `key`.
pub fn one_shot_mac(key: &[u8], message: &[u8]) -> Result<Tag, MacError> {
	let mut engine = Md5Mac::with_key(key)?;
	Ok(engine.update_finalize(message))
}

/// Feeds everything `reader` yields into `engine` and finalizes it.
pub fn consume_reader<R: Read>(
	mut reader: R,
	engine: &mut Md5Mac,
) -> Result<Tag, MacError> {
	let mut buffer = [0u8; MAC_BUFFER_SIZE];
	loop {
		let n = match reader.read(&mut buffer) {
			Ok(0) => break,
			Ok(n) => n,
			Err(err) if err.kind() == ErrorKind::Interrupted => continue,
			Err(err) => {
				// Drop what was fed so far; the engine stays reusable.
				digest::Reset::reset(engine);
				return Err(err.into());
			}
		};
		engine.update(&buffer[..n]);
	}
	Ok(engine.finalize_tag())
}

/// Computes the tag of everything `reader` yields under `key`.
pub fn mac_reader<R: Read>(key: &[u8], reader: R) -> Result<Tag, MacError> {
	let mut engine = Md5Mac::with_key(key)?;
	consume_reader(reader, &mut engine)
}

/// Checks `tag` against the tag of `message` in constant time.
pub fn verify_tag(
	key: &[u8],
	message: &[u8],
	tag: &[u8],
) -> Result<(), MacError> {
	let mut engine = Md5Mac::with_key(key)?;
	engine.update(message);
	engine.verify_slice(tag).map_err(|_| MacError::tag_mismatch())
}

pub fn tag_to_hex(tag: &[u8]) -> String {
	encode(tag)
}
