// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: md5mac
// File: key.rs

//! Helper utilities for loading MD5-MAC keys from files, hex strings, or
//! inline bytes.

use std::fs;
use std::path::PathBuf;

use zeroize::Zeroizing;

use super::error::{MacError, MacErrorKind};
use super::schedule::KEY_LENGTH;

#[derive(Debug)]
pub enum KeySource {
	/// Raw key bytes stored in a file.
	File(PathBuf),
	/// Hex-encoded key, surrounding whitespace ignored.
	Hex(Zeroizing<String>),
	Inline(Zeroizing<Vec<u8>>),
}

impl KeySource {
	pub fn description(&self) -> &'static str {
		match self {
			KeySource::File(_) => "file",
			KeySource::Hex(_) => "hex",
			KeySource::Inline(_) => "inline",
		}
	}
}

/// Loads a key and checks that it is exactly 16 bytes long.
pub fn load_key(
	source: &KeySource,
) -> Result<Zeroizing<[u8; KEY_LENGTH]>, MacError> {
	let bytes = read_key_bytes(source)?;
	validate_key_length(&bytes)
}

fn read_key_bytes(
	source: &KeySource,
) -> Result<Zeroizing<Vec<u8>>, MacError> {
	match source {
		KeySource::File(path) => {
			fs::read(path).map(Zeroizing::new).map_err(|err| {
				MacError::new(
					MacErrorKind::InvalidKey,
					format!(
						"failed to read key file `{}`: {}",
						path.display(),
						err
					),
				)
			})
		}
		KeySource::Hex(text) => {
			hex::decode(text.trim()).map(Zeroizing::new).map_err(|err| {
				MacError::new(
					MacErrorKind::InvalidKey,
					format!("key is not valid hex: {}", err),
				)
			})
		}
		KeySource::Inline(bytes) => {
			if bytes.is_empty() {
				Err(MacError::new(
					MacErrorKind::InvalidKey,
					"inline key must not be empty",
				))
			} else {
				Ok(bytes.clone())
			}
		}
	}
}

/// Validates the fixed MD5-MAC key length.
pub fn validate_key_length(
	key: &[u8],
) -> Result<Zeroizing<[u8; KEY_LENGTH]>, MacError> {
	if key.len() != KEY_LENGTH {
		return Err(MacError::invalid_key_length(key.len()));
	}
	let mut fixed = Zeroizing::new([0u8; KEY_LENGTH]);
	fixed.copy_from_slice(key);
	Ok(fixed)
}
