// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: md5mac
// File: schedule.rs

//! MD5-MAC key schedule.
//!
//! A 16-byte key is expanded into three subkeys by running plain MD5
//! compressions over key-derived blocks:
//!
//! - the IV-key replaces the MD5 initialization vector,
//! - the round-key is added into every operation of the transform,
//! - the envelope block is compressed after each message.

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use super::compress::{
	chaining_value_bytes, compress_unkeyed, ChainingValue, RoundKey,
	BLOCK_SIZE, MD5_IV,
};
use super::error::MacError;

pub const KEY_LENGTH: usize = 16;

const DERIVATION_PASSES: usize = 3;

/// Public constant rows mixed into the derivation blocks and the envelope.
const KEY_TABLE: [[u8; 16]; 3] = [
	[
		0x97, 0xEF, 0x45, 0xAC, 0x29, 0x0F, 0x43, 0xCD, 0x45, 0x7E,
		0x1B, 0x55, 0x1C, 0x80, 0x11, 0x34,
	],
	[
		0xB1, 0x77, 0xCE, 0x96, 0x2E, 0x72, 0x8E, 0x7C, 0x5F, 0x5A,
		0xAB, 0x0A, 0x36, 0x43, 0xBE, 0x18,
	],
	[
		0x9D, 0x21, 0xB4, 0x21, 0xBC, 0x87, 0xB9, 0x4D, 0xA2, 0x9D,
		0x27, 0xBD, 0xC7, 0x5B, 0xD7, 0xC3,
	],
];

/// The three subkeys derived from one MD5-MAC key.
///
/// Immutable once derived and wiped on drop. Share it between engines
/// through an `Arc` instead of re-deriving.
#[derive(Clone)]
pub struct SubkeySet {
	iv_key: ChainingValue,
	round_key: RoundKey,
	envelope: [u8; BLOCK_SIZE],
}

impl SubkeySet {
	/// Runs the key schedule on a key of the right size.
	pub fn derive(key: &[u8; KEY_LENGTH]) -> Self {
		let mut scratch = Zeroizing::new([[0u8; BLOCK_SIZE]; 2]);
		let mut words = Zeroizing::new([0u32; 4 * DERIVATION_PASSES]);

		scratch[0][..KEY_LENGTH].copy_from_slice(key);
		scratch[1][BLOCK_SIZE - KEY_LENGTH..].copy_from_slice(key);

		for pass in 0..DERIVATION_PASSES {
			for k in KEY_LENGTH..2 * BLOCK_SIZE - KEY_LENGTH {
				let row = (pass + (k - KEY_LENGTH) / 16) % 3;
				scratch[k / BLOCK_SIZE][k % BLOCK_SIZE] =
					KEY_TABLE[row][k % 16];
			}

			let mut state = MD5_IV;
			compress_unkeyed(&mut state, &scratch[0]);
			compress_unkeyed(&mut state, &scratch[1]);
			words[4 * pass..4 * pass + 4].copy_from_slice(&state);
			state.zeroize();
		}

		let mut subkeys = SubkeySet {
			iv_key: [words[0], words[1], words[2], words[3]],
			round_key: [words[4], words[5], words[6], words[7]],
			envelope: [0u8; BLOCK_SIZE],
		};

		let mut seed = [words[8], words[9], words[10], words[11]];
		subkeys.envelope[..16]
			.copy_from_slice(&chaining_value_bytes(&seed));
		seed.zeroize();
		for j in 16..BLOCK_SIZE {
			subkeys.envelope[j] =
				subkeys.envelope[j % 16] ^ KEY_TABLE[(j - 16) / 16][j % 16];
		}

		tracing::debug!("derived MD5-MAC subkeys");
		subkeys
	}

	pub fn iv_key(&self) -> &ChainingValue {
		&self.iv_key
	}

	pub fn round_key(&self) -> &RoundKey {
		&self.round_key
	}

	pub fn envelope(&self) -> &[u8; BLOCK_SIZE] {
		&self.envelope
	}
}

/// Validates the key length and runs the key schedule.
pub fn derive_subkeys(key: &[u8]) -> Result<SubkeySet, MacError> {
	let key: &[u8; KEY_LENGTH] = key
		.try_into()
		.map_err(|_| MacError::invalid_key_length(key.len()))?;
	Ok(SubkeySet::derive(key))
}

impl Zeroize for SubkeySet {
	fn zeroize(&mut self) {
		self.iv_key.zeroize();
		self.round_key.zeroize();
		self.envelope.zeroize();
	}
}

impl Drop for SubkeySet {
	fn drop(&mut self) {
		self.zeroize();
	}
}

impl ZeroizeOnDrop for SubkeySet {}

impl fmt::Debug for SubkeySet {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("SubkeySet { .. }")
	}
}
