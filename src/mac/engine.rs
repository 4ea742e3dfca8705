// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: md5mac
// File: engine.rs

//! Streaming MD5-MAC engine.
//!
//! The engine buffers partial blocks between calls, compresses each
//! completed block with the keyed transform and, on finalization, pads the
//! message MD5-style before compressing the envelope block. Finalizing
//! returns the engine to the IV-key, so one keyed engine authenticates any
//! number of messages without re-running the key schedule.
//!
//! The encoded message length comes from a 32-bit byte counter, which is
//! what existing MD5-MAC tags were computed with: messages of 2^29 bytes or
//! more encode a wrapped bit length. The `wide-counter` feature widens the
//! counter to 64 bits.

use std::fmt;
use std::sync::Arc;

use digest::consts::U16;
use digest::crypto_common::KeySizeUser;
use digest::{
	FixedOutput, FixedOutputReset, Key, KeyInit, MacMarker, Output,
	OutputSizeUser, Reset, Update,
};
use zeroize::{Zeroize, Zeroizing};

use super::compress::{
	chaining_value_bytes, compress, compress_blocks, ChainingValue,
	BLOCK_SIZE,
};
use super::error::MacError;
use super::schedule::{derive_subkeys, SubkeySet, KEY_LENGTH};

pub const MAC_LENGTH: usize = 16;

/// Bytes reserved at the end of the final block for the bit length.
const LENGTH_FIELD: usize = 8;

pub type Tag = [u8; MAC_LENGTH];

#[cfg(not(feature = "wide-counter"))]
type ByteCount = u32;
#[cfg(feature = "wide-counter")]
type ByteCount = u64;

#[derive(Clone)]
pub struct Md5Mac {
	subkeys: Arc<SubkeySet>,
	state: ChainingValue,
	buffer: [u8; BLOCK_SIZE],
	position: usize,
	count: ByteCount,
	length_wrapped: bool,
}

impl Md5Mac {
	/// Creates an engine from already derived subkeys.
	pub fn from_subkeys(subkeys: impl Into<Arc<SubkeySet>>) -> Self {
		let subkeys = subkeys.into();
		let state = *subkeys.iv_key();
		Self {
			subkeys,
			state,
			buffer: [0u8; BLOCK_SIZE],
			position: 0,
			count: 0,
			length_wrapped: false,
		}
	}

	/// Derives subkeys from a raw key and creates an engine.
	pub fn with_key(key: &[u8]) -> Result<Self, MacError> {
		Ok(Self::from_subkeys(derive_subkeys(key)?))
	}

	pub fn subkeys(&self) -> &Arc<SubkeySet> {
		&self.subkeys
	}

	/// Feeds message bytes, compressing every block that fills up.
	pub fn update(&mut self, data: &[u8]) {
		self.advance_count(data.len());
		let mut data = data;

		if self.position > 0 {
			let take = (BLOCK_SIZE - self.position).min(data.len());
			self.buffer[self.position..self.position + take]
				.copy_from_slice(&data[..take]);
			self.position += take;
			data = &data[take..];
			if self.position < BLOCK_SIZE {
				return;
			}
			compress(&mut self.state, &self.buffer, self.subkeys.round_key());
			self.position = 0;
		}

		let rest =
			compress_blocks(&mut self.state, data, self.subkeys.round_key());
		self.buffer[..rest.len()].copy_from_slice(rest);
		self.position = rest.len();
	}

	/// Pads the message, compresses the envelope block and returns the
	/// tag. The engine is reset to the IV-key afterwards.
	pub fn finalize_tag(&mut self) -> Tag {
		let position = self.position;
		self.buffer[position] = 0x80;
		self.buffer[position + 1..].fill(0);

		if position >= BLOCK_SIZE - LENGTH_FIELD {
			compress(&mut self.state, &self.buffer, self.subkeys.round_key());
			self.buffer.fill(0);
		}

		let bit_len = u64::from(self.count.wrapping_mul(8));
		self.buffer[BLOCK_SIZE - LENGTH_FIELD..]
			.copy_from_slice(&bit_len.to_le_bytes());
		compress(&mut self.state, &self.buffer, self.subkeys.round_key());
		compress(
			&mut self.state,
			self.subkeys.envelope(),
			self.subkeys.round_key(),
		);

		let tag = chaining_value_bytes(&self.state);
		tracing::trace!(bytes = self.count, "finalized MD5-MAC message");
		self.reset_state();
		tag
	}

	/// Feeds `data` and finalizes in one call.
	pub fn update_finalize(&mut self, data: &[u8]) -> Tag {
		self.update(data);
		self.finalize_tag()
	}

	fn advance_count(&mut self, len: usize) {
		// Truncation matches the wrapping counter.
		let added = len as ByteCount;
		let (count, overflowed) = self.count.overflowing_add(added);
		let truncated = ByteCount::try_from(len).is_err();
		self.count = count;
		if !self.length_wrapped
			&& (overflowed || truncated || count.checked_mul(8).is_none())
		{
			tracing::warn!(
				"MD5-MAC message length exceeds the length counter; the encoded bit length wraps"
			);
			self.length_wrapped = true;
		}
	}

	fn reset_state(&mut self) {
		self.state = *self.subkeys.iv_key();
		self.buffer.zeroize();
		self.position = 0;
		self.count = 0;
		self.length_wrapped = false;
	}
}

impl Drop for Md5Mac {
	fn drop(&mut self) {
		self.state.zeroize();
		self.buffer.zeroize();
	}
}

impl fmt::Debug for Md5Mac {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Md5Mac")
			.field("buffered", &self.position)
			.field("count", &self.count)
			.finish_non_exhaustive()
	}
}

impl KeySizeUser for Md5Mac {
	type KeySize = U16;
}

impl KeyInit for Md5Mac {
	fn new(key: &Key<Self>) -> Self {
		let mut fixed = Zeroizing::new([0u8; KEY_LENGTH]);
		fixed.copy_from_slice(key.as_slice());
		Self::from_subkeys(SubkeySet::derive(&fixed))
	}
}

impl OutputSizeUser for Md5Mac {
	type OutputSize = U16;
}

impl Update for Md5Mac {
	fn update(&mut self, data: &[u8]) {
		Md5Mac::update(self, data);
	}
}

impl FixedOutput for Md5Mac {
	fn finalize_into(mut self, out: &mut Output<Self>) {
		out.copy_from_slice(&self.finalize_tag());
	}
}

impl Reset for Md5Mac {
	fn reset(&mut self) {
		self.reset_state();
	}
}

impl FixedOutputReset for Md5Mac {
	fn finalize_into_reset(&mut self, out: &mut Output<Self>) {
		out.copy_from_slice(&self.finalize_tag());
	}
}

impl MacMarker for Md5Mac {}
