// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: md5mac
// File: compress.rs

//! Keyed MD5 compression function.
//!
//! This is the MD5 block transform with one extra term: every operation of
//! round `r` also adds word `r` of a 4-word round key. With an all-zero round
//! key the transform is plain MD5, which the key schedule relies on.

pub const BLOCK_SIZE: usize = 64;

/// Running (A, B, C, D) state threaded through successive blocks.
pub type ChainingValue = [u32; 4];

/// One word per round, added to each of that round's 16 operations.
pub type RoundKey = [u32; 4];

/// Standard MD5 initialization vector.
pub const MD5_IV: ChainingValue =
	[0x67452301, 0xEFCDAB89, 0x98BADCFE, 0x10325476];

const ZERO_ROUND_KEY: RoundKey = [0; 4];

const SINE_TABLE: [u32; 64] = [
	0xD76AA478, 0xE8C7B756, 0x242070DB, 0xC1BDCEEE, 0xF57C0FAF,
	0x4787C62A, 0xA8304613, 0xFD469501, 0x698098D8, 0x8B44F7AF,
	0xFFFF5BB1, 0x895CD7BE, 0x6B901122, 0xFD987193, 0xA679438E,
	0x49B40821, 0xF61E2562, 0xC040B340, 0x265E5A51, 0xE9B6C7AA,
	0xD62F105D, 0x02441453, 0xD8A1E681, 0xE7D3FBC8, 0x21E1CDE6,
	0xC33707D6, 0xF4D50D87, 0x455A14ED, 0xA9E3E905, 0xFCEFA3F8,
	0x676F02D9, 0x8D2A4C8A, 0xFFFA3942, 0x8771F681, 0x6D9D6122,
	0xFDE5380C, 0xA4BEEA44, 0x4BDECFA9, 0xF6BB4B60, 0xBEBFBC70,
	0x289B7EC6, 0xEAA127FA, 0xD4EF3085, 0x04881D05, 0xD9D4D039,
	0xE6DB99E5, 0x1FA27CF8, 0xC4AC5665, 0xF4292244, 0x432AFF97,
	0xAB9423A7, 0xFC93A039, 0x655B59C3, 0x8F0CCC92, 0xFFEFF47D,
	0x85845DD1, 0x6FA87E4F, 0xFE2CE6E0, 0xA3014314, 0x4E0811A1,
	0xF7537E82, 0xBD3AF235, 0x2AD7D2BB, 0xEB86D391,
];

const SHIFTS: [[u32; 4]; 4] = [
	[7, 12, 17, 22],
	[5, 9, 14, 20],
	[4, 11, 16, 23],
	[6, 10, 15, 21],
];

const WORD_ORDER: [[usize; 16]; 4] = [
	[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15],
	[1, 6, 11, 0, 5, 10, 15, 4, 9, 14, 3, 8, 13, 2, 7, 12],
	[5, 8, 11, 14, 1, 4, 7, 10, 13, 0, 3, 6, 9, 12, 15, 2],
	[0, 7, 14, 5, 12, 3, 10, 1, 8, 15, 6, 13, 4, 11, 2, 9],
];

type RoundFn = fn(u32, u32, u32) -> u32;

const ROUND_FUNCTIONS: [RoundFn; 4] = [choose, choose_rev, parity, or_not];

#[inline(always)]
fn choose(b: u32, c: u32, d: u32) -> u32 {
	d ^ (b & (c ^ d))
}

#[inline(always)]
fn choose_rev(b: u32, c: u32, d: u32) -> u32 {
	c ^ ((b ^ c) & d)
}

#[inline(always)]
fn parity(b: u32, c: u32, d: u32) -> u32 {
	b ^ c ^ d
}

#[inline(always)]
fn or_not(b: u32, c: u32, d: u32) -> u32 {
	c ^ (b | !d)
}

/// One MD5 operation with the round-key word folded in. Returns the new
/// value for the `b` slot.
#[allow(clippy::too_many_arguments)]
#[inline(always)]
fn step(
	round_fn: RoundFn,
	a: u32,
	b: u32,
	c: u32,
	d: u32,
	word: u32,
	constant: u32,
	shift: u32,
	key_word: u32,
) -> u32 {
	a.wrapping_add(round_fn(b, c, d))
		.wrapping_add(word)
		.wrapping_add(constant)
		.wrapping_add(key_word)
		.rotate_left(shift)
		.wrapping_add(b)
}

// Each 4-byte group is byte-reversed and read big-endian, which is a
// little-endian load.
#[inline(always)]
fn load_words(block: &[u8]) -> [u32; 16] {
	debug_assert_eq!(block.len(), BLOCK_SIZE);
	let mut words = [0u32; 16];
	for (word, chunk) in words.iter_mut().zip(block.chunks_exact(4)) {
		*word =
			u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
	}
	words
}

/// Compresses one 64-byte block into `state`.
pub fn compress(
	state: &mut ChainingValue,
	block: &[u8; BLOCK_SIZE],
	round_key: &RoundKey,
) {
	compress_words(state, load_words(block), round_key);
}

/// Compresses every whole block of `data` in order and returns the
/// trailing bytes that do not fill a block.
pub(crate) fn compress_blocks<'a>(
	state: &mut ChainingValue,
	data: &'a [u8],
	round_key: &RoundKey,
) -> &'a [u8] {
	let blocks = data.chunks_exact(BLOCK_SIZE);
	let rest = blocks.remainder();
	for block in blocks {
		compress_words(state, load_words(block), round_key);
	}
	rest
}

fn compress_words(
	state: &mut ChainingValue,
	words: [u32; 16],
	round_key: &RoundKey,
) {
	let [mut a, mut b, mut c, mut d] = *state;

	for (round, round_fn) in ROUND_FUNCTIONS.iter().enumerate() {
		let key_word = round_key[round];
		for op in 0..16 {
			let next = step(
				*round_fn,
				a,
				b,
				c,
				d,
				words[WORD_ORDER[round][op]],
				SINE_TABLE[round * 16 + op],
				SHIFTS[round][op % 4],
				key_word,
			);
			a = d;
			d = c;
			c = b;
			b = next;
		}
	}

	state[0] = state[0].wrapping_add(a);
	state[1] = state[1].wrapping_add(b);
	state[2] = state[2].wrapping_add(c);
	state[3] = state[3].wrapping_add(d);
}

/// Unkeyed MD5 compression, used while no subkeys exist yet.
pub(crate) fn compress_unkeyed(
	state: &mut ChainingValue,
	block: &[u8; BLOCK_SIZE],
) {
	compress(state, block, &ZERO_ROUND_KEY);
}

/// Serializes a chaining value as four little-endian words.
pub(crate) fn chaining_value_bytes(state: &ChainingValue) -> [u8; 16] {
	let mut out = [0u8; 16];
	for (chunk, word) in out.chunks_exact_mut(4).zip(state.iter()) {
		chunk.copy_from_slice(&word.to_le_bytes());
	}
	out
}
