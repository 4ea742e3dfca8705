// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: md5mac

use std::collections::HashSet;
use std::io::{self, Cursor, Read};
use std::sync::Arc;

use digest::{KeyInit, Mac};
use hex_literal::hex;
use md5mac::mac::executor::{consume_reader, mac_reader, verify_tag};
use md5mac::{derive_subkeys, one_shot_mac, MacErrorKind, Md5Mac};
use proptest::prelude::*;

const KEY: [u8; 16] = hex!("00112233445566778899aabbccddeeff");

fn sample_message(len: usize) -> Vec<u8> {
	(0..len).map(|i| (i * 31 + 7) as u8).collect()
}

#[test]
fn one_shot_is_deterministic() {
	let message = sample_message(1000);
	let first = one_shot_mac(&KEY, &message).unwrap();
	for _ in 0..5 {
		assert_eq!(one_shot_mac(&KEY, &message).unwrap(), first);
	}
}

#[test]
fn byte_at_a_time_matches_single_update() {
	for len in [0usize, 1, 55, 56, 63, 64, 65, 127, 128, 129, 1000] {
		let message = sample_message(len);
		let mut engine = Md5Mac::with_key(&KEY).unwrap();
		for byte in &message {
			engine.update(std::slice::from_ref(byte));
		}
		assert_eq!(
			engine.finalize_tag(),
			one_shot_mac(&KEY, &message).unwrap(),
			"length {}",
			len
		);
	}
}

#[test]
fn every_length_up_to_three_blocks_finalizes() {
	let mut seen = HashSet::new();
	for len in 0..=192 {
		let tag = one_shot_mac(&KEY, &sample_message(len)).unwrap();
		assert!(seen.insert(tag), "collision at length {}", len);
	}
}

#[test]
fn engine_reuse_matches_fresh_engines() {
	let first = sample_message(70);
	let second = b"a second, unrelated message";

	let mut engine = Md5Mac::with_key(&KEY).unwrap();
	engine.update(&first);
	let tag_first = engine.finalize_tag();
	engine.update(second);
	let tag_second = engine.finalize_tag();

	assert_eq!(tag_first, one_shot_mac(&KEY, &first).unwrap());
	assert_eq!(tag_second, one_shot_mac(&KEY, second).unwrap());
}

#[test]
fn flipping_any_key_bit_changes_the_tag() {
	for len in [0usize, 3, 64, 200] {
		let message = sample_message(len);
		let baseline = one_shot_mac(&KEY, &message).unwrap();
		for bit in 0..128 {
			let mut key = KEY;
			key[bit / 8] ^= 1 << (bit % 8);
			assert_ne!(
				one_shot_mac(&key, &message).unwrap(),
				baseline,
				"key bit {} with length {}",
				bit,
				len
			);
		}
	}
}

#[test]
fn flipping_any_message_bit_changes_the_tag() {
	let message = sample_message(130);
	let baseline = one_shot_mac(&KEY, &message).unwrap();
	for bit in 0..message.len() * 8 {
		let mut altered = message.clone();
		altered[bit / 8] ^= 1 << (bit % 8);
		assert_ne!(
			one_shot_mac(&KEY, &altered).unwrap(),
			baseline,
			"message bit {}",
			bit
		);
	}
}

#[test]
fn tag_bits_are_balanced_across_keys() {
	// Average Hamming distance between tags of related keys sits near 64.
	let message = b"avalanche";
	let mut total = 0u32;
	let mut samples = 0u32;
	for i in 0..64u8 {
		let mut key = KEY;
		key[0] = i;
		let a = one_shot_mac(&key, message).unwrap();
		key[15] ^= 0x80;
		let b = one_shot_mac(&key, message).unwrap();
		total += a
			.iter()
			.zip(b.iter())
			.map(|(x, y)| (x ^ y).count_ones())
			.sum::<u32>();
		samples += 1;
	}
	let mean = total / samples;
	assert!((48..=80).contains(&mean), "mean distance {}", mean);
}

#[test]
fn rejects_bad_key_lengths() {
	for len in [0usize, 15, 17] {
		let key = vec![1u8; len];
		let err = derive_subkeys(&key).unwrap_err();
		assert_eq!(err.kind(), MacErrorKind::InvalidKeyLength);
		assert_eq!(
			Md5Mac::with_key(&key).unwrap_err().kind(),
			MacErrorKind::InvalidKeyLength
		);
	}
	assert!(derive_subkeys(&[1u8; 16]).is_ok());
}

#[test]
fn shared_subkeys_serve_many_engines() {
	let subkeys = Arc::new(derive_subkeys(&KEY).unwrap());
	let tags: Vec<_> = (0..4)
		.map(|_| {
			let mut engine = Md5Mac::from_subkeys(Arc::clone(&subkeys));
			engine.update_finalize(b"shared")
		})
		.collect();
	assert!(tags.windows(2).all(|pair| pair[0] == pair[1]));
	assert_eq!(tags[0], one_shot_mac(&KEY, b"shared").unwrap());
}

#[test]
fn digest_mac_trait_matches_engine() {
	let mut mac = <Md5Mac as Mac>::new_from_slice(&KEY).unwrap();
	Mac::update(&mut mac, b"message ");
	Mac::update(&mut mac, b"digest");
	let tag = mac.finalize().into_bytes();
	assert_eq!(tag.as_slice(), hex!("c895534f22a174bc3e6a25a2b2efd630"));

	let mac = <Md5Mac as KeyInit>::new(&KEY.into());
	assert!(mac
		.chain_update(b"message digest")
		.verify_slice(&hex!("c895534f22a174bc3e6a25a2b2efd630"))
		.is_ok());

	assert!(<Md5Mac as Mac>::new_from_slice(&KEY[..8]).is_err());
}

#[test]
fn digest_finalize_reset_allows_reuse() {
	let mut mac = <Md5Mac as Mac>::new_from_slice(&KEY).unwrap();
	Mac::update(&mut mac, b"abc");
	let first = mac.finalize_reset().into_bytes();
	Mac::update(&mut mac, b"abc");
	let second = mac.finalize_reset().into_bytes();
	assert_eq!(first, second);
	assert_eq!(first.as_slice(), hex!("e8013c11f7209d1328c0caa04fd012a6"));
}

#[test]
fn verify_tag_accepts_and_rejects() {
	let tag = one_shot_mac(&KEY, b"abc").unwrap();
	assert!(verify_tag(&KEY, b"abc", &tag).is_ok());

	let err = verify_tag(&KEY, b"abd", &tag).unwrap_err();
	assert_eq!(err.kind(), MacErrorKind::TagMismatch);

	let err = verify_tag(&KEY, b"abc", &tag[..8]).unwrap_err();
	assert_eq!(err.kind(), MacErrorKind::TagMismatch);
}

#[test]
fn reader_matches_one_shot() {
	let message = sample_message(20_000);
	let tag = mac_reader(&KEY, Cursor::new(&message)).unwrap();
	assert_eq!(tag, one_shot_mac(&KEY, &message).unwrap());
}

struct FailingReader {
	remaining: usize,
}

impl Read for FailingReader {
	fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
		if self.remaining == 0 {
			return Err(io::Error::new(io::ErrorKind::Other, "boom"));
		}
		let n = self.remaining.min(buf.len()).min(10);
		buf[..n].fill(0xab);
		self.remaining -= n;
		Ok(n)
	}
}

#[test]
fn reader_error_leaves_engine_reusable() {
	let mut engine = Md5Mac::with_key(&KEY).unwrap();
	let err =
		consume_reader(FailingReader { remaining: 25 }, &mut engine)
			.unwrap_err();
	assert_eq!(err.kind(), MacErrorKind::Io);
	assert!(err.message().contains("boom"));

	engine.update(b"abc");
	assert_eq!(
		engine.finalize_tag(),
		hex!("e8013c11f7209d1328c0caa04fd012a6")
	);
}

proptest! {
	#[test]
	fn chunking_does_not_change_the_tag(
		message in proptest::collection::vec(any::<u8>(), 0..400),
		cuts in proptest::collection::vec(0usize..400, 0..8),
	) {
		let mut cuts: Vec<usize> =
			cuts.into_iter().map(|c| c.min(message.len())).collect();
		cuts.sort_unstable();

		let mut engine = Md5Mac::with_key(&KEY).unwrap();
		let mut start = 0;
		for cut in cuts {
			engine.update(&message[start..cut]);
			start = cut;
		}
		engine.update(&message[start..]);

		prop_assert_eq!(
			engine.finalize_tag(),
			one_shot_mac(&KEY, &message).unwrap()
		);
	}
}
