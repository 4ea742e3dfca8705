// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: md5mac
// File: lib.rs

//! MD5-MAC: a keyed message authentication code with a 16-byte key and a
//! 16-byte tag, built from a keyed MD5 compression function.
//!
//! The key schedule turns the key into three subkeys (a keyed IV, a round
//! key added into every MD5 operation and an envelope block compressed
//! after the message). [`Md5Mac`] streams input block by block and can be
//! reused across messages; it also implements [`digest::Mac`].
//!
//! ```
//! use md5mac::{one_shot_mac, Md5Mac};
//!
//! let key = [0x42u8; 16];
//! let mut engine = Md5Mac::with_key(&key).unwrap();
//! engine.update(b"hello ");
//! engine.update(b"world");
//! assert_eq!(engine.finalize_tag(), one_shot_mac(&key, b"hello world").unwrap());
//! ```

pub mod mac {
	pub mod compress;
	pub mod engine;
	pub mod error;
	pub mod executor;
	pub mod key;
	pub mod schedule;
}

pub use mac::engine::{Md5Mac, Tag, MAC_LENGTH};
pub use mac::error::{MacError, MacErrorKind};
pub use mac::executor::{mac_reader, one_shot_mac, tag_to_hex, verify_tag};
pub use mac::schedule::{derive_subkeys, SubkeySet, KEY_LENGTH};
