// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: md5mac
// File: error.rs

//! Error type shared by key handling, the key schedule and the
//! verification helpers.

use std::borrow::Cow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacErrorKind {
	InvalidKey,
	InvalidKeyLength,
	Io,
	TagMismatch,
}

#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct MacError {
	kind: MacErrorKind,
	message: Cow<'static, str>,
}

impl MacError {
	pub fn new(
		kind: MacErrorKind,
		message: impl Into<Cow<'static, str>>,
	) -> Self {
		Self {
			kind,
			message: message.into(),
		}
	}

	pub fn invalid_key_length(received: usize) -> Self {
		Self::new(
			MacErrorKind::InvalidKeyLength,
			format!(
				"MD5-MAC requires a 16-byte key but received {} bytes",
				received
			),
		)
	}

	pub fn tag_mismatch() -> Self {
		Self::new(
			MacErrorKind::TagMismatch,
			"MD5-MAC tag verification failed",
		)
	}

	pub fn kind(&self) -> MacErrorKind {
		self.kind
	}

	pub fn message(&self) -> &str {
		self.message.as_ref()
	}
}

impl From<std::io::Error> for MacError {
	fn from(err: std::io::Error) -> Self {
		Self::new(
			MacErrorKind::Io,
			format!("failed to read message input: {}", err),
		)
	}
}
