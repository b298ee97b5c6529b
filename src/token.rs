//! Random opaque identifiers.
//!
//! Tokens correlate a subscription with the element that owns it.
//! They are **not** cryptographically secure and no uniqueness check is made against earlier tokens.

use core::fmt::{self, Display, Formatter};
use tracing::trace;

/// The characters a [`Token`] is drawn from.
pub const ALPHABET: &[u8; 64] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz-_";

/// Token length selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Strength {
	/// 10 characters.
	Weak,
	/// 20 characters.
	#[default]
	Normal,
	/// 30 characters.
	Strong,
}

impl Strength {
	/// Recognises `"weak"` and `"strong"`.
	/// Anything else, including [`None`], is [`Strength::Normal`].
	#[must_use]
	pub fn from_name(name: Option<&str>) -> Self {
		match name {
			Some("weak") => Self::Weak,
			Some("strong") => Self::Strong,
			_ => Self::Normal,
		}
	}

	#[must_use]
	pub fn length(self) -> usize {
		match self {
			Self::Weak => 10,
			Self::Normal => 20,
			Self::Strong => 30,
		}
	}
}

/// A string of [`ALPHABET`] characters identifying one subscription.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token(String);

impl Token {
	#[must_use]
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl Display for Token {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<Token> for String {
	fn from(token: Token) -> Self {
		token.0
	}
}

/// Generates a token using [`Math.random()`](https://developer.mozilla.org/en-US/docs/Web/JavaScript/Reference/Global_Objects/Math/random).
#[must_use]
pub fn generate(strength: Strength) -> Token {
	generate_with(strength, &mut js_sys::Math::random)
}

/// Generates a token from `random`, which must return values in `[0, 1)`.
///
/// Out-of-range values are clamped into the alphabet.
pub fn generate_with(strength: Strength, random: &mut dyn FnMut() -> f64) -> Token {
	#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
	let token: String = (0..strength.length())
		.map(|_| {
			let i = (random() * ALPHABET.len() as f64) as usize;
			ALPHABET[i.min(ALPHABET.len() - 1)] as char
		})
		.collect();
	trace!(?strength, "Generated token.");
	Token(token)
}
