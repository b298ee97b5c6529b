use super::Error;
use tracing::trace;

/// The parsed form of a validation attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum Declaration {
	/// `key:value(,key:value)*`, checked by the validator for the element's type.
	Constraints(RuleSet),
	/// A bare validator name, used instead of the one for the element's type.
	Kind(String),
}

/// Constraints for the [`text`](`super::validators::text`) and [`file`](`super::validators::file`) validators.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleSet {
	/// Minimum length. Defaults to 0.
	pub min: Option<f64>,
	/// Maximum length. Unbounded by default.
	pub max: Option<f64>,
	/// Placeholder value that doesn't count as input. Defaults to `""`.
	pub initial: Option<String>,
	/// Reject digits and `.*-+[]^`.
	pub alphabet_only: bool,
}

impl Declaration {
	/// Parses `attribute`.
	///
	/// Keys other than `min`, `max`, `initial` and `alphabetonly` are ignored.
	/// Keys and values are trimmed. An empty attribute is an empty [`RuleSet`].
	///
	/// # Errors
	///
	/// [`Error::MalformedRule`] if `min` or `max` isn't a number.
	pub fn parse(attribute: &str) -> Result<Self, Error> {
		let attribute = attribute.trim();
		if attribute.is_empty() {
			return Ok(Self::Constraints(RuleSet::default()));
		}
		if !attribute.contains(':') {
			return Ok(Self::Kind(attribute.to_owned()));
		}

		let mut rules = RuleSet::default();
		for pair in attribute.split(',') {
			let (key, value) = match pair.split_once(':') {
				Some((key, value)) => (key.trim(), value.trim()),
				None => (pair.trim(), ""),
			};
			match key {
				"min" => rules.min = number(key, value)?,
				"max" => rules.max = number(key, value)?,
				"initial" => rules.initial = Some(value).filter(|value| !value.is_empty()).map(str::to_owned),
				"alphabetonly" => rules.alphabet_only = !matches!(value, "" | "false" | "0"),
				_ => trace!(key, "Ignoring unrecognised rule."),
			}
		}
		Ok(Self::Constraints(rules))
	}
}

fn number(key: &str, value: &str) -> Result<Option<f64>, Error> {
	if value.is_empty() {
		return Ok(None);
	}
	let number = js_number(value);
	if number.is_nan() {
		Err(Error::MalformedRule {
			key: key.to_owned(),
			value: value.to_owned(),
		})
	} else {
		Ok(Some(number))
	}
}

/// Converts `text` the way [***JavaScript***](https://developer.mozilla.org/en-US/docs/Web/JavaScript)'s
/// [`Number(text)`](https://developer.mozilla.org/en-US/docs/Web/JavaScript/Reference/Global_Objects/Number/Number) does,
/// so that "numeric" means the same as it does to the page's scripts.
///
/// Surrounding whitespace is ignored, blank text is `0`, `0x`/`0o`/`0b` prefixes and `Infinity` are understood.
/// Anything else that isn't a decimal literal is NaN.
pub(crate) fn js_number(text: &str) -> f64 {
	let text = text.trim_matches(is_script_whitespace);
	if text.is_empty() {
		return 0.;
	}

	for &(prefix, radix) in &[("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)] {
		if let Some(digits) = text.strip_prefix(prefix) {
			return if !digits.is_empty() && digits.chars().all(|c| c.is_digit(radix)) {
				digits.chars().filter_map(|c| c.to_digit(radix)).fold(0., |n, digit| n * f64::from(radix) + f64::from(digit))
			} else {
				f64::NAN
			};
		}
	}

	match text {
		"Infinity" | "+Infinity" => f64::INFINITY,
		"-Infinity" => f64::NEG_INFINITY,
		// `str::parse` also accepts `inf` and `NaN`, which these bytes rule out.
		_ if text.bytes().all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E')) => text.parse().unwrap_or(f64::NAN),
		_ => f64::NAN,
	}
}

/// Script `WhiteSpace` and `LineTerminator`: Unicode whitespace except NEL, plus the byte order mark.
fn is_script_whitespace(c: char) -> bool {
	(c.is_whitespace() && c != '\u{85}') || c == '\u{feff}'
}
