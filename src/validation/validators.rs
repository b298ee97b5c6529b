//! The validators a [`Declaration`](`super::Declaration`) can name.
//!
//! All of them are pure functions of a [`FieldState`] and a [`RuleSet`].

use super::{rules::js_number, Error, RuleSet};
use core::fmt::{self, Debug, Formatter};
use hashbrown::HashMap;
use regex::Regex;
use std::{rc::Rc, sync::LazyLock};
use tracing::warn;
use wasm_bindgen::{JsCast, UnwrapThrowExt};
use web_sys::{Element, HtmlInputElement, HtmlSelectElement, HtmlTextAreaElement};

static EMAIL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^([A-Za-z0-9_\-.])+@([A-Za-z0-9_\-.])+\.([A-Za-z]{2,4})$").expect_throw("Invalid e-mail pattern."));

/// The state of a form control that validators look at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldState {
	pub value: String,
	pub checked: bool,
}

impl FieldState {
	#[must_use]
	pub fn with_value(value: impl Into<String>) -> Self {
		Self {
			value: value.into(),
			checked: false,
		}
	}

	/// Reads the current value (and checkedness) of `element`.
	///
	/// Elements that aren't form controls report their `value` attribute.
	#[must_use]
	pub fn read(element: &Element) -> Self {
		if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
			Self {
				value: input.value(),
				checked: input.checked(),
			}
		} else if let Some(text_area) = element.dyn_ref::<HtmlTextAreaElement>() {
			Self::with_value(text_area.value())
		} else if let Some(select) = element.dyn_ref::<HtmlSelectElement>() {
			Self::with_value(select.value())
		} else {
			Self::with_value(element.get_attribute("value").unwrap_or_default())
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValidatorKind {
	Text,
	Email,
	Phone,
	Checkbox,
	File,
	/// Registered through [`Validators::register`].
	Custom(String),
}

impl ValidatorKind {
	/// Looks up a built-in validator.
	#[must_use]
	pub fn builtin(name: &str) -> Option<Self> {
		Some(match name {
			"text" => Self::Text,
			"email" => Self::Email,
			"phone" => Self::Phone,
			"checkbox" => Self::Checkbox,
			"file" => Self::File,
			_ => return None,
		})
	}
}

pub type CustomValidator = Rc<dyn Fn(&FieldState, &RuleSet) -> bool>;

/// Lookup table from validator names to validators: the built-ins plus registered custom ones.
#[derive(Clone, Default)]
pub struct Validators {
	custom: HashMap<String, CustomValidator>,
}

impl Debug for Validators {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Validators").field("custom", &self.custom.keys().collect::<Vec<_>>()).finish()
	}
}

impl Validators {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Makes `validator` available as `name`, both as input type and in validation attributes.
	///
	/// Built-in names can't be replaced.
	pub fn register(&mut self, name: impl Into<String>, validator: impl 'static + Fn(&FieldState, &RuleSet) -> bool) -> &mut Self {
		let name = name.into();
		if ValidatorKind::builtin(&name).is_some() {
			warn!("Not registering custom validator {:?}, which would be shadowed by the built-in one.", name);
		} else {
			self.custom.insert(name, Rc::new(validator));
		}
		self
	}

	#[must_use]
	pub fn resolve(&self, name: &str) -> Option<ValidatorKind> {
		ValidatorKind::builtin(name).or_else(|| self.custom.contains_key(name).then(|| ValidatorKind::Custom(name.to_owned())))
	}

	/// Runs the validator `kind` against `field`.
	///
	/// # Errors
	///
	/// [`Error::UnknownValidator`] for [`ValidatorKind::Custom`] names that weren't registered here.
	pub fn check(&self, kind: &ValidatorKind, field: &FieldState, rules: &RuleSet) -> Result<bool, Error> {
		Ok(match kind {
			ValidatorKind::Text => text(field, rules),
			ValidatorKind::Email => email(field),
			ValidatorKind::Phone => phone(field),
			ValidatorKind::Checkbox => checkbox(field),
			ValidatorKind::File => file(field, rules),
			ValidatorKind::Custom(name) => {
				let validator = self.custom.get(name).ok_or_else(|| Error::UnknownValidator(name.clone()))?;
				validator(field, rules)
			}
		})
	}
}

/// Length within `min..=max` (counted in UTF-16 code units, like `maxlength`), not numeric and not the initial placeholder.
#[must_use]
pub fn text(field: &FieldState, rules: &RuleSet) -> bool {
	let value = field.value.as_str();
	#[allow(clippy::cast_precision_loss)]
	let length = value.encode_utf16().count() as f64;

	length >= rules.min.unwrap_or(0.)
		&& length <= rules.max.unwrap_or(f64::INFINITY)
		&& js_number(value).is_nan()
		&& value != rules.initial.as_deref().unwrap_or("")
		&& !(rules.alphabet_only && value.contains(|c: char| c.is_ascii_digit() || ".*-+[]^".contains(c)))
}

#[must_use]
pub fn email(field: &FieldState) -> bool {
	EMAIL.is_match(&field.value)
}

/// Nine characters forming a number above 600000000.
#[must_use]
pub fn phone(field: &FieldState) -> bool {
	let number = js_number(&field.value);
	field.value.chars().count() == 9 && !number.is_nan() && number > 600_000_000.
}

#[must_use]
pub fn checkbox(field: &FieldState) -> bool {
	field.checked
}

/// Anything chosen, unless it's the initial placeholder.
#[must_use]
pub fn file(field: &FieldState, rules: &RuleSet) -> bool {
	!field.value.is_empty() && field.value != rules.initial.as_deref().unwrap_or("")
}

#[cfg(test)]
mod tests {
	use super::*;

	fn value(value: &str) -> FieldState {
		FieldState::with_value(value)
	}

	#[test]
	fn text_rejects_numbers() {
		let rules = RuleSet::default();
		assert!(!text(&value("42"), &rules));
		assert!(!text(&value(" 4.2e1 "), &rules));
		assert!(!text(&value("0x2A"), &rules));
		assert!(!text(&value(""), &rules));
		assert!(text(&value("42 apples"), &rules));
	}

	#[test]
	fn text_lengths() {
		let rules = RuleSet {
			min: Some(3.),
			max: Some(10.),
			..RuleSet::default()
		};
		assert!(text(&value("hello"), &rules));
		assert!(text(&value("abc"), &rules));
		assert!(!text(&value("ab"), &rules));
		assert!(text(&value("abcdefghij"), &rules));
		assert!(!text(&value("abcdefghijk"), &rules));
		assert!(text(&value("ñandú"), &rules));
	}

	#[test]
	fn text_rejects_the_initial_value() {
		let rules = RuleSet {
			initial: Some("Search…".to_owned()),
			..RuleSet::default()
		};
		assert!(!text(&value("Search…"), &rules));
		assert!(text(&value("Search"), &rules));

		let rules = RuleSet {
			min: Some(0.),
			max: Some(100.),
			..rules
		};
		assert!(!text(&value("Search…"), &rules));
	}

	#[test]
	fn text_alphabet_only() {
		let rules = RuleSet {
			alphabet_only: true,
			..RuleSet::default()
		};
		assert!(text(&value("Jane Doe"), &rules));
		assert!(!text(&value("R2D2"), &rules));
		assert!(!text(&value("Jane-Doe"), &rules));
		assert!(text(&value("R2D2"), &RuleSet::default()));
	}

	#[test]
	fn emails() {
		assert!(email(&value("a@b.co")));
		assert!(email(&value("a.b@c.org")));
		assert!(email(&value("first_last-1@sub.example.info")));
		assert!(!email(&value("a@b")));
		assert!(!email(&value("bad-email")));
		assert!(!email(&value("a@b.c")));
		assert!(!email(&value("a@b.museum")));
		assert!(!email(&value("a b@c.org")));
	}

	#[test]
	fn phones() {
		assert!(phone(&value("612345678")));
		assert!(!phone(&value("512345678")));
		assert!(!phone(&value("600000000")));
		assert!(!phone(&value("61234567")));
		assert!(!phone(&value("6123456789")));
		assert!(!phone(&value("61234567a")));
	}

	#[test]
	fn checkboxes() {
		assert!(!checkbox(&FieldState::default()));
		assert!(checkbox(&FieldState {
			value: "on".to_owned(),
			checked: true
		}));
	}

	#[test]
	fn files() {
		let rules = RuleSet {
			initial: Some("none".to_owned()),
			..RuleSet::default()
		};
		assert!(!file(&value(""), &RuleSet::default()));
		assert!(file(&value("C:\\fakepath\\cv.pdf"), &RuleSet::default()));
		assert!(!file(&value("none"), &rules));
		assert!(file(&value("cv.pdf"), &rules));
	}

	#[test]
	fn lookup() {
		let mut validators = Validators::new();
		validators.register("postcode", |field, _| field.value.len() == 5);
		validators.register("email", |_, _| true);

		assert_eq!(validators.resolve("email"), Some(ValidatorKind::Email));
		assert_eq!(validators.resolve("postcode"), Some(ValidatorKind::Custom("postcode".to_owned())));
		assert_eq!(validators.resolve("tel"), None);

		let rules = RuleSet::default();
		assert_eq!(validators.check(&ValidatorKind::Email, &value("nope"), &rules), Ok(false));
		assert_eq!(validators.check(&ValidatorKind::Custom("postcode".to_owned()), &value("48149"), &rules), Ok(true));
		assert_eq!(
			validators.check(&ValidatorKind::Custom("zip".to_owned()), &value("48149"), &rules),
			Err(Error::UnknownValidator("zip".to_owned()))
		);
	}
}
