//! Declarative form validation.
//!
//! Form controls opt in through an attribute (`data-validation` by default) that either names a validator
//! (`data-validation="email"`) or lists constraints for the validator of the control's type
//! (`data-validation="min:3, max:30, initial:Your name"`).
//!
//! ```no_run
//! use dabble_dom::{extend, get, validation::{Mode, Validate, Validation}};
//! use wasm_bindgen::{JsCast, UnwrapThrowExt};
//!
//! extend::<Validation>();
//! get("form")
//! 	.validate(Mode::Submit, |form| {
//! 		// Submission is always intercepted, so it must be resumed here.
//! 		form.unchecked_ref::<web_sys::HtmlFormElement>().submit().unwrap_throw();
//! 	})
//! 	.forget();
//! ```
//!
//! On each `submit`, every descendant of the form that carries the attribute is checked.
//! Failing controls get an error marker on their parent element, passing ones lose it.
//! Controls whose type has no validator are skipped.

use crate::{listener::Listeners, module::Module, selection::elements_of, ElementSpec, Selection};
use std::rc::Rc;
use tracing::{debug, info, instrument, trace, trace_span, warn};
use web_sys::Element;

pub mod marker;
mod rules;
mod validators;

pub use rules::{Declaration, RuleSet};
pub use validators::{checkbox, email, file, phone, text, CustomValidator, FieldState, ValidatorKind, Validators};

pub const VERSION: &str = "0.1.0";

/// Where [`Validation`] expects its stylesheet (a copy ships as `assets/validation.css`), relative to the page.
pub const STYLESHEET_HREF: &str = "css/validation.css";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
	#[error("Unknown validator {0:?}")]
	UnknownValidator(String),
	#[error("Malformed rule {key}:{value:?}")]
	MalformedRule { key: String, value: String },
}

/// When forms are validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
	/// On `submit`.
	#[default]
	Submit,
	/// Reserved for validation as fields lose focus. Currently the same as [`Mode::Submit`].
	Live,
}

/// Names and markup the validator works with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationConfig {
	/// The attribute holding a control's [`Declaration`].
	pub attribute: String,
	/// Set on a container while it shows an error marker.
	pub error_flag: String,
	pub marker_class: String,
	pub marker_glyph: String,
}

impl Default for ValidationConfig {
	fn default() -> Self {
		Self {
			attribute: "data-validation".to_owned(),
			error_flag: "data-error".to_owned(),
			marker_class: "error".to_owned(),
			marker_glyph: "×".to_owned(),
		}
	}
}

/// How one control fared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
	/// No validation attribute, or no validator for it.
	Skipped,
	Passed,
	Failed,
}

#[derive(Debug, Clone, Default)]
pub struct FormValidator {
	config: ValidationConfig,
	validators: Validators,
}

impl FormValidator {
	#[must_use]
	pub fn new(config: ValidationConfig, validators: Validators) -> Self {
		Self { config, validators }
	}

	#[must_use]
	pub fn config(&self) -> &ValidationConfig {
		&self.config
	}

	/// Checks every descendant of `form` once and updates the error markers of their containers.
	///
	/// Returns whether no control failed.
	#[instrument(skip(self))]
	pub fn validate_form(&self, form: &Element) -> bool {
		let descendants = match form.query_selector_all("*") {
			Ok(descendants) => elements_of(&descendants),
			Err(error) => {
				warn!("Could not list form controls: {:?}", error);
				return true;
			}
		};

		let mut valid = true;
		for element in descendants {
			let outcome = self.check(&element);
			if outcome == Outcome::Skipped {
				continue;
			}
			valid &= outcome == Outcome::Passed;

			let container = match element.parent_element() {
				Some(container) => container,
				None => {
					warn!("No container to mark on {:?}.", element);
					continue;
				}
			};
			if outcome == Outcome::Passed {
				marker::unmark(&container, &self.config);
			} else {
				marker::mark(&container, &self.config);
			}
		}
		debug!(valid, "Validated form.");
		valid
	}

	/// Checks one control without touching any markers.
	#[must_use]
	pub fn check(&self, element: &Element) -> Outcome {
		let declaration = match element.get_attribute(&self.config.attribute) {
			Some(declaration) => declaration,
			None => return Outcome::Skipped,
		};
		let type_name = match effective_type(element) {
			Some(type_name) => type_name,
			None => return Outcome::Skipped,
		};
		let kind = match self.validators.resolve(&type_name) {
			Some(kind) => kind,
			None => {
				trace!(type_name = %type_name, "No validator for this type.");
				return Outcome::Skipped;
			}
		};

		let (kind, rules) = match Declaration::parse(&declaration) {
			Ok(Declaration::Constraints(rules)) => (kind, rules),
			Ok(Declaration::Kind(name)) => match self.validators.resolve(&name) {
				Some(kind) => (kind, RuleSet::default()),
				None => {
					warn!("{}", Error::UnknownValidator(name));
					return Outcome::Skipped;
				}
			},
			Err(error) => {
				warn!("{}; Treating the field as invalid.", error);
				return Outcome::Failed;
			}
		};

		let field = FieldState::read(element);
		let passed = match self.validators.check(&kind, &field, &rules) {
			Ok(passed) => passed,
			Err(error) => {
				warn!("{}", error);
				return Outcome::Skipped;
			}
		};
		if cfg!(feature = "dangerous-logging") {
			trace!(?kind, ?rules, value = %field.value, passed, "Checked field.");
		} else {
			trace!(?kind, ?rules, passed, "Checked field.");
		}

		if passed {
			Outcome::Passed
		} else {
			Outcome::Failed
		}
	}
}

/// `text` for `<textarea>`, otherwise the (lower-cased) `type` attribute.
fn effective_type(element: &Element) -> Option<String> {
	if element.tag_name().eq_ignore_ascii_case("textarea") {
		Some("text".to_owned())
	} else {
		element.get_attribute("type").map(|type_name| type_name.to_ascii_lowercase())
	}
}

/// Form validation for [`Selection`]s.
pub trait Validate {
	/// [`.validate_with(…)`](`Validate::validate_with`) the default [`FormValidator`].
	fn validate(&self, mode: Mode, on_success: impl 'static + Fn(&Element)) -> Listeners;

	/// Intercepts `submit` on each selected form.
	///
	/// Submission is **always** prevented. If all controls pass, `on_success` is called with the form
	/// and is responsible for submitting it if that's desired.
	fn validate_with(&self, validator: FormValidator, mode: Mode, on_success: impl 'static + Fn(&Element)) -> Listeners;
}

impl Validate for Selection {
	fn validate(&self, mode: Mode, on_success: impl 'static + Fn(&Element)) -> Listeners {
		self.validate_with(FormValidator::default(), mode, on_success)
	}

	#[instrument(skip(self, validator, on_success))]
	fn validate_with(&self, validator: FormValidator, mode: Mode, on_success: impl 'static + Fn(&Element)) -> Listeners {
		if mode == Mode::Live {
			debug!("Live validation isn't available yet. Validating on submit instead.");
		}

		let validator = Rc::new(validator);
		self.on("submit", move |form, event| {
			event.prevent_default();

			let span = trace_span!("Validating on submit");
			let _enter = span.enter();
			if validator.validate_form(form) {
				on_success(form);
			}
		})
	}
}

/// The validation module. Registering it with [`extend`](`crate::extend`) links its stylesheet into the document.
#[derive(Debug)]
pub struct Validation;

impl Module for Validation {
	const NAME: &'static str = "validation";
	const VERSION: &'static str = VERSION;

	fn load(document: &web_sys::Document) {
		let head = match document.head() {
			Some(head) => Element::from(head),
			None => return warn!("No <head> to link the validation stylesheet into."),
		};
		crate::get(head).append(ElementSpec::new("link").attributes(&[("rel", "stylesheet"), ("type", "text/css"), ("href", STYLESHEET_HREF)]));
		info!(href = STYLESHEET_HREF, "Linked validation stylesheet.");
	}
}
