//! Element selection and chainable DOM conveniences.
//!
//! Every operation is a thin delegation to the corresponding [***DOM***](https://developer.mozilla.org/en-US/docs/Web/API/Document_Object_Model) API.
//! Failing platform calls are logged and skipped; none of these methods return errors.

use crate::{
	events::{Callback, EventRegistry},
	listener::Listeners,
	token::Token,
};
use std::{borrow::Cow, rc::Rc};
use tracing::{debug, error, instrument, trace, warn};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Element, NodeList};

/// What [`get`] accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum Selector {
	/// A CSS selector, matched against the whole document.
	Css(String),
	/// Elements that are already at hand.
	Elements(Vec<Element>),
}

impl From<&str> for Selector {
	fn from(css: &str) -> Self {
		Self::Css(css.to_owned())
	}
}
impl From<String> for Selector {
	fn from(css: String) -> Self {
		Self::Css(css)
	}
}
impl From<Element> for Selector {
	fn from(element: Element) -> Self {
		Self::Elements(vec![element])
	}
}
impl From<&Element> for Selector {
	fn from(element: &Element) -> Self {
		Self::Elements(vec![element.clone()])
	}
}
impl From<Vec<Element>> for Selector {
	fn from(elements: Vec<Element>) -> Self {
		Self::Elements(elements)
	}
}
impl From<&NodeList> for Selector {
	fn from(node_list: &NodeList) -> Self {
		Self::Elements(elements_of(node_list))
	}
}

/// Selects elements.
///
/// An invalid CSS selector or a missing document results in an empty [`Selection`].
#[instrument(skip(selector))]
pub fn get(selector: impl Into<Selector>) -> Selection {
	match selector.into() {
		Selector::Elements(elements) => Selection::new(elements),
		Selector::Css(css) => {
			let document = match document() {
				Some(document) => document,
				None => {
					error!("No document to select {:?} from.", css);
					return Selection::default();
				}
			};
			match document.query_selector_all(&css) {
				Ok(node_list) => Selection::new(elements_of(&node_list)),
				Err(error) => {
					warn!("Could not select {:?}: {:?}", css, error);
					Selection::default()
				}
			}
		}
	}
}

pub(crate) fn document() -> Option<web_sys::Document> {
	web_sys::window()?.document()
}

pub(crate) fn elements_of(node_list: &NodeList) -> Vec<Element> {
	(0..node_list.length())
		.filter_map(|i| node_list.item(i))
		.filter_map(|node| node.dyn_into::<Element>().ok())
		.collect()
}

/// Where [`Selection::add`] inserts new elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
	/// Before the first child.
	Prepend,
	/// After the last child.
	Append,
}

/// Describes an element for [`Selection::add`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ElementSpec<'a> {
	pub tag: &'a str,
	pub attributes: &'a [(&'a str, &'a str)],
	/// Assigned to [***innerHTML***](https://developer.mozilla.org/en-US/docs/Web/API/Element/innerHTML) if present.
	pub html: Option<&'a str>,
}

impl<'a> ElementSpec<'a> {
	#[must_use]
	pub fn new(tag: &'a str) -> Self {
		Self {
			tag,
			attributes: &[],
			html: None,
		}
	}

	#[must_use]
	pub fn attributes(self, attributes: &'a [(&'a str, &'a str)]) -> Self {
		Self { attributes, ..self }
	}

	#[must_use]
	pub fn html(self, html: &'a str) -> Self {
		Self { html: Some(html), ..self }
	}
}

impl<'a> From<&'a str> for ElementSpec<'a> {
	fn from(tag: &'a str) -> Self {
		Self::new(tag)
	}
}

/// An ordered collection of elements.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
	elements: Vec<Element>,
}

impl Selection {
	#[must_use]
	pub fn new(elements: Vec<Element>) -> Self {
		Self { elements }
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.elements.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.elements.is_empty()
	}

	#[must_use]
	pub fn first(&self) -> Option<&Element> {
		self.elements.first()
	}

	#[must_use]
	pub fn last(&self) -> Option<&Element> {
		self.elements.last()
	}

	pub fn iter(&self) -> core::slice::Iter<'_, Element> {
		self.elements.iter()
	}

	#[must_use]
	pub fn as_slice(&self) -> &[Element] {
		&self.elements
	}

	/// Calls `f` with each element and its index.
	pub fn each(&self, mut f: impl FnMut(&Element, usize)) -> &Self {
		for (i, element) in self.elements.iter().enumerate() {
			f(element, i);
		}
		self
	}

	// DOM

	/// Selects the parent element of each element, in order.
	///
	/// Elements without parent element are skipped. Shared parents appear once per child.
	#[must_use]
	pub fn parent(&self) -> Self {
		self.elements.iter().filter_map(|element| element.parent_element()).collect()
	}

	/// Selects the child elements of each element or, if `selector` is given,
	/// all of their descendants that match it.
	#[must_use]
	#[instrument(skip(self))]
	pub fn children(&self, selector: Option<&str>) -> Self {
		let mut children = Vec::new();
		for element in &self.elements {
			match selector {
				None => children.extend(elements_of(&element.child_nodes())),
				Some(selector) => match element.query_selector_all(selector) {
					Ok(node_list) => children.extend(elements_of(&node_list)),
					Err(error) => warn!("Could not select {:?}: {:?}", selector, error),
				},
			}
		}
		Self::new(children)
	}

	/// Creates one element per selected element according to `spec` and inserts it there.
	///
	/// Returns the created elements.
	#[instrument(skip(self))]
	pub fn add(&self, spec: ElementSpec<'_>, position: Position) -> Self {
		let mut created = Vec::with_capacity(self.elements.len());
		for parent in &self.elements {
			let document = match parent.owner_document() {
				Some(document) => document,
				None => {
					error!("No owner document found for parent element {:?}.", parent);
					continue;
				}
			};
			let element = match document.create_element(spec.tag) {
				Ok(element) => element,
				Err(error) => {
					error!("Could not create <{}>: {:?}", spec.tag, error);
					continue;
				}
			};
			for &(name, value) in spec.attributes {
				if let Err(error) = element.set_attribute(name, value) {
					warn!("Could not set attribute {:?}={:?}: {:?}", name, value, error);
				}
			}
			if let Some(html) = spec.html {
				element.set_inner_html(html);
			}

			let inserted = match position {
				Position::Prepend => parent.insert_before(&element, parent.first_child().as_ref()),
				Position::Append => parent.append_child(&element),
			};
			match inserted {
				Ok(_) => created.push(element),
				Err(error) => error!("Could not insert <{}>: {:?}", spec.tag, error),
			}
		}
		trace!("Added {} element(s).", created.len());
		Self::new(created)
	}

	/// Like [`.add(…)`](`Selection::add`), then calls `callback` with the created elements.
	pub fn add_then(&self, spec: ElementSpec<'_>, position: Position, callback: impl FnOnce(&Self)) -> Self {
		let created = self.add(spec, position);
		callback(&created);
		created
	}

	pub fn append<'a>(&self, spec: impl Into<ElementSpec<'a>>) -> Self {
		self.add(spec.into(), Position::Append)
	}

	pub fn prepend<'a>(&self, spec: impl Into<ElementSpec<'a>>) -> Self {
		self.add(spec.into(), Position::Prepend)
	}

	/// Reads attribute `name` of the first element that has it.
	#[must_use]
	pub fn attr(&self, name: &str) -> Option<String> {
		self.elements.iter().find_map(|element| element.get_attribute(name))
	}

	pub fn set_attr(&self, name: &str, value: &str) -> &Self {
		self.set_attrs(&[(name, value)])
	}

	#[instrument(skip(self))]
	pub fn set_attrs(&self, attributes: &[(&str, &str)]) -> &Self {
		for element in &self.elements {
			for &(name, value) in attributes {
				if let Err(error) = element.set_attribute(name, value) {
					warn!("Could not set attribute {:?}={:?}: {:?}", name, value, error);
				}
			}
		}
		self
	}

	/// Reads the markup inside the first element.
	#[must_use]
	pub fn inner_html(&self) -> Option<String> {
		self.first().map(Element::inner_html)
	}

	pub fn set_inner_html(&self, html: &str) -> &Self {
		for element in &self.elements {
			element.set_inner_html(html);
		}
		self
	}

	/// Executes `code` as a function body with each element as `this`.
	///
	/// Returns the last element's result, or `undefined` for an empty selection.
	///
	/// # Errors
	///
	/// If `code` doesn't parse, the `SyntaxError` is returned.
	/// If it throws, the exception is returned and the remaining elements are skipped.
	pub fn run_script(&self, code: &str) -> Result<JsValue, JsValue> {
		let constructor: js_sys::Function = js_sys::Reflect::get(&js_sys::global(), &JsValue::from_str("Function"))?.dyn_into()?;
		let function: js_sys::Function = js_sys::Reflect::construct(&constructor, &js_sys::Array::of1(&JsValue::from_str(code)))?.dyn_into()?;
		let mut result = JsValue::UNDEFINED;
		for element in &self.elements {
			result = function.call0(element)?;
		}
		Ok(result)
	}

	// CSS

	/// Reads the inline style `property` of the first element that sets it.
	///
	/// Property names may be given in CSS (`background-color`) or script (`backgroundColor`) notation.
	#[must_use]
	pub fn css(&self, property: &str) -> Option<String> {
		let property = css_property_name(property);
		self.elements
			.iter()
			.filter_map(|element| element.dyn_ref::<web_sys::HtmlElement>())
			.filter_map(|element| element.style().get_property_value(&property).ok())
			.find(|value| !value.is_empty())
	}

	pub fn set_css(&self, property: &str, value: &str) -> &Self {
		self.set_css_many(&[(property, value)])
	}

	#[instrument(skip(self))]
	pub fn set_css_many(&self, properties: &[(&str, &str)]) -> &Self {
		for element in &self.elements {
			let style = match element.dyn_ref::<web_sys::HtmlElement>() {
				Some(element) => element.style(),
				None => {
					debug!("Skipping element without inline style: {:?}", element);
					continue;
				}
			};
			for &(property, value) in properties {
				if let Err(error) = style.set_property(&css_property_name(property), value) {
					warn!("Could not set style {:?}: {:?}: {:?}", property, value, error);
				}
			}
		}
		self
	}

	/// Reads the computed value of `property` (CSS notation) for the first element,
	/// optionally of one of its pseudo-elements (like `"::after"`).
	#[must_use]
	#[instrument(skip(self))]
	pub fn computed_style(&self, property: &str, pseudo: Option<&str>) -> Option<String> {
		let style = self.computed_style_declaration(pseudo)?;
		style.get_property_value(&css_property_name(property)).ok()
	}

	/// Like [`.computed_style(…)`](`Selection::computed_style`), for multiple properties at once.
	#[must_use]
	#[instrument(skip(self))]
	pub fn computed_styles(&self, properties: &[&str], pseudo: Option<&str>) -> Vec<(String, String)> {
		let style = match self.computed_style_declaration(pseudo) {
			Some(style) => style,
			None => return Vec::new(),
		};
		properties
			.iter()
			.filter_map(|&property| {
				let value = style.get_property_value(&css_property_name(property)).ok()?;
				Some((property.to_owned(), value))
			})
			.collect()
	}

	fn computed_style_declaration(&self, pseudo: Option<&str>) -> Option<web_sys::CssStyleDeclaration> {
		let element = self.first()?;
		let window = web_sys::window()?;
		let style = match pseudo {
			Some(pseudo) => window.get_computed_style_with_pseudo_elt(element, pseudo),
			None => window.get_computed_style(element),
		};
		match style {
			Ok(style) => style,
			Err(error) => {
				warn!("Could not compute style of {:?}: {:?}", element, error);
				None
			}
		}
	}

	/// Checks whether any of the elements has `class`.
	#[must_use]
	pub fn has_class(&self, class: &str) -> bool {
		self.elements.iter().any(|element| contains_class(&element.class_name(), class))
	}

	pub fn add_class(&self, class: &str) -> &Self {
		for element in &self.elements {
			let class_name = element.class_name();
			if !contains_class(&class_name, class) {
				element.set_class_name(&with_class(&class_name, class));
			}
		}
		self
	}

	pub fn remove_class(&self, class: &str) -> &Self {
		for element in &self.elements {
			let class_name = element.class_name();
			if contains_class(&class_name, class) {
				element.set_class_name(&without_class(&class_name, class));
			}
		}
		self
	}

	// EVENTS

	/// Attaches a native event listener to each element.
	///
	/// `handler` receives the element the listener is attached to and the event.
	#[instrument(skip(self, handler))]
	pub fn on(&self, event_type: &str, handler: impl 'static + Fn(&Element, &web_sys::Event)) -> Listeners {
		Listeners::attach(self.elements.clone(), event_type, Rc::new(handler))
	}

	/// Subscribes each element to `event` in `registry`.
	///
	/// `callback` receives the subscribed element, the event name and the element's token for this subscription.
	pub fn subscribe(&self, registry: &EventRegistry<Element>, event: &str, callback: impl 'static + Fn(&Element, &str, &Token)) -> &Self {
		let callback: Callback<Element> = Rc::new(callback);
		for element in &self.elements {
			registry.subscribe_shared(element.clone(), event, callback.clone());
		}
		self
	}

	/// Removes the elements' subscriptions to `event` from `registry`.
	pub fn unsubscribe(&self, registry: &EventRegistry<Element>, event: &str) -> &Self {
		self.unsubscribe_then(registry, event, || ())
	}

	/// Like [`.unsubscribe(…)`](`Selection::unsubscribe`), calling `callback` once per removed subscription.
	pub fn unsubscribe_then(&self, registry: &EventRegistry<Element>, event: &str, mut callback: impl FnMut()) -> &Self {
		for element in &self.elements {
			registry.unsubscribe(element, event, &mut callback);
		}
		self
	}
}

impl FromIterator<Element> for Selection {
	fn from_iter<T: IntoIterator<Item = Element>>(iter: T) -> Self {
		Self::new(iter.into_iter().collect())
	}
}

impl IntoIterator for Selection {
	type Item = Element;
	type IntoIter = std::vec::IntoIter<Element>;

	fn into_iter(self) -> Self::IntoIter {
		self.elements.into_iter()
	}
}

impl<'a> IntoIterator for &'a Selection {
	type Item = &'a Element;
	type IntoIter = core::slice::Iter<'a, Element>;

	fn into_iter(self) -> Self::IntoIter {
		self.elements.iter()
	}
}

/// Converts `backgroundColor` to `background-color`. CSS notation passes through unchanged.
fn css_property_name(property: &str) -> Cow<'_, str> {
	if !property.bytes().any(|b| b.is_ascii_uppercase()) {
		return Cow::Borrowed(property);
	}
	let mut converted = String::with_capacity(property.len() + 2);
	for c in property.chars() {
		if c.is_ascii_uppercase() {
			converted.push('-');
			converted.push(c.to_ascii_lowercase());
		} else {
			converted.push(c);
		}
	}
	Cow::Owned(converted)
}

fn contains_class(class_name: &str, class: &str) -> bool {
	class_name.split_ascii_whitespace().any(|c| c == class)
}

fn with_class(class_name: &str, class: &str) -> String {
	let class_name = class_name.trim_end();
	if class_name.is_empty() {
		class.to_owned()
	} else {
		format!("{} {}", class_name, class)
	}
}

fn without_class(class_name: &str, class: &str) -> String {
	class_name
		.split_ascii_whitespace()
		.filter(|&c| c != class)
		.collect::<Vec<_>>()
		.join(" ")
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn script_notation_properties() {
		assert_eq!(css_property_name("opacity"), "opacity");
		assert_eq!(css_property_name("font-size"), "font-size");
		assert_eq!(css_property_name("backgroundColor"), "background-color");
		assert_eq!(css_property_name("borderTopLeftRadius"), "border-top-left-radius");
	}

	#[test]
	fn class_lists() {
		assert!(contains_class("a  b\tc", "b"));
		assert!(!contains_class("ab", "a"));
		assert!(!contains_class("", "a"));

		assert_eq!(with_class("", "x"), "x");
		assert_eq!(with_class("a b ", "x"), "a b x");

		assert_eq!(without_class("a x b", "x"), "a b");
		assert_eq!(without_class("x x", "x"), "");
		assert_eq!(without_class("xy", "x"), "xy");
	}
}
