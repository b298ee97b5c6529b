//! Native event listener handles.

use std::rc::Rc;
use tracing::{error, instrument, trace, trace_span};
use wasm_bindgen::{closure::Closure, JsCast};

/// A native event listener that is removed from its target when dropped.
#[must_use = "The listener is removed immediately when this handle is dropped. Use `.forget()` to keep it attached."]
pub struct EventListener {
	target: web_sys::EventTarget,
	event_type: String,
	closure: Option<Closure<dyn FnMut(web_sys::Event)>>,
}

impl core::fmt::Debug for EventListener {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		f.debug_struct("EventListener")
			.field("target", &self.target)
			.field("event_type", &self.event_type)
			.field("attached", &self.closure.is_some())
			.finish()
	}
}

impl EventListener {
	/// Attaches `handler` to `target`.
	///
	/// Returns [`None`] (after logging the error) if the platform refuses the listener.
	#[instrument(skip(handler))]
	pub fn new(target: &web_sys::EventTarget, event_type: &str, handler: impl 'static + FnMut(web_sys::Event)) -> Option<Self> {
		let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(web_sys::Event)>);
		if let Err(error) = target.add_event_listener_with_callback(event_type, closure.as_ref().unchecked_ref()) {
			error!("Failed to add event listener {:?}: {:?}", event_type, error);
			return None;
		}
		trace!("Added event listener.");
		Some(Self {
			target: target.clone(),
			event_type: event_type.to_owned(),
			closure: Some(closure),
		})
	}

	#[must_use]
	pub fn event_type(&self) -> &str {
		&self.event_type
	}

	/// Leaves the listener attached for the rest of the page's lifetime.
	pub fn forget(mut self) {
		if let Some(closure) = self.closure.take() {
			closure.forget();
		}
	}
}

impl Drop for EventListener {
	fn drop(&mut self) {
		if let Some(closure) = self.closure.take() {
			let span = trace_span!("Removing event listener", event_type = %self.event_type);
			let _enter = span.enter();
			if let Err(error) = self.target.remove_event_listener_with_callback(&self.event_type, closure.as_ref().unchecked_ref()) {
				error!("Failed to remove event listener {:?}: {:?}", self.event_type, error);
			}
		}
	}
}

/// The listeners attached by one [`Selection::on`](`crate::Selection::on`) call, in selection order.
#[must_use = "The listeners are removed immediately when this handle is dropped. Use `.forget()` to keep them attached."]
#[derive(Debug, Default)]
pub struct Listeners(Vec<EventListener>);

impl Listeners {
	pub(crate) fn attach<T: AsRef<web_sys::EventTarget>>(
		targets: impl IntoIterator<Item = T>,
		event_type: &str,
		handler: Rc<dyn Fn(&T, &web_sys::Event)>,
	) -> Self
	where
		T: 'static,
	{
		Self(
			targets
				.into_iter()
				.filter_map(|target| {
					let handler = handler.clone();
					let event_target = target.as_ref().clone();
					EventListener::new(&event_target, event_type, move |event| handler(&target, &event))
				})
				.collect(),
		)
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.0.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Leaves all listeners attached for the rest of the page's lifetime.
	pub fn forget(self) {
		for listener in self.0 {
			listener.forget();
		}
	}
}
