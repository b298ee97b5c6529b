//! Asynchronous content loading.

use crate::Selection;
use tracing::{error, instrument, trace, trace_span, warn};
use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::{Element, XmlHttpRequest};

impl Selection {
	/// Requests `url` once per element with `GET` and replaces the element's content with the response text.
	///
	/// `callback` runs exactly once per element, after the request ended (successfully or not),
	/// with that element and the finished request.
	/// There is no retry, timeout or cancellation.
	#[instrument(skip(self, callback))]
	pub fn load(&self, url: &str, callback: impl 'static + Clone + FnOnce(&Element, &XmlHttpRequest)) -> &Self {
		for element in self {
			if let Err(error) = request_into(element, url, callback.clone()) {
				error!("Could not request {:?}: {:?}", url, error);
			}
		}
		self
	}
}

fn request_into(element: &Element, url: &str, callback: impl 'static + FnOnce(&Element, &XmlHttpRequest)) -> Result<(), wasm_bindgen::JsValue> {
	let request = XmlHttpRequest::new()?;
	request.open_with_async("GET", url, true)?;

	let on_load_end = {
		let element = element.clone();
		let request = request.clone();
		let url = url.to_owned();
		// `loadend` fires exactly once per request, after `load`, `error`, `abort` or `timeout`.
		Closure::once_into_js(move || {
			let span = trace_span!("Request ended", url = %url);
			let _enter = span.enter();
			match (request.status(), request.response_text()) {
				(Ok(status), Ok(Some(text))) => {
					trace!(status, "Replacing content.");
					element.set_inner_html(&text);
				}
				(status, text) => warn!("No response text: status {:?}, text {:?}", status, text),
			}
			callback(&element, &request);
		})
	};
	request.set_onloadend(Some(on_load_end.unchecked_ref()));
	request.send()
}
