use dabble_dom::{get, ElementSpec, Selection};
use std::sync::Once;
use wasm_bindgen::JsCast;
use web_sys::{window, HtmlBodyElement};

static LOG_INITIALIZED: Once = Once::new();

/// Appends a fresh `<div id="{id}">` to the body and returns it.
pub fn fixture(id: &str) -> Selection {
	LOG_INITIALIZED.call_once(|| {
		//TODO: Fail on Warning or Error.
		tracing_wasm::set_as_global_default();
	});

	let body = window().unwrap().document().unwrap().body().unwrap().dyn_into::<HtmlBodyElement>().unwrap();
	let fixture = get(web_sys::Element::from(body)).append(ElementSpec::new("div").attributes(&[("id", id)]));
	assert_eq!(fixture.len(), 1);
	fixture
}
