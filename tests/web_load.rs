use dabble_dom::get;
use js_sys::{Array, Promise};
use std::{cell::Cell, rc::Rc};
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};
use web_sys::{Blob, Url};

wasm_bindgen_test_configure!(run_in_browser);

mod web_setup_;
use web_setup_::fixture;

const PAYLOAD: &str = "<b>loaded</b>";

#[wasm_bindgen_test]
async fn load_replaces_content_once_per_element() {
	let root = fixture("load-replaces-content");
	root.set_inner_html("<i>old</i><i>old</i>");
	let items = root.children(None);

	let blob = Blob::new_with_str_sequence(&Array::of1(&JsValue::from_str(PAYLOAD))).unwrap();
	let url = Url::create_object_url_with_blob(&blob).unwrap();

	let mut resolve = None;
	let done = Promise::new(&mut |resolve_, _| resolve = Some(resolve_));
	let resolve = resolve.unwrap();

	let calls = Rc::new(Cell::new(0));
	items.load(&url, {
		let calls = calls.clone();
		move |element, request| {
			assert_eq!(request.status().unwrap(), 200);
			assert_eq!(element.inner_html(), PAYLOAD);
			calls.set(calls.get() + 1);
			if calls.get() == 2 {
				resolve.call0(&JsValue::NULL).unwrap();
			}
		}
	});
	assert_eq!(calls.get(), 0);

	JsFuture::from(done).await.unwrap();
	Url::revoke_object_url(&url).unwrap();

	assert_eq!(calls.get(), 2);
	assert!(items.iter().all(|item| item.inner_html() == PAYLOAD));
	assert_eq!(get("#load-replaces-content b").len(), 2);
}

#[wasm_bindgen_test]
async fn failed_requests_still_call_back() {
	let root = fixture("failed-requests-still-call-back");
	root.set_inner_html("<i>old</i>");

	let blob = Blob::new_with_str_sequence(&Array::of1(&JsValue::from_str(PAYLOAD))).unwrap();
	let url = Url::create_object_url_with_blob(&blob).unwrap();
	Url::revoke_object_url(&url).unwrap();

	let mut resolve = None;
	let done = Promise::new(&mut |resolve_, _| resolve = Some(resolve_));
	let resolve = resolve.unwrap();

	let calls = Rc::new(Cell::new(0));
	root.children(None).load(&url, {
		let calls = calls.clone();
		move |_, request| {
			assert_eq!(request.status().unwrap(), 0);
			calls.set(calls.get() + 1);
			resolve.call0(&JsValue::NULL).unwrap();
		}
	});

	JsFuture::from(done).await.unwrap();
	assert_eq!(calls.get(), 1);
	// A network error ends with an empty response text, which replaces the content all the same.
	assert_eq!(get("#failed-requests-still-call-back i").inner_html().as_deref(), Some(""));
}
