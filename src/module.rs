//! Registration of optional capability modules.
//!
//! A module contributes methods through an extension trait on [`Selection`](`crate::Selection`)
//! (for example [`validation::Validate`](`crate::validation::Validate`)).
//! Registering it with [`extend`] runs its one-time document setup and records its version.

use core::cell::RefCell;
use hashbrown::HashMap;
use tracing::{debug, error, info};

pub trait Module {
	const NAME: &'static str;
	const VERSION: &'static str;

	/// Prepares `document` for the module's use. Called at most once per thread.
	fn load(document: &web_sys::Document);
}

thread_local! {
	static LOADED: RefCell<HashMap<&'static str, &'static str>> = RefCell::new(HashMap::new());
}

/// Registers `M`, loading it into the current document if that hasn't happened yet.
///
/// Returns `true` iff `M` was loaded by this call.
pub fn extend<M: Module>() -> bool {
	if module_version(M::NAME).is_some() {
		debug!(module = M::NAME, "Module already loaded.");
		return false;
	}

	let document = match crate::selection::document() {
		Some(document) => document,
		None => {
			error!(module = M::NAME, "No document to load the module into.");
			return false;
		}
	};
	M::load(&document);
	LOADED.with(|loaded| loaded.borrow_mut().insert(M::NAME, M::VERSION));
	info!(module = M::NAME, version = M::VERSION, "Loaded module.");
	true
}

/// Returns the version of the module registered as `name`, if any.
#[must_use]
pub fn module_version(name: &str) -> Option<&'static str> {
	LOADED.with(|loaded| loaded.borrow().get(name).copied())
}
