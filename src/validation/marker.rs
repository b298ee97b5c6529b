//! Visible error indicators on the containers of invalid fields.

use super::ValidationConfig;
use crate::{get, selection::ElementSpec};
use tracing::{error, instrument, trace, warn};
use web_sys::Element;

/// Flags `container` and appends an error marker to it, unless it's already flagged.
///
/// Returns `true` iff a marker was added.
#[instrument(skip(config))]
pub fn mark(container: &Element, config: &ValidationConfig) -> bool {
	if container.has_attribute(&config.error_flag) {
		trace!("Already marked.");
		return false;
	}
	if let Err(error) = container.set_attribute(&config.error_flag, "true") {
		error!("Could not flag container: {:?}", error);
		return false;
	}

	let attributes = [("class", config.marker_class.as_str())];
	get(container)
		.set_css("position", "relative")
		.append(ElementSpec::new("div").attributes(&attributes).html(&config.marker_glyph));
	true
}

/// Removes the error marker from `container` and clears its flag, if it's flagged.
///
/// The marker is the last child element carrying the marker class.
///
/// Returns `true` iff the container was flagged.
#[instrument(skip(config))]
pub fn unmark(container: &Element, config: &ValidationConfig) -> bool {
	if !container.has_attribute(&config.error_flag) {
		return false;
	}

	let mut found = false;
	let mut child = container.last_element_child();
	while let Some(candidate) = child {
		if get(&candidate).has_class(&config.marker_class) {
			if let Err(error) = container.remove_child(&candidate) {
				error!("Could not remove error marker: {:?}", error);
			}
			found = true;
			break;
		}
		child = candidate.previous_element_sibling();
	}
	if !found {
		warn!("Flagged container without error marker.");
	}

	if let Err(error) = container.remove_attribute(&config.error_flag) {
		error!("Could not clear container flag: {:?}", error);
	}
	true
}
