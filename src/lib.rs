#![doc(html_root_url = "https://docs.rs/dabble-dom/0.0.1")]
#![warn(clippy::pedantic)]

#[cfg(doctest)]
pub mod readme {
	doc_comment::doctest!("../README.md");
}

mod ajax;
pub mod events;
pub mod listener;
pub mod module;
mod selection;
pub mod token;
pub mod validation;

pub use events::EventRegistry;
pub use listener::{EventListener, Listeners};
pub use module::{extend, module_version, Module};
pub use selection::{get, ElementSpec, Position, Selection, Selector};
pub use token::{generate as generate_token, Strength, Token};

/// This crate's version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Publishes `event` on the calling thread's default [`EventRegistry`](`events::global`).
///
/// Returns the number of notified subscribers.
pub fn publish(event: &str) -> usize {
	events::global().publish(event)
}
