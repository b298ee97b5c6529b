//! Token-addressed publish/subscribe.
//!
//! An [`EventRegistry`] maps event names to ordered buckets of subscriptions.
//! Each subscription carries a fresh [`Token`] and the handle of the owner that subscribed,
//! so that an owner can later remove exactly its own entries.
//!
//! The registry is a cheaply clonable handle. Its contents are dropped along with the last handle
//! or explicitly through [`EventRegistry::clear`].
//! [`global`] returns the per-thread instance that backs [`crate::publish`] and [`crate::Selection::subscribe`].
//!
//! # Ordering and re-entrancy
//!
//! Callbacks run in subscription order within one bucket.
//! [`EventRegistry::publish`] works on a snapshot of the bucket, so callbacks may subscribe or unsubscribe
//! (also on the bucket being published), which takes effect with the next publish.

use crate::token::{self, Strength, Token};
use core::fmt::{self, Debug, Formatter};
use hashbrown::HashMap;
use std::{cell::RefCell, rc::Rc};
use tracing::{debug, instrument, trace, trace_span};

/// Invoked with the owner, the published event name and the subscription's token.
pub type Callback<O> = Rc<dyn Fn(&O, &str, &Token)>;

struct Subscription<O> {
	token: Token,
	owner: O,
	callback: Callback<O>,
}
impl<O: Clone> Clone for Subscription<O> {
	fn clone(&self) -> Self {
		Self {
			token: self.token.clone(),
			owner: self.owner.clone(),
			callback: self.callback.clone(),
		}
	}
}

struct Inner<O> {
	buckets: HashMap<String, Vec<Subscription<O>>>,
	random: Box<dyn FnMut() -> f64>,
}

/// Subscriptions of owners of type `O`, bucketed by event name.
pub struct EventRegistry<O>(Rc<RefCell<Inner<O>>>);

impl<O> Clone for EventRegistry<O> {
	fn clone(&self) -> Self {
		Self(self.0.clone())
	}
}

impl<O> Debug for EventRegistry<O> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		let inner = self.0.borrow();
		f.debug_map()
			.entries(inner.buckets.iter().map(|(event, bucket)| (event, bucket.len())))
			.finish()
	}
}

impl<O: Clone + PartialEq> Default for EventRegistry<O> {
	fn default() -> Self {
		Self::new()
	}
}

impl<O: Clone + PartialEq> EventRegistry<O> {
	/// Creates an empty registry whose tokens are drawn with [`Math.random()`](https://developer.mozilla.org/en-US/docs/Web/JavaScript/Reference/Global_Objects/Math/random).
	#[must_use]
	pub fn new() -> Self {
		Self::with_random(js_sys::Math::random)
	}

	/// Creates an empty registry drawing tokens from `random`, which should return values in `[0, 1)`.
	#[must_use]
	pub fn with_random(random: impl 'static + FnMut() -> f64) -> Self {
		Self(Rc::new(RefCell::new(Inner {
			buckets: HashMap::new(),
			random: Box::new(random),
		})))
	}

	/// Appends a subscription for `owner` to the bucket of `event`, creating the bucket if necessary.
	pub fn subscribe(&self, owner: O, event: &str, callback: impl 'static + Fn(&O, &str, &Token)) -> Token {
		self.subscribe_shared(owner, event, Rc::new(callback))
	}

	pub(crate) fn subscribe_shared(&self, owner: O, event: &str, callback: Callback<O>) -> Token {
		let mut inner = self.0.borrow_mut();
		let token = token::generate_with(Strength::Normal, &mut *inner.random);
		let bucket = inner.buckets.entry(event.to_owned()).or_insert_with(Vec::new);
		bucket.push(Subscription {
			token: token.clone(),
			owner,
			callback,
		});
		trace!(event, position = bucket.len() - 1, "Subscribed.");
		token
	}

	/// Removes all of `owner`'s subscriptions to `event` and calls `on_removed` once for each of them.
	///
	/// Unknown events and owners without subscriptions are a no-op.
	///
	/// Returns the number of removed subscriptions.
	pub fn unsubscribe(&self, owner: &O, event: &str, mut on_removed: impl FnMut()) -> usize {
		let removed = {
			let mut inner = self.0.borrow_mut();
			let bucket = match inner.buckets.get_mut(event) {
				Some(bucket) => bucket,
				None => {
					debug!(event, "Nothing to unsubscribe from: No such event.");
					return 0;
				}
			};
			let before = bucket.len();
			bucket.retain(|subscription| subscription.owner != *owner);
			let removed = before - bucket.len();
			if bucket.is_empty() {
				inner.buckets.remove(event);
			}
			removed
		};
		trace!(event, removed, "Unsubscribed.");

		for _ in 0..removed {
			on_removed();
		}
		removed
	}

	/// Calls every subscriber of `event` in subscription order.
	///
	/// Unknown events are a no-op.
	///
	/// Returns the number of invoked callbacks.
	#[instrument(skip(self))]
	pub fn publish(&self, event: &str) -> usize {
		let snapshot = match self.0.borrow().buckets.get(event) {
			Some(bucket) => bucket.clone(),
			None => {
				debug!("No subscribers.");
				return 0;
			}
		};

		for Subscription { token, owner, callback } in &snapshot {
			let span = trace_span!("Calling subscriber", %token);
			let _enter = span.enter();
			callback(owner, event, token);
		}
		snapshot.len()
	}

	/// Lists the tokens `owner` currently holds, across all events, in no particular order.
	#[must_use]
	pub fn tokens(&self, owner: &O) -> Vec<Token> {
		self.0
			.borrow()
			.buckets
			.values()
			.flatten()
			.filter(|subscription| subscription.owner == *owner)
			.map(|subscription| subscription.token.clone())
			.collect()
	}

	/// Counts the subscriptions to `event`.
	#[must_use]
	pub fn subscriber_count(&self, event: &str) -> usize {
		self.0.borrow().buckets.get(event).map_or(0, Vec::len)
	}

	/// Drops all subscriptions, releasing their owners and callbacks.
	pub fn clear(&self) {
		let buckets = core::mem::take(&mut self.0.borrow_mut().buckets);
		debug!(events = buckets.len(), "Cleared event registry.");
		// Callbacks may hold registry handles, so they're dropped outside the borrow.
		drop(buckets);
	}
}

thread_local! {
	static GLOBAL: EventRegistry<web_sys::Element> = EventRegistry::new();
}

/// Returns the calling thread's default registry.
#[must_use]
pub fn global() -> EventRegistry<web_sys::Element> {
	GLOBAL.with(EventRegistry::clone)
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::cell::Cell;

	fn registry() -> EventRegistry<&'static str> {
		let mut seed = 0.0_f64;
		EventRegistry::with_random(move || {
			seed = (seed + 0.379) % 1.;
			seed
		})
	}

	#[test]
	fn publishing_unknown_events_does_nothing() {
		let registry = registry();
		assert_eq!(registry.publish("never"), 0);

		let calls = Rc::new(Cell::new(0));
		registry.subscribe("a", "known", {
			let calls = calls.clone();
			move |_, _, _| calls.set(calls.get() + 1)
		});
		assert_eq!(registry.publish("unknown"), 0);
		assert_eq!(calls.get(), 0);
	}

	#[test]
	fn subscribe_publish_unsubscribe_publish() {
		let registry = registry();
		let calls = Rc::new(Cell::new(0));
		let token = registry.subscribe("button", "deleted", {
			let calls = calls.clone();
			move |owner, event, _| {
				assert_eq!((*owner, event), ("button", "deleted"));
				calls.set(calls.get() + 1);
			}
		});
		assert_eq!(token.as_str().len(), 20);

		assert_eq!(registry.publish("deleted"), 1);
		assert_eq!(registry.unsubscribe(&"button", "deleted", || ()), 1);
		assert_eq!(registry.publish("deleted"), 0);
		assert_eq!(calls.get(), 1);
	}

	#[test]
	fn callbacks_receive_their_own_token_in_subscription_order() {
		let registry = registry();
		let seen = Rc::new(RefCell::new(Vec::new()));
		let mut tokens = Vec::new();
		for owner in ["first", "second", "third"] {
			tokens.push(registry.subscribe(owner, "tick", {
				let seen = seen.clone();
				move |owner, _, token| seen.borrow_mut().push((*owner, token.clone()))
			}));
		}

		registry.publish("tick");
		let seen = seen.borrow();
		assert_eq!(seen.iter().map(|(owner, _)| *owner).collect::<Vec<_>>(), ["first", "second", "third"]);
		assert_eq!(seen.iter().map(|(_, token)| token.clone()).collect::<Vec<_>>(), tokens);
	}

	#[test]
	fn owners_keep_every_token() {
		let registry = registry();
		let a = registry.subscribe("owner", "one", |_, _, _| ());
		let b = registry.subscribe("owner", "two", |_, _, _| ());
		let c = registry.subscribe("owner", "two", |_, _, _| ());
		registry.subscribe("other", "two", |_, _, _| ());

		let mut tokens = registry.tokens(&"owner");
		tokens.sort_by(|l, r| l.as_str().cmp(r.as_str()));
		let mut expected = vec![a.clone(), b, c];
		expected.sort_by(|l, r| l.as_str().cmp(r.as_str()));
		assert_eq!(tokens, expected);

		let mut removed = 0;
		assert_eq!(registry.unsubscribe(&"owner", "two", || removed += 1), 2);
		assert_eq!(removed, 2);
		assert_eq!(registry.tokens(&"owner"), [a]);
		assert_eq!(registry.subscriber_count("two"), 1);
	}

	#[test]
	fn unsubscribing_without_subscriptions_is_a_no_op() {
		let registry = registry();
		let mut called = false;
		assert_eq!(registry.unsubscribe(&"nobody", "nothing", || called = true), 0);

		registry.subscribe("somebody", "something", |_, _, _| ());
		assert_eq!(registry.unsubscribe(&"nobody", "something", || called = true), 0);
		assert!(!called);
		assert_eq!(registry.subscriber_count("something"), 1);
	}

	#[test]
	fn re_entrant_changes_apply_to_the_next_publish() {
		let registry = registry();
		let calls = Rc::new(Cell::new(0));
		registry.subscribe("self-removing", "event", {
			let registry = registry.clone();
			let calls = calls.clone();
			move |owner, event, _| {
				calls.set(calls.get() + 1);
				registry.unsubscribe(owner, event, || ());
				registry.subscribe("late", event, |_, _, _| ());
			}
		});

		assert_eq!(registry.publish("event"), 1);
		assert_eq!(calls.get(), 1);
		assert_eq!(registry.subscriber_count("event"), 1);
		assert!(registry.tokens(&"self-removing").is_empty());
		assert_eq!(registry.publish("event"), 1);
		assert_eq!(calls.get(), 1);
	}

	#[test]
	fn clear() {
		let registry = registry();
		registry.subscribe("a", "x", |_, _, _| ());
		registry.subscribe("b", "y", |_, _, _| ());
		registry.clear();
		assert_eq!(registry.publish("x"), 0);
		assert_eq!(registry.subscriber_count("y"), 0);
	}
}
