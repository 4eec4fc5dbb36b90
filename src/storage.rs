//! Durable string slots for the bookmark set.
//!
//! The whole set lives in one slot and is rewritten wholesale on every change. There's no protocol for concurrent writers:
//! the last write replaces everything.

use crate::{error::describe_js, Error, Result};
use core::cell::RefCell;
use hashbrown::HashMap;
use std::rc::Rc;
use tracing::instrument;

pub trait BookmarkStorage {
	/// # Errors
	///
	/// [`Error::Storage`] if the slot exists but can't be read.
	fn read(&self, key: &str) -> Result<Option<String>>;

	/// Replaces the slot's content.
	///
	/// # Errors
	///
	/// [`Error::Storage`], for example when a quota is exceeded.
	fn write(&self, key: &str, value: &str) -> Result<()>;

	/// # Errors
	///
	/// [`Error::Storage`].
	fn remove(&self, key: &str) -> Result<()>;
}

/// The page origin's [***localStorage***](https://developer.mozilla.org/en-US/docs/Web/API/Window/localStorage).
#[derive(Debug, Clone)]
pub struct LocalStorage(web_sys::Storage);

impl LocalStorage {
	/// # Errors
	///
	/// [`Error::Storage`] if there's no `window` or the page isn't allowed to use local storage.
	#[instrument]
	pub fn new() -> Result<Self> {
		let window = web_sys::window().ok_or_else(|| Error::Storage("No global `window` found.".to_owned()))?;
		match window.local_storage() {
			Ok(Some(storage)) => Ok(Self(storage)),
			Ok(None) => Err(Error::Storage("`localStorage` is unavailable.".to_owned())),
			Err(error) => Err(Error::Storage(describe_js(&error))),
		}
	}
}

impl BookmarkStorage for LocalStorage {
	fn read(&self, key: &str) -> Result<Option<String>> {
		self.0.get_item(key).map_err(|error| Error::Storage(describe_js(&error)))
	}

	fn write(&self, key: &str, value: &str) -> Result<()> {
		self.0.set_item(key, value).map_err(|error| Error::Storage(describe_js(&error)))
	}

	fn remove(&self, key: &str) -> Result<()> {
		self.0.remove_item(key).map_err(|error| Error::Storage(describe_js(&error)))
	}
}

/// Process-local slots. Clones share their content.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage(Rc<RefCell<HashMap<String, String>>>);

impl MemoryStorage {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Seeds `key` with `value`.
	#[must_use]
	pub fn with(self, key: &str, value: &str) -> Self {
		self.0.borrow_mut().insert(key.to_owned(), value.to_owned());
		self
	}

	#[must_use]
	pub fn get(&self, key: &str) -> Option<String> {
		self.0.borrow().get(key).cloned()
	}
}

impl BookmarkStorage for MemoryStorage {
	fn read(&self, key: &str) -> Result<Option<String>> {
		Ok(self.get(key))
	}

	fn write(&self, key: &str, value: &str) -> Result<()> {
		self.0.borrow_mut().insert(key.to_owned(), value.to_owned());
		Ok(())
	}

	fn remove(&self, key: &str) -> Result<()> {
		self.0.borrow_mut().remove(key);
		Ok(())
	}
}
