//! Pairs a presentation [`Template`] with a [`ViewReconciler`].

use crate::{
	reconcile::{PatchReport, ViewReconciler},
	Result,
};
use tracing::instrument;
use web_sys::Element;

/// Turns data into markup. Implementations must be pure: the same data always yields the same markup,
/// and all data yields markup of the same shape wherever [`View::update`] is used.
pub trait Template {
	type Data: ?Sized;

	fn generate_markup(&self, data: &Self::Data) -> String;
}

#[derive(Debug)]
pub struct View<T> {
	template: T,
	reconciler: ViewReconciler,
}

impl<T: Template> View<T> {
	#[must_use]
	pub fn new(template: T, mount_point: Element) -> Self {
		Self {
			template,
			reconciler: ViewReconciler::new_for_element_child_nodes(mount_point),
		}
	}

	#[must_use]
	pub fn reconciler(&self) -> &ViewReconciler {
		&self.reconciler
	}

	/// Replaces the view's content with `data` rendered through the template.
	///
	/// # Errors
	///
	/// See [`ViewReconciler::render_markup`].
	#[instrument(skip(self, data))]
	pub fn render(&mut self, data: &T::Data) -> Result<PatchReport> {
		let markup = self.template.generate_markup(data);
		self.reconciler.render_markup(&markup)
	}

	/// Patches the view's content towards `data`. Renders instead if the view is empty.
	///
	/// # Errors
	///
	/// See [`ViewReconciler::update_markup`].
	#[instrument(skip(self, data))]
	pub fn update(&mut self, data: &T::Data) -> Result<PatchReport> {
		let markup = self.template.generate_markup(data);
		self.reconciler.update_markup(&markup)
	}

	/// Replaces the view's content with markup that didn't come from the template, like a spinner or an error message.
	///
	/// The next [`update`](`View::update`) will most likely fail with a shape mismatch, so [`render`](`View::render`) next.
	///
	/// # Errors
	///
	/// See [`ViewReconciler::render_markup`].
	pub fn render_other(&mut self, markup: &str) -> Result<PatchReport> {
		self.reconciler.render_markup(markup)
	}

	pub fn clear(&mut self) {
		self.reconciler.clear();
	}
}
