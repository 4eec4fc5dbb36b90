use crate::{
	error::describe_js,
	load::{load_attributes, load_direct_text, load_elements, load_fragment},
	Error, Result,
};
use tracing::{error, instrument, level_filters::STATIC_MAX_LEVEL, trace, trace_span, warn, Level};
use web_sys::{DocumentFragment, Element};

/// Attached to a specific [`web_sys::Element`] (the mount point), this `struct` can be used to update its [***childNodes***](https://developer.mozilla.org/en-US/docs/Web/API/Node/childNodes).
///
/// Note that this does not include the mount point itself, which is never replaced,
/// and also does not include its [***Attr***](https://developer.mozilla.org/en-US/docs/Web/API/Attr)ibutes.
///
/// # Correct Use
///
/// [`update_markup`](`ViewReconciler::update_markup`) patches positionally:
/// the n-th element (in document order) of the new markup is compared with the n-th mounted element.
/// Only ever patch with markup from the same template that produced the mounted content.
/// Mismatching shapes are detected by element count and tag names and rejected with [`Error::ShapeMismatch`],
/// but same-shaped markup from a different template is patched without complaint.
///
/// Attributes missing from the new markup are **not** removed from mounted elements.
#[derive(Debug, Clone)]
pub struct ViewReconciler {
	element: Element,
}

/// What an update did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatchReport {
	/// Whether the mount point's children were replaced wholesale.
	pub full_render: bool,
	/// Compared element pairs.
	pub elements: usize,
	pub text_updates: usize,
	pub attribute_updates: usize,
}

impl ViewReconciler {
	#[must_use]
	pub fn new_for_element_child_nodes(element: Element) -> Self {
		Self { element }
	}

	#[must_use]
	pub fn element(&self) -> &Element {
		&self.element
	}

	/// Whether nothing was rendered yet (or everything was [cleared](`ViewReconciler::clear`)).
	#[must_use]
	pub fn is_empty(&self) -> bool {
		!self.element.has_child_nodes()
	}

	pub fn clear(&mut self) {
		self.element.set_inner_html("");
	}

	/// Discards all mounted content and mounts `markup` in its place.
	///
	/// # Errors
	///
	/// [`Error::Dom`] if parsing or insertion fails. The mount point is left empty in the latter case.
	#[instrument(skip(self, markup))]
	pub fn render_markup(&mut self, markup: &str) -> Result<PatchReport> {
		log_markup(markup);
		let fragment = load_fragment(&self.element, markup)?;
		self.render_fragment(&fragment)
	}

	/// Discards all mounted content and moves `fragment`'s children in its place.
	///
	/// # Errors
	///
	/// [`Error::Dom`] if insertion fails.
	#[instrument(skip(self, fragment))]
	pub fn render_fragment(&mut self, fragment: &DocumentFragment) -> Result<PatchReport> {
		let elements = load_elements(fragment).len();
		self.clear();
		self.element.append_child(fragment).map_err(|error| Error::Dom(describe_js(&error)))?;
		trace!("Rendered {} element(s).", elements);
		Ok(PatchReport {
			full_render: true,
			elements,
			..PatchReport::default()
		})
	}

	/// Patches the mounted content towards `markup`, or renders it if nothing is mounted yet.
	///
	/// # Errors
	///
	/// [`Error::Dom`] if parsing fails, [`Error::ShapeMismatch`] if the markup doesn't fit the mounted content.
	/// Nothing is changed in either case.
	#[instrument(skip(self, markup))]
	pub fn update_markup(&mut self, markup: &str) -> Result<PatchReport> {
		log_markup(markup);
		let fragment = load_fragment(&self.element, markup)?;
		self.update_fragment(&fragment)
	}

	/// Like [`update_markup`](`ViewReconciler::update_markup`), with already parsed content.
	///
	/// `fragment` is only read in patch mode and emptied when rendering.
	///
	/// # Errors
	///
	/// [`Error::ShapeMismatch`] if the fragment doesn't fit the mounted content, or [`Error::Dom`] when rendering.
	#[instrument(skip(self, fragment))]
	pub fn update_fragment(&mut self, fragment: &DocumentFragment) -> Result<PatchReport> {
		if self.is_empty() {
			trace!("Nothing mounted yet. Switching to full render.");
			return self.render_fragment(fragment);
		}

		let new_elements = load_elements(fragment);
		let current_elements = load_elements(&self.element);
		check_shape(&new_elements, &current_elements)?;

		let mut report = PatchReport {
			elements: new_elements.len(),
			..PatchReport::default()
		};
		for (position, (new, current)) in new_elements.iter().zip(&current_elements).enumerate() {
			if new.is_equal_node(Some(&**current)) {
				continue;
			}

			let span = trace_span!("Patching element", position, tag = %current.tag_name());
			let _enter = span.enter();

			if let Some(text) = load_direct_text(new) {
				if current.text_content().as_deref() != Some(text.as_str()) {
					if STATIC_MAX_LEVEL >= Level::WARN && current.child_element_count() > 0 {
						warn!("Overwriting text of <{}> also replaces its {} child element(s).", current.tag_name(), current.child_element_count());
					}
					current.set_text_content(Some(text.as_str()));
					report.text_updates += 1;
				}
			}

			for (name, value) in load_attributes(new) {
				if current.get_attribute(&name).as_deref() == Some(value.as_str()) {
					continue;
				}
				match current.set_attribute(&name, &value) {
					Ok(()) => report.attribute_updates += 1,
					Err(error) => error!("Could not set attribute {:?}={:?}: {:?}", name, value, error),
				}
			}
		}

		trace!(?report, "Patched.");
		Ok(report)
	}
}

fn check_shape(new_elements: &[Element], current_elements: &[Element]) -> Result<()> {
	if new_elements.len() != current_elements.len() {
		error!("Refusing to patch {} mounted element(s) with {} new one(s).", current_elements.len(), new_elements.len());
		return Err(Error::ShapeMismatch {
			expected: format!("{} element(s)", current_elements.len()),
			found: format!("{} element(s)", new_elements.len()),
		});
	}

	for (position, (new, current)) in new_elements.iter().zip(current_elements).enumerate() {
		let (new_tag, current_tag) = (new.tag_name(), current.tag_name());
		if new_tag != current_tag {
			error!("Refusing to patch <{}> with <{}> at position {}.", current_tag, new_tag, position);
			return Err(Error::ShapeMismatch {
				expected: format!("<{}> at position {}", current_tag, position),
				found: format!("<{}>", new_tag),
			});
		}
	}
	Ok(())
}

fn log_markup(markup: &str) {
	if cfg!(feature = "dangerous-logging") {
		trace!(markup, "Loading markup.");
	} else {
		trace!("Loading {} byte(s) of markup.", markup.len());
	}
}
