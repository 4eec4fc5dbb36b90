use crate::{error::describe_js, Error, Result};
use wasm_bindgen::JsCast;
use web_sys::{DocumentFragment, Element, Node, Text};

fn dom_error(error: wasm_bindgen::JsValue) -> Error {
	Error::Dom(describe_js(&error))
}

/// Parses `markup` into a detached fragment, using `context` as parsing context.
///
/// # Errors
///
/// [`Error::Dom`] if `context` has no owner document or the markup can't be parsed there.
pub fn load_fragment(context: &Element, markup: &str) -> Result<DocumentFragment> {
	let document = context.owner_document().ok_or_else(|| Error::Dom("No owner document found for mount point.".to_owned()))?;
	let range = document.create_range().map_err(dom_error)?;
	range.select_node_contents(context).map_err(dom_error)?;
	range.create_contextual_fragment(markup).map_err(dom_error)
}

/// All elements below `parent`, in document order. `parent` itself is not included.
#[must_use]
pub fn load_elements(parent: &Node) -> Vec<Element> {
	let mut elements = Vec::new();
	load_elements_into(parent, &mut elements);
	elements
}

fn load_elements_into(parent: &Node, elements: &mut Vec<Element>) {
	let child_nodes = parent.child_nodes();
	for i in 0..child_nodes.length() {
		if let Some(element) = child_nodes.item(i).and_then(|child| child.dyn_into::<Element>().ok()) {
			elements.push(element.clone());
			load_elements_into(&element, elements);
		}
	}
}

/// `element`'s whole text content iff its first child is a text node with non-whitespace data.
///
/// Elements that start with markup or only carry attributes yield [`None`].
#[must_use]
pub fn load_direct_text(element: &Element) -> Option<String> {
	let first = element.first_child()?;
	let text = first.dyn_ref::<Text>()?;
	if text.data().trim().is_empty() {
		None
	} else {
		element.text_content()
	}
}

/// `element`'s attributes as name/value pairs, in their stored order.
#[must_use]
pub fn load_attributes(element: &Element) -> Vec<(String, String)> {
	let attributes = element.attributes();
	(0..attributes.length())
		.filter_map(|i| attributes.item(i))
		.map(|attribute| (attribute.name(), attribute.value()))
		.collect()
}
