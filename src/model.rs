//! The application state and its derived views.
//!
//! Nothing here performs I/O. [`Store`](`crate::store::Store`) owns a [`State`] and drives it from catalog responses.

use crate::{Error, Result};
use core::{iter::FromIterator, slice};
use hashbrown::HashSet;
use serde::{de, Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
	/// [`None`] for uncounted ingredients like "salt to taste".
	pub quantity: Option<f64>,
	pub unit: String,
	pub description: String,
}

/// A complete catalog recipe, as shown in the detail view and stored as bookmark.
///
/// Serialises with the app's own camelCase field names, which is the bookmark storage format.
/// The catalog's snake_case format is handled in [`catalog`](`crate::catalog`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
	pub id: String,
	pub title: String,
	pub publisher: String,
	pub source_url: String,
	pub image: String,
	#[serde(deserialize_with = "positive_servings")]
	pub servings: u32,
	/// In minutes.
	pub cooking_time: f64,
	pub ingredients: Vec<Ingredient>,
	/// Present on recipes that were submitted with an API key.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub key: Option<String>,
	/// Whether a recipe with this [`id`](`Recipe::id`) is in the [`BookmarkSet`].
	///
	/// Derived. Never stored, always recomputed on load and on bookmark changes.
	#[serde(skip)]
	pub bookmarked: bool,
}

impl Recipe {
	/// Rescales every ingredient quantity from the current [`servings`](`Recipe::servings`) to `new_servings`,
	/// then adopts `new_servings`.
	///
	/// Each call divides by the servings value it finds, so successive calls compose.
	///
	/// # Errors
	///
	/// [`Error::Validation`] iff `new_servings` or the current servings are zero.
	/// The recipe is unchanged in that case.
	pub fn rescale(&mut self, new_servings: u32) -> Result<()> {
		if new_servings == 0 {
			return Err(Error::Validation("servings must be a positive number".to_owned()));
		}
		if self.servings == 0 {
			return Err(Error::Validation(format!("recipe {:?} has no servings to scale from", self.id)));
		}

		let (from, to) = (f64::from(self.servings), f64::from(new_servings));
		for quantity in self.ingredients.iter_mut().filter_map(|ingredient| ingredient.quantity.as_mut()) {
			*quantity = *quantity * to / from;
		}
		self.servings = new_servings;
		Ok(())
	}

	/// The search-result projection of this recipe.
	#[must_use]
	pub fn summary(&self) -> RecipeSummary {
		RecipeSummary {
			id: self.id.clone(),
			title: self.title.clone(),
			publisher: self.publisher.clone(),
			image: self.image.clone(),
			key: self.key.clone(),
		}
	}
}

/// Rejects zero, which would make quantities unscalable.
pub(crate) fn positive_servings<'de, D: Deserializer<'de>>(deserializer: D) -> core::result::Result<u32, D::Error> {
	match u32::deserialize(deserializer)? {
		0 => Err(de::Error::invalid_value(de::Unexpected::Unsigned(0), &"a positive number of servings")),
		servings => Ok(servings),
	}
}

/// The reduced recipe projection carried by search results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeSummary {
	pub id: String,
	pub title: String,
	pub publisher: String,
	pub image: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub key: Option<String>,
}

/// The current search and where in its results the user is.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchSession {
	/// Empty means there is no active search.
	pub query: String,
	pub results: Vec<RecipeSummary>,
	/// 1-based. Not clamped; pages past the end are simply empty.
	pub page: usize,
	results_per_page: usize,
}

impl SearchSession {
	#[must_use]
	pub fn new(results_per_page: usize) -> Self {
		Self {
			query: String::new(),
			results: Vec::new(),
			page: 1,
			results_per_page,
		}
	}

	#[must_use]
	pub fn results_per_page(&self) -> usize {
		self.results_per_page
	}

	/// Starts a new pagination sequence over `results`.
	pub fn replace(&mut self, query: String, results: Vec<RecipeSummary>) {
		self.query = query;
		self.results = results;
		self.page = 1;
	}

	/// The results on `page`, without moving there.
	#[must_use]
	pub fn page_slice(&self, page: usize) -> &[RecipeSummary] {
		let start = page.checked_sub(1).and_then(|index| index.checked_mul(self.results_per_page));
		match start {
			Some(start) if start < self.results.len() => {
				let end = start.saturating_add(self.results_per_page).min(self.results.len());
				&self.results[start..end]
			}
			_ => &[],
		}
	}

	/// Moves to `page` and returns its results.
	pub fn go_to_page(&mut self, page: usize) -> &[RecipeSummary] {
		self.page = page;
		self.page_slice(page)
	}

	/// The results on the current page.
	#[must_use]
	pub fn current_page(&self) -> &[RecipeSummary] {
		self.page_slice(self.page)
	}

	#[must_use]
	pub fn page_count(&self) -> usize {
		let len = self.results.len();
		len / self.results_per_page + usize::from(len % self.results_per_page != 0)
	}

	#[must_use]
	pub fn has_previous_page(&self) -> bool {
		self.page > 1
	}

	#[must_use]
	pub fn has_next_page(&self) -> bool {
		self.page < self.page_count()
	}
}

/// Bookmarked recipe snapshots in bookmark order, unique by [`id`](`Recipe::id`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookmarkSet {
	recipes: Vec<Recipe>,
	ids: HashSet<String>,
}

impl BookmarkSet {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	#[must_use]
	pub fn contains(&self, id: &str) -> bool {
		self.ids.contains(id)
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.recipes.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.recipes.is_empty()
	}

	pub fn iter(&self) -> slice::Iter<'_, Recipe> {
		self.recipes.iter()
	}

	#[must_use]
	pub fn as_slice(&self) -> &[Recipe] {
		&self.recipes
	}

	/// Appends `recipe`, flagged as [bookmarked](`Recipe::bookmarked`), unless its id is already bookmarked.
	///
	/// Returns whether it was added.
	pub fn push(&mut self, mut recipe: Recipe) -> bool {
		if !self.ids.insert(recipe.id.clone()) {
			return false;
		}
		recipe.bookmarked = true;
		self.recipes.push(recipe);
		true
	}

	/// Removes the bookmark with `id`, returning it and the position it had.
	pub fn remove(&mut self, id: &str) -> Option<(usize, Recipe)> {
		let index = self.recipes.iter().position(|recipe| recipe.id == id)?;
		self.ids.remove(id);
		Some((index, self.recipes.remove(index)))
	}

	/// Puts a [removed](`BookmarkSet::remove`) bookmark back where it was.
	pub(crate) fn restore(&mut self, index: usize, recipe: Recipe) {
		if self.ids.insert(recipe.id.clone()) {
			self.recipes.insert(index.min(self.recipes.len()), recipe);
		}
	}

	/// Undoes the most recent successful [`push`](`BookmarkSet::push`).
	pub(crate) fn pop(&mut self) -> Option<Recipe> {
		let recipe = self.recipes.pop()?;
		self.ids.remove(&recipe.id);
		Some(recipe)
	}

	pub fn clear(&mut self) {
		self.recipes.clear();
		self.ids.clear();
	}

	/// # Errors
	///
	/// Iff a recipe can't be represented as JSON, which shouldn't happen for finite quantities.
	pub fn to_json(&self) -> Result<String> {
		Ok(serde_json::to_string(&self.recipes)?)
	}

	/// Reads a stored bookmark sequence. Duplicate ids after the first are dropped.
	///
	/// # Errors
	///
	/// [`Error::Decode`] if `json` isn't a serialised recipe sequence.
	pub fn from_json(json: &str) -> Result<Self> {
		let recipes: Vec<Recipe> = serde_json::from_str(json)?;
		Ok(recipes.into_iter().collect())
	}
}

impl FromIterator<Recipe> for BookmarkSet {
	fn from_iter<I: IntoIterator<Item = Recipe>>(iter: I) -> Self {
		let mut set = Self::new();
		for recipe in iter {
			set.push(recipe);
		}
		set
	}
}

impl<'a> IntoIterator for &'a BookmarkSet {
	type Item = &'a Recipe;
	type IntoIter = slice::Iter<'a, Recipe>;

	fn into_iter(self) -> Self::IntoIter {
		self.iter()
	}
}

/// The single source of truth.
#[derive(Debug, Clone, PartialEq)]
pub struct State {
	/// The recipe in the detail view, if one was loaded.
	pub recipe: Option<Recipe>,
	pub search: SearchSession,
	pub bookmarks: BookmarkSet,
}

impl State {
	#[must_use]
	pub fn new(results_per_page: usize) -> Self {
		Self {
			recipe: None,
			search: SearchSession::new(results_per_page),
			bookmarks: BookmarkSet::new(),
		}
	}

	/// Recomputes [`Recipe::bookmarked`] for the current recipe.
	pub(crate) fn refresh_bookmarked(&mut self) {
		if let Some(recipe) = &mut self.recipe {
			recipe.bookmarked = self.bookmarks.contains(&recipe.id);
		}
	}

	/// Sets the current recipe's flag iff it is the one with `id`.
	pub(crate) fn mark_bookmarked(&mut self, id: &str, bookmarked: bool) {
		if let Some(recipe) = self.recipe.as_mut().filter(|recipe| recipe.id == id) {
			recipe.bookmarked = bookmarked;
		}
	}
}
