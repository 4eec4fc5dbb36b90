//! The remote catalog's wire format and endpoints.
//!
//! The catalog names fields in snake_case (`source_url`, `image_url`, `cooking_time`) and wraps payloads as
//! `{ "data": { "recipe": … } }` or `{ "data": { "recipes": […] } }`.
//! This module translates in both directions so that the rest of the crate only sees [`model`](`crate::model`) types.

use crate::{
	config::Config,
	form::RecipeDraft,
	model::{Ingredient, Recipe, RecipeSummary},
	Error, Result,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

#[derive(Debug, Deserialize)]
struct Envelope<T> {
	data: T,
}

#[derive(Debug, Deserialize)]
struct RecipeData {
	recipe: CatalogRecipe,
}

#[derive(Debug, Deserialize)]
struct RecipesData {
	#[serde(default)]
	recipes: Vec<CatalogSummary>,
}

/// A stored recipe as the catalog returns it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CatalogRecipe {
	pub id: String,
	pub title: String,
	pub publisher: String,
	pub source_url: String,
	pub image_url: String,
	#[serde(deserialize_with = "crate::model::positive_servings")]
	pub servings: u32,
	pub cooking_time: f64,
	#[serde(default)]
	pub ingredients: Vec<Ingredient>,
	#[serde(default)]
	pub key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CatalogSummary {
	pub id: String,
	pub title: String,
	pub publisher: String,
	pub image_url: String,
	#[serde(default)]
	pub key: Option<String>,
}

/// A new recipe in the shape the catalog accepts. The catalog assigns the id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Submission {
	pub title: String,
	pub source_url: String,
	pub image_url: String,
	pub publisher: String,
	pub cooking_time: f64,
	pub servings: u32,
	pub ingredients: Vec<Ingredient>,
}

impl From<CatalogRecipe> for Recipe {
	fn from(recipe: CatalogRecipe) -> Self {
		Self {
			id: recipe.id,
			title: recipe.title,
			publisher: recipe.publisher,
			source_url: recipe.source_url,
			image: recipe.image_url,
			servings: recipe.servings,
			cooking_time: recipe.cooking_time,
			ingredients: recipe.ingredients,
			key: recipe.key,
			bookmarked: false,
		}
	}
}

impl From<CatalogSummary> for RecipeSummary {
	fn from(summary: CatalogSummary) -> Self {
		Self {
			id: summary.id,
			title: summary.title,
			publisher: summary.publisher,
			image: summary.image_url,
			key: summary.key,
		}
	}
}

impl From<RecipeDraft> for Submission {
	fn from(draft: RecipeDraft) -> Self {
		Self {
			title: draft.title,
			source_url: draft.source_url,
			image_url: draft.image,
			publisher: draft.publisher,
			cooking_time: draft.cooking_time,
			servings: draft.servings,
			ingredients: draft.ingredients,
		}
	}
}

/// Extracts the recipe from a single-recipe envelope.
///
/// The returned recipe is not yet [flagged](`Recipe::bookmarked`).
///
/// # Errors
///
/// [`Error::Decode`] if `body` isn't a single-recipe envelope.
pub fn decode_recipe(body: Value) -> Result<Recipe> {
	let envelope: Envelope<RecipeData> = serde_json::from_value(body)?;
	Ok(envelope.data.recipe.into())
}

/// Extracts the results from a search envelope. No results is not an error.
///
/// # Errors
///
/// [`Error::Decode`] if `body` isn't a search envelope.
pub fn decode_results(body: Value) -> Result<Vec<RecipeSummary>> {
	let envelope: Envelope<RecipesData> = serde_json::from_value(body)?;
	Ok(envelope.data.recipes.into_iter().map(Into::into).collect())
}

/// Builds the catalog's request URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
	base: Url,
	key: Option<String>,
}

impl Endpoints {
	#[must_use]
	pub fn new(config: &Config) -> Self {
		Self {
			base: config.api_url.clone(),
			key: config.api_key.clone(),
		}
	}

	/// `{base}/{id}?key={key}`
	///
	/// # Errors
	///
	/// [`Error::Validation`] if the base URL can't have path segments.
	pub fn recipe(&self, id: &str) -> Result<Url> {
		let mut url = self.base.clone();
		url.path_segments_mut()
			.map_err(|()| Error::Validation(format!("catalog URL {} cannot be a base", self.base)))?
			.pop_if_empty()
			.push(id);
		Ok(self.with_key(url))
	}

	/// `{base}?search={query}&key={key}`
	#[must_use]
	pub fn search(&self, query: &str) -> Url {
		let mut url = self.base.clone();
		url.query_pairs_mut().append_pair("search", query);
		self.with_key(url)
	}

	/// `{base}?key={key}`
	#[must_use]
	pub fn upload(&self) -> Url {
		self.with_key(self.base.clone())
	}

	fn with_key(&self, mut url: Url) -> Url {
		if let Some(key) = &self.key {
			url.query_pairs_mut().append_pair("key", key);
		}
		url
	}
}
