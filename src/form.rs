//! The recipe upload form.
//!
//! Browsers hand over a flat name→value mapping in which ingredient rows are named `ingredient-1`, `ingredient-2`, ….
//! [`RecipeForm::from_fields`] folds that into a typed form once, so nothing downstream dispatches on field names.

use crate::{model::Ingredient, Error, Result};
use tracing::{instrument, trace, warn};

pub const INGREDIENT_FIELD_PREFIX: &str = "ingredient-";

/// Raw upload form input, as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeForm {
	pub title: String,
	pub source_url: String,
	pub image: String,
	pub publisher: String,
	pub cooking_time: String,
	pub servings: String,
	/// `quantity,unit,description` rows in form order. Blank rows are allowed.
	pub ingredients: Vec<String>,
}

/// A validated new recipe, before the catalog assigns it an id.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeDraft {
	pub title: String,
	pub source_url: String,
	pub image: String,
	pub publisher: String,
	pub cooking_time: f64,
	pub servings: u32,
	pub ingredients: Vec<Ingredient>,
}

impl RecipeForm {
	/// Collects a flat form field mapping.
	///
	/// Ingredient rows are ordered by their `ingredient-N` index. Unknown fields are ignored.
	#[instrument(skip(fields))]
	pub fn from_fields<I, K, V>(fields: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: AsRef<str>,
		V: Into<String>,
	{
		let mut form = Self::default();
		let mut rows = Vec::new();
		for (name, value) in fields {
			let name = name.as_ref();
			let value = value.into();
			match name {
				"title" => form.title = value,
				"sourceUrl" => form.source_url = value,
				"image" => form.image = value,
				"publisher" => form.publisher = value,
				"cookingTime" => form.cooking_time = value,
				"servings" => form.servings = value,
				_ => match name.strip_prefix(INGREDIENT_FIELD_PREFIX) {
					Some(index) => match index.parse::<usize>() {
						Ok(index) => rows.push((index, value)),
						Err(_) => {
							warn!("Ingredient field {:?} has no numeric index. Appending it after numbered rows.", name);
							rows.push((usize::MAX, value));
						}
					},
					None => trace!("Ignoring unknown form field {:?}.", name),
				},
			}
		}
		rows.sort_by_key(|&(index, _)| index);
		form.ingredients = rows.into_iter().map(|(_, value)| value).collect();
		form
	}

	/// Validates the form into a [`RecipeDraft`]. This never touches the network.
	///
	/// # Errors
	///
	/// [`Error::Validation`] for a malformed ingredient row or a non-numeric cooking time or servings value.
	pub fn to_draft(&self) -> Result<RecipeDraft> {
		let ingredients = self
			.ingredients
			.iter()
			.filter_map(|row| parse_ingredient(row).transpose())
			.collect::<Result<Vec<_>>>()?;

		let cooking_time = self
			.cooking_time
			.trim()
			.parse::<f64>()
			.ok()
			.filter(|minutes| minutes.is_finite() && *minutes >= 0.0)
			.ok_or_else(|| Error::Validation(format!("cooking time must be a non-negative number of minutes, not {:?}", self.cooking_time)))?;

		let servings = self
			.servings
			.trim()
			.parse::<u32>()
			.ok()
			.filter(|&servings| servings > 0)
			.ok_or_else(|| Error::Validation(format!("servings must be a positive whole number, not {:?}", self.servings)))?;

		Ok(RecipeDraft {
			title: self.title.clone(),
			source_url: self.source_url.clone(),
			image: self.image.clone(),
			publisher: self.publisher.clone(),
			cooking_time,
			servings,
			ingredients,
		})
	}
}

/// Parses one `quantity,unit,description` row. Blank rows yield [`None`].
///
/// # Errors
///
/// [`Error::Validation`] unless the row splits into exactly three comma-separated tokens
/// with an empty or numeric quantity.
pub fn parse_ingredient(row: &str) -> Result<Option<Ingredient>> {
	if row.trim().is_empty() {
		return Ok(None);
	}

	let tokens: Vec<&str> = row.split(',').map(str::trim).collect();
	let (quantity, unit, description) = match tokens[..] {
		[quantity, unit, description] => (quantity, unit, description),
		_ => {
			return Err(Error::Validation(format!(
				"wrong ingredient format in {:?}, please use \"quantity,unit,description\"",
				row
			)))
		}
	};

	let quantity = if quantity.is_empty() {
		None
	} else {
		Some(
			quantity
				.parse::<f64>()
				.ok()
				.filter(|quantity| quantity.is_finite())
				.ok_or_else(|| Error::Validation(format!("wrong ingredient format in {:?}, the quantity must be a number", row)))?,
		)
	};

	Ok(Some(Ingredient {
		quantity,
		unit: unit.to_owned(),
		description: description.to_owned(),
	}))
}
