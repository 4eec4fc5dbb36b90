use crate::{
	catalog::{self, Endpoints, Submission},
	config::Config,
	form::RecipeForm,
	model::{BookmarkSet, Recipe, RecipeSummary, State},
	net::NetworkClient,
	storage::BookmarkStorage,
	Result,
};
use core::fmt;
use tracing::{error, info, instrument, trace, warn};

/// Owns the application [`State`] and performs every mutation of it.
///
/// Each operation borrows the store exclusively, including across its network await,
/// so two operations can't interleave on one store.
/// Failed loads leave the previous state untouched; nothing is retried.
pub struct Store {
	config: Config,
	endpoints: Endpoints,
	client: NetworkClient,
	storage: Box<dyn BookmarkStorage>,
	state: State,
}

impl fmt::Debug for Store {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Store")
			.field("config", &self.config)
			.field("client", &self.client)
			.field("state", &self.state)
			.finish_non_exhaustive()
	}
}

impl Store {
	/// Creates a store and [loads](`Store::load_bookmarks`) the persisted bookmarks.
	///
	/// # Errors
	///
	/// [`Error::Validation`](`crate::Error::Validation`) if `config` is unusable.
	#[instrument(skip(client, storage))]
	pub fn new(config: Config, client: NetworkClient, storage: impl 'static + BookmarkStorage) -> Result<Self> {
		config.validate()?;
		let mut store = Self {
			endpoints: Endpoints::new(&config),
			state: State::new(config.results_per_page),
			config,
			client,
			storage: Box::new(storage),
		};
		store.load_bookmarks();
		Ok(store)
	}

	#[must_use]
	pub fn state(&self) -> &State {
		&self.state
	}

	#[must_use]
	pub fn config(&self) -> &Config {
		&self.config
	}

	/// Replaces the bookmark set with the persisted one.
	///
	/// A missing, unreadable or corrupt slot yields an empty set.
	#[instrument(skip(self))]
	pub fn load_bookmarks(&mut self) {
		let key = &self.config.bookmarks_key;
		let bookmarks = match self.storage.read(key) {
			Ok(Some(json)) => parse_stored_bookmarks(&json),
			Ok(None) => {
				trace!("No stored bookmarks.");
				BookmarkSet::new()
			}
			Err(error) => {
				warn!("Could not read stored bookmarks: {}", error);
				BookmarkSet::new()
			}
		};
		info!("Loaded {} bookmark(s).", bookmarks.len());
		self.state.bookmarks = bookmarks;
		self.state.refresh_bookmarked();
	}

	/// Fetches recipe `id` and makes it the current recipe.
	///
	/// # Errors
	///
	/// Any [`NetworkClient::request`] error, or [`Error::Decode`](`crate::Error::Decode`) for an unexpected envelope.
	/// The current recipe is unchanged on error.
	#[instrument(skip(self))]
	pub async fn load_recipe(&mut self, id: &str) -> Result<()> {
		let url = self.endpoints.recipe(id)?;
		let body = self.client.get(url).await?;
		let mut recipe = catalog::decode_recipe(body)?;
		recipe.bookmarked = self.state.bookmarks.contains(&recipe.id);
		trace!(bookmarked = recipe.bookmarked, "Loaded recipe {:?}.", recipe.id);
		self.state.recipe = Some(recipe);
		Ok(())
	}

	/// Searches the catalog for `query` and starts a new pagination sequence over the results.
	///
	/// # Errors
	///
	/// Like [`Store::load_recipe`]. The previous search is unchanged on error.
	#[instrument(skip(self))]
	pub async fn load_search_results(&mut self, query: &str) -> Result<()> {
		let body = self.client.get(self.endpoints.search(query)).await?;
		let results = catalog::decode_results(body)?;
		info!("{} result(s).", results.len());
		self.state.search.replace(query.to_owned(), results);
		Ok(())
	}

	/// Moves the search session to `page` (or stays on the current one) and returns that page's results.
	#[instrument(skip(self))]
	pub fn results_page(&mut self, page: Option<usize>) -> &[RecipeSummary] {
		let page = page.unwrap_or(self.state.search.page);
		self.state.search.go_to_page(page)
	}

	/// Rescales the current recipe's ingredients to `new_servings`. Does nothing without a current recipe.
	///
	/// # Errors
	///
	/// [`Error::Validation`](`crate::Error::Validation`) iff `new_servings` is zero.
	#[instrument(skip(self))]
	pub fn update_servings(&mut self, new_servings: u32) -> Result<()> {
		match &mut self.state.recipe {
			Some(recipe) => recipe.rescale(new_servings),
			None => {
				trace!("No current recipe to rescale.");
				Ok(())
			}
		}
	}

	/// Bookmarks the given snapshot and persists the set.
	///
	/// Flags the current recipe if it has the same id. Already bookmarked ids are left as they are.
	///
	/// # Errors
	///
	/// [`Error::Storage`](`crate::Error::Storage`) if persisting fails, in which case nothing changes.
	#[instrument(skip(self, recipe), fields(id = %recipe.id))]
	pub fn add_bookmark(&mut self, recipe: Recipe) -> Result<()> {
		let id = recipe.id.clone();
		if !self.state.bookmarks.push(recipe) {
			trace!("Already bookmarked.");
			return Ok(());
		}
		if let Err(error) = self.persist_bookmarks() {
			self.state.bookmarks.pop();
			return Err(error);
		}
		self.state.mark_bookmarked(&id, true);
		Ok(())
	}

	/// Removes the bookmark with `id` and persists the set. Absent ids are ignored.
	///
	/// Unflags the current recipe if it has that id.
	///
	/// # Errors
	///
	/// [`Error::Storage`](`crate::Error::Storage`) if persisting fails, in which case nothing changes.
	#[instrument(skip(self))]
	pub fn delete_bookmark(&mut self, id: &str) -> Result<()> {
		let (index, removed) = match self.state.bookmarks.remove(id) {
			Some(removed) => removed,
			None => {
				trace!("Not bookmarked.");
				return Ok(());
			}
		};
		if let Err(error) = self.persist_bookmarks() {
			self.state.bookmarks.restore(index, removed);
			return Err(error);
		}
		self.state.mark_bookmarked(id, false);
		Ok(())
	}

	/// Removes all bookmarks, including the persisted slot.
	///
	/// # Errors
	///
	/// [`Error::Storage`](`crate::Error::Storage`) if the slot can't be removed, in which case nothing changes.
	#[instrument(skip(self))]
	pub fn clear_bookmarks(&mut self) -> Result<()> {
		self.storage.remove(&self.config.bookmarks_key)?;
		self.state.bookmarks.clear();
		self.state.refresh_bookmarked();
		Ok(())
	}

	/// Validates `form`, submits it to the catalog, makes the stored recipe current and bookmarks it.
	///
	/// # Errors
	///
	/// [`Error::Validation`](`crate::Error::Validation`) before any request is made if the form is malformed.
	/// Otherwise like [`Store::load_recipe`], plus [`Store::add_bookmark`]'s errors, in which case the upload did happen
	/// and the recipe is current but not bookmarked.
	#[instrument(skip(self, form))]
	pub async fn upload_recipe(&mut self, form: &RecipeForm) -> Result<()> {
		let submission = Submission::from(form.to_draft()?);
		let body = self.client.post(self.endpoints.upload(), &submission).await?;
		let recipe = catalog::decode_recipe(body)?;
		info!("Catalog stored recipe as {:?}.", recipe.id);

		self.state.recipe = Some(recipe.clone());
		self.state.refresh_bookmarked();
		self.add_bookmark(recipe).map_err(|error| {
			error!("Uploaded recipe could not be bookmarked: {}", error);
			error
		})
	}

	fn persist_bookmarks(&self) -> Result<()> {
		let json = self.state.bookmarks.to_json()?;
		trace!("Persisting {} bookmark(s) ({} bytes).", self.state.bookmarks.len(), json.len());
		self.storage.write(&self.config.bookmarks_key, &json)
	}
}

fn parse_stored_bookmarks(json: &str) -> BookmarkSet {
	match BookmarkSet::from_json(json) {
		Ok(bookmarks) => bookmarks,
		Err(error) => {
			warn!("Discarding unreadable stored bookmarks: {}", error);
			BookmarkSet::new()
		}
	}
}
