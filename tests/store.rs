#![cfg(not(target_arch = "wasm32"))]

use recipe_dom::{
	config::{Config, DEFAULT_BOOKMARKS_KEY},
	form::RecipeForm,
	model::{BookmarkSet, Recipe},
	net::{Method, NetworkClient},
	storage::{BookmarkStorage, MemoryStorage},
	store::Store,
	Error, Result,
};
use serde_json::{json, Value};
use std::time::Duration;

use scripted_::{ImmediateTimer, NeverTimer, Reply, ScriptedTransport};

fn config() -> Config {
	let mut config = Config::default();
	config.api_key = Some("test-key".to_owned());
	config.results_per_page = 3;
	config
}

fn store_with(transport: &ScriptedTransport, storage: impl 'static + BookmarkStorage) -> Store {
	let client = NetworkClient::new(transport.clone(), NeverTimer, Duration::from_secs(10));
	Store::new(config(), client, storage).unwrap()
}

fn catalog_recipe(id: &str, servings: u32) -> Value {
	json!({
		"id": id,
		"title": format!("Recipe {}", id),
		"publisher": "Closet Cooking",
		"source_url": format!("https://example.com/{}", id),
		"image_url": format!("https://example.com/{}.jpg", id),
		"servings": servings,
		"cooking_time": 30,
		"ingredients": [
			{ "quantity": 2, "unit": "cups", "description": "flour" },
			{ "quantity": null, "unit": "", "description": "salt" }
		]
	})
}

fn recipe_envelope(id: &str, servings: u32) -> Value {
	json!({ "status": "success", "data": { "recipe": catalog_recipe(id, servings) } })
}

fn results_envelope(n: usize) -> Value {
	let recipes: Vec<Value> = (0..n)
		.map(|i| json!({ "id": format!("r{}", i), "title": format!("Pizza {}", i), "publisher": "P", "image_url": "i.jpg" }))
		.collect();
	json!({ "status": "success", "results": n, "data": { "recipes": recipes } })
}

async fn loaded(transport: &ScriptedTransport, storage: MemoryStorage, id: &str) -> Store {
	transport.respond(200, recipe_envelope(id, 4));
	let mut store = store_with(transport, storage);
	store.load_recipe(id).await.unwrap();
	store
}

fn ids(bookmarks: &BookmarkSet) -> Vec<&str> {
	bookmarks.iter().map(|recipe| recipe.id.as_str()).collect()
}

#[tokio::test]
async fn load_recipe_translates_and_flags() {
	let storage = MemoryStorage::new();
	let transport = ScriptedTransport::new();
	let mut store = loaded(&transport, storage.clone(), "abc").await;

	let requests = transport.requests();
	let request = &requests[0];
	assert_eq!(request.method, Method::Get);
	assert_eq!(request.url.as_str(), "https://forkify-api.herokuapp.com/api/v2/recipes/abc?key=test-key");
	assert_eq!(request.body, None);

	let recipe = store.state().recipe.clone().unwrap();
	assert_eq!(recipe.image, "https://example.com/abc.jpg");
	assert_eq!(recipe.source_url, "https://example.com/abc");
	assert!(!recipe.bookmarked);

	store.add_bookmark(recipe).unwrap();
	transport.respond(200, recipe_envelope("abc", 4));
	store.load_recipe("abc").await.unwrap();
	assert!(store.state().recipe.as_ref().unwrap().bookmarked);
}

#[tokio::test]
async fn failed_load_keeps_previous_recipe() {
	let transport = ScriptedTransport::new();
	let mut store = loaded(&transport, MemoryStorage::new(), "first").await;

	transport.respond(400, json!({ "status": "fail", "message": "Invalid _id: nope" }));
	match store.load_recipe("nope").await {
		Err(Error::Api { status, message }) => {
			assert_eq!(status, 400);
			assert_eq!(message, "Invalid _id: nope");
		}
		other => panic!("expected API error, got {:?}", other),
	}
	assert_eq!(store.state().recipe.as_ref().unwrap().id, "first");

	transport.reply(Reply::Respond(500, "<html>gateway</html>".to_owned()));
	assert!(matches!(store.load_recipe("nope").await, Err(Error::Decode(_))));
	transport.reply(Reply::Fail("offline"));
	assert!(matches!(store.load_recipe("nope").await, Err(Error::Transport(_))));
	assert_eq!(store.state().recipe.as_ref().unwrap().id, "first");
}

#[tokio::test]
async fn api_error_message_includes_status() {
	let transport = ScriptedTransport::new();
	transport.respond(404, json!({ "message": "Not found" }));
	let mut store = store_with(&transport, MemoryStorage::new());
	let error = store.load_recipe("x").await.unwrap_err();
	assert_eq!(error.to_string(), "Not found (404)");
}

#[tokio::test]
async fn search_resets_page() {
	let transport = ScriptedTransport::new();
	transport.respond(200, results_envelope(7));
	let mut store = store_with(&transport, MemoryStorage::new());

	store.load_search_results("pizza").await.unwrap();
	assert_eq!(transport.requests()[0].url.as_str(), "https://forkify-api.herokuapp.com/api/v2/recipes/?search=pizza&key=test-key");
	assert_eq!(store.state().search.query, "pizza");
	assert_eq!(store.state().search.page_count(), 3);

	assert_eq!(store.results_page(Some(3)).len(), 1);
	assert_eq!(store.state().search.page, 3);
	assert_eq!(store.results_page(None)[0].id, "r6");

	transport.respond(200, results_envelope(4));
	store.load_search_results("pasta").await.unwrap();
	assert_eq!(store.state().search.page, 1);
	assert_eq!(store.results_page(None).iter().map(|r| r.id.as_str()).collect::<Vec<_>>(), ["r0", "r1", "r2"]);
}

#[tokio::test]
async fn empty_search_is_success() {
	let transport = ScriptedTransport::new();
	transport.respond(200, results_envelope(0));
	let mut store = store_with(&transport, MemoryStorage::new());
	store.load_search_results("nothing").await.unwrap();
	assert!(store.state().search.results.is_empty());
	assert!(store.results_page(None).is_empty());
}

#[tokio::test]
async fn failed_search_keeps_previous_session() {
	let transport = ScriptedTransport::new();
	transport.respond(200, results_envelope(5));
	let mut store = store_with(&transport, MemoryStorage::new());
	store.load_search_results("pizza").await.unwrap();
	store.results_page(Some(2));

	transport.reply(Reply::Fail("offline"));
	assert!(store.load_search_results("pasta").await.is_err());
	assert_eq!(store.state().search.query, "pizza");
	assert_eq!(store.state().search.page, 2);
	assert_eq!(store.state().search.results.len(), 5);
}

#[tokio::test]
async fn servings_rescale_current_recipe() {
	let transport = ScriptedTransport::new();
	let mut store = loaded(&transport, MemoryStorage::new(), "abc").await;

	store.update_servings(8).unwrap();
	store.update_servings(2).unwrap();
	let recipe = store.state().recipe.as_ref().unwrap();
	assert_eq!(recipe.servings, 2);
	assert_eq!(recipe.ingredients[0].quantity, Some(1.0));
	assert_eq!(recipe.ingredients[1].quantity, None);

	assert!(matches!(store.update_servings(0), Err(Error::Validation(_))));
	assert_eq!(store.state().recipe.as_ref().unwrap().servings, 2);
	assert!(transport.requests().len() == 1, "rescaling must not hit the network");
}

#[tokio::test]
async fn bookmark_round_trip_restores_order() {
	let storage = MemoryStorage::new();
	let transport = ScriptedTransport::new();
	let mut store = loaded(&transport, storage.clone(), "current").await;

	store.add_bookmark(store_recipe_like("a")).unwrap();
	store.add_bookmark(store_recipe_like("b")).unwrap();
	let before = storage.get(DEFAULT_BOOKMARKS_KEY).unwrap();

	store.add_bookmark(store_recipe_like("c")).unwrap();
	assert_eq!(ids(&store.state().bookmarks), ["a", "b", "c"]);
	store.delete_bookmark("c").unwrap();

	assert_eq!(ids(&store.state().bookmarks), ["a", "b"]);
	assert_eq!(storage.get(DEFAULT_BOOKMARKS_KEY).unwrap(), before);
	assert!(!store.state().recipe.as_ref().unwrap().bookmarked, "other ids must not flag the current recipe");
}

fn store_recipe_like(id: &str) -> Recipe {
	serde_json::from_value(json!({
		"id": id,
		"title": "T",
		"publisher": "P",
		"sourceUrl": "s",
		"image": "i",
		"servings": 1,
		"cookingTime": 5,
		"ingredients": []
	}))
	.unwrap()
}

#[tokio::test]
async fn bookmarking_current_recipe_flips_flag() {
	let storage = MemoryStorage::new();
	let transport = ScriptedTransport::new();
	let mut store = loaded(&transport, storage.clone(), "abc").await;

	let current = store.state().recipe.clone().unwrap();
	store.add_bookmark(current).unwrap();
	assert!(store.state().recipe.as_ref().unwrap().bookmarked);
	assert!(store.state().bookmarks.contains("abc"));

	let stored = BookmarkSet::from_json(&storage.get(DEFAULT_BOOKMARKS_KEY).unwrap()).unwrap();
	assert_eq!(ids(&stored), ["abc"]);

	store.delete_bookmark("abc").unwrap();
	assert!(!store.state().recipe.as_ref().unwrap().bookmarked);
	assert_eq!(storage.get(DEFAULT_BOOKMARKS_KEY).unwrap(), "[]");
}

#[tokio::test]
async fn deleting_absent_bookmark_is_a_no_op() {
	let storage = MemoryStorage::new();
	let transport = ScriptedTransport::new();
	let mut store = loaded(&transport, storage.clone(), "abc").await;
	store.add_bookmark(store_recipe_like("a")).unwrap();
	let before = storage.get(DEFAULT_BOOKMARKS_KEY);

	store.delete_bookmark("missing").unwrap();
	assert_eq!(ids(&store.state().bookmarks), ["a"]);
	assert_eq!(storage.get(DEFAULT_BOOKMARKS_KEY), before);
}

#[test]
fn bookmarks_load_from_storage() {
	let stored = json!([
		{ "id": "a", "title": "A", "publisher": "P", "sourceUrl": "s", "image": "i", "servings": 2, "cookingTime": 10, "ingredients": [] },
		{ "id": "b", "title": "B", "publisher": "P", "sourceUrl": "s", "image": "i", "servings": 2, "cookingTime": 10, "ingredients": [], "key": "k" }
	]);
	let storage = MemoryStorage::new().with(DEFAULT_BOOKMARKS_KEY, &stored.to_string());
	let store = store_with(&ScriptedTransport::new(), storage);
	assert_eq!(ids(&store.state().bookmarks), ["a", "b"]);
	assert_eq!(store.state().bookmarks.as_slice()[1].key.as_deref(), Some("k"));
}

#[test]
fn corrupt_storage_yields_no_bookmarks() {
	let storage = MemoryStorage::new().with(DEFAULT_BOOKMARKS_KEY, "{not json");
	let store = store_with(&ScriptedTransport::new(), storage);
	assert!(store.state().bookmarks.is_empty());
}

struct ReadOnlyStorage(MemoryStorage);

impl BookmarkStorage for ReadOnlyStorage {
	fn read(&self, key: &str) -> Result<Option<String>> {
		self.0.read(key)
	}

	fn write(&self, _: &str, _: &str) -> Result<()> {
		Err(Error::Storage("quota exceeded".to_owned()))
	}

	fn remove(&self, _: &str) -> Result<()> {
		Err(Error::Storage("read-only".to_owned()))
	}
}

#[tokio::test]
async fn failed_persist_rolls_back() {
	let seeded = MemoryStorage::new().with(DEFAULT_BOOKMARKS_KEY, &json!([]).to_string());
	let transport = ScriptedTransport::new();
	transport.respond(200, recipe_envelope("abc", 4));
	let mut store = store_with(&transport, ReadOnlyStorage(seeded));
	store.load_recipe("abc").await.unwrap();

	let current = store.state().recipe.clone().unwrap();
	assert!(matches!(store.add_bookmark(current), Err(Error::Storage(_))));
	assert!(store.state().bookmarks.is_empty());
	assert!(!store.state().recipe.as_ref().unwrap().bookmarked);

	assert!(matches!(store.clear_bookmarks(), Err(Error::Storage(_))));
}

#[tokio::test]
async fn clear_bookmarks_empties_slot() {
	let storage = MemoryStorage::new();
	let transport = ScriptedTransport::new();
	let mut store = loaded(&transport, storage.clone(), "abc").await;
	let current = store.state().recipe.clone().unwrap();
	store.add_bookmark(current).unwrap();

	store.clear_bookmarks().unwrap();
	assert!(store.state().bookmarks.is_empty());
	assert!(!store.state().recipe.as_ref().unwrap().bookmarked);
	assert_eq!(storage.get(DEFAULT_BOOKMARKS_KEY), None);
}

fn upload_form(ingredient: &str) -> RecipeForm {
	RecipeForm::from_fields(vec![
		("title", "Test pizza"),
		("sourceUrl", "https://example.com/pizza"),
		("image", "https://example.com/pizza.jpg"),
		("publisher", "Me"),
		("cookingTime", "25"),
		("servings", "2"),
		("ingredient-1", ingredient),
		("ingredient-2", ""),
	])
}

#[tokio::test]
async fn upload_submits_and_bookmarks() {
	let storage = MemoryStorage::new();
	let transport = ScriptedTransport::new();
	let mut stored = catalog_recipe("new-id", 2);
	stored["key"] = json!("test-key");
	transport.respond(201, json!({ "status": "success", "data": { "recipe": stored } }));
	let mut store = store_with(&transport, storage.clone());

	store.upload_recipe(&upload_form("2,kg,flour")).await.unwrap();

	let requests = transport.requests();
	let request = &requests[0];
	assert_eq!(request.method, Method::Post);
	assert_eq!(request.url.as_str(), "https://forkify-api.herokuapp.com/api/v2/recipes/?key=test-key");
	assert_eq!(request.content_type(), Some("application/json"));
	let body: Value = serde_json::from_str(request.body.as_deref().unwrap()).unwrap();
	assert_eq!(body["image_url"], "https://example.com/pizza.jpg");
	assert_eq!(body["source_url"], "https://example.com/pizza");
	assert_eq!(body["cooking_time"], 25.0);
	assert_eq!(body["servings"], 2);
	assert_eq!(body["ingredients"], json!([{ "quantity": 2.0, "unit": "kg", "description": "flour" }]));

	let recipe = store.state().recipe.as_ref().unwrap();
	assert_eq!(recipe.id, "new-id");
	assert_eq!(recipe.key.as_deref(), Some("test-key"));
	assert!(recipe.bookmarked);
	assert!(store.state().bookmarks.contains("new-id"));
	assert!(storage.get(DEFAULT_BOOKMARKS_KEY).unwrap().contains("new-id"));
}

#[tokio::test]
async fn uploading_bookmarked_id_keeps_flag() {
	let storage = MemoryStorage::new();
	let transport = ScriptedTransport::new();
	let mut store = store_with(&transport, storage.clone());
	store.add_bookmark(store_recipe_like("dup")).unwrap();
	let before = storage.get(DEFAULT_BOOKMARKS_KEY);

	transport.respond(201, recipe_envelope("dup", 2));
	store.upload_recipe(&upload_form("2,kg,flour")).await.unwrap();

	assert_eq!(ids(&store.state().bookmarks), ["dup"]);
	assert!(store.state().recipe.as_ref().unwrap().bookmarked);
	assert_eq!(storage.get(DEFAULT_BOOKMARKS_KEY), before);
}

#[tokio::test]
async fn zero_servings_recipe_is_not_loaded() {
	let transport = ScriptedTransport::new();
	let mut store = loaded(&transport, MemoryStorage::new(), "abc").await;

	transport.respond(200, recipe_envelope("zero", 0));
	assert!(matches!(store.load_recipe("zero").await, Err(Error::Decode(_))));
	assert_eq!(store.state().recipe.as_ref().unwrap().id, "abc");
}

#[tokio::test]
async fn malformed_ingredient_never_reaches_network() {
	let transport = ScriptedTransport::new();
	let mut store = store_with(&transport, MemoryStorage::new());

	match store.upload_recipe(&upload_form("2,kg")).await {
		Err(Error::Validation(message)) => assert!(message.contains("wrong ingredient format")),
		other => panic!("expected validation error, got {:?}", other),
	}
	assert!(transport.requests().is_empty());
	assert!(store.state().recipe.is_none());
}

#[tokio::test]
async fn hanging_request_times_out() {
	let transport = ScriptedTransport::new();
	transport.reply(Reply::Hang);
	let client = NetworkClient::new(transport.clone(), ImmediateTimer, Duration::from_secs(3));
	let mut store = Store::new(config(), client, MemoryStorage::new()).unwrap();

	match store.load_search_results("slow").await {
		Err(Error::Timeout(duration)) => assert_eq!(duration, Duration::from_secs(3)),
		other => panic!("expected timeout, got {:?}", other),
	}
	assert!(store.state().search.query.is_empty());
}

#[tokio::test]
async fn answered_request_beats_ready_timer() {
	let transport = ScriptedTransport::new();
	transport.respond(200, results_envelope(1));
	let client = NetworkClient::new(transport.clone(), ImmediateTimer, Duration::from_secs(3));
	let mut store = Store::new(config(), client, MemoryStorage::new()).unwrap();
	store.load_search_results("fast").await.unwrap();
	assert_eq!(store.state().search.results.len(), 1);
}
