//! Browser implementations of the [`net`](`crate::net`) seams.

use crate::{
	error::describe_js,
	net::{Request, Response, Timer, Transport},
	Error, Result,
};
use core::{convert::TryInto, time::Duration};
use futures::{future::LocalBoxFuture, FutureExt};
use js_sys::Promise;
use tracing::{error, instrument, trace};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, RequestInit};

fn window() -> Result<web_sys::Window> {
	web_sys::window().ok_or_else(|| Error::Transport("No global `window` found.".to_owned()))
}

fn transport_error(error: JsValue) -> Error {
	Error::Transport(describe_js(&error))
}

/// Sends requests through the page's [***fetch***](https://developer.mozilla.org/en-US/docs/Web/API/fetch).
///
/// Dropping the returned future doesn't abort the underlying request.
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchTransport;

impl Transport for FetchTransport {
	fn send(&self, request: Request) -> LocalBoxFuture<'static, Result<Response>> {
		async move {
			let window = window()?;

			let init = RequestInit::new();
			init.set_method(request.method.as_str());
			if let (Some(body), Some(content_type)) = (&request.body, request.content_type()) {
				let headers = Headers::new().map_err(transport_error)?;
				headers.set("Content-Type", content_type).map_err(transport_error)?;
				init.set_headers(&headers);
				init.set_body(&JsValue::from_str(body));
			}

			let web_request = web_sys::Request::new_with_str_and_init(request.url.as_str(), &init).map_err(transport_error)?;
			trace!("Fetching {} {}.", request.method.as_str(), request.url);
			let response: web_sys::Response = JsFuture::from(window.fetch_with_request(&web_request))
				.await
				.map_err(transport_error)?
				.dyn_into()
				.map_err(|value| Error::Transport(format!("Expected `Response` but found {:?}", value)))?;

			let body = JsFuture::from(response.text().map_err(transport_error)?).await.map_err(transport_error)?;
			Ok(Response {
				status: response.status(),
				body: body.as_string().unwrap_or_default(),
			})
		}
		.boxed_local()
	}
}

/// Sleeps via the page's [***setTimeout***](https://developer.mozilla.org/en-US/docs/Web/API/setTimeout).
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowTimer;

impl Timer for WindowTimer {
	#[instrument]
	fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
		let millis: i32 = duration.as_millis().try_into().unwrap_or(i32::MAX);
		let promise = Promise::new(&mut |resolve, _reject| match web_sys::window() {
			Some(window) => {
				if let Err(error) = window.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, millis) {
					error!("Failed to schedule timer: {:?}. It will never fire.", error);
				}
			}
			None => error!("No global `window` found. The timer will never fire."),
		});

		async move {
			if let Err(error) = JsFuture::from(promise).await {
				error!("Timer promise rejected: {:?}", error);
			}
		}
		.boxed_local()
	}
}
