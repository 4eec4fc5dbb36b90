//! Catalog requests with a bounded wait.
//!
//! [`NetworkClient::request`] races a [`Transport`] exchange against a [`Timer`].
//! Whichever settles first wins. A request that loses to the timer is abandoned, not cancelled:
//! it may still complete in the background, but its result is dropped unobserved.

use crate::{Error, Result};
use core::{fmt, time::Duration};
use futures::future::{self, Either, LocalBoxFuture};
use serde::Serialize;
use serde_json::Value;
use tracing::{instrument, trace, warn};
use url::Url;

pub const JSON_CONTENT_TYPE: &str = "application/json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
	Get,
	Post,
}

impl Method {
	#[must_use]
	pub fn as_str(self) -> &'static str {
		match self {
			Method::Get => "GET",
			Method::Post => "POST",
		}
	}
}

/// One outgoing catalog request.
///
/// Transports must send `Content-Type: application/json` whenever [`body`](`Request::body`) is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
	pub method: Method,
	pub url: Url,
	/// Serialised JSON.
	pub body: Option<String>,
}

impl Request {
	#[must_use]
	pub fn content_type(&self) -> Option<&'static str> {
		self.body.as_ref().map(|_| JSON_CONTENT_TYPE)
	}
}

/// A completed exchange, whatever its status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
	pub status: u16,
	pub body: String,
}

impl Response {
	#[must_use]
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}
}

/// Sends a [`Request`] somewhere and reads the whole response.
///
/// Failing statuses are not errors at this level.
pub trait Transport {
	fn send(&self, request: Request) -> LocalBoxFuture<'static, Result<Response>>;
}

/// Resolves after a delay.
pub trait Timer {
	fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()>;
}

pub struct NetworkClient {
	transport: Box<dyn Transport>,
	timer: Box<dyn Timer>,
	timeout: Duration,
}

impl fmt::Debug for NetworkClient {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("NetworkClient").field("timeout", &self.timeout).finish_non_exhaustive()
	}
}

impl NetworkClient {
	#[must_use]
	pub fn new(transport: impl 'static + Transport, timer: impl 'static + Timer, timeout: Duration) -> Self {
		Self {
			transport: Box::new(transport),
			timer: Box::new(timer),
			timeout,
		}
	}

	#[must_use]
	pub fn timeout(&self) -> Duration {
		self.timeout
	}

	/// GETs `url` and decodes the JSON response.
	///
	/// # Errors
	///
	/// See [`NetworkClient::request`].
	pub async fn get(&self, url: Url) -> Result<Value> {
		self.request(url, None).await
	}

	/// POSTs `body` as JSON to `url` and decodes the JSON response.
	///
	/// # Errors
	///
	/// See [`NetworkClient::request`]. Also [`Error::Decode`] if `body` can't be serialised.
	pub async fn post(&self, url: Url, body: &(impl Serialize + ?Sized)) -> Result<Value> {
		let body = serde_json::to_value(body)?;
		self.request(url, Some(body)).await
	}

	/// Issues a GET (without `body`) or a JSON POST (with `body`), bounded by the configured timeout.
	///
	/// The response body is decoded as JSON regardless of status.
	///
	/// # Errors
	///
	/// - [`Error::Timeout`] if the timer fires first,
	/// - [`Error::Transport`] if the request couldn't be made,
	/// - [`Error::Decode`] if the body isn't JSON, even for failing statuses,
	/// - [`Error::Api`] with the body's `message` for failing statuses.
	#[instrument(skip(self, url, body), fields(url = %url))]
	pub async fn request(&self, url: Url, body: Option<Value>) -> Result<Value> {
		let request = Request {
			method: if body.is_some() { Method::Post } else { Method::Get },
			url,
			body: body.as_ref().map(serde_json::to_string).transpose()?,
		};

		let exchange = self.transport.send(request);
		let deadline = self.timer.sleep(self.timeout);
		let response = match future::select(exchange, deadline).await {
			Either::Left((response, _)) => response?,
			Either::Right(((), abandoned)) => {
				warn!("No response after {:?}. Abandoning the request.", self.timeout);
				drop(abandoned);
				return Err(Error::Timeout(self.timeout));
			}
		};

		if cfg!(feature = "dangerous-logging") {
			trace!(status = response.status, body = %response.body, "Received response.");
		} else {
			trace!(status = response.status, "Received {} byte(s).", response.body.len());
		}

		let decoded: Value = serde_json::from_str(&response.body)?;
		if !response.is_success() {
			let message = decoded.get("message").and_then(Value::as_str).unwrap_or("request failed").to_owned();
			warn!(status = response.status, "Catalog reported failure: {}", message);
			return Err(Error::Api {
				status: response.status,
				message,
			});
		}
		Ok(decoded)
	}
}
