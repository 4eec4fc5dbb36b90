#![doc(html_root_url = "https://docs.rs/recipe-dom/0.1.0")]
#![warn(clippy::pedantic)]

#[cfg(doctest)]
pub mod readme {
	doc_comment::doctest!("../README.md");
}

pub mod catalog;
pub mod config;
mod error;
pub mod fetch;
pub mod form;
pub mod load;
pub mod model;
pub mod net;
pub mod reconcile;
pub mod storage;
pub mod store;
pub mod view;

pub use error::{Error, Result};
