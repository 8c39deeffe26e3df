//! Read-only GitHub REST access for settings assertions.
//!
//! The `Fetch` trait is the seam between the runner and the network:
//! `GitHubClient` talks to the REST API, `MockFetcher` answers from memory.

mod client;
mod fetch;
mod select;

pub use client::{ClientConfig, GitHubClient, API_VERSION, DEFAULT_API_URL};
pub use fetch::{Fetch, FetchError, MockFetcher};
pub use select::{select_match, MatchSelector};
