//! API client module for talking to the Finch server

mod client;
mod traits;

pub use client::ApiClient;

#[cfg(test)]
pub use traits::MockApiClientTrait;
pub use traits::ApiClientTrait;
