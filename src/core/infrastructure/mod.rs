pub mod api_client;
pub mod api_request;
pub(crate) mod document;
pub mod prompt;
