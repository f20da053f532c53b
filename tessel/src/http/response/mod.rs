pub mod into_response;
