pub mod test_response;

pub use test_client::{TestClient, TestRequest};
pub use test_response::TestResponse;
