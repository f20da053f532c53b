pub mod fast_builder;
pub mod into_method;
pub mod shared;
pub mod utils;

pub use into_method::IntoMethods;
pub use shared::*;
pub use utils::{decode_segment, encode_route, join_route};
