pub mod request_flow;

pub use request_flow::{new_request_id, RequestFlow};
