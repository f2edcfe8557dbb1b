pub mod images;
pub mod jsonl;
pub mod logging;

pub use images::encode_image;
pub use jsonl::{append_jsonl, load_jsonl, write_jsonl, JsonlReader};
pub use logging::truncate_text;
