pub mod batch;
pub mod loaders;
pub mod message;
pub mod question;
pub mod response;

pub use batch::{
    AnthropicBatchRequest, BatchHandle, BatchRequestRecord, OpenAiBatchRequest, RawBatchRequest,
    RequestBody,
};
pub use loaders::{load_batch_config, load_questions};
pub use message::{ContentPart, Dialect, ImageSource, ImageUrl, Message, MessageContent, Role};
pub use question::Question;
pub use response::{BatchResponseRecord, ResponseBody, STATUS_FAILED, STATUS_OK};
