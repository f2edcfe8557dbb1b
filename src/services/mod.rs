pub mod anthropic_batches;
pub mod batch_builder;
pub mod batch_parser;
pub mod completion_client;
pub mod message_formatter;
pub mod response_writer;

pub use anthropic_batches::AnthropicBatchClient;
pub use batch_builder::{build_batch, BatchSettings};
pub use batch_parser::{parse_batch_jsonl, tabulate, write_csv, Table};
pub use completion_client::{ChatCompletionClient, CompletionError, LocalCompletionClient};
pub use message_formatter::format_messages;
pub use response_writer::{JsonlResponseWriter, ResponseSink};
