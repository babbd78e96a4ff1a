pub mod completion;
pub mod post_processor;
pub mod prompts;
pub mod storage;
