pub mod assembler;
pub mod cli;
pub mod logging;
pub mod service;
pub mod sources;

pub use assembler::FeedAssembler;
pub use cli::{handle_command, FeedArgs, FeedCommands};
pub use logging::{init_logging, Logger};
pub use service::FeedService;
pub use sources::{HeadlineSource, NewsApiSource};
