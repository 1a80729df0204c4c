pub mod format;

pub use format::{PageDto, RsData};
