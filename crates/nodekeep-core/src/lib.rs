pub mod attachment;
pub mod download;

pub use attachment::Attachment;
pub use download::{Disposition, DownloadMeta};
