//! News feed and video gallery records.

pub mod news;
pub mod videos;

pub use news::{NewsFields, NewsItem};
pub use videos::{VideoFields, VideoItem};
