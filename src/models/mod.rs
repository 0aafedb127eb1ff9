mod feed;
mod keyword;
mod news;
mod source;

pub use feed::{Feed, FeedItem};
pub use keyword::Keyword;
pub use news::{NewNewsItem, NewsItem};
pub use source::Source;
