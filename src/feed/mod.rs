mod date;
mod fetcher;
mod proxy;

pub use date::parse_datetime;
pub use fetcher::FeedFetcher;
