pub mod feed;
pub mod profiles;
pub mod revalidate;
pub mod sessions;
pub mod tweets;
