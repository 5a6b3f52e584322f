use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::domain::tweet::FeedTweet;

/// Identity of a locally cached feed: the general feed, the following-only
/// feed, or an open profile's feed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FeedId {
    Recent,
    Following,
    Profile(Uuid),
}

/// One fetched page, in fetch order, with the cursor that produced the next
/// page (wire-encoded, opaque to the cache).
#[derive(Debug, Clone, PartialEq)]
pub struct CachedPage {
    pub tweets: Vec<FeedTweet>,
    pub next_cursor: Option<String>,
}

#[derive(Debug, Clone)]
pub enum FeedEvent {
    LikeToggled { tweet_id: Uuid, added_like: bool },
    TweetCreated { tweet: FeedTweet },
}

/// Immutable snapshot of every cached feed. Pages are held behind `Arc`;
/// applying an event rebuilds only the pages it touches and shares the rest,
/// so `Arc::ptr_eq` tells a renderer whether a page changed.
#[derive(Debug, Clone, Default)]
pub struct FeedCache {
    feeds: HashMap<FeedId, Vec<Arc<CachedPage>>>,
}

impl FeedCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pages(&self, feed: &FeedId) -> &[Arc<CachedPage>] {
        self.feeds.get(feed).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Record a freshly fetched page at the end of a feed's page list.
    pub fn with_page(&self, feed: FeedId, page: CachedPage) -> FeedCache {
        let mut feeds = self.feeds.clone();
        feeds.entry(feed).or_default().push(Arc::new(page));
        FeedCache { feeds }
    }

    pub fn apply(&self, event: &FeedEvent) -> FeedCache {
        match event {
            FeedEvent::LikeToggled {
                tweet_id,
                added_like,
            } => self.apply_like(*tweet_id, *added_like),
            FeedEvent::TweetCreated { tweet } => self.apply_new_tweet(tweet),
        }
    }

    /// Patch the affected tweet in every cached page that holds it; pages
    /// without it keep their identity.
    fn apply_like(&self, tweet_id: Uuid, added_like: bool) -> FeedCache {
        let feeds = self
            .feeds
            .iter()
            .map(|(feed, pages)| {
                let pages = pages
                    .iter()
                    .map(|page| {
                        if page.tweets.iter().any(|tweet| tweet.id == tweet_id) {
                            Arc::new(patch_page(page, tweet_id, added_like))
                        } else {
                            Arc::clone(page)
                        }
                    })
                    .collect();
                (feed.clone(), pages)
            })
            .collect();

        FeedCache { feeds }
    }

    /// A new tweet lands at the head of the general feed's first page only.
    /// Other cached feeds pick it up on their own next fetch. With nothing
    /// cached there is nothing to splice into.
    fn apply_new_tweet(&self, tweet: &FeedTweet) -> FeedCache {
        let Some(pages) = self.feeds.get(&FeedId::Recent) else {
            return self.clone();
        };
        let Some(first) = pages.first() else {
            return self.clone();
        };

        let mut tweets = Vec::with_capacity(first.tweets.len() + 1);
        tweets.push(tweet.clone());
        tweets.extend(first.tweets.iter().cloned());

        let mut new_pages = Vec::with_capacity(pages.len());
        new_pages.push(Arc::new(CachedPage {
            tweets,
            next_cursor: first.next_cursor.clone(),
        }));
        new_pages.extend(pages.iter().skip(1).map(Arc::clone));

        let mut feeds = self.feeds.clone();
        feeds.insert(FeedId::Recent, new_pages);
        FeedCache { feeds }
    }
}

fn patch_page(page: &CachedPage, tweet_id: Uuid, added_like: bool) -> CachedPage {
    let delta = if added_like { 1 } else { -1 };
    let tweets = page
        .tweets
        .iter()
        .map(|tweet| {
            if tweet.id == tweet_id {
                let mut tweet = tweet.clone();
                tweet.like_count += delta;
                tweet.liked_by_me = added_like;
                tweet
            } else {
                tweet.clone()
            }
        })
        .collect();

    CachedPage {
        tweets,
        next_cursor: page.next_cursor.clone(),
    }
}
