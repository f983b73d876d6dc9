//! The EchoVerse application: feed page, story composer and story cards as
//! headless view models over a [`Backend`].

pub mod backend;
pub mod composer;
pub mod feed;
pub mod http;
pub mod story_card;
pub mod time;
pub mod toast;

#[cfg(test)]
mod testing;

pub use backend::{Backend, ClientError, Session};
pub use composer::StoryComposer;
pub use feed::{FeedPage, FeedView, Route};
pub use http::HttpBackend;
pub use story_card::{CardView, StoryCard};
pub use toast::{Notifier, Toast, ToastLevel, ToastLog};
