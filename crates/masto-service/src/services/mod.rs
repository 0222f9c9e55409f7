//! Query services
//!
//! This module contains the request context, the account cache, cursor
//! pagination, and the services that page through the store and convert
//! what they find into Mastodon entities.

pub mod account;
pub mod account_cache;
pub mod context;
pub mod error;
pub mod notification;
pub mod pagination;
pub mod status;
pub mod timeline;

// Re-export all services for convenience
pub use account::AccountService;
pub use account_cache::{AccountCache, KeyedMemo};
pub use context::{RequestContext, ServiceContext, ServiceContextBuilder};
pub use error::{ServiceError, ServiceResult};
pub use notification::NotificationService;
pub use pagination::{
    fetch_page, fetch_page_filtered, LimitPolicy, Page, PaginationWindow, QueryParams,
};
pub use status::StatusService;
pub use timeline::TimelineService;
