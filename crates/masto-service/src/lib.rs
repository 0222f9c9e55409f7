//! # masto-service
//!
//! Application layer: entity converters, cursor pagination, the per-request
//! account cache, and the query services behind the Mastodon API.

pub mod converters;
pub mod dto;
pub mod services;

pub use converters::{AccountConverter, NotificationConverter, StatusConverter};
pub use services::{
    AccountService, NotificationService, Page, QueryParams, RequestContext, ServiceContext,
    ServiceContextBuilder, ServiceError, ServiceResult, StatusService, TimelineService,
};
