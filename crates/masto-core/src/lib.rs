//! # masto-core
//!
//! Domain layer containing native entities, the identifier codec, and store traits.
//! This crate has zero dependencies on infrastructure (database, web framework, etc.).

pub mod entities;
pub mod error;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    CustomEmoji, DriveFile, FfVisibility, Following, Note, NoteMention, NoteReaction,
    NoteViewerState, Notification, NotificationType, Poll, ProfileField, Relation, User,
    UserProfile, Visibility,
};
pub use error::{DomainError, UpstreamFailure};
pub use traits::{
    DriveFileRepository, EmojiRepository, FollowingRepository, NoteFilter, NoteOrigin,
    NoteRepository, NoteSource, NotificationFilter, NotificationRepository, Paginated,
    PollRepository, RangeQuery, ReactionRepository, RepoResult, UserRepository,
};
pub use value_objects::{ForeignId, IdSpace, NativeId, NativeIdGenerator, NativeIdParseError};
