//! Domain entities - native objects as the store returns them

mod drive_file;
mod emoji;
mod following;
mod note;
mod notification;
mod poll;
mod reaction;
mod user;

pub use drive_file::DriveFile;
pub use emoji::CustomEmoji;
pub use following::{Following, Relation};
pub use note::{Note, NoteMention, NoteViewerState, Visibility};
pub use notification::{Notification, NotificationType};
pub use poll::Poll;
pub use reaction::{custom_emoji_name, NoteReaction};
pub use user::{FfVisibility, ProfileField, User, UserProfile};
