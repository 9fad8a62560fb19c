//! Flat-file persistence: article workflow rows, the user table, the
//! companion content file and the title selection that imports CMS posts into it.

pub mod article;
pub mod content;
pub mod import;
pub mod language;
pub mod store;
pub mod users;

pub use article::{ArticleRecord, LanguageStatus};
pub use content::{read_content_rows, translated_field, write_content_rows, ContentRow, ContentStore};
pub use import::{select_posts, RowFilter};
pub use language::LanguageCode;
pub use store::{filter_queue, RecordStore};
pub use users::{Role, User, UserDirectory};
