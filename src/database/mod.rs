/*!
 * CMS database access for the bulk import.
 *
 * The CMS keeps its posts in a PostgreSQL `posts` table. Credentials come
 * from the `CMS_DB_*` environment variables.
 */

pub mod connection;
pub mod posts;

pub use connection::{CmsDatabase, CmsDbConfig};
pub use posts::posts_table;
