use crate::csv_processor::CsvTable;
use crate::database::CmsDatabase;
use crate::utils::Result;
use tracing::info;

const ALL_POSTS: &str =
    "SELECT id::text, title::text, content::text FROM posts ORDER BY id";
const RECENT_POSTS: &str = "SELECT id::text, title::text, content::text FROM posts \
     WHERE created_at >= NOW() - ($1::text)::interval ORDER BY id";

/// Lays `(id, title, content)` rows out as an `id,title,content` table, the
/// shape `select_posts` expects from any posts source.
pub fn posts_table(rows: impl IntoIterator<Item = (String, String, String)>) -> CsvTable {
    CsvTable {
        headers: vec!["id".to_string(), "title".to_string(), "content".to_string()],
        rows: rows
            .into_iter()
            .map(|(id, title, content)| vec![id, title, content])
            .collect(),
    }
}

impl CmsDatabase {
    /// Every post, or only those created within `since` (a PostgreSQL
    /// interval such as `7 days`). NULL columns read as empty.
    pub async fn fetch_posts(&self, since: Option<&str>) -> Result<CsvTable> {
        let rows = match since {
            Some(interval) => self.client.query(RECENT_POSTS, &[&interval]).await?,
            None => self.client.query(ALL_POSTS, &[]).await?,
        };

        let mut posts = Vec::with_capacity(rows.len());
        for row in &rows {
            let cell = |idx: usize| -> Result<String> {
                Ok(row.try_get::<_, Option<String>>(idx)?.unwrap_or_default())
            };
            posts.push((cell(0)?, cell(1)?, cell(2)?));
        }
        info!(posts = posts.len(), since = ?since, "Fetched CMS posts");
        Ok(posts_table(posts))
    }
}
