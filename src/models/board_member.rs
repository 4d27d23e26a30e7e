use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::utils::error::StoreError;

#[derive(Debug, Clone, FromRow)]
pub struct BoardMember {
    pub id: Uuid,
    pub full_name: String,
    pub position: String,
    pub bio: String,
    pub major: String,
    pub year: String,
    pub hometown: String,
    pub linkedin_url: Option<String>,
    pub email: String,
    pub headshot_file: Option<String>,
    pub order_index: i32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiBoardMember {
    pub id: Uuid,
    pub position: String,
    pub full_name: String,
    pub bio: String,
    pub major: String,
    pub year: String,
    pub hometown: String,
    pub linkedin_url: Option<String>,
    pub email: String,
    pub headshot_file: Option<String>,
    pub order_index: i32,
}

const COLUMNS: &str = "id, full_name, position, bio, major, year, hometown, \
                       linkedin_url, email, headshot_file, order_index";

impl BoardMember {
    pub fn into_api(self) -> ApiBoardMember {
        ApiBoardMember {
            id: self.id,
            position: self.position,
            full_name: self.full_name,
            // Bios are stored with escaped newlines
            bio: self.bio.replace("\\n", "\n"),
            major: self.major,
            year: self.year,
            hometown: self.hometown,
            linkedin_url: self.linkedin_url,
            email: self.email,
            headshot_file: self.headshot_file,
            order_index: self.order_index,
        }
    }

    pub async fn find_all(pool: &PgPool) -> Result<Vec<BoardMember>, StoreError> {
        let rows = sqlx::query_as::<_, BoardMember>(&format!(
            "SELECT {COLUMNS} FROM board_members ORDER BY order_index ASC"
        ))
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<BoardMember>, StoreError> {
        let row = sqlx::query_as::<_, BoardMember>(&format!(
            "SELECT {COLUMNS} FROM board_members WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BoardMember {
        BoardMember {
            id: Uuid::new_v4(),
            full_name: "Jane Doe".to_string(),
            position: "President".to_string(),
            bio: "First line.\\nSecond line.".to_string(),
            major: "Finance".to_string(),
            year: "Senior".to_string(),
            hometown: "Brooklyn, NY".to_string(),
            linkedin_url: None,
            email: "jd1234@stern.nyu.edu".to_string(),
            headshot_file: None,
            order_index: 1,
        }
    }

    #[test]
    fn api_mapping_is_camel_case() {
        let value = serde_json::to_value(sample().into_api()).unwrap();
        assert_eq!(value["fullName"], "Jane Doe");
        assert_eq!(value["orderIndex"], 1);
        assert!(value.get("full_name").is_none());
    }

    #[test]
    fn api_mapping_unescapes_bio_newlines() {
        let api = sample().into_api();
        assert_eq!(api.bio, "First line.\nSecond line.");
    }
}
