use serde_derive::{Deserialize, Serialize};

use crate::auth::SessionClaims;

/// 用户资料
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub email: String,

    #[serde(rename = "imageUrl", default)]
    pub image_url: String,

    // 后端有时返回 id 列表，有时返回展开的课程对象，这里只保留 id
    #[serde(
        rename = "enrolledCourses",
        default,
        deserialize_with = "enrolled_ids::deserialize"
    )]
    pub enrolled_courses: Vec<String>,
}

impl UserProfile {
    /// 后端还没有该用户记录时，用会话里的声明拼一个最小资料
    pub fn from_claims(claims: &SessionClaims) -> Self {
        Self {
            id: claims.user_id.clone(),
            name: claims.full_name.clone(),
            email: claims.email.clone(),
            image_url: claims.image_url.clone(),
            enrolled_courses: Vec::new(),
        }
    }
}

mod enrolled_ids {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Entry {
        Id(String),
        Course {
            #[serde(rename = "_id")]
            id: String,
        },
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let entries = Vec::<Entry>::deserialize(deserializer)?;
        Ok(entries
            .into_iter()
            .map(|e| match e {
                Entry::Id(id) => id,
                Entry::Course { id } => id,
            })
            .collect())
    }
}
