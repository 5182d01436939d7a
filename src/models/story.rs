use crate::search::{FieldDef, Indexable};
use serde::{Deserialize, Serialize};

/// A story in the library
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Story {
    /// Unique identifier
    #[serde(default)]
    pub id: String,

    /// Title, searchable by word
    #[serde(default)]
    pub title: String,

    /// Full text; searchable but not kept in the index
    #[serde(default)]
    pub content: String,

    /// Author, matched as a whole name
    #[serde(default)]
    pub author: String,

    /// Price in whole currency units
    #[serde(default)]
    pub price: i32,
}

/// `content` is index-only: search results carry it empty until re-joined
pub const STORY_FIELDS: &[FieldDef] = &[
    FieldDef::identifier("id"),
    FieldDef::text("title", true),
    FieldDef::text("content", false),
    FieldDef::exact("author", true),
    FieldDef::integer("price", true),
];

impl Indexable for Story {
    fn fields() -> &'static [FieldDef] {
        STORY_FIELDS
    }
}

impl Story {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
        author: impl Into<String>,
        price: i32,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: content.into(),
            author: author.into(),
            price,
        }
    }

    /// The sample stories loaded by `/init`
    pub fn samples() -> Vec<Story> {
        vec![
            Story::new("00001", "聊斋志异", "各种短篇鬼故事", "清代小说家蒲松龄", 20),
            Story::new(
                "00002",
                "西游记",
                "孙悟空、猪八戒、沙僧、唐僧等人翻山越岭西天取经的故事,一路上降服各种妖魔鬼怪",
                "吴承恩",
                25,
            ),
            Story::new("00003", "水浒传", "108将聚义梁山泊，劫富济贫", "施耐庵", 30),
            Story::new("00004", "三国演义", "刘关张结义，魏蜀吴三足鼎立", "罗贯中", 35),
        ]
    }
}
