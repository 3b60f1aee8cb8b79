// src/datasets/mod.rs
//! The site's datasets: which Notion database feeds which JSON file.
//!
//! Every dataset is plain data. Extraction ([`extract`]) and the reverse
//! mapping used by push ([`payload`]) are driven by the same field table.

pub mod extract;
pub mod payload;

use crate::types::ValidationError;
use indexmap::IndexMap;
use std::path::PathBuf;

/// One exported JSON object, with keys in output order.
pub type Record = IndexMap<String, serde_json::Value>;

/// Keyword selecting every dataset on the command line and in the admin UI.
pub const ALL_DATASETS: &str = "all";

const STATUS_OPTIONS: &[&str] = &["Draft", "Published", "Archived"];

/// How a Notion property becomes a JSON value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Title,
    RichText,
    Select,
    MultiSelect,
    Date,
    Number,
    Url,
    /// Every attached file as `{name, url}`.
    Files,
    /// URL of the first attached file, or `null`.
    FirstFileUrl,
}

/// Value substituted when a property is empty or missing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fallback {
    Text(&'static str),
    Number(i64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    /// Key in the exported JSON object.
    pub key: &'static str,
    /// Notion property name.
    pub property: &'static str,
    pub kind: FieldKind,
    pub fallback: Option<Fallback>,
    /// Select options created with the database.
    pub options: &'static [&'static str],
}

const fn field(key: &'static str, property: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec {
        key,
        property,
        kind,
        fallback: None,
        options: &[],
    }
}

const fn select(key: &'static str, property: &'static str, options: &'static [&'static str]) -> FieldSpec {
    FieldSpec {
        key,
        property,
        kind: FieldKind::Select,
        fallback: None,
        options,
    }
}

const fn with_fallback(spec: FieldSpec, fallback: Fallback) -> FieldSpec {
    FieldSpec {
        fallback: Some(fallback),
        ..spec
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    /// Record key compared as a string.
    pub key: &'static str,
    pub descending: bool,
}

/// Definition of one synced dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    pub notes: &'static [&'static str],
    pub database_title: &'static str,
    pub root_page_title: &'static str,
    pub title_property: &'static str,
    pub export_path: &'static str,
    pub fields: &'static [FieldSpec],
    /// Drop records whose `status` is `Archived` on export.
    pub drop_archived: bool,
    /// Only query pages whose `Status` select is `Published`.
    pub published_only: bool,
    pub sort: SortSpec,
}

impl DatasetSpec {
    pub fn export_path(&self) -> PathBuf {
        PathBuf::from(self.export_path)
    }

    /// The field backed by the title property.
    pub fn title_field(&self) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.kind == FieldKind::Title)
    }

    /// Filter sent with every database query, if any.
    pub fn query_filter(&self) -> Option<serde_json::Value> {
        self.published_only.then(|| {
            serde_json::json!({
                "property": "Status",
                "select": { "equals": "Published" }
            })
        })
    }
}

pub static DATASETS: &[DatasetSpec] = &[
    DatasetSpec {
        key: "sns",
        label: "SNS Project Grid",
        description: "Grid cards shown on the SNS tab of the Projects page.",
        notes: &["Images go in the \"Grid Image\" property, uploaded or as URLs."],
        database_title: "SNS Project Grid Manager",
        root_page_title: "synthera database",
        title_property: "Grid Name",
        export_path: "data/sns_grids.json",
        fields: &[
            field("grid_name", "Grid Name", FieldKind::Title),
            select(
                "project",
                "Project",
                &["Affiling", "EraCast", "AI小人", "NovaTV", "Other"],
            ),
            select(
                "platform",
                "Platform",
                &["YouTube", "TikTok", "Instagram", "Web", "Other"],
            ),
            field("detail_text", "Detail Text", FieldKind::RichText),
            field("cta_link", "CTA Link", FieldKind::Url),
            select("status", "Status", STATUS_OPTIONS),
            field("grid_image", "Grid Image", FieldKind::Files),
        ],
        drop_archived: false,
        published_only: false,
        sort: SortSpec {
            key: "grid_name",
            descending: false,
        },
    },
    DatasetSpec {
        key: "writing",
        label: "Writing Articles",
        description: "Article cards shown on the personal writing tab of the Projects page.",
        notes: &["Links come from \"CTA Link\" and button text from \"CTA Label\"."],
        database_title: "Writing Articles Manager",
        root_page_title: "Writing Library",
        title_property: "Article Title",
        export_path: "data/writing_articles.json",
        fields: &[
            field("article_title", "Article Title", FieldKind::Title),
            select("category", "Category", &["Note記事", "Blog", "Script"]),
            field("description", "Description", FieldKind::RichText),
            field("cta_label", "CTA Label", FieldKind::RichText),
            field("cta_link", "CTA Link", FieldKind::Url),
            select("status", "Status", STATUS_OPTIONS),
        ],
        drop_archived: true,
        published_only: false,
        sort: SortSpec {
            key: "article_title",
            descending: false,
        },
    },
    DatasetSpec {
        key: "note",
        label: "Note Articles",
        description: "Article cards on the Note page.",
        notes: &[
            "Category is one of technology / business / creative / lifestyle / news.",
            "Publish date lives in \"Publish Date\", the image in \"Cover Image\".",
        ],
        database_title: "Note Articles Manager",
        root_page_title: "Note Library",
        title_property: "Article Title",
        export_path: "data/note_articles.json",
        fields: &[
            field("article_title", "Article Title", FieldKind::Title),
            select(
                "category",
                "Category",
                &["technology", "business", "creative", "lifestyle", "news"],
            ),
            field("summary", "Summary", FieldKind::RichText),
            field("publish_date", "Publish Date", FieldKind::Date),
            field("read_time", "Read Time", FieldKind::Number),
            FieldSpec {
                options: &["トレンド", "分析", "ノウハウ"],
                ..field("tags", "Tags", FieldKind::MultiSelect)
            },
            field("cta_label", "CTA Label", FieldKind::RichText),
            field("cta_link", "CTA Link", FieldKind::Url),
            select("status", "Status", STATUS_OPTIONS),
            field("cover_image", "Cover Image", FieldKind::Files),
        ],
        drop_archived: true,
        published_only: false,
        sort: SortSpec {
            key: "publish_date",
            descending: true,
        },
    },
    DatasetSpec {
        key: "dev",
        label: "App Development Grid",
        description: "Cards shown on the app development tab of the Projects page.",
        notes: &["Cards without an image keep the placeholder."],
        database_title: "App Development Manager",
        root_page_title: "App Development",
        title_property: "Project Name",
        export_path: "data/dev_projects.json",
        fields: &[
            field("project_name", "Project Name", FieldKind::Title),
            select(
                "stage",
                "Stage",
                &["Planning", "Development", "Testing", "Launch"],
            ),
            select("status", "Status", &["Draft", "Active", "Paused", "Archived"]),
            select(
                "platform",
                "Platform",
                &["Mobile", "Web", "Desktop", "Multi-platform"],
            ),
            field("description", "Description", FieldKind::RichText),
            field("highlights", "Highlights", FieldKind::RichText),
            field("cta_label", "CTA Label", FieldKind::RichText),
            field("cta_link", "CTA Link", FieldKind::Url),
            field("project_image", "Project Image", FieldKind::Files),
        ],
        drop_archived: false,
        published_only: false,
        sort: SortSpec {
            key: "project_name",
            descending: false,
        },
    },
    DatasetSpec {
        key: "ec",
        label: "EC Projects",
        description: "Cards shown on the EC tab of the Projects page.",
        notes: &["Product images go in \"Project Image\" as URLs or files."],
        database_title: "EC Projects Manager",
        root_page_title: "EC Operations",
        title_property: "Project Name",
        export_path: "data/ec_projects.json",
        fields: &[
            field("project_name", "Project Name", FieldKind::Title),
            field("description", "Description", FieldKind::RichText),
            field("cta_label", "CTA Label", FieldKind::RichText),
            field("cta_link", "CTA Link", FieldKind::Url),
            select("status", "Status", STATUS_OPTIONS),
            field("project_image", "Project Image", FieldKind::Files),
        ],
        drop_archived: true,
        published_only: false,
        sort: SortSpec {
            key: "project_name",
            descending: false,
        },
    },
    DatasetSpec {
        key: "affiling",
        label: "Affiling Articles",
        description: "Articles on the Affiling page: list, sidebar and detail views.",
        notes: &[
            "Category is one of comparison / ranking / review / guide.",
            "Date, image and reading time live in \"Date\", \"Image\" and \"Read Time\".",
            "The page body becomes the article; \"Content\" is used when the body is empty.",
            "HTML tags are stripped when pushing to Notion.",
            "Push --reset archives old pages in Notion (archived: true) instead of setting Status to Archived.",
        ],
        database_title: "Affiling Articles Manager",
        root_page_title: "synthera database",
        title_property: "Title",
        export_path: "data/affiling_articles.json",
        fields: &[
            field("title", "Title", FieldKind::Title),
            field("excerpt", "Excerpt", FieldKind::RichText),
            with_fallback(
                select(
                    "category",
                    "Category",
                    &["comparison", "ranking", "review", "guide"],
                ),
                Fallback::Text("guide"),
            ),
            with_fallback(field("date", "Date", FieldKind::Date), Fallback::Text("")),
            field("image", "Image", FieldKind::FirstFileUrl),
            with_fallback(
                field("readTime", "Read Time", FieldKind::Number),
                Fallback::Number(0),
            ),
            field("productCount", "Product Count", FieldKind::Number),
            field("content", "Content", FieldKind::RichText),
            field("tags", "Tags", FieldKind::MultiSelect),
        ],
        drop_archived: false,
        published_only: true,
        sort: SortSpec {
            key: "date",
            descending: true,
        },
    },
];

/// Looks up a dataset by key.
pub fn find(key: &str) -> Result<&'static DatasetSpec, ValidationError> {
    DATASETS
        .iter()
        .find(|spec| spec.key == key)
        .ok_or_else(|| ValidationError::UnknownDataset {
            key: key.to_string(),
            known: known_keys(),
        })
}

/// Resolves a key or `all` into the datasets it names.
pub fn select_datasets(key: &str) -> Result<Vec<&'static DatasetSpec>, ValidationError> {
    if key == ALL_DATASETS {
        Ok(DATASETS.iter().collect())
    } else {
        find(key).map(|spec| vec![spec])
    }
}

fn known_keys() -> String {
    let mut keys: Vec<&str> = DATASETS.iter().map(|spec| spec.key).collect();
    keys.push(ALL_DATASETS);
    keys.join(", ")
}
