// tests/sync_round_trip.rs
//! Pull, push and status against an in-memory workspace.

mod common;

use common::*;
use notion_site_sync::{
    find_dataset, AppError, AssetResolver, Block, FileRef, ImageHost, ImageSource,
    PropertyValue, SyncService, TrackingPixelRules,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::Arc;

const SIGNED: &str =
    "https://prod-files-secure.s3.us-west-2.amazonaws.com/ws/cover.png?X-Amz-Expires=3600&X-Amz-Signature=abc";

fn service(notion: Arc<FakeNotion>) -> SyncService {
    SyncService::new(notion, AssetResolver::passthrough()).with_concurrency(2)
}

fn read_json(path: &std::path::Path) -> Vec<Value> {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

fn note_rows() -> Vec<notion_site_sync::Page> {
    vec![
        row(
            1,
            vec![
                ("Article Title", title("Older")),
                ("Publish Date", PropertyValue::Date(Some("2024-10-15".into()))),
                ("Read Time", PropertyValue::Number(Some(5.0))),
                ("Tags", PropertyValue::MultiSelect(vec!["分析".into()])),
                ("Status", select("Published")),
            ],
        ),
        row(
            2,
            vec![
                ("Article Title", title("Newer")),
                ("Publish Date", PropertyValue::Date(Some("2024-11-01".into()))),
                ("Status", select("Published")),
            ],
        ),
        row(3, vec![("Article Title", title("   "))]),
        row(
            4,
            vec![("Article Title", title("Gone")), ("Status", select("Archived"))],
        ),
    ]
}

#[tokio::test]
async fn pull_writes_sorted_records_with_rendered_bodies() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("nested/note.json");
    let notion = Arc::new(
        FakeNotion::new()
            .with_database("Note Articles Manager", 1, note_rows())
            .with_body(
                &page_id(1),
                vec![
                    Block::paragraph(text("Hello <b>")),
                    Block::bulleted_item(text("A")),
                    Block::bulleted_item(text("B")),
                ],
            ),
    );
    let spec = find_dataset("note").unwrap();

    let report = service(notion).pull(spec, Some(&output)).await.unwrap();

    assert_eq!(report.records, 2);
    assert!(!report.database_created);
    assert_eq!(report.failed_bodies, 0);
    assert_eq!(report.path, output);

    let records = read_json(&output);
    let titles: Vec<&str> = records
        .iter()
        .map(|r| r["article_title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Newer", "Older"]);

    let raw = std::fs::read_to_string(&output).unwrap();
    assert!(raw.starts_with("[\n  {\n    \"id\": "));
    assert!(raw.ends_with("]\n"));

    let older = records[1].as_object().unwrap();
    assert_eq!(older["id"], json!(page_id(1).as_str()));
    assert_eq!(older["read_time"], json!(5));
    assert_eq!(older["tags"], json!(["分析"]));
    assert_eq!(
        older["content"],
        json!("<p>Hello &lt;b&gt;</p>\n<ul><li>A</li><li>B</li></ul>")
    );
    assert_eq!(records[0]["content"], json!(""));
    assert_eq!(records[0]["read_time"], Value::Null);
}

#[tokio::test]
async fn pull_creates_missing_database_under_root_page() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("writing.json");
    let notion = Arc::new(FakeNotion::new().with_root_page("Writing Library", 1));
    let spec = find_dataset("writing").unwrap();

    let report = service(notion.clone()).pull(spec, Some(&output)).await.unwrap();

    assert!(report.database_created);
    assert_eq!(report.records, 0);
    assert_eq!(std::fs::read_to_string(&output).unwrap(), "[]\n");

    let ws = notion.workspace.lock().unwrap();
    let (created, schema) = &ws.created_databases[0];
    assert_eq!(created, "Writing Articles Manager");
    assert_eq!(schema["Article Title"], json!({ "title": {} }));
    assert_eq!(
        schema["Status"]["select"]["options"],
        json!([{ "name": "Draft" }, { "name": "Published" }, { "name": "Archived" }])
    );
}

#[tokio::test]
async fn pull_without_root_page_fails() {
    let notion = Arc::new(FakeNotion::new());
    let spec = find_dataset("dev").unwrap();
    let dir = tempfile::tempdir().unwrap();

    let err = service(notion)
        .pull(spec, Some(&dir.path().join("dev.json")))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::MissingRootPage { .. }));
}

#[tokio::test]
async fn affiling_pull_filters_published_and_falls_back_to_content_property() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("affiling.json");
    let notion = Arc::new(FakeNotion::new().with_database(
        "Affiling Articles Manager",
        6,
        vec![row(
            10,
            vec![
                ("Title", title("Best laptops")),
                ("Content", rich("Plain body")),
                ("Status", select("Published")),
            ],
        )],
    ));
    let spec = find_dataset("affiling").unwrap();

    service(notion.clone()).pull(spec, Some(&output)).await.unwrap();

    let records = read_json(&output);
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record["category"], json!("guide"));
    assert_eq!(record["date"], json!(""));
    assert_eq!(record["readTime"], json!(0));
    assert_eq!(record["image"], Value::Null);
    assert_eq!(record["content"], json!("Plain body"));

    let ws = notion.workspace.lock().unwrap();
    assert_eq!(
        ws.queries[0],
        Some(json!({ "property": "Status", "select": { "equals": "Published" } }))
    );
}

struct StubHost;

#[async_trait::async_trait]
impl ImageHost for StubHost {
    async fn download(&self, _url: &str) -> Result<Vec<u8>, AppError> {
        Ok(vec![0xff, 0xd8])
    }

    async fn upload(&self, _bytes: Vec<u8>, image_id: Option<&str>) -> Result<String, AppError> {
        Ok(format!(
            "https://imagedelivery.net/hash/{}/public",
            image_id.unwrap_or("anonymous")
        ))
    }
}

#[tokio::test]
async fn pull_rehosts_expiring_images() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("sns.json");
    let notion = Arc::new(
        FakeNotion::new()
            .with_database(
                "SNS Project Grid Manager",
                1,
                vec![row(
                    7,
                    vec![
                        ("Grid Name", title("Launch")),
                        (
                            "Grid Image",
                            PropertyValue::Files(vec![FileRef {
                                name: "cover.png".into(),
                                url: SIGNED.into(),
                            }]),
                        ),
                    ],
                )],
            )
            .with_body(
                &page_id(7),
                vec![Block::image(ImageSource::Hosted {
                    url: format!("{}&body=1", SIGNED),
                    expiry_time: None,
                })],
            ),
    );
    let resolver = AssetResolver::new(Arc::new(StubHost));
    let service = SyncService::new(notion, resolver);
    let spec = find_dataset("sns").unwrap();

    service.pull(spec, Some(&output)).await.unwrap();

    let records = read_json(&output);
    let page_id_7 = page_id(7);
    let short = &page_id_7.as_str()[..16];
    assert_eq!(
        records[0]["grid_image"],
        json!([{
            "name": "cover.png",
            "url": format!("https://imagedelivery.net/hash/sns-{}-cover.png/public", short)
        }])
    );
    let content = records[0]["content"].as_str().unwrap();
    assert!(content.starts_with("<figure><img src=\"https://imagedelivery.net/hash/sns-"));
    assert!(!content.contains("X-Amz"));
    assert_eq!(service.resolver().resolved_count(), 2);
}

#[tokio::test]
async fn custom_tracking_rules_apply_to_bodies() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("dev.json");
    let notion = Arc::new(
        FakeNotion::new()
            .with_database(
                "App Development Manager",
                4,
                vec![row(8, vec![("Project Name", title("Tracker"))])],
            )
            .with_body(
                &page_id(8),
                vec![
                    Block::paragraph(text("Visible")),
                    Block::image(ImageSource::External {
                        url: "https://mail.example.com/o/spacer.gif".into(),
                    }),
                ],
            ),
    );
    let rules = TrackingPixelRules {
        filename_patterns: vec!["spacer.gif".into()],
        ..TrackingPixelRules::default()
    };
    let service = service(notion).with_tracking_rules(rules);
    let spec = find_dataset("dev").unwrap();

    service.pull(spec, Some(&output)).await.unwrap();

    assert_eq!(read_json(&output)[0]["content"], json!("<p>Visible</p>"));
}

#[tokio::test]
async fn push_upserts_by_title() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("ec.json");
    std::fs::write(
        &input,
        r#"[
            {"project_name": "Alpha", "description": "<b>New</b> copy", "status": "Published"},
            {"project_name": "Beta", "project_image": [{"name": "a.png", "url": "https://cdn.example.com/a.png"}]},
            {"project_name": "  "}
        ]"#,
    )
    .unwrap();
    let notion = Arc::new(FakeNotion::new().with_database(
        "EC Projects Manager",
        5,
        vec![row(1, vec![("Project Name", title("Alpha"))])],
    ));
    let spec = find_dataset("ec").unwrap();

    let report = service(notion.clone()).push(spec, Some(&input), false).await.unwrap();

    assert_eq!((report.created, report.updated, report.skipped, report.archived), (1, 1, 1, 0));

    let ws = notion.workspace.lock().unwrap();
    let (updated_id, updated) = &ws.updated_pages[0];
    assert_eq!(updated_id, page_id(1).as_str());
    assert_eq!(
        updated["Description"],
        json!({ "rich_text": [{ "type": "text", "text": { "content": "New copy" } }] })
    );
    assert_eq!(updated["Status"], json!({ "select": { "name": "Published" } }));

    let created = &ws.created_pages[0];
    assert_eq!(created["Status"], json!({ "select": null }));
    assert_eq!(
        created["Project Image"],
        json!({ "files": [{
            "name": "a.png",
            "type": "external",
            "external": { "url": "https://cdn.example.com/a.png" }
        }] })
    );
}

#[tokio::test]
async fn push_with_reset_archives_then_recreates() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("dev.json");
    std::fs::write(&input, r#"[{"project_name": "Alpha"}, {"project_name": "Alpha"}]"#).unwrap();
    let notion = Arc::new(FakeNotion::new().with_database(
        "App Development Manager",
        4,
        vec![
            row(1, vec![("Project Name", title("Alpha"))]),
            row(2, vec![("Project Name", title("Old"))]),
        ],
    ));
    let spec = find_dataset("dev").unwrap();

    let report = service(notion.clone()).push(spec, Some(&input), true).await.unwrap();

    // the second "Alpha" updates the page created for the first one
    assert_eq!((report.archived, report.created, report.updated), (2, 1, 1));
    let ws = notion.workspace.lock().unwrap();
    assert_eq!(ws.archived_pages.len(), 2);
    assert_eq!(ws.created_pages.len(), 1);
}

#[tokio::test]
async fn push_of_missing_file_changes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let notion = Arc::new(FakeNotion::new().with_database("Note Articles Manager", 2, vec![]));
    let spec = find_dataset("note").unwrap();

    let report = service(notion.clone())
        .push(spec, Some(&dir.path().join("absent.json")), false)
        .await
        .unwrap();

    assert_eq!(report.created + report.updated + report.skipped, 0);
    assert!(notion.workspace.lock().unwrap().created_pages.is_empty());
}

#[tokio::test]
async fn status_counts_titled_pages() {
    let notion = Arc::new(FakeNotion::new().with_database("Note Articles Manager", 3, note_rows()));
    let spec = find_dataset("note").unwrap();

    let status = service(notion).status(spec).await.unwrap();

    assert_eq!(status.key, "note");
    assert_eq!(status.notion_count, 3);
    assert_eq!(status.export_path, "data/note_articles.json");
}

#[tokio::test]
async fn pull_and_status_follow_the_data_root() {
    let dir = tempfile::tempdir().unwrap();
    let notion = Arc::new(FakeNotion::new().with_database("Note Articles Manager", 3, note_rows()));
    let service = service(notion).with_data_root(dir.path());
    let spec = find_dataset("note").unwrap();

    let report = service.pull(spec, None).await.unwrap();
    let expected = dir.path().join("data/note_articles.json");
    assert_eq!(report.path, expected);

    let status = service.status(spec).await.unwrap();
    assert_eq!(status.local_count, report.records);
    assert_eq!(status.export_path, expected.display().to_string());
}

#[tokio::test]
async fn rehost_rewrites_expiring_images_in_existing_exports() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("affiling.json");
    let signed_attr = SIGNED.replace('&', "&amp;");
    let original = json!([
        {
            "id": "a1",
            "title": "Stale",
            "content": format!("<p>x</p><img src=\"{}\" alt=\"\">", signed_attr)
        },
        {
            "id": "a2",
            "title": "Fresh",
            "content": "<img src=\"https://imagedelivery.net/hash/done/public\">"
        },
        { "id": "a3", "title": "Empty", "content": "" }
    ]);
    std::fs::write(&path, serde_json::to_string_pretty(&original).unwrap()).unwrap();

    let service = SyncService::new(
        Arc::new(FakeNotion::new()),
        AssetResolver::new(Arc::new(StubHost)),
    );
    let spec = find_dataset("affiling").unwrap();

    let report = service.rehost(spec, Some(&path)).await.unwrap();

    assert_eq!(report.records, 3);
    assert_eq!(report.updated, 1);
    let records = read_json(&path);
    assert_eq!(
        records[0]["content"],
        json!("<p>x</p><img src=\"https://imagedelivery.net/hash/anonymous/public\" alt=\"\">")
    );
    assert_eq!(records[1], original[1]);
    assert_eq!(records[2], original[2]);
}

#[tokio::test]
async fn rehost_leaves_clean_files_alone() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("note.json");
    let compact = r#"[{"id":"n1","content":"<p>fine</p>"}]"#;
    std::fs::write(&path, compact).unwrap();

    let service = SyncService::new(
        Arc::new(FakeNotion::new()),
        AssetResolver::new(Arc::new(StubHost)),
    );
    let report = service
        .rehost(find_dataset("note").unwrap(), Some(&path))
        .await
        .unwrap();

    assert_eq!(report.updated, 0);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), compact);
}
