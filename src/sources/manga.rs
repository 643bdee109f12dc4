use serde::Deserialize;
use std::collections::BTreeMap;

use super::{Item, get_json};

const API_BASE: &str = "https://api.mangadex.org";
const COVER_BASE: &str = "https://uploads.mangadex.org/covers";

/// English chapters, newest release first. The window is small: a chapter
/// that scrolls out between ticks is permanently missed.
const CHAPTER_FEED_URL: &str = "https://api.mangadex.org/chapter?limit=5&translatedLanguage[]=en&order[readableAt]=desc";

#[derive(Debug, Deserialize)]
struct ChapterFeed {
    data: Vec<Chapter>,
}

#[derive(Debug, Deserialize)]
struct Chapter {
    id: String,
    attributes: ChapterAttributes,
    #[serde(default)]
    relationships: Vec<Relationship>,
}

#[derive(Debug, Deserialize)]
struct ChapterAttributes {
    title: Option<String>,
    chapter: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Relationship {
    id: String,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Deserialize)]
struct MangaEntity {
    data: Manga,
}

#[derive(Debug, Deserialize)]
struct Manga {
    attributes: MangaAttributes,
    #[serde(default)]
    relationships: Vec<Relationship>,
}

#[derive(Debug, Deserialize)]
struct MangaAttributes {
    #[serde(default)]
    title: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct CoverEntity {
    data: Cover,
}

#[derive(Debug, Deserialize)]
struct Cover {
    attributes: CoverAttributes,
}

#[derive(Debug, Deserialize)]
struct CoverAttributes {
    #[serde(rename = "fileName")]
    file_name: String,
}

pub async fn fetch_latest(http: &reqwest::Client) -> Vec<Item> {
    let Some(feed) = get_json::<ChapterFeed>(http, CHAPTER_FEED_URL).await else {
        return Vec::new();
    };
    let mut items = Vec::new();
    for chapter in feed.data {
        match resolve_chapter(http, &chapter).await {
            Some(item) => items.push(item),
            None => {
                tracing::warn!(
                    chapter = %chapter.id,
                    "dropping chapter with unresolved manga or cover"
                );
            }
        }
    }
    items
}

/// Joins the chapter against its manga and cover art. Returns None if any
/// link in the join is missing or fails; the chapter stays in the upstream
/// window, so the next tick gets another attempt.
async fn resolve_chapter(http: &reqwest::Client, chapter: &Chapter) -> Option<Item> {
    let manga_id = related_id(&chapter.relationships, "manga")?;
    let manga = get_json::<MangaEntity>(http, &format!("{API_BASE}/manga/{manga_id}"))
        .await?
        .data;
    let manga_title = display_title(&manga.attributes.title)?;

    let cover_id = related_id(&manga.relationships, "cover_art")?;
    let cover = get_json::<CoverEntity>(http, &format!("{API_BASE}/cover/{cover_id}"))
        .await?
        .data;
    let image = format!(
        "{COVER_BASE}/{manga_id}/{file}",
        file = cover.attributes.file_name
    );

    Some(Item {
        id: chapter.id.clone(),
        title: Some(chapter_heading(&manga_title, &chapter.attributes)),
        body: chapter
            .attributes
            .title
            .clone()
            .filter(|title| !title.is_empty()),
        url: Some(format!("https://mangadex.org/chapter/{}", chapter.id)),
        image_urls: vec![image],
        footer: Some("MangaDex".to_string()),
    })
}

fn related_id<'a>(relationships: &'a [Relationship], kind: &str) -> Option<&'a str> {
    relationships
        .iter()
        .find(|rel| rel.kind == kind)
        .map(|rel| rel.id.as_str())
}

fn display_title(titles: &BTreeMap<String, String>) -> Option<String> {
    titles
        .get("en")
        .or_else(|| titles.values().next())
        .cloned()
        .filter(|title| !title.is_empty())
}

fn chapter_heading(manga_title: &str, attrs: &ChapterAttributes) -> String {
    match &attrs.chapter {
        Some(number) => format!("{manga_title} Ch. {number}"),
        None => manga_title.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_chapter_feed() {
        let feed: ChapterFeed = serde_json::from_str(
            r#"{
                "data": [
                    {
                        "id": "chapter-1",
                        "attributes": {"title": "The Beginning", "chapter": "12"},
                        "relationships": [
                            {"id": "group-1", "type": "scanlation_group"},
                            {"id": "manga-1", "type": "manga"}
                        ]
                    },
                    {
                        "id": "chapter-2",
                        "attributes": {"title": null, "chapter": null}
                    }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(feed.data.len(), 2);
        assert_eq!(
            related_id(&feed.data[0].relationships, "manga"),
            Some("manga-1")
        );
        assert_eq!(related_id(&feed.data[1].relationships, "manga"), None);
    }

    #[test]
    fn prefers_english_title() {
        let mut titles = BTreeMap::new();
        titles.insert("ja".to_string(), "ワンピース".to_string());
        titles.insert("en".to_string(), "One Piece".to_string());
        assert_eq!(display_title(&titles).as_deref(), Some("One Piece"));
    }

    #[test]
    fn falls_back_to_any_title() {
        let mut titles = BTreeMap::new();
        titles.insert("ja".to_string(), "ワンピース".to_string());
        assert_eq!(display_title(&titles).as_deref(), Some("ワンピース"));
        assert_eq!(display_title(&BTreeMap::new()), None);
    }

    #[test]
    fn heading_includes_chapter_number_when_present() {
        let attrs = ChapterAttributes {
            title: None,
            chapter: Some("12".to_string()),
        };
        assert_eq!(chapter_heading("One Piece", &attrs), "One Piece Ch. 12");

        let attrs = ChapterAttributes {
            title: None,
            chapter: None,
        };
        assert_eq!(chapter_heading("One Piece", &attrs), "One Piece");
    }
}
