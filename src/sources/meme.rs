use serde::Deserialize;

use super::{Item, get_json};

const MEME_URL: &str = "https://meme-api.com/gimme";

#[derive(Debug, Deserialize)]
struct MemePost {
    title: Option<String>,
    url: Option<String>,
    #[serde(rename = "postLink")]
    post_link: Option<String>,
    ups: Option<u64>,
    subreddit: Option<String>,
}

pub async fn fetch_latest(http: &reqwest::Client) -> Vec<Item> {
    let Some(post) = get_json::<MemePost>(http, MEME_URL).await else {
        return Vec::new();
    };
    match to_item(post) {
        Some(item) => vec![item],
        None => {
            tracing::warn!("meme payload missing image url");
            Vec::new()
        }
    }
}

fn to_item(post: MemePost) -> Option<Item> {
    let image = post.url?;
    let id = post.post_link.clone().unwrap_or_else(|| image.clone());
    Some(Item {
        id,
        title: Some(post.title.unwrap_or_else(|| "Random Meme".to_string())),
        body: None,
        url: post.post_link,
        image_urls: vec![image],
        footer: Some(format!(
            "👍 {} • r/{}",
            post.ups.unwrap_or(0),
            post.subreddit.unwrap_or_else(|| "unknown".to_string())
        )),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_meme_payload() {
        let post: MemePost = serde_json::from_str(
            r#"{
                "postLink": "https://redd.it/abc",
                "subreddit": "memes",
                "title": "A meme",
                "url": "https://i.redd.it/abc.jpg",
                "ups": 420
            }"#,
        )
        .unwrap();

        let item = to_item(post).unwrap();
        assert_eq!(item.id, "https://redd.it/abc");
        assert_eq!(item.title.as_deref(), Some("A meme"));
        assert_eq!(item.url.as_deref(), Some("https://redd.it/abc"));
        assert_eq!(item.image_urls, vec!["https://i.redd.it/abc.jpg"]);
        assert_eq!(item.footer.as_deref(), Some("👍 420 • r/memes"));
    }

    #[test]
    fn drops_meme_without_image() {
        let post: MemePost =
            serde_json::from_str(r#"{"postLink": "https://redd.it/abc"}"#).unwrap();
        assert!(to_item(post).is_none());
    }

    #[test]
    fn falls_back_to_image_url_as_id() {
        let post: MemePost = serde_json::from_str(r#"{"url": "https://i.redd.it/x.jpg"}"#).unwrap();
        let item = to_item(post).unwrap();
        assert_eq!(item.id, "https://i.redd.it/x.jpg");
        assert_eq!(item.title.as_deref(), Some("Random Meme"));
    }
}
