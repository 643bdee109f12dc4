use serde::Deserialize;

use super::{Item, get_json};

const QUOTE_URL: &str = "https://zenquotes.io/api/random";

#[derive(Debug, Deserialize)]
struct Quote {
    q: String,
    a: String,
}

pub async fn fetch_latest(http: &reqwest::Client) -> Vec<Item> {
    let Some(quotes) = get_json::<Vec<Quote>>(http, QUOTE_URL).await else {
        return Vec::new();
    };
    let Some(quote) = quotes.into_iter().next() else {
        tracing::warn!("quote payload was an empty list");
        return Vec::new();
    };
    vec![to_item(quote)]
}

fn to_item(quote: Quote) -> Item {
    Item {
        // The upstream has no post id; the text itself is the dedup key.
        id: quote.q.clone(),
        title: None,
        body: Some(quote.q),
        url: None,
        image_urls: Vec::new(),
        footer: Some(quote.a),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_quote_payload() {
        let quotes: Vec<Quote> = serde_json::from_str(
            r#"[{"q": "Stay hungry.", "a": "Steve Jobs", "h": "<blockquote>...</blockquote>"}]"#,
        )
        .unwrap();

        let item = to_item(quotes.into_iter().next().unwrap());
        assert_eq!(item.id, "Stay hungry.");
        assert_eq!(item.body.as_deref(), Some("Stay hungry."));
        assert_eq!(item.footer.as_deref(), Some("Steve Jobs"));
    }
}
