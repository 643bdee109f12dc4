use serde_json::Value;

use super::Item;

/// The profile endpoint refuses non-browser clients outright.
const USER_AGENT: &str = "Mozilla/5.0";

pub async fn fetch_latest(http: &reqwest::Client, username: &str) -> Vec<Item> {
    let url = format!("https://www.instagram.com/{username}/?__a=1&__d=dis");
    let resp = match http
        .get(&url)
        .header(reqwest::header::USER_AGENT, USER_AGENT)
        .send()
        .await
    {
        Ok(resp) => resp,
        Err(e) => {
            tracing::warn!(error = %e, "instagram request failed");
            return Vec::new();
        }
    };

    let status = resp.status();
    if !status.is_success() {
        tracing::warn!(%status, "instagram returned non-success status");
        return Vec::new();
    }

    // Instagram serves an HTML login wall instead of JSON when it decides to
    // rate-limit the scrape; that decodes as a failure here.
    let payload: Value = match resp.json().await {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!(error = %e, "instagram returned a non-JSON payload");
            return Vec::new();
        }
    };

    parse_timeline(&payload, username)
}

fn parse_timeline(payload: &Value, username: &str) -> Vec<Item> {
    let Some(edges) = payload
        .pointer("/graphql/user/edge_owner_to_timeline_media/edges")
        .and_then(Value::as_array)
    else {
        tracing::warn!("instagram payload missing timeline edges");
        return Vec::new();
    };

    edges
        .iter()
        .filter_map(|edge| parse_node(edge.get("node")?, username))
        .collect()
}

fn parse_node(node: &Value, username: &str) -> Option<Item> {
    let id = node.get("id")?.as_str()?.to_string();

    let caption = node
        .pointer("/edge_media_to_caption/edges/0/node/text")
        .and_then(Value::as_str)
        .map(str::to_string);

    // Sidecar posts carry one display url per child; single posts only the
    // top-level one.
    let mut image_urls: Vec<String> = node
        .pointer("/edge_sidecar_to_children/edges")
        .and_then(Value::as_array)
        .map(|children| {
            children
                .iter()
                .filter_map(|child| child.pointer("/node/display_url").and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    if image_urls.is_empty() {
        image_urls.extend(
            node.get("display_url")
                .and_then(Value::as_str)
                .map(str::to_string),
        );
    }

    let url = node
        .get("shortcode")
        .and_then(Value::as_str)
        .map(|shortcode| format!("https://www.instagram.com/p/{shortcode}/"));

    Some(Item {
        id,
        title: Some(format!("📸 New Post from @{username}")),
        body: caption,
        url,
        image_urls,
        footer: Some("Instagram Auto-Post".to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn timeline(nodes: Vec<Value>) -> Value {
        json!({
            "graphql": {
                "user": {
                    "edge_owner_to_timeline_media": {
                        "edges": nodes.into_iter().map(|node| json!({"node": node})).collect::<Vec<_>>()
                    }
                }
            }
        })
    }

    #[test]
    fn parses_single_image_post() {
        let payload = timeline(vec![json!({
            "id": "111",
            "shortcode": "AbC",
            "display_url": "https://ig.example/1.jpg",
            "edge_media_to_caption": {"edges": [{"node": {"text": "hello"}}]}
        })]);

        let items = parse_timeline(&payload, "someuser");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "111");
        assert_eq!(items[0].body.as_deref(), Some("hello"));
        assert_eq!(
            items[0].url.as_deref(),
            Some("https://www.instagram.com/p/AbC/")
        );
        assert_eq!(items[0].image_urls, vec!["https://ig.example/1.jpg"]);
        assert_eq!(
            items[0].title.as_deref(),
            Some("📸 New Post from @someuser")
        );
    }

    #[test]
    fn sidecar_children_supply_all_images() {
        let payload = timeline(vec![json!({
            "id": "222",
            "shortcode": "XyZ",
            "display_url": "https://ig.example/cover.jpg",
            "edge_sidecar_to_children": {"edges": [
                {"node": {"display_url": "https://ig.example/a.jpg"}},
                {"node": {"display_url": "https://ig.example/b.jpg"}}
            ]}
        })]);

        let items = parse_timeline(&payload, "someuser");
        assert_eq!(
            items[0].image_urls,
            vec!["https://ig.example/a.jpg", "https://ig.example/b.jpg"]
        );
    }

    #[test]
    fn preserves_newest_first_order() {
        let payload = timeline(vec![
            json!({"id": "3", "display_url": "https://ig.example/3.jpg"}),
            json!({"id": "2", "display_url": "https://ig.example/2.jpg"}),
            json!({"id": "1", "display_url": "https://ig.example/1.jpg"}),
        ]);

        let ids: Vec<String> = parse_timeline(&payload, "someuser")
            .into_iter()
            .map(|item| item.id)
            .collect();
        assert_eq!(ids, vec!["3", "2", "1"]);
    }

    #[test]
    fn missing_timeline_yields_empty_batch() {
        let payload = json!({"graphql": {"user": {}}});
        assert!(parse_timeline(&payload, "someuser").is_empty());

        let payload = json!("login required");
        assert!(parse_timeline(&payload, "someuser").is_empty());
    }

    #[test]
    fn node_without_id_is_dropped() {
        let payload = timeline(vec![
            json!({"display_url": "https://ig.example/x.jpg"}),
            json!({"id": "9", "display_url": "https://ig.example/9.jpg"}),
        ]);
        let items = parse_timeline(&payload, "someuser");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "9");
    }
}
