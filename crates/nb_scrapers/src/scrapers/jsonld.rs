use scraper::{Html, Selector};
use serde_json::Value;

/// Extracts the article headline from JSON-LD metadata in the HTML document.
pub fn extract_headline(document: &Html) -> Option<String> {
    let script_selector = Selector::parse("script[type='application/ld+json']").ok()?;

    document.select(&script_selector).find_map(|script| {
        let json = serde_json::from_str::<Value>(script.text().collect::<String>().trim()).ok()?;
        find_headline(&json)
    })
}

// JSON-LD comes as a single object, an array of objects, or an `@graph`.
fn find_headline(json: &Value) -> Option<String> {
    match json {
        Value::Array(items) => items.iter().find_map(find_headline),
        Value::Object(obj) => {
            if let Some(headline) = obj.get("headline").and_then(|h| h.as_str()) {
                let headline = headline.trim();
                if !headline.is_empty() {
                    return Some(headline.to_string());
                }
            }
            obj.get("@graph").and_then(find_headline)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headline_from_object() {
        let html = r#"<script type="application/ld+json">
            {"@type": "NewsArticle", "headline": " Paro docente en Córdoba "}
        </script>"#;
        let document = Html::parse_document(html);
        assert_eq!(extract_headline(&document).as_deref(), Some("Paro docente en Córdoba"));
    }

    #[test]
    fn test_headline_from_graph() {
        let html = r#"<script type="application/ld+json">
            {"@context": "https://schema.org", "@graph": [
                {"@type": "WebSite", "name": "Diario"},
                {"@type": "NewsArticle", "headline": "Nueva ley de educación"}
            ]}
        </script>"#;
        let document = Html::parse_document(html);
        assert_eq!(extract_headline(&document).as_deref(), Some("Nueva ley de educación"));
    }

    #[test]
    fn test_broken_json_is_skipped() {
        let html = r#"
            <script type="application/ld+json">{ not json</script>
            <script type="application/ld+json">[{"headline": "Segundo"}]</script>
        "#;
        let document = Html::parse_document(html);
        assert_eq!(extract_headline(&document).as_deref(), Some("Segundo"));
        assert_eq!(extract_headline(&Html::parse_document("<p>nada</p>")), None);
    }
}
