/// What an incoming chat message is, as far as the pipeline cares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    Link(String),
    Command,
    Unsupported,
}

/// A message is a link iff it starts with `http`; no further validation here.
pub fn route(text: &str) -> Inbound {
    let text = text.trim();
    if text.starts_with("http") {
        Inbound::Link(text.to_string())
    } else if text.starts_with('/') {
        Inbound::Command
    } else {
        Inbound::Unsupported
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route() {
        assert_eq!(
            route("  https://example.com/a \n"),
            Inbound::Link("https://example.com/a".to_string())
        );
        assert_eq!(route("http//roto"), Inbound::Link("http//roto".to_string()));
        assert_eq!(route("/start"), Inbound::Command);
        assert_eq!(route("hello"), Inbound::Unsupported);
        assert_eq!(route("mirá https://example.com"), Inbound::Unsupported);
        assert_eq!(route(""), Inbound::Unsupported);
    }
}
