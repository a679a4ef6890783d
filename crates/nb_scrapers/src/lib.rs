pub mod scrapers;

pub use scrapers::generic::{parse_article, ParsedPage};
pub use scrapers::WebExtractor;

pub mod prelude {
    pub use super::scrapers::WebExtractor;
    pub use nb_core::{ArticleExtractor, Error, ExtractedArticle, Result};
}
