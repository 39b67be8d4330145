use clap::{Args, Subcommand};
use nf_core::{Article, ArticleId, ArticleStorage, Batch, FeedConfig, FeedQuery, Result};
use std::fmt::Write;
use std::sync::Arc;

use crate::assembler::FeedAssembler;
use crate::service::FeedService;

const CARD_TITLE_WIDTH: usize = 72;

#[derive(Args, Debug, Clone)]
pub struct FeedArgs {
    #[command(subcommand)]
    pub command: FeedCommands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum FeedCommands {
    /// Assemble the next batch of articles
    Feed {
        /// Number of articles to collect
        #[arg(short, long)]
        count: Option<usize>,
        /// Restrict top headlines to a category (business, sports, technology...)
        #[arg(long, conflicts_with = "query")]
        category: Option<String>,
        /// Search the whole corpus for a term instead of top headlines
        #[arg(short, long)]
        query: Option<String>,
        /// Start from this upstream page instead of resuming
        #[arg(long)]
        page: Option<u32>,
    },
    /// Show an article of the last batch
    Show {
        id: ArticleId,
    },
    /// Add or remove a favorite article url
    Favorite {
        url: String,
    },
    /// List favorite article urls
    Favorites,
}

/// Runs one command. Only `feed` talks to the upstream, so the other
/// commands work without an API key.
pub async fn handle_command(args: FeedArgs, config: &FeedConfig, storage: Arc<dyn ArticleStorage>) -> Result<()> {
    match args.command {
        FeedCommands::Feed { count, category, query, page } => {
            let assembler = FeedAssembler::from_config(config)?;
            let service = FeedService::new(assembler, storage.clone(), config.request());
            let query = FeedQuery::from_parts(category.as_deref(), query.as_deref());
            println!("Loading articles ({})...", query);
            let batch = service.refresh_at(query, count, page).await?;
            print!("{}", render_batch(&batch, &storage.favorites().await?));
        }
        FeedCommands::Show { id } => {
            let article = storage.lookup(id).await?;
            print!("{}", render_article(&article));
        }
        FeedCommands::Favorite { url } => {
            if storage.toggle_favorite(&url).await? {
                println!("★ Added to favorites: {}", url);
            } else {
                println!("☆ Removed from favorites: {}", url);
            }
        }
        FeedCommands::Favorites => {
            let favorites = storage.favorites().await?;
            if favorites.is_empty() {
                println!("No favorites yet.");
            }
            for url in favorites {
                println!("★ {}", url);
            }
        }
    }
    Ok(())
}

/// Card listing for a batch.
pub fn render_batch(batch: &Batch, favorites: &[String]) -> String {
    let mut out = String::new();
    if batch.is_empty() {
        out.push_str("No articles found. Try adjusting your filters.\n");
        return out;
    }

    let _ = writeln!(out, "Page {} ({} articles)", batch.start_page, batch.len());
    for article in &batch.articles {
        let starred = article
            .url
            .as_ref()
            .map(|url| favorites.contains(url))
            .unwrap_or(false);
        let _ = writeln!(
            out,
            "{:>3} {} {}",
            article.id,
            if starred { "★" } else { " " },
            article.short_title(CARD_TITLE_WIDTH)
        );

        let mut meta = vec![article.source.clone(), article.short_date()];
        if let Some(category) = &article.category {
            meta.insert(0, category.to_uppercase());
        }
        let _ = writeln!(out, "      {}", meta.join(" · "));
    }
    out
}

/// Detail view for a single article.
pub fn render_article(article: &Article) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", article.title);

    let mut meta = Vec::new();
    if let Some(author) = &article.author {
        meta.push(format!("By {}", author));
    }
    meta.push(article.source.clone());
    meta.push(article.long_date());
    let _ = writeln!(out, "{}", meta.join(" | "));

    if let Some(description) = &article.description {
        let _ = writeln!(out, "\n{}", description);
    }
    if let Some(body) = article.body() {
        let _ = writeln!(out, "\n{}", body);
    }
    if let Some(url) = &article.url {
        let _ = writeln!(out, "\nRead full article at {}: {}", article.source, url);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use nf_core::{Error, FetchCursor};
    use nf_storage::InMemoryStorage;

    fn article(id: u32) -> Article {
        Article {
            id: ArticleId(id),
            title: format!("Headline {}", id),
            description: Some("What happened".to_string()),
            content: Some("Full story [+300 chars]".to_string()),
            image: None,
            author: Some("Jane Doe".to_string()),
            url: Some(format!("https://example.com/{}", id)),
            source: "Reuters".to_string(),
            published_at: Utc.with_ymd_and_hms(2026, 10, 18, 9, 30, 0).unwrap(),
            category: Some("business".to_string()),
        }
    }

    #[test]
    fn test_render_empty_batch() {
        let batch = Batch::empty(FeedQuery::TopHeadlines);
        assert_eq!(render_batch(&batch, &[]), "No articles found. Try adjusting your filters.\n");
    }

    #[test]
    fn test_render_batch() {
        let mut batch = Batch::empty(FeedQuery::Category("business".to_string()));
        batch.articles = vec![article(0), article(1)];
        batch.start_page = 3;
        batch.cursor = FetchCursor::at(4);

        let out = render_batch(&batch, &["https://example.com/1".to_string()]);
        assert!(out.starts_with("Page 3 (2 articles)"));
        assert!(out.contains("  1 ★ Headline 1"));
        assert!(out.contains("BUSINESS · Reuters · Oct 18, 2026"));
    }

    #[test]
    fn test_render_article() {
        let out = render_article(&article(5));
        assert!(out.starts_with("Headline 5\nBy Jane Doe | Reuters | October 18, 2026 at 09:30"));
        assert!(out.contains("\nFull story\n"));
        assert!(!out.contains("[+300 chars]"));
        assert!(out.contains("Read full article at Reuters: https://example.com/5"));
    }

    #[tokio::test]
    async fn test_feed_requires_api_key() {
        let args = FeedArgs {
            command: FeedCommands::Feed { count: None, category: None, query: None, page: None },
        };
        let result = handle_command(args, &FeedConfig::default(), Arc::new(InMemoryStorage::new())).await;
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn test_show_and_favorites_work_offline() {
        let storage = Arc::new(InMemoryStorage::new());
        let mut batch = Batch::empty(FeedQuery::TopHeadlines);
        batch.articles.push(article(0));
        storage.store_batch(&batch).await.unwrap();

        let config = FeedConfig::default();
        let show = |id| FeedArgs { command: FeedCommands::Show { id: ArticleId(id) } };
        assert!(handle_command(show(0), &config, storage.clone()).await.is_ok());
        assert!(matches!(
            handle_command(show(1), &config, storage.clone()).await,
            Err(Error::NotFound(_))
        ));

        let favorite = FeedArgs { command: FeedCommands::Favorite { url: "https://example.com/0".to_string() } };
        handle_command(favorite, &config, storage.clone()).await.unwrap();
        assert_eq!(storage.favorites().await.unwrap(), vec!["https://example.com/0"]);
    }
}
