use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use reqwest::Client;
use tracing::{info, warn};

use crate::config::Config;
use crate::deepseek::{self, DeepSeekClient, DeepSeekError, TextService};
use crate::render::{self, DEFAULT_PER_PAGE, RowNotes, Translation};
use crate::shamela::{ExtractOptions, PreviewScope, SearchResult, ShamelaClient, TextJoin};

/// TCP connection establishment timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Client-wide timeout covering DNS + connect + response body.
const HTTP_TIMEOUT: Duration = Duration::from_secs(60);
const MAX_REDIRECTS: usize = 5;

#[derive(Debug, Parser)]
#[command(
    name = "shamela-fusion",
    version,
    about = "Search shamela.ws and translate or classify the hits with DeepSeek"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Search shamela.ws and list one page of results
    Search(SearchArgs),
    /// Translate Arabic text to English
    Translate {
        /// Arabic text to translate
        text: String,
    },
    /// Ask whether a title names a primary source (prints true or false)
    Classify {
        /// Book or document title
        title: String,
    },
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Search term
    pub term: String,
    /// Page to show, starting at 1
    #[arg(long, default_value_t = 1)]
    pub page: usize,
    /// Results per page
    #[arg(long, default_value_t = DEFAULT_PER_PAGE)]
    pub per_page: usize,
    /// Replace each shown preview with its English translation
    #[arg(long)]
    pub translate: bool,
    /// Mark titles that look like primary sources
    #[arg(long)]
    pub classify: bool,
    /// Only take a preview paragraph that appears before the next result link
    #[arg(long)]
    pub scoped_previews: bool,
    /// Keep the spacing between inline elements instead of stripping and
    /// concatenating each text piece
    #[arg(long)]
    pub spaced_text: bool,
    /// Print the page as JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error("{0} must not be empty")]
    EmptyInput(&'static str),

    #[error(transparent)]
    DeepSeek(#[from] DeepSeekError),

    #[error("could not encode results: {0}")]
    Json(#[from] serde_json::Error),
}

/// The search front end. Owns one HTTP client shared by both services.
///
/// The DeepSeek client is optional: without `DEEPSEEK_API_KEY` searching still
/// works and only translate/classify report an error.
pub struct Shell<T = DeepSeekClient> {
    shamela: ShamelaClient,
    text_service: Option<T>,
}

impl Shell {
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(HTTP_TIMEOUT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()?;
        let text_service = DeepSeekClient::new(http.clone(), &config.deepseek)
            .inspect_err(|e| warn!("DeepSeek client not available: {e}"))
            .ok();
        Ok(Self {
            shamela: ShamelaClient::new(http, config.search_url.clone()),
            text_service,
        })
    }
}

impl<T: TextService> Shell<T> {
    pub async fn run(&self, command: Command) -> Result<String, ShellError> {
        match command {
            Command::Search(args) => self.search(args).await,
            Command::Translate { text } => self.translate(&text).await,
            Command::Classify { title } => self.classify(&title).await,
        }
    }

    fn text_service(&self) -> Result<&T, ShellError> {
        self.text_service
            .as_ref()
            .ok_or(ShellError::DeepSeek(DeepSeekError::ApiKeyNotSet))
    }

    async fn search(&self, args: SearchArgs) -> Result<String, ShellError> {
        let term = args.term.trim();
        if term.is_empty() {
            return Err(ShellError::EmptyInput("search term"));
        }
        let service = if args.translate || args.classify {
            Some(self.text_service()?)
        } else {
            None
        };

        info!(term, page = args.page, "search");

        let options = ExtractOptions {
            preview_scope: if args.scoped_previews {
                PreviewScope::UntilNextAnchor
            } else {
                PreviewScope::Document
            },
            text_join: if args.spaced_text {
                TextJoin::Spaced
            } else {
                TextJoin::Stripped
            },
        };
        let results = self.shamela.search(term, options).await;
        let page = render::paginate(&results, args.page, args.per_page);

        info!(
            results = results.len(),
            page = page.number,
            pages = page.total_pages,
            "search complete"
        );

        let notes = match service {
            Some(service) => annotate(service, page.rows, args.translate, args.classify).await,
            None => Vec::new(),
        };

        if args.json {
            return Ok(render::format_page_json(&page, &notes)?);
        }
        Ok(render::format_page(term, &page, &notes))
    }

    async fn translate(&self, text: &str) -> Result<String, ShellError> {
        if text.trim().is_empty() {
            return Err(ShellError::EmptyInput("text"));
        }
        let service = self.text_service()?;
        info!(chars = text.chars().count(), "translate");

        Ok(deepseek::translate_or_none(service, text)
            .await
            .unwrap_or_else(|| "(no translation available)".to_string()))
    }

    async fn classify(&self, title: &str) -> Result<String, ShellError> {
        if title.trim().is_empty() {
            return Err(ShellError::EmptyInput("title"));
        }
        let service = self.text_service()?;
        info!(title, "classify");

        Ok(deepseek::is_primary_source(service, title).await.to_string())
    }
}

/// One request per enabled feature per row, issued in order.
async fn annotate(
    service: &impl TextService,
    rows: &[SearchResult],
    translate: bool,
    classify: bool,
) -> Vec<RowNotes> {
    let mut notes = Vec::with_capacity(rows.len());
    for row in rows {
        let mut note = RowNotes::default();
        if classify {
            note.primary_source = Some(deepseek::is_primary_source(service, &row.title).await);
        }
        if translate {
            note.translation = match deepseek::translate_or_none(service, &row.preview).await {
                Some(text) => Translation::Done(text),
                None => Translation::Failed,
            };
        }
        notes.push(note);
    }
    notes
}
