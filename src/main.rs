use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use blogdesk::api::{ApiClient, Article, ArticleQuery, ArticleStatus, Resource};
use blogdesk::category::{build_forest, render_forest, CategoryRecord};
use blogdesk::compose::{ArticleComposer, ComposeForm};
use blogdesk::config::Config;
use blogdesk::media::{deletion_warning, sort_resources, SortKey, SortOrder, SortSpec};
use blogdesk::session::SessionContext;
use blogdesk::util::{sanitize_for_terminal, truncate_to_width};

const DEFAULT_WIDTH: usize = 80;

/// Get the config directory path (~/.config/blogdesk/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("blogdesk"))
}

fn terminal_width() -> usize {
    std::env::var("COLUMNS")
        .ok()
        .and_then(|c| c.trim().parse().ok())
        .filter(|w: &usize| *w > 0)
        .unwrap_or(DEFAULT_WIDTH)
}

#[derive(Parser, Debug)]
#[command(name = "blogdesk", about = "Admin client for a blog CMS")]
struct Cli {
    /// Config file (default: ~/.config/blogdesk/config.toml)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the category tree
    Categories {
        /// Ignore the cached list and fetch again
        #[arg(long)]
        refresh: bool,

        /// Print the tree as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// List tags with their article counts
    Tags,

    #[command(subcommand)]
    Articles(ArticleCommand),

    #[command(subcommand)]
    Resources(ResourceCommand),
}

#[derive(Subcommand, Debug)]
enum ArticleCommand {
    /// List articles, optionally filtered
    List {
        #[arg(long, conflicts_with_all = ["date", "category", "tag"])]
        status: Option<ArticleStatus>,
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        tag: Option<String>,
    },

    /// Show the values the list filters accept
    Filters,

    /// Permanently delete an article
    Delete { id: i64 },

    /// Change an article's status (draft, pending or published)
    SetStatus { id: i64, status: ArticleStatus },

    /// Move an article to the recycle bin, or back out with --restore
    Recycle {
        id: i64,
        #[arg(long)]
        restore: bool,
    },

    /// Compose and send a new article
    New(NewArticle),
}

#[derive(Args, Debug)]
struct NewArticle {
    #[arg(long)]
    title: String,

    /// URL alias of a leaf category
    #[arg(long)]
    category: String,

    /// File holding the article body (HTML)
    #[arg(long, value_name = "FILE")]
    content_file: PathBuf,

    #[arg(long = "abstract")]
    abstracts: Option<String>,

    #[arg(long = "tag")]
    tags: Vec<String>,

    /// Location of an uploaded image used in the content
    #[arg(long = "image", value_name = "LOC")]
    images: Vec<String>,

    /// Location of an uploaded file to attach
    #[arg(long = "accessory", value_name = "LOC")]
    accessories: Vec<String>,

    #[command(flatten)]
    mode: SendMode,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct SendMode {
    /// Save as draft
    #[arg(long)]
    draft: bool,

    /// Publish immediately
    #[arg(long)]
    publish: bool,

    /// Submit for review
    #[arg(long)]
    submit: bool,
}

#[derive(Subcommand, Debug)]
enum ResourceCommand {
    /// List uploaded resources
    List {
        #[arg(long)]
        date: Option<String>,
        #[arg(long = "type")]
        resource_type: Option<String>,
        /// filename, location, type, date, size or referenced
        #[arg(long)]
        sort: Option<SortKey>,
        #[arg(long, requires = "sort")]
        desc: bool,
    },

    /// Show the values the list filters accept
    Filters,

    /// Delete a resource by location
    Delete {
        location: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// Upload a file
    Upload { file: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing for debug logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config_dir = get_config_dir()?;
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| config_dir.join("config.toml"));
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?
        .with_env_overrides();

    let client = ApiClient::new(&config).context("Failed to create API client")?;
    tracing::debug!(base_url = %client.base_url(), "API client ready");

    match cli.command {
        Command::Categories { refresh, json } => {
            show_categories(&client, &config, &config_dir, refresh, json).await
        }
        Command::Tags => {
            let tags = client.get_tags().await.context("Failed to fetch tags")?;
            for tag in tags {
                println!("{} ({})", sanitize_for_terminal(&tag.name), tag.article_count);
            }
            Ok(())
        }
        Command::Articles(cmd) => run_articles(&client, &config, &config_dir, cmd).await,
        Command::Resources(cmd) => run_resources(&client, cmd).await,
    }
}

// ============================================================================
// Categories
// ============================================================================

/// Categories from the session cache when fresh, otherwise from the server.
///
/// A fresh fetch is written back to the cache file for later runs.
async fn load_categories(
    client: &ApiClient,
    config: &Config,
    config_dir: &Path,
    refresh: bool,
) -> Result<Vec<CategoryRecord>> {
    let cache_path = config_dir.join("categories.json");
    let ttl = chrono::Duration::minutes(config.category_cache_ttl_minutes);
    let mut session = SessionContext::load(&cache_path, ttl);
    if refresh {
        session.invalidate();
    }

    if let Some(cached) = session.categories() {
        tracing::debug!(count = cached.len(), "Using cached categories");
        return Ok(cached.to_vec());
    }

    let records = client
        .get_categories()
        .await
        .context("Failed to fetch categories")?;

    session.store(records.clone());
    if let Err(e) = std::fs::create_dir_all(config_dir)
        .map_err(anyhow::Error::from)
        .and_then(|_| session.save(&cache_path).map_err(anyhow::Error::from))
    {
        tracing::warn!(path = %cache_path.display(), error = %e, "Failed to save category cache");
    }
    Ok(records)
}

async fn show_categories(
    client: &ApiClient,
    config: &Config,
    config_dir: &Path,
    refresh: bool,
    json: bool,
) -> Result<()> {
    let records = load_categories(client, config, config_dir, refresh).await?;
    let mut forest = build_forest(&records);
    if !forest.orphans().is_empty() {
        tracing::warn!(
            orphans = ?forest.orphans(),
            excluded = forest.excluded_count(),
            "Categories with missing parents were left out of the tree"
        );
    }
    forest.sort_by_sequence();

    if json {
        let out = serde_json::to_string_pretty(forest.roots())
            .context("Failed to encode category tree")?;
        println!("{out}");
    } else if forest.is_empty() {
        println!("No categories.");
    } else {
        for line in render_forest(&forest, terminal_width()) {
            println!("{line}");
        }
    }
    Ok(())
}

// ============================================================================
// Articles
// ============================================================================

fn print_articles(articles: &[Article]) {
    if articles.is_empty() {
        println!("No articles.");
        return;
    }
    let width = terminal_width();
    for article in articles {
        let id = article
            .id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".to_string());
        let category = article
            .category
            .as_ref()
            .map(|c| c.title.as_str())
            .unwrap_or("");
        let bin = if article.in_recycle_bin { " [bin]" } else { "" };
        let line = format!(
            "{id:>5}  {:<9}  {}  [{}]{bin}",
            article.status,
            sanitize_for_terminal(&article.title),
            sanitize_for_terminal(category),
        );
        println!("{}", truncate_to_width(&line, width));
    }
}

async fn find_article(client: &ApiClient, id: i64) -> Result<Article> {
    let articles = client
        .get_articles()
        .await
        .context("Failed to fetch articles")?;
    articles
        .into_iter()
        .find(|a| a.id == Some(id))
        .ok_or_else(|| anyhow::anyhow!("No article with id {id}"))
}

/// Look up uploaded resources by location, failing on the first unknown one.
fn pick_resources(library: &[Resource], locations: &[String]) -> Result<Vec<Resource>> {
    locations
        .iter()
        .map(|loc| {
            library
                .iter()
                .find(|r| &r.location == loc)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("No uploaded resource at '{loc}'"))
        })
        .collect()
}

async fn run_articles(
    client: &ApiClient,
    config: &Config,
    config_dir: &Path,
    cmd: ArticleCommand,
) -> Result<()> {
    match cmd {
        ArticleCommand::List {
            status,
            date,
            category,
            tag,
        } => {
            let filtered = date.is_some() || category.is_some() || tag.is_some();
            let articles = if let Some(status) = status {
                client.get_articles_by_status(status).await
            } else if filtered {
                let query = ArticleQuery {
                    status: None,
                    date,
                    category,
                    tag,
                };
                client.get_articles_by_conditions(&query).await
            } else {
                client.get_articles().await
            }
            .context("Failed to fetch articles")?;
            print_articles(&articles);
        }
        ArticleCommand::Filters => {
            let filters = client
                .get_article_filter_conditions()
                .await
                .context("Failed to fetch article filters")?;
            println!("dates:      {}", filters.dates.join(", "));
            println!("categories: {}", filters.categories.join(", "));
            println!("tags:       {}", filters.tags.join(", "));
        }
        ArticleCommand::Delete { id } => {
            client
                .delete_article(id)
                .await
                .with_context(|| format!("Failed to delete article {id}"))?;
            println!("Deleted article {id}");
        }
        ArticleCommand::SetStatus { id, status } => {
            let mut article = find_article(client, id).await?;
            if article.status == status {
                println!("Article {id} is already {status}");
                return Ok(());
            }
            article.status = status;
            let updated = client
                .update_article(&article)
                .await
                .with_context(|| format!("Failed to update article {id}"))?;
            println!(
                "'{}' is now {}",
                sanitize_for_terminal(&updated.title),
                updated.status
            );
        }
        ArticleCommand::Recycle { id, restore } => {
            let article = find_article(client, id).await?;
            let updated = client
                .move_to_recycle_bin(!restore, &article)
                .await
                .with_context(|| format!("Failed to update article {id}"))?;
            let verb = if restore { "Restored" } else { "Recycled" };
            println!("{verb} '{}'", sanitize_for_terminal(&updated.title));
        }
        ArticleCommand::New(new) => {
            let content = tokio::fs::read_to_string(&new.content_file)
                .await
                .with_context(|| {
                    format!("Failed to read content file {}", new.content_file.display())
                })?;

            let (content_images, accessories) =
                if new.images.is_empty() && new.accessories.is_empty() {
                    (Vec::new(), Vec::new())
                } else {
                    let library = client
                        .get_resources()
                        .await
                        .context("Failed to fetch resources")?;
                    (
                        pick_resources(&library, &new.images)?,
                        pick_resources(&library, &new.accessories)?,
                    )
                };

            let categories = load_categories(client, config, config_dir, false).await?;
            let composer = ArticleComposer::new(&categories, config.username.clone());
            let form = ComposeForm {
                title: new.title,
                category: new.category,
                tags: new.tags,
                abstracts: new.abstracts,
                content,
                content_images,
                accessories,
            };

            let article = if new.mode.draft {
                composer.save_as_draft(&form)
            } else {
                composer.submit(&form, new.mode.publish)
            }?;

            let created = client
                .create_article(&article)
                .await
                .context("Failed to create article")?;
            println!(
                "Article '{}' saved ({})",
                sanitize_for_terminal(&created.title),
                created.status
            );
        }
    }
    Ok(())
}

// ============================================================================
// Resources
// ============================================================================

fn print_resources(resources: &[Resource]) {
    if resources.is_empty() {
        println!("No resources.");
        return;
    }
    let width = terminal_width();
    for r in resources {
        let mark = if r.referenced { "*" } else { " " };
        let line = format!(
            "{mark} {:<10} {:>10}  {:<6} {}  ({})",
            r.upload_date,
            r.size,
            r.resource_type,
            sanitize_for_terminal(&r.original_filename),
            sanitize_for_terminal(&r.location),
        );
        println!("{}", truncate_to_width(&line, width));
    }
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt} [y/N] ");
    std::io::stdout().flush().context("Failed to write prompt")?;
    let mut answer = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("Failed to read answer")?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

async fn run_resources(client: &ApiClient, cmd: ResourceCommand) -> Result<()> {
    match cmd {
        ResourceCommand::List {
            date,
            resource_type,
            sort,
            desc,
        } => {
            let resources = if date.is_none() && resource_type.is_none() {
                client.get_resources().await
            } else {
                client
                    .get_resources_by_conditions(date.as_deref(), resource_type.as_deref())
                    .await
            }
            .context("Failed to fetch resources")?;

            let order = if desc {
                SortOrder::Descending
            } else {
                SortOrder::Ascending
            };
            let spec = sort.map(|key| SortSpec::new(key, order));
            print_resources(&sort_resources(&resources, spec));
        }
        ResourceCommand::Filters => {
            let filters = client
                .get_resource_filter_conditions()
                .await
                .context("Failed to fetch resource filters")?;
            println!("dates: {}", filters.dates.join(", "));
            println!("types: {}", filters.types.join(", "));
        }
        ResourceCommand::Delete { location, yes } => {
            let resources = client
                .get_resources()
                .await
                .context("Failed to fetch resources")?;
            let resource = resources
                .iter()
                .find(|r| r.location == location)
                .ok_or_else(|| anyhow::anyhow!("No uploaded resource at '{location}'"))?;

            let warning = deletion_warning(resource);
            if !yes {
                eprintln!("{warning}");
                if !confirm("Continue?")? {
                    println!("Cancelled.");
                    return Ok(());
                }
            } else if warning.severe {
                tracing::warn!(location = %location, "Deleting a referenced resource");
            }

            let remaining = client
                .delete_resource(&location)
                .await
                .with_context(|| format!("Failed to delete {location}"))?;
            println!("Deleted. {} resources remain.", remaining.len());
        }
        ResourceCommand::Upload { file } => {
            let bytes = tokio::fs::read(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let name = file
                .to_str()
                .ok_or_else(|| anyhow::anyhow!("Invalid UTF-8 in file path"))?;
            let resource = client
                .upload_resource(name, bytes)
                .await
                .with_context(|| format!("Failed to upload {}", file.display()))?;
            println!("Uploaded to {}", resource.location);
        }
    }
    Ok(())
}
