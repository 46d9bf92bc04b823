//! Truyen command line client
//!
//! Drives the client core against the live backends.

use anyhow::{bail, Context};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use truyen_client::comic::ComicSummary;
use truyen_client::config::ClientConfig;
use truyen_client::TruyenClient;

const USAGE: &str = "\
Usage: truyen <command> [args]

Commands:
  home                       Featured comics
  new [page]                 Newest comics
  categories                 Genre list
  genre <slug> [page]        Comics of a genre
  search <keyword> [page]    Search by title
  comic <slug>               Comic detail and chapter list
  read <slug> <chapter>      Chapter pages and neighbours
  login <email> <password>   Sign in (persisted when SESSION_FILE is set)
  logout                     Sign out
  whoami                     Current profile
  favorites                  Favorite comics
  reading [page]             Reading list";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "truyen_client=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    let config = ClientConfig::from_env().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config from env: {}, using defaults", e);
        ClientConfig::default()
    });

    let client = TruyenClient::new(config).context("Failed to build client")?;
    client.session().hydrate().await?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let arg = |i: usize| args.get(i).map(String::as_str);
    let page = |i: usize| -> anyhow::Result<u32> {
        match arg(i) {
            Some(raw) => raw.parse().with_context(|| format!("Invalid page: {}", raw)),
            None => Ok(1),
        }
    };

    match (arg(0), arg(1), arg(2)) {
        (Some("home"), _, _) => {
            client.catalog().fetch_home().await?;
            print_listing(&client.catalog().snapshot().home.data);
        }
        (Some("new"), _, _) => {
            client.catalog().fetch_new(page(1)?).await?;
            print_listing(&client.catalog().snapshot().new_comics.data);
        }
        (Some("categories"), _, _) => {
            client.catalog().fetch_categories().await?;
            for category in client.catalog().snapshot().categories.data {
                println!("{:<24} {}", category.slug, category.name);
            }
        }
        (Some("genre"), Some(slug), _) => {
            client.catalog().fetch_by_genre(slug, page(2)?).await?;
            print_listing(&client.catalog().snapshot().genre.data);
        }
        (Some("search"), Some(keyword), _) => {
            client.catalog().fetch_search(keyword, page(2)?).await?;
            print_listing(&client.catalog().snapshot().search.data);
        }
        (Some("comic"), Some(slug), _) => {
            client.catalog().fetch_comic_detail(slug).await?;
            if let Some(comic) = client.catalog().snapshot().comic.data {
                println!("{} [{:?}]", comic.summary.title, comic.summary.status);
                println!("Authors: {}", comic.authors.join(", "));
                for chapter in comic.chapter_sequence() {
                    println!("  Chapter {}", chapter.name);
                }
            }
        }
        (Some("read"), Some(slug), Some(chapter)) => {
            let reader = client.reader();
            let adjacent = reader.open(client.catalog(), slug, chapter).await?;
            if let Some(detail) = client.catalog().snapshot().chapter.data {
                for image in &detail.images {
                    println!("{:>4} {}", image.page, image.image_url);
                }
            }
            if let Some(next) = adjacent.next {
                println!("Next: {}", next.name);
            }
            if let Some(previous) = adjacent.previous {
                println!("Previous: {}", previous.name);
            }
            reader.close();
        }
        (Some("login"), Some(email), Some(password)) => {
            let user = client.session().login(email, password).await?;
            println!("Signed in as {} <{}>", user.name, user.email);
        }
        (Some("logout"), _, _) => {
            client.session().logout()?;
            println!("Signed out");
        }
        (Some("whoami"), _, _) => match client.session().snapshot().user {
            Some(user) => println!("{} <{}> ({:?})", user.name, user.email, user.role),
            None if client.session().is_authenticated() => println!("Signed in, profile unavailable"),
            None => println!("Not signed in"),
        },
        (Some("favorites"), _, _) => {
            let page = client.account().favorites_enriched().await?;
            for item in page.items {
                println!("{:<40} {}", item.entry.slug, item.title);
            }
        }
        (Some("reading"), _, _) => {
            let list = client.account().reading_list_enriched(page(1)?, 20).await?;
            for item in &list.items {
                println!(
                    "{:<40} {} (chapter {})",
                    item.entry.slug,
                    item.title,
                    item.entry.last_read_chapter.as_deref().unwrap_or("-")
                );
            }
            println!(
                "Page {}/{}",
                list.pagination.current_page, list.pagination.total_pages
            );
        }
        _ => bail!("{}", USAGE),
    }

    Ok(())
}

fn print_listing(comics: &[ComicSummary]) {
    for comic in comics {
        let latest = if comic.latest_chapter.chapter_name.is_empty() {
            "-"
        } else {
            comic.latest_chapter.chapter_name.as_str()
        };
        println!("{:<40} {} (latest {})", comic.slug, comic.title, latest);
    }
}
