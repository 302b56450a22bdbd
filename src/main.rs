use anyhow::{bail, Result};
use cinetheque::api::{MediaApi, MediaStore};
use cinetheque::collection::{CollectionView, ListMode};
use cinetheque::config::Configuration;
use cinetheque::controller::{LoadState, MutationOutcome, PointerEvent};
use cinetheque::detail::DetailView;
use cinetheque::format::{
    featured_actors, format_currency, format_date, format_duration, format_series_duration,
    poster_url, rating_tooltip, release_year, watch_count_label, PosterSize,
};
use cinetheque::http::HttpClient;
use cinetheque::models::{CatalogRecord, CreateEntry, LocalEntry, MediaKind, Rating, SortKey};
use cinetheque::search::{route_for, SearchBackend, SearchClient};
use clap::{Parser, Subcommand};
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List local entries
    List {
        /// movie or series
        kind: MediaKind,
        /// Show the wishlist instead of all entries
        #[arg(long, conflicts_with = "rated")]
        wishlist: bool,
        /// Show rated entries only
        #[arg(long)]
        rated: bool,
        /// lastModified, titleAsc, ratingDesc or ratingAsc
        #[arg(long, default_value = "lastModified")]
        sort: SortKey,
        /// Keep only entries rated exactly this many stars (0 for all)
        #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=5))]
        rating: u8,
        /// Number of extra pages to reveal
        #[arg(long, default_value_t = 0)]
        more: usize,
    },
    /// Show catalog details merged with the local entry
    Show { kind: MediaKind, tmdb_id: i64 },
    /// Rate a title from 0.5 to 5
    Rate {
        kind: MediaKind,
        tmdb_id: i64,
        rating: f64,
    },
    /// Add a title to the wishlist or remove it
    Wishlist { kind: MediaKind, tmdb_id: i64 },
    /// Count one more viewing, or one less with --undo
    Watch {
        kind: MediaKind,
        tmdb_id: i64,
        #[arg(long)]
        undo: bool,
    },
    /// Save a review on a title that already has a local entry
    Review {
        kind: MediaKind,
        tmdb_id: i64,
        text: String,
    },
    /// Create a local entry by title
    Add {
        kind: MediaKind,
        title: String,
        #[arg(long)]
        tmdb_id: Option<i64>,
    },
    /// Delete a local entry by its local id
    Remove { kind: MediaKind, id: i64 },
    /// Search the catalog
    Search {
        query: String,
        /// Restrict to movie or series
        #[arg(long)]
        kind: Option<MediaKind>,
        #[arg(long)]
        limit: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(&cli.log_level)
        .init();

    let config = Configuration::load(&cli.config)?;
    info!("Using media backend at {}", config.base_url());

    let http = HttpClient::new(config.base_url(), config.request_timeout())?;

    match cli.command {
        Command::List {
            kind,
            wishlist,
            rated,
            sort,
            rating,
            more,
        } => {
            let store = MediaApi::new(http, kind);
            let mode = match (wishlist, rated) {
                (true, _) => ListMode::Wishlist,
                (_, true) => ListMode::Rated,
                _ => ListMode::All,
            };
            let mut view = CollectionView::from_config(kind, mode, &config);
            view.load(&store).await;
            view.set_sort(sort);
            view.set_rating_filter(rating);
            for _ in 0..more {
                view.show_more();
            }
            print_collection(&view, config.poster_size())?;
        }
        Command::Show { kind, tmdb_id } => {
            let store = MediaApi::new(http, kind);
            let view = open_detail(&store, tmdb_id).await?;
            print_detail(&view, config.poster_size());
        }
        Command::Rate {
            kind,
            tmdb_id,
            rating,
        } => {
            let rating = Rating::new(rating)?;
            let store = MediaApi::new(http, kind);
            let mut view = open_detail(&store, tmdb_id).await?;
            let outcome = view.rate(&store, rating).await;
            report(&view, outcome)?;
            println!("{}", rating_tooltip(view.user_rating()));
        }
        Command::Wishlist { kind, tmdb_id } => {
            let store = MediaApi::new(http, kind);
            let mut view = open_detail(&store, tmdb_id).await?;
            let outcome = view.toggle_wishlist(&store).await;
            report(&view, outcome)?;
            let in_wishlist = view.local().is_some_and(|l| l.wishlist);
            println!("{}", if in_wishlist { "Dans ma liste" } else { "Retiré de la liste" });
        }
        Command::Watch {
            kind,
            tmdb_id,
            undo,
        } => {
            let store = MediaApi::new(http, kind);
            let mut view = open_detail(&store, tmdb_id).await?;
            let mut event = if undo {
                PointerEvent::context_menu()
            } else {
                PointerEvent::primary()
            };
            let outcome = view.toggle_watched(&store, &mut event).await;
            report(&view, outcome)?;
            let (count, watched) = view
                .local()
                .map(|l| (l.view_count, l.watched))
                .unwrap_or((0, false));
            println!("{}", watch_count_label(kind, count, watched));
        }
        Command::Review {
            kind,
            tmdb_id,
            text,
        } => {
            let store = MediaApi::new(http, kind);
            let mut view = open_detail(&store, tmdb_id).await?;
            if !view.has_local_entry() {
                bail!("Rate, watch or wishlist this {} before reviewing it", kind);
            }
            let outcome = view.save_review(&store, &text).await;
            report(&view, outcome)?;
        }
        Command::Add {
            kind,
            title,
            tmdb_id,
        } => {
            let store = MediaApi::new(http, kind);
            let created = store
                .create(CreateEntry {
                    title,
                    tmdb_id,
                    ..Default::default()
                })
                .await?;
            print_entry(&created, config.poster_size());
        }
        Command::Remove { kind, id } => {
            let store = MediaApi::new(http, kind);
            let entry = match store.get(id).await {
                Err(e) if e.is_not_found() => bail!("Aucune entrée #{} pour les {}s", id, kind),
                result => result?,
            };
            store.delete(id).await?;
            println!("Supprimé : {}", entry.title);
        }
        Command::Search { query, kind, limit } => {
            let client = SearchClient::new(http);
            let limit = limit.unwrap_or_else(|| config.search_limit());
            let response = match kind {
                Some(kind) => client.search_kind(kind, &query, limit).await?,
                None => client.search(query, limit).await?,
            };
            for result in &response.results {
                print_search_result(result);
            }
            println!("{} / {} résultats", response.results.len(), response.total);
        }
    }

    Ok(())
}

async fn open_detail(store: &dyn MediaStore, tmdb_id: i64) -> Result<DetailView> {
    let view = DetailView::open(store, tmdb_id).await;
    if let LoadState::Error(message) = view.state() {
        bail!("{}", message);
    }
    Ok(view)
}

fn report(view: &DetailView, outcome: MutationOutcome) -> Result<()> {
    match outcome {
        MutationOutcome::Saved => Ok(()),
        MutationOutcome::Ignored => {
            println!("Rien à modifier");
            Ok(())
        }
        MutationOutcome::Failed(_) => {
            bail!("{}", view.last_error().unwrap_or("Échec de la sauvegarde"))
        }
    }
}

fn print_collection(view: &CollectionView, size: PosterSize) -> Result<()> {
    match view.state() {
        LoadState::Loading => Ok(()),
        LoadState::Error(message) => bail!("{}", message),
        LoadState::Ready(_) => {
            let visible = view.visible();
            if visible.is_empty() {
                println!("{}", view.empty_message());
                return Ok(());
            }
            println!("Tri : {}", view.filters().sort.label());
            for entry in &visible {
                print_entry(entry, size);
            }
            if view.has_more() {
                println!("Voir plus ({} restants)", view.remaining());
            }
            Ok(())
        }
    }
}

fn print_entry(entry: &LocalEntry, size: PosterSize) {
    let wishlist = if entry.wishlist { " [envie]" } else { "" };
    println!(
        "#{:<5} {}{}  {}  vu {} fois  {}",
        entry.id,
        entry.title,
        wishlist,
        rating_tooltip(entry.rating),
        entry.view_count,
        poster_url(size, entry.poster_path()),
    );
}

fn print_detail(view: &DetailView, size: PosterSize) {
    let Some(record) = view.record() else {
        return;
    };

    println!("{} ({})", record.title, release_year(record.release()));
    if let Some(tagline) = record.tagline.as_deref().filter(|t| !t.is_empty()) {
        println!("« {} »", tagline);
    }
    if let Some(date) = record.release() {
        println!("Sortie : {}", format_date(date));
    }
    match record.kind {
        MediaKind::Movie => {
            if let Some(runtime) = record.runtime {
                println!("Durée : {}", format_duration(runtime));
            }
        }
        MediaKind::Series => {
            if let Some(runtime) = record.episode_run_time.first() {
                println!("Épisodes : {}", format_series_duration(*runtime));
            }
            if let (Some(seasons), Some(episodes)) =
                (record.number_of_seasons, record.number_of_episodes)
            {
                println!("{} saisons, {} épisodes", seasons, episodes);
            }
        }
    }
    if let Some(director) = &record.director {
        println!("Réalisation : {}", director);
    }
    if !record.genres.is_empty() {
        let genres: Vec<&str> = record.genres.iter().map(|g| g.name.as_str()).collect();
        println!("Genres : {}", genres.join(", "));
    }
    if let Some(credits) = &record.credits {
        let actors: Vec<String> = featured_actors(&credits.cast)
            .into_iter()
            .map(|a| a.name)
            .collect();
        if !actors.is_empty() {
            println!("Avec : {}", actors.join(", "));
        }
    }
    if let Some(budget) = record.budget.filter(|b| *b > 0.0) {
        println!("Budget : {}", format_currency(budget));
    }
    if let Some(revenue) = record.revenue.filter(|r| *r > 0.0) {
        println!("Recettes : {}", format_currency(revenue));
    }
    println!("Affiche : {}", poster_url(size, record.poster_path.as_deref()));
    if let Some(overview) = record.overview.as_deref().filter(|o| !o.is_empty()) {
        println!("\n{}\n", overview);
    }

    print_local_status(view, record);
}

fn print_local_status(view: &DetailView, record: &CatalogRecord) {
    println!("Ma note : {}", rating_tooltip(view.user_rating()));
    match view.local() {
        Some(local) => {
            println!("{}", watch_count_label(record.kind, local.view_count, local.watched));
            if local.wishlist {
                println!("Dans ma liste");
            }
            if !view.user_review().is_empty() {
                println!("Ma critique : {}", view.user_review());
            }
        }
        None => println!("Pas encore dans ma collection"),
    }
}

fn print_search_result(result: &CatalogRecord) {
    let status = match &result.local {
        Some(local) if local.wishlist => " [envie]",
        Some(_) => " [vu]",
        None => "",
    };
    println!(
        "{:<8} {} ({}){}  {}",
        result.kind.label(),
        result.title,
        release_year(result.release()),
        status,
        route_for(result),
    );
}
