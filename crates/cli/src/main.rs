use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use data_loader::LookupError;
use rand::rngs::StdRng;
use rand::SeedableRng;
use server::{Config, MovieRecommendation, RecommendationService};
use std::path::PathBuf;
use std::time::Instant;
use tracing::debug;

/// How many close titles to suggest when a lookup misses
const SUGGESTION_LIMIT: usize = 5;

/// CineMatch - content-based movie recommendations
#[derive(Parser)]
#[command(name = "cinematch")]
#[command(about = "Find movies similar to one you already like", long_about = None)]
struct Cli {
    /// Directory holding movies.dat and similarity.dat
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    /// Catalog artifact (overrides --data-dir and MOVIES_PATH)
    #[arg(long, global = true)]
    movies: Option<PathBuf>,

    /// Similarity matrix artifact (overrides --data-dir and SIMILARITY_PATH)
    #[arg(long, global = true)]
    similarity: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recommend movies similar to a title
    Recommend {
        /// Exact title of a movie you like
        #[arg(long)]
        title: String,

        /// Number of recommendations (defaults to TOP_N_RECOMMENDATIONS)
        #[arg(long)]
        limit: Option<usize>,

        /// Show similarity scores
        #[arg(long)]
        scores: bool,

        /// Resolve poster URLs (requires TMDB_API_KEY)
        #[arg(long)]
        posters: bool,
    },

    /// Search titles by case-insensitive substring
    Search {
        #[arg(long)]
        query: String,

        #[arg(long, default_value = "10")]
        limit: usize,
    },

    /// Show catalog and similarity statistics
    Stats,

    /// Pick random titles from the catalog
    Random {
        #[arg(long, default_value = "5")]
        count: usize,

        /// Seed for a reproducible pick
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Average pairwise similarity of a set of titles
    Diversity {
        /// Repeat for each title
        #[arg(long = "title", required = true)]
        titles: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    println!(
        "Loading catalog from {}...",
        config.movies_path.display()
    );
    let start = Instant::now();
    let catalog = config.load_catalog()?;
    println!(
        "{} Loaded {} movies in {:?}",
        "✓".green(),
        catalog.size(),
        start.elapsed()
    );

    let service = RecommendationService::new(catalog, config.poster_resolver()?)
        .with_max_concurrent_posters(config.poster_concurrency);

    match cli.command {
        Commands::Recommend {
            title,
            limit,
            scores,
            posters,
        } => {
            let k = limit.unwrap_or(config.top_n_recommendations);
            handle_recommend(&service, &title, k, scores, posters).await?
        }
        Commands::Search { query, limit } => handle_search(&service, &query, limit),
        Commands::Stats => handle_stats(&service),
        Commands::Random { count, seed } => handle_random(&service, count, seed),
        Commands::Diversity { titles } => handle_diversity(&service, &titles)?,
    }

    Ok(())
}

/// Environment configuration with command-line path overrides applied
fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::from_env().context("Failed to read configuration")?;
    if let Some(dir) = &cli.data_dir {
        config = config.with_data_dir(dir);
    }
    if let Some(movies) = &cli.movies {
        config.movies_path = movies.clone();
    }
    if let Some(similarity) = &cli.similarity {
        config.similarity_path = similarity.clone();
    }
    debug!(
        movies = %config.movies_path.display(),
        similarity = %config.similarity_path.display(),
        "Resolved artifact paths"
    );
    Ok(config)
}

/// Handle the 'recommend' command
async fn handle_recommend(
    service: &RecommendationService,
    title: &str,
    k: usize,
    scores: bool,
    posters: bool,
) -> Result<()> {
    let result = if posters {
        service.recommend_with_posters(title, k).await
    } else {
        service.recommend(title, k)
    };

    let recommendations = match result {
        Ok(recs) => recs,
        Err(err) => {
            if err.downcast_ref::<LookupError>().is_some() {
                print_suggestions(service, title);
            }
            return Err(err);
        }
    };

    print_recommendations(title, &recommendations, scores);
    Ok(())
}

/// Handle the 'search' command
fn handle_search(service: &RecommendationService, query: &str, limit: usize) {
    let matches = service.search(query, limit);

    println!("{}", format!("Search results for '{}':", query).bold().blue());
    if matches.is_empty() {
        println!("  {}", "No matching titles".yellow());
        return;
    }
    for title in &matches {
        println!("  {} {}", "•".green(), title);
    }
}

/// Handle the 'stats' command
fn handle_stats(service: &RecommendationService) {
    let stats = service.statistics();
    let (rows, cols) = stats.matrix_shape;

    println!("{}", "Catalog statistics:".bold().blue());
    println!("{}Total movies: {}", "• ".cyan(), stats.total_movies);
    println!("{}Matrix shape: {} x {}", "• ".cyan(), rows, cols);
    println!("{}Average similarity: {:.4}", "• ".cyan(), stats.avg_similarity);
    println!("{}Max similarity: {:.4}", "• ".cyan(), stats.max_similarity);
    match stats.min_positive_similarity {
        Some(min) => println!("{}Min positive similarity: {:.4}", "• ".cyan(), min),
        None => println!("{}Min positive similarity: n/a", "• ".cyan()),
    }
}

/// Handle the 'random' command
fn handle_random(service: &RecommendationService, count: usize, seed: Option<u64>) {
    let titles: Vec<String> = match seed {
        Some(seed) => service
            .catalog()
            .sample_titles(count, &mut StdRng::seed_from_u64(seed))
            .into_iter()
            .map(str::to_string)
            .collect(),
        None => service.random_titles(count),
    };

    println!("{}", "Random picks:".bold().blue());
    for title in &titles {
        println!("  {} {}", "•".green(), title);
    }
}

/// Handle the 'diversity' command
fn handle_diversity(service: &RecommendationService, titles: &[String]) -> Result<()> {
    let score = service.diversity(titles)?;

    println!(
        "{} {:.4} across {} titles",
        "Diversity score:".bold().blue(),
        score,
        titles.len()
    );
    Ok(())
}

/// Offer close titles after a lookup miss
fn print_suggestions(service: &RecommendationService, title: &str) {
    let suggestions = service.search(title, SUGGESTION_LIMIT);
    if suggestions.is_empty() {
        return;
    }
    eprintln!("{}", "Did you mean:".yellow());
    for suggestion in &suggestions {
        eprintln!("  - {}", suggestion);
    }
}

fn print_recommendations(title: &str, recommendations: &[MovieRecommendation], scores: bool) {
    println!(
        "{}",
        format!("Because you liked '{}':", title).bold().blue()
    );
    if recommendations.is_empty() {
        println!("  {}", "No recommendations".yellow());
        return;
    }

    for (i, rec) in recommendations.iter().enumerate() {
        let rank = (i + 1).to_string();
        if scores {
            println!("{}. {} - Score: {:.3}", rank.green(), rec.title, rec.score);
        } else {
            println!("{}. {}", rank.green(), rec.title);
        }
        if let Some(poster) = &rec.poster_url {
            println!("   Poster: {}", poster.dimmed());
        }
    }
}
