use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use std::io::Read as _;
use std::path::{Path, PathBuf};
use std::time::Duration;

use applistash::dispatch::Dispatcher;
use applistash::dom::HtmlPage;
use applistash::gateway::{DEFAULT_API_BASE, SaveGateway};
use applistash::models::{JobData, User};
use applistash::storage::UserStore;

const PAGE_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) applistash/0.1";

#[derive(Parser)]
#[command(name = "applistash")]
#[command(about = "Capture job postings from LinkedIn, Indeed, Glassdoor and more, and save them to your AppliStash dashboard")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check whether a URL looks like a job page and which extractor handles it
    Detect {
        url: String,
    },

    /// Extract job data from a page
    Extract {
        /// URL of the job page
        url: String,

        /// Read the page HTML from a file
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Fetch the page over HTTP (default reads HTML from stdin)
        #[arg(long)]
        fetch: bool,

        /// Print JSON instead of a human summary
        #[arg(long)]
        json: bool,
    },

    /// Extract job data and save it to the dashboard
    Save {
        /// URL of the job page
        url: String,

        /// Read the page HTML from a file
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Fetch the page over HTTP (default reads HTML from stdin)
        #[arg(long)]
        fetch: bool,

        /// Dashboard API base URL (also APPLISTASH_API)
        #[arg(long)]
        api_base: Option<String>,
    },

    /// Store the dashboard login used when saving
    Login {
        email: String,

        /// Display name shown in the overlay
        #[arg(short, long)]
        name: Option<String>,

        /// API token, if the dashboard issued one
        #[arg(short, long)]
        token: Option<String>,
    },

    /// Forget the stored login
    Logout,

    /// Show the stored login
    Whoami,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Detect { url } => {
            let dispatcher = Dispatcher::new()?;
            match dispatcher.detect(&url) {
                Some(kind) => println!("{}", kind.name()),
                None => println!("Not a supported job page."),
            }
        }

        Commands::Extract {
            url,
            file,
            fetch,
            json,
        } => {
            let html = read_page(&url, file.as_deref(), fetch)?;
            let page = HtmlPage::parse(&url, &html);
            let dispatcher = Dispatcher::new()?;
            let job = dispatcher
                .job_data(&page)
                .ok_or_else(|| anyhow!("No job data could be extracted from {url}"))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&job)?);
            } else {
                print_job(&job);
            }
        }

        Commands::Save {
            url,
            file,
            fetch,
            api_base,
        } => {
            let store = UserStore::open()?;
            let user = store
                .load_user()?
                .ok_or_else(|| anyhow!("Not logged in. Run 'applistash login' first."))?;

            let html = read_page(&url, file.as_deref(), fetch)?;
            let page = HtmlPage::parse(&url, &html);
            let dispatcher = Dispatcher::new()?;
            let job = dispatcher
                .job_data(&page)
                .ok_or_else(|| anyhow!("No job data could be extracted from {url}"))?;

            let api_base = api_base
                .or_else(|| std::env::var("APPLISTASH_API").ok())
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
            SaveGateway::new(api_base)?.save(&job, &user)?;
            println!("Saved \"{}\" at {} ({})", job.title, job.company, job.source);
        }

        Commands::Login { email, name, token } => {
            let store = UserStore::open()?;
            let name = name.unwrap_or_else(|| {
                email.split('@').next().unwrap_or(&email).to_string()
            });
            let user = User {
                email: email.clone(),
                name: name.clone(),
                token,
            };
            store.save_user(&user)?;
            println!("Logged in as {} ({})", name, email);
        }

        Commands::Logout => {
            let store = UserStore::open()?;
            store.clear()?;
            println!("Logged out.");
        }

        Commands::Whoami => {
            let store = UserStore::open()?;
            match store.load_user()? {
                Some(user) => {
                    println!("{} <{}>", user.name, user.email);
                    if user.token.is_some() {
                        println!("API token: set");
                    }
                }
                None => println!("Not logged in."),
            }
        }
    }

    Ok(())
}

fn read_page(url: &str, file: Option<&Path>, fetch: bool) -> Result<String> {
    if let Some(path) = file {
        return std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read page file: {}", path.display()));
    }

    if fetch {
        let client = reqwest::blocking::Client::builder()
            .user_agent(PAGE_USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()?;
        let response = client.get(url).send()
            .with_context(|| format!("Failed to fetch {url}"))?;
        if !response.status().is_success() {
            return Err(anyhow!("{} returned {}", url, response.status()));
        }
        return Ok(response.text()?);
    }

    let mut html = String::new();
    std::io::stdin()
        .read_to_string(&mut html)
        .context("Failed to read page HTML from stdin")?;
    Ok(html)
}

fn print_job(job: &JobData) {
    println!("Title: {}", job.title);
    println!("Company: {}", job.company);
    if !job.location.is_empty() {
        println!("Location: {}", job.location);
    }
    println!("Source: {}", job.source);
    println!("URL: {}", job.url);
    if !job.description.is_empty() {
        println!("\n--- Description ---\n{}", job.description);
    }
}
