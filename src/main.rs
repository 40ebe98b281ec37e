use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};

use vericv::api::{DirectoryApi, EntryUpdate, HttpApi, LoginRequest, RegisterRequest};
use vericv::config::Config;
use vericv::consts::default_db_path;
use vericv::draft::CvDraft;
use vericv::events::{self, EventBus};
use vericv::flows::{SearchStatus, SearchView, SubmitError, Submitter};
use vericv::model::VerificationBadge;
use vericv::render;
use vericv::session::{self, Session, SessionStorage, token};
use vericv::spinner::Spinner;
use vericv::{flows, logging};

#[derive(Parser)]
#[command(
    name = "vericv",
    version,
    about = "Build a CV and browse the verified professional directory."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Backend base URL (overrides VERICV_API_URL and the stored setting)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// SQLite database for the stored session and settings [default: ~/.vericv/vericv.db]
    #[arg(long, global = true)]
    db: Option<String>,

    /// Log backend calls to stderr
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Create an account and log in
    Register {
        email: String,
        /// Full name shown in the directory
        #[arg(long)]
        name: String,
        /// Password (prompted for when omitted)
        #[arg(long)]
        password: Option<String>,
    },
    /// Log in to the backend
    Login {
        email: String,
        /// Password (prompted for when omitted)
        #[arg(long)]
        password: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show the logged-in account
    Whoami,
    /// Print a blank CV draft to fill in
    Draft {
        /// Number of blank education entries
        #[arg(long, default_value_t = 1)]
        education: usize,
        /// Number of blank experience entries
        #[arg(long, default_value_t = 1)]
        experience: usize,
    },
    /// Create a CV from a draft file, attach its entries and join the directory
    Submit { path: PathBuf },
    /// Replace the headline, summary and visibility of an existing CV
    UpdateCv { cv_id: i64, path: PathBuf },
    /// Delete a CV and its entries
    DeleteCv { cv_id: i64 },
    /// Search the directory (no keyword lists everyone)
    Search { keyword: Option<String> },
    /// List profiles with a given verification badge
    Badge { level: VerificationBadge },
    /// Show a user's profile and CV
    Profile { user_id: i64 },
    /// Show your own directory entry and CV
    Me,
    /// Add yourself to the directory
    Join,
    /// Remove yourself from the directory
    Leave,
    /// Show or hide your directory entry
    Visibility { state: Visibility },
    /// Change the headline or location on your directory entry
    UpdateEntry {
        #[arg(long)]
        headline: Option<String>,
        #[arg(long)]
        location: Option<String>,
    },
    /// Read or change stored settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Visibility {
    On,
    Off,
}

#[derive(Subcommand)]
enum ConfigAction {
    Get { key: String },
    Set { key: String, value: String },
    Unset { key: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(logging::level_for(cli.verbose))?;

    let db_path = match cli.db {
        Some(path) => path,
        None => {
            let path = default_db_path();
            if let Some(dir) = path.parent() {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("failed to create {}", dir.display()))?;
            }
            path.to_string_lossy().into_owned()
        }
    };

    let config = Config::open(&db_path)?;
    let storage = SessionStorage::open(&db_path)?;
    let api_url = config.resolve_api_url(cli.api_url.as_deref())?;
    let auth = Session::from_storage(&storage, &api_url)?;
    tracing::debug!(%api_url, authenticated = auth.is_authenticated(), "starting");
    let api: Arc<dyn DirectoryApi> = Arc::new(HttpApi::new(&api_url, auth.clone()));

    match cli.command {
        Command::Register {
            email,
            name,
            password,
        } => {
            let password = session::password_or_prompt(password)?;
            let request = RegisterRequest {
                email,
                password,
                full_name: name,
            };
            let account = Spinner::during(
                "registering",
                session::register(api.as_ref(), &storage, &api_url, &request),
            )
            .await?;
            println!("✓ Registered and logged in as {}", account.full_name);
        }
        Command::Login { email, password } => {
            let password = session::password_or_prompt(password)?;
            let request = LoginRequest { email, password };
            let account = Spinner::during(
                "logging in",
                session::login(api.as_ref(), &storage, &api_url, &request),
            )
            .await?;
            println!("✓ Logged in as {}", account.full_name);
        }
        Command::Logout => {
            session::logout(&storage, &api_url)?;
            println!("✓ Logged out from {api_url}.");
        }
        Command::Whoami => match storage.get(&api_url)? {
            Some(account) => {
                let claims = token::decode_claims(&account.token).ok();
                print!("{}", render::render_account(&api_url, &account, claims.as_ref()));
            }
            None => println!("not logged in to {api_url}"),
        },
        Command::Draft {
            education,
            experience,
        } => {
            let mut draft = CvDraft::default();
            for _ in 1..education {
                draft = draft.push_education();
            }
            for _ in 1..experience {
                draft = draft.push_experience();
            }
            println!("{}", serde_json::to_string_pretty(&draft)?);
        }
        Command::Submit { path } => {
            require_login(&auth)?;
            let draft = CvDraft::load(&path)?;
            submit(api, &draft).await?;
        }
        Command::UpdateCv { cv_id, path } => {
            require_login(&auth)?;
            let draft = CvDraft::load(&path)?;
            draft.validate()?;
            let cv = Spinner::during("updating", api.update_cv(cv_id, &draft.profile))
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message("Failed to update CV.")))?;
            println!("✓ CV #{} updated: {}", cv.id, cv.headline);
        }
        Command::DeleteCv { cv_id } => {
            require_login(&auth)?;
            Spinner::during("deleting", api.delete_cv(cv_id))
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message("Failed to delete CV.")))?;
            println!("✓ CV #{cv_id} deleted.");
        }
        Command::Search { keyword } => {
            let mut view = SearchView::new();
            let keyword = keyword.unwrap_or_default();
            Spinner::during("searching", view.search(api.as_ref(), &keyword)).await;
            print_search(&view)?;
        }
        Command::Badge { level } => {
            let mut view = SearchView::new();
            Spinner::during("searching", view.filter_by_badge(api.as_ref(), level)).await;
            print_search(&view)?;
        }
        Command::Profile { user_id } => {
            let view =
                Spinner::during("loading profile", flows::load_profile(api.as_ref(), user_id))
                    .await?;
            print!("{}", render::render_profile(&view));
        }
        Command::Me => {
            require_login(&auth)?;
            let view =
                Spinner::during("loading profile", flows::load_own_profile(api.as_ref())).await?;
            print!("{}", render::render_profile(&view));
        }
        Command::Join => {
            require_login(&auth)?;
            api.join_directory()
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message("Failed to join directory.")))?;
            println!("✓ Joined the directory.");
        }
        Command::Leave => {
            require_login(&auth)?;
            api.leave_directory()
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message("Failed to leave directory.")))?;
            println!("✓ Left the directory.");
        }
        Command::Visibility { state } => {
            require_login(&auth)?;
            let visible = matches!(state, Visibility::On);
            let entry = api
                .set_visibility(visible)
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message("Failed to update visibility.")))?;
            let word = if entry.is_visible { "visible" } else { "hidden" };
            println!("✓ Profile is now {word}.");
        }
        Command::UpdateEntry { headline, location } => {
            require_login(&auth)?;
            if headline.is_none() && location.is_none() {
                bail!("nothing to update: pass --headline and/or --location");
            }
            let entry = api
                .update_entry(&EntryUpdate { headline, location })
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message("Failed to update entry.")))?;
            println!("✓ Directory entry updated.");
            println!("  {}", render::profile_line(&entry));
        }
        Command::Config { action } => match action {
            ConfigAction::Get { key } => match config.get(&key)? {
                Some(value) => println!("{value}"),
                None => println!("{key} is not set"),
            },
            ConfigAction::Set { key, value } => {
                config.set(&key, &value)?;
                println!("✓ {key} = {value}");
            }
            ConfigAction::Unset { key } => {
                config.remove(&key)?;
                println!("✓ {key} unset");
            }
        },
    }

    Ok(())
}

async fn submit(api: Arc<dyn DirectoryApi>, draft: &CvDraft) -> Result<()> {
    let bus = Arc::new(EventBus::default());
    let rx = bus.subscribe();
    let printer = tokio::spawn(async move {
        let skipped = events::drain(rx, |event| {
            eprintln!("{}", render::render_event(&event));
        })
        .await;
        if skipped > 0 {
            eprintln!("  ({skipped} progress update(s) not shown)");
        }
    });

    let submitter = Submitter::new(api).with_events(Arc::clone(&bus));
    drop(bus);
    let outcome = submitter.submit(draft).await;
    drop(submitter);
    let _ = printer.await;

    match outcome {
        Ok(receipt) => {
            println!("{}", render::render_receipt(&receipt));
            Ok(())
        }
        Err(SubmitError::Invalid(errors)) => {
            for e in &errors.0 {
                eprintln!("  ✗ {}: {}", e.field, e.message);
            }
            bail!("draft is invalid ({} problem(s)); nothing was sent", errors.0.len());
        }
        Err(e) => Err(e.into()),
    }
}

fn print_search(view: &SearchView) -> Result<()> {
    if let SearchStatus::Failed(message) = view.status() {
        bail!("{message}");
    }
    print!("{}", render::render_search(view));
    Ok(())
}

fn require_login(session: &Session) -> Result<()> {
    if !session.is_authenticated() {
        bail!("not logged in. Run `vericv login <email>` first.");
    }
    Ok(())
}
