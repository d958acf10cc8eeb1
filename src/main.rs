//! SkillSwap CLI
//!
//! Command-line front end for the skill-exchange directory. Every screen of
//! the app is reachable as a subcommand; the session survives between runs
//! through the local cache.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use skillswap::paths::{paths_from_env, PathsConfig};
use skillswap::{Backend, Settings, SkillSwapPaths};
use skillswap_app::screens::{
    more_label, skill_preview, EditProfileScreen, FavoritesFeed, HomeScreen, InboxScreen,
    LoginScreen, OnboardingForm, ProfileScreen, SignupScreen, SkillFeed, SkillKind, TeacherScreen,
};
use skillswap_app::{AppError, Notice};
use skillswap_core::{SkillEdit, UserId, UserProfile, UserRecord};
use skillswap_session::SessionContext;
use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "skillswap")]
#[command(about = "SkillSwap - teach what you know, learn what you don't.", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path (defaults to system config directory)
    #[arg(short, long)]
    config: Option<String>,

    /// Base URL of the REST database (overrides config)
    #[arg(long, env = "SKILLSWAP_DATABASE_URL")]
    database_url: Option<String>,

    /// Web API key of the authentication service (overrides config)
    #[arg(long, env = "SKILLSWAP_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Data directory (overrides config and system default)
    #[arg(long, env = "SKILLSWAP_DATA_DIR")]
    data_dir: Option<String>,

    /// Session cache directory (overrides config and system default)
    #[arg(long, env = "SKILLSWAP_CACHE_DIR")]
    cache_dir: Option<String>,

    /// Keep everything on this machine instead of talking to the servers
    #[arg(long)]
    offline: bool,

    /// Log level (overrides config)
    #[arg(short, long)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in with email and password
    Login {
        email: String,

        /// Password (read from stdin when omitted)
        #[arg(long, env = "SKILLSWAP_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Create an account; a verification email is sent
    ///
    /// With `--name`, the profile is written right away, as the onboarding
    /// step of the app does.
    Signup {
        email: String,

        #[arg(long)]
        password: String,

        /// Password again
        #[arg(long)]
        confirm: String,

        #[command(flatten)]
        onboarding: OnboardingArgs,
    },

    /// Sign out and clear the local session
    Logout,

    /// Show who is signed in
    Whoami,

    /// Mark an offline account's email as verified
    Verify { email: String },

    /// Write the first profile of the signed-in account
    Onboard {
        #[command(flatten)]
        onboarding: OnboardingArgs,
    },

    /// Show or edit your profile
    Profile {
        #[command(subcommand)]
        action: Option<ProfileAction>,
    },

    /// Achievements, topics and featured teachers
    Home {
        /// Filter topics by name
        #[arg(short, long)]
        search: Option<String>,
    },

    /// A teacher's profile and ratings
    Teacher {
        uid: UserId,

        /// Show the whole bio
        #[arg(long)]
        full_bio: bool,

        /// Show every rating
        #[arg(long)]
        all_ratings: bool,

        /// JSON output
        #[arg(short, long)]
        json: bool,
    },

    /// Rate a teacher from 1 to 5 stars
    Rate {
        uid: UserId,
        stars: i64,

        #[arg(short, long, default_value = "")]
        comment: String,
    },

    /// Add or remove a teacher from your favorites
    Favorite { uid: UserId },

    /// List your favorite teachers
    Favorites {
        /// Keep listening for changes
        #[arg(short, long)]
        watch: bool,
    },

    /// Users matching a skill
    Skill {
        skill: String,

        /// Match learners too (exact spelling) instead of teachers only
        #[arg(long)]
        anyone: bool,

        /// Keep listening for changes
        #[arg(short, long)]
        watch: bool,
    },

    /// Send a connection request to a teacher
    Connect { uid: UserId },

    /// Notifications you received
    Inbox {
        /// JSON output
        #[arg(short, long)]
        json: bool,
    },

    /// Show system paths and directories
    Paths,

    /// Show or write the effective configuration
    Config {
        /// Write it to the config file
        #[arg(long)]
        save: bool,
    },
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Show your profile
    Show {
        /// JSON output
        #[arg(short, long)]
        json: bool,
    },

    /// Change fields of your profile
    Edit {
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        bio: Option<String>,

        #[arg(long)]
        image: Option<String>,

        #[arg(long, conflicts_with = "image")]
        clear_image: bool,

        /// Skill to start teaching (repeatable)
        #[arg(long = "teach")]
        teach: Vec<String>,

        /// Skill to stop teaching (repeatable)
        #[arg(long = "unteach")]
        unteach: Vec<String>,

        /// Skill to start learning (repeatable)
        #[arg(long = "learn")]
        learn: Vec<String>,

        /// Skill to stop learning (repeatable)
        #[arg(long = "unlearn")]
        unlearn: Vec<String>,
    },
}

#[derive(clap::Args, Default)]
struct OnboardingArgs {
    #[arg(long)]
    name: Option<String>,

    #[arg(long, default_value = "")]
    bio: String,

    #[arg(long)]
    image: Option<String>,

    /// Skills you can teach, comma-separated
    #[arg(long, default_value = "")]
    teach: String,

    /// Skills you want to learn, comma-separated
    #[arg(long, default_value = "")]
    learn: String,
}

impl OnboardingArgs {
    fn form(&self) -> Option<OnboardingForm> {
        let name = self.name.clone()?;
        Some(OnboardingForm {
            name,
            bio: self.bio.clone(),
            image: self.image.clone(),
            skills_to_teach: self.teach.clone(),
            skills_to_learn: self.learn.clone(),
        })
    }
}

/// Initialize logging
fn init_logging(level: &str) {
    let default_filter = ["skillswap", "skillswap_app", "skillswap_session", "skillswap_store"]
        .iter()
        .map(|target| format!("{}={}", target, level))
        .collect::<Vec<_>>()
        .join(",");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Defaults, then config file, then environment, then CLI flags
fn resolve_settings(cli: &Cli, config_path: &std::path::Path) -> Result<Settings> {
    let mut settings = Settings::load(config_path)?;

    if let Some(ref url) = cli.database_url {
        settings.store.database_url = Some(url.clone());
    }
    if let Some(ref key) = cli.api_key {
        settings.auth.api_key = Some(key.clone());
    }
    if let Some(ref level) = cli.log_level {
        settings.log_level = level.clone();
    }
    if cli.offline {
        settings.offline = true;
    }
    Ok(settings)
}

fn resolve_paths(cli: &Cli, settings: &Settings) -> Result<SkillSwapPaths> {
    let overrides = PathsConfig {
        data_dir: cli.data_dir.as_ref().map(PathBuf::from),
        cache_dir: cli.cache_dir.as_ref().map(PathBuf::from),
        config_dir: None,
    };
    let overrides = overrides.or(&paths_from_env()).or(&settings.paths);

    let paths = overrides.apply_to(SkillSwapPaths::new()?);
    paths.ensure_directories()?;
    Ok(paths)
}

fn config_file(cli: &Cli) -> Result<PathBuf> {
    if let Some(ref path) = cli.config {
        return Ok(PathBuf::from(path));
    }
    let defaults = paths_from_env().apply_to(SkillSwapPaths::new()?);
    Ok(defaults.default_config_file())
}

fn read_password() -> Result<String> {
    eprint!("Password: ");
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read password")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn print_notice(notice: &Notice) {
    println!("{}", notice);
}

fn print_card(record: &UserRecord, average: Option<String>) {
    let (teaches, more) = skill_preview(&record.profile.skills_to_teach);
    let mut line = format!("{}  {}", record.id, record.profile.name);
    if let Some(average) = average {
        line.push_str(&format!("  ({} / 5)", average));
    }
    println!("{}", line);
    if !teaches.is_empty() {
        let more = more_label(more).map(|m| format!(" {}", m)).unwrap_or_default();
        println!("    teaches: {}{}", teaches.join(", "), more);
    }
}

fn print_profile(profile: &UserProfile) {
    println!("Name:   {}", profile.name);
    if let Some(ref email) = profile.email {
        println!("Email:  {}", email);
    }
    if let Some(image) = profile.avatar() {
        println!("Image:  {}", image);
    }
    println!("Bio:    {}", profile.bio);
    println!("Teaches: {}", profile.skills_to_teach.as_slice().join(", "));
    println!("Learns:  {}", profile.skills_to_learn.as_slice().join(", "));
    if let Some(ref certifications) = profile.certifications {
        println!("Certifications: {}", certifications);
    }
}

fn remove_named(screen: &mut EditProfileScreen, kind: SkillKind, skill: &str) {
    if screen.remove_skill_named(kind, skill).is_none() {
        warn!("Skill not in profile: {}", skill);
    }
}

async fn run(cli: Cli, settings: Settings, paths: SkillSwapPaths, config_path: PathBuf) -> Result<()> {
    // Commands that need no backend
    match cli.command {
        Commands::Paths => {
            info!("Displaying system paths");
            eprintln!("SkillSwap - System Paths\n");
            eprintln!("{}", paths.display());
            eprintln!("  Config file:       {}", config_path.display());
            eprintln!("\n✓ All directories exist and are accessible");
            eprintln!("\nEnvironment variables for overrides:");
            eprintln!("  SKILLSWAP_DATA_DIR     - Override data directory");
            eprintln!("  SKILLSWAP_CONFIG_DIR   - Override config directory");
            eprintln!("  SKILLSWAP_CACHE_DIR    - Override cache directory");
            eprintln!("  SKILLSWAP__STORE__DATABASE_URL, SKILLSWAP__AUTH__API_KEY, ...");
            eprintln!("                         - Override any config entry");
            return Ok(());
        }
        Commands::Config { save } => {
            if save {
                settings.save(&config_path)?;
                eprintln!("Saved {}", config_path.display());
            } else {
                print!("{}", settings.to_yaml()?);
            }
            return Ok(());
        }
        _ => {}
    }

    let backend = Backend::connect(&settings, &paths)?;
    let result = run_session(cli.command, &backend).await;
    backend.save()?;
    result
}

async fn run_session(command: Commands, backend: &Backend) -> Result<()> {
    let session: Arc<SessionContext> = backend.session.clone();
    let status = session.initialize().await.map_err(AppError::from)?;
    debug!("Session status: {:?}", status);

    match command {
        Commands::Login { email, password } => {
            let password = match password {
                Some(password) => password,
                None => read_password()?,
            };
            match LoginScreen::new(email, password).submit(&session).await {
                Ok((_, notice)) => print_notice(&notice),
                Err(notice) => bail!(notice),
            }
        }

        Commands::Signup {
            email,
            password,
            confirm,
            onboarding,
        } => {
            let (account, notice) = match SignupScreen::new(email, password, confirm)
                .submit(&session)
                .await
            {
                Ok(done) => done,
                Err(notice) => bail!(notice),
            };
            print_notice(&notice);
            if let Some(form) = onboarding.form() {
                let (_, notice) = form.submit(&session, &account).await?;
                print_notice(&notice);
            }
        }

        Commands::Logout => {
            session.sign_out().await.map_err(AppError::from)?;
            println!("Signed out");
        }

        Commands::Whoami => match session.identity() {
            Some(identity) => {
                println!("{} ({})", identity.email, identity.uid);
                if let Some(profile) = session.profile() {
                    println!("Name: {}", profile.name);
                }
            }
            None => println!("Not signed in"),
        },

        Commands::Verify { email } => {
            let Some(auth) = backend.offline_auth() else {
                bail!("verify is only available with --offline");
            };
            auth.verify_email(&email);
            println!("Verified {}", email);
        }

        Commands::Onboard { onboarding } => {
            let identity = session.require_identity().map_err(AppError::from)?;
            let Some(form) = onboarding.form() else {
                bail!("--name is required");
            };
            let (_, notice) = form.submit(&session, &identity).await?;
            print_notice(&notice);
        }

        Commands::Profile { action } => match action.unwrap_or(ProfileAction::Show { json: false }) {
            ProfileAction::Show { json } => {
                let screen = ProfileScreen::load(&session).await?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&screen.profile)?);
                } else {
                    if screen.is_placeholder {
                        eprintln!("(no profile saved yet)");
                    }
                    print_profile(&screen.profile);
                }
            }
            ProfileAction::Edit {
                name,
                bio,
                image,
                clear_image,
                teach,
                unteach,
                learn,
                unlearn,
            } => {
                let mut screen = EditProfileScreen::open(session.clone()).await?;
                if let Err(e) = screen.load_remote().await {
                    warn!("Editing cached profile: {}", e);
                }
                if let Some(name) = name {
                    screen.set_name(name);
                }
                if let Some(bio) = bio {
                    screen.set_bio(bio);
                }
                if clear_image {
                    screen.set_image(None);
                } else if image.is_some() {
                    screen.set_image(image);
                }
                for skill in &unteach {
                    remove_named(&mut screen, SkillKind::Teach, skill);
                }
                for skill in &unlearn {
                    remove_named(&mut screen, SkillKind::Learn, skill);
                }
                for (kind, skills) in [(SkillKind::Teach, &teach), (SkillKind::Learn, &learn)] {
                    for skill in skills {
                        if let SkillEdit::Ignored = screen.add_skill(kind, skill)? {
                            warn!("Ignoring blank skill");
                        }
                    }
                }
                let (profile, notice) = screen.save().await?;
                print_notice(&notice);
                print_profile(&profile);
            }
        },

        Commands::Home { search } => {
            let mut home = HomeScreen::new(session.clone());
            if let Some(search) = search {
                home.set_search(search);
            }
            home.load().await?;

            if let Some(achievements) = home.achievements() {
                println!("Your achievements");
                println!("  Skills to teach: {}", achievements.skills_to_teach);
                println!("  Skills to learn: {}", achievements.skills_to_learn);
                println!(
                    "  Ratings: {} (average {})",
                    achievements.ratings_count, achievements.average_rating
                );
                println!();
            }

            let topics = home.topics();
            println!("Topics ({})", topics.len());
            for topic in topics {
                println!("  {}", topic.name);
            }
            println!();

            println!("Featured teachers");
            for record in home.featured() {
                let summary = home.summary_for(&record.id);
                let average = (summary.count > 0).then(|| summary.display_average());
                let star = if home.is_favorite(&record.id) { "* " } else { "" };
                print!("{}", star);
                print_card(record, average);
            }
        }

        Commands::Teacher {
            uid,
            full_bio,
            all_ratings,
            json,
        } => {
            let mut screen = TeacherScreen::new(session.clone(), uid);
            screen.load().await?;
            if full_bio {
                screen.toggle_bio();
            }
            if all_ratings {
                screen.toggle_all_ratings();
            }

            let Some(teacher) = screen.teacher() else {
                return Err(AppError::UserNotFound(screen.teacher_id().clone()).into());
            };
            if json {
                let ratings: Vec<_> = screen.ratings().into_iter().map(|(_, r)| r).collect();
                let output = serde_json::json!({
                    "id": screen.teacher_id(),
                    "profile": teacher,
                    "summary": screen.summary(),
                    "ratings": ratings,
                    "favorite": screen.is_favorite(),
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
                return Ok(());
            }

            println!("{}  [{}]", teacher.name, screen.favorite_label());
            println!("Rating: {} ({} ratings)", screen.average_label(), screen.summary().count);
            println!();
            println!("{}", screen.bio());
            if let Some(label) = screen.bio_toggle_label() {
                eprintln!("({} with --full-bio)", label);
            }
            println!();
            println!("Teaches: {}", teacher.skills_to_teach.as_slice().join(", "));
            println!("Learns:  {}", teacher.skills_to_learn.as_slice().join(", "));
            if let Some(ref certifications) = teacher.certifications {
                println!("Certifications: {}", certifications);
            }
            println!();
            println!("Ratings");
            for (_, rating) in screen.ratings() {
                match rating.comment {
                    Some(ref comment) => println!("  {}/5  {}", rating.rating.get(), comment),
                    None => println!("  {}/5", rating.rating.get()),
                }
            }
            let hidden = screen.hidden_ratings();
            if hidden > 0 {
                eprintln!("  ({} more with --all-ratings)", hidden);
            }
        }

        Commands::Rate { uid, stars, comment } => {
            let mut screen = TeacherScreen::new(session.clone(), uid);
            screen.load().await?;
            screen.select_rating(stars)?;
            screen.set_comment(comment);
            let notice = screen.submit_rating().await?;
            print_notice(&notice);
            println!("Now {} ({} ratings)", screen.average_label(), screen.summary().count);
        }

        Commands::Favorite { uid } => {
            let mut screen = TeacherScreen::new(session.clone(), uid);
            screen.load().await?;
            screen.toggle_favorite().await?;
            println!("{}: {}", screen.teacher_id(), screen.favorite_label());
        }

        Commands::Favorites { watch } => {
            let mut feed = FavoritesFeed::open(&session)?;
            loop {
                let cards = tokio::select! {
                    cards = feed.next() => cards,
                    _ = tokio::signal::ctrl_c() => None,
                };
                let Some(cards) = cards else { break };

                if cards.is_empty() {
                    println!("No favorites yet");
                }
                for card in &cards {
                    let more = more_label(card.teaches_more)
                        .map(|m| format!(" {}", m))
                        .unwrap_or_default();
                    println!("{}  {}", card.id, card.name);
                    println!("    teaches: {}{}", card.teaches.join(", "), more);
                }
                if !watch {
                    break;
                }
                println!("---");
            }
        }

        Commands::Skill {
            skill,
            anyone,
            watch,
        } => {
            let mut feed = if anyone {
                SkillFeed::users(&session, skill)
            } else {
                SkillFeed::teachers(&session, skill)
            };
            loop {
                let users = tokio::select! {
                    users = feed.next() => users,
                    _ = tokio::signal::ctrl_c() => None,
                };
                let Some(users) = users else { break };

                if users.is_empty() {
                    println!("No one matches {}", feed.skill());
                }
                for record in &users {
                    print_card(record, None);
                }
                if !watch {
                    break;
                }
                println!("---");
            }
        }

        Commands::Connect { uid } => {
            let mut screen = TeacherScreen::new(session.clone(), uid);
            screen.load().await?;
            let notice = screen.connect().await?;
            print_notice(&notice);
        }

        Commands::Inbox { json } => {
            let inbox = InboxScreen::load(&session).await?;
            if json {
                let items: Vec<_> = inbox.items.iter().map(|(_, n)| n).collect();
                println!("{}", serde_json::to_string_pretty(&items)?);
            } else if inbox.is_empty() {
                println!("No notifications");
            } else {
                for (_, notification) in &inbox.items {
                    let when = notification
                        .sent_at()
                        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                        .unwrap_or_default();
                    println!("{}  {}", when, notification.message);
                }
            }
        }

        Commands::Paths | Commands::Config { .. } => {}
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = config_file(&cli)?;
    let settings = resolve_settings(&cli, &config_path)?;
    init_logging(&settings.log_level);
    debug!("Config file: {}", config_path.display());

    let paths = resolve_paths(&cli, &settings)?;

    match run(cli, settings, paths, config_path).await {
        Ok(()) => Ok(()),
        Err(e) => {
            if let Some(err) = e.downcast_ref::<AppError>() {
                eprintln!("{}", Notice::from(err));
                std::process::exit(1);
            }
            if let Some(notice) = e.downcast_ref::<Notice>() {
                eprintln!("{}", notice);
                std::process::exit(1);
            }
            Err(e)
        }
    }
}
