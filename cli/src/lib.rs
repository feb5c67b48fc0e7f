//! `halalmatches` command-line interface.
//!
//! Operates on the durable SQLite store so records can be inspected and
//! edited outside the application.
//!
//! ## Commands
//!
//! - `halalmatches show`
//! - `halalmatches completion [--threshold <N>]`
//! - `halalmatches keys`
//! - `halalmatches profile init|update|remove`
//! - `halalmatches media add|remove|list`
//! - `halalmatches video set|remove`
//! - `halalmatches waitlist add|list`
//! - `halalmatches intro add|list|status|templates`
//! - `halalmatches wali set|remove`
//! - `halalmatches flag <NAME> <true|false>`
//! - `halalmatches clear --yes`
//!
//! Policy rejections (bad link, duplicate photo, photo limit, missing
//! profile) are reported as [`Outcome::Rejected`] and exit with status 1.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use halalmatches_store::{
    CompletionField, DEFAULT_TEMPLATE_ID, Gender, INTRO_TEMPLATES, IntroTemplate,
    IntroductionRecord, IntroductionStatus, NewIntroduction, NewWaitlistEntry, Profile,
    ProfilePatch, Readiness, RecordStore, SqliteBackend, StoreConfig, VideoSubmission, WaliPath,
    WaliStatusRecord, missing_fields, template_label,
};
use serde::Serialize;

/// Result of a command that ran to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Done,
    /// The request was refused; the message is for the user.
    Rejected(String),
}

impl Outcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Done => 0,
            Self::Rejected(_) => 1,
        }
    }
}

type Store = RecordStore<SqliteBackend>;

#[derive(Debug, Parser)]
#[command(name = "halalmatches", version, about = "Inspect and edit the local HalalMatches store")]
pub struct Cli {
    /// SQLite database path (overrides config and HALALMATCHES_DB_PATH).
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print every stored record as JSON.
    Show,
    /// Profile completion score, missing fields and dashboard readiness.
    Completion(CompletionArgs),
    /// List the namespaced storage keys and whether each is set.
    Keys,
    /// Profile record operations.
    Profile(ProfileCli),
    /// Linked photo operations.
    Media(MediaCli),
    /// Introduction video operations.
    Video(VideoCli),
    /// Launch waitlist operations.
    Waitlist(WaitlistCli),
    /// Introduction operations.
    Intro(IntroCli),
    /// Wali arrangement operations.
    Wali(WaliCli),
    /// Set a preference flag.
    Flag(FlagArgs),
    /// Delete every stored record.
    Clear(ClearArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Subcommand arguments
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Parser)]
pub struct CompletionArgs {
    /// Completion percentage the profile step needs (defaults to config).
    #[arg(long)]
    pub threshold: Option<u8>,
}

#[derive(Debug, Parser)]
pub struct ProfileCli {
    #[command(subcommand)]
    pub command: ProfileSubcommand,
}

#[derive(Debug, Subcommand)]
pub enum ProfileSubcommand {
    /// Create an empty profile if none exists.
    Init {
        #[arg(long)]
        name: Option<String>,
    },
    /// Merge a camelCase JSON patch onto the stored profile.
    Update {
        /// e.g. '{"aboutMe":"...","islamicPractice":{"prayer":"five-daily"}}'
        patch: String,
    },
    /// Delete the stored profile.
    Remove,
}

#[derive(Debug, Parser)]
pub struct MediaCli {
    #[command(subcommand)]
    pub command: MediaSubcommand,
}

#[derive(Debug, Subcommand)]
pub enum MediaSubcommand {
    /// Link a photo by Google Drive file ID or share URL.
    Add {
        input: String,
        #[arg(long)]
        caption: Option<String>,
    },
    /// Unlink every photo with this file ID.
    Remove { file_id: String },
    /// Print linked photos in display order.
    List,
}

#[derive(Debug, Parser)]
pub struct VideoCli {
    #[command(subcommand)]
    pub command: VideoSubcommand,
}

#[derive(Debug, Subcommand)]
pub enum VideoSubcommand {
    /// Link an unlisted YouTube video by URL or ID.
    Set {
        input: String,
        #[arg(long)]
        title: String,
        /// Confirm the video is set to Unlisted.
        #[arg(long)]
        unlisted: bool,
    },
    /// Unlink the video.
    Remove,
}

#[derive(Debug, Parser)]
pub struct WaitlistCli {
    #[command(subcommand)]
    pub command: WaitlistSubcommand,
}

#[derive(Debug, Subcommand)]
pub enum WaitlistSubcommand {
    /// Append a waitlist signup.
    Add {
        #[arg(long)]
        email: String,
        #[arg(long, value_parser = parse_gender)]
        gender: Gender,
        #[arg(long)]
        country: String,
        #[arg(long)]
        has_wali: bool,
    },
    /// Print all signups.
    List,
}

#[derive(Debug, Parser)]
pub struct IntroCli {
    #[command(subcommand)]
    pub command: IntroSubcommand,
}

#[derive(Debug, Subcommand)]
pub enum IntroSubcommand {
    /// Record an introduction sent to a recipient email.
    Add {
        recipient: String,
        /// Template id; see `halalmatches intro templates`.
        #[arg(long, default_value = DEFAULT_TEMPLATE_ID, value_parser = parse_template)]
        template: &'static IntroTemplate,
        #[arg(long)]
        message: Option<String>,
    },
    /// Print sent introductions with their template names.
    List,
    /// Print the introduction template catalogue.
    Templates,
    /// Record the recipient's reply.
    Status {
        id: String,
        #[arg(value_parser = parse_intro_status)]
        status: IntroductionStatus,
    },
}

#[derive(Debug, Parser)]
pub struct WaliCli {
    #[command(subcommand)]
    pub command: WaliSubcommand,
}

#[derive(Debug, Subcommand)]
pub enum WaliSubcommand {
    /// Record the wali arrangement.
    Set {
        /// traditional, imam or limited
        #[arg(long, value_parser = parse_wali_path)]
        path: WaliPath,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        relation: Option<String>,
        #[arg(long)]
        contact: Option<String>,
        #[arg(long)]
        verified: bool,
    },
    /// Delete the wali arrangement.
    Remove,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FlagName {
    DarkMode,
    Onboarding,
    GoogleConnected,
}

#[derive(Debug, Parser)]
pub struct FlagArgs {
    pub name: FlagName,
    #[arg(action = clap::ArgAction::Set)]
    pub value: bool,
}

#[derive(Debug, Parser)]
pub struct ClearArgs {
    /// Required; clearing cannot be undone.
    #[arg(long)]
    pub yes: bool,
}

fn parse_gender(s: &str) -> Result<Gender, String> {
    match s {
        "male" => Ok(Gender::Male),
        "female" => Ok(Gender::Female),
        other => Err(format!("expected male or female, got {other}")),
    }
}

fn parse_wali_path(s: &str) -> Result<WaliPath, String> {
    WaliPath::parse(s).ok_or_else(|| format!("expected traditional, imam or limited, got {s}"))
}

fn parse_template(s: &str) -> Result<&'static IntroTemplate, String> {
    IntroTemplate::find(s).ok_or_else(|| {
        let ids: Vec<&str> = INTRO_TEMPLATES.iter().map(|t| t.id).collect();
        format!("expected one of {}, got {s}", ids.join(", "))
    })
}

fn parse_intro_status(s: &str) -> Result<IntroductionStatus, String> {
    IntroductionStatus::parse(s)
        .ok_or_else(|| format!("expected pending, accepted or declined, got {s}"))
}

// ─────────────────────────────────────────────────────────────────────────────
// Dispatch
// ─────────────────────────────────────────────────────────────────────────────

impl Cli {
    /// Load config, open the store and run the command, writing results
    /// to `out`.
    pub fn run(&self, out: &mut impl Write) -> Result<Outcome> {
        let cfg = StoreConfig::load().context("loading store config")?;
        let path = self
            .db
            .clone()
            .unwrap_or_else(|| cfg.resolved_db_path());
        let backend = SqliteBackend::open(&path)
            .with_context(|| format!("opening store at {}", path.display()))?;
        tracing::debug!(path = %path.display(), "store opened");

        let store = RecordStore::with_config(backend, &cfg);
        self.command.run(&store, &cfg, out)
    }
}

impl Command {
    fn run(&self, store: &Store, cfg: &StoreConfig, out: &mut impl Write) -> Result<Outcome> {
        match self {
            Self::Show => cmd_show(store, out),
            Self::Completion(args) => cmd_completion(store, cfg, args, out),
            Self::Keys => cmd_keys(store, out),
            Self::Profile(cli) => cmd_profile(store, &cli.command, out),
            Self::Media(cli) => cmd_media(store, cfg, &cli.command, out),
            Self::Video(cli) => cmd_video(store, &cli.command, out),
            Self::Waitlist(cli) => cmd_waitlist(store, &cli.command, out),
            Self::Intro(cli) => cmd_intro(store, &cli.command, out),
            Self::Wali(cli) => cmd_wali(store, &cli.command, out),
            Self::Flag(args) => cmd_flag(store, args, out),
            Self::Clear(args) => cmd_clear(store, args, out),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Command implementations
// ─────────────────────────────────────────────────────────────────────────────

fn print_json<T: Serialize + ?Sized>(out: &mut impl Write, value: &T) -> Result<Outcome> {
    writeln!(out, "{}", serde_json::to_string_pretty(value)?)?;
    Ok(Outcome::Done)
}

fn cmd_show(store: &Store, out: &mut impl Write) -> Result<Outcome> {
    print_json(out, &store.app_state())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CompletionReport {
    completion: u8,
    missing_fields: Vec<&'static str>,
    readiness: Readiness,
}

fn cmd_completion(
    store: &Store,
    cfg: &StoreConfig,
    args: &CompletionArgs,
    out: &mut impl Write,
) -> Result<Outcome> {
    let threshold = args.threshold.unwrap_or(cfg.readiness_threshold);
    let state = store.app_state();
    // No profile yet: every field is missing.
    let empty = Profile::default();
    let missing = missing_fields(state.profile.as_ref().unwrap_or(&empty))
        .iter()
        .map(CompletionField::as_str)
        .collect();
    let readiness = Readiness::evaluate(&state, threshold);

    print_json(
        out,
        &CompletionReport {
            completion: readiness.completion,
            missing_fields: missing,
            readiness,
        },
    )
}

fn cmd_keys(store: &Store, out: &mut impl Write) -> Result<Outcome> {
    let present = store.backend().keys()?;
    for key in store.namespace().all_keys() {
        let state = if present.contains(&key) { "set" } else { "unset" };
        writeln!(out, "{key}\t{state}")?;
    }
    Ok(Outcome::Done)
}

fn cmd_profile(store: &Store, command: &ProfileSubcommand, out: &mut impl Write) -> Result<Outcome> {
    match command {
        ProfileSubcommand::Init { name } => {
            if store.get_profile().is_some() {
                return Ok(Outcome::Rejected("a profile already exists".to_string()));
            }
            let mut profile = Profile::new(store.new_id(), store.timestamp());
            profile.name.clone_from(name);
            store.save_profile(&profile);
            print_json(out, &profile)
        }
        ProfileSubcommand::Update { patch } => {
            let patch: ProfilePatch =
                serde_json::from_str(patch).context("parsing profile patch JSON")?;
            match store.update_profile(patch) {
                Some(profile) => print_json(out, &profile),
                None => Ok(Outcome::Rejected(
                    "no profile stored; run `halalmatches profile init` first".to_string(),
                )),
            }
        }
        ProfileSubcommand::Remove => {
            store.remove_profile();
            Ok(Outcome::Done)
        }
    }
}

fn cmd_media(
    store: &Store,
    cfg: &StoreConfig,
    command: &MediaSubcommand,
    out: &mut impl Write,
) -> Result<Outcome> {
    match command {
        MediaSubcommand::Add { input, caption } => {
            match cfg.media_policy().add(store, input, caption.as_deref()) {
                Ok(media) => print_json(out, &media),
                Err(rejection) => Ok(Outcome::Rejected(rejection.to_string())),
            }
        }
        MediaSubcommand::Remove { file_id } => print_json(out, &store.remove_media(file_id)),
        MediaSubcommand::List => print_json(out, &store.get_media()),
    }
}

fn cmd_video(store: &Store, command: &VideoSubcommand, out: &mut impl Write) -> Result<Outcome> {
    match command {
        VideoSubcommand::Set {
            input,
            title,
            unlisted,
        } => {
            let submission = VideoSubmission {
                input: input.clone(),
                title: title.clone(),
                confirmed_unlisted: *unlisted,
            };
            match submission.submit(store) {
                Ok(video) => print_json(out, &video),
                Err(rejection) => Ok(Outcome::Rejected(rejection.to_string())),
            }
        }
        VideoSubcommand::Remove => {
            store.remove_video();
            Ok(Outcome::Done)
        }
    }
}

fn cmd_waitlist(
    store: &Store,
    command: &WaitlistSubcommand,
    out: &mut impl Write,
) -> Result<Outcome> {
    match command {
        WaitlistSubcommand::Add {
            email,
            gender,
            country,
            has_wali,
        } => {
            let entries = store.add_to_waitlist(NewWaitlistEntry {
                email: email.clone(),
                gender: *gender,
                country: country.clone(),
                has_wali: *has_wali,
            });
            print_json(out, &entries)
        }
        WaitlistSubcommand::List => print_json(out, &store.get_waitlist()),
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ListedIntroduction<'a> {
    #[serde(flatten)]
    record: &'a IntroductionRecord,
    template_name: &'static str,
}

fn cmd_intro(store: &Store, command: &IntroSubcommand, out: &mut impl Write) -> Result<Outcome> {
    match command {
        IntroSubcommand::Add {
            recipient,
            template,
            message,
        } => {
            let intro = NewIntroduction {
                template_used: Some(template.id.to_string()),
                message: message.clone(),
                ..NewIntroduction::to_recipient(recipient.as_str())
            };
            print_json(out, &store.add_introduction(intro))
        }
        IntroSubcommand::List => {
            let intros = store.get_introductions();
            let listed: Vec<ListedIntroduction<'_>> = intros
                .iter()
                .map(|record| ListedIntroduction {
                    template_name: template_label(record.template_used.as_deref()),
                    record,
                })
                .collect();
            print_json(out, &listed)
        }
        IntroSubcommand::Templates => print_json(out, &INTRO_TEMPLATES),
        IntroSubcommand::Status { id, status } => {
            if !store.get_introductions().iter().any(|i| i.id == *id) {
                return Ok(Outcome::Rejected(format!("no introduction with id {id}")));
            }
            print_json(out, &store.set_introduction_status(id, *status))
        }
    }
}

fn cmd_wali(store: &Store, command: &WaliSubcommand, out: &mut impl Write) -> Result<Outcome> {
    match command {
        WaliSubcommand::Set {
            path,
            name,
            relation,
            contact,
            verified,
        } => {
            let record = WaliStatusRecord {
                path: *path,
                wali_name: name.clone(),
                wali_relation: relation.clone(),
                wali_contact: contact.clone(),
                verified: *verified,
                updated_at: store.timestamp(),
            };
            store.save_wali_status(&record);
            print_json(out, &record)
        }
        WaliSubcommand::Remove => {
            store.remove_wali_status();
            Ok(Outcome::Done)
        }
    }
}

fn cmd_flag(store: &Store, args: &FlagArgs, out: &mut impl Write) -> Result<Outcome> {
    match args.name {
        FlagName::DarkMode => store.set_dark_mode(args.value),
        FlagName::Onboarding => store.set_onboarding_completed(args.value),
        FlagName::GoogleConnected => store.set_google_connected(args.value),
    }
    writeln!(out, "{:?} = {}", args.name, args.value)?;
    Ok(Outcome::Done)
}

fn cmd_clear(store: &Store, args: &ClearArgs, out: &mut impl Write) -> Result<Outcome> {
    if !args.yes {
        return Ok(Outcome::Rejected(
            "refusing to clear without --yes".to_string(),
        ));
    }
    store.clear_all();
    writeln!(out, "cleared")?;
    Ok(Outcome::Done)
}
