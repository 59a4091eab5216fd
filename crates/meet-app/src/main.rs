//! `meet`: command-line front end for Monthly Meet.
//!
//! Reads `meet.toml` (or the path given with `--config`), opens the SQLite
//! event store, and runs one command against it.
//!
//! ```text
//! meet new "October Meet"
//! meet seed Ann Ben Cleo
//! meet edit Ann bodyweight 61.5
//! meet show
//! meet share
//! meet open 'https://monthly-meet.app/#k=eyJpZCI6...'
//! ```

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context as _, Result, anyhow, bail};
use clap::{Parser, Subcommand, ValueEnum};
use meet_app::{AppConfig, AutoSaver, EventStore, Resolution, resolve_incoming};
use meet_core::{
  allocate::Placement,
  athlete::{AthleteField, AthleteId},
  event::{EventId, EventSnapshot, PointsTable, Theme},
  export::{EventExport, format_points, leaderboard_csv},
  leaderboard::score_event,
  store::KeyValueStore,
};
use meet_share::{Fragment, SharePayload};
use meet_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(author, version, about = "Monthly Meet scoring and event store")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "meet.toml", env = "MEET_CONFIG")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Create a new event and open it.
  New { title: String },
  /// List stored events, most recently updated first.
  List,
  /// Print the discipline tables and leaderboard of an event.
  Show { event: Option<String> },
  /// Add an athlete to the open (or given) event.
  Add {
    name:       String,
    #[arg(short, long)]
    event:      Option<String>,
    #[arg(long)]
    sex:        Option<String>,
    #[arg(long)]
    age:        Option<String>,
    #[arg(long)]
    bodyweight: Option<String>,
    #[arg(long)]
    squat:      Option<String>,
    #[arg(long)]
    bench:      Option<String>,
    #[arg(long)]
    deadlift:   Option<String>,
    /// Run time as ss, mm:ss or hh:mm:ss.
    #[arg(long)]
    run_time:   Option<String>,
  },
  /// Set one field of an athlete from raw text.
  Edit {
    /// Athlete id, id prefix, or name.
    athlete: String,
    field:   AthleteField,
    value:   String,
    #[arg(short, long)]
    event:   Option<String>,
  },
  /// Remove an athlete.
  Remove {
    athlete: String,
    #[arg(short, long)]
    event:   Option<String>,
  },
  /// Add one athlete per name.
  Seed {
    names: Vec<String>,
    #[arg(short, long)]
    event: Option<String>,
  },
  /// Select the points table: `top10`, `top6`, or a list like "25,18,15".
  Points {
    table: String,
    #[arg(short, long)]
    event: Option<String>,
  },
  /// Change the event title.
  Rename {
    title: String,
    #[arg(short, long)]
    event: Option<String>,
  },
  /// Delete an event and its index entry.
  Delete { event: String },
  /// Write the event as JSON or the leaderboard as CSV.
  Export {
    #[arg(short, long)]
    event:  Option<String>,
    #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
    format: ExportFormat,
    /// Output file; stdout if omitted.
    #[arg(short, long)]
    output: Option<PathBuf>,
  },
  /// Print a share link for the event.
  Share { event: Option<String> },
  /// Open a share link (or `#event=<id>` link) and store its event.
  Open { link: String },
  /// Import a JSON export file.
  Import { file: PathBuf },
  /// Show or set the theme preference.
  Theme { value: Option<String> },
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
  Json,
  Csv,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let cfg = AppConfig::load(&cli.config).context("failed to load configuration")?;

  if let Some(parent) = cfg.store_path.parent() {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {parent:?}"))?;
  }
  let store = SqliteStore::open(&cfg.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", cfg.store_path))?;

  let events = Arc::new(EventStore::new(store));
  let saver = AutoSaver::new(Arc::clone(&events), cfg.debounce());

  let result = run(cli.command, &cfg, events.as_ref(), &saver).await;
  saver.flush().await;
  result
}

async fn run<S: KeyValueStore + 'static>(
  command: Command,
  cfg: &AppConfig,
  events: &EventStore<S>,
  saver: &AutoSaver<S>,
) -> Result<()> {
  match command {
    Command::New { title } => {
      let (id, _) = events.create_event(&title).await;
      events.set_last_open(Some(&id)).await;
      println!("{id}");
    }

    Command::List => {
      let last = events.last_open().await;
      for entry in events.list_events().await {
        let marker = if last.as_ref() == Some(&entry.id) { "*" } else { " " };
        println!(
          "{marker} {}  {}  (updated {})",
          entry.id,
          entry.title,
          entry.updated_at.format("%Y-%m-%d %H:%M")
        );
      }
    }

    Command::Show { event } => {
      let (_, snapshot) = open_event(events, event).await?;
      print_results(&snapshot);
    }

    Command::Add {
      name,
      event,
      sex,
      age,
      bodyweight,
      squat,
      bench,
      deadlift,
      run_time,
    } => {
      let (id, mut snapshot) = open_event(events, event).await?;
      let athlete = snapshot.add_athlete(name.trim());
      let fields = [
        (AthleteField::Sex, sex),
        (AthleteField::Age, age),
        (AthleteField::Bodyweight, bodyweight),
        (AthleteField::Squat, squat),
        (AthleteField::Bench, bench),
        (AthleteField::Deadlift, deadlift),
        (AthleteField::RunTime, run_time),
      ];
      for (field, value) in fields {
        if let Some(value) = value {
          snapshot.apply_edit(&athlete, field, &value)?;
        }
      }
      saver.snapshot_changed(&id, snapshot);
      println!("{athlete}");
    }

    Command::Edit { athlete, field, value, event } => {
      let (id, mut snapshot) = open_event(events, event).await?;
      let athlete = find_athlete(&snapshot, &athlete)?;
      snapshot.apply_edit(&athlete, field, &value)?;
      saver.snapshot_changed(&id, snapshot);
    }

    Command::Remove { athlete, event } => {
      let (id, mut snapshot) = open_event(events, event).await?;
      let athlete = find_athlete(&snapshot, &athlete)?;
      snapshot.remove_athlete(&athlete);
      saver.snapshot_changed(&id, snapshot);
    }

    Command::Seed { names, event } => {
      let (id, mut snapshot) = open_event(events, event).await?;
      let added = snapshot.seed_roster(names.iter().map(String::as_str));
      saver.snapshot_changed(&id, snapshot);
      println!("added {} athletes", added.len());
    }

    Command::Points { table, event } => {
      let (id, mut snapshot) = open_event(events, event).await?;
      snapshot.points_table = PointsTable::from_selection(&table);
      let values: Vec<String> = snapshot
        .points_table
        .values()
        .iter()
        .map(|v| format_points(*v))
        .collect();
      println!("points: {}", values.join(", "));
      saver.snapshot_changed(&id, snapshot);
    }

    Command::Rename { title, event } => {
      let (id, mut snapshot) = open_event(events, event).await?;
      snapshot.title = title;
      saver.snapshot_changed(&id, snapshot);
    }

    Command::Delete { event } => {
      let id = find_event(events, &event).await?;
      saver.discard(&id);
      events.delete_event(&id).await;
    }

    Command::Export { event, format, output } => {
      let (id, snapshot) = open_event(events, event).await?;
      let text = match format {
        ExportFormat::Json => EventExport { event_id: Some(id), snapshot }.to_json()?,
        ExportFormat::Csv => leaderboard_csv(&score_event(&snapshot).leaderboard),
      };
      match output {
        Some(path) => std::fs::write(&path, text)
          .with_context(|| format!("failed to write {path:?}"))?,
        None => print!("{text}"),
      }
    }

    Command::Share { event } => {
      let (id, snapshot) = open_event(events, event).await?;
      let link = meet_share::share_link(&cfg.share_base_url, &SharePayload::new(Some(id), snapshot))?;
      println!("{link}");
    }

    Command::Open { link } => {
      if let Some(Fragment::Event(id)) = meet_share::parse_fragment(&link) {
        let (id, snapshot) = open_event(events, Some(id.to_string())).await?;
        println!("opened {id} ({})", snapshot.title);
        return Ok(());
      }
      let payload = meet_share::decode(&link).ok_or_else(|| anyhow!("not a valid share link"))?;
      let resolution = resolve_incoming(events, payload.id, payload.snapshot).await;
      report(events, &resolution).await;
    }

    Command::Import { file } => {
      let text = std::fs::read_to_string(&file)
        .with_context(|| format!("failed to read {file:?}"))?;
      let export = EventExport::from_json(&text).context("not a Monthly Meet export")?;
      let resolution = resolve_incoming(events, export.event_id, export.snapshot).await;
      report(events, &resolution).await;
    }

    Command::Theme { value } => match value {
      Some(value) => {
        let theme = Theme::parse(&value).ok_or_else(|| anyhow!("theme must be light or dark"))?;
        events.set_theme(theme).await;
      }
      None => println!("{}", events.theme(cfg.default_theme).await.as_str()),
    },
  }

  Ok(())
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

/// Resolve an event argument (full id or unique id prefix).
async fn find_event<S: KeyValueStore>(events: &EventStore<S>, arg: &str) -> Result<EventId> {
  let exact = EventId::from(arg);
  if events.load_event(&exact).await.is_some() {
    return Ok(exact);
  }

  let matches: Vec<EventId> = events
    .load_index()
    .await
    .into_iter()
    .map(|e| e.id)
    .filter(|id| id.as_str().starts_with(arg))
    .collect();
  match matches.as_slice() {
    [id] => Ok(id.clone()),
    [] => bail!("no event matches {arg:?}"),
    _ => bail!("{arg:?} matches {} events", matches.len()),
  }
}

/// Load the given event, or the last opened one, and mark it as open.
async fn open_event<S: KeyValueStore>(
  events: &EventStore<S>,
  arg: Option<String>,
) -> Result<(EventId, EventSnapshot)> {
  let id = match arg {
    Some(arg) => find_event(events, &arg).await?,
    None => events
      .last_open()
      .await
      .ok_or_else(|| anyhow!("no event is open; pass --event or run `meet new`"))?,
  };
  let snapshot = events
    .load_event(&id)
    .await
    .ok_or_else(|| anyhow!("event {id} could not be loaded"))?;
  events.set_last_open(Some(&id)).await;
  Ok((id, snapshot))
}

/// Resolve an athlete argument: id, name, or unique id prefix.
fn find_athlete(snapshot: &EventSnapshot, arg: &str) -> Result<AthleteId> {
  snapshot
    .find_athlete(arg)
    .with_context(|| format!("in event {:?}", snapshot.title))
}

async fn report<S: KeyValueStore>(events: &EventStore<S>, resolution: &Resolution) {
  match resolution {
    Resolution::Adopted { id, snapshot } => println!("imported {id} ({})", snapshot.title),
    Resolution::AlreadySynced { id, .. } => println!("{id} is already up to date"),
    Resolution::Forked { original, id, snapshot } => {
      println!("{original} differs locally; saved as new event {id} ({})", snapshot.title)
    }
  }
  events.set_last_open(Some(resolution.id())).await;
}

fn print_results(snapshot: &EventSnapshot) {
  let results = score_event(snapshot);
  let name = |id: &AthleteId| {
    snapshot
      .athlete(id)
      .map(|a| a.name.clone())
      .unwrap_or_default()
  };

  println!("{}", snapshot.title);
  print_discipline("Strength", &results.strength, &name, 2);
  print_discipline("5k", &results.run, &name, 3);

  println!("\nLeaderboard");
  for row in &results.leaderboard {
    println!(
      "{:>3}  {:<24} {:>7} {:>7} {:>7}",
      row.place,
      row.name,
      format_points(row.strength_points),
      format_points(row.run_points),
      format_points(row.total)
    );
  }
}

fn print_discipline(
  label: &str,
  placements: &[Placement],
  name: &dyn Fn(&AthleteId) -> String,
  precision: usize,
) {
  println!("\n{label}");
  for p in placements {
    let place = p.place.map_or_else(|| "-".to_owned(), |n| n.to_string());
    let score = p
      .score
      .map_or_else(|| "—".to_owned(), |s| format!("{s:.precision$}"));
    println!(
      "{place:>3}  {:<24} {score:>9} {:>7}",
      name(&p.id),
      format_points(p.points)
    );
  }
}
