use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::{Duration, Local, NaiveDate, NaiveTime, TimeZone, Weekday};
use clap::{Args, Parser, Subcommand};
use tracing::{error, info, instrument};
use tracing_subscriber::EnvFilter;

use teamapp_fixtures::config::Config;
use teamapp_fixtures::convert::{self, ApiRun, Conversion, SheetRun};
use teamapp_fixtures::playhq::{HttpTransport, PlayHq};
use teamapp_fixtures::teamapp::{self, Options};
use teamapp_fixtures::{Error, Result, export, parse, sheet};

#[derive(Debug, Parser)]
#[command(name = "teamapp-fixtures", version)]
#[command(about = "Convert basketball fixtures into TeamApp schedule and event import files")]
struct Cli {
    /// Club configuration file (roster, venues, templates)
    #[arg(short, long, default_value = "club.toml")]
    config: PathBuf,

    /// Show debugging info while processing games
    #[arg(long)]
    debug: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Convert a venue timesheet workbook or a PlayHQ fixture CSV export
    Sheet {
        /// .xlsx/.xls/.ods timesheet or .csv PlayHQ export
        input: PathBuf,

        /// Club whose games are extracted (defaults to the configured club)
        #[arg(long)]
        club: Option<String>,

        /// Round date (defaults to the upcoming Saturday)
        #[arg(long, conflicts_with = "infer_date")]
        date: Option<NaiveDate>,

        /// Read the round date from each sheet's header row instead
        #[arg(long)]
        infer_date: bool,

        #[command(flatten)]
        event: EventArgs,
    },
    /// Fetch the club's fixtures from PlayHQ
    Playhq {
        /// First day of the round (defaults to the upcoming Saturday)
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Last day of the round, inclusive (defaults to one day after --from)
        #[arg(long)]
        to: Option<NaiveDate>,

        /// Only keep games with this status; repeatable (e.g. UPCOMING)
        #[arg(long = "status")]
        statuses: Vec<String>,

        #[command(flatten)]
        event: EventArgs,
    },
}

#[derive(Debug, Args)]
struct EventArgs {
    /// Identification of the round, e.g. "Grading 1" or "Game 4"
    #[arg(long)]
    id: Option<String>,

    /// File with an alternative description template
    #[arg(long)]
    description: Option<PathBuf>,

    /// Do not set the RSVP option
    #[arg(long)]
    no_rsvp: bool,

    /// Do not set the comments option
    #[arg(long)]
    no_comments: bool,

    /// Do not set the attendance option
    #[arg(long)]
    no_attendance: bool,

    /// Do not set the duty roster option
    #[arg(long)]
    no_duty: bool,

    /// Set the ticketing option
    #[arg(long)]
    ticketing: bool,

    /// Directory for the CSV files
    #[arg(long)]
    out_dir: Option<PathBuf>,
}

impl EventArgs {
    fn options(&self) -> Options {
        Options {
            rsvp: !self.no_rsvp,
            comments: !self.no_comments,
            attendance_tracking: !self.no_attendance,
            duty_roster: !self.no_duty,
            ticketing: self.ticketing,
        }
    }

    fn description(&self, default: &str) -> Result<String> {
        match &self.description {
            Some(path) => Ok(std::fs::read_to_string(path)?),
            None => Ok(default.to_string()),
        }
    }
}

fn upcoming_saturday() -> NaiveDate {
    parse::next_weekday(Local::now().date_naive(), Weekday::Sat)
}

fn init_tracing(debug: bool, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if debug { "debug" } else { "info" }));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);
    let _ = if json {
        builder.json().with_current_span(false).try_init()
    } else {
        builder.try_init()
    };
}

#[instrument(level = "info", skip(config, event))]
fn run_sheet(
    config: &Config,
    input: &Path,
    club: Option<&str>,
    date: Option<NaiveDate>,
    infer_date: bool,
    event: &EventArgs,
) -> Result<()> {
    let club = club.unwrap_or(&config.club);
    let description = event.description(&config.description)?;
    let date = if infer_date { None } else { Some(date.unwrap_or_else(upcoming_saturday)) };
    info!(?date, "Round date");

    let run = SheetRun {
        club,
        date,
        round_label: event.id.as_deref(),
        description: &description,
        options: event.options(),
    };
    let is_export = input.extension().is_some_and(|e| e.eq_ignore_ascii_case("csv"));
    let conversion = if is_export {
        let date = date.ok_or_else(|| Error::MissingSetting("--date for a PlayHQ export".to_string()))?;
        let raw = export::read_export_path(input, date, club, config.game_length_min)?;
        convert::convert_raw_games(&raw, config, &run)?
    } else {
        let sheets = sheet::read_workbook(input)?;
        convert::convert_sheets(&sheets, config, &run)?
    };

    let dir = event
        .out_dir
        .clone()
        .or_else(|| input.parent().map(Path::to_path_buf))
        .unwrap_or_default();
    let stem = input.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
    write(&conversion, &dir, club, event.id.as_deref(), &stem)
}

#[instrument(level = "info", skip(config, event))]
fn run_playhq(
    config: &Config,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    statuses: &[String],
    event: &EventArgs,
) -> Result<()> {
    let phq = config.playhq()?;
    let tz = phq.tz()?;
    let client = PlayHq::new(HttpTransport::new(&phq.api_url, phq.api_key()?, &phq.tenant), &phq.org_id, tz);

    let season_id = client
        .season_id(&phq.season)?
        .ok_or_else(|| Error::MissingSetting(format!("season {:?} in PlayHQ", phq.season)))?;
    let teams: Vec<(String, String)> = client
        .season_teams(&season_id)?
        .into_iter()
        .map(|t| (t.id, t.name))
        .collect();

    let local_midnight = |d: NaiveDate| {
        tz.from_local_datetime(&d.and_time(NaiveTime::MIN))
            .earliest()
            .ok_or_else(|| Error::InvalidTimezone(format!("{} has no midnight on {}", tz, d)))
    };
    let from = local_midnight(from.unwrap_or_else(upcoming_saturday))?;
    let to = match to {
        Some(d) => Some(local_midnight(d)? + Duration::days(1) - Duration::seconds(1)),
        None => None,
    };
    let statuses: Option<Vec<String>> =
        if statuses.is_empty() { phq.statuses.clone() } else { Some(statuses.to_vec()) };

    let description = event.description(&phq.description)?;
    let run = ApiRun {
        from,
        to,
        statuses: statuses.as_deref(),
        game_length_min: phq.game_length_min,
        round_label: event.id.as_deref(),
        description: &description,
        options: event.options(),
    };
    let conversion = convert::convert_playhq(&client, &teams, config, &run)?;

    let dir = event.out_dir.clone().unwrap_or_else(|| PathBuf::from("."));
    write(&conversion, &dir, &config.club, event.id.as_deref(), "playhq")
}

fn write(conversion: &Conversion, dir: &Path, club: &str, id: Option<&str>, stem: &str) -> Result<()> {
    let (schedule, events) = teamapp::output_paths(dir, conversion.round.date, club, id, stem);
    teamapp::write_files(&conversion.records, &schedule, &events)?;
    info!(
        games = conversion.round.games.len(),
        byes = conversion.round.byes.len(),
        "TeamApp files produced"
    );
    Ok(())
}

fn run(cli: &Cli) -> Result<()> {
    let config = Config::from_path(&cli.config)?;
    match &cli.command {
        Command::Sheet { input, club, date, infer_date, event } => {
            run_sheet(&config, input, club.as_deref(), *date, *infer_date, event)
        }
        Command::Playhq { from, to, statuses, event } => run_playhq(&config, *from, *to, statuses, event),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug, cli.json_logs);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Conversion failed; no files written");
            ExitCode::FAILURE
        }
    }
}
