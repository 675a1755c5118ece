use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use liftlog_core::metrics::count_sets;
use liftlog_core::*;
use liftlog_core::{export, flows, history, session, units};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "liftlog")]
#[command(about = "Strength workout logger", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Override config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a new workout, optionally from a saved routine
    Start {
        #[arg(long)]
        routine: Option<Uuid>,
    },

    /// Choose which session the editing commands apply to
    Mode { mode: ModeArg },

    /// Create, open and save routine templates
    Routine {
        #[command(subcommand)]
        action: RoutineCommand,
    },

    /// Load a finished workout for editing
    Edit { workout_id: Uuid },

    /// Save the workout being edited
    SaveEdit,

    /// Rename the active session
    Title { title: String },

    /// Add exercises by catalog id
    Add {
        #[arg(required = true)]
        exercise_ids: Vec<String>,
    },

    /// Swap the exercise at position EX for another catalog exercise
    Replace { exercise: usize, exercise_id: String },

    /// Remove the exercise at position EX
    Remove { exercise: usize },

    /// Move an exercise to another position
    Move { from: usize, to: usize },

    /// Set the note of an exercise
    Note { exercise: usize, text: String },

    /// Set the rest interval of an exercise (0 disables the timer)
    Rest { exercise: usize, seconds: u32 },

    /// Edit sets of an exercise
    Set {
        #[command(subcommand)]
        action: SetCommand,
    },

    /// Show the active session (default)
    Status,

    /// Follow the rest timer
    Timer {
        /// Print the current state and exit
        #[arg(long)]
        once: bool,
    },

    /// Change display units and convert the active session
    Units {
        #[arg(long)]
        weight: Option<String>,
        #[arg(long)]
        intensity: Option<String>,
    },

    /// Save the workout in progress
    Finish {
        /// Also write the workout back into the routine it was started from
        #[arg(long)]
        update_routine: bool,
    },

    /// Throw away the workout in progress
    Discard,

    /// List finished workouts
    History {
        #[arg(long, default_value_t = 30)]
        days: i64,
    },

    /// Delete a finished workout
    DeleteWorkout { workout_id: Uuid },

    /// Export all finished workouts as CSV
    Export { path: PathBuf },

    /// List catalog exercises
    Exercises { query: Option<String> },
}

#[derive(Subcommand)]
enum RoutineCommand {
    /// Start a new, empty routine
    New { title: String },
    /// Load a saved routine for editing
    Open { routine_id: Uuid },
    /// Save the routine being edited
    Save,
    /// Throw away the routine being edited
    Discard,
    /// List saved routines
    List,
    /// Delete a saved routine
    Delete { routine_id: Uuid },
}

#[derive(Subcommand)]
enum SetCommand {
    Add { exercise: usize },
    Delete { exercise: usize, set: usize },
    Reps { exercise: usize, set: usize, reps: String },
    Weight { exercise: usize, set: usize, weight: String },
    Type { exercise: usize, set: usize, set_type: String },
    /// Record intensity on the preferred scale; omit VALUE to clear
    Intensity {
        exercise: usize,
        set: usize,
        value: Option<f64>,
    },
    /// Toggle completion of a set
    Done { exercise: usize, set: usize },
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Workout,
    Edit,
    Routine,
}

impl From<ModeArg> for StoreMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Workout => StoreMode::Workout,
            ModeArg::Edit => StoreMode::EditWorkout,
            ModeArg::Routine => StoreMode::Routine,
        }
    }
}

/// Prints notifications to the terminal
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify_success(&self, message: &str) {
        println!("✓ {}", message);
    }

    fn notify_error(&self, message: &str) {
        eprintln!("✗ {}", message);
    }

    fn notify_timer_done(&self) {
        println!("\x07⏰ Rest time is over!");
    }
}

/// Everything one invocation works on
struct App {
    config: Config,
    config_path: PathBuf,
    persister: SessionPersister<FileStore>,
    backend: LocalBackend<FileStore>,
    store: SessionStore,
    timer: RestTimer,
    notifier: ConsoleNotifier,
}

impl App {
    fn open(data_dir: &Path, config: Config, config_path: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(data_dir)?;
        let persister = SessionPersister::new(FileStore::new(data_dir.join("session")));
        let backend = LocalBackend::new(FileStore::new(data_dir.join("db")));
        let (store, timer) = persister.load_session();

        Ok(Self {
            config,
            config_path,
            persister,
            backend,
            store,
            timer,
            notifier: ConsoleNotifier,
        })
    }

    fn prefs(&self) -> Preferences {
        self.config.preferences
    }

    fn user_id(&self) -> String {
        self.config.user.user_id.clone()
    }

    /// Refresh the workout clock
    fn tick_clock(&mut self) {
        if let Some(workout) = self.store.workout() {
            let elapsed = (Utc::now() - workout.date).num_seconds().max(0);
            self.store
                .update_workout_duration(u32::try_from(elapsed).unwrap_or(u32::MAX));
        }
    }

    /// Let the timer observe the latest change and write everything back
    fn commit(&mut self) {
        self.timer.sync_store(&self.store, Utc::now());
        self.persister.save_session(&self.store, &self.timer);
    }

    fn invalid(&self, message: impl Into<String>) -> Error {
        let message = message.into();
        self.notifier.notify_error(&message);
        Error::Validation(message)
    }

    fn lookup_exercise(&mut self, id: &str) -> Result<Exercise> {
        let reference = flows::reference_data(&mut self.persister, &self.backend)?;
        match reference.find_exercise(id) {
            Some(exercise) => Ok(exercise.clone()),
            None => Err(self.invalid(format!("Unknown exercise: {}", id))),
        }
    }

    /// Fails when there is no active session to edit
    fn exercise_count(&self) -> Result<usize> {
        match self.store.active() {
            Some(active) => Ok(active.exercises().len()),
            None => Err(self.invalid(no_session_message(self.store.mode()))),
        }
    }

    /// Id of the exercise at a 1-based position in the active session
    fn exercise_at(&self, position: usize) -> Result<Uuid> {
        let Some(active) = self.store.active() else {
            return Err(self.invalid(no_session_message(self.store.mode())));
        };
        match position.checked_sub(1).and_then(|i| active.exercises().get(i)) {
            Some(exercise) => Ok(exercise.id),
            None => Err(self.invalid(format!("No exercise #{}", position))),
        }
    }
}

fn no_session_message(mode: StoreMode) -> &'static str {
    match mode {
        StoreMode::Workout => "No workout in progress",
        StoreMode::EditWorkout => "No workout being edited",
        StoreMode::Routine => "No routine being edited",
    }
}

/// Convert a 1-based position to an index; 0 maps to an index that never
/// matches, which the session store treats as a no-op
fn index(position: usize) -> usize {
    position.checked_sub(1).unwrap_or(usize::MAX)
}

fn main() -> ExitCode {
    // Initialize logging
    liftlog_core::logging::init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        // Already reported through the notifier
        Err(Error::Validation(_)) => ExitCode::FAILURE,
        Err(e) => {
            ConsoleNotifier.notify_error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let (config, config_path) = match cli.config {
        Some(path) if path.exists() => (Config::load_from(&path)?, path),
        Some(path) => (Config::default(), path),
        None => (Config::load()?, Config::default_config_path()),
    };
    let data_dir = cli
        .data_dir
        .unwrap_or_else(|| config.data.data_dir.clone());
    tracing::debug!("Using data directory {:?}", data_dir);

    let mut app = App::open(&data_dir, config, config_path)?;
    app.tick_clock();

    let result = dispatch(&mut app, cli.command.unwrap_or(Commands::Status));
    app.commit();
    result
}

fn dispatch(app: &mut App, command: Commands) -> Result<()> {
    match command {
        Commands::Start { routine } => cmd_start(app, routine),
        Commands::Mode { mode } => {
            app.store.set_store_mode(mode.into());
            println!("✓ Mode: {}", mode_label(app.store.mode()));
            Ok(())
        }
        Commands::Routine { action } => cmd_routine(app, action),
        Commands::Edit { workout_id } => {
            flows::start_editing_workout(&mut app.store, &app.backend, workout_id)?;
            println!("✓ Editing workout {}", workout_id);
            Ok(())
        }
        Commands::SaveEdit => {
            flows::save_edited_workout(&mut app.store, &mut app.backend, &app.notifier)?;
            Ok(())
        }
        Commands::Title { title } => {
            app.exercise_count()?;
            app.store.set_title(&title);
            println!("✓ Title: {}", title);
            Ok(())
        }
        Commands::Add { exercise_ids } => cmd_add(app, &exercise_ids),
        Commands::Replace {
            exercise,
            exercise_id,
        } => {
            let replacement = app.lookup_exercise(&exercise_id)?;
            app.exercise_at(exercise)?;
            app.store.replace_exercise(
                index(exercise),
                replacement,
                app.prefs().default_rest_seconds,
            );
            Ok(())
        }
        Commands::Remove { exercise } => {
            app.exercise_at(exercise)?;
            app.store.delete_exercise(index(exercise));
            Ok(())
        }
        Commands::Move { from, to } => cmd_move(app, from, to),
        Commands::Note { exercise, text } => {
            app.exercise_at(exercise)?;
            app.store.update_note(index(exercise), &text);
            Ok(())
        }
        Commands::Rest { exercise, seconds } => {
            app.exercise_at(exercise)?;
            let interval = if seconds == 0 { None } else { Some(seconds) };
            app.store.set_rest_time(index(exercise), interval);
            Ok(())
        }
        Commands::Set { action } => cmd_set(app, action),
        Commands::Status => cmd_status(app),
        Commands::Timer { once } => cmd_timer(app, once),
        Commands::Units { weight, intensity } => cmd_units(app, weight, intensity),
        Commands::Finish { update_routine } => cmd_finish(app, update_routine),
        Commands::Discard => {
            if app.store.workout().is_none() {
                return Err(app.invalid("No workout in progress"));
            }
            app.store.empty_workout();
            println!("✓ Workout discarded");
            Ok(())
        }
        Commands::History { days } => cmd_history(app, days),
        Commands::DeleteWorkout { workout_id } => {
            flows::delete_workout(&mut app.backend, &app.notifier, workout_id)
        }
        Commands::Export { path } => {
            let workouts = app
                .backend
                .fetch_workouts_with_exercises(&app.user_id(), app.prefs().weight_unit)?;
            let rows = export::workouts_to_csv(&workouts, &path)?;
            println!("✓ Exported {} sets to {}", rows, path.display());
            Ok(())
        }
        Commands::Exercises { query } => cmd_exercises(app, query),
    }
}

fn mode_label(mode: StoreMode) -> &'static str {
    match mode {
        StoreMode::Workout => "workout",
        StoreMode::EditWorkout => "edit",
        StoreMode::Routine => "routine",
    }
}

fn cmd_start(app: &mut App, routine: Option<Uuid>) -> Result<()> {
    if app.store.workout().is_some() {
        return Err(app.invalid("A workout is already in progress"));
    }

    match routine {
        Some(id) => flows::start_routine_workout(&mut app.store, &app.backend, id)?,
        None => {
            let (user_id, prefs) = (app.user_id(), app.prefs());
            app.store.new_workout(&user_id, &prefs);
            app.store.set_store_mode(StoreMode::Workout);
        }
    }

    if let Some(workout) = app.store.workout() {
        println!("✓ Started {}", workout.title);
    }
    Ok(())
}

fn cmd_routine(app: &mut App, action: RoutineCommand) -> Result<()> {
    match action {
        RoutineCommand::New { title } => {
            let (user_id, prefs) = (app.user_id(), app.prefs());
            app.store.new_routine(&user_id, &prefs);
            app.store.set_store_mode(StoreMode::Routine);
            app.store.set_title(&title);
            println!("✓ New routine: {}", title);
        }
        RoutineCommand::Open { routine_id } => {
            flows::open_routine(&mut app.store, &app.backend, routine_id)?;
            if let Some(routine) = app.store.routine() {
                println!("✓ Opened routine {}", routine.title);
            }
        }
        RoutineCommand::Save => {
            let saved = flows::save_routine(&mut app.store, &mut app.backend, &app.notifier)?;
            if let Some(id) = saved.id {
                println!("  id: {}", id);
            }
        }
        RoutineCommand::Discard => {
            app.store.empty_routine();
            if app.store.mode() == StoreMode::Routine {
                app.store.set_store_mode(StoreMode::Workout);
            }
            println!("✓ Routine discarded");
        }
        RoutineCommand::List => {
            let routines = app.backend.fetch_routines_with_exercises(&app.user_id())?;
            if routines.is_empty() {
                println!("No routines saved");
            }
            for routine in routines {
                let id = routine.id.map(|id| id.to_string()).unwrap_or_default();
                println!(
                    "{}  {}  ({} exercises, {} sets)",
                    id,
                    routine.title,
                    routine.workout_exercises.len(),
                    routine.sets
                );
            }
        }
        RoutineCommand::Delete { routine_id } => {
            flows::delete_routine(&mut app.backend, &app.notifier, routine_id)?;
        }
    }
    Ok(())
}

fn cmd_add(app: &mut App, exercise_ids: &[String]) -> Result<()> {
    app.exercise_count()?;

    let mut exercises = Vec::with_capacity(exercise_ids.len());
    for id in exercise_ids {
        exercises.push(app.lookup_exercise(id)?);
    }

    app.store
        .add_exercises(&exercises, app.prefs().default_rest_seconds);
    for exercise in &exercises {
        println!("✓ Added {}", exercise.name);
    }
    Ok(())
}

fn cmd_move(app: &mut App, from: usize, to: usize) -> Result<()> {
    let count = app.exercise_count()?;
    if from == 0 || from > count || to == 0 || to > count {
        return Err(app.invalid(format!("Positions must be between 1 and {}", count)));
    }

    let reordered = app
        .store
        .active()
        .map(|active| session::moved(active.exercises(), from - 1, to - 1))
        .unwrap_or_default();
    app.store.reorder_exercises(reordered);
    Ok(())
}

fn cmd_set(app: &mut App, action: SetCommand) -> Result<()> {
    match action {
        SetCommand::Add { exercise } => {
            let id = app.exercise_at(exercise)?;
            app.store.add_set(id);
        }
        SetCommand::Delete { exercise, set } => {
            let id = app.exercise_at(exercise)?;
            app.store.delete_set(id, index(set));
        }
        SetCommand::Reps {
            exercise,
            set,
            reps,
        } => {
            let id = app.exercise_at(exercise)?;
            app.store.change_reps(id, index(set), NumericInput::parse(&reps));
        }
        SetCommand::Weight {
            exercise,
            set,
            weight,
        } => {
            let id = app.exercise_at(exercise)?;
            app.store
                .change_weight(id, index(set), NumericInput::parse(&weight));
        }
        SetCommand::Type {
            exercise,
            set,
            set_type,
        } => {
            let set_type: SetType = match set_type.parse() {
                Ok(set_type) => set_type,
                Err(e) => return Err(app.invalid(e.to_string())),
            };
            let id = app.exercise_at(exercise)?;
            app.store.change_set_type(id, index(set), set_type);
        }
        SetCommand::Intensity {
            exercise,
            set,
            value,
        } => {
            let scale = app.prefs().intensity_scale;
            if value.is_some_and(|v| !v.is_finite()) {
                return Err(app.invalid("Intensity must be a number"));
            }
            if value.is_some() && scale == IntensityScale::None {
                return Err(app.invalid("Intensity tracking is turned off"));
            }
            let id = app.exercise_at(exercise)?;
            let intensity = value.map(|value| Intensity {
                scale,
                value: value.clamp(0.0, units::MAX_EFFORT),
            });
            app.store.set_intensity(id, index(set), intensity);
        }
        SetCommand::Done { exercise, set } => {
            let id = app.exercise_at(exercise)?;
            app.store.toggle_set_completion(id, index(set));
        }
    }
    Ok(())
}

fn cmd_status(app: &mut App) -> Result<()> {
    // Pick up changes made since the last invocation before reporting
    app.timer.sync_store(&app.store, Utc::now());

    println!("Mode: {}", mode_label(app.store.mode()));
    let Some(active) = app.store.active() else {
        println!("{}", no_session_message(app.store.mode()));
        return Ok(());
    };

    let aggregate = active.aggregate();
    let totals = total_sets(Some(aggregate));
    let unit = aggregate.units();

    let title = if active.title().is_empty() {
        "(untitled)"
    } else {
        active.title()
    };
    match active {
        ActiveSession::Workout(workout) | ActiveSession::EditWorkout(workout) => {
            let duration = workout.duration.map(format_time).unwrap_or_default();
            println!("{}  {}", title, duration);
            println!(
                "Sets: {}/{} ({:.0}%)  Volume: {} {}",
                totals.done,
                totals.total,
                workout_percentage(totals) * 100.0,
                units::round2(total_volume(aggregate, false)),
                unit
            );
        }
        ActiveSession::Routine(_) => {
            println!("{}", title);
            println!(
                "Sets: {}  Volume: {} {}",
                totals.total,
                units::round2(total_volume(aggregate, true)),
                unit
            );
        }
    }

    for (position, exercise) in active.exercises().iter().enumerate() {
        let exercise_totals = count_sets(std::slice::from_ref(exercise));
        let rest = exercise
            .set_interval
            .map(|s| format!("  [rest {}]", format_time(s)))
            .unwrap_or_default();
        println!(
            "{:>2}. {} ({}/{}){}",
            position + 1,
            exercise.exercise.name,
            exercise_totals.done,
            exercise_totals.total,
            rest
        );
        if !exercise.notes.is_empty() {
            println!("    note: {}", exercise.notes);
        }
        for (set_position, set) in exercise.sets.iter().enumerate() {
            let number = set
                .number
                .map(|n| n.to_string())
                .unwrap_or_else(|| set.set_type.label().to_string());
            let weight = match set.weight.value.value() {
                Some(_) => format!("{} {}", set.weight.value, set.weight.unit),
                None => "-".to_string(),
            };
            let reps = if set.reps.is_empty() {
                "-".to_string()
            } else {
                set.reps.to_string()
            };
            let intensity = set
                .intensity
                .map(|i| format!("  {} {}", i.scale, i.value))
                .unwrap_or_default();
            let done = if set.completed { "  ✓" } else { "" };
            println!(
                "    {}. [{}] {} x {}{}{}",
                set_position + 1,
                number,
                weight,
                reps,
                intensity,
                done
            );
        }
    }

    if let Some(remaining) = app.timer.remaining(Utc::now()) {
        println!("Rest: {} remaining", format_time(remaining));
    }
    Ok(())
}

fn cmd_timer(app: &mut App, once: bool) -> Result<()> {
    app.timer.sync_store(&app.store, Utc::now());

    loop {
        match app.timer.tick(Utc::now()) {
            Tick::Idle => {
                println!("No rest timer running");
                return Ok(());
            }
            Tick::Running { remaining, .. } => {
                if once {
                    println!("Rest: {} remaining", format_time(remaining));
                    return Ok(());
                }
                print!("\rRest: {:<12}", format_time(remaining));
                io::stdout().flush()?;
            }
            Tick::Expired { .. } => {
                if !once {
                    println!();
                }
                app.notifier.notify_timer_done();
                return Ok(());
            }
        }
        std::thread::sleep(Duration::from_secs(1));
    }
}

fn cmd_units(app: &mut App, weight: Option<String>, intensity: Option<String>) -> Result<()> {
    let mut prefs = app.prefs();
    if let Some(weight) = weight {
        prefs.weight_unit = weight.parse().map_err(|e: Error| app.invalid(e.to_string()))?;
    }
    if let Some(intensity) = intensity {
        prefs.intensity_scale = intensity
            .parse()
            .map_err(|e: Error| app.invalid(e.to_string()))?;
    }

    app.config.preferences = prefs;
    app.config.save_to(&app.config_path)?;
    app.store.convert_all_units(&prefs);
    println!(
        "✓ Units: {}, intensity: {}",
        prefs.weight_unit, prefs.intensity_scale
    );
    Ok(())
}

fn cmd_finish(app: &mut App, update_routine: bool) -> Result<()> {
    let finished = flows::finish_workout(&mut app.store, &mut app.backend, &app.notifier)?;

    if let Some(id) = finished.id {
        println!("  id: {}", id);
    }
    println!(
        "  {} sets, volume {} {}, time {}",
        finished.sets,
        finished.volume,
        finished.units,
        format_time(finished.duration.unwrap_or(0))
    );

    if update_routine {
        flows::update_routine_from_workout(&finished, &mut app.backend, &app.notifier)?;
    }
    Ok(())
}

fn cmd_history(app: &mut App, days: i64) -> Result<()> {
    let workouts = app
        .backend
        .fetch_workouts_with_exercises(&app.user_id(), app.prefs().weight_unit)?;
    let recent = history::recent_workouts(&workouts, days, Utc::now());

    if recent.is_empty() {
        println!("No workouts in the last {} days", days);
        return Ok(());
    }

    for workout in recent {
        let id = workout.id.map(|id| id.to_string()).unwrap_or_default();
        println!(
            "{}  {}  {}  {}  {} sets  {} {}",
            workout.date.format("%Y-%m-%d"),
            id,
            workout.title,
            format_time(workout.duration.unwrap_or(0)),
            workout.sets,
            workout.volume,
            workout.units
        );
    }
    Ok(())
}

fn cmd_exercises(app: &mut App, query: Option<String>) -> Result<()> {
    let reference = flows::reference_data(&mut app.persister, &app.backend)?;
    let exercises: Vec<&Exercise> = match &query {
        Some(query) => reference.search(query),
        None => reference.exercises.iter().collect(),
    };

    for exercise in exercises {
        println!(
            "{:<20} {:<24} {}",
            exercise.id, exercise.name, exercise.category
        );
    }
    Ok(())
}
