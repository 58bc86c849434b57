use clap::{Args, Parser, Subcommand, ValueEnum};
use fittrack_core::ai::{self, Estimator};
use fittrack_core::*;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fittrack")]
#[command(about = "Personal fitness, nutrition and cycle tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Act as if today were this date (YYYY-MM-DD)
    #[arg(long, global = true, value_parser = parse_date_arg)]
    date: Option<chrono::NaiveDate>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the day's meals, workouts, water and nutrition progress
    Day,

    /// Log, estimate or remove meals
    #[command(subcommand)]
    Meal(MealCommand),

    /// Add (or with a negative amount, remove) water in ml
    Water {
        #[arg(allow_hyphen_values = true)]
        delta_ml: i64,
    },

    /// Start, generate and edit workout sessions
    #[command(subcommand)]
    Workout(WorkoutCommand),

    /// Weekly nutrition plan
    #[command(subcommand)]
    Plan(PlanCommand),

    /// Log today's body weight in kg
    Weight { kg: f64 },

    /// Show or edit the profile
    #[command(subcommand)]
    Profile(ProfileCommand),

    /// Period tracking
    #[command(subcommand)]
    Cycle(CycleCommand),

    /// Aggregate nutrition, workout and cardio scores
    Stats,

    /// Export data as CSV
    #[command(subcommand)]
    Export(ExportCommand),
}

#[derive(Subcommand)]
enum MealCommand {
    /// Log a meal with explicit macros
    Add {
        name: String,
        #[command(flatten)]
        macros: MacroArgs,
    },
    /// Estimate a meal's macros from a description and log it
    Estimate { description: String },
    /// Remove a meal by id
    Remove { id: String },
}

#[derive(Args)]
struct MacroArgs {
    #[arg(long, default_value_t = 0.0)]
    calories: f64,
    #[arg(long, default_value_t = 0.0)]
    protein: f64,
    #[arg(long, default_value_t = 0.0)]
    carbs: f64,
    #[arg(long, default_value_t = 0.0)]
    fat: f64,
    #[arg(long, default_value_t = 0.0)]
    fiber: f64,
    #[arg(long, default_value_t = 0.0)]
    potassium: f64,
    #[arg(long, default_value_t = 0.0)]
    sodium: f64,
}

impl From<MacroArgs> for Macros {
    fn from(args: MacroArgs) -> Self {
        Macros {
            calories: args.calories,
            protein: args.protein,
            carbs: args.carbs,
            fat: args.fat,
            fiber: args.fiber,
            potassium: args.potassium,
            sodium: args.sodium,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Discipline {
    Strength,
    Cardio,
}

impl From<Discipline> for ExerciseType {
    fn from(d: Discipline) -> Self {
        match d {
            Discipline::Strength => ExerciseType::Strength,
            Discipline::Cardio => ExerciseType::Cardio,
        }
    }
}

#[derive(Subcommand)]
enum WorkoutCommand {
    /// Start a blank session
    Start { kind: Discipline },
    /// Generate a session from a free-text request
    Generate { kind: Discipline, request: String },
    /// Show the active session of a kind
    Active { kind: Discipline },
    /// Toggle a session's completed flag
    Toggle { id: String },
    /// Append a placeholder exercise to edit
    AddExercise { id: String },
    /// Remove the exercise at an index
    RemoveExercise { id: String, index: usize },
    /// Move an exercise to a new position
    MoveExercise { id: String, from: usize, to: usize },
    /// Change fields of the exercise at an index
    EditExercise {
        id: String,
        index: usize,
        #[command(flatten)]
        fields: ExerciseArgs,
    },
}

/// Fields that do not apply to the exercise's discipline are rejected
#[derive(Args)]
struct ExerciseArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    sets: Option<u32>,
    #[arg(long)]
    reps: Option<String>,
    /// kg
    #[arg(long)]
    weight: Option<f64>,
    /// km
    #[arg(long)]
    distance: Option<f64>,
    /// minutes
    #[arg(long)]
    duration: Option<f64>,
    #[arg(long)]
    intensity: Option<String>,
    /// Empty text clears the note
    #[arg(long)]
    notes: Option<String>,
}

impl ExerciseArgs {
    fn apply_to(self, mut exercise: Exercise) -> Result<Exercise> {
        for value in [self.weight, self.distance, self.duration].into_iter().flatten() {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::Validation(format!("Invalid value {}", value)));
            }
        }
        if let Some(name) = self.name {
            exercise.name = name;
        }
        if let Some(notes) = self.notes {
            exercise.notes = Some(notes).filter(|n| !n.is_empty());
        }

        match &mut exercise.kind {
            ExerciseKind::Strength { sets, reps, weight } => {
                if self.distance.is_some() || self.duration.is_some() || self.intensity.is_some() {
                    return Err(Error::Validation(
                        "distance, duration and intensity apply to cardio exercises".into(),
                    ));
                }
                if let Some(v) = self.sets {
                    *sets = v;
                }
                if let Some(v) = self.reps {
                    *reps = v;
                }
                if let Some(v) = self.weight {
                    *weight = v;
                }
            }
            ExerciseKind::Cardio {
                distance,
                duration,
                intensity,
            } => {
                if self.sets.is_some() || self.reps.is_some() || self.weight.is_some() {
                    return Err(Error::Validation(
                        "sets, reps and weight apply to strength exercises".into(),
                    ));
                }
                if let Some(v) = self.distance {
                    *distance = v;
                }
                if let Some(v) = self.duration {
                    *duration = v;
                }
                if let Some(v) = self.intensity {
                    *intensity = v;
                }
            }
        }
        Ok(exercise)
    }
}

#[derive(Subcommand)]
enum PlanCommand {
    /// Save the meals logged on the date as the plan template
    Save,
    /// Show the plan template
    Show,
    /// Add a meal with explicit macros to the plan
    Add {
        name: String,
        #[command(flatten)]
        macros: MacroArgs,
    },
    /// Estimate a meal's macros from a description and add it to the plan
    Estimate { description: String },
    /// Remove a planned meal by id
    Remove { id: String },
    /// Remove every planned meal
    Clear,
    /// Replace this week's meals with the plan
    Apply,
}

#[derive(Subcommand)]
enum ProfileCommand {
    /// Show the profile and body metrics
    Show,
    /// Update profile fields
    Set {
        #[arg(long)]
        name: Option<String>,
        /// cm
        #[arg(long)]
        height: Option<f64>,
        /// kg
        #[arg(long)]
        target_weight: Option<f64>,
        /// kcal
        #[arg(long)]
        calorie_goal: Option<f64>,
        /// ml
        #[arg(long)]
        water_goal: Option<f64>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    Standard,
    Custom,
}

#[derive(Subcommand)]
enum CycleCommand {
    /// Log a period start (defaults to today)
    Log {
        #[arg(long, value_parser = parse_date_arg)]
        start: Option<chrono::NaiveDate>,
        #[arg(long, default_value = "")]
        note: String,
    },
    /// Replace the note of a logged start
    Note {
        #[arg(value_parser = parse_date_arg)]
        start: chrono::NaiveDate,
        note: String,
    },
    /// Show the current cycle status
    Status,
    /// Show a month calendar (YYYY-MM, defaults to the current month)
    Calendar { month: Option<String> },
    /// Show or change cycle settings
    Settings {
        #[arg(long, value_enum)]
        mode: Option<Mode>,
        #[arg(long)]
        cycle_length: Option<u32>,
        #[arg(long)]
        period_length: Option<u32>,
        #[arg(long)]
        notifications: Option<bool>,
    },
}

#[derive(Subcommand)]
enum ExportCommand {
    /// Weight history as date,weight
    Weights { path: PathBuf },
    /// One summary row per logged day
    Days { path: PathBuf },
}

fn parse_date_arg(s: &str) -> std::result::Result<chrono::NaiveDate, String> {
    dates::parse_date(s).map_err(|e| e.to_string())
}

fn main() -> Result<()> {
    fittrack_core::logging::init();

    let cli = Cli::parse();

    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    let today = cli.date.unwrap_or_else(dates::today);
    tracing::debug!("Using data directory {:?} with today = {}", data_dir, today);
    let mut store = FileStore::new(data_dir);

    match cli.command {
        Commands::Day => cmd_day(&store, today),
        Commands::Meal(cmd) => cmd_meal(&mut store, today, cmd, &config),
        Commands::Water { delta_ml } => {
            let day = daily_log::update_water(&mut store, today, delta_ml)?;
            println!("Water on {}: {} ml", today, day.water_intake);
            Ok(())
        }
        Commands::Workout(cmd) => cmd_workout(&mut store, today, cmd, &config),
        Commands::Plan(cmd) => cmd_plan(&mut store, today, cmd, &config),
        Commands::Weight { kg } => {
            if !kg.is_finite() || kg <= 0.0 {
                return Err(Error::Validation(format!("Invalid weight {}", kg)));
            }
            let profile = profile::add_weight_log(&mut store, kg, today)?;
            println!("✓ Logged {:.1} kg for {}", profile.current_weight, today);
            Ok(())
        }
        Commands::Profile(cmd) => cmd_profile(&mut store, today, cmd),
        Commands::Cycle(cmd) => cmd_cycle(&mut store, today, cmd),
        Commands::Stats => {
            let stats = stats::calculate_stats_from_store(&store, today)?;
            println!("Nutrition: {}", stats.nutrition_score);
            println!("Workout:   {}", stats.workout_score);
            println!("Cardio:    {}", stats.cardio_score);
            println!("Average:   {}", stats.general_average);
            Ok(())
        }
        Commands::Export(cmd) => cmd_export(&store, today, cmd),
    }
}

fn cmd_day(store: &FileStore, today: chrono::NaiveDate) -> Result<()> {
    let day = daily_log::day(store, today)?;
    let profile = UserProfile::load(store, today)?;
    let summary = day.summary(profile.daily_calorie_goal, profile.daily_water_goal);

    println!("{}", today);
    println!(
        "  Calories: {:.0} / {:.0} kcal",
        summary.totals.calories, summary.calorie_goal
    );
    println!(
        "  Protein {:.0} g, Carbs {:.0} g, Fat {:.0} g",
        summary.totals.protein, summary.totals.carbs, summary.totals.fat
    );
    println!(
        "  Fiber {:.0}%, Potassium {:.0}%, Sodium {:.0}%",
        summary.micronutrients.fiber, summary.micronutrients.potassium, summary.micronutrients.sodium
    );
    println!(
        "  Water: {} ml ({:.0}%)",
        summary.water_intake, summary.water_percent
    );

    for meal in &day.meals {
        println!(
            "  [meal] {} {:.0} kcal ({})",
            meal.name, meal.macros.calories, meal.id
        );
    }
    for session in &day.workouts {
        print_session(session);
    }
    Ok(())
}

fn cmd_meal(
    store: &mut FileStore,
    today: chrono::NaiveDate,
    cmd: MealCommand,
    config: &Config,
) -> Result<()> {
    match cmd {
        MealCommand::Add { name, macros } => {
            let meal = MealItem::new(name, macros.into(), dates::now());
            let id = meal.id.clone();
            daily_log::add_meal(store, today, meal)?;
            println!("✓ Meal logged ({})", id);
        }
        MealCommand::Estimate { description } => {
            let estimator = ai::estimator_from_config(&config.ai);
            let estimate = ai::estimate_nutrition_or_default(estimator.as_ref(), &description);
            let meal = MealItem::new(estimate.name, estimate.macros, dates::now());
            println!(
                "✓ Logged {} ({:.0} kcal, {:.0} g protein) ({})",
                meal.name, meal.macros.calories, meal.macros.protein, meal.id
            );
            daily_log::add_meal(store, today, meal)?;
        }
        MealCommand::Remove { id } => {
            let day = daily_log::remove_meal(store, today, &id)?;
            println!("{} meals left on {}", day.meals.len(), today);
        }
    }
    Ok(())
}

fn cmd_workout(
    store: &mut FileStore,
    today: chrono::NaiveDate,
    cmd: WorkoutCommand,
    config: &Config,
) -> Result<()> {
    let session = match cmd {
        WorkoutCommand::Start { kind } => {
            workout::start_workout(store, today, kind.into(), dates::now())?
        }
        WorkoutCommand::Generate { kind, request } => {
            let estimator: Box<dyn Estimator> = ai::estimator_from_config(&config.ai);
            let plan = ai::generate_workout_or_default(estimator.as_ref(), &request, kind.into());
            let session = WorkoutSession::from_plan(plan, kind.into(), dates::now());
            daily_log::add_workout(store, today, session.clone())?;
            session
        }
        WorkoutCommand::Active { kind } => {
            let day = daily_log::day(store, today)?;
            let kind = WorkoutType::from(ExerciseType::from(kind));
            match workout::active_session(&day, kind) {
                Some(session) => print_session(session),
                None => println!("No {:?} session on {}", kind, today),
            }
            return Ok(());
        }
        WorkoutCommand::Toggle { id } => workout::edit_workout(store, today, &id, |s| {
            s.toggle_complete();
            Ok(())
        })?,
        WorkoutCommand::AddExercise { id } => workout::edit_workout(store, today, &id, |s| {
            s.add_exercise();
            Ok(())
        })?,
        WorkoutCommand::RemoveExercise { id, index } => {
            workout::edit_workout(store, today, &id, |s| s.remove_exercise(index).map(|_| ()))?
        }
        WorkoutCommand::MoveExercise { id, from, to } => {
            workout::edit_workout(store, today, &id, |s| s.move_exercise(from, to))?
        }
        WorkoutCommand::EditExercise { id, index, fields } => {
            workout::edit_workout(store, today, &id, |s| {
                let current = s
                    .exercises
                    .get(index)
                    .cloned()
                    .ok_or_else(|| Error::Validation(format!("No exercise at index {}", index)))?;
                s.update_exercise(index, fields.apply_to(current)?)
            })?
        }
    };

    print_session(&session);
    Ok(())
}

fn print_session(session: &WorkoutSession) {
    let mark = if session.completed { "✓" } else { " " };
    println!(
        "  [{}] {} {:?} ({})",
        mark, session.name, session.kind, session.id
    );
    for (i, exercise) in session.exercises.iter().enumerate() {
        match &exercise.kind {
            ExerciseKind::Strength { sets, reps, weight } => println!(
                "      {}. {} {} x {} @ {} kg",
                i, exercise.name, sets, reps, weight
            ),
            ExerciseKind::Cardio {
                distance,
                duration,
                intensity,
            } => println!(
                "      {}. {} {} km, {} min, {}",
                i, exercise.name, distance, duration, intensity
            ),
        }
    }
}

fn cmd_plan(
    store: &mut FileStore,
    today: chrono::NaiveDate,
    cmd: PlanCommand,
    config: &Config,
) -> Result<()> {
    match cmd {
        PlanCommand::Save => {
            let day = daily_log::day(store, today)?;
            let plan = plan::save_nutrition_plan(store, day.meals, dates::now())?;
            println!("✓ Plan saved with {} meals", plan.meals.len());
        }
        PlanCommand::Show => match NutritionPlan::load(store)? {
            Some(plan) => {
                for meal in &plan.meals {
                    println!(
                        "  {} {:.0} kcal ({})",
                        meal.name, meal.macros.calories, meal.id
                    );
                }
            }
            None => println!("No nutrition plan saved"),
        },
        PlanCommand::Add { name, macros } => {
            let meal = MealItem::new(name, macros.into(), dates::now());
            let id = meal.id.clone();
            let plan = plan::add_plan_meal(store, meal, dates::now())?;
            println!("✓ Added to plan ({}), {} meals", id, plan.meals.len());
        }
        PlanCommand::Estimate { description } => {
            let estimator = ai::estimator_from_config(&config.ai);
            let estimate = ai::estimate_nutrition_or_default(estimator.as_ref(), &description);
            let meal = MealItem::new(estimate.name, estimate.macros, dates::now());
            println!(
                "✓ Planned {} ({:.0} kcal, {:.0} g protein) ({})",
                meal.name, meal.macros.calories, meal.macros.protein, meal.id
            );
            plan::add_plan_meal(store, meal, dates::now())?;
        }
        PlanCommand::Remove { id } => {
            if plan::remove_plan_meal(store, &id, dates::now())? {
                println!("✓ Removed {} from plan", id);
            } else {
                println!("No planned meal with id {}", id);
            }
        }
        PlanCommand::Clear => {
            plan::clear_nutrition_plan(store, dates::now())?;
            println!("✓ Plan cleared");
        }
        PlanCommand::Apply => match plan::apply_plan_to_week(store, today)? {
            Some(week) => println!("✓ Plan applied to {} through {}", week[0], week[6]),
            None => println!("No nutrition plan saved"),
        },
    }
    Ok(())
}

fn cmd_profile(store: &mut FileStore, today: chrono::NaiveDate, cmd: ProfileCommand) -> Result<()> {
    let profile = match cmd {
        ProfileCommand::Show => UserProfile::load(store, today)?,
        ProfileCommand::Set {
            name,
            height,
            target_weight,
            calorie_goal,
            water_goal,
        } => {
            for value in [height, target_weight, calorie_goal, water_goal]
                .into_iter()
                .flatten()
            {
                if !value.is_finite() || value <= 0.0 {
                    return Err(Error::Validation(format!("Invalid value {}", value)));
                }
            }
            profile::update_profile(
                store,
                ProfileUpdate {
                    name,
                    height,
                    target_weight,
                    daily_calorie_goal: calorie_goal,
                    daily_water_goal: water_goal,
                },
                today,
            )?
        }
    };

    println!("{}", profile.name);
    println!("  Height: {:.0} cm", profile.height);
    println!(
        "  Weight: {:.1} kg (start {:.1}, target {:.1})",
        profile.current_weight, profile.start_weight, profile.target_weight
    );
    if let (Some(bmi), Some(category)) = (profile.bmi(), profile.bmi_category()) {
        println!("  BMI: {:.1} ({:?})", bmi, category);
    }
    println!(
        "  Change: {:+.1} kg, {:.1} kg to go, {:.0}% of goal",
        profile.weight_change(),
        profile.remaining_to_target(),
        profile.goal_progress()
    );
    println!(
        "  Goals: {:.0} kcal, {:.0} ml water",
        profile.daily_calorie_goal, profile.daily_water_goal
    );
    Ok(())
}

fn cmd_cycle(store: &mut FileStore, today: chrono::NaiveDate, cmd: CycleCommand) -> Result<()> {
    match cmd {
        CycleCommand::Log { start, note } => {
            let start = start.unwrap_or(today);
            cycle::log_period_start(store, start, &note)?;
            println!("✓ Period start logged for {}", start);
            print_status(&cycle::calculate_cycle_status(store, today)?);
        }
        CycleCommand::Note { start, note } => {
            let data = cycle::update_period_note(store, start, &note)?;
            if data.history.iter().any(|r| r.start_date == start) {
                println!("✓ Note updated for {}", start);
            } else {
                println!("No period logged on {}", start);
            }
        }
        CycleCommand::Status => print_status(&cycle::calculate_cycle_status(store, today)?),
        CycleCommand::Calendar { month } => {
            let (year, month) = match month {
                Some(m) => dates::parse_month(&m)?,
                None => {
                    use chrono::Datelike;
                    (today.year(), today.month())
                }
            };
            let calendar = CycleData::load(store)?.month_calendar(year, month, today)?;
            print_calendar(&calendar);
        }
        CycleCommand::Settings {
            mode,
            cycle_length,
            period_length,
            notifications,
        } => {
            let current = CycleData::load(store)?;
            let mut settings = current.settings();
            if let Some(len) = cycle_length {
                settings.cycle_length = len;
                settings.prediction_mode = PredictionMode::Custom;
            }
            if let Some(len) = period_length {
                settings.period_length = len;
                settings.prediction_mode = PredictionMode::Custom;
            }
            if let Some(mode) = mode {
                settings.set_mode(match mode {
                    Mode::Standard => PredictionMode::Standard,
                    Mode::Custom => PredictionMode::Custom,
                });
            }
            if let Some(enabled) = notifications {
                settings.notifications_enabled = enabled;
            }

            let data = if settings == current.settings() {
                current
            } else {
                cycle::update_settings(store, settings)?
            };
            println!(
                "Cycle {} days, period {} days, {:?} mode, notifications {}",
                data.cycle_length,
                data.period_length,
                data.prediction_mode,
                if data.notifications_enabled { "on" } else { "off" }
            );
        }
    }
    Ok(())
}

fn print_status(status: &CycleStatus) {
    match status.next_date {
        Some(next) => {
            println!("Status: {:?}", status.status);
            println!("Next period: {} ({})", next, status.alert_message());
            if status.is_period_now {
                println!("Period in progress");
            }
        }
        None => println!("Status: Unknown (no period logged)"),
    }
}

fn print_calendar(calendar: &MonthCalendar) {
    println!("{}-{:02}", calendar.year, calendar.month);
    println!(" Mo Tu We Th Fr Sa Su");
    let mut line = "   ".repeat(calendar.leading_blanks as usize);
    let mut column = calendar.leading_blanks;
    for (date, class) in &calendar.days {
        use chrono::Datelike;
        let marker = match class {
            DayClass::History => '*',
            DayClass::Predicted => '+',
            DayClass::Today => '>',
            DayClass::Neutral => ' ',
        };
        line.push_str(&format!("{}{:2}", marker, date.day()));
        column += 1;
        if column % 7 == 0 {
            println!("{}", line);
            line.clear();
        }
    }
    if !line.is_empty() {
        println!("{}", line);
    }
    println!("* logged  + predicted  > today");
}

fn cmd_export(store: &FileStore, today: chrono::NaiveDate, cmd: ExportCommand) -> Result<()> {
    match cmd {
        ExportCommand::Weights { path } => {
            let profile = UserProfile::load(store, today)?;
            let count = export::export_weight_history(&profile, &path)?;
            println!("✓ Exported {} weight records to {}", count, path.display());
        }
        ExportCommand::Days { path } => {
            let logs = DailyLogs::load(store)?;
            let count = export::export_daily_summaries(&logs, &path)?;
            println!("✓ Exported {} days to {}", count, path.display());
        }
    }
    Ok(())
}
