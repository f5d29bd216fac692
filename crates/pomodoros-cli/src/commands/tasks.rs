use clap::Subcommand;
use pomodoros_core::Config;

#[derive(Subcommand)]
pub enum TasksAction {
    /// List the tasks defined in the config file
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: TasksAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        TasksAction::List { json } => {
            let config = Config::load()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&config.tasks)?);
                return Ok(());
            }
            if config.tasks.is_empty() {
                println!("No tasks configured.");
                return Ok(());
            }
            println!(
                "{:<20} {:>6} {:>6} {:>6} {:>7}  {:<10} {:<12}",
                "NAME", "FOCUS", "SHORT", "LONG", "CYCLES", "ALARM", "BACKGROUND"
            );
            for task in &config.tasks {
                println!(
                    "{:<20} {:>6} {:>6} {:>6} {:>7}  {:<10} {:<12}",
                    task.name,
                    task.pomodoro_duration,
                    task.short_break_duration,
                    task.long_break_duration,
                    task.cycles,
                    task.pomodoro_alarm_sound,
                    task.pomodoro_background_sound,
                );
            }
        }
    }
    Ok(())
}
