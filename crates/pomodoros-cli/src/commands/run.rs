use std::sync::Arc;

use clap::Args;
use pomodoros_core::timer::MIN_TICK_INTERVAL_MS;
use pomodoros_core::{
    Config, Event, OrchestratorOptions, Preferences, Services, SessionOrchestrator, TaskConfig,
};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::terminal::{TerminalIndicator, TerminalOutput};

#[derive(Args)]
pub struct RunArgs {
    /// Name of a task from the config file
    #[arg(
        long,
        conflicts_with_all = [
            "name",
            "focus",
            "short_break",
            "long_break",
            "cycles",
            "alarm",
            "background",
        ]
    )]
    task: Option<String>,
    /// Task name for an inline task
    #[arg(long, default_value = "Pomodoro")]
    name: String,
    /// Focus minutes
    #[arg(long)]
    focus: Option<u32>,
    /// Short break minutes
    #[arg(long)]
    short_break: Option<u32>,
    /// Long break minutes
    #[arg(long)]
    long_break: Option<u32>,
    /// Focus cycles before the long break
    #[arg(long)]
    cycles: Option<u32>,
    /// Alarm sound id for every phase
    #[arg(long)]
    alarm: Option<String>,
    /// Ambient sound id for every phase
    #[arg(long)]
    background: Option<String>,
    /// Tick interval in milliseconds, at least 100 (overrides the config)
    #[arg(long, value_parser = clap::value_parser!(u64).range(MIN_TICK_INTERVAL_MS..))]
    tick_ms: Option<u64>,
}

/// A line typed while the session runs.
#[derive(Debug, PartialEq, Eq)]
enum Input {
    Pause,
    Resume,
    Restart,
    Stop,
    Status,
    AlarmVolume(u8),
    AmbientVolume(u8),
    Quit,
}

fn parse_input(line: &str) -> Result<Input, String> {
    let mut words = line.split_whitespace();
    let command = words.next().unwrap_or_default();
    let volume = |arg: Option<&str>| -> Result<u8, String> {
        let arg = arg.ok_or_else(|| format!("{command} needs a value 0-100"))?;
        arg.parse::<u8>()
            .ok()
            .filter(|v| *v <= 100)
            .ok_or_else(|| format!("invalid volume: {arg}"))
    };
    match command {
        "pause" => Ok(Input::Pause),
        "resume" => Ok(Input::Resume),
        "restart" => Ok(Input::Restart),
        "stop" => Ok(Input::Stop),
        "status" => Ok(Input::Status),
        "alarm-volume" => volume(words.next()).map(Input::AlarmVolume),
        "ambient-volume" => volume(words.next()).map(Input::AmbientVolume),
        "quit" | "exit" => Ok(Input::Quit),
        other => Err(format!("unknown command: {other}")),
    }
}

fn build_task(args: &RunArgs, config: &Config) -> Result<TaskConfig, Box<dyn std::error::Error>> {
    if let Some(name) = &args.task {
        let task = config
            .task(name)
            .ok_or_else(|| format!("no task named '{name}' in config"))?;
        return Ok(task.clone());
    }
    let defaults = TaskConfig::new(args.name.clone());
    let mut task = defaults.clone().with_durations(
        args.focus.unwrap_or(defaults.pomodoro_duration),
        args.short_break.unwrap_or(defaults.short_break_duration),
        args.long_break.unwrap_or(defaults.long_break_duration),
    );
    if let Some(cycles) = args.cycles {
        task = task.with_cycles(cycles);
    }
    if let Some(alarm) = &args.alarm {
        task = task.with_alarm(alarm);
    }
    if let Some(background) = &args.background {
        task = task.with_background(background);
    }
    Ok(task)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let task = build_task(&args, &config)?;
    let mut options = OrchestratorOptions::from_config(&config);
    if let Some(tick_ms) = args.tick_ms {
        options.tick_interval_ms = tick_ms;
    }
    let prefs = Arc::new(Preferences::from_config(&config));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(session(task, options, prefs))
}

async fn session(
    task: TaskConfig,
    options: OrchestratorOptions,
    prefs: Arc<Preferences>,
) -> Result<(), Box<dyn std::error::Error>> {
    let services = Services::new(TerminalOutput)
        .with_preferences(prefs.clone())
        .with_indicator(Arc::new(TerminalIndicator));
    let orchestrator = SessionOrchestrator::spawn(services, options);
    let mut observer = orchestrator.subscribe();
    orchestrator.start(task).await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            event = observer.recv() => {
                let Some(event) = event else { break };
                print_json(&event)?;
                if matches!(event, Event::SessionFinished { .. }) {
                    break;
                }
            }
            line = lines.next_line(), if stdin_open => {
                let Some(line) = line? else {
                    stdin_open = false;
                    // Nothing left to wait for once input is gone and no session runs.
                    if orchestrator.current_snapshot().is_none() {
                        break;
                    }
                    continue;
                };
                if line.trim().is_empty() {
                    continue;
                }
                let input = match parse_input(&line) {
                    Ok(input) => input,
                    Err(message) => {
                        eprintln!("{message}");
                        continue;
                    }
                };
                let outcome = match input {
                    Input::Pause => orchestrator.pause().await,
                    Input::Resume => orchestrator.resume().await,
                    Input::Restart => orchestrator.restart().await,
                    Input::Stop => orchestrator.stop().await,
                    Input::Status => {
                        print_json(&orchestrator.current_snapshot())?;
                        Ok(())
                    }
                    Input::AlarmVolume(volume) => {
                        prefs.set_alarm_volume(volume);
                        Ok(())
                    }
                    Input::AmbientVolume(volume) => {
                        prefs.set_ambient_volume(volume);
                        Ok(())
                    }
                    Input::Quit => break,
                };
                if let Err(e) = outcome {
                    eprintln!("error: {e}");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupted");
                break;
            }
        }
    }

    orchestrator.stop().await?;
    while let Some(event) = observer.try_recv() {
        print_json(&event)?;
    }
    orchestrator.shutdown().await?;
    Ok(())
}
