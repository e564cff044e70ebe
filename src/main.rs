use anyhow::{Context, Result, bail};
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use strum::IntoEnumIterator;
use tokio::runtime::Runtime;

use dual_charts::config::AppConfig;
use dual_charts::data::discovery::select_data_file;
use dual_charts::data::loader::{JSON_SIGNATURE, providers_for, write_cache_async};
use dual_charts::data::get_dataset_async;
use dual_charts::domain::DrawingTool;
use dual_charts::engine::{
    DirectorySink, DualChartController, ExportImage, ExportSink, ProjectArchive,
};
use dual_charts::input::{Action, DispatchOutcome, InputDispatch, InputEvent, KeyChord};
use dual_charts::{Cli, PaneId, run_app};

/// One line typed at the prompt.
#[derive(Debug, Clone, PartialEq)]
enum Command {
    Next,
    Previous,
    Goto(usize),
    Timeframe(PaneId, String),
    Tool(PaneId, DrawingTool),
    Click(PaneId, f64, f64),
    Measure(PaneId, f64, f64),
    ClearTools(PaneId),
    ClearMeasurements,
    Maximize(PaneId),
    Restore,
    Key(PaneId, KeyChord),
    Screenshot,
    Project(String),
    Info,
    Help,
    Quit,
}

const HELP: &str = "\
n | p                 next / previous chart
g <index>             go to chart (1-based)
tf <pane> <label>     set pane timeframe (1D 4H 1H 15M 5M 1M)
tool <pane> <kind>    arm trend | horizontal | ray
click <pane> <x> <y>  place drawing at pane position (0..1)
m <pane> <x> <y>      measurement click at pane position (0..1)
cleartools <pane>     clear pane drawings
clear                 clear all measurements
max <pane> | restore  layout
key <pane> <chord>    press a bound key, e.g. key 1 shift+1
s                     save screenshots
project <name>        move screenshots into a project folder
i | h | q             info / help / quit";

fn parse_pane(text: Option<&str>) -> Result<PaneId> {
    let text = text.context("missing pane (1 or 2)")?;
    PaneId::parse(text).context(format!("unknown pane '{}'", text))
}

fn parse_frac(text: Option<&str>) -> Result<f64> {
    let text = text.context("missing coordinate")?;
    text.parse::<f64>()
        .context(format!("bad coordinate '{}'", text))
}

fn parse_command(line: &str) -> Result<Command> {
    let mut parts = line.split_whitespace();
    let Some(head) = parts.next() else {
        bail!("empty command");
    };
    let command = match head.to_ascii_lowercase().as_str() {
        "n" | "next" => Command::Next,
        "p" | "prev" => Command::Previous,
        "g" | "goto" => {
            let n: usize = parts
                .next()
                .context("missing index")?
                .parse()
                .context("index must be a number")?;
            if n == 0 {
                bail!("indices start at 1");
            }
            Command::Goto(n - 1)
        }
        "tf" => {
            let pane = parse_pane(parts.next())?;
            Command::Timeframe(pane, parts.next().context("missing timeframe")?.to_string())
        }
        "tool" => {
            let pane = parse_pane(parts.next())?;
            let name = parts.next().context("missing tool")?;
            let tool = DrawingTool::iter()
                .find(|t| t.to_string().eq_ignore_ascii_case(name))
                .context(format!("unknown tool '{}'", name))?;
            Command::Tool(pane, tool)
        }
        "click" => Command::Click(
            parse_pane(parts.next())?,
            parse_frac(parts.next())?,
            parse_frac(parts.next())?,
        ),
        "m" | "measure" => Command::Measure(
            parse_pane(parts.next())?,
            parse_frac(parts.next())?,
            parse_frac(parts.next())?,
        ),
        "cleartools" => Command::ClearTools(parse_pane(parts.next())?),
        "clear" => Command::ClearMeasurements,
        "max" => Command::Maximize(parse_pane(parts.next())?),
        "restore" => Command::Restore,
        "key" => {
            let pane = parse_pane(parts.next())?;
            let chord = parts.next().context("missing key chord")?;
            Command::Key(
                pane,
                KeyChord::parse(chord).context(format!("bad key chord '{}'", chord))?,
            )
        }
        "s" | "shot" => Command::Screenshot,
        "project" => Command::Project(parts.next().context("missing project name")?.to_string()),
        "i" | "info" => Command::Info,
        "h" | "help" | "?" => Command::Help,
        "q" | "quit" | "exit" => Command::Quit,
        other => bail!("unknown command '{}' (h for help)", other),
    };
    Ok(command)
}

fn describe(controller: &DualChartController) -> String {
    let pane_text = |pane: PaneId| {
        let state = controller.pane(pane);
        let hidden = if controller.layout().is_visible(pane) {
            ""
        } else {
            " (hidden)"
        };
        if state.is_fallback() {
            format!(
                "{}: {} [{} n/a]{}",
                pane,
                state.timeframe(),
                state.requested_timeframe(),
                hidden
            )
        } else {
            format!("{}: {}{}", pane, state.timeframe(), hidden)
        }
    };
    match controller.metadata() {
        Ok(meta) => format!(
            "{}/{} {} {} | {} | {}",
            meta.index + 1,
            controller.store().instrument_count(),
            meta.ticker,
            meta.date_str,
            pane_text(PaneId::Left),
            pane_text(PaneId::Right)
        ),
        Err(e) => e.to_string(),
    }
}

fn save_screenshots(controller: &DualChartController) -> Result<()> {
    let images = controller.export_batch()?;
    persist(controller, &images)
}

fn persist(controller: &DualChartController, images: &[ExportImage]) -> Result<()> {
    let mut sink = DirectorySink::new(controller.config().screenshot_dir());
    for record in sink.persist(images)? {
        println!("  {} -> {}", record.pane, record.path.display());
    }
    Ok(())
}

/// Returns false when the loop should stop.
fn execute(
    controller: &mut DualChartController,
    dispatch: &InputDispatch,
    command: Command,
) -> Result<bool> {
    match command {
        Command::Next => {
            InputDispatch::run(controller, PaneId::Left, Action::NextInstrument)?;
        }
        Command::Previous => {
            InputDispatch::run(controller, PaneId::Left, Action::PreviousInstrument)?;
        }
        Command::Goto(index) => {
            controller.jump_to(index)?;
        }
        Command::Timeframe(pane, label) => {
            let tf = controller.set_pane_timeframe(pane, &label)?;
            println!("{} now shows {}", pane, tf);
        }
        Command::Tool(pane, tool) => {
            InputDispatch::run(controller, pane, Action::ArmTool(tool))?;
            println!("{} armed on {}", tool, pane);
        }
        Command::Click(pane, x, y) => {
            if let Some(id) = controller.click(pane, x, y)? {
                println!("Drawing {} placed on {}", id.0, pane);
            }
        }
        Command::Measure(pane, x, y) => match controller.double_click(pane, x, y)? {
            Some(m) => println!("{}", m.label()),
            None => println!("First point set on {}", pane),
        },
        Command::ClearTools(pane) => {
            controller.disarm_tool(pane);
            println!("Removed {} drawings", controller.clear_toolbox(pane));
        }
        Command::ClearMeasurements => {
            controller.clear_all_measurements();
        }
        Command::Maximize(pane) => {
            controller.maximize(pane);
        }
        Command::Restore => {
            controller.restore();
        }
        Command::Key(pane, chord) => {
            let outcome = dispatch.dispatch(controller, InputEvent::Key { pane, chord })?;
            if let DispatchOutcome::Screenshots(images) = &outcome {
                persist(controller, images)?;
            } else {
                log::debug!("{:?}", outcome);
            }
        }
        Command::Screenshot => save_screenshots(controller)?,
        Command::Project(name) => {
            let archive = ProjectArchive::new(controller.config().screenshot_dir());
            let index = archive.archive(&name)?;
            println!(
                "{} screenshots moved to {} (index {})",
                index.rows.len(),
                index.folder.display(),
                index.index_path.display()
            );
        }
        Command::Info => {}
        Command::Help => println!("{}", HELP),
        Command::Quit => return Ok(false),
    }
    Ok(true)
}

fn save_preferences(controller: &mut DualChartController, path: &Path) {
    if !controller.preferences_dirty() {
        return;
    }
    match controller.config().save(path) {
        Ok(()) => controller.mark_preferences_saved(),
        Err(e) => log::error!("Failed to save preferences: {:#}", e),
    }
}

fn command_loop(controller: &mut DualChartController, config_path: &Path) -> Result<()> {
    let dispatch = InputDispatch::default();
    let stdin = io::stdin();
    println!("{}", describe(controller));
    loop {
        print!("> ");
        io::stdout().flush().context("Failed to flush stdout")?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).context("Failed to read input")? == 0 {
            break;
        }
        if line.trim().is_empty() {
            continue;
        }

        let keep_going = match parse_command(&line) {
            Ok(command) => execute(controller, &dispatch, command).unwrap_or_else(|e| {
                // Every failure is local: report it and keep the session alive.
                println!("⚠️  {:#}", e);
                true
            }),
            Err(e) => {
                println!("⚠️  {:#}", e);
                true
            }
        };
        save_preferences(controller, config_path);
        if !keep_going {
            break;
        }
        println!("{}", describe(controller));
    }
    Ok(())
}

fn main() -> Result<()> {
    // A. Init Logging
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    // B. Parse Args
    let args = Cli::parse();
    #[cfg(debug_assertions)]
    log::info!("Parsed arguments: {:?}", args);

    let mut config = AppConfig::load(&args.config)?;
    let source: PathBuf = select_data_file(&config, args.data.as_deref())?;

    // C. Data Loading (Blocking)
    let rt = Runtime::new().context("Failed to create Tokio runtime")?;
    let providers = providers_for(source.clone(), args.prefer_cache);
    let (dataset, signature) = rt.block_on(get_dataset_async(&providers))?;
    log::info!("Loaded {} via {}", source.display(), signature);

    // D. Background Cache Write
    let cache_task = (signature == JSON_SIGNATURE).then(|| {
        let cache_data = dataset.clone();
        rt.spawn(write_cache_async(source.clone(), cache_data))
    });

    let store = dataset.into_store()?;
    if let Some(name) = source.file_name().and_then(|n| n.to_str()) {
        if config.remember_file(name) {
            if let Err(e) = config.save(&args.config) {
                log::error!("Failed to save preferences: {:#}", e);
            }
        }
    }

    // E. Run
    let mut controller = run_app(store, config, args.single)?;
    command_loop(&mut controller, &args.config)?;

    if let Some(task) = cache_task {
        match rt.block_on(task) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => log::error!("⚠️  Failed to write cache: {:#}", e),
            Err(e) => log::error!("⚠️  Cache task aborted: {}", e),
        }
    }
    Ok(())
}
