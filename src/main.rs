use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::thread::sleep;
use std::time::Duration;

use clap::{Parser, Subcommand};
use colored::Colorize;
use hotwatch::notify::Event;
use hotwatch::{
    blocking::{Flow, Hotwatch},
    EventKind,
};
use miette::{bail, miette, IntoDiagnostic, LabeledSpan, Report, Result, Severity};

use civm::{Interpreter, Program, RunError};

/// civm runs programs written in a small 64-bit register assembly language.
#[derive(Parser)]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Quickly provide a `.asm` file to run
    path: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Run a `.asm` file and print its output to the terminal
    Run {
        /// `.asm` file to run
        name: PathBuf,
        /// Print error flag, condition flags and registers after the run
        #[arg(short, long)]
        state: bool,
        /// Only print program output, suited for blackbox tests
        #[arg(short, long)]
        minimal: bool,
    },
    /// Check a `.asm` file without running it
    Check {
        /// File to check
        name: PathBuf,
    },
    /// Place a watch on a `.asm` file to receive constant checker updates
    Watch {
        /// `.asm` file to watch
        name: PathBuf,
    },
}

fn main() -> miette::Result<()> {
    use MsgColor::*;
    let args = Args::parse();
    civm::env::init();
    civm::logger::init(civm::env::log_level());
    if civm::env::is_color_disabled() {
        colored::control::set_override(false);
    }

    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new() //
                .context_lines(civm::DIAGNOSTIC_CONTEXT_LINES)
                .build(),
        )
    }))?;

    match args.command {
        Some(Command::Run {
            name,
            state,
            minimal,
        }) => run(&name, state, minimal),
        Some(Command::Check { name }) => {
            file_message(Green, "Checking", &name);
            let contents = fs::read_to_string(&name).into_diagnostic()?;
            check(&contents)?;
            message(Green, "Success", "no errors found!");
            Ok(())
        }
        Some(Command::Watch { name }) => watch(name),
        None => {
            if let Some(path) = args.path {
                run(&path, false, false)
            } else {
                println!("\n~ civm v{VERSION} ~");
                println!("{SHORT_INFO}");
                Ok(())
            }
        }
    }
}

#[allow(unused)]
enum MsgColor {
    Green,
    Cyan,
    Red,
}

fn file_message(color: MsgColor, left: &str, right: &Path) {
    let right = format!("target {}", right.display());
    message(color, left, right.as_str());
}

/// Status lines go to stderr so that stdout only carries program output.
fn message<S>(color: MsgColor, left: S, right: S)
where
    S: Colorize + std::fmt::Display,
{
    let left = match color {
        MsgColor::Green => left.green(),
        MsgColor::Cyan => left.cyan(),
        MsgColor::Red => left.red(),
    };
    eprintln!("{left:>12} {right}");
}

fn run(name: &Path, state: bool, minimal: bool) -> Result<()> {
    if !minimal {
        file_message(MsgColor::Green, "Parsing", name);
    }
    let contents = fs::read_to_string(name).into_diagnostic()?;
    let program = Program::parse(&contents)?;

    if !minimal {
        message(MsgColor::Green, "Running", "parsed program");
    }
    let mut interp = Interpreter::new(&program, io::stdout());
    let res = interp.run();

    if state {
        interp.dump_state(io::stdout()).into_diagnostic()?;
    }
    io::stdout().flush().into_diagnostic()?;

    match res {
        Ok(()) => {
            if !minimal {
                file_message(MsgColor::Green, "Completed", name);
            }
            Ok(())
        }
        Err(e) => Err(runtime_report(e, &program, &contents)),
    }
}

/// Parse and validate without running.
fn check(contents: &str) -> Result<()> {
    let program = Program::parse(contents)?;
    let problems = program.validate();
    for problem in &problems {
        let mut labels = Vec::new();
        if let Some(span) = program.span(problem.idx) {
            labels.push(LabeledSpan::at(span, "fails when executed"));
        }
        let report = miette!(
            severity = Severity::Error,
            code = "check::command",
            labels = labels,
            "{}",
            problem.kind
        )
        .with_source_code(contents.to_owned());
        eprintln!("{report:?}");
    }
    if !problems.is_empty() {
        bail!(
            "found {} problem{}",
            problems.len(),
            if problems.len() == 1 { "" } else { "s" }
        );
    }
    Ok(())
}

fn runtime_report(e: RunError, program: &Program, contents: &str) -> Report {
    let code = match &e {
        RunError::Memory { .. } => "run::memory",
        RunError::ShiftAmount { .. } => "run::shift",
        RunError::UnresolvedLabel { .. } => "run::label",
        RunError::Output(_) => "run::output",
        RunError::Stopped => "run::stopped",
    };
    let labels = e
        .pc()
        .and_then(|pc| program.span(pc))
        .map(|span| vec![LabeledSpan::at(span, "failed here")])
        .unwrap_or_default();
    miette!(
        severity = Severity::Error,
        code = code,
        labels = labels,
        "{e}"
    )
    .with_source_code(contents.to_owned())
}

fn watch(name: PathBuf) -> Result<()> {
    use MsgColor::*;
    if !name.exists() {
        bail!("File does not exist. Exiting...")
    }
    // Vim breaks if watching a single file
    let folder_path = match name.parent() {
        Some(pth) if pth.is_dir() => pth.to_path_buf(),
        _ => Path::new(".").to_path_buf(),
    };

    // Clear screen and move cursor to top left
    print!("\x1B[2J\x1B[2;1H");
    file_message(Green, "Watching", &name);
    message(Cyan, "Help", "press CTRL+C to exit");

    let mut watcher =
        Hotwatch::new_with_custom_delay(Duration::from_millis(500)).into_diagnostic()?;

    watcher
        .watch(folder_path, move |event: Event| match event.kind {
            // Watch remove for vim changes
            EventKind::Modify(_) | EventKind::Remove(_) => {
                print!("\x1B[2J\x1B[2;1H");
                file_message(Green, "Watching", &name);
                message(Green, "Re-checking", "file change detected");
                message(Cyan, "Help", "press CTRL+C to exit");

                // Makes reruns more obvious
                sleep(Duration::from_millis(50));

                let contents = match fs::read_to_string(&name) {
                    Ok(cts) => cts,
                    Err(e) => {
                        eprintln!("{e}. Exiting...");
                        std::process::exit(1)
                    }
                };
                match check(&contents) {
                    Ok(()) => message(Green, "Success", "no errors found!"),
                    Err(e) => eprintln!("\n{:?}", e),
                }
                Flow::Continue
            }
            _ => Flow::Continue,
        })
        .into_diagnostic()?;
    watcher.run();
    Ok(())
}

const SHORT_INFO: &str = r"
Welcome to civm, an interpreter for a small 64-bit register assembly language.
Please use `-h` or `--help` to access the usage instructions and documentation.
";

const VERSION: &str = env!("CARGO_PKG_VERSION");
