use argh::FromArgs;
use ash_shell::builtin::{self, Output};
use ash_shell::{colors, ScriptedConsole, Shell, ShellConfig, Width};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(FromArgs)]
/// Interactive command shell with a few built-in commands.
struct Args {
    #[argh(option, short = 'p')]
    /// prompt text; defaults to $ASH_PROMPT or "ash> "
    prompt: Option<String>,

    #[argh(option, short = 'w')]
    /// render help text at this many columns instead of the terminal width
    width: Option<usize>,

    #[argh(option, short = 'c')]
    /// run this line instead of reading from the terminal; may be repeated
    exec: Vec<String>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Args = argh::from_env();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", colors::red(&format!("ash: {err:#}")));
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let mut config = ShellConfig::from_env();
    if let Some(prompt) = args.prompt {
        config.prompt = prompt;
    }
    if let Some(width) = args.width.filter(|w| *w > 0) {
        config.width = Width::Fixed(width);
    }

    let mut shell = if args.exec.is_empty() {
        config.prompt = colors::green(&config.prompt);
        Shell::terminal(&config)?
    } else {
        let mut shell = Shell::new(Box::new(ScriptedConsole::echoing(args.exec)));
        shell.set_width(config.width);
        shell
    };

    builtin::install(
        &shell.registry(),
        shell.stop_handle(),
        config.width,
        Output::stdout,
    )?;

    shell.start()?;
    Ok(())
}
