use std::process::ExitCode;

use pr_manager::{
    Cli, GitHub, Palette, PromptConfirm, Terminal, dispatch, display::should_use_colors,
    get_github_token, parse_args,
};
use tracing::debug;

const EXIT_USAGE: u8 = 2;
const ENV_FILE: &str = ".env";

fn handle_clap_help_version(clap_err: &clap::Error) -> ExitCode {
    use clap::error::ErrorKind;
    match clap_err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            print!("{clap_err}");
            ExitCode::SUCCESS
        }
        _ => {
            eprint!("{clap_err}");
            ExitCode::from(EXIT_USAGE)
        }
    }
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let token = get_github_token(cli.token.as_deref())?;
    let forge = GitHub::new(token, cli.api_url.as_ref())?;

    let mut stdout = std::io::stdout();
    let mut confirm = PromptConfirm::stdio();
    let mut term = Terminal {
        out: &mut stdout,
        confirm: &mut confirm,
        palette: Palette::new(should_use_colors(cli.no_color)),
    };

    dispatch(&cli.command, &forge, &mut term).await
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Loaded before tracing so RUST_LOG may come from the file. Only the
    // working directory is consulted, never its parents.
    let env_file = dotenvy::from_path(ENV_FILE);
    init_tracing();
    match env_file {
        Ok(()) => debug!(path = ENV_FILE, "loaded environment file"),
        Err(err) => debug!(path = ENV_FILE, %err, "no environment file loaded"),
    }

    let cli = match parse_args(std::env::args_os()) {
        Ok(cli) => cli,
        Err(err) => {
            if let Some(clap_err) = err.downcast_ref::<clap::Error>() {
                return handle_clap_help_version(clap_err);
            }
            eprintln!("Error: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = run(cli).await {
        eprintln!("Error: {err}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
