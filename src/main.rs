use clap::Parser;
use miette::Result;
use tracing_subscriber::EnvFilter;

use cft::cli::{Cli, Commands};

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix
    // piping. Without this, piping to `head` or `grep -q` panics on broken pipe.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }

    // Install miette's fancy error handler
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;

    if global.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cft=debug")),
            )
            .with_writer(std::io::stderr)
            .init();
    }

    match cli.command {
        Commands::Init(args) => cft::cli::commands::init::run(args),
        Commands::Catalog(cmd) => cft::cli::commands::catalog::run(cmd, &global),
        Commands::Form(cmd) => cft::cli::commands::form::run(cmd, &global),
        Commands::Submit(args) => cft::cli::commands::submit::run(args, &global),
        Commands::Validate(args) => cft::cli::commands::validate::run(args, &global),
        Commands::Completions(args) => cft::cli::commands::completions::run(args),
    }
}
