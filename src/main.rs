use autoindex_viewer::controller::{GalleryController, NavOutcome};
use autoindex_viewer::state::View;
use autoindex_viewer::transport::{HttpTransport, Transport};
use autoindex_viewer::{config, output, urls};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "autoindex-viewer")]
#[command(about = "Browse the images of an Apache directory listing")]
#[command(long_about = "\
Browse the images of an Apache directory listing

Point it at any \"Index of /\" page served by mod_autoindex. Image links
(jpg, jpeg, png, gif, bmp, webp by default) become a gallery you can step
through; everything else on the page is ignored.

With --subdirs, each subdirectory of the listing is a gallery of its own:

  http://host/photos/
  ├── 2023/          ◄ subdirectory 1: its images are shown first
  │   ├── a.jpg
  │   └── b.jpg
  └── 2024/          ◄ subdirectory 2
      └── c.jpg

Set RUST_LOG=debug to see every request.

Run 'autoindex-viewer gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Config file (default: ./config.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Open a listing and step through its images interactively
    Browse(BrowseArgs),
    /// Fetch a listing and print what the parser finds in it
    List(ListArgs),
    /// Print a stock config.toml with all options documented
    GenConfig,
}

#[derive(clap::Args)]
struct BrowseArgs {
    /// Base URL of the directory listing
    url: String,
    /// Treat subdirectories as galleries
    #[arg(long)]
    subdirs: bool,
    /// Print the view as JSON after every command
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args)]
struct ListArgs {
    /// URL of the directory listing
    url: String,
    /// Include subdirectories
    #[arg(long)]
    subdirs: bool,
    /// Show every anchor with its classification, including ignored ones
    #[arg(long)]
    all: bool,
    /// Print JSON instead of a numbered list
    #[arg(long)]
    json: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Browse(args) => {
            let config = resolve_config(cli.config.as_deref())?;
            browse(&config, &args)?;
        }
        Command::List(args) => {
            let config = resolve_config(cli.config.as_deref())?;
            list(&config, &args)?;
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// An explicit `--config` must exist; otherwise `./config.toml` is optional.
fn resolve_config(path: Option<&Path>) -> Result<config::ViewerConfig, config::ConfigError> {
    match path {
        Some(path) => config::load_config_file(path),
        None => config::load_config(Path::new(".")),
    }
}

// ============================================================================
// browse
// ============================================================================

/// One line of input in the `browse` loop.
#[derive(Debug, PartialEq, Eq)]
enum ReplCommand {
    NextImage,
    PrevImage,
    FirstImage,
    LastImage,
    NextSubdir,
    PrevSubdir,
    SeekImage(String),
    SeekSubdir(String),
    ToggleSubdirs,
    Show,
    Help,
    Quit,
}

fn parse_command(line: &str) -> Option<ReplCommand> {
    let line = line.trim();
    if let Some(name) = line.strip_prefix('/') {
        return Some(ReplCommand::SeekImage(name.trim().to_string()));
    }
    if let Some(name) = line.strip_prefix(':') {
        return Some(ReplCommand::SeekSubdir(name.trim().trim_end_matches('/').to_string()));
    }
    let command = match line {
        "n" => ReplCommand::NextImage,
        "p" => ReplCommand::PrevImage,
        "home" => ReplCommand::FirstImage,
        "end" => ReplCommand::LastImage,
        "N" => ReplCommand::NextSubdir,
        "P" => ReplCommand::PrevSubdir,
        "s" => ReplCommand::ToggleSubdirs,
        "v" | "" => ReplCommand::Show,
        "?" | "h" | "help" => ReplCommand::Help,
        "q" | "quit" | "exit" => ReplCommand::Quit,
        _ => return None,
    };
    Some(command)
}

#[derive(Serialize)]
struct Report<'a> {
    status: Option<&'a str>,
    feedback: Option<&'a str>,
    view: Option<View>,
}

fn browse(
    config: &config::ViewerConfig,
    args: &BrowseArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let transport = HttpTransport::new(&config.transport)?;
    let mut controller = GalleryController::new(transport, config.index_parser());
    let mut subdirs = args.subdirs || config.viewer.subdirs;

    let mut status = controller.submit(&args.url, subdirs).message();
    show(&controller, status.as_deref(), None, args.json)?;
    if !args.json {
        println!("Type ? for commands.");
    }

    let stdin = std::io::stdin();
    loop {
        if !args.json {
            print!("> ");
            std::io::stdout().flush()?;
        }
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        let Some(command) = parse_command(&line) else {
            let feedback = format!("Unknown command: {}", line.trim());
            if args.json {
                show(&controller, status.as_deref(), Some(&feedback), true)?;
            } else {
                println!("{}", feedback);
            }
            continue;
        };

        let (outcome, target) = match command {
            ReplCommand::Quit => break,
            ReplCommand::Help => {
                if args.json {
                    show(&controller, status.as_deref(), Some(output::HELP_COMMANDS), true)?;
                } else {
                    print!("{}", output::HELP_COMMANDS);
                }
                continue;
            }
            ReplCommand::Show => (NavOutcome::Moved, None),
            ReplCommand::NextImage => (controller.request_next_image(), None),
            ReplCommand::PrevImage => (controller.request_prev_image(), None),
            ReplCommand::FirstImage => (controller.request_first_image(), None),
            ReplCommand::LastImage => (controller.request_last_image(), None),
            ReplCommand::NextSubdir => (controller.request_next_subdir(), None),
            ReplCommand::PrevSubdir => (controller.request_prev_subdir(), None),
            ReplCommand::SeekImage(name) => {
                let outcome = controller.request_seek_image(&name);
                (outcome, Some(name))
            }
            ReplCommand::SeekSubdir(name) => {
                let outcome = controller.request_seek_subdir(&name);
                (outcome, Some(name))
            }
            ReplCommand::ToggleSubdirs => {
                subdirs = !subdirs;
                let outcome = match controller.set_subdirs_enabled(subdirs) {
                    Some(outcome) => outcome,
                    // Nothing usable was submitted yet; retry the original URL.
                    None => controller.submit(&args.url, subdirs),
                };
                (NavOutcome::Load(outcome), None)
            }
        };

        if let NavOutcome::Load(load) = &outcome {
            status = load.message();
        }
        let feedback = output::format_nav_outcome(&outcome, target.as_deref());
        show(&controller, status.as_deref(), feedback.as_deref(), args.json)?;
    }

    Ok(())
}

fn show<T: Transport>(
    controller: &GalleryController<T>,
    status: Option<&str>,
    feedback: Option<&str>,
    json: bool,
) -> Result<(), serde_json::Error> {
    let view = controller.view();
    if json {
        let report = Report {
            status,
            feedback,
            view,
        };
        println!("{}", serde_json::to_string(&report)?);
        return Ok(());
    }

    if let Some(feedback) = feedback {
        println!("{}", feedback);
    }
    match view {
        Some(view) => output::print_view(&view, status),
        None => println!("{}", status.unwrap_or("Nothing loaded")),
    }
    Ok(())
}

// ============================================================================
// list
// ============================================================================

fn list(config: &config::ViewerConfig, args: &ListArgs) -> Result<(), Box<dyn std::error::Error>> {
    let url = urls::normalize_base_url(&args.url)?;
    let transport = HttpTransport::new(&config.transport)?;
    let html = transport.fetch_text(url.as_str())?;
    let parser = config
        .index_parser()
        .with_directories(args.subdirs || config.viewer.subdirs);

    if args.all {
        let entries = parser.entries_at(&html, url.path())?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&entries)?);
        } else {
            println!("==> {}", url);
            output::print_lines(&output::format_entries(&entries));
        }
    } else {
        let listing = parser.parse_at(&html, url.path())?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&listing)?);
        } else {
            println!("==> {}", url);
            output::print_lines(&output::format_listing(&listing));
        }
    }
    Ok(())
}
