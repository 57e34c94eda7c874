//! Pathscout CLI harness.
//!
//! Exercises the suggestion pipeline and the mount helpers from the command
//! line; the read models exposed here are the same ones a GUI shell renders.

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use pathscout::dialog::FixedAnswer;
use pathscout::entry::FieldId;
use pathscout::mount::{self, SystemRunner};
use pathscout::remote::RcClient;
use pathscout::suggest::{FieldEvent, Suggester};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Pathscout - unified local/remote path suggestions and mount helpers"
)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print ordered suggestions for a local path or a remote:/ address
    Suggest {
        /// Address to resolve; empty string lists the known remotes
        path: String,

        /// Known remote name (repeatable)
        #[arg(long = "remote")]
        remotes: Vec<String>,

        /// rc endpoint used for remote listings
        #[arg(long, default_value = "http://127.0.0.1:5572")]
        rc_url: String,
    },
    /// Report whether the userspace filesystem driver is installed
    CheckMount,
    /// Unmount a mount point; a busy mount fails unless --force is given
    Unmount {
        mount_point: String,

        /// Escalate to a forced unmount immediately
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    match args.command {
        Command::Suggest {
            path,
            remotes,
            rc_url,
        } => suggest(&path, &remotes, rc_url).await,
        Command::CheckMount => {
            if mount::needs_mount_plugin() {
                println!("mount driver missing");
            } else {
                println!("mount driver present");
            }
            Ok(())
        }
        Command::Unmount { mount_point, force } => {
            // Non-interactive: never escalate on our own
            mount::unmount(&SystemRunner, &FixedAnswer(false), &mount_point, force).await?;
            println!("unmounted {mount_point}");
            Ok(())
        }
    }
}

async fn suggest(path: &str, remotes: &[String], rc_url: String) -> Result<()> {
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let suggester = Arc::new(Suggester::new(Arc::new(RcClient::new(rc_url))).with_events(tx));

    let seq = suggester.resolve(FieldId::Source, path, remotes);
    while let Some(event) = rx.recv().await {
        if let FieldEvent::Resolved { field, seq: done } = event {
            if field == FieldId::Source && done == seq {
                break;
            }
        }
    }

    let state = suggester.field_state(FieldId::Source);
    if let Some(err) = state.last_error {
        anyhow::bail!("{err}");
    }
    for entry in state.suggestions {
        let marker = if entry.is_dir { "d" } else { "-" };
        println!("{marker} {}", entry.path);
    }
    Ok(())
}
