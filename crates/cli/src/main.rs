use std::path::PathBuf;

use anyhow::Context;
use bookshelf_app::modules::books::store::{BookStore, JsonFileStore};
use bookshelf_kernel::settings::Settings;
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "bookshelf", version, about = "Flat-file backed bookshelf service")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server
    Serve {
        /// Address to bind instead of `server.host`
        #[arg(long)]
        host: Option<String>,
        /// Port to bind instead of `server.port`
        #[arg(long)]
        port: Option<u16>,
        /// Books file instead of `storage.books_path`
        #[arg(long)]
        data_file: Option<PathBuf>,
    },
    /// Read the books file and report how many records it holds
    Check {
        /// Books file instead of `storage.books_path`
        #[arg(long)]
        data_file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load().with_context(|| "failed to load bookshelf settings")?;
    bookshelf_telemetry::init(&settings.telemetry)?;

    match cli.command {
        Command::Serve {
            host,
            port,
            data_file,
        } => {
            if let Some(host) = host {
                settings.server.host = host;
            }
            if let Some(port) = port {
                settings.server.port = port;
            }
            if let Some(path) = data_file {
                settings.storage.books_path = path;
            }

            bookshelf_app::run(settings).await
        }
        Command::Check { data_file } => {
            let store = JsonFileStore::new(data_file.unwrap_or(settings.storage.books_path));
            let books = store
                .read_all()
                .await
                .with_context(|| format!("cannot read books from {}", store.path().display()))?;

            tracing::debug!(path = %store.path().display(), count = books.len(), "books file checked");
            println!("{}: {} books", store.path().display(), books.len());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn serve_overrides_parse() {
        let cli = Cli::parse_from([
            "bookshelf",
            "serve",
            "--port",
            "9100",
            "--data-file",
            "/tmp/books.json",
        ]);
        match cli.command {
            Command::Serve {
                host,
                port,
                data_file,
            } => {
                assert_eq!(host, None);
                assert_eq!(port, Some(9100));
                assert_eq!(data_file, Some(PathBuf::from("/tmp/books.json")));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
