use anyhow::{Context, Result};
use clap::Parser as _;
use std::io::Write;
use std::path::{Path, PathBuf};

use feedparse::config::Config;
use feedparse::feed::{build_client, fetch_feed, FetchOptions};
use feedparse::util::validate_url;
use feedparse::{Feed, Parser};

#[derive(clap::Parser, Debug)]
#[command(
    name = "feedparse",
    version,
    about = "Convert Atom and RSS 2.0 feeds to JSON Feed"
)]
struct Args {
    /// Feed to convert: a file path, `-` for stdin, or an http(s) URL
    source: String,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,

    /// Write the JSON to FILE instead of stdout (replaced atomically)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Config file (default: ~/.config/feedparse/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Allow fetching from localhost and private network addresses
    #[arg(long)]
    allow_private: bool,
}

/// Where the feed document comes from.
#[derive(Debug, PartialEq, Eq)]
enum Source {
    Stdin,
    Url(String),
    File(PathBuf),
}

impl Source {
    fn from_arg(arg: &str) -> Self {
        if arg == "-" {
            Source::Stdin
        } else if arg.starts_with("http://") || arg.starts_with("https://") {
            Source::Url(arg.to_owned())
        } else {
            Source::File(PathBuf::from(arg))
        }
    }
}

fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match Config::default_path() {
            Some(path) => path,
            None => {
                tracing::debug!("HOME not set, using default configuration");
                return Ok(Config::default());
            }
        },
    };
    Config::load(&path).with_context(|| format!("Failed to load config '{}'", path.display()))
}

async fn read_feed(source: Source, config: &Config, allow_private: bool) -> Result<Feed> {
    let parser = Parser::new().with_max_size(config.max_feed_size_bytes);

    match source {
        Source::Stdin => {
            let stdin = std::io::stdin();
            parser
                .parse_reader(stdin.lock())
                .context("Failed to parse feed from stdin")
        }
        Source::File(path) => {
            let file = std::fs::File::open(&path)
                .with_context(|| format!("Failed to open '{}'", path.display()))?;
            parser
                .parse_reader(std::io::BufReader::new(file))
                .with_context(|| format!("Failed to parse feed '{}'", path.display()))
        }
        Source::Url(url) => {
            let url = validate_url(&url, allow_private)
                .with_context(|| format!("Refusing to fetch '{url}'"))?;
            let client =
                build_client(&config.user_agent).context("Failed to build HTTP client")?;
            fetch_feed(&client, url.as_str(), &FetchOptions::from(config))
                .await
                .with_context(|| format!("Failed to fetch feed '{url}'"))
        }
    }
}

/// Atomically write `content` using the write-to-temp-then-rename pattern,
/// so `dst` is never left in a partial state.
fn atomic_write(dst: &Path, content: &[u8]) -> Result<()> {
    // Unpredictable temp name so nothing can be planted at that path first.
    use std::time::{SystemTime, UNIX_EPOCH};
    let random_suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let temp_path = dst.with_extension(format!("tmp.{:016x}", random_suffix));

    let mut temp_file = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&temp_path)
        .with_context(|| {
            format!(
                "Failed to create temporary file '{}': check directory permissions or disk space",
                temp_path.display()
            )
        })?;

    let written = temp_file
        .write_all(content)
        .and_then(|()| temp_file.sync_all());
    drop(temp_file);
    if let Err(e) = written {
        let _ = std::fs::remove_file(&temp_path);
        return Err(e).with_context(|| {
            format!(
                "Failed to write temporary file '{}': disk may be full",
                temp_path.display()
            )
        });
    }

    // On Windows, rename fails if destination exists
    #[cfg(windows)]
    if dst.exists() {
        std::fs::remove_file(dst).with_context(|| {
            let _ = std::fs::remove_file(&temp_path);
            format!(
                "Failed to remove existing '{}' before atomic replace",
                dst.display()
            )
        })?;
    }

    std::fs::rename(&temp_path, dst).with_context(|| {
        let _ = std::fs::remove_file(&temp_path);
        format!(
            "Failed to rename '{}' to '{}': check permissions",
            temp_path.display(),
            dst.display()
        )
    })?;

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries the JSON, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;
    tracing::debug!(?config, "Effective configuration");

    let allow_private = args.allow_private || config.allow_private_hosts;
    let feed = read_feed(Source::from_arg(&args.source), &config, allow_private).await?;
    tracing::info!(items = feed.items.len(), "Converted feed");

    let mut json = if args.pretty || config.pretty {
        serde_json::to_string_pretty(&feed)
    } else {
        serde_json::to_string(&feed)
    }
    .context("Failed to serialize feed")?;
    json.push('\n');

    match args.output {
        Some(path) => atomic_write(&path, json.as_bytes())
            .with_context(|| format!("Failed to write '{}'", path.display()))?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(json.as_bytes())
                .and_then(|()| stdout.flush())
                .context("Failed to write to stdout")?;
        }
    }

    Ok(())
}
