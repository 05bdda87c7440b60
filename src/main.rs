//! CLI entry point for webfetch.

use std::fs::File;
use std::io::{self, BufReader, Write};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};
use webfetch_core::cookies::{CookieJar, load_into_jar, parse_netscape_cookies};
use webfetch_core::{
    ClientConfig, DownloadOptions, DownloadProgress, FormData, HttpClient, NameStrategy,
    user_agent,
};

mod app_config;
mod cli;

use cli::{Args, ClientArgs, Command, DownloadArgs};

fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    debug!(?args, "CLI arguments parsed");

    let file_config = app_config::load_file_config(args.config.as_deref())?;
    let mut config = ClientConfig::default();
    if let Some(file_config) = &file_config {
        debug!(?file_config, "loaded config file");
        config = file_config.apply(config);
    }
    config = apply_client_args(config, &args.client)?;
    if let Command::Download(download) = &args.command {
        if let Some(min) = download.min_size {
            config = config.with_download_min_size(min);
        }
        if let Some(max) = download.max_size {
            config = config.with_download_max_size(max);
        }
    }

    let mut client = HttpClient::new(config).context("Failed to create HTTP client")?;
    let output = run(&mut client, args.command)?;

    let mut stdout = io::stdout().lock();
    stdout.write_all(output.as_bytes())?;
    if !output.ends_with('\n') {
        stdout.write_all(b"\n")?;
    }
    Ok(())
}

fn apply_client_args(mut config: ClientConfig, args: &ClientArgs) -> Result<ClientConfig> {
    if let Some(agent) = &args.user_agent {
        config = config.with_user_agent(user_agent::resolve(agent));
    }
    for (name, value) in &args.headers {
        config = config.with_header(name.clone(), value.clone());
    }
    if args.gzip {
        config = config.with_gzip(true);
    }
    if args.follow_redirects {
        config = config.with_follow_redirects(true);
    }
    if args.insecure {
        warn!("TLS certificate verification disabled");
        config = config.with_ignore_https(true);
    }
    if let Some(secs) = args.connect_timeout {
        config = config.with_connect_timeout(Duration::from_secs(secs));
    }
    if let Some(secs) = args.read_timeout {
        config = config.with_read_timeout(Duration::from_secs(secs));
    }
    if args.no_cookies {
        config = config.with_cookies(false);
    }
    if let Some(path) = &args.cookies {
        let file = File::open(path)
            .with_context(|| format!("Failed to open cookie file '{}'", path.display()))?;
        let parsed = parse_netscape_cookies(BufReader::new(file))
            .with_context(|| format!("Failed to parse cookie file '{}'", path.display()))?;
        for (line, reason) in &parsed.warnings {
            warn!(line, reason = %reason, "skipped cookie line");
        }
        let jar = CookieJar::new();
        let loaded = load_into_jar(&parsed.cookies, &jar);
        info!(count = loaded, path = %path.display(), "loaded cookies");
        config = config.with_cookies(true).with_cookie_jar(jar);
    }
    Ok(config)
}

fn run(client: &mut HttpClient, command: Command) -> Result<String> {
    let output = match command {
        Command::Get { url, params } => client.get_with_pairs(&url, &params)?,
        Command::Head { url } => client.head(&url)?,
        Command::Delete { url } => client.delete(&url)?,
        Command::Options { url } => client.options(&url)?,
        Command::Post { url, params, data } => match data {
            Some(body) => client.post_text(&url, &body)?,
            None => client.post_pairs(&url, &params)?,
        },
        Command::Put { url, data } => client.put_text(&url, &data)?,
        Command::Upload { url, files, fields } => {
            let form: FormData = fields.into_iter().collect();
            client.post_multipart(&url, &form, &files)?
        }
        Command::Download(download) => run_download(client, download)?,
    };
    Ok(output)
}

fn run_download(client: &mut HttpClient, args: DownloadArgs) -> Result<String> {
    if args.dir.as_os_str().is_empty() {
        bail!("Download directory is empty");
    }
    let mut options = DownloadOptions::new(&args.dir).with_date_folder(args.date_folder);
    if let Some(name) = args.name {
        options = options.with_name(name);
    }
    if let Some(suffix) = args.suffix {
        options = options.with_suffix(suffix);
    }
    if args.original {
        options = options.with_strategy(NameStrategy::FromUrl);
    }

    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {bytes}/{total_bytes} ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    let mut observer = |progress: DownloadProgress| {
        bar.set_length(progress.total);
        bar.set_position(progress.written);
    };

    let result = client.download_with_progress(&args.url, &options, Some(&mut observer));
    bar.finish_and_clear();
    let result = result.with_context(|| format!("Failed to download '{}'", args.url))?;

    if args.json {
        Ok(serde_json::to_string_pretty(&result)?)
    } else {
        Ok(result.path.display().to_string())
    }
}
