//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

/// Blocking HTTP client for the command line.
///
/// Sends GET/POST/PUT/DELETE/HEAD/OPTIONS requests, uploads files as
/// multipart/form-data and downloads files under size bounds.
#[derive(Parser, Debug)]
#[command(name = "webfetch")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file (default: $XDG_CONFIG_HOME/webfetch/config.toml)
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub client: ClientArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Flags shared by every subcommand that shape the HTTP client.
#[derive(ClapArgs, Debug, Default)]
pub struct ClientArgs {
    /// User-Agent: a literal value or a preset (mac-chrome, mac-safari,
    /// win-chrome, win-edge, win-ie)
    #[arg(long, global = true)]
    pub user_agent: Option<String>,

    /// Extra request header as KEY:VALUE (repeatable)
    #[arg(short = 'H', long = "header", value_name = "KEY:VALUE", value_parser = parse_header, global = true)]
    pub headers: Vec<(String, String)>,

    /// Request gzip-compressed responses
    #[arg(long, global = true)]
    pub gzip: bool,

    /// Follow HTTP redirects
    #[arg(long, global = true)]
    pub follow_redirects: bool,

    /// Accept any TLS certificate and host name
    #[arg(short = 'k', long, global = true)]
    pub insecure: bool,

    /// Disable the cookie store
    #[arg(long, global = true, conflicts_with = "cookies")]
    pub no_cookies: bool,

    /// Netscape-format cookie file to preload
    #[arg(long, value_name = "FILE", global = true)]
    pub cookies: Option<PathBuf>,

    /// Connect timeout in seconds (1-3600)
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..=3600), global = true)]
    pub connect_timeout: Option<u64>,

    /// Read timeout in seconds (1-3600)
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..=3600), global = true)]
    pub read_timeout: Option<u64>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Send a GET request; trailing arguments are KEY VALUE query pairs
    Get {
        url: String,
        /// Query parameters as alternating KEY VALUE items
        #[arg(value_name = "KEY VALUE")]
        params: Vec<String>,
    },
    /// Send a HEAD request and print the response headers
    Head { url: String },
    /// Send a DELETE request
    Delete { url: String },
    /// Send an OPTIONS request
    Options { url: String },
    /// Send a POST request with form pairs or a raw body
    Post {
        url: String,
        /// Form fields as alternating KEY VALUE items
        #[arg(value_name = "KEY VALUE", conflicts_with = "data")]
        params: Vec<String>,
        /// Raw request body
        #[arg(short, long)]
        data: Option<String>,
    },
    /// Send a PUT request with a raw body
    Put {
        url: String,
        /// Raw request body
        #[arg(short, long)]
        data: String,
    },
    /// Upload files as multipart/form-data
    Upload {
        url: String,
        /// File part as FIELD=PATH (repeatable)
        #[arg(long = "file", value_name = "FIELD=PATH", value_parser = parse_file_part, required = true)]
        files: Vec<(String, PathBuf)>,
        /// Text part as KEY=VALUE (repeatable)
        #[arg(long = "field", value_name = "KEY=VALUE", value_parser = parse_field)]
        fields: Vec<(String, String)>,
    },
    /// Download a file under size bounds
    Download(DownloadArgs),
}

#[derive(ClapArgs, Debug)]
pub struct DownloadArgs {
    pub url: String,

    /// Root folder for the download
    #[arg(short, long, value_name = "DIR")]
    pub dir: PathBuf,

    /// Store below a yyyy/MMdd folder for today
    #[arg(long)]
    pub date_folder: bool,

    /// File name without suffix
    #[arg(long)]
    pub name: Option<String>,

    /// File suffix (leading dots are ignored)
    #[arg(long)]
    pub suffix: Option<String>,

    /// Name the file after the name found in the URL
    #[arg(long, conflicts_with = "name")]
    pub original: bool,

    /// Smallest accepted size in bytes
    #[arg(long, value_name = "BYTES")]
    pub min_size: Option<u64>,

    /// Largest accepted size in bytes
    #[arg(long, value_name = "BYTES")]
    pub max_size: Option<u64>,

    /// Print a JSON report instead of the saved path
    #[arg(long)]
    pub json: bool,
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected KEY:VALUE, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err("header name is empty".to_string());
    }
    Ok((key.to_string(), value.trim().to_string()))
}

fn parse_field(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    if key.trim().is_empty() {
        return Err("field name is empty".to_string());
    }
    Ok((key.trim().to_string(), value.to_string()))
}

fn parse_file_part(raw: &str) -> Result<(String, PathBuf), String> {
    let (key, path) = parse_field(raw)?;
    if path.trim().is_empty() {
        return Err("file path is empty".to_string());
    }
    Ok((key, PathBuf::from(path)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_get_with_params() {
        let args =
            Args::try_parse_from(["webfetch", "get", "http://x/", "a", "1", "b", "2"]).unwrap();
        assert_eq!(args.verbose, 0);
        assert!(!args.quiet);
        match args.command {
            Command::Get { url, params } => {
                assert_eq!(url, "http://x/");
                assert_eq!(params, vec!["a", "1", "b", "2"]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_cli_verbose_flag_increments_count() {
        let args = Args::try_parse_from(["webfetch", "-vv", "head", "http://x/"]).unwrap();
        assert_eq!(args.verbose, 2);

        let args = Args::try_parse_from(["webfetch", "head", "http://x/", "-v"]).unwrap();
        assert_eq!(args.verbose, 1);
    }

    #[test]
    fn test_cli_global_client_flags() {
        let args = Args::try_parse_from([
            "webfetch",
            "--gzip",
            "-H",
            "X-Token: abc",
            "--user-agent",
            "win-ie",
            "--read-timeout",
            "20",
            "delete",
            "http://x/",
        ])
        .unwrap();
        assert!(args.client.gzip);
        assert_eq!(
            args.client.headers,
            vec![("X-Token".to_string(), "abc".to_string())]
        );
        assert_eq!(args.client.user_agent.as_deref(), Some("win-ie"));
        assert_eq!(args.client.read_timeout, Some(20));
    }

    #[test]
    fn test_cli_header_without_colon_rejected() {
        let result = Args::try_parse_from(["webfetch", "-H", "broken", "get", "http://x/"]);
        assert_eq!(
            result.unwrap_err().kind(),
            clap::error::ErrorKind::ValueValidation
        );
    }

    #[test]
    fn test_cli_timeout_out_of_range_rejected() {
        let result =
            Args::try_parse_from(["webfetch", "--connect-timeout", "0", "get", "http://x/"]);
        assert_eq!(
            result.unwrap_err().kind(),
            clap::error::ErrorKind::ValueValidation
        );
    }

    #[test]
    fn test_cli_post_data_conflicts_with_params() {
        let result = Args::try_parse_from(["webfetch", "post", "http://x/", "a", "1", "--data", "x"]);
        assert_eq!(
            result.unwrap_err().kind(),
            clap::error::ErrorKind::ArgumentConflict
        );
    }

    #[test]
    fn test_cli_upload_parts() {
        let args = Args::try_parse_from([
            "webfetch",
            "upload",
            "http://x/up",
            "--file",
            "doc=/tmp/a.txt",
            "--field",
            "title=hello=world",
        ])
        .unwrap();
        match args.command {
            Command::Upload { files, fields, .. } => {
                assert_eq!(files, vec![("doc".to_string(), PathBuf::from("/tmp/a.txt"))]);
                assert_eq!(
                    fields,
                    vec![("title".to_string(), "hello=world".to_string())]
                );
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_cli_upload_requires_file() {
        let result = Args::try_parse_from(["webfetch", "upload", "http://x/up"]);
        assert_eq!(
            result.unwrap_err().kind(),
            clap::error::ErrorKind::MissingRequiredArgument
        );
    }

    #[test]
    fn test_cli_download_args() {
        let args = Args::try_parse_from([
            "webfetch",
            "download",
            "http://x/a.pdf",
            "--dir",
            "/tmp/out",
            "--date-folder",
            "--original",
            "--max-size",
            "1000",
            "--json",
        ])
        .unwrap();
        match args.command {
            Command::Download(download) => {
                assert_eq!(download.dir, PathBuf::from("/tmp/out"));
                assert!(download.date_folder);
                assert!(download.original);
                assert_eq!(download.max_size, Some(1000));
                assert!(download.json);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_cli_missing_subcommand_is_error() {
        assert!(Args::try_parse_from(["webfetch"]).is_err());
    }

    #[test]
    fn test_cli_help_flag_shows_usage() {
        let err = Args::try_parse_from(["webfetch", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_cli_version_flag_shows_version() {
        let err = Args::try_parse_from(["webfetch", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }
}
