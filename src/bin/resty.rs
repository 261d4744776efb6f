use std::{future::Future, io, num::NonZeroUsize, path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use resty_core::{
    constants::{DEFAULT_MAX_PAGES, NEXT_PAGE_URL_FIELD, NEXT_RECORDS_URL_FIELD},
    credentials::{self, TerminalPrompt},
    export, Client, Continuation, FetchOptions, Method,
};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "resty", version, about = "Authenticated REST calls against a Salesforce org")]
struct CliArgs {
    #[command(subcommand)]
    pub subcommand: Command,

    #[command(flatten)]
    pub global_opts: GlobalOpts,
}

#[derive(Args, Debug)]
struct GlobalOpts {
    #[arg(
        short = 'f',
        long = "auth",
        env = "RESTY_AUTH_FILE",
        global = true,
        help = "Path to auth.json. Prompted for when omitted."
    )]
    pub auth_file: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        help = "API version to use instead of the one in auth.json, e.g. 61.0"
    )]
    pub api_version: Option<String>,

    #[arg(short = 't', long, global = true, help = "Request timeout in seconds")]
    pub timeout: Option<u64>,

    #[arg(short = 'v', long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    #[clap(name = "get", about = "Fetch the records of a list endpoint")]
    Get {
        path: String,

        #[arg(short = 'k', long, help = "Key of the record array in the response")]
        record_key: Option<String>,

        #[arg(short = 'r', long, help = "Resource name to look for in the response")]
        resource: Option<String>,

        #[command(flatten)]
        page_opts: PageOpts,

        #[command(flatten)]
        output_opts: OutputOpts,
    },

    #[clap(name = "query", about = "Run a SOQL query")]
    Query {
        soql: String,

        #[command(flatten)]
        page_opts: PageOpts,

        #[command(flatten)]
        output_opts: OutputOpts,
    },

    #[clap(name = "create", about = "POST a JSON payload")]
    Create { path: String, body: String },

    #[clap(name = "update", about = "PATCH a record with a JSON payload")]
    Update { path: String, body: String },

    #[clap(name = "delete", about = "DELETE a record")]
    Delete { path: String },

    #[clap(name = "send", about = "Send a single request with any method")]
    Send {
        method: Method,

        path: String,

        #[arg(short = 'd', long, help = "JSON payload")]
        body: Option<String>,
    },
}

#[derive(Args, Debug, PartialEq)]
struct PageOpts {
    #[arg(short = 'a', long, help = "Follow next-page links until the last page")]
    pub all_pages: bool,

    #[arg(
        long,
        requires = "all_pages",
        help = "Stop after this many pages (default 100)"
    )]
    pub max_pages: Option<NonZeroUsize>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Csv,
}

#[derive(Args, Debug, PartialEq)]
struct OutputOpts {
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
}

impl PageOpts {
    fn fetch_options(
        &self,
        next_link_field: &str,
        record_key: Option<String>,
        resource: Option<String>,
    ) -> Result<FetchOptions> {
        let mut builder = FetchOptions::builder();
        if let Some(record_key) = record_key {
            builder.record_key(record_key);
        }
        if let Some(resource) = resource {
            builder.resource_name(resource);
        }
        if self.all_pages {
            builder
                .continuation(Continuation::Field(next_link_field.to_string()))
                .max_pages(self.max_pages.map_or(DEFAULT_MAX_PAGES, NonZeroUsize::get));
        }
        Ok(builder.build()?)
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn print_records(records: Vec<Value>, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&records)?),
        OutputFormat::Csv => export::write_csv(&records, io::stdout().lock())?,
    }
    Ok(())
}

fn parse_body(body: &str) -> Result<Value> {
    serde_json::from_str(body).context("invalid JSON payload")
}

async fn with_spinner<F: Future>(message: &'static str, task: F) -> F::Output {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg} [{elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    let output = task.await;
    spinner.finish_and_clear();
    output
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_logging(args.global_opts.verbose);

    let resolved =
        credentials::resolve(args.global_opts.auth_file.as_deref(), &mut TerminalPrompt).await;
    let timeout = args.global_opts.timeout.map(Duration::from_secs);
    let client = Client::connect(resolved, args.global_opts.api_version.as_deref(), |credentials| {
        Ok(Client::new(resty_core::http_client(timeout)?, credentials))
    })
    .context("failed to load auth.json")?;
    tracing::info!("using instance {}", client.credentials().instance_url());

    let output = match args.subcommand {
        Command::Get {
            path,
            record_key,
            resource,
            page_opts,
            output_opts,
        } => {
            let options = page_opts.fetch_options(NEXT_PAGE_URL_FIELD, record_key, resource)?;
            let records = with_spinner("fetching records", client.fetch_all(&path, &options)).await?;
            return print_records(records, output_opts.format);
        }
        Command::Query {
            soql,
            page_opts,
            output_opts,
        } => {
            let options = page_opts.fetch_options(NEXT_RECORDS_URL_FIELD, None, None)?;
            let records = with_spinner("running query", client.query(&soql, &options)).await?;
            return print_records(records, output_opts.format);
        }
        Command::Create { path, body } => {
            client
                .send(Method::Post, &path, Some(&parse_body(&body)?))
                .await?
        }
        Command::Update { path, body } => {
            client
                .send(Method::Patch, &path, Some(&parse_body(&body)?))
                .await?
        }
        Command::Delete { path } => client.send(Method::Delete, &path, None).await?,
        Command::Send { method, path, body } => {
            let body = body.as_deref().map(parse_body).transpose()?;
            client.send(method, &path, body.as_ref()).await?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_query_with_format_and_api_version() {
        let args = CliArgs::try_parse_from([
            "resty",
            "--auth",
            "auth.json",
            "--api-version",
            "58.0",
            "query",
            "SELECT Name FROM Account",
            "--format",
            "csv",
        ])
        .unwrap();

        assert_eq!(args.global_opts.api_version.as_deref(), Some("58.0"));
        assert_eq!(
            args.subcommand,
            Command::Query {
                soql: "SELECT Name FROM Account".to_string(),
                page_opts: PageOpts {
                    all_pages: false,
                    max_pages: None,
                },
                output_opts: OutputOpts {
                    format: OutputFormat::Csv,
                },
            }
        );
    }

    #[test]
    fn format_defaults_to_json() {
        let args =
            CliArgs::try_parse_from(["resty", "get", "/services/data/v60.0/sobjects/Account"])
                .unwrap();

        match args.subcommand {
            Command::Get { output_opts, .. } => assert_eq!(output_opts.format, OutputFormat::Json),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn zero_max_pages_rejected() {
        let args = CliArgs::try_parse_from([
            "resty",
            "query",
            "SELECT Name FROM Account",
            "--all-pages",
            "--max-pages",
            "0",
        ]);

        assert!(args.is_err());
    }

    #[test]
    fn all_pages_is_capped_by_default() {
        let page_opts = PageOpts {
            all_pages: true,
            max_pages: None,
        };

        let options = page_opts
            .fetch_options(NEXT_PAGE_URL_FIELD, None, None)
            .unwrap();

        assert_eq!(options.max_pages(), Some(DEFAULT_MAX_PAGES));
        assert!(matches!(options.continuation(), Continuation::Field(field) if field == NEXT_PAGE_URL_FIELD));
    }

    #[test]
    fn explicit_max_pages_wins() {
        let page_opts = PageOpts {
            all_pages: true,
            max_pages: NonZeroUsize::new(3),
        };

        let options = page_opts
            .fetch_options(NEXT_RECORDS_URL_FIELD, None, None)
            .unwrap();

        assert_eq!(options.max_pages(), Some(3));
    }

    #[test]
    fn single_page_without_all_pages() {
        let page_opts = PageOpts {
            all_pages: false,
            max_pages: None,
        };

        let options = page_opts
            .fetch_options(NEXT_PAGE_URL_FIELD, Some("records".to_string()), None)
            .unwrap();

        assert_eq!(options.max_pages(), None);
        assert_eq!(options.record_key(), Some("records"));
        assert!(matches!(options.continuation(), Continuation::SinglePage));
    }
}
