mod catalog;
mod client;
mod config;
mod encoding;
mod filter;
mod record;
mod render;

use crate::catalog::EntityKind;
use crate::client::{RestClient, check_required};
use crate::config::{Config, Scope, resolve, save};
use crate::encoding::{EncodingMode, Normalizer};
use crate::filter::FilterSpec;
use crate::record::{decode_output_lines, decode_records};
use crate::render::{OutputFormat, Renderer};
use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use std::path::Path;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "nrcctl",
    version,
    about = "CLI for the nagrestconf REST API"
)]
struct Cli {
    #[arg(
        long,
        global = true,
        value_name = "URL",
        help = "Base URL of the REST API, e.g. https://nagios.example.com/rest"
    )]
    url: Option<String>,

    #[arg(long, global = true, help = "Username for HTTP basic auth")]
    username: Option<String>,

    #[arg(long, global = true, help = "Password for HTTP basic auth")]
    password: Option<String>,

    #[arg(
        long,
        global = true,
        value_name = "FOLDER",
        help = "Configuration folder to operate on (defaults to `local`)"
    )]
    folder: Option<String>,

    #[arg(
        long,
        global = true,
        help = "Keep field values percent-encoded instead of decoding them"
    )]
    encode: bool,

    #[arg(
        long,
        short = 'o',
        value_enum,
        default_value_t = OutputFormat::Text,
        global = true,
        help = "Output format"
    )]
    output: OutputFormat,

    #[arg(long, global = true, help = "Shorthand for --output json")]
    json: bool,

    #[arg(long, global = true, help = "Single-line JSON / unindented text")]
    compact: bool,

    #[arg(long, global = true, help = "Include empty fields in the output")]
    brief: bool,

    #[arg(
        long,
        value_name = "FIELD:REGEX[,FIELD:REGEX...]",
        global = true,
        help = "Only show records where every FIELD matches its REGEX. Patterns are \
                query-decoded unless --encode is set, so write a literal `+` as %2B"
    )]
    filter: Option<String>,

    #[arg(long, short = 'v', global = true, help = "Log requests to stderr")]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List records of a kind
    Show {
        #[arg(value_enum)]
        kind: EntityKind,
        #[arg(short = 'd', long = "data", value_name = "KEY:VALUE")]
        data: Vec<String>,
    },
    /// Add a record
    Add {
        #[arg(value_enum)]
        kind: EntityKind,
        #[arg(short = 'd', long = "data", value_name = "KEY:VALUE", required = true)]
        data: Vec<String>,
    },
    /// Modify a record
    Modify {
        #[arg(value_enum)]
        kind: EntityKind,
        #[arg(short = 'd', long = "data", value_name = "KEY:VALUE", required = true)]
        data: Vec<String>,
    },
    /// Delete a record
    Delete {
        #[arg(value_enum)]
        kind: EntityKind,
        #[arg(short = 'd', long = "data", value_name = "KEY:VALUE", required = true)]
        data: Vec<String>,
    },
    /// List the field names of a kind
    Fields {
        #[arg(value_enum)]
        kind: EntityKind,
        #[arg(long, help = "Only the fields required by `add`")]
        required: bool,
    },
    /// Verify the generated Nagios configuration
    Check,
    /// Apply the configuration to Nagios
    Apply {
        #[arg(long, help = "Restore the last known good configuration instead")]
        last_good: bool,
    },
    /// Restart Nagios
    Restart,
    /// Persist --url/--username/--password/--folder/--encode to the chosen scope
    Configure {
        #[arg(
            long,
            value_enum,
            default_value_t = ScopeArg::User,
            help = "Where to write the config (local project dir or user config dir)"
        )]
        scope: ScopeArg,
    },
    /// Show current configuration (secrets masked)
    ConfigShow,
    /// Generate shell completion scripts
    Completion {
        #[arg(value_enum)]
        shell: CompletionShell,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CompletionShell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ScopeArg {
    Local,
    User,
}

impl From<ScopeArg> for Scope {
    fn from(value: ScopeArg) -> Self {
        match value {
            ScopeArg::Local => Scope::Local,
            ScopeArg::User => Scope::User,
        }
    }
}

impl Cli {
    fn overrides(&self) -> Config {
        Config {
            url: self.url.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            folder: self.folder.clone(),
            encode: self.encode.then_some(true),
        }
    }

    fn renderer(&self) -> Renderer {
        Renderer {
            format: if self.json {
                OutputFormat::Json
            } else {
                self.output
            },
            compact: self.compact,
            brief: self.brief,
        }
    }
}

/// Everything a command needs to talk to the server.
struct Remote {
    client: RestClient,
    filter: FilterSpec,
    folder: String,
    normalizer: Normalizer,
}

fn connect(cwd: &Path, overrides: Config, filter: Option<&str>) -> Result<Remote> {
    let effective = resolve(cwd, overrides)?;
    // Parsed before any request so a bad expression never reaches the server.
    let filter = parse_filter(filter, effective.mode)?;
    if !filter.is_empty() {
        debug!(terms = filter.terms().len(), "parsed filter");
    }
    let normalizer = Normalizer::new(effective.mode);
    let client = RestClient::new(&effective.url, effective.credentials, normalizer)?;
    Ok(Remote {
        client,
        filter,
        folder: effective.folder,
        normalizer,
    })
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let cwd = std::env::current_dir().context("reading current directory")?;
    let renderer = cli.renderer();
    let overrides = cli.overrides();
    let filter = cli.filter.clone();
    let remote = || connect(&cwd, overrides.clone(), filter.as_deref());

    match cli.command {
        Commands::Configure { scope } => configure(scope, overrides.clone(), &cwd)?,
        Commands::ConfigShow => {
            let mut masked = config::load(&cwd)?;
            if masked.password.is_some() {
                masked.password = Some("*****".into());
            }
            println!("{}", serde_json::to_string_pretty(&masked)?);
        }
        Commands::Completion { shell } => {
            use clap_complete::{generate, shells};
            let mut cmd = Cli::command();
            let bin = cmd.get_name().to_string();
            match shell {
                CompletionShell::Bash => {
                    generate(shells::Bash, &mut cmd, bin, &mut std::io::stdout())
                }
                CompletionShell::Zsh => {
                    generate(shells::Zsh, &mut cmd, bin, &mut std::io::stdout())
                }
                CompletionShell::Fish => {
                    generate(shells::Fish, &mut cmd, bin, &mut std::io::stdout())
                }
                CompletionShell::PowerShell => {
                    generate(shells::PowerShell, &mut cmd, bin, &mut std::io::stdout())
                }
            }
        }
        Commands::Fields { kind, required } => {
            let names = if required {
                kind.required_fields().to_vec()
            } else {
                kind.list_fields()
            };
            print!("{}", renderer.field_names(&names));
        }
        Commands::Show { kind, data } => {
            let remote = remote()?;
            for field in remote.filter.unknown_fields(kind) {
                warn!(%kind, field, "filter field is not part of this kind; nothing will match");
            }
            let response =
                remote
                    .client
                    .get(&format!("show/{kind}"), &remote.folder, &data, Some(kind))?;
            let records = decode_records(kind, &response.body, &remote.normalizer).with_context(
                || format!("Status ({}) Error decoding JSON", response.status),
            )?;
            debug!(count = records.len(), "decoded records");
            let records = remote.filter.apply(records);
            debug!(count = records.len(), "records after filter");
            print!("{}", renderer.records(&records));
        }
        Commands::Add { kind, data } => {
            check_required(kind, &data)?;
            let remote = remote()?;
            remote
                .client
                .post(&format!("add/{kind}"), &remote.folder, &data, Some(kind))?;
        }
        Commands::Modify { kind, data } => {
            let remote = remote()?;
            remote
                .client
                .post(&format!("modify/{kind}"), &remote.folder, &data, Some(kind))?;
        }
        Commands::Delete { kind, data } => {
            let remote = remote()?;
            remote
                .client
                .post(&format!("delete/{kind}"), &remote.folder, &data, Some(kind))?;
        }
        Commands::Check => {
            let remote = remote()?;
            let response = remote
                .client
                .get("check/nagiosconfig", &remote.folder, &[], None)?;
            print_lines(&renderer, &response.body, response.status)?;
        }
        Commands::Apply { last_good } => {
            let endpoint = if last_good {
                "apply/nagioslastgoodconfig"
            } else {
                "apply/nagiosconfig"
            };
            let remote = remote()?;
            let response = remote.client.post(endpoint, &remote.folder, &[], None)?;
            print_lines(&renderer, &response.body, response.status)?;
        }
        Commands::Restart => {
            let remote = remote()?;
            remote.client.post("restart/nagios", &remote.folder, &[], None)?;
        }
    }

    Ok(())
}

fn configure(scope: ScopeArg, overrides: Config, cwd: &Path) -> Result<()> {
    if overrides == Config::default() {
        return Err(anyhow::anyhow!(
            "Provide at least one of --url, --username, --password, --folder, --encode"
        ));
    }
    let mut existing = config::load_scope(scope.into(), cwd)?;
    existing.url = overrides.url.or(existing.url);
    existing.username = overrides.username.or(existing.username);
    existing.password = overrides.password.or(existing.password);
    existing.folder = overrides.folder.or(existing.folder);
    existing.encode = overrides.encode.or(existing.encode);

    let path = save(scope.into(), &existing, cwd)?;
    println!("Saved configuration to {}", path.display());
    Ok(())
}

fn parse_filter(expression: Option<&str>, mode: EncodingMode) -> Result<FilterSpec> {
    FilterSpec::parse(expression.unwrap_or_default(), mode)
        .context("invalid --filter; use FIELD:REGEX pairs separated by commas, e.g. name:^web,alias:prod")
}

fn print_lines(renderer: &Renderer, body: &str, status: u16) -> Result<()> {
    let lines = decode_output_lines(body)
        .with_context(|| format!("Status ({status}) Error decoding JSON"))?;
    print!("{}", renderer.lines(&lines));
    Ok(())
}

fn init_tracing(verbose: bool) {
    let env_filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
