use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum, ValueHint, builder::BoolishValueParser};

/// Command-line arguments for the quire binary.
#[derive(Debug, Parser)]
#[command(name = "quire", version, about = "Render structured article documents")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "QUIRE_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Render an article from the content store.
    Render(ArticleArgs),
    /// Print the nested table of contents of an article from the content store.
    Toc(TocArgs),
    /// Render a standalone article record or bare document file.
    #[command(name = "render-file")]
    RenderFile(RenderFileArgs),
}

impl Command {
    pub fn overrides(&self) -> &CommonOverrides {
        match self {
            Command::Render(args) => &args.overrides,
            Command::Toc(args) => &args.overrides,
            Command::RenderFile(args) => &args.overrides,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Html,
}

#[derive(Debug, Args, Clone)]
pub struct ArticleArgs {
    #[command(flatten)]
    pub overrides: CommonOverrides,

    /// Category slug, e.g. `tech`.
    #[arg(value_name = "CATEGORY")]
    pub category: String,

    /// Article slug within the category.
    #[arg(value_name = "ARTICLE")]
    pub article: String,

    /// Output representation written to stdout.
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
}

#[derive(Debug, Args, Clone)]
pub struct TocArgs {
    #[command(flatten)]
    pub overrides: CommonOverrides,

    #[arg(value_name = "CATEGORY")]
    pub category: String,

    #[arg(value_name = "ARTICLE")]
    pub article: String,
}

#[derive(Debug, Args, Clone)]
pub struct RenderFileArgs {
    #[command(flatten)]
    pub overrides: CommonOverrides,

    /// Article record or bare `document` JSON file.
    #[arg(value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub file: PathBuf,

    /// Category list used to resolve embedded entries. Defaults to none.
    #[arg(long, value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub categories: Option<PathBuf>,

    /// Output representation written to stdout.
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
}

#[derive(Debug, Args, Default, Clone)]
pub struct RenderOverrides {
    /// Override the date display pattern (time format description).
    #[arg(long = "render-date-pattern", value_name = "PATTERN")]
    pub date_pattern: Option<String>,

    /// Override the timezone dates are displayed in.
    #[arg(long = "render-timezone", value_name = "TZ")]
    pub timezone: Option<String>,

    /// Override the scheme prefixed to scheme-relative asset URLs.
    #[arg(long = "render-asset-scheme", value_name = "SCHEME")]
    pub asset_scheme: Option<String>,

    /// Override the heading levels listed in the table of contents.
    #[arg(long = "render-toc-levels", value_name = "LEVELS", value_delimiter = ',')]
    pub toc_levels: Option<Vec<u8>>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct CommonOverrides {
    #[command(flatten)]
    pub render: RenderOverrides,

    /// Override the content store root directory.
    #[arg(long = "store-root", value_name = "PATH", value_hint = ValueHint::DirPath)]
    pub store_root: Option<PathBuf>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,
}
