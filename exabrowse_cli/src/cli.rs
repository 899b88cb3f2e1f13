use clap::{Parser, Subcommand, ValueEnum};
use exabrowse_core::SearchMode;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "exabrowse")]
#[command(about = "exabrowse - search the web by result type, look up entities, summarise mentions")]
#[command(version)]
#[command(after_help = "\x1b[1;36mQuick Start:\x1b[0m
  exabrowse search \"coral reefs\"                     Search the default channel
  exabrowse search \"coral reefs\" -t video,news       Search several channels at once
  exabrowse entity \"Greenpeace\"                      Resolve an entity and its profiles
  exabrowse summarize \"Greenpeace\" --days 14         Summarise recent mentions

\x1b[1;36mAuthentication:\x1b[0m
  exabrowse config set exa                          Store an Exa API key
  exabrowse config show                             View configured providers")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Pretty)]
    pub output: OutputFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Verbose output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search one or more result channels concurrently
    #[command(after_help = "\x1b[1;33mExamples:\x1b[0m
  exabrowse search \"honey bees\"
  exabrowse search \"honey bees\" -t video,social --mode fast
  exabrowse search \"honey bees\" -t news --options '{\"numResults\": 3}'
  exabrowse search \"serde\" --table rust         Use a table from channels.yaml")]
    Search {
        /// The search query
        query: String,
        /// Comma-separated channel ids (default: the table's default channel)
        #[arg(short = 't', long = "types", value_delimiter = ',')]
        channels: Vec<String>,
        /// Search mode
        #[arg(short, long, value_enum, default_value_t = ModeArg::Auto)]
        mode: ModeArg,
        /// JSON object merged into every provider request
        #[arg(long)]
        options: Option<String>,
        /// Channel table to search
        #[arg(long, default_value = "search")]
        table: String,
    },

    /// Resolve a name to an entity with description, website and social profiles
    Entity {
        /// Free-text name, e.g. "Greenpeace"
        query: String,
    },

    /// Content about an entity on every platform
    Socials {
        /// Entity name
        name: String,
    },

    /// Recent content an entity published on its own profiles
    #[command(after_help = "\x1b[1;33mExamples:\x1b[0m
  exabrowse recents NASA                          Resolve profiles first, then fetch
  exabrowse recents NASA -p https://x.com/NASA -p https://youtube.com/@NASA --days 7")]
    Recents {
        /// Entity name
        name: String,
        /// Profile URLs; when omitted the entity is resolved first
        #[arg(short, long = "profile")]
        profiles: Vec<String>,
        /// Look-back window in days
        #[arg(long, default_value_t = 30)]
        days: u32,
    },

    /// Summarise recent mentions of an entity with an LLM
    #[command(after_help = "\x1b[1;33mExamples:\x1b[0m
  exabrowse summarize NASA                        Resolve, fetch recents, summarise
  exabrowse summarize NASA --input recents.json   Summarise saved results")]
    Summarize {
        /// Entity name
        name: String,
        /// JSON file holding a `{channel: [records]}` map
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Look-back window in days
        #[arg(long, default_value_t = 30)]
        days: u32,
    },

    /// Latest community mentions from X and Reddit
    Mentions,

    /// Ask the assistant a question
    Chat {
        /// The message to send
        message: String,
        /// Context text for the assistant
        #[arg(long, conflicts_with = "context_file")]
        context: Option<String>,
        /// Read context from a file
        #[arg(long)]
        context_file: Option<PathBuf>,
    },

    /// Species candidates, conservation status and sightings
    #[command(after_help = "\x1b[1;33mExamples:\x1b[0m
  exabrowse species search \"snow leopard\"        Candidate taxa for a common name
  exabrowse species status \"Panthera uncia\"      Red List category and threats
  exabrowse species occurrences \"Panthera uncia\" --limit 50")]
    Species {
        #[command(subcommand)]
        action: SpeciesAction,
    },

    /// Fetch an HTML page rewritten for embedding
    Proxy {
        /// Page URL
        url: String,
        /// Write the page here instead of stdout
        #[arg(short = 'O', long)]
        out: Option<PathBuf>,
    },

    /// Create a donation payment intent
    Donate {
        /// Amount in dollars (1 - 1000)
        amount: f64,
    },

    /// List and inspect channel tables
    Channels {
        #[command(subcommand)]
        action: Option<ChannelsAction>,
    },

    /// Manage provider credentials and settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Clone)]
pub enum ChannelsAction {
    /// List all tables (user tables shadow built-ins)
    List,
    /// Show every channel of one table
    Show {
        /// Table name
        table: String,
    },
    /// Remove a user-defined table
    Remove {
        /// Table name
        table: String,
    },
}

#[derive(Subcommand, Clone)]
pub enum SpeciesAction {
    /// Find taxa matching a common or partial name
    Search {
        /// Free-text name, e.g. "snow leopard"
        query: String,
    },
    /// Red List status of a species
    Status {
        /// Scientific name; only the first two words are used
        name: String,
    },
    /// Georeferenced occurrence records
    Occurrences {
        /// Scientific name
        name: String,
        /// Maximum records (capped at 300)
        #[arg(short, long)]
        limit: Option<u32>,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConfigAction {
    /// Show configured providers and settings
    Show,
    /// Store an API key for a provider (exa, groq, cerebras, stripe, iucn)
    Set {
        /// Provider name
        provider: String,
        /// API key; prompted for when omitted
        #[arg(long)]
        value: Option<String>,
    },
    /// Remove a stored API key
    Remove {
        /// Provider name
        provider: String,
    },
    /// Print the configuration directory
    Path,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable formatted output
    Pretty,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
    /// Plain text output
    Text,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Auto,
    Fast,
}

impl From<ModeArg> for SearchMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Auto => SearchMode::Auto,
            ModeArg::Fast => SearchMode::Fast,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_search_channels_split_on_commas() {
        let cli = Cli::parse_from(["exabrowse", "search", "bees", "-t", "video,news", "-m", "fast"]);
        match cli.command {
            Some(Commands::Search {
                query,
                channels,
                mode,
                table,
                ..
            }) => {
                assert_eq!(query, "bees");
                assert_eq!(channels, vec!["video", "news"]);
                assert!(mode == ModeArg::Fast);
                assert_eq!(table, "search");
            }
            _ => panic!("expected search"),
        }
    }

    #[test]
    fn test_species_occurrences_limit() {
        let cli = Cli::parse_from([
            "exabrowse",
            "species",
            "occurrences",
            "Panthera uncia",
            "--limit",
            "50",
        ]);
        match cli.command {
            Some(Commands::Species {
                action: SpeciesAction::Occurrences { name, limit },
            }) => {
                assert_eq!(name, "Panthera uncia");
                assert_eq!(limit, Some(50));
            }
            _ => panic!("expected species occurrences"),
        }
    }

    #[test]
    fn test_global_output_flag() {
        let cli = Cli::parse_from(["exabrowse", "mentions", "--output", "json"]);
        assert!(cli.output == OutputFormat::Json);
    }
}
