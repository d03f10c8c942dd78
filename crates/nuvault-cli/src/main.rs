//! Nuvault CLI - Command-line client for the Nuvault password manager.

mod commands;
mod output;

use clap::{Args, Parser, Subcommand};
use commands::EntryFields;
use nuvault_api::{FilterKey, GeneratePasswordOptions, ProfileUpdate};
use nuvault_config_and_utils::{init_logging, Config, LogConfig, Paths};
use tracing::debug;

/// Nuvault CLI - Store, search and generate passwords.
#[derive(Parser)]
#[command(name = "nuvault")]
#[command(about = "Nuvault password manager CLI")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (text or json)
    #[arg(short, long, default_value = "text", global = true)]
    format: output::OutputFormat,

    /// Log level (trace, debug, info, warn, error); defaults to the config file
    #[arg(long, global = true, env = "NUVAULT_LOG_LEVEL")]
    log_level: Option<String>,

    /// Also write logs to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Login with email and password
    Login,

    /// Create an account
    Register,

    /// Logout and clear session
    Logout,

    /// Check authentication status
    Status,

    /// Show the logged-in username
    Whoami,

    /// List vault entries
    List {
        /// Which list to show (all, favorites, recent, oldest)
        #[arg(short = 'F', long, default_value = "all")]
        filter: FilterKey,
        /// Only show entries whose service or username contains this text
        #[arg(short, long)]
        search: Option<String>,
        /// Reveal passwords (asks for the account password)
        #[arg(long)]
        show_secrets: bool,
    },

    /// Show one entry
    Show {
        /// Entry ID
        id: String,
        /// Reveal the password (asks for the account password)
        #[arg(long)]
        show_secret: bool,
    },

    /// Add an entry
    Add {
        #[command(flatten)]
        fields: EntryArgs,
    },

    /// Edit an entry
    Edit {
        /// Entry ID
        id: String,
        #[command(flatten)]
        fields: EntryArgs,
        /// Prompt for a new password
        #[arg(long)]
        password: bool,
    },

    /// Delete an entry
    Delete {
        /// Entry ID
        id: String,
        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Toggle an entry's favorite flag
    Favorite {
        /// Entry ID
        id: String,
    },

    /// Show the vault health score
    Health {
        /// Ignore the cached score
        #[arg(long)]
        refresh: bool,
    },

    /// Generate a password
    Generate {
        #[command(flatten)]
        options: GenerateArgs,
    },

    /// Show or update the profile
    Profile {
        #[command(subcommand)]
        command: Option<ProfileCommands>,
    },

    /// List entry categories
    Categories,

    /// List tag types
    Tags,

    /// Permanently delete the account
    DeleteAccount {
        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Args)]
struct EntryArgs {
    /// Service name
    #[arg(long)]
    service: Option<String>,
    /// Account username or email
    #[arg(short, long)]
    username: Option<String>,
    /// Generate the password on the server
    #[arg(short, long)]
    generate: bool,
    /// Mark as favorite
    #[arg(long, overrides_with = "no_favorite")]
    favorite: bool,
    /// Unmark as favorite
    #[arg(long)]
    no_favorite: bool,
    /// Category ID
    #[arg(short, long)]
    category: Option<String>,
    /// Tag type ID (repeatable)
    #[arg(short, long = "tag")]
    tags: Vec<String>,
}

impl EntryArgs {
    fn into_fields(self, new_password: bool) -> EntryFields {
        let favorite = match (self.favorite, self.no_favorite) {
            (true, _) => Some(true),
            (false, true) => Some(false),
            (false, false) => None,
        };
        EntryFields {
            service: self.service,
            username: self.username,
            new_password,
            generate: self.generate,
            favorite,
            category: self.category,
            tags: self.tags,
        }
    }
}

#[derive(Args)]
struct GenerateArgs {
    /// Password length
    #[arg(short, long, default_value = "16")]
    length: u32,
    /// Leave out uppercase letters
    #[arg(long)]
    no_uppercase: bool,
    /// Leave out lowercase letters
    #[arg(long)]
    no_lowercase: bool,
    /// Leave out digits
    #[arg(long)]
    no_numbers: bool,
    /// Leave out special characters
    #[arg(long)]
    no_special: bool,
}

impl From<GenerateArgs> for GeneratePasswordOptions {
    fn from(args: GenerateArgs) -> Self {
        Self {
            length: args.length,
            uppercase: !args.no_uppercase,
            lowercase: !args.no_lowercase,
            numbers: !args.no_numbers,
            special: !args.no_special,
        }
    }
}

#[derive(Subcommand)]
enum ProfileCommands {
    /// Show the profile
    Show,
    /// Update profile fields
    Update {
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },
    /// Change the account password
    Password,
}

async fn run(cli: Cli, ctx: commands::Context) -> anyhow::Result<()> {
    let format = &cli.format;

    match cli.command {
        Commands::Login => commands::login(&ctx, format).await,
        Commands::Register => commands::register(&ctx, format).await,
        Commands::Logout => commands::logout(&ctx, format).await,
        Commands::Status => commands::status(&ctx, format).await,
        Commands::Whoami => commands::whoami(&ctx, format).await,
        Commands::List {
            filter,
            search,
            show_secrets,
        } => commands::list(&ctx, filter, search.as_deref(), show_secrets, format).await,
        Commands::Show { id, show_secret } => commands::show(&ctx, &id, show_secret, format).await,
        Commands::Add { fields } => commands::add(&ctx, fields.into_fields(false), format).await,
        Commands::Edit {
            id,
            fields,
            password,
        } => commands::edit(&ctx, &id, fields.into_fields(password), format).await,
        Commands::Delete { id, yes } => commands::delete(&ctx, &id, yes, format).await,
        Commands::Favorite { id } => commands::favorite(&ctx, &id, format).await,
        Commands::Health { refresh } => commands::health(&ctx, refresh, format).await,
        Commands::Generate { options } => commands::generate(&ctx, options.into(), format).await,
        Commands::Profile { command } => match command.unwrap_or(ProfileCommands::Show) {
            ProfileCommands::Show => commands::profile_show(&ctx, format).await,
            ProfileCommands::Update {
                username,
                first_name,
                last_name,
                phone,
            } => {
                let update = ProfileUpdate {
                    username,
                    first_name,
                    last_name,
                    user_phone: phone,
                };
                commands::profile_update(&ctx, update, format).await
            }
            ProfileCommands::Password => commands::change_password(&ctx, format).await,
        },
        Commands::Categories => commands::categories(&ctx, format).await,
        Commands::Tags => commands::tags(&ctx, format).await,
        Commands::DeleteAccount { yes } => commands::delete_account(&ctx, yes, format).await,
    }
}

fn setup(cli: &Cli) -> anyhow::Result<commands::Context> {
    let paths = Paths::new()?;
    paths.ensure_dirs()?;
    let config = Config::load(&paths)?;

    init_logging(&LogConfig {
        default_level: cli
            .log_level
            .clone()
            .unwrap_or_else(|| config.log_level.clone()),
        log_path: Some(paths.log_file()),
        also_stderr: cli.verbose,
    })?;
    debug!(api_url = %config.api_url, "Configuration loaded");

    commands::Context::new(&config, &paths)
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let format = cli.format;

    let result = match setup(&cli) {
        Ok(ctx) => run(cli, ctx).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        output::print_error(&format!("{:#}", e), &format);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_list_parses_filter() {
        let cli = Cli::try_parse_from(["nuvault", "list", "--filter", "favorites", "-s", "git"])
            .unwrap();
        match cli.command {
            Commands::List {
                filter,
                search,
                show_secrets,
            } => {
                assert_eq!(filter, FilterKey::Favorites);
                assert_eq!(search.as_deref(), Some("git"));
                assert!(!show_secrets);
            }
            _ => panic!("expected list"),
        }
    }

    #[test]
    fn test_verbose_is_global_and_off_by_default() {
        let quiet = Cli::try_parse_from(["nuvault", "status"]).unwrap();
        assert!(!quiet.verbose);

        let before = Cli::try_parse_from(["nuvault", "-v", "status"]).unwrap();
        assert!(before.verbose);
        let after = Cli::try_parse_from(["nuvault", "status", "--verbose"]).unwrap();
        assert!(after.verbose);
    }

    #[test]
    fn test_list_rejects_unknown_filter() {
        assert!(Cli::try_parse_from(["nuvault", "list", "--filter", "starred"]).is_err());
    }

    #[test]
    fn test_generate_flags_map_to_options() {
        let cli = Cli::try_parse_from(["nuvault", "generate", "-l", "24", "--no-special"]).unwrap();
        match cli.command {
            Commands::Generate { options } => {
                let options = GeneratePasswordOptions::from(options);
                assert_eq!(options.length, 24);
                assert!(options.uppercase && options.lowercase && options.numbers);
                assert!(!options.special);
            }
            _ => panic!("expected generate"),
        }
    }

    #[test]
    fn test_edit_favorite_flags() {
        let cli = Cli::try_parse_from(["nuvault", "edit", "7", "--no-favorite", "--tag", "2"])
            .unwrap();
        match cli.command {
            Commands::Edit {
                id,
                fields,
                password,
            } => {
                assert_eq!(id, "7");
                assert!(!password);
                let fields = fields.into_fields(password);
                assert_eq!(fields.favorite, Some(false));
                assert_eq!(fields.tags, vec!["2".to_string()]);
            }
            _ => panic!("expected edit"),
        }
    }
}
