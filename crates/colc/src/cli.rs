//! Clap CLI definitions for the `colc` command.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// colc -- column encoding pipeline configuration.
#[derive(Parser, Debug)]
#[command(
    name = "colc",
    about = "Configure and run a column-encoding data pipeline",
    long_about = "Manage reversible encoding formulas, map source columns to them, and run \
                  rows from a JSON Lines source through the encoder.",
    version,
    propagate_version = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Global flags available to all subcommands.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Project directory (default: auto-discover .colcipher/).
    #[arg(long, global = true, env = "COLCIPHER_DIR")]
    pub dir: Option<PathBuf>,

    /// Output in JSON format.
    #[arg(long, global = true)]
    pub json: bool,

    /// Passkey for mutating commands on a protected project.
    #[arg(long, global = true, env = "COLCIPHER_PASSKEY", hide_env_values = true)]
    pub passkey: Option<String>,

    /// Enable verbose/debug output.
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output (errors only).
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,
}

/// All available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a .colcipher project in the current directory.
    Init(InitArgs),

    /// Manage encoding formulas.
    #[command(alias = "formulas")]
    Formula(FormulaArgs),

    /// Encode values with a formula.
    Encode(CodecArgs),

    /// Decode values with a formula.
    Decode(CodecArgs),

    /// Show or change pipeline configuration.
    Config(ConfigArgs),

    /// Manage column mappings.
    #[command(alias = "mappings")]
    Mapping(MappingArgs),

    /// Protect mutating commands with a passkey.
    Passkey(PasskeyArgs),

    /// Process the source through the configured mappings.
    Run(RunArgs),

    /// Show the processing dashboard.
    #[command(alias = "dashboard")]
    Stats(StatsArgs),

    /// Print version information.
    Version,

    /// Generate shell completions.
    Completion(CompletionArgs),
}

// ---------------------------------------------------------------------------
// init
// ---------------------------------------------------------------------------

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing settings file.
    #[arg(long)]
    pub force: bool,
}

// ---------------------------------------------------------------------------
// formula
// ---------------------------------------------------------------------------

#[derive(Args, Debug)]
pub struct FormulaArgs {
    #[command(subcommand)]
    pub command: FormulaCommands,
}

#[derive(Subcommand, Debug)]
pub enum FormulaCommands {
    /// List formulas.
    List,
    /// Show one formula.
    Show(FormulaIdArgs),
    /// Add a formula.
    #[command(alias = "create")]
    Add(FormulaAddArgs),
    /// Change a formula; fields not given are kept.
    Edit(FormulaEditArgs),
    /// Delete a formula.
    #[command(alias = "delete")]
    Remove(FormulaIdArgs),
    /// Add formulas from a JSON or TOML descriptor file.
    Import(FormulaImportArgs),
    /// Check a formula for missing or malformed fields.
    Validate(FormulaValidateArgs),
    /// Round-trip a sample value through a formula.
    Test(FormulaTestArgs),
}

#[derive(Args, Debug)]
pub struct FormulaIdArgs {
    /// Formula ID.
    pub id: String,
}

/// Formula fields shared by `add` and `edit`.
#[derive(Args, Debug, Default)]
pub struct FormulaFields {
    /// Description.
    #[arg(short = 'd', long)]
    pub description: Option<String>,

    /// Shift for caesar and position_shift.
    #[arg(long, allow_negative_numbers = true)]
    pub shift: Option<i64>,

    /// Character substitution for custom_mapping, as FROM=TO (repeatable).
    #[arg(long = "map", value_name = "FROM=TO")]
    pub map: Vec<String>,

    /// Registered transform name for custom.
    #[arg(long)]
    pub function: Option<String>,

    /// Mark a digit_reversal formula with reverseOrder.
    #[arg(long)]
    pub reverse_order: bool,
}

#[derive(Args, Debug)]
pub struct FormulaAddArgs {
    /// Formula name.
    pub name: String,

    /// Algorithm: caesar, digit_reversal, position_shift, custom_mapping, custom.
    #[arg(short = 'a', long)]
    pub algorithm: String,

    /// Explicit ID (default: generated fm-xxxxxx).
    #[arg(long)]
    pub id: Option<String>,

    #[command(flatten)]
    pub fields: FormulaFields,
}

#[derive(Args, Debug)]
pub struct FormulaEditArgs {
    /// Formula ID.
    pub id: String,

    /// New name.
    #[arg(long)]
    pub name: Option<String>,

    /// New algorithm; resets parameters to the ones given.
    #[arg(short = 'a', long)]
    pub algorithm: Option<String>,

    #[command(flatten)]
    pub fields: FormulaFields,
}

#[derive(Args, Debug)]
pub struct FormulaImportArgs {
    /// Descriptor file (.json or .toml).
    pub file: PathBuf,

    /// Replace formulas whose ID already exists.
    #[arg(long)]
    pub replace: bool,
}

#[derive(Args, Debug)]
pub struct FormulaValidateArgs {
    /// Formula ID.
    #[arg(required_unless_present = "file")]
    pub id: Option<String>,

    /// Validate the formulas in a descriptor file instead.
    #[arg(long, conflicts_with = "id")]
    pub file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct FormulaTestArgs {
    /// Formula ID.
    pub id: String,

    /// Sample value (default: settings sample or Test123ABC).
    #[arg(short = 's', long, allow_hyphen_values = true)]
    pub sample: Option<String>,

    /// Also run the built-in probe set.
    #[arg(long)]
    pub extended: bool,
}

// ---------------------------------------------------------------------------
// encode / decode
// ---------------------------------------------------------------------------

#[derive(Args, Debug)]
pub struct CodecArgs {
    /// Formula ID.
    pub formula: String,

    /// Values to transform.
    #[arg(required = true, allow_hyphen_values = true)]
    pub values: Vec<String>,

    /// Fail instead of passing values through unchanged.
    #[arg(long)]
    pub strict: bool,
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show pipeline configuration and settings.
    #[command(alias = "list")]
    Show,
    /// Get one pipeline configuration value.
    Get(ConfigGetArgs),
    /// Set one pipeline configuration value.
    Set(ConfigSetArgs),
}

#[derive(Args, Debug)]
pub struct ConfigGetArgs {
    /// Key, e.g. source.path.
    pub key: String,
}

#[derive(Args, Debug)]
pub struct ConfigSetArgs {
    /// Key: source.path, source.table, source.batch_size, destination.path,
    /// destination.collection or default_formula.
    pub key: String,

    /// Value (empty clears default_formula).
    #[arg(allow_hyphen_values = true)]
    pub value: String,
}

// ---------------------------------------------------------------------------
// mapping
// ---------------------------------------------------------------------------

#[derive(Args, Debug)]
pub struct MappingArgs {
    #[command(subcommand)]
    pub command: MappingCommands,
}

#[derive(Subcommand, Debug)]
pub enum MappingCommands {
    /// List column mappings.
    List,
    /// Add or replace the mapping for a source column.
    Add(MappingAddArgs),
    /// Remove the mapping for a source column.
    Remove(MappingRemoveArgs),
}

#[derive(Args, Debug)]
pub struct MappingAddArgs {
    /// Source column.
    pub source: String,

    /// Destination field (default: same as source).
    #[arg(short = 't', long)]
    pub target: Option<String>,

    /// Formula ID (default: the pipeline default formula).
    #[arg(short = 'f', long)]
    pub formula: Option<String>,

    /// Copy the value without encoding it.
    #[arg(long)]
    pub no_encode: bool,
}

#[derive(Args, Debug)]
pub struct MappingRemoveArgs {
    /// Source column.
    pub source: String,
}

// ---------------------------------------------------------------------------
// passkey
// ---------------------------------------------------------------------------

#[derive(Args, Debug)]
pub struct PasskeyArgs {
    #[command(subcommand)]
    pub command: PasskeyCommands,
}

#[derive(Subcommand, Debug)]
pub enum PasskeyCommands {
    /// Set or change the passkey (the current one is required via --passkey).
    Set(PasskeySetArgs),
    /// Remove passkey protection.
    Clear,
    /// Check whether --passkey is accepted.
    Check,
}

#[derive(Args, Debug)]
pub struct PasskeySetArgs {
    /// The new passkey.
    pub new: String,
}

// ---------------------------------------------------------------------------
// run / stats
// ---------------------------------------------------------------------------

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Source file (default: source.path).
    #[arg(short = 'i', long)]
    pub input: Option<PathBuf>,

    /// Destination file (default: destination.path).
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Process rows without writing output or recording history.
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug)]
pub struct StatsArgs {
    /// List the failed rows of the last run.
    #[arg(long)]
    pub failures: bool,

    /// List every recorded run.
    #[arg(long)]
    pub history: bool,
}

// ---------------------------------------------------------------------------
// completion
// ---------------------------------------------------------------------------

#[derive(Args, Debug)]
pub struct CompletionArgs {
    /// Target shell.
    #[arg(value_enum)]
    pub shell: Shell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_negative_shift() {
        let cli = Cli::try_parse_from(["colc", "formula", "add", "Back", "-a", "caesar", "--shift", "-3"])
            .unwrap();
        match cli.command {
            Commands::Formula(FormulaArgs {
                command: FormulaCommands::Add(args),
            }) => assert_eq!(args.fields.shift, Some(-3)),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn validate_needs_id_or_file() {
        assert!(Cli::try_parse_from(["colc", "formula", "validate"]).is_err());
        assert!(Cli::try_parse_from(["colc", "formula", "validate", "--file", "f.json"]).is_ok());
    }
}
