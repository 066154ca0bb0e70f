use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Boundary-safe project detection for multi-service workspaces
#[derive(Parser, Debug)]
#[command(
    name = "projectscan",
    about = "Boundary-safe project detection for multi-service workspaces",
    version,
    author,
    long_about = "projectscan locates the workspace root (the nearest directory holding azure.yaml) \
                  and lists the Node.js, Python, .NET and .NET AppHost projects beneath it. \
                  Nothing outside the workspace root is ever reported or descended into."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - only log errors"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Detect projects in a workspace",
        long_about = "Resolves the workspace root upward from PATH, then walks it and reports \
                      every project found, grouped by ecosystem.\n\n\
                      Examples:\n  \
                      projectscan detect\n  \
                      projectscan detect /path/to/workspace/service\n  \
                      projectscan detect --format json --no-resolve .\n  \
                      projectscan detect --exclude vendor --exclude fixtures"
    )]
    Detect(DetectArgs),

    #[command(
        about = "Print the resolved workspace root",
        long_about = "Walks upward from PATH to the nearest directory holding a workspace \
                      marker file and prints it.\n\n\
                      Examples:\n  \
                      projectscan root\n  \
                      projectscan root src/api --format json"
    )]
    Root(RootArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct DetectArgs {
    #[arg(
        value_name = "PATH",
        help = "Start path (defaults to current directory)"
    )]
    pub path: Option<PathBuf>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,

    #[arg(long, help = "Scan PATH as the root instead of resolving the workspace root")]
    pub no_resolve: bool,

    #[arg(
        short = 'e',
        long = "exclude",
        value_name = "NAME",
        help = "Additional directory name to skip (repeatable)"
    )]
    pub exclude: Vec<String>,

    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        help = "Write output to file instead of stdout"
    )]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
pub struct RootArgs {
    #[arg(
        value_name = "PATH",
        help = "Start path (defaults to current directory)"
    )]
    pub path: Option<PathBuf>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_args_verify() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn test_default_detect_args() {
        let args = CliArgs::parse_from(["projectscan", "detect"]);
        match args.command {
            Commands::Detect(detect_args) => {
                assert_eq!(detect_args.format, OutputFormatArg::Human);
                assert!(detect_args.path.is_none());
                assert!(!detect_args.no_resolve);
                assert!(detect_args.exclude.is_empty());
                assert!(detect_args.output.is_none());
            }
            _ => panic!("Expected Detect command"),
        }
    }

    #[test]
    fn test_detect_with_options() {
        let args = CliArgs::parse_from([
            "projectscan",
            "detect",
            "/tmp/ws",
            "--format",
            "json",
            "--no-resolve",
            "--exclude",
            "vendor",
            "-e",
            "fixtures",
            "-o",
            "out.json",
        ]);

        match args.command {
            Commands::Detect(detect_args) => {
                assert_eq!(detect_args.path, Some(PathBuf::from("/tmp/ws")));
                assert_eq!(detect_args.format, OutputFormatArg::Json);
                assert!(detect_args.no_resolve);
                assert_eq!(detect_args.exclude, vec!["vendor", "fixtures"]);
                assert_eq!(detect_args.output, Some(PathBuf::from("out.json")));
            }
            _ => panic!("Expected Detect command"),
        }
    }

    #[test]
    fn test_root_command() {
        let args = CliArgs::parse_from(["projectscan", "root", "src/api", "-f", "yaml"]);
        match args.command {
            Commands::Root(root_args) => {
                assert_eq!(root_args.path, Some(PathBuf::from("src/api")));
                assert_eq!(root_args.format, OutputFormatArg::Yaml);
            }
            _ => panic!("Expected Root command"),
        }
    }

    #[test]
    fn test_global_flags() {
        let args = CliArgs::parse_from(["projectscan", "-v", "detect"]);
        assert!(args.verbose);
        assert!(!args.quiet);

        let args = CliArgs::parse_from(["projectscan", "detect", "-q"]);
        assert!(args.quiet);

        let args = CliArgs::parse_from(["projectscan", "--log-level", "debug", "root"]);
        assert_eq!(args.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(CliArgs::try_parse_from(["projectscan", "-v", "-q", "detect"]).is_err());
    }

    #[test]
    fn test_invalid_format_rejected() {
        assert!(CliArgs::try_parse_from(["projectscan", "detect", "--format", "xml"]).is_err());
    }
}
