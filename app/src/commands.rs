use clap::{App, Arg};

/// Avaliable command line arguments
#[derive(Clone, Copy, Debug)]
pub enum CliArg {
    Config,
    GenerateConfig,
    ListInterfaces,
    Quiet,
    Verbose,
}

impl CliArg {
    pub fn as_str(&self) -> &'static str {
        match self {
            CliArg::Config => "config",
            CliArg::GenerateConfig => "generate-config",
            CliArg::ListInterfaces => "list-interfaces",
            CliArg::Quiet => "quiet",
            CliArg::Verbose => "verbose",
        }
    }
}

/// Construct a new clap root command
pub fn new_root_command<'a>() -> clap::App<'a, 'static> {
    App::new(crate_name!())
        .version(crate_version!())
        .about("Live packet capture front end of the tripwire IDS")
        .args(&[
            Arg::with_name(CliArg::Config.as_str())
                .short("c")
                .long("config")
                .value_name("FILE")
                .help("Use a specific config file")
                .takes_value(true),
            Arg::with_name(CliArg::GenerateConfig.as_str())
                .long("generate-config")
                .help("Write a default config file capturing on the first suitable interface, then exit"),
            Arg::with_name(CliArg::ListInterfaces.as_str())
                .long("list-interfaces")
                .help("List available network interfaces, then exit")
                .conflicts_with(CliArg::GenerateConfig.as_str()),
            Arg::with_name(CliArg::Quiet.as_str())
                .short("q")
                .long("quiet")
                .help("Turn off info level logging")
                .conflicts_with(CliArg::Verbose.as_str()),
            Arg::with_name(CliArg::Verbose.as_str())
                .short("v")
                .long("verbose")
                .help("Turn on debug level logging"),
        ])
}
