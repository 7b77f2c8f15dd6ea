use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "leadflow")]
#[command(about = "Phone-verified lead capture workflow")]
pub struct CliArgs {
    #[arg(long, default_value = "leadflow.toml")]
    pub config: String,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Contact name (prompted for when omitted)")]
    pub name: Option<String>,

    #[arg(long, help = "10-digit mobile number (prompted for when omitted)")]
    pub phone: Option<String>,

    #[arg(long, help = "Contact city (prompted for when omitted)")]
    pub city: Option<String>,
}
