use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use sporlproxy::{
    config::{self, Config},
    error, info, init_tracing, server,
    spotify::OAuthGateway,
    success, warning,
};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the HTTP proxy
    Serve(ServeOptions),

    /// Print the Spotify authorization URL
    Login(LoginOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct ServeOptions {
    /// Address to bind
    #[clap(long, env = "SERVER_ADDRESS")]
    pub address: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct LoginOptions {
    /// Open the URL in the default browser
    #[clap(long)]
    pub open: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        warning!("Cannot load environment file. Err: {}", e);
    }

    let cli = Cli::parse();

    match cli.command {
        Command::Serve(opt) => {
            let mut config = load_config();
            if let Some(address) = opt.address {
                config.server_address = address;
            }
            init_tracing(config.log_format);

            if let Err(e) = server::start_api_server(&config).await {
                error!("Server failed: {:#}", e);
            }
        }
        Command::Login(opt) => {
            let config = load_config();
            let auth_url = match OAuthGateway::new(config.spotify).begin_login() {
                Ok(url) => url,
                Err(e) => error!("Cannot build authorization URL: {}", e),
            };

            info!("Authorization URL:\n{}", auth_url);
            if opt.open {
                if webbrowser::open(&auth_url).is_err() {
                    warning!("Failed to open browser. Please navigate to the URL above manually.");
                } else {
                    success!("Opened authorization page in browser.");
                }
            }
        }
        Command::Completions(opt) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}

fn load_config() -> Config {
    match Config::from_env() {
        Ok(config) => config,
        Err(e) => error!("Invalid configuration: {:#}", e),
    }
}
