mod blob;
mod completion;
mod conf;
mod display;
mod error;
mod prelude;

use crate::prelude::*;

#[derive(Parser)]
#[command(version, about = "Walrus CLI")]
struct Cli {
    #[command(subcommand)]
    command: Command,
    /// Print machine-readable JSON instead of pretty output.
    #[arg(long = "json", global = true, help = "Output JSON")]
    json: bool,
    /// Hidden argument used for testing to set the path of the configuration
    /// file.
    #[arg(
        long = "conf-path",
        global = true,
        hide = true,
        default_value = CLI_CONF_PATH,
        value_parser = ValueParser::from(expand_tilde)
    )]
    conf_path: PathBuf,
}

#[derive(Subcommand)]
enum Command {
    #[command(about = "Store a file as a blob through the publisher")]
    Store(blob::StoreCommand),
    #[command(about = "Read a blob by its blob ID")]
    Read(blob::ReadCommand),
    #[command(about = "Read a blob by the Sui object ID of its Blob object")]
    ReadObject(blob::ReadObjectCommand),
    #[command(about = "Show the aggregator headers of a blob")]
    Metadata(blob::MetadataCommand),
    #[command(about = "Check whether the aggregator serves a blob")]
    Verify(blob::VerifyCommand),
    #[command(about = "Show or update the Walrus CLI configuration")]
    Conf(conf::ConfCommand),
    #[command(about = "Generate shell completions")]
    Completion(completion::CompletionCommand),
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    // Customize parsing error handling.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // These 2 are "not real errors" that are used to stop the execution
            // to display the CLI help or version.
            match e.kind() {
                clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                    println!("{}", e);

                    std::process::exit(0);
                }
                _ => (),
            }

            eprintln!(
                "{ballot} {error}",
                ballot = "✘".red().bold(),
                error = WalrusCliError::SyntaxError(e)
            );

            std::process::exit(1);
        }
    };

    JSON_MODE.store(cli.json, Ordering::Relaxed);

    // Send each sub-command to the respective handler.
    let result = match cli.command {
        Command::Store(command) => blob::store(command, &cli.conf_path).await.map(drop),
        Command::Read(command) => blob::read(command, &cli.conf_path).await.map(drop),
        Command::ReadObject(command) => blob::read_object(command, &cli.conf_path).await.map(drop),
        Command::Metadata(command) => blob::metadata(command, &cli.conf_path).await.map(drop),
        Command::Verify(command) => blob::verify(command, &cli.conf_path).await.map(drop),
        Command::Conf(command) => conf::handle(command, &cli.conf_path),
        Command::Completion(command) => completion::handle(command),
    };

    // Handle any errors that occurred during command execution.
    if let Err(e) = result {
        eprintln!("{ballot} {e}", ballot = "✘".red().bold());

        std::process::exit(1);
    }
}
