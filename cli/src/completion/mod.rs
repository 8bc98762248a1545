use {
    crate::{prelude::*, Cli},
    clap::CommandFactory,
};

#[derive(Args)]
pub(crate) struct CompletionCommand {
    #[arg(value_enum)]
    pub(crate) shell: clap_complete::Shell,
}

pub(crate) fn handle(command: CompletionCommand) -> AnyResult<(), WalrusCliError> {
    let mut cli_command = Cli::command();

    clap_complete::generate(
        command.shell,
        &mut cli_command,
        "walrus",
        &mut std::io::stdout(),
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use {super::*, crate::Command, clap::ValueEnum};

    #[test]
    fn test_all_shell_completions() {
        for shell in clap_complete::Shell::value_variants() {
            let shell_string = shell.to_string();
            let args = vec!["walrus", "completion", shell_string.as_str()];
            let cli = Cli::parse_from(&args);
            match cli.command {
                Command::Completion(cc) => {
                    handle(cc).unwrap();
                }
                _ => unreachable!("This should have been a completion command!"),
            }
        }
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }
}
