use std::process::Command;

use tracing::info;

use chat_service_core::ServerConfig;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ServerCommand {
    program: String,
    args: Vec<String>,
}

impl ServerCommand {
    pub(crate) fn from_config(config: &ServerConfig) -> Self {
        Self {
            program: config.program.clone(),
            args: config.args(),
        }
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }

    /// Replace the current process with the server. Only returns on failure.
    #[cfg(unix)]
    pub(crate) fn exec(self) -> anyhow::Error {
        use std::os::unix::process::CommandExt;

        info!(program = %self.program, args = ?self.args, "Handing off to application server.");
        let err = self.command().exec();
        anyhow::Error::new(err).context(format!("failed to exec `{}`", self.program))
    }

    /// Without `exec`, run the server as a child and exit with its status.
    #[cfg(not(unix))]
    pub(crate) fn exec(self) -> anyhow::Error {
        info!(program = %self.program, args = ?self.args, "Starting application server.");
        match self.command().status() {
            Ok(status) => std::process::exit(status.code().unwrap_or(1)),
            Err(err) => {
                anyhow::Error::new(err).context(format!("failed to start `{}`", self.program))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chat_service_core::StartupConfig;

    use super::ServerCommand;

    fn server_command(pairs: &[(&str, &str)]) -> ServerCommand {
        let map: HashMap<&str, &str> = pairs.iter().copied().collect();
        let config = StartupConfig::from_lookup(|key| map.get(key).map(|value| (*value).to_owned()));
        ServerCommand::from_config(&config.server)
    }

    fn worker_count(command: &ServerCommand) -> Option<&str> {
        let position = command.args.iter().position(|arg| arg == "--workers")?;
        command.args.get(position + 1).map(String::as_str)
    }

    #[test]
    fn launches_three_workers_by_default() {
        let command = server_command(&[]);
        assert_eq!(command.program, "gunicorn");
        assert_eq!(worker_count(&command), Some("3"));
    }

    #[test]
    fn launches_configured_worker_count() {
        let command = server_command(&[("SERVER_WORKERS", "7")]);
        assert_eq!(worker_count(&command), Some("7"));
    }

    #[test]
    fn command_carries_program_and_args() {
        let command = server_command(&[("SERVER_PROGRAM", "/usr/local/bin/gunicorn")]);
        let cmd = command.command();
        assert_eq!(cmd.get_program(), "/usr/local/bin/gunicorn");
        assert_eq!(cmd.get_args().count(), command.args.len());
    }

    #[test]
    fn missing_server_binary_is_an_error() {
        let command = server_command(&[("SERVER_PROGRAM", "/nonexistent/chat-service-server")]);
        let err = command.exec();
        assert!(err.to_string().contains("/nonexistent/chat-service-server"));
    }
}
