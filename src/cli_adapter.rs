use std::sync::Arc;

use housing_viability::{
    application::apartment_manager::{ApartmentListing, ApartmentManager},
    domain::apartment::configuration::{field_spec, Configuration},
    ports::command_handler::{Command, CommandError, CommandHandler},
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{error, instrument};

pub const IN_MEMORY_FLAG: &str = "--in-memory";
/// Password used by mutations that carry no `--password`.
pub const PASSWORD_ENV: &str = "HVS_PASSWORD";
const PASSWORD_FLAG: &str = "--password";

const USAGE: &str = "usage: housing-viability [--in-memory] [<command>]
  new                                   print the default configuration
  list                                  list saved apartments
  load <name>                           print a saved configuration
  save <name> [key=value ...] [--password <pw>]
  delete <name> [--password <pw>]
  lock [--password <pw>]                toggle the storage lock

Without a command, commands are read one per line from stdin until EOF or `exit`.
Quote names containing spaces. The password defaults to $HVS_PASSWORD.";

pub struct CliAdapter {
    manager: Arc<ApartmentManager>,
    default_password: Option<String>,
}

impl std::fmt::Debug for CliAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CliAdapter")
            .field("manager", &"<ApartmentManager>")
            .finish()
    }
}

impl CliAdapter {
    pub fn new(manager: Arc<ApartmentManager>, default_password: Option<String>) -> Self {
        Self {
            manager,
            default_password: default_password.filter(|password| !password.is_empty()),
        }
    }

    /// Runs the single command given on the command line.
    #[instrument(skip(self, args))]
    pub async fn run(&self, args: Vec<String>) -> Result<(), Box<dyn std::error::Error>> {
        let command = parse_args(&args, self.default_password.as_deref())?;

        match self.handle(command).await {
            Ok(output) => {
                println!("{}", output);
                Ok(())
            }
            Err(report) => {
                error!("Command failed: {:?}", report);
                Err(report.current_context().to_string().into())
            }
        }
    }

    /// Executes one command per input line against the same manager, so the lock and the
    /// rate limit carry over between commands. A failed command is reported and the session
    /// goes on.
    #[instrument(skip(self, input, output))]
    pub async fn run_session<R, W>(&self, input: R, mut output: W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = input.lines();
        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if matches!(line, "exit" | "quit") {
                break;
            }

            let reply = match self.execute_line(line).await {
                Ok(reply) => reply,
                Err(report) => {
                    error!("Command failed: {:?}", report);
                    format!("error: {}", report.current_context())
                }
            };
            output.write_all(reply.as_bytes()).await?;
            output.write_all(b"\n").await?;
            output.flush().await?;
        }

        Ok(())
    }

    async fn execute_line(&self, line: &str) -> error_stack::Result<String, CommandError> {
        let words = split_line(line)?;
        let command = parse_words(&words, self.default_password.as_deref())?;
        self.handle(command).await
    }
}

/// Splits a session line into words. Single or double quotes group words containing spaces.
pub fn split_line(line: &str) -> Result<Vec<String>, CommandError> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote = None;

    for c in line.chars() {
        match (quote, c) {
            (Some(open), c) if c == open => quote = None,
            (Some(_), c) => current.push(c),
            (None, '"' | '\'') => {
                quote = Some(c);
                in_word = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            (None, c) => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if quote.is_some() {
        return Err(invalid("unterminated quote"));
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

/// Parses `args` as passed to the binary, program name first.
pub fn parse_args(
    args: &[String],
    default_password: Option<&str>,
) -> Result<Command, CommandError> {
    parse_words(args.get(1..).unwrap_or_default(), default_password)
}

/// Parses one command. `--in-memory` may appear anywhere and is ignored here. Mutations without
/// `--password` fall back to `default_password`.
pub fn parse_words(
    words: &[String],
    default_password: Option<&str>,
) -> Result<Command, CommandError> {
    let mut positional = Vec::new();
    let mut password = None;

    let mut rest = words.iter();
    while let Some(arg) = rest.next() {
        match arg.as_str() {
            IN_MEMORY_FLAG => {}
            PASSWORD_FLAG => {
                let value = rest.next().ok_or_else(|| invalid("--password needs a value"))?;
                password = Some(value.clone());
            }
            _ => positional.push(arg.as_str()),
        }
    }

    let require_password = || {
        password
            .clone()
            .or_else(|| default_password.map(str::to_owned))
            .ok_or_else(|| invalid(&format!("--password or ${} is required", PASSWORD_ENV)))
    };
    let require_name = |index: usize| {
        positional
            .get(index)
            .map(|name| name.to_string())
            .ok_or_else(|| invalid("apartment name required"))
    };

    match positional.first().copied() {
        Some("new") => Ok(Command::New),
        Some("list") => Ok(Command::List),
        Some("load") => Ok(Command::Load {
            name: require_name(1)?,
        }),
        Some("save") => {
            let name = require_name(1)?;
            let assignments = positional[2..]
                .iter()
                .map(|assignment| {
                    assignment
                        .split_once('=')
                        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
                        .ok_or_else(|| invalid(&format!("expected key=value, got '{}'", assignment)))
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Command::Save {
                name,
                assignments,
                password: require_password()?,
            })
        }
        Some("delete") => Ok(Command::Delete {
            name: require_name(1)?,
            password: require_password()?,
        }),
        Some("lock") => Ok(Command::ToggleLock {
            password: require_password()?,
        }),
        Some(other) => Err(invalid(&format!("unknown command '{}'\n{}", other, USAGE))),
        None => Err(invalid(USAGE)),
    }
}

fn invalid(details: &str) -> CommandError {
    CommandError::InvalidCommand {
        details: details.to_string(),
    }
}

fn failed(report: error_stack::Report<impl error_stack::Context>) -> CommandError {
    CommandError::ExecutionFailed {
        details: report.current_context().to_string(),
    }
}

fn render_configuration(configuration: &Configuration) -> String {
    configuration
        .iter()
        .map(|(key, value)| {
            let label = field_spec(key).map(|spec| spec.label).unwrap_or_default();
            format!("{:<32}{:<14}{}", key, value.to_cell(), label)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_listing(listing: &ApartmentListing) -> String {
    let mut output = if listing.apartments.is_empty() {
        "No saved apartments".to_string()
    } else {
        listing
            .apartments
            .iter()
            .map(|summary| match summary.saved_at {
                Some(saved_at) => format!("{:<40}saved {}", summary.name, saved_at.to_rfc3339()),
                None => summary.name.clone(),
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    if listing.skipped > 0 {
        output.push_str(&format!(
            "\n({} unreadable row(s) skipped)",
            listing.skipped
        ));
    }
    output
}

#[async_trait::async_trait]
impl CommandHandler for CliAdapter {
    #[instrument(skip(command))]
    async fn handle(&self, command: Command) -> error_stack::Result<String, CommandError> {
        match command {
            Command::New => Ok(render_configuration(&self.manager.new_configuration())),
            Command::List => {
                let listing = self.manager.list().await.map_err(failed)?;
                Ok(render_listing(&listing))
            }
            Command::Load { name } => {
                let configuration = self.manager.load(&name).await.map_err(failed)?;
                Ok(render_configuration(&configuration))
            }
            Command::Save {
                name,
                assignments,
                password,
            } => {
                let mut configuration = self.manager.new_configuration();
                for (key, value) in &assignments {
                    configuration
                        .set_from_text(key, value)
                        .map_err(|error| invalid(&error.to_string()))?;
                }

                let saved_at = self
                    .manager
                    .save(&name, &configuration, &password)
                    .await
                    .map_err(failed)?;
                Ok(format!("Saved '{}' at {}", name.trim(), saved_at.to_rfc3339()))
            }
            Command::Delete { name, password } => {
                self.manager
                    .delete(&name, &password)
                    .await
                    .map_err(failed)?;
                Ok(format!("Deleted '{}'", name.trim()))
            }
            Command::ToggleLock { password } => {
                let locked = self.manager.toggle_lock(&password).await.map_err(failed)?;
                Ok(if locked {
                    "Storage locked".to_string()
                } else {
                    "Storage unlocked".to_string()
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use housing_viability::{
        adapters::memory::in_memory_record_store::InMemoryRecordStore,
        application::error::ApartmentError,
        domain::access::{access_guard::AccessGuard, clock::SystemClock},
    };

    fn args(line: &str) -> Vec<String> {
        std::iter::once("housing-viability")
            .chain(line.split_whitespace())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_parse_read_commands() {
        assert_eq!(parse_args(&args("new"), None).unwrap(), Command::New);
        assert_eq!(parse_args(&args("--in-memory list"), None).unwrap(), Command::List);
        assert_eq!(
            parse_args(&args("load Unit-7"), None).unwrap(),
            Command::Load {
                name: "Unit-7".to_string()
            }
        );
    }

    #[test]
    fn test_parse_save_with_assignments() {
        let command = parse_args(
            &args("save Loft purchase_price=400000 show_monthly_details=true --password pw"),
            None,
        )
        .unwrap();

        assert_eq!(
            command,
            Command::Save {
                name: "Loft".to_string(),
                assignments: vec![
                    ("purchase_price".to_string(), "400000".to_string()),
                    ("show_monthly_details".to_string(), "true".to_string()),
                ],
                password: "pw".to_string(),
            }
        );
    }

    #[test]
    fn test_mutations_require_password() {
        for line in ["save Loft", "delete Loft", "lock", "delete Loft --password"] {
            assert!(
                matches!(
                    parse_args(&args(line), None),
                    Err(CommandError::InvalidCommand { .. })
                ),
                "{line}"
            );
        }
    }

    #[test]
    fn test_parse_rejects_unknown_and_malformed() {
        assert!(parse_args(&args(""), None).is_err());
        assert!(parse_args(&args("frobnicate"), None).is_err());
        assert!(parse_args(&args("load"), None).is_err());
        assert!(parse_args(&args("save Loft purchase_price --password pw"), None).is_err());
    }

    fn adapter_with(min_interval: Duration, default_password: Option<&str>) -> CliAdapter {
        CliAdapter::new(
            Arc::new(ApartmentManager::new(
                Arc::new(InMemoryRecordStore::new()),
                AccessGuard::new(Some("pw"), min_interval),
                Arc::new(SystemClock),
            )),
            default_password.map(str::to_owned),
        )
    }

    fn adapter() -> CliAdapter {
        adapter_with(Duration::from_secs(2), None)
    }

    async fn session(adapter: &CliAdapter, input: &str) -> Vec<String> {
        let mut output = Vec::new();
        adapter
            .run_session(input.as_bytes(), &mut output)
            .await
            .unwrap();
        String::from_utf8(output)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[tokio::test]
    async fn test_save_then_load_through_cli() {
        let adapter = adapter();

        adapter
            .handle(
                parse_args(&args("save Loft purchase_price=400000 --password pw"), None).unwrap(),
            )
            .await
            .unwrap();
        let output = adapter
            .handle(Command::Load {
                name: "Loft".to_string(),
            })
            .await
            .unwrap();

        assert!(output.contains("purchase_price"));
        assert!(output.contains("400000"));
    }

    #[tokio::test]
    async fn test_unknown_field_is_invalid_command() {
        let report = adapter()
            .handle(parse_args(&args("save Loft balcony=yes --password pw"), None).unwrap())
            .await
            .unwrap_err();

        assert!(matches!(
            report.current_context(),
            CommandError::InvalidCommand { .. }
        ));
    }

    #[tokio::test]
    async fn test_failures_carry_only_the_short_message() {
        let report = adapter()
            .handle(Command::Delete {
                name: "Loft".to_string(),
                password: "wrong".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            report.current_context(),
            CommandError::ExecutionFailed { details } if !details.contains("Password")
        ));
    }

    #[test]
    fn test_default_password_fills_in_for_missing_flag() {
        assert_eq!(
            parse_args(&args("lock"), Some("from-env")).unwrap(),
            Command::ToggleLock {
                password: "from-env".to_string()
            }
        );
        assert_eq!(
            parse_args(&args("delete Loft --password typed"), Some("from-env")).unwrap(),
            Command::Delete {
                name: "Loft".to_string(),
                password: "typed".to_string()
            }
        );
    }

    #[test]
    fn test_split_line_honours_quotes() {
        assert_eq!(
            split_line(r#"save "Unit A" rent='1 200' --password pw"#).unwrap(),
            ["save", "Unit A", "rent=1 200", "--password", "pw"]
        );
        assert_eq!(split_line("  list  ").unwrap(), ["list"]);
        assert_eq!(split_line(r#"load """#).unwrap(), ["load", ""]);
        assert!(split_line(r#"load "Unit A"#).is_err());
    }

    #[tokio::test]
    async fn test_session_keeps_lock_between_commands() {
        let adapter = adapter_with(Duration::ZERO, None);

        let replies = session(
            &adapter,
            "save Loft --password pw\n\
             lock --password pw\n\
             save Loft --password pw\n",
        )
        .await;

        assert_eq!(replies.len(), 3);
        assert!(replies[0].starts_with("Saved 'Loft'"));
        assert_eq!(replies[1], "Storage locked");
        assert_eq!(
            replies[2],
            format!("error: {}", ApartmentError::Unauthorized)
        );
    }

    #[tokio::test]
    async fn test_session_keeps_rate_limit_and_records_between_commands() {
        let adapter = adapter_with(Duration::from_secs(60), Some("pw"));

        let replies = session(
            &adapter,
            "# comment lines and blank lines are ignored\n\
             \n\
             save \"Unit A\" purchase_price=310000\n\
             delete \"Unit A\"\n\
             load \"Unit A\"\n\
             exit\n\
             list\n",
        )
        .await;

        assert_eq!(replies[1], format!("error: {}", ApartmentError::RateLimited));
        assert!(replies[2..].iter().any(|line| line.contains("310000")));
        assert!(!replies.iter().any(|line| line.starts_with("Unit A")));
    }
}
