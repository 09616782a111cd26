use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use std::{path::PathBuf, sync::Arc};

mod cli_style;

use cli_style::{
    get_prompt, get_styles, print_command_echo, print_empty_list, print_error, print_goodbye,
    print_key_value, print_list_item, print_success, print_welcome, TableBuilder,
};
use pokecatch_server::collection::{CollectionManager, COLLECTION_LIMIT};
use pokecatch_server::config::DB_FILE_NAME;
use pokecatch_server::messages::released_message;
use pokecatch_server::user::{SqliteUserStore, UserManager};

use rustyline::{
    completion::Completer, highlight::Highlighter, history::FileHistory, validate::Validator,
    CompletionType, Config, Editor, Helper,
};

fn parse_path(s: &str) -> Result<PathBuf> {
    let original_path = PathBuf::from(s);
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
#[command(styles=get_styles())]
struct CliArgs {
    /// Directory holding the SQLite database, defaults to the current directory.
    #[clap(value_parser = parse_path)]
    pub db_dir: Option<PathBuf>,
}

#[derive(Parser)]
#[command(styles=get_styles(),name = "")]
struct InnerCli {
    #[command(subcommand)]
    command: InnerCommand,
}

#[derive(Subcommand)]
enum InnerCommand {
    /// Creates a user with the given email.
    AddUser { email: String },

    /// Creates the demo users, skipping the ones that already exist.
    Seed,

    /// Shows all users.
    Users,

    /// Shows the caught Pokémon of a user.
    Collection { email: String },

    /// Releases a caught Pokémon, by its collection id.
    Release { email: String, id: usize },

    /// Shows the path of the current db.
    Where,

    /// Close this program.
    Exit,
}

enum CommandExecutionResult {
    Ok,
    Exit,
    Error(String),
}

struct Managers {
    users: UserManager,
    collections: CollectionManager,
}

impl Managers {
    fn user_id(&self, email: &str) -> Result<usize, String> {
        match self.users.find_user_by_email(email) {
            Ok(Some(user)) => Ok(user.id),
            Ok(None) => Err(format!("User {} not found.", email)),
            Err(err) => Err(format!("{}", err)),
        }
    }
}

fn execute_command(line: String, managers: &Managers, db_path: &str) -> CommandExecutionResult {
    if line.is_empty() {
        return CommandExecutionResult::Ok;
    }

    let args =
        shlex::split(&line).unwrap_or_else(|| line.split_whitespace().map(String::from).collect());

    let cli = InnerCli::try_parse_from(std::iter::once(" ").chain(args.iter().map(String::as_str)));

    match cli {
        Ok(cli) => {
            print_command_echo(&line);
            match cli.command {
                InnerCommand::AddUser { email } => match managers.users.add_user(&email) {
                    Ok(id) => print_success(&format!("Created user {} with id {}", email, id)),
                    Err(err) => return CommandExecutionResult::Error(format!("{}", err)),
                },
                InnerCommand::Seed => match managers.users.seed_demo_users() {
                    Ok(created) if created.is_empty() => {
                        print_empty_list("All demo users already exist")
                    }
                    Ok(created) => {
                        for email in created.iter() {
                            print_list_item(email);
                        }
                        print_success(&format!("Created {} demo users", created.len()));
                    }
                    Err(err) => return CommandExecutionResult::Error(format!("{}", err)),
                },
                InnerCommand::Users => {
                    let users = match managers.users.get_all_users() {
                        Ok(users) => users,
                        Err(err) => return CommandExecutionResult::Error(format!("{}", err)),
                    };
                    if users.is_empty() {
                        print_empty_list("No users");
                        return CommandExecutionResult::Ok;
                    }
                    let mut table = TableBuilder::new(vec!["id", "email", "caught"]);
                    for user in users {
                        let caught = managers
                            .collections
                            .count(user.id)
                            .map(|c| format!("{}/{}", c, COLLECTION_LIMIT))
                            .unwrap_or_else(|_| "?".to_string());
                        table.add_row(vec![user.id.to_string(), user.email, caught]);
                    }
                    table.print();
                }
                InnerCommand::Collection { email } => {
                    let user_id = match managers.user_id(&email) {
                        Ok(id) => id,
                        Err(err) => return CommandExecutionResult::Error(err),
                    };
                    let caught = match managers.collections.list(user_id) {
                        Ok(caught) => caught,
                        Err(err) => return CommandExecutionResult::Error(format!("{}", err)),
                    };
                    print_key_value("User", &email);
                    print_key_value("Caught", &format!("{}/{}", caught.len(), COLLECTION_LIMIT));
                    if caught.is_empty() {
                        print_empty_list("No Pokémon caught yet");
                        return CommandExecutionResult::Ok;
                    }
                    let mut table =
                        TableBuilder::new(vec!["id", "#", "name", "base exp", "caught at"]);
                    for p in caught {
                        table.add_row(vec![
                            p.id.to_string(),
                            p.poke_id.to_string(),
                            p.name,
                            p.base_experience.to_string(),
                            p.caught_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                        ]);
                    }
                    table.print();
                }
                InnerCommand::Release { email, id } => {
                    let user_id = match managers.user_id(&email) {
                        Ok(id) => id,
                        Err(err) => return CommandExecutionResult::Error(err),
                    };
                    match managers.collections.release(user_id, id) {
                        Ok(released) => {
                            print_success(&released_message(&released.pokemon.name));
                            print_key_value("Remaining", &released.remaining_count.to_string());
                        }
                        Err(err) => return CommandExecutionResult::Error(format!("{}", err)),
                    }
                }
                InnerCommand::Where => {
                    print_key_value("Database", db_path);
                }
                InnerCommand::Exit => return CommandExecutionResult::Exit,
            }
        }

        Err(e) => {
            if e.print().is_err() {
                println!("{}", e);
            }
        }
    }
    CommandExecutionResult::Ok
}

#[derive(rustyline_derive::Hinter)]
struct CommandsHelper {
    commands_names: Vec<String>,
}

impl CommandsHelper {
    pub fn new() -> Self {
        let commands_names: Vec<String> = InnerCli::command()
            .get_subcommands()
            .map(|sc| sc.get_name().to_string())
            .collect();

        CommandsHelper { commands_names }
    }
}

impl Completer for CommandsHelper {
    type Candidate = String;

    fn complete(
        &self,
        line: &str,
        _pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<String>)> {
        if line.contains(' ') {
            return Ok((0, Vec::with_capacity(0)));
        }
        let matches = self
            .commands_names
            .iter()
            .filter(|c| c.starts_with(line))
            .cloned()
            .collect::<Vec<_>>();

        Ok((0, matches))
    }
}

impl Highlighter for CommandsHelper {}
impl Validator for CommandsHelper {}
impl Helper for CommandsHelper {}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();
    let db_dir = match cli_args.db_dir {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    let db_path = db_dir.join(DB_FILE_NAME);
    let store = Arc::new(SqliteUserStore::new(&db_path)?);
    let managers = Managers {
        users: UserManager::new(store.clone()),
        collections: CollectionManager::new(store),
    };

    print_welcome(&db_path.display().to_string());

    let config = Config::builder()
        .completion_type(CompletionType::List)
        .build();

    let mut rl = Editor::<CommandsHelper, FileHistory>::with_config(config)?;
    rl.set_helper(Some(CommandsHelper::new()));

    let prompt = get_prompt();
    loop {
        match rl.readline(&prompt) {
            Ok(line) => {
                let _ = rl.add_history_entry(&line);
                match execute_command(line, &managers, &db_path.display().to_string()) {
                    CommandExecutionResult::Ok => {}
                    CommandExecutionResult::Exit => break,
                    CommandExecutionResult::Error(err) => {
                        print_error(&err);
                        continue;
                    }
                }
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                println!("CTRL-D: exiting.");
                break;
            }
            Err(e) => {
                print_error(&format!("{:?}", e));
                break;
            }
        }
    }
    print_goodbye();
    Ok(())
}
