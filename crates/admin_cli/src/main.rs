use std::{error::Error, io::Write};

use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use engine::{Engine, PurchaseCmd, RegisterPetCmd, UserRole};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

mod users {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "users")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub username: String,
        pub password: String,
        pub role: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

#[derive(Parser, Debug)]
#[command(name = "cuccia_admin")]
#[command(about = "Admin utilities for Cuccia (bootstrap users/pets/credits)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./cuccia.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    Pet(Pet),
    Credits(Credits),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Create(UserCreateArgs),
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    username: String,
    /// tutor, staff or admin.
    #[arg(long, default_value = "tutor", value_parser = parse_role)]
    role: String,
}

#[derive(Args, Debug)]
struct Pet {
    #[command(subcommand)]
    command: PetCommand,
}

#[derive(Subcommand, Debug)]
enum PetCommand {
    Register(PetRegisterArgs),
    AssignTutor(AssignTutorArgs),
}

#[derive(Args, Debug)]
struct PetRegisterArgs {
    #[arg(long)]
    name: String,
    #[arg(long, default_value_t = 0)]
    credits: i64,
    /// Username recorded as the acting staff member.
    #[arg(long)]
    actor: String,
}

#[derive(Args, Debug)]
struct AssignTutorArgs {
    #[arg(long)]
    pet: Uuid,
    #[arg(long)]
    username: String,
}

#[derive(Args, Debug)]
struct Credits {
    #[command(subcommand)]
    command: CreditsCommand,
}

#[derive(Subcommand, Debug)]
enum CreditsCommand {
    Add(CreditsAddArgs),
}

#[derive(Args, Debug)]
struct CreditsAddArgs {
    #[arg(long)]
    pet: Uuid,
    #[arg(long)]
    credits: i64,
    /// Username recorded as the acting staff member.
    #[arg(long)]
    actor: String,
    #[arg(long)]
    description: Option<String>,
}

fn parse_role(raw: &str) -> Result<String, String> {
    UserRole::try_from(raw)
        .map(|role| role.as_str().to_string())
        .map_err(|err| err.to_string())
}

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> Result<Self, Box<dyn Error + Send + Sync>> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn prompt_password(prompt: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
    let _raw = RawModeGuard::enter()?;

    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(prompt)
    )?;
    out.flush()?;

    let mut buf = String::new();
    loop {
        let Event::Key(KeyEvent {
            code, modifiers, ..
        }) = event::read()?
        else {
            continue;
        };

        match code {
            KeyCode::Enter => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                break;
            }
            KeyCode::Backspace => {
                if buf.pop().is_some() {
                    execute!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
                    out.flush()?;
                }
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                return Err("interrupted".into());
            }
            KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => {
                buf.push(ch);
                execute!(out, Print("*"))?;
                out.flush()?;
            }
            _ => {}
        }
    }

    Ok(buf)
}

fn prompt_password_twice() -> Result<String, Box<dyn Error + Send + Sync>> {
    let password = prompt_password("Password: ")?;
    if password.is_empty() {
        return Err("password must not be empty".into());
    }
    let confirm = prompt_password("Confirm password: ")?;
    if password != confirm {
        return Err("passwords do not match".into());
    }
    Ok(password)
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;

    match cli.command {
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            let password = prompt_password_twice()?;

            if users::Entity::find_by_id(args.username.clone())
                .one(&db)
                .await?
                .is_some()
            {
                eprintln!("user already exists: {}", args.username);
                std::process::exit(1);
            }

            let user = users::ActiveModel {
                username: Set(args.username.clone()),
                password: Set(password),
                role: Set(args.role.clone()),
            };
            users::Entity::insert(user).exec(&db).await?;

            println!("created user: {} ({})", args.username, args.role);
        }
        Command::Pet(Pet { command }) => {
            let engine = Engine::builder().database(db.clone()).build().await?;
            match command {
                PetCommand::Register(args) => {
                    let pet = engine
                        .register_pet(
                            RegisterPetCmd::new(args.name, args.actor, Utc::now())
                                .starting_credits(args.credits),
                        )
                        .await?;
                    println!("registered pet: {} ({})", pet.name, pet.id);
                }
                PetCommand::AssignTutor(args) => {
                    engine.assign_tutor(args.pet, &args.username).await?;
                    println!("assigned tutor {} to pet {}", args.username, args.pet);
                }
            }
        }
        Command::Credits(Credits {
            command: CreditsCommand::Add(args),
        }) => {
            let engine = Engine::builder().database(db.clone()).build().await?;
            let mut cmd = PurchaseCmd::new(args.pet, args.actor, args.credits, Utc::now());
            if let Some(description) = args.description {
                cmd = cmd.description(description);
            }
            let outcome = engine.add_credits(cmd).await?;
            println!(
                "credited pet {}: balance {} -> {}",
                args.pet, outcome.previous_balance, outcome.new_balance
            );
        }
    }

    Ok(())
}
