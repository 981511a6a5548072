use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use dialoguer::{Input, Password};
use dotenvy::dotenv;

use gatehouse_auth::{CredentialStoreError, Role, TokenCodec, TokenError};
use gatehouse_config::JwtConfig;
use gatehouse_core::hash_password;
use gatehouse_db::{AccountStore, NewAccount, PgCredentialStore, init_db_pool, run_migrations};

#[derive(Parser)]
#[command(name = "gatehouse-cli")]
#[command(about = "Gatehouse CLI - Administrative tools for the Gatehouse API", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a staff account (registration only ever creates students)
    CreateAdmin {
        /// Login name of the new account
        #[arg(short = 'u', long)]
        username: Option<String>,

        /// Role to assign: ADMIN or MINISTRY
        #[arg(short = 'r', long, default_value = "ADMIN")]
        role: Role,

        /// Password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,
    },
    /// Print a bcrypt hash for a password
    HashPassword {
        /// Password (will be prompted securely if not provided)
        password: Option<String>,
    },
    /// Verify a token with JWT_SECRET and print its claims
    DecodeToken {
        token: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::CreateAdmin {
            username,
            role,
            password,
        } => handle_create_admin(username, role, password).await,
        Commands::HashPassword { password } => handle_hash_password(password),
        Commands::DecodeToken { token } => handle_decode_token(&token),
    }
}

fn prompt_password(password: Option<String>, confirm: bool) -> anyhow::Result<String> {
    if let Some(password) = password {
        return Ok(password);
    }

    let prompt = Password::new().with_prompt("Password");
    let prompt = if confirm {
        prompt.with_confirmation("Confirm password", "Passwords do not match")
    } else {
        prompt
    };

    prompt.interact().context("failed to read password")
}

async fn handle_create_admin(
    username: Option<String>,
    role: Role,
    password: Option<String>,
) -> anyhow::Result<()> {
    if role == Role::Student {
        bail!("students register through the API; choose ADMIN or MINISTRY");
    }

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let pool = init_db_pool(&database_url)
        .await
        .context("failed to connect to database")?;
    run_migrations(&pool)
        .await
        .context("failed to run migrations")?;
    let store = PgCredentialStore::new(pool);

    let username = match username {
        Some(username) => username,
        None => Input::new()
            .with_prompt("Username")
            .interact_text()
            .context("failed to read username")?,
    };
    let password = prompt_password(password, true)?;
    if password.len() < 8 {
        bail!("password must be at least 8 characters");
    }

    let password_hash = hash_password(&password).map_err(|e| anyhow::anyhow!("{}", e))?;

    match store
        .create(NewAccount {
            login_name: username.clone(),
            password_hash,
            role,
        })
        .await
    {
        Ok(account) => {
            println!("✓ Created {} account", role);
            println!("  ID: {}", account.identity.id);
            println!("  Username: {}", account.identity.login_name);
            Ok(())
        }
        Err(CredentialStoreError::DuplicateLoginName(_)) => {
            bail!("an account named {} already exists", username)
        }
        Err(e) => Err(e.into()),
    }
}

fn handle_hash_password(password: Option<String>) -> anyhow::Result<()> {
    let password = prompt_password(password, false)?;
    let hash = hash_password(&password).map_err(|e| anyhow::anyhow!("{}", e))?;
    println!("{}", hash);
    Ok(())
}

fn handle_decode_token(token: &str) -> anyhow::Result<()> {
    let config = JwtConfig::from_env().context("invalid JWT configuration")?;
    let codec = TokenCodec::new(&config)?;

    let claims = match codec.decode(token) {
        Ok(claims) => claims,
        Err(TokenError::Expired) => bail!("token is expired"),
        Err(e) => bail!("token rejected: {} ({})", e, e.kind()),
    };

    println!("{}", serde_json::to_string_pretty(&claims)?);
    println!("Roles: {}", claims.role_names().join(", "));
    println!("Expires: {}", claims.expires_at().to_rfc3339());
    Ok(())
}
