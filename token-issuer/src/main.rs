use std::path::PathBuf;

use clap::Parser;
use token_issuer::{
    DEFAULT_ISSUER, DEFAULT_TTL_SECONDS, IssueError, IssueRequest, TokenIssuer, parse_algorithm,
    read_secret_file,
};

/// Mint a bearer token for the API, signed with the shared secret.
///
/// The secret comes from `--secret-file` or `TOKEN_SIGNING_SECRET` (a `.env`
/// file is honoured). It is never accepted as a plain command-line value, so
/// it does not end up in shell history.
#[derive(Parser, Debug)]
#[command(name = "token-issuer", version, about)]
struct Args {
    /// Subject (`sub`) the token is issued to
    #[arg(long)]
    subject: String,

    /// Role to grant; repeat for several (e.g. --role admin)
    #[arg(long = "role")]
    roles: Vec<String>,

    /// Lifetime in seconds
    #[arg(long, default_value_t = DEFAULT_TTL_SECONDS)]
    ttl_seconds: u64,

    /// Issuer (`iss`) name
    #[arg(long, env = "TOKEN_ISSUER", default_value = DEFAULT_ISSUER)]
    issuer: String,

    /// HMAC algorithm: HS256, HS384 or HS512
    #[arg(long, env = "TOKEN_ALGORITHM", default_value = "HS256")]
    algorithm: String,

    /// Read the secret from this file instead of TOKEN_SIGNING_SECRET
    #[arg(long, value_name = "FILE", env = "TOKEN_SIGNING_SECRET_FILE")]
    secret_file: Option<PathBuf>,

    /// Print the decoded claims to stderr as well
    #[arg(long, default_value_t = false)]
    verbose: bool,
}

fn load_secret(args: &Args) -> Result<String, IssueError> {
    match &args.secret_file {
        Some(path) => read_secret_file(path),
        None => std::env::var("TOKEN_SIGNING_SECRET")
            .map_err(|_| IssueError::Missing("TOKEN_SIGNING_SECRET or --secret-file")),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let secret = load_secret(&args)?;
    let algorithm = parse_algorithm(&args.algorithm)?;
    let issuer = TokenIssuer::new(secret.as_bytes(), algorithm, args.issuer.clone())?;

    let mut req = IssueRequest::new(args.subject.clone()).ttl_seconds(args.ttl_seconds);
    for role in &args.roles {
        req = req.role(role.clone());
    }

    let now = chrono::Utc::now().timestamp();
    let claims = issuer.claims_at(&req, now)?;
    let token = issuer.sign(&claims)?;

    if args.verbose {
        eprintln!("{}", serde_json::to_string_pretty(&claims)?);
    }
    println!("{token}");
    Ok(())
}
