use argh::{EarlyExit, FromArgs};
use billing_migrate::{
    auth::Credentials,
    config::Settings,
    migrate::{self, Summary},
};
use color_eyre::eyre::{self, WrapErr};
use tokio::io;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "Expected [OLD_BILLING_ACCOUNT_ID] [NEW_BILLING_ACCOUNT_ID] as program arguments";

#[derive(Debug, FromArgs)]
/// Move every project attached to one Google Cloud billing account to another,
/// asking for confirmation before each project.
///
/// Credentials come from CLOUDSDK_AUTH_ACCESS_TOKEN, GOOGLE_APPLICATION_CREDENTIALS,
/// or gcloud's application default credentials.
struct Opts {
    #[argh(positional)]
    /// billing account the projects are currently attached to
    old_billing_account_id: String,
    #[argh(positional)]
    /// billing account the projects should be moved to
    new_billing_account_id: String,
}

#[derive(Debug)]
enum Parsed {
    Run(Opts),
    Exit { output: String, code: i32 },
}

fn parse(cmd: &str, args: &[&str]) -> Parsed {
    let usage = || Parsed::Exit {
        output: format!("{}\n", USAGE),
        code: 1,
    };
    if args.len() != 2 || args.iter().any(|a| a.is_empty()) {
        return usage();
    }
    // "--" keeps argh from reading `help` or a leading dash as a flag
    match Opts::from_args(&[cmd], &["--", args[0], args[1]]) {
        Ok(opts) => Parsed::Run(opts),
        Err(EarlyExit { output, .. }) => Parsed::Exit {
            output: format!("{}\n{}", USAGE, output),
            code: 1,
        },
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let strs: Vec<&str> = args.iter().map(String::as_str).collect();
    let cmd = strs.first().copied().unwrap_or("billing-migrate");
    let rest = strs.get(1..).unwrap_or(&[]);
    let opts = match parse(cmd, rest) {
        Parsed::Run(opts) => opts,
        Parsed::Exit { output, code } => {
            print!("{}", output);
            std::process::exit(code);
        }
    };

    color_eyre::install()?;
    init_logging();

    let settings = Settings::from_env()?;
    let http = reqwest::Client::builder()
        .timeout(settings.timeout)
        .build()
        .wrap_err("could not build http client")?;
    let credentials = Credentials::discover(|name| std::env::var(name).ok())
        .await
        .wrap_err("could not find Google credentials")?;
    let token = credentials
        .access_token(&http)
        .await
        .wrap_err("could not obtain an access token")?;
    let client = settings
        .client(token, credentials.quota_project())
        .wrap_err("could not build the Cloud Billing client")?;

    let mut input = io::BufReader::new(io::stdin());
    let mut output = io::stdout();
    let Summary { moved, skipped } = migrate::migrate(
        &client,
        &opts.old_billing_account_id,
        &opts.new_billing_account_id,
        &mut input,
        &mut output,
    )
    .await?;
    tracing::info!(moved, skipped, "done");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exit_code(args: &[&str]) -> i32 {
        match parse("billing-migrate", args) {
            Parsed::Exit { output, code } => {
                assert_eq!(output, format!("{}\n", USAGE));
                code
            }
            Parsed::Run(opts) => panic!("unexpectedly parsed {:?}", opts),
        }
    }

    #[test]
    fn two_positionals() {
        match parse("billing-migrate", &["0000AA-BBBBBB-CCCCCC", "1111DD-EEEEEE-FFFFFF"]) {
            Parsed::Run(opts) => {
                assert_eq!(opts.old_billing_account_id, "0000AA-BBBBBB-CCCCCC");
                assert_eq!(opts.new_billing_account_id, "1111DD-EEEEEE-FFFFFF");
            }
            other => panic!("expected to run, got {:?}", other),
        }
    }

    #[test]
    fn wrong_argument_count() {
        assert_eq!(exit_code(&[]), 1);
        assert_eq!(exit_code(&["only-one"]), 1);
        assert_eq!(exit_code(&["a", "b", "c"]), 1);
    }

    #[test]
    fn empty_account_ids() {
        assert_eq!(exit_code(&["", "b"]), 1);
        assert_eq!(exit_code(&["a", ""]), 1);
    }

    #[test]
    fn help_is_just_a_wrong_argument_count() {
        assert_eq!(exit_code(&["--help"]), 1);
        assert_eq!(exit_code(&["help"]), 1);
    }

    #[test]
    fn two_arguments_always_run() {
        match parse("billing-migrate", &["--help", "x"]) {
            Parsed::Run(opts) => {
                assert_eq!(opts.old_billing_account_id, "--help");
                assert_eq!(opts.new_billing_account_id, "x");
            }
            other => panic!("expected to run, got {:?}", other),
        }
        match parse("billing-migrate", &["help", "-y"]) {
            Parsed::Run(opts) => {
                assert_eq!(opts.old_billing_account_id, "help");
                assert_eq!(opts.new_billing_account_id, "-y");
            }
            other => panic!("expected to run, got {:?}", other),
        }
    }
}
