use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use clap::{Parser, ValueEnum};
use client_core::{
    load_settings, load_settings_from, ActionOutcome, AuthClient, CredentialFields, FormKind,
    Route, SessionState, SubmitOutcome,
};
use tracing_subscriber::EnvFilter;

mod console;

use console::{print_status, ConsoleNavigator, Terminal};

#[derive(Parser, Debug)]
#[command(about = "Sign in, register, and manage an account against the auth API")]
struct Args {
    /// Settings file; defaults to ./auth_client.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    api_base_url: Option<String>,
    #[arg(long, value_enum, default_value_t = StartPage::Landing)]
    start: StartPage,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StartPage {
    Landing,
    Login,
    Register,
    Profile,
}

impl From<StartPage> for Route {
    fn from(value: StartPage) -> Self {
        match value {
            StartPage::Landing => Route::Landing,
            StartPage::Login => Route::Login,
            StartPage::Register => Route::Register,
            StartPage::Profile => Route::Profile,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = match &args.config {
        Some(path) => load_settings_from(path),
        None => load_settings(),
    };
    if let Some(url) = args.api_base_url {
        settings.api_base_url = url;
    }
    tracing::info!(api = %settings.api_base_url, "starting auth console");

    let client = AuthClient::from_settings(&settings)?;
    let terminal = Arc::new(Terminal::default());

    let mut route = Route::from(args.start);
    loop {
        let next = match route {
            Route::Landing => landing(&terminal).await?,
            Route::Login => credential_page(&client, &terminal, FormKind::Login).await?,
            Route::Register => credential_page(&client, &terminal, FormKind::Register).await?,
            Route::Profile => profile_page(&client, &terminal).await?,
        };
        match next {
            Some(next) => route = next,
            None => break,
        }
    }

    Ok(())
}

async fn landing(terminal: &Terminal) -> Result<Option<Route>> {
    println!("== Welcome ==");
    loop {
        let Some(choice) = terminal.prompt("[l]ogin, [r]egister, [q]uit: ").await? else {
            return Ok(None);
        };
        match choice.trim() {
            "l" => return Ok(Some(Route::Login)),
            "r" => return Ok(Some(Route::Register)),
            "q" => return Ok(None),
            _ => println!("unknown choice"),
        }
    }
}

async fn credential_page(
    client: &AuthClient,
    terminal: &Terminal,
    kind: FormKind,
) -> Result<Option<Route>> {
    let navigator = Arc::new(ConsoleNavigator::default());
    let page = match kind {
        FormKind::Login => client.login_page(navigator.clone()),
        FormKind::Register => client.register_page(navigator.clone()),
    };

    println!("checking session...");
    if let SessionState::Authenticated(account) = page.mount().await? {
        println!("already signed in as {}", account.email);
    }
    if let Some(route) = navigator.take() {
        return Ok(Some(route));
    }

    let (title, other) = match kind {
        FormKind::Login => ("Login", Route::Register),
        FormKind::Register => ("Register", Route::Login),
    };
    loop {
        println!("== {title} ==");
        let mut fields = CredentialFields::default();
        if kind == FormKind::Register {
            let Some(username) = terminal.prompt("username: ").await? else {
                return Ok(None);
            };
            fields.username = username;
        }
        let Some(email) = terminal.prompt("email: ").await? else {
            return Ok(None);
        };
        let Some(password) = terminal.prompt("password: ").await? else {
            return Ok(None);
        };
        fields.email = email;
        fields.password = password;

        let outcome = page.submit(fields).await?;
        print_status(page.snapshot().await.status.as_ref());
        if let SubmitOutcome::Invalid(report) = &outcome {
            for error in &report.errors {
                println!("  {}: {}", error.field, error.message);
            }
        }
        if let Some(route) = navigator.take() {
            return Ok(Some(route));
        }

        let Some(choice) = terminal
            .prompt(&format!("[t]ry again, [s]witch to {other}, [q]uit: "))
            .await?
        else {
            return Ok(None);
        };
        match choice.trim() {
            "s" => return Ok(Some(other)),
            "q" => return Ok(None),
            _ => page.dismiss_status().await,
        }
    }
}

async fn profile_page(client: &AuthClient, terminal: &Arc<Terminal>) -> Result<Option<Route>> {
    let navigator = Arc::new(ConsoleNavigator::default());
    let page = client.profile_page(navigator.clone(), terminal.clone());

    page.mount().await?;
    if let Some(route) = navigator.take() {
        print_status(page.snapshot().await.status.as_ref());
        return Ok(Some(route));
    }

    loop {
        let view = page.snapshot().await;
        if let Some(account) = &view.account {
            println!("== My Account ==");
            println!("email:    {}", account.email);
            println!("username: {}", account.display_username());
        }

        let Some(choice) = terminal
            .prompt("[u]pdate username, [l]ogout, [d]elete account, [q]uit: ")
            .await?
        else {
            return Ok(None);
        };
        let outcome = match choice.trim() {
            "u" => {
                let Some(name) = terminal.prompt("new username: ").await? else {
                    return Ok(None);
                };
                page.update_username(&name).await?
            }
            "l" => page.logout().await?,
            "d" => page.delete_account().await?,
            "q" => return Ok(None),
            _ => {
                println!("unknown choice");
                continue;
            }
        };
        if outcome == ActionOutcome::Declined {
            println!("deletion cancelled");
        }

        print_status(page.snapshot().await.status.as_ref());
        if let Some(route) = navigator.take() {
            return Ok(Some(route));
        }
    }
}
