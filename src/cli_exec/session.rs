use time::format_description::well_known::Rfc3339;

use adreset::session::SessionState;

use crate::cli_commands::session::RecoverArgs;

use super::*;

pub(super) async fn handle_login_command(username: String, password: Option<String>) -> Result<()> {
    let (_, portal) = discover_portal()?;
    require_route(&portal, Route::Login)?;
    let password = password
        .or_else(|| std::env::var("ADRESET_PASSWORD").ok())
        .context("no password given (use --password or ADRESET_PASSWORD)")?;

    portal.login(username.trim(), &password).await?;
    match portal.session().state().session() {
        Some(s) => println!(
            "Logged in as {} ({})",
            s.username,
            s.role.map(|r| r.as_str()).unwrap_or("no role")
        ),
        None => println!("Logged in"),
    }
    Ok(())
}

pub(super) async fn handle_logout_command() -> Result<()> {
    let (_, portal) = discover_portal()?;
    portal.logout().await?;
    println!("Logged out");
    Ok(())
}

pub(super) fn handle_whoami_command(json: bool) -> Result<()> {
    let (_, portal) = discover_portal()?;
    let state = portal.session().state();
    let (status, session) = match &state {
        SessionState::Anonymous => ("anonymous", None),
        SessionState::Expired => ("expired", None),
        SessionState::Active(s) => ("active", Some(s)),
    };

    if json {
        let value = match session {
            Some(s) => serde_json::json!({
                "state": status,
                "username": s.username,
                "role": s.role.map(|r| r.as_str()),
                "expires_at": s.expires_at.format(&Rfc3339).context("format expiry")?,
            }),
            None => serde_json::json!({ "state": status }),
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&value).context("serialize whoami json")?
        );
        return Ok(());
    }

    match session {
        Some(s) => {
            println!("user: {}", s.username);
            println!("role: {}", s.role.map(|r| r.as_str()).unwrap_or("none"));
            println!(
                "expires: {}",
                s.expires_at.format(&Rfc3339).context("format expiry")?
            );
        }
        None if status == "expired" => println!("Session expired; log in again"),
        None => println!("Not logged in"),
    }
    Ok(())
}

pub(super) async fn handle_recover_command(args: RecoverArgs) -> Result<()> {
    let (_, portal) = discover_portal()?;
    require_route(
        &portal,
        Route::ResetWithQuestions {
            username: Some(args.username.clone()),
        },
    )?;

    let mut flow = portal.recovery();
    flow.load(&args.username).await?;
    if args.list {
        for q in flow.questions() {
            println!("{}\t{}", q.id, q.text);
        }
        return Ok(());
    }

    let answers = args
        .answers
        .iter()
        .map(|raw| parse_answer(raw))
        .collect::<Result<Vec<_>>>()?;
    let new_password = args
        .new_password
        .or_else(|| std::env::var("ADRESET_NEW_PASSWORD").ok())
        .context("no new password given (use --new-password or ADRESET_NEW_PASSWORD)")?;
    let confirm = args.confirm_password.unwrap_or_else(|| new_password.clone());

    let result = flow.submit(&answers, &new_password, &confirm).await;
    print_notices(flow.take_notices());
    result?;
    Ok(())
}
