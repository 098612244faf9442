//! Account and script commands.
//!
//! `scriptedit login`        store API token
//! `scriptedit logout`       forget it
//! `scriptedit show <ID>`    print a script's content
//! `scriptedit edit <ID>`    open the edit modal (see `tui`)

use std::io::{self, Write};

use scriptedit_client::{
    delete_auth, load_auth, save_auth, AuthCredentials, ScriptId, ScriptsApi, ScriptsClient,
    ScriptsError,
};
use scriptedit_config::Settings;
use serde::Serialize;

use crate::exit_codes::*;
use crate::CliError;

pub const TOKEN_ENV: &str = "SCRIPTEDIT_TOKEN";

// ── Login ───────────────────────────────────────────────────────────

pub fn cmd_login(token: Option<String>, api_base: Option<String>, settings: &Settings) -> Result<(), CliError> {
    // Resolve token: --token flag > SCRIPTEDIT_TOKEN env > interactive prompt
    let token = if let Some(t) = token {
        t
    } else if let Ok(t) = std::env::var(TOKEN_ENV) {
        t
    } else if atty::is(atty::Stream::Stdin) {
        eprint!("API token: ");
        io::stderr().flush().ok();
        let mut buf = String::new();
        io::stdin().read_line(&mut buf)
            .map_err(|e| CliError { code: EXIT_ERROR, message: e.to_string(), hint: None })?;
        buf
    } else {
        return Err(CliError {
            code: EXIT_USAGE,
            message: "No token provided and stdin is not a TTY".into(),
            hint: Some(format!("pass --token or set {}", TOKEN_ENV)),
        });
    };

    let token = token.trim().to_string();
    if token.is_empty() {
        return Err(CliError {
            code: EXIT_USAGE,
            message: "No token provided".into(),
            hint: Some(format!("pass --token or set {}", TOKEN_ENV)),
        });
    }

    let api_base = api_base
        .or_else(|| settings.api_base_url.clone())
        .filter(|base| !base.trim().is_empty())
        .ok_or_else(|| CliError {
            code: EXIT_USAGE,
            message: "No API base URL".into(),
            hint: Some(format!(
                "pass --api-base or set \"api.baseUrl\" in {}",
                Settings::config_path_display()
            )),
        })?;

    let creds = AuthCredentials::new(token, api_base);
    save_auth(&creds).map_err(|e| CliError { code: EXIT_ERROR, message: e, hint: None })?;

    log::info!("saved credentials for {}", creds.api_base);
    eprintln!("Logged in to {}", creds.api_base);
    Ok(())
}

pub fn cmd_logout() -> Result<(), CliError> {
    delete_auth().map_err(|e| CliError { code: EXIT_ERROR, message: e, hint: None })?;
    eprintln!("Logged out");
    Ok(())
}

// ── Client ──────────────────────────────────────────────────────────

/// Client from saved credentials; `api.baseUrl` in settings overrides the saved base.
pub fn open_client(settings: &Settings) -> Result<ScriptsClient, CliError> {
    let mut creds = load_auth().ok_or_else(|| scripts_error(ScriptsError::NotAuthenticated))?;
    if let Some(base) = settings.api_base_url.as_deref().filter(|b| !b.trim().is_empty()) {
        creds = AuthCredentials { api_base: base.trim_end_matches('/').to_string(), ..creds };
    }
    log::debug!("using scripts API at {}", creds.api_base);
    ScriptsClient::new(creds, settings.api_timeout()).map_err(scripts_error)
}

// ── Show ────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ShowOutput<'a> {
    id: u64,
    content: &'a str,
}

pub fn cmd_show(id: ScriptId, json: bool, settings: &Settings) -> Result<(), CliError> {
    let client = open_client(settings)?;
    show_with(&client, id, json, &mut io::stdout().lock())
}

fn show_with(api: &dyn ScriptsApi, id: ScriptId, json: bool, out: &mut dyn Write) -> Result<(), CliError> {
    let content = api.download_script(id).map_err(scripts_error)?;

    let written = if json {
        let output = ShowOutput { id: id.0, content: &content };
        serde_json::to_writer_pretty(&mut *out, &output)
            .map_err(io::Error::from)
            .and_then(|_| writeln!(out))
    } else {
        out.write_all(content.as_bytes())
    };
    written
        .and_then(|_| out.flush())
        .map_err(|e| CliError::io(format!("failed to write output: {}", e)))
}

// ── Errors ──────────────────────────────────────────────────────────

pub fn scripts_error(e: ScriptsError) -> CliError {
    let code = scripts_exit_code(&e);
    match e {
        ScriptsError::NotAuthenticated => CliError {
            code,
            message: "Not authenticated".into(),
            hint: Some("run `scriptedit login` first".into()),
        },
        ScriptsError::NotFound(id) => CliError {
            code,
            message: format!("Script {} not found", id),
            hint: None,
        },
        ScriptsError::Unauthorized(_) => CliError {
            code,
            message: scriptedit_client::error_message(&e),
            hint: Some("check the token with `scriptedit login`".into()),
        },
        other => CliError {
            code,
            message: scriptedit_client::error_message(&other),
            hint: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn client(server: &MockServer) -> ScriptsClient {
        ScriptsClient::with_base_url("tok".into(), server.base_url()).unwrap()
    }

    #[test]
    fn test_show_writes_content_verbatim() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/latest/fleet/scripts/2").query_param("alt", "media");
            then.status(200).body("#!/bin/sh\necho hi\n");
        });

        let mut out = Vec::new();
        show_with(&client(&server), ScriptId(2), false, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "#!/bin/sh\necho hi\n");
    }

    #[test]
    fn test_show_json() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/latest/fleet/scripts/2");
            then.status(200).body("echo hi");
        });

        let mut out = Vec::new();
        show_with(&client(&server), ScriptId(2), true, &mut out).unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed["id"], 2);
        assert_eq!(parsed["content"], "echo hi");
    }

    #[test]
    fn test_show_not_found_exit_code() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/latest/fleet/scripts/404");
            then.status(404).body("");
        });

        let mut out = Vec::new();
        let err = show_with(&client(&server), ScriptId(404), false, &mut out).unwrap_err();
        assert_eq!(err.code, EXIT_NOT_FOUND);
        assert_eq!(err.message, "Script 404 not found");
        assert!(out.is_empty());
    }

    #[test]
    fn test_scripts_error_messages() {
        let err = scripts_error(ScriptsError::NotAuthenticated);
        assert_eq!(err.code, EXIT_NOT_AUTH);
        assert!(err.hint.unwrap().contains("scriptedit login"));

        let err = scripts_error(ScriptsError::Validation(
            r#"{"message":"Validation Failed","errors":[{"name":"script","reason":"too long"}]}"#.into(),
        ));
        assert_eq!(err.code, EXIT_REJECTED);
        assert_eq!(err.message, "too long");

        let err = scripts_error(ScriptsError::Network("connection refused".into()));
        assert_eq!(err.code, EXIT_NETWORK);
        assert_eq!(err.message, "Network error: connection refused");
    }
}
