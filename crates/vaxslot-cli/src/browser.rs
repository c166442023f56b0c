//! Opens the booking dashboard in a browser tab.

use tokio::process::Command;

/// Program and arguments that open `url`. A configured `browser` may carry
/// its own arguments (`"firefox --new-tab"`); otherwise the platform opener
/// is used.
pub(crate) fn launcher(browser: Option<&str>, url: &str) -> (String, Vec<String>) {
    if let Some(mut parts) = browser
        .map(str::split_whitespace)
        .filter(|parts| parts.clone().next().is_some())
    {
        let program = parts.next().unwrap_or_default().to_owned();
        let mut args: Vec<String> = parts.map(str::to_owned).collect();
        args.push(url.to_owned());
        return (program, args);
    }

    if cfg!(target_os = "macos") {
        ("open".to_owned(), vec![url.to_owned()])
    } else if cfg!(target_os = "windows") {
        (
            "cmd".to_owned(),
            vec![
                "/C".to_owned(),
                "start".to_owned(),
                String::new(),
                url.to_owned(),
            ],
        )
    } else {
        ("xdg-open".to_owned(), vec![url.to_owned()])
    }
}

/// Spawns the browser without waiting for it to exit.
pub(crate) fn open_tab(browser: Option<&str>, url: &str) -> anyhow::Result<()> {
    let (program, args) = launcher(browser, url);
    tracing::info!(%program, %url, "opening browser");
    Command::new(&program).args(&args).spawn()?;
    Ok(())
}
