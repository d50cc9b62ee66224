use anyhow::Context;
use base64::{engine::general_purpose::STANDARD, Engine};
use std::io::Write;
use std::process::{Command, Stdio};

/// Write-only system clipboard used for copying prompt bodies.
pub struct Clipboard;

impl Clipboard {
    /// Emits an OSC 52 sequence and then tries the native tools in order.
    /// Succeeds when any native tool accepted the text, or when none exists
    /// (the terminal may still have taken the OSC 52 copy).
    pub fn write_text(text: &str) -> anyhow::Result<()> {
        let in_multiplexer = std::env::var("TMUX").is_ok() || std::env::var("STY").is_ok();
        let _ = std::io::stdout()
            .write_all(osc52_sequence(text, in_multiplexer).as_bytes())
            .and_then(|_| std::io::stdout().flush());

        let mut last_err = None;
        for (program, args) in native_writers() {
            match write_with_command(program, args, text) {
                Ok(()) => return Ok(()),
                Err(err) => {
                    tracing::debug!(program, %err, "clipboard tool unavailable");
                    last_err = Some(err);
                }
            }
        }

        match last_err {
            Some(err) if cfg!(any(target_os = "macos", target_os = "windows")) => Err(err),
            _ => Ok(()),
        }
    }
}

type Writer = (&'static str, &'static [&'static str]);

const POWERSHELL_SET_CLIPBOARD: &[&str] = &[
    "-NoProfile",
    "-Command",
    "[Console]::InputEncoding = [System.Text.Encoding]::UTF8; Set-Clipboard -Value ([Console]::In.ReadToEnd())",
];

fn native_writers() -> Vec<Writer> {
    if cfg!(target_os = "macos") {
        return vec![("pbcopy", &[] as &[&str])];
    }
    if cfg!(target_os = "windows") {
        return vec![("powershell", POWERSHELL_SET_CLIPBOARD)];
    }

    let mut writers: Vec<Writer> = Vec::new();
    if std::env::var("WAYLAND_DISPLAY").is_ok() {
        writers.push(("wl-copy", &[]));
    }
    writers.push(("xclip", &["-selection", "clipboard"]));
    writers.push(("xsel", &["--clipboard", "--input"]));
    writers
}

pub(crate) fn osc52_sequence(text: &str, in_multiplexer: bool) -> String {
    let encoded = STANDARD.encode(text.as_bytes());
    let osc52 = format!("\x1b]52;c;{encoded}\x07");
    if in_multiplexer {
        format!("\x1bPtmux;\x1b{osc52}\x1b\\")
    } else {
        osc52
    }
}

fn write_with_command(program: &str, args: &[&str], text: &str) -> anyhow::Result<()> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .with_context(|| format!("failed to execute clipboard write command: {program}"))?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(text.as_bytes()).with_context(|| {
            format!("failed to write text to clipboard command stdin: {program}")
        })?;
    }

    let status = child
        .wait()
        .with_context(|| format!("failed waiting for clipboard command: {program}"))?;
    if !status.success() {
        anyhow::bail!(
            "clipboard write command `{}` failed with status {}",
            program,
            status
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_osc52_encodes_payload() {
        assert_eq!(osc52_sequence("hi", false), "\x1b]52;c;aGk=\x07");
        let wrapped = osc52_sequence("hi", true);
        assert!(wrapped.starts_with("\x1bPtmux;"));
        assert!(wrapped.ends_with("\x1b\\"));
    }
}
