//! Line commands typed at the scanner prompt

use anyhow::{anyhow, bail, Result};
use scanpost_core::Symbology;

pub const HELP: &str = "\
Commands:
  scan <payload>                 decode a QR code carrying <payload>
  scanas <symbology> <payload>   decode another format (qr, pdf417, ean13, code128)
  again                          Scan Again
  flip                           Flip Camera
  back                           Back to the home screen
  focus                          open / return to the scan screen
  grant                          answer the permission prompt with \"allow\"
  status                         show the screen again
  help                           this text
  quit                           exit";

/// One user action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Scan { symbology: Symbology, payload: String },
    Again,
    Flip,
    Back,
    Focus,
    Grant,
    Status,
    Help,
    Quit,
}

/// Parse one input line; blank lines yield `None`
pub fn parse_command(line: &str) -> Result<Option<Command>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "scan" => {
            if rest.is_empty() {
                bail!("usage: scan <payload>");
            }
            Command::Scan {
                symbology: Symbology::Qr,
                payload: rest.to_string(),
            }
        }
        "scanas" => {
            let (symbology, payload) = rest
                .split_once(char::is_whitespace)
                .ok_or_else(|| anyhow!("usage: scanas <symbology> <payload>"))?;
            Command::Scan {
                symbology: symbology.parse()?,
                payload: payload.trim().to_string(),
            }
        }
        "again" => Command::Again,
        "flip" => Command::Flip,
        "back" => Command::Back,
        "focus" => Command::Focus,
        "grant" => Command::Grant,
        "status" => Command::Status,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => bail!("unknown command '{}' (try 'help')", other),
    };
    Ok(Some(command))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_keeps_spaces() {
        let cmd = parse_command("scan  hello world ").unwrap().unwrap();
        assert_eq!(
            cmd,
            Command::Scan {
                symbology: Symbology::Qr,
                payload: "hello world".to_string()
            }
        );
    }

    #[test]
    fn test_scanas() {
        let cmd = parse_command("scanas EAN13 4006381333931").unwrap().unwrap();
        assert_eq!(
            cmd,
            Command::Scan {
                symbology: Symbology::Ean13,
                payload: "4006381333931".to_string()
            }
        );
        assert!(parse_command("scanas aztec abc").is_err());
        assert!(parse_command("scanas qr").is_err());
    }

    #[test]
    fn test_simple_commands() {
        assert_eq!(parse_command("again").unwrap(), Some(Command::Again));
        assert_eq!(parse_command("FLIP").unwrap(), Some(Command::Flip));
        assert_eq!(parse_command("exit").unwrap(), Some(Command::Quit));
        assert_eq!(parse_command("   ").unwrap(), None);
    }

    #[test]
    fn test_errors() {
        assert!(parse_command("scan").is_err());
        assert!(parse_command("dance").is_err());
    }
}
