use crate::error::{AppError, Result};

pub const USAGE: &str = "\
Usage: news-tracker [COMMAND]

Commands:
  run                        Check feeds now and then on every interval (default)
  once                       Check feeds once and exit
  news [--json]              Print stored matches, newest first
  sources                    List feed sources
  keywords                   List keywords
  add-source <url> <name>    Add a feed source
  add-keyword <word>         Add a keyword
  enable-source <id>         Re-enable a source
  disable-source <id>        Stop polling a source
  enable-keyword <id>        Re-enable a keyword
  disable-keyword <id>       Stop matching a keyword
  remove-source <id>         Delete a source
  remove-keyword <id>        Delete a keyword
  help                       Show this message";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Run,
    Once,
    News { json: bool },
    Sources,
    Keywords,
    AddSource { url: String, name: String },
    AddKeyword { word: String },
    SetSourceActive { id: i64, active: bool },
    SetKeywordActive { id: i64, active: bool },
    RemoveSource { id: i64 },
    RemoveKeyword { id: i64 },
    Help,
}

impl Command {
    /// Parses the arguments that follow the program name.
    pub fn parse(args: &[String]) -> Result<Self> {
        let args: Vec<&str> = args.iter().map(String::as_str).collect();

        let command = match args.as_slice() {
            [] | ["run"] => Command::Run,
            ["once"] => Command::Once,
            ["news"] => Command::News { json: false },
            ["news", "--json"] => Command::News { json: true },
            ["sources"] => Command::Sources,
            ["keywords"] => Command::Keywords,
            ["add-source", url, name @ ..] if !name.is_empty() => Command::AddSource {
                url: url.to_string(),
                name: name.join(" "),
            },
            ["add-keyword", word @ ..] if !word.is_empty() => Command::AddKeyword {
                word: word.join(" "),
            },
            ["enable-source", id] => Command::SetSourceActive {
                id: parse_id(id)?,
                active: true,
            },
            ["disable-source", id] => Command::SetSourceActive {
                id: parse_id(id)?,
                active: false,
            },
            ["enable-keyword", id] => Command::SetKeywordActive {
                id: parse_id(id)?,
                active: true,
            },
            ["disable-keyword", id] => Command::SetKeywordActive {
                id: parse_id(id)?,
                active: false,
            },
            ["remove-source", id] => Command::RemoveSource { id: parse_id(id)? },
            ["remove-keyword", id] => Command::RemoveKeyword { id: parse_id(id)? },
            ["help"] | ["--help"] | ["-h"] => Command::Help,
            _ => {
                return Err(AppError::Usage(format!(
                    "Unrecognized arguments: {}\n\n{}",
                    args.join(" "),
                    USAGE
                )))
            }
        };

        Ok(command)
    }
}

fn parse_id(raw: &str) -> Result<i64> {
    raw.parse()
        .map_err(|_| AppError::Usage(format!("Expected a numeric id, got {:?}", raw)))
}
