/// Command palette entries and autocomplete

#[derive(Debug, Clone)]
pub struct Command {
  pub name: &'static str,
  pub aliases: &'static [&'static str],
  pub description: &'static str,
}

pub const COMMANDS: &[Command] = &[
  Command {
    name: "catalog",
    aliases: &["c", "products", "shop"],
    description: "Browse the product catalog",
  },
  Command {
    name: "news",
    aliases: &["n", "posts"],
    description: "Workshop news",
  },
  Command {
    name: "videos",
    aliases: &["v", "video", "gallery"],
    description: "Video gallery",
  },
  Command {
    name: "quit",
    aliases: &["q", "exit"],
    description: "Exit woodshop",
  },
];

/// Suggestions for `input`, best match first: exact name, exact alias,
/// name prefix, alias prefix, then substring matches.
pub fn get_suggestions(input: &str) -> Vec<&'static Command> {
  let input = input.trim().to_lowercase();
  if input.is_empty() {
    return COMMANDS.iter().collect();
  }

  let mut matches: Vec<(&'static Command, u8)> = COMMANDS
    .iter()
    .filter_map(|cmd| match_rank(cmd, &input).map(|rank| (cmd, rank)))
    .collect();
  matches.sort_by_key(|(_, rank)| *rank);

  matches.into_iter().map(|(cmd, _)| cmd).collect()
}

fn match_rank(cmd: &Command, input: &str) -> Option<u8> {
  if cmd.name == input {
    Some(0)
  } else if cmd.aliases.contains(&input) {
    Some(1)
  } else if cmd.name.starts_with(input) {
    Some(2)
  } else if cmd.aliases.iter().any(|a| a.starts_with(input)) {
    Some(3)
  } else if cmd.name.contains(input) || cmd.aliases.iter().any(|a| a.contains(input)) {
    Some(4)
  } else {
    None
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_empty_input_returns_all() {
    assert_eq!(get_suggestions("").len(), COMMANDS.len());
  }

  #[test]
  fn test_alias_beats_prefix() {
    // "v" is an alias of videos
    assert_eq!(get_suggestions("v")[0].name, "videos");
  }

  #[test]
  fn test_prefix_match() {
    assert_eq!(get_suggestions("cat")[0].name, "catalog");
    assert_eq!(get_suggestions("NE")[0].name, "news");
  }

  #[test]
  fn test_substring_match_on_alias() {
    assert_eq!(get_suggestions("llery")[0].name, "videos");
  }

  #[test]
  fn test_no_match() {
    assert!(get_suggestions("boards").is_empty());
  }
}
