/// `:` commands and their autocomplete.

#[derive(Debug, Clone)]
pub struct Command {
  pub name: &'static str,
  pub aliases: &'static [&'static str],
  pub description: &'static str,
}

pub const COMMANDS: &[Command] = &[
  Command {
    name: "promotions",
    aliases: &["p", "promo", "coupons"],
    description: "Promotions and coupon codes",
  },
  Command {
    name: "pricelists",
    aliases: &["pl", "prices"],
    description: "Price lists",
  },
  Command {
    name: "quit",
    aliases: &["q", "exit"],
    description: "Exit promodash",
  },
];

/// Commands matching `input`, best match first.
///
/// Ranking: exact name, exact alias, name prefix, alias prefix, then
/// substring of name or alias.
pub fn get_suggestions(input: &str) -> Vec<&'static Command> {
  let input = input.trim().to_lowercase();
  if input.is_empty() {
    return COMMANDS.iter().collect();
  }

  let mut ranked: Vec<(&Command, u8)> = COMMANDS
    .iter()
    .filter_map(|cmd| {
      let aliases = cmd.aliases.iter();
      let rank = if cmd.name == input {
        0
      } else if cmd.aliases.contains(&input.as_str()) {
        1
      } else if cmd.name.starts_with(&input) {
        2
      } else if aliases.clone().any(|a| a.starts_with(&input)) {
        3
      } else if cmd.name.contains(&input) || aliases.clone().any(|a| a.contains(&input)) {
        4
      } else {
        return None;
      };
      Some((cmd, rank))
    })
    .collect();

  ranked.sort_by_key(|(_, rank)| *rank);
  ranked.into_iter().map(|(cmd, _)| cmd).collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_empty_input_returns_all() {
    assert_eq!(get_suggestions("").len(), COMMANDS.len());
  }

  #[test]
  fn test_exact_alias_beats_prefix() {
    // "p" is an alias of promotions and a prefix of pricelists
    let suggestions = get_suggestions("p");
    assert_eq!(suggestions[0].name, "promotions");
    assert!(suggestions.iter().any(|c| c.name == "pricelists"));
  }

  #[test]
  fn test_prefix_and_substring() {
    assert_eq!(get_suggestions("pri")[0].name, "pricelists");
    assert_eq!(get_suggestions("coup")[0].name, "promotions");
    assert_eq!(get_suggestions("lists")[0].name, "pricelists");
  }

  #[test]
  fn test_no_match() {
    assert!(get_suggestions("zzz").is_empty());
  }
}
