//! Minimal netrc reader: `machine`/`login`/`password` tokens, `default`, and skipped `macdef` bodies.

/// Password of the entry for `host`, falling back to a `default` entry.
pub fn lookup(text: &str, host: &str) -> Option<String> {
    let mut matched: Option<String> = None;
    let mut default: Option<String> = None;
    // Which entry the following login/password tokens belong to.
    let mut current: Option<Entry> = None;

    let mut lines = text.lines();
    while let Some(line) = lines.next() {
        let mut tokens = line.split_whitespace();
        while let Some(tok) = tokens.next() {
            match tok {
                "machine" => {
                    let name = tokens.next().unwrap_or("");
                    current = Some(if name.eq_ignore_ascii_case(host) {
                        Entry::Match
                    } else {
                        Entry::Other
                    });
                }
                "default" => current = Some(Entry::Default),
                "password" => {
                    let value = tokens.next().map(str::to_string);
                    match current {
                        Some(Entry::Match) if matched.is_none() => matched = value,
                        Some(Entry::Default) if default.is_none() => default = value,
                        _ => {}
                    }
                }
                "login" | "account" => {
                    tokens.next();
                }
                "macdef" => {
                    // Macro body runs until the next blank line.
                    for body in lines.by_ref() {
                        if body.trim().is_empty() {
                            break;
                        }
                    }
                    break;
                }
                t if t.starts_with('#') => break,
                _ => {}
            }
        }
    }

    matched.or(default)
}

#[derive(Clone, Copy)]
enum Entry {
    Match,
    Other,
    Default,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiline_entry() {
        let text = "machine api.wandb.ai\n  login user\n  password abc123\n";
        assert_eq!(lookup(text, "api.wandb.ai").as_deref(), Some("abc123"));
    }

    #[test]
    fn single_line_entries_pick_right_host() {
        let text = "machine github.com login me password gh\nmachine api.wandb.ai login user password wb\n";
        assert_eq!(lookup(text, "api.wandb.ai").as_deref(), Some("wb"));
        assert_eq!(lookup(text, "github.com").as_deref(), Some("gh"));
    }

    #[test]
    fn default_entry_is_fallback() {
        let text = "machine other login a password x\ndefault login b password fallback\n";
        assert_eq!(lookup(text, "api.wandb.ai").as_deref(), Some("fallback"));
    }

    #[test]
    fn macdef_body_is_skipped() {
        let text = "macdef init\nmachine api.wandb.ai password bogus\n\nmachine api.wandb.ai password real\n";
        assert_eq!(lookup(text, "api.wandb.ai").as_deref(), Some("real"));
    }

    #[test]
    fn comments_are_ignored() {
        let text = "# machine api.wandb.ai password commented\nmachine api.wandb.ai password live\n";
        assert_eq!(lookup(text, "api.wandb.ai").as_deref(), Some("live"));
    }

    #[test]
    fn unknown_host_without_default() {
        assert_eq!(lookup("machine a password b\n", "api.wandb.ai"), None);
    }
}
