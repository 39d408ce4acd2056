/// A parsed IRC line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct IrcMessage {
    pub(super) prefix: Option<String>,
    pub(super) command: String,
    pub(super) params: Vec<String>,
}

impl IrcMessage {
    /// Parse a raw IRC line.
    ///
    /// IRC format: `[@<tags>] [:<prefix>] <command> [<params>] [:<trailing>]`.
    /// Message tags are skipped.
    pub(super) fn parse(line: &str) -> Option<Self> {
        let mut line = line.trim_end_matches(['\r', '\n']);
        if let Some(tagged) = line.strip_prefix('@') {
            line = tagged.split_once(' ')?.1;
        }
        if line.is_empty() {
            return None;
        }

        let (prefix, rest) = if let Some(stripped) = line.strip_prefix(':') {
            let (prefix, rest) = stripped.split_once(' ')?;
            (Some(prefix.to_string()), rest)
        } else {
            (None, line)
        };

        let (middle, trailing) = match rest.split_once(" :") {
            Some((middle, trailing)) => (middle, Some(trailing)),
            None => (rest, None),
        };

        let mut words = middle.split_whitespace();
        let command = words.next()?.to_uppercase();
        let mut params: Vec<String> = words.map(str::to_string).collect();
        if let Some(t) = trailing {
            params.push(t.to_string());
        }

        Some(IrcMessage {
            prefix,
            command,
            params,
        })
    }

    /// Nickname part of the prefix (`nick!user@host` → `nick`).
    pub(super) fn nick(&self) -> Option<&str> {
        let prefix = self.prefix.as_deref()?;
        let nick = prefix.split('!').next().unwrap_or(prefix);
        (!nick.is_empty()).then_some(nick)
    }

    pub(super) fn param(&self, index: usize) -> &str {
        self.params.get(index).map_or("", String::as_str)
    }
}

/// Whether `target` names a channel rather than a user.
pub(super) fn is_channel_name(target: &str) -> bool {
    target.starts_with(['#', '&', '+', '!'])
}
