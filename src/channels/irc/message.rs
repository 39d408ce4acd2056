/// Reserved bytes for the server-prepended sender prefix (`:nick!user@host `).
pub(super) const SENDER_PREFIX_RESERVE: usize = 64;

/// Maximum length of one IRC line including `\r\n`.
pub(super) const IRC_LINE_LIMIT: usize = 512;

/// Payload bytes available for `PRIVMSG <target> :<payload>\r\n`.
pub(super) fn privmsg_payload_limit(target: &str) -> usize {
    let overhead = SENDER_PREFIX_RESERVE + "PRIVMSG ".len() + target.len() + " :".len() + 2;
    IRC_LINE_LIMIT.saturating_sub(overhead)
}

/// Split a message into lines safe for IRC transmission.
///
/// Every `\n` starts a new line (a raw newline would end the PRIVMSG and
/// turn the rest into a command), empty lines are dropped, and lines longer
/// than `max_bytes` are cut on UTF-8 boundaries.
pub(super) fn split_message(message: &str, max_bytes: usize) -> Vec<String> {
    let mut chunks = Vec::new();

    for line in message.split('\n') {
        let mut remaining = line.trim_end_matches('\r');
        while !remaining.is_empty() {
            let cut = cut_point(remaining, max_bytes);
            let (head, tail) = remaining.split_at(cut);
            chunks.push(head.to_string());
            remaining = tail;
        }
    }

    if chunks.is_empty() {
        chunks.push(String::new());
    }
    chunks
}

/// Largest char boundary `<= max_bytes`, or the first boundary after it
/// when a single character is wider than the limit.
fn cut_point(s: &str, max_bytes: usize) -> usize {
    if s.len() <= max_bytes {
        return s.len();
    }
    let mut cut = max_bytes;
    while cut > 0 && !s.is_char_boundary(cut) {
        cut -= 1;
    }
    if cut == 0 {
        cut = s
            .char_indices()
            .nth(1)
            .map_or(s.len(), |(index, _)| index);
    }
    cut
}
