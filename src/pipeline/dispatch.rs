use super::buffer::UrlBuffer;
use crate::config::Options;
use crate::host::Host;
use crate::links::{ServerChannel, echo_line};

/// Where titles for one message end up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteMode {
    /// Transmitted into the channel.
    Send,
    /// Shown to the local operator only.
    Display,
}

pub fn route_mode(options: &Options, srvchan: &ServerChannel, force_send: bool) -> RouteMode {
    if force_send || options.replyto.matches(srvchan) {
        RouteMode::Send
    } else {
        RouteMode::Display
    }
}

/// Local display and URL buffer form of a title.
pub fn display_line(index: usize, title: &str) -> String {
    format!("{index}:\t{title}")
}

/// Route the titles of one message. `titles[i]` belongs to the `i + 1`-th URL
/// of the message; absent titles produce no output but keep their number.
pub async fn dispatch(
    host: &dyn Host,
    url_buffer: &UrlBuffer,
    options: &Options,
    srvchan: &ServerChannel,
    titles: &[Option<String>],
    force_send: bool,
) {
    let Some(target) = host.resolve_target(srvchan) else {
        tracing::debug!(srvchan = %srvchan, "no output target, dropping titles");
        return;
    };

    let mode = route_mode(options, srvchan, force_send);
    for (i, title) in titles.iter().enumerate() {
        let Some(title) = title else {
            continue;
        };
        let index = i + 1;

        let result = match mode {
            RouteMode::Send => {
                tracing::debug!(srvchan = %srvchan, index, "sending title");
                host.send(&target, &echo_line(index, title)).await
            }
            RouteMode::Display => {
                tracing::debug!(srvchan = %srvchan, index, "displaying title");
                host.print(&target, &display_line(index, title)).await
            }
        };
        if let Err(e) = result {
            tracing::warn!(srvchan = %srvchan, index, error = %e, "title output failed");
        }

        if options.urlbuffer {
            url_buffer.print(host, &display_line(index, title));
        }
    }
}
