//! Structured parsing of the storage-host fragment embedded in attachment paths.
//!
//! The portal strips `:` and `/` from the storage URL when it builds an
//! attachment identifier, so `http://localhost:8080` arrives as
//! `httplocalhost8080` and `https://files.example` as either
//! `httpsfiles.example` or `https-files.example`. [`HostFragment::parse`]
//! recovers `{scheme, authority}` and [`Display`](std::fmt::Display) writes it
//! back with exactly one `://`.

/// Transport scheme recovered from a host fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }
}

impl std::fmt::Display for Scheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded storage host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostFragment {
    /// Text in front of a dashed scheme marker. Empty for well-formed paths.
    pub lead: String,
    /// Scheme, if the fragment carried one.
    pub scheme: Option<Scheme>,
    /// Host and optional port, with the port separator restored.
    pub authority: String,
}

const DASHED_MARKERS: [(&str, Scheme); 2] = [("https-", Scheme::Https), ("http-", Scheme::Http)];

impl HostFragment {
    /// Parse a raw fragment such as `http-10.0.0.5` or `httplocalhost8080`.
    ///
    /// A dashed marker anywhere in the fragment takes precedence over a bare
    /// prefix. Returns `None` for an empty fragment.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.is_empty() {
            return None;
        }

        let dashed = DASHED_MARKERS
            .iter()
            .filter_map(|(marker, scheme)| raw.find(marker).map(|pos| (pos, *marker, *scheme)))
            .min_by_key(|(pos, _, _)| *pos);

        let (lead, scheme, rest) = match dashed {
            Some((pos, marker, scheme)) => (&raw[..pos], Some(scheme), &raw[pos + marker.len()..]),
            None => {
                if let Some(rest) = raw.strip_prefix("https") {
                    ("", Some(Scheme::Https), rest)
                } else if let Some(rest) = raw.strip_prefix("http") {
                    ("", Some(Scheme::Http), rest)
                } else {
                    ("", None, raw)
                }
            }
        };

        Some(Self {
            lead: lead.to_string(),
            scheme,
            authority: restore_port_separator(rest),
        })
    }
}

impl std::fmt::Display for HostFragment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.lead)?;
        if let Some(scheme) = self.scheme {
            write!(f, "{scheme}://")?;
        }
        f.write_str(&self.authority)
    }
}

/// Insert `:` after every `localhost` that is not already followed by one.
fn restore_port_separator(authority: &str) -> String {
    const LOCALHOST: &str = "localhost";
    let mut out = String::with_capacity(authority.len() + 1);
    let mut cursor = 0;
    for (pos, _) in authority.match_indices(LOCALHOST) {
        let end = pos + LOCALHOST.len();
        out.push_str(&authority[cursor..end]);
        if !authority[end..].starts_with(':') {
            out.push(':');
        }
        cursor = end;
    }
    out.push_str(&authority[cursor..]);
    out
}
