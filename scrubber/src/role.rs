use std::fmt;

/// Which end of the trial produced a log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Sender,
    Receiver,
}

/// Role of a log file: its side plus the stream index of multi-stream trials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Role {
    pub side: Side,
    pub stream: Option<u32>,
}

impl Role {
    pub const SENDER: Role = Role {
        side: Side::Sender,
        stream: None,
    };
    pub const RECEIVER: Role = Role {
        side: Side::Receiver,
        stream: None,
    };

    pub fn sender(stream: u32) -> Self {
        Role {
            side: Side::Sender,
            stream: Some(stream),
        }
    }

    pub fn receiver(stream: u32) -> Self {
        Role {
            side: Side::Receiver,
            stream: Some(stream),
        }
    }

    /// The sender role of the same stream.
    pub fn counterpart_sender(self) -> Self {
        Role {
            side: Side::Sender,
            ..self
        }
    }

    /// All roles of a trial with `streams` streams, senders first.
    ///
    /// A single stream uses unnumbered roles, more streams are numbered from 1.
    pub fn enumerate(streams: u32) -> Vec<Role> {
        if streams <= 1 {
            return vec![Role::SENDER, Role::RECEIVER];
        }
        (1..=streams)
            .map(Role::sender)
            .chain((1..=streams).map(Role::receiver))
            .collect()
    }
}

/// The tokens naming each side in log file names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleTokens {
    pub sender: String,
    pub receiver: String,
}

impl Default for RoleTokens {
    fn default() -> Self {
        RoleTokens {
            sender: "sender".to_string(),
            receiver: "receiver".to_string(),
        }
    }
}

impl RoleTokens {
    /// Render a role as it appears in a file name, e.g. `receiver2`.
    pub fn token(&self, role: Role) -> RoleToken<'_> {
        let side = match role.side {
            Side::Sender => self.sender.as_str(),
            Side::Receiver => self.receiver.as_str(),
        };
        RoleToken {
            side,
            stream: role.stream,
        }
    }

    /// Parse a role segment of a file name.
    pub fn parse(&self, s: &str) -> Option<Role> {
        [(Side::Sender, &self.sender), (Side::Receiver, &self.receiver)]
            .into_iter()
            .find_map(|(side, token)| {
                let rest = s.strip_prefix(token.as_str())?;
                if rest.is_empty() {
                    return Some(Role { side, stream: None });
                }
                if !rest.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                rest.parse().ok().map(|stream| Role {
                    side,
                    stream: Some(stream),
                })
            })
    }
}

/// Display form of a [`Role`] under some [`RoleTokens`].
#[derive(Debug, Clone, Copy)]
pub struct RoleToken<'a> {
    side: &'a str,
    stream: Option<u32>,
}

impl fmt::Display for RoleToken<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.stream {
            Some(stream) => write!(f, "{}{stream}", self.side),
            None => write!(f, "{}", self.side),
        }
    }
}
