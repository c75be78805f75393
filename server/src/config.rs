use clap::Parser;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_MAILBOX_CAPACITY: usize = 100;
pub const DEFAULT_INBOX_CAPACITY: usize = 1024;

/// Real-time room synchronization server for a collaborative code editor
#[derive(Debug, Clone, Parser)]
#[command(name = "coderoom-server")]
#[command(version)]
#[command(about = "Relays code and language changes between members of editor rooms")]
pub struct ServerConfig {
    /// Address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    pub bind: String,

    /// Port to listen on
    #[arg(long, short, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Events queued per connection before new ones are dropped
    #[arg(long, default_value_t = DEFAULT_MAILBOX_CAPACITY)]
    pub mailbox_capacity: usize,

    /// Commands queued for the coordinator before sessions have to wait
    #[arg(long, default_value_t = DEFAULT_INBOX_CAPACITY)]
    pub inbox_capacity: usize,

    /// Language a room reports until one is chosen
    #[arg(long, default_value = comms::DEFAULT_LANGUAGE)]
    pub default_language: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind: String::from("0.0.0.0"),
            port: DEFAULT_PORT,
            mailbox_capacity: DEFAULT_MAILBOX_CAPACITY,
            inbox_capacity: DEFAULT_INBOX_CAPACITY,
            default_language: String::from(comms::DEFAULT_LANGUAGE),
        }
    }
}

impl ServerConfig {
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_cli_defaults() {
        let parsed = ServerConfig::try_parse_from(["coderoom-server"]).unwrap();
        let default = ServerConfig::default();

        assert_eq!(parsed.listen_addr(), default.listen_addr());
        assert_eq!(parsed.mailbox_capacity, default.mailbox_capacity);
        assert_eq!(parsed.inbox_capacity, default.inbox_capacity);
        assert_eq!(parsed.default_language, "javascript");
    }

    #[test]
    fn test_overrides() {
        let parsed = ServerConfig::try_parse_from([
            "coderoom-server",
            "--bind",
            "127.0.0.1",
            "-p",
            "9000",
            "--mailbox-capacity",
            "8",
            "--default-language",
            "rust",
        ])
        .unwrap();

        assert_eq!(parsed.listen_addr(), "127.0.0.1:9000");
        assert_eq!(parsed.mailbox_capacity, 8);
        assert_eq!(parsed.default_language, "rust");
    }
}
