use anyhow::bail;
use clap::{Parser, Subcommand, ValueEnum};
use nodeflake::{DetectionPolicy, MAX_BATCH_SIZE, NodeConfig, NodeId};

/// Runtime configuration for the `nodeflake` binary.
///
/// Node identity and generator settings are global options so they can be
/// set once in the environment (or `.env`) and apply to every subcommand.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "nodeflake",
    version,
    about = "Generate and decode Snowflake-style user IDs"
)]
pub struct CliArgs {
    /// Worker ID (0-31) within the datacenter.
    ///
    /// Derived from a local network interface's MAC address when omitted.
    ///
    /// Environment variable: `WORKER_ID`
    #[arg(long, env = "WORKER_ID", global = true)]
    pub worker_id: Option<u8>,

    /// Datacenter ID (0-31).
    ///
    /// Derived from a hash of the hostname when omitted.
    ///
    /// Environment variable: `DATACENTER_ID`
    #[arg(long, env = "DATACENTER_ID", global = true)]
    pub datacenter_id: Option<u8>,

    /// Fail instead of defaulting to `1` when a node field cannot be derived
    /// from the host.
    ///
    /// Environment variable: `STRICT_NODE_DETECTION`
    #[arg(long, env = "STRICT_NODE_DETECTION", global = true, default_value_t = false)]
    pub strict_node_detection: bool,

    /// Time source used to stamp IDs.
    ///
    /// Environment variable: `NODEFLAKE_CLOCK`
    #[arg(long, env = "NODEFLAKE_CLOCK", global = true, value_enum, default_value_t = ClockKind::System)]
    pub clock: ClockKind,

    /// Use the lock-free (compare-and-swap) generator instead of the mutex
    /// one.
    ///
    /// Environment variable: `NODEFLAKE_LOCK_FREE`
    #[arg(long, env = "NODEFLAKE_LOCK_FREE", global = true, default_value_t = false)]
    pub lock_free: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print freshly generated IDs, one per line.
    Generate {
        /// How many IDs to generate (1-1000).
        #[arg(short = 'n', long, default_value_t = 1, allow_negative_numbers = true)]
        count: i32,
    },
    /// Print every decoded field of the given IDs.
    Decode {
        #[arg(required = true, allow_negative_numbers = true)]
        ids: Vec<i64>,
    },
    /// Print the node identity this process resolves to.
    Node,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockKind {
    /// Wall clock, read on every call. Clock rollbacks are reported.
    System,
    /// Wall clock sampled once, then advanced by a monotonic timer.
    Monotonic,
}

#[derive(Debug, Clone)]
pub struct CliConfig {
    pub node: NodeConfig,
    pub clock: ClockKind,
    pub lock_free: bool,
    pub command: Command,
}

impl TryFrom<CliArgs> for CliConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        match args.worker_id {
            Some(worker_id) if worker_id > NodeId::MAX_WORKER_ID => bail!(
                "WORKER_ID ({}) exceeds the worker ID space (max = {})",
                worker_id,
                NodeId::MAX_WORKER_ID
            ),
            _ => {}
        }

        match args.datacenter_id {
            Some(datacenter_id) if datacenter_id > NodeId::MAX_DATACENTER_ID => bail!(
                "DATACENTER_ID ({}) exceeds the datacenter ID space (max = {})",
                datacenter_id,
                NodeId::MAX_DATACENTER_ID
            ),
            _ => {}
        }

        match args.command {
            Command::Generate { count } if !(1..=MAX_BATCH_SIZE).contains(&count) => {
                bail!("--count must be between 1 and {MAX_BATCH_SIZE}, got {count}")
            }
            _ => {}
        }

        let detection = if args.strict_node_detection {
            DetectionPolicy::Strict
        } else {
            DetectionPolicy::Fallback
        };

        Ok(Self {
            node: NodeConfig {
                worker_id: args.worker_id,
                datacenter_id: args.datacenter_id,
                detection,
            },
            clock: args.clock,
            lock_free: args.lock_free,
            command: args.command,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> anyhow::Result<CliConfig> {
        let args = CliArgs::try_parse_from(std::iter::once("nodeflake").chain(argv.iter().copied()))?;
        CliConfig::try_from(args)
    }

    #[test]
    fn parses_generate_with_node() {
        let config = parse(&[
            "--worker-id",
            "3",
            "--datacenter-id",
            "5",
            "generate",
            "--count",
            "10",
        ])
        .unwrap();
        assert_eq!(config.node.worker_id, Some(3));
        assert_eq!(config.node.datacenter_id, Some(5));
        assert_eq!(config.node.detection, DetectionPolicy::Fallback);
        assert_eq!(config.command, Command::Generate { count: 10 });
        assert_eq!(config.clock, ClockKind::System);
        assert!(!config.lock_free);
    }

    #[test]
    fn global_options_after_subcommand() {
        let config = parse(&[
            "generate",
            "--worker-id",
            "1",
            "--clock",
            "monotonic",
            "--lock-free",
            "--strict-node-detection",
        ])
        .unwrap();
        assert_eq!(config.node.worker_id, Some(1));
        assert_eq!(config.clock, ClockKind::Monotonic);
        assert!(config.lock_free);
        assert_eq!(config.node.detection, DetectionPolicy::Strict);
        assert_eq!(config.command, Command::Generate { count: 1 });
    }

    #[test]
    fn rejects_out_of_range_node_fields() {
        let err = parse(&["--worker-id", "32", "node"]).unwrap_err();
        assert!(err.to_string().contains("WORKER_ID (32)"));

        let err = parse(&["--datacenter-id", "40", "node"]).unwrap_err();
        assert!(err.to_string().contains("DATACENTER_ID (40)"));

        // Does not fit in a u8 at all
        assert!(parse(&["--worker-id", "300", "node"]).is_err());
    }

    #[test]
    fn rejects_batch_out_of_range() {
        for count in ["0", "-1", "1001"] {
            let err = parse(&["generate", "--count", count]).unwrap_err();
            assert!(err.to_string().contains("--count must be between 1 and 1000"));
        }
        assert!(parse(&["generate", "--count", "1000"]).is_ok());
    }

    #[test]
    fn decode_requires_ids() {
        assert!(parse(&["decode"]).is_err());
        let config = parse(&["decode", "8106751287767041", "-1"]).unwrap();
        assert_eq!(
            config.command,
            Command::Decode {
                ids: vec![8_106_751_287_767_041, -1]
            }
        );
    }
}
